use core::fmt::{Display, Formatter};

/// `isc_convert_error`, raised when a bound value cannot take its declared type.
pub(crate) const CONVERT_ERR: u32 = 335_544_334;
/// Raised by client-side encoding issues that the server never sees, e.g. executing with an
/// unbound parameter. Mirrors `isc_dsql_sqlda_err`.
pub(crate) const SQLDA_ERR: u32 = 335_544_583;
/// `isc_string_truncation`, raised when a bound value exceeds its declared maximum length.
pub(crate) const STRING_TRUNCATION: u32 = 335_544_914;

/// How severe a [DiagnosticRecord] is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
  /// Terminal condition that failed the operation.
  Error,
  /// Non-fatal condition attached to an otherwise successful reply.
  Warning,
}

/// Normalized form of one server-reported condition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiagnosticRecord {
  /// `gds` code.
  pub code: u32,
  /// See [Severity].
  pub severity: Severity,
  /// Human-readable description assembled from the status vector arguments.
  pub message: String,
}

/// Broad classification derived from the primary `gds` code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
  /// Bad credentials or insufficient login rights.
  Authentication,
  /// Primary key, unique, check or foreign key violation.
  Constraint,
  /// Malformed dynamic SQL.
  Syntax,
  /// Value could not be converted to the expected type.
  TypeMismatch,
  /// Valid SQL that this server or driver does not support.
  Unsupported,
  /// Everything else.
  Unknown,
}

/// Database error as a whole. A single failed operation may carry several records: zero or
/// more warnings followed by the terminal error.
#[derive(Debug, Eq, PartialEq)]
pub struct DbError {
  records: Vec<DiagnosticRecord>,
}

impl DbError {
  pub(crate) fn new(records: Vec<DiagnosticRecord>) -> Self {
    Self { records }
  }

  /// Single-record error produced on the client side.
  pub(crate) fn client(code: u32, message: impl Into<String>) -> Self {
    Self {
      records: vec![DiagnosticRecord {
        code,
        severity: Severity::Error,
        message: message.into(),
      }],
    }
  }

  /// See [ErrorCategory]. Derived from the first error-severity record.
  #[inline]
  pub fn category(&self) -> ErrorCategory {
    self
      .records
      .iter()
      .find(|record| record.severity == Severity::Error)
      .map_or(ErrorCategory::Unknown, |record| category_of(record.code))
  }

  /// All records in server order.
  #[inline]
  pub fn records(&self) -> &[DiagnosticRecord] {
    &self.records
  }
}

impl Display for DbError {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    let mut iter = self.records.iter();
    if let Some(first) = iter.next() {
      write!(f, "{} ({})", first.message, first.code)?;
    }
    for record in iter {
      write!(f, "; {} ({})", record.message, record.code)?;
    }
    Ok(())
  }
}

impl core::error::Error for DbError {}

pub(crate) fn category_of(code: u32) -> ErrorCategory {
  match code {
    // login, no_priv
    335_544_472 | 335_544_352 => ErrorCategory::Authentication,
    // no_dup, foreign_key, check_constraint, unique_key_violation
    335_544_349 | 335_544_466 | 335_544_558 | 335_544_665 => ErrorCategory::Constraint,
    // dsql_error, token_err, dsql_command_err, dsql_field_err, dsql_relation_err
    335_544_569 | 335_544_634 | 335_544_570 | 335_544_572 | 335_544_580 => ErrorCategory::Syntax,
    // arith_except, convert_error, sqlda_err, string_truncation
    335_544_321 | CONVERT_ERR | SQLDA_ERR | STRING_TRUNCATION => ErrorCategory::TypeMismatch,
    // feature is not supported, wish_list
    335_544_378 | 335_544_561 => ErrorCategory::Unsupported,
    _ => ErrorCategory::Unknown,
  }
}

#[cfg(test)]
mod tests {
  use crate::db_error::{DbError, DiagnosticRecord, ErrorCategory, Severity};

  #[test]
  fn category_tracks_the_first_error_record() {
    let db_error = DbError::new(vec![
      DiagnosticRecord {
        code: 335_544_807,
        severity: Severity::Warning,
        message: "sql warning".into(),
      },
      DiagnosticRecord {
        code: 335_544_665,
        severity: Severity::Error,
        message: "violation of PRIMARY or UNIQUE KEY constraint".into(),
      },
    ]);
    assert_eq!(db_error.category(), ErrorCategory::Constraint);
    assert_eq!(db_error.records().len(), 2);
  }

  #[test]
  fn display_joins_all_records() {
    let db_error = DbError::client(1, "first");
    assert_eq!(db_error.to_string(), "first (1)");
  }
}

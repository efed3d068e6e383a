use crate::{
  db_error::{DiagnosticRecord, ErrorCategory},
  diagnostics::Outcome,
  Error,
};

/// Fixed identifier reported through the `driverName` attribute.
pub(crate) const DRIVER_NAME: &str = "firebird";

/// How data-level failures are surfaced. Operation-impossible conditions (network,
/// authentication, stale handles) always propagate regardless of the active mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrMode {
  /// Failures are recorded in the diagnostics buffer and calls return a sentinel value.
  Silent,
  /// Like [`ErrMode::Silent`] with an additional non-fatal `tracing` notice.
  Warning,
  /// Failures abort the operation with [`crate::Error::Db`].
  Exception,
}

/// Case transformation applied to rendered column labels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseMode {
  /// Lowercases labels.
  Lower,
  /// Labels are left exactly as the server reports them.
  Natural,
  /// Uppercases labels.
  Upper,
}

/// Whether rendered column labels are prefixed with their source table name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableQualification {
  /// No prefix.
  Off,
  /// `TABLE.COLUMN` labels.
  On,
}

/// Typed content of a connection attribute.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttrValue {
  /// See [CaseMode].
  CaseMode(CaseMode),
  /// See [ErrMode].
  ErrMode(ErrMode),
  /// Integer introspection value.
  Int(u32),
  /// String introspection value.
  Str(String),
  /// See [TableQualification].
  TableQualification(TableQualification),
}

/// Connection-scoped negotiated state plus the diagnostics buffer.
#[derive(Debug)]
pub(crate) struct Session {
  pub(crate) active: bool,
  pub(crate) case_mode: CaseMode,
  pub(crate) diagnostics: Vec<DiagnosticRecord>,
  pub(crate) err_mode: ErrMode,
  pub(crate) server_info: String,
  pub(crate) server_version: String,
  pub(crate) table_qualification: TableQualification,
}

impl Session {
  pub(crate) fn new(server_info: String, server_version: String) -> Self {
    Self {
      active: true,
      case_mode: CaseMode::Natural,
      diagnostics: Vec::new(),
      err_mode: ErrMode::Silent,
      server_info,
      server_version,
      table_qualification: TableQualification::Off,
    }
  }

  pub(crate) fn attribute(&self, key: &str) -> crate::Result<AttrValue> {
    Ok(match key {
      "caseMode" => AttrValue::CaseMode(self.case_mode),
      "clientVersion" => {
        AttrValue::Str(format!("fbx {}/10", env!("CARGO_PKG_VERSION")))
      }
      "connectionStatus" => AttrValue::Int(u32::from(self.active)),
      "driverName" => AttrValue::Str(DRIVER_NAME.into()),
      "errorMode" => AttrValue::ErrMode(self.err_mode),
      "serverInfo" => AttrValue::Str(self.server_info.clone()),
      "serverVersion" => AttrValue::Str(self.server_version.clone()),
      "tableNameQualification" => AttrValue::TableQualification(self.table_qualification),
      _ => return Err(Error::UnknownAttribute(key.into())),
    })
  }

  pub(crate) fn set_attribute(&mut self, key: &str, value: AttrValue) -> crate::Result<()> {
    match (key, value) {
      ("caseMode", AttrValue::CaseMode(elem)) => {
        self.case_mode = elem;
      }
      ("errorMode", AttrValue::ErrMode(elem)) => {
        self.err_mode = elem;
      }
      ("tableNameQualification", AttrValue::TableQualification(elem)) => {
        self.table_qualification = elem;
      }
      ("caseMode" | "errorMode" | "tableNameQualification", _) => {
        return Err(Error::InvalidAttributeValue(key.into()));
      }
      (
        "clientVersion" | "connectionStatus" | "driverName" | "serverInfo" | "serverVersion",
        _,
      ) => {
        return Err(Error::UnsupportedAttribute(key.into()));
      }
      _ => return Err(Error::UnknownAttribute(key.into())),
    }
    Ok(())
  }

  /// Mode-aware adapter between the hard error path and the sentinel path. Diagnostics are
  /// recorded identically in all three modes, only the surfacing differs.
  pub(crate) fn settle<T>(&mut self, rslt: crate::Result<T>) -> crate::Result<Outcome<T>> {
    match rslt {
      Ok(elem) => {
        self.diagnostics.clear();
        Ok(Outcome::Ok(elem))
      }
      Err(Error::Db(db_error)) if db_error.category() != ErrorCategory::Authentication => {
        self.diagnostics = db_error.records().to_vec();
        match self.err_mode {
          ErrMode::Silent => Ok(Outcome::Failed),
          ErrMode::Warning => {
            tracing::warn!(error = %db_error, "statement failed");
            Ok(Outcome::Failed)
          }
          ErrMode::Exception => Err(Error::Db(db_error)),
        }
      }
      Err(err) => Err(err),
    }
  }
}

//! Prepared statement registry. Callers hold cheap [Stmt] tokens while the actual server
//! handles, column shapes and parameter slots live inside the connection buffer.

use crate::{column::Column, info::StmtType, value::Value, Identifier};
use hashbrown::HashMap;
use std::collections::VecDeque;

/// Token that refers to a statement prepared by a connection. Tokens outlive neither the
/// connection nor its re-establishment, attempts to use one afterwards are rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Stmt {
  pub(crate) generation: u32,
  pub(crate) id: u64,
}

/// Parameter selector used when binding values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BindIdent<'any> {
  /// Named placeholder, with or without the leading colon.
  Name(&'any str),
  /// One-based position.
  Ordinal(usize),
}

impl<'any> From<&'any str> for BindIdent<'any> {
  #[inline]
  fn from(from: &'any str) -> Self {
    Self::Name(from)
  }
}

impl From<usize> for BindIdent<'_> {
  #[inline]
  fn from(from: usize) -> Self {
    Self::Ordinal(from)
  }
}

/// Client-side view of the server cursor of one statement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CursorState {
  /// Never executed, or closed by a re-execute or a transaction boundary.
  Closed,
  /// The server reported the end of the result set.
  Drained,
  /// Rows can still be requested.
  Open,
}

#[derive(Debug)]
pub(crate) struct StatementRecord {
  pub(crate) columns: Vec<Column>,
  pub(crate) cursor: CursorState,
  pub(crate) handle: u32,
  pub(crate) param_names: Vec<Option<Identifier>>,
  pub(crate) pending_rows: VecDeque<Vec<Value>>,
  pub(crate) rows_blr: Vec<u8>,
  pub(crate) slots: Vec<Option<Value>>,
  pub(crate) stmt_type: StmtType,
}

impl StatementRecord {
  pub(crate) fn new(
    handle: u32,
    stmt_type: StmtType,
    columns: Vec<Column>,
    param_names: Vec<Option<Identifier>>,
    rows_blr: Vec<u8>,
  ) -> Self {
    let slots = vec![None; param_names.len()];
    Self {
      columns,
      cursor: CursorState::Closed,
      handle,
      param_names,
      pending_rows: VecDeque::new(),
      rows_blr,
      slots,
      stmt_type,
    }
  }

  /// Stores `value` into every slot selected by `ident`. A named placeholder repeated in the
  /// command selects all of its occurrences.
  pub(crate) fn bind(&mut self, ident: BindIdent<'_>, value: Value) -> crate::Result<()> {
    match ident {
      BindIdent::Name(name) => {
        let name = name.strip_prefix(':').unwrap_or(name);
        let mut found = false;
        for (slot, param_name) in self.slots.iter_mut().zip(&self.param_names) {
          if param_name.as_ref().is_some_and(|elem| elem.as_str() == name) {
            *slot = Some(value.clone());
            found = true;
          }
        }
        if !found {
          return Err(crate::Error::UnknownParameter(name.into()));
        }
      }
      BindIdent::Ordinal(pos) => {
        let idx = pos.wrapping_sub(1);
        let available = self.slots.len();
        let Some(slot) = (pos > 0).then(|| self.slots.get_mut(idx)).flatten() else {
          return Err(crate::Error::ParameterOutOfRange { available, received: pos });
        };
        *slot = Some(value);
      }
    }
    Ok(())
  }

  pub(crate) fn clear_cursor(&mut self) {
    self.cursor = CursorState::Closed;
    self.pending_rows.clear();
  }
}

#[derive(Debug, Default)]
pub(crate) struct Statements {
  generation: u32,
  next_id: u64,
  records: HashMap<u64, StatementRecord>,
}

impl Statements {
  pub(crate) fn clear(&mut self) -> impl Iterator<Item = StatementRecord> + '_ {
    self.generation = self.generation.wrapping_add(1);
    self.records.drain().map(|(_, record)| record)
  }

  pub(crate) fn get(&self, stmt: Stmt) -> crate::Result<&StatementRecord> {
    if stmt.generation != self.generation {
      return Err(crate::Error::StaleStatement);
    }
    self.records.get(&stmt.id).ok_or(crate::Error::StaleStatement)
  }

  pub(crate) fn get_mut(&mut self, stmt: Stmt) -> crate::Result<&mut StatementRecord> {
    if stmt.generation != self.generation {
      return Err(crate::Error::StaleStatement);
    }
    self.records.get_mut(&stmt.id).ok_or(crate::Error::StaleStatement)
  }

  pub(crate) fn insert(&mut self, record: StatementRecord) -> Stmt {
    let id = self.next_id;
    self.next_id = self.next_id.wrapping_add(1);
    let _ = self.records.insert(id, record);
    Stmt { generation: self.generation, id }
  }

  pub(crate) fn remove(&mut self, stmt: Stmt) -> Option<StatementRecord> {
    if stmt.generation != self.generation {
      return None;
    }
    self.records.remove(&stmt.id)
  }

  /// Non-retaining transaction boundaries close every server cursor.
  pub(crate) fn reset_cursors(&mut self) {
    for record in self.records.values_mut() {
      record.clear_cursor();
    }
  }
}

/// Rewrites `:name` placeholders into the positional `?` the server understands, remembering
/// which position carried which name. Quoted literals, quoted identifiers and comments are
/// copied verbatim. Mixing named and positional placeholders in one command is rejected.
pub(crate) fn rewrite_placeholders(cmd: &str) -> crate::Result<(String, Vec<Option<Identifier>>)> {
  let mut out = String::with_capacity(cmd.len());
  let mut names = Vec::new();
  let mut has_named = false;
  let mut has_positional = false;
  let bytes = cmd.as_bytes();
  let mut idx = 0;
  while idx < bytes.len() {
    match bytes[idx] {
      quote @ (b'\'' | b'"') => {
        let end = scan_quoted(bytes, idx, quote);
        out.push_str(&cmd[idx..end]);
        idx = end;
      }
      b'-' if bytes.get(idx.wrapping_add(1)) == Some(&b'-') => {
        let end = scan_until(bytes, idx, b"\n");
        out.push_str(&cmd[idx..end]);
        idx = end;
      }
      b'/' if bytes.get(idx.wrapping_add(1)) == Some(&b'*') => {
        let end = scan_until(bytes, idx.wrapping_add(2), b"*/");
        out.push_str(&cmd[idx..end]);
        idx = end;
      }
      b'?' => {
        has_positional = true;
        names.push(None);
        out.push('?');
        idx = idx.wrapping_add(1);
      }
      b':' if bytes.get(idx.wrapping_add(1)).copied().is_some_and(is_ident_start) => {
        has_named = true;
        let start = idx.wrapping_add(1);
        let mut end = start;
        while bytes.get(end).copied().is_some_and(is_ident_part) {
          end = end.wrapping_add(1);
        }
        let name = Identifier::try_from(&cmd[start..end])
          .map_err(|_err| crate::Error::IdentifierOverflow)?;
        names.push(Some(name));
        out.push('?');
        idx = end;
      }
      _ => {
        let end = idx.wrapping_add(1);
        out.push_str(&cmd[idx..end]);
        idx = end;
      }
    }
  }
  if has_named && has_positional {
    return Err(crate::Error::MixedParameterStyle);
  }
  Ok((out, names))
}

fn is_ident_part(byte: u8) -> bool {
  byte == b'_' || byte == b'$' || byte.is_ascii_alphanumeric()
}

fn is_ident_start(byte: u8) -> bool {
  byte == b'_' || byte.is_ascii_alphabetic()
}

/// Index one past the closing quote, treating a doubled quote as an escape.
fn scan_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
  let mut idx = start.wrapping_add(1);
  while idx < bytes.len() {
    if bytes[idx] == quote {
      if bytes.get(idx.wrapping_add(1)) == Some(&quote) {
        idx = idx.wrapping_add(2);
        continue;
      }
      return idx.wrapping_add(1);
    }
    idx = idx.wrapping_add(1);
  }
  bytes.len()
}

fn scan_until(bytes: &[u8], start: usize, needle: &[u8]) -> usize {
  let mut idx = start;
  while idx < bytes.len() {
    if bytes[idx..].starts_with(needle) {
      return idx.wrapping_add(needle.len());
    }
    idx = idx.wrapping_add(1);
  }
  bytes.len()
}

#[cfg(test)]
mod tests {
  use crate::{
    info::StmtType,
    statements::{rewrite_placeholders, StatementRecord, Statements},
    value::Value,
    BindIdent, Error, Identifier,
  };

  fn record_with_params(names: &[Option<&str>]) -> StatementRecord {
    let param_names = names
      .iter()
      .map(|opt| opt.map(|name| Identifier::try_from(name).unwrap()))
      .collect();
    StatementRecord::new(1, StmtType::Select, Vec::new(), param_names, Vec::new())
  }

  #[test]
  fn named_placeholders_become_positional() {
    let (sql, names) =
      rewrite_placeholders("SELECT id FROM testuser WHERE name = :name AND age > :age").unwrap();
    assert_eq!(sql, "SELECT id FROM testuser WHERE name = ? AND age > ?");
    assert_eq!(names.len(), 2);
    assert_eq!(names[0].as_deref(), Some("name"));
    assert_eq!(names[1].as_deref(), Some("age"));
  }

  #[test]
  fn placeholders_inside_literals_and_comments_are_untouched() {
    let (sql, names) = rewrite_placeholders(
      "SELECT ':a' AS x, \"b?\" FROM t /* :c */ WHERE v = :v -- :d\n AND w = 'it''s :e'",
    )
    .unwrap();
    assert_eq!(
      sql,
      "SELECT ':a' AS x, \"b?\" FROM t /* :c */ WHERE v = ? -- :d\n AND w = 'it''s :e'"
    );
    assert_eq!(names.len(), 1);
    assert_eq!(names[0].as_deref(), Some("v"));
  }

  #[test]
  fn mixed_styles_are_rejected() {
    let rslt = rewrite_placeholders("UPDATE t SET a = ? WHERE b = :b");
    assert!(matches!(rslt, Err(Error::MixedParameterStyle)));
  }

  #[test]
  fn named_binding_fills_every_occurrence() {
    let mut record = record_with_params(&[Some("a"), Some("b"), Some("a")]);
    record.bind(BindIdent::Name(":a"), Value::I32(5)).unwrap();
    assert_eq!(record.slots[0], Some(Value::I32(5)));
    assert_eq!(record.slots[1], None);
    assert_eq!(record.slots[2], Some(Value::I32(5)));
    let rslt = record.bind(BindIdent::Name("missing"), Value::Null);
    assert!(matches!(rslt, Err(Error::UnknownParameter(_))));
  }

  #[test]
  fn ordinal_binding_is_one_based_and_bounded() {
    let mut record = record_with_params(&[None, None]);
    record.bind(BindIdent::Ordinal(2), Value::Text("x".into())).unwrap();
    assert_eq!(record.slots[1], Some(Value::Text("x".into())));
    let rslt = record.bind(BindIdent::Ordinal(0), Value::Null);
    assert!(matches!(rslt, Err(Error::ParameterOutOfRange { available: 2, received: 0 })));
    let rslt = record.bind(BindIdent::Ordinal(3), Value::Null);
    assert!(matches!(rslt, Err(Error::ParameterOutOfRange { available: 2, received: 3 })));
  }

  #[test]
  fn stale_tokens_are_rejected_after_clear() {
    let mut stmts = Statements::default();
    let stmt = stmts.insert(record_with_params(&[]));
    assert!(stmts.get(stmt).is_ok());
    let _ = stmts.clear().count();
    assert!(matches!(stmts.get(stmt), Err(Error::StaleStatement)));
  }
}

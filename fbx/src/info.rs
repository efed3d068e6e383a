//! Info requests and their responses. Unlike the surrounding XDR stream, info buffers are
//! sequences of `(item, little-endian u16 length, data)` clusters with little-endian integer
//! payloads, a layout kept verbatim from the ISC status API.

use crate::{ty::Ty, Column, Identifier};

const END: u8 = 1;
const TRUNCATED: u8 = 2;
const ERROR: u8 = 3;

const SQL_SELECT: u8 = 4;
const SQL_DESCRIBE_VARS: u8 = 7;
const SQL_DESCRIBE_END: u8 = 8;
const SQL_SQLDA_SEQ: u8 = 9;
const SQL_TYPE: u8 = 11;
const SQL_SUB_TYPE: u8 = 12;
const SQL_SCALE: u8 = 13;
const SQL_LENGTH: u8 = 14;
const SQL_NULL_IND: u8 = 15;
const SQL_FIELD: u8 = 16;
const SQL_RELATION: u8 = 17;
const SQL_OWNER: u8 = 18;
const SQL_ALIAS: u8 = 19;
const SQL_STMT_TYPE: u8 = 21;
const SQL_RECORDS: u8 = 23;

const REQ_INSERT_COUNT: u8 = 14;
const REQ_UPDATE_COUNT: u8 = 15;
const REQ_DELETE_COUNT: u8 = 16;

const DB_IMPLEMENTATION: u8 = 11;
const DB_VERSION: u8 = 12;

/// Requested on every prepare: the statement kind plus the full output column description.
pub(crate) const PREPARE_ITEMS: &[u8] = &[
  SQL_STMT_TYPE,
  SQL_SELECT,
  SQL_DESCRIBE_VARS,
  SQL_SQLDA_SEQ,
  SQL_TYPE,
  SQL_SUB_TYPE,
  SQL_SCALE,
  SQL_LENGTH,
  SQL_NULL_IND,
  SQL_FIELD,
  SQL_RELATION,
  SQL_OWNER,
  SQL_ALIAS,
  SQL_DESCRIBE_END,
];

pub(crate) const RECORDS_ITEMS: &[u8] = &[SQL_RECORDS];

pub(crate) const DB_ITEMS: &[u8] = &[DB_VERSION, DB_IMPLEMENTATION];

/// Kind of a prepared statement as reported by the server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StmtType {
  Ddl,
  Delete,
  Insert,
  Other,
  Select,
  Update,
}

impl StmtType {
  fn from_code(code: i64) -> Self {
    match code {
      1 => Self::Select,
      2 => Self::Insert,
      3 => Self::Update,
      4 => Self::Delete,
      5 => Self::Ddl,
      _ => Self::Other,
    }
  }
}

#[derive(Debug)]
pub(crate) struct PrepareInfo {
  pub(crate) columns: Vec<Column>,
  pub(crate) stmt_type: StmtType,
}

pub(crate) fn parse_prepare_info(data: &[u8]) -> crate::Result<PrepareInfo> {
  let mut parser = InfoParser { data, idx: 0 };
  let mut stmt_type = StmtType::Other;
  let mut columns = Vec::new();
  let mut acc = VarAcc::default();
  loop {
    match parser.byte()? {
      END => break,
      TRUNCATED | ERROR => return Err(crate::Error::TruncatedInfoResponse),
      // Bare markers without a length word.
      SQL_SELECT => {}
      SQL_DESCRIBE_END => {
        acc.finish(&mut columns)?;
      }
      SQL_STMT_TYPE => {
        stmt_type = StmtType::from_code(le_int(parser.cluster()?));
      }
      SQL_SQLDA_SEQ => {
        acc.finish(&mut columns)?;
        let _seq = le_int(parser.cluster()?);
        acc.active = true;
      }
      SQL_TYPE => {
        acc.code = u16::try_from(le_int(parser.cluster()?))?;
      }
      SQL_SCALE => {
        acc.scale = i32::try_from(le_int(parser.cluster()?))?;
      }
      SQL_LENGTH => {
        acc.length = u16::try_from(le_int(parser.cluster()?))?;
      }
      SQL_NULL_IND => {
        acc.nullable = le_int(parser.cluster()?) != 0;
      }
      SQL_FIELD => {
        acc.name = identifier(parser.cluster()?)?;
      }
      SQL_RELATION => {
        acc.relation = identifier(parser.cluster()?)?;
      }
      SQL_ALIAS => {
        acc.alias = identifier(parser.cluster()?)?;
      }
      SQL_DESCRIBE_VARS | SQL_SUB_TYPE | SQL_OWNER => {
        let _ignored = parser.cluster()?;
      }
      _ => {
        let _ignored = parser.cluster()?;
      }
    }
  }
  acc.finish(&mut columns)?;
  Ok(PrepareInfo { columns, stmt_type })
}

/// Sums the insert, update and delete counts of an `SQL_RECORDS` reply.
pub(crate) fn parse_affected_rows(data: &[u8]) -> crate::Result<u64> {
  let mut parser = InfoParser { data, idx: 0 };
  let mut rows: u64 = 0;
  loop {
    match parser.byte()? {
      END => break,
      TRUNCATED | ERROR => return Err(crate::Error::TruncatedInfoResponse),
      SQL_RECORDS => {
        let inner_bytes = parser.cluster()?;
        let mut inner = InfoParser { data: inner_bytes, idx: 0 };
        loop {
          match inner.byte()? {
            END => break,
            REQ_INSERT_COUNT | REQ_UPDATE_COUNT | REQ_DELETE_COUNT => {
              rows = rows.wrapping_add(u64::try_from(le_int(inner.cluster()?)).unwrap_or(0));
            }
            _ => {
              let _ignored = inner.cluster()?;
            }
          }
        }
      }
      _ => {
        let _ignored = parser.cluster()?;
      }
    }
  }
  Ok(rows)
}

#[derive(Debug)]
pub(crate) struct DbInfo {
  pub(crate) implementation: String,
  pub(crate) version: String,
}

pub(crate) fn parse_db_info(data: &[u8]) -> crate::Result<DbInfo> {
  let mut parser = InfoParser { data, idx: 0 };
  let mut implementation = String::new();
  let mut version = String::new();
  loop {
    match parser.byte()? {
      END => break,
      TRUNCATED | ERROR => return Err(crate::Error::TruncatedInfoResponse),
      DB_VERSION => {
        // Payload: entry count, string length, string bytes.
        if let [_count, len, rest @ ..] = parser.cluster()? {
          let bytes = rest.get(..usize::from(*len)).unwrap_or(rest);
          version = crate::misc::from_utf8_basic(bytes)?.into();
        }
      }
      DB_IMPLEMENTATION => {
        if let [_count, code, class, ..] = parser.cluster()? {
          implementation = format!("implementation {code}/{class}");
        }
      }
      _ => {
        let _ignored = parser.cluster()?;
      }
    }
  }
  Ok(DbInfo { implementation, version })
}

#[derive(Debug, Default)]
struct VarAcc {
  active: bool,
  alias: Identifier,
  code: u16,
  length: u16,
  name: Identifier,
  nullable: bool,
  relation: Identifier,
  scale: i32,
}

impl VarAcc {
  fn finish(&mut self, columns: &mut Vec<Column>) -> crate::Result<()> {
    if !self.active {
      return Ok(());
    }
    let this = core::mem::take(self);
    let (ty, nullable) = Ty::from_sqlda(this.code)?;
    columns.push(Column {
      alias: this.alias,
      length: this.length,
      name: this.name,
      nullable: nullable || this.nullable,
      relation: this.relation,
      scale: this.scale,
      ty,
    });
    Ok(())
  }
}

struct InfoParser<'data> {
  data: &'data [u8],
  idx: usize,
}

impl<'data> InfoParser<'data> {
  fn byte(&mut self) -> crate::Result<u8> {
    let byte = *self.data.get(self.idx).ok_or(crate::Error::TruncatedInfoResponse)?;
    self.idx = self.idx.wrapping_add(1);
    Ok(byte)
  }

  fn cluster(&mut self) -> crate::Result<&'data [u8]> {
    let [a, b] = [self.byte()?, self.byte()?];
    let len = usize::from(u16::from_le_bytes([a, b]));
    let bytes = self
      .data
      .get(self.idx..self.idx.wrapping_add(len))
      .ok_or(crate::Error::TruncatedInfoResponse)?;
    self.idx = self.idx.wrapping_add(len);
    Ok(bytes)
  }
}

fn identifier(bytes: &[u8]) -> crate::Result<Identifier> {
  let str = crate::misc::from_utf8_basic(bytes)?;
  Identifier::try_from(str).map_err(|_err| crate::Error::IdentifierOverflow)
}

fn le_int(bytes: &[u8]) -> i64 {
  let mut array = [0u8; 8];
  let len = bytes.len().min(8);
  array.get_mut(..len).unwrap_or_default().copy_from_slice(bytes.get(..len).unwrap_or_default());
  i64::from_le_bytes(array)
}

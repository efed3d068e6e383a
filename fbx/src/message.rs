//! Server-to-client message reading. The stream is not framed with lengths, so every element
//! is consumed incrementally according to the grammar of the expected operation.

use crate::{
  db_error::{DbError, DiagnosticRecord, Severity},
  misc::{from_utf8_basic, xdr_pad, Stream},
  protocol::{OP_DUMMY, OP_RESPONSE},
};

const ARG_END: u32 = 0;
const ARG_GDS: u32 = 1;
const ARG_STRING: u32 = 2;
const ARG_NUMBER: u32 = 4;
const ARG_INTERPRETED: u32 = 5;
const ARG_WARNING: u32 = 18;
const ARG_SQL_STATE: u32 = 19;

/// Generic reply carrying an object handle, an opaque info buffer and any warnings attached
/// to the status vector.
#[derive(Debug)]
pub(crate) struct Response {
  pub(crate) data: Vec<u8>,
  pub(crate) handle: u32,
  pub(crate) warnings: Vec<DiagnosticRecord>,
}

pub(crate) async fn read_u32<S>(stream: &mut S) -> crate::Result<u32>
where
  S: Stream,
{
  let mut bytes = [0; 4];
  stream.read_exact(&mut bytes).await?;
  Ok(u32::from_be_bytes(bytes))
}

pub(crate) async fn read_i32<S>(stream: &mut S) -> crate::Result<i32>
where
  S: Stream,
{
  let mut bytes = [0; 4];
  stream.read_exact(&mut bytes).await?;
  Ok(i32::from_be_bytes(bytes))
}

pub(crate) async fn read_u64<S>(stream: &mut S) -> crate::Result<u64>
where
  S: Stream,
{
  let mut bytes = [0; 8];
  stream.read_exact(&mut bytes).await?;
  Ok(u64::from_be_bytes(bytes))
}

pub(crate) async fn read_i64<S>(stream: &mut S) -> crate::Result<i64>
where
  S: Stream,
{
  let mut bytes = [0; 8];
  stream.read_exact(&mut bytes).await?;
  Ok(i64::from_be_bytes(bytes))
}

/// `len` bytes followed by the padding that realigns the stream.
pub(crate) async fn read_padded<S>(stream: &mut S, len: usize) -> crate::Result<Vec<u8>>
where
  S: Stream,
{
  let mut bytes = vec![0; len.wrapping_add(xdr_pad(len))];
  stream.read_exact(&mut bytes).await?;
  bytes.truncate(len);
  Ok(bytes)
}

pub(crate) async fn read_xdr_bytes<S>(stream: &mut S) -> crate::Result<Vec<u8>>
where
  S: Stream,
{
  let len = read_u32(stream).await?;
  read_padded(stream, usize::try_from(len)?).await
}

/// Next operation code, transparently skipping keep-alive packets.
pub(crate) async fn next_op<S>(stream: &mut S) -> crate::Result<u32>
where
  S: Stream,
{
  loop {
    let op = read_u32(stream).await?;
    if op != OP_DUMMY {
      return Ok(op);
    }
  }
}

/// Reads a whole [Response], turning an error-carrying status vector into [`crate::Error::Db`].
pub(crate) async fn read_response<S>(stream: &mut S) -> crate::Result<Response>
where
  S: Stream,
{
  let op = next_op(stream).await?;
  if op != OP_RESPONSE {
    return Err(crate::Error::UnexpectedDatabaseMessage { received: op });
  }
  read_response_body(stream).await
}

/// Same as [read_response] for flows where the operation code was already consumed.
pub(crate) async fn read_response_body<S>(stream: &mut S) -> crate::Result<Response>
where
  S: Stream,
{
  let handle = read_u32(stream).await?;
  // Object id slot, unused by the flows this client issues.
  let _object_id = read_u64(stream).await?;
  let data = read_xdr_bytes(stream).await?;
  let records = read_status_vector(stream).await?;
  let (warnings, errors): (Vec<_>, Vec<_>) =
    records.into_iter().partition(|record| record.severity == Severity::Warning);
  if !errors.is_empty() {
    let mut all = warnings;
    all.extend(errors);
    return Err(DbError::new(all).into());
  }
  Ok(Response { data, handle, warnings })
}

async fn read_status_vector<S>(stream: &mut S) -> crate::Result<Vec<DiagnosticRecord>>
where
  S: Stream,
{
  let mut records: Vec<DiagnosticRecord> = Vec::new();
  let mut current: Option<DiagnosticRecord> = None;
  loop {
    match read_u32(stream).await? {
      ARG_END => break,
      arg @ (ARG_GDS | ARG_WARNING) => {
        let code = read_u32(stream).await?;
        if let Some(record) = current.take() {
          records.push(record);
        }
        // A zero code is the "success" filler of an empty vector.
        if code != 0 {
          current = Some(DiagnosticRecord {
            code,
            severity: if arg == ARG_WARNING { Severity::Warning } else { Severity::Error },
            message: String::new(),
          });
        }
      }
      ARG_STRING | ARG_INTERPRETED | ARG_SQL_STATE => {
        let bytes = read_xdr_bytes(stream).await?;
        if let Some(record) = current.as_mut() {
          if !record.message.is_empty() {
            record.message.push(' ');
          }
          record.message.push_str(from_utf8_basic(&bytes)?);
        }
      }
      ARG_NUMBER => {
        let num = read_i32(stream).await?;
        if let Some(record) = current.as_mut() {
          if !record.message.is_empty() {
            record.message.push(' ');
          }
          record.message.push_str(num.to_string().as_str());
        }
      }
      _ => {
        let _unknown_scalar = read_u32(stream).await?;
      }
    }
  }
  if let Some(record) = current.take() {
    records.push(record);
  }
  Ok(records)
}

//! BLR message descriptors. The input message format is declared by the client from the bound
//! values themselves, so no coercion to the server-described parameter types is needed; the
//! server converts on its side. Each declared variable is followed by a `short` null word.

use crate::{
  column::Column,
  misc::xdr_pad,
  ty::{blr_codes, Ty},
  value::Value,
};

const NULL_FLAG: [u8; 4] = i32::to_be_bytes(-1);
const NOT_NULL_FLAG: [u8; 4] = [0; 4];

/// Message format declaration plus the matching row of values, ready to be appended to an
/// execute frame.
#[derive(Debug, Default)]
pub(crate) struct ParamsMsg {
  pub(crate) blr: Vec<u8>,
  pub(crate) data: Vec<u8>,
}

pub(crate) fn params_msg(values: &[Value]) -> crate::Result<ParamsMsg> {
  if values.is_empty() {
    return Ok(ParamsMsg::default());
  }
  let mut blr = Vec::new();
  let mut data = Vec::new();
  blr.extend_from_slice(&[blr_codes::VERSION5, blr_codes::BEGIN, blr_codes::MESSAGE, 0]);
  let vars = u16::try_from(values.len())?.wrapping_mul(2);
  blr.extend_from_slice(&vars.to_le_bytes());
  for value in values {
    let mut null = false;
    match value {
      Value::Boolean(elem) => {
        blr.push(blr_codes::BOOL);
        data.extend_from_slice(&[u8::from(*elem), 0, 0, 0]);
      }
      #[cfg(feature = "chrono")]
      Value::Date(elem) => {
        blr.push(blr_codes::SQL_DATE);
        data.extend_from_slice(&crate::value::time::encode_date(*elem).to_be_bytes());
      }
      Value::F32(elem) => {
        blr.push(blr_codes::FLOAT);
        data.extend_from_slice(&elem.to_be_bytes());
      }
      Value::F64(elem) => {
        blr.push(blr_codes::DOUBLE);
        data.extend_from_slice(&elem.to_be_bytes());
      }
      Value::I16(elem) => {
        blr.extend_from_slice(&[blr_codes::LONG, 0]);
        data.extend_from_slice(&i32::from(*elem).to_be_bytes());
      }
      Value::I32(elem) => {
        blr.extend_from_slice(&[blr_codes::LONG, 0]);
        data.extend_from_slice(&elem.to_be_bytes());
      }
      Value::I64(elem) => {
        blr.extend_from_slice(&[blr_codes::INT64, 0]);
        data.extend_from_slice(&elem.to_be_bytes());
      }
      Value::Null => {
        blr.extend_from_slice(&[blr_codes::TEXT, 0, 0]);
        null = true;
      }
      Value::Text(elem) => {
        let len = u16::try_from(elem.len())?;
        blr.push(blr_codes::TEXT);
        blr.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(elem.as_bytes());
        data.extend_from_slice(&[0, 0, 0][..xdr_pad(elem.len())]);
      }
      #[cfg(feature = "chrono")]
      Value::Time(elem) => {
        blr.push(blr_codes::SQL_TIME);
        data.extend_from_slice(&crate::value::time::encode_time(*elem).to_be_bytes());
      }
      #[cfg(feature = "chrono")]
      Value::Timestamp(elem) => {
        blr.push(blr_codes::TIMESTAMP);
        data.extend_from_slice(&crate::value::time::encode_date(elem.date()).to_be_bytes());
        data.extend_from_slice(&crate::value::time::encode_time(elem.time()).to_be_bytes());
      }
    }
    blr.extend_from_slice(&[blr_codes::SHORT, 0]);
    data.extend_from_slice(if null { &NULL_FLAG } else { &NOT_NULL_FLAG });
  }
  blr.extend_from_slice(&[blr_codes::END, blr_codes::EOC]);
  Ok(ParamsMsg { blr, data })
}

/// Output message format requested on fetches, mirroring the server-described columns.
pub(crate) fn rows_msg_blr(columns: &[Column]) -> crate::Result<Vec<u8>> {
  let mut blr = Vec::new();
  blr.extend_from_slice(&[blr_codes::VERSION5, blr_codes::BEGIN, blr_codes::MESSAGE, 0]);
  let vars = u16::try_from(columns.len())?.wrapping_mul(2);
  blr.extend_from_slice(&vars.to_le_bytes());
  for column in columns {
    let scale = i8::try_from(column.scale).unwrap_or_default().to_le_bytes()[0];
    match column.ty {
      Ty::Boolean => blr.push(blr_codes::BOOL),
      Ty::Char => {
        blr.push(blr_codes::TEXT);
        blr.extend_from_slice(&column.length.to_le_bytes());
      }
      Ty::Date => blr.push(blr_codes::SQL_DATE),
      Ty::Double => blr.push(blr_codes::DOUBLE),
      Ty::Float => blr.push(blr_codes::FLOAT),
      Ty::Int64 => blr.extend_from_slice(&[blr_codes::INT64, scale]),
      Ty::Long => blr.extend_from_slice(&[blr_codes::LONG, scale]),
      Ty::Short => blr.extend_from_slice(&[blr_codes::SHORT, scale]),
      Ty::Time => blr.push(blr_codes::SQL_TIME),
      Ty::Timestamp => blr.push(blr_codes::TIMESTAMP),
      Ty::Varchar => {
        blr.push(blr_codes::VARYING);
        blr.extend_from_slice(&column.length.to_le_bytes());
      }
    }
    blr.extend_from_slice(&[blr_codes::SHORT, 0]);
  }
  blr.extend_from_slice(&[blr_codes::END, blr_codes::EOC]);
  Ok(blr)
}

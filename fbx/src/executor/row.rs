//! Decoding of one fetched row. Every value travels XDR-aligned and is followed by a 4-byte
//! null indicator word, nullability is therefore resolved after the value bytes were consumed.

use crate::{column::Column, message, misc::Stream, ty::Ty, value::Value};

pub(crate) async fn read_row<S>(stream: &mut S, columns: &[Column]) -> crate::Result<Vec<Value>>
where
  S: Stream,
{
  let mut values = Vec::with_capacity(columns.len());
  for column in columns {
    let value = read_value(stream, column).await?;
    let is_null = message::read_i32(stream).await? != 0;
    values.push(if is_null { Value::Null } else { value });
  }
  Ok(values)
}

async fn read_value<S>(stream: &mut S, column: &Column) -> crate::Result<Value>
where
  S: Stream,
{
  Ok(match column.ty {
    Ty::Boolean => {
      let bytes = message::read_padded(stream, 1).await?;
      Value::Boolean(bytes.first().copied().unwrap_or_default() != 0)
    }
    Ty::Char => {
      let bytes = message::read_padded(stream, usize::from(column.length)).await?;
      Value::Text(crate::misc::from_utf8_basic(&bytes)?.into())
    }
    Ty::Date => date_value(message::read_i32(stream).await?)?,
    Ty::Double => Value::F64(f64::from_bits(message::read_u64(stream).await?)),
    Ty::Float => Value::F32(f32::from_bits(message::read_u32(stream).await?)),
    Ty::Int64 => Value::scaled(message::read_i64(stream).await?, column.scale),
    Ty::Long | Ty::Short => {
      Value::scaled(message::read_i32(stream).await?.into(), column.scale)
    }
    Ty::Time => time_value(message::read_u32(stream).await?)?,
    Ty::Timestamp => {
      let date_wire = message::read_i32(stream).await?;
      let time_wire = message::read_u32(stream).await?;
      timestamp_value(date_wire, time_wire)?
    }
    Ty::Varchar => Value::Text(crate::misc::from_utf8_basic(
      &message::read_xdr_bytes(stream).await?,
    )?.into()),
  })
}

#[cfg(feature = "chrono")]
fn date_value(wire: i32) -> crate::Result<Value> {
  Ok(Value::Date(
    crate::value::time::decode_date(wire).ok_or(crate::Error::InvalidTemporalValue)?,
  ))
}

#[cfg(not(feature = "chrono"))]
fn date_value(_wire: i32) -> crate::Result<Value> {
  Err(crate::Error::UnsupportedColumnType(570))
}

#[cfg(feature = "chrono")]
fn time_value(wire: u32) -> crate::Result<Value> {
  Ok(Value::Time(
    crate::value::time::decode_time(wire).ok_or(crate::Error::InvalidTemporalValue)?,
  ))
}

#[cfg(not(feature = "chrono"))]
fn time_value(_wire: u32) -> crate::Result<Value> {
  Err(crate::Error::UnsupportedColumnType(560))
}

#[cfg(feature = "chrono")]
fn timestamp_value(date_wire: i32, time_wire: u32) -> crate::Result<Value> {
  Ok(Value::Timestamp(
    crate::value::time::decode_timestamp(date_wire, time_wire)
      .ok_or(crate::Error::InvalidTemporalValue)?,
  ))
}

#[cfg(not(feature = "chrono"))]
fn timestamp_value(_date_wire: i32, _time_wire: u32) -> crate::Result<Value> {
  Err(crate::Error::UnsupportedColumnType(510))
}

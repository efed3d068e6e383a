use crate::{
  db_error::{DbError, CONVERT_ERR},
  ty::Ty,
};

/// A typed column or parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  /// Boolean
  Boolean(bool),
  #[cfg(feature = "chrono")]
  /// Date without a time component
  Date(chrono::NaiveDate),
  /// 64-bit float
  F64(f64),
  /// 32-bit float
  F32(f32),
  /// 16-bit integer
  I16(i16),
  /// 32-bit integer
  I32(i32),
  /// 64-bit integer
  I64(i64),
  /// Absent value
  Null,
  /// Character data
  Text(String),
  #[cfg(feature = "chrono")]
  /// Time without a date component
  Time(chrono::NaiveTime),
  #[cfg(feature = "chrono")]
  /// Date and time without an offset
  Timestamp(chrono::NaiveDateTime),
}

impl Value {
  /// `true` for [`Value::Null`].
  #[inline]
  pub fn is_null(&self) -> bool {
    matches!(self, Self::Null)
  }

  /// Converts the value into the representation of a declared parameter type. Nulls pass
  /// through regardless of the declared type.
  #[allow(clippy::cast_precision_loss, reason = "declared float targets accept rounding")]
  pub(crate) fn coerce(self, ty: Ty) -> crate::Result<Self> {
    let mismatch = |value: &Self| {
      crate::Error::from(DbError::client(
        CONVERT_ERR,
        format!("{value:?} cannot take the declared type {ty:?}"),
      ))
    };
    if self.is_null() {
      return Ok(self);
    }
    Ok(match ty {
      Ty::Boolean => match self {
        Self::Boolean(_) => self,
        Self::I16(int) => Self::Boolean(int != 0),
        Self::I32(int) => Self::Boolean(int != 0),
        Self::I64(int) => Self::Boolean(int != 0),
        _ => return Err(mismatch(&self)),
      },
      Ty::Char | Ty::Varchar => match self {
        Self::Boolean(elem) => Self::Text(if elem { "true" } else { "false" }.into()),
        Self::F32(num) => Self::Text(num.to_string()),
        Self::F64(num) => Self::Text(num.to_string()),
        Self::I16(int) => Self::Text(int.to_string()),
        Self::I32(int) => Self::Text(int.to_string()),
        Self::I64(int) => Self::Text(int.to_string()),
        Self::Text(_) => self,
        _ => return Err(mismatch(&self)),
      },
      Ty::Double => match self {
        Self::F32(num) => Self::F64(num.into()),
        Self::F64(_) => self,
        Self::I16(int) => Self::F64(int.into()),
        Self::I32(int) => Self::F64(int.into()),
        Self::I64(int) => Self::F64(int as f64),
        Self::Text(ref text) => Self::F64(text.parse().map_err(|_err| mismatch(&self))?),
        _ => return Err(mismatch(&self)),
      },
      Ty::Float => match self {
        Self::F32(_) => self,
        Self::I16(int) => Self::F32(int.into()),
        Self::Text(ref text) => Self::F32(text.parse().map_err(|_err| mismatch(&self))?),
        _ => return Err(mismatch(&self)),
      },
      Ty::Int64 => match self {
        Self::I16(int) => Self::I64(int.into()),
        Self::I32(int) => Self::I64(int.into()),
        Self::I64(_) => self,
        Self::Text(ref text) => Self::I64(text.parse().map_err(|_err| mismatch(&self))?),
        _ => return Err(mismatch(&self)),
      },
      Ty::Long => match self {
        Self::I16(int) => Self::I32(int.into()),
        Self::I32(_) => self,
        Self::I64(int) => Self::I32(int.try_into().map_err(|_err| mismatch(&self))?),
        Self::Text(ref text) => Self::I32(text.parse().map_err(|_err| mismatch(&self))?),
        _ => return Err(mismatch(&self)),
      },
      Ty::Short => match self {
        Self::I16(_) => self,
        Self::I32(int) => Self::I16(int.try_into().map_err(|_err| mismatch(&self))?),
        Self::I64(int) => Self::I16(int.try_into().map_err(|_err| mismatch(&self))?),
        Self::Text(ref text) => Self::I16(text.parse().map_err(|_err| mismatch(&self))?),
        _ => return Err(mismatch(&self)),
      },
      #[cfg(feature = "chrono")]
      Ty::Date => match self {
        Self::Date(_) => self,
        _ => return Err(mismatch(&self)),
      },
      #[cfg(feature = "chrono")]
      Ty::Time => match self {
        Self::Time(_) => self,
        _ => return Err(mismatch(&self)),
      },
      #[cfg(feature = "chrono")]
      Ty::Timestamp => match self {
        Self::Timestamp(_) => self,
        _ => return Err(mismatch(&self)),
      },
      #[cfg(not(feature = "chrono"))]
      Ty::Date | Ty::Time | Ty::Timestamp => return Err(mismatch(&self)),
    })
  }

  /// Scaled integers are surfaced as floats when the described scale is negative.
  #[inline]
  pub(crate) fn scaled(int: i64, scale: i32) -> Self {
    if scale == 0 {
      Self::I64(int)
    } else {
      #[allow(clippy::cast_precision_loss, reason = "scaled numerics are rendered as doubles")]
      Self::F64(int as f64 * 10f64.powi(scale))
    }
  }
}

impl From<bool> for Value {
  #[inline]
  fn from(from: bool) -> Self {
    Self::Boolean(from)
  }
}

impl From<f32> for Value {
  #[inline]
  fn from(from: f32) -> Self {
    Self::F32(from)
  }
}

impl From<f64> for Value {
  #[inline]
  fn from(from: f64) -> Self {
    Self::F64(from)
  }
}

impl From<i16> for Value {
  #[inline]
  fn from(from: i16) -> Self {
    Self::I16(from)
  }
}

impl From<i32> for Value {
  #[inline]
  fn from(from: i32) -> Self {
    Self::I32(from)
  }
}

impl From<i64> for Value {
  #[inline]
  fn from(from: i64) -> Self {
    Self::I64(from)
  }
}

impl From<&str> for Value {
  #[inline]
  fn from(from: &str) -> Self {
    Self::Text(from.into())
  }
}

impl From<String> for Value {
  #[inline]
  fn from(from: String) -> Self {
    Self::Text(from)
  }
}

impl<T> From<Option<T>> for Value
where
  T: Into<Value>,
{
  #[inline]
  fn from(from: Option<T>) -> Self {
    match from {
      None => Self::Null,
      Some(elem) => elem.into(),
    }
  }
}

#[cfg(feature = "chrono")]
pub(crate) mod time {
  //! The wire represents dates as days since 1858-11-17 (the Modified Julian Day epoch) and
  //! times as the number of 100-microsecond fractions elapsed since midnight.

  use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

  const FRACTIONS_PER_SEC: u32 = 10_000;

  pub(crate) fn decode_date(wire: i32) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1858, 11, 17)?;
    if wire >= 0 {
      epoch.checked_add_days(Days::new(u64::try_from(wire).ok()?))
    } else {
      epoch.checked_sub_days(Days::new(u64::try_from(wire.checked_neg()?).ok()?))
    }
  }

  pub(crate) fn decode_time(wire: u32) -> Option<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(
      wire / FRACTIONS_PER_SEC,
      (wire % FRACTIONS_PER_SEC).checked_mul(100_000)?,
    )
  }

  pub(crate) fn decode_timestamp(date_wire: i32, time_wire: u32) -> Option<NaiveDateTime> {
    Some(decode_date(date_wire)?.and_time(decode_time(time_wire)?))
  }

  pub(crate) fn encode_date(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1858, 11, 17).unwrap_or_default();
    i32::try_from(date.signed_duration_since(epoch).num_days()).unwrap_or_default()
  }

  pub(crate) fn encode_time(time: NaiveTime) -> u32 {
    time
      .num_seconds_from_midnight()
      .wrapping_mul(FRACTIONS_PER_SEC)
      .wrapping_add(time.nanosecond() / 100_000)
  }
}

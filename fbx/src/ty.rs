/// SQLDA data types described by the server during prepare.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Ty {
  /// BOOLEAN
  Boolean,
  /// CHAR
  Char,
  /// DATE
  Date,
  /// DOUBLE PRECISION
  Double,
  /// FLOAT
  Float,
  /// BIGINT
  Int64,
  /// INTEGER
  Long,
  /// SMALLINT
  Short,
  /// TIME
  Time,
  /// TIMESTAMP
  Timestamp,
  /// VARCHAR
  Varchar,
}

impl Ty {
  /// The SQLDA code carries the nullability flag in its least significant bit.
  #[inline]
  pub(crate) fn from_sqlda(code: u16) -> crate::Result<(Self, bool)> {
    let nullable = code & 1 == 1;
    let this = match code & !1 {
      448 => Self::Varchar,
      452 => Self::Char,
      480 => Self::Double,
      482 => Self::Float,
      496 => Self::Long,
      500 => Self::Short,
      510 => Self::Timestamp,
      560 => Self::Time,
      570 => Self::Date,
      580 => Self::Int64,
      32764 => Self::Boolean,
      _ => return Err(crate::Error::UnsupportedColumnType(code)),
    };
    Ok((this, nullable))
  }
}

pub(crate) mod blr_codes {
  pub(crate) const BEGIN: u8 = 2;
  pub(crate) const BOOL: u8 = 23;
  pub(crate) const DOUBLE: u8 = 27;
  pub(crate) const END: u8 = 255;
  pub(crate) const EOC: u8 = 76;
  pub(crate) const FLOAT: u8 = 10;
  pub(crate) const INT64: u8 = 16;
  pub(crate) const LONG: u8 = 8;
  pub(crate) const MESSAGE: u8 = 4;
  pub(crate) const SHORT: u8 = 7;
  pub(crate) const SQL_DATE: u8 = 12;
  pub(crate) const SQL_TIME: u8 = 13;
  pub(crate) const TEXT: u8 = 14;
  pub(crate) const TIMESTAMP: u8 = 35;
  pub(crate) const VARYING: u8 = 37;
  pub(crate) const VERSION5: u8 = 5;
}

#[cfg(test)]
mod tests {
  use crate::ty::Ty;

  #[test]
  fn sqlda_codes_carry_nullability_in_the_low_bit() {
    assert_eq!(Ty::from_sqlda(448).unwrap(), (Ty::Varchar, false));
    assert_eq!(Ty::from_sqlda(449).unwrap(), (Ty::Varchar, true));
    assert_eq!(Ty::from_sqlda(497).unwrap(), (Ty::Long, true));
    assert!(matches!(Ty::from_sqlda(520), Err(crate::Error::UnsupportedColumnType(520))));
  }
}

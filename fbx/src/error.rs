use crate::db_error::DbError;
use core::fmt::{Debug, Display, Formatter};

/// Grouped individual errors
#[derive(Debug)]
pub enum Error {
  // External - Std
  //
  IoError(std::io::Error),
  TryFromIntError(core::num::TryFromIntError),
  Utf8Error(core::str::Utf8Error),

  // Firebird
  //
  /// Data-level failure reported by the server or by client-side encoding, carrying the full
  /// ordered list of diagnostic records.
  Db(Box<DbError>),

  // Generic
  //
  /// An operation was issued after [`crate::Executor::close`]. Checked before any statement
  /// lookup, so statement tokens used after a close surface this variant rather than
  /// [`Error::StaleStatement`].
  ClosedConnection,
  /// The server did not accept any of the proposed protocol versions.
  ConnectionRejected,
  /// A database identifier is larger than [`crate::Identifier`] allows.
  IdentifierOverflow,
  /// The value passed to a recognized attribute has the wrong type or an out-of-range content.
  InvalidAttributeValue(Box<str>),
  /// The endpoint string could not be split into host, port and database elements.
  InvalidDsn,
  /// A wire date or time value is outside of the representable range.
  InvalidTemporalValue,
  /// A single statement mixes `:name` and `?` placeholder styles.
  MixedParameterStyle,
  /// A fetch call was issued on a statement without an open cursor.
  NoOpenCursor,
  /// 1-based ordinal outside of the statement's parameter list.
  ParameterOutOfRange {
    available: usize,
    received: usize,
  },
  /// The statement token belongs to a previous generation of a still-open connection, e.g.
  /// after its buffer was handed to a new attachment. Tokens used after a close are reported
  /// as [`Error::ClosedConnection`] instead.
  StaleStatement,
  /// The info buffer was too small for the requested items.
  TruncatedInfoResponse,
  /// Received an operation code that does not fit the current flow.
  UnexpectedDatabaseMessage {
    received: u32,
  },
  /// Unexpected end of file when reading from a stream.
  UnexpectedStreamReadEOF,
  /// Attribute keys must be one of the recognized option names.
  UnknownAttribute(Box<str>),
  /// A named bind does not match any placeholder of the prepared text.
  UnknownParameter(Box<str>),
  /// The attribute exists but is read-only.
  UnsupportedAttribute(Box<str>),
  /// The column type has no client-side representation.
  UnsupportedColumnType(u16),
}

impl Display for Error {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
    <Self as Debug>::fmt(self, f)
  }
}

impl core::error::Error for Error {}

impl From<std::io::Error> for Error {
  #[inline]
  fn from(from: std::io::Error) -> Self {
    Self::IoError(from)
  }
}

impl From<core::num::TryFromIntError> for Error {
  #[inline]
  fn from(from: core::num::TryFromIntError) -> Self {
    Self::TryFromIntError(from)
  }
}

impl From<core::str::Utf8Error> for Error {
  #[inline]
  fn from(from: core::str::Utf8Error) -> Self {
    Self::Utf8Error(from)
  }
}

impl From<DbError> for Error {
  #[inline]
  fn from(from: DbError) -> Self {
    Self::Db(from.into())
  }
}

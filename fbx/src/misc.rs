//! Internal utilities shared across the crate.

mod filled_buffer_writer;
mod stream;

pub(crate) use filled_buffer_writer::FilledBufferWriter;
pub use stream::{BytesStream, Stream};

/// Converts the provided bytes into a string slice.
#[inline]
pub(crate) fn from_utf8_basic(bytes: &[u8]) -> crate::Result<&str> {
  Ok(core::str::from_utf8(bytes)?)
}

/// Number of padding bytes required to align `len` to a 4-byte boundary.
#[inline]
pub(crate) const fn xdr_pad(len: usize) -> usize {
  len.wrapping_neg() & 3
}

#[cfg(test)]
mod tests {
  use crate::misc::xdr_pad;

  #[test]
  fn xdr_pad_aligns_to_four_bytes() {
    assert_eq!(xdr_pad(0), 0);
    assert_eq!(xdr_pad(1), 3);
    assert_eq!(xdr_pad(2), 2);
    assert_eq!(xdr_pad(3), 1);
    assert_eq!(xdr_pad(4), 0);
    assert_eq!(xdr_pad(9), 3);
  }
}

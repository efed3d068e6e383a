use crate::misc::xdr_pad;

const PAD: [u8; 4] = [0; 4];

/// Helper that manages the copy of initialized bytes into a reusable scratch vector.
#[derive(Debug)]
pub(crate) struct FilledBufferWriter<'vec> {
  initial_idx: usize,
  vec: &'vec mut Vec<u8>,
}

impl<'vec> FilledBufferWriter<'vec> {
  pub(crate) fn new(vec: &'vec mut Vec<u8>) -> Self {
    let initial_idx = vec.len();
    Self { initial_idx, vec }
  }

  pub(crate) fn curr_bytes(&self) -> &[u8] {
    self.vec.get(self.initial_idx..).unwrap_or_default()
  }

  pub(crate) fn extend_from_slice(&mut self, other: &[u8]) {
    self.vec.extend_from_slice(other);
  }

  /// Big-endian 32-bit word, the basic XDR unit.
  pub(crate) fn write_u32(&mut self, value: u32) {
    self.vec.extend_from_slice(&value.to_be_bytes());
  }

  /// Length-prefixed byte string, zero-padded to a 4-byte boundary.
  pub(crate) fn write_xdr_bytes(&mut self, bytes: &[u8]) {
    self.write_u32(bytes.len() as u32);
    self.vec.extend_from_slice(bytes);
    self.write_pad(bytes.len());
  }

  fn write_pad(&mut self, len: usize) {
    self.vec.extend_from_slice(PAD.get(..xdr_pad(len)).unwrap_or_default());
  }
}

#[cfg(test)]
mod tests {
  use crate::misc::FilledBufferWriter;

  #[test]
  fn xdr_bytes_are_length_prefixed_and_padded() {
    let mut vec = Vec::new();
    let mut fbw = FilledBufferWriter::new(&mut vec);
    fbw.write_xdr_bytes(b"abcde");
    assert_eq!(fbw.curr_bytes(), &[0, 0, 0, 5, b'a', b'b', b'c', b'd', b'e', 0, 0, 0]);
  }

  #[test]
  fn writer_only_exposes_bytes_written_through_it() {
    let mut vec = vec![9, 9];
    let mut fbw = FilledBufferWriter::new(&mut vec);
    fbw.write_u32(1);
    assert_eq!(fbw.curr_bytes(), &[0, 0, 0, 1]);
  }
}

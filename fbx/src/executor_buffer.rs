use crate::statements::Statements;

/// Reusable storage of a connection. Creating one buffer and lending it to successive
/// connections avoids reallocating the network scratch space and the statement registry.
#[derive(Debug, Default)]
pub struct ExecutorBuffer {
  /// Network scratch buffer
  pub(crate) nb: Vec<u8>,
  /// Prepared statements
  pub(crate) stmts: Statements,
}

impl ExecutorBuffer {
  /// With default capacity.
  #[inline]
  pub fn new() -> Self {
    Self::with_capacity(8 * 1024)
  }

  #[inline]
  pub fn with_capacity(network: usize) -> Self {
    Self { nb: Vec::with_capacity(network), stmts: Statements::default() }
  }

  #[inline]
  pub(crate) fn parts_mut(&mut self) -> ExecutorBufferPartsMut<'_> {
    ExecutorBufferPartsMut { nb: &mut self.nb, stmts: &mut self.stmts }
  }
}

/// Borrows the fields of [ExecutorBuffer] independently.
#[derive(Debug)]
pub(crate) struct ExecutorBufferPartsMut<'eb> {
  pub(crate) nb: &'eb mut Vec<u8>,
  pub(crate) stmts: &'eb mut Statements,
}

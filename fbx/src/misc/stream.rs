use core::future::Future;

/// A stream of values produced asynchronously.
pub trait Stream {
  /// Pulls some bytes from this source into the specified buffer, returning how many bytes
  /// were read.
  fn read(&mut self, bytes: &mut [u8]) -> impl Future<Output = crate::Result<usize>>;

  /// Reads the exact number of bytes required to fill `bytes`.
  fn read_exact(&mut self, bytes: &mut [u8]) -> impl Future<Output = crate::Result<()>>;

  /// Attempts to write ***all*** `bytes`.
  fn write_all(&mut self, bytes: &[u8]) -> impl Future<Output = crate::Result<()>>;
}

impl<T> Stream for &mut T
where
  T: Stream,
{
  #[inline]
  async fn read(&mut self, bytes: &mut [u8]) -> crate::Result<usize> {
    (**self).read(bytes).await
  }

  #[inline]
  async fn read_exact(&mut self, bytes: &mut [u8]) -> crate::Result<()> {
    (**self).read_exact(bytes).await
  }

  #[inline]
  async fn write_all(&mut self, bytes: &[u8]) -> crate::Result<()> {
    (**self).write_all(bytes).await
  }
}

/// In-memory stream. Bytes fed through [`BytesStream::feed`] are served to `read` calls while
/// everything passed to `write_all` is accumulated for later inspection.
#[derive(Debug, Default)]
pub struct BytesStream {
  incoming: Vec<u8>,
  incoming_idx: usize,
  outgoing: Vec<u8>,
}

impl BytesStream {
  /// Appends `bytes` to the queue served by `read`.
  #[inline]
  pub fn feed(&mut self, bytes: &[u8]) {
    self.incoming.extend_from_slice(bytes);
  }

  /// All bytes written so far.
  #[inline]
  pub fn written(&self) -> &[u8] {
    &self.outgoing
  }

  /// Empties both internal buffers.
  #[inline]
  pub fn clear(&mut self) {
    self.incoming.clear();
    self.incoming_idx = 0;
    self.outgoing.clear();
  }
}

impl Stream for BytesStream {
  #[inline]
  async fn read(&mut self, bytes: &mut [u8]) -> crate::Result<usize> {
    let available = self.incoming.get(self.incoming_idx..).unwrap_or_default();
    let n = available.len().min(bytes.len());
    bytes.get_mut(..n).unwrap_or_default().copy_from_slice(available.get(..n).unwrap_or_default());
    self.incoming_idx = self.incoming_idx.wrapping_add(n);
    Ok(n)
  }

  #[inline]
  async fn read_exact(&mut self, bytes: &mut [u8]) -> crate::Result<()> {
    let mut filled = 0;
    while filled < bytes.len() {
      let n = self.read(bytes.get_mut(filled..).unwrap_or_default()).await?;
      if n == 0 {
        return Err(crate::Error::UnexpectedStreamReadEOF);
      }
      filled = filled.wrapping_add(n);
    }
    Ok(())
  }

  #[inline]
  async fn write_all(&mut self, bytes: &[u8]) -> crate::Result<()> {
    self.outgoing.extend_from_slice(bytes);
    Ok(())
  }
}

#[cfg(feature = "tokio")]
impl Stream for tokio::net::TcpStream {
  #[inline]
  async fn read(&mut self, bytes: &mut [u8]) -> crate::Result<usize> {
    Ok(<Self as tokio::io::AsyncReadExt>::read(self, bytes).await?)
  }

  #[inline]
  async fn read_exact(&mut self, bytes: &mut [u8]) -> crate::Result<()> {
    let _ = <Self as tokio::io::AsyncReadExt>::read_exact(self, bytes).await?;
    Ok(())
  }

  #[inline]
  async fn write_all(&mut self, bytes: &[u8]) -> crate::Result<()> {
    <Self as tokio::io::AsyncWriteExt>::write_all(self, bytes).await?;
    Ok(())
  }
}

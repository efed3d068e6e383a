/// Result kind returned by data-level operations. Under the silent and warning error modes a
/// failure is a value, not a propagated error, with the corresponding diagnostics retrievable
/// through [`crate::Executor::error_info`].
#[derive(Debug, Eq, PartialEq)]
pub enum Outcome<T> {
  /// Successful operation.
  Ok(T),
  /// Sentinel failure. Diagnostics were recorded in the session buffer.
  Failed,
}

impl<T> Outcome<T> {
  /// `true` for [`Outcome::Failed`].
  #[inline]
  pub fn is_failed(&self) -> bool {
    matches!(self, Self::Failed)
  }

  /// `true` for [`Outcome::Ok`].
  #[inline]
  pub fn is_ok(&self) -> bool {
    matches!(self, Self::Ok(_))
  }

  /// Converts into an [Option], discarding the failure sentinel.
  #[inline]
  pub fn ok(self) -> Option<T> {
    match self {
      Self::Failed => None,
      Self::Ok(elem) => Some(elem),
    }
  }

  /// Applies `fun` over the contained value, if any.
  #[inline]
  pub fn map<U>(self, fun: impl FnOnce(T) -> U) -> Outcome<U> {
    match self {
      Self::Failed => Outcome::Failed,
      Self::Ok(elem) => Outcome::Ok(fun(elem)),
    }
  }
}

use crate::{
  diagnostics::Outcome, executor::Executor, executor_buffer::ExecutorBuffer, misc::Stream,
  protocol,
};
use core::borrow::BorrowMut;

/// Explicit transaction scope. While one is alive the per-statement auto-commit of its
/// [Executor] stays suspended, every command joins the same server transaction until
/// [`TransactionManager::commit`] or [`TransactionManager::rollback`] consumes the scope.
#[derive(Debug)]
pub struct TransactionManager<'exec, EB, S> {
  executor: &'exec mut Executor<EB, S>,
}

impl<'exec, EB, S> TransactionManager<'exec, EB, S>
where
  EB: BorrowMut<ExecutorBuffer>,
  S: Stream,
{
  pub(crate) fn new(executor: &'exec mut Executor<EB, S>) -> Self {
    Self { executor }
  }

  /// Commands issued through this reference participate in the transaction.
  #[inline]
  pub fn executor(&mut self) -> &mut Executor<EB, S> {
    self.executor
  }

  /// Makes the work of the scope durable. Conflicts reported by the server follow the active
  /// error mode like any other data-level failure.
  pub async fn commit(self) -> crate::Result<Outcome<()>> {
    let rslt = self.executor.end_tx(protocol::OP_COMMIT).await;
    self.executor.explicit_tx = false;
    self.executor.session.settle(rslt)
  }

  /// Discards the work of the scope. Failures to roll back are logged and swallowed since the
  /// caller usually sits in an error path already.
  pub async fn rollback(self) -> crate::Result<()> {
    let rslt = self.executor.end_tx(protocol::OP_ROLLBACK).await;
    self.executor.explicit_tx = false;
    if let Err(err) = rslt {
      tracing::warn!(error = %err, "failed to roll back an explicit transaction");
    }
    Ok(())
  }
}

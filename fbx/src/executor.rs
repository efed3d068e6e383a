mod row;

use crate::{
  blr,
  column::Column,
  config::Config,
  db_error::{DbError, DiagnosticRecord, SQLDA_ERR, STRING_TRUNCATION},
  diagnostics::Outcome,
  executor_buffer::{ExecutorBuffer, ExecutorBufferPartsMut},
  info::{self, StmtType},
  message,
  misc::{FilledBufferWriter, Stream},
  protocol,
  record::Record,
  records::Records,
  session::{AttrValue, Session},
  statements::{rewrite_placeholders, BindIdent, CursorState, StatementRecord, Stmt},
  transaction_manager::TransactionManager,
  ty::Ty,
  value::Value,
};
use core::borrow::BorrowMut;
use std::sync::Arc;

/// Rows requested per round-trip while draining a cursor.
const FETCH_BATCH: u32 = 200;
/// Fetch status reported once the cursor has no more rows.
const FETCH_NO_MORE_ROWS: u32 = 100;

/// Outcome of a successfully executed statement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecResult {
  /// Rows changed by a data modification or definition command.
  Affected(u64),
  /// A cursor was opened, rows can now be fetched.
  RowSet,
}

/// Firebird executor. `EB` holds the reusable buffer space and `S` the underlying transport.
#[derive(Debug)]
pub struct Executor<EB, S> {
  db_handle: u32,
  eb: EB,
  pub(crate) explicit_tx: bool,
  pub(crate) session: Session,
  stream: S,
  tx_handle: Option<u32>,
}

impl<EB, S> Executor<EB, S>
where
  EB: BorrowMut<ExecutorBuffer>,
  S: Stream,
{
  /// Performs the full attachment handshake: protocol negotiation, authentication through the
  /// database parameter buffer and an initial introspection round-trip that feeds the
  /// `serverInfo` and `serverVersion` attributes.
  pub async fn connect(config: &Config<'_>, mut eb: EB, mut stream: S) -> crate::Result<Self> {
    {
      let ExecutorBufferPartsMut { nb, .. } = eb.borrow_mut().parts_mut();
      send_frame(nb, &mut stream, |fbw| protocol::connect_msg(config, fbw)).await?;
    }
    match message::next_op(&mut stream).await? {
      protocol::OP_ACCEPT => {
        let version = message::read_u32(&mut stream).await?;
        let _arch = message::read_u32(&mut stream).await?;
        let _ptype = message::read_u32(&mut stream).await?;
        if version != protocol::PROTOCOL_VERSION10 {
          return Err(crate::Error::ConnectionRejected);
        }
      }
      protocol::OP_REJECT => return Err(crate::Error::ConnectionRejected),
      received => return Err(crate::Error::UnexpectedDatabaseMessage { received }),
    }
    {
      let ExecutorBufferPartsMut { nb, .. } = eb.borrow_mut().parts_mut();
      send_frame(nb, &mut stream, |fbw| protocol::attach_msg(config, fbw)).await?;
    }
    let db_handle = message::read_response(&mut stream).await?.handle;
    {
      let ExecutorBufferPartsMut { nb, .. } = eb.borrow_mut().parts_mut();
      send_frame(nb, &mut stream, |fbw| {
        protocol::info_database_msg(db_handle, info::DB_ITEMS, fbw);
      })
      .await?;
    }
    let response = message::read_response(&mut stream).await?;
    let db_info = info::parse_db_info(&response.data)?;
    tracing::debug!(host = config.host, db = config.db, "attached");
    Ok(Self {
      db_handle,
      eb,
      explicit_tx: false,
      session: Session::new(db_info.implementation, db_info.version),
      stream,
      tx_handle: None,
    })
  }

  /// Reads a connection attribute.
  #[inline]
  pub fn attribute(&self, key: &str) -> crate::Result<AttrValue> {
    self.session.attribute(key)
  }

  /// Writes a connection attribute. Unknown keys, read-only keys and type-mismatched values
  /// are rejected without touching the previous state.
  #[inline]
  pub fn set_attribute(&mut self, key: &str, value: AttrValue) -> crate::Result<()> {
    self.session.set_attribute(key, value)
  }

  /// Diagnostic records of the most recent settled operation. Empty after a success.
  #[inline]
  pub fn error_info(&self) -> &[DiagnosticRecord] {
    &self.session.diagnostics
  }

  /// Compiles `cmd` into a reusable statement. Named (`:name`) or positional (`?`)
  /// placeholders are accepted but never both in the same command.
  pub async fn prepare(&mut self, cmd: &str) -> crate::Result<Outcome<Stmt>> {
    self.check_open()?;
    let rslt = self.prepare_inner(cmd).await;
    self.session.settle(rslt)
  }

  /// Stores a parameter value to be used by the next [`Executor::execute`] call. Values stay
  /// bound across executions until overwritten.
  pub fn bind<'any, BI, V>(&mut self, stmt: Stmt, ident: BI, value: V) -> crate::Result<()>
  where
    BI: Into<BindIdent<'any>>,
    V: Into<Value>,
  {
    self.check_open()?;
    self.eb.borrow_mut().parts_mut().stmts.get_mut(stmt)?.bind(ident.into(), value.into())
  }

  /// Like [`Executor::bind`] but with a declared parameter type and, for character data, an
  /// optional maximum length in bytes. The value is converted to the declared type up front;
  /// a value that cannot take that type or a text longer than `max_len` is a data-level
  /// failure that follows the active error mode.
  pub fn bind_with<'any, BI, V>(
    &mut self,
    stmt: Stmt,
    ident: BI,
    value: V,
    ty: Ty,
    max_len: Option<usize>,
  ) -> crate::Result<Outcome<()>>
  where
    BI: Into<BindIdent<'any>>,
    V: Into<Value>,
  {
    self.check_open()?;
    let rslt = self.bind_with_inner(stmt, ident.into(), value.into(), ty, max_len);
    self.session.settle(rslt)
  }

  /// Runs a prepared statement with the currently bound parameters.
  pub async fn execute(&mut self, stmt: Stmt) -> crate::Result<Outcome<ExecResult>> {
    self.check_open()?;
    let rslt = self.execute_inner(stmt).await;
    self.session.settle(rslt)
  }

  /// Like [`Executor::execute`] but with all parameters provided positionally at once,
  /// overwriting any previously bound values.
  pub async fn execute_with(
    &mut self,
    stmt: Stmt,
    values: &[Value],
  ) -> crate::Result<Outcome<ExecResult>> {
    self.check_open()?;
    let rslt = self.execute_with_inner(stmt, values).await;
    self.session.settle(rslt)
  }

  /// One-shot command without output rows. Returns the number of affected records.
  pub async fn exec(&mut self, cmd: &str) -> crate::Result<Outcome<u64>> {
    self.check_open()?;
    let rslt = self.exec_inner(cmd).await;
    self.session.settle(rslt)
  }

  /// One-shot query that eagerly materializes the whole result set.
  pub async fn query(&mut self, cmd: &str) -> crate::Result<Outcome<Records>> {
    self.check_open()?;
    let rslt = self.query_inner(cmd).await;
    self.session.settle(rslt)
  }

  /// Next row of an open cursor, or `None` once the result set is exhausted. Calling this
  /// method on a statement that never opened a cursor is an error.
  pub async fn fetch_next(&mut self, stmt: Stmt) -> crate::Result<Option<Record>> {
    self.check_open()?;
    loop {
      let (handle, blr, columns) = {
        let ExecutorBufferPartsMut { stmts, .. } = self.eb.borrow_mut().parts_mut();
        let record = stmts.get_mut(stmt)?;
        if let Some(values) = record.pending_rows.pop_front() {
          let labels = labels(&self.session, &record.columns);
          return Ok(Some(Record { labels, values }));
        }
        match record.cursor {
          CursorState::Closed => return Err(crate::Error::NoOpenCursor),
          CursorState::Drained => return Ok(None),
          CursorState::Open => {
            (record.handle, record.rows_blr.clone(), record.columns.clone())
          }
        }
      };
      self.fetch_batch(stmt, handle, &blr, &columns).await?;
    }
  }

  /// Drains an open cursor into memory.
  pub async fn fetch_all(&mut self, stmt: Stmt) -> crate::Result<Records> {
    let mut records = Vec::new();
    while let Some(record) = self.fetch_next(stmt).await? {
      records.push(record);
    }
    Ok(Records { records })
  }

  /// Opens an explicit transaction scope, suspending per-statement auto-commit until the
  /// returned manager is committed or rolled back.
  pub async fn transaction(&mut self) -> crate::Result<TransactionManager<'_, EB, S>> {
    self.check_open()?;
    let _handle = self.current_tx().await?;
    self.explicit_tx = true;
    Ok(TransactionManager::new(self))
  }

  /// Releases every server resource and marks the connection inactive, even when the server
  /// can no longer be reached. Cleanup failures are logged, never propagated. Statement tokens
  /// prepared through this connection become stale. Pending uncommitted work is rolled back.
  pub async fn close(&mut self) -> crate::Result<()> {
    if !self.session.active {
      return Ok(());
    }
    let records: Vec<StatementRecord> =
      self.eb.borrow_mut().parts_mut().stmts.clear().collect();
    for record in records {
      if let Err(err) = self.free_stmt(record.handle, protocol::DSQL_DROP).await {
        tracing::warn!(error = %err, "failed to drop a statement during close");
      }
    }
    if self.tx_handle.is_some() {
      if let Err(err) = self.end_tx(protocol::OP_ROLLBACK).await {
        tracing::warn!(error = %err, "failed to roll back during close");
      }
    }
    if let Err(err) = self.detach().await {
      tracing::warn!(error = %err, "failed to detach during close");
    }
    self.session.active = false;
    tracing::debug!("detached");
    Ok(())
  }

  pub(crate) async fn end_tx(&mut self, op: u32) -> crate::Result<()> {
    let Some(tx_handle) = self.tx_handle.take() else {
      return Ok(());
    };
    {
      let ExecutorBufferPartsMut { nb, stmts } = self.eb.borrow_mut().parts_mut();
      stmts.reset_cursors();
      send_frame(nb, &mut self.stream, |fbw| {
        protocol::transaction_end_msg(op, tx_handle, fbw);
      })
      .await?;
    }
    let _response = message::read_response(&mut self.stream).await?;
    Ok(())
  }

  fn bind_with_inner(
    &mut self,
    stmt: Stmt,
    ident: BindIdent<'_>,
    value: Value,
    ty: Ty,
    max_len: Option<usize>,
  ) -> crate::Result<()> {
    let value = value.coerce(ty)?;
    if let (Some(max_len), Value::Text(text)) = (max_len, &value) {
      if text.len() > max_len {
        return Err(DbError::client(STRING_TRUNCATION, "string right truncation").into());
      }
    }
    self.eb.borrow_mut().parts_mut().stmts.get_mut(stmt)?.bind(ident, value)
  }

  async fn affected_rows(&mut self, stmt_handle: u32) -> crate::Result<u64> {
    {
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| {
        protocol::info_sql_msg(stmt_handle, info::RECORDS_ITEMS, fbw);
      })
      .await?;
    }
    let response = message::read_response(&mut self.stream).await?;
    info::parse_affected_rows(&response.data)
  }

  fn check_open(&self) -> crate::Result<()> {
    if self.session.active {
      Ok(())
    } else {
      Err(crate::Error::ClosedConnection)
    }
  }

  async fn detach(&mut self) -> crate::Result<()> {
    {
      let db_handle = self.db_handle;
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| protocol::detach_msg(db_handle, fbw)).await?;
    }
    let _response = message::read_response(&mut self.stream).await?;
    Ok(())
  }

  async fn close_cursor_if_open(&mut self, stmt: Stmt) -> crate::Result<()> {
    let handle = {
      let ExecutorBufferPartsMut { stmts, .. } = self.eb.borrow_mut().parts_mut();
      let record = stmts.get_mut(stmt)?;
      if record.cursor == CursorState::Closed {
        return Ok(());
      }
      record.clear_cursor();
      record.handle
    };
    self.free_stmt(handle, protocol::DSQL_CLOSE).await
  }

  /// Commits the work of the implicit transaction while keeping its context, and therefore
  /// any open cursor, alive.
  async fn commit_retaining(&mut self) -> crate::Result<()> {
    let Some(tx_handle) = self.tx_handle else {
      return Ok(());
    };
    {
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| {
        protocol::transaction_end_msg(protocol::OP_COMMIT_RETAINING, tx_handle, fbw);
      })
      .await?;
    }
    let _response = message::read_response(&mut self.stream).await?;
    Ok(())
  }

  /// Handle of the active transaction, lazily starting one when none exists.
  async fn current_tx(&mut self) -> crate::Result<u32> {
    if let Some(tx_handle) = self.tx_handle {
      return Ok(tx_handle);
    }
    {
      let db_handle = self.db_handle;
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| protocol::transaction_msg(db_handle, fbw)).await?;
    }
    let tx_handle = message::read_response(&mut self.stream).await?.handle;
    self.tx_handle = Some(tx_handle);
    Ok(tx_handle)
  }

  async fn exec_inner(&mut self, cmd: &str) -> crate::Result<u64> {
    let stmt = self.prepare_inner(cmd).await?;
    let rslt = self.execute_inner(stmt).await;
    self.drop_stmt(stmt).await;
    match rslt? {
      ExecResult::Affected(rows) => Ok(rows),
      ExecResult::RowSet => Ok(0),
    }
  }

  async fn execute_inner(&mut self, stmt: Stmt) -> crate::Result<ExecResult> {
    let values = {
      let ExecutorBufferPartsMut { stmts, .. } = self.eb.borrow_mut().parts_mut();
      let record = stmts.get(stmt)?;
      let mut values = Vec::with_capacity(record.slots.len());
      for slot in &record.slots {
        match slot {
          None => {
            return Err(
              DbError::client(SQLDA_ERR, "statement executed with an unbound parameter").into(),
            );
          }
          Some(value) => values.push(value.clone()),
        }
      }
      values
    };
    self.close_cursor_if_open(stmt).await?;
    let params = blr::params_msg(&values)?;
    let (stmt_handle, stmt_type) = {
      let ExecutorBufferPartsMut { stmts, .. } = self.eb.borrow_mut().parts_mut();
      let record = stmts.get(stmt)?;
      (record.handle, record.stmt_type)
    };
    let tx_handle = self.current_tx().await?;
    {
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| {
        protocol::execute_msg(stmt_handle, tx_handle, &params.blr, &params.data, fbw);
      })
      .await?;
    }
    let _response = message::read_response(&mut self.stream).await?;
    if stmt_type == StmtType::Select {
      self.eb.borrow_mut().parts_mut().stmts.get_mut(stmt)?.cursor = CursorState::Open;
      Ok(ExecResult::RowSet)
    } else {
      // Only DML replies carry meaningful record counts.
      let rows = match stmt_type {
        StmtType::Delete | StmtType::Insert | StmtType::Update => {
          self.affected_rows(stmt_handle).await?
        }
        StmtType::Ddl | StmtType::Other | StmtType::Select => 0,
      };
      if !self.explicit_tx {
        self.commit_retaining().await?;
      }
      Ok(ExecResult::Affected(rows))
    }
  }

  async fn execute_with_inner(
    &mut self,
    stmt: Stmt,
    values: &[Value],
  ) -> crate::Result<ExecResult> {
    {
      let ExecutorBufferPartsMut { stmts, .. } = self.eb.borrow_mut().parts_mut();
      let record = stmts.get_mut(stmt)?;
      if values.len() != record.slots.len() {
        return Err(crate::Error::ParameterOutOfRange {
          available: record.slots.len(),
          received: values.len(),
        });
      }
      for (slot, value) in record.slots.iter_mut().zip(values) {
        *slot = Some(value.clone());
      }
    }
    self.execute_inner(stmt).await
  }

  async fn fetch_batch(
    &mut self,
    stmt: Stmt,
    handle: u32,
    blr: &[u8],
    columns: &[Column],
  ) -> crate::Result<()> {
    {
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| {
        protocol::fetch_msg(handle, blr, FETCH_BATCH, fbw);
      })
      .await?;
    }
    loop {
      match message::next_op(&mut self.stream).await? {
        protocol::OP_FETCH_RESPONSE => {
          let status = message::read_u32(&mut self.stream).await?;
          let count = message::read_u32(&mut self.stream).await?;
          if count == 0 {
            if status == FETCH_NO_MORE_ROWS {
              self.eb.borrow_mut().parts_mut().stmts.get_mut(stmt)?.cursor =
                CursorState::Drained;
            }
            return Ok(());
          }
          let values = row::read_row(&mut self.stream, columns).await?;
          self.eb.borrow_mut().parts_mut().stmts.get_mut(stmt)?.pending_rows.push_back(values);
        }
        protocol::OP_RESPONSE => {
          let _response = message::read_response_body(&mut self.stream).await?;
          return Err(crate::Error::UnexpectedDatabaseMessage { received: protocol::OP_RESPONSE });
        }
        received => return Err(crate::Error::UnexpectedDatabaseMessage { received }),
      }
    }
  }

  async fn prepare_inner(&mut self, cmd: &str) -> crate::Result<Stmt> {
    let (sql, param_names) = rewrite_placeholders(cmd)?;
    let tx_handle = self.current_tx().await?;
    {
      let db_handle = self.db_handle;
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| protocol::allocate_stmt_msg(db_handle, fbw)).await?;
    }
    let stmt_handle = message::read_response(&mut self.stream).await?.handle;
    {
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| {
        protocol::prepare_stmt_msg(tx_handle, stmt_handle, &sql, info::PREPARE_ITEMS, fbw);
      })
      .await?;
    }
    let response = match message::read_response(&mut self.stream).await {
      Ok(elem) => elem,
      Err(err) => {
        if let Err(free_err) = self.free_stmt(stmt_handle, protocol::DSQL_DROP).await {
          tracing::warn!(error = %free_err, "failed to drop a statement that did not compile");
        }
        return Err(err);
      }
    };
    let prepare_info = info::parse_prepare_info(&response.data)?;
    let rows_blr = if prepare_info.columns.is_empty() {
      Vec::new()
    } else {
      blr::rows_msg_blr(&prepare_info.columns)?
    };
    let record = StatementRecord::new(
      stmt_handle,
      prepare_info.stmt_type,
      prepare_info.columns,
      param_names,
      rows_blr,
    );
    Ok(self.eb.borrow_mut().parts_mut().stmts.insert(record))
  }

  async fn query_inner(&mut self, cmd: &str) -> crate::Result<Records> {
    let stmt = self.prepare_inner(cmd).await?;
    let rslt = self.query_stmt(stmt).await;
    self.drop_stmt(stmt).await;
    rslt
  }

  async fn query_stmt(&mut self, stmt: Stmt) -> crate::Result<Records> {
    match self.execute_inner(stmt).await? {
      ExecResult::Affected(_) => Ok(Records::default()),
      ExecResult::RowSet => self.fetch_all(stmt).await,
    }
  }

  /// Best-effort release of a one-shot statement.
  async fn drop_stmt(&mut self, stmt: Stmt) {
    let Some(record) = self.eb.borrow_mut().parts_mut().stmts.remove(stmt) else {
      return;
    };
    if let Err(err) = self.free_stmt(record.handle, protocol::DSQL_DROP).await {
      tracing::warn!(error = %err, "failed to drop a one-shot statement");
    }
  }

  async fn free_stmt(&mut self, stmt_handle: u32, option: u32) -> crate::Result<()> {
    {
      let ExecutorBufferPartsMut { nb, .. } = self.eb.borrow_mut().parts_mut();
      send_frame(nb, &mut self.stream, |fbw| {
        protocol::free_stmt_msg(stmt_handle, option, fbw);
      })
      .await?;
    }
    let _response = message::read_response(&mut self.stream).await?;
    Ok(())
  }
}

fn labels(session: &Session, columns: &[Column]) -> Arc<Vec<String>> {
  Arc::new(
    columns
      .iter()
      .map(|column| column.label(session.case_mode, session.table_qualification))
      .collect(),
  )
}

async fn send_frame<S>(
  nb: &mut Vec<u8>,
  stream: &mut S,
  cb: impl FnOnce(&mut FilledBufferWriter<'_>),
) -> crate::Result<()>
where
  S: Stream,
{
  nb.clear();
  let mut fbw = FilledBufferWriter::new(nb);
  cb(&mut fbw);
  stream.write_all(fbw.curr_bytes()).await
}

#[cfg(test)]
mod tests {
  use crate::{
    db_error::{SQLDA_ERR, STRING_TRUNCATION},
    executor::{ExecResult, Executor},
    info::tests::{db_info_reply, dml_prepare_reply, records_reply, select_prepare_reply},
    message::tests::{err_response, ok_response, push_xdr_bytes},
    misc::BytesStream,
    protocol,
    session::{AttrValue, CaseMode, ErrMode, TableQualification},
    value::Value,
    Config, Error, ExecutorBuffer, Outcome, Ty,
  };

  fn accept_frame() -> Vec<u8> {
    words(&[protocol::OP_ACCEPT, 10, 1, 3])
  }

  fn fetch_header(status: u32, count: u32) -> Vec<u8> {
    words(&[protocol::OP_FETCH_RESPONSE, status, count])
  }

  fn long_value(value: i32) -> Vec<u8> {
    let mut bytes = value.to_be_bytes().to_vec();
    bytes.extend_from_slice(&[0; 4]);
    bytes
  }

  fn varchar_value(value: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    push_xdr_bytes(&mut bytes, value.as_bytes());
    bytes.extend_from_slice(&[0; 4]);
    bytes
  }

  fn words(elems: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for elem in elems {
      bytes.extend_from_slice(&elem.to_be_bytes());
    }
    bytes
  }

  async fn connected(script: &[Vec<u8>]) -> Executor<ExecutorBuffer, BytesStream> {
    let mut stream = BytesStream::default();
    stream.feed(&accept_frame());
    stream.feed(&ok_response(5, &[]));
    stream.feed(&ok_response(0, &db_info_reply("WI-V3.0.7.0")));
    for frame in script {
      stream.feed(frame);
    }
    let config = Config::new("localhost:/srv/TEST.FDB", "SYSDBA", "masterkey").unwrap();
    Executor::connect(&config, ExecutorBuffer::new(), stream).await.unwrap()
  }

  #[tokio::test]
  async fn connect_exposes_server_introspection_attributes() {
    let executor = connected(&[]).await;
    assert_eq!(executor.attribute("driverName").unwrap(), AttrValue::Str("firebird".into()));
    assert_eq!(executor.attribute("connectionStatus").unwrap(), AttrValue::Int(1));
    assert_eq!(
      executor.attribute("serverVersion").unwrap(),
      AttrValue::Str("WI-V3.0.7.0".into())
    );
  }

  #[tokio::test]
  async fn select_flow_fetches_rows_with_rendered_labels() {
    let prepare_reply =
      select_prepare_reply(&[("ID", "TESTUSER", 496, 4), ("NAME", "TESTUSER", 449, 100)]);
    let mut batch = fetch_header(0, 1);
    batch.extend_from_slice(&long_value(1));
    batch.extend_from_slice(&varchar_value("Daniel"));
    batch.extend_from_slice(&fetch_header(0, 1));
    batch.extend_from_slice(&long_value(2));
    batch.extend_from_slice(&varchar_value("Ana"));
    batch.extend_from_slice(&fetch_header(100, 0));
    let script = [
      ok_response(9, &[]),
      ok_response(3, &[]),
      ok_response(0, &prepare_reply),
      ok_response(0, &[]),
      batch,
    ];
    let mut executor = connected(&script).await;
    let stmt = executor.prepare("SELECT id, name FROM testuser").await.unwrap().ok().unwrap();
    let rslt = executor.execute(stmt).await.unwrap();
    assert_eq!(rslt, Outcome::Ok(ExecResult::RowSet));
    executor.set_attribute("caseMode", AttrValue::CaseMode(CaseMode::Lower)).unwrap();
    executor
      .set_attribute(
        "tableNameQualification",
        AttrValue::TableQualification(TableQualification::On),
      )
      .unwrap();
    let first = executor.fetch_next(stmt).await.unwrap().unwrap();
    assert_eq!(first.labels(), &["testuser.id".to_string(), "testuser.name".to_string()]);
    assert_eq!(first.value("testuser.id"), Some(&Value::I64(1)));
    assert_eq!(first.value("testuser.name"), Some(&Value::Text("Daniel".into())));
    let second = executor.fetch_next(stmt).await.unwrap().unwrap();
    assert_eq!(second.value(1), Some(&Value::Text("Ana".into())));
    assert!(executor.fetch_next(stmt).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn fetching_before_executing_is_an_error() {
    let script = [
      ok_response(9, &[]),
      ok_response(3, &[]),
      ok_response(0, &select_prepare_reply(&[("ID", "TESTUSER", 496, 4)])),
    ];
    let mut executor = connected(&script).await;
    let stmt = executor.prepare("SELECT id FROM testuser").await.unwrap().ok().unwrap();
    assert!(matches!(executor.fetch_next(stmt).await, Err(Error::NoOpenCursor)));
  }

  #[tokio::test]
  async fn insert_with_named_parameters_auto_commits() {
    let script = [
      ok_response(9, &[]),
      ok_response(3, &[]),
      ok_response(0, &dml_prepare_reply(2)),
      ok_response(0, &[]),
      ok_response(0, &records_reply(1)),
      ok_response(0, &[]),
    ];
    let mut executor = connected(&script).await;
    let stmt = executor
      .prepare("INSERT INTO testuser (name, age) VALUES (:name, :age)")
      .await
      .unwrap()
      .ok()
      .unwrap();
    executor.bind(stmt, ":name", "Daniel").unwrap();
    executor.bind(stmt, "age", 18i32).unwrap();
    let rslt = executor.execute(stmt).await.unwrap();
    assert_eq!(rslt, Outcome::Ok(ExecResult::Affected(1)));
  }

  #[tokio::test]
  async fn executing_with_an_unbound_parameter_is_a_data_level_failure() {
    let script = [
      ok_response(9, &[]),
      ok_response(3, &[]),
      ok_response(0, &dml_prepare_reply(2)),
    ];
    let mut executor = connected(&script).await;
    let stmt = executor
      .prepare("INSERT INTO testuser (name, age) VALUES (:name, :age)")
      .await
      .unwrap()
      .ok()
      .unwrap();
    executor.bind(stmt, "name", "Daniel").unwrap();
    assert!(matches!(executor.execute(stmt).await.unwrap(), Outcome::Failed));
    assert_eq!(executor.error_info()[0].code, SQLDA_ERR);
  }

  #[tokio::test]
  async fn error_mode_decides_how_server_failures_surface() {
    let script = [
      ok_response(9, &[]),
      ok_response(3, &[]),
      err_response(335_544_569, "Dynamic SQL Error"),
      ok_response(0, &[]),
      ok_response(4, &[]),
      err_response(335_544_569, "Dynamic SQL Error"),
      ok_response(0, &[]),
    ];
    let mut executor = connected(&script).await;
    assert!(matches!(executor.prepare("SELEC 1").await.unwrap(), Outcome::Failed));
    assert_eq!(executor.error_info()[0].code, 335_544_569);
    executor.set_attribute("errorMode", AttrValue::ErrMode(ErrMode::Exception)).unwrap();
    assert!(matches!(executor.prepare("SELEC 1").await, Err(Error::Db(_))));
  }

  #[tokio::test]
  async fn explicit_transactions_suspend_auto_commit() {
    let script = [
      ok_response(9, &[]),
      ok_response(3, &[]),
      ok_response(0, &dml_prepare_reply(2)),
      ok_response(0, &[]),
      ok_response(0, &records_reply(1)),
      ok_response(0, &[]),
      ok_response(0, &[]),
    ];
    let mut executor = connected(&script).await;
    let mut tm = executor.transaction().await.unwrap();
    let rslt = tm.executor().exec("INSERT INTO names (id) VALUES (1)").await.unwrap();
    assert_eq!(rslt, Outcome::Ok(1));
    assert_eq!(tm.commit().await.unwrap(), Outcome::Ok(()));
  }

  #[tokio::test]
  async fn declared_types_and_lengths_are_enforced_at_bind_time() {
    let script = [
      ok_response(9, &[]),
      ok_response(3, &[]),
      ok_response(0, &dml_prepare_reply(2)),
    ];
    let mut executor = connected(&script).await;
    let stmt = executor
      .prepare("INSERT INTO testuser (name, age) VALUES (:name, :age)")
      .await
      .unwrap()
      .ok()
      .unwrap();
    let outcome = executor.bind_with(stmt, "name", "Daniel", Ty::Varchar, Some(3)).unwrap();
    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(executor.error_info()[0].code, STRING_TRUNCATION);
    let outcome = executor.bind_with(stmt, "name", "Dan", Ty::Varchar, Some(3)).unwrap();
    assert_eq!(outcome, Outcome::Ok(()));
    let outcome = executor.bind_with(stmt, "age", "18", Ty::Long, None).unwrap();
    assert_eq!(outcome, Outcome::Ok(()));
  }

  #[tokio::test]
  async fn close_succeeds_even_when_the_server_is_gone() {
    // Nothing scripted beyond the handshake, so the detach round-trip hits a dead stream.
    let mut executor = connected(&[]).await;
    executor.close().await.unwrap();
    assert_eq!(executor.attribute("connectionStatus").unwrap(), AttrValue::Int(0));
    executor.close().await.unwrap();
    assert!(matches!(executor.exec("DELETE FROM testuser").await, Err(Error::ClosedConnection)));
  }

  #[tokio::test]
  async fn closed_connections_reject_further_work() {
    let script = [ok_response(0, &[])];
    let mut executor = connected(&script).await;
    executor.close().await.unwrap();
    assert_eq!(executor.attribute("connectionStatus").unwrap(), AttrValue::Int(0));
    assert!(matches!(
      executor.exec("DELETE FROM testuser").await,
      Err(Error::ClosedConnection)
    ));
  }
}

//! Exercises a live Firebird server. The target database must already exist and is reachable
//! through the `FBX_DSN`, `FBX_USER` and `FBX_PASSWORD` environment variables.

use crate::{
  AttrValue, CaseMode, Config, ErrMode, ErrorCategory, ExecResult, Executor, ExecutorBuffer,
  Outcome, TableQualification, Ty, Value,
};
use core::time::Duration;
use tokio::net::TcpStream;

async fn executor() -> Executor<ExecutorBuffer, TcpStream> {
  let dsn = std::env::var("FBX_DSN").unwrap_or_else(|_| "localhost:/tmp/fbx_test.fdb".into());
  let user = std::env::var("FBX_USER").unwrap_or_else(|_| "SYSDBA".into());
  let password = std::env::var("FBX_PASSWORD").unwrap_or_else(|_| "masterkey".into());
  let mut config = Config::new(&dsn, &user, &password).unwrap();
  config.set_connect_timeout(Duration::from_secs(10));
  let stream = tokio::time::timeout(
    config.connect_timeout(),
    TcpStream::connect((config.host(), config.port())),
  )
  .await
  .unwrap()
  .unwrap();
  Executor::connect(&config, ExecutorBuffer::new(), stream).await.unwrap()
}

/// The default silent mode swallows the drop failure on a fresh database.
async fn recreate_table(executor: &mut Executor<ExecutorBuffer, TcpStream>) {
  let _outcome = executor.exec("DROP TABLE testuser").await.unwrap();
  let outcome = executor
    .exec("CREATE TABLE testuser (id INTEGER NOT NULL PRIMARY KEY, name VARCHAR(100), age INTEGER)")
    .await
    .unwrap();
  assert!(outcome.is_ok(), "{:?}", executor.error_info());
}

#[tokio::test]
async fn crud_round_trip() {
  let mut executor = executor().await;
  recreate_table(&mut executor).await;

  let stmt = executor
    .prepare("INSERT INTO testuser (id, name, age) VALUES (:id, :name, :age)")
    .await
    .unwrap()
    .ok()
    .unwrap();
  executor.bind(stmt, "id", 1i32).unwrap();
  let outcome = executor.bind_with(stmt, "name", "Daniel", Ty::Varchar, Some(100)).unwrap();
  assert_eq!(outcome, Outcome::Ok(()));
  executor.bind(stmt, "age", 18i32).unwrap();
  assert_eq!(executor.execute(stmt).await.unwrap(), Outcome::Ok(ExecResult::Affected(1)));
  // Deferred style: overwrite two slots and run the same statement again.
  executor.bind(stmt, "id", 2i32).unwrap();
  executor.bind(stmt, "name", "Ana").unwrap();
  assert_eq!(executor.execute(stmt).await.unwrap(), Outcome::Ok(ExecResult::Affected(1)));

  let records = executor
    .query("SELECT id, name, age FROM testuser ORDER BY id")
    .await
    .unwrap()
    .ok()
    .unwrap();
  assert_eq!(records.len(), 2);
  assert_eq!(records.get(0).unwrap().value("NAME"), Some(&Value::Text("Daniel".into())));
  assert_eq!(records.get(1).unwrap().value("ID"), Some(&Value::I64(2)));

  let updated =
    executor.exec("UPDATE testuser SET age = 19 WHERE id = 1").await.unwrap().ok().unwrap();
  assert_eq!(updated, 1);
  let deleted = executor.exec("DELETE FROM testuser").await.unwrap().ok().unwrap();
  assert_eq!(deleted, 2);
  executor.close().await.unwrap();
}

#[tokio::test]
async fn positional_parameters_and_lazy_fetching() {
  let mut executor = executor().await;
  recreate_table(&mut executor).await;

  let insert =
    executor.prepare("INSERT INTO testuser (id, name) VALUES (?, ?)").await.unwrap().ok().unwrap();
  for (id, name) in [(1i32, "a"), (2, "b"), (3, "c")] {
    let outcome =
      executor.execute_with(insert, &[id.into(), name.into()]).await.unwrap();
    assert_eq!(outcome, Outcome::Ok(ExecResult::Affected(1)));
  }

  let select = executor
    .prepare("SELECT name FROM testuser WHERE id > ? ORDER BY id")
    .await
    .unwrap()
    .ok()
    .unwrap();
  executor.bind(select, 1usize, 1i32).unwrap();
  assert_eq!(executor.execute(select).await.unwrap(), Outcome::Ok(ExecResult::RowSet));
  let mut names = Vec::new();
  while let Some(record) = executor.fetch_next(select).await.unwrap() {
    names.push(record.value(0).cloned());
  }
  assert_eq!(names, [Some(Value::Text("b".into())), Some(Value::Text("c".into()))]);
  executor.close().await.unwrap();
}

#[tokio::test]
async fn error_modes_agree_on_diagnostics() {
  let mut executor = executor().await;
  recreate_table(&mut executor).await;
  executor.exec("INSERT INTO testuser (id) VALUES (1)").await.unwrap();

  // Silent: the duplicate key is a sentinel plus diagnostics.
  let outcome = executor.exec("INSERT INTO testuser (id) VALUES (1)").await.unwrap();
  assert!(outcome.is_failed());
  assert!(!executor.error_info().is_empty());

  executor.set_attribute("errorMode", AttrValue::ErrMode(ErrMode::Exception)).unwrap();
  let err = executor.exec("INSERT INTO testuser (id) VALUES (1)").await.unwrap_err();
  let crate::Error::Db(db_error) = err else { panic!("expected a database error") };
  assert_eq!(db_error.category(), ErrorCategory::Constraint);
  executor.close().await.unwrap();
}

#[tokio::test]
async fn labels_follow_case_and_qualification_attributes() {
  let mut executor = executor().await;
  recreate_table(&mut executor).await;
  executor.exec("INSERT INTO testuser (id, name) VALUES (1, 'x')").await.unwrap();

  executor.set_attribute("caseMode", AttrValue::CaseMode(CaseMode::Lower)).unwrap();
  executor
    .set_attribute("tableNameQualification", AttrValue::TableQualification(TableQualification::On))
    .unwrap();
  let records = executor.query("SELECT id FROM testuser").await.unwrap().ok().unwrap();
  assert_eq!(records.get(0).unwrap().labels(), &["testuser.id".to_string()]);
  executor.close().await.unwrap();
}

#[tokio::test]
async fn explicit_transactions_can_be_rolled_back() {
  let mut executor = executor().await;
  recreate_table(&mut executor).await;

  let mut tm = executor.transaction().await.unwrap();
  tm.executor().exec("INSERT INTO testuser (id) VALUES (10)").await.unwrap();
  tm.rollback().await.unwrap();
  let records = executor.query("SELECT id FROM testuser").await.unwrap().ok().unwrap();
  assert!(records.is_empty());

  let mut tm = executor.transaction().await.unwrap();
  tm.executor().exec("INSERT INTO testuser (id) VALUES (11)").await.unwrap();
  assert_eq!(tm.commit().await.unwrap(), Outcome::Ok(()));
  let records = executor.query("SELECT id FROM testuser").await.unwrap().ok().unwrap();
  assert_eq!(records.len(), 1);
  executor.close().await.unwrap();
}

#[tokio::test]
async fn introspection_attributes() {
  let mut executor = executor().await;
  assert_eq!(executor.attribute("driverName").unwrap(), AttrValue::Str("firebird".into()));
  assert_eq!(executor.attribute("connectionStatus").unwrap(), AttrValue::Int(1));
  let AttrValue::Str(version) = executor.attribute("serverVersion").unwrap() else {
    panic!("expected a string attribute");
  };
  assert!(!version.is_empty());
  executor.close().await.unwrap();
  assert_eq!(executor.attribute("connectionStatus").unwrap(), AttrValue::Int(0));
}

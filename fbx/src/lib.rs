//! Client implementation of the Firebird wire protocol (version 10): connection and
//! attribute management, transactions, prepared statements with named or positional
//! placeholders, lazy or eager row fetching and a mode-driven diagnostics reporter.

mod blr;
mod column;
mod config;
mod db_error;
mod diagnostics;
mod error;
mod executor;
mod executor_buffer;
mod info;
#[cfg(all(feature = "_integration-tests", test))]
mod integration_tests;
mod message;
pub mod misc;
mod protocol;
mod record;
mod records;
mod session;
mod statements;
mod transaction_manager;
mod ty;
mod value;

pub use column::Column;
pub use config::Config;
pub use db_error::{DbError, DiagnosticRecord, ErrorCategory, Severity};
pub use diagnostics::Outcome;
pub use error::Error;
pub use executor::{ExecResult, Executor};
pub use executor_buffer::ExecutorBuffer;
pub use record::{Record, ValueIdent};
pub use records::Records;
pub use session::{AttrValue, CaseMode, ErrMode, TableQualification};
pub use statements::{BindIdent, Stmt};
pub use transaction_manager::TransactionManager;
pub use ty::Ty;
pub use value::Value;

/// The maximum number of characters that a database identifier can have. For example, tables,
/// columns, aliases, etc.
pub type Identifier = arrayvec::ArrayString<64>;
/// Shortcut of [`core::result::Result<T, Error>`].
pub type Result<T> = core::result::Result<T, Error>;

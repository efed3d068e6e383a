//! Frame builders for the client side of the wire conversation. All multi-byte quantities are
//! XDR (big-endian, 4-byte aligned); parameter buffers (DPB/TPB) are opaque byte strings with
//! their own little-endian tag/length layout.

use crate::{config::Config, misc::FilledBufferWriter};

pub(crate) const OP_CONNECT: u32 = 1;
pub(crate) const OP_ACCEPT: u32 = 3;
pub(crate) const OP_REJECT: u32 = 4;
pub(crate) const OP_RESPONSE: u32 = 9;
pub(crate) const OP_ATTACH: u32 = 19;
pub(crate) const OP_DETACH: u32 = 21;
pub(crate) const OP_TRANSACTION: u32 = 29;
pub(crate) const OP_COMMIT: u32 = 30;
pub(crate) const OP_ROLLBACK: u32 = 31;
pub(crate) const OP_INFO_DATABASE: u32 = 40;
pub(crate) const OP_COMMIT_RETAINING: u32 = 50;
pub(crate) const OP_ALLOCATE_STATEMENT: u32 = 62;
pub(crate) const OP_EXECUTE: u32 = 63;
pub(crate) const OP_FETCH: u32 = 65;
pub(crate) const OP_FETCH_RESPONSE: u32 = 66;
pub(crate) const OP_FREE_STATEMENT: u32 = 67;
pub(crate) const OP_PREPARE_STATEMENT: u32 = 68;
pub(crate) const OP_INFO_SQL: u32 = 70;
pub(crate) const OP_DUMMY: u32 = 71;

pub(crate) const CONNECT_VERSION2: u32 = 2;
pub(crate) const ARCH_GENERIC: u32 = 1;
pub(crate) const PROTOCOL_VERSION10: u32 = 10;
const PTYPE_RPC: u32 = 2;
const PTYPE_BATCH_SEND: u32 = 3;

const CNCT_USER: u8 = 1;
const CNCT_HOST: u8 = 4;
const CNCT_USER_VERIFICATION: u8 = 6;

const DPB_VERSION1: u8 = 1;
const DPB_USER_NAME: u8 = 28;
const DPB_PASSWORD: u8 = 29;
const DPB_LC_CTYPE: u8 = 48;
const DPB_SQL_DIALECT: u8 = 63;

const TPB_VERSION3: u8 = 3;
const TPB_WAIT: u8 = 6;
const TPB_WRITE: u8 = 9;
const TPB_READ_COMMITTED: u8 = 15;
const TPB_REC_VERSION: u8 = 17;

pub(crate) const DSQL_CLOSE: u32 = 1;
pub(crate) const DSQL_DROP: u32 = 2;

pub(crate) const SQL_DIALECT: u32 = 3;
pub(crate) const INFO_BUFFER_LEN: u32 = 65_535;

pub(crate) fn connect_msg(config: &Config<'_>, fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_CONNECT);
  fbw.write_u32(OP_ATTACH);
  fbw.write_u32(CONNECT_VERSION2);
  fbw.write_u32(ARCH_GENERIC);
  fbw.write_xdr_bytes(config.db.as_bytes());
  fbw.write_u32(1);
  fbw.write_xdr_bytes(&user_identification(config));
  // Single proposed protocol: version, architecture, minimum type, maximum type, weight.
  fbw.write_u32(PROTOCOL_VERSION10);
  fbw.write_u32(ARCH_GENERIC);
  fbw.write_u32(PTYPE_RPC);
  fbw.write_u32(PTYPE_BATCH_SEND);
  fbw.write_u32(2);
}

pub(crate) fn attach_msg(config: &Config<'_>, fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_ATTACH);
  fbw.write_u32(0);
  fbw.write_xdr_bytes(config.db.as_bytes());
  fbw.write_xdr_bytes(&dpb(config));
}

pub(crate) fn detach_msg(db_handle: u32, fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_DETACH);
  fbw.write_u32(db_handle);
}

pub(crate) fn transaction_msg(db_handle: u32, fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_TRANSACTION);
  fbw.write_u32(db_handle);
  fbw.write_xdr_bytes(&[TPB_VERSION3, TPB_WRITE, TPB_WAIT, TPB_READ_COMMITTED, TPB_REC_VERSION]);
}

/// `op` must be one of commit, commit retaining or rollback.
pub(crate) fn transaction_end_msg(op: u32, tx_handle: u32, fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(op);
  fbw.write_u32(tx_handle);
}

pub(crate) fn allocate_stmt_msg(db_handle: u32, fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_ALLOCATE_STATEMENT);
  fbw.write_u32(db_handle);
}

pub(crate) fn prepare_stmt_msg(
  tx_handle: u32,
  stmt_handle: u32,
  cmd: &str,
  info_items: &[u8],
  fbw: &mut FilledBufferWriter<'_>,
) {
  fbw.write_u32(OP_PREPARE_STATEMENT);
  fbw.write_u32(tx_handle);
  fbw.write_u32(stmt_handle);
  fbw.write_u32(SQL_DIALECT);
  fbw.write_xdr_bytes(cmd.as_bytes());
  fbw.write_xdr_bytes(info_items);
  fbw.write_u32(INFO_BUFFER_LEN);
}

pub(crate) fn execute_msg(
  stmt_handle: u32,
  tx_handle: u32,
  blr: &[u8],
  data: &[u8],
  fbw: &mut FilledBufferWriter<'_>,
) {
  fbw.write_u32(OP_EXECUTE);
  fbw.write_u32(stmt_handle);
  fbw.write_u32(tx_handle);
  fbw.write_xdr_bytes(blr);
  fbw.write_u32(0);
  fbw.write_u32(u32::from(!blr.is_empty()));
  fbw.extend_from_slice(data);
}

pub(crate) fn fetch_msg(stmt_handle: u32, blr: &[u8], count: u32, fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_FETCH);
  fbw.write_u32(stmt_handle);
  fbw.write_xdr_bytes(blr);
  fbw.write_u32(0);
  fbw.write_u32(count);
}

pub(crate) fn free_stmt_msg(stmt_handle: u32, option: u32, fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_FREE_STATEMENT);
  fbw.write_u32(stmt_handle);
  fbw.write_u32(option);
}

pub(crate) fn info_sql_msg(stmt_handle: u32, items: &[u8], fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_INFO_SQL);
  fbw.write_u32(stmt_handle);
  fbw.write_u32(0);
  fbw.write_xdr_bytes(items);
  fbw.write_u32(INFO_BUFFER_LEN);
}

pub(crate) fn info_database_msg(db_handle: u32, items: &[u8], fbw: &mut FilledBufferWriter<'_>) {
  fbw.write_u32(OP_INFO_DATABASE);
  fbw.write_u32(db_handle);
  fbw.write_u32(0);
  fbw.write_xdr_bytes(items);
  fbw.write_u32(INFO_BUFFER_LEN);
}

fn user_identification(config: &Config<'_>) -> Vec<u8> {
  let mut bytes = Vec::new();
  push_cnct(&mut bytes, CNCT_USER, config.user.as_bytes());
  push_cnct(&mut bytes, CNCT_HOST, config.host.as_bytes());
  push_cnct(&mut bytes, CNCT_USER_VERIFICATION, &[]);
  bytes
}

fn push_cnct(bytes: &mut Vec<u8>, tag: u8, data: &[u8]) {
  let len = data.len().min(usize::from(u8::MAX));
  bytes.push(tag);
  bytes.push(len as u8);
  bytes.extend_from_slice(data.get(..len).unwrap_or_default());
}

fn dpb(config: &Config<'_>) -> Vec<u8> {
  let mut bytes = vec![DPB_VERSION1];
  push_dpb(&mut bytes, DPB_LC_CTYPE, b"UTF8");
  push_dpb(&mut bytes, DPB_USER_NAME, config.user.as_bytes());
  push_dpb(&mut bytes, DPB_PASSWORD, config.password.as_bytes());
  push_dpb(&mut bytes, DPB_SQL_DIALECT, &[SQL_DIALECT as u8]);
  bytes
}

fn push_dpb(bytes: &mut Vec<u8>, tag: u8, data: &[u8]) {
  let len = data.len().min(usize::from(u8::MAX));
  bytes.push(tag);
  bytes.push(len as u8);
  bytes.extend_from_slice(data.get(..len).unwrap_or_default());
}

#[cfg(test)]
mod tests {
  use crate::{config::Config, misc::FilledBufferWriter, protocol};

  #[test]
  fn connect_msg_proposes_protocol_ten() {
    let config = Config::new("h:db", "u", "p").unwrap();
    let mut vec = Vec::new();
    let mut fbw = FilledBufferWriter::new(&mut vec);
    protocol::connect_msg(&config, &mut fbw);
    let bytes = fbw.curr_bytes();
    assert_eq!(&bytes[..16], &[0, 0, 0, 1, 0, 0, 0, 19, 0, 0, 0, 2, 0, 0, 0, 1]);
    let tail = &bytes[bytes.len() - 20..];
    assert_eq!(
      tail,
      &[0, 0, 0, 10, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 2]
    );
  }

  #[test]
  fn execute_msg_without_parameters_announces_zero_messages() {
    let mut vec = Vec::new();
    let mut fbw = FilledBufferWriter::new(&mut vec);
    protocol::execute_msg(7, 3, &[], &[], &mut fbw);
    assert_eq!(
      fbw.curr_bytes(),
      &[0, 0, 0, 63, 0, 0, 0, 7, 0, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );
  }
}

use core::time::Duration;

/// Configuration
#[derive(Debug, PartialEq, Eq)]
pub struct Config<'data> {
  pub(crate) connect_timeout: Duration,
  pub(crate) db: &'data str,
  pub(crate) host: &'data str,
  pub(crate) password: &'data str,
  pub(crate) port: u16,
  pub(crate) user: &'data str,
}

impl<'data> Config<'data> {
  /// Unwraps the elements of a Firebird endpoint string: `host/port:database`,
  /// `host:database` or a bare database path/alias. A leading `firebird:` scheme and a
  /// `dbname=` key are tolerated for compatibility with generic DSNs.
  #[inline]
  pub fn new(
    endpoint: &'data str,
    user: &'data str,
    password: &'data str,
  ) -> crate::Result<Config<'data>> {
    let mut rest = endpoint.strip_prefix("firebird:").unwrap_or(endpoint);
    rest = rest.strip_prefix("dbname=").unwrap_or(rest);
    if rest.is_empty() {
      return Err(crate::Error::InvalidDsn);
    }
    let (mut host, mut port, mut db) = ("localhost", 3050u16, rest);
    if let Some((before, after)) = rest.split_once(':') {
      // A single character before the colon is a Windows drive letter, not a host.
      if before.len() > 1 && !after.is_empty() {
        db = after;
        match before.split_once('/') {
          None => {
            host = before;
          }
          Some((name, port_str)) => {
            host = name;
            port = port_str.parse().map_err(|_err| crate::Error::InvalidDsn)?;
          }
        }
      }
    }
    if host.is_empty() || db.is_empty() {
      return Err(crate::Error::InvalidDsn);
    }
    Ok(Self { connect_timeout: Duration::ZERO, db, host, password, port, user })
  }

  /// Opaque timeout intended to be applied by the caller around the connect call.
  #[inline]
  pub fn set_connect_timeout(&mut self, connect_timeout: Duration) {
    self.connect_timeout = connect_timeout;
  }

  /// Time allotted to the transport connection attempt. Zero, the default, means no limit.
  #[inline]
  pub fn connect_timeout(&self) -> Duration {
    self.connect_timeout
  }

  /// Database file path or alias.
  #[inline]
  pub fn db(&self) -> &str {
    self.db
  }

  /// Server host name.
  #[inline]
  pub fn host(&self) -> &str {
    self.host
  }

  /// Server port.
  #[inline]
  pub fn port(&self) -> u16 {
    self.port
  }
}

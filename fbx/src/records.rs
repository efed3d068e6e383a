use crate::record::Record;

/// Eagerly fetched result set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Records {
  pub(crate) records: Vec<Record>,
}

impl Records {
  #[inline]
  pub fn get(&self, idx: usize) -> Option<&Record> {
    self.records.get(idx)
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &Record> {
    self.records.iter()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.records.len()
  }
}

impl IntoIterator for Records {
  type IntoIter = std::vec::IntoIter<Record>;
  type Item = Record;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.records.into_iter()
  }
}

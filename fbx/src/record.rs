use crate::value::Value;
use std::sync::Arc;

/// Selects a value of a [Record], either by zero-based position or by its materialized label.
pub trait ValueIdent {
  /// Position of the selected value, if any.
  fn idx(&self, record: &Record) -> Option<usize>;
}

impl ValueIdent for usize {
  #[inline]
  fn idx(&self, record: &Record) -> Option<usize> {
    (*self < record.values.len()).then_some(*self)
  }
}

impl ValueIdent for &str {
  #[inline]
  fn idx(&self, record: &Record) -> Option<usize> {
    record.labels.iter().position(|label| label == self)
  }
}

/// One materialized row. Labels are shared across all rows of a result set and already reflect
/// the case and table-qualification attributes in effect when the set was produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
  pub(crate) labels: Arc<Vec<String>>,
  pub(crate) values: Vec<Value>,
}

impl Record {
  /// Labels in declaration order.
  #[inline]
  pub fn labels(&self) -> &[String] {
    &self.labels
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.values.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Value selected by `ident`, which can be a position or a label.
  #[inline]
  pub fn value<VI>(&self, ident: VI) -> Option<&Value>
  where
    VI: ValueIdent,
  {
    self.values.get(ident.idx(self)?)
  }

  /// All values in declaration order.
  #[inline]
  pub fn values(&self) -> &[Value] {
    &self.values
  }
}

#[cfg(test)]
mod tests {
  use crate::{record::Record, value::Value};
  use std::sync::Arc;

  #[test]
  fn values_are_selectable_by_position_and_label() {
    let record = Record {
      labels: Arc::new(vec!["id".into(), "name".into()]),
      values: vec![Value::I32(1), Value::Text("Daniel".into())],
    };
    assert_eq!(record.value(0), Some(&Value::I32(1)));
    assert_eq!(record.value("name"), Some(&Value::Text("Daniel".into())));
    assert_eq!(record.value("missing"), None);
    assert_eq!(record.value(2), None);
  }
}

use crate::{
  session::{CaseMode, TableQualification},
  ty::Ty,
  Identifier,
};

/// Raw output column metadata described by the server. Labels are always re-derived from this
/// data so that attribute changes between fetches never leave stale renderings behind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Column {
  pub(crate) alias: Identifier,
  pub(crate) length: u16,
  pub(crate) name: Identifier,
  pub(crate) nullable: bool,
  pub(crate) relation: Identifier,
  pub(crate) scale: i32,
  pub(crate) ty: Ty,
}

impl Column {
  /// Column or alias name exactly as the server reported it.
  #[inline]
  pub fn name(&self) -> &str {
    if self.alias.is_empty() {
      &self.name
    } else {
      &self.alias
    }
  }

  /// Source table name, when the column maps to one.
  #[inline]
  pub fn relation(&self) -> &str {
    &self.relation
  }

  /// See [Ty].
  #[inline]
  pub fn ty(&self) -> Ty {
    self.ty
  }

  /// Rendered label: qualification first, case folding last, so the fold also covers the
  /// table prefix.
  pub(crate) fn label(&self, case: CaseMode, qualification: TableQualification) -> String {
    let mut label = String::new();
    if qualification == TableQualification::On && !self.relation.is_empty() {
      label.push_str(&self.relation);
      label.push('.');
    }
    label.push_str(self.name());
    match case {
      CaseMode::Lower => label.make_ascii_lowercase(),
      CaseMode::Natural => {}
      CaseMode::Upper => label.make_ascii_uppercase(),
    }
    label
  }
}

#[cfg(test)]
mod tests {
  use crate::{
    column::Column,
    session::{CaseMode, TableQualification},
    ty::Ty,
    Identifier,
  };

  #[test]
  fn label_qualifies_before_folding() {
    let column = Column {
      alias: Identifier::new(),
      length: 4,
      name: Identifier::try_from("ID").unwrap(),
      nullable: false,
      relation: Identifier::try_from("TestUser").unwrap(),
      scale: 0,
      ty: Ty::Long,
    };
    assert_eq!(column.label(CaseMode::Natural, TableQualification::Off), "ID");
    assert_eq!(column.label(CaseMode::Natural, TableQualification::On), "TestUser.ID");
    assert_eq!(column.label(CaseMode::Lower, TableQualification::On), "testuser.id");
    assert_eq!(column.label(CaseMode::Upper, TableQualification::On), "TESTUSER.ID");
  }

  #[test]
  fn alias_takes_precedence_over_the_field_name() {
    let column = Column {
      alias: Identifier::try_from("TOTAL").unwrap(),
      length: 8,
      name: Identifier::try_from("SUM").unwrap(),
      nullable: true,
      relation: Identifier::new(),
      scale: 0,
      ty: Ty::Int64,
    };
    assert_eq!(column.label(CaseMode::Lower, TableQualification::On), "total");
  }
}

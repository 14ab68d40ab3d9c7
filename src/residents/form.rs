//! Editable resident draft and its validation.

use std::collections::BTreeMap;
use std::fmt;

use crate::api::{CivilStatus, Gender, NewResident, Resident, ResidentPatch};

/// Form fields in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
  FirstName,
  LastName,
  MiddleName,
  Age,
  Gender,
  CivilStatus,
  Address,
  Barangay,
  ContactNumber,
  Occupation,
}

impl Field {
  pub const ALL: [Field; 10] = [
    Field::FirstName,
    Field::LastName,
    Field::MiddleName,
    Field::Age,
    Field::Gender,
    Field::CivilStatus,
    Field::Address,
    Field::Barangay,
    Field::ContactNumber,
    Field::Occupation,
  ];

  pub fn label(&self) -> &'static str {
    match self {
      Field::FirstName => "First Name",
      Field::LastName => "Last Name",
      Field::MiddleName => "Middle Name",
      Field::Age => "Age",
      Field::Gender => "Gender",
      Field::CivilStatus => "Marital Status",
      Field::Address => "Address",
      Field::Barangay => "Barangay",
      Field::ContactNumber => "Contact #",
      Field::Occupation => "Occupation",
    }
  }

  /// Picked from a fixed list rather than typed
  pub fn is_choice(&self) -> bool {
    matches!(self, Field::Gender | Field::CivilStatus)
  }
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
  pub fn get(&self, field: Field) -> Option<&'static str> {
    self.0.get(&field).copied()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// First failing field in display order
  pub fn first(&self) -> Option<(Field, &'static str)> {
    self.0.iter().next().map(|(f, m)| (*f, *m))
  }

  fn add(&mut self, field: Field, message: &'static str) {
    self.0.insert(field, message);
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let messages: Vec<&str> = self.0.values().copied().collect();
    f.write_str(&messages.join(", "))
  }
}

/// Resident as typed into the form; text stays raw until validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentDraft {
  pub first_name: String,
  pub last_name: String,
  pub middle_name: String,
  pub age: String,
  pub gender: Gender,
  pub civil_status: CivilStatus,
  pub address: String,
  pub barangay: String,
  pub contact_number: String,
  pub occupation: String,
}

impl Default for ResidentDraft {
  fn default() -> Self {
    Self {
      first_name: String::new(),
      last_name: String::new(),
      middle_name: String::new(),
      age: "0".to_string(),
      gender: Gender::Male,
      civil_status: CivilStatus::Single,
      address: String::new(),
      barangay: String::new(),
      contact_number: String::new(),
      occupation: String::new(),
    }
  }
}

/// A draft that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
  first_name: String,
  last_name: String,
  middle_name: Option<String>,
  age: i64,
  gender: Gender,
  civil_status: CivilStatus,
  address: String,
  barangay: String,
  contact_number: Option<String>,
  occupation: Option<String>,
}

impl ResidentDraft {
  pub fn from_resident(r: &Resident) -> Self {
    Self {
      first_name: r.first_name.clone(),
      last_name: r.last_name.clone(),
      middle_name: r.middle_name.clone().unwrap_or_default(),
      age: r.age.to_string(),
      gender: r.gender,
      civil_status: r.civil_status,
      address: r.address.clone(),
      barangay: r.barangay.clone(),
      contact_number: r.contact_number.clone().unwrap_or_default(),
      occupation: r.occupation.clone().unwrap_or_default(),
    }
  }

  /// Raw text of a typed field; choice fields read as their label
  pub fn text(&self, field: Field) -> &str {
    match field {
      Field::FirstName => &self.first_name,
      Field::LastName => &self.last_name,
      Field::MiddleName => &self.middle_name,
      Field::Age => &self.age,
      Field::Gender => self.gender.as_str(),
      Field::CivilStatus => self.civil_status.as_str(),
      Field::Address => &self.address,
      Field::Barangay => &self.barangay,
      Field::ContactNumber => &self.contact_number,
      Field::Occupation => &self.occupation,
    }
  }

  /// Replace a typed field's text; choice fields are ignored
  pub fn set_text(&mut self, field: Field, value: String) {
    let slot = match field {
      Field::FirstName => &mut self.first_name,
      Field::LastName => &mut self.last_name,
      Field::MiddleName => &mut self.middle_name,
      Field::Age => &mut self.age,
      Field::Address => &mut self.address,
      Field::Barangay => &mut self.barangay,
      Field::ContactNumber => &mut self.contact_number,
      Field::Occupation => &mut self.occupation,
      Field::Gender | Field::CivilStatus => return,
    };
    *slot = value;
  }

  pub fn validate(&self) -> Result<ValidDraft, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let first_name = non_blank(&self.first_name);
    if first_name.is_none() {
      errors.add(Field::FirstName, "First name is required");
    }
    let last_name = non_blank(&self.last_name);
    if last_name.is_none() {
      errors.add(Field::LastName, "Last name is required");
    }
    let age = self.age.trim().parse::<i64>().ok().filter(|a| *a >= 0);
    if age.is_none() {
      errors.add(Field::Age, "Age must be a positive number");
    }
    let address = non_blank(&self.address);
    if address.is_none() {
      errors.add(Field::Address, "Address is required");
    }
    let barangay = non_blank(&self.barangay);
    if barangay.is_none() {
      errors.add(Field::Barangay, "Barangay is required");
    }

    match (first_name, last_name, age, address, barangay) {
      (Some(first_name), Some(last_name), Some(age), Some(address), Some(barangay)) => {
        Ok(ValidDraft {
          first_name,
          last_name,
          middle_name: non_blank(&self.middle_name),
          age,
          gender: self.gender,
          civil_status: self.civil_status,
          address,
          barangay,
          contact_number: non_blank(&self.contact_number),
          occupation: non_blank(&self.occupation),
        })
      }
      _ => Err(errors),
    }
  }
}

impl ValidDraft {
  /// Create body, stamped with the creating user
  pub fn into_new(self, created_by: i64) -> NewResident {
    NewResident {
      first_name: self.first_name,
      last_name: self.last_name,
      middle_name: self.middle_name,
      age: self.age,
      gender: self.gender,
      address: self.address,
      barangay: self.barangay,
      contact_number: self.contact_number,
      occupation: self.occupation,
      civil_status: self.civil_status,
      created_by,
    }
  }

  /// Update body holding only the fields that differ from `original`
  pub fn patch_against(&self, original: &Resident) -> ResidentPatch {
    fn changed<T: PartialEq + Clone>(new: &T, old: &T) -> Option<T> {
      (new != old).then(|| new.clone())
    }

    ResidentPatch {
      first_name: changed(&self.first_name, &original.first_name),
      last_name: changed(&self.last_name, &original.last_name),
      middle_name: changed(&self.middle_name, &original.middle_name),
      age: changed(&self.age, &original.age),
      gender: changed(&self.gender, &original.gender),
      address: changed(&self.address, &original.address),
      barangay: changed(&self.barangay, &original.barangay),
      contact_number: changed(&self.contact_number, &original.contact_number),
      occupation: changed(&self.occupation, &original.occupation),
      civil_status: changed(&self.civil_status, &original.civil_status),
    }
  }
}

/// Trimmed text, or `None` when blank (sent as null for optional fields)
fn non_blank(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fixtures::resident;

  fn filled() -> ResidentDraft {
    ResidentDraft {
      first_name: "Ana".to_string(),
      last_name: "Reyes".to_string(),
      age: "27".to_string(),
      address: "5 Bonifacio St".to_string(),
      barangay: "Poblacion".to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn test_defaults() {
    let draft = ResidentDraft::default();
    assert_eq!(draft.gender, Gender::Male);
    assert_eq!(draft.civil_status, CivilStatus::Single);
    assert_eq!(draft.age, "0");
  }

  #[test]
  fn test_empty_draft_reports_each_required_field() {
    let errors = ResidentDraft::default().validate().unwrap_err();
    assert_eq!(errors.len(), 4);
    assert_eq!(errors.get(Field::FirstName), Some("First name is required"));
    assert_eq!(errors.get(Field::LastName), Some("Last name is required"));
    assert_eq!(errors.get(Field::Address), Some("Address is required"));
    assert_eq!(errors.get(Field::Barangay), Some("Barangay is required"));
    assert_eq!(errors.get(Field::Age), None);
    assert_eq!(
      errors.first(),
      Some((Field::FirstName, "First name is required"))
    );
  }

  #[test]
  fn test_age_must_be_non_negative_integer() {
    for bad in ["-1", "abc", "", "3.5"] {
      let mut draft = filled();
      draft.age = bad.to_string();
      let errors = draft.validate().unwrap_err();
      assert_eq!(errors.get(Field::Age), Some("Age must be a positive number"));
    }
    let mut draft = filled();
    draft.age = " 0 ".to_string();
    assert!(draft.validate().is_ok());
  }

  #[test]
  fn test_blank_optionals_become_null() {
    let mut draft = filled();
    draft.middle_name = "   ".to_string();
    draft.occupation = " Farmer ".to_string();
    let new = draft.validate().unwrap().into_new(4);

    assert_eq!(new.middle_name, None);
    assert_eq!(new.contact_number, None);
    assert_eq!(new.occupation.as_deref(), Some("Farmer"));
    assert_eq!(new.created_by, 4);
    assert_eq!(new.age, 27);
  }

  #[test]
  fn test_patch_holds_only_changes() {
    let original = resident(3);
    let mut draft = ResidentDraft::from_resident(&original);
    assert!(draft.validate().unwrap().patch_against(&original).is_empty());

    draft.set_text(Field::Occupation, "Driver".to_string());
    draft.set_text(Field::Age, "31".to_string());
    draft.civil_status = CivilStatus::Married;
    let patch = draft.validate().unwrap().patch_against(&original);

    assert_eq!(patch.occupation, Some(Some("Driver".to_string())));
    assert_eq!(patch.age, Some(31));
    assert_eq!(patch.civil_status, Some(CivilStatus::Married));
    assert_eq!(patch.first_name, None);
  }

  #[test]
  fn test_clearing_optional_field_patches_null() {
    let mut original = resident(3);
    original.contact_number = Some("0917".to_string());
    let mut draft = ResidentDraft::from_resident(&original);
    draft.set_text(Field::ContactNumber, String::new());

    let patch = draft.validate().unwrap().patch_against(&original);
    assert_eq!(patch.contact_number, Some(None));
  }

  #[test]
  fn test_choice_fields_ignore_text() {
    let mut draft = filled();
    draft.set_text(Field::Gender, "Female".to_string());
    assert_eq!(draft.gender, Gender::Male);
    assert_eq!(draft.text(Field::Gender), "Male");
    assert!(Field::Gender.is_choice());
    assert!(!Field::Age.is_choice());
  }
}

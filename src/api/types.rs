use serde::{Deserialize, Serialize};
use std::fmt;

use super::api_types::lenient_int;

/// Resident gender as recorded by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

  pub fn as_str(&self) -> &'static str {
    match self {
      Gender::Male => "Male",
      Gender::Female => "Female",
    }
  }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CivilStatus {
  #[default]
  Single,
  Married,
  Divorced,
  Widowed,
}

impl CivilStatus {
  pub const ALL: [CivilStatus; 4] = [
    CivilStatus::Single,
    CivilStatus::Married,
    CivilStatus::Divorced,
    CivilStatus::Widowed,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      CivilStatus::Single => "Single",
      CivilStatus::Married => "Married",
      CivilStatus::Divorced => "Divorced",
      CivilStatus::Widowed => "Widowed",
    }
  }
}

impl fmt::Display for CivilStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A resident record as returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
  #[serde(deserialize_with = "lenient_int")]
  pub id: i64,
  pub first_name: String,
  pub last_name: String,
  #[serde(default)]
  pub middle_name: Option<String>,
  #[serde(deserialize_with = "lenient_int")]
  pub age: i64,
  pub gender: Gender,
  pub address: String,
  pub barangay: String,
  #[serde(default)]
  pub contact_number: Option<String>,
  #[serde(default)]
  pub occupation: Option<String>,
  #[serde(default)]
  pub civil_status: CivilStatus,
  #[serde(default, deserialize_with = "lenient_int")]
  pub created_by: i64,
  #[serde(default)]
  pub created_at: Option<String>,
  #[serde(default)]
  pub updated_at: Option<String>,
}

impl Resident {
  /// "First Middle Last", skipping an empty middle name
  pub fn full_name(&self) -> String {
    match self.middle_name.as_deref().filter(|m| !m.trim().is_empty()) {
      Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
      None => format!("{} {}", self.first_name, self.last_name),
    }
  }
}

/// Body of a create request: a resident without server-assigned fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResident {
  pub first_name: String,
  pub last_name: String,
  pub middle_name: Option<String>,
  pub age: i64,
  pub gender: Gender,
  pub address: String,
  pub barangay: String,
  pub contact_number: Option<String>,
  pub occupation: Option<String>,
  pub civil_status: CivilStatus,
  pub created_by: i64,
}

impl NewResident {
  /// Build the record the server would return, using placeholder identity fields
  pub fn into_resident(self, id: i64, timestamp: &str) -> Resident {
    Resident {
      id,
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
      created_by: self.created_by,
      created_at: Some(timestamp.to_string()),
      updated_at: Some(timestamp.to_string()),
    }
  }
}

/// Partial update body.
///
/// `None` leaves a field untouched and is omitted from the JSON body.
/// For nullable columns `Some(None)` clears the value (serialized as `null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResidentPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub middle_name: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub age: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gender: Option<Gender>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub address: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub barangay: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub contact_number: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub occupation: Option<Option<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub civil_status: Option<CivilStatus>,
}

impl ResidentPatch {
  pub fn is_empty(&self) -> bool {
    *self == ResidentPatch::default()
  }

  /// Merge the patch into a record, field by field
  pub fn apply_to(&self, resident: &mut Resident) {
    fn merge<T: Clone>(slot: &mut T, value: &Option<T>) {
      if let Some(v) = value {
        *slot = v.clone();
      }
    }

    merge(&mut resident.first_name, &self.first_name);
    merge(&mut resident.last_name, &self.last_name);
    merge(&mut resident.middle_name, &self.middle_name);
    merge(&mut resident.age, &self.age);
    merge(&mut resident.gender, &self.gender);
    merge(&mut resident.address, &self.address);
    merge(&mut resident.barangay, &self.barangay);
    merge(&mut resident.contact_number, &self.contact_number);
    merge(&mut resident.occupation, &self.occupation);
    merge(&mut resident.civil_status, &self.civil_status);
  }
}

/// One page of a server-paginated listing.
///
/// `total` is the full server-side count, not `items.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
  pub items: Vec<T>,
  pub page: u32,
  pub page_size: u32,
  pub total: u64,
}

impl<T> Paginated<T> {
  /// Number of pages, never less than one
  pub fn page_count(&self) -> u32 {
    page_count(self.total, self.page_size)
  }
}

pub fn page_count(total: u64, page_size: u32) -> u32 {
  if page_size == 0 {
    return 1;
  }
  let pages = total.div_ceil(page_size as u64);
  pages.clamp(1, u32::MAX as u64) as u32
}

/// Signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: i64,
  pub username: String,
  pub is_admin: bool,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct AuthSession {
  pub token: String,
  pub user: User,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fixtures::resident as sample;

  #[test]
  fn test_full_name_skips_blank_middle() {
    let mut r = sample(1);
    assert_eq!(r.full_name(), "Juan Dela Cruz");
    r.middle_name = Some("  ".to_string());
    assert_eq!(r.full_name(), "Juan Dela Cruz");
    r.middle_name = Some("Santos".to_string());
    assert_eq!(r.full_name(), "Juan Santos Dela Cruz");
  }

  #[test]
  fn test_patch_sets_and_clears_nullable_fields() {
    let mut r = sample(1);
    r.contact_number = Some("0917".to_string());

    let patch = ResidentPatch {
      occupation: Some(Some("Teacher".to_string())),
      contact_number: Some(None),
      ..Default::default()
    };
    patch.apply_to(&mut r);

    assert_eq!(r.occupation.as_deref(), Some("Teacher"));
    assert_eq!(r.contact_number, None);
    assert_eq!(r.first_name, "Juan");
  }

  #[test]
  fn test_patch_serialization_distinguishes_absent_and_null() {
    let patch = ResidentPatch {
      age: Some(31),
      middle_name: Some(None),
      ..Default::default()
    };
    let json = serde_json::to_value(&patch).unwrap();
    assert_eq!(json, serde_json::json!({ "age": 31, "middle_name": null }));
  }

  #[test]
  fn test_resident_defaults_civil_status() {
    let json = serde_json::json!({
      "id": "7",
      "first_name": "Maria",
      "last_name": "Clara",
      "age": 22,
      "gender": "Female",
      "address": "Rizal Ave",
      "barangay": "Poblacion",
      "created_by": 1
    });
    let r: Resident = serde_json::from_value(json).unwrap();
    assert_eq!(r.id, 7);
    assert_eq!(r.civil_status, CivilStatus::Single);
    assert_eq!(r.middle_name, None);
  }

  #[test]
  fn test_page_count() {
    assert_eq!(page_count(25, 10), 3);
    assert_eq!(page_count(20, 10), 2);
    assert_eq!(page_count(0, 10), 1);
    assert_eq!(page_count(5, 0), 1);
  }
}

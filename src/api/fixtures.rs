//! Shared test records.

use super::types::{CivilStatus, Gender, NewResident, Paginated, Resident};

pub fn resident(id: i64) -> Resident {
  Resident {
    id,
    first_name: "Juan".to_string(),
    last_name: "Dela Cruz".to_string(),
    middle_name: None,
    age: 30,
    gender: Gender::Male,
    address: "123 Mabini St".to_string(),
    barangay: "San Roque".to_string(),
    contact_number: None,
    occupation: None,
    civil_status: CivilStatus::Single,
    created_by: 1,
    created_at: None,
    updated_at: None,
  }
}

pub fn named(id: i64, first_name: &str, barangay: &str) -> Resident {
  Resident {
    first_name: first_name.to_string(),
    barangay: barangay.to_string(),
    ..resident(id)
  }
}

pub fn new_resident(first_name: &str) -> NewResident {
  NewResident {
    first_name: first_name.to_string(),
    last_name: "Santos".to_string(),
    middle_name: None,
    age: 41,
    gender: Gender::Female,
    address: "9 Luna St".to_string(),
    barangay: "Poblacion".to_string(),
    contact_number: Some("09171234567".to_string()),
    occupation: None,
    civil_status: CivilStatus::Married,
    created_by: 1,
  }
}

pub fn page(items: Vec<Resident>, total: u64) -> Paginated<Resident> {
  Paginated {
    items,
    page: 1,
    page_size: 10,
    total,
  }
}

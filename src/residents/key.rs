use serde::Serialize;
use std::fmt;

use crate::api::Gender;
use crate::cache::QueryKey;

/// Columns the server can order by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
  Id,
  FirstName,
  LastName,
  Barangay,
  Age,
  Gender,
  Occupation,
}

impl SortField {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortField::Id => "id",
      SortField::FirstName => "first_name",
      SortField::LastName => "last_name",
      SortField::Barangay => "barangay",
      SortField::Age => "age",
      SortField::Gender => "gender",
      SortField::Occupation => "occupation",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  Asc,
  Desc,
}

impl SortDirection {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortDirection::Asc => "asc",
      SortDirection::Desc => "desc",
    }
  }
}

/// Parameters of one residents listing; also its cache key.
///
/// Serializes to the list endpoint's query string, leaving unset values out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResidentsQuery {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub q: Option<String>,
  /// 1-based
  pub page: u32,
  #[serde(rename = "pageSize")]
  pub page_size: u32,
  #[serde(rename = "sortBy", skip_serializing_if = "Option::is_none")]
  pub sort_by: Option<SortField>,
  #[serde(rename = "sortDir", skip_serializing_if = "Option::is_none")]
  pub sort_dir: Option<SortDirection>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gender: Option<Gender>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub barangay: Option<String>,
}

impl ResidentsQuery {
  pub fn new(page: u32, page_size: u32) -> Self {
    Self {
      q: None,
      page,
      page_size,
      sort_by: None,
      sort_dir: None,
      gender: None,
      barangay: None,
    }
  }

  /// Set the free-text search; blank text means no search
  pub fn with_search(mut self, q: &str) -> Self {
    self.q = normalize_search(q);
    self
  }

  pub fn describe(&self) -> String {
    self.to_string()
  }
}

pub fn normalize_search(q: &str) -> Option<String> {
  let q = q.trim();
  if q.is_empty() {
    None
  } else {
    Some(q.to_string())
  }
}

impl fmt::Display for ResidentsQuery {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "page {} ({} per page)", self.page, self.page_size)?;
    if let Some(q) = &self.q {
      write!(f, " matching {:?}", q)?;
    }
    if let (Some(by), Some(dir)) = (self.sort_by, self.sort_dir) {
      write!(f, " by {} {}", by.as_str(), dir.as_str())?;
    }
    if let Some(gender) = self.gender {
      write!(f, " gender={}", gender)?;
    }
    if let Some(barangay) = &self.barangay {
      write!(f, " barangay={}", barangay)?;
    }
    Ok(())
  }
}

impl QueryKey for ResidentsQuery {
  fn namespace(&self) -> &'static str {
    "residents"
  }

  fn canonical(&self) -> String {
    format!(
      "q={}&page={}&pageSize={}&sortBy={}&sortDir={}&gender={}&barangay={}",
      self.q.as_deref().unwrap_or(""),
      self.page,
      self.page_size,
      self.sort_by.map(|s| s.as_str()).unwrap_or(""),
      self.sort_dir.map(|d| d.as_str()).unwrap_or(""),
      self.gender.map(|g| g.as_str()).unwrap_or(""),
      self.barangay.as_deref().unwrap_or(""),
    )
  }

  fn description(&self) -> String {
    format!("residents {}", self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_equal_params_share_a_key() {
    let a = ResidentsQuery::new(1, 10).with_search("ana");
    let b = ResidentsQuery::new(1, 10).with_search("  ana ");
    assert_eq!(a.cache_hash(), b.cache_hash());

    let c = ResidentsQuery::new(2, 10).with_search("ana");
    assert_ne!(a.cache_hash(), c.cache_hash());
  }

  #[test]
  fn test_blank_search_is_no_search() {
    let blank = ResidentsQuery::new(1, 10).with_search("   ");
    assert_eq!(blank.q, None);
    assert_eq!(blank.cache_hash(), ResidentsQuery::new(1, 10).cache_hash());
  }

  #[test]
  fn test_query_string_omits_unset_params() {
    let mut query = ResidentsQuery::new(3, 25);
    query.sort_by = Some(SortField::FirstName);
    query.sort_dir = Some(SortDirection::Asc);
    query.barangay = Some("San Roque".to_string());

    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "page": 3,
        "pageSize": 25,
        "sortBy": "first_name",
        "sortDir": "asc",
        "barangay": "San Roque"
      })
    );
  }

  #[test]
  fn test_description() {
    let mut query = ResidentsQuery::new(2, 10).with_search("cruz");
    query.gender = Some(Gender::Male);
    assert_eq!(
      query.description(),
      "residents page 2 (10 per page) matching \"cruz\" gender=Male"
    );
  }
}

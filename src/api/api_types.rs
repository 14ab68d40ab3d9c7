//! Serde-deserializable types matching the registry API responses.
//!
//! The PHP endpoints are loose about numbers (ids and counts sometimes arrive
//! as strings), so the envelopes here accept both and convert into the domain
//! types in `types.rs`.

use serde::{Deserialize, Deserializer, Serialize};

use super::types::{AuthSession, Paginated, Resident, User};

/// Accept an integer encoded either as a JSON number or a numeric string.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
  }

  match NumberOrString::deserialize(deserializer)? {
    NumberOrString::Int(n) => Ok(n),
    NumberOrString::Float(f) if f.fract() == 0.0 => Ok(f as i64),
    NumberOrString::Float(f) => Err(serde::de::Error::custom(format!(
      "expected an integer, got {}",
      f
    ))),
    NumberOrString::Text(s) => s
      .trim()
      .parse::<i64>()
      .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {:?}", s))),
  }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let n = lenient_int(deserializer)?;
  u64::try_from(n).map_err(|_| serde::de::Error::custom(format!("expected a count, got {}", n)))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
  }

  Ok(match Flag::deserialize(deserializer)? {
    Flag::Bool(b) => b,
    Flag::Int(n) => n == 1,
    Flag::Text(s) => s.trim() == "1",
  })
}

// ============================================================================
// Residents
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiResidentsPage {
  #[serde(default)]
  pub data: Vec<Resident>,
  #[serde(default, deserialize_with = "lenient_int")]
  pub page: i64,
  #[serde(rename = "pageSize", default, deserialize_with = "lenient_int")]
  pub page_size: i64,
  #[serde(default, deserialize_with = "lenient_u64")]
  pub total: u64,
}

/// Non-negative `n` as a u32, pinned at `u32::MAX` when it does not fit
fn saturating_u32(n: i64) -> u32 {
  u32::try_from(n).unwrap_or(u32::MAX)
}

impl From<ApiResidentsPage> for Paginated<Resident> {
  fn from(page: ApiResidentsPage) -> Self {
    Paginated {
      items: page.data,
      page: saturating_u32(page.page.max(1)),
      page_size: saturating_u32(page.page_size.max(0)),
      total: page.total,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiResidentResponse {
  #[serde(default)]
  pub message: String,
  pub resident: Resident,
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
  #[serde(default)]
  pub message: String,
}

/// Error payload returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
  pub message: Option<String>,
  pub error: Option<String>,
}

impl ApiErrorBody {
  pub fn into_message(self) -> Option<String> {
    self
      .message
      .or(self.error)
      .map(|m| m.trim().to_string())
      .filter(|m| !m.is_empty())
  }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiLoginRequest<'a> {
  pub username: &'a str,
  pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
  #[serde(deserialize_with = "lenient_int")]
  pub id: i64,
  pub username: String,
  #[serde(rename = "isAdmin", default, deserialize_with = "lenient_flag")]
  pub is_admin: bool,
}

impl From<ApiUser> for User {
  fn from(user: ApiUser) -> Self {
    User {
      id: user.id,
      username: user.username,
      is_admin: user.is_admin,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiLoginResponse {
  pub token: String,
  pub user: ApiUser,
}

impl From<ApiLoginResponse> for AuthSession {
  fn from(resp: ApiLoginResponse) -> Self {
    AuthSession {
      token: resp.token,
      user: resp.user.into(),
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiMeResponse {
  pub user: ApiUser,
}

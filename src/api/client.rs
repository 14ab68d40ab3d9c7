use crate::api::api_types::{
  ApiErrorBody, ApiLoginRequest, ApiLoginResponse, ApiMeResponse, ApiMessage,
  ApiResidentResponse, ApiResidentsPage,
};
use crate::api::error::ApiError;
use crate::api::types::{AuthSession, NewResident, Paginated, Resident, ResidentPatch, User};
use crate::config::{Config, EndpointStyle};
use crate::residents::ResidentsQuery;
use crate::session::SessionStore;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Endpoints exposed by the registry backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  ListResidents,
  CreateResident,
  UpdateResident(i64),
  DeleteResident(i64),
  Login,
  Me,
}

impl Endpoint {
  pub fn method(&self) -> Method {
    match self {
      Endpoint::ListResidents | Endpoint::Me => Method::GET,
      Endpoint::CreateResident | Endpoint::Login => Method::POST,
      Endpoint::UpdateResident(_) => Method::PUT,
      Endpoint::DeleteResident(_) => Method::DELETE,
    }
  }

  /// Path relative to the API base URL
  pub fn path(&self, style: EndpointStyle) -> &'static str {
    match (self, style) {
      (Endpoint::ListResidents, EndpointStyle::Plain) => "residents",
      (Endpoint::ListResidents, EndpointStyle::Php) => "residents/index.php",
      (Endpoint::CreateResident, EndpointStyle::Plain) => "residents/create",
      (Endpoint::CreateResident, EndpointStyle::Php) => "residents/create.php",
      (Endpoint::UpdateResident(_), EndpointStyle::Plain) => "residents/update",
      (Endpoint::UpdateResident(_), EndpointStyle::Php) => "residents/update.php",
      (Endpoint::DeleteResident(_), EndpointStyle::Plain) => "residents/delete",
      (Endpoint::DeleteResident(_), EndpointStyle::Php) => "residents/delete.php",
      (Endpoint::Login, EndpointStyle::Plain) => "auth/login",
      (Endpoint::Login, EndpointStyle::Php) => "auth/login.php",
      (Endpoint::Me, EndpointStyle::Plain) => "auth/me",
      (Endpoint::Me, EndpointStyle::Php) => "auth/me.php",
    }
  }

  fn record_id(&self) -> Option<i64> {
    match self {
      Endpoint::UpdateResident(id) | Endpoint::DeleteResident(id) => Some(*id),
      _ => None,
    }
  }
}

/// Registry API client.
///
/// Cheap to clone; every request reads the current token from the shared
/// [`SessionStore`] and sends it as a bearer header when present.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base: Url,
  style: EndpointStyle,
  session: SessionStore,
}

impl ApiClient {
  pub fn new(config: &Config, session: SessionStore) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(secs) = config.api.timeout_secs {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let http = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base: base_url(&config.api.url)?,
      style: config.api.endpoint_style,
      session,
    })
  }

  pub fn session(&self) -> &SessionStore {
    &self.session
  }

  /// Absolute URL for an endpoint, with the `id` query parameter where needed
  pub fn endpoint_url(&self, endpoint: Endpoint) -> std::result::Result<Url, ApiError> {
    let mut url = self.base.join(endpoint.path(self.style))?;
    if let Some(id) = endpoint.record_id() {
      url.query_pairs_mut().append_pair("id", &id.to_string());
    }
    Ok(url)
  }

  fn request(&self, endpoint: Endpoint) -> std::result::Result<RequestBuilder, ApiError> {
    let url = self.endpoint_url(endpoint)?;
    let mut request = self.http.request(endpoint.method(), url);
    if let Some(token) = self.session.token() {
      request = request.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    Ok(request)
  }

  /// Fetch one page of residents
  pub async fn list_residents(
    &self,
    query: &ResidentsQuery,
  ) -> std::result::Result<Paginated<Resident>, ApiError> {
    debug!(query = %query.describe(), "listing residents");
    let response = self
      .request(Endpoint::ListResidents)?
      .query(query)
      .send()
      .await?;
    let page: ApiResidentsPage = decode(response).await?;
    Ok(page.into())
  }

  pub async fn create_resident(
    &self,
    payload: &NewResident,
  ) -> std::result::Result<Resident, ApiError> {
    let response = self
      .request(Endpoint::CreateResident)?
      .json(payload)
      .send()
      .await?;
    let created: ApiResidentResponse = decode(response).await?;
    debug!(id = created.resident.id, message = %created.message, "resident created");
    Ok(created.resident)
  }

  pub async fn update_resident(
    &self,
    id: i64,
    patch: &ResidentPatch,
  ) -> std::result::Result<Resident, ApiError> {
    let response = self
      .request(Endpoint::UpdateResident(id))?
      .json(patch)
      .send()
      .await?;
    let updated: ApiResidentResponse = decode(response).await?;
    debug!(id, message = %updated.message, "resident updated");
    Ok(updated.resident)
  }

  /// Archive (soft-delete) a resident, returning the server's message
  pub async fn archive_resident(&self, id: i64) -> std::result::Result<String, ApiError> {
    let response = self
      .request(Endpoint::DeleteResident(id))?
      .send()
      .await?;
    let archived: ApiMessage = decode(response).await?;
    debug!(id, message = %archived.message, "resident archived");
    Ok(archived.message)
  }

  pub async fn login(
    &self,
    username: &str,
    password: &str,
  ) -> std::result::Result<AuthSession, ApiError> {
    let response = self
      .request(Endpoint::Login)?
      .json(&ApiLoginRequest { username, password })
      .send()
      .await?;
    let login: ApiLoginResponse = decode(response).await?;
    Ok(login.into())
  }

  /// Current user for the stored token
  pub async fn me(&self) -> std::result::Result<User, ApiError> {
    let response = self.request(Endpoint::Me)?.send().await?;
    let me: ApiMeResponse = decode(response).await?;
    Ok(me.user.into())
  }
}

/// Parse the base URL, making sure relative endpoint paths nest under it
fn base_url(raw: &str) -> Result<Url> {
  let mut url = Url::parse(raw).map_err(|e| eyre!("Invalid API url {:?}: {}", raw, e))?;
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}

async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, ApiError> {
  let status = response.status();
  let url = response.url().clone();
  let body = response.bytes().await?;

  if !status.is_success() {
    let message = serde_json::from_slice::<ApiErrorBody>(&body)
      .ok()
      .and_then(ApiErrorBody::into_message);
    warn!(%url, status = status.as_u16(), "request rejected");
    return Err(ApiError::rejected(status, message));
  }

  serde_json::from_slice(&body).map_err(|e| {
    warn!(%url, error = %e, "could not decode response");
    ApiError::Decode(e.to_string())
  })
}

use reqwest::StatusCode;

/// Errors returned by the registry API client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  /// Connection, TLS, or timeout failure before a response arrived
  #[error("network error: {0}")]
  Transport(#[from] reqwest::Error),
  /// Server answered with a non-success status; `message` is shown to the user as-is
  #[error("{message}")]
  Rejected { status: StatusCode, message: String },
  /// Response body did not match the expected shape
  #[error("unexpected response from server: {0}")]
  Decode(String),
  #[error("invalid request url: {0}")]
  Url(#[from] url::ParseError),
}

impl ApiError {
  pub fn rejected(status: StatusCode, message: Option<String>) -> Self {
    let message = message.unwrap_or_else(|| {
      status
        .canonical_reason()
        .map(String::from)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
    });
    ApiError::Rejected { status, message }
  }

  /// The server no longer accepts the bearer token.
  ///
  /// 403 is not expiry: the token is fine, the action is not allowed.
  pub fn is_session_expired(&self) -> bool {
    matches!(self, ApiError::Rejected { status, .. } if *status == StatusCode::UNAUTHORIZED)
  }

  /// Whether repeating the same request could succeed
  pub fn is_retryable(&self) -> bool {
    match self {
      ApiError::Transport(_) => true,
      ApiError::Rejected { status, .. } => status.is_server_error(),
      ApiError::Decode(_) | ApiError::Url(_) => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rejected_falls_back_to_reason() {
    let err = ApiError::rejected(StatusCode::NOT_FOUND, None);
    assert_eq!(err.to_string(), "Not Found");

    let err = ApiError::rejected(StatusCode::BAD_REQUEST, Some("Age is required".into()));
    assert_eq!(err.to_string(), "Age is required");
  }

  #[test]
  fn test_session_expiry_and_retry_classification() {
    let unauthorized = ApiError::rejected(StatusCode::UNAUTHORIZED, None);
    assert!(unauthorized.is_session_expired());
    assert!(!unauthorized.is_retryable());

    let forbidden = ApiError::rejected(StatusCode::FORBIDDEN, Some("Admins only".into()));
    assert!(!forbidden.is_session_expired());
    assert!(!forbidden.is_retryable());

    let unavailable = ApiError::rejected(StatusCode::SERVICE_UNAVAILABLE, None);
    assert!(!unavailable.is_session_expired());
    assert!(unavailable.is_retryable());

    assert!(!ApiError::Decode("bad json".into()).is_retryable());
  }
}

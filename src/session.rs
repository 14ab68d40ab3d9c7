//! Persisted sign-in state.
//!
//! The bearer token survives restarts in `<data_dir>/brgy/session.json`.
//! A missing or unreadable file is treated as "signed out".

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
  token: String,
}

/// File-backed token store shared by the API client and the app.
#[derive(Debug, Clone)]
pub struct SessionStore {
  path: PathBuf,
  token: Arc<RwLock<Option<String>>>,
}

impl SessionStore {
  /// Open the store at the default location.
  pub fn open() -> Result<Self> {
    Ok(Self::at(Self::default_path()?))
  }

  /// Open the store at an explicit path, loading any token already saved there.
  pub fn at(path: impl Into<PathBuf>) -> Self {
    let path = path.into();
    let token = read_token(&path);
    debug!(path = %path.display(), signed_in = token.is_some(), "session loaded");
    Self {
      path,
      token: Arc::new(RwLock::new(token)),
    }
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("brgy").join("session.json"))
  }

  pub fn token(&self) -> Option<String> {
    self.token.read().map(|t| t.clone()).unwrap_or_else(|e| e.into_inner().clone())
  }

  pub fn is_signed_in(&self) -> bool {
    self.token().is_some()
  }

  /// Use `token` from now on and persist it, replacing any previous one.
  ///
  /// The token stays active for this run even when writing the file fails.
  pub fn save(&self, token: &str) -> Result<()> {
    self.set(Some(token.to_string()));

    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create session directory: {}", e))?;
    }

    let body = serde_json::to_vec(&SessionFile {
      token: token.to_string(),
    })
    .map_err(|e| eyre!("Failed to serialize session: {}", e))?;

    std::fs::write(&self.path, body)
      .map_err(|e| eyre!("Failed to write session {}: {}", self.path.display(), e))?;

    Ok(())
  }

  /// Forget the token. Removing an already-missing file is not an error.
  pub fn clear(&self) -> Result<()> {
    self.set(None);
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(eyre!(
        "Failed to remove session {}: {}",
        self.path.display(),
        e
      )),
    }
  }

  fn set(&self, token: Option<String>) {
    match self.token.write() {
      Ok(mut slot) => *slot = token,
      Err(e) => *e.into_inner() = token,
    }
  }
}

fn read_token(path: &Path) -> Option<String> {
  let contents = match std::fs::read(path) {
    Ok(c) => c,
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
    Err(e) => {
      warn!(path = %path.display(), error = %e, "could not read session file");
      return None;
    }
  };

  match serde_json::from_slice::<SessionFile>(&contents) {
    Ok(file) if !file.token.trim().is_empty() => Some(file.token),
    Ok(_) => None,
    Err(e) => {
      warn!(path = %path.display(), error = %e, "ignoring malformed session file");
      None
    }
  }
}

use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  /// Custom title for header (defaults to the API host if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub table: TableConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub defaults: DefaultsConfig,
}

/// How endpoint paths are spelled on the server
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStyle {
  /// `residents`, `residents/create`, `auth/login`, ...
  #[default]
  Plain,
  /// `residents/index.php`, `residents/create.php`, `auth/login.php`, ...
  Php,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL every endpoint path is resolved against (e.g. http://localhost/backend)
  pub url: String,
  #[serde(default)]
  pub endpoint_style: EndpointStyle,
  /// Request timeout; the transport default applies when unset
  pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
  #[serde(default = "default_page_size")]
  pub page_size: u32,
}

impl Default for TableConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
    }
  }
}

fn default_page_size() -> u32 {
  10
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Seconds before a cached page counts as stale (0 = revalidate on every view)
  #[serde(default)]
  pub stale_secs: u64,
  /// Seconds an unobserved page stays in memory
  #[serde(default = "default_gc_secs")]
  pub gc_secs: u64,
  /// Retries for failed list fetches (mutations are never retried)
  #[serde(default = "default_retry")]
  pub retry: u32,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_secs: 0,
      gc_secs: default_gc_secs(),
      retry: default_retry(),
    }
  }
}

impl CacheConfig {
  pub fn stale_time(&self) -> Duration {
    Duration::from_secs(self.stale_secs)
  }

  pub fn gc_time(&self) -> Duration {
    Duration::from_secs(self.gc_secs)
  }
}

fn default_gc_secs() -> u64 {
  300
}

fn default_retry() -> u32 {
  3
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsConfig {
  /// User id stamped on created residents; the signed-in user's id when unset
  pub created_by: Option<i64>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./brgy.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/brgy/config.yaml
  ///
  /// `BRGY_API_URL` then `api_url` (the `--api-url` flag) override `api.url`
  /// afterwards, and either one is enough to run without a file.
  pub fn load(explicit_path: Option<&Path>, api_url: Option<&str>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    Self::resolve(path.as_deref(), std::env::var("BRGY_API_URL").ok(), api_url)
  }

  /// Layer file < environment < command line, then validate
  fn resolve(path: Option<&Path>, env_url: Option<String>, cli_url: Option<&str>) -> Result<Self> {
    let override_url = cli_url.map(String::from).or(env_url);

    let mut config = match (path, override_url.clone()) {
      (Some(p), _) => Self::load_from_path(p)?,
      (None, Some(url)) => Self::with_url(url),
      (None, None) => {
        return Err(eyre!(
          "No configuration file found. Create one at ~/.config/brgy/config.yaml,\n\
           set BRGY_API_URL, or pass --api-url."
        ))
      }
    };

    if let Some(url) = override_url {
      config.api.url = url;
    }

    config.validate()?;
    Ok(config)
  }

  /// Minimal configuration pointing at `url`, everything else defaulted
  pub fn with_url(url: impl Into<String>) -> Self {
    Self {
      api: ApiConfig {
        url: url.into(),
        endpoint_style: EndpointStyle::default(),
        timeout_secs: None,
      },
      title: None,
      table: TableConfig::default(),
      cache: CacheConfig::default(),
      defaults: DefaultsConfig::default(),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("brgy.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("brgy").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    url::Url::parse(&self.api.url)
      .map_err(|e| eyre!("Invalid api.url {:?}: {}", self.api.url, e))?;
    if self.table.page_size == 0 {
      return Err(eyre!("table.page_size must be at least 1"));
    }
    Ok(())
  }

  /// Header title: the configured one or the API host
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    url::Url::parse(&self.api.url)
      .ok()
      .and_then(|u| u.host_str().map(String::from))
      .unwrap_or_else(|| self.api.url.clone())
  }
}

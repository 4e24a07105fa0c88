use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  /// Hosted backend connection. Absent means the gateway is unconfigured
  /// and reads are served from the local mirror alone.
  pub backend: Option<BackendConfig>,
  #[serde(default)]
  pub content: ContentConfig,
  #[serde(default)]
  pub mirror: MirrorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Base URL of the backend's REST endpoint (e.g. ".../rest/v1")
  pub url: String,
  /// Identity stamped onto maintainer writes (e.g. an account email)
  pub maintainer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentConfig {
  /// Slugs hidden from every viewer (case-insensitive)
  #[serde(default, deserialize_with = "deserialize_lowercase_set")]
  pub hidden_slugs: BTreeSet<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
  /// Set false to disable the local mirror entirely
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Mirror database location (default: platform data dir)
  pub path: Option<PathBuf>,
}

impl Default for MirrorConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

fn default_true() -> bool {
  true
}

fn deserialize_lowercase_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: Vec<String> = Vec::deserialize(deserializer)?;
  Ok(v.into_iter().map(|s| s.to_lowercase()).collect())
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./folio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/folio/config.yaml
  ///
  /// A missing config file is not an error: an unconfigured backend is a
  /// supported state, so defaults (mirror-only) apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => {
        info!("No configuration file found, running with defaults (mirror-only)");
        Ok(Config::default())
      }
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("folio.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("folio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the backend API key from the environment.
  ///
  /// Without it the gateway counts as unconfigured even when a backend
  /// section is present.
  pub fn get_api_key() -> Result<String> {
    std::env::var("FOLIO_API_KEY")
      .map_err(|_| eyre!("Backend API key not found. Set the FOLIO_API_KEY environment variable."))
  }

  /// Get the maintainer bearer token, if one is set.
  ///
  /// Its presence makes this session the authenticated maintainer: writes
  /// carry it and non-published records become visible.
  pub fn get_service_token() -> Option<String> {
    std::env::var("FOLIO_SERVICE_TOKEN").ok()
  }
}

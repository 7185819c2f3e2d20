//! Runtime server configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Deserialised from `config.toml` layered with `HR_*` environment variables.
/// Every field has a default so the file is optional.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("hr.sqlite3") }

impl ServerConfig {
  /// Load from the TOML file at `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("HR"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = from_toml("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.store_path, PathBuf::from("hr.sqlite3"));
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml("host = \"0.0.0.0\"\nport = 9000\nstore_path = \"/var/lib/hr.db\"");
    assert_eq!(cfg.address(), "0.0.0.0:9000");
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/hr.db"));
  }

  #[test]
  fn non_tilde_paths_are_unchanged() {
    assert_eq!(expand_tilde(Path::new("/tmp/hr.db")), PathBuf::from("/tmp/hr.db"));
  }
}

//! Server settings: an optional TOML file overlaid with `CASEDESK_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use casedesk_extract::LlmConfig;
use serde::Deserialize;

/// Fallback source for the model API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Insert the demo cases when the store is empty.
  #[serde(default)]
  pub seed_demo_data: bool,
  #[serde(default)]
  pub llm:            LlmConfig,
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "casedesk.db")?
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("CASEDESK")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.apply_key_fallback(std::env::var(API_KEY_ENV).ok());
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  fn apply_key_fallback(&mut self, key: Option<String>) {
    if self.llm.is_unauthenticated()
      && let Some(key) = key.filter(|k| !k.trim().is_empty())
    {
      self.llm.api_key = key;
    }
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
  use casedesk_core::vocab::ModelTier;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .set_default("host", "127.0.0.1")
      .unwrap()
      .set_default("port", 8080)
      .unwrap()
      .set_default("store_path", "casedesk.db")
      .unwrap()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn defaults_apply_to_empty_file() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert!(!cfg.seed_demo_data);
    assert_eq!(cfg.llm, LlmConfig::default());
    assert_eq!(cfg.llm.timeout_secs, 60);
  }

  #[test]
  fn nested_llm_table_is_read() {
    let cfg = parse(
      r#"
        port = 9000
        seed_demo_data = true

        [llm]
        default_tier = "smart"
        api_key = "sk-file"
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert!(cfg.seed_demo_data);
    assert_eq!(cfg.llm.default_tier, ModelTier::Smart);
    assert_eq!(cfg.llm.api_key, "sk-file");
    assert_eq!(cfg.llm.base_url, "https://openrouter.ai/api/v1");
  }

  #[test]
  fn env_key_only_fills_an_empty_key() {
    let mut cfg = parse("");
    cfg.apply_key_fallback(Some("sk-env".into()));
    assert_eq!(cfg.llm.api_key, "sk-env");

    let mut cfg = parse("[llm]\napi_key = \"sk-file\"");
    cfg.apply_key_fallback(Some("sk-env".into()));
    assert_eq!(cfg.llm.api_key, "sk-file");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else {
      return;
    };
    assert_eq!(
      expand_tilde(Path::new("~/cases.db")),
      PathBuf::from(home).join("cases.db")
    );
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}

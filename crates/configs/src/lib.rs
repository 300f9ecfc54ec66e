use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::warn;

/// Environment variables consulted when the TOML leaves a backend value empty.
/// The `VITE_` names are accepted so an existing frontend `.env` can be reused.
pub const URL_ENV_VARS: [&str; 2] = ["SUPABASE_URL", "VITE_SUPABASE_URL"];
pub const KEY_ENV_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSection {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,
}

fn default_table() -> String { "schools".into() }
fn default_bucket() -> String { "schools".into() }
fn default_image_prefix() -> String { "school-images".into() }

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            table: default_table(),
            bucket: default_bucket(),
            image_prefix: default_image_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

/// Connection details for the hosted backend.
///
/// Both the endpoint and the access key must be present for the backend to be
/// reachable; anything less is the `Unconfigured` state, which callers treat as
/// an expected condition rather than a startup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Configured {
        endpoint: String,
        key: String,
        table: String,
        bucket: String,
        image_prefix: String,
    },
    Unconfigured,
}

impl BackendConfig {
    /// Configured backend using the default table, bucket and image prefix.
    pub fn configured(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        let defaults = BackendSection::default();
        Self::Configured {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            key: key.into(),
            table: defaults.table,
            bucket: defaults.bucket,
            image_prefix: defaults.image_prefix,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured { .. })
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

/// Load configuration from a TOML file. A missing file yields defaults so the
/// binary can run from environment variables alone.
pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(anyhow!("cannot read {path}: {e}")),
    };
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.backend.normalize_from_env();
        self.backend.validate()?;
        Ok(())
    }

    /// Resolve the backend section into its two-state form.
    pub fn backend(&self) -> BackendConfig {
        self.backend.to_backend_config()
    }
}

impl BackendSection {
    /// Fill empty values from the environment; first non-empty variable wins.
    pub fn normalize_from_env(&mut self) {
        self.normalize_with(|name| std::env::var(name).ok());
    }

    fn normalize_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|n| lookup(*n))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };
        if self.url.trim().is_empty() {
            if let Some(url) = first(&URL_ENV_VARS) {
                self.url = url;
            }
        }
        if self.anon_key.trim().is_empty() {
            if let Some(key) = first(&KEY_ENV_VARS) {
                self.anon_key = key;
            }
        }
        self.url = self.url.trim().trim_end_matches('/').to_string();
        self.anon_key = self.anon_key.trim().to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if !self.url.is_empty() {
            let lower = self.url.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("backend.url must start with http:// or https://"));
            }
        }
        for (field, value) in [("table", &self.table), ("bucket", &self.bucket)] {
            if value.trim().is_empty() || value.contains('/') {
                return Err(anyhow!("backend.{field} must be a non-empty name without '/'"));
            }
        }
        if self.image_prefix.trim_matches('/').trim().is_empty() {
            return Err(anyhow!("backend.image_prefix must not be empty"));
        }
        Ok(())
    }

    pub fn to_backend_config(&self) -> BackendConfig {
        if self.url.is_empty() || self.anon_key.is_empty() {
            warn!(
                has_url = !self.url.is_empty(),
                has_key = !self.anon_key.is_empty(),
                "backend url or anon key missing; database features disabled"
            );
            return BackendConfig::Unconfigured;
        }
        BackendConfig::Configured {
            endpoint: self.url.clone(),
            key: self.anon_key.clone(),
            table: self.table.clone(),
            bucket: self.bucket.clone(),
            image_prefix: self.image_prefix.trim_matches('/').to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!("missing_{}.toml", uuid::Uuid::new_v4()));
        let cfg = load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.backend.table, "schools");
        assert_eq!(cfg.backend.bucket, "schools");
        assert_eq!(cfg.backend.image_prefix, "school-images");
        assert!(!cfg.logging.json);
    }

    #[test]
    fn parses_toml_sections() {
        let path = std::env::temp_dir().join(format!("cfg_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[backend]\nurl = \"https://demo.example.co/\"\nanon_key = \"k\"\nbucket = \"media\"\n\n[logging]\njson = true\n",
        )
        .unwrap();
        let mut cfg = load_from_file(path.to_str().unwrap()).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert!(cfg.logging.json);
        assert_eq!(
            cfg.backend(),
            BackendConfig::Configured {
                endpoint: "https://demo.example.co".into(),
                key: "k".into(),
                table: "schools".into(),
                bucket: "media".into(),
                image_prefix: "school-images".into(),
            }
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("bad_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[backend\nurl = ").unwrap();
        assert!(load_from_file(path.to_str().unwrap()).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn env_fills_empty_values_with_vite_fallback() {
        let mut section = BackendSection::default();
        section.normalize_with(lookup(&[
            ("SUPABASE_URL", "  "),
            ("VITE_SUPABASE_URL", "https://x.example.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]));
        assert_eq!(section.url, "https://x.example.co");
        assert_eq!(section.anon_key, "anon");
        assert!(section.to_backend_config().is_configured());
    }

    #[test]
    fn toml_values_win_over_env() {
        let mut section = BackendSection { url: "https://toml.example.co".into(), ..Default::default() };
        section.normalize_with(lookup(&[("SUPABASE_URL", "https://env.example.co"), ("SUPABASE_ANON_KEY", "k")]));
        assert_eq!(section.url, "https://toml.example.co");
    }

    #[test]
    fn one_missing_value_is_unconfigured() {
        let mut section = BackendSection::default();
        section.normalize_with(lookup(&[("SUPABASE_URL", "https://x.example.co")]));
        assert_eq!(section.to_backend_config(), BackendConfig::Unconfigured);
        // unconfigured is not a validation failure
        assert!(section.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_url() {
        let section = BackendSection { url: "postgres://db".into(), anon_key: "k".into(), ..Default::default() };
        assert!(section.validate().is_err());
    }

    #[test]
    fn configured_helper_trims_trailing_slash() {
        match BackendConfig::configured("http://127.0.0.1:9/", "k") {
            BackendConfig::Configured { endpoint, table, .. } => {
                assert_eq!(endpoint, "http://127.0.0.1:9");
                assert_eq!(table, "schools");
            }
            BackendConfig::Unconfigured => panic!("expected configured"),
        }
    }
}

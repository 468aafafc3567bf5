// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{DbSnpError, Result};
use crate::utils::validation::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const API_KEY_ENV: &str = "NCBI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ncbi: NcbiConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NcbiConfig {
    pub eutils_base_url: String,
    pub variation_base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub tool: String,
    pub email: Option<String>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    pub fetch_summaries: bool,
}

impl Default for NcbiConfig {
    fn default() -> Self {
        Self {
            eutils_base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            variation_base_url: "https://api.ncbi.nlm.nih.gov/variation/v0".to_string(),
            api_key: None,
            timeout_secs: 10,
            tool: "dbsnp_mcp".to_string(),
            email: None,
            user_agent: concat!("dbsnp_mcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl NcbiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// NCBI allows 10 requests/s with a key and 3 without.
    pub fn allowed_requests_per_second(&self) -> u32 {
        if self.api_key.is_some() { 10 } else { 3 }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
            fetch_summaries: true,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DBSNP_MCP")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| DbSnpError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| DbSnpError::Config(e.to_string()))?;

        config.apply_api_key(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Fills in the API key from the environment unless one is already set.
    /// Blank values count as absent.
    pub fn apply_api_key(&mut self, env_key: Option<String>) {
        let configured = self
            .ncbi
            .api_key
            .take()
            .filter(|k| !k.trim().is_empty());
        self.ncbi.api_key = configured.or_else(|| {
            env_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        });
    }

    pub fn validate(&self) -> Result<()> {
        if self.ncbi.timeout_secs == 0 {
            return Err(DbSnpError::Config(
                "ncbi.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Validator::validate_url(&self.ncbi.eutils_base_url)
            .map_err(|e| DbSnpError::Config(format!("ncbi.eutils_base_url: {}", e)))?;
        Validator::validate_url(&self.ncbi.variation_base_url)
            .map_err(|e| DbSnpError::Config(format!("ncbi.variation_base_url: {}", e)))?;

        if self.search.max_limit == 0 {
            return Err(DbSnpError::Config(
                "search.max_limit must be greater than 0".to_string(),
            ));
        }

        if self.search.default_limit == 0 || self.search.default_limit > self.search.max_limit {
            return Err(DbSnpError::Config(format!(
                "search.default_limit must be between 1 and {}",
                self.search.max_limit
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.search.max_limit, 50);
        assert_eq!(config.ncbi.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[ncbi]
timeout_secs = 4
api_key = "file-key"
email = "someone@example.org"

[search]
max_limit = 20
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.ncbi.timeout_secs, 4);
        assert_eq!(config.ncbi.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.ncbi.email.as_deref(), Some("someone@example.org"));
        assert_eq!(config.search.max_limit, 20);
        assert_eq!(config.search.default_limit, 10);
        assert!(config.ncbi.eutils_base_url.starts_with("https://"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[ncbi]\ntimeout_secs = 0\n").unwrap();
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(DbSnpError::Config(_))
        ));
    }

    #[test]
    fn test_apply_api_key() {
        let mut config = Config::default_config();
        config.apply_api_key(Some("  env-key ".to_string()));
        assert_eq!(config.ncbi.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.ncbi.allowed_requests_per_second(), 10);

        config.apply_api_key(Some("other".to_string()));
        assert_eq!(config.ncbi.api_key.as_deref(), Some("env-key"));

        let mut config = Config::default_config();
        config.apply_api_key(Some("   ".to_string()));
        assert!(config.ncbi.api_key.is_none());
        assert_eq!(config.ncbi.allowed_requests_per_second(), 3);
    }

    #[test]
    fn test_validate_limits() {
        let mut config = Config::default_config();
        config.search.default_limit = 60;
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.ncbi.variation_base_url = "api.ncbi.nlm.nih.gov".to_string();
        assert!(config.validate().is_err());
    }
}

//! Provider configuration: credentials, customer scope and target cloud.
//!
//! Values come from an optional YAML file (`~/.zpa/config.yaml` by default) and are
//! overridden by command-line flags or `ZPA_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

use crate::error::ProviderError;
use crate::traits::FileSystem;

const CONFIG_DIR: &str = ".zpa";
const CONFIG_FILE: &str = "config.yaml";

/// ZPA clouds and their management API base URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cloud {
    Production,
    ZpaTwo,
    Beta,
    Gov,
    GovUs,
    Preview,
}

impl Cloud {
    pub fn base_url(&self) -> &'static str {
        match self {
            Cloud::Production => "https://config.private.zscaler.com",
            Cloud::ZpaTwo => "https://config.zpatwo.net",
            Cloud::Beta => "https://config.zpabeta.net",
            Cloud::Gov => "https://config.zpagov.net",
            Cloud::GovUs => "https://config.zpagov.us",
            Cloud::Preview => "https://config.zpapreview.net",
        }
    }

    pub fn all() -> &'static [Cloud] {
        &[
            Cloud::Production,
            Cloud::ZpaTwo,
            Cloud::Beta,
            Cloud::Gov,
            Cloud::GovUs,
            Cloud::Preview,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cloud::Production => "PRODUCTION",
            Cloud::ZpaTwo => "ZPATWO",
            Cloud::Beta => "BETA",
            Cloud::Gov => "GOV",
            Cloud::GovUs => "GOVUS",
            Cloud::Preview => "PREVIEW",
        }
    }
}

impl fmt::Display for Cloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cloud {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cloud::all()
            .iter()
            .find(|cloud| cloud.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = Cloud::all().iter().map(|c| c.name()).collect();
                ProviderError::Config(format!(
                    "unknown cloud '{}', expected one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// Process-wide provider settings, passed explicitly to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub customer_id: Option<String>,
    pub cloud: Option<String>,
    /// Explicit base URL; wins over `cloud`
    pub base_url: Option<String>,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            customer_id: None,
            cloud: None,
            base_url: None,
            max_retries: 3,
            timeout_secs: 60,
        }
    }
}

impl ProviderConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from a YAML file
    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs
            .read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ProviderConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the explicit file if given, else the default file when it exists
    pub fn load(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<Self> {
        Self::load_or(fs, explicit, Self::default_path())
    }

    fn load_or(fs: &dyn FileSystem, explicit: Option<&Path>, fallback: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(fs, path);
        }

        match fallback {
            Some(path) if fs.is_file(&path) => Self::from_file(fs, &path),
            _ => Ok(Self::default()),
        }
    }

    /// Overlay non-empty values from `overrides` onto this configuration
    pub fn merge(mut self, overrides: ProviderConfig) -> Self {
        fn pick(current: Option<String>, over: Option<String>) -> Option<String> {
            match over {
                Some(value) if !value.is_empty() => Some(value),
                _ => current,
            }
        }

        let defaults = ProviderConfig::default();

        self.client_id = pick(self.client_id, overrides.client_id);
        self.client_secret = pick(self.client_secret, overrides.client_secret);
        self.customer_id = pick(self.customer_id, overrides.customer_id);
        self.cloud = pick(self.cloud, overrides.cloud);
        self.base_url = pick(self.base_url, overrides.base_url);

        if overrides.max_retries != defaults.max_retries {
            self.max_retries = overrides.max_retries;
        }

        if overrides.timeout_secs != defaults.timeout_secs {
            self.timeout_secs = overrides.timeout_secs;
        }

        self
    }

    /// Check that everything needed to talk to the API is present
    pub fn validate(&self) -> Result<(), ProviderError> {
        let mut missing = Vec::new();

        if self.client_id.as_deref().unwrap_or_default().is_empty() {
            missing.push("client_id (ZPA_CLIENT_ID)");
        }

        if self.client_secret.as_deref().unwrap_or_default().is_empty() {
            missing.push("client_secret (ZPA_CLIENT_SECRET)");
        }

        if self.customer_id.as_deref().unwrap_or_default().is_empty() {
            missing.push("customer_id (ZPA_CUSTOMER_ID)");
        }

        if !missing.is_empty() {
            return Err(ProviderError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        self.resolve_base_url()?;

        Ok(())
    }

    /// Base URL from the explicit override, else from the cloud (PRODUCTION by default)
    pub fn resolve_base_url(&self) -> Result<Url, ProviderError> {
        let raw = match self.base_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                let cloud = match self.cloud.as_deref() {
                    Some(name) if !name.is_empty() => name.parse::<Cloud>()?,
                    _ => Cloud::Production,
                };
                cloud.base_url().to_string()
            }
        };

        Url::parse(&raw)
            .map_err(|e| ProviderError::Config(format!("invalid base URL '{}': {}", raw, e)))
    }

    pub fn customer_id(&self) -> &str {
        self.customer_id.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockFileSystem;

    fn complete() -> ProviderConfig {
        ProviderConfig {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            customer_id: Some("216196257331281920".to_string()),
            ..ProviderConfig::default()
        }
    }

    #[test]
    fn test_cloud_parse_is_case_insensitive() {
        assert_eq!("beta".parse::<Cloud>().unwrap(), Cloud::Beta);
        assert_eq!("GovUs".parse::<Cloud>().unwrap(), Cloud::GovUs);
        assert!("mars".parse::<Cloud>().is_err());
    }

    #[test]
    fn test_default_cloud_is_production() {
        let url = complete().resolve_base_url().unwrap();
        assert_eq!(url.as_str(), "https://config.private.zscaler.com/");
    }

    #[test]
    fn test_base_url_override_wins() {
        let mut config = complete();
        config.cloud = Some("BETA".to_string());
        config.base_url = Some("http://localhost:8080".to_string());

        let url = config.resolve_base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_validate_reports_missing_settings() {
        let err = ProviderConfig::default().validate().unwrap_err();
        let message = err.to_string();

        assert!(message.contains("client_id"));
        assert!(message.contains("client_secret"));
        assert!(message.contains("customer_id"));
    }

    #[test]
    fn test_validate_rejects_unknown_cloud() {
        let mut config = complete();
        config.cloud = Some("nowhere".to_string());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let file = complete();
        let flags = ProviderConfig {
            customer_id: Some("999".to_string()),
            client_id: Some(String::new()),
            max_retries: 5,
            ..ProviderConfig::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.customer_id(), "999");
        assert_eq!(merged.client_id.as_deref(), Some("id"));
        assert_eq!(merged.max_retries, 5);
        assert_eq!(merged.timeout_secs, 60);
    }

    #[test]
    fn test_from_file() {
        let fs = MockFileSystem::new().with_file(
            "/etc/zpa.yaml",
            "client_id: abc\nclient_secret: xyz\ncustomer_id: \"42\"\ncloud: BETA\nmax_retries: 1\n",
        );

        let config = ProviderConfig::from_file(&fs, Path::new("/etc/zpa.yaml")).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("abc"));
        assert_eq!(config.customer_id(), "42");
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.timeout_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_reads_through_filesystem() {
        let fs = MockFileSystem::new().with_file("/home/me/.zpa/config.yaml", "customer_id: \"7\"\n");

        let config =
            ProviderConfig::load_or(&fs, None, Some(PathBuf::from("/home/me/.zpa/config.yaml"))).unwrap();
        assert_eq!(config.customer_id(), "7");

        let missing = ProviderConfig::load_or(&fs, None, Some(PathBuf::from("/nowhere.yaml"))).unwrap();
        assert_eq!(missing, ProviderConfig::default());
    }

    #[test]
    fn test_load_explicit_file_must_exist() {
        let fs = MockFileSystem::new();

        let err = ProviderConfig::load(&fs, Some(Path::new("/missing.yaml"))).unwrap_err();
        assert_eq!(err.to_string(), "Failed to read config file: /missing.yaml");
    }
}

//! Configuration Management
//!
//! This module handles reading and writing the profiles file.
//!
//! # Configuration Location
//! - Default: `~/.rdsline` (per-user)
//! - Override: `--config <path>`
//!
//! # File Format (YAML)
//! Multi-profile:
//! ```yaml
//! profiles:
//!   default:
//!     type: rds-secretsmanager
//!     cluster_arn: arn:aws:rds:us-east-1:123456789012:cluster:my-cluster
//!     secret_arn: arn:aws:secretsmanager:us-east-1:123456789012:secret:my-secret
//!     database: my_db
//!     credentials:
//!       profile: default
//! ```
//! Legacy single profile: the profile keys at the top level, loaded as a
//! profile named `default`.
//!
//! # Validation
//! Profiles are stored as written ([`StoredProfile`]) and validated only
//! when resolved into a [`ConnectionConfig`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::rds_secretsmanager::region_from_arn;
use crate::engine::{ConnectionConfig, ProfileKind};
use crate::error::{RdslineError, Result};

pub mod store;

pub use store::ProfileStore;

/// Name given to the profile of a legacy single-profile file
pub const DEFAULT_PROFILE: &str = "default";

/// AWS credentials profile used when a profile does not name one
pub const DEFAULT_CREDENTIALS_PROFILE: &str = "default";

/// Key that marks the multi-profile file shape
const PROFILES_KEY: &str = "profiles";

/// Ordered profile map (file order is kept)
pub type ProfileMap = IndexMap<String, StoredProfile>;

/// AWS credentials selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Named profile in the AWS shared config/credentials files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Profile as written in the configuration file
///
/// Every key is optional here so that one broken profile does not prevent
/// the others from loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    /// Connection kind (`rds-secretsmanager`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

impl StoredProfile {
    /// Validate and return the connection settings for profile `name`
    ///
    /// Missing keys are reported together; the kind and the cluster ARN's
    /// region are checked afterwards.
    pub fn resolve(&self, name: &str) -> Result<ConnectionConfig> {
        let required = [
            ("type", &self.kind),
            ("cluster_arn", &self.cluster_arn),
            ("secret_arn", &self.secret_arn),
            ("database", &self.database),
        ];
        let missing: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(key, _)| (*key).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RdslineError::missing_field(name, missing));
        }

        let kind = ProfileKind::parse(self.kind.as_deref().unwrap_or_default())?;
        let cluster_arn = self.cluster_arn.clone().unwrap_or_default();
        region_from_arn(&cluster_arn)?;
        let credentials_profile = self
            .credentials
            .as_ref()
            .and_then(|c| c.profile.as_deref())
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_CREDENTIALS_PROFILE);

        Ok(ConnectionConfig {
            kind,
            cluster_arn,
            secret_arn: self.secret_arn.clone().unwrap_or_default(),
            database: self.database.clone().unwrap_or_default(),
            credentials_profile: credentials_profile.to_string(),
        })
    }
}

impl From<&ConnectionConfig> for StoredProfile {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            kind: Some(config.kind.as_str().to_string()),
            cluster_arn: Some(config.cluster_arn.clone()),
            secret_arn: Some(config.secret_arn.clone()),
            database: Some(config.database.clone()),
            credentials: Some(Credentials { profile: Some(config.credentials_profile.clone()) }),
        }
    }
}

/// Where new profiles may be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// Rewrite this file
    File(PathBuf),

    /// Saving is refused; the reason is shown to the user
    Unavailable(String),
}

/// Multi-profile file shape (also the shape that is written back)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub profiles: ProfileMap,
}

/// Get path to the default config file (`~/.rdsline`)
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RdslineError::config_error("Could not determine home directory"))?;

    Ok(home.join(".rdsline"))
}

/// Parse configuration text into profiles
///
/// Handles both formats:
/// - Multi-profile: `{ profiles: { name: {...}, ... } }`
/// - Legacy: bare profile keys, loaded as profile `default`
///
/// An empty document yields no profiles.
pub fn parse_profiles(contents: &str) -> Result<ProfileMap> {
    let document: serde_yaml::Value = serde_yaml::from_str(contents)
        .map_err(|e| RdslineError::parse_error(format!("Invalid YAML: {e}")))?;

    let is_multi_profile =
        matches!(&document, serde_yaml::Value::Mapping(m) if m.contains_key(PROFILES_KEY));

    match document {
        serde_yaml::Value::Null => Ok(ProfileMap::new()),
        serde_yaml::Value::Mapping(_) if is_multi_profile => {
            serde_yaml::from_value::<ConfigFile>(document)
                .map(|file| file.profiles)
                .map_err(|e| RdslineError::parse_error(format!("Invalid profiles section: {e}")))
        }
        serde_yaml::Value::Mapping(_) => {
            let legacy = serde_yaml::from_value::<StoredProfile>(document)
                .map_err(|e| RdslineError::parse_error(format!("Invalid profile: {e}")))?;
            let mut profiles = ProfileMap::new();
            profiles.insert(DEFAULT_PROFILE.to_string(), legacy);
            Ok(profiles)
        }
        _ => Err(RdslineError::parse_error(
            "Top level of the configuration must be a mapping",
        )),
    }
}

/// Serialize profiles in the multi-profile shape
pub fn render_profiles(profiles: &ProfileMap) -> Result<String> {
    let file = ConfigFile { profiles: profiles.clone() };
    serde_yaml::to_string(&file)
        .map_err(|e| RdslineError::config_error(format!("Could not serialize config: {e}")))
}

/// Read a configuration file
pub fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        RdslineError::config_error(format!("Could not read config file {}: {e}", path.display()))
    })
}

/// Write a configuration file, creating its directory if needed
pub fn write_config(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            RdslineError::config_error(format!("Could not create config directory: {e}"))
        })?;
    }

    fs::write(path, contents).map_err(|e| {
        RdslineError::config_error(format!("Could not write config file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MULTI: &str = r"
profiles:
  default:
    type: rds-secretsmanager
    cluster_arn: arn:aws:rds:us-east-1:123456789012:cluster:default-cluster
    secret_arn: arn:aws:secretsmanager:us-east-1:123456789012:secret:default-secret
    database: default_db
  staging:
    type: rds-secretsmanager
    cluster_arn: arn:aws:rds:us-west-2:123456789012:cluster:staging-cluster
    secret_arn: arn:aws:secretsmanager:us-west-2:123456789012:secret:staging-secret
    database: staging_db
    credentials:
      profile: staging
";

    const LEGACY: &str = r"
type: rds-secretsmanager
cluster_arn: arn:aws:rds:us-east-1:123456789012:cluster:old-cluster
secret_arn: arn:aws:secretsmanager:us-east-1:123456789012:secret:old-secret
database: old_db
credentials:
  profile: legacy
";

    #[test]
    fn test_parse_multi_profile_keeps_file_order() {
        let profiles = parse_profiles(MULTI).unwrap();
        let names: Vec<&str> = profiles.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["default", "staging"]);

        let staging = profiles["staging"].resolve("staging").unwrap();
        assert_eq!(staging.database, "staging_db");
        assert_eq!(staging.credentials_profile, "staging");
    }

    #[test]
    fn test_parse_legacy_profile_as_default() {
        let profiles = parse_profiles(LEGACY).unwrap();
        assert_eq!(profiles.len(), 1);

        let config = profiles[DEFAULT_PROFILE].resolve(DEFAULT_PROFILE).unwrap();
        assert_eq!(
            config,
            ConnectionConfig::rds_secretsmanager(
                "arn:aws:rds:us-east-1:123456789012:cluster:old-cluster",
                "arn:aws:secretsmanager:us-east-1:123456789012:secret:old-secret",
                "old_db",
                "legacy",
            )
        );
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_profiles("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let err = parse_profiles("profiles: [unclosed").unwrap_err();
        assert!(matches!(err, RdslineError::ParseError(_)));
    }

    #[test]
    fn test_parse_non_mapping_top_level() {
        let err = parse_profiles("- just\n- a list\n").unwrap_err();
        assert!(matches!(err, RdslineError::ParseError(_)));
    }

    #[test]
    fn test_parse_invalid_profiles_section() {
        let err = parse_profiles("profiles: 42\n").unwrap_err();
        assert!(matches!(err, RdslineError::ParseError(_)));
    }

    #[test]
    fn test_missing_fields_are_reported_together() {
        let stored = StoredProfile {
            kind: Some("rds-secretsmanager".to_string()),
            cluster_arn: Some("arn:aws:rds:us-west-2:123456789012:cluster:test".to_string()),
            ..StoredProfile::default()
        };
        let err = stored.resolve("test").unwrap_err();
        match err {
            RdslineError::MissingField { profile, fields } => {
                assert_eq!(profile, "test");
                assert_eq!(fields, vec!["secret_arn", "database"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let stored = StoredProfile {
            kind: Some("rds-secretsmanager".to_string()),
            cluster_arn: Some("arn:aws:rds:us-west-2:1:cluster:c".to_string()),
            secret_arn: Some("  ".to_string()),
            database: Some("db".to_string()),
            credentials: None,
        };
        assert!(matches!(stored.resolve("p"), Err(RdslineError::MissingField { .. })));
    }

    #[test]
    fn test_unsupported_kind() {
        let stored = StoredProfile {
            kind: Some("fake-unknown-type".to_string()),
            cluster_arn: Some("arn:aws:rds:us-west-2:1:cluster:c".to_string()),
            secret_arn: Some("arn:aws:secretsmanager:us-west-2:1:secret:s".to_string()),
            database: Some("db".to_string()),
            credentials: None,
        };
        let err = stored.resolve("p").unwrap_err();
        assert!(err.message().contains("fake-unknown-type"));
    }

    #[test]
    fn test_credentials_profile_defaults() {
        let profiles = parse_profiles(MULTI).unwrap();
        let config = profiles["default"].resolve("default").unwrap();
        assert_eq!(config.credentials_profile, DEFAULT_CREDENTIALS_PROFILE);
    }

    #[test]
    fn test_render_uses_multi_profile_shape() {
        let mut profiles = ProfileMap::new();
        profiles.insert(
            "test".to_string(),
            StoredProfile {
                kind: Some("rds-secretsmanager".to_string()),
                cluster_arn: Some("arn:aws:rds:us-west-2:1:cluster:c".to_string()),
                secret_arn: Some("arn:aws:secretsmanager:us-west-2:1:secret:s".to_string()),
                database: Some("test_db".to_string()),
                credentials: None,
            },
        );

        let yaml = render_profiles(&profiles).unwrap();
        assert!(yaml.starts_with("profiles:"));
        assert!(yaml.contains("type: rds-secretsmanager"));
        assert!(!yaml.contains("credentials"));
        assert_eq!(parse_profiles(&yaml).unwrap(), profiles);
    }

    #[test]
    fn test_write_and_read_config() {
        let dir = std::env::temp_dir().join(format!("rdsline_config_test_{}", std::process::id()));
        let path = dir.join("nested").join("rdsline.yaml");

        write_config(&path, "profiles: {}\n").unwrap();
        assert_eq!(read_config(&path).unwrap(), "profiles: {}\n");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_read_missing_config() {
        let err = read_config(Path::new("/nonexistent/rdsline/config")).unwrap_err();
        assert!(matches!(err, RdslineError::ConfigError(_)));
    }
}

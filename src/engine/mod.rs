//! Connection Traits and Core Types
//!
//! This module defines the core abstractions for reaching a database.
//!
//! # Layers
//! - [`DataApiClient`] is the backend boundary: one outbound call,
//!   `execute_statement`, returning typed cells.
//! - [`ClientProvider`] builds a client for a `(credentials profile, region)`
//!   pair. It is injected into the profile store so tests never touch AWS.
//! - [`Connection`] is what the session executes SQL against. It is a closed
//!   sum type: one variant per supported [`ProfileKind`], plus `Null` for
//!   "nothing configured".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{RdslineError, Result};
use crate::output::StatementResult;

pub mod cell;
pub mod rds_secretsmanager;

pub use cell::{decode, TypedCell};
use rds_secretsmanager::RdsSecretsManagerConnection;

/// Supported connection kinds (the profile's `type` key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileKind {
    /// RDS Data API authenticated with a Secrets Manager secret
    #[serde(rename = "rds-secretsmanager")]
    RdsSecretsManager,
}

impl ProfileKind {
    /// Get the kind name as written in configuration files
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RdsSecretsManager => "rds-secretsmanager",
        }
    }

    /// Parse a configuration `type` value
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "rds-secretsmanager" => Ok(Self::RdsSecretsManager),
            other => Err(RdslineError::unsupported_kind(other)),
        }
    }
}

impl Default for ProfileKind {
    fn default() -> Self {
        Self::RdsSecretsManager
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated connection settings for one profile
///
/// Produced by [`crate::config::StoredProfile::resolve`]; every field is
/// guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub kind: ProfileKind,

    /// Target cluster ARN (`arn:aws:rds:<region>:<account>:cluster:<name>`)
    pub cluster_arn: String,

    /// Secret ARN; only the reference is ever held, never the secret value
    pub secret_arn: String,

    pub database: String,

    /// Named AWS credentials profile
    pub credentials_profile: String,
}

impl ConnectionConfig {
    /// Create a new RDS Data API / Secrets Manager connection config
    #[must_use]
    pub fn rds_secretsmanager(
        cluster_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: impl Into<String>,
        credentials_profile: impl Into<String>,
    ) -> Self {
        Self {
            kind: ProfileKind::RdsSecretsManager,
            cluster_arn: cluster_arn.into(),
            secret_arn: secret_arn.into(),
            database: database.into(),
            credentials_profile: credentials_profile.into(),
        }
    }
}

/// Parameters of one `ExecuteStatement` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteStatementRequest {
    pub resource_arn: String,
    pub secret_arn: String,
    pub database: String,
    pub sql: String,
    pub include_result_metadata: bool,
}

/// Column description returned alongside query records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    #[serde(default)]
    pub name: String,
}

/// Response of one `ExecuteStatement` call, in the Data API JSON shape
///
/// Queries carry `columnMetadata` + `records`; DML/DDL carries
/// `numberOfRecordsUpdated`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStatementResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_metadata: Option<Vec<ColumnMetadata>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<Vec<TypedCell>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_records_updated: Option<i64>,
}

/// Backend boundary: send SQL, get typed cells back
///
/// Implementations must surface the backend's own error message through
/// [`RdslineError::BackendError`] and must not retry.
#[async_trait]
pub trait DataApiClient: Send + Sync {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse>;
}

/// Builds a client for a `(credentials profile, region)` pair
pub trait ClientProvider {
    fn client(&self, credentials_profile: &str, region: &str) -> Result<Arc<dyn DataApiClient>>;
}

impl<F> ClientProvider for F
where
    F: Fn(&str, &str) -> Result<Arc<dyn DataApiClient>>,
{
    fn client(&self, credentials_profile: &str, region: &str) -> Result<Arc<dyn DataApiClient>> {
        self(credentials_profile, region)
    }
}

/// A live connection the session can execute SQL against
pub enum Connection {
    /// No profile has been activated
    Null,

    /// RDS Data API with Secrets Manager authentication
    RdsSecretsManager(RdsSecretsManagerConnection),
}

impl Connection {
    /// Materialize a connection from validated settings
    pub fn from_config(config: &ConnectionConfig, provider: &dyn ClientProvider) -> Result<Self> {
        match config.kind {
            ProfileKind::RdsSecretsManager => {
                RdsSecretsManagerConnection::new(config, provider).map(Self::RdsSecretsManager)
            }
        }
    }

    /// Execute a statement; the SQL text is forwarded verbatim
    pub async fn execute(&self, sql: &str) -> Result<StatementResult> {
        match self {
            Self::Null => Err(RdslineError::NotConfigured),
            Self::RdsSecretsManager(conn) => conn.execute(sql).await,
        }
    }

    /// Non-secret description of this connection
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Null => "No connection configured".to_string(),
            Self::RdsSecretsManager(conn) => conn.describe(),
        }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !matches!(self, Self::Null)
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::Null
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "Connection::Null"),
            Self::RdsSecretsManager(conn) => f
                .debug_struct("Connection::RdsSecretsManager")
                .field("cluster_arn", &conn.cluster_arn())
                .field("database", &conn.database())
                .field("region", &conn.region())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_kind_parse() {
        assert_eq!(ProfileKind::parse("rds-secretsmanager").unwrap(), ProfileKind::RdsSecretsManager);

        let err = ProfileKind::parse("fake-unknown-type").unwrap_err();
        assert!(matches!(err, RdslineError::UnsupportedKind(ref k) if k == "fake-unknown-type"));
    }

    #[test]
    fn test_profile_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ProfileKind::RdsSecretsManager).unwrap(),
            r#""rds-secretsmanager""#
        );
        assert_eq!(ProfileKind::RdsSecretsManager.to_string(), "rds-secretsmanager");
    }

    #[tokio::test]
    async fn test_null_connection_is_not_configured() {
        let conn = Connection::default();
        assert!(!conn.is_configured());
        assert!(matches!(conn.execute("SELECT 1").await, Err(RdslineError::NotConfigured)));
        assert_eq!(conn.describe(), "No connection configured");
    }

    #[test]
    fn test_response_shapes_deserialize() {
        let dml: ExecuteStatementResponse =
            serde_json::from_str(r#"{"numberOfRecordsUpdated": 3}"#).unwrap();
        assert_eq!(dml.number_of_records_updated, Some(3));
        assert!(dml.column_metadata.is_none());

        let query: ExecuteStatementResponse = serde_json::from_str(
            r#"{"columnMetadata": [{"name": "a", "typeName": "int4"}], "records": [[{"longValue": 42}]]}"#,
        )
        .unwrap();
        assert_eq!(query.column_metadata.unwrap()[0].name, "a");
        assert_eq!(query.records.unwrap()[0][0], TypedCell::long(42));
    }

    #[test]
    fn test_closure_is_a_client_provider() {
        let provider = |_profile: &str, region: &str| -> Result<Arc<dyn DataApiClient>> {
            Err(RdslineError::config_error(format!("no client for {region}")))
        };
        let err = provider.client("default", "eu-west-1").err().unwrap();
        assert!(err.message().contains("eu-west-1"));
    }
}

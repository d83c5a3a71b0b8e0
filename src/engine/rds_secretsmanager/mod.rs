//! RDS Data API Connection (Secrets Manager authentication)
//!
//! Binds a cluster ARN, a secret ARN and a database name to a
//! [`DataApiClient`]. The client is obtained from the injected
//! [`ClientProvider`] using the profile's AWS credentials profile and the
//! region taken from the cluster ARN.
//!
//! # Implementation Notes
//! - Every statement is sent with `includeResultMetadata = true` so query
//!   results carry column names
//! - No retries and no client-side timeout; the backend's error message is
//!   passed through unchanged
//! - The secret ARN is a reference only; its value is resolved server-side

use std::sync::Arc;

use tracing::debug;

use crate::engine::{ClientProvider, ConnectionConfig, DataApiClient, ExecuteStatementRequest};
use crate::error::{RdslineError, Result};
use crate::output::StatementResult;

#[cfg(feature = "rds-data")]
pub mod client;

/// Extract the region from an ARN (`arn:partition:service:<region>:...`)
pub fn region_from_arn(arn: &str) -> Result<String> {
    match arn.split(':').nth(3) {
        Some(region) if !region.is_empty() => Ok(region.to_string()),
        _ => Err(RdslineError::invalid_input(format!(
            "Cannot determine region from ARN '{arn}'. \
             Expected arn:aws:rds:<region>:<account>:cluster:<cluster-name>"
        ))),
    }
}

/// Connection to an RDS cluster through the Data API
pub struct RdsSecretsManagerConnection {
    cluster_arn: String,
    secret_arn: String,
    database: String,
    credentials_profile: String,
    region: String,
    client: Arc<dyn DataApiClient>,
}

impl RdsSecretsManagerConnection {
    /// Build a connection, resolving the client through `provider`
    pub fn new(config: &ConnectionConfig, provider: &dyn ClientProvider) -> Result<Self> {
        let region = region_from_arn(&config.cluster_arn)?;
        debug!(
            "Setting aws credentials profile to {} - region: {}",
            config.credentials_profile, region
        );
        let client = provider.client(&config.credentials_profile, &region)?;

        Ok(Self {
            cluster_arn: config.cluster_arn.clone(),
            secret_arn: config.secret_arn.clone(),
            database: config.database.clone(),
            credentials_profile: config.credentials_profile.clone(),
            region,
            client,
        })
    }

    pub fn cluster_arn(&self) -> &str {
        &self.cluster_arn
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Send one statement and convert the response
    pub async fn execute(&self, sql: &str) -> Result<StatementResult> {
        debug!("Executing query: {sql}");
        let request = ExecuteStatementRequest {
            resource_arn: self.cluster_arn.clone(),
            secret_arn: self.secret_arn.clone(),
            database: self.database.clone(),
            sql: sql.to_string(),
            include_result_metadata: true,
        };

        let response = self.client.execute_statement(request).await?;
        debug!(
            "Got response: {}",
            serde_json::to_string(&response).unwrap_or_else(|e| format!("<unprintable: {e}>"))
        );

        StatementResult::from_response(response)
    }

    /// Non-secret description for `.profile`
    pub fn describe(&self) -> String {
        [
            "RDS Data API connection (rds-secretsmanager)".to_string(),
            format!("Cluster ARN: {}", self.cluster_arn),
            format!("Secret ARN: {}", self.secret_arn),
            format!("Database: {}", self.database),
            format!("Region: {}", self.region),
            format!("AWS profile: {}", self.credentials_profile),
        ]
        .join("\n")
    }
}

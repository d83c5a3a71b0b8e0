//! AWS SDK backed Data API client
//!
//! The SDK configuration (credentials chain for the named profile, region)
//! is loaded on the first statement, not when the profile is activated, so
//! switching profiles never blocks on credential resolution.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_rdsdata::config::Region;
use aws_sdk_rdsdata::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_rdsdata::types::Field;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::engine::{
    ColumnMetadata, DataApiClient, ExecuteStatementRequest, ExecuteStatementResponse, TypedCell,
};
use crate::error::{RdslineError, Result};

/// `ClientProvider` used by the binary: one SDK client per activated profile
pub fn sdk_client_provider(
    credentials_profile: &str,
    region: &str,
) -> Result<Arc<dyn DataApiClient>> {
    Ok(Arc::new(SdkDataApiClient::new(credentials_profile, region)))
}

/// Data API client built from the AWS SDK
pub struct SdkDataApiClient {
    credentials_profile: String,
    region: String,
    client: OnceCell<aws_sdk_rdsdata::Client>,
}

impl SdkDataApiClient {
    pub fn new(credentials_profile: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            credentials_profile: credentials_profile.into(),
            region: region.into(),
            client: OnceCell::new(),
        }
    }

    async fn sdk_client(&self) -> &aws_sdk_rdsdata::Client {
        self.client
            .get_or_init(|| async {
                debug!(
                    "Loading AWS configuration for profile {} in {}",
                    self.credentials_profile, self.region
                );
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .profile_name(&self.credentials_profile)
                    .region(Region::new(self.region.clone()))
                    .load()
                    .await;
                aws_sdk_rdsdata::Client::new(&sdk_config)
            })
            .await
    }
}

#[async_trait]
impl DataApiClient for SdkDataApiClient {
    async fn execute_statement(
        &self,
        request: ExecuteStatementRequest,
    ) -> Result<ExecuteStatementResponse> {
        let output = self
            .sdk_client()
            .await
            .execute_statement()
            .resource_arn(request.resource_arn)
            .secret_arn(request.secret_arn)
            .database(request.database)
            .sql(request.sql)
            .include_result_metadata(request.include_result_metadata)
            .send()
            .await
            .map_err(|e| {
                let message = e
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| DisplayErrorContext(&e).to_string());
                RdslineError::backend(message)
            })?;

        let column_metadata = output.column_metadata.map(|columns| {
            columns
                .into_iter()
                .map(|c| ColumnMetadata { name: c.name.unwrap_or_default() })
                .collect()
        });
        let records = output
            .records
            .map(|rows| rows.iter().map(|row| row.iter().map(field_to_cell).collect()).collect());

        Ok(ExecuteStatementResponse {
            column_metadata,
            records,
            number_of_records_updated: Some(output.number_of_records_updated),
        })
    }
}

/// Map an SDK `Field` onto the wire-shaped cell
fn field_to_cell(field: &Field) -> TypedCell {
    match field {
        Field::IsNull(flag) => TypedCell { is_null: Some(*flag), ..TypedCell::default() },
        Field::StringValue(value) => TypedCell::string(value.clone()),
        Field::BooleanValue(value) => TypedCell::boolean(*value),
        Field::DoubleValue(value) => TypedCell::double(*value),
        Field::LongValue(value) => TypedCell::long(*value),
        Field::BlobValue(blob) => TypedCell::blob(blob.as_ref().to_vec()),
        // Array contents are never rendered
        Field::ArrayValue(_) => TypedCell::array(serde_json::Value::Array(Vec::new())),
        _ => TypedCell::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::decode;
    use aws_sdk_rdsdata::primitives::Blob;

    #[test]
    fn test_field_mapping() {
        let fields = vec![
            Field::StringValue("stringRow1".to_string()),
            Field::BooleanValue(true),
            Field::DoubleValue(2.0),
            Field::LongValue(12),
            Field::BlobValue(Blob::new(b"aa".to_vec())),
            Field::IsNull(true),
        ];
        let decoded: Vec<String> = fields.iter().map(|f| decode(&field_to_cell(f))).collect();
        assert_eq!(decoded, vec!["stringRow1", "True", "2.0", "12", "BLOB(6161)", "NULL"]);
    }
}

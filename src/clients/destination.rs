use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;

/// Posts one row at a time to the configured REST endpoint, JSON body plus an
/// optional bearer token.
#[derive(Debug, Clone)]
pub struct DestinationClient {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl DestinationClient {
    pub fn new(client: Client, endpoint: String, bearer_token: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            bearer_token,
        }
    }

    /// Serializes the row to JSON and POSTs it. Any non-2xx status is an
    /// error; on success the parsed JSON response body is returned.
    pub async fn post_row(&self, record: &Record) -> Result<serde_json::Value> {
        let mut request = self.client.post(&self.endpoint).json(&record.data);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Destination responded with status {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::DestinationError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

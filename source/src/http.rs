use crate::source::{SourceError, SourceResult};
use serde::de::DeserializeOwned;

pub(crate) fn build_client(timeout: std::time::Duration) -> SourceResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::InvalidConfig {
            message: format!("Failed to create HTTP client: {}", e),
        })
}

/// Decodes a JSON body, surfacing non-success responses with the upstream body verbatim.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> SourceResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SourceError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

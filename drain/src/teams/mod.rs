//! Posts test results to a Microsoft Teams channel through an incoming webhook.

pub mod card;
pub mod chart;

use crate::drain::{Drain, DrainError, DrainResult};
use async_trait::async_trait;
use card::{test_results_card, AdaptiveCardMessage};
use serde::{Deserialize, Serialize};
use source::TestResults;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicrosoftTeamsConfig {
    #[serde(skip_serializing, default)]
    pub incoming_webhook_url: String,
    pub timeout: Duration,
}

impl Default for MicrosoftTeamsConfig {
    fn default() -> Self {
        Self {
            incoming_webhook_url: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl MicrosoftTeamsConfig {
    pub fn new(incoming_webhook_url: impl Into<String>) -> Self {
        Self {
            incoming_webhook_url: incoming_webhook_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.incoming_webhook_url.is_empty() {
            return Err("Incoming webhook URL cannot be empty".to_string());
        }

        if !self.incoming_webhook_url.starts_with("http://")
            && !self.incoming_webhook_url.starts_with("https://")
        {
            return Err("Incoming webhook URL must start with http:// or https://".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

pub struct MicrosoftTeamsDrain {
    client: reqwest::Client,
    config: MicrosoftTeamsConfig,
}

impl MicrosoftTeamsDrain {
    pub fn new(config: MicrosoftTeamsConfig) -> DrainResult<Self> {
        config
            .validate()
            .map_err(|message| DrainError::InvalidConfig { message })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DrainError::InvalidConfig {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Drain for MicrosoftTeamsDrain {
    type Output = AdaptiveCardMessage;

    async fn write_test_results(&self, results: &TestResults) -> DrainResult<AdaptiveCardMessage> {
        let message = test_results_card(
            results,
            &[("ID", results.id.as_str()), ("Name", results.name.as_str())],
        )?;
        debug!(
            "Posting card for {} with {} results to Microsoft Teams",
            results.id,
            results.results.len()
        );

        let response = self
            .client
            .post(&self.config.incoming_webhook_url)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Microsoft Teams rejected the card with status: {}", status);
            return Err(DrainError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        info!("Posted test results of {} to Microsoft Teams", results.id);
        Ok(message)
    }

    fn drain_name(&self) -> &'static str {
        "microsoft-teams"
    }
}

use crate::config::{JiraAuthentication, JiraConfig};
use crate::http::{build_client, read_json};
use crate::source::{SourceError, SourceResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Body of `POST /rest/api/{version}/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub jql: String,
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<usize>,
}

impl SearchRequest {
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            fields: Vec::new(),
            start_at: None,
        }
    }

    /// Search restricted to the given issue keys, e.g. `issue in (PROJ-1,PROJ-2)`.
    pub fn issues<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        Self::new(format!("issue in ({})", keys.join(",")))
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_start_at(mut self, start_at: usize) -> Self {
        self.start_at = Some(start_at);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: Option<usize>,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub total: Option<usize>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
}

#[async_trait]
pub trait JiraApi: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> SourceResult<SearchResponse>;
}

pub struct JiraClient {
    client: reqwest::Client,
    config: JiraConfig,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> SourceResult<Self> {
        config
            .validate()
            .map_err(|message| SourceError::InvalidConfig { message })?;

        let client = build_client(config.timeout)?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/rest/api/{}/{}",
            self.config.base_url,
            self.config.api_version.path_segment(),
            path
        )
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.authentication {
            JiraAuthentication::None => builder,
            JiraAuthentication::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
            JiraAuthentication::PersonalAccessToken { token } => builder.bearer_auth(token),
            JiraAuthentication::OAuth2 { access_token } => builder.bearer_auth(access_token),
        }
    }

    pub async fn health_check(&self) -> SourceResult<()> {
        debug!("Performing Jira health check");

        let response = self
            .authorize(self.client.get(self.api_url("serverInfo")))
            .send()
            .await?;

        if response.status().is_success() {
            info!("Jira health check passed");
            Ok(())
        } else {
            let status = response.status();
            error!("Jira health check failed with status: {}", status);
            Err(SourceError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl JiraApi for JiraClient {
    async fn search(&self, request: &SearchRequest) -> SourceResult<SearchResponse> {
        debug!(
            "Searching Jira issues (start_at: {:?}): {}",
            request.start_at, request.jql
        );

        let response = self
            .authorize(self.client.post(self.api_url("search")))
            .json(request)
            .send()
            .await?;

        read_json(response).await
    }
}

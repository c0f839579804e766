use crate::config::{XrayCloudConfig, XrayServerAuthentication, XrayServerConfig};
use crate::http::{build_client, read_json};
use crate::source::{SourceError, SourceResult};
use crate::xray::cloud::{CloudResults, CloudTestPlan, XrayCloudApi};
use crate::xray::server::{ServerTest, XrayServerApi};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

const TEST_PLAN_QUERY: &str = r#"query TestPlanResults($jql: String!, $start: Int!, $limit: Int!) {
  getTestPlans(jql: $jql, limit: 1) {
    results {
      jira(fields: ["summary", "project"])
      tests(limit: $limit, start: $start) {
        results {
          jira(fields: ["key", "summary"])
          testRuns(limit: 1) {
            results {
              status { name }
              testExecution { jira(fields: ["key"]) }
            }
          }
        }
      }
    }
  }
}"#;

#[derive(Debug, Serialize)]
struct AuthenticateRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: TestPlanVariables,
}

#[derive(Debug, Serialize)]
struct TestPlanVariables {
    jql: String,
    start: usize,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<TestPlanData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TestPlanData {
    #[serde(default, rename = "getTestPlans")]
    get_test_plans: Option<CloudResults<CloudTestPlan>>,
}

/// Client for the Xray Cloud GraphQL API.
pub struct XrayCloudClient {
    client: reqwest::Client,
    config: XrayCloudConfig,
    token: String,
}

impl XrayCloudClient {
    /// Exchanges the configured client credentials for an API token.
    pub async fn authenticate(config: XrayCloudConfig) -> SourceResult<Self> {
        config
            .validate()
            .map_err(|message| SourceError::InvalidConfig { message })?;
        let client = build_client(config.timeout)?;

        debug!("Authenticating against Xray Cloud at {}", config.base_url);
        let response = client
            .post(format!("{}/api/v2/authenticate", config.base_url))
            .json(&AuthenticateRequest {
                client_id: &config.client_id,
                client_secret: &config.client_secret,
            })
            .send()
            .await?;

        let token: String = read_json(response).await.map_err(|e| {
            error!("Xray Cloud authentication failed: {}", e);
            e
        })?;
        info!("Authenticated against Xray Cloud");

        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// Uses an already issued API token instead of client credentials.
    pub fn with_token(config: XrayCloudConfig, token: impl Into<String>) -> SourceResult<Self> {
        let client = build_client(config.timeout)?;
        Ok(Self {
            client,
            config,
            token: token.into(),
        })
    }
}

#[async_trait]
impl XrayCloudApi for XrayCloudClient {
    async fn test_plan_page(
        &self,
        test_plan_key: &str,
        start: usize,
        limit: usize,
    ) -> SourceResult<Option<CloudTestPlan>> {
        let request = GraphQlRequest {
            query: TEST_PLAN_QUERY,
            variables: TestPlanVariables {
                jql: format!("issue in ({})", test_plan_key),
                start,
                limit,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/v2/graphql", self.config.base_url))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let body: GraphQlResponse = read_json(response).await?;
        if !body.errors.is_empty() {
            let message = body
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SourceError::GraphQl { message });
        }

        Ok(body
            .data
            .and_then(|data| data.get_test_plans)
            .and_then(|plans| plans.results)
            .and_then(|plans| plans.into_iter().next().flatten()))
    }
}

/// Client for the Xray Server/DC REST API.
pub struct XrayServerClient {
    client: reqwest::Client,
    config: XrayServerConfig,
}

impl XrayServerClient {
    pub fn new(config: XrayServerConfig) -> SourceResult<Self> {
        config
            .validate()
            .map_err(|message| SourceError::InvalidConfig { message })?;

        let client = build_client(config.timeout)?;

        Ok(Self { client, config })
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.authentication {
            None => builder,
            Some(XrayServerAuthentication::Basic { username, password }) => {
                builder.basic_auth(username, Some(password))
            }
            Some(XrayServerAuthentication::PersonalAccessToken { token }) => {
                builder.bearer_auth(token)
            }
        }
    }
}

#[async_trait]
impl XrayServerApi for XrayServerClient {
    async fn test_plan_tests(&self, test_plan_key: &str) -> SourceResult<Vec<ServerTest>> {
        let url = format!(
            "{}/rest/raven/1.0/api/testplan/{}/test",
            self.config.base_url, test_plan_key
        );
        debug!("Listing tests of {} from {}", test_plan_key, url);

        let response = self.authorize(self.client.get(url)).send().await?;
        read_json(response).await
    }
}

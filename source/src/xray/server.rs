use crate::jira::{JiraApi, SearchRequest};
use crate::source::{SourceError, SourceResult, TestResultsSource};
use crate::status::convert_status;
use crate::types::{ResultEntry, Test, TestResult, TestResults};
use crate::xray::ResultsBuilder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A test tracked by a test plan, as listed by `GET /rest/raven/1.0/api/testplan/{key}/test`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerTest {
    #[serde(default)]
    pub id: Option<u64>,
    pub key: String,
    pub latest_status: String,
}

impl ServerTest {
    pub fn new(key: impl Into<String>, latest_status: impl Into<String>) -> Self {
        Self {
            id: None,
            key: key.into(),
            latest_status: latest_status.into(),
        }
    }
}

#[async_trait]
pub trait XrayServerApi: Send + Sync {
    /// Lists every test of the test plan with its latest status in one call.
    async fn test_plan_tests(&self, test_plan_key: &str) -> SourceResult<Vec<ServerTest>>;
}

pub struct ServerAggregator {
    jira: Arc<dyn JiraApi>,
    xray: Arc<dyn XrayServerApi>,
    jira_url: String,
}

impl ServerAggregator {
    pub fn new(
        jira: Arc<dyn JiraApi>,
        xray: Arc<dyn XrayServerApi>,
        jira_url: impl Into<String>,
    ) -> Self {
        Self {
            jira,
            xray,
            jira_url: jira_url.into(),
        }
    }

    async fn resolve_name(&self, test_plan_key: &str) -> SourceResult<Option<String>> {
        let request = SearchRequest::issues([test_plan_key]).with_fields(&["summary"]);
        let response = self.jira.search(&request).await?;
        Ok(response
            .issues
            .into_iter()
            .next()
            .and_then(|issue| issue.fields.summary))
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.jira_url, key)
    }
}

#[async_trait]
impl TestResultsSource for ServerAggregator {
    async fn get_test_results(&self, test_plan_key: &str) -> SourceResult<TestResults> {
        let mut builder =
            ResultsBuilder::new(TestResults::new(test_plan_key, self.browse_url(test_plan_key)));

        match self.resolve_name(test_plan_key).await? {
            Some(name) => builder.set_name(name),
            None => warn!("No summary found for test plan {}", test_plan_key),
        }

        let tests = self.xray.test_plan_tests(test_plan_key).await?;
        debug!("Xray lists {} tests for {}", tests.len(), test_plan_key);

        let mut keys = Vec::with_capacity(tests.len());
        let mut statuses: HashMap<String, String> = HashMap::with_capacity(tests.len());
        for test in tests {
            if !statuses.contains_key(&test.key) {
                keys.push(test.key.clone());
            }
            statuses.insert(test.key, test.latest_status);
        }

        if keys.is_empty() {
            info!("Test plan {} does not contain any tests", test_plan_key);
            return Ok(builder.finish());
        }

        let mut start_at = 0;
        loop {
            let request = SearchRequest::issues(&keys)
                .with_fields(&["summary", "key", "id"])
                .with_start_at(start_at);
            let response = self.jira.search(&request).await?;
            debug!(
                "Jira returned {} of {} test issues (start_at: {})",
                response.issues.len(),
                keys.len(),
                start_at
            );

            if response.issues.is_empty() {
                break;
            }
            let returned = response.issues.len();

            for issue in response.issues {
                let latest_status = statuses.get(&issue.key).ok_or_else(|| {
                    SourceError::InconsistentTestSet {
                        key: issue.key.clone(),
                    }
                })?;

                let url = self.browse_url(&issue.key);
                builder.push(ResultEntry {
                    result: TestResult::new(convert_status(latest_status)?, url.clone()),
                    test: Test::new(issue.key, issue.fields.summary.unwrap_or_default(), url),
                });
            }

            start_at += returned;
        }

        let results = builder.finish();
        info!(
            "Collected {} results for test plan {} from Xray Server",
            results.results.len(),
            test_plan_key
        );
        Ok(results)
    }

    fn source_name(&self) -> &'static str {
        "xray-server"
    }
}

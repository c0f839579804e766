//! Test results from [Xray](https://www.getxray.app/) test plans.
//!
//! Xray Cloud and Xray Server/DC expose different APIs. [`TestPlanSource`] picks the matching
//! aggregation strategy once, from the [`XrayClient`] variant it is constructed with.

pub mod client;
pub mod cloud;
pub mod server;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::jira::JiraApi;
use crate::source::{SourceResult, TestResultsSource};
use crate::types::{ResultEntry, TestResults};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

pub use client::{XrayCloudClient, XrayServerClient};
pub use cloud::{CloudAggregator, XrayCloudApi};
pub use server::{ServerAggregator, ServerTest, XrayServerApi};

/// The configured Xray deployment.
#[derive(Clone)]
pub enum XrayClient {
    Cloud(Arc<dyn XrayCloudApi>),
    Server(Arc<dyn XrayServerApi>),
}

impl XrayClient {
    pub fn kind(&self) -> &'static str {
        match self {
            XrayClient::Cloud(_) => "cloud",
            XrayClient::Server(_) => "server",
        }
    }
}

#[derive(Clone)]
pub struct TestPlanSourceOptions {
    pub jira: Arc<dyn JiraApi>,
    pub jira_url: String,
    pub xray: XrayClient,
    pub page_size: usize,
}

impl TestPlanSourceOptions {
    pub fn new(jira: Arc<dyn JiraApi>, jira_url: impl Into<String>, xray: XrayClient) -> Self {
        Self {
            jira,
            jira_url: jira_url.into().trim_end_matches('/').to_string(),
            xray,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

pub struct TestPlanSource {
    kind: &'static str,
    strategy: Box<dyn TestResultsSource>,
}

impl TestPlanSource {
    pub fn new(options: TestPlanSourceOptions) -> Self {
        let kind = options.xray.kind();
        let strategy: Box<dyn TestResultsSource> = match options.xray {
            XrayClient::Cloud(xray) => Box::new(
                CloudAggregator::new(xray, options.jira_url).with_page_size(options.page_size),
            ),
            XrayClient::Server(xray) => {
                Box::new(ServerAggregator::new(options.jira, xray, options.jira_url))
            }
        };

        Self { kind, strategy }
    }

    /// `"cloud"` or `"server"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

#[async_trait]
impl TestResultsSource for TestPlanSource {
    async fn get_test_results(&self, test_plan_key: &str) -> SourceResult<TestResults> {
        self.strategy.get_test_results(test_plan_key).await
    }

    fn source_name(&self) -> &'static str {
        self.strategy.source_name()
    }
}

/// Accumulates the entries of one aggregation call, keeping the first entry per test key.
pub(crate) struct ResultsBuilder {
    results: TestResults,
    seen: HashSet<String>,
}

impl ResultsBuilder {
    pub(crate) fn new(results: TestResults) -> Self {
        Self {
            results,
            seen: HashSet::new(),
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.results.name = name.into();
    }

    pub(crate) fn push(&mut self, entry: ResultEntry) {
        if !self.seen.insert(entry.test.id.clone()) {
            warn!(
                "Test {} returned more than once for {}, keeping the first result",
                entry.test.id, self.results.id
            );
            return;
        }
        self.results.results.push(entry);
    }

    pub(crate) fn finish(self) -> TestResults {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::cloud::{CloudPlanFields, CloudProject, CloudTestPlan};
    use super::*;
    use crate::jira::{SearchRequest, SearchResponse};
    use crate::source::SourceError;
    use crate::types::{Status, Test, TestResult};

    struct UnusedJira;

    #[async_trait]
    impl JiraApi for UnusedJira {
        async fn search(&self, _request: &SearchRequest) -> SourceResult<SearchResponse> {
            Err(SourceError::InvalidConfig {
                message: "jira must not be called".to_string(),
            })
        }
    }

    struct EmptyCloud;

    #[async_trait]
    impl XrayCloudApi for EmptyCloud {
        async fn test_plan_page(
            &self,
            _test_plan_key: &str,
            _start: usize,
            _limit: usize,
        ) -> SourceResult<Option<CloudTestPlan>> {
            Ok(Some(CloudTestPlan {
                jira: Some(CloudPlanFields {
                    summary: Some("Cloud plan".to_string()),
                    project: Some(CloudProject {
                        key: Some("PROJ".to_string()),
                    }),
                }),
                tests: None,
            }))
        }
    }

    struct EmptyServer;

    #[async_trait]
    impl XrayServerApi for EmptyServer {
        async fn test_plan_tests(&self, _test_plan_key: &str) -> SourceResult<Vec<ServerTest>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_cloud_client_selects_cloud_strategy() {
        let options = TestPlanSourceOptions::new(
            Arc::new(UnusedJira),
            "https://example.atlassian.net/",
            XrayClient::Cloud(Arc::new(EmptyCloud)),
        );
        let source = TestPlanSource::new(options);

        assert_eq!(source.kind(), "cloud");
        assert_eq!(source.source_name(), "xray-cloud");

        let results = source.get_test_results("PROJ-1").await.unwrap();
        assert_eq!(results.name, "Cloud plan");
        assert_eq!(results.url, "https://example.atlassian.net/browse/PROJ-1");
    }

    #[tokio::test]
    async fn test_server_client_selects_server_strategy() {
        let options = TestPlanSourceOptions::new(
            Arc::new(UnusedJira),
            "https://jira.example.com",
            XrayClient::Server(Arc::new(EmptyServer)),
        );
        let source = TestPlanSource::new(options);

        assert_eq!(source.kind(), "server");
        assert_eq!(source.source_name(), "xray-server");
        // the server strategy resolves the title through jira first
        let err = source.get_test_results("PROJ-1").await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidConfig { .. }));
    }

    #[test]
    fn test_builder_keeps_first_duplicate() {
        let mut builder = ResultsBuilder::new(TestResults::new("PROJ-1", "u"));
        let entry = |status| ResultEntry {
            test: Test::new("PROJ-2", "t", "u"),
            result: TestResult::new(status, "u"),
        };
        builder.push(entry(Status::Fail));
        builder.push(entry(Status::Pass));

        let results = builder.finish();
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].result.status, Status::Fail);
    }
}

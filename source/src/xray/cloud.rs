use crate::config::DEFAULT_PAGE_SIZE;
use crate::source::{SourceError, SourceResult, TestResultsSource};
use crate::status::convert_status;
use crate::types::{ResultEntry, Test, TestResult, TestResults};
use crate::xray::ResultsBuilder;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Connect app item that renders the Xray testing board inside a Jira project.
const TESTING_BOARD_ITEM: &str =
    "com.atlassian.plugins.atlassian-connect-plugin%3Acom.xpandit.plugins.xray__testing-board";

/// One entry of `getTestPlans.results`, carrying one page of its tests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudTestPlan {
    #[serde(default)]
    pub jira: Option<CloudPlanFields>,
    #[serde(default)]
    pub tests: Option<CloudResults<CloudTest>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudPlanFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub project: Option<CloudProject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudProject {
    #[serde(default)]
    pub key: Option<String>,
}

/// A GraphQL result list. Both the list and its elements are nullable upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudResults<T> {
    pub results: Option<Vec<Option<T>>>,
}

impl<T> Default for CloudResults<T> {
    fn default() -> Self {
        Self { results: None }
    }
}

impl<T> CloudResults<T> {
    pub fn new(results: Vec<T>) -> Self {
        Self {
            results: Some(results.into_iter().map(Some).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.results.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<&T> {
        self.results
            .as_ref()
            .and_then(|items| items.first())
            .and_then(Option::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> {
        self.results
            .iter()
            .flat_map(|items| items.iter().map(Option::as_ref))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudTest {
    #[serde(default)]
    pub jira: Option<CloudTestFields>,
    #[serde(default, rename = "testRuns")]
    pub test_runs: Option<CloudResults<CloudTestRun>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudTestFields {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudTestRun {
    #[serde(default)]
    pub status: Option<CloudStatus>,
    #[serde(default, rename = "testExecution")]
    pub test_execution: Option<CloudTestExecution>,
}

impl CloudTestRun {
    fn execution_key(&self) -> Option<&str> {
        self.test_execution
            .as_ref()
            .and_then(|execution| execution.jira.as_ref())
            .and_then(|jira| jira.key.as_deref())
            .filter(|key| !key.is_empty())
    }

    fn status_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|status| status.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudStatus {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudTestExecution {
    #[serde(default)]
    pub jira: Option<CloudExecutionFields>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudExecutionFields {
    #[serde(default)]
    pub key: Option<String>,
}

/// The Xray Cloud query interface needed for aggregation.
#[async_trait]
pub trait XrayCloudApi: Send + Sync {
    /// Fetches the test plan together with the page of tests starting at `start`, each
    /// annotated with its most recent test run. Returns `None` when no plan matches.
    async fn test_plan_page(
        &self,
        test_plan_key: &str,
        start: usize,
        limit: usize,
    ) -> SourceResult<Option<CloudTestPlan>>;
}

pub struct CloudAggregator {
    xray: Arc<dyn XrayCloudApi>,
    jira_url: String,
    page_size: usize,
}

impl CloudAggregator {
    pub fn new(xray: Arc<dyn XrayCloudApi>, jira_url: impl Into<String>) -> Self {
        Self {
            xray,
            jira_url: jira_url.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn result_for(
        &self,
        test_plan_key: &str,
        project_key: &str,
        test_key: &str,
        run: Option<&CloudTestRun>,
    ) -> SourceResult<TestResult> {
        let Some((run, execution_key)) =
            run.and_then(|run| run.execution_key().map(|key| (run, key)))
        else {
            return Ok(TestResult::pending(format!(
                "{}/browser/{}",
                self.jira_url, test_plan_key
            )));
        };

        match run.status_name() {
            None => Ok(TestResult::pending(format!(
                "{}/browser/{}",
                self.jira_url, execution_key
            ))),
            Some(name) => Ok(TestResult::new(
                convert_status(name)?,
                format!(
                    "{}/projects/{}?selectedItem={}&ac.testExecutionKey={}&ac.testKey={}",
                    self.jira_url, project_key, TESTING_BOARD_ITEM, execution_key, test_key
                ),
            )),
        }
    }
}

#[async_trait]
impl TestResultsSource for CloudAggregator {
    async fn get_test_results(&self, test_plan_key: &str) -> SourceResult<TestResults> {
        let mut builder = ResultsBuilder::new(TestResults::new(
            test_plan_key,
            format!("{}/browse/{}", self.jira_url, test_plan_key),
        ));
        let mut start = 0;

        loop {
            debug!(
                "Requesting tests of {} (start: {}, limit: {})",
                test_plan_key, start, self.page_size
            );

            let plan = self
                .xray
                .test_plan_page(test_plan_key, start, self.page_size)
                .await?
                .ok_or_else(|| SourceError::TestPlanNotFound {
                    key: test_plan_key.to_string(),
                })?;

            let fields = plan.jira.as_ref();
            let project_key = fields
                .and_then(|fields| fields.project.as_ref())
                .and_then(|project| project.key.as_deref())
                .filter(|key| !key.is_empty())
                .ok_or_else(|| SourceError::ProjectResolution {
                    key: test_plan_key.to_string(),
                })?;

            if let Some(summary) = fields.and_then(|fields| fields.summary.as_ref()) {
                builder.set_name(summary);
            }

            let page = plan.tests.unwrap_or_default();
            if page.is_empty() {
                break;
            }

            for test in page.iter() {
                let Some((jira, key)) = test
                    .and_then(|test| test.jira.as_ref())
                    .and_then(|jira| {
                        jira.key
                            .as_deref()
                            .filter(|key| !key.is_empty())
                            .map(|key| (jira, key))
                    })
                else {
                    debug!("Skipping test without issue key in {}", test_plan_key);
                    continue;
                };

                let run = test
                    .and_then(|test| test.test_runs.as_ref())
                    .and_then(CloudResults::first);

                builder.push(ResultEntry {
                    test: Test::new(
                        key,
                        jira.summary.clone().unwrap_or_default(),
                        format!("{}/browse/{}", self.jira_url, key),
                    ),
                    result: self.result_for(test_plan_key, project_key, key, run)?,
                });
            }

            start += page.len();
        }

        let results = builder.finish();
        info!(
            "Collected {} results for test plan {} from Xray Cloud",
            results.results.len(),
            test_plan_key
        );
        Ok(results)
    }

    fn source_name(&self) -> &'static str {
        "xray-cloud"
    }
}

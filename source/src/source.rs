use crate::types::TestResults;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {message}")]
    GraphQl { message: String },

    #[error("Unknown Xray status: {status}")]
    UnknownStatus { status: String },

    #[error("Failed to find test plan {key}")]
    TestPlanNotFound { key: String },

    #[error("Failed to retrieve project of test plan {key}")]
    ProjectResolution { key: String },

    #[error("Test {key} was returned by Jira but not by Xray")]
    InconsistentTestSet { key: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A service from which test results can be pulled, keyed by some filter such as a test plan key.
#[async_trait]
pub trait TestResultsSource: Send + Sync {
    async fn get_test_results(&self, test_plan_key: &str) -> SourceResult<TestResults>;

    fn source_name(&self) -> &'static str;
}

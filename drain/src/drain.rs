use async_trait::async_trait;
use source::TestResults;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrainError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Chart rendering error: {message}")]
    Chart { message: String },
}

pub type DrainResult<T> = Result<T, DrainError>;

/// A service or tool to which test results can be pushed, such as a chat channel or a terminal.
#[async_trait]
pub trait Drain: Send + Sync {
    /// What the drain produced, e.g. the message it posted.
    type Output: Send;

    async fn write_test_results(&self, results: &TestResults) -> DrainResult<Self::Output>;

    fn drain_name(&self) -> &'static str;
}

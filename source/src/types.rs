use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used for a test plan whose title has not been resolved.
pub const UNKNOWN_NAME: &str = "unknown";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    Pending,
    Skipped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Fail => "fail",
            Status::Pending => "pending",
            Status::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Test {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl Test {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The latest known outcome of a test, linking to the evidence behind it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResult {
    pub status: Status,
    pub url: String,
}

impl TestResult {
    pub fn new(status: Status, url: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
        }
    }

    pub fn pending(url: impl Into<String>) -> Self {
        Self::new(Status::Pending, url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultEntry {
    pub test: Test,
    pub result: TestResult,
}

/// Tests of a test plan together with their latest results, in upstream order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestResults {
    pub id: String,
    pub name: String,
    pub url: String,
    pub results: Vec<ResultEntry>,
}

impl TestResults {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: UNKNOWN_NAME.to_string(),
            url: url.into(),
            results: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary::default();
        for entry in &self.results {
            summary.total += 1;
            match entry.result.status {
                Status::Pass => summary.passed += 1,
                Status::Fail => summary.failed += 1,
                Status::Pending => summary.pending += 1,
                Status::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub skipped: usize,
}

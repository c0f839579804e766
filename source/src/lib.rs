pub mod config;
mod http;
pub mod jira;
pub mod source;
pub mod status;
pub mod types;
pub mod xray;

pub use config::{
    JiraApiVersion, JiraAuthentication, JiraConfig, XrayCloudConfig, XrayServerAuthentication,
    XrayServerConfig,
};
pub use jira::{JiraApi, JiraClient, SearchRequest, SearchResponse};
pub use source::{SourceError, SourceResult, TestResultsSource};
pub use status::convert_status;
pub use types::{ResultEntry, ResultSummary, Status, Test, TestResult, TestResults};
pub use xray::{
    TestPlanSource, TestPlanSourceOptions, XrayClient, XrayCloudClient, XrayServerClient,
};

pub mod prelude {
    pub use crate::config::*;
    pub use crate::jira::*;
    pub use crate::source::*;
    pub use crate::types::*;
    pub use crate::xray::*;
}

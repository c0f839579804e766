use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_XRAY_CLOUD_URL: &str = "https://xray.cloud.getxray.app";
pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum JiraApiVersion {
    #[serde(rename = "version-2")]
    V2,
    #[default]
    #[serde(rename = "version-3")]
    V3,
}

impl JiraApiVersion {
    pub fn path_segment(&self) -> &'static str {
        match self {
            JiraApiVersion::V2 => "2",
            JiraApiVersion::V3 => "3",
        }
    }
}

/// Credentials for the Jira REST API.
///
/// Jira Cloud expects `Basic` with an email address and API token, Server/DC with a username and
/// password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JiraAuthentication {
    None,
    Basic { username: String, password: String },
    PersonalAccessToken { token: String },
    OAuth2 { access_token: String },
}

impl Default for JiraAuthentication {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    pub base_url: String,
    pub api_version: JiraApiVersion,
    #[serde(skip_serializing, default)]
    pub authentication: JiraAuthentication,
    pub timeout: Duration,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_version: JiraApiVersion::default(),
            authentication: JiraAuthentication::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl JiraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url.into());
        self
    }

    pub fn with_api_version(mut self, api_version: JiraApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn with_authentication(mut self, authentication: JiraAuthentication) -> Self {
        self.authentication = authentication;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_base_url(&self.base_url)?;

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrayCloudConfig {
    pub base_url: String,
    #[serde(skip_serializing, default)]
    pub client_id: String,
    #[serde(skip_serializing, default)]
    pub client_secret: String,
    pub timeout: Duration,
    pub page_size: usize,
}

impl Default for XrayCloudConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_XRAY_CLOUD_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl XrayCloudConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url.into());
        self
    }

    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_base_url(&self.base_url)?;

        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err("Xray Cloud requires a client ID and client secret".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.page_size == 0 {
            return Err("Page size must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum XrayServerAuthentication {
    Basic { username: String, password: String },
    PersonalAccessToken { token: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XrayServerConfig {
    pub base_url: String,
    #[serde(skip_serializing, default)]
    pub authentication: Option<XrayServerAuthentication>,
    pub timeout: Duration,
}

impl Default for XrayServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            authentication: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl XrayServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url.into());
        self
    }

    pub fn with_authentication(mut self, authentication: XrayServerAuthentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_base_url(&self.base_url)?;

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

fn trim_base_url(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

fn validate_base_url(base_url: &str) -> Result<(), String> {
    if base_url.is_empty() {
        return Err("Base URL cannot be empty".to_string());
    }

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err("Base URL must start with http:// or https://".to_string());
    }

    Ok(())
}

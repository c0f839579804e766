//! The `parrot` configuration file.
//!
//! The file only holds non-secret settings. Credentials and the webhook URL are read from the
//! environment when the clients are built, see [`EnvironmentVariable`].

use crate::env::{get_env, get_env_optional, EnvironmentVariable};
use drain::MicrosoftTeamsConfig;
use serde::{Deserialize, Serialize};
use source::config::{DEFAULT_PAGE_SIZE, DEFAULT_XRAY_CLOUD_URL};
use source::prelude::*;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable is undefined: {name}")]
    MissingEnv { name: &'static str },

    #[error("Unsupported configuration: {message}")]
    Unsupported { message: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JiraAuthMethod {
    #[default]
    Basic,
    Pat,
    OAuth2,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum XrayKind {
    Cloud,
    Server,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum XrayAuthMethod {
    ClientCredentials,
    Basic,
    Pat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JiraSection {
    pub url: String,
    #[serde(default)]
    pub api_version: JiraApiVersion,
    #[serde(default)]
    pub authentication: JiraAuthMethod,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XraySection {
    pub kind: XrayKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub authentication: XrayAuthMethod,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamsSection {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrainSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microsoft_teams: Option<TeamsSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_plan: Option<String>,
    pub jira: JiraSection,
    pub xray: XraySection,
    #[serde(default)]
    pub drain: DrainSection,
}

impl FromStr for FileConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: FileConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        std::fs::read_to_string(path)?.parse()
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects authentication methods the selected Xray deployment does not offer.
    pub fn validate(&self) -> ConfigResult<()> {
        match (self.xray.kind, self.xray.authentication) {
            (XrayKind::Cloud, XrayAuthMethod::ClientCredentials)
            | (XrayKind::Server, XrayAuthMethod::Basic | XrayAuthMethod::Pat) => {}
            (kind, authentication) => {
                return Err(ConfigError::Unsupported {
                    message: format!(
                        "Xray {:?} does not support {:?} authentication",
                        kind, authentication
                    ),
                })
            }
        }

        if self.xray.page_size == 0 {
            return Err(ConfigError::Invalid {
                message: "Page size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// The test plan to report on, preferring `requested` over the file's `test_plan`.
    pub fn test_plan_key(&self, requested: Option<String>) -> ConfigResult<String> {
        requested
            .or_else(|| self.test_plan.clone())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Invalid {
                message: "No test plan key given, pass --test-plan or set test_plan".to_string(),
            })
    }

    pub fn jira_url(&self) -> String {
        get_env_optional(EnvironmentVariable::JiraUrl).unwrap_or_else(|| self.jira.url.clone())
    }

    pub fn jira_config(&self) -> ConfigResult<JiraConfig> {
        let authentication = match self.jira.authentication {
            JiraAuthMethod::Basic => match self.xray.kind {
                XrayKind::Cloud => JiraAuthentication::Basic {
                    username: get_env(EnvironmentVariable::JiraEmail)?,
                    password: get_env(EnvironmentVariable::JiraToken)?,
                },
                XrayKind::Server => JiraAuthentication::Basic {
                    username: get_env(EnvironmentVariable::JiraUsername)?,
                    password: get_env(EnvironmentVariable::JiraPassword)?,
                },
            },
            JiraAuthMethod::Pat => JiraAuthentication::PersonalAccessToken {
                token: get_env(EnvironmentVariable::JiraToken)?,
            },
            JiraAuthMethod::OAuth2 => JiraAuthentication::OAuth2 {
                access_token: get_env(EnvironmentVariable::JiraToken)?,
            },
        };

        Ok(JiraConfig::new()
            .with_base_url(self.jira_url())
            .with_api_version(self.jira.api_version)
            .with_authentication(authentication)
            .with_timeout(Duration::from_secs(self.jira.timeout_secs)))
    }

    fn xray_url(&self, fallback: String) -> String {
        get_env_optional(EnvironmentVariable::XrayUrl)
            .or_else(|| self.xray.url.clone())
            .unwrap_or(fallback)
    }

    pub fn xray_cloud_config(&self) -> ConfigResult<XrayCloudConfig> {
        if self.xray.authentication != XrayAuthMethod::ClientCredentials {
            return Err(ConfigError::Unsupported {
                message: "Xray Cloud only supports client-credentials authentication".to_string(),
            });
        }

        Ok(XrayCloudConfig::new()
            .with_base_url(self.xray_url(DEFAULT_XRAY_CLOUD_URL.to_string()))
            .with_credentials(
                get_env(EnvironmentVariable::XrayClientId)?,
                get_env(EnvironmentVariable::XrayClientSecret)?,
            )
            .with_page_size(self.xray.page_size)
            .with_timeout(Duration::from_secs(self.xray.timeout_secs)))
    }

    pub fn xray_server_config(&self) -> ConfigResult<XrayServerConfig> {
        let authentication = match self.xray.authentication {
            XrayAuthMethod::Basic => XrayServerAuthentication::Basic {
                username: get_env(EnvironmentVariable::JiraUsername)?,
                password: get_env(EnvironmentVariable::JiraPassword)?,
            },
            XrayAuthMethod::Pat => XrayServerAuthentication::PersonalAccessToken {
                token: get_env(EnvironmentVariable::JiraToken)?,
            },
            XrayAuthMethod::ClientCredentials => {
                return Err(ConfigError::Unsupported {
                    message: "Xray Server does not support client-credentials authentication"
                        .to_string(),
                })
            }
        };

        Ok(XrayServerConfig::new()
            .with_base_url(self.xray_url(self.jira_url()))
            .with_authentication(authentication)
            .with_timeout(Duration::from_secs(self.xray.timeout_secs)))
    }

    /// `None` when the file has no `[drain.microsoft_teams]` table.
    pub fn teams_config(&self) -> ConfigResult<Option<MicrosoftTeamsConfig>> {
        let Some(teams) = &self.drain.microsoft_teams else {
            return Ok(None);
        };

        Ok(Some(
            MicrosoftTeamsConfig::new(get_env(EnvironmentVariable::MicrosoftTeamsWebhookUrl)?)
                .with_timeout(Duration::from_secs(teams.timeout_secs)),
        ))
    }

    /// Builds the Jira and Xray clients, authenticating against Xray Cloud if needed.
    pub async fn build_source(&self) -> ConfigResult<TestPlanSource> {
        let jira_config = self.jira_config()?;
        let jira_url = jira_config.base_url.clone();
        let jira = Arc::new(JiraClient::new(jira_config)?);

        let (xray, page_size) = match self.xray.kind {
            XrayKind::Cloud => {
                let config = self.xray_cloud_config()?;
                let page_size = config.page_size;
                let client = XrayCloudClient::authenticate(config).await?;
                (XrayClient::Cloud(Arc::new(client)), page_size)
            }
            XrayKind::Server => {
                let client = XrayServerClient::new(self.xray_server_config()?)?;
                (XrayClient::Server(Arc::new(client)), DEFAULT_PAGE_SIZE)
            }
        };

        info!("Using Xray {:?} with Jira at {}", self.xray.kind, jira_url);
        Ok(TestPlanSource::new(
            TestPlanSourceOptions::new(jira, jira_url, xray).with_page_size(page_size),
        ))
    }
}

use crate::config::{ConfigError, ConfigResult};
use std::fmt;

/// Environment variables holding the secrets and overrides that never go into config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentVariable {
    JiraEmail,
    JiraPassword,
    JiraToken,
    JiraUrl,
    JiraUsername,
    MicrosoftTeamsWebhookUrl,
    XrayClientId,
    XrayClientSecret,
    XrayUrl,
}

impl EnvironmentVariable {
    pub const ALL: [EnvironmentVariable; 9] = [
        EnvironmentVariable::JiraEmail,
        EnvironmentVariable::JiraPassword,
        EnvironmentVariable::JiraToken,
        EnvironmentVariable::JiraUrl,
        EnvironmentVariable::JiraUsername,
        EnvironmentVariable::MicrosoftTeamsWebhookUrl,
        EnvironmentVariable::XrayClientId,
        EnvironmentVariable::XrayClientSecret,
        EnvironmentVariable::XrayUrl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EnvironmentVariable::JiraEmail => "JIRA_EMAIL",
            EnvironmentVariable::JiraPassword => "JIRA_PASSWORD",
            EnvironmentVariable::JiraToken => "JIRA_TOKEN",
            EnvironmentVariable::JiraUrl => "JIRA_URL",
            EnvironmentVariable::JiraUsername => "JIRA_USERNAME",
            EnvironmentVariable::MicrosoftTeamsWebhookUrl => "MICROSOFT_TEAMS_WEBHOOK_URL",
            EnvironmentVariable::XrayClientId => "XRAY_CLIENT_ID",
            EnvironmentVariable::XrayClientSecret => "XRAY_CLIENT_SECRET",
            EnvironmentVariable::XrayUrl => "XRAY_URL",
        }
    }
}

impl fmt::Display for EnvironmentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reads a variable, treating an empty value as unset.
pub fn get_env_optional(variable: EnvironmentVariable) -> Option<String> {
    std::env::var(variable.name())
        .ok()
        .filter(|value| !value.is_empty())
}

pub fn get_env(variable: EnvironmentVariable) -> ConfigResult<String> {
    get_env_optional(variable).ok_or(ConfigError::MissingEnv {
        name: variable.name(),
    })
}

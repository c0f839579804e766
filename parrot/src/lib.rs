pub mod config;
pub mod env;

pub use config::{
    ConfigError, ConfigResult, DrainSection, FileConfig, JiraAuthMethod, JiraSection,
    TeamsSection, XrayAuthMethod, XrayKind, XraySection,
};
pub use env::{get_env, get_env_optional, EnvironmentVariable};

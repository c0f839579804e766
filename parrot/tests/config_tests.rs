use parrot::{ConfigError, EnvironmentVariable, FileConfig, XrayKind};
use serial_test::serial;
use source::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn clear_env() {
    for variable in EnvironmentVariable::ALL {
        std::env::remove_var(variable.name());
    }
}

#[test]
fn test_load_from_file() {
    let file = write_config(
        r#"
test_plan = "PROJ-1"

[jira]
url = "https://jira.example.com"
api_version = "version-2"
authentication = "basic"

[xray]
kind = "server"
authentication = "basic"
"#,
    );

    let config = FileConfig::load(file.path()).unwrap();
    assert_eq!(config.xray.kind, XrayKind::Server);
    assert_eq!(config.test_plan_key(None).unwrap(), "PROJ-1");

    let reparsed: FileConfig = config.to_toml().unwrap().parse().unwrap();
    assert_eq!(reparsed, config);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = FileConfig::load(dir.path().join("parrot.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[tokio::test]
#[serial]
async fn test_build_server_source() {
    clear_env();
    std::env::set_var("JIRA_USERNAME", "admin");
    std::env::set_var("JIRA_PASSWORD", "secret");

    let config: FileConfig = r#"
[jira]
url = "https://jira.example.com"
api_version = "version-2"

[xray]
kind = "server"
authentication = "basic"
"#
    .parse()
    .unwrap();

    let source = config.build_source().await.unwrap();
    assert_eq!(source.kind(), "server");
    assert_eq!(source.source_name(), "xray-server");

    let shown = config.to_toml().unwrap();
    assert!(!shown.contains("secret"));
    clear_env();
}

#[tokio::test]
#[serial]
async fn test_build_cloud_source_authenticates() {
    clear_env();
    let mut xray = mockito::Server::new_async().await;
    let auth = xray
        .mock("POST", "/api/v2/authenticate")
        .with_status(200)
        .with_body(r#""token""#)
        .expect(1)
        .create_async()
        .await;

    std::env::set_var("JIRA_EMAIL", "me@example.com");
    std::env::set_var("JIRA_TOKEN", "api-token");
    std::env::set_var("XRAY_CLIENT_ID", "id");
    std::env::set_var("XRAY_CLIENT_SECRET", "secret");
    std::env::set_var("XRAY_URL", xray.url());

    let config: FileConfig = r#"
[jira]
url = "https://example.atlassian.net"

[xray]
kind = "cloud"
authentication = "client-credentials"
"#
    .parse()
    .unwrap();

    let source = config.build_source().await.unwrap();
    auth.assert_async().await;
    assert_eq!(source.kind(), "cloud");
    clear_env();
}

#[tokio::test]
#[serial]
async fn test_build_cloud_source_rejected_credentials() {
    clear_env();
    let mut xray = mockito::Server::new_async().await;
    let _auth = xray
        .mock("POST", "/api/v2/authenticate")
        .with_status(401)
        .create_async()
        .await;

    std::env::set_var("JIRA_EMAIL", "me@example.com");
    std::env::set_var("JIRA_TOKEN", "api-token");
    std::env::set_var("XRAY_CLIENT_ID", "id");
    std::env::set_var("XRAY_CLIENT_SECRET", "wrong");
    std::env::set_var("XRAY_URL", xray.url());

    let config: FileConfig = r#"
[jira]
url = "https://example.atlassian.net"

[xray]
kind = "cloud"
authentication = "client-credentials"
"#
    .parse()
    .unwrap();

    let result = config.build_source().await;
    assert!(matches!(
        result,
        Err(ConfigError::Source(SourceError::Api { status: 401, .. }))
    ));
    clear_env();
}

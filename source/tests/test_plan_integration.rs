//! End-to-end aggregation against mocked Jira and Xray endpoints.

use mockito::Matcher;
use source::prelude::*;
use std::sync::Arc;

#[tokio::test]
async fn test_cloud_test_plan_end_to_end() {
    let mut xray = mockito::Server::new_async().await;
    let _auth = xray
        .mock("POST", "/api/v2/authenticate")
        .with_status(200)
        .with_body(r#""cloud-token""#)
        .create_async()
        .await;
    let _first_page = xray
        .mock("POST", "/api/v2/graphql")
        .match_header("authorization", "Bearer cloud-token")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "variables": {"start": 0, "limit": 2}
        })))
        .with_status(200)
        .with_body(
            r#"{"data":{"getTestPlans":{"results":[{
                "jira":{"summary":"Nightly","project":{"key":"PROJ"}},
                "tests":{"results":[
                    {"jira":{"key":"PROJ-2","summary":"login"},
                     "testRuns":{"results":[{"status":{"name":"PASSED"},
                        "testExecution":{"jira":{"key":"PROJ-10"}}}]}},
                    {"jira":{"key":"PROJ-3","summary":"logout"},
                     "testRuns":{"results":[]}}
                ]}
            }]}}}"#,
        )
        .create_async()
        .await;
    let _last_page = xray
        .mock("POST", "/api/v2/graphql")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "variables": {"start": 2, "limit": 2}
        })))
        .with_status(200)
        .with_body(
            r#"{"data":{"getTestPlans":{"results":[{
                "jira":{"summary":"Nightly","project":{"key":"PROJ"}},
                "tests":{"results":[]}
            }]}}}"#,
        )
        .create_async()
        .await;

    let config = XrayCloudConfig::new()
        .with_base_url(xray.url())
        .with_credentials("id", "secret");
    let client = XrayCloudClient::authenticate(config).await.unwrap();
    let jira =
        JiraClient::new(JiraConfig::new().with_base_url("https://example.atlassian.net")).unwrap();

    let options = TestPlanSourceOptions::new(
        Arc::new(jira),
        "https://example.atlassian.net",
        XrayClient::Cloud(Arc::new(client)),
    )
    .with_page_size(2);
    let source = TestPlanSource::new(options);

    let results = source.get_test_results("PROJ-1").await.unwrap();
    assert_eq!(results.name, "Nightly");
    assert_eq!(results.results.len(), 2);

    let passed = &results.results[0];
    assert_eq!(passed.test.id, "PROJ-2");
    assert_eq!(passed.test.url, "https://example.atlassian.net/browse/PROJ-2");
    assert_eq!(passed.result.status, Status::Pass);
    assert!(passed.result.url.starts_with("https://example.atlassian.net/projects/PROJ?"));
    assert!(passed.result.url.ends_with("&ac.testExecutionKey=PROJ-10&ac.testKey=PROJ-2"));

    let pending = &results.results[1];
    assert_eq!(pending.result.status, Status::Pending);
    assert_eq!(pending.result.url, "https://example.atlassian.net/browser/PROJ-1");
}

#[tokio::test]
async fn test_server_test_plan_end_to_end() {
    let mut jira = mockito::Server::new_async().await;
    let _title = jira
        .mock("POST", "/rest/api/2/search")
        .match_body(Matcher::Json(serde_json::json!({
            "jql": "issue in (PLAN-1)",
            "fields": ["summary"]
        })))
        .with_status(200)
        .with_body(r#"{"issues":[{"key":"PLAN-1","fields":{"summary":"Smoke"}}]}"#)
        .create_async()
        .await;
    let _tests = jira
        .mock("POST", "/rest/api/2/search")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "jql": "issue in (PROJ-2,PROJ-3)",
            "startAt": 0
        })))
        .with_status(200)
        .with_body(
            r#"{"startAt":0,"total":2,"issues":[
                {"id":"1","key":"PROJ-2","fields":{"summary":"login"}},
                {"id":"2","key":"PROJ-3","fields":{"summary":"logout"}}]}"#,
        )
        .create_async()
        .await;
    let _done = jira
        .mock("POST", "/rest/api/2/search")
        .match_body(Matcher::PartialJson(serde_json::json!({"startAt": 2})))
        .with_status(200)
        .with_body(r#"{"startAt":2,"total":2,"issues":[]}"#)
        .create_async()
        .await;
    let _listing = jira
        .mock("GET", "/rest/raven/1.0/api/testplan/PLAN-1/test")
        .with_status(200)
        .with_body(
            r#"[{"id":1,"key":"PROJ-2","latestStatus":"FAIL"},
                {"id":2,"key":"PROJ-3","latestStatus":"SKIPPED"}]"#,
        )
        .create_async()
        .await;

    let jira_client = JiraClient::new(
        JiraConfig::new()
            .with_base_url(jira.url())
            .with_api_version(JiraApiVersion::V2),
    )
    .unwrap();
    let xray_client =
        XrayServerClient::new(XrayServerConfig::new().with_base_url(jira.url())).unwrap();

    let options = TestPlanSourceOptions::new(
        Arc::new(jira_client),
        jira.url(),
        XrayClient::Server(Arc::new(xray_client)),
    );
    let results = TestPlanSource::new(options)
        .get_test_results("PLAN-1")
        .await
        .unwrap();

    assert_eq!(results.name, "Smoke");
    assert_eq!(results.url, format!("{}/browse/PLAN-1", jira.url()));
    let statuses: Vec<Status> = results.results.iter().map(|e| e.result.status).collect();
    assert_eq!(statuses, vec![Status::Fail, Status::Skipped]);
    assert_eq!(
        results.results[1].result.url,
        format!("{}/browse/PROJ-3", jira.url())
    );

    let summary = results.summary();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
}

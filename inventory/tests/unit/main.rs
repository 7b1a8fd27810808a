//! Integration tests against a mocked BOSH director

mod test_build;

use std::time::Duration;

use bosh_inventory::http::client::{HttpClient, TransportOptions};
use httpmock::prelude::*;
use httpmock::Mock;
use secrecy::SecretString;
use serde_json::Value;

/// `admin:secret`, base64 encoded
pub const BASIC_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

pub fn client(server: &MockServer) -> HttpClient {
    let options = TransportOptions::new("admin", SecretString::from("secret".to_string()));
    HttpClient::new(&server.base_url(), options).unwrap()
}

pub async fn no_sleep(_: Duration) {}

/// Render records as a task result stream
pub fn result_stream(records: &[Value]) -> String {
    records
        .iter()
        .map(|r| format!("{}\n", r))
        .collect()
}

/// Mocks of one deployment resolved through task `task_id`
pub struct DeploymentMocks<'a> {
    pub submit: Mock<'a>,
    pub poll: Mock<'a>,
    pub output: Mock<'a>,
}

/// Mock a deployment whose instances task finishes immediately
pub async fn mock_deployment<'a>(
    server: &'a MockServer,
    name: &str,
    task_id: u32,
    records: &[Value],
) -> DeploymentMocks<'a> {
    let task_path = format!("/tasks/{}", task_id);

    let submit = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/deployments/{}/instances", name))
                .query_param("format", "full");
            then.status(302).header("Location", task_path.as_str());
        })
        .await;
    let poll = server
        .mock_async(|when, then| {
            when.method(GET).path(task_path.as_str());
            then.status(200)
                .json_body(serde_json::json!({ "id": task_id, "state": "done" }));
        })
        .await;
    let output = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{}/output", task_path))
                .query_param("type", "result")
                .header("Accept", "text/plain");
            then.status(200).body(result_stream(records));
        })
        .await;

    DeploymentMocks { submit, poll, output }
}

/// Mock `GET /deployments`
pub async fn mock_deployments<'a>(server: &'a MockServer, names: &[&str]) -> Mock<'a> {
    let body: Vec<Value> = names
        .iter()
        .map(|name| serde_json::json!({ "name": name, "releases": [], "stemcells": [] }))
        .collect();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/deployments").header("Authorization", BASIC_AUTH);
            then.status(200).json_body(Value::Array(body));
        })
        .await
}

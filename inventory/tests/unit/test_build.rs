//! Inventory build tests over a mocked director

use std::collections::BTreeSet;

use bosh_inventory::app::options::AppOptions;
use bosh_inventory::app::run::build_inventory;
use bosh_inventory::inventory::builder::HostOptions;
use httpmock::prelude::*;
use serde_json::{json, Value};

use crate::{client, mock_deployment, mock_deployments, no_sleep};

fn cf_records() -> Vec<Value> {
    vec![
        json!({
            "job_name": "nats", "index": 0, "vm_cid": "vm-n0",
            "ips": ["10.0.16.4"], "dns": ["0.nats.default.cf.bosh"], "state": "running"
        }),
        json!({
            "job_name": "router", "index": 0, "vm_cid": "vm-r0",
            "ips": ["10.0.16.5", "192.168.1.5"], "dns": [], "state": "running"
        }),
        json!({
            "job_name": "router", "index": 1, "vm_cid": "vm-r1",
            "ips": ["10.0.16.6", "192.168.1.6"], "dns": ["1.router.default.cf.bosh"], "state": "running"
        }),
        json!({ "job_name": "smoke-tests", "index": 0, "vm_cid": null, "ips": [] }),
    ]
}

fn redis_records() -> Vec<Value> {
    vec![json!({
        "job_name": "redis", "index": 0, "vm_cid": "vm-x0",
        "ips": ["10.0.32.2"], "dns": ["0.redis.default.redis.bosh"]
    })]
}

/// `(section, host)` pairs of the host sections of an INI inventory
fn ini_memberships(ini: &str) -> BTreeSet<(String, String)> {
    let mut pairs = BTreeSet::new();
    let mut section: Option<String> = None;
    for line in ini.lines() {
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = (!name.contains(':')).then(|| name.to_string());
        } else if let (Some(section), Some(host)) = (&section, line.split_whitespace().next()) {
            pairs.insert((section.clone(), host.to_string()));
        }
    }
    pairs
}

/// `(group, host)` pairs of the `hosts` lists of a JSON inventory
fn json_memberships(document: &Value) -> BTreeSet<(String, String)> {
    let mut pairs = BTreeSet::new();
    for (group, body) in document.as_object().unwrap() {
        if group == "_meta" {
            continue;
        }
        for host in body["hosts"].as_array().unwrap() {
            pairs.insert((group.clone(), host.as_str().unwrap().to_string()));
        }
    }
    pairs
}

#[tokio::test]
async fn test_build_inventory() {
    let server = MockServer::start_async().await;
    mock_deployments(&server, &["cf", "redis"]).await;
    mock_deployment(&server, "cf", 1, &cf_records()).await;
    mock_deployment(&server, "redis", 2, &redis_records()).await;

    let options = AppOptions {
        hosts: HostOptions {
            ip_index: 2,
            pass_through: vec!["state".to_string()],
            literals: vec![("ansible_user".to_string(), "vcap".to_string())],
            ..Default::default()
        },
        ..Default::default()
    };
    let inventory = build_inventory(&client(&server), &options, no_sleep)
        .await
        .unwrap();

    let document = inventory.to_json();
    assert_eq!(document["cf"]["children"], json!(["nats", "router"]));
    // the job shares its deployment's name, so both land in one group
    assert_eq!(document["redis"]["children"], json!([]));
    assert_eq!(document["redis"]["hosts"], json!(["0.redis.default.redis.bosh"]));
    assert_eq!(
        document["router"]["hosts"],
        json!(["router-0", "1.router.default.cf.bosh"])
    );
    assert!(document.get("smoke-tests").is_none());

    let vars = &document["_meta"]["hostvars"]["1.router.default.cf.bosh"];
    assert_eq!(
        vars,
        &json!({ "ansible_host": "192.168.1.6", "state": "running", "ansible_user": "vcap" })
    );

    // nats has a single IP, so index 2 falls back to the first one
    assert_eq!(
        document["_meta"]["hostvars"]["0.nats.default.cf.bosh"]["ansible_host"],
        json!("10.0.16.4")
    );
    assert_eq!(inventory.warnings().len(), 2);
}

#[tokio::test]
async fn test_deployment_filter() {
    let server = MockServer::start_async().await;
    mock_deployments(&server, &["a", "b"]).await;
    let a = mock_deployment(&server, "a", 1, &cf_records()).await;
    mock_deployment(&server, "b", 2, &redis_records()).await;

    let options = AppOptions {
        target_deployment: Some("b".to_string()),
        ..Default::default()
    };
    let inventory = build_inventory(&client(&server), &options, no_sleep)
        .await
        .unwrap();

    let deployments: Vec<_> = inventory.deployments().map(|g| g.name.as_str()).collect();
    assert_eq!(deployments, vec!["b"]);
    assert!(inventory.group("router").is_none());
    assert!(inventory.group("redis").is_some());
    a.submit.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_output_is_deterministic() {
    let server = MockServer::start_async().await;
    mock_deployments(&server, &["cf", "redis"]).await;
    mock_deployment(&server, "cf", 1, &cf_records()).await;
    mock_deployment(&server, "redis", 2, &redis_records()).await;

    let options = AppOptions {
        concurrency: 2,
        ..Default::default()
    };
    let client = client(&server);

    let first = build_inventory(&client, &options, no_sleep).await.unwrap();
    let second = build_inventory(&client, &options, no_sleep).await.unwrap();

    assert_eq!(first.render_json().unwrap(), second.render_json().unwrap());
    assert_eq!(first.render_ini(), second.render_ini());
}

#[tokio::test]
async fn test_json_and_ini_agree() {
    let server = MockServer::start_async().await;
    mock_deployments(&server, &["cf", "redis"]).await;
    mock_deployment(&server, "cf", 1, &cf_records()).await;
    mock_deployment(&server, "redis", 2, &redis_records()).await;

    let options = AppOptions::default();
    let inventory = build_inventory(&client(&server), &options, no_sleep)
        .await
        .unwrap();

    let from_model: BTreeSet<_> = inventory.memberships().into_iter().collect();
    let from_json = json_memberships(&inventory.to_json());
    let from_ini = ini_memberships(&inventory.render_ini());
    assert_eq!(from_json, from_model);
    assert_eq!(from_ini, from_model);
    assert_eq!(from_json.len(), 4);
    assert!(from_ini.contains(&("redis".to_string(), "0.redis.default.redis.bosh".to_string())));
}

#[tokio::test]
async fn test_failed_deployment_is_an_empty_group() {
    let server = MockServer::start_async().await;
    mock_deployments(&server, &["cf", "broken"]).await;
    mock_deployment(&server, "cf", 1, &cf_records()).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/deployments/broken/instances");
            then.status(500);
        })
        .await;

    let inventory = build_inventory(&client(&server), &AppOptions::default(), no_sleep)
        .await
        .unwrap();

    let broken = inventory.group("broken").unwrap();
    assert!(broken.is_deployment);
    assert!(broken.children.is_empty());
    assert!(inventory.group("nats").is_some());
}

#[tokio::test]
async fn test_deployment_listing_failure_is_empty() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/deployments");
            then.status(401);
        })
        .await;

    let inventory = build_inventory(&client(&server), &AppOptions::default(), no_sleep)
        .await
        .unwrap();

    assert!(inventory.groups().is_empty());
    assert_eq!(inventory.render_ini(), "[all:children]\n\n");
}

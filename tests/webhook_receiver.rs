//! End to end tests of the webhook receiver against a fake mattermost server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use alertmatter::{
    mattermost::{Forwarder, MattermostSettings},
    metrics::Metrics,
    webhook_receiver::{self, State},
};
use mockito::Matcher;
use serde_json::json;

fn example_payload() -> serde_json::Value {
    json!({
        "status": "firing",
        "alerts": [{
            "status": "firing",
            "labels": { "alertname": "HighCPU" },
            "annotations": { "summary": "CPU high" },
            "startsAt": "2024-01-01T00:00:00Z",
            "generatorURL": "http://x",
            "fingerprint": "abc"
        }],
        "receiver": "r1",
        "externalURL": "http://am"
    })
}

/// Runs the receiver on an ephemeral port, forwarding to `webhook_url`.
async fn spawn_receiver(webhook_url: &str) -> SocketAddr {
    let metrics = Metrics::new().unwrap();
    let forwarder = Forwarder::new(&MattermostSettings {
        url: url::Url::parse(webhook_url).unwrap(),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap();
    let state = Arc::new(State::new(forwarder, metrics));

    let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap())
        .serve(webhook_receiver::router(state).into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);

    addr
}

#[tokio::test]
async fn forwards_notification_to_mattermost() {
    let mut mattermost = mockito::Server::new_async().await;
    let mock = mattermost
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "channel": "town-square",
            "username": "alertmatter",
            "icon_emoji": ":bell:",
            "attachments": [{ "color": "#FF0000" }]
        })))
        .with_status(200)
        .create_async()
        .await;

    let addr = spawn_receiver(&mattermost.url()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/alert?channel=town-square"))
        .json(&example_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "");
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_channel_is_rejected_without_delivery() {
    let mut mattermost = mockito::Server::new_async().await;
    let mock = mattermost.mock("POST", "/").expect(0).create_async().await;

    let addr = spawn_receiver(&mattermost.url()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/alert"))
        .json(&example_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(response.text().await.unwrap().contains("channel"));
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_channel_is_rejected_without_delivery() {
    let mut mattermost = mockito::Server::new_async().await;
    let mock = mattermost.mock("POST", "/").expect(0).create_async().await;

    let addr = spawn_receiver(&mattermost.url()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/alert?channel="))
        .json(&example_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    mock.assert_async().await;
}

#[tokio::test]
async fn non_post_method_is_rejected_without_delivery() {
    let mut mattermost = mockito::Server::new_async().await;
    let mock = mattermost.mock("POST", "/").expect(0).create_async().await;

    let addr = spawn_receiver(&mattermost.url()).await;

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/alert?channel=town-square"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 405);
    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_body_is_rejected_without_delivery() {
    let mut mattermost = mockito::Server::new_async().await;
    let mock = mattermost.mock("POST", "/").expect(0).create_async().await;

    let addr = spawn_receiver(&mattermost.url()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/alert?channel=town-square"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    mock.assert_async().await;
}

#[tokio::test]
async fn destination_failure_is_reported_with_status_text() {
    let mut mattermost = mockito::Server::new_async().await;
    let mock = mattermost
        .mock("POST", "/")
        .with_status(500)
        .create_async()
        .await;

    let addr = spawn_receiver(&mattermost.url()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/alert?channel=town-square"))
        .json(&example_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("500 Internal Server Error"));
    mock.assert_async().await;
}

//! Live event stream tests

mod mocks;

use std::time::Duration;

use axum::{
	body::{Body, BodyDataStream},
	http::{Request, StatusCode},
	Router,
};
use futures::StreamExt;
use mocks::ApiFixtures;
use serde_json::{json, Value};
use tower::ServiceExt;

const WAIT: Duration = Duration::from_secs(5);

/// Split one SSE frame into its event name and data payload
fn parse_frame(frame: &str) -> (Option<String>, Option<String>) {
	let mut event = None;
	let mut data = None;
	for line in frame.lines() {
		if let Some(name) = line.strip_prefix("event:") {
			event = Some(name.trim().to_string());
		} else if let Some(payload) = line.strip_prefix("data:") {
			data = Some(payload.trim().to_string());
		}
	}
	(event, data)
}

/// Read frames until one with the given event name arrives, returning its data
async fn next_frame(stream: &mut BodyDataStream, buffer: &mut String, event: &str) -> Value {
	loop {
		while let Some(end) = buffer.find("\n\n") {
			let frame: String = buffer.drain(..end + 2).collect();
			if let (Some(name), Some(data)) = parse_frame(&frame) {
				if name == event {
					return serde_json::from_str(&data).unwrap();
				}
			}
		}
		let chunk = tokio::time::timeout(WAIT, stream.next())
			.await
			.expect("timed out waiting for frame")
			.expect("stream ended")
			.unwrap();
		buffer.push_str(std::str::from_utf8(&chunk).unwrap());
	}
}

async fn open_stream(app: &Router) -> BodyDataStream {
	let response = app
		.clone()
		.oneshot(Request::builder().uri("/mcp/events").body(Body::empty()).unwrap())
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
	assert!(response.headers()["content-type"]
		.to_str()
		.unwrap()
		.starts_with("text/event-stream"));
	response.into_body().into_data_stream()
}

async fn post_rpc(app: &Router, body: &Value) -> StatusCode {
	let request = Request::builder()
		.method("POST")
		.uri("/mcp/tools")
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.unwrap();
	app.clone().oneshot(request).await.unwrap().status()
}

#[tokio::test]
async fn test_stream_starts_with_ready_then_tool_events() {
	let (app, state) = ApiFixtures::app(ApiFixtures::settings()).await;
	let mut stream = open_stream(&app).await;
	let mut buffer = String::new();

	let ready = next_frame(&mut stream, &mut buffer, "ready").await;
	assert!(ready["subscription_id"].as_u64().is_some());
	assert!(ready["timestamp"].is_string());
	assert_eq!(state.events.subscriber_count(), 1);

	let sample = ApiFixtures::weight("u1", 70.0, "2024-05-01T08:00:00Z");
	let status = post_rpc(&app, &ApiFixtures::tool_call(7, "health_store_metric", sample)).await;
	assert_eq!(status, StatusCode::OK);

	let event = next_frame(&mut stream, &mut buffer, "tool_call").await;
	assert_eq!(event["id"], 7);
	assert_eq!(event["method"], "tools.call");
	assert_eq!(event["tool"], "health_store_metric");
	assert_eq!(event["arguments"]["user_id"], "u1");
	assert_eq!(event["result"]["deduplicated"], false);

	let status = post_rpc(
		&app,
		&ApiFixtures::tool_call(8, "health_missing", json!({})),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let event = next_frame(&mut stream, &mut buffer, "tool_error").await;
	assert_eq!(event["id"], 8);
	assert_eq!(event["error"]["kind"], "NOT_FOUND");
	assert_eq!(event["error"]["code"], -32601);
}

#[tokio::test]
async fn test_stream_heartbeat_when_idle() {
	let mut settings = ApiFixtures::settings();
	settings.events.heartbeat_secs = 1;
	let (app, _state) = ApiFixtures::app(settings).await;

	let mut stream = open_stream(&app).await;
	let mut buffer = String::new();

	next_frame(&mut stream, &mut buffer, "ready").await;
	let heartbeat = next_frame(&mut stream, &mut buffer, "heartbeat").await;
	assert!(heartbeat["timestamp"].is_string());
}

#[tokio::test]
async fn test_stream_ends_on_bus_shutdown() {
	let (app, state) = ApiFixtures::app(ApiFixtures::settings()).await;
	let mut stream = open_stream(&app).await;
	let mut buffer = String::new();
	next_frame(&mut stream, &mut buffer, "ready").await;

	state.events.shutdown().await;

	let end = tokio::time::timeout(WAIT, async {
		while let Some(chunk) = stream.next().await {
			if chunk.is_err() {
				break;
			}
		}
	})
	.await;
	assert!(end.is_ok());
	assert_eq!(state.events.subscriber_count(), 0);
}

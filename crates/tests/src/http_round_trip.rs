//! Full-stack HTTP round trips: router -> dispatcher -> Elasticsearch sink
//! against an in-process fake Elasticsearch.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use dispatcher::{Dispatcher, DispatcherConfig};
use es_sink::ElasticSink;
use http_body_util::BodyExt;
use observability::{LogController, PipelineMetricsAggregator};
use tower::ServiceExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

async fn fake_es_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "fake-node",
        "version": {"number": "6.8.23"}
    }))
}

async fn fake_es_bulk(body: String) -> Json<serde_json::Value> {
    let items: Vec<serde_json::Value> = body
        .lines()
        .step_by(2)
        .map(|line| {
            let action: serde_json::Value = serde_json::from_str(line).unwrap();
            let id = action["index"]["_id"].as_str().unwrap();
            serde_json::json!({"index": {"_id": id, "result": "created", "status": 201}})
        })
        .collect();
    Json(serde_json::json!({"took": 1, "errors": false, "items": items}))
}

async fn start_fake_es() -> SocketAddr {
    let app = Router::new()
        .route("/", get(fake_es_root))
        .route("/_bulk", post(fake_es_bulk));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

struct Stack {
    router: Router,
    dispatcher: Dispatcher,
    _layer: reload::Layer<EnvFilter, Registry>,
}

async fn start_stack() -> Stack {
    let es_addr = start_fake_es().await;
    let sink = ElasticSink::new(format!("http://{es_addr}")).unwrap();
    let dispatcher = Dispatcher::spawn(
        DispatcherConfig {
            max_worker: 2,
            batch_size: 8,
            batch_timeout: Duration::from_millis(20),
            queue_capacity: 64,
            probe_interval: Duration::from_millis(10),
            report_interval: Duration::from_secs(60),
        },
        sink,
    );
    let (layer, handle) = reload::Layer::new(EnvFilter::new("info"));
    let state = AppState {
        dispatcher: dispatcher.handle(),
        log_controller: LogController::new(handle, "info"),
        req_timeout: Duration::from_secs(3),
        aggregator: Arc::new(Mutex::new(PipelineMetricsAggregator::new())),
    };
    Stack {
        router: api::router(state),
        dispatcher,
        _layer: layer,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_req(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_through_real_sink() {
    let stack = start_stack().await;

    let response = stack
        .router
        .clone()
        .oneshot(post_req(
            "/audit/_index",
            r#"{"timstamp": "2023-04-01T10:00:00Z", "guid": "e2e-1", "user": "alice"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["err_code"], 0);
    assert_eq!(json["detail"]["guid"], "e2e-1");
    assert_eq!(json["detail"]["result"], "created");

    stack.dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_bulk_through_real_sink() {
    let stack = start_stack().await;

    let body = concat!(
        r#"{"index": {"timstamp": "2023-04-01T10:00:00Z", "guid": "b-1"}}"#,
        "\n",
        r#"{"user": "alice"}"#,
        "\n",
        r#"{"index": {"timstamp": "2023-04-02T10:00:00Z", "guid": "b-2"}}"#,
        "\n",
        r#"{"user": "bob"}"#,
        "\n",
    );
    let response = stack
        .router
        .clone()
        .oneshot(post_req("/audit/_bulk", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["err_code"], 0);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["items"][0]["guid"], "b-1");
    assert_eq!(json["items"][0]["err_code"], 0);
    assert_eq!(json["items"][1]["guid"], "b-2");

    stack.dispatcher.shutdown().await;
}

#[tokio::test]
async fn test_ping_and_level_surface() {
    let stack = start_stack().await;

    let response = stack
        .router
        .clone()
        .oneshot(Request::get("/audit/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "pong");

    let response = stack
        .router
        .clone()
        .oneshot(post_req("/audit/level", r#"{"level": "debug"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["level"], "debug");

    stack.dispatcher.shutdown().await;
}

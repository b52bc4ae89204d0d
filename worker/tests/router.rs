use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use common::{ChunkResult, ErrorBody, WorkerHeartbeatRequest, WorkerRegisterRequest};
use serde_json::{json, Value};
use std::{
    fs,
    io::Write,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use worker::{build_router, heartbeat, WorkerConfig, WorkerState};

fn temp_dir(sub: &str) -> PathBuf {
    let base = std::env::temp_dir().join("worker_tests").join(sub);
    let _ = fs::remove_dir_all(&base);
    fs::create_dir_all(&base).unwrap();
    base
}

fn config(coordinator_url: &str) -> WorkerConfig {
    WorkerConfig {
        bind: "127.0.0.1".to_string(),
        port: 0,
        worker_id: "w-test".to_string(),
        worker_url: "http://127.0.0.1:9".to_string(),
        coordinator_url: coordinator_url.to_string(),
        heartbeat_interval: None,
    }
}

fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}

/// Coordinator falso que guarda lo que recibe en /register y /heartbeat.
#[derive(Clone, Default)]
struct FakeCoordinator {
    registered: Arc<Mutex<Vec<WorkerRegisterRequest>>>,
    heartbeats: Arc<Mutex<Vec<WorkerHeartbeatRequest>>>,
}

async fn fake_register(
    State(c): State<FakeCoordinator>,
    Json(req): Json<WorkerRegisterRequest>,
) -> String {
    let id = req.worker_id.clone();
    c.registered.lock().unwrap().push(req);
    format!("Worker {id} registered.")
}

async fn fake_heartbeat(
    State(c): State<FakeCoordinator>,
    Json(req): Json<WorkerHeartbeatRequest>,
) -> &'static str {
    c.heartbeats.lock().unwrap().push(req);
    "ok"
}

async fn spawn_fake_coordinator(c: FakeCoordinator) -> String {
    let app = Router::new()
        .route("/register", post(fake_register))
        .route("/heartbeat", post(fake_heartbeat))
        .with_state(c);
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn post_process(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn process_devuelve_metricas_del_rango() {
    let path = temp_dir("process").join("app.log");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "2024-01-01T00:00:00 INFO Request processed in 40ms").unwrap();
    writeln!(f, "basura").unwrap();
    writeln!(f, "2024-01-01T00:00:01 INFO Request processed in 60ms").unwrap();
    drop(f);

    let app = build_router(WorkerState::new(config(&unreachable_url())));
    let (status, body) = send(
        app,
        post_process(json!({"filepath": path.to_string_lossy(), "start": 0, "size": 4096})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let r: ChunkResult = serde_json::from_slice(&body).unwrap();
    assert_eq!(r.requests_per_second, 2);
    assert_eq!(r.malformed_lines, 1);
    assert!((r.avg_response_time - 50.0).abs() < 1e-9);
    assert_eq!(r.error_rate, 0.0);
}

#[tokio::test]
async fn process_archivo_inexistente_responde_404() {
    let path = temp_dir("missing").join("no_existe.log");
    let app = build_router(WorkerState::new(config(&unreachable_url())));

    let (status, body) = send(
        app,
        post_process(json!({"filepath": path.to_string_lossy(), "start": 0, "size": 10})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: ErrorBody = serde_json::from_slice(&body).unwrap();
    assert!(err.error.contains("no_existe.log"));
}

#[tokio::test]
async fn process_size_cero_responde_400() {
    let app = build_router(WorkerState::new(config(&unreachable_url())));
    let (status, _) = send(
        app,
        post_process(json!({"filepath": "/tmp/lo-que-sea.log", "start": 0, "size": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn heartbeat_responde_200_aunque_el_coordinator_no_este() {
    let app = build_router(WorkerState::new(config(&unreachable_url())));
    let req = Request::builder().uri("/heartbeat").body(Body::empty()).unwrap();

    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "Health check passed.");
}

#[tokio::test]
async fn heartbeat_empuja_al_coordinator() {
    let fake = FakeCoordinator::default();
    let url = spawn_fake_coordinator(fake.clone()).await;
    let app = build_router(WorkerState::new(config(&url)));

    let req = Request::builder().uri("/heartbeat").body(Body::empty()).unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);

    let hbs = fake.heartbeats.lock().unwrap();
    assert_eq!(hbs.len(), 1);
    assert_eq!(hbs[0].worker_id, "w-test");
    assert!(hbs[0].cpu_percent.is_some());
}

#[tokio::test]
async fn registro_anuncia_id_y_url() {
    let fake = FakeCoordinator::default();
    let url = spawn_fake_coordinator(fake.clone()).await;
    let state = WorkerState::new(config(&url));

    heartbeat::register_with_coordinator(&state).await.unwrap();

    let regs = fake.registered.lock().unwrap();
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].worker_id, "w-test");
    assert_eq!(regs[0].worker_url, "http://127.0.0.1:9");
}

#[tokio::test]
async fn registro_falla_si_el_coordinator_no_esta() {
    let state = WorkerState::new(config(&unreachable_url()));
    assert!(heartbeat::register_with_coordinator(&state).await.is_err());
    assert!(!heartbeat::report_health(&state).await);
}

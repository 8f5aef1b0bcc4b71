//! In-process fake store backend for integration tests.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use faceboard::store::{Store, StoreStatus, StoresConfig};

/// A session name that only resolves if the client percent-encodes it
pub const ODD_SESSION: &str = "lobby cam/2";

/// How the fake backend behaves
#[derive(Debug, Clone)]
pub struct Behavior {
    pub healthy: bool,
    pub total_sessions: usize,
    pub total_people: usize,
    /// Send `pagination.has_more` with list pages
    pub pagination: bool,
    /// Answer `/overall_analytics` with a 500
    pub fail_analytics: bool,
    /// Delay before answering `/overall_analytics`
    pub analytics_delay: Duration,
    /// Delay before answering `/health`
    pub health_delay: Duration,
    /// Answer `/daily/metrics` with a 404
    pub no_daily_metrics: bool,
    /// `rejection_reasons` as sent in `/overall_analytics`
    pub rejection_reasons: Value,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            healthy: true,
            total_sessions: 45,
            total_people: 8,
            pagination: false,
            fail_analytics: false,
            analytics_delay: Duration::ZERO,
            health_delay: Duration::ZERO,
            no_daily_metrics: false,
            rejection_reasons: json!({ "low_quality_face": 12, "blurry": 4 }),
        }
    }
}

/// Requests the backend has seen
#[derive(Debug, Default)]
pub struct Hits {
    pub health: AtomicUsize,
    pub session_pages: Mutex<Vec<(usize, usize)>>,
    pub lookups: AtomicUsize,
    /// Decoded path segment of every detail lookup
    pub lookup_terms: Mutex<Vec<String>>,
}

impl Hits {
    pub fn health(&self) -> usize {
        self.health.load(Ordering::SeqCst)
    }

    pub fn session_pages(&self) -> Vec<(usize, usize)> {
        self.session_pages.lock().unwrap().clone()
    }

    pub fn lookup_terms(&self) -> Vec<String> {
        self.lookup_terms.lock().unwrap().clone()
    }

    fn record_lookup(&self, term: &str) {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.lookup_terms.lock().unwrap().push(term.to_string());
    }
}

struct Shared {
    behavior: Behavior,
    hits: Arc<Hits>,
    base_url: String,
}

/// A running fake backend
pub struct Backend {
    pub url: String,
    pub hits: Arc<Hits>,
}

impl Backend {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(Hits::default());

        let shared = Arc::new(Shared {
            behavior,
            hits: Arc::clone(&hits),
            base_url: url.clone(),
        });

        let app = Router::new()
            .route("/config.json", get(config_json))
            .route("/health", get(health))
            .route("/sessions", get(sessions))
            .route("/sessions/:name", get(session_details))
            .route("/persons", get(persons))
            .route("/persons/:id", get(person_details))
            .route("/overall_analytics", get(overall_analytics))
            .route("/business_analytics", get(business_analytics))
            .route("/system/stats", get(system_stats))
            .route("/daily/metrics", get(daily_metrics))
            .route("/search", post(remote_search))
            .with_state(shared);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, hits }
    }

    pub async fn healthy() -> Self {
        Self::start(Behavior::default()).await
    }

    pub fn store(&self, id: &str, status: StoreStatus) -> Store {
        Store {
            id: id.to_string(),
            name: format!("Store {}", id),
            location: "Test".to_string(),
            description: String::new(),
            api_endpoint: self.url.clone(),
            status,
        }
    }

    pub fn stores_config(&self) -> StoresConfig {
        StoresConfig {
            stores: vec![
                self.store("closed", StoreStatus::Inactive),
                self.store("main", StoreStatus::Active),
            ],
            default_store: Some("main".to_string()),
        }
    }
}

type AppState = State<Arc<Shared>>;

async fn config_json(State(shared): AppState) -> Json<Value> {
    Json(json!({
        "stores": [
            { "id": "closed", "name": "Closed", "api_endpoint": shared.base_url, "status": "inactive" },
            { "id": "main", "name": "Main St", "location": "Downtown", "api_endpoint": shared.base_url, "status": "active" }
        ],
        "default_store": "closed"
    }))
}

async fn health(State(shared): AppState) -> Response {
    shared.hits.health.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(shared.behavior.health_delay).await;
    let body = Json(json!({ "database_status": "connected", "processing_status": "active" }));

    if shared.behavior.healthy {
        body.into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
    }
}

fn page_bounds(params: &HashMap<String, String>, total: usize) -> (usize, usize, usize) {
    let limit = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(20);
    let offset = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let end = (offset + limit).min(total);
    (limit, offset, end)
}

fn session_json(name: &str) -> Value {
    json!({
        "session_name": name,
        "session_info": { "timestamp": "2024-03-01T10:00:00", "processing_time": 2.5 },
        "combined_metrics": {
            "faces_detected": 10,
            "quality_passed": 7,
            "total_frames_processed": 100,
            "features_extracted": 7
        }
    })
}

fn person_json(i: usize) -> Value {
    json!({
        "person_id": format!("person-{}", i),
        "total_visits": 2,
        "total_faces": 5,
        "sessions": ["session-0", "session-1"],
        "first_seen": "2024-03-01T10:00:00",
        "last_seen": "2024-03-02T12:00:00",
        "gender": i % 3,
        "age": null
    })
}

async fn sessions(
    State(shared): AppState,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let (limit, offset, end) = page_bounds(&params, shared.behavior.total_sessions);
    shared.hits.session_pages.lock().unwrap().push((limit, offset));

    let sessions: Vec<Value> = (offset..end)
        .map(|i| session_json(&format!("session-{}", i)))
        .collect();
    let mut body = json!({ "sessions": sessions });
    if shared.behavior.pagination {
        body["pagination"] = json!({ "has_more": end < shared.behavior.total_sessions });
    }
    Json(body)
}

fn parse_index(id: &str, prefix: &str, total: usize) -> Option<usize> {
    id.strip_prefix(prefix)
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n < total)
}

async fn session_details(State(shared): AppState, Path(name): Path<String>) -> Response {
    shared.hits.record_lookup(&name);
    let found = name == ODD_SESSION
        || parse_index(&name, "session-", shared.behavior.total_sessions).is_some();
    if found {
        Json(json!({ "session": session_json(&name) })).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Session not found" }))).into_response()
    }
}

async fn persons(
    State(shared): AppState,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let (_, offset, end) = page_bounds(&params, shared.behavior.total_people);
    let persons: Vec<Value> = (offset..end).map(person_json).collect();
    Json(json!({ "persons": persons }))
}

async fn person_details(State(shared): AppState, Path(id): Path<String>) -> Response {
    shared.hits.record_lookup(&id);
    match parse_index(&id, "person-", shared.behavior.total_people) {
        Some(i) => Json(json!({ "person": person_json(i) })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Person not found" }))).into_response(),
    }
}

async fn overall_analytics(State(shared): AppState) -> Response {
    tokio::time::sleep(shared.behavior.analytics_delay).await;
    if shared.behavior.fail_analytics {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    Json(json!({
        "overall_analytics": {
            "total_faces": 450,
            "total_sessions": 45,
            "unique_person_ids": 8,
            "quality_pass_rate": 70,
            "detection_rate": 90,
            "rejection_reasons": shared.behavior.rejection_reasons
        }
    }))
    .into_response()
}

async fn business_analytics() -> Json<Value> {
    Json(json!({
        "business_analytics": {
            "daily_records": [
                { "date": "2024-03-01", "person_id": "person-0", "age": 0, "gender": 0, "daily_visit_count": 2, "is_repeat_customer": true, "session_names": ["session-0"] },
                { "date": "2024-03-01", "person_id": "person-1", "age": 34, "gender": 1, "daily_visit_count": 1, "is_repeat_customer": false },
                { "date": "2024-03-01", "person_id": "person-1", "age": 34, "gender": 1, "daily_visit_count": 1, "is_repeat_customer": false },
                { "date": "2024-03-02", "person_id": "person-2", "age": null, "gender": -1, "daily_visit_count": 3, "is_repeat_customer": null }
            ]
        }
    }))
}

async fn system_stats() -> Json<Value> {
    Json(json!({
        "system_stats": { "total_faces": 120, "total_sessions": "12", "unique_person_ids": null }
    }))
}

async fn daily_metrics(State(shared): AppState) -> Response {
    if shared.behavior.no_daily_metrics {
        return StatusCode::NOT_FOUND.into_response();
    }

    Json(json!({
        "daily_metrics": {
            "daily_face_counts": [10, 20, 30],
            "daily_session_counts": [1, 2],
            "daily_quality_pass_counts": null
        }
    }))
    .into_response()
}

async fn remote_search(Json(request): Json<Value>) -> Json<Value> {
    Json(json!({
        "results": [{ "query": request["query"], "type": request["type"] }]
    }))
}

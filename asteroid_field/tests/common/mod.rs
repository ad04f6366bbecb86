#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use asteroid_field::data::{CachePolicy, FeedConfig};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use url::Url;

/// Two days, three objects, later day listed first.
pub const FEED: &str = r#"{
    "links": { "self": "ignored" },
    "element_count": 3,
    "near_earth_objects": {
        "2024-01-02": [
            {
                "id": "3542519",
                "name": "(2010 PK9)",
                "is_potentially_hazardous_asteroid": true,
                "estimated_diameter": {
                    "meters": { "estimated_diameter_min": 118.0, "estimated_diameter_max": 264.0 }
                },
                "close_approach_data": [{
                    "close_approach_date": "2024-01-02",
                    "close_approach_date_full": "2024-Jan-02 14:20",
                    "relative_velocity": { "kilometers_per_second": "19.5" },
                    "miss_distance": { "kilometers": "7301248.1" },
                    "orbiting_body": "Earth"
                }]
            }
        ],
        "2024-01-01": [
            {
                "id": "2000433",
                "name": "433 Eros (A898 PA)",
                "is_potentially_hazardous_asteroid": false,
                "estimated_diameter": {
                    "meters": { "estimated_diameter_min": 20000.0, "estimated_diameter_max": 40000.0 }
                },
                "close_approach_data": [{
                    "close_approach_date": "2024-01-01",
                    "relative_velocity": { "kilometers_per_second": "not-a-number" },
                    "miss_distance": { "kilometers": "-5" },
                    "orbiting_body": "Earth"
                }]
            },
            { "id": "54016487", "name": "(2020 XY)" }
        ]
    }
}"#;

/// Mock upstream feed. Replies with `status` and `body`, recording every
/// query string it sees.
#[derive(Clone)]
pub struct Upstream {
    pub status: StatusCode,
    pub body: &'static str,
    pub hits: Arc<AtomicUsize>,
    pub queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Upstream {
    pub fn ok() -> Self {
        Self::with(StatusCode::OK, FEED)
    }

    pub fn with(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            hits: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> HashMap<String, String> {
        self.queries.lock().unwrap().last().cloned().unwrap_or_default()
    }

    /// Serve on an ephemeral port and return the feed URL.
    pub async fn spawn(&self) -> Url {
        let app = Router::new()
            .route("/neo/rest/v1/feed", get(feed))
            .with_state(self.clone());
        let addr = serve(app).await;
        format!("http://{addr}/neo/rest/v1/feed").parse().unwrap()
    }
}

async fn feed(
    State(upstream): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    upstream.queries.lock().unwrap().push(params);
    (
        upstream.status,
        [("content-type", "application/json")],
        upstream.body,
    )
        .into_response()
}

pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn feed_config(feed_url: Url, cache: CachePolicy) -> FeedConfig {
    FeedConfig {
        api_key: "TEST_KEY".into(),
        feed_url,
        cache,
    }
}

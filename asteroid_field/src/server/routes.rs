//! `GET /api/neo` and `GET /health`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::data::{DateRange, ErrorResponse, FeedResponse, FetchError};
use crate::server::ProxyState;

#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Every failure, upstream or local, is reported as 500 with a message body.
pub struct ApiError(pub FetchError);

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub async fn neo_feed(
    State(state): State<ProxyState>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedResponse>, ApiError> {
    let range = DateRange::resolve(
        params.start.as_deref(),
        params.end.as_deref(),
        Utc::now().date_naive(),
    )
    .inspect_err(|err| tracing::warn!(%err, "rejected feed query"))?;

    let items = match state.cache.get(&range) {
        Some(items) => {
            tracing::debug!(start = %range.start, end = %range.end, "feed cache hit");
            items
        }
        None => {
            let records = state
                .client
                .fetch_raw(range)
                .await
                .inspect_err(|err| tracing::error!(%err, "upstream feed failed"))?;
            let items = Arc::new(crate::data::normalize_all(&records));
            state.cache.insert(range, items.clone());
            items
        }
    };

    Ok(Json(FeedResponse {
        start: range.start.to_string(),
        end: range.end.to_string(),
        count: items.len(),
        items: items.as_ref().clone(),
    }))
}

pub async fn health() -> &'static str {
    "ok"
}

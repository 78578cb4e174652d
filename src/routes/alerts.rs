//! Alert listing route.
//!
//! `GET /trips/{id}/alerts` returns the alerts raised for any of the trip's
//! participants, newest first, capped by the `limit` query parameter.

use axum::{
    extract::Path, extract::Query, extract::State, http::StatusCode, response::IntoResponse,
    routing::get, Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::{store, Config};

// ---

const DEFAULT_ALERT_LIMIT: i64 = 100;

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/trips/{trip_id}/alerts", get(list_alerts))
}

#[derive(Debug, Deserialize)]
struct AlertsQuery {
    limit: Option<i64>,
}

async fn list_alerts(
    Path(trip_id): Path<Uuid>,
    Query(params): Query<AlertsQuery>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    let limit = params.limit.unwrap_or(DEFAULT_ALERT_LIMIT).clamp(1, 1000);

    match store::fetch_trip(&pool, trip_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return (StatusCode::NOT_FOUND, Json("Trip not found")).into_response(),
        Err(e) => {
            error!("Failed to fetch trip {}: {}", trip_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to fetch trip"),
            )
                .into_response();
        }
    }

    match store::fetch_trip_alerts(&pool, trip_id, limit).await {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(e) => {
            error!("Failed to list alerts for trip {}: {}", trip_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to list alerts"),
            )
                .into_response()
        }
    }
}

//! Latest-status route.
//!
//! `GET /trips/{id}/status` returns, per participant, the most recent
//! health and location reading — each independently by `measured_at`
//! descending, either absent when no readings exist yet. Rows follow
//! participant enumeration order.

use axum::{
    extract::Path, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::{store, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/trips/{trip_id}/status", get(trip_status))
}

async fn trip_status(
    Path(trip_id): Path<Uuid>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
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

    let participants = match store::fetch_participants(&pool, trip_id).await {
        Ok(participants) => participants,
        Err(e) => {
            error!("Failed to list participants for trip {}: {}", trip_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to list participants"),
            )
                .into_response();
        }
    };

    match store::latest_status(&pool, participants).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => {
            error!("Failed to compute status for trip {}: {}", trip_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to compute trip status"),
            )
                .into_response()
        }
    }
}

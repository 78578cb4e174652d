//! Demo-data generation route.
//!
//! `POST /trips/{id}/demo-data` plans a synthetic timeline for all of the
//! trip's participants and persists it. The request is capped by
//! `DEMO_MAX_POINTS` so a careless duration/interval pair cannot flood the
//! database; the cap is a route concern, the planner itself is unbounded.

use axum::{
    extract::Path, extract::State, http::StatusCode, response::IntoResponse, routing::post, Json,
    Router,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::monitor::{plan_timeline, total_points};
use crate::{store, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/trips/{trip_id}/demo-data", post(generate_demo_data))
}

#[derive(Debug, Deserialize)]
struct DemoRequest {
    duration_minutes: u32,
    interval_seconds: u32,
}

#[derive(Debug, Serialize)]
struct DemoResponse {
    total_points: u64,
    created_readings: u64,
}

async fn generate_demo_data(
    Path(trip_id): Path<Uuid>,
    State((pool, config)): State<(PgPool, Config)>,
    Json(req): Json<DemoRequest>,
) -> impl IntoResponse {
    // ---
    if req.interval_seconds == 0 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json("interval_seconds must be positive"),
        )
            .into_response();
    }

    let points = total_points(req.duration_minutes, req.interval_seconds);
    if points > u64::from(config.demo_max_points) {
        error!(
            "Demo request for trip {} would generate {} points (cap {})",
            trip_id, points, config.demo_max_points
        );
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json("Requested window exceeds the demo generation cap"),
        )
            .into_response();
    }

    let trip = match store::fetch_trip(&pool, trip_id).await {
        Ok(Some(trip)) => trip,
        Ok(None) => return (StatusCode::NOT_FOUND, Json("Trip not found")).into_response(),
        Err(e) => {
            error!("Failed to fetch trip {}: {}", trip_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to fetch trip"),
            )
                .into_response();
        }
    };

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

    let participant_ids: Vec<Uuid> = participants.iter().map(|p| p.id).collect();

    let mut rng = StdRng::from_entropy();
    let samples = plan_timeline(
        &participant_ids,
        &trip.thresholds,
        req.duration_minutes,
        req.interval_seconds,
        Utc::now(),
        &mut rng,
    );

    match store::store_samples(&pool, &samples).await {
        Ok(created_readings) => {
            info!(
                "Generated {} demo readings over {} points for trip {}",
                created_readings, points, trip_id
            );
            let body = DemoResponse {
                total_points: points,
                created_readings,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => {
            error!("Failed to store demo readings for trip {}: {}", trip_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to store demo readings"),
            )
                .into_response()
        }
    }
}

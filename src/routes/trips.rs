//! Trip and participant management routes.
//!
//! Thin handlers over the `store` module: create a trip with its monitoring
//! configuration, fetch it back, and add/enumerate participants. Thresholds
//! are all optional; leaving one unset simply disables that check, and a
//! partially configured geofence disables geofencing (the evaluator only
//! sees a fence when center and radius are all present).

use axum::{
    extract::Path, extract::State, http::StatusCode, response::IntoResponse, routing::get,
    routing::post, Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{store, Config, TripThresholds};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/trips", post(create_trip))
        .route("/trips/{trip_id}", get(get_trip))
        .route(
            "/trips/{trip_id}/participants",
            post(add_participant).get(list_participants),
        )
}

#[derive(Debug, Deserialize)]
struct CreateTripRequest {
    name: String,
    #[serde(flatten)]
    thresholds: TripThresholds,
}

async fn create_trip(
    State((pool, _config)): State<(PgPool, Config)>,
    Json(req): Json<CreateTripRequest>,
) -> impl IntoResponse {
    // ---
    if req.name.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json("Trip name must not be empty"),
        )
            .into_response();
    }

    let geofence_fields = [
        req.thresholds.geofence_lat.is_some(),
        req.thresholds.geofence_lng.is_some(),
        req.thresholds.geofence_radius_km.is_some(),
    ];
    if geofence_fields.iter().any(|set| *set) && !geofence_fields.iter().all(|set| *set) {
        // Stored as-is, but geofencing will not apply until complete.
        warn!("Trip '{}' has a partial geofence configuration", req.name);
    }

    match store::insert_trip(&pool, req.name.trim(), &req.thresholds).await {
        Ok(trip) => {
            info!("Created trip {} ('{}')", trip.id, trip.name);
            (StatusCode::CREATED, Json(trip)).into_response()
        }
        Err(e) => {
            error!("Failed to create trip: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to create trip"),
            )
                .into_response()
        }
    }
}

async fn get_trip(
    Path(trip_id): Path<Uuid>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    match store::fetch_trip(&pool, trip_id).await {
        Ok(Some(trip)) => (StatusCode::OK, Json(trip)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json("Trip not found")).into_response(),
        Err(e) => {
            error!("Failed to fetch trip {}: {}", trip_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to fetch trip"),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddParticipantRequest {
    traveler_name: String,
}

async fn add_participant(
    Path(trip_id): Path<Uuid>,
    State((pool, _config)): State<(PgPool, Config)>,
    Json(req): Json<AddParticipantRequest>,
) -> impl IntoResponse {
    // ---
    if req.traveler_name.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json("Traveler name must not be empty"),
        )
            .into_response();
    }

    // The FK would reject an unknown trip anyway; checking first gives a 404
    // instead of a 500.
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

    match store::insert_participant(&pool, trip_id, req.traveler_name.trim()).await {
        Ok(participant) => {
            info!(
                "Added participant {} to trip {}",
                participant.id, trip_id
            );
            (StatusCode::CREATED, Json(participant)).into_response()
        }
        Err(e) => {
            error!("Failed to add participant to trip {}: {}", trip_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to add participant"),
            )
                .into_response()
        }
    }
}

async fn list_participants(
    Path(trip_id): Path<Uuid>,
    State((pool, _config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    match store::fetch_participants(&pool, trip_id).await {
        Ok(participants) => (StatusCode::OK, Json(participants)).into_response(),
        Err(e) => {
            error!("Failed to list participants for trip {}: {}", trip_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to list participants"),
            )
                .into_response()
        }
    }
}

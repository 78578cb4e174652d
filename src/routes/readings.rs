//! Reading ingestion routes.
//!
//! `POST /participants/{id}/health` and `POST /participants/{id}/location`
//! run the ingest pipeline for one reading: validate the raw input, look up
//! the participant's trip thresholds, classify through the monitor, then
//! persist the reading (and its alert, if any) in one transaction.
//!
//! Range validation lives here, not in `monitor` — the evaluator classifies
//! whatever it is handed.

use axum::{
    extract::Path, extract::State, http::StatusCode, response::IntoResponse, routing::post, Json,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::{quantize2, quantize6, HealthReading, LocationReading, Trip};
use crate::monitor::{evaluate_health, evaluate_location};
use crate::{store, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/participants/{participant_id}/health", post(ingest_health))
        .route(
            "/participants/{participant_id}/location",
            post(ingest_location),
        )
}

#[derive(Debug, Deserialize)]
struct HealthReadingRequest {
    heart_rate: i32,
    spo2: Decimal,
    /// Defaults to the server's current time when omitted.
    measured_at: Option<DateTime<Utc>>,
}

/// Stored reading plus the alert text raised by it, if any.
#[derive(Debug, Serialize)]
struct HealthIngestResponse {
    reading: HealthReading,
    alert_message: Option<String>,
}

async fn ingest_health(
    Path(participant_id): Path<Uuid>,
    State((pool, _config)): State<(PgPool, Config)>,
    Json(req): Json<HealthReadingRequest>,
) -> impl IntoResponse {
    // ---
    debug!("POST /participants/{}/health: {:?}", participant_id, req);

    if req.heart_rate < 0 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json("heart_rate must be non-negative"),
        )
            .into_response();
    }

    let trip = match participant_trip(&pool, participant_id).await {
        Ok(trip) => trip,
        Err(response) => return response,
    };

    let measured_at = req.measured_at.unwrap_or_else(Utc::now);
    let spo2 = quantize2(req.spo2);
    let evaluation = evaluate_health(&trip.thresholds, req.heart_rate, spo2);

    match store::record_health_reading(
        &pool,
        participant_id,
        measured_at,
        req.heart_rate,
        spo2,
        &evaluation,
    )
    .await
    {
        Ok(reading) => {
            if let Some(message) = &evaluation.message {
                info!("Health alert for participant {}: {}", participant_id, message);
            }
            let body = HealthIngestResponse {
                reading,
                alert_message: evaluation.message,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => {
            error!(
                "Failed to store health reading for participant {}: {}",
                participant_id, e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to store reading"),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocationReadingRequest {
    latitude: Decimal,
    longitude: Decimal,
    accuracy_m: Option<Decimal>,
    measured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct LocationIngestResponse {
    reading: LocationReading,
    alert_message: Option<String>,
}

async fn ingest_location(
    Path(participant_id): Path<Uuid>,
    State((pool, _config)): State<(PgPool, Config)>,
    Json(req): Json<LocationReadingRequest>,
) -> impl IntoResponse {
    // ---
    debug!("POST /participants/{}/location: {:?}", participant_id, req);

    if req.latitude.abs() > Decimal::from(90) || req.longitude.abs() > Decimal::from(180) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json("latitude/longitude out of range"),
        )
            .into_response();
    }

    let trip = match participant_trip(&pool, participant_id).await {
        Ok(trip) => trip,
        Err(response) => return response,
    };

    let measured_at = req.measured_at.unwrap_or_else(Utc::now);
    let latitude = quantize6(req.latitude);
    let longitude = quantize6(req.longitude);
    let accuracy_m = req.accuracy_m.map(quantize2);

    let alert_message =
        evaluate_location(trip.thresholds.geofence().as_ref(), latitude, longitude);

    match store::record_location_reading(
        &pool,
        participant_id,
        measured_at,
        latitude,
        longitude,
        accuracy_m,
        alert_message.as_deref(),
    )
    .await
    {
        Ok(reading) => {
            if let Some(message) = &alert_message {
                info!(
                    "Geofence alert for participant {}: {}",
                    participant_id, message
                );
            }
            let body = LocationIngestResponse {
                reading,
                alert_message,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => {
            error!(
                "Failed to store location reading for participant {}: {}",
                participant_id, e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to store reading"),
            )
                .into_response()
        }
    }
}

// ---

/// Resolve a participant to its trip, mapping lookup failures to responses.
async fn participant_trip(
    pool: &PgPool,
    participant_id: Uuid,
) -> Result<Trip, axum::response::Response> {
    // ---
    match store::fetch_trip_for_participant(pool, participant_id).await {
        Ok(Some(trip)) => Ok(trip),
        Ok(None) => Err((StatusCode::NOT_FOUND, Json("Participant not found")).into_response()),
        Err(e) => {
            error!(
                "Failed to resolve trip for participant {}: {}",
                participant_id, e
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json("Failed to resolve participant"),
            )
                .into_response())
        }
    }
}

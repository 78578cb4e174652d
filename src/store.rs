//! Persistence sink for trips, participants, readings and alerts.
//!
//! All functions take the pool and return `sqlx::Error` unchanged; nothing
//! here retries or suppresses database failures. A reading and the alert it
//! triggered are written inside one transaction, so a crash between the two
//! can never leave an alert without its reading or vice versa. No atomicity
//! is promised across readings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Alert, AlertType, HealthReading, LocationReading, Participant, ParticipantStatus, Trip,
    TripThresholds,
};
use crate::monitor::{HealthEvaluation, SyntheticSample};

// ---

const TRIP_COLUMNS: &str = "id, name, heart_rate_min, heart_rate_max, spo2_min, \
     geofence_lat, geofence_lng, geofence_radius_km, created_at";

/// Insert a new trip with its monitoring configuration.
pub async fn insert_trip(
    pool: &PgPool,
    name: &str,
    thresholds: &TripThresholds,
) -> Result<Trip, sqlx::Error> {
    // ---
    let sql = format!(
        r#"
        INSERT INTO trips (
            id, name, heart_rate_min, heart_rate_max, spo2_min,
            geofence_lat, geofence_lng, geofence_radius_km
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {TRIP_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Trip>(&sql)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(thresholds.heart_rate_min)
        .bind(thresholds.heart_rate_max)
        .bind(thresholds.spo2_min)
        .bind(thresholds.geofence_lat)
        .bind(thresholds.geofence_lng)
        .bind(thresholds.geofence_radius_km)
        .fetch_one(pool)
        .await
}

/// Fetch one trip by id.
pub async fn fetch_trip(pool: &PgPool, trip_id: Uuid) -> Result<Option<Trip>, sqlx::Error> {
    // ---
    let sql = format!("SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1");
    sqlx::query_as::<_, Trip>(&sql)
        .bind(trip_id)
        .fetch_optional(pool)
        .await
}

/// Fetch the trip a participant belongs to, carrying its thresholds.
pub async fn fetch_trip_for_participant(
    pool: &PgPool,
    participant_id: Uuid,
) -> Result<Option<Trip>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, Trip>(
        r#"
        SELECT t.id, t.name, t.heart_rate_min, t.heart_rate_max, t.spo2_min,
               t.geofence_lat, t.geofence_lng, t.geofence_radius_km, t.created_at
        FROM trips t
        JOIN participants p ON p.trip_id = t.id
        WHERE p.id = $1
        "#,
    )
        .bind(participant_id)
        .fetch_optional(pool)
        .await
}

/// Insert a participant into a trip.
pub async fn insert_participant(
    pool: &PgPool,
    trip_id: Uuid,
    traveler_name: &str,
) -> Result<Participant, sqlx::Error> {
    // ---
    sqlx::query_as::<_, Participant>(
        r#"
        INSERT INTO participants (id, trip_id, traveler_name)
        VALUES ($1, $2, $3)
        RETURNING id, trip_id, traveler_name, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(trip_id)
    .bind(traveler_name)
    .fetch_one(pool)
    .await
}

/// Enumerate a trip's participants in creation order.
pub async fn fetch_participants(
    pool: &PgPool,
    trip_id: Uuid,
) -> Result<Vec<Participant>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, Participant>(
        r#"
        SELECT id, trip_id, traveler_name, created_at
        FROM participants
        WHERE trip_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(trip_id)
    .fetch_all(pool)
    .await
}

// ---

/// Persist a classified health reading, and its alert if one was raised,
/// in a single transaction.
pub async fn record_health_reading(
    pool: &PgPool,
    participant_id: Uuid,
    measured_at: DateTime<Utc>,
    heart_rate: i32,
    spo2: Decimal,
    evaluation: &HealthEvaluation,
) -> Result<HealthReading, sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;

    let reading = sqlx::query_as::<_, HealthReading>(
        r#"
        INSERT INTO health_readings (participant_id, measured_at, heart_rate, spo2, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, participant_id, measured_at, heart_rate, spo2, status
        "#,
    )
    .bind(participant_id)
    .bind(measured_at)
    .bind(heart_rate)
    .bind(spo2)
    .bind(evaluation.status.as_str())
    .fetch_one(&mut *tx)
    .await?;

    if let Some(message) = &evaluation.message {
        insert_alert(&mut tx, participant_id, AlertType::Health, message, measured_at).await?;
    }

    tx.commit().await?;
    Ok(reading)
}

/// Persist a location reading, and its geofence-breach alert if one was
/// raised, in a single transaction. The reading is stored regardless of
/// the breach verdict.
pub async fn record_location_reading(
    pool: &PgPool,
    participant_id: Uuid,
    measured_at: DateTime<Utc>,
    latitude: Decimal,
    longitude: Decimal,
    accuracy_m: Option<Decimal>,
    alert_message: Option<&str>,
) -> Result<LocationReading, sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;

    let reading = sqlx::query_as::<_, LocationReading>(
        r#"
        INSERT INTO location_readings (participant_id, measured_at, latitude, longitude, accuracy_m)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, participant_id, measured_at, latitude, longitude, accuracy_m
        "#,
    )
    .bind(participant_id)
    .bind(measured_at)
    .bind(latitude)
    .bind(longitude)
    .bind(accuracy_m)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(message) = alert_message {
        insert_alert(&mut tx, participant_id, AlertType::Location, message, measured_at).await?;
    }

    tx.commit().await?;
    Ok(reading)
}

async fn insert_alert(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    participant_id: Uuid,
    alert_type: AlertType,
    message: &str,
    snapshot_time: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO alerts (participant_id, alert_type, message, snapshot_time)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(participant_id)
    .bind(alert_type.as_str())
    .bind(message)
    .bind(snapshot_time)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Persist a planned demo timeline, one health and one location reading
/// per sample, each with its alert in the sample's own transaction.
/// Returns the number of readings created.
pub async fn store_samples(pool: &PgPool, samples: &[SyntheticSample]) -> Result<u64, sqlx::Error> {
    // ---
    let mut created: u64 = 0;

    for sample in samples {
        record_health_reading(
            pool,
            sample.participant_id,
            sample.measured_at,
            sample.heart_rate,
            sample.spo2,
            &sample.health,
        )
        .await?;
        created += 1;

        record_location_reading(
            pool,
            sample.participant_id,
            sample.measured_at,
            sample.latitude,
            sample.longitude,
            Some(sample.accuracy_m),
            sample.location_alert.as_deref(),
        )
        .await?;
        created += 1;
    }

    Ok(created)
}

// ---

/// Latest health and location reading per participant, each independently
/// by `measured_at` descending. Output order follows the input order.
pub async fn latest_status(
    pool: &PgPool,
    participants: Vec<Participant>,
) -> Result<Vec<ParticipantStatus>, sqlx::Error> {
    // ---
    let mut rows = Vec::with_capacity(participants.len());

    for participant in participants {
        let latest_health = sqlx::query_as::<_, HealthReading>(
            r#"
            SELECT id, participant_id, measured_at, heart_rate, spo2, status
            FROM health_readings
            WHERE participant_id = $1
            ORDER BY measured_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(participant.id)
        .fetch_optional(pool)
        .await?;

        let latest_location = sqlx::query_as::<_, LocationReading>(
            r#"
            SELECT id, participant_id, measured_at, latitude, longitude, accuracy_m
            FROM location_readings
            WHERE participant_id = $1
            ORDER BY measured_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(participant.id)
        .fetch_optional(pool)
        .await?;

        rows.push(ParticipantStatus {
            participant,
            latest_health,
            latest_location,
        });
    }

    Ok(rows)
}

/// Alerts for all of a trip's participants, newest first.
pub async fn fetch_trip_alerts(
    pool: &PgPool,
    trip_id: Uuid,
    limit: i64,
) -> Result<Vec<Alert>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, Alert>(
        r#"
        SELECT a.id, a.participant_id, a.alert_type, a.message, a.snapshot_time, a.created_at
        FROM alerts a
        JOIN participants p ON p.id = a.participant_id
        WHERE p.trip_id = $1
        ORDER BY a.created_at DESC, a.id DESC
        LIMIT $2
        "#,
    )
    .bind(trip_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

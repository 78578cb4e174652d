//! Database schema management for `tripwatch`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the trip/participant tables plus the append-only reading and
/// alert tables. Safe to call on every startup; no-op if objects already
/// exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trips (
            id                 UUID PRIMARY KEY,
            name               TEXT        NOT NULL,
            heart_rate_min     INTEGER,
            heart_rate_max     INTEGER,
            spo2_min           NUMERIC(5,2),
            geofence_lat       NUMERIC(9,6),
            geofence_lng       NUMERIC(9,6),
            geofence_radius_km NUMERIC(6,2),
            created_at         TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS participants (
            id            UUID PRIMARY KEY,
            trip_id       UUID        NOT NULL REFERENCES trips (id),
            traveler_name TEXT        NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Append-only reading tables served by the status endpoint
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS health_readings (
            id             BIGSERIAL PRIMARY KEY,
            participant_id UUID         NOT NULL REFERENCES participants (id),
            measured_at    TIMESTAMPTZ  NOT NULL,
            heart_rate     INTEGER      NOT NULL,
            spo2           NUMERIC(5,2) NOT NULL,
            status         TEXT         NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS location_readings (
            id             BIGSERIAL PRIMARY KEY,
            participant_id UUID         NOT NULL REFERENCES participants (id),
            measured_at    TIMESTAMPTZ  NOT NULL,
            latitude       NUMERIC(9,6) NOT NULL,
            longitude      NUMERIC(9,6) NOT NULL,
            accuracy_m     NUMERIC(7,2)
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            id             BIGSERIAL PRIMARY KEY,
            participant_id UUID        NOT NULL REFERENCES participants (id),
            alert_type     TEXT        NOT NULL,
            message        TEXT        NOT NULL,
            snapshot_time  TIMESTAMPTZ NOT NULL,
            created_at     TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Indexes for "latest by timestamp" and newest-first alert listings
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_participants_trip_id
            ON participants (trip_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_health_readings_participant_measured
            ON health_readings (participant_id, measured_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_location_readings_participant_measured
            ON location_readings (participant_id, measured_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_alerts_participant_created
            ON alerts (participant_id, created_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

//! Database-backed tests for the persistence sink.
//!
//! These need a reachable PostgreSQL instance; they skip (with a note)
//! when `DATABASE_URL` is not set, the same variable the service itself
//! is configured with. Each test creates its own trip and participants,
//! so runs do not interfere with each other.

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use tripwatch::monitor::{evaluate_health, evaluate_location, plan_timeline};
use tripwatch::{schema, store, TripThresholds};

// ---

async fn connect() -> Option<sqlx::PgPool> {
    // ---
    let Ok(db_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db_url)
        .await
        .expect("failed to connect to DATABASE_URL");
    schema::create_schema(&pool).await.expect("schema setup failed");
    Some(pool)
}

fn demo_thresholds() -> TripThresholds {
    // ---
    TripThresholds {
        heart_rate_min: Some(50),
        heart_rate_max: Some(120),
        spo2_min: Some(Decimal::new(9_000, 2)),
        geofence_lat: Some(Decimal::new(37_566_500, 6)),
        geofence_lng: Some(Decimal::new(126_978_000, 6)),
        geofence_radius_km: Some(Decimal::new(150, 2)),
    }
}

#[tokio::test]
async fn latest_status_returns_each_participants_own_newest_reading() {
    // ---
    let Some(pool) = connect().await else { return };

    let thresholds = demo_thresholds();
    let trip = store::insert_trip(&pool, "Status isolation trip", &thresholds)
        .await
        .unwrap();
    let alice = store::insert_participant(&pool, trip.id, "Alice")
        .await
        .unwrap();
    let bora = store::insert_participant(&pool, trip.id, "Bora")
        .await
        .unwrap();

    // Interleaved timestamps: the globally newest reading belongs to Bora,
    // so Alice's row must surface her own newest, not the trip-wide one.
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
    let writes = [
        (alice.id, base, 61),
        (bora.id, base + Duration::seconds(30), 62),
        (alice.id, base + Duration::seconds(60), 63),
        (bora.id, base + Duration::seconds(90), 64),
    ];

    let spo2 = Decimal::new(9_700, 2);
    let lat = Decimal::new(37_566_500, 6);
    let lng = Decimal::new(126_978_000, 6);
    for (participant_id, measured_at, heart_rate) in writes {
        let eval = evaluate_health(&thresholds, heart_rate, spo2);
        store::record_health_reading(&pool, participant_id, measured_at, heart_rate, spo2, &eval)
            .await
            .unwrap();

        let alert = evaluate_location(thresholds.geofence().as_ref(), lat, lng);
        store::record_location_reading(
            &pool,
            participant_id,
            measured_at,
            lat,
            lng,
            None,
            alert.as_deref(),
        )
        .await
        .unwrap();
    }

    let rows = store::latest_status(&pool, vec![alice.clone(), bora.clone()])
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    for row in &rows {
        let health = row.latest_health.as_ref().expect("health reading present");
        assert_eq!(health.participant_id, row.participant.id);

        let location = row
            .latest_location
            .as_ref()
            .expect("location reading present");
        assert_eq!(location.participant_id, row.participant.id);
    }

    // Input order is preserved: Alice first.
    assert_eq!(rows[0].participant.id, alice.id);
    let alice_health = rows[0].latest_health.as_ref().unwrap();
    assert_eq!(alice_health.heart_rate, 63);
    assert_eq!(alice_health.measured_at, base + Duration::seconds(60));

    assert_eq!(rows[1].participant.id, bora.id);
    let bora_health = rows[1].latest_health.as_ref().unwrap();
    assert_eq!(bora_health.heart_rate, 64);
    assert_eq!(bora_health.measured_at, base + Duration::seconds(90));
}

#[tokio::test]
async fn demo_generation_creates_two_readings_per_participant_per_step() {
    // ---
    let Some(pool) = connect().await else { return };

    let thresholds = demo_thresholds();
    let trip = store::insert_trip(&pool, "Demo count trip", &thresholds)
        .await
        .unwrap();

    let mut participant_ids = Vec::new();
    for name in ["Chul-su", "Dana"] {
        let participant = store::insert_participant(&pool, trip.id, name)
            .await
            .unwrap();
        participant_ids.push(participant.id);
    }

    // 3 minutes at 60s: 3 steps for 2 participants.
    let mut rng = StdRng::seed_from_u64(5);
    let samples = plan_timeline(&participant_ids, &thresholds, 3, 60, Utc::now(), &mut rng);
    assert_eq!(samples.len(), 2 * 3);

    let created = store::store_samples(&pool, &samples).await.unwrap();
    assert_eq!(created, 2 * 2 * 3, "one health + one location per sample");
}

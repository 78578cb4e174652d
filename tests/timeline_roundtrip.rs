//! Cross-module tests for the monitoring core: generated demo samples must
//! re-evaluate to exactly the verdicts recorded at generation time, across
//! many seeds, and seeded runs must be reproducible.

use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use uuid::Uuid;

use tripwatch::monitor::{evaluate_health, evaluate_location, plan_timeline};
use tripwatch::TripThresholds;

// ---

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

#[test]
fn generated_samples_reevaluate_identically() {
    // ---
    let thresholds = demo_thresholds();
    let participants: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = plan_timeline(&participants, &thresholds, 30, 60, now, &mut rng);
        assert_eq!(samples.len(), 3 * 30);

        for sample in &samples {
            let health = evaluate_health(&thresholds, sample.heart_rate, sample.spo2);
            assert_eq!(
                health, sample.health,
                "health verdict drifted for seed {seed}"
            );

            let location = evaluate_location(
                thresholds.geofence().as_ref(),
                sample.latitude,
                sample.longitude,
            );
            assert_eq!(
                location, sample.location_alert,
                "location verdict drifted for seed {seed}"
            );
        }
    }
}

#[test]
fn identical_seeds_produce_identical_timelines() {
    // ---
    let thresholds = demo_thresholds();
    let participants: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    let mut a = StdRng::seed_from_u64(7);
    let mut b = StdRng::seed_from_u64(7);
    let first = plan_timeline(&participants, &thresholds, 10, 30, now, &mut a);
    let second = plan_timeline(&participants, &thresholds, 10, 30, now, &mut b);
    assert_eq!(first, second);
}

#[test]
fn samples_belong_only_to_the_given_participants() {
    // ---
    let thresholds = demo_thresholds();
    let participants: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    let samples = plan_timeline(&participants, &thresholds, 5, 60, now, &mut rng);

    for participant in &participants {
        let count = samples
            .iter()
            .filter(|s| s.participant_id == *participant)
            .count();
        assert_eq!(count, 5, "every participant gets one sample per step");
    }
    for sample in &samples {
        assert!(participants.contains(&sample.participant_id));
    }
}

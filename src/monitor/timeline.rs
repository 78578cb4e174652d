//! Synthetic demo timelines.
//!
//! Produces a fixed-cadence series of health and location samples per
//! participant, with a controlled fraction of values pushed outside the
//! trip's thresholds so the alerting paths get exercised by demo data.
//!
//! The planner is pure: the caller supplies "now" and the RNG, and gets
//! back fully evaluated samples for the store to persist. Seeding the RNG
//! reproduces a timeline exactly.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::evaluate::{as_f64, evaluate_health, evaluate_location, HealthEvaluation};
use crate::models::{quantize2, quantize6, TripThresholds};

// ---

/// Base coordinate when a trip has no geofence center: central Seoul.
/// A deliberate default for demo data, not a data-quality signal.
pub const FALLBACK_LAT: f64 = 37.5665;
pub const FALLBACK_LNG: f64 = 126.9780;

/// Injection probabilities for forced threshold violations.
const HIGH_HEART_RATE_PROB: f64 = 0.10;
const LOW_SPO2_PROB: f64 = 0.05;
const GEOFENCE_BREACH_PROB: f64 = 0.08;

/// One planned step for one participant: a health pair and a coordinate,
/// both already classified at the step's timestamp. Persisting a sample
/// creates two readings.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSample {
    // ---
    pub participant_id: Uuid,
    pub measured_at: DateTime<Utc>,
    pub heart_rate: i32,
    pub spo2: Decimal,
    pub health: HealthEvaluation,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub accuracy_m: Decimal,
    pub location_alert: Option<String>,
}

/// Number of time steps for a demo window.
///
/// Always at least 1, so even a zero-minute request yields one sample per
/// participant. A zero interval is clamped to one second rather than
/// rejected; the route layer is the one that refuses such requests.
/// Computed in u64 so the widest deserializable window stays in range.
pub fn total_points(duration_minutes: u32, interval_seconds: u32) -> u64 {
    // ---
    ((u64::from(duration_minutes) * 60) / u64::from(interval_seconds.max(1))).max(1)
}

/// Plan a demo timeline for a trip's participants.
///
/// Steps count backward from `now` in `interval_seconds` increments: the
/// oldest step sits `total_points * interval_seconds` before `now`, the
/// newest one interval before it. Per step and participant:
///
/// - heart rate ~ U[55,110] bpm, SpO2 ~ U[93.0,99.0]% rounded to 2 dp;
/// - 10% chance of forcing `heart_rate_max + U[5,15]` when a max is set;
/// - 5% chance of forcing `max(85, spo2_min - U[1,5])` when a min is set;
/// - coordinate = geofence center (or the Seoul fallback) plus U[-0.01,0.01]
///   degrees per axis, with an 8% chance of an extra U[0.05,0.10] offset on
///   both axes to force a breach; accuracy ~ U[5,50] m.
///
/// Returns an empty plan for a trip with no participants.
pub fn plan_timeline<R: Rng>(
    participant_ids: &[Uuid],
    thresholds: &TripThresholds,
    duration_minutes: u32,
    interval_seconds: u32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<SyntheticSample> {
    // ---
    if participant_ids.is_empty() {
        return Vec::new();
    }

    let points = total_points(duration_minutes, interval_seconds);
    let interval = i64::from(interval_seconds.max(1));
    let (base_lat, base_lng) = match thresholds.geofence() {
        Some(fence) => (as_f64(fence.center_lat), as_f64(fence.center_lng)),
        None => (FALLBACK_LAT, FALLBACK_LNG),
    };

    // Capacity is only a hint; capped so an uncapped window cannot force an
    // eager oversized allocation.
    let hint = usize::try_from(points)
        .unwrap_or(usize::MAX)
        .saturating_mul(participant_ids.len())
        .min(16_384);
    let mut samples = Vec::with_capacity(hint);
    for step in 0..points {
        let steps_back = (points - step) as i64;
        let measured_at = now - Duration::seconds(steps_back * interval);

        for &participant_id in participant_ids {
            samples.push(draw_sample(
                participant_id,
                thresholds,
                base_lat,
                base_lng,
                measured_at,
                rng,
            ));
        }
    }
    samples
}

// ---

fn draw_sample<R: Rng>(
    participant_id: Uuid,
    thresholds: &TripThresholds,
    base_lat: f64,
    base_lng: f64,
    measured_at: DateTime<Utc>,
    rng: &mut R,
) -> SyntheticSample {
    // ---
    let mut heart_rate: i32 = rng.gen_range(55..=110);
    let mut spo2_raw: f64 = rng.gen_range(93.0..=99.0);

    if rng.gen_bool(HIGH_HEART_RATE_PROB) {
        if let Some(max) = thresholds.heart_rate_max {
            heart_rate = max + rng.gen_range(5..=15);
        }
    }
    if rng.gen_bool(LOW_SPO2_PROB) {
        if let Some(min) = thresholds.spo2_min {
            spo2_raw = (as_f64(min) - rng.gen_range(1.0..=5.0)).max(85.0);
        }
    }

    let spo2 = quantize2(decimal_from_f64(spo2_raw));
    let health = evaluate_health(thresholds, heart_rate, spo2);

    let mut lat = base_lat + rng.gen_range(-0.01..=0.01);
    let mut lng = base_lng + rng.gen_range(-0.01..=0.01);
    if rng.gen_bool(GEOFENCE_BREACH_PROB) {
        // One offset applied to both axes, pushing well past any demo fence.
        let breakout = rng.gen_range(0.05..=0.10);
        lat += breakout;
        lng += breakout;
    }
    let accuracy_m = quantize2(decimal_from_f64(rng.gen_range(5.0..=50.0)));

    let latitude = quantize6(decimal_from_f64(lat));
    let longitude = quantize6(decimal_from_f64(lng));
    let location_alert = evaluate_location(thresholds.geofence().as_ref(), latitude, longitude);

    SyntheticSample {
        participant_id,
        measured_at,
        heart_rate,
        spo2,
        health,
        latitude,
        longitude,
        accuracy_m,
        location_alert,
    }
}

fn decimal_from_f64(value: f64) -> Decimal {
    // ---
    Decimal::from_f64_retain(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::HealthStatus;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn demo_thresholds() -> TripThresholds {
        // ---
        TripThresholds {
            heart_rate_min: Some(50),
            heart_rate_max: Some(120),
            spo2_min: Some(Decimal::new(9_000, 2)),
            geofence_lat: Some(Decimal::new(37_566_500, 6)),
            geofence_lng: Some(Decimal::new(126_978_000, 6)),
            geofence_radius_km: Some(Decimal::new(200, 2)),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        // ---
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn participant_ids(n: usize) -> Vec<Uuid> {
        // ---
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_total_points_floor_and_minimum() {
        // ---
        assert_eq!(total_points(1, 60), 1);
        assert_eq!(total_points(10, 60), 10);
        assert_eq!(total_points(1, 45), 1); // floor(60/45)
        assert_eq!(total_points(0, 60), 1); // never zero samples
        assert_eq!(total_points(5, 0), 300); // zero interval clamped to 1s
    }

    #[test]
    fn test_total_points_widest_window_stays_in_range() {
        // ---
        // The seconds product for any deserializable window must not wrap;
        // the route cap rejects these sizes, but the arithmetic itself has
        // to stay total.
        assert_eq!(total_points(100_000_000, 60), 100_000_000);
        assert_eq!(total_points(u32::MAX, 1), u64::from(u32::MAX) * 60);
        assert_eq!(total_points(u32::MAX, 0), u64::from(u32::MAX) * 60);
    }

    #[test]
    fn test_one_minute_window_yields_one_step_per_participant() {
        // ---
        let ids = participant_ids(3);
        let mut rng = StdRng::seed_from_u64(11);
        let samples = plan_timeline(&ids, &demo_thresholds(), 1, 60, fixed_now(), &mut rng);

        // One step, so N samples (2N readings once persisted).
        assert_eq!(samples.len(), 3);
        for sample in &samples {
            assert_eq!(sample.measured_at, fixed_now() - Duration::seconds(60));
        }
    }

    #[test]
    fn test_zero_minutes_still_produces_one_step() {
        // ---
        let ids = participant_ids(2);
        let mut rng = StdRng::seed_from_u64(11);
        let samples = plan_timeline(&ids, &demo_thresholds(), 0, 60, fixed_now(), &mut rng);
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_no_participants_produces_nothing() {
        // ---
        let mut rng = StdRng::seed_from_u64(11);
        let samples = plan_timeline(&[], &demo_thresholds(), 60, 30, fixed_now(), &mut rng);
        assert!(samples.is_empty());
    }

    #[test]
    fn test_timestamps_count_backward_from_now() {
        // ---
        let ids = participant_ids(1);
        let mut rng = StdRng::seed_from_u64(3);
        let samples = plan_timeline(&ids, &demo_thresholds(), 5, 60, fixed_now(), &mut rng);

        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].measured_at, fixed_now() - Duration::seconds(5 * 60));
        assert_eq!(samples[4].measured_at, fixed_now() - Duration::seconds(60));
        for pair in samples.windows(2) {
            assert!(pair[0].measured_at < pair[1].measured_at);
        }
    }

    #[test]
    fn test_same_seed_reproduces_timeline() {
        // ---
        let ids = participant_ids(2);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        let first = plan_timeline(&ids, &demo_thresholds(), 30, 60, fixed_now(), &mut a);
        let second = plan_timeline(&ids, &demo_thresholds(), 30, 60, fixed_now(), &mut b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_injection_exercises_both_alert_paths() {
        // ---
        // 600 steps: expect ~60 forced heart-rate spikes, ~30 low SpO2 and
        // ~48 geofence breaches; with a fixed seed all three must show up.
        let ids = participant_ids(1);
        let mut rng = StdRng::seed_from_u64(7);
        let samples = plan_timeline(&ids, &demo_thresholds(), 600, 60, fixed_now(), &mut rng);
        assert_eq!(samples.len(), 600);

        let danger = samples
            .iter()
            .filter(|s| s.health.status == HealthStatus::Danger)
            .count();
        let breaches = samples.iter().filter(|s| s.location_alert.is_some()).count();
        assert!(danger > 0, "expected forced health violations");
        assert!(breaches > 0, "expected forced geofence breaches");

        // Normal draws stay inside the configured band.
        for sample in samples.iter().filter(|s| s.health.status == HealthStatus::Normal) {
            assert!((55..=110).contains(&sample.heart_rate));
        }
    }

    #[test]
    fn test_unconstrained_trip_samples_are_all_normal() {
        // ---
        let ids = participant_ids(1);
        let mut rng = StdRng::seed_from_u64(9);
        let samples = plan_timeline(&ids, &TripThresholds::default(), 120, 60, fixed_now(), &mut rng);

        for sample in &samples {
            assert_eq!(sample.health.status, HealthStatus::Normal);
            assert!(sample.location_alert.is_none());

            // No geofence, so coordinates scatter around the Seoul fallback.
            let lat = as_f64(sample.latitude);
            let lng = as_f64(sample.longitude);
            assert!((lat - FALLBACK_LAT).abs() < 0.15);
            assert!((lng - FALLBACK_LNG).abs() < 0.15);
        }
    }
}

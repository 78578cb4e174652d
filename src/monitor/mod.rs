//! Monitoring core for trip participants.
//!
//! Gateway module (EMBP) for the only real domain logic in the service:
//! - `evaluate` – pure classification of health readings against trip
//!   thresholds and of coordinates against a circular geofence.
//! - `timeline` – synthetic demo timelines with controlled anomaly
//!   injection, used to populate realistic data and exercise alerting.
//!
//! Nothing in here performs I/O; persistence belongs to `store` and the
//! clock/randomness are supplied by callers so tests stay deterministic.

mod evaluate;
mod timeline;

pub use evaluate::{evaluate_health, evaluate_location, haversine_km, HealthEvaluation};
pub use timeline::{plan_timeline, total_points, SyntheticSample, FALLBACK_LAT, FALLBACK_LNG};

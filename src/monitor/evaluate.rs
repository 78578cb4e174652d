//! Threshold and geofence evaluation.
//!
//! Both entry points are pure classification functions: they never validate
//! raw input ranges (a negative heart rate is classified like any other
//! value) and never touch the database. Callers persist the verdicts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{Geofence, HealthStatus, TripThresholds};

// ---

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Outcome of classifying one health reading.
///
/// `message` is present iff `status` is [`HealthStatus::Danger`]; it is the
/// full alert text, with one sentence per violated threshold joined by a
/// single space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthEvaluation {
    pub status: HealthStatus,
    pub message: Option<String>,
}

/// Classify a heart-rate/SpO2 pair against the trip's thresholds.
///
/// Bounds are inclusive: a reading exactly at a configured limit is normal.
/// The min and max heart-rate checks are mutually exclusive per reading,
/// min taking priority, so at most one heart-rate sentence is produced.
/// The SpO2 check is independent and can fire on the same reading, in
/// which case the single alert message references both metrics.
pub fn evaluate_health(
    thresholds: &TripThresholds,
    heart_rate: i32,
    spo2: Decimal,
) -> HealthEvaluation {
    // ---
    let mut messages: Vec<String> = Vec::new();

    if let Some(min) = thresholds.heart_rate_min.filter(|min| heart_rate < *min) {
        messages.push(format!(
            "Heart rate {heart_rate} bpm is below the minimum of {min} bpm."
        ));
    } else if let Some(max) = thresholds.heart_rate_max.filter(|max| heart_rate > *max) {
        messages.push(format!(
            "Heart rate {heart_rate} bpm is above the maximum of {max} bpm."
        ));
    }

    if let Some(min) = thresholds.spo2_min.filter(|min| spo2 < *min) {
        messages.push(format!("SpO2 {spo2}% is below the minimum of {min}%."));
    }

    if messages.is_empty() {
        HealthEvaluation {
            status: HealthStatus::Normal,
            message: None,
        }
    } else {
        HealthEvaluation {
            status: HealthStatus::Danger,
            message: Some(messages.join(" ")),
        }
    }
}

/// Check a coordinate against the trip's geofence, if one is configured.
///
/// Returns the alert message for a breach, or `None` when the point is
/// inside the fence or no geofence applies. The message states the radius
/// and the excess distance, both to 2 decimal places in km.
pub fn evaluate_location(
    geofence: Option<&Geofence>,
    latitude: Decimal,
    longitude: Decimal,
) -> Option<String> {
    // ---
    let fence = geofence?;

    let distance_km = haversine_km(
        as_f64(fence.center_lat),
        as_f64(fence.center_lng),
        as_f64(latitude),
        as_f64(longitude),
    );
    let radius_km = as_f64(fence.radius_km);

    if distance_km > radius_km {
        Some(format!(
            "Geofence radius of {:.2} km exceeded by {:.2} km.",
            radius_km,
            distance_km - radius_km
        ))
    } else {
        None
    }
}

/// Great-circle distance in km between two (lat, lon) points in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // ---
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Lossy Decimal → f64 for trigonometry. Coordinates and radii carry at
/// most 6 fractional digits, well within f64 precision.
pub(crate) fn as_f64(value: Decimal) -> f64 {
    // ---
    value.to_f64().unwrap_or_default()
}

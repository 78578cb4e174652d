//! Domain models for the trip monitoring backend.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---

/// Classification of a health reading against its trip's thresholds.
///
/// A reading is `Danger` iff at least one configured threshold is violated;
/// with no thresholds configured every reading is `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Normal,
    Danger,
}

impl HealthStatus {
    /// Stable string form used for the TEXT column in `health_readings`.
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            HealthStatus::Normal => "normal",
            HealthStatus::Danger => "danger",
        }
    }
}

/// Kind of a derived alert record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Health,
    Location,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            AlertType::Health => "health",
            AlertType::Location => "location",
        }
    }
}

// ---

/// Per-trip monitoring configuration. Any field may be unset, which
/// disables the corresponding check ("unconstrained").
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct TripThresholds {
    // ---
    pub heart_rate_min: Option<i32>,
    pub heart_rate_max: Option<i32>,
    pub spo2_min: Option<Decimal>,
    pub geofence_lat: Option<Decimal>,
    pub geofence_lng: Option<Decimal>,
    pub geofence_radius_km: Option<Decimal>,
}

/// A complete circular geofence. Only materializes when center and radius
/// are all configured; a partial configuration disables geofencing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub center_lat: Decimal,
    pub center_lng: Decimal,
    pub radius_km: Decimal,
}

impl TripThresholds {
    /// The trip's geofence, if lat, lng and radius are all set.
    pub fn geofence(&self) -> Option<Geofence> {
        // ---
        match (self.geofence_lat, self.geofence_lng, self.geofence_radius_km) {
            (Some(center_lat), Some(center_lng), Some(radius_km)) => Some(Geofence {
                center_lat,
                center_lng,
                radius_km,
            }),
            _ => None,
        }
    }
}

// ---

/// A trip and its monitoring configuration.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Trip {
    // ---
    pub id: Uuid,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub thresholds: TripThresholds,
    pub created_at: DateTime<Utc>,
}

/// A traveler's membership record within one trip; the unit of measurement
/// and thresholding. Immutable once created.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Participant {
    // ---
    pub id: Uuid,
    pub trip_id: Uuid,
    pub traveler_name: String,
    pub created_at: DateTime<Utc>,
}

/// A stored heart-rate/SpO2 snapshot. Append-only; `status` is computed at
/// ingestion time and never revised.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HealthReading {
    // ---
    pub id: i64,
    pub participant_id: Uuid,
    pub measured_at: DateTime<Utc>,
    pub heart_rate: i32,
    pub spo2: Decimal,
    pub status: String,
}

/// A stored coordinate snapshot. Append-only.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LocationReading {
    // ---
    pub id: i64,
    pub participant_id: Uuid,
    pub measured_at: DateTime<Utc>,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub accuracy_m: Option<Decimal>,
}

/// A derived record created only when a reading violated a configured
/// threshold or geofence. `snapshot_time` is copied from the triggering
/// reading's `measured_at`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Alert {
    // ---
    pub id: i64,
    pub participant_id: Uuid,
    pub alert_type: String,
    pub message: String,
    pub snapshot_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Latest-status row for one participant: the most recent reading of each
/// kind, independently, or none if the participant has no readings yet.
#[derive(Debug, Serialize)]
pub struct ParticipantStatus {
    // ---
    pub participant: Participant,
    pub latest_health: Option<HealthReading>,
    pub latest_location: Option<LocationReading>,
}

// ---

/// Quantize to 2 fractional digits, round-half-up. Storage rule for SpO2
/// percentages and accuracy meters.
pub fn quantize2(value: Decimal) -> Decimal {
    // ---
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantize to 6 fractional digits, round-half-up. Storage rule for
/// latitude/longitude degrees.
pub fn quantize6(value: Decimal) -> Decimal {
    // ---
    value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_quantize2_ties_round_half_up() {
        // ---
        // 96.785 is an exact tie at 2 digits; half-up gives 96.79.
        let tie = Decimal::new(96_785, 3);
        assert_eq!(quantize2(tie), Decimal::new(9_679, 2));

        // Non-tie values round normally.
        let low = Decimal::new(96_784, 3);
        assert_eq!(quantize2(low), Decimal::new(9_678, 2));
    }

    #[test]
    fn test_quantize6_coordinates() {
        // ---
        let lat = Decimal::new(375_665_499, 7); // 37.5665499
        assert_eq!(quantize6(lat), Decimal::new(37_566_550, 6));
    }

    #[test]
    fn test_geofence_requires_all_three_fields() {
        // ---
        let mut thresholds = TripThresholds {
            geofence_lat: Some(Decimal::new(37_566_500, 6)),
            geofence_lng: Some(Decimal::new(126_978_000, 6)),
            geofence_radius_km: None,
            ..Default::default()
        };
        assert!(thresholds.geofence().is_none());

        thresholds.geofence_radius_km = Some(Decimal::new(150, 2));
        let fence = thresholds.geofence().unwrap();
        assert_eq!(fence.radius_km, Decimal::new(150, 2));
    }

    #[test]
    fn test_status_strings() {
        // ---
        assert_eq!(HealthStatus::Normal.as_str(), "normal");
        assert_eq!(HealthStatus::Danger.as_str(), "danger");
        assert_eq!(AlertType::Health.as_str(), "health");
        assert_eq!(AlertType::Location.as_str(), "location");
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        // ---
        // The JSON form must match the TEXT column form, so a reading read
        // back from the database and one serialized directly agree.
        assert_eq!(
            serde_json::to_value(HealthStatus::Danger).unwrap(),
            serde_json::json!("danger")
        );
        assert_eq!(
            serde_json::to_value(AlertType::Location).unwrap(),
            serde_json::json!("location")
        );
    }
}

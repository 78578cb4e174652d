//! Library surface for the `tripwatch` backend service.
//!
//! This crate follows the Explicit Module Boundary Pattern (EMBP): each
//! concern lives behind a gateway module, and consumers (the binary in
//! `main.rs`, route handlers, integration tests) import only through the
//! re-exports below rather than reaching into submodules directly.
//!
//! - `config`  – environment-driven runtime configuration
//! - `models`  – domain types shared by the store and the routes
//! - `monitor` – threshold evaluation, geofence checks, demo timelines
//! - `routes`  – axum route gateway
//! - `schema`  – idempotent database schema setup
//! - `store`   – persistence over PostgreSQL

pub mod config;
pub mod models;
pub mod monitor;
pub mod routes;
pub mod schema;
pub mod store;

pub use config::Config;

// Re-exported so route modules depend on the crate root, not on each
// other's internals. Refactoring stays local to the owning module.
pub use models::{
    Alert, Geofence, HealthReading, HealthStatus, LocationReading, Participant,
    ParticipantStatus, Trip, TripThresholds,
};

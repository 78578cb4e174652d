use axum::Router;
use sqlx::PgPool;

use crate::Config;

mod alerts;
mod demo;
mod health;
mod readings;
mod status;
mod trips;

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(trips::router())
        .merge(readings::router())
        .merge(status::router())
        .merge(alerts::router())
        .merge(demo::router())
        .merge(health::router())
        .with_state((pool, config))
}

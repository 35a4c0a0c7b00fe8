//! RatingsGateway - HTTP surface for college football power ratings
//!
//! The gateway loads a season's ratings from a [`RatingsStore`], hands them to
//! `rating_engine` for ranking and percentile scoring, and serves the result
//! as JSON or as a server-rendered table.
//!
//! ## Endpoints
//!
//! - `GET /health`
//! - `GET /api/power-rankings?season=N`
//! - `GET /api/available-years`
//! - `GET /api/teams/{name}?year=N`
//! - `GET /api/debug-tables` (when enabled)
//! - `GET /?season=N` (HTML)

pub mod config;
pub mod error;
pub mod html;
pub mod logging;
pub mod memory;
pub mod postgres;
pub mod responses;
pub mod rest_api;
pub mod shutdown;
pub mod store;

pub use config::GatewayConfig;
pub use error::{ApiError, GatewayError, GatewayResult};
pub use memory::{InMemoryStore, Snapshot};
pub use postgres::PgRatingsStore;
pub use rest_api::{create_routes, ApiSettings};
pub use store::{RatingsStore, TeamProfile};

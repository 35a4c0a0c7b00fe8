//! Rating Engine - ranks college football teams and scores them by percentile
//!
//! This crate is the pure core of the ratings service: it takes one season's
//! worth of team ratings, orders them by power rating and computes a
//! percentile for each of the four rating metrics. It also owns the
//! name-matching rules used to attach team metadata, and the display helpers
//! shared by every renderer. Nothing in here performs I/O.

pub mod catalog;
pub mod display;
pub mod error;
pub mod models;
pub mod ranking;

pub use catalog::{dedupe_ratings, join_metadata, normalize_name, TeamDirectory};
pub use display::{format_rating, percentile_color, NOT_AVAILABLE};
pub use error::EngineError;
pub use models::{Metric, Percentiles, RankedTeam, RatedTeam, TeamMetadata, TeamRating};
pub use ranking::{
    build_ranked_table, percentile_of, rank_by_power, MetricPopulation, NullPlacement,
    DEFAULT_PERCENTILE,
};

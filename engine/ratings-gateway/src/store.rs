//! Data access for team ratings
//!
//! Handlers only see the [`RatingsStore`] trait. Implementations return rating
//! rows already deduplicated and joined to their team metadata; ranking
//! happens afterwards in the handler.

use async_trait::async_trait;
use rating_engine::{
    dedupe_ratings, join_metadata, normalize_name, Metric, RatedTeam, TeamDirectory,
    TeamMetadata, TeamRating,
};
use serde::Serialize;
use std::cmp::Ordering;

use crate::error::GatewayResult;

/// A team's metadata and its ratings for one season
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProfile {
    pub metadata: TeamMetadata,
    pub season: i32,
    /// `None` when the team has no ratings row for the season
    pub rating: Option<TeamRating>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInfo {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
}

/// Shape of the backing tables, for diagnosing a misconfigured database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaReport {
    pub tables: Vec<TableInfo>,
    pub teams_columns: Vec<ColumnInfo>,
    pub ratings_columns: Vec<ColumnInfo>,
}

/// Read-only access to ratings and team metadata
#[async_trait]
pub trait RatingsStore: Send + Sync {
    /// One row per team for `season`, joined to metadata where a name matches
    ///
    /// Rows come back ordered by normalized team name, so teams tied on power
    /// rating rank the same way on every call.
    async fn fetch_ratings(&self, season: i32) -> GatewayResult<Vec<RatedTeam>>;

    /// Seasons that have ratings, newest first
    async fn available_seasons(&self) -> GatewayResult<Vec<i32>>;

    /// Look up a team by school or alternate name
    async fn find_team(&self, name: &str, season: i32) -> GatewayResult<Option<TeamProfile>>;

    async fn describe_schema(&self) -> GatewayResult<SchemaReport>;

    /// Release any held resources
    async fn close(&self) {}
}

/// Highest power rating first, absent ratings last
fn by_power_desc(a: &TeamRating, b: &TeamRating) -> Ordering {
    match (a.metric(Metric::Power), b.metric(Metric::Power)) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Dedupe a season's rating rows and attach metadata
///
/// Rows are put in (team name, power rating descending) order first and teams
/// in school order, so the result does not depend on how the store returned
/// them.
pub fn assemble_season(
    mut ratings: Vec<TeamRating>,
    mut teams: Vec<TeamMetadata>,
) -> Vec<RatedTeam> {
    ratings.sort_by(|a, b| {
        normalize_name(&a.team_name)
            .cmp(&normalize_name(&b.team_name))
            .then_with(|| by_power_desc(a, b))
    });
    teams.sort_by_cached_key(|t| normalize_name(&t.school));

    let directory = TeamDirectory::new(teams);
    join_metadata(dedupe_ratings(ratings), &directory)
}

/// Every normalized name a team is known by
pub fn team_keys(team: &TeamMetadata) -> Vec<String> {
    let mut keys = vec![normalize_name(&team.school)];
    for alt in [&team.alt_name, &team.alt_name2].into_iter().flatten() {
        let key = normalize_name(alt);
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Pick the team matching `name` among `candidates` and attach its best rating
///
/// `ratings` may contain rows for other teams; only rows whose name matches
/// one of the chosen team's keys are considered.
pub fn assemble_profile(
    name: &str,
    season: i32,
    candidates: Vec<TeamMetadata>,
    ratings: Vec<TeamRating>,
) -> Option<TeamProfile> {
    let directory = TeamDirectory::new(candidates);
    let metadata = directory.lookup(name)?.clone();
    let keys = team_keys(&metadata);

    let matching: Vec<TeamRating> = ratings
        .into_iter()
        .filter(|r| r.season == season && keys.contains(&normalize_name(&r.team_name)))
        .map(|mut r| {
            // Collapse alternate spellings onto one key so dedupe sees one team
            r.team_name = metadata.school.clone();
            r
        })
        .collect();

    let rating = dedupe_ratings(matching).into_iter().next();
    Some(TeamProfile { metadata, season, rating })
}

//! In-memory ratings store
//!
//! Serves a fixed snapshot of both tables. Used for running the server
//! without a database (`--snapshot`) and for exercising the HTTP surface.

use async_trait::async_trait;
use rating_engine::{normalize_name, RatedTeam, TeamMetadata, TeamRating};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::GatewayResult;
use crate::store::{
    assemble_profile, assemble_season, team_keys, ColumnInfo, RatingsStore, SchemaReport,
    TableInfo, TeamProfile,
};

/// Contents of both tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub ratings: Vec<TeamRating>,
    #[serde(default)]
    pub teams: Vec<TeamMetadata>,
}

pub struct InMemoryStore {
    snapshot: Snapshot,
}

impl InMemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file
    pub async fn from_json_file<P: AsRef<Path>>(path: P) -> GatewayResult<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded snapshot with {} rating rows and {} teams from {:?}",
            snapshot.ratings.len(),
            snapshot.teams.len(),
            path.as_ref()
        );
        Ok(Self::new(snapshot))
    }
}

fn column(name: &str, data_type: &str) -> ColumnInfo {
    ColumnInfo { column_name: name.to_string(), data_type: data_type.to_string() }
}

#[async_trait]
impl RatingsStore for InMemoryStore {
    async fn fetch_ratings(&self, season: i32) -> GatewayResult<Vec<RatedTeam>> {
        let ratings: Vec<TeamRating> =
            self.snapshot.ratings.iter().filter(|r| r.season == season).cloned().collect();
        Ok(assemble_season(ratings, self.snapshot.teams.clone()))
    }

    async fn available_seasons(&self) -> GatewayResult<Vec<i32>> {
        let mut seasons: Vec<i32> = self.snapshot.ratings.iter().map(|r| r.season).collect();
        seasons.sort_unstable_by(|a, b| b.cmp(a));
        seasons.dedup();
        Ok(seasons)
    }

    async fn find_team(&self, name: &str, season: i32) -> GatewayResult<Option<TeamProfile>> {
        let key = normalize_name(name);
        let candidates: Vec<TeamMetadata> = self
            .snapshot
            .teams
            .iter()
            .filter(|t| team_keys(t).contains(&key))
            .cloned()
            .collect();

        Ok(assemble_profile(name, season, candidates, self.snapshot.ratings.clone()))
    }

    async fn describe_schema(&self) -> GatewayResult<SchemaReport> {
        Ok(SchemaReport {
            tables: vec![
                TableInfo { table_name: "team_power_ratings".to_string() },
                TableInfo { table_name: "teams".to_string() },
            ],
            teams_columns: vec![
                column("school", "text"),
                column("alt_name", "text"),
                column("alt_name2", "text"),
                column("mascot", "text"),
                column("conference", "text"),
                column("classification", "text"),
                column("color", "text"),
                column("alt_color", "text"),
                column("logo_url", "text"),
            ],
            ratings_columns: vec![
                column("team_name", "text"),
                column("season", "integer"),
                column("power_rating", "double precision"),
                column("offense_rating", "double precision"),
                column("defense_rating", "double precision"),
                column("strength_of_schedule", "double precision"),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn snapshot() -> Snapshot {
        let mut ga = TeamRating::new("Georgia", 2025);
        ga.power_rating = Some(24.1);
        let mut old = TeamRating::new("Georgia", 2023);
        old.power_rating = Some(30.0);
        let mut bama = TeamRating::new("alabama", 2024);
        bama.power_rating = Some(21.0);

        Snapshot {
            ratings: vec![ga, old, bama],
            teams: vec![TeamMetadata::for_school("Georgia"), TeamMetadata::for_school("Alabama")],
        }
    }

    #[tokio::test]
    async fn test_seasons_newest_first() {
        let store = InMemoryStore::new(snapshot());
        assert_eq!(store.available_seasons().await.unwrap(), vec![2025, 2024, 2023]);
    }

    #[tokio::test]
    async fn test_fetch_ratings_filters_by_season() {
        let store = InMemoryStore::new(snapshot());
        let teams = store.fetch_ratings(2025).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].display_name(), "Georgia");

        assert!(store.fetch_ratings(1999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_team_uses_requested_season() {
        let store = InMemoryStore::new(snapshot());
        let profile = store.find_team("GEORGIA", 2023).await.unwrap().unwrap();
        assert_eq!(profile.rating.unwrap().power_rating, Some(30.0));

        let profile = store.find_team("Alabama", 2025).await.unwrap().unwrap();
        assert!(profile.rating.is_none());

        assert!(store.find_team("Vanderbilt", 2025).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ratings": [{{"team_name": "Army", "season": 2025, "power_rating": 3.5,
                "offense_rating": null, "defense_rating": null, "strength_of_schedule": null}}]}}"#
        )
        .unwrap();

        let store = InMemoryStore::from_json_file(file.path()).await.unwrap();
        let teams = store.fetch_ratings(2025).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert!(teams[0].metadata.is_none());
    }
}

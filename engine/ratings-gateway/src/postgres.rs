//! PostgreSQL-backed ratings store
//!
//! Every operation checks one connection out of the pool, runs its queries on
//! it, and returns it to the pool when the guard drops, on success or error.

use async_trait::async_trait;
use rating_engine::{normalize_name, RatedTeam, TeamMetadata, TeamRating};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow, PgSslMode};
use sqlx::{PgConnection, PgPool, Row};
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::store::{
    assemble_profile, assemble_season, team_keys, ColumnInfo, RatingsStore, SchemaReport,
    TableInfo, TeamProfile,
};

const RATINGS_COLUMNS: &str = "team_name, season::int4 AS season, \
     power_rating::float8 AS power_rating, \
     offense_rating::float8 AS offense_rating, \
     defense_rating::float8 AS defense_rating, \
     strength_of_schedule::float8 AS strength_of_schedule";

const TEAMS_COLUMNS: &str = "school, alt_name, alt_name2, mascot, conference, classification, \
     color, alt_color, logo_url";

/// One season's ratings in a fixed order, so ties rank the same on every call
const SEASON_RATINGS_QUERY: &str = "SELECT team_name, season::int4 AS season, \
     power_rating::float8 AS power_rating, \
     offense_rating::float8 AS offense_rating, \
     defense_rating::float8 AS defense_rating, \
     strength_of_schedule::float8 AS strength_of_schedule \
     FROM team_power_ratings \
     WHERE season = $1 \
     ORDER BY LOWER(TRIM(team_name)), power_rating DESC NULLS LAST";

const ALL_TEAMS_QUERY: &str = "SELECT school, alt_name, alt_name2, mascot, conference, \
     classification, color, alt_color, logo_url \
     FROM teams \
     ORDER BY LOWER(TRIM(school))";

/// Ratings store over a bounded connection pool
pub struct PgRatingsStore {
    pool: PgPool,
}

impl PgRatingsStore {
    /// Build the pool without connecting; connections open on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> GatewayResult<Self> {
        let mut options: PgConnectOptions = config.url.parse()?;
        if config.require_ssl {
            options = options.ssl_mode(PgSslMode::Require);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    async fn load_teams(conn: &mut PgConnection) -> GatewayResult<Vec<TeamMetadata>> {
        let rows = sqlx::query(ALL_TEAMS_QUERY).fetch_all(&mut *conn).await?;
        teams_from_rows(&rows)
    }
}

fn rating_from_row(row: &PgRow) -> GatewayResult<Option<TeamRating>> {
    let team_name: Option<String> = row.try_get("team_name")?;
    let Some(team_name) = team_name else {
        warn!("Skipping ratings row with no team name");
        return Ok(None);
    };

    Ok(Some(TeamRating {
        team_name,
        season: row.try_get("season")?,
        power_rating: row.try_get("power_rating")?,
        offense_rating: row.try_get("offense_rating")?,
        defense_rating: row.try_get("defense_rating")?,
        strength_of_schedule: row.try_get("strength_of_schedule")?,
    }))
}

/// A `teams` row as stored; `school` is nullable in the table
struct TeamRow {
    school: Option<String>,
    alt_name: Option<String>,
    alt_name2: Option<String>,
    mascot: Option<String>,
    conference: Option<String>,
    classification: Option<String>,
    color: Option<String>,
    alt_color: Option<String>,
    logo_url: Option<String>,
}

impl TeamRow {
    fn from_row(row: &PgRow) -> GatewayResult<Self> {
        Ok(Self {
            school: row.try_get("school")?,
            alt_name: row.try_get("alt_name")?,
            alt_name2: row.try_get("alt_name2")?,
            mascot: row.try_get("mascot")?,
            conference: row.try_get("conference")?,
            classification: row.try_get("classification")?,
            color: row.try_get("color")?,
            alt_color: row.try_get("alt_color")?,
            logo_url: row.try_get("logo_url")?,
        })
    }

    /// `None` for rows with no school, which cannot be matched to anything
    fn into_metadata(self) -> Option<TeamMetadata> {
        let Some(school) = self.school else {
            warn!("Skipping teams row with no school");
            return None;
        };

        Some(TeamMetadata {
            school,
            alt_name: self.alt_name,
            alt_name2: self.alt_name2,
            mascot: self.mascot,
            conference: self.conference,
            classification: self.classification,
            color: self.color,
            alt_color: self.alt_color,
            logo_url: self.logo_url,
        })
    }
}

fn teams_from_rows(rows: &[PgRow]) -> GatewayResult<Vec<TeamMetadata>> {
    let mut teams = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(team) = TeamRow::from_row(row)?.into_metadata() {
            teams.push(team);
        }
    }
    Ok(teams)
}

fn ratings_from_rows(rows: &[PgRow]) -> GatewayResult<Vec<TeamRating>> {
    let mut ratings = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(rating) = rating_from_row(row)? {
            ratings.push(rating);
        }
    }
    Ok(ratings)
}

async fn columns_of(conn: &mut PgConnection, table: &str) -> GatewayResult<Vec<ColumnInfo>> {
    let rows = sqlx::query(
        "SELECT column_name::text AS column_name, data_type::text AS data_type \
         FROM information_schema.columns \
         WHERE table_name = $1 \
         ORDER BY ordinal_position",
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| -> GatewayResult<ColumnInfo> {
            Ok(ColumnInfo {
                column_name: row.try_get("column_name")?,
                data_type: row.try_get("data_type")?,
            })
        })
        .collect()
}

#[async_trait]
impl RatingsStore for PgRatingsStore {
    async fn fetch_ratings(&self, season: i32) -> GatewayResult<Vec<RatedTeam>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(SEASON_RATINGS_QUERY)
        .bind(season)
        .fetch_all(&mut *conn)
        .await?;
        let ratings = ratings_from_rows(&rows)?;
        let teams = Self::load_teams(&mut conn).await?;
        drop(conn);

        debug!("Loaded {} rating rows and {} teams for {}", ratings.len(), teams.len(), season);
        Ok(assemble_season(ratings, teams))
    }

    async fn available_seasons(&self) -> GatewayResult<Vec<i32>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(
            "SELECT DISTINCT season::int4 AS season \
             FROM team_power_ratings \
             WHERE season IS NOT NULL \
             ORDER BY season DESC",
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(|row| row.try_get::<i32, _>("season").map_err(GatewayError::from)).collect()
    }

    async fn find_team(&self, name: &str, season: i32) -> GatewayResult<Option<TeamProfile>> {
        let key = normalize_name(name);
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(&format!(
            "SELECT {TEAMS_COLUMNS} FROM teams \
             WHERE LOWER(TRIM(school)) = $1 \
                OR LOWER(TRIM(alt_name)) = $1 \
                OR LOWER(TRIM(alt_name2)) = $1 \
             ORDER BY LOWER(TRIM(school))"
        ))
        .bind(&key)
        .fetch_all(&mut *conn)
        .await?;
        let candidates = teams_from_rows(&rows)?;
        if candidates.is_empty() {
            return Ok(None);
        }

        let keys: Vec<String> = candidates.iter().flat_map(team_keys).collect();
        let rows = sqlx::query(&format!(
            "SELECT {RATINGS_COLUMNS} FROM team_power_ratings \
             WHERE season = $1 AND LOWER(TRIM(team_name)) = ANY($2) \
             ORDER BY LOWER(TRIM(team_name)), power_rating DESC NULLS LAST"
        ))
        .bind(season)
        .bind(&keys)
        .fetch_all(&mut *conn)
        .await?;
        let ratings = ratings_from_rows(&rows)?;

        Ok(assemble_profile(name, season, candidates, ratings))
    }

    async fn describe_schema(&self) -> GatewayResult<SchemaReport> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(
            "SELECT table_name::text AS table_name \
             FROM information_schema.tables \
             WHERE table_schema = 'public' \
             ORDER BY table_name",
        )
        .fetch_all(&mut *conn)
        .await?;
        let tables = rows
            .iter()
            .map(|row| -> GatewayResult<TableInfo> {
                Ok(TableInfo { table_name: row.try_get("table_name")? })
            })
            .collect::<GatewayResult<Vec<_>>>()?;

        let teams_columns = columns_of(&mut conn, "teams").await?;
        let ratings_columns = columns_of(&mut conn, "team_power_ratings").await?;

        Ok(SchemaReport { tables, teams_columns, ratings_columns })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

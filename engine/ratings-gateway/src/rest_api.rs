//! REST API endpoints for the RatingsGateway
//!
//! This module provides the power rankings, available seasons, single team
//! and schema diagnostics endpoints, plus the server-rendered ranked table.

use rating_engine::{build_ranked_table, NullPlacement, RankedTeam};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::config::GatewayConfig;
use crate::error::{ApiError, GatewayError, GatewayResult};
use crate::html;
use crate::responses::{HealthResponse, RankedTeamResponse, TeamProfileResponse, YearsResponse};
use crate::store::RatingsStore;

/// Request-independent settings the handlers need
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub service_name: String,
    pub current_season: i32,
    pub null_placement: NullPlacement,
    pub debug_endpoints: bool,
}

impl From<&GatewayConfig> for ApiSettings {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            service_name: config.server.service_name.clone(),
            current_season: config.rankings.current_season,
            null_placement: config.rankings.null_placement,
            debug_endpoints: config.server.debug_endpoints,
        }
    }
}

/// Read an integer season from the query, falling back when missing or malformed
fn season_param(params: &HashMap<String, String>, key: &str, fallback: i32) -> i32 {
    params.get(key).and_then(|s| s.trim().parse::<i32>().ok()).unwrap_or(fallback)
}

fn store_rejection(err: GatewayError) -> Rejection {
    error!("Store request failed: {}", err);
    warp::reject::custom(ApiError::from(err))
}

/// Load a season from the store and rank it
pub async fn ranked_season(
    store: &dyn RatingsStore,
    season: i32,
    nulls: NullPlacement,
) -> GatewayResult<Vec<RankedTeam>> {
    let teams = store.fetch_ratings(season).await?;
    Ok(build_ranked_table(&teams, nulls))
}

/// Ranked table for a season as JSON
pub async fn get_power_rankings(
    params: HashMap<String, String>,
    store: Arc<dyn RatingsStore>,
    settings: Arc<ApiSettings>,
) -> Result<impl Reply, Rejection> {
    let season = season_param(&params, "season", settings.current_season);
    info!("Fetching power rankings for {} season", season);

    let table = ranked_season(store.as_ref(), season, settings.null_placement)
        .await
        .map_err(store_rejection)?;

    let body: Vec<RankedTeamResponse> = table.iter().map(RankedTeamResponse::from).collect();
    Ok(warp::reply::json(&body))
}

/// Seasons that have ratings, newest first
pub async fn get_available_years(store: Arc<dyn RatingsStore>) -> Result<impl Reply, Rejection> {
    let years = store.available_seasons().await.map_err(store_rejection)?;
    Ok(warp::reply::json(&YearsResponse { years }))
}

/// One team's metadata and ratings
pub async fn get_team(
    raw_name: String,
    params: HashMap<String, String>,
    store: Arc<dyn RatingsStore>,
    settings: Arc<ApiSettings>,
) -> Result<impl Reply, Rejection> {
    let name = match urlencoding::decode(&raw_name) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            warn!("Team name {:?} is not valid percent-encoding: {}", raw_name, e);
            raw_name
        }
    };
    let season = season_param(&params, "year", settings.current_season);

    match store.find_team(&name, season).await.map_err(store_rejection)? {
        Some(profile) => Ok(warp::reply::json(&TeamProfileResponse::from(profile))),
        None => {
            info!("Team {:?} not found", name);
            Err(warp::reject::custom(ApiError::from(GatewayError::TeamNotFound(name))))
        }
    }
}

/// Table and column listing of the backing database
pub async fn get_debug_tables(
    store: Arc<dyn RatingsStore>,
    settings: Arc<ApiSettings>,
) -> Result<impl Reply, Rejection> {
    if !settings.debug_endpoints {
        return Err(warp::reject::custom(ApiError::not_found()));
    }

    let report = store.describe_schema().await.map_err(store_rejection)?;
    Ok(warp::reply::json(&report))
}

/// Server-rendered ranked table
pub async fn get_rankings_page(
    params: HashMap<String, String>,
    store: Arc<dyn RatingsStore>,
    settings: Arc<ApiSettings>,
) -> Result<impl Reply, Rejection> {
    let season = season_param(&params, "season", settings.current_season);

    let (body, status) = match ranked_season(store.as_ref(), season, settings.null_placement).await
    {
        Ok(table) => (html::render_rankings_page(season, &table), StatusCode::OK),
        Err(e) => {
            error!("Failed to load rankings page for {}: {}", season, e);
            (html::render_error_page("Data unavailable"), StatusCode::INTERNAL_SERVER_ERROR)
        }
    };

    Ok(warp::reply::with_status(warp::reply::html(body), status))
}

fn error_reply(api_error: &ApiError) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&api_error.to_response()), api_error.status)
}

/// Turn every rejection into the JSON error body
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(api_error) = err.find::<ApiError>() {
        return Ok(error_reply(api_error));
    }

    let api_error = if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::method_not_allowed()
    } else if err.is_not_found() {
        ApiError::not_found()
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        ApiError::new(StatusCode::FORBIDDEN, "CORS_FORBIDDEN", "Request not allowed")
    } else {
        warn!("Unhandled rejection: {:?}", err);
        ApiError::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", "Bad request")
    };

    Ok(error_reply(&api_error))
}

/// Create REST API routes
pub fn create_routes(
    store: Arc<dyn RatingsStore>,
    settings: ApiSettings,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let settings = Arc::new(settings);
    let store_filter = warp::any().map(move || store.clone());
    let settings_filter = warp::any().map(move || settings.clone());
    let query = warp::query::<HashMap<String, String>>();

    // Health check endpoint
    let health = warp::path!("health").and(warp::get()).and(settings_filter.clone()).map(
        |settings: Arc<ApiSettings>| {
            warp::reply::json(&HealthResponse {
                status: "healthy".to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                service: settings.service_name.clone(),
            })
        },
    );

    // Power rankings endpoint
    let power_rankings = warp::path!("api" / "power-rankings")
        .and(warp::get())
        .and(query.clone())
        .and(store_filter.clone())
        .and(settings_filter.clone())
        .and_then(get_power_rankings);

    // Available seasons endpoint
    let available_years = warp::path!("api" / "available-years")
        .and(warp::get())
        .and(store_filter.clone())
        .and_then(get_available_years);

    // Single team endpoint
    let team = warp::path!("api" / "teams" / String)
        .and(warp::get())
        .and(query.clone())
        .and(store_filter.clone())
        .and(settings_filter.clone())
        .and_then(get_team);

    // Schema diagnostics endpoint
    let debug_tables = warp::path!("api" / "debug-tables")
        .and(warp::get())
        .and(store_filter.clone())
        .and(settings_filter.clone())
        .and_then(get_debug_tables);

    // Ranked table page
    let rankings_page = warp::path::end()
        .and(warp::get())
        .and(query)
        .and(store_filter)
        .and(settings_filter)
        .and_then(get_rankings_page);

    let request_log = warp::log::custom(|info| {
        info!(
            method = %info.method(),
            path = info.path(),
            status = info.status().as_u16(),
            elapsed_ms = info.elapsed().as_millis() as u64,
            "request"
        );
    });

    // Combine all routes
    health
        .or(power_rankings)
        .or(available_years)
        .or(team)
        .or(debug_tables)
        .or(rankings_page)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type"])
                .allow_methods(vec!["GET", "OPTIONS"]),
        )
        .recover(handle_rejection)
        .with(request_log)
}

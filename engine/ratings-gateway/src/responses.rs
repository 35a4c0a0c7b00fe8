//! JSON response bodies

use rating_engine::{format_rating, Metric, RankedTeam};
use serde::{Deserialize, Serialize};

use crate::store::TeamProfile;

/// One row of `/api/power-rankings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTeamResponse {
    pub rank: u32,
    pub team_name: String,
    pub school: Option<String>,
    pub mascot: Option<String>,
    pub conference: Option<String>,
    pub classification: Option<String>,
    pub color: Option<String>,
    pub alt_color: Option<String>,
    pub logo_url: Option<String>,
    pub power_rating: String,
    pub offense_rating: String,
    pub defense_rating: String,
    pub strength_of_schedule: String,
    pub power_percentile: u8,
    pub offense_percentile: u8,
    pub defense_percentile: u8,
    pub sos_percentile: u8,
}

impl From<&RankedTeam> for RankedTeamResponse {
    fn from(ranked: &RankedTeam) -> Self {
        let rating = &ranked.team.rating;
        let meta = ranked.team.metadata.as_ref();
        let text = |f: fn(&rating_engine::TeamMetadata) -> &Option<String>| {
            meta.and_then(|m| f(m).clone())
        };

        Self {
            rank: ranked.rank,
            team_name: rating.team_name.clone(),
            school: meta.map(|m| m.school.clone()),
            mascot: text(|m| &m.mascot),
            conference: text(|m| &m.conference),
            classification: text(|m| &m.classification),
            color: text(|m| &m.color),
            alt_color: text(|m| &m.alt_color),
            logo_url: text(|m| &m.logo_url),
            power_rating: format_rating(rating.metric(Metric::Power)),
            offense_rating: format_rating(rating.metric(Metric::Offense)),
            defense_rating: format_rating(rating.metric(Metric::Defense)),
            strength_of_schedule: format_rating(rating.metric(Metric::StrengthOfSchedule)),
            power_percentile: ranked.percentiles.power,
            offense_percentile: ranked.percentiles.offense,
            defense_percentile: ranked.percentiles.defense,
            sos_percentile: ranked.percentiles.strength_of_schedule,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

/// Seasons with ratings
#[derive(Debug, Serialize, Deserialize)]
pub struct YearsResponse {
    pub years: Vec<i32>,
}

/// `/api/teams/{name}` response: metadata plus raw ratings for the season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProfileResponse {
    pub school: String,
    pub alt_name: Option<String>,
    pub alt_name2: Option<String>,
    pub mascot: Option<String>,
    pub conference: Option<String>,
    pub classification: Option<String>,
    pub color: Option<String>,
    pub alt_color: Option<String>,
    pub logo_url: Option<String>,
    pub season: i32,
    pub power_rating: Option<f64>,
    pub offense_rating: Option<f64>,
    pub defense_rating: Option<f64>,
    pub strength_of_schedule: Option<f64>,
}

impl From<TeamProfile> for TeamProfileResponse {
    fn from(profile: TeamProfile) -> Self {
        let metric = |m: Metric| profile.rating.as_ref().and_then(|r| r.metric(m));
        let power_rating = metric(Metric::Power);
        let offense_rating = metric(Metric::Offense);
        let defense_rating = metric(Metric::Defense);
        let strength_of_schedule = metric(Metric::StrengthOfSchedule);
        let meta = profile.metadata;

        Self {
            school: meta.school,
            alt_name: meta.alt_name,
            alt_name2: meta.alt_name2,
            mascot: meta.mascot,
            conference: meta.conference,
            classification: meta.classification,
            color: meta.color,
            alt_color: meta.alt_color,
            logo_url: meta.logo_url,
            season: profile.season,
            power_rating,
            offense_rating,
            defense_rating,
            strength_of_schedule,
        }
    }
}

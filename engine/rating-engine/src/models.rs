use serde::{Deserialize, Serialize};

/// One team's ratings for one season, as stored in `team_power_ratings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub team_name: String,
    pub season: i32,
    pub power_rating: Option<f64>,
    pub offense_rating: Option<f64>,
    pub defense_rating: Option<f64>,
    pub strength_of_schedule: Option<f64>,
}

/// Team metadata from the `teams` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMetadata {
    pub school: String,
    pub alt_name: Option<String>,
    pub alt_name2: Option<String>,
    pub mascot: Option<String>,
    pub conference: Option<String>,
    pub classification: Option<String>,
    pub color: Option<String>,
    pub alt_color: Option<String>,
    pub logo_url: Option<String>,
}

/// The four rating metrics a team is scored on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Power,
    Offense,
    Defense,
    StrengthOfSchedule,
}

impl Metric {
    pub const ALL: [Metric; 4] =
        [Metric::Power, Metric::Offense, Metric::Defense, Metric::StrengthOfSchedule];
}

impl TeamRating {
    /// Create a rating row with every metric absent
    pub fn new(team_name: impl Into<String>, season: i32) -> Self {
        Self {
            team_name: team_name.into(),
            season,
            power_rating: None,
            offense_rating: None,
            defense_rating: None,
            strength_of_schedule: None,
        }
    }

    /// Value of a metric, with NaN and infinities read as absent
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        let raw = match metric {
            Metric::Power => self.power_rating,
            Metric::Offense => self.offense_rating,
            Metric::Defense => self.defense_rating,
            Metric::StrengthOfSchedule => self.strength_of_schedule,
        };
        raw.filter(|v| v.is_finite())
    }
}

impl TeamMetadata {
    /// Metadata with only the school name set
    pub fn for_school(school: impl Into<String>) -> Self {
        Self {
            school: school.into(),
            alt_name: None,
            alt_name2: None,
            mascot: None,
            conference: None,
            classification: None,
            color: None,
            alt_color: None,
            logo_url: None,
        }
    }
}

/// A rating row joined with whatever metadata matched it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedTeam {
    pub rating: TeamRating,
    pub metadata: Option<TeamMetadata>,
}

impl RatedTeam {
    pub fn new(rating: TeamRating, metadata: Option<TeamMetadata>) -> Self {
        Self { rating, metadata }
    }

    /// Name to show for the team: the school when known, else the rating's name
    pub fn display_name(&self) -> &str {
        self.metadata.as_ref().map(|m| m.school.as_str()).unwrap_or(&self.rating.team_name)
    }
}

/// Per-metric percentiles, each in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentiles {
    pub power: u8,
    pub offense: u8,
    pub defense: u8,
    pub strength_of_schedule: u8,
}

impl Percentiles {
    pub fn get(&self, metric: Metric) -> u8 {
        match metric {
            Metric::Power => self.power,
            Metric::Offense => self.offense,
            Metric::Defense => self.defense,
            Metric::StrengthOfSchedule => self.strength_of_schedule,
        }
    }
}

/// A team's place in one computed table. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTeam {
    /// 1-based position by descending power rating
    pub rank: u32,
    pub team: RatedTeam,
    pub percentiles: Percentiles,
}

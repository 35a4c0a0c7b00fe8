//! Power ranking and percentile scoring
//!
//! Ranks are assigned over a stable sort by descending power rating, so teams
//! with equal ratings keep their input order and still get distinct ranks.
//! Percentiles use the position of the first population value that is greater
//! than or equal to the team's value, which gives every tied team the
//! percentile of the lowest tied slot.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::models::{Metric, Percentiles, RankedTeam, RatedTeam};

/// Percentile reported when a team has no value for a metric
pub const DEFAULT_PERCENTILE: u8 = 50;

/// Where teams without a power rating land in the ranking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPlacement {
    First,
    #[default]
    Last,
}

impl FromStr for NullPlacement {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(NullPlacement::First),
            "last" => Ok(NullPlacement::Last),
            _ => Err(EngineError::InvalidNullPlacement(s.to_string())),
        }
    }
}

impl fmt::Display for NullPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullPlacement::First => write!(f, "first"),
            NullPlacement::Last => write!(f, "last"),
        }
    }
}

/// Order two optional power ratings, highest first
fn compare_power(a: Option<f64>, b: Option<f64>, nulls: NullPlacement) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match nulls {
            NullPlacement::First => Ordering::Less,
            NullPlacement::Last => Ordering::Greater,
        },
        (Some(_), None) => match nulls {
            NullPlacement::First => Ordering::Greater,
            NullPlacement::Last => Ordering::Less,
        },
    }
}

/// Sort teams by descending power rating and pair each with its 1-based rank
pub fn rank_by_power(teams: &[RatedTeam], nulls: NullPlacement) -> Vec<(u32, RatedTeam)> {
    let mut sorted = teams.to_vec();
    // `sort_by` is stable, which is what breaks ties.
    sorted.sort_by(|a, b| {
        compare_power(a.rating.metric(Metric::Power), b.rating.metric(Metric::Power), nulls)
    });

    sorted.into_iter().enumerate().map(|(index, team)| (index as u32 + 1, team)).collect()
}

/// The present values of one metric across a table, sorted ascending
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPopulation {
    sorted: Vec<f64>,
}

impl MetricPopulation {
    /// Build a population, dropping absent and non-finite values
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut sorted: Vec<f64> =
            values.into_iter().flatten().filter(|v| v.is_finite()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Self { sorted }
    }

    /// Population of `metric` across `teams`
    pub fn for_metric(teams: &[RatedTeam], metric: Metric) -> Self {
        Self::new(teams.iter().map(|t| t.rating.metric(metric)))
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Percentile of `value` within this population
    ///
    /// `None` when the value is absent or the population is empty. A value
    /// above every member scores 100.
    pub fn percentile(&self, value: Option<f64>) -> Option<u8> {
        let value = value.filter(|v| v.is_finite())?;
        if self.sorted.is_empty() {
            return None;
        }

        let first_at_or_above = self.sorted.partition_point(|v| *v < value);
        let position = (first_at_or_above + 1).min(self.sorted.len());
        let percentile = (position as f64 / self.sorted.len() as f64 * 100.0).round();
        Some(percentile as u8)
    }
}

/// Percentile of a single value against an unsorted population
pub fn percentile_of(value: Option<f64>, population: &[Option<f64>]) -> Option<u8> {
    MetricPopulation::new(population.iter().copied()).percentile(value)
}

/// Rank teams by power and score every team on every metric
pub fn build_ranked_table(teams: &[RatedTeam], nulls: NullPlacement) -> Vec<RankedTeam> {
    let power = MetricPopulation::for_metric(teams, Metric::Power);
    let offense = MetricPopulation::for_metric(teams, Metric::Offense);
    let defense = MetricPopulation::for_metric(teams, Metric::Defense);
    let sos = MetricPopulation::for_metric(teams, Metric::StrengthOfSchedule);

    let score = |population: &MetricPopulation, team: &RatedTeam, metric: Metric| {
        population.percentile(team.rating.metric(metric)).unwrap_or(DEFAULT_PERCENTILE)
    };

    let table: Vec<RankedTeam> = rank_by_power(teams, nulls)
        .into_iter()
        .map(|(rank, team)| {
            let percentiles = Percentiles {
                power: score(&power, &team, Metric::Power),
                offense: score(&offense, &team, Metric::Offense),
                defense: score(&defense, &team, Metric::Defense),
                strength_of_schedule: score(&sos, &team, Metric::StrengthOfSchedule),
            };
            RankedTeam { rank, team, percentiles }
        })
        .collect();

    debug!(
        "Ranked {} teams ({} without a power rating, nulls {})",
        table.len(),
        teams.len() - power.len(),
        nulls
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamRating;
    use proptest::prelude::*;

    fn team(name: &str, power: Option<f64>) -> RatedTeam {
        let mut rating = TeamRating::new(name, 2025);
        rating.power_rating = power;
        RatedTeam::new(rating, None)
    }

    fn full_team(name: &str, pwr: f64, off: f64, def: f64, sos: f64) -> RatedTeam {
        let mut rating = TeamRating::new(name, 2025);
        rating.power_rating = Some(pwr);
        rating.offense_rating = Some(off);
        rating.defense_rating = Some(def);
        rating.strength_of_schedule = Some(sos);
        RatedTeam::new(rating, None)
    }

    fn names(table: &[RankedTeam]) -> Vec<&str> {
        table.iter().map(|t| t.team.rating.team_name.as_str()).collect()
    }

    #[test]
    fn test_rank_by_power_orders_descending_with_nulls_last() {
        let teams = vec![
            team("D", None),
            team("B", Some(80.0)),
            team("A", Some(90.0)),
            team("C", Some(80.0)),
        ];

        let ranked = rank_by_power(&teams, NullPlacement::Last);
        let order: Vec<(u32, &str)> =
            ranked.iter().map(|(rank, t)| (*rank, t.rating.team_name.as_str())).collect();
        assert_eq!(order, vec![(1, "A"), (2, "B"), (3, "C"), (4, "D")]);
    }

    #[test]
    fn test_rank_by_power_nulls_first() {
        let teams = vec![team("A", Some(90.0)), team("D", None), team("B", Some(80.0))];

        let ranked = rank_by_power(&teams, NullPlacement::First);
        let order: Vec<&str> = ranked.iter().map(|(_, t)| t.rating.team_name.as_str()).collect();
        assert_eq!(order, vec!["D", "A", "B"]);
    }

    #[test]
    fn test_rank_by_power_empty() {
        assert!(rank_by_power(&[], NullPlacement::Last).is_empty());
        assert!(build_ranked_table(&[], NullPlacement::Last).is_empty());
    }

    #[test]
    fn test_percentile_ties_share_lowest_slot() {
        let population = vec![Some(90.0), Some(80.0), Some(80.0), None];

        assert_eq!(percentile_of(Some(90.0), &population), Some(100));
        assert_eq!(percentile_of(Some(80.0), &population), Some(33));
        assert_eq!(percentile_of(None, &population), None);
    }

    #[test]
    fn test_percentile_extremes() {
        let population: Vec<Option<f64>> = (1..=8).map(|v| Some(v as f64)).collect();

        assert_eq!(percentile_of(Some(8.0), &population), Some(100));
        // 1/8 * 100 = 12.5 rounds up
        assert_eq!(percentile_of(Some(1.0), &population), Some(13));
        assert_eq!(percentile_of(Some(4.5), &population), Some(63));
        assert_eq!(percentile_of(Some(99.0), &population), Some(100));
        assert_eq!(percentile_of(Some(-99.0), &population), Some(13));
    }

    #[test]
    fn test_percentile_of_empty_population() {
        assert_eq!(percentile_of(Some(10.0), &[]), None);
        assert_eq!(percentile_of(Some(10.0), &[None, Some(f64::NAN)]), None);
    }

    #[test]
    fn test_build_ranked_table_with_ties_and_missing_power() {
        let teams = vec![
            team("A", Some(90.0)),
            team("B", Some(80.0)),
            team("C", Some(80.0)),
            team("D", None),
        ];

        let table = build_ranked_table(&teams, NullPlacement::Last);
        assert_eq!(names(&table), vec!["A", "B", "C", "D"]);
        assert_eq!(table.iter().map(|t| t.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        let power: Vec<u8> = table.iter().map(|t| t.percentiles.power).collect();
        assert_eq!(power, vec![100, 33, 33, DEFAULT_PERCENTILE]);

        // Nobody has the other metrics at all
        assert!(table.iter().all(|t| t.percentiles.offense == DEFAULT_PERCENTILE));
        assert!(table.iter().all(|t| t.percentiles.strength_of_schedule == DEFAULT_PERCENTILE));
    }

    #[test]
    fn test_missing_metric_only_affects_that_metric() {
        let mut partial = full_team("Partial", 20.0, 30.0, 10.0, 5.0);
        partial.rating.defense_rating = None;
        let teams = vec![
            full_team("Top", 30.0, 40.0, 20.0, 9.0),
            partial,
            full_team("Low", 10.0, 20.0, 15.0, 1.0),
        ];

        let table = build_ranked_table(&teams, NullPlacement::Last);
        let partial = table.iter().find(|t| t.team.rating.team_name == "Partial").unwrap();

        assert_eq!(partial.rank, 2);
        assert_eq!(partial.percentiles.defense, DEFAULT_PERCENTILE);
        assert_eq!(partial.percentiles.power, 67);
        assert_eq!(partial.percentiles.offense, 67);
        assert_eq!(partial.percentiles.strength_of_schedule, 67);

        // Defense population is {20, 15}; Partial's gap does not shrink the others
        let low = table.iter().find(|t| t.team.rating.team_name == "Low").unwrap();
        assert_eq!(low.percentiles.defense, 50);
        let top = table.iter().find(|t| t.team.rating.team_name == "Top").unwrap();
        assert_eq!(top.percentiles.defense, 100);
    }

    #[test]
    fn test_single_team_scores_100_everywhere() {
        let teams = vec![full_team("Solo", -4.0, 0.0, 2.5, 1.0)];

        let table = build_ranked_table(&teams, NullPlacement::Last);
        assert_eq!(table.len(), 1);
        for metric in Metric::ALL {
            assert_eq!(table[0].percentiles.get(metric), 100);
        }
    }

    #[test]
    fn test_null_placement_parse() {
        assert_eq!("first".parse::<NullPlacement>(), Ok(NullPlacement::First));
        assert_eq!(" LAST ".parse::<NullPlacement>(), Ok(NullPlacement::Last));
        assert!(matches!(
            "middle".parse::<NullPlacement>(),
            Err(EngineError::InvalidNullPlacement(_))
        ));
        assert_eq!(NullPlacement::default(), NullPlacement::Last);
    }

    fn arb_metric() -> impl Strategy<Value = Option<f64>> {
        proptest::option::of(-50.0f64..50.0)
    }

    fn arb_teams() -> impl Strategy<Value = Vec<RatedTeam>> {
        proptest::collection::vec((arb_metric(), arb_metric(), arb_metric(), arb_metric()), 0..40)
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(i, (pwr, off, def, sos))| {
                        let mut rating = TeamRating::new(format!("Team {i}"), 2025);
                        rating.power_rating = pwr;
                        rating.offense_rating = off;
                        rating.defense_rating = def;
                        rating.strength_of_schedule = sos;
                        RatedTeam::new(rating, None)
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn prop_ranks_are_one_to_n(teams in arb_teams()) {
            let ranked = rank_by_power(&teams, NullPlacement::Last);
            let ranks: Vec<u32> = ranked.iter().map(|(rank, _)| *rank).collect();
            let expected: Vec<u32> = (1..=teams.len() as u32).collect();
            prop_assert_eq!(ranks, expected);
        }

        #[test]
        fn prop_build_is_idempotent(teams in arb_teams()) {
            let first = build_ranked_table(&teams, NullPlacement::Last);
            let second = build_ranked_table(&teams, NullPlacement::Last);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_max_scores_100_and_min_scores_one_slot(teams in arb_teams()) {
            let table = build_ranked_table(&teams, NullPlacement::Last);
            for metric in Metric::ALL {
                let population = MetricPopulation::for_metric(&teams, metric);
                if population.is_empty() {
                    continue;
                }
                let values: Vec<f64> = teams.iter().filter_map(|t| t.rating.metric(metric)).collect();
                let max = values.iter().cloned().fold(f64::MIN, f64::max);
                let min = values.iter().cloned().fold(f64::MAX, f64::min);
                let lowest = (1.0 / population.len() as f64 * 100.0).round() as u8;

                for row in &table {
                    match row.team.rating.metric(metric) {
                        Some(v) if v == max => prop_assert_eq!(row.percentiles.get(metric), 100),
                        Some(v) if v == min => prop_assert_eq!(row.percentiles.get(metric), lowest),
                        None => prop_assert_eq!(row.percentiles.get(metric), DEFAULT_PERCENTILE),
                        _ => {}
                    }
                }
            }
        }

        #[test]
        fn prop_ranked_power_is_non_increasing(teams in arb_teams()) {
            let table = build_ranked_table(&teams, NullPlacement::Last);
            let present: Vec<f64> = table.iter().filter_map(|t| t.team.rating.metric(Metric::Power)).collect();
            prop_assert!(present.windows(2).all(|w| w[0] >= w[1]));
            // Absent power ratings only ever trail
            let first_absent = table.iter().position(|t| t.team.rating.power_rating.is_none());
            if let Some(idx) = first_absent {
                prop_assert!(table[idx..].iter().all(|t| t.team.rating.power_rating.is_none()));
            }
        }
    }
}

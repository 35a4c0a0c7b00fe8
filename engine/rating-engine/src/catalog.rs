//! Team name matching
//!
//! Rating rows and team metadata come from different sources and only agree on
//! team names up to case and surrounding whitespace. Metadata also carries two
//! alternate names that are tried when the school name does not match.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Metric, RatedTeam, TeamMetadata, TeamRating};

/// Join key for a team name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Keep one rating row per normalized team name
///
/// The row with the highest power rating wins; rows without one lose to any
/// row that has one, and the first row seen wins exact ties. Output keeps the
/// order in which each team first appeared.
pub fn dedupe_ratings(rows: Vec<TeamRating>) -> Vec<TeamRating> {
    let mut index_by_key: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    let mut kept: Vec<TeamRating> = Vec::with_capacity(rows.len());

    for row in rows {
        let key = normalize_name(&row.team_name);
        match index_by_key.get(&key) {
            Some(&idx) => {
                if outranks(&row, &kept[idx]) {
                    kept[idx] = row;
                }
            }
            None => {
                index_by_key.insert(key, kept.len());
                kept.push(row);
            }
        }
    }

    kept
}

fn outranks(candidate: &TeamRating, current: &TeamRating) -> bool {
    match (candidate.metric(Metric::Power), current.metric(Metric::Power)) {
        (Some(a), Some(b)) => a.partial_cmp(&b) == Some(Ordering::Greater),
        (Some(_), None) => true,
        _ => false,
    }
}

/// Team metadata indexed by normalized school and alternate names
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    teams: Vec<TeamMetadata>,
    by_school: HashMap<String, usize>,
    by_alt_name: HashMap<String, usize>,
}

impl TeamDirectory {
    pub fn new(teams: Vec<TeamMetadata>) -> Self {
        let mut by_school = HashMap::with_capacity(teams.len());
        let mut by_alt_name = HashMap::new();

        for (idx, team) in teams.iter().enumerate() {
            by_school.entry(normalize_name(&team.school)).or_insert(idx);

            for alt in [&team.alt_name, &team.alt_name2].into_iter().flatten() {
                let key = normalize_name(alt);
                if !key.is_empty() {
                    by_alt_name.entry(key).or_insert(idx);
                }
            }
        }

        Self { teams, by_school, by_alt_name }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Find a team by school name, falling back to its alternate names
    pub fn lookup(&self, name: &str) -> Option<&TeamMetadata> {
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        self.by_school
            .get(&key)
            .or_else(|| self.by_alt_name.get(&key))
            .map(|&idx| &self.teams[idx])
    }
}

/// Pair every rating with its metadata, keeping ratings that match nothing
pub fn join_metadata(ratings: Vec<TeamRating>, directory: &TeamDirectory) -> Vec<RatedTeam> {
    ratings
        .into_iter()
        .map(|rating| {
            let metadata = directory.lookup(&rating.team_name).cloned();
            RatedTeam::new(rating, metadata)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(name: &str, power: Option<f64>) -> TeamRating {
        let mut rating = TeamRating::new(name, 2025);
        rating.power_rating = power;
        rating
    }

    fn school(name: &str, alt: Option<&str>, alt2: Option<&str>) -> TeamMetadata {
        let mut meta = TeamMetadata::for_school(name);
        meta.alt_name = alt.map(str::to_string);
        meta.alt_name2 = alt2.map(str::to_string);
        meta
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Ohio State \t"), "ohio state");
        assert_eq!(normalize_name("TEXAS A&M"), "texas a&m");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_dedupe_keeps_highest_power() {
        let rows = vec![
            rating("Georgia", Some(20.0)),
            rating("Alabama", None),
            rating(" georgia ", Some(25.5)),
            rating("ALABAMA", Some(18.0)),
            rating("Georgia", Some(25.5)),
        ];

        let deduped = dedupe_ratings(rows);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].team_name, " georgia ");
        assert_eq!(deduped[0].power_rating, Some(25.5));
        assert_eq!(deduped[1].team_name, "ALABAMA");
        assert_eq!(deduped[1].power_rating, Some(18.0));
    }

    #[test]
    fn test_dedupe_all_null_keeps_first() {
        let rows = vec![rating("Navy", None), rating("navy", None)];
        let deduped = dedupe_ratings(rows);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].team_name, "Navy");
    }

    #[test]
    fn test_directory_lookup_prefers_school() {
        let directory = TeamDirectory::new(vec![
            school("Miami", Some("Miami (FL)"), None),
            school("Miami (OH)", Some("Miami OH"), Some("miami")),
        ]);

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.lookup(" MIAMI ").unwrap().school, "Miami");
        assert_eq!(directory.lookup("miami (fl)").unwrap().school, "Miami");
        assert_eq!(directory.lookup("Miami OH").unwrap().school, "Miami (OH)");
        assert!(directory.lookup("Ohio").is_none());
        assert!(directory.lookup("   ").is_none());
    }

    #[test]
    fn test_join_metadata_is_left_join() {
        let directory = TeamDirectory::new(vec![school("Southern California", Some("USC"), None)]);
        let joined = join_metadata(vec![rating("usc", Some(12.0)), rating("UCLA", Some(3.0))], &directory);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].metadata.as_ref().unwrap().school, "Southern California");
        assert!(joined[1].metadata.is_none());
        assert_eq!(joined[1].rating.team_name, "UCLA");
    }
}

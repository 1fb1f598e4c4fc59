use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Win probability at or above which a matchup counts as decided.
pub const RESOLVED_THRESHOLD: f64 = 0.999;

/// Probability assumed for a side whose win probability is missing.
pub const EVEN_ODDS: f64 = 0.5;

/// One contest between two fantasy teams, as simulated by the odds service.
///
/// Numeric fields are `None` when the payload omitted them or sent something
/// that is not a number. Nothing here is range-checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub home_team: String,
    pub away_team: String,
    /// Mean simulated score
    pub home_avg: Option<f64>,
    pub away_avg: Option<f64>,
    /// 0.0–1.0
    pub home_win_prob: Option<f64>,
    pub away_win_prob: Option<f64>,
    pub tie_prob: Option<f64>,
    /// Simulation sample size (display only)
    pub trials: u64,
    pub home_team_url: String,
    pub away_team_url: String,
}

/// Identity of a matchup for tracking purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MatchupKey {
    pub home_team: String,
    pub away_team: String,
}

/// Which side of a matchup a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Home,
    Away,
}

/// Full point-in-time replacement of today's odds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OddsSnapshot {
    /// Opaque grouping label, e.g. "Week 7"
    pub date: String,
    pub is_live: bool,
    pub matchups: Vec<Matchup>,
    /// team → current model projection (live only)
    pub proj_scores: HashMap<String, f64>,
    /// team → in-progress score (live only)
    pub current_scores: HashMap<String, f64>,
    /// When this client received the snapshot
    pub fetched_at: DateTime<Utc>,
}

impl Matchup {
    pub fn key(&self) -> MatchupKey {
        MatchupKey {
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
        }
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    pub fn avg(&self, side: Side) -> Option<f64> {
        match side {
            Side::Home => self.home_avg,
            Side::Away => self.away_avg,
        }
    }

    pub fn win_prob(&self, side: Side) -> Option<f64> {
        match side {
            Side::Home => self.home_win_prob,
            Side::Away => self.away_win_prob,
        }
    }

    /// Win probability with missing values read as even odds.
    pub fn win_prob_or_even(&self, side: Side) -> f64 {
        self.win_prob(side).unwrap_or(EVEN_ODDS)
    }

    /// Either side has effectively already won.
    pub fn is_resolved(&self) -> bool {
        [Side::Home, Side::Away]
            .iter()
            .any(|&s| self.win_prob(s).is_some_and(|p| p >= RESOLVED_THRESHOLD))
    }

    /// Decode a matchup object without validating field presence.
    pub fn from_value(v: &Value) -> Matchup {
        Matchup {
            home_team: string_field(v, "home_team"),
            away_team: string_field(v, "away_team"),
            home_avg: number(&v["home_avg"]),
            away_avg: number(&v["away_avg"]),
            home_win_prob: probability(&v["home_win_prob"]),
            away_win_prob: probability(&v["away_win_prob"]),
            tie_prob: probability(&v["tie_prob"]),
            trials: number(&v["trials"])
                .filter(|t| *t >= 0.0)
                .map(|t| t as u64)
                .unwrap_or(0),
            home_team_url: string_field(v, "home_team_url"),
            away_team_url: string_field(v, "away_team_url"),
        }
    }
}

impl OddsSnapshot {
    /// Decode a `/odds/today` payload. Missing collections decode empty.
    pub fn from_value(v: &Value, fetched_at: DateTime<Utc>) -> OddsSnapshot {
        let matchups = v["matchups"]
            .as_array()
            .map(|items| items.iter().map(Matchup::from_value).collect())
            .unwrap_or_default();

        OddsSnapshot {
            date: string_field(v, "date"),
            is_live: v["is_live"].as_bool().unwrap_or(false),
            matchups,
            proj_scores: score_map(&v["proj_scores"]),
            current_scores: score_map(&v["current_scores"]),
            fetched_at,
        }
    }

    pub fn find(&self, key: &MatchupKey) -> Option<&Matchup> {
        self.matchups
            .iter()
            .find(|m| m.home_team == key.home_team && m.away_team == key.away_team)
    }
}

// ── Lenient field helpers ──────────────────────────────────────────────────────

/// Numbers may arrive as JSON numbers or numeric strings.
pub(crate) fn number(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|n: &f64| n.is_finite())
}

/// Probabilities must be JSON numbers; anything else reads as missing.
fn probability(v: &Value) -> Option<f64> {
    v.as_f64().filter(|p| p.is_finite())
}

fn string_field(v: &Value, field: &str) -> String {
    v[field].as_str().unwrap_or_default().to_string()
}

fn score_map(v: &Value) -> HashMap<String, f64> {
    v.as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(team, score)| Some((team.clone(), number(score)?)))
                .collect()
        })
        .unwrap_or_default()
}

//! First-observed baselines and live deltas per matchup.
//!
//! A baseline is captured the first time a matchup is seen and is never
//! recomputed while the matchup stays tracked. Every later observation is
//! compared against it, so a delta reads as "movement since you started
//! watching", not "movement since the last poll".

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::display::format_delta;
use crate::models::{Matchup, MatchupKey, OddsSnapshot, Side};

/// Live-only data that accompanies a matchup in a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct LiveContext<'a> {
    pub is_live: bool,
    pub current_scores: &'a HashMap<String, f64>,
    pub proj_scores: &'a HashMap<String, f64>,
}

impl<'a> LiveContext<'a> {
    pub fn from_snapshot(snapshot: &'a OddsSnapshot) -> Self {
        LiveContext {
            is_live: snapshot.is_live,
            current_scores: &snapshot.current_scores,
            proj_scores: &snapshot.proj_scores,
        }
    }
}

/// Reference values captured on first observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub home_score: f64,
    pub away_score: f64,
    pub home_win_prob: f64,
    pub away_win_prob: f64,
}

impl Baseline {
    fn capture(m: &Matchup, ctx: &LiveContext<'_>) -> Baseline {
        let score = |side: Side| {
            first_defined([ctx.proj_scores.get(m.team(side)).copied(), m.avg(side)])
                .unwrap_or(0.0)
        };
        Baseline {
            home_score: score(Side::Home),
            away_score: score(Side::Away),
            home_win_prob: m.win_prob_or_even(Side::Home),
            away_win_prob: m.win_prob_or_even(Side::Away),
        }
    }

    pub fn score(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    pub fn win_prob(&self, side: Side) -> f64 {
        match side {
            Side::Home => self.home_win_prob,
            Side::Away => self.away_win_prob,
        }
    }
}

/// Display values for one side of a tracked matchup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideView {
    pub team: String,
    /// Live score when reported, else the baseline score
    pub score: f64,
    /// In-progress score to show beside the team name (live and reported only)
    pub live_score: Option<f64>,
    pub win_prob: f64,
    /// `None` when the matchup is not live
    pub score_delta: Option<f64>,
    pub win_prob_delta: Option<f64>,
}

impl SideView {
    /// e.g. `" (+4.5)"`
    pub fn score_delta_text(&self) -> String {
        format_delta(self.score_delta, 1)
    }

    /// Percentage points, e.g. `" (+20.0)"` for a 0.2 move.
    pub fn win_prob_delta_text(&self) -> String {
        format_delta(self.win_prob_delta.map(|d| d * 100.0), 1)
    }
}

/// Everything a presentation layer needs to draw one matchup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupView {
    pub key: MatchupKey,
    pub home: SideView,
    pub away: SideView,
    pub is_live: bool,
    pub resolved: bool,
    pub show_live_indicator: bool,
}

/// Owns baselines for every matchup currently on screen.
#[derive(Debug, Default)]
pub struct DeltaTracker {
    baselines: HashMap<MatchupKey, Baseline>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation of `matchup` and return its view. Captures the
    /// baseline if this key has not been seen since it was last untracked.
    pub fn observe(&mut self, matchup: &Matchup, ctx: &LiveContext<'_>) -> MatchupView {
        let key = matchup.key();
        let baseline = *self.baselines.entry(key.clone()).or_insert_with(|| {
            let b = Baseline::capture(matchup, ctx);
            debug!(
                "Baseline captured for {} vs {}: {:?}",
                key.home_team, key.away_team, b
            );
            b
        });

        let resolved = matchup.is_resolved();
        MatchupView {
            home: side_view(matchup, ctx, &baseline, Side::Home),
            away: side_view(matchup, ctx, &baseline, Side::Away),
            is_live: ctx.is_live,
            resolved,
            show_live_indicator: ctx.is_live && !resolved,
            key,
        }
    }

    /// Observe every matchup in `snapshot`, in snapshot order.
    pub fn observe_snapshot(&mut self, snapshot: &OddsSnapshot) -> Vec<MatchupView> {
        let ctx = LiveContext::from_snapshot(snapshot);
        snapshot
            .matchups
            .iter()
            .map(|m| self.observe(m, &ctx))
            .collect()
    }

    pub fn baseline(&self, key: &MatchupKey) -> Option<&Baseline> {
        self.baselines.get(key)
    }

    pub fn is_tracking(&self, key: &MatchupKey) -> bool {
        self.baselines.contains_key(key)
    }

    /// Forget a matchup; its next observation captures a fresh baseline.
    pub fn untrack(&mut self, key: &MatchupKey) -> Option<Baseline> {
        self.baselines.remove(key)
    }

    /// Drop baselines for every key not in `keep`.
    pub fn retain_only<'k, I>(&mut self, keep: I)
    where
        I: IntoIterator<Item = &'k MatchupKey>,
    {
        let keep: HashSet<&MatchupKey> = keep.into_iter().collect();
        self.baselines.retain(|k, _| keep.contains(k));
    }

    pub fn clear(&mut self) {
        self.baselines.clear();
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }
}

fn side_view(m: &Matchup, ctx: &LiveContext<'_>, baseline: &Baseline, side: Side) -> SideView {
    let team = m.team(side);
    let live_score = if ctx.is_live {
        ctx.current_scores.get(team).copied()
    } else {
        None
    };
    let score = live_score.unwrap_or_else(|| baseline.score(side));
    let win_prob = m.win_prob_or_even(side);

    let (score_delta, win_prob_delta) = if ctx.is_live {
        (
            Some(score - baseline.score(side)),
            Some(win_prob - baseline.win_prob(side)),
        )
    } else {
        (None, None)
    };

    SideView {
        team: team.to_string(),
        score,
        live_score,
        win_prob,
        score_delta,
        win_prob_delta,
    }
}

/// First present value in priority order.
pub fn first_defined<I>(candidates: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    candidates.into_iter().flatten().next()
}

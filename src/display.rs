//! Pure formatting helpers shared by every matchup presentation.

use crate::models::{Matchup, Side};

/// Render a signed delta as `" (+3.2)"` / `" (-1.0)"`; absent deltas render
/// as the empty string so they can be appended unconditionally.
pub fn format_delta(value: Option<f64>, digits: usize) -> String {
    match value {
        None => String::new(),
        Some(v) if v >= 0.0 => format!(" (+{:.*})", digits, v),
        Some(v) => format!(" ({:.*})", digits, v),
    }
}

/// `0.613` → `"61.3%"`
pub fn format_percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Home is favored on ties.
pub fn favored_side(m: &Matchup) -> Side {
    if m.win_prob_or_even(Side::Home) >= m.win_prob_or_even(Side::Away) {
        Side::Home
    } else {
        Side::Away
    }
}

/// Absolute gap between the two projected averages.
pub fn projected_spread(m: &Matchup) -> f64 {
    (m.home_avg.unwrap_or(0.0) - m.away_avg.unwrap_or(0.0)).abs()
}

pub fn show_tie(m: &Matchup) -> bool {
    m.tie_prob.is_some_and(|t| t > 0.0)
}

/// Needle position and headline number for a win-probability gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReading {
    /// Home win probability clamped to [0, 1]
    pub position: f64,
    pub leader: Side,
    /// Leader's share, e.g. "75.0"
    pub percent: String,
}

pub fn gauge_reading(home_win_prob: f64) -> GaugeReading {
    let position = if home_win_prob.is_nan() {
        0.5
    } else {
        home_win_prob.clamp(0.0, 1.0)
    };
    let (leader, share) = if position >= 0.5 {
        (Side::Home, position)
    } else {
        (Side::Away, 1.0 - position)
    };
    GaugeReading {
        position,
        leader,
        percent: format!("{:.1}", share * 100.0),
    }
}

/// One-line summary, e.g. `"Taco Corp @ Gridiron Gang: Gridiron Gang by 14.3 (68.0%)"`.
pub fn headline(m: &Matchup) -> String {
    let favored = favored_side(m);
    format!(
        "{} @ {}: {} by {:.1} ({})",
        m.away_team,
        m.home_team,
        m.team(favored),
        projected_spread(m),
        format_percent(m.win_prob_or_even(favored))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_delta_positive() {
        assert_eq!(format_delta(Some(3.2), 1), " (+3.2)");
    }

    #[test]
    fn test_format_delta_negative_rounds() {
        assert_eq!(format_delta(Some(-1.04), 1), " (-1.0)");
    }

    #[test]
    fn test_format_delta_absent() {
        assert_eq!(format_delta(None, 1), "");
    }

    #[test]
    fn test_format_delta_zero_takes_plus_branch() {
        assert_eq!(format_delta(Some(0.0), 1), " (+0.0)");
    }

    #[test]
    fn test_format_delta_precision() {
        assert_eq!(format_delta(Some(12.0), 0), " (+12)");
        assert_eq!(format_delta(Some(-0.256), 2), " (-0.26)");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.613), "61.3%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_favored_and_spread() {
        let m = Matchup::from_value(&json!({
            "home_team": "H", "away_team": "A",
            "home_avg": 100.0, "away_avg": 110.5,
            "home_win_prob": 0.3, "away_win_prob": 0.7
        }));
        assert_eq!(favored_side(&m), Side::Away);
        assert!((projected_spread(&m) - 10.5).abs() < 1e-9);
        assert_eq!(headline(&m), "A @ H: A by 10.5 (70.0%)");
    }

    #[test]
    fn test_favored_tie_goes_home() {
        let m = Matchup::from_value(&json!({ "home_win_prob": 0.5, "away_win_prob": 0.5 }));
        assert_eq!(favored_side(&m), Side::Home);
    }

    #[test]
    fn test_show_tie() {
        let mut m = Matchup::from_value(&json!({ "tie_prob": 0.0 }));
        assert!(!show_tie(&m));
        m.tie_prob = Some(0.02);
        assert!(show_tie(&m));
    }

    #[test]
    fn test_gauge_reading() {
        let g = gauge_reading(0.75);
        assert_eq!(g.leader, Side::Home);
        assert_eq!(g.percent, "75.0");

        let g = gauge_reading(0.2);
        assert_eq!(g.leader, Side::Away);
        assert_eq!(g.percent, "80.0");

        let g = gauge_reading(1.4);
        assert_eq!(g.position, 1.0);
        assert_eq!(g.percent, "100.0");
    }
}

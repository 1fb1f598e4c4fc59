use anyhow::Result;
use clap::Parser;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use fantasy_odds::config::Config;
use fantasy_odds::display::{format_percent, headline, show_tie};
use fantasy_odds::odds::{start_polling, CustomQuery, HttpOddsSource};
use fantasy_odds::{DeltaTracker, MatchupView, OddsSnapshot};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let source = HttpOddsSource::new(&config.api_base_url, config.request_timeout())?;
    info!("Prediction service: {}", source.base_url());

    if let Some((team1, team2)) = config.custom_teams() {
        return run_custom(&source, team1, team2, config.trials.as_deref()).await;
    }

    let tracker = Arc::new(Mutex::new(DeltaTracker::new()));
    let handle = {
        let tracker = Arc::clone(&tracker);
        start_polling(
            Arc::new(source),
            config.poll_interval(),
            move |snapshot| {
                let mut tracker = tracker.lock().unwrap_or_else(|e| e.into_inner());
                log_snapshot(&mut tracker, &snapshot);
            },
            |message| warn!("Error loading odds: {} (showing last good data)", message),
        )
    };

    tokio::signal::ctrl_c().await?;
    handle.stop();
    info!("Shutting down");
    Ok(())
}

async fn run_custom(
    source: &HttpOddsSource,
    team1: &str,
    team2: &str,
    trials: Option<&str>,
) -> Result<()> {
    let query = CustomQuery::new(team1, team2, trials)?;
    let url = source.custom_matchup_url(&query.team_a, &query.team_b, query.trials)?;
    info!("Simulating {} vs {} ({} trials): {}", query.team_a, query.team_b, query.trials, url);

    let matchup = query.run(source).await?;
    info!("{}", headline(&matchup));
    info!(
        "Expected score {:.1} · {:.1}",
        matchup.home_avg.unwrap_or(0.0),
        matchup.away_avg.unwrap_or(0.0)
    );
    if show_tie(&matchup) {
        info!("Tie {}", format_percent(matchup.tie_prob.unwrap_or(0.0)));
    }
    Ok(())
}

fn log_snapshot(tracker: &mut DeltaTracker, snapshot: &OddsSnapshot) {
    let views = tracker.observe_snapshot(snapshot);
    tracker.retain_only(views.iter().map(|v| &v.key));

    info!(
        "{}: {} matchups{}",
        snapshot.date,
        views.len(),
        if snapshot.is_live { " (live)" } else { "" }
    );
    for view in &views {
        info!("{}", matchup_line(view));
    }
}

fn matchup_line(view: &MatchupView) -> String {
    let marker = if view.show_live_indicator { "● " } else { "" };
    format!(
        "{}{} {:.1}{} {}{} @ {} {:.1}{} {}{}",
        marker,
        view.away.team,
        view.away.score,
        view.away.score_delta_text(),
        format_percent(view.away.win_prob),
        view.away.win_prob_delta_text(),
        view.home.team,
        view.home.score,
        view.home.score_delta_text(),
        format_percent(view.home.win_prob),
        view.home.win_prob_delta_text(),
    )
}

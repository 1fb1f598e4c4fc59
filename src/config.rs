use clap::Parser;
use std::time::Duration;

use crate::odds::DEFAULT_API_BASE_URL;

/// Watch fantasy matchup odds and how they move while games are live
#[derive(Parser, Debug, Clone)]
#[command(name = "odds-watch", version, about)]
pub struct Config {
    /// Prediction service base URL
    #[arg(long, env = "ODDS_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Seconds between background refreshes of today's odds
    #[arg(long, env = "ODDS_POLL_INTERVAL_SECS", default_value = "300")]
    pub poll_interval_secs: u64,

    /// Per-request timeout in seconds (unset = no client-side deadline)
    #[arg(long, env = "ODDS_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// First team for a one-off custom matchup
    #[arg(long, env = "ODDS_TEAM1")]
    pub team1: Option<String>,

    /// Second team for a one-off custom matchup
    #[arg(long, env = "ODDS_TEAM2")]
    pub team2: Option<String>,

    /// Simulation trials for a custom matchup (default 20000)
    #[arg(long, env = "ODDS_TRIALS")]
    pub trials: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.api_base_url)
            .map_err(|e| anyhow::anyhow!("api_base_url is not a valid URL: {}", e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api_base_url must be http or https");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be positive");
        }
        if self.request_timeout_secs == Some(0) {
            anyhow::bail!("request_timeout_secs must be positive when set");
        }
        if self.team1.is_some() != self.team2.is_some() {
            anyhow::bail!("--team1 and --team2 must be given together");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Both teams, when a custom lookup was requested.
    pub fn custom_teams(&self) -> Option<(&str, &str)> {
        Some((self.team1.as_deref()?, self.team2.as_deref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("odds-watch").chain(args.iter().copied()))
            .expect("valid args")
    }

    #[test]
    fn test_defaults() {
        let c = parse(&[]);
        assert_eq!(c.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(c.poll_interval(), Duration::from_secs(300));
        assert_eq!(c.request_timeout(), None);
        assert!(c.custom_teams().is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_custom_teams_must_pair() {
        let c = parse(&["--team1", "Alpha"]);
        assert!(c.validate().is_err());

        let c = parse(&["--team1", "Alpha", "--team2", "Beta", "--trials", "500"]);
        assert!(c.validate().is_ok());
        assert_eq!(c.custom_teams(), Some(("Alpha", "Beta")));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&["--poll-interval-secs", "0"]).validate().is_err());
        assert!(parse(&["--request-timeout-secs", "0"]).validate().is_err());
        assert!(parse(&["--api-base-url", "ftp://odds"]).validate().is_err());
        assert!(parse(&["--api-base-url", "nope"]).validate().is_err());
    }
}

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Matchup, OddsSnapshot};

/// Trials requested for a custom matchup when the caller does not say.
pub const DEFAULT_TRIALS: u32 = 20_000;

/// Trait every odds backend must implement.
#[async_trait]
pub trait OddsApi: Send + Sync {
    /// Return today's full snapshot of matchups.
    async fn fetch_today_snapshot(&self) -> Result<OddsSnapshot>;

    /// Simulate an arbitrary pairing of two teams.
    async fn fetch_custom_matchup(&self, team_a: &str, team_b: &str, trials: u32)
        -> Result<Matchup>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

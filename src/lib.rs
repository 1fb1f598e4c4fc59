pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod odds;
pub mod tracker;

pub use error::{OddsError, Result};
pub use models::{Matchup, MatchupKey, OddsSnapshot, Side};
pub use odds::{start_polling, FeedState, HttpOddsSource, OddsApi, PollHandle};
pub use tracker::{DeltaTracker, LiveContext, MatchupView};

/// Errors surfaced by the odds client.
///
/// `Network` displays as the bare message so it can be shown to a user as-is
/// (a banner, a log line) without further formatting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OddsError {
    /// Transport failure or non-success HTTP status.
    #[error("{0}")]
    Network(String),

    /// The response body was not JSON at all.
    #[error("Failed to decode odds response: {0}")]
    Decode(String),

    /// Rejected custom-matchup input.
    #[error("{0}")]
    InvalidQuery(String),

    /// The HTTP client or request URL could not be built.
    #[error("Client setup failed: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, OddsError>;

impl From<reqwest::Error> for OddsError {
    fn from(e: reqwest::Error) -> Self {
        OddsError::Network(e.to_string())
    }
}

impl From<url::ParseError> for OddsError {
    fn from(e: url::ParseError) -> Self {
        OddsError::Client(e.to_string())
    }
}

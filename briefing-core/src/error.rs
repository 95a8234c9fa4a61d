//! Error taxonomy shared by every remote call in the crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Geocoding returned no match for the query.
    #[error("No location found for '{0}'")]
    NotFound(String),

    #[error("Rate limited by upstream provider (HTTP 429)")]
    RateLimited,

    #[error("Upstream request failed with status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// User-facing message for display in the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => {
                "City not found. Please check the spelling and try again.".to_string()
            }
            Self::RateLimited => "API rate limit exceeded. Please try again later.".to_string(),
            Self::Upstream { status, message } => format!("Error {status}: {message}"),
            Self::Network(_) => {
                "Failed to fetch data. Please check your internet connection.".to_string()
            }
            Self::Config(msg) => format!("Not configured: {msg}"),
            Self::InvalidResponse(_) => "The provider sent an unexpected response.".to_string(),
            Self::InvalidRequest(msg) => msg.clone(),
        }
    }

    /// Whether trying again later could succeed. Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Network(_))
    }
}

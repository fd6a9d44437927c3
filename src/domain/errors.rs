//! Domain Errors
//!
//! Every failure while resolving a location. These never escape the
//! resolver: they end up as the `error` field of a `LocationResult`.

use crate::domain::value_objects::ProviderKind;

/// Failure while resolving an IP through a provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{} error: {message}", .provider.label())]
    Transport {
        provider: ProviderKind,
        message: String,
    },

    #[error("{} error: request timed out", .provider.label())]
    Timeout { provider: ProviderKind },

    /// The provider answered but reported a failure (bad IP, quota, key).
    #[error("{} error: {message}", .provider.label())]
    Rejected {
        provider: ProviderKind,
        message: String,
    },

    #[error("{} error: API key required", .provider.label())]
    MissingCredential { provider: ProviderKind },

    #[error("{} error: location data not available", .provider.label())]
    MissingLocation { provider: ProviderKind },

    #[error("{} error: malformed response: {message}", .provider.label())]
    Malformed {
        provider: ProviderKind,
        message: String,
    },

    #[error("All providers failed")]
    Exhausted,
}

impl ProviderError {
    /// Provider the error originated from, if any.
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            Self::Transport { provider, .. }
            | Self::Timeout { provider }
            | Self::Rejected { provider, .. }
            | Self::MissingCredential { provider }
            | Self::MissingLocation { provider }
            | Self::Malformed { provider, .. } => Some(*provider),
            Self::UnknownProvider(_) | Self::Exhausted => None,
        }
    }
}

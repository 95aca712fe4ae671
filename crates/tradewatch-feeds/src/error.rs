//! Errors raised by feed sources.

/// Failure of a feed source or of a single inbound message.
///
/// [`FeedError::Decode`] is per-message and recoverable; every other variant
/// ends the subscription that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("stream endpoint returned HTTP {0}")]
    Status(u16),
    #[error("stream closed by server")]
    Closed,
    #[error("malformed payload: {0}")]
    Decode(String),
}

impl FeedError {
    /// True for errors that end a subscription.
    pub fn is_transport(&self) -> bool {
        !matches!(self, FeedError::Decode(_))
    }
}

use std::time::Duration;

/// Convenience result type used across meme-agent.
pub type MemeResult<T> = Result<T, MemeError>;

/// Top-level error taxonomy shared by the library and the HTTP layer.
#[derive(thiserror::Error, Debug)]
pub enum MemeError {
    /// Bad, missing, oversized or wrong-type user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Compositor input that cannot produce a meaningful frame sequence.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Caller exhausted its request budget for the current window.
    #[error("rate limit exceeded (resets in {}s)", retry_after.as_secs())]
    RateLimited {
        /// Time until the caller's window resets.
        retry_after: Duration,
    },

    /// A webhook or remote pipeline call failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Animated image encoding failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MemeError {
    /// Build a [`MemeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MemeError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`MemeError::RateLimited`] value.
    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    /// Build a [`MemeError::Upstream`] value.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Build a [`MemeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

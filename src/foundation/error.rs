/// Convenience result type used across hypemotion.
pub type MotionResult<T> = Result<T, MotionError>;

/// Top-level error taxonomy used by engine APIs.
///
/// None of these are fatal to the page: the orchestrator reports them as diagnostics and falls back
/// to making content visible.
#[derive(thiserror::Error, Debug)]
pub enum MotionError {
    /// Invalid configuration or page fixture data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The external animation engine could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Directive data on an element could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// A document operation referenced a missing or detached node.
    #[error("dom error: {0}")]
    Dom(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MotionError {
    /// Build a [`MotionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MotionError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`MotionError::Dom`] value.
    pub fn dom(msg: impl Into<String>) -> Self {
        Self::Dom(msg.into())
    }
}

/// Failure of one engine load sequence.
///
/// `Clone` because a single settled load is observed by every requester that joined it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A script fetch failed (network or evaluation).
    #[error("failed to load: {url}: {reason}")]
    Fetch {
        /// Script URL.
        url: String,
        /// Fetcher-provided reason.
        reason: String,
    },

    /// The core script finished but the engine is still not present.
    #[error("engine core missing after loading {url}")]
    CoreMissing {
        /// Script URL that was expected to define the core.
        url: String,
    },

    /// The scroll-trigger extension could not be registered with the engine.
    #[error("extension registration failed: {0}")]
    Register(String),

    /// The load was abandoned because the orchestrator was torn down.
    #[error("load cancelled by teardown")]
    Cancelled,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

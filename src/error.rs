use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Result alias for errors emitted by actor-clippy internals.
pub type ClippyResult<T> = Result<T, ActorClippyError>;

/// Structured error type for actor-clippy subsystems.
#[derive(Debug, Error)]
pub enum ActorClippyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The host requested that analysis of the current unit be abandoned.
    /// Findings collected for that unit so far must be discarded.
    #[error("analysis cancelled")]
    Cancelled,

    #[error("rule failure: {0}")]
    Rule(String),

    #[error("{0}")]
    Other(String),
}

impl ActorClippyError {
    pub fn rule(msg: impl Into<String>) -> Self {
        Self::Rule(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Convert to anyhow::Error for interop with anyhow-based code.
    pub fn into_anyhow(self) -> AnyhowError {
        AnyhowError::new(self)
    }
}

impl From<AnyhowError> for ActorClippyError {
    fn from(err: AnyhowError) -> Self {
        ActorClippyError::other(err.to_string())
    }
}

/// Convenience macro mirroring `anyhow::bail!` but returning ActorClippyError.
#[macro_export]
macro_rules! clippy_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::ActorClippyError::other(format!($($arg)*)));
    };
}

/// Convenience macro mirroring `anyhow::ensure!`.
#[macro_export]
macro_rules! clippy_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::clippy_bail!($($arg)*);
        }
    };
}

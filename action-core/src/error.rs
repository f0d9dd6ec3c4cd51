//! src/error.rs
//! ============================================================================
//! # `ActionError`: Unified Error Type for Action Dispatch
//!
//! Every fallible operation in the crate returns `ActionResult<T>`. Variants
//! are split into recoverable conditions (the caller is expected to swallow
//! them, e.g. `NotFound` during a teardown race) and programmer errors that
//! must surface immediately (`MissingDispatchCapability`, `UnresolvedTarget`).

use compact_str::CompactString;
use std::{io, path::PathBuf};
use thiserror::Error;

use crate::model::binding::ActionId;

/// Convenient alias carrying the unified error type
pub type ActionResult<T> = Result<T, ActionError>;

/// Unified error type for binding, resolution and dispatch.
#[derive(Debug, Error)]
pub enum ActionError {
    /// No live binding is registered under the token.
    #[error("No action registered for id {id}")]
    NotFound { id: ActionId },

    /// The receiver neither forwards actions nor has the named method.
    #[error("The action '{action}' did not exist on {receiver}")]
    MissingDispatchCapability {
        action: CompactString,
        receiver: CompactString,
    },

    /// The target could not be turned into a receiver at dispatch time.
    #[error("Action target '{path}' did not resolve to a receiver")]
    UnresolvedTarget { path: CompactString },

    /// Unknown modifier name in an allowed-keys list.
    #[error("Invalid allowed keys: {0}")]
    InvalidAllowedKeys(String),

    /// Jobs kept re-scheduling past the per-flush limit.
    #[error("Run loop flush exceeded {limit} jobs")]
    FlushOverflow { limit: usize },

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ActionError {
    /// Create a missing capability error
    pub fn missing_capability<S1, S2>(action: S1, receiver: S2) -> Self
    where
        S1: Into<CompactString>,
        S2: Into<CompactString>,
    {
        Self::MissingDispatchCapability {
            action: action.into(),
            receiver: receiver.into(),
        }
    }

    /// Create an unresolved target error
    pub fn unresolved_target<S: Into<CompactString>>(path: S) -> Self {
        Self::UnresolvedTarget { path: path.into() }
    }

    /// Whether dispatch may swallow this error without surfacing it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

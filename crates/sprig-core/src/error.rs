//! Error types for the sprig reconciliation engine

use thiserror::Error;

use crate::{FiberId, Generation};

/// Failure reported by a host tree mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {reason}")]
pub struct HostError {
    pub operation: &'static str,
    pub reason: String,
}

impl HostError {
    pub fn new(operation: &'static str, reason: impl Into<String>) -> Self {
        HostError {
            operation,
            reason: reason.into(),
        }
    }
}

/// Failure raised by a fallible function component
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ComponentError(pub String);

impl ComponentError {
    pub fn new(message: impl Into<String>) -> Self {
        ComponentError(message.into())
    }
}

/// Core sprig errors
#[derive(Error, Debug)]
pub enum SprigError {
    // Precondition errors
    #[error("Render requested while a render cycle is still in flight")]
    RenderInProgress,

    #[error("Invalid element type: {0:?}")]
    InvalidElementType(String),

    // Host errors
    #[error("Host mutation failed: {0}")]
    Host(#[from] HostError),

    // Component errors
    #[error("Component {name} failed: {source}")]
    Component {
        name: String,
        #[source]
        source: ComponentError,
    },

    // Linkage errors
    #[error("Fiber {0:?} is not in the arena")]
    DanglingFiber(FiberId),

    #[error("Alternate of fiber {fiber:?} expects generation {expected:?}, found {found:?}")]
    StaleAlternate {
        fiber: FiberId,
        expected: Generation,
        found: Option<Generation>,
    },

    #[error("Fiber {0:?} has no host-bearing ancestor")]
    NoContainer(FiberId),
}

impl SprigError {
    /// Is this a caller precondition violation (vs a runtime failure)?
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SprigError::RenderInProgress | SprigError::InvalidElementType(_)
        )
    }

    /// Is this a broken internal invariant of the fiber graph?
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SprigError::DanglingFiber(_)
                | SprigError::StaleAlternate { .. }
                | SprigError::NoContainer(_)
        )
    }
}

/// Result type for sprig operations
pub type SprigResult<T> = Result<T, SprigError>;

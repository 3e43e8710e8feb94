//! Unified error types for turn processing.
//!
//! [`TurnError`] is what every hook, every outbound call and the dispatcher
//! itself return. Adapter failures are folded into it through
//! [`AdapterError`] so that a hook can `?` an outbound send without any
//! conversion of its own.

use thiserror::Error;

/// Boxed error produced by caller-supplied hook logic.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Adapter Errors
// =============================================================================

/// Errors reported by a [`ChannelAdapter`](crate::ChannelAdapter).
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The channel connection is not available.
    #[error("channel is not connected")]
    NotConnected,

    /// Delivery of outbound activities failed.
    #[error("failed to send activities: {0}")]
    SendFailed(String),

    /// The channel does not support the requested operation.
    #[error("operation '{0}' is not supported by this channel")]
    NotSupported(&'static str),

    /// Internal adapter error.
    #[error("adapter error: {0}")]
    Internal(String),
}

impl AdapterError {
    /// Creates an internal adapter error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Creates a send failure.
    pub fn send_failed(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }
}

// =============================================================================
// Turn Errors
// =============================================================================

/// Errors that can occur while processing a turn.
///
/// `MissingActivity` and `MissingActivityType` are caller-contract
/// violations raised before any hook runs. Everything else originates in a
/// hook or in the channel adapter and reaches the caller as-is.
#[derive(Debug, Error)]
pub enum TurnError {
    /// The turn carries no inbound activity.
    #[error("turn has no activity")]
    MissingActivity,

    /// The inbound activity has no type tag.
    #[error("activity has no type")]
    MissingActivityType,

    /// The channel adapter rejected an outbound call.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// The turn was cancelled before the operation completed.
    #[error("turn was cancelled")]
    Cancelled,

    /// A hook failed with an arbitrary error.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl TurnError {
    /// Wraps an arbitrary hook failure.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// Returns `true` for the contract violations checked before dispatch.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::MissingActivity | Self::MissingActivityType)
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type for turn processing.
pub type TurnResult<T = ()> = Result<T, TurnError>;

//! # Parley Core
//!
//! The turn object and everything it is made of.
//!
//! - **Activity Schema**: [`Activity`], [`ChannelAccount`], [`ConversationReference`], ...
//! - **Turn Context**: [`TurnContext`], one inbound activity plus send/update/delete,
//!   interception hooks, the `responded` flag, [`TurnState`] and a cancellation token
//! - **Adapter Boundary**: [`ChannelAdapter`], the transport that delivers outbound calls
//! - **Memory Paths**: [`memory`], shorthand path aliases for state-store paths
//!
//! ```text
//! ┌─────────────┐  activity  ┌─────────────┐  send/update/delete  ┌────────────────┐
//! │  Transport  │──────────▶│ TurnContext │─────▶ hooks ─────────▶│ ChannelAdapter │
//! └─────────────┘            └─────────────┘                      └────────────────┘
//! ```

pub mod activity;
pub mod adapter;
pub mod error;
pub mod memory;
pub mod turn;

pub use activity::{
    Activity, ActivityType, Attachment, ChannelAccount, ConversationAccount,
    ConversationReference, InputHint, ResourceResponse, TRACE_TYPE,
};
pub use adapter::{BoxedAdapter, ChannelAdapter};
pub use error::{AdapterError, AdapterResult, BoxError, TurnError, TurnResult};
pub use turn::{
    DeleteActivityHook, DeleteNext, SendActivitiesHook, SendNext, TurnContext, TurnState,
    UpdateActivityHook, UpdateNext,
};

pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
pub mod prelude {
    pub use super::activity::*;
    pub use super::adapter::{BoxedAdapter, ChannelAdapter};
    pub use super::error::{AdapterError, AdapterResult, TurnError, TurnResult};
    pub use super::turn::{TurnContext, TurnState};
}

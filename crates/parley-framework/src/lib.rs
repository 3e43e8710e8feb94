//! # Parley Framework
//!
//! Activity dispatch and typed turn contexts.
//!
//! This layer provides:
//! - [`ActivityHandler`], one overridable hook per activity type, default no-op
//! - [`dispatch`], the classification state machine behind
//!   [`ActivityHandler::on_turn`]
//! - [`TypedTurn`], a view over a [`TurnContext`](parley_core::TurnContext)
//!   whose activity is narrowed to [`Message`] or [`ConversationUpdate`]
//!
//! The dispatcher has no logging and no error handling of its own: contract
//! violations are reported before any hook runs and hook errors are returned
//! unchanged.

pub mod dispatcher;
pub mod handler;
pub mod typed;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{dispatch, dispatch_membership, each_member_added, each_member_removed};
pub use handler::{ActivityHandler, BoxedHandler};
pub use typed::{
    ActivityKind, ConversationUpdate, ConversationUpdateActivity, Message, MessageActivity,
    TypedTurn,
};

//! Channel adapter boundary.
//!
//! A [`ChannelAdapter`] is the transport side of a turn: it delivers, edits
//! and retracts outbound activities. Hooks never call it directly; every
//! outbound call goes through the [`TurnContext`](crate::TurnContext), which
//! runs the registered interception callbacks first.

use std::sync::Arc;

use async_trait::async_trait;

use crate::activity::{Activity, ConversationReference, ResourceResponse};
use crate::error::{AdapterError, AdapterResult};
use crate::turn::TurnContext;

/// The transport-facing side of a turn.
///
/// Implementations can read the turn's cancellation token through
/// [`TurnContext::cancellation`] on every call.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Returns the channel name (e.g., "console", "webchat").
    fn name(&self) -> &str;

    /// Delivers a batch of outbound activities, in order.
    async fn send_activities(
        &self,
        turn: &TurnContext,
        activities: &[Activity],
    ) -> AdapterResult<Vec<ResourceResponse>>;

    /// Replaces a previously delivered activity.
    async fn update_activity(
        &self,
        _turn: &TurnContext,
        _activity: &Activity,
    ) -> AdapterResult<ResourceResponse> {
        Err(AdapterError::NotSupported("update_activity"))
    }

    /// Retracts a previously delivered activity.
    async fn delete_activity(
        &self,
        _turn: &TurnContext,
        _reference: &ConversationReference,
    ) -> AdapterResult<()> {
        Err(AdapterError::NotSupported("delete_activity"))
    }
}

/// A shared, type-erased channel adapter.
pub type BoxedAdapter = Arc<dyn ChannelAdapter>;

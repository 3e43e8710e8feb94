//! Interception callbacks for outbound calls.
//!
//! Hooks registered on a [`TurnContext`] wrap every send, update and delete
//! made during the turn. They run in registration order, each receiving a
//! `next` continuation that invokes the rest of the chain (and finally the
//! channel adapter). A hook may rewrite the payload before calling `next`,
//! inspect the result afterwards, or skip `next` entirely to suppress the
//! call.
//!
//! ```rust,ignore
//! struct Stamp;
//!
//! #[async_trait]
//! impl SendActivitiesHook for Stamp {
//!     async fn on_send_activities<'a>(
//!         &self,
//!         _turn: &'a TurnContext,
//!         mut activities: Vec<Activity>,
//!         next: SendNext<'a>,
//!     ) -> TurnResult<Vec<ResourceResponse>> {
//!         for activity in &mut activities {
//!             activity.name = Some("stamped".into());
//!         }
//!         next(activities).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::activity::{Activity, ConversationReference, ResourceResponse};
use crate::error::TurnResult;
use crate::turn::TurnContext;

/// Continuation for the remainder of a send chain.
pub type SendNext<'a> = Box<
    dyn FnOnce(Vec<Activity>) -> BoxFuture<'a, TurnResult<Vec<ResourceResponse>>> + Send + 'a,
>;

/// Continuation for the remainder of an update chain.
pub type UpdateNext<'a> =
    Box<dyn FnOnce(Activity) -> BoxFuture<'a, TurnResult<ResourceResponse>> + Send + 'a>;

/// Continuation for the remainder of a delete chain.
pub type DeleteNext<'a> =
    Box<dyn FnOnce(ConversationReference) -> BoxFuture<'a, TurnResult<()>> + Send + 'a>;

/// Intercepts outbound sends.
#[async_trait]
pub trait SendActivitiesHook: Send + Sync {
    async fn on_send_activities<'a>(
        &self,
        turn: &'a TurnContext,
        activities: Vec<Activity>,
        next: SendNext<'a>,
    ) -> TurnResult<Vec<ResourceResponse>>;
}

/// Intercepts updates of delivered activities.
#[async_trait]
pub trait UpdateActivityHook: Send + Sync {
    async fn on_update_activity<'a>(
        &self,
        turn: &'a TurnContext,
        activity: Activity,
        next: UpdateNext<'a>,
    ) -> TurnResult<ResourceResponse>;
}

/// Intercepts deletes of delivered activities.
#[async_trait]
pub trait DeleteActivityHook: Send + Sync {
    async fn on_delete_activity<'a>(
        &self,
        turn: &'a TurnContext,
        reference: ConversationReference,
        next: DeleteNext<'a>,
    ) -> TurnResult<()>;
}

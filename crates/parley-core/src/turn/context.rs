//! The per-turn context object.
//!
//! One [`TurnContext`] is created by the transport for each inbound
//! activity. It owns the activity, the turn state and the `responded` flag,
//! and it is the only path to the channel adapter: every send, update and
//! delete runs through the interception hooks registered on it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::activity::{Activity, ActivityType, ConversationReference, InputHint, ResourceResponse};
use crate::adapter::BoxedAdapter;
use crate::error::TurnResult;
use crate::turn::hooks::{
    DeleteActivityHook, DeleteNext, SendActivitiesHook, SendNext, UpdateActivityHook, UpdateNext,
};
use crate::turn::state::TurnState;

/// One inbound activity plus its response capabilities.
///
/// # Thread Safety
///
/// `TurnContext` is `Send + Sync`. Hooks for one turn run sequentially, but
/// the context may be shared by reference with any task that needs to send
/// on its behalf.
pub struct TurnContext {
    adapter: BoxedAdapter,
    activity: Option<Activity>,
    /// Set once the adapter accepts a batch containing a non-trace activity.
    responded: AtomicBool,
    state: TurnState,
    cancellation: CancellationToken,
    send_hooks: RwLock<Vec<Arc<dyn SendActivitiesHook>>>,
    update_hooks: RwLock<Vec<Arc<dyn UpdateActivityHook>>>,
    delete_hooks: RwLock<Vec<Arc<dyn DeleteActivityHook>>>,
}

impl TurnContext {
    /// Creates a turn for `activity`, delivering responses through `adapter`.
    ///
    /// A turn without an activity can be built, but dispatching it is a
    /// contract violation.
    pub fn new(adapter: BoxedAdapter, activity: impl Into<Option<Activity>>) -> Self {
        Self {
            adapter,
            activity: activity.into(),
            responded: AtomicBool::new(false),
            state: TurnState::new(),
            cancellation: CancellationToken::new(),
            send_hooks: RwLock::new(Vec::new()),
            update_hooks: RwLock::new(Vec::new()),
            delete_hooks: RwLock::new(Vec::new()),
        }
    }

    /// Replaces the turn's cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    // ─── Accessors ────────────────────────────────────────────────────────────

    /// Returns the inbound activity.
    pub fn activity(&self) -> Option<&Activity> {
        self.activity.as_ref()
    }

    /// Returns the channel adapter.
    pub fn adapter(&self) -> &BoxedAdapter {
        &self.adapter
    }

    /// Returns `true` once a non-trace activity has been delivered.
    pub fn responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    /// Returns the turn state shared by every hook of this turn.
    pub fn turn_state(&self) -> &TurnState {
        &self.state
    }

    /// Returns the cancellation token accompanying this turn.
    ///
    /// Nothing in the dispatch path acts on it; it is handed through so that
    /// hooks and adapters can.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns `true` if the turn has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    // ─── Hook registration ────────────────────────────────────────────────────

    /// Registers a hook around every outbound send of this turn.
    pub fn on_send_activities(&self, hook: impl SendActivitiesHook + 'static) -> &Self {
        self.send_hooks.write().push(Arc::new(hook));
        self
    }

    /// Registers a hook around every update of this turn.
    pub fn on_update_activity(&self, hook: impl UpdateActivityHook + 'static) -> &Self {
        self.update_hooks.write().push(Arc::new(hook));
        self
    }

    /// Registers a hook around every delete of this turn.
    pub fn on_delete_activity(&self, hook: impl DeleteActivityHook + 'static) -> &Self {
        self.delete_hooks.write().push(Arc::new(hook));
        self
    }

    // ─── Outbound ─────────────────────────────────────────────────────────────

    /// Sends a plain text message as a reply.
    pub async fn send_text(&self, text: impl Into<String>) -> TurnResult<ResourceResponse> {
        self.send_text_with(text, None, InputHint::AcceptingInput).await
    }

    /// Sends a text message with speech markup and an input hint.
    pub async fn send_text_with(
        &self,
        text: impl Into<String>,
        speak: Option<String>,
        input_hint: InputHint,
    ) -> TurnResult<ResourceResponse> {
        let mut activity = Activity::message(text);
        activity.speak = speak;
        activity.input_hint = Some(input_hint);
        self.send_activity(activity).await
    }

    /// Sends a single activity.
    ///
    /// Returns an empty [`ResourceResponse`] if a hook suppressed the send.
    pub async fn send_activity(&self, activity: Activity) -> TurnResult<ResourceResponse> {
        let responses = self.send_activities(vec![activity]).await?;
        Ok(responses.into_iter().next().unwrap_or_default())
    }

    /// Sends a batch of activities in order.
    ///
    /// Untagged activities become messages, and every activity is addressed
    /// as a reply to the inbound activity before the hooks see it.
    pub async fn send_activities(
        &self,
        activities: Vec<Activity>,
    ) -> TurnResult<Vec<ResourceResponse>> {
        let reference = self.activity.as_ref().map(Activity::conversation_reference);
        let outgoing = activities
            .into_iter()
            .map(|mut activity| {
                if activity.activity_type.is_none() {
                    activity.activity_type = ActivityType::Message.as_tag().map(str::to_string);
                }
                if let Some(reference) = &reference {
                    activity.apply_conversation_reference(reference);
                }
                activity
            })
            .collect();

        let hooks = self.send_hooks.read().clone();
        self.send_through(&hooks, outgoing).await
    }

    /// Replaces a previously sent activity. `activity.id` selects the target.
    pub async fn update_activity(&self, mut activity: Activity) -> TurnResult<ResourceResponse> {
        if let Some(inbound) = &self.activity {
            activity.apply_conversation_reference(&inbound.conversation_reference());
        }

        let hooks = self.update_hooks.read().clone();
        self.update_through(&hooks, activity).await
    }

    /// Deletes a previously sent activity.
    pub async fn delete_activity(&self, activity_id: impl Into<String>) -> TurnResult<()> {
        let mut reference = self
            .activity
            .as_ref()
            .map(Activity::conversation_reference)
            .unwrap_or_default();
        reference.activity_id = Some(activity_id.into());

        let hooks = self.delete_hooks.read().clone();
        self.delete_through(&hooks, reference).await
    }

    // ─── Chains ───────────────────────────────────────────────────────────────

    fn send_through<'a>(
        &'a self,
        hooks: &'a [Arc<dyn SendActivitiesHook>],
        activities: Vec<Activity>,
    ) -> BoxFuture<'a, TurnResult<Vec<ResourceResponse>>> {
        match hooks.split_first() {
            Some((hook, rest)) => {
                let next: SendNext<'a> =
                    Box::new(move |activities| self.send_through(rest, activities));
                hook.on_send_activities(self, activities, next)
            }
            None => Box::pin(self.deliver(activities)),
        }
    }

    fn update_through<'a>(
        &'a self,
        hooks: &'a [Arc<dyn UpdateActivityHook>],
        activity: Activity,
    ) -> BoxFuture<'a, TurnResult<ResourceResponse>> {
        match hooks.split_first() {
            Some((hook, rest)) => {
                let next: UpdateNext<'a> =
                    Box::new(move |activity| self.update_through(rest, activity));
                hook.on_update_activity(self, activity, next)
            }
            None => Box::pin(self.apply_update(activity)),
        }
    }

    fn delete_through<'a>(
        &'a self,
        hooks: &'a [Arc<dyn DeleteActivityHook>],
        reference: ConversationReference,
    ) -> BoxFuture<'a, TurnResult<()>> {
        match hooks.split_first() {
            Some((hook, rest)) => {
                let next: DeleteNext<'a> =
                    Box::new(move |reference| self.delete_through(rest, reference));
                hook.on_delete_activity(self, reference, next)
            }
            None => Box::pin(self.apply_delete(reference)),
        }
    }

    async fn deliver(&self, activities: Vec<Activity>) -> TurnResult<Vec<ResourceResponse>> {
        if activities.is_empty() {
            return Ok(Vec::new());
        }

        let responses = self.adapter.send_activities(self, &activities).await?;
        if activities.iter().any(|a| !a.is_trace()) {
            self.responded.store(true, Ordering::SeqCst);
        }

        trace!(
            channel = self.adapter.name(),
            count = activities.len(),
            "Activities delivered"
        );
        Ok(responses)
    }

    async fn apply_update(&self, activity: Activity) -> TurnResult<ResourceResponse> {
        let response = self.adapter.update_activity(self, &activity).await?;
        trace!(channel = self.adapter.name(), "Activity updated");
        Ok(response)
    }

    async fn apply_delete(&self, reference: ConversationReference) -> TurnResult<()> {
        self.adapter.delete_activity(self, &reference).await?;
        trace!(channel = self.adapter.name(), "Activity deleted");
        Ok(())
    }
}

impl std::fmt::Debug for TurnContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnContext")
            .field("channel", &self.adapter.name())
            .field("activity", &self.activity)
            .field("responded", &self.responded())
            .field("is_cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

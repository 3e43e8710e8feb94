//! Test doubles shared by the unit tests of this crate.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use parley_core::{
    Activity, AdapterResult, ChannelAccount, ChannelAdapter, ConversationReference,
    ResourceResponse, TurnContext, TurnError, TurnResult,
};

use crate::dispatcher;
use crate::handler::ActivityHandler;
use crate::typed::{ConversationUpdate, Message, TypedTurn};

/// Outbound calls observed by [`RecordingAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Send(Vec<Activity>),
    Update(Activity),
    Delete(ConversationReference),
}

#[derive(Default)]
pub struct RecordingAdapter {
    outbound: Mutex<Vec<Outbound>>,
}

impl RecordingAdapter {
    pub fn outbound(&self) -> Vec<Outbound> {
        self.outbound.lock().clone()
    }
}

#[async_trait]
impl ChannelAdapter for RecordingAdapter {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send_activities(
        &self,
        _turn: &TurnContext,
        activities: &[Activity],
    ) -> AdapterResult<Vec<ResourceResponse>> {
        let mut outbound = self.outbound.lock();
        outbound.push(Outbound::Send(activities.to_vec()));
        Ok((0..activities.len())
            .map(|i| ResourceResponse::new(format!("{}-{i}", outbound.len())))
            .collect())
    }

    async fn update_activity(
        &self,
        _turn: &TurnContext,
        activity: &Activity,
    ) -> AdapterResult<ResourceResponse> {
        self.outbound.lock().push(Outbound::Update(activity.clone()));
        Ok(ResourceResponse::new(activity.id.clone().unwrap_or_default()))
    }

    async fn delete_activity(
        &self,
        _turn: &TurnContext,
        reference: &ConversationReference,
    ) -> AdapterResult<()> {
        self.outbound.lock().push(Outbound::Delete(reference.clone()));
        Ok(())
    }
}

/// Builds a turn over a fresh [`RecordingAdapter`].
pub fn turn(activity: impl Into<Option<Activity>>) -> (TurnContext, Arc<RecordingAdapter>) {
    let adapter = Arc::new(RecordingAdapter::default());
    (TurnContext::new(adapter.clone(), activity), adapter)
}

/// Hook invocations observed by [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Message(String),
    ConversationUpdate,
    MembersAdded(usize),
    MembersRemoved(usize),
    MemberAdded(String),
    MemberRemoved(String),
    SystemNotification,
    DeleteUserData,
    ContactRelationUpdate,
    Unrecognized,
}

/// Records every hook it sees while keeping the default routing.
#[derive(Default)]
pub struct RecordingHandler {
    calls: Mutex<Vec<Call>>,
    fail_on: Option<String>,
}

impl RecordingHandler {
    /// A handler whose `on_member_added` fails for the given member id.
    pub fn failing_on(id: &str) -> Self {
        Self {
            fail_on: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ActivityHandler for RecordingHandler {
    async fn on_message_activity(&self, turn: TypedTurn<'_, Message>) -> TurnResult {
        self.record(Call::Message(turn.activity().text().to_string()));
        Ok(())
    }

    async fn on_conversation_update_activity(
        &self,
        turn: TypedTurn<'_, ConversationUpdate>,
    ) -> TurnResult {
        self.record(Call::ConversationUpdate);
        dispatcher::dispatch_membership(self, turn).await
    }

    async fn on_members_added(
        &self,
        members_added: &[ChannelAccount],
        turn: TypedTurn<'_, ConversationUpdate>,
    ) -> TurnResult {
        self.record(Call::MembersAdded(members_added.len()));
        dispatcher::each_member_added(self, members_added, turn).await
    }

    async fn on_members_removed(
        &self,
        members_removed: &[ChannelAccount],
        turn: TypedTurn<'_, ConversationUpdate>,
    ) -> TurnResult {
        self.record(Call::MembersRemoved(members_removed.len()));
        dispatcher::each_member_removed(self, members_removed, turn).await
    }

    async fn on_member_added(&self, member: &ChannelAccount, _turn: &TurnContext) -> TurnResult {
        self.record(Call::MemberAdded(member.id.clone()));
        if self.fail_on.as_deref() == Some(member.id.as_str()) {
            return Err(TurnError::handler(format!("refusing {}", member.id)));
        }
        Ok(())
    }

    async fn on_member_removed(&self, member: &ChannelAccount, _turn: &TurnContext) -> TurnResult {
        self.record(Call::MemberRemoved(member.id.clone()));
        Ok(())
    }

    async fn on_system_notification(&self, _turn: &TurnContext) -> TurnResult {
        self.record(Call::SystemNotification);
        Ok(())
    }

    async fn on_delete_user_data(&self, _turn: &TurnContext) -> TurnResult {
        self.record(Call::DeleteUserData);
        Ok(())
    }

    async fn on_contact_relation_update(&self, _turn: &TurnContext) -> TurnResult {
        self.record(Call::ContactRelationUpdate);
        Ok(())
    }

    async fn on_unrecognized_activity(&self, _turn: &TurnContext) -> TurnResult {
        self.record(Call::Unrecognized);
        Ok(())
    }
}

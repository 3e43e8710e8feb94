//! End-to-end turns through the runtime, dispatcher and turn context.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use parley::framework::dispatch;
use parley::prelude::*;

#[derive(Default)]
struct MemoryChannel {
    sent: Mutex<Vec<Activity>>,
}

impl MemoryChannel {
    fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|a| a.text.clone())
            .collect()
    }
}

#[async_trait]
impl ChannelAdapter for MemoryChannel {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send_activities(
        &self,
        _turn: &TurnContext,
        activities: &[Activity],
    ) -> AdapterResult<Vec<ResourceResponse>> {
        let mut sent = self.sent.lock();
        let mut responses = Vec::with_capacity(activities.len());
        for activity in activities {
            sent.push(activity.clone());
            responses.push(ResourceResponse::new(format!("out-{}", sent.len())));
        }
        Ok(responses)
    }
}

struct Greeter;

#[async_trait]
impl ActivityHandler for Greeter {
    async fn on_message_activity(&self, turn: TypedTurn<'_, Message>) -> TurnResult {
        let text = turn.activity().text();
        turn.send_text(format!("You said: {text}")).await?;
        Ok(())
    }

    async fn on_member_added(&self, member: &ChannelAccount, turn: &TurnContext) -> TurnResult {
        turn.send_text(format!("Welcome, {}!", member.display_name())).await?;
        Ok(())
    }
}

/// Upper-cases every outgoing message.
struct Shout;

#[async_trait]
impl SendActivitiesHook for Shout {
    async fn on_send_activities<'a>(
        &self,
        _turn: &'a TurnContext,
        mut activities: Vec<Activity>,
        next: SendNext<'a>,
    ) -> TurnResult<Vec<ResourceResponse>> {
        for activity in &mut activities {
            activity.text = activity.text.take().map(|t| t.to_uppercase());
        }
        next(activities).await
    }
}

/// Drops every outgoing activity.
struct Mute;

#[async_trait]
impl SendActivitiesHook for Mute {
    async fn on_send_activities<'a>(
        &self,
        _turn: &'a TurnContext,
        _activities: Vec<Activity>,
        _next: SendNext<'a>,
    ) -> TurnResult<Vec<ResourceResponse>> {
        Ok(Vec::new())
    }
}

/// Registers turn-scoped hooks, then dispatches as usual.
struct Hooked<H> {
    inner: Greeter,
    hook: fn() -> H,
}

#[async_trait]
impl<H: SendActivitiesHook + 'static> ActivityHandler for Hooked<H> {
    async fn on_turn(&self, turn: &TurnContext) -> TurnResult {
        turn.on_send_activities((self.hook)());
        dispatch(self, turn).await
    }

    async fn on_message_activity(&self, turn: TypedTurn<'_, Message>) -> TurnResult {
        self.inner.on_message_activity(turn).await
    }
}

fn runtime(handler: BoxedHandler) -> (ParleyRuntime, Arc<MemoryChannel>) {
    let channel = Arc::new(MemoryChannel::default());
    let runtime = ParleyRuntime::builder()
        .shared_adapter(channel.clone())
        .shared_handler(handler)
        .config(ParleyConfig::default())
        .without_logging()
        .build()
        .unwrap();
    (runtime, channel)
}

fn from_user(activity: Activity) -> Activity {
    activity
        .with_id("in-1")
        .with_channel_id("memory")
        .with_from(ChannelAccount::new("u1").with_name("Ada"))
        .with_recipient(ChannelAccount::new("agent").with_name("Parley"))
        .with_conversation(ConversationAccount::new("c1"))
}

#[tokio::test]
async fn test_greets_new_members_then_echoes() {
    let (runtime, channel) = runtime(Arc::new(Greeter));

    let joined = from_user(Activity::of(ActivityType::ConversationUpdate)).with_members_added(
        vec![
            ChannelAccount::new("agent"),
            ChannelAccount::new("u1").with_name("Ada"),
        ],
    );
    runtime.process_activity(joined).await.unwrap();
    runtime
        .process_activity(from_user(Activity::message("hello")))
        .await
        .unwrap();

    assert_eq!(channel.texts(), vec!["Welcome, Ada!", "You said: hello"]);

    let sent = channel.sent.lock();
    let reply = &sent[1];
    assert_eq!(reply.kind(), Some(ActivityType::Message));
    assert_eq!(reply.reply_to_id.as_deref(), Some("in-1"));
    assert_eq!(reply.recipient_id(), Some("u1"));
    assert_eq!(reply.from.as_ref().map(|a| a.id.as_str()), Some("agent"));
    assert_eq!(reply.conversation.as_ref().map(|c| c.id.as_str()), Some("c1"));
}

#[tokio::test]
async fn test_turn_hooks_wrap_handler_sends() {
    let handler = Hooked {
        inner: Greeter,
        hook: || Shout,
    };
    let (runtime, channel) = runtime(Arc::new(handler));

    runtime
        .process_activity(from_user(Activity::message("quiet please")))
        .await
        .unwrap();

    assert_eq!(channel.texts(), vec!["YOU SAID: QUIET PLEASE"]);
}

#[tokio::test]
async fn test_suppressing_hook_leaves_turn_unanswered() {
    let handler = Hooked {
        inner: Greeter,
        hook: || Mute,
    };
    let (runtime, channel) = runtime(Arc::new(handler));

    runtime
        .process_activity(from_user(Activity::message("anyone?")))
        .await
        .unwrap();

    assert!(channel.sent.lock().is_empty());
}

#[tokio::test]
async fn test_untyped_activity_is_rejected() {
    let (runtime, channel) = runtime(Arc::new(Greeter));

    let err = runtime
        .process_activity(from_user(Activity::default().with_text("no tag")))
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::MissingActivityType));
    assert!(err.is_contract_violation());
    assert!(channel.sent.lock().is_empty());
}

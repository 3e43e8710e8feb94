//! Typed turn contexts.
//!
//! A [`TypedTurn<K>`] is a non-owning view over a [`TurnContext`] whose
//! `activity()` accessor is narrowed to the activity kind `K`. Everything else
//! (sending, updating, deleting, registering hooks, the `responded` flag,
//! turn state and cancellation) is reached through `Deref` on the very same
//! turn object, so changes made through any view are visible through all of
//! them.
//!
//! Typed turns are only built by the dispatcher, and only after it has
//! matched the activity's tag against `K`:
//!
//! ```rust,ignore
//! #[async_trait]
//! impl ActivityHandler for EchoBot {
//!     async fn on_message_activity(&self, turn: TypedTurn<'_, Message>) -> TurnResult {
//!         let text = turn.activity().text();
//!         turn.send_text(format!("you said: {text}")).await?;
//!         Ok(())
//!     }
//! }
//! ```

use std::marker::PhantomData;
use std::ops::Deref;

use parley_core::{Activity, ActivityType, Attachment, ChannelAccount, InputHint, TurnContext};

mod sealed {
    use parley_core::Activity;

    pub trait Sealed {
        type Payload<'a>: Copy;

        /// Trusted narrowing; callers must have matched the tag already.
        fn narrow(activity: &Activity) -> Self::Payload<'_>;
    }
}

/// An activity kind a [`TypedTurn`] can be narrowed to.
///
/// This trait is sealed; the kinds are [`Message`] and [`ConversationUpdate`].
pub trait ActivityKind: sealed::Sealed + Send + Sync + 'static {
    /// The activity type this kind is bound to.
    const TYPE: ActivityType;
}

// =============================================================================
// Kinds
// =============================================================================

/// Kind marker for `message` activities.
#[derive(Debug, Clone, Copy)]
pub enum Message {}

/// Kind marker for `conversationUpdate` activities.
#[derive(Debug, Clone, Copy)]
pub enum ConversationUpdate {}

impl sealed::Sealed for Message {
    type Payload<'a> = MessageActivity<'a>;

    fn narrow(activity: &Activity) -> MessageActivity<'_> {
        MessageActivity { activity }
    }
}

impl ActivityKind for Message {
    const TYPE: ActivityType = ActivityType::Message;
}

impl sealed::Sealed for ConversationUpdate {
    type Payload<'a> = ConversationUpdateActivity<'a>;

    fn narrow(activity: &Activity) -> ConversationUpdateActivity<'_> {
        ConversationUpdateActivity { activity }
    }
}

impl ActivityKind for ConversationUpdate {
    const TYPE: ActivityType = ActivityType::ConversationUpdate;
}

// =============================================================================
// Payload views
// =============================================================================

/// A `message` activity.
#[derive(Debug, Clone, Copy)]
pub struct MessageActivity<'a> {
    activity: &'a Activity,
}

impl<'a> MessageActivity<'a> {
    /// The message text, empty if the channel sent none.
    pub fn text(&self) -> &'a str {
        self.activity.text.as_deref().unwrap_or_default()
    }

    pub fn speak(&self) -> Option<&'a str> {
        self.activity.speak.as_deref()
    }

    pub fn input_hint(&self) -> Option<InputHint> {
        self.activity.input_hint
    }

    pub fn attachments(&self) -> &'a [Attachment] {
        &self.activity.attachments
    }

    pub fn from(&self) -> Option<&'a ChannelAccount> {
        self.activity.from.as_ref()
    }

    /// The underlying activity, the same object the turn holds.
    pub fn as_activity(&self) -> &'a Activity {
        self.activity
    }
}

impl Deref for MessageActivity<'_> {
    type Target = Activity;

    fn deref(&self) -> &Self::Target {
        self.activity
    }
}

/// A `conversationUpdate` activity.
#[derive(Debug, Clone, Copy)]
pub struct ConversationUpdateActivity<'a> {
    activity: &'a Activity,
}

impl<'a> ConversationUpdateActivity<'a> {
    /// Members that joined, in channel order. Empty if none.
    pub fn members_added(&self) -> &'a [ChannelAccount] {
        self.activity.members_added.as_deref().unwrap_or_default()
    }

    /// Members that left, in channel order. Empty if none.
    pub fn members_removed(&self) -> &'a [ChannelAccount] {
        self.activity.members_removed.as_deref().unwrap_or_default()
    }

    /// The agent's own account.
    pub fn recipient(&self) -> Option<&'a ChannelAccount> {
        self.activity.recipient.as_ref()
    }

    /// The underlying activity, the same object the turn holds.
    pub fn as_activity(&self) -> &'a Activity {
        self.activity
    }
}

impl Deref for ConversationUpdateActivity<'_> {
    type Target = Activity;

    fn deref(&self) -> &Self::Target {
        self.activity
    }
}

// =============================================================================
// TypedTurn
// =============================================================================

/// A turn whose activity is known to be of kind `K`.
pub struct TypedTurn<'a, K: ActivityKind> {
    turn: &'a TurnContext,
    activity: &'a Activity,
    _kind: PhantomData<fn() -> K>,
}

impl<'a, K: ActivityKind> TypedTurn<'a, K> {
    /// Binds `turn` to kind `K`.
    ///
    /// `activity` must be the turn's own activity and its tag must classify
    /// as `K::TYPE`.
    pub(crate) fn new(turn: &'a TurnContext, activity: &'a Activity) -> Self {
        debug_assert_eq!(activity.kind(), Some(K::TYPE));
        Self {
            turn,
            activity,
            _kind: PhantomData,
        }
    }

    /// The narrowed activity.
    pub fn activity(&self) -> K::Payload<'a> {
        K::narrow(self.activity)
    }

    /// The untyped turn this view wraps.
    pub fn turn(&self) -> &'a TurnContext {
        self.turn
    }
}

impl<K: ActivityKind> Clone for TypedTurn<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: ActivityKind> Copy for TypedTurn<'_, K> {}

impl<K: ActivityKind> Deref for TypedTurn<'_, K> {
    type Target = TurnContext;

    fn deref(&self) -> &Self::Target {
        self.turn
    }
}

impl<K: ActivityKind> std::fmt::Debug for TypedTurn<'_, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedTurn")
            .field("kind", &K::TYPE)
            .field("turn", self.turn)
            .finish()
    }
}

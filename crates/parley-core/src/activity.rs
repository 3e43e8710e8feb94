//! Activity schema.
//!
//! An [`Activity`] is the single inbound (or outbound) event of a turn. Its
//! `type` tag selects the dispatch route; the remaining fields are only
//! meaningful for some tags, e.g. `members_added`/`members_removed` for
//! conversation updates.
//!
//! ```rust,ignore
//! use parley_core::{Activity, ActivityType, ChannelAccount};
//!
//! let activity = Activity::message("hi")
//!     .with_from(ChannelAccount::new("alice"))
//!     .with_recipient(ChannelAccount::new("bot"));
//!
//! assert_eq!(activity.kind(), Some(ActivityType::Message));
//! ```

use std::convert::Infallible;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Activity Type Classification
// ============================================================================

/// Classification of activity type tags.
///
/// The set is closed: any tag outside it maps to [`ActivityType::Unrecognized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    /// A conversational message.
    Message,
    /// Conversation state changed, e.g. members joined or left.
    ConversationUpdate,
    /// A notification raised by the channel itself.
    SystemNotification,
    /// The user asked for their data to be deleted.
    DeleteUserData,
    /// The agent was added to or removed from a contact list.
    ContactRelationUpdate,
    /// Any other tag.
    Unrecognized,
}

impl ActivityType {
    /// Returns the wire tag for this type, or `None` for `Unrecognized`.
    pub fn as_tag(&self) -> Option<&'static str> {
        match self {
            Self::Message => Some("message"),
            Self::ConversationUpdate => Some("conversationUpdate"),
            Self::SystemNotification => Some("systemNotification"),
            Self::DeleteUserData => Some("deleteUserData"),
            Self::ContactRelationUpdate => Some("contactRelationUpdate"),
            Self::Unrecognized => None,
        }
    }
}

impl FromStr for ActivityType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "message" => Self::Message,
            "conversationupdate" => Self::ConversationUpdate,
            "systemnotification" => Self::SystemNotification,
            "deleteuserdata" => Self::DeleteUserData,
            "contactrelationupdate" => Self::ContactRelationUpdate,
            _ => Self::Unrecognized,
        })
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// A participant in a conversation.
///
/// Two accounts are equal when their ids are equal; display metadata is
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAccount {
    /// Channel-specific identifier.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Role of the account, e.g. `user` or `bot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl ChannelAccount {
    /// Creates an account with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl PartialEq for ChannelAccount {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ChannelAccount {}

impl Hash for ChannelAccount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The conversation an activity belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
}

impl ConversationAccount {
    /// Creates a conversation with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Payload Parts
// ============================================================================

/// A file or card attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Hint to the channel about whether the agent expects a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputHint {
    #[default]
    AcceptingInput,
    IgnoringInput,
    ExpectingInput,
}

/// Addressing information needed to reply into a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
}

/// Identifier the channel assigned to a delivered activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub id: String,
}

impl ResourceResponse {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

// ============================================================================
// Activity
// ============================================================================

/// The tag used for diagnostic activities that do not count as a response.
pub const TRACE_TYPE: &str = "trace";

/// A single inbound or outbound event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// The type tag. Absent tags are a dispatch contract violation.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    /// The agent's own account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_hint: Option<InputHint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_added: Option<Vec<ChannelAccount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members_removed: Option<Vec<ChannelAccount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Activity {
    /// Creates an activity with the given type tag.
    pub fn new(activity_type: impl Into<String>) -> Self {
        Self {
            activity_type: Some(activity_type.into()),
            ..Default::default()
        }
    }

    /// Creates a message activity carrying `text`.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::of(ActivityType::Message)
        }
    }

    /// Creates an activity of a recognised type.
    ///
    /// `ActivityType::Unrecognized` has no wire tag and yields an empty one.
    pub fn of(kind: ActivityType) -> Self {
        Self {
            activity_type: Some(kind.as_tag().unwrap_or_default().to_string()),
            ..Default::default()
        }
    }

    /// Classifies the type tag.
    ///
    /// Returns `None` only when the tag is absent. A blank tag is unrecognized.
    pub fn kind(&self) -> Option<ActivityType> {
        self.activity_type
            .as_deref()
            .map(|tag| tag.parse().unwrap_or(ActivityType::Unrecognized))
    }

    /// Returns `true` if this is a diagnostic trace activity.
    pub fn is_trace(&self) -> bool {
        self.activity_type.as_deref() == Some(TRACE_TYPE)
    }

    /// Returns the recipient's id, if any.
    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient.as_ref().map(|r| r.id.as_str())
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn with_from(mut self, from: ChannelAccount) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_recipient(mut self, recipient: ChannelAccount) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_conversation(mut self, conversation: ConversationAccount) -> Self {
        self.conversation = Some(conversation);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_members_added(mut self, members: Vec<ChannelAccount>) -> Self {
        self.members_added = Some(members);
        self
    }

    pub fn with_members_removed(mut self, members: Vec<ChannelAccount>) -> Self {
        self.members_removed = Some(members);
        self
    }

    /// Captures the addressing information of this (inbound) activity.
    pub fn conversation_reference(&self) -> ConversationReference {
        ConversationReference {
            activity_id: self.id.clone(),
            user: self.from.clone(),
            bot: self.recipient.clone(),
            conversation: self.conversation.clone(),
            channel_id: self.channel_id.clone(),
            service_url: self.service_url.clone(),
        }
    }

    /// Addresses this (outbound) activity as a reply through `reference`.
    ///
    /// The bot becomes the sender, the user the recipient, and the reply is
    /// threaded under the referenced activity when it has an id.
    pub fn apply_conversation_reference(&mut self, reference: &ConversationReference) {
        self.channel_id.clone_from(&reference.channel_id);
        self.service_url.clone_from(&reference.service_url);
        self.conversation.clone_from(&reference.conversation);
        self.from.clone_from(&reference.bot);
        self.recipient.clone_from(&reference.user);
        if reference.activity_id.is_some() {
            self.reply_to_id.clone_from(&reference.activity_id);
        }
    }
}

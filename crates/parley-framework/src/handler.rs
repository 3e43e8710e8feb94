//! The activity handler trait.
//!
//! [`ActivityHandler`] is the extension point of the dispatch layer. Each
//! activity type has one hook; every hook defaults to a no-op that returns
//! `Ok(())`, so an implementation overrides only the subset it cares about.
//!
//! ```rust,ignore
//! struct Greeter;
//!
//! #[async_trait]
//! impl ActivityHandler for Greeter {
//!     async fn on_member_added(&self, member: &ChannelAccount, turn: &TurnContext) -> TurnResult {
//!         turn.send_text(format!("Welcome, {}!", member.display_name())).await?;
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Ordering
//!
//! All hooks of one turn run on one call chain. Per-member hooks are awaited
//! one at a time in the order the channel listed the members, so a greeting
//! sent for the first new member is always delivered before the second
//! member's hook starts.

use async_trait::async_trait;
use parley_core::{ChannelAccount, TurnContext, TurnResult};

use crate::dispatcher;
use crate::typed::{ConversationUpdate, Message, TypedTurn};

/// Overridable hooks for every activity type.
///
/// Errors returned by a hook reach the caller of [`on_turn`](Self::on_turn)
/// unchanged.
#[async_trait]
pub trait ActivityHandler: Send + Sync {
    /// Entry point for one turn; classifies the activity and runs exactly one
    /// top-level hook. See [`dispatcher::dispatch`].
    async fn on_turn(&self, turn: &TurnContext) -> TurnResult {
        dispatcher::dispatch(self, turn).await
    }

    /// Called for `message` activities.
    async fn on_message_activity(&self, _turn: TypedTurn<'_, Message>) -> TurnResult {
        Ok(())
    }

    /// Called for `conversationUpdate` activities.
    ///
    /// The default routes to [`on_members_added`](Self::on_members_added) if
    /// the added list is non-empty, otherwise to
    /// [`on_members_removed`](Self::on_members_removed) if the removed list is
    /// non-empty. Only one of the two fires per activity.
    async fn on_conversation_update_activity(
        &self,
        turn: TypedTurn<'_, ConversationUpdate>,
    ) -> TurnResult {
        dispatcher::dispatch_membership(self, turn).await
    }

    /// Called with the non-empty added list of a conversation update.
    ///
    /// The default calls [`on_member_added`](Self::on_member_added) for every
    /// member except the recipient, sequentially and in list order.
    async fn on_members_added(
        &self,
        members_added: &[ChannelAccount],
        turn: TypedTurn<'_, ConversationUpdate>,
    ) -> TurnResult {
        dispatcher::each_member_added(self, members_added, turn).await
    }

    /// Called with the non-empty removed list of a conversation update.
    ///
    /// The default calls [`on_member_removed`](Self::on_member_removed) for
    /// every member except the recipient, sequentially and in list order.
    async fn on_members_removed(
        &self,
        members_removed: &[ChannelAccount],
        turn: TypedTurn<'_, ConversationUpdate>,
    ) -> TurnResult {
        dispatcher::each_member_removed(self, members_removed, turn).await
    }

    /// Called once per member that joined, never for the recipient itself.
    async fn on_member_added(&self, _member: &ChannelAccount, _turn: &TurnContext) -> TurnResult {
        Ok(())
    }

    /// Called once per member that left, never for the recipient itself.
    async fn on_member_removed(
        &self,
        _member: &ChannelAccount,
        _turn: &TurnContext,
    ) -> TurnResult {
        Ok(())
    }

    /// Called for `systemNotification` activities.
    async fn on_system_notification(&self, _turn: &TurnContext) -> TurnResult {
        Ok(())
    }

    /// Called for `deleteUserData` activities.
    async fn on_delete_user_data(&self, _turn: &TurnContext) -> TurnResult {
        Ok(())
    }

    /// Called for `contactRelationUpdate` activities.
    async fn on_contact_relation_update(&self, _turn: &TurnContext) -> TurnResult {
        Ok(())
    }

    /// Called for any tag outside the recognised set.
    async fn on_unrecognized_activity(&self, _turn: &TurnContext) -> TurnResult {
        Ok(())
    }
}

/// A shared, type-erased activity handler.
pub type BoxedHandler = std::sync::Arc<dyn ActivityHandler>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Outbound, turn};
    use parking_lot::Mutex;
    use parley_core::{Activity, TurnError};

    /// Overrides only the per-member hooks; routing uses the defaults.
    #[derive(Default)]
    struct Greeter {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ActivityHandler for Greeter {
        async fn on_member_added(&self, member: &ChannelAccount, turn: &TurnContext) -> TurnResult {
            self.seen.lock().push(format!("+{}", member.id));
            turn.send_text(format!("Welcome, {}!", member.display_name())).await?;
            Ok(())
        }

        async fn on_member_removed(
            &self,
            member: &ChannelAccount,
            _turn: &TurnContext,
        ) -> TurnResult {
            self.seen.lock().push(format!("-{}", member.id));
            Ok(())
        }
    }

    /// Logs every conversation update, then falls back to the default routing.
    #[derive(Default)]
    struct Auditing {
        greeter: Greeter,
        updates: Mutex<usize>,
    }

    #[async_trait]
    impl ActivityHandler for Auditing {
        async fn on_conversation_update_activity(
            &self,
            turn: TypedTurn<'_, ConversationUpdate>,
        ) -> TurnResult {
            *self.updates.lock() += 1;
            dispatcher::dispatch_membership(self, turn).await
        }

        async fn on_member_added(&self, member: &ChannelAccount, turn: &TurnContext) -> TurnResult {
            self.greeter.on_member_added(member, turn).await
        }
    }

    struct Silent;

    impl ActivityHandler for Silent {}

    fn conversation_update() -> Activity {
        Activity::new("conversationUpdate").with_recipient(ChannelAccount::new("bot"))
    }

    #[tokio::test]
    async fn test_default_routing_greets_in_order() {
        let handler = Greeter::default();
        let activity = conversation_update().with_members_added(vec![
            ChannelAccount::new("bot"),
            ChannelAccount::new("alice").with_name("Alice"),
            ChannelAccount::new("bob"),
        ]);
        let (turn, adapter) = turn(activity);

        handler.on_turn(&turn).await.unwrap();

        assert_eq!(*handler.seen.lock(), vec!["+alice", "+bob"]);
        let texts: Vec<_> = adapter
            .outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Send(batch) => batch[0].text.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Welcome, Alice!", "Welcome, bob!"]);
        assert!(turn.responded());
    }

    #[tokio::test]
    async fn test_default_routing_removed_only() {
        let handler = Greeter::default();
        let activity = conversation_update().with_members_removed(vec![
            ChannelAccount::new("carol"),
            ChannelAccount::new("bot"),
        ]);
        let (turn, adapter) = turn(activity);

        handler.on_turn(&turn).await.unwrap();

        assert_eq!(*handler.seen.lock(), vec!["-carol"]);
        assert!(adapter.outbound().is_empty());
    }

    #[tokio::test]
    async fn test_override_can_reuse_default_membership_routing() {
        let handler = Auditing::default();
        let activity = conversation_update()
            .with_members_added(vec![ChannelAccount::new("bot"), ChannelAccount::new("dana")])
            .with_members_removed(vec![ChannelAccount::new("erin")]);
        let (turn, adapter) = turn(activity);

        handler.on_turn(&turn).await.unwrap();

        assert_eq!(*handler.updates.lock(), 1);
        assert_eq!(*handler.greeter.seen.lock(), vec!["+dana"]);
        assert_eq!(adapter.outbound().len(), 1);
    }

    #[tokio::test]
    async fn test_default_hooks_are_no_ops() {
        for tag in [
            "message",
            "conversationUpdate",
            "systemNotification",
            "deleteUserData",
            "contactRelationUpdate",
            "somethingElse",
        ] {
            let (turn, adapter) = turn(Activity::new(tag));
            Silent.on_turn(&turn).await.unwrap();
            assert!(adapter.outbound().is_empty());
            assert!(!turn.responded());
        }
    }

    #[tokio::test]
    async fn test_boxed_handler_still_validates() {
        let handler: BoxedHandler = std::sync::Arc::new(Silent);
        let (turn, _) = turn(None);

        let err = handler.on_turn(&turn).await.unwrap_err();

        assert!(matches!(err, TurnError::MissingActivity));
    }
}

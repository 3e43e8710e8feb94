//! Activity dispatch.
//!
//! [`dispatch`] classifies a turn by its activity's type tag and invokes
//! exactly one top-level hook of an [`ActivityHandler`]:
//!
//! ```text
//! message               ──▶ on_message_activity(TypedTurn<Message>)
//! conversationUpdate    ──▶ on_conversation_update_activity(TypedTurn<ConversationUpdate>)
//!                            ├─ added non-empty   ──▶ on_members_added ──▶ on_member_added × N
//!                            └─ removed non-empty ──▶ on_members_removed ──▶ on_member_removed × N
//! systemNotification    ──▶ on_system_notification(&TurnContext)
//! deleteUserData        ──▶ on_delete_user_data(&TurnContext)
//! contactRelationUpdate ──▶ on_contact_relation_update(&TurnContext)
//! anything else         ──▶ on_unrecognized_activity(&TurnContext)
//! ```
//!
//! The dispatcher checks its preconditions before any hook runs and
//! otherwise stays out of the way: hook errors are returned as-is.

use parley_core::{ActivityType, ChannelAccount, TurnContext, TurnError, TurnResult};

use crate::handler::ActivityHandler;
use crate::typed::{ConversationUpdate, TypedTurn};

/// Routes one turn to `handler`.
///
/// # Errors
///
/// - [`TurnError::MissingActivity`] if the turn has no activity.
/// - [`TurnError::MissingActivityType`] if the activity has no type tag.
/// - Whatever the invoked hook returns.
pub async fn dispatch<H>(handler: &H, turn: &TurnContext) -> TurnResult
where
    H: ActivityHandler + ?Sized,
{
    let activity = turn.activity().ok_or(TurnError::MissingActivity)?;
    let kind = activity.kind().ok_or(TurnError::MissingActivityType)?;

    match kind {
        ActivityType::Message => {
            handler
                .on_message_activity(TypedTurn::new(turn, activity))
                .await
        }
        ActivityType::ConversationUpdate => {
            handler
                .on_conversation_update_activity(TypedTurn::new(turn, activity))
                .await
        }
        ActivityType::SystemNotification => handler.on_system_notification(turn).await,
        ActivityType::DeleteUserData => handler.on_delete_user_data(turn).await,
        ActivityType::ContactRelationUpdate => handler.on_contact_relation_update(turn).await,
        ActivityType::Unrecognized => handler.on_unrecognized_activity(turn).await,
    }
}

/// Membership sub-dispatch for conversation updates. Added wins over removed.
///
/// This is the default body of
/// [`ActivityHandler::on_conversation_update_activity`]; overrides call it to
/// keep the default routing.
pub async fn dispatch_membership<H>(
    handler: &H,
    turn: TypedTurn<'_, ConversationUpdate>,
) -> TurnResult
where
    H: ActivityHandler + ?Sized,
{
    let update = turn.activity();

    let added = update.members_added();
    if !added.is_empty() {
        return handler.on_members_added(added, turn).await;
    }

    let removed = update.members_removed();
    if !removed.is_empty() {
        return handler.on_members_removed(removed, turn).await;
    }

    Ok(())
}

/// Calls [`ActivityHandler::on_member_added`] for every member except the
/// recipient, one at a time in list order. Stops at the first error.
pub async fn each_member_added<H>(
    handler: &H,
    members: &[ChannelAccount],
    turn: TypedTurn<'_, ConversationUpdate>,
) -> TurnResult
where
    H: ActivityHandler + ?Sized,
{
    for member in others(members, turn.activity().recipient()) {
        handler.on_member_added(member, turn.turn()).await?;
    }
    Ok(())
}

/// Calls [`ActivityHandler::on_member_removed`] for every member except the
/// recipient, one at a time in list order. Stops at the first error.
pub async fn each_member_removed<H>(
    handler: &H,
    members: &[ChannelAccount],
    turn: TypedTurn<'_, ConversationUpdate>,
) -> TurnResult
where
    H: ActivityHandler + ?Sized,
{
    for member in others(members, turn.activity().recipient()) {
        handler.on_member_removed(member, turn.turn()).await?;
    }
    Ok(())
}

/// Members other than the recipient, in list order.
pub fn others<'a>(
    members: &'a [ChannelAccount],
    recipient: Option<&'a ChannelAccount>,
) -> impl Iterator<Item = &'a ChannelAccount> + Send + 'a {
    members
        .iter()
        .filter(move |member| recipient != Some(*member))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingHandler, turn};
    use parley_core::{Activity, ChannelAccount};
    use tokio_test::{assert_err, assert_ok};

    fn members(ids: &[&str]) -> Vec<ChannelAccount> {
        ids.iter().map(|id| ChannelAccount::new(*id)).collect()
    }

    fn update(added: &[&str], removed: &[&str]) -> Activity {
        let mut activity = Activity::new("conversationUpdate")
            .with_recipient(ChannelAccount::new("bot").with_name("Parley"));
        if !added.is_empty() {
            activity = activity.with_members_added(members(added));
        }
        if !removed.is_empty() {
            activity = activity.with_members_removed(members(removed));
        }
        activity
    }

    #[tokio::test]
    async fn test_message_routes_to_message_hook() {
        let handler = RecordingHandler::default();
        let (turn, _) = turn(Activity::message("hi"));

        assert_ok!(dispatch(&handler, &turn).await);

        assert_eq!(handler.calls(), vec![Call::Message("hi".into())]);
    }

    #[tokio::test]
    async fn test_each_tag_fires_exactly_one_hook() {
        let cases = [
            ("systemNotification", Call::SystemNotification),
            ("deleteUserData", Call::DeleteUserData),
            ("contactRelationUpdate", Call::ContactRelationUpdate),
            ("typing", Call::Unrecognized),
            ("invoke", Call::Unrecognized),
        ];

        for (tag, expected) in cases {
            let handler = RecordingHandler::default();
            let (turn, _) = turn(Activity::new(tag));

            assert_ok!(dispatch(&handler, &turn).await);

            assert_eq!(handler.calls(), vec![expected], "tag {tag}");
        }
    }

    #[tokio::test]
    async fn test_blank_tag_is_unrecognized() {
        for tag in ["", "   "] {
            let handler = RecordingHandler::default();
            let (turn, _) = turn(Activity::new(tag));

            assert_ok!(dispatch(&handler, &turn).await);

            assert_eq!(handler.calls(), vec![Call::Unrecognized], "tag {tag:?}");
        }
    }

    #[tokio::test]
    async fn test_missing_activity_fails_before_hooks() {
        let handler = RecordingHandler::default();
        let (turn, _) = turn(None);

        let err = assert_err!(dispatch(&handler, &turn).await);

        assert!(matches!(err, TurnError::MissingActivity));
        assert!(handler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_type_fails_before_hooks() {
        let handler = RecordingHandler::default();
        let (turn, _) = turn(Activity::default().with_text("hi"));

        let err = assert_err!(dispatch(&handler, &turn).await);

        assert!(matches!(err, TurnError::MissingActivityType));
        assert!(handler.calls().is_empty());
    }

    #[tokio::test]
    async fn test_recipient_is_filtered_from_added_members() {
        let handler = RecordingHandler::default();
        let (turn, _) = turn(update(&["bot", "alice", "bob"], &[]));

        assert_ok!(dispatch(&handler, &turn).await);

        assert_eq!(
            handler.calls(),
            vec![
                Call::ConversationUpdate,
                Call::MembersAdded(3),
                Call::MemberAdded("alice".into()),
                Call::MemberAdded("bob".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_added_takes_precedence_over_removed() {
        let handler = RecordingHandler::default();
        let (turn, _) = turn(update(&["carol"], &["dave"]));

        assert_ok!(dispatch(&handler, &turn).await);

        assert_eq!(
            handler.calls(),
            vec![
                Call::ConversationUpdate,
                Call::MembersAdded(1),
                Call::MemberAdded("carol".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_removed_members_receive_removed_list() {
        let handler = RecordingHandler::default();
        let (turn, _) = turn(update(&[], &["dave", "bot", "erin"]));

        assert_ok!(dispatch(&handler, &turn).await);

        assert_eq!(
            handler.calls(),
            vec![
                Call::ConversationUpdate,
                Call::MembersRemoved(3),
                Call::MemberRemoved("dave".into()),
                Call::MemberRemoved("erin".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_lists_fire_no_member_hooks() {
        let handler = RecordingHandler::default();
        let activity = update(&[], &[])
            .with_members_added(Vec::new())
            .with_members_removed(Vec::new());
        let (turn, _) = turn(activity);

        assert_ok!(dispatch(&handler, &turn).await);

        assert_eq!(handler.calls(), vec![Call::ConversationUpdate]);
    }

    #[tokio::test]
    async fn test_hook_error_propagates_and_stops_iteration() {
        let handler = RecordingHandler::failing_on("alice");
        let (turn, _) = turn(update(&["alice", "bob"], &[]));

        let err = assert_err!(dispatch(&handler, &turn).await);

        assert_eq!(err.to_string(), "handler failed: refusing alice");
        assert_eq!(
            handler.calls(),
            vec![
                Call::ConversationUpdate,
                Call::MembersAdded(2),
                Call::MemberAdded("alice".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_wire_activity_routes_by_type_tag() {
        let activity: Activity = serde_json::from_value(serde_json::json!({
            "type": "ConversationUpdate",
            "recipient": { "id": "bot" },
            "membersAdded": [{ "id": "bot" }, { "id": "alice", "name": "Alice" }],
        }))
        .unwrap();
        let handler = RecordingHandler::default();
        let (turn, _) = turn(activity);

        assert_ok!(dispatch(&handler, &turn).await);

        assert_eq!(
            handler.calls(),
            vec![
                Call::ConversationUpdate,
                Call::MembersAdded(2),
                Call::MemberAdded("alice".into()),
            ]
        );
    }

    #[test]
    fn test_others_without_recipient_keeps_everyone() {
        let list = members(&["bot", "alice"]);
        let ids: Vec<_> = others(&list, None).map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["bot", "alice"]);
    }
}

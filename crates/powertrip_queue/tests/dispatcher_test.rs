//! Action dispatch against in-memory collaborators.

mod test_utils;

use powertrip_core::{
    ActionCapabilities, BanDuration, Control, KindTag, MAX_BAN_DURATIONS, MAX_ROWS,
    RemovalMessage, RemovalReason, RemoveOptions,
};
use powertrip_queue::{BindingState, NO_REASON};
use test_utils::{
    Harness, SourceCall, comment, event, locked_comment, submission, test_dispatcher_config,
};

fn reasons() -> Vec<RemovalReason> {
    vec![
        RemovalReason::new("r1", "Spam", "Your post was removed as spam."),
        RemovalReason::new("r2", "Silent", ""),
    ]
}

async fn mirrored(h: &Harness, items: Vec<powertrip_core::QueueItem>) {
    h.source.set_queue(items);
    h.reconciler.tick().await.unwrap();
}

#[tokio::test]
async fn test_initial_controls_follow_capabilities() {
    let h = Harness::new();
    let controls = h.dispatcher.initial_controls(&comment("a1", 1));
    let ids: Vec<&str> = controls.controls().map(Control::custom_id).collect();
    assert_eq!(
        ids,
        vec![
            "pt:a1:approve",
            "pt:a1:remove",
            "pt:a1:reasons",
            "pt:a1:ban:3",
            "pt:a1:ban:7",
            "pt:a1:ban:28",
            "pt:a1:ban:perm",
        ]
    );
    assert_eq!(controls.rows().len(), 2);

    let capabilities = ActionCapabilities::builder()
        .reasons_for(vec![KindTag::Submission])
        .bans_for(vec![KindTag::Comment])
        .ban_durations(vec![1u16, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20])
        .build()
        .unwrap();
    let config = test_dispatcher_config()
        .capabilities(capabilities)
        .build()
        .unwrap();
    let h = Harness::with_config(config);

    let for_submission = h.dispatcher.initial_controls(&submission("s1", 1));
    assert!(for_submission.contains("pt:s1:reasons"));
    assert!(!for_submission.contains("pt:s1:ban:perm"));

    let for_comment = h.dispatcher.initial_controls(&comment("c1", 1));
    assert!(!for_comment.contains("pt:c1:reasons"));
    assert_eq!(for_comment.rows().len(), MAX_ROWS);
    assert!(for_comment.rows().iter().all(|row| row.len() <= 5));
}

#[tokio::test]
async fn test_longest_ban_list_keeps_permanent_ban() {
    let durations: Vec<u16> = (1..=MAX_BAN_DURATIONS as u16).collect();
    let capabilities = ActionCapabilities::builder()
        .ban_durations(durations.clone())
        .build()
        .unwrap();
    let config = test_dispatcher_config()
        .capabilities(capabilities)
        .build()
        .unwrap();
    let h = Harness::with_config(config);

    let controls = h.dispatcher.initial_controls(&comment("a1", 1));
    for days in durations {
        assert!(controls.contains(&format!("pt:a1:ban:{}", days)));
    }
    assert!(controls.contains("pt:a1:ban:perm"));
    assert_eq!(controls.rows().len(), MAX_ROWS);
}

#[tokio::test]
async fn test_approve_deletes_mirror_and_logs() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "pt:a1:approve", &[]))
        .await;

    assert_eq!(
        h.source.mutations(),
        vec![SourceCall::Approve("t1_a1".to_string())]
    );
    assert!(h.mirror.tags().is_empty());
    assert_eq!(h.dispatcher.binding_state(handle), None);
    assert_eq!(h.mirror.audit_log().len(), 1);
    assert!(h.mirror.audit_log()[0].starts_with("modname approved t1_a1"));
    assert_eq!(h.metrics.actions(), 1);
}

#[tokio::test]
async fn test_approve_unlocks_locked_items_first() {
    let h = Harness::new();
    mirrored(&h, vec![locked_comment("l1", 1)]).await;
    let handle = h.mirror.handle_of("l1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "pt:l1:approve", &[]))
        .await;

    assert_eq!(
        h.source.mutations(),
        vec![
            SourceCall::Unlock("t1_l1".to_string()),
            SourceCall::Approve("t1_l1".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_second_action_on_same_mirror_is_dropped() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "pt:a1:approve", &[]))
        .await;
    h.dispatcher
        .dispatch(event(handle, "pt:a1:remove", &[]))
        .await;

    assert_eq!(h.source.mutations().len(), 1);
    assert_eq!(h.metrics.action_failures(), 0);
}

#[tokio::test]
async fn test_concurrent_clicks_mutate_once() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();

    tokio::join!(
        h.dispatcher.dispatch(event(handle, "pt:a1:remove", &[])),
        h.dispatcher.dispatch(event(handle, "pt:a1:remove", &[])),
        h.dispatcher.dispatch(event(handle, "pt:a1:ban:7", &[])),
    );

    assert_eq!(h.source.mutations().len(), 1);
}

#[tokio::test]
async fn test_failed_action_keeps_mirror_with_error_indicator() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();
    h.source.fail("approve", 1);

    h.dispatcher
        .dispatch(event(handle, "pt:a1:approve", &[]))
        .await;

    assert_eq!(h.mirror.tags(), vec!["a1"]);
    assert_eq!(h.mirror.custom_ids_of(handle), vec!["pt:a1:error"]);
    let label = h.mirror.first_label(handle).unwrap();
    assert!(label.starts_with("Error: "));
    assert!(label.chars().count() <= 80);
    assert_eq!(h.source.queue_ids(), vec!["a1"]);
    assert_eq!(h.dispatcher.binding_state(handle), Some(BindingState::Failed));
    assert_eq!(h.metrics.action_failures(), 1);

    let report = h.reconciler.tick().await.unwrap();
    assert_eq!(*report.posted(), 0);
    assert_eq!(h.mirror.tags(), vec!["a1"]);
    assert_eq!(h.dispatcher.binding_state(handle), Some(BindingState::Failed));
}

#[tokio::test]
async fn test_failure_releases_claim() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();
    h.source.fail("remove", 1);

    h.dispatcher
        .dispatch(event(handle, "pt:a1:remove", &[]))
        .await;
    assert!(h.source.mutations().is_empty());

    h.dispatcher
        .dispatch(event(handle, "pt:a1:remove", &[]))
        .await;
    assert_eq!(h.source.mutations().len(), 1);
    assert!(h.mirror.tags().is_empty());
}

#[tokio::test]
async fn test_reason_flow_removes_with_reason_and_message() {
    let h = Harness::new();
    h.source.set_reasons(reasons());
    mirrored(&h, vec![submission("s1", 1)]).await;
    let handle = h.mirror.handle_of("s1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "pt:s1:reasons", &[]))
        .await;
    assert_eq!(
        h.mirror.custom_ids_of(handle),
        vec!["pt:s1:reason", "pt:s1:confirm", "pt:s1:cancel"]
    );
    assert_eq!(
        h.dispatcher.binding_state(handle),
        Some(BindingState::PickingReason)
    );

    h.dispatcher
        .dispatch(event(handle, "pt:s1:reason", &["r1"]))
        .await;
    assert!(h.source.mutations().is_empty());

    h.dispatcher
        .dispatch(event(handle, "pt:s1:confirm", &[]))
        .await;

    assert_eq!(
        h.source.mutations(),
        vec![
            SourceCall::Remove(
                "t3_s1".to_string(),
                RemoveOptions {
                    mod_note: Some("modname via PowerTrip".to_string()),
                    reason_id: Some("r1".to_string()),
                },
            ),
            SourceCall::RemovalMessage(
                "t3_s1".to_string(),
                RemovalMessage {
                    title: "Spam".to_string(),
                    message: "Your post was removed as spam.".to_string(),
                },
            ),
        ]
    );
    assert!(h.mirror.tags().is_empty());
}

#[tokio::test]
async fn test_confirm_without_selection_removes_with_note_only() {
    let h = Harness::new();
    h.source.set_reasons(reasons());
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "pt:a1:reasons", &[]))
        .await;
    h.dispatcher
        .dispatch(event(handle, "pt:a1:reason", &["r1"]))
        .await;
    h.dispatcher
        .dispatch(event(handle, "pt:a1:reason", &[NO_REASON]))
        .await;
    h.dispatcher
        .dispatch(event(handle, "pt:a1:confirm", &[]))
        .await;

    assert_eq!(
        h.source.mutations(),
        vec![SourceCall::Remove(
            "t1_a1".to_string(),
            RemoveOptions {
                mod_note: Some("modname via PowerTrip".to_string()),
                reason_id: None,
            },
        )]
    );
}

#[tokio::test]
async fn test_reason_without_text_sends_no_message() {
    let h = Harness::new();
    h.source.set_reasons(reasons());
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "pt:a1:reasons", &[]))
        .await;
    h.dispatcher
        .dispatch(event(handle, "pt:a1:reason", &["r2"]))
        .await;
    h.dispatcher
        .dispatch(event(handle, "pt:a1:confirm", &[]))
        .await;

    assert_eq!(h.source.mutations().len(), 1);
}

#[tokio::test]
async fn test_cancel_restores_initial_controls_without_fetching() {
    let h = Harness::new();
    h.source.set_reasons(reasons());
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();
    let initial = h.mirror.custom_ids_of(handle);

    h.dispatcher
        .dispatch(event(handle, "pt:a1:reasons", &[]))
        .await;
    let calls_before_cancel = h.source.calls().len();
    h.dispatcher
        .dispatch(event(handle, "pt:a1:cancel", &[]))
        .await;

    assert_eq!(h.mirror.custom_ids_of(handle), initial);
    assert_eq!(h.source.calls().len(), calls_before_cancel);
    assert_eq!(h.dispatcher.binding_state(handle), Some(BindingState::Initial));
    assert!(h.source.mutations().is_empty());
}

#[tokio::test]
async fn test_failed_reason_fetch_marks_error() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();
    h.source.fail("removal_reasons", 1);

    h.dispatcher
        .dispatch(event(handle, "pt:a1:reasons", &[]))
        .await;

    assert_eq!(h.mirror.custom_ids_of(handle), vec!["pt:a1:error"]);
    assert!(h.source.mutations().is_empty());
}

#[tokio::test]
async fn test_temporary_ban_removes_then_bans() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "pt:a1:ban:7", &[]))
        .await;

    let mutations = h.source.mutations();
    assert_eq!(mutations.len(), 2);
    assert_eq!(
        mutations[0],
        SourceCall::Remove("t1_a1".to_string(), RemoveOptions::default())
    );
    match &mutations[1] {
        SourceCall::Ban(request) => {
            assert_eq!(request.author(), "author");
            assert_eq!(request.subreddit(), "testsub");
            assert_eq!(*request.duration(), BanDuration::Days(7));
            assert_eq!(request.note(), "modname via PowerTrip");
            assert_eq!(request.context(), "t1_a1");
            assert_eq!(
                request.ban_message().as_deref(),
                Some("[comment a1](https://www.reddit.com/r/testsub/comments/p/t/a1/)")
            );
        }
        other => panic!("expected ban, got {other:?}"),
    }
    assert!(h.mirror.tags().is_empty());
}

#[tokio::test]
async fn test_permanent_ban_without_excerpt() {
    let config = test_dispatcher_config()
        .ban_message_excerpt(false)
        .build()
        .unwrap();
    let h = Harness::with_config(config);
    mirrored(&h, vec![submission("s1", 1)]).await;
    let handle = h.mirror.handle_of("s1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "pt:s1:ban:perm", &[]))
        .await;

    match h.source.mutations().last() {
        Some(SourceCall::Ban(request)) => {
            assert_eq!(*request.duration(), BanDuration::Permanent);
            assert_eq!(request.duration().days(), None);
            assert!(request.ban_message().is_none());
            assert_eq!(request.context(), "t3_s1");
        }
        other => panic!("expected ban, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_ban_after_remove_shows_error() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();
    h.source.fail("ban_author", 1);

    h.dispatcher
        .dispatch(event(handle, "pt:a1:ban:3", &[]))
        .await;

    assert_eq!(h.mirror.custom_ids_of(handle), vec!["pt:a1:error"]);
    assert_eq!(h.source.mutations().len(), 1);
}

#[tokio::test]
async fn test_unknown_and_stale_controls_are_ignored() {
    let h = Harness::new();
    mirrored(&h, vec![comment("a1", 1)]).await;
    let handle = h.mirror.handle_of("a1").unwrap();

    h.dispatcher
        .dispatch(event(handle, "somebody-else:a1:approve", &[]))
        .await;
    h.dispatcher
        .dispatch(event(handle, "pt:zz:approve", &[]))
        .await;
    h.dispatcher
        .dispatch(event(powertrip_core::MessageHandle::from(9_999), "pt:a1:approve", &[]))
        .await;

    assert!(h.source.mutations().is_empty());
    assert_eq!(h.mirror.tags(), vec!["a1"]);
    assert_eq!(h.metrics.action_failures(), 0);
}

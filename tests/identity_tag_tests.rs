mod common;

use common::{create_active_user, spawn_state};

use byceps_authn::db::IdentityTag;
use byceps_authn::domain::TagId;
use byceps_authn::services::IdentityTagError;

#[tokio::test]
async fn tag_lookup_ignores_letter_case() {
    let state = spawn_state().await;
    let orga = create_active_user(&state, "Orga", "secret").await;
    let dana = create_active_user(&state, "Dana", "secret").await;

    let (tag, event) = state
        .identity_tags
        .create_tag(&orga, "0004283951", &dana, Some("wristband"), false)
        .await
        .expect("create tag");

    assert_eq!(event.tag_id, tag.id);
    assert_eq!(event.identifier, "0004283951");
    assert_eq!(event.initiator.id, orga.id);
    assert_eq!(event.user.id, dana.id);

    let found = state
        .identity_tags
        .find_tag_by_identifier("0004283951")
        .await
        .expect("lookup")
        .expect("tag exists");
    assert_eq!(found.id, tag.id);
    assert_eq!(found.user_id, dana.id);
    assert_eq!(found.note.as_deref(), Some("wristband"));

    let (mixed, _) = state
        .identity_tags
        .create_tag(&orga, "AbC-77f", &dana, None, true)
        .await
        .expect("create tag");

    for variant in ["abc-77f", "ABC-77F", "aBc-77F"] {
        let found = state
            .identity_tags
            .find_tag_by_identifier(variant)
            .await
            .expect("lookup")
            .expect("tag exists");
        assert_eq!(found.id, mixed.id);
        assert_eq!(found.identifier, "AbC-77f");
        assert!(found.suspended);
    }

    assert!(
        state
            .identity_tags
            .find_tag_by_identifier("0004283952")
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
async fn identifier_is_unique_regardless_of_case() {
    let state = spawn_state().await;
    let orga = create_active_user(&state, "Orga", "secret").await;
    let dana = create_active_user(&state, "Dana", "secret").await;
    let erik = create_active_user(&state, "Erik", "secret").await;

    state
        .identity_tags
        .create_tag(&orga, "RFID-00A1", &dana, None, false)
        .await
        .expect("create tag");

    let result = state
        .identity_tags
        .create_tag(&orga, "rfid-00a1", &erik, None, false)
        .await;
    assert!(matches!(
        result,
        Err(IdentityTagError::IdentifierAlreadyTaken(ref identifier)) if identifier == "rfid-00a1"
    ));

    // The failed attempt must leave no trace.
    let tags = state.identity_tags.get_all_tags().await.expect("all tags");
    assert_eq!(tags.len(), 1);
    assert!(
        state
            .user_log
            .get_entries_for_user(erik.id)
            .await
            .expect("log")
            .is_empty()
    );
}

#[tokio::test]
async fn creating_and_deleting_tags_is_logged() {
    let state = spawn_state().await;
    let orga = create_active_user(&state, "Orga", "secret").await;
    let dana = create_active_user(&state, "Dana", "secret").await;

    let (tag, _) = state
        .identity_tags
        .create_tag(&orga, "0004283951", &dana, None, false)
        .await
        .expect("create tag");

    let event = state
        .identity_tags
        .delete_tag(&tag, &orga)
        .await
        .expect("delete tag");
    assert_eq!(event.tag_id, tag.id);
    assert_eq!(event.identifier, "0004283951");
    assert_eq!(event.user.id, dana.id);

    assert!(state.identity_tags.find_tag(tag.id).await.expect("find").is_none());
    assert!(
        state
            .identity_tags
            .find_tag_by_identifier("0004283951")
            .await
            .expect("lookup")
            .is_none()
    );

    let entries = state
        .user_log
        .get_entries_for_user(dana.id)
        .await
        .expect("log");
    let event_types: Vec<_> = entries.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(
        event_types,
        vec!["user-identity-tag-created", "user-identity-tag-deleted"]
    );
    for entry in &entries {
        assert_eq!(entry.initiator_id, Some(orga.id));
        assert_eq!(
            entry.data.get("identifier").and_then(|v| v.as_str()),
            Some("0004283951")
        );
    }

    // The identifier is free again.
    state
        .identity_tags
        .create_tag(&orga, "0004283951", &dana, None, false)
        .await
        .expect("reuse identifier");
}

#[tokio::test]
async fn deleting_a_tag_twice_fails_without_logging() {
    let state = spawn_state().await;
    let orga = create_active_user(&state, "Orga", "secret").await;
    let dana = create_active_user(&state, "Dana", "secret").await;

    let (tag, _) = state
        .identity_tags
        .create_tag(&orga, "0004283951", &dana, None, false)
        .await
        .expect("create tag");
    state
        .identity_tags
        .delete_tag(&tag, &orga)
        .await
        .expect("delete tag");

    let result = state.identity_tags.delete_tag(&tag, &orga).await;
    assert!(matches!(result, Err(IdentityTagError::NotFound(id)) if id == tag.id));

    let never_stored = IdentityTag {
        id: TagId::generate(),
        identifier: "ghost".to_string(),
        ..tag.clone()
    };
    let result = state.identity_tags.delete_tag(&never_stored, &orga).await;
    assert!(matches!(result, Err(IdentityTagError::NotFound(id)) if id == never_stored.id));

    let entries = state
        .user_log
        .get_entries_for_user_of_type(dana.id, "user-identity-tag-deleted")
        .await
        .expect("log");
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn presented_tag_resolves_to_its_user() {
    let state = spawn_state().await;
    let orga = create_active_user(&state, "Orga", "secret").await;
    let dana = create_active_user(&state, "Dana", "secret").await;

    state
        .identity_tags
        .create_tag(&orga, "RFID-00A1", &dana, None, false)
        .await
        .expect("create tag");

    let details = state
        .identity_tags
        .find_tag_details_by_identifier("rfid-00a1")
        .await
        .expect("lookup")
        .expect("tag exists");
    assert_eq!(details.tag.identifier, "RFID-00A1");
    assert_eq!(details.user.id, dana.id);
    assert_eq!(details.creator.id, orga.id);

    assert!(
        state
            .identity_tags
            .find_tag_details_by_identifier("rfid-00a2")
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
async fn all_tags_come_with_creator_and_user() {
    let state = spawn_state().await;
    let orga = create_active_user(&state, "Orga", "secret").await;
    let dana = create_active_user(&state, "Dana", "secret").await;
    let erik = create_active_user(&state, "Erik", "secret").await;

    state
        .identity_tags
        .create_tag(&orga, "tag-1", &dana, None, false)
        .await
        .expect("create tag");
    state
        .identity_tags
        .create_tag(&dana, "tag-2", &erik, None, false)
        .await
        .expect("create tag");

    let tags = state.identity_tags.get_all_tags().await.expect("all tags");
    assert_eq!(tags.len(), 2);

    let first = tags
        .iter()
        .find(|d| d.tag.identifier == "tag-1")
        .expect("tag-1");
    assert_eq!(first.creator.id, orga.id);
    assert_eq!(first.user.id, dana.id);

    let second = tags
        .iter()
        .find(|d| d.tag.identifier == "tag-2")
        .expect("tag-2");
    assert_eq!(second.creator.id, dana.id);
    assert_eq!(second.user.screen_name, "Erik");
}

mod common;

use chrono::{Duration, Utc};
use common::{create_active_user, spawn_state};
use sea_orm::{ActiveModelTrait, Set};

use byceps_authn::db::repositories::verification_token::generate_secret_token;
use byceps_authn::domain::Password;
use byceps_authn::entities::verification_tokens;
use byceps_authn::services::PasswordResetError;

#[tokio::test]
async fn reset_sets_new_password_and_consumes_token() {
    let state = spawn_state().await;
    let alice = create_active_user(&state, "Alice", "forgotten").await;
    let session = state.sessions.get_session_token(alice.id).await.expect("token");

    let token = state
        .password_reset
        .prepare_password_reset(&alice)
        .await
        .expect("prepare reset");

    let found = state
        .verification_tokens
        .find_for_password_reset_by_token(&token.token)
        .await
        .expect("find")
        .expect("fresh token is valid");
    assert_eq!(found.user_id, alice.id);

    // Reset tokens are not consent tokens.
    assert!(
        state
            .verification_tokens
            .find_for_consent_by_token(&token.token)
            .await
            .expect("find")
            .is_none()
    );

    let event = state
        .password_reset
        .reset_password(&token.token, &Password::new("remembered"))
        .await
        .expect("reset");
    assert_eq!(event.user.id, alice.id);
    assert_eq!(event.initiator.id, alice.id);

    assert!(
        state
            .credentials
            .is_password_valid_for_user(alice.id, &Password::new("remembered"))
            .await
            .expect("check")
    );
    assert!(
        !state
            .sessions
            .is_session_valid(alice.id, &session.token)
            .await
            .expect("check")
    );

    let reused = state
        .password_reset
        .reset_password(&token.token, &Password::new("again"))
        .await;
    assert!(matches!(reused, Err(PasswordResetError::InvalidToken)));
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let state = spawn_state().await;
    let alice = create_active_user(&state, "Alice", "secret").await;

    let token = generate_secret_token();
    verification_tokens::ActiveModel {
        token: Set(token.clone()),
        created_at: Set(Utc::now() - Duration::hours(25)),
        user_id: Set(alice.id.value()),
        purpose: Set("password_reset".to_string()),
        data: Set(None),
    }
    .insert(&state.store.conn)
    .await
    .expect("insert aged token");

    assert!(
        state
            .verification_tokens
            .find_for_password_reset_by_token(&token)
            .await
            .expect("find")
            .is_none()
    );

    let result = state
        .password_reset
        .reset_password(&token, &Password::new("hijacked"))
        .await;
    assert!(matches!(result, Err(PasswordResetError::InvalidToken)));

    assert!(
        state
            .credentials
            .is_password_valid_for_user(alice.id, &Password::new("secret"))
            .await
            .expect("check")
    );
}

#[tokio::test]
async fn unknown_reset_token_is_rejected() {
    let state = spawn_state().await;

    let result = state
        .password_reset
        .reset_password(&generate_secret_token(), &Password::new("whatever"))
        .await;
    assert!(matches!(result, Err(PasswordResetError::InvalidToken)));
}

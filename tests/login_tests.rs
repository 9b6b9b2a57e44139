mod common;

use chrono::{Duration, Utc};
use common::{create_active_user, grant_admin_access, spawn_state};

use byceps_authn::domain::{BrandId, Password, Site, SiteId};
use byceps_authn::services::{
    AdminLoginError, AuthnError, LoginRequest, SiteLoginError, log_out_user,
};

fn request<'a>(username: &'a str, password: &'a Password) -> LoginRequest<'a> {
    LoginRequest {
        username,
        password,
        permanent: false,
        ip_address: Some("192.0.2.10"),
    }
}

fn lanparty_site() -> Site {
    Site {
        id: SiteId::new("lanparty-2026"),
        title: "LAN Party 2026".to_string(),
        brand_id: BrandId::new("lanparty"),
    }
}

#[tokio::test]
async fn admin_login_issues_session_and_logs_it() {
    let state = spawn_state().await;
    let alice = create_active_user(&state, "Alice", "correct horse").await;
    grant_admin_access(&state, &alice).await;

    let password = Password::new("correct horse");
    let logged_in = state
        .admin_login
        .log_in_user_to_admin(LoginRequest {
            permanent: true,
            ..request("alice", &password)
        })
        .await
        .expect("admin login");

    assert_eq!(logged_in.user.id, alice.id);
    assert_eq!(logged_in.event.initiator.id, alice.id);
    assert_eq!(logged_in.session.user_id, alice.id);
    assert!(logged_in.session.permanent);

    assert!(
        state
            .sessions
            .is_session_valid(alice.id, &logged_in.session.token)
            .await
            .expect("check")
    );

    let entries = state
        .user_log
        .get_entries_for_user_of_type(alice.id, "user-logged-in-to-admin")
        .await
        .expect("log");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].initiator_id, Some(alice.id));
    assert_eq!(
        entries[0].data.get("ip_address").and_then(|v| v.as_str()),
        Some("192.0.2.10")
    );

    assert!(
        state
            .sessions
            .find_recent_login(alice.id)
            .await
            .expect("find")
            .is_some()
    );
}

#[tokio::test]
async fn admin_login_without_permission_is_refused() {
    let state = spawn_state().await;
    let carol = create_active_user(&state, "Carol", "secret").await;

    let password = Password::new("secret");
    let result = state
        .admin_login
        .log_in_user_to_admin(request("Carol", &password))
        .await;
    assert!(matches!(result, Err(AdminLoginError::AuthorizationFailed)));

    assert!(
        state
            .sessions
            .find_session_token_for_user(carol.id)
            .await
            .expect("find")
            .is_none()
    );
    assert!(
        state
            .user_log
            .get_entries_for_user(carol.id)
            .await
            .expect("log")
            .is_empty()
    );
}

#[tokio::test]
async fn admin_login_passes_authentication_errors_through() {
    let state = spawn_state().await;
    let alice = create_active_user(&state, "Alice", "secret").await;
    grant_admin_access(&state, &alice).await;

    let password = Password::new("wrong");
    let result = state
        .admin_login
        .log_in_user_to_admin(request("Alice", &password))
        .await;
    assert!(matches!(
        result,
        Err(AdminLoginError::Authentication(AuthnError::WrongPassword))
    ));

    let password = Password::new("secret");
    let result = state
        .admin_login
        .log_in_user_to_admin(request("Mallory", &password))
        .await;
    assert!(matches!(
        result,
        Err(AdminLoginError::Authentication(AuthnError::UsernameUnknown))
    ));
}

#[tokio::test]
async fn site_login_without_consent_issues_consent_token_only() {
    let state = spawn_state().await;
    let bob = create_active_user(&state, "Bob", "secret").await;
    let site = lanparty_site();

    state
        .consent
        .require_subject_for_brand("privacy-policy-v3", &site.brand_id)
        .await
        .expect("require subject");

    let password = Password::new("secret");
    let result = state
        .site_login
        .log_in_user_to_site(request("Bob", &password), &site.brand_id, &site)
        .await;

    let Err(SiteLoginError::ConsentRequired { verification_token }) = result else {
        panic!("expected consent to be required");
    };

    let token = state
        .verification_tokens
        .find_for_consent_by_token(&verification_token)
        .await
        .expect("find")
        .expect("consent token exists");
    assert_eq!(token.user_id, bob.id);

    assert!(
        state
            .sessions
            .find_session_token_for_user(bob.id)
            .await
            .expect("find")
            .is_none()
    );
    assert!(
        state
            .user_log
            .get_entries_for_user_of_type(bob.id, "user-logged-in-to-site")
            .await
            .expect("log")
            .is_empty()
    );

    state
        .consent
        .consent_to_subject(bob.id, "privacy-policy-v3")
        .await
        .expect("consent");

    let logged_in = state
        .site_login
        .log_in_user_to_site(request("Bob", &password), &site.brand_id, &site)
        .await
        .expect("site login after consent");

    assert_eq!(logged_in.event.site.id, site.id);
    assert_eq!(logged_in.event.initiator.id, bob.id);

    let entries = state
        .user_log
        .get_entries_for_user_of_type(bob.id, "user-logged-in-to-site")
        .await
        .expect("log");
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].data.get("site_id").and_then(|v| v.as_str()),
        Some("lanparty-2026")
    );
}

#[tokio::test]
async fn site_login_without_required_subjects_succeeds() {
    let state = spawn_state().await;
    let dave = create_active_user(&state, "Dave", "secret").await;
    let site = lanparty_site();

    let password = Password::new("secret");
    let logged_in = state
        .site_login
        .log_in_user_to_site(request("dave@example.com", &password), &site.brand_id, &site)
        .await
        .expect("site login");

    assert_eq!(logged_in.user.id, dave.id);
    assert!(!logged_in.session.permanent);
}

#[tokio::test]
async fn site_login_rejects_suspended_accounts() {
    let state = spawn_state().await;
    let eve = create_active_user(&state, "Eve", "secret").await;
    state.users.suspend_user(eve.id).await.expect("suspend");
    let site = lanparty_site();

    let password = Password::new("secret");
    let result = state
        .site_login
        .log_in_user_to_site(request("Eve", &password), &site.brand_id, &site)
        .await;
    assert!(matches!(
        result,
        Err(SiteLoginError::Authentication(AuthnError::AccountSuspended))
    ));
}

#[tokio::test]
async fn logout_keeps_the_server_token() {
    let state = spawn_state().await;
    let alice = create_active_user(&state, "Alice", "secret").await;
    grant_admin_access(&state, &alice).await;

    let password = Password::new("secret");
    let first = state
        .admin_login
        .log_in_user_to_admin(request("Alice", &password))
        .await
        .expect("login");
    let token = first.session.token.clone();

    log_out_user(&first.user, first.session);

    assert!(state.sessions.is_session_valid(alice.id, &token).await.expect("check"));

    let second = state
        .admin_login
        .log_in_user_to_admin(request("Alice", &password))
        .await
        .expect("login again");
    assert_eq!(second.session.token, token);
}

#[tokio::test]
async fn logins_can_be_traced_by_ip_and_pruned() {
    let state = spawn_state().await;
    let alice = create_active_user(&state, "Alice", "secret").await;
    let bob = create_active_user(&state, "Bob", "secret").await;
    grant_admin_access(&state, &alice).await;
    let site = lanparty_site();

    let password = Password::new("secret");
    state
        .admin_login
        .log_in_user_to_admin(request("Alice", &password))
        .await
        .expect("alice login");
    state
        .site_login
        .log_in_user_to_site(request("Bob", &password), &site.brand_id, &site)
        .await
        .expect("bob login");
    state
        .site_login
        .log_in_user_to_site(
            LoginRequest {
                ip_address: Some("198.51.100.7"),
                ..request("Bob", &password)
            },
            &site.brand_id,
            &site,
        )
        .await
        .expect("bob login elsewhere");

    let logins = state
        .user_log
        .find_logins_for_ip_address("192.0.2.10")
        .await
        .expect("by ip");
    let user_ids: Vec<_> = logins.iter().map(|(_, user_id)| *user_id).collect();
    assert_eq!(user_ids, vec![alice.id, bob.id]);

    let other = state
        .user_log
        .find_logins_for_ip_address("198.51.100.7")
        .await
        .expect("by ip");
    assert_eq!(other.len(), 1);

    // Nothing is older than an hour ago.
    let pruned = state
        .user_log
        .delete_login_entries(Utc::now() - Duration::hours(1))
        .await
        .expect("prune");
    assert_eq!(pruned, 0);

    let pruned = state
        .user_log
        .delete_login_entries(Utc::now() + Duration::seconds(1))
        .await
        .expect("prune");
    assert_eq!(pruned, 3);

    assert!(
        state
            .user_log
            .find_logins_for_ip_address("192.0.2.10")
            .await
            .expect("by ip")
            .is_empty()
    );
}

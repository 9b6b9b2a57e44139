#![allow(dead_code)]

use byceps_authn::config::Config;
use byceps_authn::db::Store;
use byceps_authn::domain::{Password, User};
use byceps_authn::state::SharedState;

/// Cheap parameters so tests do not spend their time hashing.
pub const TEST_HASH_METHOD: &str = "argon2id:64:1:1";

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.security.password_hash_method = TEST_HASH_METHOD.to_string();
    config
}

pub async fn spawn_state() -> SharedState {
    spawn_state_with(test_config()).await
}

pub async fn spawn_state_with(config: Config) -> SharedState {
    let store = Store::in_memory().await.expect("Failed to open store");
    SharedState::with_store(config, store).expect("Failed to build state")
}

/// Create an initialized account with a password.
pub async fn create_active_user(state: &SharedState, screen_name: &str, password: &str) -> User {
    let email = format!("{}@example.com", screen_name.to_lowercase());
    let user = state
        .users
        .create_user(screen_name, Some(&email))
        .await
        .expect("Failed to create user");

    state
        .credentials
        .create_password_hash(user.id, &Password::new(password))
        .await
        .expect("Failed to create password hash");

    state
        .users
        .initialize_user(user.id)
        .await
        .expect("Failed to initialize user");

    state
        .users
        .get_user(user.id)
        .await
        .expect("Failed to reload user")
        .expect("User vanished")
}

pub async fn grant_admin_access(state: &SharedState, user: &User) {
    state
        .authz
        .assign_permission_to_role("admin.access", "orga")
        .await
        .expect("Failed to set up role");
    state
        .authz
        .assign_role_to_user("orga", user.id)
        .await
        .expect("Failed to assign role");
}

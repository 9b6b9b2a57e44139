pub mod prelude;

pub mod authz_role_permissions;
pub mod authz_user_roles;
pub mod consent_subject_requirements;
pub mod consents;
pub mod credentials;
pub mod identity_tags;
pub mod recent_logins;
pub mod session_tokens;
pub mod user_log_entries;
pub mod users;
pub mod verification_tokens;

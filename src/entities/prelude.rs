pub use super::authz_role_permissions::Entity as AuthzRolePermissions;
pub use super::authz_user_roles::Entity as AuthzUserRoles;
pub use super::consent_subject_requirements::Entity as ConsentSubjectRequirements;
pub use super::consents::Entity as Consents;
pub use super::credentials::Entity as Credentials;
pub use super::identity_tags::Entity as IdentityTags;
pub use super::recent_logins::Entity as RecentLogins;
pub use super::session_tokens::Entity as SessionTokens;
pub use super::user_log_entries::Entity as UserLogEntries;
pub use super::users::Entity as Users;
pub use super::verification_tokens::Entity as VerificationTokens;

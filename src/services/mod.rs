pub mod password;
pub use password::{DEFAULT_HASH_METHOD, HashAlgorithm, HashMethod, PasswordHasher};

pub mod authz;
pub use authz::{ADMIN_ACCESS_PERMISSION, AuthzService};

pub mod consent;
pub use consent::ConsentService;

pub mod users;
pub use users::UserDirectory;

pub mod user_log;
pub use user_log::UserLogService;

pub mod verification_token;
pub use verification_token::VerificationTokenService;

pub mod credential_service;
pub mod credential_service_impl;
pub use credential_service::{CredentialError, CredentialService};
pub use credential_service_impl::SeaOrmCredentialService;

pub mod password_reset;
pub use password_reset::{PasswordResetError, PasswordResetService};

pub mod session_service;
pub mod session_service_impl;
pub use session_service::{LoginSurface, SessionError, SessionService};
pub use session_service_impl::SeaOrmSessionService;

pub mod authn_service;
pub mod authn_service_impl;
pub use authn_service::{AuthnError, AuthnService};
pub use authn_service_impl::SeaOrmAuthnService;

pub mod identity_tag_service;
pub mod identity_tag_service_impl;
pub use identity_tag_service::{IdentityTagDetails, IdentityTagError, IdentityTagService};
pub use identity_tag_service_impl::SeaOrmIdentityTagService;

pub mod login_service;
pub mod login_service_impl;
pub use login_service::{
    AdminLoginError, AdminLoginService, ClientSession, LoggedIn, LoginRequest, SiteLoginError,
    SiteLoginService, log_out_user,
};
pub use login_service_impl::{DefaultAdminLoginService, DefaultSiteLoginService};

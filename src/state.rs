use std::sync::Arc;

use crate::config::{Config, SecurityConfig};
use crate::db::Store;
use crate::services::{
    AdminLoginService, AuthnService, AuthzService, ConsentService, CredentialService,
    DefaultAdminLoginService, DefaultSiteLoginService, IdentityTagService, PasswordHasher,
    PasswordResetService, SeaOrmAuthnService, SeaOrmCredentialService, SeaOrmIdentityTagService,
    SeaOrmSessionService, SessionService, SiteLoginService, UserDirectory, UserLogService,
    VerificationTokenService,
};

/// All services wired against one store.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub users: UserDirectory,

    pub authz: AuthzService,

    pub consent: ConsentService,

    pub verification_tokens: VerificationTokenService,

    pub user_log: UserLogService,

    pub credentials: Arc<dyn CredentialService>,

    pub password_reset: PasswordResetService,

    pub sessions: Arc<dyn SessionService>,

    pub authn: Arc<dyn AuthnService>,

    pub identity_tags: Arc<dyn IdentityTagService>,

    pub admin_login: Arc<dyn AdminLoginService>,

    pub site_login: Arc<dyn SiteLoginService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires the services against an already connected store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let security: &SecurityConfig = &config.security;
        let hasher = PasswordHasher::new(security.hash_method()?);

        let users = UserDirectory::new(store.clone());
        let authz = AuthzService::new(store.clone());
        let consent = ConsentService::new(store.clone());
        let verification_tokens = VerificationTokenService::new(store.clone());
        let user_log = UserLogService::new(store.clone());

        let credentials: Arc<dyn CredentialService> =
            Arc::new(SeaOrmCredentialService::new(store.clone(), hasher));
        let password_reset = PasswordResetService::new(
            users.clone(),
            credentials.clone(),
            verification_tokens.clone(),
        );
        let sessions: Arc<dyn SessionService> = Arc::new(SeaOrmSessionService::new(store.clone()));
        let authn: Arc<dyn AuthnService> = Arc::new(SeaOrmAuthnService::new(
            store.clone(),
            credentials.clone(),
            security.auto_migrate_password_hashes,
        ));
        let identity_tags: Arc<dyn IdentityTagService> =
            Arc::new(SeaOrmIdentityTagService::new(store.clone()));

        let admin_login: Arc<dyn AdminLoginService> = Arc::new(DefaultAdminLoginService::new(
            authn.clone(),
            sessions.clone(),
            authz.clone(),
        ));
        let site_login: Arc<dyn SiteLoginService> = Arc::new(DefaultSiteLoginService::new(
            authn.clone(),
            sessions.clone(),
            consent.clone(),
            verification_tokens.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            users,
            authz,
            consent,
            verification_tokens,
            user_log,
            credentials,
            password_reset,
            sessions,
            authn,
            identity_tags,
            admin_login,
            site_login,
        })
    }
}

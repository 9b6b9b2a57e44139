//! Default implementations of the admin and site login services.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::events::{
    EventSite, EventUser, UserLoggedInToAdminEvent, UserLoggedInToSiteEvent,
};
use crate::domain::{BrandId, Site};
use crate::services::authn_service::AuthnService;
use crate::services::authz::{ADMIN_ACCESS_PERMISSION, AuthzService};
use crate::services::consent::ConsentService;
use crate::services::login_service::{
    AdminLoginError, AdminLoginService, ClientSession, LoggedIn, LoginRequest, SiteLoginError,
    SiteLoginService,
};
use crate::services::session_service::{LoginSurface, SessionService};
use crate::services::verification_token::VerificationTokenService;

pub const LOGIN_ATTEMPTS_METRIC: &str = "authn_login_attempts_total";

fn record_attempt(surface: &'static str, outcome: &'static str) {
    metrics::counter!(LOGIN_ATTEMPTS_METRIC, "surface" => surface, "outcome" => outcome)
        .increment(1);
}

pub struct DefaultAdminLoginService {
    authn: Arc<dyn AuthnService>,
    sessions: Arc<dyn SessionService>,
    authz: AuthzService,
}

impl DefaultAdminLoginService {
    #[must_use]
    pub fn new(
        authn: Arc<dyn AuthnService>,
        sessions: Arc<dyn SessionService>,
        authz: AuthzService,
    ) -> Self {
        Self {
            authn,
            sessions,
            authz,
        }
    }
}

#[async_trait]
impl AdminLoginService for DefaultAdminLoginService {
    async fn log_in_user_to_admin(
        &self,
        request: LoginRequest<'_>,
    ) -> Result<LoggedIn<UserLoggedInToAdminEvent>, AdminLoginError> {
        let user = match self
            .authn
            .authenticate(request.username, request.password)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                record_attempt("admin", e.kind());
                warn!(username = request.username, error = %e, "Admin login failed");
                return Err(e.into());
            }
        };

        if !self
            .authz
            .has_permission(user.id, ADMIN_ACCESS_PERMISSION)
            .await?
        {
            record_attempt("admin", "authorization_failed");
            warn!(user_id = %user.id, "Admin login denied: missing permission");
            return Err(AdminLoginError::AuthorizationFailed);
        }

        let occurred_at = Utc::now();
        let token = self
            .sessions
            .log_in_user(&user, request.ip_address, &LoginSurface::Admin, occurred_at)
            .await?;

        record_attempt("admin", "success");
        info!(user_id = %user.id, "User logged in to admin");

        let event = UserLoggedInToAdminEvent {
            occurred_at,
            initiator: EventUser::from_user(&user),
        };

        Ok(LoggedIn {
            session: ClientSession {
                user_id: user.id,
                token: token.token,
                permanent: request.permanent,
            },
            user,
            event,
        })
    }
}

pub struct DefaultSiteLoginService {
    authn: Arc<dyn AuthnService>,
    sessions: Arc<dyn SessionService>,
    consent: ConsentService,
    verification_tokens: VerificationTokenService,
}

impl DefaultSiteLoginService {
    #[must_use]
    pub fn new(
        authn: Arc<dyn AuthnService>,
        sessions: Arc<dyn SessionService>,
        consent: ConsentService,
        verification_tokens: VerificationTokenService,
    ) -> Self {
        Self {
            authn,
            sessions,
            consent,
            verification_tokens,
        }
    }
}

#[async_trait]
impl SiteLoginService for DefaultSiteLoginService {
    async fn log_in_user_to_site(
        &self,
        request: LoginRequest<'_>,
        brand_id: &BrandId,
        site: &Site,
    ) -> Result<LoggedIn<UserLoggedInToSiteEvent>, SiteLoginError> {
        let user = match self
            .authn
            .authenticate(request.username, request.password)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                record_attempt("site", e.kind());
                warn!(
                    username = request.username,
                    site_id = %site.id,
                    error = %e,
                    "Site login failed"
                );
                return Err(e.into());
            }
        };

        let required_subject_ids = self
            .consent
            .get_subject_ids_required_for_brand(brand_id)
            .await?;

        if !self
            .consent
            .has_user_consented_to_all_subjects(user.id, &required_subject_ids)
            .await?
        {
            let verification_token = self.verification_tokens.create_for_consent(user.id).await?;

            record_attempt("site", "consent_required");
            info!(user_id = %user.id, brand_id = %brand_id, "Site login requires consent");

            return Err(SiteLoginError::ConsentRequired {
                verification_token: verification_token.token,
            });
        }

        let occurred_at = Utc::now();
        let token = self
            .sessions
            .log_in_user(
                &user,
                request.ip_address,
                &LoginSurface::Site(site.id.clone()),
                occurred_at,
            )
            .await?;

        record_attempt("site", "success");
        info!(user_id = %user.id, site_id = %site.id, "User logged in to site");

        let event = UserLoggedInToSiteEvent {
            occurred_at,
            initiator: EventUser::from_user(&user),
            site: EventSite::from_site(site),
        };

        Ok(LoggedIn {
            session: ClientSession {
                user_id: user.id,
                token: token.token,
                permanent: request.permanent,
            },
            user,
            event,
        })
    }
}

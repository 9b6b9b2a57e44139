pub mod authz;
pub mod consent;
pub mod credential;
pub mod identity_tag;
pub mod session;
pub mod user;
pub mod user_log;
pub mod verification_token;

mod logins;
mod sessions;
mod tags;

pub use logins::{cmd_logins_by_ip, cmd_logins_prune};
pub use sessions::cmd_sessions_purge;
pub use tags::{cmd_tags_list, cmd_tags_lookup};

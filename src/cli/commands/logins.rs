//! Login forensics and retention command handlers

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use crate::domain::UserId;
use crate::state::SharedState;

pub async fn cmd_logins_by_ip(state: &SharedState, ip_address: &str) -> anyhow::Result<()> {
    let logins = state.user_log.find_logins_for_ip_address(ip_address).await?;

    if logins.is_empty() {
        println!("No logins from {ip_address}.");
        return Ok(());
    }

    let user_ids: HashSet<UserId> = logins.iter().map(|(_, user_id)| *user_id).collect();
    let users = state.users.get_users_indexed_by_id(&user_ids).await?;

    println!("Logins from {} ({} total)", ip_address, logins.len());
    println!("{:-<70}", "");

    for (occurred_at, user_id) in logins {
        let screen_name = users
            .get(&user_id)
            .map_or("<unknown>", |u| u.screen_name.as_str());
        println!("• {} {} ({})", occurred_at.to_rfc3339(), screen_name, user_id);
    }

    Ok(())
}

pub async fn cmd_logins_prune(state: &SharedState, days: Option<u32>) -> anyhow::Result<()> {
    let days = days.unwrap_or(state.config.retention.login_entries_days);
    let occurred_before = retention_cutoff(Utc::now(), days)?;

    let deleted = state.user_log.delete_login_entries(occurred_before).await?;

    println!("✓ Deleted {deleted} login entries older than {days} day(s).");
    Ok(())
}

/// Start of the retention window, `days` before `now`.
fn retention_cutoff(now: DateTime<Utc>, days: u32) -> anyhow::Result<DateTime<Utc>> {
    Duration::try_days(i64::from(days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| anyhow::anyhow!("Retention of {days} day(s) reaches past the earliest date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_days_before_now() {
        let now = Utc::now();
        assert_eq!(retention_cutoff(now, 90).unwrap(), now - Duration::days(90));
        assert_eq!(retention_cutoff(now, 0).unwrap(), now);
    }

    #[test]
    fn oversized_retention_is_an_error() {
        assert!(retention_cutoff(Utc::now(), u32::MAX).is_err());
    }
}

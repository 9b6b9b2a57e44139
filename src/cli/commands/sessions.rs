use crate::state::SharedState;

pub async fn cmd_sessions_purge(state: &SharedState) -> anyhow::Result<()> {
    let deleted = state.sessions.delete_all_session_tokens().await?;

    println!("✓ Invalidated {deleted} session(s).");
    Ok(())
}

use crate::state::SharedState;

pub async fn cmd_tags_list(state: &SharedState) -> anyhow::Result<()> {
    let tags = state.identity_tags.get_all_tags().await?;

    if tags.is_empty() {
        println!("No identity tags registered.");
        return Ok(());
    }

    println!("Identity Tags ({} total)", tags.len());
    println!("{:-<70}", "");

    for details in tags {
        let status = if details.tag.suspended { "suspended" } else { "active" };
        println!(
            "• {} → {} [{}]",
            details.tag.identifier, details.user.screen_name, status
        );
        println!(
            "  ID: {} | Created: {} by {}",
            details.tag.id,
            details.tag.created_at.to_rfc3339(),
            details.creator.screen_name
        );
        if let Some(note) = &details.tag.note {
            println!("  Note: {note}");
        }
    }

    Ok(())
}

pub async fn cmd_tags_lookup(state: &SharedState, identifier: &str) -> anyhow::Result<()> {
    let Some(details) = state
        .identity_tags
        .find_tag_details_by_identifier(identifier)
        .await?
    else {
        println!("No tag found for identifier '{identifier}'.");
        return Ok(());
    };

    let tag = &details.tag;
    println!("Tag {} ({})", tag.identifier, tag.id);
    println!("  User: {} ({})", details.user.screen_name, tag.user_id);
    println!("  Created by: {}", details.creator.screen_name);
    println!("  Suspended: {}", if tag.suspended { "yes" } else { "no" });

    Ok(())
}

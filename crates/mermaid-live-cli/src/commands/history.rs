use anyhow::{Result, bail};

use mermaid_live_core::codec;
use mermaid_live_core::history::DiagramRecord;

use crate::context::AppContext;

pub async fn list(ctx: &AppContext, search: Option<&str>) -> Result<()> {
    let records = match search {
        Some(query) => ctx.history.search(query).await?,
        None => ctx.history.list().await?,
    };

    if records.is_empty() {
        println!("No saved diagrams");
        return Ok(());
    }

    for record in &records {
        println!("{}", format_row(record));
    }
    Ok(())
}

fn format_row(record: &DiagramRecord) -> String {
    format!(
        "{} {}  {}  (last used {})",
        if record.pinned { "*" } else { " " },
        record.id,
        record.display_name,
        record.last_accessed_at.format("%Y-%m-%d %H:%M")
    )
}

/// Prints a record with its URLs. Like reopening it, this marks it as used.
pub async fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let Some(record) = ctx.history.touch(id).await? else {
        bail!("No diagram with id {}", id);
    };

    let token = codec::encode_with_theme(&record.description, &ctx.settings.theme)?;
    let urls = ctx.urls();

    println!("{}{}", record.display_name, if record.pinned { " (pinned)" } else { "" });
    println!("created: {}", record.created_at.to_rfc3339());
    println!("image:   {}", urls.image_url(&token));
    println!("editor:  {}", urls.editor_url(&token));
    println!();
    println!("{}", record.description);
    Ok(())
}

pub async fn rename(ctx: &AppContext, id: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Name must not be blank");
    }
    match ctx.history.rename(id, name).await? {
        Some(record) => println!("Renamed to {}", record.display_name),
        None => bail!("No diagram with id {}", id),
    }
    Ok(())
}

pub async fn pin(ctx: &AppContext, id: &str) -> Result<()> {
    match ctx.history.toggle_pin(id).await? {
        Some(record) if record.pinned => println!("Pinned {}", record.display_name),
        Some(record) => println!("Unpinned {}", record.display_name),
        None => bail!("No diagram with id {}", id),
    }
    Ok(())
}

pub async fn delete(ctx: &AppContext, id: &str) -> Result<()> {
    if ctx.history.delete(id).await? {
        println!("Deleted {}", id);
    } else {
        println!("No diagram with id {}", id);
    }
    Ok(())
}

use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;

use mermaid_live_core::{classifier, codec};

use crate::context::AppContext;

pub fn encode(ctx: &AppContext, file: Option<&Path>) -> Result<()> {
    let text = match file {
        None => bail!("A diagram file (or `-` for stdin) is required"),
        Some(path) if path == Path::new("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
    };

    let description = text.trim();
    if description.is_empty() {
        bail!("Diagram is empty");
    }
    if !classifier::is_candidate(description) {
        tracing::warn!(target: "url", "Input does not look like a Mermaid diagram");
    }

    let token = codec::encode_with_theme(description, &ctx.settings.theme)?;
    let urls = ctx.urls();
    println!("{}", urls.image_url(&token));
    println!("{}", urls.editor_url(&token));
    Ok(())
}

pub fn decode(token: &str) -> Result<()> {
    let description = codec::decode(token.trim())?;
    println!("{}", description);
    Ok(())
}

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use mermaid_live_application::{ClipboardWatcher, DiagramSession};
use mermaid_live_core::active::ActiveDiagram;
use mermaid_live_core::codec::RenderUrls;

use crate::clipboard::SystemClipboard;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, interval_ms: Option<u64>) -> Result<()> {
    let period = interval_ms
        .map(|ms| Duration::from_millis(ms.max(1)))
        .unwrap_or_else(|| ctx.settings.poll_interval());
    let urls = ctx.urls();

    let session = Arc::new(
        DiagramSession::new(ctx.history.clone(), ctx.last_rendered.clone())
            .with_theme(&ctx.settings.theme),
    );
    let restored = session.restore().await;
    if restored.is_ready() {
        println!("{}", describe(&restored, &urls));
    }
    let mut states = session.subscribe();

    let cancel = CancellationToken::new();
    let watcher = ClipboardWatcher::new(Arc::new(SystemClipboard), session.clone(), period);
    let handle = watcher.spawn(cancel.clone());

    println!("Watching the clipboard. Press Ctrl-C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                if !matches!(state, ActiveDiagram::Loading | ActiveDiagram::Rendering) {
                    println!("{}", describe(&state, &urls));
                }
            }
        }
    }

    cancel.cancel();
    handle.await?;
    Ok(())
}

/// One-line (or, for a diagram, multi-line) summary of a state.
fn describe(state: &ActiveDiagram, urls: &RenderUrls) -> String {
    match state {
        ActiveDiagram::Loading => "Loading...".to_string(),
        ActiveDiagram::Empty => "Clipboard is empty".to_string(),
        ActiveDiagram::Invalid => "Clipboard does not hold a Mermaid diagram".to_string(),
        ActiveDiagram::Rendering => "Rendering...".to_string(),
        ActiveDiagram::Failed { reason } => format!("Failed to render diagram: {}", reason),
        ActiveDiagram::Ready(diagram) => {
            let stats = diagram.stats();
            let name = match &diagram.record {
                Some(record) if record.pinned => format!("{} (pinned)", record.display_name),
                Some(record) => record.display_name.clone(),
                None => format!("{} (not saved)", stats.kind),
            };
            format!(
                "{}: {} lines, {} chars\n  image:  {}\n  editor: {}",
                name,
                stats.lines,
                stats.characters,
                urls.image_url(&diagram.token),
                urls.editor_url(&diagram.token)
            )
        }
    }
}

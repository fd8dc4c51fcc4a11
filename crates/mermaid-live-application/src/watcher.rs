//! Clipboard polling loop.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use mermaid_live_core::classifier;
use mermaid_live_core::clipboard::ClipboardSource;

use crate::session::DiagramSession;

/// What a single clipboard sample did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Same text as the previous sample; nothing happened.
    Unchanged,
    /// The clipboard is empty.
    Empty,
    /// Not a diagram, and nothing was shown.
    Invalid,
    /// Not a diagram, but the shown diagram was kept.
    Preserved,
    Rendered,
    /// Rendering was attempted and failed.
    Failed,
}

/// Samples the clipboard and drives a [`DiagramSession`] from it.
pub struct ClipboardWatcher {
    clipboard: Arc<dyn ClipboardSource>,
    session: Arc<DiagramSession>,
    period: Duration,
    last_seen: Option<String>,
}

impl ClipboardWatcher {
    pub fn new(
        clipboard: Arc<dyn ClipboardSource>,
        session: Arc<DiagramSession>,
        period: Duration,
    ) -> Self {
        Self {
            clipboard,
            session,
            period,
            last_seen: None,
        }
    }

    pub fn session(&self) -> &Arc<DiagramSession> {
        &self.session
    }

    /// Takes one clipboard sample.
    ///
    /// Text identical to the previous sample is skipped, so a failed render
    /// is only retried once the clipboard content changes. A clipboard read
    /// error counts as an empty clipboard. The text is used exactly as
    /// copied: surrounding whitespace is part of the description, and a
    /// whitespace-only sample is not empty.
    pub async fn tick(&mut self) -> TickOutcome {
        let text = match self.clipboard.read_text().await {
            Ok(text) => text.unwrap_or_default(),
            Err(e) if e.is_clipboard_unavailable() => {
                tracing::debug!(target: "watcher", "{}", e);
                String::new()
            }
            Err(e) => {
                tracing::warn!(target: "watcher", "Clipboard read failed: {}", e);
                String::new()
            }
        };

        if self.last_seen.as_deref() == Some(text.as_str()) {
            return TickOutcome::Unchanged;
        }
        self.last_seen = Some(text.clone());

        if text.is_empty() {
            self.session.show_empty();
            return TickOutcome::Empty;
        }

        if !classifier::is_candidate(&text) {
            tracing::debug!(target: "watcher", "Clipboard text is not a diagram");
            return if self.session.show_invalid() {
                TickOutcome::Preserved
            } else {
                TickOutcome::Invalid
            };
        }

        tracing::info!(
            target: "watcher",
            "New {} diagram on clipboard ({} chars)",
            classifier::classify(&text),
            text.chars().count()
        );
        match self.session.render(&text).await {
            Ok(_) => TickOutcome::Rendered,
            Err(_) => TickOutcome::Failed,
        }
    }

    /// Polls until `cancel` fires.
    ///
    /// The first sample is taken immediately. Ticks missed while a render is
    /// in flight are skipped rather than bunched up.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            target: "watcher",
            "Watching clipboard every {:?}",
            self.period
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let outcome = self.tick().await;
                    if outcome != TickOutcome::Unchanged {
                        tracing::debug!(target: "watcher", "Tick: {:?}", outcome);
                    }
                }
            }
        }

        tracing::info!(target: "watcher", "Clipboard watcher stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mermaid_live_core::active::ActiveDiagram;
    use mermaid_live_core::error::{MermaidLiveError, Result};
    use mermaid_live_core::store::KeyValueStore;
    use mermaid_live_infrastructure::{
        KvHistoryRepository, KvLastRenderedRepository, MemoryKeyValueStore,
    };
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const FLOWCHART: &str = "graph TD\nA-->B";

    /// Clipboard whose content the test sets directly.
    #[derive(Default)]
    struct FakeClipboard {
        text: Mutex<Option<String>>,
        fail: AtomicBool,
        reads: AtomicUsize,
    }

    impl FakeClipboard {
        fn set(&self, text: &str) {
            *self.text.lock().unwrap() = Some(text.to_string());
        }
    }

    #[async_trait]
    impl ClipboardSource for FakeClipboard {
        async fn read_text(&self) -> Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(MermaidLiveError::clipboard("no display"));
            }
            Ok(self.text.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKeyValueStore,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(MermaidLiveError::store("disk full"));
            }
            self.inner.set(key, value).await
        }
    }

    fn create_watcher(store: Arc<dyn KeyValueStore>) -> (ClipboardWatcher, Arc<FakeClipboard>) {
        let session = Arc::new(DiagramSession::new(
            Arc::new(KvHistoryRepository::new(store.clone())),
            Arc::new(KvLastRenderedRepository::new(store)),
        ));
        let clipboard = Arc::new(FakeClipboard::default());
        let watcher = ClipboardWatcher::new(
            clipboard.clone(),
            session,
            Duration::from_millis(10),
        );
        (watcher, clipboard)
    }

    #[tokio::test]
    async fn test_first_tick_renders_diagram() {
        let (mut watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));
        clipboard.set(FLOWCHART);

        assert_eq!(watcher.tick().await, TickOutcome::Rendered);
        assert!(watcher.session().current().is_ready());
        assert_eq!(watcher.session().history().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_text_is_skipped() {
        let (mut watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));
        clipboard.set(FLOWCHART);

        watcher.tick().await;
        assert_eq!(watcher.tick().await, TickOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_description_keeps_surrounding_whitespace() {
        let (mut watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));
        clipboard.set("\n  graph TD\nA-->B  \n");

        watcher.tick().await;
        let current = watcher.session().current();
        assert_eq!(current.ready().unwrap().description, "\n  graph TD\nA-->B  \n");

        let records = watcher.session().history().list().await.unwrap();
        assert_eq!(records[0].description, "\n  graph TD\nA-->B  \n");
    }

    #[tokio::test]
    async fn test_whitespace_variants_are_separate_records() {
        let (mut watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));

        clipboard.set("graph TD\nA-->B\n");
        assert_eq!(watcher.tick().await, TickOutcome::Rendered);
        clipboard.set(FLOWCHART);
        assert_eq!(watcher.tick().await, TickOutcome::Rendered);

        let records = watcher.session().history().list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, FLOWCHART);
        assert_eq!(records[1].description, "graph TD\nA-->B\n");
    }

    #[tokio::test]
    async fn test_empty_clipboard() {
        let (mut watcher, _clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));
        assert_eq!(watcher.tick().await, TickOutcome::Empty);
        assert_eq!(watcher.session().current(), ActiveDiagram::Empty);
    }

    #[tokio::test]
    async fn test_whitespace_only_sample_is_not_a_diagram() {
        let (mut watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));

        clipboard.set("   \n\t");
        assert_eq!(watcher.tick().await, TickOutcome::Invalid);
        assert_eq!(watcher.session().current(), ActiveDiagram::Invalid);

        clipboard.set(FLOWCHART);
        watcher.tick().await;
        let shown = watcher.session().current();

        clipboard.set("  ");
        assert_eq!(watcher.tick().await, TickOutcome::Preserved);
        assert_eq!(watcher.session().current(), shown);
    }

    #[tokio::test]
    async fn test_invalid_text_keeps_shown_diagram() {
        let (mut watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));

        clipboard.set("hello world");
        assert_eq!(watcher.tick().await, TickOutcome::Invalid);
        assert_eq!(watcher.session().current(), ActiveDiagram::Invalid);

        clipboard.set(FLOWCHART);
        watcher.tick().await;
        let shown = watcher.session().current();

        clipboard.set("just some prose");
        assert_eq!(watcher.tick().await, TickOutcome::Preserved);
        assert_eq!(watcher.session().current(), shown);
    }

    #[tokio::test]
    async fn test_recopying_diagram_does_not_duplicate_history() {
        let (mut watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));

        clipboard.set(FLOWCHART);
        watcher.tick().await;
        clipboard.set("other text");
        watcher.tick().await;
        clipboard.set(FLOWCHART);
        assert_eq!(watcher.tick().await, TickOutcome::Rendered);

        assert_eq!(watcher.session().history().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clipboard_error_counts_as_empty() {
        let (mut watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));
        clipboard.set(FLOWCHART);
        watcher.tick().await;

        clipboard.fail.store(true, Ordering::SeqCst);
        assert_eq!(watcher.tick().await, TickOutcome::Empty);

        clipboard.fail.store(false, Ordering::SeqCst);
        assert_eq!(watcher.tick().await, TickOutcome::Rendered);
    }

    #[tokio::test]
    async fn test_failed_render_retried_only_on_change() {
        let store = Arc::new(FlakyStore::default());
        let (mut watcher, clipboard) = create_watcher(store.clone());

        store.fail_writes.store(true, Ordering::SeqCst);
        clipboard.set(FLOWCHART);
        assert_eq!(watcher.tick().await, TickOutcome::Failed);
        assert!(matches!(
            watcher.session().current(),
            ActiveDiagram::Failed { .. }
        ));

        store.fail_writes.store(false, Ordering::SeqCst);
        assert_eq!(watcher.tick().await, TickOutcome::Unchanged);

        clipboard.set("sequenceDiagram\nA->>B: hi");
        assert_eq!(watcher.tick().await, TickOutcome::Rendered);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let (watcher, clipboard) = create_watcher(Arc::new(MemoryKeyValueStore::new()));
        clipboard.set(FLOWCHART);
        let session = watcher.session().clone();
        let mut rx = session.subscribe();

        let cancel = CancellationToken::new();
        let handle = watcher.spawn(cancel.clone());

        rx.wait_for(|state| state.is_ready()).await.unwrap();

        cancel.cancel();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("watcher did not stop")
            .unwrap();

        let reads = clipboard.reads.load(Ordering::SeqCst);
        assert!(reads >= 1);
    }
}

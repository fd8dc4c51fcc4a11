//! Active diagram session.
//!
//! Owns the [`ActiveDiagram`] state, publishes it through a `watch` channel,
//! and routes user commands (save, rename, pin) to the history repository.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

use mermaid_live_core::active::{ActiveDiagram, LastRenderedRepository, RenderedDiagram};
use mermaid_live_core::classifier;
use mermaid_live_core::codec::{self, DEFAULT_THEME};
use mermaid_live_core::error::{MermaidLiveError, Result};
use mermaid_live_core::history::{DiagramRecord, HistoryRepository};

/// What the preview currently shows, and the commands it accepts.
pub struct DiagramSession {
    history: Arc<dyn HistoryRepository>,
    last_rendered: Arc<dyn LastRenderedRepository>,
    theme: String,
    state: watch::Sender<ActiveDiagram>,
}

impl DiagramSession {
    pub fn new(
        history: Arc<dyn HistoryRepository>,
        last_rendered: Arc<dyn LastRenderedRepository>,
    ) -> Self {
        let (state, _) = watch::channel(ActiveDiagram::Loading);
        Self {
            history,
            last_rendered,
            theme: DEFAULT_THEME.to_string(),
            state,
        }
    }

    /// Sets the Mermaid theme baked into render tokens.
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn history(&self) -> &Arc<dyn HistoryRepository> {
        &self.history
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> ActiveDiagram {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ActiveDiagram> {
        self.state.subscribe()
    }

    fn transition(&self, next: ActiveDiagram) {
        let previous = self.state.send_replace(next);
        tracing::debug!(
            target: "session",
            "Active diagram: {} -> {}",
            previous.name(),
            self.state.borrow().name()
        );
    }

    fn encode(&self, description: &str) -> Result<String> {
        codec::encode_with_theme(description, &self.theme)
    }

    // ============================================================================
    // Startup
    // ============================================================================

    /// Restores the last accepted diagram from storage.
    ///
    /// Runs the history migration first. The matching history record is only
    /// looked up, never created. Failures are logged and leave the session in
    /// `Loading`, for the first clipboard sample to resolve.
    pub async fn restore(&self) -> ActiveDiagram {
        self.transition(ActiveDiagram::Loading);

        if let Err(e) = self.history.migrate().await {
            tracing::warn!(target: "session", "History migration failed: {}", e);
        }

        match self.try_restore().await {
            Ok(Some(diagram)) => {
                tracing::info!(
                    target: "session",
                    "Restored last diagram (saved: {})",
                    diagram.is_saved()
                );
                self.transition(ActiveDiagram::Ready(diagram));
            }
            Ok(None) => tracing::debug!(target: "session", "No diagram to restore"),
            Err(e) => tracing::warn!(target: "session", "Failed to restore last diagram: {}", e),
        }

        self.current()
    }

    async fn try_restore(&self) -> Result<Option<RenderedDiagram>> {
        let Some(last) = self.last_rendered.load().await? else {
            return Ok(None);
        };

        let token = self.encode(&last.description)?;
        let record = self.history.find_by_description(&last.description).await?;

        Ok(Some(RenderedDiagram {
            description: last.description,
            token,
            record,
            rendered_at: last.updated_at,
        }))
    }

    // ============================================================================
    // Clipboard-driven transitions
    // ============================================================================

    pub fn show_empty(&self) {
        self.transition(ActiveDiagram::Empty);
    }

    /// Handles non-diagram text.
    ///
    /// A diagram already on screen stays; otherwise the session becomes
    /// `Invalid`. Returns `true` if the current diagram was kept.
    pub fn show_invalid(&self) -> bool {
        let replaced = self.state.send_if_modified(|state| {
            if state.is_ready() {
                return false;
            }
            *state = ActiveDiagram::Invalid;
            true
        });
        !replaced
    }

    /// Accepts a diagram description: encodes it, remembers it as the last
    /// diagram, and saves it to (or touches it in) the history.
    ///
    /// Any failure moves the session to `Failed` and is returned.
    pub async fn render(&self, description: &str) -> Result<RenderedDiagram> {
        self.transition(ActiveDiagram::Rendering);

        match self.try_render(description).await {
            Ok(diagram) => {
                self.transition(ActiveDiagram::Ready(diagram.clone()));
                Ok(diagram)
            }
            Err(e) => {
                tracing::error!(target: "session", "Failed to render diagram: {}", e);
                self.transition(ActiveDiagram::Failed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn try_render(&self, description: &str) -> Result<RenderedDiagram> {
        let token = self.encode(description)?;
        let now = Utc::now();

        self.last_rendered.save(description, now).await?;
        let record = self
            .history
            .upsert_by_description(description, &auto_name)
            .await?;

        Ok(RenderedDiagram {
            description: description.to_string(),
            token,
            record: Some(record),
            rendered_at: Some(now),
        })
    }

    // ============================================================================
    // User commands (only while Ready)
    // ============================================================================

    fn ready_diagram(&self) -> Result<RenderedDiagram> {
        let state = self.state.borrow();
        match state.ready() {
            Some(diagram) => Ok(diagram.clone()),
            None => Err(MermaidLiveError::invalid_state(format!(
                "no diagram is shown (state: {})",
                state.name()
            ))),
        }
    }

    fn saved_record(&self) -> Result<(RenderedDiagram, DiagramRecord)> {
        let diagram = self.ready_diagram()?;
        let record = diagram
            .record
            .clone()
            .ok_or_else(|| MermaidLiveError::invalid_state("diagram is not saved to history"))?;
        Ok((diagram, record))
    }

    /// Replaces the record of the shown diagram, if it is still `description`.
    ///
    /// The token is left untouched.
    fn update_record(&self, description: &str, record: Option<DiagramRecord>) {
        self.state.send_if_modified(|state| match state.ready_mut() {
            Some(diagram) if diagram.description == description => {
                diagram.record = record;
                true
            }
            _ => false,
        });
    }

    /// Saves the shown diagram to history (or touches its record).
    pub async fn save_now(&self) -> Result<DiagramRecord> {
        let diagram = self.ready_diagram()?;
        let record = self
            .history
            .upsert_by_description(&diagram.description, &auto_name)
            .await?;
        self.update_record(&diagram.description, Some(record.clone()));
        Ok(record)
    }

    /// Renames the shown diagram's record.
    ///
    /// Returns `None` if the record has been deleted from history meanwhile;
    /// the session then shows the diagram as not saved.
    pub async fn rename(&self, new_name: &str) -> Result<Option<DiagramRecord>> {
        let (diagram, record) = self.saved_record()?;
        let renamed = self.history.rename(&record.id, new_name).await?;
        self.update_record(&diagram.description, renamed.clone());
        Ok(renamed)
    }

    /// Pins or unpins the shown diagram's record.
    pub async fn toggle_pin(&self) -> Result<Option<DiagramRecord>> {
        let (diagram, record) = self.saved_record()?;
        let toggled = self.history.toggle_pin(&record.id).await?;
        self.update_record(&diagram.description, toggled.clone());
        Ok(toggled)
    }

    /// Re-reads the shown diagram's record after the history changed elsewhere.
    pub async fn refresh_record(&self) -> Result<Option<DiagramRecord>> {
        let diagram = self.ready_diagram()?;
        let record = self.history.find_by_description(&diagram.description).await?;
        self.update_record(&diagram.description, record.clone());
        Ok(record)
    }
}

fn auto_name(description: &str) -> String {
    classifier::auto_name(description, &Utc::now())
}

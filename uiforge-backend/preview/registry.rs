use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::document::DocumentOptions;
use super::error::PreviewError;
use super::session::PreviewSession;
use super::viewport::ViewportMode;

/// Default number of live previews kept before the least recently used is dropped.
pub const DEFAULT_MAX_PREVIEWS: usize = 256;

/// Snapshot of a preview after a load, returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSummary {
    pub id: Uuid,
    pub generation: u64,
    pub export_name: String,
    pub viewport: ViewportMode,
}

struct Entry {
    session: PreviewSession,
    touched: Instant,
}

/// All live previews, keyed by id. Each preview is independent.
pub struct PreviewRegistry {
    previews: RwLock<HashMap<Uuid, Entry>>,
    options: DocumentOptions,
    max_previews: usize,
}

impl PreviewRegistry {
    pub fn new(options: DocumentOptions, max_previews: usize) -> Self {
        Self {
            previews: RwLock::new(HashMap::new()),
            options,
            max_previews: max_previews.max(1),
        }
    }

    /// Open a new preview for `code`.
    pub async fn create(
        &self,
        code: &str,
        viewport: ViewportMode,
    ) -> Result<PreviewSummary, PreviewError> {
        let mut session = PreviewSession::new(self.options, viewport);
        session.show(code)?;

        let id = Uuid::new_v4();
        let summary = summarize(id, &session);

        let mut previews = self.previews.write().await;
        if previews.len() >= self.max_previews {
            evict_oldest(&mut previews);
        }
        previews.insert(
            id,
            Entry {
                session,
                touched: Instant::now(),
            },
        );
        tracing::info!(preview_id = %id, export_name = %summary.export_name, "opened preview");
        Ok(summary)
    }

    /// Replace the hosted document of an existing preview.
    pub async fn reload(&self, id: Uuid, code: &str) -> Result<PreviewSummary, PreviewError> {
        let mut previews = self.previews.write().await;
        let entry = previews.get_mut(&id).ok_or(PreviewError::NotFound(id))?;
        entry.session.show(code)?;
        entry.touched = Instant::now();
        let summary = summarize(id, &entry.session);
        tracing::info!(
            preview_id = %id,
            generation = summary.generation,
            export_name = %summary.export_name,
            "reloaded preview"
        );
        Ok(summary)
    }

    pub async fn set_viewport(
        &self,
        id: Uuid,
        viewport: ViewportMode,
    ) -> Result<PreviewSummary, PreviewError> {
        let mut previews = self.previews.write().await;
        let entry = previews.get_mut(&id).ok_or(PreviewError::NotFound(id))?;
        entry.session.set_viewport(viewport);
        entry.touched = Instant::now();
        Ok(summarize(id, &entry.session))
    }

    /// HTML of the currently hosted document.
    pub async fn document(&self, id: Uuid) -> Result<String, PreviewError> {
        let previews = self.previews.read().await;
        previews
            .get(&id)
            .and_then(|entry| entry.session.host().current())
            .map(|hosted| hosted.document.html().to_string())
            .ok_or(PreviewError::NotFound(id))
    }

    /// Viewport-wrapped frame markup for the preview.
    pub async fn embed(&self, id: Uuid, document_url: &str) -> Result<String, PreviewError> {
        let previews = self.previews.read().await;
        previews
            .get(&id)
            .and_then(|entry| entry.session.embed(document_url))
            .ok_or(PreviewError::NotFound(id))
    }

    pub async fn summary(&self, id: Uuid) -> Result<PreviewSummary, PreviewError> {
        let previews = self.previews.read().await;
        previews
            .get(&id)
            .map(|entry| summarize(id, &entry.session))
            .ok_or(PreviewError::NotFound(id))
    }

    /// Tear the preview down and forget it.
    pub async fn remove(&self, id: Uuid) -> bool {
        match self.previews.write().await.remove(&id) {
            Some(mut entry) => {
                entry.session.close();
                tracing::info!(preview_id = %id, "closed preview");
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.previews.read().await.len()
    }
}

fn summarize(id: Uuid, session: &PreviewSession) -> PreviewSummary {
    let (generation, export_name) = session
        .host()
        .current()
        .map(|hosted| (hosted.generation, hosted.document.mount_target().to_string()))
        .unwrap_or_default();
    PreviewSummary {
        id,
        generation,
        export_name,
        viewport: session.viewport().mode(),
    }
}

fn evict_oldest(previews: &mut HashMap<Uuid, Entry>) {
    let oldest = previews
        .iter()
        .min_by_key(|(_, entry)| entry.touched)
        .map(|(id, _)| *id);
    if let Some(id) = oldest {
        previews.remove(&id);
        tracing::debug!(preview_id = %id, "evicted least recently used preview");
    }
}

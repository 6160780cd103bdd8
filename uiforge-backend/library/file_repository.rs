use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::SavedComponent;
use super::repository::ComponentRepository;

const LIBRARY_FILE: &str = "components.json";

/// Component library kept in memory and mirrored to a single JSON array at
/// `<base_dir>/components.json`.
///
/// Writes rewrite the whole file (temp file + rename). Concurrent saves are
/// last-write-wins.
pub struct FileComponentRepository {
    components: RwLock<Vec<SavedComponent>>,
    path: PathBuf,
}

impl FileComponentRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            components: RwLock::new(Vec::new()),
            path: base_dir.as_ref().join(LIBRARY_FILE),
        }
    }

    fn persist(&self, components: &[SavedComponent]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create library dir: {}", dir.display()))?;
        }
        let content =
            serde_json::to_string_pretty(components).context("failed to serialize library")?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("failed to write library file: {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace library file: {}", self.path.display()))?;
        Ok(())
    }

    /// Rename an unreadable library file out of the way so the next save cannot
    /// overwrite it.
    fn set_aside_corrupt(&self) -> Result<PathBuf> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
        let backup = self
            .path
            .with_file_name(format!("{LIBRARY_FILE}.corrupt-{stamp}"));
        std::fs::rename(&self.path, &backup).with_context(|| {
            format!(
                "failed to move corrupt library file aside: {}",
                self.path.display()
            )
        })?;
        Ok(backup)
    }
}

#[async_trait]
impl ComponentRepository for FileComponentRepository {
    async fn list(&self) -> Vec<SavedComponent> {
        self.components.read().await.clone()
    }

    async fn get(&self, id: &str) -> Option<SavedComponent> {
        self.components
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    async fn save(&self, component: SavedComponent) -> Result<()> {
        let mut components = self.components.write().await;
        let mut next = components.clone();
        match next.iter_mut().find(|c| c.id == component.id) {
            Some(existing) => *existing = component,
            None => next.insert(0, component),
        }
        self.persist(&next)?;
        *components = next;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut components = self.components.write().await;
        let Some(index) = components.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        let mut next = components.clone();
        next.remove(index);
        self.persist(&next)?;
        *components = next;
        Ok(true)
    }

    async fn load_all(&self) -> Result<()> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.components.write().await.clear();
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read library file: {}", self.path.display())
                });
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                let backup = self.set_aside_corrupt()?;
                tracing::warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    error = %e,
                    "library file is not valid JSON, moved aside and starting empty"
                );
                Vec::new()
            }
        };

        let total = entries.len();
        let loaded: Vec<SavedComponent> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(component) => Some(component),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable library entry");
                    None
                }
            })
            .collect();
        if loaded.len() < total {
            let backup = self.set_aside_corrupt()?;
            tracing::warn!(
                backup = %backup.display(),
                skipped = total - loaded.len(),
                "library file had unreadable entries, original moved aside"
            );
        }

        tracing::info!(count = loaded.len(), "loaded component library");
        *self.components.write().await = loaded;
        Ok(())
    }
}

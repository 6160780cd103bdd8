use anyhow::Result;
use async_trait::async_trait;

use super::SavedComponent;

/// Storage for the component library. Listing order is newest first.
#[async_trait]
pub trait ComponentRepository: Send + Sync {
    async fn list(&self) -> Vec<SavedComponent>;
    async fn get(&self, id: &str) -> Option<SavedComponent>;
    /// Insert, or replace the component with the same id in place.
    async fn save(&self, component: SavedComponent) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<bool>;
    async fn load_all(&self) -> Result<()>;
}

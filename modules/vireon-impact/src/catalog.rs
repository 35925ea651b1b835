//! Building template catalog: loads once, then serves from memory.
//!
//! Owned by whoever needs templates and passed around explicitly. Concurrent
//! first callers share a single in-flight load; a failed load is not cached,
//! so the next call retries.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::building::BuildingTemplate;
use crate::error::{ImpactError, Result};

/// Source of building templates.
#[async_trait]
pub trait FootprintLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<BuildingTemplate>>;
}

/// Reads a JSON array of templates from disk.
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FootprintLoader for JsonFileLoader {
    async fn load(&self) -> Result<Vec<BuildingTemplate>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ImpactError::CatalogLoad(format!("{}: {e}", self.path.display())))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

type TemplateMap = HashMap<String, Arc<BuildingTemplate>>;

pub struct FootprintCatalog<L> {
    loader: L,
    templates: OnceCell<TemplateMap>,
}

impl<L: FootprintLoader> FootprintCatalog<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            templates: OnceCell::new(),
        }
    }

    async fn templates(&self) -> Result<&TemplateMap> {
        self.templates
            .get_or_try_init(|| async {
                let templates = self.loader.load().await?;
                tracing::info!(count = templates.len(), "Loaded building templates");
                Ok(templates
                    .into_iter()
                    .map(|t| (t.id.clone(), Arc::new(t)))
                    .collect())
            })
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Arc<BuildingTemplate>> {
        self.templates()
            .await?
            .get(id)
            .cloned()
            .ok_or_else(|| ImpactError::UnknownBuilding(id.to_string()))
    }

    /// All templates, sorted by id.
    pub async fn all(&self) -> Result<Vec<Arc<BuildingTemplate>>> {
        let mut all: Vec<_> = self.templates().await?.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    pub fn is_loaded(&self) -> bool {
        self.templates.initialized()
    }
}

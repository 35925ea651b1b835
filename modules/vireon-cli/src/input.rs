//! Loading placements and city layers from disk.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use vireon_geo::{FeatureCollection, GeoPoint};
use vireon_impact::{CityLayers, FootprintCatalog, FootprintLoader, LayerKind, Placement};

/// A placement as written in a JSON file. The building is a catalog id.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementFile {
    pub building: String,
    pub center: GeoPoint,
    #[serde(default)]
    pub rotation_deg: f64,
    /// Defaults to the template's height.
    #[serde(default)]
    pub height_m: Option<f64>,
}

impl PlacementFile {
    pub async fn resolve<L: FootprintLoader>(&self, catalog: &FootprintCatalog<L>) -> Result<Placement> {
        let template = catalog
            .get(&self.building)
            .await
            .with_context(|| format!("Failed to resolve building {:?}", self.building))?;
        let mut placement = Placement::new(template, self.center).with_rotation(self.rotation_deg);
        if let Some(height) = self.height_m {
            placement = placement.with_height(height);
        }
        Ok(placement)
    }
}

pub async fn read_placement(path: &Path) -> Result<PlacementFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read placement {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("Invalid placement {}", path.display()))
}

/// Load `<stem>.geojson` for every layer kind from `dir`. A missing file is a
/// missing layer; an unreadable or malformed one is an error.
pub async fn load_layers(dir: &Path) -> Result<CityLayers> {
    let mut layers = CityLayers::default();
    for kind in LayerKind::ALL {
        let path = dir.join(format!("{}.geojson", kind.file_stem()));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(layer = %kind, path = %path.display(), "Layer file missing, scoring without it");
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
        };
        let features: FeatureCollection = serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid GeoJSON in {}", path.display()))?;
        tracing::info!(layer = %kind, features = features.features.len(), "Loaded layer");
        layers.set(kind, features);
    }
    Ok(layers)
}

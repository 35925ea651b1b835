use vireon_geo::FeatureCollection;

/// The named city layers scoring reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Parks,
    Waterways,
    MajorRoads,
    Residential,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Parks,
        LayerKind::Waterways,
        LayerKind::MajorRoads,
        LayerKind::Residential,
    ];

    /// File stem used when layers are loaded from a directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Parks => "parks",
            Self::Waterways => "waterways",
            Self::MajorRoads => "major_roads",
            Self::Residential => "residential",
        }
    }

    /// Singular noun for descriptions.
    pub fn feature_noun(self) -> &'static str {
        match self {
            Self::Parks => "park",
            Self::Waterways => "waterway",
            Self::MajorRoads => "major road",
            Self::Residential => "residential zone",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// Read-only city context. A missing layer means "no data", never an error.
#[derive(Debug, Clone, Default)]
pub struct CityLayers {
    pub parks: Option<FeatureCollection>,
    pub waterways: Option<FeatureCollection>,
    pub major_roads: Option<FeatureCollection>,
    pub residential: Option<FeatureCollection>,
}

impl CityLayers {
    pub fn get(&self, kind: LayerKind) -> Option<&FeatureCollection> {
        match kind {
            LayerKind::Parks => self.parks.as_ref(),
            LayerKind::Waterways => self.waterways.as_ref(),
            LayerKind::MajorRoads => self.major_roads.as_ref(),
            LayerKind::Residential => self.residential.as_ref(),
        }
        .filter(|fc| !fc.is_empty())
    }

    pub fn set(&mut self, kind: LayerKind, features: FeatureCollection) {
        let slot = match kind {
            LayerKind::Parks => &mut self.parks,
            LayerKind::Waterways => &mut self.waterways,
            LayerKind::MajorRoads => &mut self.major_roads,
            LayerKind::Residential => &mut self.residential,
        };
        *slot = Some(features);
    }

    pub fn with(mut self, kind: LayerKind, features: FeatureCollection) -> Self {
        self.set(kind, features);
        self
    }

    /// Layers whose features count as environmentally sensitive.
    pub fn sensitive(&self) -> impl Iterator<Item = &FeatureCollection> {
        [LayerKind::Parks, LayerKind::Waterways]
            .into_iter()
            .filter_map(|kind| self.get(kind))
    }

    pub fn available(&self) -> Vec<LayerKind> {
        LayerKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_some())
            .collect()
    }
}

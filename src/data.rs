use crate::error::AtlasError;
use crate::fetch::ResourceLocation;
use crate::regions;
use crate::topology::Topology;
use crate::types::{Boundary, LayerId};
use geo::{BoundingRect, Contains, Point};
use geojson::{feature::Id, Feature, FeatureCollection};
use rstar::{RTree, RTreeObject, AABB};
use tracing::{info, warn};

/// Name of the topology object holding county-equivalents.
pub const COUNTIES_OBJECT: &str = "counties";

pub async fn load_boundaries(
    location: &ResourceLocation,
    http: &reqwest::Client,
) -> Result<Vec<Boundary>, AtlasError> {
    info!(%location, "loading county boundaries");
    let bytes = location
        .read_bytes(http)
        .await
        .map_err(|e| AtlasError::LoadFailure {
            location: location.to_string(),
            reason: format!("{:#}", e),
        })?;
    parse_boundaries(&bytes).map_err(|e| match e {
        AtlasError::LoadFailure { reason, .. } => AtlasError::LoadFailure {
            location: location.to_string(),
            reason,
        },
        other => other,
    })
}

/// Expands the `counties` object and resolves each boundary's state.
pub fn parse_boundaries(bytes: &[u8]) -> Result<Vec<Boundary>, AtlasError> {
    let failure = |e: anyhow::Error| AtlasError::LoadFailure {
        location: "<memory>".to_string(),
        reason: format!("{:#}", e),
    };
    let topology = Topology::from_slice(bytes).map_err(failure)?;
    let features = topology.features(COUNTIES_OBJECT).map_err(failure)?;

    let boundaries: Vec<Boundary> = features
        .into_iter()
        .map(|feature| {
            let id = feature.id.as_ref().and_then(region_id);
            let state = id.as_deref().and_then(regions::state_for_region_id);
            Boundary {
                id,
                geometry: feature.geometry,
                properties: feature.properties,
                state,
            }
        })
        .collect();

    let unresolved = boundaries.iter().filter(|b| b.state.is_none()).count();
    if unresolved > 0 {
        warn!(unresolved, "boundaries without a resolvable state code");
    }
    info!(count = boundaries.len(), "loaded county boundaries");
    Ok(boundaries)
}

// Numeric ids lose their leading zero in some topology builds.
fn region_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(n) => Some(format!("{:05}", n)),
            None => Some(n.to_string()),
        },
        _ => None,
    }
}

/// GeoJSON for the map front end; `properties.layer` is the click handle.
pub fn boundaries_to_geojson(boundaries: &[Boundary]) -> FeatureCollection {
    let features = boundaries
        .iter()
        .enumerate()
        .map(|(i, boundary)| {
            let mut properties = boundary.properties.clone();
            properties.insert("layer".to_string(), i.into());
            match boundary.state {
                Some(state) => {
                    properties.insert("state".to_string(), state.into());
                }
                None => {
                    properties.remove("state");
                }
            }
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&boundary.geometry))),
                id: boundary.id.clone().map(Id::String),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

// Wrapper for RTree indexing
struct BoundaryEnvelope {
    layer: LayerId,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for BoundaryEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// Point lookup over boundary bounding boxes.
pub struct BoundaryIndex {
    tree: RTree<BoundaryEnvelope>,
}

impl BoundaryIndex {
    pub fn build(boundaries: &[Boundary]) -> Self {
        let items: Vec<BoundaryEnvelope> = boundaries
            .iter()
            .enumerate()
            .filter_map(|(i, boundary)| {
                let rect = boundary.geometry.bounding_rect()?;
                Some(BoundaryEnvelope {
                    layer: LayerId(i),
                    aabb: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn locate(&self, boundaries: &[Boundary], lon: f64, lat: f64) -> Option<LayerId> {
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|candidate| candidate.layer)
            .filter(|layer| {
                boundaries
                    .get(layer.0)
                    .is_some_and(|b| b.geometry.contains(&point))
            })
            .min()
    }
}

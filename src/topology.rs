//! TopoJSON decoding.
//!
//! Arcs are shared between neighbouring polygons; each ring lists arc indices,
//! with `!i` (negative) meaning arc `i` traversed backwards. Quantized
//! topologies store arc positions as integer deltas plus a global transform.

use anyhow::{anyhow, bail, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: HashMap<String, TopoGeometry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
pub struct TopoGeometry {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(flatten)]
    pub shape: TopoShape,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum TopoShape {
    GeometryCollection { geometries: Vec<TopoGeometry> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
    #[serde(other)]
    Unsupported,
}

/// One expanded feature of a topology object.
#[derive(Debug, Clone)]
pub struct TopoFeature {
    pub id: Option<serde_json::Value>,
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub geometry: MultiPolygon<f64>,
}

impl Topology {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Absolute coordinates of every arc, with the transform applied.
    pub fn decoded_arcs(&self) -> Result<Vec<Vec<Coord<f64>>>> {
        self.arcs
            .iter()
            .enumerate()
            .map(|(i, arc)| {
                let mut acc = [0.0, 0.0];
                arc.iter()
                    .map(|position| {
                        let (x, y) = match position.as_slice() {
                            [x, y, ..] => (*x, *y),
                            _ => bail!("arc {i} has a position with fewer than two values"),
                        };
                        Ok(match self.transform {
                            Some(t) => {
                                acc[0] += x;
                                acc[1] += y;
                                Coord {
                                    x: acc[0] * t.scale[0] + t.translate[0],
                                    y: acc[1] * t.scale[1] + t.translate[1],
                                }
                            }
                            None => Coord { x, y },
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }

    /// Expands the named object into one feature per member geometry.
    pub fn features(&self, object: &str) -> Result<Vec<TopoFeature>> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| anyhow!("topology has no '{}' object", object))?;
        let arcs = self.decoded_arcs()?;

        match &root.shape {
            TopoShape::GeometryCollection { geometries } => geometries
                .par_iter()
                .map(|geometry| to_feature(geometry, &arcs))
                .collect(),
            _ => Ok(vec![to_feature(root, &arcs)?]),
        }
    }
}

fn to_feature(geometry: &TopoGeometry, arcs: &[Vec<Coord<f64>>]) -> Result<TopoFeature> {
    let mut polygons = Vec::new();
    collect_polygons(&geometry.shape, arcs, &mut polygons)?;
    Ok(TopoFeature {
        id: geometry.id.clone(),
        properties: geometry.properties.clone().unwrap_or_default(),
        geometry: MultiPolygon::new(polygons),
    })
}

fn collect_polygons(
    shape: &TopoShape,
    arcs: &[Vec<Coord<f64>>],
    out: &mut Vec<Polygon<f64>>,
) -> Result<()> {
    match shape {
        TopoShape::Polygon { arcs: rings } => out.extend(polygon(rings, arcs)?),
        TopoShape::MultiPolygon { arcs: polygons } => {
            for rings in polygons {
                out.extend(polygon(rings, arcs)?);
            }
        }
        TopoShape::GeometryCollection { geometries } => {
            for geometry in geometries {
                collect_polygons(&geometry.shape, arcs, out)?;
            }
        }
        TopoShape::Unsupported => {}
    }
    Ok(())
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Coord<f64>>]) -> Result<Option<Polygon<f64>>> {
    let mut rings = rings.iter().map(|ring| stitch(ring, arcs));
    let exterior = match rings.next() {
        Some(exterior) => exterior?,
        None => return Ok(None),
    };
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Some(Polygon::new(exterior, interiors)))
}

/// Joins the arcs of a ring, dropping the shared point between consecutive arcs.
fn stitch(ring: &[i64], arcs: &[Vec<Coord<f64>>]) -> Result<LineString<f64>> {
    let mut points: Vec<Coord<f64>> = Vec::new();
    for &index in ring {
        let resolved = (if index < 0 { !index } else { index }) as usize;
        let arc = arcs
            .get(resolved)
            .ok_or_else(|| anyhow!("arc index {} out of range ({} arcs)", index, arcs.len()))?;
        points.pop();
        if index < 0 {
            points.extend(arc.iter().rev());
        } else {
            points.extend(arc.iter());
        }
    }
    Ok(LineString::new(points))
}

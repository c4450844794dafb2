use geo::MultiPolygon;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Position of a boundary in the loaded collection; also its rendered layer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub usize);

#[derive(Debug, Clone)]
pub struct Boundary {
    pub id: Option<String>,
    pub geometry: MultiPolygon<f64>,
    pub properties: serde_json::Map<String, serde_json::Value>,
    // Resolved once at load time from the first two characters of `id`.
    pub state: Option<&'static str>,
}

impl Boundary {
    /// Display name carried by the topology, if any.
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemographicRecord {
    pub name: String,
    pub population: f64,
    pub demographics: Grouping,
}

/// Category name -> entries, in document order.
pub type Grouping = IndexMap<String, Category>;

/// A category is either a bare value (`"median_age": 37.4`) or a map of entries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Value(Leaf),
    Entries(IndexMap<String, Metric>),
}

impl Category {
    pub fn entry(&self, key: &str) -> Option<&Metric> {
        match self {
            Category::Entries(entries) => entries.get(key),
            Category::Value(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Value(Leaf),
    Nested(IndexMap<String, Leaf>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Leaf {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
}

impl ViewportState {
    pub const DEFAULT: ViewportState = ViewportState {
        center: [42.0, -96.0],
        zoom: 4,
    };
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Path options in the shape the map front end expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub fill_color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub color: &'static str,
    pub fill_opacity: f64,
}

pub const DEFAULT_STYLE: PathStyle = PathStyle {
    fill_color: "#cccccc",
    weight: 1.0,
    opacity: 1.0,
    color: "#333",
    fill_opacity: 0.6,
};

// Highlight overrides weight, stroke colour and fill opacity; the fill colour is kept.
pub const HIGHLIGHT_STYLE: PathStyle = PathStyle {
    weight: 3.0,
    color: "#ff7800",
    fill_opacity: 0.5,
    ..DEFAULT_STYLE
};

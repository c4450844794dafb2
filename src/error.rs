use thiserror::Error;

/// Failure conditions of the interactive pipeline.
///
/// None of these are fatal: callers log them and keep the map interactive.
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("boundary is missing an identifier (region: {region_id:?}, state: {state_id:?})")]
    MissingIdentifier {
        region_id: Option<String>,
        state_id: Option<String>,
    },
    #[error("failed to load boundaries from {location}: {reason}")]
    LoadFailure { location: String, reason: String },
    #[error("failed to fetch county record {location}: {reason}")]
    FetchFailure { location: String, reason: String },
}

impl AtlasError {
    pub fn missing(region_id: Option<&str>, state_id: Option<&str>) -> Self {
        AtlasError::MissingIdentifier {
            region_id: region_id.map(str::to_string),
            state_id: state_id.map(str::to_string),
        }
    }
}

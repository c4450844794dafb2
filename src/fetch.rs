use crate::error::AtlasError;
use crate::types::DemographicRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Where a read-only resource lives: on disk or behind an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
    Path(PathBuf),
    Url(String),
}

impl ResourceLocation {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            ResourceLocation::Url(raw.trim_end_matches('/').to_string())
        } else {
            ResourceLocation::Path(PathBuf::from(raw))
        }
    }

    /// Appends `/`-separated segments.
    pub fn join(&self, segments: &[&str]) -> Self {
        match self {
            ResourceLocation::Path(base) => {
                ResourceLocation::Path(segments.iter().fold(base.clone(), |p, s| p.join(s)))
            }
            ResourceLocation::Url(base) => {
                let mut url = base.clone();
                for segment in segments {
                    url.push('/');
                    url.push_str(segment);
                }
                ResourceLocation::Url(url)
            }
        }
    }

    pub async fn read_bytes(&self, http: &reqwest::Client) -> Result<Vec<u8>> {
        match self {
            ResourceLocation::Path(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {:?}", path)),
            ResourceLocation::Url(url) => {
                let response = http
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("Request to {} failed", url))?
                    .error_for_status()?;
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLocation::Path(path) => write!(f, "{}", path.display()),
            ResourceLocation::Url(url) => f.write_str(url),
        }
    }
}

/// `<base>/{state}/counties/{region}.json`
pub fn record_location(
    base: &ResourceLocation,
    region_id: &str,
    state_id: &str,
) -> Result<ResourceLocation, AtlasError> {
    if region_id.is_empty() || state_id.is_empty() {
        return Err(AtlasError::missing(
            Some(region_id).filter(|s| !s.is_empty()),
            Some(state_id).filter(|s| !s.is_empty()),
        ));
    }
    Ok(base.join(&[state_id, "counties", &format!("{}.json", region_id)]))
}

#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch_record(
        &self,
        region_id: &str,
        state_id: &str,
    ) -> Result<DemographicRecord, AtlasError>;
}

pub struct ResourceFetcher {
    base: ResourceLocation,
    http: reqwest::Client,
}

impl ResourceFetcher {
    pub fn new(base: ResourceLocation, http: reqwest::Client) -> Self {
        Self { base, http }
    }

    pub fn base(&self) -> &ResourceLocation {
        &self.base
    }
}

#[async_trait]
impl RecordFetcher for ResourceFetcher {
    async fn fetch_record(
        &self,
        region_id: &str,
        state_id: &str,
    ) -> Result<DemographicRecord, AtlasError> {
        let location = record_location(&self.base, region_id, state_id)?;
        debug!(%location, "fetching county record");

        let failure = |reason: String| AtlasError::FetchFailure {
            location: location.to_string(),
            reason,
        };
        let bytes = location
            .read_bytes(&self.http)
            .await
            .map_err(|e| failure(format!("{:#}", e)))?;
        serde_json::from_slice(&bytes).map_err(|e| failure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn record_location_contains_state_and_region() {
        let base = ResourceLocation::parse("https://example.org/resources/");
        let location = record_location(&base, "06037", "california").unwrap();
        assert_eq!(
            location,
            ResourceLocation::Url("https://example.org/resources/california/counties/06037.json".into())
        );

        let base = ResourceLocation::parse("resources");
        let location = record_location(&base, "06037", "california").unwrap();
        assert_eq!(
            location,
            ResourceLocation::Path(PathBuf::from("resources/california/counties/06037.json"))
        );
    }

    #[test]
    fn empty_identifiers_are_missing() {
        let base = ResourceLocation::parse("resources");
        let err = record_location(&base, "", "california").unwrap_err();
        assert!(matches!(
            err,
            AtlasError::MissingIdentifier { region_id: None, state_id: Some(ref s) } if s == "california"
        ));
        assert!(record_location(&base, "06037", "").is_err());
    }

    #[tokio::test]
    async fn reads_record_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let counties = dir.path().join("alaska").join("counties");
        fs::create_dir_all(&counties).unwrap();
        fs::write(
            counties.join("02290.json"),
            r#"{"name": "Yukon-Koyukuk Census Area", "population": 5343,
                "demographics": {"age": {"median": 38.2}}}"#,
        )
        .unwrap();

        let fetcher = ResourceFetcher::new(
            ResourceLocation::Path(dir.path().to_path_buf()),
            reqwest::Client::new(),
        );
        let record = fetcher.fetch_record("02290", "alaska").await.unwrap();
        assert_eq!(record.name, "Yukon-Koyukuk Census Area");
        assert_eq!(record.population, 5343.0);
    }

    #[tokio::test]
    async fn missing_file_and_bad_json_are_fetch_failures() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ResourceFetcher::new(
            ResourceLocation::Path(dir.path().to_path_buf()),
            reqwest::Client::new(),
        );
        let err = fetcher.fetch_record("01001", "alabama").await.unwrap_err();
        assert!(matches!(err, AtlasError::FetchFailure { .. }));

        let counties = dir.path().join("alabama").join("counties");
        fs::create_dir_all(&counties).unwrap();
        fs::write(counties.join("01001.json"), "{not json").unwrap();
        let err = fetcher.fetch_record("01001", "alabama").await.unwrap_err();
        assert!(matches!(err, AtlasError::FetchFailure { .. }));
    }
}

use crate::data;
use crate::error::AtlasError;
use crate::fetch::{RecordFetcher, ResourceLocation};
use crate::render::{render_panel, PLACEHOLDER};
use crate::selection::SelectionController;
use crate::surface::{DetailPanel, MapSurface};
use crate::types::{Boundary, DemographicRecord, LayerId, ViewportState, DEFAULT_STYLE};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A click that passed validation and is waiting on its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    pub generation: u64,
    pub layer: LayerId,
    pub region_id: String,
    pub state_id: String,
}

/// Owns the viewport, the boundary set and the single interactive session.
pub struct ViewController<S, P> {
    viewport: ViewportState,
    boundaries: Vec<Boundary>,
    selection: SelectionController<S>,
    panel: P,
    fetcher: Arc<dyn RecordFetcher>,
    // Bumped on every accepted click and on reset; older responses are dropped.
    generation: u64,
}

impl<S: MapSurface, P: DetailPanel> ViewController<S, P> {
    pub fn new(mut surface: S, mut panel: P, fetcher: Arc<dyn RecordFetcher>) -> Self {
        let viewport = ViewportState::DEFAULT;
        surface.set_view(&viewport);
        panel.set_markup(PLACEHOLDER.to_string());
        Self {
            viewport,
            boundaries: Vec::new(),
            selection: SelectionController::new(surface),
            panel,
            fetcher,
            generation: 0,
        }
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn selection(&self) -> &SelectionController<S> {
        &self.selection
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetcher(&self) -> Arc<dyn RecordFetcher> {
        Arc::clone(&self.fetcher)
    }

    /// Loads the topology once. On failure the map stays up without polygons.
    pub async fn load_boundaries(&mut self, location: &ResourceLocation, http: &reqwest::Client) -> usize {
        match data::load_boundaries(location, http).await {
            Ok(boundaries) => self.install_boundaries(boundaries),
            Err(err) => {
                error!(%err, "county boundaries unavailable");
                0
            }
        }
    }

    pub fn install_boundaries(&mut self, boundaries: Vec<Boundary>) -> usize {
        self.selection.clear();
        self.boundaries = boundaries;
        self.selection
            .surface_mut()
            .add_boundaries(&self.boundaries, &DEFAULT_STYLE);
        self.boundaries.len()
    }

    /// User-driven pan/zoom reported by the host.
    pub fn pan_to(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
        self.selection.surface_mut().set_view(&self.viewport);
    }

    /// Validates the clicked layer, highlights it and starts a new generation.
    pub fn begin_click(&mut self, layer: LayerId) -> Result<PendingRecord, AtlasError> {
        let boundary = self.boundaries.get(layer.0);
        let region_id = boundary.and_then(|b| b.id.as_deref()).filter(|id| !id.is_empty());
        let state_id = boundary.and_then(|b| b.state);

        let (region_id, state_id) = match (region_id, state_id) {
            (Some(region_id), Some(state_id)) => (region_id.to_string(), state_id.to_string()),
            (region_id, state_id) => {
                let err = AtlasError::missing(region_id, state_id);
                warn!(layer = layer.0, %err, "ignoring click");
                return Err(err);
            }
        };

        self.generation += 1;
        self.selection.select(layer);
        Ok(PendingRecord {
            generation: self.generation,
            layer,
            region_id,
            state_id,
        })
    }

    /// Writes the record to the panel if the click is still the latest one.
    /// Returns whether the panel changed.
    pub fn complete_click(
        &mut self,
        pending: &PendingRecord,
        result: Result<DemographicRecord, AtlasError>,
    ) -> bool {
        if pending.generation != self.generation {
            match &result {
                Ok(_) => debug!(
                    region = %pending.region_id,
                    generation = pending.generation,
                    current = self.generation,
                    "discarding stale county record"
                ),
                Err(err) => error!(
                    region = %pending.region_id,
                    generation = pending.generation,
                    current = self.generation,
                    %err,
                    "failed to load superseded county record"
                ),
            }
            return false;
        }
        match result {
            Ok(record) => {
                self.panel.set_markup(render_panel(&record));
                self.panel.scroll_to_top();
                true
            }
            Err(err) => {
                error!(region = %pending.region_id, %err, "failed to load county record");
                false
            }
        }
    }

    pub async fn on_boundary_click(&mut self, layer: LayerId) -> Result<bool, AtlasError> {
        let pending = self.begin_click(layer)?;
        let result = self
            .fetcher
            .fetch_record(&pending.region_id, &pending.state_id)
            .await;
        Ok(self.complete_click(&pending, result))
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.viewport = ViewportState::DEFAULT;
        self.selection.surface_mut().set_view(&self.viewport);
        self.selection.clear();
        self.panel.set_markup(PLACEHOLDER.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{SessionPanel, SessionSurface};
    use crate::types::HIGHLIGHT_STYLE;
    use async_trait::async_trait;
    use geo::MultiPolygon;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFetcher {
        requests: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl RecordFetcher for RecordingFetcher {
        async fn fetch_record(
            &self,
            region_id: &str,
            state_id: &str,
        ) -> Result<DemographicRecord, AtlasError> {
            self.requests
                .lock()
                .unwrap()
                .push((region_id.to_string(), state_id.to_string()));
            if self.fail {
                return Err(AtlasError::FetchFailure {
                    location: format!("{state_id}/counties/{region_id}.json"),
                    reason: "offline".into(),
                });
            }
            Ok(record(&format!("County {region_id}")))
        }
    }

    fn record(name: &str) -> DemographicRecord {
        DemographicRecord {
            name: name.to_string(),
            population: 10.0,
            demographics: serde_json::from_str(r#"{"age": {"male": 0.5}}"#).unwrap(),
        }
    }

    fn boundary(id: Option<&str>, state: Option<&'static str>) -> Boundary {
        Boundary {
            id: id.map(str::to_string),
            geometry: MultiPolygon::new(vec![]),
            properties: Default::default(),
            state,
        }
    }

    fn controller(fetcher: Arc<RecordingFetcher>) -> ViewController<SessionSurface, SessionPanel> {
        let mut view = ViewController::new(SessionSurface::default(), SessionPanel::default(), fetcher);
        view.install_boundaries(vec![
            boundary(Some("06037"), Some("california")),
            boundary(Some("17031"), Some("illinois")),
            boundary(Some("72001"), None),
            boundary(None, None),
        ]);
        view
    }

    #[tokio::test]
    async fn click_fetches_by_state_and_region() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let mut view = controller(fetcher.clone());

        assert_eq!(view.on_boundary_click(LayerId(0)).await.unwrap(), true);
        assert_eq!(
            *fetcher.requests.lock().unwrap(),
            vec![("06037".to_string(), "california".to_string())]
        );
        assert!(view.panel().markup().starts_with("<b>County 06037</b><br>Population: 10<br>"));
        assert!(view.panel().markup().contains("<li>male: 0.50000</li>"));
        assert_eq!(view.selection().selected(), Some(LayerId(0)));
    }

    #[tokio::test]
    async fn missing_identifier_changes_nothing() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let mut view = controller(fetcher.clone());
        view.on_boundary_click(LayerId(1)).await.unwrap();
        let markup = view.panel().markup().to_string();
        let generation = view.generation();

        for layer in [2, 3, 99] {
            let err = view.on_boundary_click(LayerId(layer)).await.unwrap_err();
            assert!(matches!(err, AtlasError::MissingIdentifier { .. }));
        }
        assert_eq!(fetcher.requests.lock().unwrap().len(), 1);
        assert_eq!(view.selection().selected(), Some(LayerId(1)));
        assert_eq!(view.panel().markup(), markup);
        assert_eq!(view.generation(), generation);
        assert_eq!(view.viewport(), &ViewportState::DEFAULT);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_panel_but_selects() {
        let fetcher = Arc::new(RecordingFetcher {
            fail: true,
            ..Default::default()
        });
        let mut view = controller(fetcher);
        assert_eq!(view.on_boundary_click(LayerId(0)).await.unwrap(), false);
        assert_eq!(view.panel().markup(), PLACEHOLDER);
        assert_eq!(view.selection().selected(), Some(LayerId(0)));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut view = controller(Arc::new(RecordingFetcher::default()));
        let first = view.begin_click(LayerId(0)).unwrap();
        let second = view.begin_click(LayerId(1)).unwrap();
        assert!(second.generation > first.generation);

        // The second click's record arrives first, then the first one.
        assert!(view.complete_click(&second, Ok(record("Cook County"))));
        assert!(!view.complete_click(&first, Ok(record("Los Angeles County"))));
        assert!(view.panel().markup().contains("Cook County"));
        assert_eq!(
            view.selection().surface().layers_with_style(&HIGHLIGHT_STYLE),
            vec![LayerId(1)]
        );
    }

    #[test]
    fn stale_failure_is_dropped_without_touching_panel() {
        let mut view = controller(Arc::new(RecordingFetcher::default()));
        let first = view.begin_click(LayerId(0)).unwrap();
        let second = view.begin_click(LayerId(1)).unwrap();
        assert!(view.complete_click(&second, Ok(record("Cook County"))));

        let failed = Err(AtlasError::FetchFailure {
            location: "california/counties/06037.json".into(),
            reason: "connection reset".into(),
        });
        assert!(!view.complete_click(&first, failed));
        assert!(view.panel().markup().contains("Cook County"));
        assert_eq!(view.selection().selected(), Some(LayerId(1)));
    }

    #[test]
    fn completed_record_scrolls_panel_to_top() {
        let mut view = controller(Arc::new(RecordingFetcher::default()));
        view.panel_mut().scroll_to(240);
        let pending = view.begin_click(LayerId(0)).unwrap();
        view.complete_click(&pending, Ok(record("Los Angeles County")));
        assert_eq!(view.panel().scroll_top(), 0);
    }

    #[test]
    fn reset_restores_everything() {
        let mut view = controller(Arc::new(RecordingFetcher::default()));
        view.pan_to(ViewportState {
            center: [34.0, -118.2],
            zoom: 9,
        });
        let pending = view.begin_click(LayerId(0)).unwrap();

        view.reset();
        assert_eq!(view.viewport(), &ViewportState::DEFAULT);
        assert_eq!(view.selection().surface().viewport(), Some(&ViewportState::DEFAULT));
        assert_eq!(view.selection().selected(), None);
        assert!(view.selection().surface().layers_with_style(&HIGHLIGHT_STYLE).is_empty());
        assert_eq!(view.panel().markup(), PLACEHOLDER);

        // A record requested before the reset no longer lands in the panel.
        assert!(!view.complete_click(&pending, Ok(record("Los Angeles County"))));
        assert_eq!(view.panel().markup(), PLACEHOLDER);

        // Reset from the unselected state is the same.
        view.reset();
        assert_eq!(view.viewport(), &ViewportState::DEFAULT);
        assert_eq!(view.panel().markup(), PLACEHOLDER);
    }

    #[tokio::test]
    async fn failed_load_leaves_map_usable() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(RecordingFetcher::default());
        let mut view = ViewController::new(SessionSurface::default(), SessionPanel::default(), fetcher);
        let location = ResourceLocation::Path(dir.path().join("absent.json"));
        assert_eq!(view.load_boundaries(&location, &reqwest::Client::new()).await, 0);
        assert!(view.boundaries().is_empty());
        view.reset();
        assert_eq!(view.panel().markup(), PLACEHOLDER);
    }
}

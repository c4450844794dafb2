use crate::config::AppConfig;
use crate::data::{boundaries_to_geojson, BoundaryIndex};
use crate::fetch::{ResourceFetcher, ResourceLocation};
use crate::surface::{DetailPanel, SessionPanel, SessionSurface};
use crate::types::{LayerId, PathStyle, ViewportState, DEFAULT_STYLE, HIGHLIGHT_STYLE};
use crate::view::ViewController;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub type Session = ViewController<SessionSurface, SessionPanel>;

pub struct AppState {
    // Held only across synchronous steps; record fetches run unlocked.
    pub session: Mutex<Session>,
    pub index: BoundaryIndex,
    pub boundaries_geojson: Bytes,
    pub config: AppConfig,
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub viewport: ViewportState,
    pub selected: Option<LayerId>,
    pub default_style: PathStyle,
    pub highlight_style: PathStyle,
    pub panel: String,
    pub tile_url: String,
    pub max_zoom: u8,
}

impl AppState {
    pub fn new(config: AppConfig, session: Session) -> Result<Self> {
        info!("Building spatial index for {} boundaries...", session.boundaries().len());
        let index = BoundaryIndex::build(session.boundaries());
        let geojson = serde_json::to_vec(&boundaries_to_geojson(session.boundaries()))
            .context("Failed to serialize boundaries")?;
        Ok(Self {
            session: Mutex::new(session),
            index,
            boundaries_geojson: Bytes::from(geojson),
            config,
        })
    }

    fn snapshot(&self, session: &Session) -> SessionView {
        SessionView {
            viewport: *session.viewport(),
            selected: session.selection().selected(),
            default_style: DEFAULT_STYLE,
            highlight_style: HIGHLIGHT_STYLE,
            panel: session.panel().markup().to_string(),
            tile_url: self.config.map.tile_url.clone(),
            max_zoom: self.config.map.max_zoom,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/api/boundaries", get(boundaries_handler))
        .route("/api/view", get(view_handler).post(pan_handler))
        .route("/api/click", post(click_point_handler))
        .route("/api/layers/:layer/click", post(click_layer_handler))
        .route("/api/reset", post(reset_handler));

    if let ResourceLocation::Path(dir) = state.config.input.records_location() {
        app = app.nest_service("/records", ServeDir::new(dir));
    }

    app.fallback_service(ServeDir::new(&state.config.server.static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, http: reqwest::Client) -> Result<()> {
    let fetcher = Arc::new(ResourceFetcher::new(
        config.input.records_location(),
        http.clone(),
    ));
    let mut session = ViewController::new(SessionSurface::default(), SessionPanel::default(), fetcher);
    session
        .load_boundaries(&config.input.topology_location(), &http)
        .await;

    let state = Arc::new(AppState::new(config.clone(), session)?);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn boundaries_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/geo+json")],
        state.boundaries_geojson.clone(),
    )
}

async fn view_handler(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(state.snapshot(&session))
}

/// The host reports user pan/zoom so reset has something to restore from.
async fn pan_handler(
    State(state): State<Arc<AppState>>,
    Json(viewport): Json<ViewportState>,
) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    session.pan_to(viewport);
    Json(state.snapshot(&session))
}

async fn click_layer_handler(
    State(state): State<Arc<AppState>>,
    Path(layer): Path<usize>,
) -> Json<SessionView> {
    click(&state, LayerId(layer)).await
}

async fn click_point_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<SessionView> {
    let layer = {
        let session = state.session.lock().await;
        match state.index.locate(session.boundaries(), params.lon, params.lat) {
            Some(layer) => layer,
            None => return Json(state.snapshot(&session)),
        }
    };
    click(&state, layer).await
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    session.reset();
    Json(state.snapshot(&session))
}

async fn click(state: &AppState, layer: LayerId) -> Json<SessionView> {
    let (pending, fetcher) = {
        let mut session = state.session.lock().await;
        match session.begin_click(layer) {
            Ok(pending) => (pending, session.fetcher()),
            // Already logged; the map stays as it was.
            Err(_) => return Json(state.snapshot(&session)),
        }
    };

    let result = fetcher
        .fetch_record(&pending.region_id, &pending.state_id)
        .await;

    let mut session = state.session.lock().await;
    session.complete_click(&pending, result);
    Json(state.snapshot(&session))
}

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::{
    cache::{CacheStats, GenerationRecord, GenerationStatus, fingerprint},
    coordinator::GenerationCoordinator,
    dimensions::Dimensions,
    error::ApiError,
    placeholder::{PlaceholderStyle, build_placeholder_svg, error_placeholder},
    web_pages,
};

pub const X_IMAGE_STATUS: HeaderName = HeaderName::from_static("x-image-status");
pub const X_IMAGE_ID: HeaderName = HeaderName::from_static("x-image-id");
pub const X_REFRESH_AFTER: HeaderName = HeaderName::from_static("x-refresh-after");

const AI_IMAGE_CACHE_CONTROL: &str = "public, max-age=86400, s-maxage=86400";
const PLACEHOLDER_CACHE_CONTROL: &str = "public, max-age=300, s-maxage=300";
const SVG_CONTENT_TYPE: &str = "image/svg+xml";

#[derive(Clone)]
pub struct AppState {
    pub coordinator: GenerationCoordinator,
    pub refresh_after_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceholderQuery {
    pub w: Option<String>,
    pub width: Option<String>,
    pub h: Option<String>,
    pub height: Option<String>,
    pub text: Option<String>,
    pub t: Option<String>,
    pub bg: Option<String>,
    pub fg: Option<String>,
}

impl PlaceholderQuery {
    fn text_or_default(&self, dimensions: &Dimensions) -> String {
        [self.text.as_deref(), self.t.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| dimensions.default_text())
    }

    fn style(&self) -> PlaceholderStyle {
        PlaceholderStyle::default().with_overrides(self.bg.as_deref(), self.fg.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub id: String,
    pub status: GenerationStatus,
    pub width: u32,
    pub height: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<i64>,
}

impl From<GenerationRecord> for StatusResponse {
    fn from(record: GenerationRecord) -> Self {
        let processing_time = record.processing_time_ms();
        Self {
            id: record.id,
            status: record.status,
            width: record.width,
            height: record.height,
            text: record.text,
            image_url: record.image_url,
            error: record.error,
            created_at: record.created_at.timestamp_millis(),
            completed_at: record.completed_at.map(|at| at.timestamp_millis()),
            processing_time,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    cache: CacheStats,
    tracked: usize,
    queued: usize,
    processing: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(web_pages::index_page))
        .route("/api/placeholder", get(placeholder_by_query))
        .route(
            "/api/placeholder/params/{dimensions}",
            get(placeholder_by_path).head(placeholder_status_by_path),
        )
        .route("/api/status/{id}", get(generation_status))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn placeholder_by_query(
    State(state): State<AppState>,
    Query(query): Query<PlaceholderQuery>,
) -> Result<Response, ApiError> {
    let dimensions = Dimensions::parse_pair(
        query.w.as_deref().or(query.width.as_deref()),
        query.h.as_deref().or(query.height.as_deref()),
    )?;
    let text = query.text_or_default(&dimensions);
    Ok(serve_placeholder(&state, dimensions, &text, &query.style()))
}

pub async fn placeholder_by_path(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<PlaceholderQuery>,
) -> Result<Response, ApiError> {
    let dimensions = Dimensions::parse_segment(&segment)?;
    let text = query.text_or_default(&dimensions);
    Ok(serve_placeholder(&state, dimensions, &text, &query.style()))
}

/// Reports generation status in headers only; never queues work.
pub async fn placeholder_status_by_path(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(query): Query<PlaceholderQuery>,
) -> Response {
    let Ok(dimensions) = Dimensions::parse_segment(&segment) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let text = query.text_or_default(&dimensions);
    let id = fingerprint(dimensions.width, dimensions.height, &text);
    let record = state.coordinator.get_status(&id);

    match record {
        Some(record) if record.status == GenerationStatus::Completed => [
            (X_IMAGE_STATUS, GenerationStatus::Completed.as_str().to_string()),
            (X_IMAGE_ID, id.clone()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
            (header::ETAG, format!("\"ai-{id}\"")),
        ]
        .into_response(),
        other => {
            let status = other.map_or(GenerationStatus::Pending, |record| record.status);
            [
                (X_IMAGE_STATUS, status.as_str().to_string()),
                (X_IMAGE_ID, id),
                (header::CACHE_CONTROL, "no-cache".to_string()),
            ]
            .into_response()
        }
    }
}

pub async fn generation_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let record = state.coordinator.get_status(&id).ok_or(ApiError::NotFound)?;
    let cache_control = if record.status == GenerationStatus::Completed {
        "public, max-age=3600"
    } else {
        "no-cache"
    };
    Ok((
        [(header::CACHE_CONTROL, cache_control)],
        Json(StatusResponse::from(record)),
    )
        .into_response())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let coordinator = &state.coordinator;
    Json(HealthResponse {
        status: "ok",
        cache: coordinator.cache().stats(),
        tracked: coordinator.tracked_len(),
        queued: coordinator.queued_len(),
        processing: coordinator.is_processing(),
    })
}

fn serve_placeholder(
    state: &AppState,
    dimensions: Dimensions,
    text: &str,
    style: &PlaceholderStyle,
) -> Response {
    let Dimensions { width, height } = dimensions;
    let id = fingerprint(width, height, text);

    if let Some(image_url) = state
        .coordinator
        .cache()
        .get(&id)
        .filter(|record| record.status == GenerationStatus::Completed)
        .and_then(|record| record.image_url)
    {
        tracing::debug!(%id, %image_url, "redirecting to generated image");
        return (
            StatusCode::TEMPORARY_REDIRECT,
            [
                (header::LOCATION, image_url),
                (header::CACHE_CONTROL, AI_IMAGE_CACHE_CONTROL.to_string()),
                (header::ETAG, format!("\"ai-{id}\"")),
            ],
        )
            .into_response();
    }

    state.coordinator.request_generation(width, height, text);
    let status = state
        .coordinator
        .get_status(&id)
        .map_or(GenerationStatus::Pending, |record| record.status);

    match build_placeholder_svg(width, height, text, style) {
        Ok(svg) => (
            [
                (header::CONTENT_TYPE, SVG_CONTENT_TYPE.to_string()),
                (header::CACHE_CONTROL, PLACEHOLDER_CACHE_CONTROL.to_string()),
                (header::ETAG, format!("\"placeholder-{id}\"")),
                (X_IMAGE_STATUS, status.as_str().to_string()),
                (X_IMAGE_ID, id),
                (X_REFRESH_AFTER, state.refresh_after_secs.to_string()),
            ],
            svg,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(%id, error = %err, "failed to build placeholder");
            error_placeholder_response()
        }
    }
}

fn error_placeholder_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [
            (header::CONTENT_TYPE, SVG_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        error_placeholder(),
    )
        .into_response()
}

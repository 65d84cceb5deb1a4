use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::comments::{Comment, CommentError, NewComment};
use crate::location::{decode_place_id, PlaceSuggestion, Resolution};
use crate::registration::{NewRegistration, Registration, RegistrationError};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn internal(e: impl std::fmt::Display) -> ApiError {
    tracing::error!(error = %e, "request failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

fn registration_error(e: RegistrationError) -> ApiError {
    const REQUIRED: &str = "Name, email, and location are required";
    match e {
        RegistrationError::MissingField(_) => api_error(StatusCode::BAD_REQUEST, REQUIRED),
        e @ RegistrationError::InvalidEmail => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        RegistrationError::Storage(e) => internal(e),
    }
}

/// Run the blocking resolver off the async workers.
async fn resolve_blocking(state: &Arc<AppState>, query: String) -> Result<Resolution, ApiError> {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || state.resolver.resolve_detailed(&query))
        .await
        .map_err(internal)
}

// ─── GET /api/health ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: bool,
    pub gazetteer_entries: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.resolver.has_provider(),
        gazetteer_entries: state.resolver.gazetteer().len(),
    })
}

// ─── /api/signups ────────────────────────────────────────────────

pub async fn list_signups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Registration>>, ApiError> {
    let state = Arc::clone(&state);
    let all = tokio::task::spawn_blocking(move || state.store.list())
        .await
        .map_err(internal)?
        .map_err(|e| registration_error(e.into()))?;
    Ok(Json(all))
}

pub async fn create_signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewRegistration>, JsonRejection>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let start = Instant::now();

    let Json(form) = payload
        .map_err(|_| registration_error(RegistrationError::MissingField("body")))?;
    let form = form.validate().map_err(registration_error)?;

    let resolution = resolve_blocking(&state, form.location.clone()).await?;

    let store_state = Arc::clone(&state);
    let saved = tokio::task::spawn_blocking(move || store_state.store.insert(form, &resolution))
        .await
        .map_err(internal)?
        .map_err(|e| registration_error(e.into()))?;

    tracing::info!(
        id = %saved.id,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "POST /api/signups"
    );
    Ok((StatusCode::CREATED, Json(saved)))
}

// ─── GET /api/geocode-text ───────────────────────────────────────

#[derive(Deserialize)]
pub struct GeocodeTextQuery {
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct GeocodeTextResponse {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: String,
    pub source: String,
}

pub async fn geocode_text(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeTextQuery>,
) -> Result<Json<GeocodeTextResponse>, ApiError> {
    let address = params
        .address
        .filter(|a| !a.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "address parameter is required"))?;

    let resolution = resolve_blocking(&state, address.clone()).await?;

    Ok(Json(GeocodeTextResponse {
        lat: resolution.coordinate.lat,
        lng: resolution.coordinate.lng,
        formatted_address: resolution.formatted.unwrap_or(address),
        source: resolution.provenance.to_string(),
    }))
}

// ─── GET /api/geocode ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PlaceIdQuery {
    pub place_id: Option<String>,
}

#[derive(Serialize)]
pub struct PlaceIdResponse {
    pub lat: f64,
    pub lng: f64,
    pub source: String,
}

pub async fn geocode_place(
    Query(params): Query<PlaceIdQuery>,
) -> Result<Json<PlaceIdResponse>, ApiError> {
    let place_id = params
        .place_id
        .filter(|p| !p.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "place_id parameter is required"))?;

    let r = decode_place_id(&place_id);
    Ok(Json(PlaceIdResponse {
        lat: r.coordinate.lat,
        lng: r.coordinate.lng,
        source: r.provenance.to_string(),
    }))
}

// ─── GET /api/places ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PlacesQuery {
    pub input: Option<String>,
}

#[derive(Serialize)]
pub struct PlacesResponse {
    pub predictions: Vec<PlaceSuggestion>,
}

pub async fn places(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlacesQuery>,
) -> Result<Json<PlacesResponse>, ApiError> {
    let input = params
        .input
        .filter(|i| !i.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Input parameter is required"))?;

    let state = Arc::clone(&state);
    let predictions = tokio::task::spawn_blocking(move || state.suggester.suggest(&input))
        .await
        .map_err(internal)?;
    Ok(Json(PlacesResponse { predictions }))
}

// ─── GET /api/map ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MapPoint {
    pub name: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize)]
pub struct MapResponse {
    pub points: Vec<MapPoint>,
}

pub async fn map_points(State(state): State<Arc<AppState>>) -> Result<Json<MapResponse>, ApiError> {
    let state = Arc::clone(&state);
    let all = tokio::task::spawn_blocking(move || state.store.list())
        .await
        .map_err(internal)?
        .map_err(|e| registration_error(e.into()))?;

    let points = all
        .into_iter()
        .filter_map(|r| {
            let c = r.coordinates?;
            Some(MapPoint {
                name: r.name,
                location: r.location,
                lat: c.lat,
                lng: c.lng,
            })
        })
        .collect();
    Ok(Json(MapResponse { points }))
}

// ─── /api/comments ───────────────────────────────────────────────

fn comment_error(e: CommentError) -> ApiError {
    match e {
        e @ CommentError::Empty => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        CommentError::Storage(e) => internal(e),
    }
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let state = Arc::clone(&state);
    let all = tokio::task::spawn_blocking(move || state.comments.list())
        .await
        .map_err(internal)?
        .map_err(|e| comment_error(e.into()))?;
    Ok(Json(all))
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Json(new) = payload.map_err(|_| comment_error(CommentError::Empty))?;
    let new = new.validate().map_err(comment_error)?;

    let state = Arc::clone(&state);
    let saved = tokio::task::spawn_blocking(move || state.comments.insert(new))
        .await
        .map_err(internal)?
        .map_err(|e| comment_error(e.into()))?;
    Ok((StatusCode::CREATED, Json(saved)))
}

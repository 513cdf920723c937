use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use crate::directory::{Cuisine, Location, Restaurant, RestaurantDraft};
use crate::filter::{filter_restaurants, Selection};
use crate::geocode::suggest::fetch_suggestions;
use crate::geocode::{CoordinateSource, FallbackReason, StructuredPlace};
use crate::media;
use crate::store::StoreError;

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

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) => api_error(StatusCode::NOT_FOUND, err.to_string()),
        StoreError::Duplicate(_) => api_error(StatusCode::CONFLICT, err.to_string()),
        StoreError::Invalid(_) => api_error(StatusCode::BAD_REQUEST, err.to_string()),
        StoreError::Io(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// Admin gate: a bearer token matching TABLEMAP_ADMIN_TOKEN. With no token
/// configured the gate stays closed.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state
        .admin_token
        .as_deref()
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Admin access is not configured"))?;

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if provided == Some(expected) {
        Ok(())
    } else {
        Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

fn log_request(method: &str, path: &str, outcome: &str, start: Instant) {
    eprintln!(
        "[{}] {} {} -> {} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        method,
        path,
        outcome,
        start.elapsed().as_secs_f64() * 1000.0,
    );
}

// ─── GET /api/restaurants ────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListQuery {
    pub cuisines: Option<String>,
    pub locations: Option<String>,
}

/// Parse a comma-separated facet parameter. Absent, empty, or "all" means
/// the sentinel; anything else must be valid facet values.
fn parse_selection<T>(param: Option<&str>) -> Result<Selection<T>, String>
where
    T: FromStr<Err = String> + PartialEq + Clone,
{
    let raw = match param {
        None => return Ok(Selection::All),
        Some(raw) => raw.trim(),
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") || raw.eq_ignore_ascii_case("all locations")
    {
        return Ok(Selection::All);
    }

    let mut values = Vec::new();
    for part in raw.split(',') {
        let value = part.parse::<T>()?;
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(Selection::Only(values))
}

pub async fn list_restaurants(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    let start = Instant::now();

    let cuisines: Selection<Cuisine> = parse_selection(params.cuisines.as_deref())
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    let locations: Selection<Location> = parse_selection(params.locations.as_deref())
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    let all = state.store.lock().unwrap().list();
    let filtered: Vec<Restaurant> = filter_restaurants(&all, &cuisines, &locations)
        .into_iter()
        .cloned()
        .collect();

    log_request("GET", "/api/restaurants", &format!("{} items", filtered.len()), start);
    Ok(Json(filtered))
}

// ─── POST /api/restaurants ───────────────────────────────────────

pub async fn create_restaurant(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(draft): Json<RestaurantDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let start = Instant::now();
    require_admin(&state, &headers)?;

    let created = state.store.lock().unwrap().create(draft).map_err(store_error)?;
    log_request("POST", "/api/restaurants", &created.id, start);
    Ok((StatusCode::CREATED, Json(created)))
}

// ─── GET /api/restaurants/{id} ───────────────────────────────────

pub async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, ApiError> {
    let store = state.store.lock().unwrap();
    let restaurant = store
        .get(&id)
        .cloned()
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Restaurant '{}' not found", id)))?;
    Ok(Json(restaurant))
}

// ─── PUT /api/restaurants/{id} ───────────────────────────────────

pub async fn update_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<RestaurantDraft>,
) -> Result<Json<Restaurant>, ApiError> {
    let start = Instant::now();
    require_admin(&state, &headers)?;

    let updated = state
        .store
        .lock()
        .unwrap()
        .update(&id, draft)
        .map_err(store_error)?;
    log_request("PUT", "/api/restaurants", &id, start);
    Ok(Json(updated))
}

// ─── DELETE /api/restaurants/{id} ────────────────────────────────

pub async fn delete_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let start = Instant::now();
    require_admin(&state, &headers)?;

    state.store.lock().unwrap().delete(&id).map_err(store_error)?;

    // Best-effort photo cleanup: the record is already gone, so a failure
    // here must not fail the request.
    if let Err(e) = state.media.remove_all(&id) {
        eprintln!("Warning: failed to delete photos for '{}': {}", id, e);
    }

    log_request("DELETE", "/api/restaurants", &id, start);
    Ok(Json(json!({ "success": true })))
}

// ─── POST /api/geocode ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
}

#[derive(Serialize)]
pub struct GeocodeResponse {
    pub latitude: f64,
    pub longitude: f64,
}

/// Strict admin geocoding: unlike the browse path, this does not hand back
/// the default coordinate — a miss is a miss.
pub async fn geocode_address(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GeocodeRequest>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let start = Instant::now();
    require_admin(&state, &headers)?;

    if req.address.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Address is required"));
    }

    let resolved = state.resolver.lock().unwrap().resolve(&req.address);
    log_request(
        "POST",
        "/api/geocode",
        &format!("{}", resolved.source),
        start,
    );

    match resolved.source {
        CoordinateSource::Fallback(FallbackReason::NoResults) => {
            Err(api_error(StatusCode::NOT_FOUND, "Address not found"))
        }
        CoordinateSource::Fallback(reason) => {
            Err(api_error(StatusCode::BAD_GATEWAY, format!("Geocoding failed: {}", reason)))
        }
        _ => Ok(Json(GeocodeResponse {
            latitude: resolved.coordinates.lat,
            longitude: resolved.coordinates.lng,
        })),
    }
}

// ─── GET /api/suggest ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SuggestQuery {
    pub q: Option<String>,
}

pub async fn suggest_places(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<Vec<StructuredPlace>>, ApiError> {
    let start = Instant::now();
    let query = params.q.as_deref().unwrap_or("").trim();

    let suggestions = fetch_suggestions(&state.lookup, query)
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, format!("Suggestion lookup failed: {}", e)))?;

    log_request(
        "GET",
        "/api/suggest",
        &format!("{} suggestions", suggestions.len()),
        start,
    );
    Ok(Json(suggestions))
}

// ─── POST /api/photos ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UploadQuery {
    pub restaurant: String,
    pub filename: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let start = Instant::now();
    require_admin(&state, &headers)?;

    if body.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing file body"));
    }
    if state.store.lock().unwrap().get(&params.restaurant).is_none() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Restaurant '{}' not found", params.restaurant),
        ));
    }

    let url = state
        .media
        .save(&params.restaurant, &params.filename, &body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    log_request("POST", "/api/photos", &url, start);
    Ok(Json(UploadResponse { url }))
}

// ─── GET /media/{id}/{file} ──────────────────────────────────────

pub async fn serve_photo(
    State(state): State<Arc<AppState>>,
    Path((id, file)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let path = state
        .media
        .file_path(&id, &file)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let bytes = std::fs::read(&path)
        .map_err(|_| api_error(StatusCode::NOT_FOUND, "Photo not found"))?;

    Ok((
        [(header::CONTENT_TYPE, media::content_type_for(&file))],
        bytes,
    )
        .into_response())
}

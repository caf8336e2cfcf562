//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::cache::ProviderError;
use crate::domain::Locale;

use super::dto::*;
use super::state::AppState;

/// Actions understood by the proxy endpoint.
const AVAILABLE_ACTIONS: &[&str] = &["getStations", "health"];

/// Create the application router.
///
/// The permissive CORS layer also answers `OPTIONS` preflights with
/// `200` and no body, which the browser front-end depends on.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(api_dispatch))
        .route("/stations", get(list_stations))
        .route("/stations/refresh", post(refresh_stations))
        .route("/favorites/:id", post(toggle_favorite))
        .layer(cors)
        .with_state(state)
}

/// Timestamp in the `Y-m-d H:i:s` shape the proxy has always served.
fn proxy_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Action-dispatch proxy endpoint: `GET /api?action=...`.
async fn api_dispatch(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Response {
    match query.action.as_deref() {
        Some("getStations") => proxy_stations(&state).await,
        Some("health") => Json(HealthResponse {
            success: true,
            message: "API is running",
            timestamp: proxy_timestamp(),
        })
        .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(ProxyFailure {
                success: false,
                error: "No action specified or invalid action".to_string(),
                available_actions: Some(AVAILABLE_ACTIONS),
            }),
        )
            .into_response(),
    }
}

/// Forward the raw upstream payload, wrapped in the proxy envelope.
async fn proxy_stations(state: &AppState) -> Response {
    match state.orchestrator.fetch().await {
        Ok(payload) => {
            let total_results = payload
                .get("results")
                .and_then(|r| r.as_array())
                .map(|r| r.len())
                .unwrap_or(0);

            Json(ProxySuccess {
                success: true,
                data: payload.as_ref(),
                timestamp: proxy_timestamp(),
                total_results,
            })
            .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProxyFailure {
                success: false,
                error: e.to_string(),
                available_actions: None,
            }),
        )
            .into_response(),
    }
}

/// Normalized station list for the presentation layer.
async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<StationsQuery>,
) -> Result<Json<StationsResponse>, AppError> {
    let locale = query
        .locale
        .as_deref()
        .map(Locale::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?
        .unwrap_or(Locale::Nl);

    let stations = state.stations.stations().await?;
    let favorites = state.favorites.read().await;

    let views: Vec<StationView> = stations
        .iter()
        .map(|s| StationView::from_station(s, locale, favorites.contains(s.id.as_str())))
        .collect();

    Ok(Json(StationsResponse {
        count: views.len(),
        stations: views,
    }))
}

/// Manual refresh: drop the cached list and fetch a fresh one.
async fn refresh_stations(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    state.stations.invalidate();
    let stations = state.stations.stations().await?;

    Ok(Json(RefreshResponse {
        count: stations.len(),
    }))
}

/// Toggle the favorite flag for a station id.
async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<FavoriteResponse> {
    let mut favorites = state.favorites.write().await;
    let favorite = if favorites.remove(&id) {
        false
    } else {
        favorites.insert(id.clone());
        true
    };

    Json(FavoriteResponse { id, favorite })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Upstream { message: String },
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
        };

        error!(%status, %message, "request failed");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

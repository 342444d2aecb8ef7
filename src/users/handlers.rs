use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{MeResponse, OkResponse, PreferencesUpdate},
    repo,
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/preferences", post(update_preferences))
}

#[instrument(skip(state, claims), fields(username = %claims.username))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = repo::find(state.store.as_ref(), &claims.username).await?;
    Ok(Json(MeResponse {
        username: user.username,
        role: user.role,
        preferences: user.preferences,
    }))
}

/// Only ever touches the caller's own record.
#[instrument(skip(state, claims, payload), fields(username = %claims.username))]
pub async fn update_preferences(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<PreferencesUpdate>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(payload) = payload?;
    let prefs = repo::update_preferences(state.store.as_ref(), &claims.username, payload).await?;
    info!(clock_mode = ?prefs.clock_mode, "preferences updated");
    Ok(Json(OkResponse::ok()))
}

use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{AuthResponse, LoginRequest},
    jwt::JwtKeys,
    services,
};
use crate::{
    error::{ApiError, ValidationError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    let username = payload
        .username
        .filter(|u| !u.is_empty())
        .ok_or(ValidationError::MissingField("username"))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or(ValidationError::MissingField("password"))?;

    let keys = JwtKeys::from_ref(&state);
    let response = services::login(state.store.as_ref(), &keys, &username, &password).await?;
    Ok(Json(response))
}

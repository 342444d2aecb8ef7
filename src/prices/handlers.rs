use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{PricesResponse, UpdatePricesRequest};
use crate::{
    auth::{extractors::AuthUser, services::require_role},
    error::{ApiError, ValidationError},
    state::AppState,
    store,
    users::{dto::OkResponse, repo_types::Role},
};

pub fn price_routes() -> Router<AppState> {
    Router::new()
        .route("/prices", get(get_prices))
        .route("/admin/prices", post(replace_prices))
}

/// Stored table and settings plus the cached market board. Upstream failures
/// only show up inside `market`.
#[instrument(skip(state, claims), fields(username = %claims.username))]
pub async fn get_prices(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PricesResponse>, ApiError> {
    let doc = state.store.get().await?;
    let market = state.market.get_market().await.into();
    Ok(Json(PricesResponse {
        prices: doc.prices,
        settings: doc.settings,
        market,
    }))
}

#[instrument(skip(state, claims, payload), fields(username = %claims.username))]
pub async fn replace_prices(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<UpdatePricesRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    require_role(state.store.as_ref(), &claims, Role::Admin).await?;
    let Json(payload) = payload?;
    let prices = payload
        .prices
        .ok_or(ValidationError::MissingField("prices"))?;

    let count = prices.len();
    store::modify(state.store.as_ref(), move |doc| {
        doc.prices = prices;
        Ok::<_, ApiError>(())
    })
    .await?;

    info!(instruments = count, "price table replaced");
    Ok(Json(OkResponse::ok()))
}

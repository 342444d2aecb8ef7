use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{error::UpstreamError, state::AppState};

pub mod cache;
pub mod source;

pub use cache::{MarketCache, MarketSnapshot};

/// What clients see under `market`: the snapshot, or `{ "error": ... }`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MarketPayload {
    Snapshot(Arc<MarketSnapshot>),
    Failed { error: String },
}

impl From<Result<Arc<MarketSnapshot>, UpstreamError>> for MarketPayload {
    fn from(res: Result<Arc<MarketSnapshot>, UpstreamError>) -> Self {
        match res {
            Ok(snapshot) => MarketPayload::Snapshot(snapshot),
            Err(e) => MarketPayload::Failed {
                error: e.to_string(),
            },
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/market", get(get_market))
}

/// Public market board used by the dashboard landing page.
#[instrument(skip(state))]
pub async fn get_market(State(state): State<AppState>) -> Json<MarketPayload> {
    Json(state.market.get_market().await.into())
}

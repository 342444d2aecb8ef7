use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{market::MarketPayload, store::PriceTable};

#[derive(Debug, Serialize)]
pub struct PricesResponse {
    pub prices: PriceTable,
    pub settings: Map<String, Value>,
    pub market: MarketPayload,
}

/// Full replacement of the price table.
#[derive(Debug, Deserialize)]
pub struct UpdatePricesRequest {
    pub prices: Option<PriceTable>,
}

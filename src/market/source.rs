use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{config::MarketConfig, error::UpstreamError};

/// Gold and forex boards from the second provider.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoldAndFx {
    pub altin: Value,
    pub doviz: Value,
}

/// Upstream price providers. Payloads are passed through untouched.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Combined rates board (truncgil).
    async fn rates(&self) -> Result<Value, UpstreamError>;
    /// Gold and forex boards (genelpara), two calls.
    async fn gold_and_fx(&self) -> Result<GoldAndFx, UpstreamError>;
}

pub struct HttpMarketSource {
    client: Client,
    truncgil_url: String,
    altin_url: String,
    doviz_url: String,
}

impl HttpMarketSource {
    pub fn new(cfg: &MarketConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(cfg.upstream_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            truncgil_url: cfg.truncgil_url.clone(),
            altin_url: cfg.genelpara_altin_url.clone(),
            doviz_url: cfg.genelpara_doviz_url.clone(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        let resp = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| classify(url, e))?;

        let body = resp.bytes().await.map_err(|e| classify(url, e))?;
        debug!(%url, bytes = body.len(), "upstream responded");

        serde_json::from_slice(&body).map_err(|e| UpstreamError::ParseFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn classify(url: &str, e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout {
            url: url.to_string(),
        }
    } else {
        UpstreamError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl MarketSource for HttpMarketSource {
    async fn rates(&self) -> Result<Value, UpstreamError> {
        self.get_json(&self.truncgil_url).await
    }

    async fn gold_and_fx(&self) -> Result<GoldAndFx, UpstreamError> {
        let (altin, doviz) =
            tokio::try_join!(self.get_json(&self.altin_url), self.get_json(&self.doviz_url))?;
        Ok(GoldAndFx { altin, doviz })
    }
}

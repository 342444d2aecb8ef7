use crate::config::AppConfig;
use crate::market::{source::HttpMarketSource, MarketCache};
use crate::store::{JsonFileStore, Store};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub market: Arc<MarketCache>,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = Arc::new(JsonFileStore::new(&config.db_file)) as Arc<dyn Store>;

        let source = Arc::new(HttpMarketSource::new(&config.market)?);
        let market = Arc::new(MarketCache::new(source, config.market.cache_ttl));

        Ok(Self::from_parts(config, store, market))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn Store>, market: Arc<MarketCache>) -> Self {
        Self {
            config,
            store,
            market,
        }
    }

    /// In-memory store and a canned market source; nothing touches disk or network.
    #[cfg(test)]
    pub fn fake() -> (Self, Arc<crate::market::source::testing::FakeSource>) {
        use crate::config::{AdminSeed, JwtConfig, MarketConfig};
        use crate::market::source::testing::FakeSource;
        use crate::store::{Document, MemoryStore};
        use std::time::Duration;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            frontend_origin: "*".into(),
            db_file: "unused.json".into(),
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
            },
            market: MarketConfig {
                truncgil_url: "fake://truncgil".into(),
                genelpara_altin_url: "fake://altin".into(),
                genelpara_doviz_url: "fake://doviz".into(),
                cache_ttl: Duration::from_secs(60),
                upstream_timeout: Duration::from_secs(1),
            },
            admin: AdminSeed {
                username: "admin".into(),
                password: "admin123".into(),
            },
        });

        let store = Arc::new(MemoryStore::new(Document::seed())) as Arc<dyn Store>;
        let source = Arc::new(FakeSource::default());
        let market = Arc::new(MarketCache::new(source.clone(), config.market.cache_ttl));

        (Self::from_parts(config, store, market), source)
    }
}

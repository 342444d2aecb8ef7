use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::users::repo_types::User;

/// Buy/sell pair for one instrument.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    #[serde(alias = "alis")]
    pub buy: f64,
    #[serde(alias = "satis")]
    pub sell: f64,
}

pub type PriceTable = BTreeMap<String, PriceQuote>;

/// The whole persisted state. Every mutation rewrites the full document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub prices: PriceTable,
}

impl Document {
    pub fn seed() -> Self {
        let mut settings = Map::new();
        settings.insert("siteTitle".into(), json!("Altin & Doviz - Dashboard"));

        let prices = [
            ("gram", 3530.0, 3600.0),
            ("ons", 2360.5, 2365.0),
            ("usd", 33.497, 33.55),
        ]
        .into_iter()
        .map(|(k, buy, sell)| (k.to_string(), PriceQuote { buy, sell }))
        .collect();

        Self {
            users: Vec::new(),
            settings,
            prices,
        }
    }

    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn find_user_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.username == username)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self) -> anyhow::Result<Document>;
    /// Replace the whole document. Last writer wins.
    async fn put(&self, doc: &Document) -> anyhow::Result<()>;
    /// Serialises read-modify-write cycles within this process.
    fn writer(&self) -> &Mutex<()>;
}

/// Read the document, apply `f`, write it back while holding the writer lock.
/// Nothing is written when `f` fails.
pub async fn modify<T, E, F>(store: &dyn Store, f: F) -> Result<T, E>
where
    F: FnOnce(&mut Document) -> Result<T, E>,
    E: From<anyhow::Error>,
{
    let _guard = store.writer().lock().await;
    let mut doc = store.get().await?;
    let out = f(&mut doc)?;
    store.put(&doc).await?;
    Ok(out)
}

/// Single JSON file on disk, re-seeded when missing or not JSON at all.
pub struct JsonFileStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    async fn reseed(&self) -> anyhow::Result<Document> {
        let seed = Document::seed();
        self.put(&seed).await?;
        info!(path = %self.path.display(), "store seeded");
        Ok(seed)
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn get(&self) -> anyhow::Result<Document> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let value = match serde_json::from_slice::<Value>(&bytes) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(error = %e, path = %self.path.display(), "store is not JSON; re-seeding");
                        return self.reseed().await;
                    }
                };
                // Valid JSON of the wrong shape is someone's data; never overwrite it.
                serde_json::from_value(value).with_context(|| {
                    format!("{} does not match the store layout", self.path.display())
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => self.reseed().await,
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }

    async fn put(&self, doc: &Document) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(doc).context("serialize store document")?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("rename {} -> {}", tmp.display(), self.path.display()))?;
        debug!(path = %self.path.display(), bytes = body.len(), "store written");
        Ok(())
    }

    fn writer(&self) -> &Mutex<()> {
        &self.writer
    }
}

/// In-process store used by tests and `AppState::fake`.
#[cfg(test)]
pub struct MemoryStore {
    doc: tokio::sync::RwLock<Document>,
    writer: Mutex<()>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new(doc: Document) -> Self {
        Self {
            doc: tokio::sync::RwLock::new(doc),
            writer: Mutex::new(()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Store for MemoryStore {
    async fn get(&self) -> anyhow::Result<Document> {
        Ok(self.doc.read().await.clone())
    }

    async fn put(&self, doc: &Document) -> anyhow::Result<()> {
        *self.doc.write().await = doc.clone();
        Ok(())
    }

    fn writer(&self) -> &Mutex<()> {
        &self.writer
    }
}

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

pub const DEV_JWT_SECRET: &str = "change_me_please";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    pub fn is_dev_secret(&self) -> bool {
        self.secret == DEV_JWT_SECRET
    }
}

/// Upstream price providers and the cache in front of them.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub truncgil_url: String,
    pub genelpara_altin_url: String,
    pub genelpara_doviz_url: String,
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
}

/// Credentials used to seed the bootstrap admin.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_origin: String,
    pub db_file: PathBuf,
    pub jwt: JwtConfig,
    pub market: MarketConfig,
    pub admin: AdminSeed,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: env_or("JWT_SECRET", DEV_JWT_SECRET),
            issuer: env_or("JWT_ISSUER", "kuyumcu"),
            audience: env_or("JWT_AUDIENCE", "kuyumcu-dashboard"),
        };
        anyhow::ensure!(!jwt.secret.is_empty(), "JWT_SECRET must not be empty");

        let market = MarketConfig {
            truncgil_url: env_or("TRUNCGIL_URL", "https://finans.truncgil.com/today.json"),
            genelpara_altin_url: env_or(
                "GENELPARA_ALTIN_URL",
                "https://api.genelpara.com/embed/altin.json",
            ),
            genelpara_doviz_url: env_or(
                "GENELPARA_DOVIZ_URL",
                "https://api.genelpara.com/embed/doviz.json",
            ),
            cache_ttl: Duration::from_millis(env_parsed("CACHE_TTL_MS", 60_000u64)),
            upstream_timeout: Duration::from_millis(env_parsed("UPSTREAM_TIMEOUT_MS", 10_000u64)),
        };

        let admin = AdminSeed {
            username: env_or("ADMIN_USER", "admin"),
            password: env_or("ADMIN_PASS", "admin123"),
        };

        Ok(Self {
            host: env_or("APP_HOST", "0.0.0.0"),
            port: env_parsed("PORT", 5000u16),
            frontend_origin: env_or("FRONTEND_ORIGIN", "*"),
            db_file: PathBuf::from(env_or("DB_FILE", "db.json")),
            jwt,
            market,
            admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parsed_falls_back_on_garbage() {
        std::env::set_var("KUYUMCU_TEST_TTL", "not-a-number");
        assert_eq!(env_parsed("KUYUMCU_TEST_TTL", 60_000u64), 60_000);
        std::env::set_var("KUYUMCU_TEST_TTL", "1500");
        assert_eq!(env_parsed("KUYUMCU_TEST_TTL", 60_000u64), 1500);
        std::env::remove_var("KUYUMCU_TEST_TTL");
    }

    #[test]
    fn dev_secret_is_detected() {
        let jwt = JwtConfig {
            secret: DEV_JWT_SECRET.into(),
            issuer: "i".into(),
            audience: "a".into(),
        };
        assert!(jwt.is_dev_secret());
    }
}

use tracing::{info, warn};

use super::{
    dto::PreferencesUpdate,
    repo_types::{Preferences, Role, User},
};
use crate::{
    auth::password::{hash_password, is_argon2_hash},
    config::AdminSeed,
    error::ApiError,
    store::{self, Store},
};

/// Creates the bootstrap admin when the store has none. A bootstrap admin whose
/// stored hash cannot be verified here gets the configured password again, so
/// an imported data file never locks the operator out. Returns whether a record
/// was added, promoted or reset.
pub async fn ensure_admin(store: &dyn Store, seed: &AdminSeed) -> anyhow::Result<bool> {
    store::modify(store, |doc| {
        if let Some(existing) = doc.find_user_mut(&seed.username) {
            if existing.role == Role::Admin && !is_argon2_hash(&existing.password_hash) {
                warn!(username = %seed.username, "admin has a legacy password hash; resetting to configured password");
                existing.password_hash = hash_password(&seed.password)?;
                return Ok(true);
            }
        }

        if doc.users.iter().any(|u| u.role == Role::Admin) {
            return Ok(false);
        }

        if let Some(existing) = doc.find_user_mut(&seed.username) {
            warn!(username = %seed.username, "promoting existing user to admin");
            existing.role = Role::Admin;
            return Ok(true);
        }

        doc.users.push(User {
            username: seed.username.clone(),
            password_hash: hash_password(&seed.password)?,
            role: Role::Admin,
            preferences: Preferences::default(),
        });
        info!(username = %seed.username, "[seed] admin created");
        Ok(true)
    })
    .await
}

pub async fn find(store: &dyn Store, username: &str) -> Result<User, ApiError> {
    let doc = store.get().await?;
    doc.find_user(username).cloned().ok_or(ApiError::NotFound)
}

/// Merges the given fields into the caller's own preferences.
pub async fn update_preferences(
    store: &dyn Store,
    username: &str,
    update: PreferencesUpdate,
) -> Result<Preferences, ApiError> {
    store::modify(store, |doc| {
        let user = doc.find_user_mut(username).ok_or(ApiError::NotFound)?;
        update.apply(&mut user.preferences);
        Ok(user.preferences.clone())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::password::verify_password,
        store::{Document, MemoryStore},
        users::repo_types::ClockMode,
    };

    fn seed(name: &str) -> AdminSeed {
        AdminSeed {
            username: name.into(),
            password: "admin123".into(),
        }
    }

    #[tokio::test]
    async fn empty_store_gets_exactly_one_admin() {
        let store = MemoryStore::new(Document::seed());
        assert!(ensure_admin(&store, &seed("admin")).await.unwrap());

        let doc = store.get().await.unwrap();
        assert_eq!(doc.users.len(), 1);
        assert_eq!(doc.users[0].username, "admin");
        assert_eq!(doc.users[0].role, Role::Admin);
        assert_eq!(doc.users[0].preferences, Preferences::default());
        assert!(verify_password("admin123", &doc.users[0].password_hash).unwrap());
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = MemoryStore::new(Document::seed());
        ensure_admin(&store, &seed("patron")).await.unwrap();
        assert!(!ensure_admin(&store, &seed("patron")).await.unwrap());
        assert!(!ensure_admin(&store, &seed("someone-else")).await.unwrap());
        assert_eq!(store.get().await.unwrap().users.len(), 1);
    }

    #[tokio::test]
    async fn existing_user_with_seed_name_is_promoted_not_duplicated() {
        let mut doc = Document::seed();
        doc.users.push(User {
            username: "admin".into(),
            password_hash: "x".into(),
            role: Role::User,
            preferences: Preferences::default(),
        });
        let store = MemoryStore::new(doc);
        assert!(ensure_admin(&store, &seed("admin")).await.unwrap());

        let doc = store.get().await.unwrap();
        assert_eq!(doc.users.len(), 1);
        assert_eq!(doc.users[0].role, Role::Admin);
    }

    #[tokio::test]
    async fn legacy_admin_hash_is_reset_to_configured_password() {
        let mut doc = Document::seed();
        for (name, role) in [("admin", Role::Admin), ("kasiyer", Role::User)] {
            doc.users.push(User {
                username: name.into(),
                password_hash: "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy".into(),
                role,
                preferences: Preferences::default(),
            });
        }
        let store = MemoryStore::new(doc);

        assert!(ensure_admin(&store, &seed("admin")).await.unwrap());
        let doc = store.get().await.unwrap();
        assert_eq!(doc.users.len(), 2);
        assert!(verify_password("admin123", &doc.find_user("admin").unwrap().password_hash).unwrap());
        assert!(doc.find_user("kasiyer").unwrap().password_hash.starts_with("$2a$"));

        assert!(!ensure_admin(&store, &seed("admin")).await.unwrap());
    }

    #[tokio::test]
    async fn partial_update_preserves_unspecified_fields() {
        let store = MemoryStore::new(Document::seed());
        ensure_admin(&store, &seed("admin")).await.unwrap();

        let update = PreferencesUpdate {
            clock_text: Some("Hi".into()),
            ..Default::default()
        };
        let prefs = update_preferences(&store, "admin", update).await.unwrap();
        assert_eq!(
            prefs,
            Preferences {
                clock_mode: ClockMode::Text,
                clock_text: "Hi".into(),
                clock_image_url: String::new(),
            }
        );
        assert_eq!(find(&store, "admin").await.unwrap().preferences, prefs);
    }

    #[tokio::test]
    async fn update_for_missing_user_is_not_found() {
        let store = MemoryStore::new(Document::seed());
        let err = update_preferences(&store, "ghost", PreferencesUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert!(matches!(find(&store, "ghost").await, Err(ApiError::NotFound)));
    }
}

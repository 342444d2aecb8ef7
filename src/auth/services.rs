use tracing::{info, warn};

use super::{
    claims::Claims,
    dto::{AuthResponse, PublicUser},
    jwt::JwtKeys,
    password::check_credentials,
};
use crate::{
    error::{ApiError, AuthError},
    store::Store,
    users::repo_types::{Role, User},
};

/// Verifies credentials against the store and issues a session token.
pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    username: &str,
    password: &str,
) -> Result<AuthResponse, ApiError> {
    let doc = store.get().await?;
    let user = doc.find_user(username);

    if !check_credentials(password, user.map(|u| u.password_hash.as_str())) {
        warn!(%username, "login rejected");
        return Err(AuthError::InvalidCredentials.into());
    }
    let Some(user) = user else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let token = keys.sign(&user.username, user.role)?;
    info!(username = %user.username, role = ?user.role, "user logged in");
    Ok(AuthResponse {
        token,
        user: PublicUser {
            username: user.username.clone(),
            role: user.role,
        },
    })
}

/// Two-phase role check: the token claim first, then the live store record,
/// so a demoted user's still-valid token loses its privileges.
pub async fn require_role(store: &dyn Store, claims: &Claims, role: Role) -> Result<User, ApiError> {
    if claims.role != role {
        warn!(username = %claims.username, ?role, "role claim mismatch");
        return Err(AuthError::Forbidden.into());
    }

    let doc = store.get().await?;
    match doc.find_user(&claims.username) {
        Some(user) if user.role == role => Ok(user.clone()),
        _ => {
            warn!(username = %claims.username, ?role, "stored role mismatch");
            Err(AuthError::Forbidden.into())
        }
    }
}

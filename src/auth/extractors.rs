use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{claims::Claims, jwt::JwtKeys};
use crate::error::{ApiError, AuthError};

/// Verified session claims taken from `Authorization: Bearer <token>`.
pub struct AuthUser(pub Claims);

/// Pulls the token out of a header value; anything but `Bearer <token>` is rejected.
pub(crate) fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::Unauthorized)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = bearer_token(header)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token)?;
        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Ok("abc"));
        assert_eq!(bearer_token(None), Err(AuthError::Unauthorized));
        assert_eq!(bearer_token(Some("Basic abc")), Err(AuthError::Unauthorized));
        assert_eq!(bearer_token(Some("Bearer ")), Err(AuthError::Unauthorized));
        assert_eq!(bearer_token(Some("abc")), Err(AuthError::Unauthorized));
    }
}

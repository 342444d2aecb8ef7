use serde::{Deserialize, Serialize};

use crate::users::repo_types::Role;

/// JWT payload carried by session tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub username: String, // user key
    pub role: Role,       // role at issuance; re-checked for admin writes
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
    pub iss: String,      // issuer
    pub aud: String,      // audience
}

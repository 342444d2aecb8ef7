use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    Text,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub clock_mode: ClockMode,
    pub clock_text: String,
    pub clock_image_url: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            clock_mode: ClockMode::Text,
            clock_text: "Hosgeldiniz!".into(),
            clock_image_url: String::new(),
        }
    }
}

/// User record as stored in the JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,               // unique key
    #[serde(alias = "passHash")]
    pub password_hash: String,          // Argon2 PHC string
    pub role: Role,
    #[serde(default)]
    pub preferences: Preferences,
}

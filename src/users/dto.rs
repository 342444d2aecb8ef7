use serde::{Deserialize, Serialize};

use super::repo_types::{ClockMode, Preferences, Role};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub role: Role,
    pub preferences: Preferences,
}

/// Partial preferences update; absent (or null) fields keep their value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub clock_mode: Option<ClockMode>,
    pub clock_text: Option<String>,
    pub clock_image_url: Option<String>,
}

impl PreferencesUpdate {
    pub fn apply(self, prefs: &mut Preferences) {
        if let Some(mode) = self.clock_mode {
            prefs.clock_mode = mode;
        }
        if let Some(text) = self.clock_text {
            prefs.clock_text = text;
        }
        if let Some(url) = self.clock_image_url {
            prefs.clock_image_url = url;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_replace_but_nulls_do_not() {
        let mut prefs = Preferences::default();
        let update: PreferencesUpdate =
            serde_json::from_str(r#"{"clockText": "", "clockImageUrl": null, "clockMode": "image"}"#)
                .unwrap();
        update.apply(&mut prefs);
        assert_eq!(prefs.clock_text, "");
        assert_eq!(prefs.clock_image_url, "");
        assert_eq!(prefs.clock_mode, ClockMode::Image);
    }

    #[test]
    fn test_me_response_serialization() {
        let response = MeResponse {
            username: "ayse".into(),
            role: Role::User,
            preferences: Preferences::default(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["preferences"]["clockMode"], "text");
        assert_eq!(json["preferences"]["clockText"], "Hosgeldiniz!");
    }
}

//! Client settings and preferences
//!
//! Persisted in LocalStorage; every field falls back to its default when the
//! stored JSON is missing it.

use serde::{Deserialize, Serialize};

use crate::protocol::Difficulty;

/// Client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base HTTP URL of the game server (token + game creation + WebSocket)
    pub server_url: String,
    /// Difficulty button focused on the selection screen
    pub default_difficulty: Difficulty,
    /// Prefill the login form with the last username
    pub remember_username: bool,
    pub last_username: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            default_difficulty: Difficulty::Elementary,
            remember_username: true,
            last_username: None,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "math_slicer_settings";

    /// Parse stored settings, falling back to defaults on bad JSON
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("Ignoring stored settings: {}", e);
            Self::default()
        })
    }

    /// Record a successful login
    pub fn remember_login(&mut self, username: &str, difficulty: Option<Difficulty>) {
        self.last_username = self.remember_username.then(|| username.to_string());
        if let Some(d) = difficulty {
            self.default_difficulty = d;
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{"server_url": "https://slice.example.com"}"#);
        assert_eq!(s.server_url, "https://slice.example.com");
        assert_eq!(s.default_difficulty, Difficulty::Elementary);
        assert!(s.remember_username);
    }

    #[test]
    fn test_bad_json_uses_defaults() {
        assert_eq!(Settings::from_json("nope"), Settings::default());
    }

    #[test]
    fn test_remember_login() {
        let mut s = Settings::default();
        s.remember_login("student1", Some(Difficulty::Coding));
        assert_eq!(s.last_username.as_deref(), Some("student1"));
        assert_eq!(s.default_difficulty, Difficulty::Coding);

        let mut s = Settings {
            remember_username: false,
            ..Default::default()
        };
        s.remember_login("student1", None);
        assert_eq!(s.last_username, None);
    }

    #[test]
    fn test_opting_out_forgets_stored_username() {
        let mut s = Settings::from_json(r#"{"last_username": "student1"}"#);
        assert_eq!(s.last_username.as_deref(), Some("student1"));

        s.remember_username = false;
        s.remember_login("student2", None);
        assert_eq!(s.last_username, None);
    }
}

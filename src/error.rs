//! Client error type
//!
//! Protocol errors sent by the server are data (`ServerMessage::error`), not
//! variants here. This type covers failures of the client's own plumbing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Token request rejected or unreadable
    #[error("Login failed: {0}")]
    Auth(String),

    /// Game creation request rejected or unreadable
    #[error("Failed to create game: {0}")]
    GameCreation(String),

    /// WebSocket could not be opened or written to
    #[error("Transport error: {0}")]
    Transport(String),

    /// Inbound frame was not a JSON object we understand
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A browser API call threw
    #[error("Browser error: {0}")]
    Browser(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for ClientError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &"message".into())
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{:?}", value));
        ClientError::Browser(text)
    }
}

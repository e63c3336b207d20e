//! Server collaborators: login, game creation and the game WebSocket
//!
//! URL construction is platform independent; the fetch and socket wrappers
//! are browser only.

#[cfg(target_arch = "wasm32")]
mod http;
#[cfg(target_arch = "wasm32")]
mod socket;

#[cfg(target_arch = "wasm32")]
pub use http::{create_game, login};
#[cfg(target_arch = "wasm32")]
pub use socket::{GameSocket, LinkEvent};

/// Bearer credential plus the player id it was issued for
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub token: String,
    pub player_id: String,
}

impl Credential {
    /// `Authorization` header value
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Server URLs derived from one base HTTP URL
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(server_url: &str) -> Self {
        Self {
            base: server_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn token(&self) -> String {
        format!("{}/token", self.base)
    }

    pub fn create_game(&self) -> String {
        format!("{}/games/create", self.base)
    }

    /// WebSocket URL for one player in one game
    pub fn game_socket(&self, game_id: &str, player_id: &str) -> String {
        format!(
            "{}/ws/game/{}/{}",
            socket_base(&self.base),
            encode_component(game_id),
            encode_component(player_id)
        )
    }
}

/// Map the HTTP scheme onto the matching WebSocket scheme
fn socket_base(base: &str) -> String {
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        format!("ws://{}", base)
    }
}

/// `application/x-www-form-urlencoded` login body
pub fn login_form(username: &str, password: &str) -> String {
    format!(
        "username={}&password={}",
        encode_component(username),
        encode_component(password)
    )
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
///
/// Plain Rust rather than `js_sys::encode_uri_component` so URL building stays
/// usable (and tested) in native builds.
fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_endpoints() {
        let e = Endpoints::new("http://localhost:8000/");
        assert_eq!(e.token(), "http://localhost:8000/token");
        assert_eq!(e.create_game(), "http://localhost:8000/games/create");
    }

    #[test]
    fn test_socket_scheme_follows_http_scheme() {
        let e = Endpoints::new("http://localhost:8000");
        assert_eq!(
            e.game_socket("game_0", "student1"),
            "ws://localhost:8000/ws/game/game_0/student1"
        );
        let e = Endpoints::new("https://slice.example.com");
        assert_eq!(
            e.game_socket("game_3", "student1"),
            "wss://slice.example.com/ws/game/game_3/student1"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let e = Endpoints::new("http://localhost:8000");
        assert_eq!(
            e.game_socket("game_0", "a b/c"),
            "ws://localhost:8000/ws/game/game_0/a%20b%2Fc"
        );
    }

    #[test]
    fn test_login_form() {
        assert_eq!(
            login_form("student1", "math&123"),
            "username=student1&password=math%26123"
        );
    }

    #[test]
    fn test_bearer() {
        let c = Credential {
            token: "abc".into(),
            player_id: "student1".into(),
        };
        assert_eq!(c.bearer(), "Bearer abc");
    }
}

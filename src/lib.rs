//! Math Slicer - browser client for a timed arithmetic slicing game
//!
//! Core modules:
//! - `sim`: Session state machine (targets, hits, break clock, message reconciler)
//! - `protocol`: Wire types exchanged with the game server
//! - `renderer`: WebGPU rendering pipeline
//! - `net`: Login, game creation and WebSocket transport
//! - `settings`: Persisted client preferences
//! - `replay`: Offline trace replay for the native build
//! - `ui`: DOM HUD (wasm only)

pub mod error;
pub mod net;
pub mod protocol;
pub mod renderer;
pub mod replay;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod ui;

pub use error::ClientError;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical canvas size; all pixel distances are measured in this space
    pub const CANVAS_WIDTH: f32 = 600.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;

    /// Linear fade-in duration for new targets (ms)
    pub const FADE_IN_MS: f64 = 1000.0;
    /// Drawn target radius (px)
    pub const TARGET_RADIUS: f32 = 25.0;
    /// Pointer must be strictly closer than this to a target center (px)
    pub const HIT_RADIUS: f32 = 25.0;
    /// Global cooldown between accepted slices (ms)
    pub const SLICE_COOLDOWN_MS: f64 = 500.0;

    /// Play/break duty cycle (ms)
    pub const PLAY_DURATION_MS: f64 = 60_000.0;
    pub const BREAK_DURATION_MS: f64 = 60_000.0;

    /// How long "Correct" feedback stays up before the board clears (ms)
    pub const FEEDBACK_MS: f64 = 500.0;
    /// How long an in-game protocol error stays on screen (ms)
    pub const ERROR_NOTICE_MS: f64 = 3000.0;

    /// Target labels longer than this are cut
    pub const LABEL_MAX_CHARS: usize = 6;
    /// Shown when a question arrives without equation text
    pub const PROBLEM_PLACEHOLDER: &str = "No problem received";
}

/// Convert a normalized [0,1]x[0,1] position to logical canvas pixels
#[inline]
pub fn normalized_to_canvas(pos: Vec2) -> Vec2 {
    Vec2::new(pos.x * consts::CANVAS_WIDTH, pos.y * consts::CANVAS_HEIGHT)
}

/// Convert a position in a client-sized element to logical canvas pixels
#[inline]
pub fn client_to_canvas(x: f32, y: f32, client_w: f32, client_h: f32) -> Vec2 {
    if client_w <= 0.0 || client_h <= 0.0 {
        return Vec2::new(x, y);
    }
    Vec2::new(
        x * consts::CANVAS_WIDTH / client_w,
        y * consts::CANVAS_HEIGHT / client_h,
    )
}

/// Device-pixel size for a canvas displayed at `client_w` x `client_h`.
///
/// An element that is not laid out yet (hidden screen) reports zero size; the
/// logical canvas size is used instead so the surface is never degenerate.
pub fn backing_size(client_w: f32, client_h: f32, dpr: f32) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let (w, h) = if client_w >= 1.0 && client_h >= 1.0 {
        (client_w, client_h)
    } else {
        (consts::CANVAS_WIDTH, consts::CANVAS_HEIGHT)
    };
    (((w * dpr).round() as u32).max(1), ((h * dpr).round() as u32).max(1))
}

/// Cut a label to at most `LABEL_MAX_CHARS` characters
pub fn truncate_label(text: &str) -> String {
    text.chars().take(consts::LABEL_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_to_canvas() {
        let p = normalized_to_canvas(Vec2::new(0.5, 0.25));
        assert_eq!(p, Vec2::new(300.0, 100.0));
    }

    #[test]
    fn test_client_to_canvas_scales() {
        // Canvas displayed at double size
        let p = client_to_canvas(600.0, 400.0, 1200.0, 800.0);
        assert_eq!(p, Vec2::new(300.0, 200.0));
        // Degenerate element size passes through
        assert_eq!(client_to_canvas(3.0, 4.0, 0.0, 0.0), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_backing_size_hidden_canvas_uses_logical_size() {
        // display:none reports 0x0
        assert_eq!(backing_size(0.0, 0.0, 2.0), (1200, 800));
        assert_eq!(backing_size(0.0, 0.0, 1.0), (600, 400));
    }

    #[test]
    fn test_backing_size_follows_layout() {
        assert_eq!(backing_size(900.0, 600.0, 1.0), (900, 600));
        assert_eq!(backing_size(600.0, 400.0, 1.5), (900, 600));
        // Bogus ratio treated as 1
        assert_eq!(backing_size(600.0, 400.0, 0.0), (600, 400));
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("0.3333333"), "0.3333");
        assert_eq!(truncate_label("42"), "42");
        // Character based, not byte based
        assert_eq!(truncate_label("∫ 2x^3 dx"), "∫ 2x^3");
    }
}

//! Offline trace replay
//!
//! Drives a `Session` from a recorded trace so the state machine can be
//! exercised without a browser. One JSON object per line:
//!
//! ```text
//! {"at_ms": 0, "message": {"status": "waiting", "problem": "2 + 3", ...}}
//! {"at_ms": 1200, "pointer": [150, 200]}
//! {"at_ms": 1300, "link": "closed"}
//! ```
//!
//! Each entry first runs a frame at `at_ms` (with `pointer` if given), then
//! applies `message` and `link` events.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::sim::{Session, SessionPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkChange {
    Closed,
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceEntry {
    pub at_ms: f64,
    #[serde(default)]
    pub pointer: Option<[f32; 2]>,
    #[serde(default)]
    pub message: Option<ServerMessage>,
    #[serde(default)]
    pub link: Option<LinkChange>,
}

/// Final state after a replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub problem: String,
    pub score: i64,
    pub feedback: String,
    pub phase: SessionPhase,
    /// Outbound frames in send order
    pub sent: Vec<ClientMessage>,
}

/// Parse a newline-delimited trace, skipping blank lines and `#` comments
pub fn parse_trace(text: &str) -> Result<Vec<TraceEntry>, ClientError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| serde_json::from_str(line).map_err(ClientError::from))
        .collect()
}

/// Run `entries` through a fresh session started (and linked) at `start_ms`
pub fn replay(entries: &[TraceEntry], start_ms: f64) -> ReplayReport {
    let mut session = Session::new(start_ms);
    session.link_opened();
    let mut sent = Vec::new();

    for entry in entries {
        let pointer = entry.pointer.map(Vec2::from);
        let frame = session.frame(entry.at_ms, pointer);
        if let Some(phase) = frame.phase_changed {
            log::info!("[{:>9.1}] phase -> {:?}", entry.at_ms, phase);
        }
        if let Some(slice) = frame.slice {
            sent.push(ClientMessage::Slice { value: slice.value });
        }

        if let Some(msg) = entry.message.clone() {
            if let Some(outcome) = session.apply(msg, entry.at_ms) {
                log::info!(
                    "[{:>9.1}] {:?} -> '{}' score {}",
                    entry.at_ms,
                    outcome,
                    session.problem(),
                    session.score()
                );
            }
        }
        match entry.link {
            Some(LinkChange::Closed) => session.link_lost("closed"),
            Some(LinkChange::Error) => session.link_lost("error"),
            None => {}
        }
    }

    ReplayReport {
        problem: session.problem().to_string(),
        score: session.score(),
        feedback: session.feedback().text().to_string(),
        phase: session.phase(),
        sent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::AnswerValue;

    const TRACE: &str = r#"
        # question arrives, player slices the right answer after fade-in
        {"at_ms": 0, "message": {"status": "waiting", "problem": "2 + 3", "score": 0, "fruits": [{"x": 0.25, "y": 0.5, "value": 5}, {"x": 0.75, "y": 0.5, "value": 6}]}}
        {"at_ms": 500, "pointer": [150, 200]}
        {"at_ms": 1000, "pointer": [150, 200]}
        {"at_ms": 1050, "message": {"status": "correct", "score": 10}}
        {"at_ms": 1060, "message": {"status": "waiting", "problem": "1 + 4", "score": 10, "fruits": [{"x": 0.5, "y": 0.5, "value": 5}]}}
        {"at_ms": 1600}
    "#;

    #[test]
    fn test_replay_trace() {
        let entries = parse_trace(TRACE).unwrap();
        assert_eq!(entries.len(), 6);

        let report = replay(&entries, 0.0);
        assert_eq!(report.problem, "1 + 4");
        assert_eq!(report.score, 10);
        assert_eq!(report.feedback, "");
        assert_eq!(report.phase, SessionPhase::Playing);
        assert_eq!(
            report.sent,
            vec![ClientMessage::Slice {
                value: AnswerValue::from(5)
            }]
        );
    }

    #[test]
    fn test_closed_link_stops_sends() {
        let text = r#"
            {"at_ms": 0, "message": {"status": "waiting", "problem": "2 + 3", "fruits": [{"x": 0.25, "y": 0.5, "value": 5}]}, "link": "closed"}
            {"at_ms": 2000, "pointer": [150, 200]}
        "#;
        let report = replay(&parse_trace(text).unwrap(), 0.0);
        assert!(report.sent.is_empty());
        assert_eq!(report.problem, "2 + 3");
    }

    #[test]
    fn test_bad_line_is_an_error() {
        assert!(matches!(
            parse_trace("{\"at_ms\": }"),
            Err(ClientError::Malformed(_))
        ));
    }
}

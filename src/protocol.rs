//! Wire types exchanged with the game server
//!
//! Inbound frames are single JSON objects. Every field is optional on the wire;
//! missing pieces degrade (empty target set, placeholder text) rather than fail.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Payload carried by a target: the server mixes numbers and text
/// ("5", 2.37, "object", "0.6666666666666666x^3")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Text(s) => f.write_str(s),
        }
    }
}

impl AnswerValue {
    /// On-screen text. Integral floats drop their fraction (`1.0` shows as `1`);
    /// the wire value itself is echoed back untouched.
    pub fn label(&self) -> String {
        match self {
            AnswerValue::Number(n) if n.is_f64() => match n.as_f64() {
                Some(f) if f.is_finite() => format!("{}", f),
                _ => n.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl From<i64> for AnswerValue {
    fn from(v: i64) -> Self {
        AnswerValue::Number(v.into())
    }
}

impl From<&str> for AnswerValue {
    fn from(v: &str) -> Self {
        AnswerValue::Text(v.to_string())
    }
}

/// One target as sent by the server, position normalized to [0,1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTarget {
    pub x: f32,
    pub y: f32,
    pub value: AnswerValue,
}

/// Message classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Correct,
    Wrong,
    Waiting,
    #[serde(other)]
    Unknown,
}

/// Server -> client frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    /// Present only on failure; overrides everything else
    pub error: Option<String>,
    pub status: Option<Status>,
    /// Equation text
    pub problem: Option<String>,
    /// Authoritative score
    #[serde(default, deserialize_with = "score_from_number")]
    pub score: Option<i64>,
    /// New target set
    pub fruits: Option<Vec<WireTarget>>,
    /// Server send time (informational)
    pub timestamp: Option<String>,
}

/// How the reconciler should treat an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    Error(&'a str),
    Correct,
    Wrong,
    /// New question ("waiting"); also the fall-through for unknown/missing status
    Question,
}

impl ServerMessage {
    /// Parse one inbound frame
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn classify(&self) -> Classification<'_> {
        if let Some(err) = &self.error {
            return Classification::Error(err);
        }
        match self.status {
            Some(Status::Correct) => Classification::Correct,
            Some(Status::Wrong) => Classification::Wrong,
            Some(Status::Waiting) | Some(Status::Unknown) | None => Classification::Question,
        }
    }
}

/// Accept integer or float scores; floats are rounded
fn score_from_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))))
}

/// Client -> server frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Slice { value: AnswerValue },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Question pools the server can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Elementary,
    Highschool,
    College,
    Coding,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Elementary,
        Difficulty::Highschool,
        Difficulty::College,
        Difficulty::Coding,
    ];

    /// Wire name, also used as the DOM button suffix
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Elementary => "elementary",
            Difficulty::Highschool => "highschool",
            Difficulty::College => "college",
            Difficulty::Coding => "coding",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Elementary => "Elementary",
            Difficulty::Highschool => "High School",
            Difficulty::College => "College",
            Difficulty::Coding => "Coding",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "elementary" => Some(Difficulty::Elementary),
            "highschool" | "high school" => Some(Difficulty::Highschool),
            "college" => Some(Difficulty::College),
            "coding" => Some(Difficulty::Coding),
            _ => None,
        }
    }
}

/// Bearer token response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateGameRequest {
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameResponse {
    pub game_id: String,
}

/// Pull a readable reason out of a failed HTTP response body.
/// The server reports `{"detail": "..."}`; anything else is shown raw.
pub fn failure_reason(body: &str) -> String {
    #[derive(Deserialize)]
    struct Detail {
        detail: serde_json::Value,
    }

    match serde_json::from_str::<Detail>(body) {
        Ok(Detail {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(Detail { detail }) => detail.to_string(),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question() {
        let raw = r#"{
            "problem": "3 + 4",
            "fruits": [
                {"x": 0.2, "y": 0.3, "sliced": false, "value": 7},
                {"x": 0.6, "y": 0.5, "sliced": false, "value": "object"}
            ],
            "score": 10,
            "status": "waiting",
            "timestamp": "2024-01-01T00:00:00"
        }"#;
        let msg = ServerMessage::parse(raw).unwrap();
        assert_eq!(msg.classify(), Classification::Question);
        assert_eq!(msg.problem.as_deref(), Some("3 + 4"));
        assert_eq!(msg.score, Some(10));
        let fruits = msg.fruits.unwrap();
        assert_eq!(fruits.len(), 2);
        assert_eq!(fruits[0].value, AnswerValue::from(7));
        assert_eq!(fruits[1].value, AnswerValue::from("object"));
    }

    #[test]
    fn test_error_overrides_status() {
        let msg = ServerMessage::parse(r#"{"error": "Game not found", "status": "correct"}"#).unwrap();
        assert_eq!(msg.classify(), Classification::Error("Game not found"));
    }

    #[test]
    fn test_missing_and_unknown_status_are_questions() {
        let msg = ServerMessage::parse(r#"{"problem": "1 + 1"}"#).unwrap();
        assert_eq!(msg.classify(), Classification::Question);

        let msg = ServerMessage::parse(r#"{"status": "paused"}"#).unwrap();
        assert_eq!(msg.status, Some(Status::Unknown));
        assert_eq!(msg.classify(), Classification::Question);
    }

    #[test]
    fn test_score_accepts_float_and_null() {
        let msg = ServerMessage::parse(r#"{"status": "wrong", "score": 15.0}"#).unwrap();
        assert_eq!(msg.score, Some(15));
        let msg = ServerMessage::parse(r#"{"status": "wrong", "score": null}"#).unwrap();
        assert_eq!(msg.score, None);
        let msg = ServerMessage::parse(r#"{"status": "wrong"}"#).unwrap();
        assert_eq!(msg.score, None);
    }

    #[test]
    fn test_slice_wire_format() {
        let msg = ClientMessage::Slice {
            value: AnswerValue::from(5),
        };
        assert_eq!(msg.to_json().unwrap(), r#"{"type":"slice","value":5}"#);

        // Float payloads echo back exactly as received
        let fruit: WireTarget =
            serde_json::from_str(r#"{"x": 0.5, "y": 0.5, "value": -1.24}"#).unwrap();
        let msg = ClientMessage::Slice { value: fruit.value };
        assert_eq!(msg.to_json().unwrap(), r#"{"type":"slice","value":-1.24}"#);
    }

    #[test]
    fn test_answer_display() {
        assert_eq!(AnswerValue::from(12).to_string(), "12");
        assert_eq!(AnswerValue::from("true").to_string(), "true");
    }

    #[test]
    fn test_answer_label_trims_integral_floats() {
        let fruit: WireTarget =
            serde_json::from_str(r#"{"x": 0.5, "y": 0.5, "value": 1.0}"#).unwrap();
        assert_eq!(fruit.value.label(), "1");
        // Echo keeps the server's spelling
        let msg = ClientMessage::Slice { value: fruit.value };
        assert_eq!(msg.to_json().unwrap(), r#"{"type":"slice","value":1.0}"#);

        let fruit: WireTarget =
            serde_json::from_str(r#"{"x": 0.5, "y": 0.5, "value": 2.5}"#).unwrap();
        assert_eq!(fruit.value.label(), "2.5");
        assert_eq!(AnswerValue::from(-7).label(), "-7");
        assert_eq!(AnswerValue::from("x^2").label(), "x^2");
    }

    #[test]
    fn test_difficulty_round_trip_names() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        let body = serde_json::to_string(&CreateGameRequest {
            difficulty: Difficulty::Highschool,
        })
        .unwrap();
        assert_eq!(body, r#"{"difficulty":"highschool"}"#);
    }

    #[test]
    fn test_failure_reason() {
        assert_eq!(
            failure_reason(r#"{"detail":"Incorrect username or password"}"#),
            "Incorrect username or password"
        );
        assert_eq!(failure_reason("Internal Server Error"), "Internal Server Error");
    }
}

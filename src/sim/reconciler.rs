//! Inbound message reconciler
//!
//! Applies server messages in arrival order while guaranteeing a new question
//! never appears behind the "Correct" overlay:
//!
//! - `Idle`: questions apply immediately.
//! - `ShowingFeedback`: questions go to a single pending slot (newest wins)
//!   and are applied when the scheduled feedback clear fires.
//!
//! The clear is an explicit one-shot task with a due time. It is polled from
//! the frame loop and before every inbound message, and fires exactly once
//! per `correct` message.

use std::collections::VecDeque;

use super::target::TargetSet;
use crate::consts::{FEEDBACK_MS, PROBLEM_PLACEHOLDER};
use crate::protocol::{Classification, ServerMessage};

/// Reconciler mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerState {
    Idle,
    ShowingFeedback,
}

/// Feedback shown for the most recent slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feedback {
    #[default]
    None,
    Correct,
    Wrong,
}

impl Feedback {
    pub fn text(&self) -> &'static str {
        match self {
            Feedback::None => "",
            Feedback::Correct => "Correct Answer!",
            Feedback::Wrong => "Wrong Answer",
        }
    }
}

/// Scheduled "clear feedback" task
#[derive(Debug, Clone, Copy, PartialEq)]
struct FeedbackClear {
    due: f64,
}

/// What happened to an inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// New question installed
    Question,
    /// Question parked in the pending slot; `replaced` if it overwrote one
    Buffered { replaced: bool },
    Correct,
    Wrong,
    /// Server-side error to surface; nothing changed
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Reconciler {
    state: ReconcilerState,
    feedback: Feedback,
    pending: Option<ServerMessage>,
    clears: VecDeque<FeedbackClear>,
    problem: String,
    score: i64,
    feedback_ms: f64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(FEEDBACK_MS)
    }
}

impl Reconciler {
    pub fn new(feedback_ms: f64) -> Self {
        Self {
            state: ReconcilerState::Idle,
            feedback: Feedback::None,
            pending: None,
            clears: VecDeque::new(),
            problem: String::new(),
            score: 0,
            feedback_ms,
        }
    }

    pub fn state(&self) -> ReconcilerState {
        self.state
    }

    pub fn is_showing_feedback(&self) -> bool {
        self.state == ReconcilerState::ShowingFeedback
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    /// Equation text currently displayed
    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn pending(&self) -> Option<&ServerMessage> {
        self.pending.as_ref()
    }

    /// Due time of the next scheduled feedback clear
    pub fn next_clear_due(&self) -> Option<f64> {
        self.clears.front().map(|c| c.due)
    }

    /// Apply one inbound message
    pub fn handle(&mut self, msg: ServerMessage, targets: &mut TargetSet, now: f64) -> Outcome {
        // A clear that is already due happened "before" this message
        self.poll(targets, now);

        match msg.classify() {
            Classification::Error(err) => {
                log::warn!("Server error: {}", err);
                Outcome::Error(err.to_string())
            }
            Classification::Correct => {
                self.apply_score(&msg);
                self.state = ReconcilerState::ShowingFeedback;
                self.feedback = Feedback::Correct;
                self.clears.push_back(FeedbackClear {
                    due: now + self.feedback_ms,
                });
                log::info!("Correct answer, score {}", self.score);
                Outcome::Correct
            }
            Classification::Wrong => {
                self.apply_score(&msg);
                self.feedback = Feedback::Wrong;
                log::info!("Wrong answer, score {}", self.score);
                Outcome::Wrong
            }
            Classification::Question => match self.state {
                ReconcilerState::Idle => {
                    self.apply_question(msg, targets, now);
                    Outcome::Question
                }
                ReconcilerState::ShowingFeedback => {
                    let replaced = self.pending.replace(msg).is_some();
                    if replaced {
                        log::debug!("Pending question superseded by a newer one");
                    }
                    Outcome::Buffered { replaced }
                }
            },
        }
    }

    /// Run every scheduled clear due at or before `now`.
    /// Returns true if at least one fired.
    pub fn poll(&mut self, targets: &mut TargetSet, now: f64) -> bool {
        let mut fired = false;
        while let Some(clear) = self.clears.front().copied() {
            if now < clear.due {
                break;
            }
            self.clears.pop_front();
            self.complete_feedback(targets, now);
            fired = true;
        }
        fired
    }

    fn complete_feedback(&mut self, targets: &mut TargetSet, now: f64) {
        targets.clear();
        self.feedback = Feedback::None;
        self.state = ReconcilerState::Idle;
        if let Some(next) = self.pending.take() {
            log::debug!("Applying question buffered during feedback");
            self.apply_question(next, targets, now);
        }
    }

    fn apply_question(&mut self, msg: ServerMessage, targets: &mut TargetSet, now: f64) {
        self.apply_score(&msg);
        self.feedback = Feedback::None;
        self.problem = msg
            .problem
            .unwrap_or_else(|| PROBLEM_PLACEHOLDER.to_string());
        targets.replace(msg.fruits.as_deref().unwrap_or_default(), now);
        log::info!("New question: {} ({} targets)", self.problem, targets.len());
    }

    fn apply_score(&mut self, msg: &ServerMessage) {
        if let Some(score) = msg.score {
            self.score = score;
        }
    }
}

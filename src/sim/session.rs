//! Session context and per-frame loop
//!
//! `Session` owns every piece of client game state. The platform layer feeds
//! it inbound frames and link events, calls `frame` once per display frame,
//! forwards any returned slice to the server and draws the returned scene.

use glam::Vec2;

use super::clock::{SessionClock, SessionPhase};
use super::hit::{HitDetector, SliceEvent};
use super::reconciler::{Feedback, Outcome, Reconciler};
use super::target::{Target, TargetSet};
use crate::consts::ERROR_NOTICE_MS;
use crate::error::ClientError;
use crate::protocol::ServerMessage;
use crate::truncate_label;

/// State of the message channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    /// Closed or errored; the session is frozen for network purposes
    Lost,
}

/// A transient on-screen message (protocol errors)
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub expires_at: f64,
}

/// A target as drawn this frame
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Center in logical canvas pixels
    pub center: Vec2,
    /// 0..1, follows fade progress
    pub alpha: f32,
    pub label: String,
}

impl From<&Target> for Sprite {
    fn from(target: &Target) -> Self {
        Self {
            center: target.canvas_pos(),
            alpha: target.fade_progress,
            label: truncate_label(&target.value.label()),
        }
    }
}

/// What to draw this frame
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Break { remaining_secs: u32 },
    Play { sprites: Vec<Sprite> },
}

/// Result of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub scene: Scene,
    /// Slice to send to the server
    pub slice: Option<SliceEvent>,
    /// Set when the clock changed phase on this frame
    pub phase_changed: Option<SessionPhase>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub targets: TargetSet,
    pub hits: HitDetector,
    pub clock: SessionClock,
    pub reconciler: Reconciler,
    notice: Option<Notice>,
    link: LinkState,
}

impl Session {
    /// Start a session in `Playing` at `now`, waiting for the link to open
    pub fn new(now: f64) -> Self {
        Self::with_clock(SessionClock::new(now))
    }

    pub fn with_clock(clock: SessionClock) -> Self {
        Self {
            targets: TargetSet::new(),
            hits: HitDetector::default(),
            clock,
            reconciler: Reconciler::default(),
            notice: None,
            link: LinkState::Connecting,
        }
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    pub fn link_opened(&mut self) {
        if self.link == LinkState::Connecting {
            log::info!("Game link open");
            self.link = LinkState::Open;
        }
    }

    /// Channel closed or errored. Local rendering continues; no more slices.
    pub fn link_lost(&mut self, reason: &str) {
        if self.link != LinkState::Lost {
            log::warn!("Game link lost: {}", reason);
            self.link = LinkState::Lost;
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.clock.current_phase()
    }

    pub fn problem(&self) -> &str {
        self.reconciler.problem()
    }

    pub fn score(&self) -> i64 {
        self.reconciler.score()
    }

    pub fn feedback(&self) -> Feedback {
        self.reconciler.feedback()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Handle one raw inbound frame.
    ///
    /// Unparseable frames are reported as `Malformed` and otherwise ignored.
    /// Frames arriving after the link is lost are dropped.
    pub fn receive(&mut self, raw: &str, now: f64) -> Result<Option<Outcome>, ClientError> {
        let msg = ServerMessage::parse(raw)?;
        Ok(self.apply(msg, now))
    }

    /// Handle one parsed inbound message
    pub fn apply(&mut self, msg: ServerMessage, now: f64) -> Option<Outcome> {
        if self.link == LinkState::Lost {
            log::debug!("Ignoring message on lost link");
            return None;
        }
        if let Some(ts) = &msg.timestamp {
            log::debug!("Server message stamped {}", ts);
        }

        let outcome = self.reconciler.handle(msg, &mut self.targets, now);
        if let Outcome::Error(text) = &outcome {
            self.notice = Some(Notice {
                text: text.clone(),
                expires_at: now + ERROR_NOTICE_MS,
            });
        }
        Some(outcome)
    }

    /// Advance one display frame. `pointer` is in logical canvas pixels.
    pub fn frame(&mut self, now: f64, pointer: Option<Vec2>) -> Frame {
        self.reconciler.poll(&mut self.targets, now);
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }

        let phase_changed = self.clock.tick(now);
        if self.clock.current_phase() == SessionPhase::OnBreak {
            return Frame {
                scene: Scene::Break {
                    remaining_secs: self.clock.time_remaining(now).unwrap_or(0),
                },
                slice: None,
                phase_changed,
            };
        }

        self.targets.tick(now);
        let sprites = self.targets.visible().map(Sprite::from).collect();

        let slice = match pointer {
            Some(p) if self.accepts_slices() => self.hits.scan(&mut self.targets, p, now),
            _ => None,
        };
        if let Some(event) = &slice {
            log::info!("Slicing target with value: {}", event.value);
        }

        Frame {
            scene: Scene::Play { sprites },
            slice,
            phase_changed,
        }
    }

    fn accepts_slices(&self) -> bool {
        self.link == LinkState::Open && !self.reconciler.is_showing_feedback()
    }
}

//! Target set model
//!
//! Holds the live targets for the current question. Each target fades in
//! linearly over `FADE_IN_MS`; only fully visible, unsliced targets can be hit.

use glam::Vec2;

use crate::consts::FADE_IN_MS;
use crate::normalized_to_canvas;
use crate::protocol::{AnswerValue, WireTarget};

/// A sliceable target
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Normalized position in [0,1]x[0,1]
    pub pos: Vec2,
    pub value: AnswerValue,
    pub sliced: bool,
    /// 0 = invisible, 1 = fully faded in
    pub fade_progress: f32,
    /// Time the fade started (ms)
    pub fade_start: f64,
}

impl Target {
    pub fn new(pos: Vec2, value: AnswerValue, now: f64) -> Self {
        Self {
            pos,
            value,
            sliced: false,
            fade_progress: 0.0,
            fade_start: now,
        }
    }

    /// Center in logical canvas pixels
    pub fn canvas_pos(&self) -> Vec2 {
        normalized_to_canvas(self.pos)
    }

    /// Eligible for hit testing
    pub fn is_hittable(&self) -> bool {
        !self.sliced && self.fade_progress >= 1.0
    }

    fn update_fade(&mut self, now: f64) {
        let t = ((now - self.fade_start) / FADE_IN_MS).clamp(0.0, 1.0) as f32;
        // Never fade back out if the clock steps backwards
        self.fade_progress = self.fade_progress.max(t);
    }
}

/// The single live target set
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current set and install `wire`, all starting their fade at `now`
    pub fn replace(&mut self, wire: &[WireTarget], now: f64) {
        self.targets = wire
            .iter()
            .map(|w| Target::new(Vec2::new(w.x, w.y), w.value.clone(), now))
            .collect();
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Advance fade-in for every unsliced target
    pub fn tick(&mut self, now: f64) {
        for target in self.targets.iter_mut().filter(|t| !t.sliced) {
            target.update_fade(now);
        }
    }

    /// Mark one target as sliced.
    ///
    /// Panics if `index` is out of range.
    pub fn mark_sliced(&mut self, index: usize) {
        self.targets[index].sliced = true;
    }

    pub fn get(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    /// All targets in insertion order, sliced ones included
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    /// Targets that should be drawn
    pub fn visible(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| !t.sliced)
    }

    /// Targets the hit detector may accept
    pub fn hit_candidates(&self) -> impl Iterator<Item = (usize, &Target)> {
        self.targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_hittable())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

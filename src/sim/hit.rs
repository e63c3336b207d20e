//! Pointer hit detection with a global cooldown

use glam::Vec2;

use super::target::TargetSet;
use crate::consts::{HIT_RADIUS, SLICE_COOLDOWN_MS};
use crate::protocol::AnswerValue;

/// An accepted slice, ready to forward to the server
#[derive(Debug, Clone, PartialEq)]
pub struct SliceEvent {
    /// Index of the sliced target in its set
    pub index: usize,
    pub value: AnswerValue,
}

#[derive(Debug, Clone)]
pub struct HitDetector {
    /// Hit distance in logical canvas pixels (exclusive)
    radius: f32,
    cooldown_ms: f64,
    /// Time of the last accepted slice
    last_hit: Option<f64>,
}

impl Default for HitDetector {
    fn default() -> Self {
        Self::new(HIT_RADIUS, SLICE_COOLDOWN_MS)
    }
}

impl HitDetector {
    pub fn new(radius: f32, cooldown_ms: f64) -> Self {
        Self {
            radius,
            cooldown_ms,
            last_hit: None,
        }
    }

    /// Whether a slice at `now` would be blocked by the cooldown
    pub fn cooling_down(&self, now: f64) -> bool {
        self.last_hit
            .is_some_and(|last| now - last < self.cooldown_ms)
    }

    /// Slice the first hittable target under `pointer` (canvas pixels).
    ///
    /// Targets are checked in insertion order; the earliest match wins.
    pub fn scan(&mut self, targets: &mut TargetSet, pointer: Vec2, now: f64) -> Option<SliceEvent> {
        if self.cooling_down(now) {
            return None;
        }

        let (index, value) = targets
            .hit_candidates()
            .find(|(_, t)| t.canvas_pos().distance(pointer) < self.radius)
            .map(|(i, t)| (i, t.value.clone()))?;

        targets.mark_sliced(index);
        self.last_hit = Some(now);
        log::debug!("Sliced target {} with value {}", index, value);

        Some(SliceEvent { index, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::WireTarget;
    use proptest::prelude::*;

    fn visible_set(points: &[(f32, f32, i64)]) -> TargetSet {
        let wire: Vec<WireTarget> = points
            .iter()
            .map(|&(x, y, v)| WireTarget {
                x,
                y,
                value: AnswerValue::from(v),
            })
            .collect();
        let mut set = TargetSet::new();
        set.replace(&wire, 0.0);
        set.tick(1000.0);
        set
    }

    #[test]
    fn test_hit_inside_radius() {
        let mut set = visible_set(&[(0.5, 0.5, 7)]);
        let mut hits = HitDetector::default();

        // Target at (300, 200); 24px away is inside
        let event = hits.scan(&mut set, Vec2::new(324.0, 200.0), 2000.0).unwrap();
        assert_eq!(event.value, AnswerValue::from(7));
        assert!(set.get(0).unwrap().sliced);
    }

    #[test]
    fn test_radius_is_exclusive() {
        let mut set = visible_set(&[(0.5, 0.5, 7)]);
        let mut hits = HitDetector::default();
        assert!(hits.scan(&mut set, Vec2::new(325.0, 200.0), 2000.0).is_none());
        assert!(!set.get(0).unwrap().sliced);
    }

    #[test]
    fn test_fading_target_rejected() {
        let wire = [WireTarget {
            x: 0.5,
            y: 0.5,
            value: AnswerValue::from(1),
        }];
        let mut set = TargetSet::new();
        set.replace(&wire, 0.0);
        set.tick(900.0);

        let mut hits = HitDetector::default();
        assert!(hits.scan(&mut set, Vec2::new(300.0, 200.0), 900.0).is_none());

        set.tick(1000.0);
        assert!(hits.scan(&mut set, Vec2::new(300.0, 200.0), 1000.0).is_some());
    }

    #[test]
    fn test_cooldown_blocks_second_hit() {
        let mut set = visible_set(&[(0.2, 0.2, 1), (0.8, 0.8, 2)]);
        let mut hits = HitDetector::default();

        assert!(hits.scan(&mut set, Vec2::new(120.0, 80.0), 5000.0).is_some());
        // Different target, still inside the window
        assert!(hits.scan(&mut set, Vec2::new(480.0, 320.0), 5499.0).is_none());
        assert!(!set.get(1).unwrap().sliced);
        // Window elapsed
        let event = hits.scan(&mut set, Vec2::new(480.0, 320.0), 5500.0).unwrap();
        assert_eq!(event.index, 1);
    }

    #[test]
    fn test_earliest_inserted_wins() {
        // Two overlapping targets, pointer between them
        let mut set = visible_set(&[(0.50, 0.5, 1), (0.52, 0.5, 2)]);
        let mut hits = HitDetector::default();
        let event = hits.scan(&mut set, Vec2::new(306.0, 200.0), 2000.0).unwrap();
        assert_eq!(event.index, 0);
        assert_eq!(event.value, AnswerValue::from(1));
    }

    #[test]
    fn test_sliced_target_not_hit_again() {
        let mut set = visible_set(&[(0.5, 0.5, 1)]);
        let mut hits = HitDetector::default();
        assert!(hits.scan(&mut set, Vec2::new(300.0, 200.0), 2000.0).is_some());
        assert!(hits.scan(&mut set, Vec2::new(300.0, 200.0), 9000.0).is_none());
    }

    proptest! {
        #[test]
        fn prop_cooldown_window(gap in 0.0f64..1000.0) {
            let mut set = visible_set(&[(0.25, 0.5, 1), (0.75, 0.5, 2)]);
            let mut hits = HitDetector::default();
            prop_assert!(hits.scan(&mut set, Vec2::new(150.0, 200.0), 10_000.0).is_some());
            let second = hits.scan(&mut set, Vec2::new(450.0, 200.0), 10_000.0 + gap);
            prop_assert_eq!(second.is_some(), gap >= SLICE_COOLDOWN_MS);
        }
    }
}

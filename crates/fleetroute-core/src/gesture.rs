//! Lasso gesture state machine.
//!
//! Turns a press / move / release pointer sequence into a candidate circle.
//! The machine has no notion of draw mode; the session decides whether a
//! press may reach it at all.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Drawing -> (Committed | Discarded) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut gesture = GestureMachine::new(50.0);
//! gesture.press(center);
//! gesture.move_to(pointer);
//! if let Some(circle) = gesture.release() {
//!     // hand circle to the cluster manager
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::geo::{self, Coordinate};

/// Circles smaller than this are treated as accidental clicks.
pub const DEFAULT_MIN_RADIUS_M: f64 = 50.0;

/// A circle on the map, radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl Circle {
    pub fn contains(&self, point: Coordinate) -> bool {
        geo::within_circle(point, self.center, self.radius_m)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum GesturePhase {
    Idle,
    /// Pointer is down; `radius_m` tracks the live preview.
    Drawing {
        start: Coordinate,
        current: Coordinate,
        radius_m: f64,
    },
    Committed {
        circle: Circle,
    },
    /// Released below the minimum radius, or cancelled.
    Discarded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureMachine {
    phase: GesturePhase,
    min_radius_m: f64,
}

impl GestureMachine {
    pub fn new(min_radius_m: f64) -> Self {
        Self {
            phase: GesturePhase::Idle,
            min_radius_m,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn min_radius_m(&self) -> f64 {
        self.min_radius_m
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.phase, GesturePhase::Drawing { .. })
    }

    /// Live preview circle while drawing.
    pub fn preview(&self) -> Option<Circle> {
        match self.phase {
            GesturePhase::Drawing { start, radius_m, .. } => Some(Circle {
                center: start,
                radius_m,
            }),
            _ => None,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start drawing at `start`. Returns false if a gesture is already active.
    pub fn press(&mut self, start: Coordinate) -> bool {
        if self.is_drawing() {
            return false;
        }
        self.phase = GesturePhase::Drawing {
            start,
            current: start,
            radius_m: 0.0,
        };
        true
    }

    /// Track the pointer. Returns the updated preview, `None` when idle.
    pub fn move_to(&mut self, pointer: Coordinate) -> Option<Circle> {
        if let GesturePhase::Drawing {
            start,
            current,
            radius_m,
        } = &mut self.phase
        {
            *current = pointer;
            *radius_m = geo::distance(*start, pointer);
        }
        self.preview()
    }

    /// Finish the gesture. Emits the circle only if it meets the minimum radius.
    pub fn release(&mut self) -> Option<Circle> {
        let GesturePhase::Drawing {
            start, radius_m, ..
        } = self.phase
        else {
            return None;
        };

        if radius_m >= self.min_radius_m {
            let circle = Circle {
                center: start,
                radius_m,
            };
            self.phase = GesturePhase::Committed { circle };
            Some(circle)
        } else {
            self.phase = GesturePhase::Discarded;
            None
        }
    }

    /// Abort an in-progress gesture. Returns true if one was active.
    pub fn cancel(&mut self) -> bool {
        if self.is_drawing() {
            self.phase = GesturePhase::Discarded;
            true
        } else {
            false
        }
    }

    /// Applies to the next release.
    pub fn set_min_radius_m(&mut self, min_radius_m: f64) {
        self.min_radius_m = min_radius_m;
    }

    /// Back to idle from any phase.
    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
    }
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_RADIUS_M)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Coordinate {
        Coordinate::new(-33.9249, 18.4241)
    }

    #[test]
    fn press_starts_zero_radius_preview() {
        let mut g = GestureMachine::default();
        assert!(g.press(origin()));
        let preview = g.preview().unwrap();
        assert_eq!(preview.center, origin());
        assert_eq!(preview.radius_m, 0.0);
    }

    #[test]
    fn move_recomputes_radius_from_start() {
        let mut g = GestureMachine::default();
        g.press(origin());
        g.move_to(origin().destination(0.0, 500.0));
        let c = g.move_to(origin().destination(90.0, 120.0)).unwrap();
        assert!((c.radius_m - 120.0).abs() < 1e-6);
        assert_eq!(c.center, origin());
    }

    #[test]
    fn release_above_threshold_commits() {
        let mut g = GestureMachine::default();
        g.press(origin());
        g.move_to(origin().destination(45.0, 200.0));
        let circle = g.release().unwrap();
        assert!((circle.radius_m - 200.0).abs() < 1e-6);
        assert!(matches!(g.phase(), GesturePhase::Committed { .. }));
    }

    #[test]
    fn release_below_threshold_discards() {
        let mut g = GestureMachine::default();
        g.press(origin());
        g.move_to(origin().destination(0.0, 49.0));
        assert!(g.release().is_none());
        assert_eq!(g.phase(), GesturePhase::Discarded);
    }

    #[test]
    fn single_click_is_discarded() {
        let mut g = GestureMachine::default();
        g.press(origin());
        assert!(g.release().is_none());
        assert_eq!(g.phase(), GesturePhase::Discarded);
    }

    #[test]
    fn threshold_is_inclusive() {
        let edge = origin().destination(0.0, 100.0);
        let r = crate::geo::distance(origin(), edge);
        let mut g = GestureMachine::new(r);
        g.press(origin());
        g.move_to(edge);
        assert!(g.release().is_some());
    }

    #[test]
    fn cancel_discards_without_emission() {
        let mut g = GestureMachine::default();
        g.press(origin());
        g.move_to(origin().destination(0.0, 1000.0));
        assert!(g.cancel());
        assert_eq!(g.phase(), GesturePhase::Discarded);
        assert!(g.release().is_none());
        assert!(!g.cancel());
    }

    #[test]
    fn press_while_drawing_is_refused() {
        let mut g = GestureMachine::default();
        g.press(origin());
        assert!(!g.press(origin().destination(0.0, 10.0)));
        assert_eq!(g.preview().unwrap().center, origin());
    }

    #[test]
    fn moves_outside_drawing_are_ignored() {
        let mut g = GestureMachine::default();
        assert!(g.move_to(origin()).is_none());
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn terminal_phase_allows_new_press() {
        let mut g = GestureMachine::default();
        g.press(origin());
        g.release();
        assert!(g.press(origin()));
        assert!(g.is_drawing());
        g.reset();
        assert_eq!(g.phase(), GesturePhase::Idle);
    }
}

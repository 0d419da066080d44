//! Continuous hand motion: where the hand is and how it is rolled.

use crate::landmarks::{LandmarkSet, MIDDLE_MCP, WRIST};

/// Latest hand position (0..1 on both axes) and roll in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub x:    f32,
    pub y:    f32,
    pub tilt: f32,
}

impl PointerSample {
    /// Frame centre, no tilt.  Reported whenever no hand is visible.
    pub const NEUTRAL: PointerSample = PointerSample { x: 0.5, y: 0.5, tilt: 0.0 };
}

impl Default for PointerSample {
    fn default() -> Self { PointerSample::NEUTRAL }
}

/// Summarise a hand into a pointer sample.
///
/// Position is the midpoint of the wrist and the middle-finger base; tilt is
/// `atan2(Δy, Δx)` of the wrist → middle-base vector.  No hand recentres to
/// [`PointerSample::NEUTRAL`].
pub fn summarize(hand: Option<&LandmarkSet>) -> PointerSample {
    let Some(hand) = hand else { return PointerSample::NEUTRAL };

    let wrist  = hand[WRIST];
    let middle = hand[MIDDLE_MCP];
    PointerSample {
        x:    (wrist.x + middle.x) / 2.0,
        y:    (wrist.y + middle.y) / 2.0,
        tilt: (middle.y - wrist.y).atan2(middle.x - wrist.x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, LANDMARK_COUNT};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn no_hand_is_exactly_neutral() {
        assert_eq!(summarize(None), PointerSample { x: 0.5, y: 0.5, tilt: 0.0 });
    }

    #[test]
    fn midpoint_and_tilt() {
        let mut pts = [Landmark::default(); LANDMARK_COUNT];
        pts[WRIST]      = Landmark::planar(0.2, 0.6);
        pts[MIDDLE_MCP] = Landmark::planar(0.4, 0.6);
        let s = summarize(Some(&LandmarkSet::new(pts)));
        assert!((s.x - 0.3).abs() < 1e-6);
        assert!((s.y - 0.6).abs() < 1e-6);
        assert!(s.tilt.abs() < 1e-6);
    }

    #[test]
    fn upright_hand_points_up_the_frame() {
        // y grows downward, so a hand pointing at the top edge reads as -π/2.
        let mut pts = [Landmark::default(); LANDMARK_COUNT];
        pts[WRIST]      = Landmark::planar(0.5, 0.7);
        pts[MIDDLE_MCP] = Landmark::planar(0.5, 0.5);
        let s = summarize(Some(&LandmarkSet::new(pts)));
        assert!((s.tilt + FRAC_PI_2).abs() < 1e-6);
    }
}

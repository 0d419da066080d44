//! Stateless gesture classification from a single landmark sample.

use crate::landmarks::{LandmarkSet, FINGERTIPS, INDEX_TIP, THUMB_TIP, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// Discrete hand gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// No hand, or a hand that matches nothing below.
    #[default]
    None,
    /// All four fingers extended.
    OpenPalm,
    /// All four fingers curled toward the wrist.
    ClosedFist,
    /// Thumb tip touching index tip.
    Pinch,
    /// Index extended, others curled.  Part of the vocabulary but not
    /// produced by the distance heuristic.
    Pointing,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::None       => "none",
            Gesture::OpenPalm   => "open-palm",
            Gesture::ClosedFist => "closed-fist",
            Gesture::Pinch      => "pinch",
            Gesture::Pointing   => "pointing",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

/// Distance thresholds in normalized frame units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureThresholds {
    /// Thumb tip to index tip below this → pinch.
    pub pinch: f32,
    /// Every fingertip to wrist below this → fist.
    pub fist:  f32,
    /// Every fingertip to wrist above this → open palm.
    pub open:  f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        GestureThresholds { pinch: 0.05, fist: 0.25, open: 0.30 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify with the default thresholds.
pub fn classify(hand: Option<&LandmarkSet>) -> Gesture {
    classify_with(hand, &GestureThresholds::default())
}

/// Classify one sample.  First match wins:
///
/// 1. no hand → `None`
/// 2. thumb–index distance < `pinch` → `Pinch` (a pinch can look curled)
/// 3. all four fingertips within `fist` of the wrist → `ClosedFist`
/// 4. all four fingertips beyond `open` from the wrist → `OpenPalm`
/// 5. otherwise `None`
pub fn classify_with(hand: Option<&LandmarkSet>, t: &GestureThresholds) -> Gesture {
    let Some(hand) = hand else { return Gesture::None };

    if hand.distance(THUMB_TIP, INDEX_TIP) < t.pinch {
        return Gesture::Pinch;
    }

    let reach = FINGERTIPS.map(|tip| hand.distance(tip, WRIST));

    if reach.iter().all(|&d| d < t.fist) {
        Gesture::ClosedFist
    } else if reach.iter().all(|&d| d > t.open) {
        Gesture::OpenPalm
    } else {
        Gesture::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Landmark, LANDMARK_COUNT};
    use crate::pose::{HandPose, HandShape};

    fn pose(shape: HandShape) -> LandmarkSet {
        HandPose::upright(shape, 0.5, 0.5).landmarks()
    }

    #[test]
    fn absent_hand_is_none() {
        assert_eq!(classify(None), Gesture::None);
    }

    #[test]
    fn canonical_shapes() {
        assert_eq!(classify(Some(&pose(HandShape::OpenPalm))), Gesture::OpenPalm);
        assert_eq!(classify(Some(&pose(HandShape::Fist))),     Gesture::ClosedFist);
        assert_eq!(classify(Some(&pose(HandShape::Pinch))),    Gesture::Pinch);
        assert_eq!(classify(Some(&pose(HandShape::Relaxed))),  Gesture::None);
        assert_eq!(classify(Some(&pose(HandShape::Pointing))), Gesture::None);
    }

    #[test]
    fn pinch_wins_regardless_of_other_fingers() {
        // Every point collapsed onto the wrist would be a fist, and every
        // finger far away would be an open palm; thumb/index contact must
        // still read as a pinch in both cases.
        let mut curled = [Landmark::planar(0.5, 0.5); LANDMARK_COUNT];
        curled[THUMB_TIP] = Landmark::planar(0.52, 0.5);
        curled[INDEX_TIP] = Landmark::planar(0.55, 0.5);
        assert_eq!(classify(Some(&LandmarkSet::new(curled))), Gesture::Pinch);

        let mut open = [Landmark::planar(0.5, 0.9); LANDMARK_COUNT];
        for (k, &tip) in FINGERTIPS.iter().enumerate() {
            open[tip] = Landmark::planar(0.3 + 0.1 * k as f32, 0.1);
        }
        open[WRIST] = Landmark::planar(0.5, 0.9);
        open[THUMB_TIP] = Landmark::planar(open[INDEX_TIP].x + 0.01, 0.11);
        assert_eq!(classify(Some(&LandmarkSet::new(open))), Gesture::Pinch);
    }

    #[test]
    fn one_extended_finger_is_neither_fist_nor_palm() {
        let mut pts = [Landmark::planar(0.5, 0.5); LANDMARK_COUNT];
        pts[THUMB_TIP] = Landmark::planar(0.2, 0.5);
        pts[INDEX_TIP] = Landmark::planar(0.5, 0.1);
        assert_eq!(classify(Some(&LandmarkSet::new(pts))), Gesture::None);
    }

    #[test]
    fn thresholds_are_strict() {
        // Fingertips 0.3 from the wrist: extended only if the threshold is below 0.3.
        let mut pts = [Landmark::planar(0.5, 0.8); LANDMARK_COUNT];
        for &tip in &FINGERTIPS {
            pts[tip] = Landmark::planar(0.5, 0.5);
        }
        pts[THUMB_TIP] = Landmark::planar(0.1, 0.8);
        let t = GestureThresholds { open: 0.3 + 1e-4, ..GestureThresholds::default() };
        assert_eq!(classify_with(Some(&LandmarkSet::new(pts.clone())), &t), Gesture::None);
        let t = GestureThresholds { open: 0.29, ..GestureThresholds::default() };
        assert_eq!(classify_with(Some(&LandmarkSet::new(pts)), &t), Gesture::OpenPalm);
    }

    #[test]
    fn far_hand_loses_open_palm() {
        // Thresholds are absolute, so a small (distant) open hand no longer
        // clears the open-palm distance.
        let mut far = HandPose::upright(HandShape::OpenPalm, 0.5, 0.5);
        far.scale = 0.6;
        assert_ne!(classify(Some(&far.landmarks())), Gesture::OpenPalm);
    }
}

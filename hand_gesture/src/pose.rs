//! Synthetic hand poses.
//!
//! Produces plausible 21-point landmark sets for a handful of hand shapes at
//! a chosen position, roll and size.  The keyboard simulator uses these in
//! place of a camera, and the tests use them as fixtures.

use std::f32::consts::FRAC_PI_2;

use crate::landmarks::*;

/// Hand shapes the synthesiser knows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandShape {
    /// Fingers half bent — matches no gesture.
    Relaxed,
    OpenPalm,
    Fist,
    /// Open hand with thumb and index tips touching.
    Pinch,
    /// Index out, the rest curled.
    Pointing,
}

/// A hand to synthesise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    pub shape:     HandShape,
    /// Midpoint of wrist and middle-finger base, normalized frame coords.
    pub center:    (f32, f32),
    /// Angle of the wrist → middle-base vector, as reported by `summarize`.
    pub direction: f32,
    /// 1.0 = a hand at typical webcam distance.
    pub scale:     f32,
}

// Offsets are (side, along) from the wrist in hand units: `along` runs from
// the wrist toward the fingers, `side` from the index toward the pinky.
const THUMB:       [(f32, f32); 4] = [(-0.05, 0.04), (-0.09, 0.08), (-0.12, 0.11), (-0.14, 0.14)];
const FINGER_BASE: [(f32, f32); 4] = [(-0.05, 0.16), (0.0, 0.17), (0.045, 0.16), (0.085, 0.14)];

/// Middle-finger base distance along the hand; the pose centre sits halfway.
const MIDDLE_ALONG: f32 = 0.17;

impl HandPose {
    /// Fingers pointing at the top of the frame.
    pub fn upright(shape: HandShape, x: f32, y: f32) -> Self {
        HandPose { shape, center: (x, y), direction: -FRAC_PI_2, scale: 1.0 }
    }

    pub fn landmarks(&self) -> LandmarkSet {
        let mut local = [(0.0f32, 0.0f32); LANDMARK_COUNT];

        local[THUMB_CMC..=THUMB_TIP].copy_from_slice(&THUMB);

        let bases = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
        for (finger, &mcp) in bases.iter().enumerate() {
            let (side, along) = FINGER_BASE[finger];
            let extended = match self.shape {
                HandShape::OpenPalm | HandShape::Pinch => true,
                HandShape::Pointing => finger == 0,
                HandShape::Fist | HandShape::Relaxed => false,
            };
            let joints = if extended {
                [along + 0.08, along + 0.13, along + 0.17]
            } else if self.shape == HandShape::Relaxed {
                [along + 0.05, along + 0.08, 0.27]
            } else {
                // Curled back toward the palm.
                [0.19, 0.14, 0.10]
            };
            local[mcp] = (side, along);
            for (k, &a) in joints.iter().enumerate() {
                local[mcp + 1 + k] = (side, a);
            }
        }

        match self.shape {
            HandShape::Pinch => {
                local[INDEX_DIP] = (-0.09, 0.23);
                local[INDEX_TIP] = (-0.10, 0.20);
                local[THUMB_TIP] = (-0.11, 0.19);
            }
            HandShape::Fist | HandShape::Pointing => {
                local[THUMB_TIP] = (0.03, 0.06);
            }
            _ => {}
        }

        let (dx, dy) = (self.direction.cos(), self.direction.sin());
        let (sx, sy) = (-dy, dx);
        let s = self.scale;
        let wx = self.center.0 - dx * MIDDLE_ALONG / 2.0 * s;
        let wy = self.center.1 - dy * MIDDLE_ALONG / 2.0 * s;

        let points = local.map(|(side, along)| {
            Landmark::planar(
                wx + (sx * side + dx * along) * s,
                wy + (sy * side + dy * along) * s,
            )
        });
        LandmarkSet::new(points)
    }
}

//! Landmark points and the fixed 21-point hand layout.

use std::ops::Index;

use crate::error::{LandmarkError, Result};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// The four non-thumb fingertips.
pub const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point in normalized frame coordinates.  `z` is relative depth
/// and is 0.0 when the provider only reports 2D points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    pub const fn planar(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }

    /// Euclidean distance in the image plane (depth ignored).
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSet
// ════════════════════════════════════════════════════════════════════════════

/// The 21 landmarks of one detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        LandmarkSet { points }
    }

    /// Build from provider output, rejecting wrong-sized or non-finite input.
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let arr: [Landmark; LANDMARK_COUNT] = points.try_into()
            .map_err(|_| LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                got:      points.len(),
            })?;
        if let Some(index) = arr.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(LandmarkSet { points: arr })
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }

    pub fn wrist(&self) -> Landmark { self.points[WRIST] }

    /// Planar distance between two landmarks by index.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        self.points[a].planar_distance(&self.points[b])
    }
}

impl Index<usize> for LandmarkSet {
    type Output = Landmark;
    fn index(&self, i: usize) -> &Landmark { &self.points[i] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_checks_count() {
        let pts = vec![Landmark::default(); 20];
        assert_eq!(
            LandmarkSet::from_slice(&pts),
            Err(LandmarkError::WrongCount { expected: 21, got: 20 })
        );
        let pts = vec![Landmark::default(); 21];
        assert!(LandmarkSet::from_slice(&pts).is_ok());
    }

    #[test]
    fn from_slice_rejects_nan() {
        let mut pts = vec![Landmark::planar(0.5, 0.5); 21];
        pts[7].y = f32::NAN;
        assert_eq!(LandmarkSet::from_slice(&pts), Err(LandmarkError::NonFinite { index: 7 }));
    }

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Landmark::new(0.0, 0.0, 0.0);
        let b = Landmark::new(0.3, 0.4, 5.0);
        assert!((a.planar_distance(&b) - 0.5).abs() < 1e-6);
    }
}

//! # hand_gesture
//!
//! Turns one hand's 21 normalized landmarks into the two inputs the scene
//! reacts to:
//!
//! | Output | Source | Kind |
//! |---|---|---|
//! | [`Gesture`] | [`classify`] | discrete, per sample |
//! | [`PointerSample`] | [`summarize`] | continuous position + tilt |
//!
//! Classification is stateless.  Anti-flicker lives in [`GestureFilter`],
//! which only reports a gesture after it has been seen for a configurable
//! number of consecutive samples (one sample = no debounce).
//!
//! ## Landmark convention
//!
//! ```text
//!         8   12  16  20      fingertips
//!         |   |   |   |
//!   4     5   9   13  17      finger bases (9 = middle base)
//!    \     \  |   /   /
//!     1 ----- 0 -----         0 = wrist, 1..4 = thumb
//! ```
//!
//! Coordinates are normalized to the camera frame (0..1 on each axis, y
//! growing downward).  Thresholds are in the same units, so results depend
//! on how far the hand is from the camera.

pub mod error;
pub mod landmarks;
pub mod classify;
pub mod motion;
pub mod filter;
pub mod pose;

pub use error::{LandmarkError, Result};
pub use landmarks::{Landmark, LandmarkSet, LANDMARK_COUNT};
pub use classify::{classify, classify_with, Gesture, GestureThresholds};
pub use motion::{summarize, PointerSample};
pub use filter::GestureFilter;
pub use pose::{HandPose, HandShape};

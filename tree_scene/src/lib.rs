//! # tree_scene
//!
//! A particle tree that reacts to hand gestures: a closed fist gathers the
//! particles into a spiral tree, an open palm scatters them into a cloud,
//! and a pinch while scattered pulls one particle (usually a photo) up to
//! the camera.
//!
//! ## Gesture → Mode mapping
//!
//! | Gesture | From | To | Effect |
//! |---|---|---|---|
//! | Closed fist | Scatter, Zoom | Tree | clear the focus |
//! | Open palm | Tree, Zoom | Scatter | clear the focus |
//! | Pinch | Scatter | Zoom | pick a focus particle |
//!
//! In Tree mode the group turns slowly on its own; in Scatter and Zoom the
//! hand position steers it.
//!
//! ## Threads
//!
//! * **Sampler** — pulls frames, detects landmarks, classifies and debounces
//!   the gesture, and publishes the latest [`sampler::HandReading`].
//! * **Frame loop** — applies new readings to the [`mode::SceneContext`],
//!   steps the [`driver::AnimationDriver`] and presents the payload.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: keyboard + mouse stand in for a camera.
//! * `leap` — **Hardware mode**: hand landmarks from a LeapMotion controller.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | mouse over window | hand in view, at the cursor |
//! | hold `F` | closed fist |
//! | hold `O` | open palm |
//! | hold `P` | pinch |
//! | `[` / `]` | roll the hand |
//! | `U` | append a demo photo (rebuilds the field) |
//! | `Q` / `Esc` | quit |

pub mod error;
pub mod smoothing;
pub mod mode;
pub mod driver;
pub mod sampler;
pub mod sim;
pub mod sink;
pub mod library;
pub mod visualizer;
pub mod app;

#[cfg(feature = "leap")]
pub mod leap;

pub use error::{Result, SceneError};

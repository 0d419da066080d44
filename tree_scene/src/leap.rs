//! Hand landmarks from a LeapMotion controller (feature = "leap").
//!
//! Requires the LeapC shared library installed.  Leap reports joints in
//! millimetres above the device; they are mapped onto a virtual 400 mm
//! square "frame" so distances line up with the webcam thresholds.

use std::thread;
use std::time::{Duration, Instant};

use leaprs::{Connection, ConnectionConfig, Event};
use tracing::debug;

use hand_gesture::{Landmark, LandmarkSet};

use crate::error::{Result, SceneError};
use crate::sampler::{FrameSource, LandmarkProvider, VideoFrame};

/// Side of the virtual frame, mm.
const FRAME_MM:    f32 = 400.0;
/// Height above the device that maps to the bottom of the frame, mm.
const FLOOR_MM:    f32 = 50.0;
/// Per-tick poll timeout, ms.
const POLL_MS:     u32 = 5;

// ════════════════════════════════════════════════════════════════════════════
// PollClock
// ════════════════════════════════════════════════════════════════════════════

/// Fixed-rate ticks; Leap has no video frames, so the sampler polls on these.
pub struct PollClock {
    started:  Instant,
    period:   Duration,
    next_due: Instant,
}

impl PollClock {
    pub fn new(hz: u32) -> Self {
        let now = Instant::now();
        PollClock { started: now, period: Duration::from_secs(1) / hz.max(1), next_due: now }
    }
}

impl FrameSource for PollClock {
    type Frame = ();

    fn next_frame(&mut self) -> Option<VideoFrame<()>> {
        let now = Instant::now();
        if self.next_due > now {
            thread::sleep(self.next_due - now);
        }
        self.next_due = Instant::now().max(self.next_due) + self.period;
        Some(VideoFrame { timestamp: self.started.elapsed().as_secs_f64(), frame: () })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapProvider
// ════════════════════════════════════════════════════════════════════════════

pub struct LeapProvider {
    connection: Connection,
    last:       Option<LandmarkSet>,
}

impl LeapProvider {
    pub fn connect() -> Result<Self> {
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| SceneError::ProviderInit(format!("LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| SceneError::ProviderInit(format!("LeapMotion device: {:?}", e)))?;
        Ok(LeapProvider { connection, last: None })
    }
}

impl LandmarkProvider<()> for LeapProvider {
    /// Reports the first tracked hand of the newest tracking event; between
    /// events the previous answer stands.
    fn detect(&mut self, _frame: &(), _timestamp: f64) -> Result<Option<LandmarkSet>> {
        let msg = match self.connection.poll(POLL_MS) {
            Ok(m)  => m,
            Err(_) => return Ok(self.last.clone()),   // timeout: nothing new
        };

        if let Event::Tracking(frame) = msg.event() {
            self.last = match frame.hands().next() {
                Some(hand) => Some(hand_landmarks(&hand)?),
                None       => None,
            };
            debug!(hand = self.last.is_some(), "leap tracking event");
        }
        Ok(self.last.clone())
    }
}

fn to_landmark(x: f32, y: f32, z: f32) -> Landmark {
    Landmark::new(
        (x + FRAME_MM / 2.0) / FRAME_MM,
        1.0 - (y - FLOOR_MM) / FRAME_MM,
        z / FRAME_MM,
    )
}

/// Leap bones → the 21-point layout.  The base of the middle metacarpal
/// stands in for the wrist.
fn hand_landmarks(hand: &leaprs::Hand) -> Result<LandmarkSet> {
    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 {
        return Err(SceneError::Detection(format!("hand with {} digits", digits.len())));
    }

    let mut points = Vec::with_capacity(21);
    let wrist = digits[2].metacarpal().prev_joint();
    points.push(to_landmark(wrist.x, wrist.y, wrist.z));

    for digit in &digits {
        let joints = [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ];
        points.extend(joints.iter().map(|j| to_landmark(j.x, j.y, j.z)));
    }

    Ok(LandmarkSet::from_slice(&points)?)
}

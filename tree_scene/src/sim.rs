//! Keyboard / mouse hand simulation — no camera needed.
//!
//! The preview window sends the simulated hand (or its absence) over a
//! channel every frame; [`SimCamera`] turns the latest one into frames at a
//! fixed cadence, and [`SimProvider`] "detects" landmarks by synthesising
//! them from the pose.  Everything downstream is the same as with real
//! hardware.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use hand_gesture::{HandPose, LandmarkSet};

use crate::error::Result;
use crate::sampler::{FrameSource, LandmarkProvider, VideoFrame};

/// What the simulated camera sees: a hand, or nothing.
pub type SimFrame = Option<HandPose>;

/// Simulated webcam.
pub struct SimCamera {
    rx:       Receiver<SimFrame>,
    latest:   SimFrame,
    started:  Instant,
    period:   Duration,
    next_due: Instant,
}

/// Create the sender the window uses and the camera that reads from it.
pub fn sim_camera(fps: u32) -> (Sender<SimFrame>, SimCamera) {
    let (tx, rx) = mpsc::channel();
    let now = Instant::now();
    let camera = SimCamera {
        rx,
        latest:   None,
        started:  now,
        period:   Duration::from_secs(1) / fps.max(1),
        next_due: now,
    };
    (tx, camera)
}

impl FrameSource for SimCamera {
    type Frame = SimFrame;

    /// Waits for the next frame slot, keeping the newest pose that arrives
    /// meanwhile.  Ends when the window side hangs up.
    fn next_frame(&mut self) -> Option<VideoFrame<SimFrame>> {
        loop {
            let now = Instant::now();
            if now >= self.next_due {
                break;
            }
            match self.rx.recv_timeout(self.next_due - now) {
                Ok(pose) => self.latest = pose,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
        // Drain anything already queued so the frame is current.
        loop {
            match self.rx.try_recv() {
                Ok(pose) => self.latest = pose,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return None,
            }
        }

        self.next_due += self.period;
        let now = Instant::now();
        if self.next_due < now {
            // Fell behind (slow machine, debugger); don't burst to catch up.
            self.next_due = now + self.period;
        }

        Some(VideoFrame {
            timestamp: self.started.elapsed().as_secs_f64(),
            frame:     self.latest,
        })
    }
}

/// Landmark "detector" for simulated frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimProvider;

impl LandmarkProvider<SimFrame> for SimProvider {
    fn detect(&mut self, frame: &SimFrame, _timestamp: f64) -> Result<Option<LandmarkSet>> {
        Ok(frame.map(|pose| pose.landmarks()))
    }
}

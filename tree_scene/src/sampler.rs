//! Landmark sampling — turns a stream of frames into hand readings.
//!
//! The sampler runs on its own thread (see [`spawn_sampler`]) and publishes
//! every processed frame into an [`InputSlot`].  The frame loop reads the
//! slot whenever it likes; only the latest reading is kept.
//!
//! ```text
//!   FrameSource ──frame──▶ LandmarkProvider ──landmarks──▶ classify ──▶ GestureFilter
//!                                               │                           │
//!                                               └──▶ summarize ─────────────┴──▶ InputSlot
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use hand_gesture::{
    classify_with, summarize, Gesture, GestureFilter, GestureThresholds, LandmarkSet,
    PointerSample,
};

use crate::error::Result;

// ════════════════════════════════════════════════════════════════════════════
// Frames and providers
// ════════════════════════════════════════════════════════════════════════════

/// A frame together with its capture time in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame<F> {
    pub timestamp: f64,
    pub frame:     F,
}

/// Where frames come from: a camera, a simulator, a recording.
pub trait FrameSource: Send {
    type Frame;

    /// The next frame, blocking briefly if none is ready.  `None` once the
    /// source has ended.  Implementations must return within a bounded time
    /// so the sampling thread can notice a stop request.
    fn next_frame(&mut self) -> Option<VideoFrame<Self::Frame>>;
}

/// Turns one frame into at most one hand.
pub trait LandmarkProvider<F> {
    fn detect(&mut self, frame: &F, timestamp: f64) -> Result<Option<LandmarkSet>>;
}

// ════════════════════════════════════════════════════════════════════════════
// HandReading / InputSlot
// ════════════════════════════════════════════════════════════════════════════

/// One processed sample.  `seq` increases by one per published reading; the
/// neutral reading has `seq == 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandReading {
    pub seq:          u64,
    pub timestamp:    f64,
    /// Classifier output before debouncing.
    pub raw:          Gesture,
    /// Debounced gesture; this is what drives the mode machine.
    pub gesture:      Gesture,
    pub pointer:      PointerSample,
    pub hand_visible: bool,
}

impl HandReading {
    pub const NEUTRAL: HandReading = HandReading {
        seq:          0,
        timestamp:    0.0,
        raw:          Gesture::None,
        gesture:      Gesture::None,
        pointer:      PointerSample::NEUTRAL,
        hand_visible: false,
    };
}

impl Default for HandReading {
    fn default() -> Self { HandReading::NEUTRAL }
}

/// Lifecycle of the input side, for the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputStatus {
    /// Provider still initializing.
    Starting,
    Running,
    /// Provider failed to start; readings stay neutral.
    Unavailable,
    /// Source ended or sampler stopped.
    Stopped,
}

impl InputStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputStatus::Starting    => "starting",
            InputStatus::Running     => "running",
            InputStatus::Unavailable => "unavailable",
            InputStatus::Stopped     => "stopped",
        }
    }
}

#[derive(Debug)]
struct SlotState {
    reading: HandReading,
    status:  InputStatus,
}

/// Last-value-wins handoff between the sampling thread and the frame loop.
#[derive(Clone, Debug)]
pub struct InputSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl Default for InputSlot {
    fn default() -> Self { InputSlot::new() }
}

impl InputSlot {
    pub fn new() -> Self {
        InputSlot {
            inner: Arc::new(Mutex::new(SlotState {
                reading: HandReading::NEUTRAL,
                status:  InputStatus::Starting,
            })),
        }
    }

    pub fn publish(&self, reading: HandReading) {
        self.inner.lock().reading = reading;
    }

    pub fn latest(&self) -> HandReading {
        self.inner.lock().reading
    }

    pub fn set_status(&self, status: InputStatus) {
        self.inner.lock().status = status;
    }

    pub fn status(&self) -> InputStatus {
        self.inner.lock().status
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSampler
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame processing: timestamp dedup, classification, debounce, summary.
#[derive(Clone, Debug)]
pub struct LandmarkSampler {
    thresholds:     GestureThresholds,
    filter:         GestureFilter,
    last_timestamp: Option<f64>,
    seq:            u64,
}

impl Default for LandmarkSampler {
    fn default() -> Self {
        LandmarkSampler::new(GestureThresholds::default(), GestureFilter::default())
    }
}

impl LandmarkSampler {
    pub fn new(thresholds: GestureThresholds, filter: GestureFilter) -> Self {
        LandmarkSampler { thresholds, filter, last_timestamp: None, seq: 0 }
    }

    pub fn last_timestamp(&self) -> Option<f64> { self.last_timestamp }

    /// Process one frame.  Returns `None` when the frame's timestamp is not
    /// finite or repeats the last processed one.  A timestamp that jumps
    /// backwards is a restarted clock (looping recording, reopened camera)
    /// and is processed.
    pub fn sample<F, P>(&mut self, provider: &mut P, frame: &VideoFrame<F>) -> Option<HandReading>
    where
        P: LandmarkProvider<F> + ?Sized,
    {
        if !frame.timestamp.is_finite() {
            return None;
        }
        match self.last_timestamp {
            Some(last) if frame.timestamp == last => return None,
            Some(last) if frame.timestamp < last => {
                debug!(from = last, to = frame.timestamp, "frame clock restarted");
            }
            _ => {}
        }
        self.last_timestamp = Some(frame.timestamp);

        let hand = match provider.detect(&frame.frame, frame.timestamp) {
            Ok(hand) => hand,
            Err(e) => {
                debug!(timestamp = frame.timestamp, error = %e, "detection failed; treating as no hand");
                None
            }
        };

        let raw = classify_with(hand.as_ref(), &self.thresholds);
        let gesture = self.filter.push(raw);
        self.seq += 1;

        Some(HandReading {
            seq:          self.seq,
            timestamp:    frame.timestamp,
            raw,
            gesture,
            pointer:      summarize(hand.as_ref()),
            hand_visible: hand.is_some(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sampling thread
// ════════════════════════════════════════════════════════════════════════════

/// Owns the sampling thread.  Stopping (or dropping) joins it, which drops
/// the provider and the frame source.
pub struct SamplerHandle {
    stop:   Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SamplerHandle {
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(t) = self.thread.take() {
            if t.join().is_err() {
                warn!("sampler thread panicked");
            }
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the sampling loop on its own thread.
///
/// `init` builds the provider on the sampling thread.  If it fails the error
/// is logged, the slot is marked [`InputStatus::Unavailable`] and keeps its
/// neutral reading, and the thread exits; rendering is unaffected.
pub fn spawn_sampler<S, P, I>(
    mut source:  S,
    init:        I,
    mut sampler: LandmarkSampler,
    slot:        InputSlot,
) -> SamplerHandle
where
    S: FrameSource + 'static,
    P: LandmarkProvider<S::Frame>,
    I: FnOnce() -> Result<P> + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);

    let thread = thread::spawn(move || {
        let mut provider = match init() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "hand tracking unavailable; continuing without input");
                slot.set_status(InputStatus::Unavailable);
                return;
            }
        };
        slot.set_status(InputStatus::Running);
        info!("hand tracking running");

        while !stop_flag.load(Ordering::Relaxed) {
            let Some(frame) = source.next_frame() else {
                info!("frame source ended");
                break;
            };
            if let Some(reading) = sampler.sample(&mut provider, &frame) {
                slot.publish(reading);
            }
        }
        slot.set_status(InputStatus::Stopped);
        debug!("sampler thread exiting");
    });

    SamplerHandle { stop, thread: Some(thread) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use hand_gesture::{HandPose, HandShape};
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    /// Frames are the hand to report, or `None` for an empty frame.
    struct Scripted {
        frames: VecDeque<VideoFrame<Option<HandShape>>>,
    }

    impl Scripted {
        fn new(frames: &[(f64, Option<HandShape>)]) -> Self {
            Scripted {
                frames: frames
                    .iter()
                    .map(|&(timestamp, frame)| VideoFrame { timestamp, frame })
                    .collect(),
            }
        }
    }

    impl FrameSource for Scripted {
        type Frame = Option<HandShape>;
        fn next_frame(&mut self) -> Option<VideoFrame<Self::Frame>> {
            self.frames.pop_front()
        }
    }

    #[derive(Default)]
    struct PoseProvider {
        calls: usize,
    }

    impl LandmarkProvider<Option<HandShape>> for PoseProvider {
        fn detect(&mut self, frame: &Option<HandShape>, _ts: f64) -> Result<Option<LandmarkSet>> {
            self.calls += 1;
            Ok(frame.map(|shape| HandPose::upright(shape, 0.25, 0.75).landmarks()))
        }
    }

    struct FailingProvider;

    impl LandmarkProvider<Option<HandShape>> for FailingProvider {
        fn detect(&mut self, _f: &Option<HandShape>, _ts: f64) -> Result<Option<LandmarkSet>> {
            Err(SceneError::Detection("model not loaded".into()))
        }
    }

    fn frame(timestamp: f64, shape: Option<HandShape>) -> VideoFrame<Option<HandShape>> {
        VideoFrame { timestamp, frame: shape }
    }

    #[test]
    fn repeated_timestamps_are_skipped() {
        let mut s = LandmarkSampler::default();
        let mut p = PoseProvider::default();

        assert!(s.sample(&mut p, &frame(1.0, Some(HandShape::Fist))).is_some());
        assert!(s.sample(&mut p, &frame(1.0, Some(HandShape::Fist))).is_none());
        assert!(s.sample(&mut p, &frame(1.5, Some(HandShape::Fist))).is_some());
        assert!(s.sample(&mut p, &frame(1.5, Some(HandShape::Fist))).is_none());
        // Skipped frames never reach the provider.
        assert_eq!(p.calls, 2);
    }

    #[test]
    fn restarted_clock_keeps_input_flowing() {
        let mut s = LandmarkSampler::default();
        let mut p = PoseProvider::default();

        for i in 1..=100 {
            let r = s.sample(&mut p, &frame(i as f64 * 0.1, Some(HandShape::OpenPalm)));
            assert!(r.is_some());
        }

        // The source loops back to the start of its clock.
        let mut accepted = 0;
        let mut last = None;
        for i in 1..=90 {
            if let Some(r) = s.sample(&mut p, &frame(i as f64 * 0.1, Some(HandShape::Fist))) {
                accepted += 1;
                last = Some(r);
            }
        }
        assert_eq!(accepted, 90);
        let last = last.expect("reading after restart");
        assert_eq!(last.gesture, Gesture::ClosedFist);
        assert_eq!(last.seq, 190);
        assert_eq!(s.last_timestamp(), Some(90.0 * 0.1));
    }

    #[test]
    fn readings_carry_gesture_and_pointer() {
        let mut s = LandmarkSampler::default();
        let mut p = PoseProvider::default();

        let r = s.sample(&mut p, &frame(0.1, Some(HandShape::Pinch))).expect("reading");
        assert_eq!(r.seq, 1);
        assert_eq!(r.raw, Gesture::Pinch);
        assert_eq!(r.gesture, Gesture::Pinch);
        assert!(r.hand_visible);
        assert!((r.pointer.x - 0.25).abs() < 1e-5);
        assert!((r.pointer.y - 0.75).abs() < 1e-5);

        let r = s.sample(&mut p, &frame(0.2, None)).expect("reading");
        assert_eq!(r.seq, 2);
        assert_eq!(r.gesture, Gesture::None);
        assert_eq!(r.pointer, PointerSample::NEUTRAL);
        assert!(!r.hand_visible);
    }

    #[test]
    fn detection_error_counts_as_no_hand() {
        let mut s = LandmarkSampler::default();
        let r = s.sample(&mut FailingProvider, &frame(0.1, Some(HandShape::Fist))).expect("reading");
        assert_eq!(r.gesture, Gesture::None);
        assert_eq!(r.pointer, PointerSample::NEUTRAL);
    }

    #[test]
    fn debounce_applies_to_published_gesture() {
        let mut s = LandmarkSampler::new(GestureThresholds::default(), GestureFilter::new(3));
        let mut p = PoseProvider::default();

        let r1 = s.sample(&mut p, &frame(0.1, Some(HandShape::OpenPalm))).expect("reading");
        let r2 = s.sample(&mut p, &frame(0.2, Some(HandShape::OpenPalm))).expect("reading");
        let r3 = s.sample(&mut p, &frame(0.3, Some(HandShape::OpenPalm))).expect("reading");
        assert_eq!((r1.raw, r1.gesture), (Gesture::OpenPalm, Gesture::None));
        assert_eq!(r2.gesture, Gesture::None);
        assert_eq!(r3.gesture, Gesture::OpenPalm);
    }

    #[test]
    fn slot_starts_neutral_and_keeps_latest() {
        let slot = InputSlot::new();
        assert_eq!(slot.latest(), HandReading::NEUTRAL);
        assert_eq!(slot.status(), InputStatus::Starting);

        let mut r = HandReading::NEUTRAL;
        r.seq = 7;
        slot.publish(r);
        r.seq = 8;
        slot.clone().publish(r);
        assert_eq!(slot.latest().seq, 8);
    }

    fn wait_for(slot: &InputSlot, status: InputStatus) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while slot.status() != status {
            assert!(Instant::now() < deadline, "timed out waiting for {:?}", status);
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn thread_publishes_until_source_ends() {
        let slot = InputSlot::new();
        let source = Scripted::new(&[
            (0.0, None),
            (0.1, Some(HandShape::OpenPalm)),
            (0.1, Some(HandShape::Fist)),
            (0.2, Some(HandShape::Fist)),
        ]);
        let handle = spawn_sampler(
            source,
            || Ok(PoseProvider::default()),
            LandmarkSampler::default(),
            slot.clone(),
        );
        wait_for(&slot, InputStatus::Stopped);
        handle.stop();

        let last = slot.latest();
        assert_eq!(last.seq, 3);
        assert_eq!(last.gesture, Gesture::ClosedFist);
    }

    #[test]
    fn init_failure_leaves_input_neutral() {
        let slot = InputSlot::new();
        let source = Scripted::new(&[(0.1, Some(HandShape::Fist))]);
        let handle = spawn_sampler(
            source,
            || -> Result<PoseProvider> { Err(SceneError::ProviderInit("no camera".into())) },
            LandmarkSampler::default(),
            slot.clone(),
        );
        wait_for(&slot, InputStatus::Unavailable);
        drop(handle);

        assert_eq!(slot.latest(), HandReading::NEUTRAL);
        assert_eq!(slot.status(), InputStatus::Unavailable);
    }
}

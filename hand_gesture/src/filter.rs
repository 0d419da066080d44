//! Consecutive-sample debounce between the classifier and the mode machine.

use tracing::debug;

use crate::classify::Gesture;

/// Reports a gesture only once it has been classified for `hold_samples`
/// consecutive samples; until then the previously reported gesture stands.
///
/// `hold_samples <= 1` passes every classification straight through, which
/// lets a hand hovering on a threshold flip the reported gesture each sample.
#[derive(Clone, Debug)]
pub struct GestureFilter {
    hold_samples: u32,
    candidate:    Gesture,
    streak:       u32,
    reported:     Gesture,
}

impl Default for GestureFilter {
    fn default() -> Self { GestureFilter::new(1) }
}

impl GestureFilter {
    pub fn new(hold_samples: u32) -> Self {
        GestureFilter {
            hold_samples: hold_samples.max(1),
            candidate:    Gesture::None,
            streak:       0,
            reported:     Gesture::None,
        }
    }

    pub fn hold_samples(&self) -> u32 { self.hold_samples }

    /// The gesture currently reported.
    pub fn current(&self) -> Gesture { self.reported }

    /// Feed one raw classification and return the reported gesture.
    pub fn push(&mut self, raw: Gesture) -> Gesture {
        if raw == self.candidate {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.candidate = raw;
            self.streak = 1;
        }

        if self.streak >= self.hold_samples && self.reported != self.candidate {
            debug!(from = self.reported.as_str(), to = self.candidate.as_str(), "gesture settled");
            self.reported = self.candidate;
        }
        self.reported
    }

    pub fn reset(&mut self) {
        *self = GestureFilter::new(self.hold_samples);
    }
}

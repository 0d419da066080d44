//! Scene mode state machine.
//!
//! | Current   | Gesture    | Next    | Side effect                 |
//! |-----------|------------|---------|-----------------------------|
//! | ≠ Tree    | ClosedFist | Tree    | clear focus                 |
//! | ≠ Scatter | OpenPalm   | Scatter | clear focus                 |
//! | Scatter   | Pinch      | Zoom    | pick a focus particle       |
//! | *         | anything   | —       | none                        |
//!
//! Transitions are level-triggered: a held gesture re-evaluates every
//! reading but the "≠ current" guards make it a no-op after the first.

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use tracing::info;

use hand_gesture::{Gesture, PointerSample};
use particle_field::{ParticleId, ParticleSet};

use crate::sampler::HandReading;

// ════════════════════════════════════════════════════════════════════════════
// AppMode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AppMode {
    #[default]
    Tree,
    Scatter,
    Zoom,
}

impl AppMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Tree    => "tree",
            AppMode::Scatter => "scatter",
            AppMode::Zoom    => "zoom",
        }
    }

    /// Overlay caption.
    pub fn caption(&self) -> &'static str {
        match self {
            AppMode::Tree    => "TREE FORMATION",
            AppMode::Scatter => "ETHEREAL SCATTER",
            AppMode::Zoom    => "MEMORY RECALL",
        }
    }
}

/// Which particles a pinch may pick as the focus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FocusPool {
    /// Any particle in the field.
    #[default]
    Field,
    /// Photo particles only; the whole field when there are none.
    Photos,
}

// ════════════════════════════════════════════════════════════════════════════
// SceneContext
// ════════════════════════════════════════════════════════════════════════════

/// Everything the animation driver reads about the current interaction.
///
/// Mutated only from the frame loop, through [`ModeMachine::apply`] and
/// [`SceneContext::observe`].  `focus` is `Some` exactly when `mode` is
/// [`AppMode::Zoom`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneContext {
    pub mode:    AppMode,
    pub focus:   Option<ParticleId>,
    pub pointer: PointerSample,
    pub gesture: Gesture,
}

impl SceneContext {
    pub fn new() -> Self { SceneContext::default() }

    /// Copy the pointer and gesture of a reading into the context.
    pub fn observe(&mut self, reading: &HandReading) {
        self.pointer = reading.pointer;
        self.gesture = reading.gesture;
    }

    /// After the field is replaced, drop a focus whose id no longer exists.
    pub fn revalidate(&mut self, field: &ParticleSet) -> Option<ModeChange> {
        match &self.focus {
            Some(id) if !field.contains(id) => {
                let change = ModeChange { from: self.mode, to: AppMode::Scatter, focus: None };
                self.mode = AppMode::Scatter;
                self.focus = None;
                info!(from = change.from.as_str(), to = change.to.as_str(), "focus lost on regeneration");
                Some(change)
            }
            _ => None,
        }
    }
}

/// An applied transition.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeChange {
    pub from:  AppMode,
    pub to:    AppMode,
    pub focus: Option<ParticleId>,
}

// ════════════════════════════════════════════════════════════════════════════
// ModeMachine
// ════════════════════════════════════════════════════════════════════════════

pub struct ModeMachine {
    pool: FocusPool,
    rng:  StdRng,
}

impl ModeMachine {
    pub fn new(pool: FocusPool) -> Self {
        ModeMachine { pool, rng: StdRng::from_entropy() }
    }

    /// Focus picks become reproducible for a given seed.
    pub fn seeded(pool: FocusPool, seed: u64) -> Self {
        ModeMachine { pool, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn pool(&self) -> FocusPool { self.pool }

    /// Evaluate one gesture against the context.  Returns the transition
    /// when one was taken.
    pub fn apply(
        &mut self,
        ctx:     &mut SceneContext,
        gesture: Gesture,
        field:   &ParticleSet,
    ) -> Option<ModeChange> {
        let from = ctx.mode;
        match (from, gesture) {
            (AppMode::Scatter | AppMode::Zoom, Gesture::ClosedFist) => {
                ctx.mode = AppMode::Tree;
                ctx.focus = None;
            }
            (AppMode::Tree | AppMode::Zoom, Gesture::OpenPalm) => {
                ctx.mode = AppMode::Scatter;
                ctx.focus = None;
            }
            (AppMode::Scatter, Gesture::Pinch) => {
                // Nothing to look at: stay in Scatter.
                let focus = self.pick_focus(field)?;
                ctx.mode = AppMode::Zoom;
                ctx.focus = Some(focus);
            }
            _ => return None,
        }

        let change = ModeChange { from, to: ctx.mode, focus: ctx.focus.clone() };
        info!(
            from    = change.from.as_str(),
            to      = change.to.as_str(),
            gesture = gesture.as_str(),
            focus   = change.focus.as_ref().map(|id| id.as_str()).unwrap_or("-"),
            "mode change"
        );
        Some(change)
    }

    fn pick_focus(&mut self, field: &ParticleSet) -> Option<ParticleId> {
        let index = match self.pool {
            FocusPool::Photos => field
                .photo_indices()
                .choose(&mut self.rng)
                .or_else(|| (0..field.len()).choose(&mut self.rng)),
            FocusPool::Field => (0..field.len()).choose(&mut self.rng),
        }?;
        field.get(index).map(|p| p.id.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

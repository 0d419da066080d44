//! Top-level scene state and the frame loop.
//!
//! `Scene` owns the particle field, the image library, the mode machine and
//! its context, and the animation driver.  The frame loop feeds it the latest
//! hand reading, rebuilds the field when the library changes, and steps the
//! driver into whatever `RenderSink` is attached.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use hand_gesture::{GestureFilter, GestureThresholds};
use particle_field::{generate_with, FieldConfig, ParticleSet};

use crate::driver::{AnimationDriver, DriverConfig, FramePayload};
use crate::error::Result;
use crate::library::{default_images, demo_image, ImageLibrary};
use crate::mode::{FocusPool, ModeChange, ModeMachine, SceneContext};
use crate::sampler::{spawn_sampler, HandReading, InputSlot, LandmarkSampler, SamplerHandle};
use crate::sim::{sim_camera, SimCamera, SimProvider};
use crate::sink::RenderSink;
use crate::visualizer::{Hud, Preview};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand landmarks come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InputBackend {
    /// Keyboard + mouse in the preview window.
    #[default]
    Sim,
    /// LeapMotion controller; needs the `leap` feature.
    Leap,
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub field:            FieldConfig,
    /// Seeds field generation and focus picks; `None` = fresh every run.
    pub seed:             Option<u64>,
    pub images:           Vec<String>,
    pub thresholds:       GestureThresholds,
    /// Consecutive samples a gesture must hold before it counts.
    pub debounce_samples: u32,
    pub focus_pool:       FocusPool,
    pub driver:           DriverConfig,
    pub input:            InputBackend,
    /// Sampling rate of the simulated camera / Leap polling.
    pub sample_hz:        u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            field:            FieldConfig::default(),
            seed:             None,
            images:           default_images(),
            thresholds:       GestureThresholds::default(),
            debounce_samples: 1,
            focus_pool:       FocusPool::Field,
            driver:           DriverConfig::default(),
            input:            InputBackend::Sim,
            sample_hz:        30,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene
// ════════════════════════════════════════════════════════════════════════════

pub struct Scene {
    field_cfg:  FieldConfig,
    seed:       Option<u64>,

    // ── content ──────────────────────────────────────────────────────────
    library:    ImageLibrary,
    built_for:  u64,
    field:      ParticleSet,

    // ── interaction ──────────────────────────────────────────────────────
    machine:    ModeMachine,
    ctx:        SceneContext,
    last_seq:   u64,

    // ── animation ────────────────────────────────────────────────────────
    driver:     AnimationDriver,
}

impl Scene {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let library = ImageLibrary::new(cfg.images.clone());
        let field = build_field(&cfg.field, cfg.seed, library.refs())?;
        let machine = match cfg.seed {
            Some(seed) => ModeMachine::seeded(cfg.focus_pool, seed),
            None       => ModeMachine::new(cfg.focus_pool),
        };
        let counts = field.kind_counts();
        info!(
            particles = field.len(),
            photos    = counts.photo,
            spheres   = counts.sphere,
            cubes     = counts.cube,
            canes     = counts.cane,
            "field generated"
        );

        Ok(Scene {
            field_cfg: cfg.field,
            seed:      cfg.seed,
            built_for: library.generation(),
            library,
            field,
            machine,
            ctx:       SceneContext::new(),
            last_seq:  0,
            driver:    AnimationDriver::new(cfg.driver),
        })
    }

    /// Hand the current field to `sink` and attach whatever it has ready.
    pub fn bind<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let ready = sink.bind_field(&self.field);
        let attached = self.driver.bind(&self.field, &ready);
        if attached < self.field.len() {
            warn!(attached, total = self.field.len(), "not every particle has a visual");
        }
        attached
    }

    /// Apply a reading if it is newer than the last one applied.
    pub fn apply_reading(&mut self, reading: &HandReading) -> Option<ModeChange> {
        if reading.seq <= self.last_seq {
            return None;
        }
        self.last_seq = reading.seq;
        self.ctx.observe(reading);
        self.machine.apply(&mut self.ctx, reading.gesture, &self.field)
    }

    pub fn add_images<I, S>(&mut self, refs: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.library.append(refs)
    }

    /// Rebuild the field and rebind `sink` if the library changed.  Returns
    /// whether a rebuild happened.  On failure the old field stays.
    pub fn sync_field<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let generation = self.library.generation();
        if generation == self.built_for {
            return false;
        }
        self.built_for = generation;

        match build_field(&self.field_cfg, self.seed, self.library.refs()) {
            Ok(field) => {
                self.field = field;
                self.ctx.revalidate(&self.field);
                let attached = self.bind(sink);
                info!(particles = self.field.len(), attached, generation, "field regenerated");
                true
            }
            Err(e) => {
                warn!(error = %e, "field regeneration failed; keeping the current field");
                false
            }
        }
    }

    /// Step the animation and present the frame.
    pub fn advance<S: RenderSink + ?Sized>(&mut self, delta: f32, sink: &mut S) -> &FramePayload {
        let payload = self.driver.step(&self.field, &self.ctx, delta);
        sink.present(payload);
        payload
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn field(&self)   -> &ParticleSet     { &self.field }
    pub fn context(&self) -> &SceneContext    { &self.ctx }
    pub fn library(&self) -> &ImageLibrary    { &self.library }
    pub fn driver(&self)  -> &AnimationDriver { &self.driver }
}

fn build_field(cfg: &FieldConfig, seed: Option<u64>, refs: &[String]) -> Result<ParticleSet> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None    => StdRng::from_entropy(),
    };
    Ok(generate_with(cfg, refs, &mut rng)?)
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

fn start_input(cfg: &AppConfig, camera: SimCamera, slot: &InputSlot) -> SamplerHandle {
    let sampler = LandmarkSampler::new(cfg.thresholds, GestureFilter::new(cfg.debounce_samples));

    match cfg.input {
        InputBackend::Sim => spawn_sampler(camera, || Ok(SimProvider), sampler, slot.clone()),

        #[cfg(feature = "leap")]
        InputBackend::Leap => spawn_sampler(
            crate::leap::PollClock::new(cfg.sample_hz),
            crate::leap::LeapProvider::connect,
            sampler,
            slot.clone(),
        ),

        #[cfg(not(feature = "leap"))]
        InputBackend::Leap => spawn_sampler(
            camera,
            || -> Result<SimProvider> {
                Err(crate::error::SceneError::ProviderInit("built without the `leap` feature".into()))
            },
            sampler,
            slot.clone(),
        ),
    }
}

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It builds the scene,
/// starts the hand sampler on its own thread, opens the preview window and
/// drives the frame loop at ~60 fps until the window closes or `Q` is
/// pressed.
pub fn run(cfg: AppConfig) -> Result<()> {
    let mut scene = Scene::new(&cfg)?;

    // ── Input ─────────────────────────────────────────────────────────────
    let slot = InputSlot::new();
    let (sim_tx, camera) = sim_camera(cfg.sample_hz);
    let sampler = start_input(&cfg, camera, &slot);

    // ── Preview (owns the window and the sim sender) ─────────────────────
    let mut preview = Preview::new(sim_tx)?;
    scene.bind(&mut preview);

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut last = Instant::now();
    while preview.is_open() {
        let input = preview.poll_input();
        if input.quit { break; }
        if input.add_image {
            let next = demo_image(scene.library().len() % 12 + 1);
            scene.add_images([next]);
        }

        let reading = slot.latest();
        scene.apply_reading(&reading);
        scene.sync_field(&mut preview);

        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32();
        last = now;

        preview.set_hud(Hud {
            mode:         scene.context().mode,
            gesture:      scene.context().gesture,
            hand_visible: reading.hand_visible,
            particles:    scene.field().len(),
            photos:       scene.library().len(),
            input:        slot.status(),
        });
        scene.advance(delta, &mut preview);
    }

    sampler.stop();
    info!("shut down");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::mode::AppMode;
    use crate::sink::RecordingSink;
    use hand_gesture::{Gesture, PointerSample};

    fn config() -> AppConfig {
        AppConfig { seed: Some(42), images: vec!["/photos/1.jpg".into()], ..AppConfig::default() }
    }

    fn reading(seq: u64, gesture: Gesture) -> HandReading {
        HandReading { seq, gesture, raw: gesture, hand_visible: true, ..HandReading::NEUTRAL }
    }

    #[test]
    fn default_config_matches_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.debounce_samples, 1);
        assert_eq!(cfg.focus_pool, FocusPool::Field);
        assert_eq!(cfg.images.len(), 12);
        assert_eq!(cfg.input, InputBackend::Sim);
    }

    #[test]
    fn new_scene_has_expected_field_size() {
        let scene = Scene::new(&config()).expect("scene");
        assert_eq!(scene.field().len(), 505);
        assert_eq!(scene.context().mode, AppMode::Tree);
    }

    #[test]
    fn invalid_field_config_is_an_error() {
        let cfg = AppConfig {
            field:  FieldConfig { base_count: 0, ..FieldConfig::default() },
            images: Vec::new(),
            ..config()
        };
        assert!(matches!(Scene::new(&cfg), Err(SceneError::Field(_))));
    }

    #[test]
    fn stale_readings_are_ignored() {
        let mut scene = Scene::new(&config()).expect("scene");
        assert!(scene.apply_reading(&reading(1, Gesture::OpenPalm)).is_some());
        // Same seq again, even with a different gesture: ignored.
        assert!(scene.apply_reading(&reading(1, Gesture::ClosedFist)).is_none());
        assert_eq!(scene.context().mode, AppMode::Scatter);
        // The neutral reading never applies.
        assert!(scene.apply_reading(&HandReading::NEUTRAL).is_none());
    }

    #[test]
    fn readings_update_pointer() {
        let mut scene = Scene::new(&config()).expect("scene");
        let mut r = reading(1, Gesture::None);
        r.pointer = PointerSample { x: 0.1, y: 0.9, tilt: 0.3 };
        scene.apply_reading(&r);
        assert_eq!(scene.context().pointer, r.pointer);
    }

    #[test]
    fn appending_images_regenerates_and_rebinds() {
        let mut scene = Scene::new(&config()).expect("scene");
        let mut sink = RecordingSink::new();
        scene.bind(&mut sink);
        assert!(!scene.sync_field(&mut sink));

        scene.add_images(["/photos/2.jpg"]);
        assert!(scene.sync_field(&mut sink));
        assert_eq!(scene.field().len(), 510);
        assert_eq!(sink.binds, 2);
        assert_eq!(sink.visuals.len(), 510);
        assert_eq!(scene.driver().attached_count(), 510);
        assert!(!scene.sync_field(&mut sink));
    }

    #[test]
    fn advance_presents_every_frame() {
        let mut scene = Scene::new(&config()).expect("scene");
        let mut sink = RecordingSink::new();
        scene.bind(&mut sink);
        for _ in 0..3 {
            scene.advance(1.0 / 60.0, &mut sink);
        }
        assert_eq!(sink.frames.len(), 3);
        assert_eq!(sink.frames[2].particles.len(), 505);
    }
}

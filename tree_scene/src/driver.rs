//! Per-frame animation: group orientation, camera distance, and every
//! particle's position, rotation and scale, each damped toward a target that
//! depends on the current mode.
//!
//! The driver keeps mutable runtime state in an arena indexed like the
//! [`ParticleSet`]; the particles themselves stay immutable.  Slots start
//! empty and are filled by [`AnimationDriver::attach`] once the render side
//! has a visual for the particle.  Empty slots are skipped.

use std::f32::consts::TAU;

use glam::{EulerRot, Mat3, Quat, Vec3};

use particle_field::{Particle, ParticleSet};

use crate::mode::{AppMode, SceneContext};
use crate::smoothing::{damp, damp_angle, damp_vec3, wrap_angle};

// ════════════════════════════════════════════════════════════════════════════
// DriverConfig
// ════════════════════════════════════════════════════════════════════════════

/// Rates are per second for [`damp`]; distances are world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverConfig {
    pub position_rate:       f32,
    pub focus_position_rate: f32,
    pub scale_rate:          f32,
    pub orientation_rate:    f32,
    pub camera_rate:         f32,

    /// Yaw speed of the idle tree, rad/s.
    pub tree_yaw_speed:      f32,
    /// Pointer → target yaw / pitch gains, applied to `pointer − 0.5`.
    pub yaw_gain:            f32,
    pub pitch_gain:          f32,

    pub camera_tree:         f32,
    pub camera_scatter:      f32,
    pub camera_zoom:         f32,

    /// World-space point the focus particle travels to; it stays put however
    /// the group is turned.
    pub focus_point:         Vec3,
    pub focus_scale:         f32,

    /// Vertical bob of scattered particles.
    pub drift_amplitude:     f32,
    /// Euler spin of non-focus particles, rad/s per axis.
    pub spin:                Vec3,

    /// Longer frames are shortened to this.
    pub max_frame_delta:     f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            position_rate:       3.0,
            focus_position_rate: 4.0,
            scale_rate:          3.0,
            orientation_rate:    4.0,
            camera_rate:         2.0,
            tree_yaw_speed:      0.2,
            yaw_gain:            2.0,
            pitch_gain:          1.0,
            camera_tree:         20.0,
            camera_scatter:      15.0,
            camera_zoom:         8.0,
            focus_point:         Vec3::new(0.0, 0.0, 4.0),
            focus_scale:         4.0,
            drift_amplitude:     0.02,
            spin:                Vec3::new(0.5, 0.3, 0.0),
            max_frame_delta:     0.1,
        }
    }
}

impl DriverConfig {
    pub fn camera_target(&self, mode: AppMode) -> f32 {
        match mode {
            AppMode::Tree    => self.camera_tree,
            AppMode::Scatter => self.camera_scatter,
            AppMode::Zoom    => self.camera_zoom,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Runtime state and payload
// ════════════════════════════════════════════════════════════════════════════

/// Mutable per-particle state.  `rotation` is an XYZ Euler triple so spins
/// accumulate per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRuntime {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale:    f32,
}

impl ParticleRuntime {
    /// Starts on the tree, at its seed rotation and base scale.
    pub fn for_particle(p: &Particle) -> Self {
        ParticleRuntime {
            position: p.formation_a,
            rotation: p.rotation_seed,
            scale:    p.base_scale,
        }
    }
}

/// Group orientation as XYZ Euler angles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    pub pitch: f32,
    pub yaw:   f32,
    pub roll:  f32,
}

impl Orientation {
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, self.roll)
    }
}

/// Group-local transform of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleTransform {
    pub index:    usize,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale:    f32,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FramePayload {
    pub elapsed:         f32,
    pub mode:            AppMode,
    /// Distance of the camera from the origin along +Z, looking at it.
    pub camera_distance: f32,
    pub orientation:     Quat,
    /// Field index of the focus particle while zoomed.
    pub focus:           Option<usize>,
    pub particles:       Vec<ParticleTransform>,
}

// ════════════════════════════════════════════════════════════════════════════
// AnimationDriver
// ════════════════════════════════════════════════════════════════════════════

pub struct AnimationDriver {
    cfg:             DriverConfig,
    orientation:     Orientation,
    camera_distance: f32,
    elapsed:         f32,
    arena:           Vec<Option<ParticleRuntime>>,
    payload:         FramePayload,
}

impl AnimationDriver {
    pub fn new(cfg: DriverConfig) -> Self {
        AnimationDriver {
            cfg,
            orientation:     Orientation::default(),
            camera_distance: cfg.camera_tree,
            elapsed:         0.0,
            arena:           Vec::new(),
            payload:         FramePayload::default(),
        }
    }

    pub fn config(&self) -> &DriverConfig { &self.cfg }
    pub fn camera_distance(&self) -> f32 { self.camera_distance }
    pub fn orientation(&self) -> Orientation { self.orientation }
    pub fn elapsed(&self) -> f32 { self.elapsed }
    pub fn payload(&self) -> &FramePayload { &self.payload }

    // ── arena ─────────────────────────────────────────────────────────────

    /// Forget all runtime state and size the arena for a new field.
    pub fn reset(&mut self, field: &ParticleSet) {
        self.arena.clear();
        self.arena.resize(field.len(), None);
    }

    /// Give particle `index` runtime state.  Returns false for an index
    /// outside the field.
    pub fn attach(&mut self, field: &ParticleSet, index: usize) -> bool {
        match (field.get(index), self.arena.get_mut(index)) {
            (Some(p), Some(slot)) => {
                *slot = Some(ParticleRuntime::for_particle(p));
                true
            }
            _ => false,
        }
    }

    /// Reset and attach `ready`.  Returns how many were attached.
    pub fn bind(&mut self, field: &ParticleSet, ready: &[usize]) -> usize {
        self.reset(field);
        ready.iter().filter(|&&i| self.attach(field, i)).count()
    }

    pub fn runtime(&self, index: usize) -> Option<&ParticleRuntime> {
        self.arena.get(index).and_then(Option::as_ref)
    }

    pub fn attached_count(&self) -> usize {
        self.arena.iter().filter(|s| s.is_some()).count()
    }

    // ── per-frame ─────────────────────────────────────────────────────────

    /// Advance by `delta` seconds and return the frame payload.
    ///
    /// A non-finite or negative `delta` counts as zero; a long one is capped
    /// at `max_frame_delta`.
    pub fn step(&mut self, field: &ParticleSet, ctx: &SceneContext, delta: f32) -> &FramePayload {
        let dt = if delta.is_finite() && delta > 0.0 {
            delta.min(self.cfg.max_frame_delta)
        } else {
            0.0
        };
        let cfg = self.cfg;
        self.elapsed += dt;

        // 1. Group orientation.
        let o = &mut self.orientation;
        match ctx.mode {
            AppMode::Tree => {
                o.yaw = wrap_angle(o.yaw + cfg.tree_yaw_speed * dt);
                o.pitch = damp(o.pitch, 0.0, cfg.orientation_rate, dt);
                o.roll = damp(o.roll, 0.0, cfg.orientation_rate, dt);
            }
            AppMode::Scatter | AppMode::Zoom => {
                let yaw_target = (ctx.pointer.x - 0.5) * cfg.yaw_gain;
                let pitch_target = (ctx.pointer.y - 0.5) * cfg.pitch_gain;
                o.yaw = damp_angle(o.yaw, yaw_target, cfg.orientation_rate, dt);
                o.pitch = damp(o.pitch, pitch_target, cfg.orientation_rate, dt);
            }
        }
        let group = self.orientation.quat();

        // 2. Camera.
        self.camera_distance = damp(
            self.camera_distance,
            cfg.camera_target(ctx.mode),
            cfg.camera_rate,
            dt,
        );
        let camera = Vec3::new(0.0, 0.0, self.camera_distance);

        // 3. Particles.
        let focus = match ctx.mode {
            AppMode::Zoom => ctx.focus.as_ref().and_then(|id| field.index_of(id)),
            AppMode::Tree | AppMode::Scatter => None,
        };
        let focus_local = group.inverse() * cfg.focus_point;
        let t = self.elapsed;

        self.payload.particles.clear();
        for (index, (particle, slot)) in field.iter().zip(self.arena.iter_mut()).enumerate() {
            let Some(rt) = slot.as_mut() else { continue };
            let is_focus = focus == Some(index);

            let (target, rate) = if is_focus {
                (focus_local, cfg.focus_position_rate)
            } else if ctx.mode == AppMode::Tree {
                (particle.formation_a, cfg.position_rate)
            } else {
                let b = particle.formation_b;
                let bob = (t + b.x).sin() * cfg.drift_amplitude;
                (b + Vec3::Y * bob, cfg.position_rate)
            };
            rt.position = damp_vec3(rt.position, target, rate, dt);

            if is_focus {
                let toward = camera - group * rt.position;
                if let Some(world) = look_rotation(toward, Vec3::Y) {
                    let (x, y, z) = (group.inverse() * world).to_euler(EulerRot::XYZ);
                    rt.rotation = Vec3::new(x, y, z);
                }
            } else {
                let r = rt.rotation + cfg.spin * dt;
                rt.rotation = Vec3::new(r.x.rem_euclid(TAU), r.y.rem_euclid(TAU), r.z.rem_euclid(TAU));
            }

            let scale_target = if is_focus { cfg.focus_scale } else { particle.base_scale };
            rt.scale = damp(rt.scale, scale_target, cfg.scale_rate, dt);

            self.payload.particles.push(ParticleTransform {
                index,
                position: rt.position,
                rotation: Quat::from_euler(EulerRot::XYZ, rt.rotation.x, rt.rotation.y, rt.rotation.z),
                scale:    rt.scale,
            });
        }

        // 4. Payload.
        self.payload.elapsed = t;
        self.payload.mode = ctx.mode;
        self.payload.camera_distance = self.camera_distance;
        self.payload.orientation = group;
        self.payload.focus = focus;
        &self.payload
    }
}

/// Rotation taking +Z to `forward` with +Y as close to `up` as possible.
fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let z = forward.try_normalize()?;
    let x = up.cross(z).try_normalize()?;
    let y = z.cross(x);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::PointerSample;
    use particle_field::{generate_seeded, ParticleId};

    const DT: f32 = 1.0 / 60.0;

    fn setup(images: &[&str]) -> (ParticleSet, AnimationDriver) {
        let field = generate_seeded(images, 3);
        let mut d = AnimationDriver::new(DriverConfig::default());
        let all: Vec<usize> = (0..field.len()).collect();
        d.bind(&field, &all);
        (field, d)
    }

    fn ctx(mode: AppMode) -> SceneContext {
        SceneContext { mode, ..SceneContext::default() }
    }

    fn zoom_on(index: usize) -> SceneContext {
        SceneContext {
            mode:  AppMode::Zoom,
            focus: Some(ParticleId::for_index(index)),
            ..SceneContext::default()
        }
    }

    #[test]
    fn tree_camera_approaches_twenty_monotonically() {
        let (field, mut d) = setup(&[]);
        for start in [5.0f32, 20.0, 50.0] {
            d.camera_distance = start;
            let mut gap = (start - 20.0).abs();
            for _ in 0..10 {
                d.step(&field, &ctx(AppMode::Tree), DT);
                let next = (d.camera_distance() - 20.0).abs();
                assert!(next <= gap, "start {}: {} then {}", start, gap, next);
                if start != 20.0 {
                    assert!(next < gap);
                }
                gap = next;
            }
        }
    }

    #[test]
    fn camera_targets_follow_mode() {
        let (field, mut d) = setup(&[]);
        for _ in 0..2000 {
            d.step(&field, &ctx(AppMode::Scatter), DT);
        }
        assert!((d.camera_distance() - 15.0).abs() < 1e-3);
        for _ in 0..2000 {
            d.step(&field, &zoom_on(0), DT);
        }
        assert!((d.camera_distance() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn tree_yaw_turns_steadily() {
        let (field, mut d) = setup(&[]);
        for _ in 0..60 {
            d.step(&field, &ctx(AppMode::Tree), DT);
        }
        assert!((d.orientation().yaw - 0.2).abs() < 1e-4);
        assert_eq!(d.orientation().pitch, 0.0);
    }

    #[test]
    fn scatter_orientation_follows_pointer() {
        let (field, mut d) = setup(&[]);
        let mut c = ctx(AppMode::Scatter);
        c.pointer = PointerSample { x: 0.9, y: 0.2, tilt: 0.0 };
        for _ in 0..600 {
            d.step(&field, &c, DT);
        }
        let o = d.orientation();
        assert!((o.yaw - 0.8).abs() < 1e-3, "yaw {}", o.yaw);
        assert!((o.pitch + 0.3).abs() < 1e-3, "pitch {}", o.pitch);
    }

    #[test]
    fn particles_settle_on_the_tree() {
        let (field, mut d) = setup(&[]);
        let mut c = ctx(AppMode::Scatter);
        for _ in 0..300 {
            d.step(&field, &c, DT);
        }
        c.mode = AppMode::Tree;
        for _ in 0..600 {
            d.step(&field, &c, DT);
        }
        for (i, p) in field.iter().enumerate() {
            let rt = d.runtime(i).expect("attached");
            assert!((rt.position - p.formation_a).length() < 1e-2, "particle {}", i);
            assert!((rt.scale - p.base_scale).abs() < 1e-3);
        }
    }

    #[test]
    fn scattered_particles_bob_around_cloud_position() {
        let (field, mut d) = setup(&[]);
        for _ in 0..900 {
            d.step(&field, &ctx(AppMode::Scatter), DT);
        }
        for (i, p) in field.iter().enumerate() {
            let rt = d.runtime(i).expect("attached");
            assert!((rt.position - p.formation_b).length() < 0.05, "particle {}", i);
        }
    }

    #[test]
    fn focus_particle_comes_forward_and_faces_camera() {
        let (field, mut d) = setup(&["a"]);
        let mut c = zoom_on(0);
        c.pointer = PointerSample { x: 0.8, y: 0.4, tilt: 0.0 };
        for _ in 0..900 {
            d.step(&field, &c, DT);
        }
        let cfg = DriverConfig::default();
        let payload = d.payload();
        assert_eq!(payload.focus, Some(0));

        let t = payload.particles.iter().find(|t| t.index == 0).expect("transform");
        let group = payload.orientation;
        let world_pos = group * t.position;
        assert!((world_pos - cfg.focus_point).length() < 1e-2, "{:?}", world_pos);
        assert!((t.scale - cfg.focus_scale).abs() < 1e-3);

        let camera = Vec3::new(0.0, 0.0, payload.camera_distance);
        let facing = (group * t.rotation) * Vec3::Z;
        let toward = (camera - world_pos).normalize();
        assert!(facing.dot(toward) > 0.999, "facing {:?} toward {:?}", facing, toward);

        // Everyone else keeps their ordinary scale.
        let rt1 = d.runtime(1).expect("attached");
        assert!((rt1.scale - field.as_slice()[1].base_scale).abs() < 1e-3);
    }

    #[test]
    fn long_sessions_keep_angles_bounded() {
        let (field, mut d) = setup(&[]);
        for _ in 0..2_000 {
            d.step(&field, &ctx(AppMode::Tree), 0.1);
        }
        let yaw = d.orientation().yaw;
        assert!((-std::f32::consts::PI..=std::f32::consts::PI).contains(&yaw), "yaw {}", yaw);
        // 200 s at 0.2 rad/s is 40 rad; wrapped into (-π, π] that is 40 - 6·2π.
        assert!((yaw - (40.0 - 6.0 * TAU)).abs() < 1e-2, "yaw {}", yaw);
        for i in 0..field.len() {
            let r = d.runtime(i).expect("attached").rotation;
            for a in [r.x, r.y, r.z] {
                assert!((0.0..TAU).contains(&a), "rotation {}", a);
            }
        }
    }

    #[test]
    fn non_focus_particles_spin() {
        let (field, mut d) = setup(&[]);
        let before = d.runtime(3).expect("attached").rotation;
        d.step(&field, &ctx(AppMode::Tree), 0.05);
        let after = d.runtime(3).expect("attached").rotation;
        let spun = after - before;
        assert!((spun.x - 0.025).abs() < 1e-6);
        assert!((spun.y - 0.015).abs() < 1e-6);
        assert_eq!(spun.z, 0.0);
    }

    #[test]
    fn unattached_particles_are_skipped() {
        let field = generate_seeded(&[] as &[&str], 3);
        let mut d = AnimationDriver::new(DriverConfig::default());
        assert_eq!(d.bind(&field, &[0, 2, 4, field.len() + 10]), 3);

        let payload = d.step(&field, &ctx(AppMode::Scatter), DT);
        let indices: Vec<usize> = payload.particles.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 2, 4]);
        assert!(d.runtime(1).is_none());
    }

    #[test]
    fn bad_deltas_freeze_the_frame() {
        let (field, mut d) = setup(&[]);
        d.step(&field, &ctx(AppMode::Scatter), DT);
        let before = d.payload().clone();
        for bad in [f32::NAN, f32::INFINITY, -1.0, 0.0] {
            let p = d.step(&field, &ctx(AppMode::Scatter), bad);
            assert_eq!(p.elapsed, before.elapsed);
            assert_eq!(p.camera_distance, before.camera_distance);
            assert_eq!(p.particles, before.particles);
        }
    }

    #[test]
    fn long_frames_are_capped() {
        let (field, mut d) = setup(&[]);
        d.step(&field, &ctx(AppMode::Tree), 5.0);
        assert!((d.elapsed() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn stale_focus_outside_zoom_is_ignored() {
        let (field, mut d) = setup(&[]);
        let mut c = zoom_on(0);
        c.mode = AppMode::Scatter;
        let p = d.step(&field, &c, DT);
        assert_eq!(p.focus, None);
    }
}

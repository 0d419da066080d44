//! Particle records and field generation.

use std::f32::consts::PI;
use std::fmt;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::Result;
use crate::formation::{cloud_position, spiral_position, FieldConfig};
use crate::palette;

// ════════════════════════════════════════════════════════════════════════════
// ParticleId
// ════════════════════════════════════════════════════════════════════════════

/// Stable key of a particle within one generation: `p-<index>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(String);

impl ParticleId {
    pub fn for_index(index: usize) -> Self {
        ParticleId(format!("p-{}", index))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// The field index encoded in the id, if it is well-formed.
    pub fn index(&self) -> Option<usize> {
        self.0.strip_prefix("p-")?.parse().ok()
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VisualKind
// ════════════════════════════════════════════════════════════════════════════

/// Tint of a spherical ornament.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SphereTone {
    Gold,
    LightGreen,
    MidGreen,
    DarkGreen,
}

impl SphereTone {
    pub fn color(self) -> u32 {
        match self {
            SphereTone::Gold       => palette::METALLIC_GOLD,
            SphereTone::LightGreen => palette::GREEN_LIGHT,
            SphereTone::MidGreen   => palette::GREEN_MID,
            SphereTone::DarkGreen  => palette::GREEN_DARK,
        }
    }
}

/// What a particle looks like.  Photo particles own their image reference,
/// so "image present iff photo" holds by construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VisualKind {
    Sphere { tone: SphereTone },
    /// Gift box.
    Cube,
    /// Candy cane.
    Cane,
    Photo { image_ref: String },
}

impl VisualKind {
    pub fn is_photo(&self) -> bool {
        matches!(self, VisualKind::Photo { .. })
    }

    pub fn image_ref(&self) -> Option<&str> {
        match self {
            VisualKind::Photo { image_ref } => Some(image_ref),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VisualKind::Sphere { .. } => "sphere",
            VisualKind::Cube          => "cube",
            VisualKind::Cane          => "cane",
            VisualKind::Photo { .. }  => "photo",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            VisualKind::Sphere { tone } => tone.color(),
            VisualKind::Cube            => palette::CHRISTMAS_RED,
            VisualKind::Cane            => palette::WHITE,
            VisualKind::Photo { .. }    => palette::WHITE,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

/// One immutable particle record.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id:            ParticleId,
    pub kind:          VisualKind,
    pub color:         u32,
    /// Spiral (Tree) position.
    pub formation_a:   Vec3,
    /// Cloud (Scatter) position.
    pub formation_b:   Vec3,
    /// Initial Euler rotation, each axis in [0, π).
    pub rotation_seed: Vec3,
    pub base_scale:    f32,
}

/// Per-kind tally, mostly for logging and the stats binary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub sphere: usize,
    pub cube:   usize,
    pub cane:   usize,
    pub photo:  usize,
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleSet
// ════════════════════════════════════════════════════════════════════════════

/// All particles of one generation, in index order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }
    pub fn get(&self, index: usize) -> Option<&Particle> { self.particles.get(index) }
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> { self.particles.iter() }
    pub fn as_slice(&self) -> &[Particle] { &self.particles }

    /// Index of the particle with `id` in this generation.
    pub fn index_of(&self, id: &ParticleId) -> Option<usize> {
        id.index().filter(|&i| i < self.particles.len())
    }

    pub fn contains(&self, id: &ParticleId) -> bool {
        self.index_of(id).is_some()
    }

    /// Indices of the photo particles (always a prefix of the field).
    pub fn photo_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.particles.iter()
            .enumerate()
            .filter(|(_, p)| p.kind.is_photo())
            .map(|(i, _)| i)
    }

    pub fn kind_counts(&self) -> KindCounts {
        let mut counts = KindCounts::default();
        for p in &self.particles {
            match p.kind {
                VisualKind::Sphere { .. } => counts.sphere += 1,
                VisualKind::Cube          => counts.cube   += 1,
                VisualKind::Cane          => counts.cane   += 1,
                VisualKind::Photo { .. }  => counts.photo  += 1,
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a ParticleSet {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;
    fn into_iter(self) -> Self::IntoIter { self.particles.iter() }
}

// ════════════════════════════════════════════════════════════════════════════
// Generation
// ════════════════════════════════════════════════════════════════════════════

/// Generate a field with the default config and an unseeded random source.
///
/// Ids, photo bindings and formation A depend only on `image_refs`;
/// formation B, ornament kinds and sizes differ from call to call.
pub fn generate<S: AsRef<str>>(image_refs: &[S]) -> ParticleSet {
    build(&FieldConfig::default(), image_refs, &mut rand::thread_rng())
}

/// Like [`generate`], but fully reproducible for a given `seed`.
pub fn generate_seeded<S: AsRef<str>>(image_refs: &[S], seed: u64) -> ParticleSet {
    build(&FieldConfig::default(), image_refs, &mut StdRng::seed_from_u64(seed))
}

/// Generate with an explicit config and random source.
pub fn generate_with<S, R>(cfg: &FieldConfig, image_refs: &[S], rng: &mut R) -> Result<ParticleSet>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    cfg.validate()?;
    cfg.particle_count(image_refs.len())?;
    Ok(build(cfg, image_refs, rng))
}

fn build<S, R>(cfg: &FieldConfig, image_refs: &[S], rng: &mut R) -> ParticleSet
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let count = cfg.count_for(image_refs.len());
    let mut particles = Vec::with_capacity(count);

    for i in 0..count {
        let formation_a = spiral_position(i, count, cfg);
        let formation_b = cloud_position(rng, cfg);

        let (kind, base_scale) = match image_refs.get(i) {
            Some(r) => (VisualKind::Photo { image_ref: r.as_ref().to_string() }, 1.5),
            None    => ornament(rng),
        };

        let rotation_seed = Vec3::new(
            rng.gen::<f32>() * PI,
            rng.gen::<f32>() * PI,
            rng.gen::<f32>() * PI,
        );

        particles.push(Particle {
            id: ParticleId::for_index(i),
            color: kind.color(),
            kind,
            formation_a,
            formation_b,
            rotation_seed,
            base_scale,
        });
    }

    let set = ParticleSet { particles };
    debug!(count, photos = image_refs.len(), kinds = ?set.kind_counts(), "generated particle field");
    set
}

/// Draw a non-photo ornament kind and its scale.
///
/// ≈5 % cane, ≈10 % cube, ≈15 % gold sphere, ≈70 % green sphere
/// (light / mid / dark at 80 / 10 / 10 %).
fn ornament<R: Rng + ?Sized>(rng: &mut R) -> (VisualKind, f32) {
    let r: f32 = rng.gen();
    if r > 0.95 {
        (VisualKind::Cane, 0.6)
    } else if r > 0.85 {
        (VisualKind::Cube, 0.35)
    } else if r > 0.70 {
        (VisualKind::Sphere { tone: SphereTone::Gold }, 0.4)
    } else {
        let g: f32 = rng.gen();
        let tone = if g < 0.8 {
            SphereTone::LightGreen
        } else if g < 0.9 {
            SphereTone::MidGreen
        } else {
            SphereTone::DarkGreen
        };
        (VisualKind::Sphere { tone }, 0.15 + rng.gen::<f32>() * 0.15)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    const NO_IMAGES: [&str; 0] = [];

    #[test]
    fn empty_refs_give_base_count_without_photos() {
        let field = generate(&NO_IMAGES);
        assert_eq!(field.len(), 500);
        assert!(field.iter().all(|p| !p.kind.is_photo()));
        assert_eq!(field.kind_counts().photo, 0);
    }

    #[test]
    fn photos_bound_to_leading_indices() {
        let field = generate(&["a", "b"]);
        assert_eq!(field.len(), 510);
        assert_eq!(field.get(0).unwrap().kind.image_ref(), Some("a"));
        assert_eq!(field.get(1).unwrap().kind.image_ref(), Some("b"));
        assert!(!field.get(2).unwrap().kind.is_photo());
        assert_eq!(field.photo_indices().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(field.get(0).unwrap().base_scale, 1.5);
    }

    #[test]
    fn ids_unique_and_resolvable() {
        let field = generate(&["a"]);
        let mut ids: Vec<_> = field.iter().map(|p| p.id.clone()).collect();
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(field.index_of(id), Some(i));
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), field.len());
        assert!(!field.contains(&ParticleId::for_index(field.len())));
    }

    // Unseeded generation: ids, kinds of the photo prefix and formation A are
    // pure functions of the image list.  Formation B and ornament sub-kinds
    // come from the random source and are allowed to differ.
    #[test]
    fn regeneration_keeps_identity_and_formation_a() {
        let refs = ["one", "two", "three"];
        let a = generate(&refs);
        let b = generate(&refs);
        assert_eq!(a.len(), b.len());
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert_eq!(pa.id, pb.id);
            assert_eq!(pa.formation_a, pb.formation_a);
            assert_eq!(pa.kind.is_photo(), pb.kind.is_photo());
            assert_eq!(pa.kind.image_ref(), pb.kind.image_ref());
        }
    }

    #[test]
    fn seeded_generation_is_fully_reproducible() {
        let a = generate_seeded(&["x", "y"], 42);
        let b = generate_seeded(&["x", "y"], 42);
        assert_eq!(a, b);
        let c = generate_seeded(&["x", "y"], 43);
        assert_ne!(a, c);
    }

    #[test]
    fn ornament_distribution_roughly_matches() {
        let cfg = FieldConfig { base_count: 20_000, ..FieldConfig::default() };
        let mut rng = StdRng::seed_from_u64(11);
        let field = generate_with(&cfg, &NO_IMAGES, &mut rng).unwrap();
        let k = field.kind_counts();
        let frac = |n: usize| n as f32 / field.len() as f32;
        assert!((frac(k.cane) - 0.05).abs() < 0.01, "cane {}", frac(k.cane));
        assert!((frac(k.cube) - 0.10).abs() < 0.015, "cube {}", frac(k.cube));
        assert!((frac(k.sphere) - 0.85).abs() < 0.02, "sphere {}", frac(k.sphere));
    }

    #[test]
    fn scales_within_kind_ranges() {
        let field = generate_seeded(&["p"], 5);
        for p in &field {
            match &p.kind {
                VisualKind::Photo { .. } => assert_eq!(p.base_scale, 1.5),
                VisualKind::Cane         => assert_eq!(p.base_scale, 0.6),
                VisualKind::Cube         => assert_eq!(p.base_scale, 0.35),
                VisualKind::Sphere { tone: SphereTone::Gold } => assert_eq!(p.base_scale, 0.4),
                VisualKind::Sphere { .. } => {
                    assert!((0.15..0.30).contains(&p.base_scale), "{}", p.base_scale)
                }
            }
            assert_eq!(p.color, p.kind.color());
            for a in [p.rotation_seed.x, p.rotation_seed.y, p.rotation_seed.z] {
                assert!((0.0..PI).contains(&a));
            }
        }
    }

    #[test]
    fn generate_with_rejects_empty_field() {
        let cfg = FieldConfig { base_count: 0, ..FieldConfig::default() };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(generate_with(&cfg, &NO_IMAGES, &mut rng), Err(FieldError::EmptyField));
        assert_eq!(generate_with(&cfg, &["only"], &mut rng).unwrap().len(), 5);
    }

    #[test]
    fn generate_with_rejects_oversized_field() {
        let cfg = FieldConfig { base_count: usize::MAX - 2, ..FieldConfig::default() };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            generate_with(&cfg, &["a", "b"], &mut rng),
            Err(FieldError::TooManyParticles { images: 2, .. })
        ));
    }

    #[test]
    fn particle_id_roundtrip() {
        let id = ParticleId::for_index(17);
        assert_eq!(id.as_str(), "p-17");
        assert_eq!(id.index(), Some(17));
        assert_eq!(id.to_string(), "p-17");
    }
}

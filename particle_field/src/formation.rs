//! Formation geometry — where each particle wants to be in Tree and Scatter.

use glam::Vec3;
use rand::Rng;

use crate::error::{FieldError, Result};

// ════════════════════════════════════════════════════════════════════════════
// FieldConfig
// ════════════════════════════════════════════════════════════════════════════

/// Size and shape parameters of a generated field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldConfig {
    /// Particles generated when there are no images.
    pub base_count:       usize,
    /// Extra particles added per image reference.
    pub per_image_extra:  usize,
    /// Height of the spiral, centred on y = 0.
    pub tree_height:      f32,
    /// Spiral radius at the bottom; tapers linearly to zero at the top.
    pub tree_radius_base: f32,
    /// Edge length of the cube the cloud is drawn from, centred on the origin.
    pub scatter_extent:   f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            base_count:       500,
            per_image_extra:  5,
            tree_height:      14.0,
            tree_radius_base: 5.0,
            scatter_extent:   28.0,
        }
    }
}

/// Largest field [`crate::generate_with`] will build.
pub const MAX_PARTICLES: usize = 1_000_000;

impl FieldConfig {
    /// Total particle count for `image_count` image references; saturates at
    /// `usize::MAX`.
    pub fn count_for(&self, image_count: usize) -> usize {
        self.per_image_extra
            .saturating_mul(image_count)
            .saturating_add(self.base_count)
    }

    /// [`count_for`](Self::count_for), rejecting empty fields and anything
    /// over [`MAX_PARTICLES`].
    pub fn particle_count(&self, image_count: usize) -> Result<usize> {
        match self.count_for(image_count) {
            0 => Err(FieldError::EmptyField),
            n if n > MAX_PARTICLES => Err(FieldError::TooManyParticles {
                base_count: self.base_count,
                images:     image_count,
                limit:      MAX_PARTICLES,
            }),
            n => Ok(n),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tree_height",      self.tree_height),
            ("tree_radius_base", self.tree_radius_base),
            ("scatter_extent",   self.scatter_extent),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FieldError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Formation A — tapered spiral
// ════════════════════════════════════════════════════════════════════════════

/// π(3 − √5): the golden angle in radians.
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Golden-angle multiples per particle step; spreads neighbours around the
/// trunk instead of stacking them into visible bands.
const SPIRAL_WINDING: f64 = 20.0;

/// Spiral position of particle `index` out of `count`.
///
/// Height rises linearly with the index from `-H/2`; the radius shrinks
/// linearly from `tree_radius_base` at the bottom to zero at `+H/2`.
pub fn spiral_position(index: usize, count: usize, cfg: &FieldConfig) -> Vec3 {
    let n = count.max(1) as f32;
    let h = cfg.tree_height;
    let y = (index as f32 / n) * h - h / 2.0;
    let radius = ((h / 2.0 - y) / h) * cfg.tree_radius_base;
    let theta = (GOLDEN_ANGLE * SPIRAL_WINDING * index as f64) % std::f64::consts::TAU;
    let theta = theta as f32;
    Vec3::new(radius * theta.cos(), y, radius * theta.sin())
}

// ════════════════════════════════════════════════════════════════════════════
// Formation B — random cloud
// ════════════════════════════════════════════════════════════════════════════

/// Uniform point inside the `scatter_extent` cube centred on the origin.
pub fn cloud_position<R: Rng + ?Sized>(rng: &mut R, cfg: &FieldConfig) -> Vec3 {
    let s = cfg.scatter_extent;
    let x = (rng.gen::<f32>() - 0.5) * s;
    let y = (rng.gen::<f32>() - 0.5) * s;
    let z = (rng.gen::<f32>() - 0.5) * s;
    Vec3::new(x, y, z)
}

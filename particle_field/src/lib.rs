//! # particle_field
//!
//! Generates the set of particles that make up the animated tree scene.
//! Every particle carries two fixed target positions:
//!
//! * **Formation A** — a tapered vertical spiral (the "tree").
//! * **Formation B** — a uniformly random cloud (the "scatter").
//!
//! plus an ornament kind, a colour, a rotation seed and a base scale.
//!
//! ## Quick start
//!
//! ```rust
//! use particle_field::{generate, generate_seeded, FieldConfig};
//!
//! // Unseeded: formation B and ornament kinds vary run to run.
//! let field = generate(&["/photos/1.jpg", "/photos/2.jpg"]);
//! assert_eq!(field.len(), FieldConfig::default().base_count + 10);
//! assert_eq!(field.get(0).and_then(|p| p.kind.image_ref()), Some("/photos/1.jpg"));
//!
//! // Seeded: byte-for-byte reproducible.
//! let a = generate_seeded(&["x"], 7);
//! let b = generate_seeded(&["x"], 7);
//! assert_eq!(a, b);
//! ```
//!
//! Regenerating is the only way to change a field; a [`ParticleSet`] is
//! immutable once built.

pub mod error;
pub mod palette;
pub mod formation;
pub mod field;

pub use error::{FieldError, Result};
pub use formation::{FieldConfig, MAX_PARTICLES};
pub use field::{
    generate, generate_seeded, generate_with,
    KindCounts, Particle, ParticleId, ParticleSet, SphereTone, VisualKind,
};

//! Render side: per-particle visuals and the sink the frame loop presents to.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::warn;

use particle_field::{palette, Particle, ParticleSet, VisualKind};

use crate::driver::FramePayload;
use crate::error::{Result, SceneError};

// ════════════════════════════════════════════════════════════════════════════
// Visual
// ════════════════════════════════════════════════════════════════════════════

/// What a particle looks like on screen.
#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    Sphere { color: u32 },
    Cube   { color: u32 },
    /// Red-and-white striped candy cane.
    Cane,
    /// A framed photo; `swatch` stands in for its pixels.
    Photo  { image_ref: String, swatch: u32 },
    /// Shown in place of a photo that could not be loaded.
    Placeholder,
}

impl Visual {
    /// Dominant colour, used by flat renderers.
    pub fn color(&self) -> u32 {
        match self {
            Visual::Sphere { color } | Visual::Cube { color } => *color,
            Visual::Cane                                       => palette::WHITE,
            Visual::Photo { swatch, .. }                       => *swatch,
            Visual::Placeholder                                => palette::WHITE,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ImageResolver
// ════════════════════════════════════════════════════════════════════════════

/// Loads the image behind a reference.
pub trait ImageResolver {
    /// A representative colour for the image.
    fn resolve(&self, image_ref: &str) -> Result<u32>;
}

/// Accepts URLs, data URIs and paths with an image extension; the swatch is
/// derived from the reference text so each photo gets a stable tint.
#[derive(Clone, Copy, Debug, Default)]
pub struct SwatchResolver;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

impl ImageResolver for SwatchResolver {
    fn resolve(&self, image_ref: &str) -> Result<u32> {
        let reference = image_ref.trim();
        let is_image = reference.starts_with("data:image/")
            || reference
                .rsplit_once('.')
                .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
        if !is_image {
            return Err(SceneError::Image {
                reference: image_ref.to_string(),
                reason:    "not an image reference".to_string(),
            });
        }

        let mut h = DefaultHasher::new();
        reference.hash(&mut h);
        let bits = h.finish();
        // Keep swatches mid-bright so the frame stays readable.
        let channel = |shift: u32| 0x40 + ((bits >> shift) & 0x7F) as u32;
        Ok(0xFF00_0000 | channel(0) << 16 | channel(8) << 8 | channel(16))
    }
}

/// Build the visual for one particle.  A photo that fails to resolve gets
/// [`Visual::Placeholder`].
pub fn build_visual<R: ImageResolver + ?Sized>(particle: &Particle, resolver: &R) -> Visual {
    match &particle.kind {
        VisualKind::Sphere { tone } => Visual::Sphere { color: tone.color() },
        VisualKind::Cube            => Visual::Cube { color: particle.color },
        VisualKind::Cane            => Visual::Cane,
        VisualKind::Photo { image_ref } => match resolver.resolve(image_ref) {
            Ok(swatch) => Visual::Photo { image_ref: image_ref.clone(), swatch },
            Err(e) => {
                warn!(particle = particle.id.as_str(), error = %e, "photo unavailable; using placeholder");
                Visual::Placeholder
            }
        },
    }
}

pub fn build_visuals<R: ImageResolver + ?Sized>(field: &ParticleSet, resolver: &R) -> Vec<Visual> {
    field.iter().map(|p| build_visual(p, resolver)).collect()
}

// ════════════════════════════════════════════════════════════════════════════
// RenderSink
// ════════════════════════════════════════════════════════════════════════════

/// Consumer of frame payloads.
pub trait RenderSink {
    /// Prepare visuals for a new field.  Returns the indices that are ready;
    /// only those get animated.
    fn bind_field(&mut self, field: &ParticleSet) -> Vec<usize>;

    fn present(&mut self, frame: &FramePayload);
}

/// Keeps everything it is given.  Used by tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingSink<R = SwatchResolver> {
    resolver:     R,
    /// Cap on how many particles report ready, to exercise partial binds.
    pub ready_limit: Option<usize>,
    pub visuals:     Vec<Visual>,
    pub binds:       usize,
    pub frames:      Vec<FramePayload>,
}

impl RecordingSink {
    pub fn new() -> Self { RecordingSink::default() }
}

impl<R: ImageResolver> RecordingSink<R> {
    pub fn with_resolver(resolver: R) -> Self {
        RecordingSink { resolver, ready_limit: None, visuals: Vec::new(), binds: 0, frames: Vec::new() }
    }

    pub fn last_frame(&self) -> Option<&FramePayload> { self.frames.last() }
}

impl<R: ImageResolver> RenderSink for RecordingSink<R> {
    fn bind_field(&mut self, field: &ParticleSet) -> Vec<usize> {
        self.binds += 1;
        self.visuals = build_visuals(field, &self.resolver);
        let ready = self.ready_limit.unwrap_or(field.len()).min(field.len());
        (0..ready).collect()
    }

    fn present(&mut self, frame: &FramePayload) {
        self.frames.push(frame.clone());
    }
}

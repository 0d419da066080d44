//! The ordered list of photo references the field is built from.

use tracing::info;

/// Photos shown when none are given on the command line.
pub fn default_images() -> Vec<String> {
    (1..=12).map(demo_image).collect()
}

/// Reference of the `n`th bundled demo photo.
pub fn demo_image(n: usize) -> String {
    format!("/photos/{}.jpg", n)
}

/// Image references plus a generation counter bumped on every change, so
/// the frame loop can tell when the field must be rebuilt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageLibrary {
    refs:       Vec<String>,
    generation: u64,
}

impl ImageLibrary {
    pub fn new(refs: Vec<String>) -> Self {
        ImageLibrary { refs, generation: 0 }
    }

    pub fn refs(&self) -> &[String] { &self.refs }
    pub fn len(&self) -> usize { self.refs.len() }
    pub fn is_empty(&self) -> bool { self.refs.is_empty() }
    pub fn generation(&self) -> u64 { self.generation }

    /// Append references in order.  Returns the new generation.
    pub fn append<I, S>(&mut self, refs: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.refs.len();
        self.refs.extend(refs.into_iter().map(Into::into));
        let added = self.refs.len() - before;
        if added > 0 {
            self.generation += 1;
            info!(added, total = self.refs.len(), generation = self.generation, "images appended");
        }
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_order_and_bumps_generation() {
        let mut lib = ImageLibrary::new(vec!["a.jpg".into()]);
        assert_eq!(lib.generation(), 0);
        assert_eq!(lib.append(["b.jpg", "c.jpg"]), 1);
        assert_eq!(lib.refs(), &["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(lib.append(vec![String::from("d.jpg")]), 2);
    }

    #[test]
    fn empty_append_is_not_a_change() {
        let mut lib = ImageLibrary::new(Vec::new());
        assert_eq!(lib.append(Vec::<String>::new()), 0);
        assert!(lib.is_empty());
    }

    #[test]
    fn defaults_are_the_twelve_demo_photos() {
        let imgs = default_images();
        assert_eq!(imgs.len(), 12);
        assert_eq!(imgs[0], "/photos/1.jpg");
        assert_eq!(imgs[11], demo_image(12));
    }
}

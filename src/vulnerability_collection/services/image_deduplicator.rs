use crate::vulnerability_collection::domain::ImageRef;
use std::collections::HashSet;

/// ImageDeduplicator service reducing a raw container list to unique images
pub struct ImageDeduplicator;

impl ImageDeduplicator {
    /// Returns every distinct reference exactly once, in first-seen order
    ///
    /// Blank references (an inventory entry without an image) are dropped.
    pub fn deduplicate<I>(images: I) -> Vec<ImageRef>
    where
        I: IntoIterator<Item = ImageRef>,
    {
        let mut seen = HashSet::new();
        images
            .into_iter()
            .filter(|image| !image.is_blank())
            .filter(|image| seen.insert(image.clone()))
            .collect()
    }
}

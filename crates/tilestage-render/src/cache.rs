//! Memoization of loaded tile images.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::LoadError;
use crate::source::{ImagePath, ImageSource};

/// Successful loads keyed by path. Failed loads are not remembered, so the
/// next draw of the same tile tries again.
#[derive(Debug)]
pub struct ImageCache<I> {
    images: HashMap<ImagePath, Rc<I>>,
    misses: usize,
}

impl<I> Default for ImageCache<I> {
    fn default() -> Self {
        Self {
            images: HashMap::new(),
            misses: 0,
        }
    }
}

impl<I> ImageCache<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached image at `path`, loading it from `source` on a miss.
    pub async fn get<S>(&mut self, source: &S, path: &ImagePath) -> Result<Rc<I>, LoadError>
    where
        S: ImageSource<Image = I>,
    {
        if let Some(image) = self.images.get(path) {
            return Ok(Rc::clone(image));
        }
        self.misses += 1;
        let image = Rc::new(source.load(path).await?);
        self.images.insert(path.clone(), Rc::clone(&image));
        Ok(image)
    }

    pub fn contains(&self, path: &ImagePath) -> bool {
        self.images.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// How many lookups went to the source.
    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}

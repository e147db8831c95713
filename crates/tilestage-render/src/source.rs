//! Image sources: where tile images come from.

use std::collections::HashMap;
use std::fmt;
use std::future::{Future, ready};
use std::path::PathBuf;

use image::RgbaImage;

use crate::error::LoadError;

/// The resource path of a tile image, e.g.
/// `/static/image/sprite/00/layer1/block/00/field/00.png`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImagePath(String);

impl ImagePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The path of `tile` in graphic set `cg` under `root`.
    pub fn for_tile(root: &str, cg: u8, tile: impl fmt::Display) -> Self {
        Self(format!("{}/{cg:02}/{tile}.png", root.trim_end_matches('/')))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loads decoded images by path. Loads may complete in any order; the
/// pipeline awaits them one at a time.
pub trait ImageSource {
    type Image;

    fn load(&self, path: &ImagePath) -> impl Future<Output = Result<Self::Image, LoadError>>;
}

/// Reads PNG files below a directory. The leading `/` of an image path is
/// taken relative to `root`.
#[derive(Clone, Debug)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &ImagePath) -> PathBuf {
        self.root.join(path.as_str().trim_start_matches('/'))
    }
}

impl ImageSource for FsImageSource {
    type Image = RgbaImage;

    fn load(&self, path: &ImagePath) -> impl Future<Output = Result<RgbaImage, LoadError>> {
        let file = self.resolve(path);
        let result = if file.is_file() {
            image::open(&file)
                .map(|img| img.to_rgba8())
                .map_err(|source| LoadError::Decode {
                    path: path.clone(),
                    source,
                })
        } else {
            Err(LoadError::NotFound(path.clone()))
        };
        ready(result)
    }
}

/// Serves images from memory. Useful for hosts that preload sprites and in
/// tests.
#[derive(Clone, Debug)]
pub struct MemoryImageSource<I> {
    images: HashMap<ImagePath, I>,
}

impl<I> Default for MemoryImageSource<I> {
    fn default() -> Self {
        Self {
            images: HashMap::new(),
        }
    }
}

impl<I> MemoryImageSource<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: ImagePath, image: I) {
        self.images.insert(path, image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl<I: Clone> ImageSource for MemoryImageSource<I> {
    type Image = I;

    fn load(&self, path: &ImagePath) -> impl Future<Output = Result<I, LoadError>> {
        ready(
            self.images
                .get(path)
                .cloned()
                .ok_or_else(|| LoadError::NotFound(path.clone())),
        )
    }
}

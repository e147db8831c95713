//! **tilestage-render**: the image cache and draw pipeline.
//!
//! Tiles are loaded through an [`ImageSource`], memoized in an
//! [`ImageCache`], and painted onto host-supplied [`Surface`]s. Every layer
//! is bound to two surfaces: the visible one and an off-screen render buffer.
//! Batch redraws are composed on the buffer and committed in one copy so
//! the visible layer never shows a half-painted frame.
//!
//! The pipeline is async without requiring an executor of its own: image
//! loads are awaited one after another, so the host may drive it with any
//! executor (or `pollster::block_on`).

pub mod cache;
pub mod error;
pub mod pipeline;
pub mod rgba;
pub mod source;
pub mod surface;

pub use cache::ImageCache;
pub use error::{LoadError, RenderError};
pub use pipeline::{Batch, DrainReport, DrawCommand, DrawJob, DrawQueue, Renderer, RendererConfig};
pub use rgba::{RgbaCanvas, RgbaSurface, composite};
pub use source::{FsImageSource, ImagePath, ImageSource, MemoryImageSource};
pub use surface::{Color, PixelRect, Surface, SurfaceProvider};

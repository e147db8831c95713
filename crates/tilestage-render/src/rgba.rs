//! An in-memory [`Surface`] backed by [`image::RgbaImage`].
//!
//! Used for headless rendering (stage snapshots) and as a reference backend
//! for hosts that blit pixel buffers themselves.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::surface::{Color, PixelRect, Surface, SurfaceProvider};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An RGBA pixel buffer with a visibility flag.
#[derive(Clone, Debug)]
pub struct RgbaSurface {
    pixels: RgbaImage,
    visible: bool,
}

impl RgbaSurface {
    /// A fully transparent, visible surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            visible: true,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// `rect` clipped to the surface, as pixel coordinate ranges.
    fn clip(&self, rect: PixelRect) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let x1 = rect.x.saturating_add(rect.width).min(self.pixels.width());
        let y1 = rect.y.saturating_add(rect.height).min(self.pixels.height());
        (rect.x.min(x1)..x1, rect.y.min(y1)..y1)
    }

    fn paint(&mut self, rect: PixelRect, px: Rgba<u8>) {
        let (xs, ys) = self.clip(rect);
        for y in ys {
            for x in xs.clone() {
                self.pixels.put_pixel(x, y, px);
            }
        }
    }
}

impl Surface for RgbaSurface {
    type Image = RgbaImage;

    fn clear(&mut self, rect: PixelRect) {
        self.paint(rect, TRANSPARENT);
    }

    fn fill(&mut self, rect: PixelRect, color: Color) {
        self.paint(rect, Rgba(color.to_rgba()));
    }

    fn draw_image(&mut self, image: &RgbaImage, rect: PixelRect) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let (x, y) = (i64::from(rect.x), i64::from(rect.y));
        if image.dimensions() == (rect.width, rect.height) {
            imageops::overlay(&mut self.pixels, image, x, y);
        } else {
            let scaled = imageops::resize(image, rect.width, rect.height, FilterType::Nearest);
            imageops::overlay(&mut self.pixels, &scaled, x, y);
        }
    }

    fn copy_from(&mut self, other: &Self, rect: PixelRect) {
        let (xs, ys) = self.clip(rect);
        for y in ys {
            for x in xs.clone() {
                if x < other.pixels.width() && y < other.pixels.height() {
                    self.pixels.put_pixel(x, y, *other.pixels.get_pixel(x, y));
                }
            }
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Hands out a fresh [`RgbaSurface`] of a fixed size for every name.
#[derive(Copy, Clone, Debug)]
pub struct RgbaCanvas {
    width: u32,
    height: u32,
}

impl RgbaCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl SurfaceProvider for RgbaCanvas {
    type Surface = RgbaSurface;

    fn surface(&mut self, _name: &str) -> Option<RgbaSurface> {
        Some(RgbaSurface::new(self.width, self.height))
    }
}

/// Flatten the visible surfaces, bottom first, onto an opaque `background`.
pub fn composite<'a>(
    width: u32,
    height: u32,
    background: Color,
    layers: impl IntoIterator<Item = &'a RgbaSurface>,
) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(width, height, Rgba(background.to_rgba()));
    for surface in layers.into_iter().filter(|s| s.is_visible()) {
        imageops::overlay(&mut out, surface.pixels(), 0, 0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn tile(size: u32, px: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(size, size, px)
    }

    #[test]
    fn draw_scales_to_cell() {
        let mut s = RgbaSurface::new(8, 8);
        s.draw_image(&tile(2, RED), PixelRect::new(4, 4, 4, 4));
        assert_eq!(*s.pixels().get_pixel(4, 4), RED);
        assert_eq!(*s.pixels().get_pixel(7, 7), RED);
        assert_eq!(*s.pixels().get_pixel(3, 3), TRANSPARENT);
    }

    #[test]
    fn clear_and_fill_clip_to_surface() {
        let mut s = RgbaSurface::new(4, 4);
        s.fill(PixelRect::new(2, 2, 10, 10), Color::SYSTEM);
        assert_eq!(*s.pixels().get_pixel(3, 3), Rgba([0x22, 0x22, 0x22, 255]));
        s.clear(PixelRect::new(3, 3, 1, 1));
        assert_eq!(*s.pixels().get_pixel(3, 3), TRANSPARENT);
        assert_eq!(*s.pixels().get_pixel(2, 2), Rgba([0x22, 0x22, 0x22, 255]));
    }

    #[test]
    fn copy_replaces_pixels() {
        let mut src = RgbaSurface::new(4, 4);
        src.fill(PixelRect::new(0, 0, 2, 2), Color::MENU);
        let mut dst = RgbaSurface::new(4, 4);
        dst.fill(PixelRect::new(0, 0, 4, 4), Color::BLANK);
        dst.copy_from(&src, PixelRect::new(0, 0, 4, 2));
        assert_eq!(*dst.pixels().get_pixel(1, 1), Rgba([255, 255, 255, 255]));
        assert_eq!(*dst.pixels().get_pixel(3, 1), TRANSPARENT);
        assert_eq!(*dst.pixels().get_pixel(3, 3), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn composite_skips_hidden_layers() {
        let mut bottom = RgbaSurface::new(2, 1);
        bottom.fill(PixelRect::new(0, 0, 2, 1), Color::MENU);
        let mut top = RgbaSurface::new(2, 1);
        top.draw_image(&tile(1, RED), PixelRect::new(1, 0, 1, 1));
        let mut hidden = RgbaSurface::new(2, 1);
        hidden.fill(PixelRect::new(0, 0, 2, 1), Color::SYSTEM);
        hidden.set_visible(false);

        let out = composite(2, 1, Color::BLANK, [&bottom, &top, &hidden]);
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*out.get_pixel(1, 0), RED);
    }
}

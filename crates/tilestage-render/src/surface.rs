//! Drawing surfaces: [`Color`], [`PixelRect`], [`Surface`] and
//! [`SurfaceProvider`].

use std::fmt;

use tilestage_core::{Point, Range};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGB colour packed into a `u32` (0x00RRGGBB).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// Background of empty menu cells and the load screen.
    pub const BLANK: Self = Self(0x000000);
    /// Menu text.
    pub const MENU: Self = Self(0xffffff);
    /// Dimming fill behind the item box.
    pub const SYSTEM: Self = Self(0x222222);

    /// Construct from individual RGB components.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Opaque RGBA channels.
    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), 0xFF]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PixelRect
// ---------------------------------------------------------------------------

/// A rectangle in surface pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The pixels of grid cell `p`.
    pub fn cell(p: Point, tile_size: u32) -> Self {
        Self::area(Range::new(p.x, p.y, p.x + 1, p.y + 1), tile_size)
    }

    /// The pixels covered by a range of grid cells. Negative coordinates are
    /// clamped to zero.
    pub fn area(r: Range, tile_size: u32) -> Self {
        let px = |v: i32| v.max(0) as u32 * tile_size;
        Self {
            x: px(r.min.x),
            y: px(r.min.y),
            width: px(r.max.x).saturating_sub(px(r.min.x)),
            height: px(r.max.y).saturating_sub(px(r.min.y)),
        }
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// A 2D drawing target bound to one layer or render buffer.
pub trait Surface {
    /// The decoded image type this surface can draw.
    type Image;

    /// Make the pixels of `rect` fully transparent.
    fn clear(&mut self, rect: PixelRect);

    /// Paint `rect` with an opaque colour.
    fn fill(&mut self, rect: PixelRect, color: Color);

    /// Draw `image` scaled into `rect`, blending over existing pixels.
    fn draw_image(&mut self, image: &Self::Image, rect: PixelRect);

    /// Copy the pixels of `rect` from `other`, replacing what is there.
    fn copy_from(&mut self, other: &Self, rect: PixelRect);

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;
}

/// Supplies surfaces by name: `layerN` for visible layers and `renderN`
/// for their render buffers.
pub trait SurfaceProvider {
    type Surface: Surface;

    fn surface(&mut self, name: &str) -> Option<Self::Surface>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette() {
        assert_eq!(Color::SYSTEM, Color::from_rgb(0x22, 0x22, 0x22));
        assert_eq!(Color::MENU.to_rgba(), [255, 255, 255, 255]);
        assert_eq!(Color::BLANK.to_string(), "#000000");
    }

    #[test]
    fn cell_and_area_rects() {
        assert_eq!(PixelRect::cell(Point::new(2, 1), 32), PixelRect::new(64, 32, 32, 32));
        assert_eq!(
            PixelRect::area(Range::new(1, 0, 14, 14), 32),
            PixelRect::new(32, 0, 13 * 32, 14 * 32)
        );
    }
}

//! Input messages: [`Msg`] and [`ModMask`].
//!
//! Gesture disambiguation happens in the host; the editor only sees a
//! discrete click or press-hold on a grid cell, timer ticks, and replies
//! from the content collaborator.

use crate::clock::Millis;
use crate::geom::Point;
use crate::payload::Reply;

// ---------------------------------------------------------------------------
// ModMask
// ---------------------------------------------------------------------------

/// Bitmask of modifier keys held during a click.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ModMask(pub u8);

impl ModMask {
    pub const NONE: Self = Self(0);
    /// Direct layer select: jump to the layer holding content at the cell.
    pub const SHIFT: Self = Self(1 << 0);
    pub const CTRL: Self = Self(1 << 1);
    /// Inspect: pick up the tile on the cell instead of placing.
    pub const ALT: Self = Self(1 << 2);
    pub const META: Self = Self(1 << 3);

    /// Whether this mask contains all bits of `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ModMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Msg
// ---------------------------------------------------------------------------

/// Everything the editor reacts to.
#[derive(Clone, Debug, PartialEq)]
pub enum Msg {
    /// A discrete selection or placement.
    Click {
        pos: Point,
        modifiers: ModMask,
        at: Millis,
    },
    /// A long press: removal, reset, decrement, or a menu command.
    PressHold { pos: Point, at: Millis },
    /// The host clock advanced. Expires notices.
    Tick(Millis),
    /// A decoded response from the content collaborator.
    Reply(Reply),
}

impl Msg {
    /// A click without modifiers.
    pub fn click(pos: Point, at: Millis) -> Self {
        Self::Click {
            pos,
            modifiers: ModMask::NONE,
            at,
        }
    }

    /// A click with modifiers.
    pub fn click_mod(pos: Point, modifiers: ModMask, at: Millis) -> Self {
        Self::Click { pos, modifiers, at }
    }

    pub fn press_hold(pos: Point, at: Millis) -> Self {
        Self::PressHold { pos, at }
    }

    /// The timestamp carried by the message, if any.
    pub fn time(&self) -> Option<Millis> {
        match self {
            Self::Click { at, .. } | Self::PressHold { at, .. } | Self::Tick(at) => Some(*at),
            Self::Reply(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_contains() {
        let m = ModMask::SHIFT | ModMask::ALT;
        assert!(m.contains(ModMask::ALT));
        assert!(!m.contains(ModMask::CTRL));
        assert!(ModMask::NONE.is_empty());
    }

    #[test]
    fn message_time() {
        assert_eq!(Msg::click(Point::ZERO, Millis(7)).time(), Some(Millis(7)));
        assert_eq!(Msg::Tick(Millis(9)).time(), Some(Millis(9)));
    }
}

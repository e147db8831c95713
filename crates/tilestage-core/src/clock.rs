//! Logical time.
//!
//! Messages carry a [`Millis`] timestamp supplied by the host, and transient
//! flags expire against it instead of relying on timer callbacks.

use std::fmt;
use std::ops::Add;

/// Milliseconds on the host's monotonic clock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(pub u64);

impl Millis {
    /// Scale a duration.
    #[inline]
    pub const fn times(self, n: u64) -> Self {
        Self(self.0.saturating_mul(n))
    }
}

impl Add for Millis {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A boolean that switches itself off at a deadline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpiringFlag {
    until: Option<Millis>,
}

impl ExpiringFlag {
    /// Whether the flag is still up at `now`.
    #[inline]
    pub fn is_set(&self, now: Millis) -> bool {
        self.until.is_some_and(|t| now < t)
    }

    /// Raise the flag until `now + duration`.
    pub fn arm(&mut self, now: Millis, duration: Millis) {
        self.until = Some(now + duration);
    }

    /// Debounce helper: returns `true` if the flag is already up, in which
    /// case the trigger should be dropped. Otherwise arms it and returns
    /// `false`.
    pub fn try_arm(&mut self, now: Millis, duration: Millis) -> bool {
        if self.is_set(now) {
            return true;
        }
        self.arm(now, duration);
        false
    }

    pub fn clear(&mut self) {
        self.until = None;
    }

    /// The deadline, if armed.
    pub fn deadline(&self) -> Option<Millis> {
        self.until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_expires() {
        let mut flag = ExpiringFlag::default();
        assert!(!flag.is_set(Millis(0)));
        flag.arm(Millis(10), Millis(200));
        assert!(flag.is_set(Millis(10)));
        assert!(flag.is_set(Millis(209)));
        assert!(!flag.is_set(Millis(210)));
    }

    #[test]
    fn try_arm_drops_while_set() {
        let mut flag = ExpiringFlag::default();
        assert!(!flag.try_arm(Millis(0), Millis(200)));
        assert!(flag.try_arm(Millis(100), Millis(200)));
        // A dropped trigger does not extend the window.
        assert_eq!(flag.deadline(), Some(Millis(200)));
        assert!(!flag.try_arm(Millis(200), Millis(200)));
        assert_eq!(flag.deadline(), Some(Millis(400)));
    }

    #[test]
    fn clear_lowers_flag() {
        let mut flag = ExpiringFlag::default();
        flag.arm(Millis(0), Millis(50));
        flag.clear();
        assert!(!flag.is_set(Millis(1)));
    }
}

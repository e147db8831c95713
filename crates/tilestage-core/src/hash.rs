//! Change tracking.
//!
//! The stage layers are serialized as a JSON array of their wire grids and
//! hashed with the classic `h * 31 + c` string hash over UTF-16 code units,
//! wrapping at 32 bits. Equal content always hashes equal.

use serde_json::Value;

use crate::grid::GridStore;
use crate::layer::LayerId;

/// Hash the content of `layers`, in the given order.
pub fn stage_hash(store: &GridStore, layers: &[LayerId]) -> i32 {
    let grids: Vec<Vec<Vec<String>>> = layers.iter().map(|&id| store.rows(id)).collect();
    string_hash(&Value::from(grids).to_string())
}

fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)))
}

/// Remembers the hash of the last loaded or saved content.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    saved: Option<i32>,
}

impl ChangeTracker {
    /// Record the current content as saved.
    pub fn mark_saved(&mut self, store: &GridStore, layers: &[LayerId]) {
        self.saved = Some(stage_hash(store, layers));
    }

    /// Whether the content differs from what was last recorded. Content
    /// that was never recorded counts as dirty.
    pub fn is_dirty(&self, store: &GridStore, layers: &[LayerId]) -> bool {
        self.saved != Some(stage_hash(store, layers))
    }

    pub fn saved(&self) -> Option<i32> {
        self.saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;

    const STAGE: [LayerId; 3] = [LayerId(1), LayerId(2), LayerId(3)];

    fn store() -> GridStore {
        GridStore::new(Point::new(3, 2), STAGE)
    }

    #[test]
    fn matches_java_string_hash() {
        assert_eq!(string_hash(""), 0);
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("hello"), 99162322);
        assert_eq!(string_hash("hello world"), 1794106052);
        assert_eq!(string_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn serialization_is_plain_json() {
        let s = store();
        let grids: Vec<Vec<Vec<String>>> = STAGE.iter().map(|&id| s.rows(id)).collect();
        assert_eq!(
            Value::from(grids).to_string(),
            r#"[[["","",""],["","",""]],[["","",""],["","",""]],[["","",""],["","",""]]]"#
        );
    }

    #[test]
    fn hash_is_pure_and_detects_changes() {
        let mut s = store();
        let before = stage_hash(&s, &STAGE);
        assert_eq!(before, stage_hash(&s.clone(), &STAGE));
        s.set(LayerId(2), Point::new(1, 1), "layer2/tree/00".parse().unwrap());
        assert_ne!(before, stage_hash(&s, &STAGE));
        s.clear(LayerId(2), Point::new(1, 1));
        assert_eq!(before, stage_hash(&s, &STAGE));
    }

    #[test]
    fn tracker_reports_dirty() {
        let mut s = store();
        let mut tracker = ChangeTracker::default();
        assert!(tracker.is_dirty(&s, &STAGE));
        tracker.mark_saved(&s, &STAGE);
        assert!(!tracker.is_dirty(&s, &STAGE));
        s.set(LayerId(1), Point::ZERO, "layer1/block/00/field/00".parse().unwrap());
        assert!(tracker.is_dirty(&s, &STAGE));
    }
}

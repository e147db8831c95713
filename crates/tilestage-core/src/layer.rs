//! Layer identifiers and the fixed layer groups of the editor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const LAYER_PREFIX: &str = "layer";
const BUFFER_PREFIX: &str = "render";

/// One plane in the stacking order, named `layerN` on the wire.
///
/// Higher numbers stack above lower ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayerId(pub u8);

impl LayerId {
    #[inline]
    pub const fn new(n: u8) -> Self {
        Self(n)
    }

    /// Stacking index.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Name of the visible surface bound to this layer.
    pub fn surface_name(self) -> String {
        self.to_string()
    }

    /// Name of the off-screen render buffer paired with this layer: the
    /// `layer` token replaced by `render`.
    pub fn buffer_name(self) -> String {
        format!("{BUFFER_PREFIX}{}", self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LAYER_PREFIX}{}", self.0)
    }
}

impl FromStr for LayerId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        s.strip_prefix(LAYER_PREFIX)
            .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|n| n.parse().ok())
            .map(Self)
            .ok_or_else(|| Error::UnknownLayer(s.to_string()))
    }
}

impl TryFrom<String> for LayerId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

impl From<LayerId> for String {
    fn from(id: LayerId) -> Self {
        id.to_string()
    }
}

/// The partition of layers into editable stage content and overlays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerGroups {
    /// Editable stage layers, bottom to top. Persisted and hashed.
    pub stage: Vec<LayerId>,
    /// Menu overlay: icons, the held-item slot, notices.
    pub menu: LayerId,
    /// Dimming fill shown behind the item box.
    pub fill: LayerId,
    /// Item-box picker overlay.
    pub item_box: LayerId,
    /// Topmost plane, blanked while the game loads.
    pub screen: LayerId,
    /// Every layer bound to a drawing surface, bottom to top.
    pub all: Vec<LayerId>,
}

impl Default for LayerGroups {
    fn default() -> Self {
        Self {
            stage: vec![LayerId(1), LayerId(2), LayerId(3)],
            menu: LayerId(5),
            fill: LayerId(6),
            item_box: LayerId(7),
            screen: LayerId(8),
            all: (0..=8).map(LayerId).collect(),
        }
    }
}

impl LayerGroups {
    /// Whether `layer` holds editable stage content.
    #[inline]
    pub fn is_stage(&self, layer: LayerId) -> bool {
        self.stage.contains(&layer)
    }

    /// Layers rewritten when the block variant cycles: the stage plus the
    /// item box.
    pub fn make(&self) -> Vec<LayerId> {
        let mut layers = self.stage.clone();
        layers.push(self.item_box);
        layers
    }

    /// Overlays shown while the item box is open.
    pub fn system(&self) -> [LayerId; 2] {
        [self.fill, self.item_box]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_names_round_trip() {
        let id: LayerId = "layer3".parse().unwrap();
        assert_eq!(id, LayerId(3));
        assert_eq!(id.to_string(), "layer3");
        assert_eq!(id.buffer_name(), "render3");
    }

    #[test]
    fn bad_layer_names_are_rejected() {
        for s in ["", "layer", "render1", "layerx", "layer-1", "layer999"] {
            assert!(s.parse::<LayerId>().is_err(), "{s} parsed");
        }
    }

    #[test]
    fn default_groups() {
        let groups = LayerGroups::default();
        assert!(groups.is_stage(LayerId(2)));
        assert!(!groups.is_stage(groups.menu));
        assert_eq!(groups.make(), vec![LayerId(1), LayerId(2), LayerId(3), LayerId(7)]);
        assert_eq!(groups.system(), [LayerId(6), LayerId(7)]);
        assert_eq!(groups.all.last(), Some(&groups.screen));
    }

    #[test]
    fn layer_id_serializes_as_name() {
        let json = serde_json::to_string(&LayerId(5)).unwrap();
        assert_eq!(json, r#""layer5""#);
        let back: LayerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LayerId(5));
    }
}

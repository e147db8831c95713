//! The read-only metadata registry.
//!
//! Loaded once from the metadata payload and never mutated afterwards:
//!
//! ```json
//! {
//!   "sprite": { "layer2/tree/00": { "rotateItem": "layer2/tree/01" } },
//!   "position": { "item": { "col": 14, "row": 1 } },
//!   "positionRange": { "stage": { "start": { "col": 1, "row": 0 }, "end": { "col": 13, "row": 13 } } },
//!   "lastBlock": 5,
//!   "lastCG": 1,
//!   "timeout": 100,
//!   "demo": false,
//!   "debug": { "mouseDebug": false }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::error::Error;
use crate::geom::{Point, Region};
use crate::tile::TileRef;

/// Per-tile attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileAttributes {
    /// The reference produced by clicking the same tile again in place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_item: Option<TileRef>,
    /// Rendering substitute. Never used for identity comparisons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<TileRef>,
}

/// Which numbered family a cycling operation walks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// Terrain block family, encoded in `…/block/VV/…` references.
    Block,
    /// Alternate graphic set.
    Cg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct AreaSpec {
    start: Point,
    end: Point,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct DebugFlags {
    #[serde(rename = "mouseDebug", default)]
    mouse_debug: bool,
}

fn default_timeout() -> u64 {
    100
}

/// Tile attributes, named regions and variant limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaRegistry {
    #[serde(default)]
    sprite: BTreeMap<TileRef, TileAttributes>,
    #[serde(default)]
    position: BTreeMap<String, Point>,
    #[serde(default)]
    position_range: BTreeMap<String, AreaSpec>,
    #[serde(default)]
    last_block: u8,
    #[serde(rename = "lastCG", default)]
    last_cg: u8,
    #[serde(default = "default_timeout")]
    timeout: u64,
    #[serde(default)]
    demo: bool,
    #[serde(default)]
    debug: DebugFlags,
}

impl Default for MetaRegistry {
    fn default() -> Self {
        Self {
            sprite: BTreeMap::new(),
            position: BTreeMap::new(),
            position_range: BTreeMap::new(),
            last_block: 0,
            last_cg: 0,
            timeout: default_timeout(),
            demo: false,
            debug: DebugFlags::default(),
        }
    }
}

impl MetaRegistry {
    /// Parse the metadata payload.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    /// Attributes of `tile`. Every tile stored on a stage layer must have an
    /// entry.
    pub fn tile_attributes(&self, tile: &TileRef) -> Result<&TileAttributes, Error> {
        self.sprite
            .get(tile)
            .ok_or_else(|| Error::UnknownTile(tile.to_string()))
    }

    /// Whether `tile` has an entry at all.
    pub fn knows(&self, tile: &TileRef) -> bool {
        self.sprite.contains_key(tile)
    }

    /// The declared rotation target of `tile`.
    pub fn rotate_target(&self, tile: &TileRef) -> Result<Option<&TileRef>, Error> {
        Ok(self.tile_attributes(tile)?.rotate_item.as_ref())
    }

    /// The reference whose image is drawn for `tile`: its alpha substitute,
    /// or the tile itself.
    pub fn render_ref<'a>(&'a self, tile: &'a TileRef) -> Result<&'a TileRef, Error> {
        Ok(self.tile_attributes(tile)?.alpha.as_ref().unwrap_or(tile))
    }

    /// A named single-cell hotspot.
    pub fn hotspot(&self, name: &str) -> Result<Region, Error> {
        self.position
            .get(name)
            .map(|&p| Region::Point(p))
            .ok_or_else(|| Error::UnknownRegion(name.to_string()))
    }

    /// A named closed rectangle.
    pub fn area(&self, name: &str) -> Result<Region, Error> {
        self.position_range
            .get(name)
            .map(|a| Region::Area {
                start: a.start,
                end: a.end,
            })
            .ok_or_else(|| Error::UnknownRegion(name.to_string()))
    }

    /// Whether `p` hits the hotspot `name`. Missing hotspots never hit.
    pub fn at_hotspot(&self, name: &str, p: Point) -> bool {
        self.position.get(name) == Some(&p)
    }

    /// Whether `p` lies in the area `name`. Missing areas never hit.
    pub fn in_area(&self, name: &str, p: Point) -> bool {
        self.area(name).is_ok_and(|r| r.contains(p))
    }

    /// All hotspots sorted by name.
    pub fn hotspots(&self) -> impl Iterator<Item = (&str, Point)> + '_ {
        self.position.iter().map(|(name, &p)| (name.as_str(), p))
    }

    /// Highest valid index of a variant family.
    pub fn last_variant(&self, kind: VariantKind) -> u8 {
        match kind {
            VariantKind::Block => self.last_block,
            VariantKind::Cg => self.last_cg,
        }
    }

    /// Base duration that debounce, confirm and notice windows scale.
    pub fn timeout(&self) -> Millis {
        Millis(self.timeout)
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub fn mouse_debug(&self) -> bool {
        self.debug.mouse_debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r#"{
        "sprite": {
            "layer1/block/00/field/00": { "alpha": "layer1/block/00/field/00_alpha" },
            "layer2/arrow/00": { "rotateItem": "layer2/arrow/01" },
            "layer2/arrow/01": {}
        },
        "position": { "item": { "col": 14, "row": 1 }, "block": { "col": 14, "row": 3 } },
        "positionRange": {
            "stage": { "start": { "col": 1, "row": 0 }, "end": { "col": 13, "row": 13 } }
        },
        "lastBlock": 5,
        "lastCG": 1,
        "debug": { "mouseDebug": true }
    }"#;

    fn tile(s: &str) -> TileRef {
        s.parse().unwrap()
    }

    #[test]
    fn parses_payload() {
        let meta = MetaRegistry::from_json(META).unwrap();
        assert_eq!(meta.last_variant(VariantKind::Block), 5);
        assert_eq!(meta.last_variant(VariantKind::Cg), 1);
        assert_eq!(meta.timeout(), Millis(100));
        assert!(!meta.is_demo());
        assert!(meta.mouse_debug());
    }

    #[test]
    fn rotation_and_alpha() {
        let meta = MetaRegistry::from_json(META).unwrap();
        let arrow = tile("layer2/arrow/00");
        assert_eq!(meta.rotate_target(&arrow).unwrap(), Some(&tile("layer2/arrow/01")));
        assert_eq!(meta.rotate_target(&tile("layer2/arrow/01")).unwrap(), None);
        let field = tile("layer1/block/00/field/00");
        assert_eq!(meta.render_ref(&field).unwrap(), &tile("layer1/block/00/field/00_alpha"));
        assert_eq!(meta.render_ref(&arrow).unwrap(), &arrow);
    }

    #[test]
    fn unknown_tile_is_an_error() {
        let meta = MetaRegistry::from_json(META).unwrap();
        let err = meta.tile_attributes(&tile("layer3/door/00")).unwrap_err();
        assert!(matches!(err, Error::UnknownTile(ref s) if s == "layer3/door/00"));
    }

    #[test]
    fn regions() {
        let meta = MetaRegistry::from_json(META).unwrap();
        assert_eq!(meta.hotspot("item").unwrap(), Region::Point(Point::new(14, 1)));
        assert!(meta.in_area("stage", Point::new(13, 13)));
        assert!(!meta.in_area("stage", Point::new(0, 0)));
        assert!(!meta.in_area("itembox", Point::new(5, 5)));
        assert!(matches!(meta.area("itembox"), Err(Error::UnknownRegion(_))));
        let names: Vec<&str> = meta.hotspots().map(|(n, _)| n).collect();
        assert_eq!(names, ["block", "item"]);
    }
}

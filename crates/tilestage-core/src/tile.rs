//! Typed tile references.
//!
//! A tile reference names a drawable tile with a slash-separated path such as
//! `layer1/block/00/field/00`: the owning layer, a category, an optional
//! two-digit variant and free-form detail segments. Strings are parsed once
//! at the content boundary; everything inside the editor works on
//! [`TileRef`] values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::layer::LayerId;

/// A parsed tile reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TileRef {
    layer: LayerId,
    category: String,
    variant: Option<u8>,
    detail: Vec<String>,
}

impl TileRef {
    /// Build a reference from its parts.
    pub fn new(
        layer: LayerId,
        category: impl Into<String>,
        variant: Option<u8>,
        detail: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            layer,
            category: category.into(),
            variant,
            detail: detail.into_iter().map(Into::into).collect(),
        }
    }

    /// The layer this tile is painted on.
    #[inline]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    pub fn variant(&self) -> Option<u8> {
        self.variant
    }

    #[inline]
    pub fn detail(&self) -> &[String] {
        &self.detail
    }

    /// Whether this tile belongs to `category` and carries a variant.
    #[inline]
    pub fn is_variant_of(&self, category: &str) -> bool {
        self.variant.is_some() && self.category == category
    }

    /// The same reference with its variant replaced. References without a
    /// variant are returned unchanged.
    pub fn with_variant(&self, variant: u8) -> Self {
        let mut tile = self.clone();
        if tile.variant.is_some() {
            tile.variant = Some(variant);
        }
        tile
    }
}

fn is_variant_segment(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for TileRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedTile(s.to_string());
        let mut segments = s.split('/');
        let layer: LayerId = segments
            .next()
            .ok_or_else(malformed)?
            .parse()
            .map_err(|_| malformed())?;
        let category = segments.next().filter(|c| !c.is_empty()).ok_or_else(malformed)?;
        let mut rest: Vec<&str> = segments.collect();
        if rest.iter().any(|seg| seg.is_empty()) {
            return Err(malformed());
        }
        let variant = match rest.first() {
            Some(seg) if is_variant_segment(seg) => {
                let v = seg.parse().map_err(|_| malformed())?;
                rest.remove(0);
                Some(v)
            }
            _ => None,
        };
        Ok(Self::new(layer, category, variant, rest))
    }
}

impl fmt::Display for TileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layer, self.category)?;
        if let Some(v) = self.variant {
            write!(f, "/{v:02}")?;
        }
        for seg in &self.detail {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for TileRef {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Error> {
        s.parse()
    }
}

impl From<TileRef> for String {
    fn from(tile: TileRef) -> Self {
        tile.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_block_reference() {
        let tile: TileRef = "layer1/block/03/field/00".parse().unwrap();
        assert_eq!(tile.layer(), LayerId(1));
        assert_eq!(tile.category(), "block");
        assert_eq!(tile.variant(), Some(3));
        assert_eq!(tile.detail(), ["field", "00"]);
        assert_eq!(tile.to_string(), "layer1/block/03/field/00");
    }

    #[test]
    fn non_variant_segments_stay_in_detail() {
        for s in ["layer2/tree/big/01", "layer0/cg/00", "layer3/door/000", "layer1/block/00/field/00_alpha"] {
            let tile: TileRef = s.parse().unwrap();
            assert_eq!(tile.to_string(), s);
        }
        let tile: TileRef = "layer3/door/000".parse().unwrap();
        assert_eq!(tile.variant(), None);
    }

    #[test]
    fn with_variant_touches_only_the_variant() {
        let tile: TileRef = "layer3/block/00/pillar/00".parse().unwrap();
        assert_eq!(tile.with_variant(5).to_string(), "layer3/block/05/pillar/00");
        let plain: TileRef = "layer2/tree/big".parse().unwrap();
        assert_eq!(plain.with_variant(5), plain);
    }

    #[test]
    fn rejects_malformed_references() {
        for s in ["", "block/00", "layer1", "layer1/", "layer1//00", "layerx/block"] {
            assert!(s.parse::<TileRef>().is_err(), "{s} parsed");
        }
    }

    #[test]
    fn serializes_as_string() {
        let tile: TileRef = serde_json::from_str(r#""layer2/item/01/key""#).unwrap();
        assert!(tile.is_variant_of("item"));
        assert_eq!(serde_json::to_string(&tile).unwrap(), r#""layer2/item/01/key""#);
    }
}

//! **tilestage-core**: core types for the layered tile-stage editor.
//!
//! This crate provides the data model shared by the renderer and the editor:
//! geometry primitives, layer identifiers, typed tile references, the
//! multi-layer grid store, the metadata registry, change tracking, the
//! logical clock, input messages, and the payloads exchanged with the
//! external content collaborator.

pub mod clock;
pub mod error;
pub mod geom;
pub mod grid;
pub mod hash;
pub mod layer;
pub mod messages;
pub mod meta;
pub mod payload;
pub mod tile;

pub use clock::{ExpiringFlag, Millis};
pub use error::Error;
pub use geom::{Point, Range, Region};
pub use grid::{GridStore, TileGrid};
pub use hash::{ChangeTracker, stage_hash};
pub use layer::{LayerGroups, LayerId};
pub use messages::{ModMask, Msg};
pub use meta::{MetaRegistry, TileAttributes, VariantKind};
pub use payload::{Envelope, LayerRows, Reply, Request};
pub use tile::TileRef;

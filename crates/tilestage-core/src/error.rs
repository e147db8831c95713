//! The core [`Error`] type.

use thiserror::Error;

use crate::geom::Point;
use crate::layer::LayerId;

/// Contract violations detected at the content boundary.
///
/// These indicate that the external content source handed the editor data
/// it cannot honour; they are propagated to the caller rather than
/// recovered locally.
#[derive(Debug, Error)]
pub enum Error {
    /// A string that should be a tile reference does not parse.
    #[error("malformed tile reference `{0}`")]
    MalformedTile(String),

    /// A string that should be a layer name does not parse.
    #[error("unknown layer `{0}`")]
    UnknownLayer(String),

    /// A tile reference has no entry in the metadata registry.
    #[error("no metadata registered for tile `{0}`")]
    UnknownTile(String),

    /// A named hotspot or area is not present in the metadata.
    #[error("no region named `{0}`")]
    UnknownRegion(String),

    /// A wholesale layer load does not match the grid dimensions.
    #[error("{layer} has shape {found}, expected {expected}")]
    GridShape {
        layer: LayerId,
        expected: Point,
        found: Point,
    },

    /// The collaborator reported a failure in its response envelope.
    #[error("content service error: {0}")]
    Service(String),

    /// The response envelope carried no `data` field.
    #[error("response has no data")]
    MissingData,

    /// A payload failed to (de)serialize.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

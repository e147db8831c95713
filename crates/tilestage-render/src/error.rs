use thiserror::Error;

use tilestage_core::LayerId;

use crate::source::ImagePath;

/// A tile image could not be produced.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("image `{0}` not found")]
    NotFound(ImagePath),

    #[error("failed to read `{path}`")]
    Decode {
        path: ImagePath,
        #[source]
        source: image::ImageError,
    },
}

/// Failures of the draw pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The host did not supply a surface the renderer needs.
    #[error("no surface named `{0}`")]
    MissingSurface(String),

    /// A draw command addressed a layer the renderer was not bound to.
    #[error("{0} is not bound to a surface")]
    UnboundLayer(LayerId),
}

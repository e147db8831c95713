use thiserror::Error;

use crate::app::ServiceError;

/// Everything that can stop an editor operation.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The content source broke a data contract: malformed or unknown tile,
    /// unknown region, wrong grid shape.
    #[error(transparent)]
    Contract(#[from] tilestage_core::Error),

    #[error(transparent)]
    Render(#[from] tilestage_render::RenderError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

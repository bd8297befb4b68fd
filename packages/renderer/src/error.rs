use thiserror::Error;

use crate::surface::SurfaceError;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("container element must not be null")]
    MissingSurface,

    #[error("renderer is not initialized")]
    NotInitialized,

    #[error("renderer has been disposed")]
    Disposed,

    #[error("invalid chart configuration")]
    InvalidConfig,

    #[error("snapshot requested before initialization")]
    ExportBeforeInit,

    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),
}

//! Rendering error types.

use thiserror::Error;

use crate::graphics_object::GraphicsObjectKind;

/// Errors that can occur while assembling or drawing graphics objects.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A primitive does not fit the graphics object's kind.
    #[error("cannot add {found:?} primitive to {expected:?} graphics object '{object}'")]
    PrimitiveKindMismatch {
        object: String,
        expected: GraphicsObjectKind,
        found: GraphicsObjectKind,
    },

    /// Executing a compiled graphics object failed.
    #[error("execute failed for '{0}'")]
    ExecuteFailed(String),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

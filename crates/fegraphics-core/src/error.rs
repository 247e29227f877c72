//! Error types for fegraphics-rs.

use thiserror::Error;

/// The main error type for graphic configuration and conversion.
#[derive(Error, Debug)]
pub enum GraphicsError {
    /// An argument was out of range or otherwise unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation does not apply to this graphic type.
    #[error("{operation} is not valid for {graphic_type} graphics")]
    WrongGraphicType {
        operation: &'static str,
        graphic_type: String,
    },

    /// A field has an unsuitable number of components.
    #[error("field '{field}' has {actual} components, expected {expected}")]
    ComponentCount {
        field: String,
        expected: &'static str,
        actual: usize,
    },

    /// No coordinate field was set and none could be defaulted.
    #[error("missing coordinate field")]
    MissingCoordinateField,

    /// An iso-surface graphic was built before an iso-scalar field was set.
    #[error("missing iso-scalar field")]
    MissingIsoScalarField,

    /// A streamline graphic was built without a stream vector field.
    #[error("missing stream vector field")]
    MissingStreamVectorField,

    /// Explicit iso-values were combined with a range specification.
    #[error("explicit iso-values cannot be combined with a first/last/count range")]
    IsoValueConflict,

    /// A field could not be wrapped into rectangular cartesian form.
    #[error("could not wrap field '{0}'")]
    FieldWrap(String),

    /// The graphics object could not be created.
    #[error("could not create graphics object: {0}")]
    GraphicsObjectCreation(String),

    /// The graphic was not found in the list.
    #[error("graphic '{0}' is not in the list")]
    NotInList(String),

    /// A geometry generation pass failed.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Configuration (de)serialization error.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// A specialized Result type for fegraphics-rs operations.
pub type Result<T> = std::result::Result<T, GraphicsError>;

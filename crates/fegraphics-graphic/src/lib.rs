//! Graphic descriptors and their conversion to graphics objects.
//!
//! This crate provides:
//! - [`Graphic`]: a declarative description of one visualization layer
//! - [`GraphicList`]: graphics of one rendition in draw order
//! - Change tracking from region, field, material and selection edits
//! - [`ConversionContext`] and the conversion driver that builds graphics objects
//! - [`SampledGeometry`]: the built-in geometry generators

// Geometry code casts between indices, counts and coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Generators take the full set of evaluation inputs
#![allow(clippy::too_many_arguments)]
#![allow(clippy::too_many_lines)]

mod change_tracking;
mod compare;
mod conversion;
mod describe;
mod display;
pub mod generator;
mod graphic;
pub mod kind;
mod list;
pub mod types;
mod xi_points;

pub use conversion::ConversionContext;
pub use generator::{
    ElementFields, GeometryGenerator, GlyphFields, GlyphSample, SampledGeometry, StreamlineFields,
};
pub use graphic::Graphic;
pub use kind::{
    CylinderParameters, ElementPointParameters, ElementSampling, GlyphParameters, GraphicKind,
    IsoParameters, IsoValues, PointAttributes, StreamlineParameters, StreamlineSeed,
    VolumeParameters,
};
pub use list::GraphicList;
pub use types::{
    DescriptionDetail, GlyphScalingMode, GraphicChange, GraphicType, RenditionId,
    StreamlineDataType, StreamlineType, UseElementType,
};
pub use xi_points::element_xi_points;

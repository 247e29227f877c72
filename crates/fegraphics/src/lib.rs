//! fegraphics: conversion of finite-element fields into renderable graphics.
//!
//! A [`Graphic`] describes one layer of visualization over a finite-element
//! region: which part of the mesh to draw (nodes, lines, faces, elements,
//! seed points), which fields to evaluate, and how the result looks. A
//! [`Rendition`] keeps the graphics of one region in draw order, routes change
//! notifications to them and rebuilds their graphics objects on demand.
//!
//! # Quick Start
//!
//! ```
//! use fegraphics::*;
//!
//! let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
//! let mut rendition = Rendition::new(RenditionId(1), Options::default());
//! rendition.set_default_coordinate_field(Some(coordinates));
//! let lines = rendition.create_graphic(GraphicType::Lines);
//! rendition.add_graphic(lines, 0);
//!
//! let generator = SampledGeometry::new();
//! let ctx = ConversionContext::new(&region, &region, &generator);
//! assert_eq!(rendition.build(&ctx), 0);
//!
//! let object = rendition.graphics().get(1).and_then(Graphic::graphics_object);
//! assert_eq!(object.map(GraphicsObject::primitive_names), Some(vec![1, 2]));
//! ```
//!
//! # Architecture
//!
//! - [`fegraphics_core`]: identifiers, field handles, the FE region and field
//!   module interfaces, change logs, selection and configuration
//! - [`fegraphics_render`]: graphics objects, primitives, materials, spectra,
//!   glyphs, tessellations and the renderer hooks
//! - [`fegraphics_graphic`]: graphic descriptors, lists, change tracking and
//!   the conversion driver

mod rendition;

pub use rendition::Rendition;

// Re-export core types
pub use fegraphics_core::{
    ChangeFlags, ChangeLog, CoordinateSystem, ElementId, ElementPointRangesIdentifier, FaceType,
    FeRegion, Field, FieldId, FieldModule, GraphicsError, Location, MemoryRegion, MultiRange,
    NodeId, Options, RebuildPolicy, RegionChanges, Result, SelectionSet, XiSamplingMode,
};

// Re-export render types
pub use fegraphics_render::{
    Bounds, Glyph, GlyphShape, GraphicsObject, GraphicsObjectKind, Material, MaterialRegistry,
    Primitive, RecordingRenderer, RenderCall, RenderError, RenderResult, RenderType, Renderer,
    SelectMode, Spectrum, SpectrumRegistry, Tessellation, TessellationChange,
};

// Re-export graphic types
pub use fegraphics_graphic::{
    element_xi_points, ConversionContext, CylinderParameters, DescriptionDetail,
    ElementPointParameters, ElementSampling, GeometryGenerator, Graphic, GraphicChange,
    GraphicKind, GraphicList, GraphicType, GlyphParameters, GlyphScalingMode, IsoParameters,
    IsoValues, RenditionId, SampledGeometry, StreamlineDataType, StreamlineParameters,
    StreamlineSeed, StreamlineType, UseElementType, VolumeParameters,
};

// Re-export glam types
pub use glam::{DVec3, Vec3};

/// Routes `log` output to stderr, filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

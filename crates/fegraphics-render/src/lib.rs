//! Generated geometry for fegraphics-rs.
//!
//! This crate holds everything a graphic produces and the shared resources it draws with:
//! - [`GraphicsObject`] containers of named [`Primitive`]s
//! - The per-element [`PrimitiveCache`] used for incremental rebuilds
//! - Material and spectrum registries with change logs
//! - Shared [`Glyph`]s with scoped change subscriptions
//! - [`Tessellation`] settings and volume textures
//! - The [`Renderer`] compile/execute hooks

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Vertex indices and sample counts fit in f32/u32; casts are intentional
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

pub mod cache;
pub mod error;
pub mod glyph;
pub mod graphics_object;
pub mod material;
pub mod primitive;
pub mod renderer;
pub mod spectrum;
pub mod tessellation;
pub mod volume_texture;

pub use cache::PrimitiveCache;
pub use error::{RenderError, RenderResult};
pub use glyph::{Glyph, GlyphShape, GlyphSubscription};
pub use graphics_object::{GraphicsObject, GraphicsObjectKind, RenderType, SelectMode};
pub use material::{Material, MaterialRegistry};
pub use primitive::{
    Bounds, DataValues, GlyphPoint, GlyphSet, Polyline, Primitive, Surface, Vertex, Voltex,
};
pub use renderer::{RecordingRenderer, RenderCall, Renderer};
pub use spectrum::{Spectrum, SpectrumRegistry};
pub use tessellation::{Tessellation, TessellationChange};
pub use volume_texture::VolumeTexture;

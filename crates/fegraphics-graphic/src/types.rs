//! Small enumerations describing graphics.

use std::fmt;

/// What a graphic draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicType {
    /// A glyph at every node.
    NodePoints,
    /// A glyph at every data point.
    DataPoints,
    /// Polylines along 1-D elements.
    Lines,
    /// Tubes around 1-D elements.
    Cylinders,
    /// Surface patches over 2-D elements.
    Surfaces,
    /// Contours of a scalar field.
    IsoSurfaces,
    /// Glyphs at sample points inside elements.
    ElementPoints,
    /// Traces following a vector field.
    Streamlines,
    /// A single glyph independent of the mesh.
    Static,
    /// Volume blocks over 3-D elements.
    Volumes,
}

impl GraphicType {
    /// Every graphic type.
    pub const ALL: [GraphicType; 10] = [
        Self::NodePoints,
        Self::DataPoints,
        Self::Lines,
        Self::Cylinders,
        Self::Surfaces,
        Self::IsoSurfaces,
        Self::ElementPoints,
        Self::Streamlines,
        Self::Static,
        Self::Volumes,
    ];

    /// Returns true for the types drawn with glyphs.
    #[must_use]
    pub fn is_point_like(self) -> bool {
        matches!(
            self,
            Self::NodePoints | Self::DataPoints | Self::ElementPoints | Self::Static
        )
    }

    /// Returns true for types generated element by element.
    #[must_use]
    pub fn uses_elements(self) -> bool {
        !matches!(self, Self::NodePoints | Self::DataPoints | Self::Static)
    }

    /// Command-style token used in descriptions.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::NodePoints => "node_points",
            Self::DataPoints => "data_points",
            Self::Lines => "lines",
            Self::Cylinders => "cylinders",
            Self::Surfaces => "surfaces",
            Self::IsoSurfaces => "iso_surfaces",
            Self::ElementPoints => "element_points",
            Self::Streamlines => "streamlines",
            Self::Static => "point",
            Self::Volumes => "volumes",
        }
    }
}

impl fmt::Display for GraphicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Cross-section of a streamline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamlineType {
    /// A plain polyline.
    #[default]
    Line,
    /// A flat ribbon of the streamline width.
    Ribbon,
    /// A tube with rectangular section.
    ExtrudedRectangle,
    /// A tube with elliptical section.
    ExtrudedEllipse,
    /// A tube with circular section.
    ExtrudedCircle,
}

impl StreamlineType {
    /// Command-style token used in descriptions.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Ribbon => "ribbon",
            Self::ExtrudedRectangle => "rectangle",
            Self::ExtrudedEllipse => "ellipse",
            Self::ExtrudedCircle => "cylinder",
        }
    }
}

/// What value colours a streamline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamlineDataType {
    /// No data values.
    #[default]
    NoData,
    /// The graphic data field.
    FieldScalar,
    /// Magnitude of the stream vector.
    MagnitudeScalar,
    /// Distance travelled along the trace.
    TravelScalar,
}

impl StreamlineDataType {
    /// Command-style token used in descriptions.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::NoData => "no_data",
            Self::FieldScalar => "field_scalar",
            Self::MagnitudeScalar => "magnitude_scalar",
            Self::TravelScalar => "travel_scalar",
        }
    }
}

/// How glyph sizes respond to the orientation/scale field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlyphScalingMode {
    /// Glyphs have the base size.
    #[default]
    Constant,
    /// All axes scale with one scalar.
    Scalar,
    /// The first axis scales with a vector magnitude.
    Vector,
    /// Each axis scales with its own vector.
    Axes,
    /// Scaling follows the field component layout.
    General,
}

impl GlyphScalingMode {
    /// Command-style token used in descriptions.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::Axes => "axes",
            Self::General => "general",
        }
    }
}

/// Element dimension selected by iso-surface and element point graphics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UseElementType {
    /// Top-level elements.
    #[default]
    Elements,
    /// 2-D elements.
    Faces,
    /// 1-D elements.
    Lines,
}

impl UseElementType {
    /// Nominal dimension: 3, 2 or 1.
    #[must_use]
    pub fn dimension(self) -> u8 {
        match self {
            Self::Elements => 3,
            Self::Faces => 2,
            Self::Lines => 1,
        }
    }

    /// Command-style token used in descriptions.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Elements => "use_elements",
            Self::Faces => "use_faces",
            Self::Lines => "use_lines",
        }
    }
}

/// How much of a graphic [`crate::Graphic::describe`] includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptionDetail {
    /// Only settings that shape the geometry.
    Geometry,
    /// Every setting.
    Complete,
    /// Every setting, prefixed with the list position.
    CompletePlusPosition,
}

/// Why a graphic needs attention, from least to most work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum GraphicChange {
    /// Nothing to do.
    #[default]
    None,
    /// The scene must redraw; geometry is unaffected.
    Redraw,
    /// Display state of the graphics object must be recompiled.
    Recompile,
    /// Selection highlighting must be recomputed.
    Selection,
    /// Some primitives must be regenerated; the rest can be reused.
    PartialRebuild,
    /// All primitives must be regenerated.
    FullRebuild,
}

/// Identifier of the rendition owning a graphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenditionId(pub u64);

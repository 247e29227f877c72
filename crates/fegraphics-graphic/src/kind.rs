//! Type-specific graphic parameters.
//!
//! [`GraphicKind`] is a closed sum over the ten graphic types. Parameters that
//! only make sense for one type live only in that variant, so a lines graphic
//! simply has nowhere to store an iso-scalar or stream vector field.

use fegraphics_core::{
    same_field, ElementId, Field, GraphicsError, NodeDomain, Result, XiSamplingMode,
};
use fegraphics_render::{Glyph, VolumeTexture};

use crate::types::{
    GlyphScalingMode, GraphicType, StreamlineDataType, StreamlineType, UseElementType,
};

/// Glyph placement and scaling for point-like graphics.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphParameters {
    /// Glyph drawn at each point.
    pub glyph: Option<Glyph>,
    /// How sizes respond to the orientation/scale field.
    pub scaling_mode: GlyphScalingMode,
    /// Glyph point placed on the sample location, in glyph units.
    pub centre: [f64; 3],
    /// Size added to every scaled axis.
    pub base_size: [f64; 3],
    /// Multipliers applied to the orientation/scale magnitudes.
    pub scale_factors: [f64; 3],
    /// Field giving glyph orientation and scale.
    pub orientation_scale_field: Option<Field>,
    /// Field multiplying the scaled axes.
    pub variable_scale_field: Option<Field>,
}

impl Default for GlyphParameters {
    fn default() -> Self {
        Self {
            glyph: None,
            scaling_mode: GlyphScalingMode::Constant,
            centre: [0.0; 3],
            base_size: [1.0; 3],
            scale_factors: [1.0; 3],
            orientation_scale_field: None,
            variable_scale_field: None,
        }
    }
}

impl GlyphParameters {
    /// Compares every setting; fields and glyphs by identity.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.glyph == other.glyph
            && self.scaling_mode == other.scaling_mode
            && self.centre == other.centre
            && self.base_size == other.base_size
            && self.scale_factors == other.scale_factors
            && same_field(
                self.orientation_scale_field.as_ref(),
                other.orientation_scale_field.as_ref(),
            )
            && same_field(
                self.variable_scale_field.as_ref(),
                other.variable_scale_field.as_ref(),
            )
    }
}

/// Settings shared by every point-like graphic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointAttributes {
    /// Glyph settings.
    pub glyph: GlyphParameters,
    /// Field written as a text label beside each glyph.
    pub label_field: Option<Field>,
}

/// Radius settings for cylinders.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderParameters {
    /// Radius where the scalar field is absent or zero.
    pub constant_radius: f64,
    /// Multiplier on the radius scalar field.
    pub scale_factor: f64,
    /// Scalar field added to the radius.
    pub radius_scalar_field: Option<Field>,
}

impl Default for CylinderParameters {
    fn default() -> Self {
        Self {
            constant_radius: 0.0,
            scale_factor: 1.0,
            radius_scalar_field: None,
        }
    }
}

/// Iso-values as an explicit list or an evenly spaced range.
#[derive(Debug, Clone, PartialEq)]
pub enum IsoValues {
    /// Explicit values.
    List(Vec<f64>),
    /// `count` values from `first` to `last` inclusive.
    Range {
        /// Number of values.
        count: u32,
        /// First value.
        first: f64,
        /// Last value.
        last: f64,
    },
}

impl Default for IsoValues {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl IsoValues {
    /// Builds iso-values from the flat parameter form.
    ///
    /// With `explicit` values the range arguments must be zero (or `count` must
    /// equal the number of values); anything else is rejected instead of merged.
    pub fn from_parts(count: u32, explicit: Option<&[f64]>, first: f64, last: f64) -> Result<Self> {
        match explicit {
            Some(values) => {
                let count_matches = count == 0 || usize::try_from(count).ok() == Some(values.len());
                if first != 0.0 || last != 0.0 || !count_matches {
                    return Err(GraphicsError::IsoValueConflict);
                }
                if values.is_empty() {
                    return Err(GraphicsError::InvalidArgument(
                        "at least one iso-value is required".to_string(),
                    ));
                }
                Ok(Self::List(values.to_vec()))
            }
            None if count == 0 => Err(GraphicsError::InvalidArgument(
                "number of iso-values must be positive".to_string(),
            )),
            None => Ok(Self::Range { count, first, last }),
        }
    }

    /// Number of iso-values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::List(values) => values.len(),
            Self::Range { count, .. } => *count as usize,
        }
    }

    /// Returns true if there are no iso-values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The iso-values in order.
    ///
    /// A range of more than one value is spaced over `count - 1` intervals and
    /// ends exactly on `last`.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::List(values) => values.clone(),
            Self::Range { count, first, last } => {
                let count = *count;
                let step = if count > 1 {
                    (last - first) / f64::from(count - 1)
                } else {
                    0.0
                };
                (0..count)
                    .map(|i| {
                        if count > 1 && i == count - 1 {
                            *last
                        } else {
                            first + f64::from(i) * step
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Iso-surface settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IsoParameters {
    /// Scalar field contoured.
    pub scalar_field: Option<Field>,
    /// Contour values.
    pub values: IsoValues,
    /// Vertex merge distance for generated surfaces; 0 disables merging.
    pub decimation_threshold: f64,
    /// Element dimension contoured.
    pub use_element_type: UseElementType,
}

/// Where sample points are placed inside elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSampling {
    /// Layout of points.
    pub mode: XiSamplingMode,
    /// Points per unit volume for the density modes.
    pub density_field: Option<Field>,
    /// Chart coordinates for exact-xi sampling.
    pub exact_xi: [f64; 3],
}

impl Default for ElementSampling {
    fn default() -> Self {
        Self {
            mode: XiSamplingMode::CellCentres,
            density_field: None,
            exact_xi: [0.5; 3],
        }
    }
}

impl ElementSampling {
    /// Sampling at a single fixed xi location.
    pub fn exact(xi: [f64; 3]) -> Self {
        Self {
            mode: XiSamplingMode::ExactXi,
            density_field: None,
            exact_xi: xi,
        }
    }

    fn same_as(&self, other: &Self) -> bool {
        self.mode == other.mode
            && same_field(self.density_field.as_ref(), other.density_field.as_ref())
            && (self.mode != XiSamplingMode::ExactXi || self.exact_xi == other.exact_xi)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match (&self.density_field, self.mode.uses_density()) {
            (None, true) => Err(GraphicsError::InvalidArgument(format!(
                "{} sampling requires a density field",
                self.mode.token()
            ))),
            (Some(field), true) if !field.is_scalar() => Err(GraphicsError::ComponentCount {
                field: field.name().to_string(),
                expected: "1",
                actual: field.number_of_components(),
            }),
            _ => Ok(()),
        }
    }
}

/// Element point settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementPointParameters {
    /// Glyph settings.
    pub points: PointAttributes,
    /// Sample point layout.
    pub sampling: ElementSampling,
    /// Element dimension sampled.
    pub use_element_type: UseElementType,
}

/// Where streamlines start.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StreamlineSeed {
    /// Sample points in every element.
    #[default]
    AllElements,
    /// Sample points in one element.
    Element(ElementId),
    /// The host locations of every node in a node domain.
    Nodes {
        /// Node set seeding the traces.
        domain: NodeDomain,
        /// Mesh location field giving each node's host element and xi.
        mesh_location_field: Field,
    },
}

/// Streamline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamlineParameters {
    /// Cross-section.
    pub streamline_type: StreamlineType,
    /// Field followed by the traces.
    pub vector_field: Option<Field>,
    /// Trace against the vector direction.
    pub reverse: bool,
    /// Maximum trace length.
    pub length: f64,
    /// Width of ribbons and extrusions.
    pub width: f64,
    /// Value stored as data along traces.
    pub data_type: StreamlineDataType,
    /// Seed locations.
    pub seed: StreamlineSeed,
    /// Seed points inside seed elements.
    pub sampling: ElementSampling,
}

impl Default for StreamlineParameters {
    fn default() -> Self {
        Self {
            streamline_type: StreamlineType::Line,
            vector_field: None,
            reverse: false,
            length: 1.0,
            width: 1.0,
            data_type: StreamlineDataType::NoData,
            seed: StreamlineSeed::AllElements,
            sampling: ElementSampling::exact([0.5; 3]),
        }
    }
}

/// Volume settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VolumeParameters {
    /// Texture mapped through each block.
    pub texture: Option<VolumeTexture>,
    /// Restrict the graphic to one element.
    pub seed_element: Option<ElementId>,
}

/// Type-specific parameters of a graphic.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicKind {
    /// Glyphs at nodes.
    NodePoints(PointAttributes),
    /// Glyphs at data points.
    DataPoints(PointAttributes),
    /// Polylines.
    Lines,
    /// Tubes.
    Cylinders(CylinderParameters),
    /// Surface patches.
    Surfaces,
    /// Contours.
    IsoSurfaces(IsoParameters),
    /// Glyphs at element sample points.
    ElementPoints(ElementPointParameters),
    /// Traces.
    Streamlines(StreamlineParameters),
    /// One fixed glyph.
    Static(PointAttributes),
    /// Volume blocks.
    Volumes(VolumeParameters),
}

impl GraphicKind {
    /// Default parameters for a graphic type.
    pub fn new(graphic_type: GraphicType) -> Self {
        match graphic_type {
            GraphicType::NodePoints => Self::NodePoints(PointAttributes::default()),
            GraphicType::DataPoints => Self::DataPoints(PointAttributes::default()),
            GraphicType::Lines => Self::Lines,
            GraphicType::Cylinders => Self::Cylinders(CylinderParameters::default()),
            GraphicType::Surfaces => Self::Surfaces,
            GraphicType::IsoSurfaces => Self::IsoSurfaces(IsoParameters::default()),
            GraphicType::ElementPoints => Self::ElementPoints(ElementPointParameters::default()),
            GraphicType::Streamlines => Self::Streamlines(StreamlineParameters::default()),
            GraphicType::Static => Self::Static(PointAttributes::default()),
            GraphicType::Volumes => Self::Volumes(VolumeParameters::default()),
        }
    }

    /// The graphic type of this variant.
    #[must_use]
    pub fn graphic_type(&self) -> GraphicType {
        match self {
            Self::NodePoints(_) => GraphicType::NodePoints,
            Self::DataPoints(_) => GraphicType::DataPoints,
            Self::Lines => GraphicType::Lines,
            Self::Cylinders(_) => GraphicType::Cylinders,
            Self::Surfaces => GraphicType::Surfaces,
            Self::IsoSurfaces(_) => GraphicType::IsoSurfaces,
            Self::ElementPoints(_) => GraphicType::ElementPoints,
            Self::Streamlines(_) => GraphicType::Streamlines,
            Self::Static(_) => GraphicType::Static,
            Self::Volumes(_) => GraphicType::Volumes,
        }
    }

    /// Point attributes of point-like variants.
    #[must_use]
    pub fn point_attributes(&self) -> Option<&PointAttributes> {
        match self {
            Self::NodePoints(p) | Self::DataPoints(p) | Self::Static(p) => Some(p),
            Self::ElementPoints(e) => Some(&e.points),
            _ => None,
        }
    }

    /// Mutable point attributes of point-like variants.
    pub fn point_attributes_mut(&mut self) -> Option<&mut PointAttributes> {
        match self {
            Self::NodePoints(p) | Self::DataPoints(p) | Self::Static(p) => Some(p),
            Self::ElementPoints(e) => Some(&mut e.points),
            _ => None,
        }
    }

    /// Element sampling of element point and streamline variants.
    #[must_use]
    pub fn element_sampling(&self) -> Option<&ElementSampling> {
        match self {
            Self::ElementPoints(e) => Some(&e.sampling),
            Self::Streamlines(s) => Some(&s.sampling),
            _ => None,
        }
    }

    /// Use-element type of iso-surface and element point variants.
    #[must_use]
    pub fn use_element_type(&self) -> Option<UseElementType> {
        match self {
            Self::IsoSurfaces(iso) => Some(iso.use_element_type),
            Self::ElementPoints(e) => Some(e.use_element_type),
            _ => None,
        }
    }

    /// Every field referenced by the type-specific parameters.
    #[must_use]
    pub fn fields(&self) -> Vec<&Field> {
        let mut fields = Vec::new();
        if let Some(points) = self.point_attributes() {
            fields.extend(points.glyph.orientation_scale_field.as_ref());
            fields.extend(points.glyph.variable_scale_field.as_ref());
            fields.extend(points.label_field.as_ref());
        }
        if let Some(sampling) = self.element_sampling() {
            fields.extend(sampling.density_field.as_ref());
        }
        match self {
            Self::Cylinders(c) => fields.extend(c.radius_scalar_field.as_ref()),
            Self::IsoSurfaces(iso) => fields.extend(iso.scalar_field.as_ref()),
            Self::Streamlines(s) => {
                fields.extend(s.vector_field.as_ref());
                if let StreamlineSeed::Nodes {
                    mesh_location_field,
                    ..
                } = &s.seed
                {
                    fields.push(mesh_location_field);
                }
            }
            _ => {}
        }
        fields
    }

    /// Drops every field handle held by the parameters.
    pub fn release_fields(&mut self) {
        if let Some(points) = self.point_attributes_mut() {
            points.glyph.orientation_scale_field = None;
            points.glyph.variable_scale_field = None;
            points.label_field = None;
        }
        match self {
            Self::Cylinders(c) => c.radius_scalar_field = None,
            Self::IsoSurfaces(iso) => iso.scalar_field = None,
            Self::ElementPoints(e) => e.sampling.density_field = None,
            Self::Streamlines(s) => {
                s.vector_field = None;
                s.sampling.density_field = None;
                if matches!(s.seed, StreamlineSeed::Nodes { .. }) {
                    s.seed = StreamlineSeed::AllElements;
                }
            }
            _ => {}
        }
    }

    /// Compares the parameters that shape generated geometry.
    #[must_use]
    pub fn same_geometry(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NodePoints(a), Self::NodePoints(b))
            | (Self::DataPoints(a), Self::DataPoints(b))
            | (Self::Static(a), Self::Static(b)) => a.glyph.same_as(&b.glyph),
            (Self::Lines, Self::Lines) | (Self::Surfaces, Self::Surfaces) => true,
            (Self::Cylinders(a), Self::Cylinders(b)) => {
                a.constant_radius == b.constant_radius
                    && a.scale_factor == b.scale_factor
                    && same_field(a.radius_scalar_field.as_ref(), b.radius_scalar_field.as_ref())
            }
            (Self::IsoSurfaces(a), Self::IsoSurfaces(b)) => {
                same_field(a.scalar_field.as_ref(), b.scalar_field.as_ref())
                    && a.values == b.values
                    && a.decimation_threshold == b.decimation_threshold
                    && a.use_element_type == b.use_element_type
            }
            (Self::ElementPoints(a), Self::ElementPoints(b)) => {
                a.points.glyph.same_as(&b.points.glyph)
                    && a.sampling.same_as(&b.sampling)
                    && a.use_element_type == b.use_element_type
            }
            (Self::Streamlines(a), Self::Streamlines(b)) => {
                a.streamline_type == b.streamline_type
                    && same_field(a.vector_field.as_ref(), b.vector_field.as_ref())
                    && a.reverse == b.reverse
                    && a.length == b.length
                    && a.width == b.width
                    && a.seed == b.seed
                    && a.sampling.same_as(&b.sampling)
            }
            (Self::Volumes(a), Self::Volumes(b)) => a.seed_element == b.seed_element,
            _ => false,
        }
    }

    /// Compares geometry plus the non-cosmetic extras that change output.
    #[must_use]
    pub fn same_non_trivial(&self, other: &Self) -> bool {
        if !self.same_geometry(other) {
            return false;
        }
        let same_extras = match (self, other) {
            (Self::Streamlines(a), Self::Streamlines(b)) => a.data_type == b.data_type,
            (Self::Volumes(a), Self::Volumes(b)) => a.texture == b.texture,
            _ => true,
        };
        let same_labels = match (self.point_attributes(), other.point_attributes()) {
            (Some(a), Some(b)) => same_field(a.label_field.as_ref(), b.label_field.as_ref()),
            _ => true,
        };
        same_extras && same_labels
    }
}

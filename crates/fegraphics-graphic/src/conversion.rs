//! Conversion of graphics into graphics objects.
//!
//! A rebuild pass resolves and wraps the fields a graphic needs, then walks
//! the elements, nodes or seed points of its type and asks the geometry
//! generator for primitives. Primitives kept from the previous generation are
//! reused per element name when the graphic allows it. Selection highlighting
//! is refreshed separately whenever it is stale.

use std::collections::{BTreeMap, BTreeSet};

use fegraphics_core::region::{top_level_element, xi_through_chain};
use fegraphics_core::sampling::corner_point_number;
use fegraphics_core::{
    CacheGuard, ElementId, ElementPointRangesIdentifier, FeRegion, Field, FieldModule, FieldWrap,
    GraphicsError, Location, MultiRange, NodeDomain, NodeId, Result, SelectionSet,
    XiSamplingMode,
};
use fegraphics_render::{GraphicsObject, Primitive, PrimitiveCache, SelectMode, VolumeTexture};

use crate::generator::{ElementFields, GeometryGenerator, GlyphFields, GlyphSample, StreamlineFields};
use crate::graphic::Graphic;
use crate::kind::{ElementPointParameters, GraphicKind, StreamlineParameters, StreamlineSeed};
use crate::list::GraphicList;
use crate::types::{DescriptionDetail, GraphicType};
use crate::xi_points::element_xi_points;

/// Inputs of one rebuild pass over one or more graphics.
pub struct ConversionContext<'a> {
    /// Mesh drawn by element-based graphics and node points.
    pub region: &'a dyn FeRegion,
    /// Field module of `region`.
    pub field_module: &'a dyn FieldModule,
    /// Data point region and its field module, drawn by data points.
    pub data: Option<(&'a dyn FeRegion, &'a dyn FieldModule)>,
    /// Builds primitives.
    pub generator: &'a dyn GeometryGenerator,
    /// Current selection, if any.
    pub selection: Option<&'a SelectionSet>,
    /// Evaluation time.
    pub time: f64,
    /// Prefix of graphics object names.
    pub name_prefix: &'a str,
    /// Coordinate field for graphics without their own.
    pub default_coordinate_field: Option<&'a Field>,
    /// Scene visibility query; graphics it rejects are skipped.
    pub visibility: Option<&'a dyn Fn(&Graphic) -> bool>,
}

impl<'a> ConversionContext<'a> {
    /// Creates a context at time 0 with no selection or defaults.
    pub fn new(
        region: &'a dyn FeRegion,
        field_module: &'a dyn FieldModule,
        generator: &'a dyn GeometryGenerator,
    ) -> Self {
        Self {
            region,
            field_module,
            data: None,
            generator,
            selection: None,
            time: 0.0,
            name_prefix: "",
            default_coordinate_field: None,
            visibility: None,
        }
    }

    /// Sets the data point region.
    #[must_use]
    pub fn with_data(mut self, region: &'a dyn FeRegion, field_module: &'a dyn FieldModule) -> Self {
        self.data = Some((region, field_module));
        self
    }

    /// Sets the selection.
    #[must_use]
    pub fn with_selection(mut self, selection: &'a SelectionSet) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Sets the evaluation time.
    #[must_use]
    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Sets the graphics object name prefix.
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: &'a str) -> Self {
        self.name_prefix = prefix;
        self
    }

    /// Sets the default coordinate field.
    #[must_use]
    pub fn with_default_coordinate_field(mut self, field: Option<&'a Field>) -> Self {
        self.default_coordinate_field = field;
        self
    }

    /// Sets the scene visibility query.
    #[must_use]
    pub fn with_visibility(mut self, visibility: &'a dyn Fn(&Graphic) -> bool) -> Self {
        self.visibility = Some(visibility);
        self
    }

    fn is_element_selected(&self, element: ElementId) -> bool {
        self.selection.is_some_and(|s| s.is_element_selected(element))
    }

    fn is_node_selected(&self, domain: NodeDomain, node: NodeId) -> bool {
        self.selection.is_some_and(|s| match domain {
            NodeDomain::Nodes => s.is_node_selected(node),
            NodeDomain::Data => s.is_data_point_selected(node),
        })
    }

    fn node_domain(&self, domain: NodeDomain) -> Option<(&'a dyn FeRegion, &'a dyn FieldModule)> {
        match domain {
            NodeDomain::Nodes => Some((self.region, self.field_module)),
            NodeDomain::Data => self.data,
        }
    }
}

/// Wrapped fields held for the duration of one build.
struct WrappedFields<'m> {
    coordinate: Option<FieldWrap<'m>>,
    orientation_scale: Option<FieldWrap<'m>>,
    stream_vector: Option<FieldWrap<'m>>,
}

impl WrappedFields<'_> {
    fn coordinate(&self) -> Option<&Field> {
        self.coordinate.as_ref().map(FieldWrap::field)
    }
}

/// Mutable state of one build.
struct Build {
    object: GraphicsObject,
    cache: PrimitiveCache,
    reused: usize,
    failures: usize,
}

struct PointNumbering {
    element: ElementId,
    chain: Vec<usize>,
    number_in_xi: [u32; 3],
}

impl Build {
    fn add(&mut self, primitive: Primitive) {
        if let Err(error) = self.object.add_primitive(primitive) {
            log::warn!("{error}");
            self.failures += 1;
        }
    }
}

impl Graphic {
    /// Brings the graphics object up to date.
    ///
    /// Graphics hidden by their flag or by the scene are skipped. Dirty
    /// geometry is regenerated, reusing cached primitives where allowed, and
    /// stale selection highlighting is recomputed. If the rebuild cannot start
    /// the error is returned and the previous graphics object is kept.
    pub fn to_graphics_object(&mut self, ctx: &ConversionContext<'_>) -> Result<()> {
        if !self.visibility_flag || ctx.visibility.is_some_and(|visible| !visible(&*self)) {
            return Ok(());
        }
        if self.graphics_changed {
            if let Err(error) = self.build_graphics_object(ctx) {
                log::error!(
                    "could not build graphics for {}: {error}",
                    self.describe(DescriptionDetail::CompletePlusPosition)
                );
                return Err(error);
            }
        }
        if self.selected_graphics_changed {
            self.update_selection(ctx);
        }
        Ok(())
    }

    /// Returns true if primitives from the previous build may be reused.
    fn reuses_primitives(&self) -> bool {
        match &self.kind {
            GraphicKind::Streamlines(_)
            | GraphicKind::NodePoints(_)
            | GraphicKind::DataPoints(_)
            | GraphicKind::Static(_) => false,
            GraphicKind::Volumes(v) => !v
                .texture
                .as_ref()
                .is_some_and(VolumeTexture::spans_outside_unit_cell),
            _ => true,
        }
    }

    fn check_required_inputs(&self) -> Result<()> {
        match &self.kind {
            GraphicKind::IsoSurfaces(iso) if iso.scalar_field.is_none() => {
                Err(GraphicsError::MissingIsoScalarField)
            }
            GraphicKind::Streamlines(s) if s.vector_field.is_none() => {
                Err(GraphicsError::MissingStreamVectorField)
            }
            _ => Ok(()),
        }
    }

    fn wrap_fields<'m>(
        &self,
        module: &'m dyn FieldModule,
        coordinate: Option<&Field>,
    ) -> Result<WrappedFields<'m>> {
        let coordinate = coordinate
            .map(|field| FieldWrap::coordinate(module, field))
            .transpose()?;
        let relative_to = |field: &Field| -> Result<FieldWrap<'m>> {
            let basis = coordinate.as_ref().map_or(field, FieldWrap::field);
            FieldWrap::orientation_scale(module, field, basis)
        };
        let orientation_scale = self
            .glyph_parameters()
            .and_then(|g| g.orientation_scale_field.as_ref())
            .map(relative_to)
            .transpose()?;
        let stream_vector = self
            .streamline_parameters()
            .and_then(|s| s.vector_field.as_ref())
            .map(relative_to)
            .transpose()?;
        Ok(WrappedFields {
            coordinate,
            orientation_scale,
            stream_vector,
        })
    }

    fn build_graphics_object(&mut self, ctx: &ConversionContext<'_>) -> Result<()> {
        let coordinate = self
            .coordinate_field
            .as_ref()
            .or(ctx.default_coordinate_field)
            .cloned();
        let module = match self.graphic_type() {
            GraphicType::DataPoints => ctx.data.map_or(ctx.field_module, |(_, m)| m),
            _ => ctx.field_module,
        };
        // Dropped last, after the wraps are released.
        let _cache = CacheGuard::new(module);
        if coordinate.is_none() && self.graphic_type() != GraphicType::Static {
            return Err(GraphicsError::MissingCoordinateField);
        }
        self.check_required_inputs()?;
        let wrapped = self.wrap_fields(module, coordinate.as_ref())?;

        let kind = self.graphics_object_kind(ctx.region);
        let name = self.graphics_object_name(ctx.name_prefix);
        let mut cache = PrimitiveCache::new();
        let object = match self.graphics_object.take() {
            Some(mut existing) if existing.kind() == kind => {
                existing.set_name(name);
                if self.reuse_allowed && self.reuses_primitives() {
                    cache = PrimitiveCache::from_primitives(existing.take_primitives());
                } else {
                    existing.clear();
                }
                existing
            }
            _ => GraphicsObject::new(name, kind),
        };
        let mut build = Build {
            object,
            cache,
            reused: 0,
            failures: 0,
        };

        match &self.kind {
            GraphicKind::NodePoints(_) => {
                self.populate_nodes(ctx, &wrapped, NodeDomain::Nodes, &mut build);
            }
            GraphicKind::DataPoints(_) => {
                self.populate_nodes(ctx, &wrapped, NodeDomain::Data, &mut build);
            }
            GraphicKind::Static(points) => {
                let fields = GlyphFields {
                    coordinate: wrapped.coordinate(),
                    data: self.data_field.as_ref(),
                    orientation_scale: wrapped.orientation_scale.as_ref().map(FieldWrap::field),
                    variable_scale: points.glyph.variable_scale_field.as_ref(),
                    label: points.label_field.as_ref(),
                };
                let sample = GlyphSample {
                    location: Location::Point,
                    number: 0,
                };
                match ctx.generator.glyph_set(
                    ctx.field_module,
                    &[sample],
                    &fields,
                    &points.glyph,
                    None,
                    ctx.time,
                ) {
                    Some(set) => build.add(Primitive::GlyphSet(set)),
                    None => log::warn!("no glyph generated for static graphic"),
                }
            }
            GraphicKind::Streamlines(parameters) => {
                self.populate_streamlines(ctx, &wrapped, parameters, &mut build);
            }
            _ => self.populate_elements(ctx, &wrapped, &mut build),
        }
        if let GraphicKind::IsoSurfaces(iso) = &self.kind {
            build.object.weld_surfaces(iso.decimation_threshold as f32);
        }

        let Build {
            object,
            reused,
            failures,
            ..
        } = build;
        log::debug!(
            "built '{}' with {} primitives, {reused} reused, {failures} failed",
            object.name(),
            object.number_of_primitives()
        );
        self.graphics_object = Some(object);
        self.update_graphics_object_trivial();
        self.graphics_changed = false;
        self.reuse_allowed = true;
        self.selected_graphics_changed = true;
        Ok(())
    }

    /// Returns true if the visibility field is non-zero at `location`.
    fn visible_at(&self, module: &dyn FieldModule, location: &Location, time: f64) -> bool {
        let Some(field) = &self.visibility_field else {
            return true;
        };
        module
            .evaluate(field, location, time)
            .and_then(|values| values.first().copied())
            .is_some_and(|value| value != 0.0)
    }

    /// Returns true if the select mode draws an item with this selection state.
    fn draws(&self, selected: bool) -> bool {
        match self.select_mode {
            SelectMode::DrawSelected => selected,
            SelectMode::DrawUnselected => !selected,
            SelectMode::On | SelectMode::NoSelect => true,
        }
    }

    fn draws_element(&self, ctx: &ConversionContext<'_>, element: ElementId) -> bool {
        self.uses_element(ctx.region, element)
            && self.visible_at(ctx.field_module, &Location::element_centre(element), ctx.time)
            && self.draws(ctx.is_element_selected(element))
    }

    fn populate_elements(
        &self,
        ctx: &ConversionContext<'_>,
        wrapped: &WrappedFields<'_>,
        build: &mut Build,
    ) {
        let Some(coordinate) = wrapped.coordinate() else {
            return;
        };
        let elements = match &self.kind {
            GraphicKind::Volumes(v) => match v.seed_element {
                Some(seed) if ctx.region.contains_element(seed) => vec![seed],
                Some(_) => Vec::new(),
                None => ctx.region.element_ids(self.dimension_in(ctx.region)),
            },
            _ => ctx.region.element_ids(self.dimension_in(ctx.region)),
        };
        let fields = ElementFields {
            coordinate,
            data: self.data_field.as_ref(),
            texture_coordinate: self.texture_coordinate_field.as_ref(),
        };
        for element in elements {
            if !self.draws_element(ctx, element) {
                continue;
            }
            if let Some(cached) = build.cache.take(element.number) {
                build.reused += cached.len();
                for primitive in cached {
                    build.add(primitive);
                }
                continue;
            }
            let primitives = self.element_primitives(ctx, wrapped, &fields, element);
            if primitives.is_empty() && !matches!(self.kind, GraphicKind::IsoSurfaces(_)) {
                log::warn!("no {} geometry for {element}", self.graphic_type());
                build.failures += 1;
            }
            for primitive in primitives {
                build.add(primitive);
            }
        }
    }

    fn element_primitives(
        &self,
        ctx: &ConversionContext<'_>,
        wrapped: &WrappedFields<'_>,
        fields: &ElementFields<'_>,
        element: ElementId,
    ) -> Vec<Primitive> {
        let module = ctx.field_module;
        let generator = ctx.generator;
        let time = ctx.time;
        let divisions = self.element_discretization(ctx.region, element);
        let mut primitives = match &self.kind {
            GraphicKind::Lines => generator
                .polyline(module, element, fields, divisions[0], time)
                .map(Primitive::Polyline)
                .into_iter()
                .collect(),
            GraphicKind::Cylinders(radius) => generator
                .cylinder(
                    module,
                    element,
                    fields,
                    radius,
                    divisions[0],
                    self.circle_discretization(),
                    time,
                )
                .map(Primitive::Surface)
                .into_iter()
                .collect(),
            GraphicKind::Surfaces => generator
                .surface(module, element, fields, divisions, time)
                .map(Primitive::Surface)
                .into_iter()
                .collect(),
            GraphicKind::IsoSurfaces(iso) => {
                let Some(scalar) = &iso.scalar_field else {
                    return Vec::new();
                };
                iso.values
                    .values()
                    .into_iter()
                    .flat_map(|value| {
                        generator.iso_surface(module, element, fields, scalar, value, divisions, time)
                    })
                    .collect()
            }
            GraphicKind::Volumes(v) => generator
                .voltex(module, element, fields, v.texture.as_ref(), divisions, time)
                .map(Primitive::Voltex)
                .into_iter()
                .collect(),
            GraphicKind::ElementPoints(parameters) => self
                .element_point_glyphs(ctx, wrapped, parameters, element, divisions)
                .map(Primitive::GlyphSet)
                .into_iter()
                .collect(),
            _ => Vec::new(),
        };
        for primitive in &mut primitives {
            match primitive {
                Primitive::Surface(surface) => surface.render_type = self.render_type,
                Primitive::Polyline(polyline) => polyline.line_width = self.line_width,
                _ => {}
            }
        }
        primitives
    }

    fn element_point_glyphs(
        &self,
        ctx: &ConversionContext<'_>,
        wrapped: &WrappedFields<'_>,
        parameters: &ElementPointParameters,
        element: ElementId,
        divisions: [u32; 3],
    ) -> Option<fegraphics_render::GlyphSet> {
        let coordinate = wrapped.coordinate()?;
        let xi_points = element_xi_points(
            ctx.field_module,
            element,
            coordinate,
            &parameters.sampling,
            divisions,
            ctx.time,
        );
        let numbering = self.element_point_numbering(ctx.region, element, parameters.sampling.mode);
        let samples: Vec<GlyphSample> = xi_points
            .into_iter()
            .enumerate()
            .map(|(number, xi)| {
                let host_xi = xi_through_chain(&numbering.chain, xi);
                let number = if parameters.sampling.mode == XiSamplingMode::CellCorners {
                    corner_point_number(
                        numbering.element.dimension,
                        numbering.number_in_xi,
                        host_xi,
                    )
                    .unwrap_or(number)
                } else {
                    number
                };
                GlyphSample {
                    location: Location::element(numbering.element, host_xi),
                    number: number as i32,
                }
            })
            .collect();
        let fields = GlyphFields {
            coordinate: Some(coordinate),
            data: self.data_field.as_ref(),
            orientation_scale: wrapped.orientation_scale.as_ref().map(FieldWrap::field),
            variable_scale: parameters.points.glyph.variable_scale_field.as_ref(),
            label: parameters.points.label_field.as_ref(),
        };
        ctx.generator.glyph_set(
            ctx.field_module,
            &samples,
            &fields,
            &parameters.points.glyph,
            Some(element.number),
            ctx.time,
        )
    }

    fn populate_nodes(
        &self,
        ctx: &ConversionContext<'_>,
        wrapped: &WrappedFields<'_>,
        domain: NodeDomain,
        build: &mut Build,
    ) {
        let Some(points) = self.kind.point_attributes() else {
            return;
        };
        let Some((region, module)) = ctx.node_domain(domain) else {
            log::debug!("no data region; nothing to draw for data points");
            return;
        };
        let samples: Vec<GlyphSample> = region
            .node_ids()
            .into_iter()
            .filter(|&node| {
                self.visible_at(module, &Location::Node(node), ctx.time)
                    && self.draws(ctx.is_node_selected(domain, node))
            })
            .map(|node| GlyphSample {
                location: Location::Node(node),
                number: node.0,
            })
            .collect();
        if samples.is_empty() {
            return;
        }
        let fields = GlyphFields {
            coordinate: wrapped.coordinate(),
            data: self.data_field.as_ref(),
            orientation_scale: wrapped.orientation_scale.as_ref().map(FieldWrap::field),
            variable_scale: points.glyph.variable_scale_field.as_ref(),
            label: points.label_field.as_ref(),
        };
        match ctx
            .generator
            .glyph_set(module, &samples, &fields, &points.glyph, None, ctx.time)
        {
            Some(set) => build.add(Primitive::GlyphSet(set)),
            None => {
                log::warn!("no glyphs generated for {} nodes", samples.len());
                build.failures += 1;
            }
        }
    }

    fn populate_streamlines(
        &self,
        ctx: &ConversionContext<'_>,
        wrapped: &WrappedFields<'_>,
        parameters: &StreamlineParameters,
        build: &mut Build,
    ) {
        let (Some(coordinate), Some(vector)) = (
            wrapped.coordinate(),
            wrapped.stream_vector.as_ref().map(FieldWrap::field),
        ) else {
            return;
        };
        let fields = StreamlineFields {
            coordinate,
            vector,
            data: self.data_field.as_ref(),
        };
        let mut seeds: Vec<(ElementId, [f64; 3])> = Vec::new();
        match &parameters.seed {
            StreamlineSeed::AllElements | StreamlineSeed::Element(_) => {
                let elements = match parameters.seed {
                    StreamlineSeed::Element(seed) if ctx.region.contains_element(seed) => vec![seed],
                    StreamlineSeed::Element(_) => Vec::new(),
                    _ => ctx.region.element_ids(self.dimension_in(ctx.region)),
                };
                for element in elements {
                    if !self.draws_element(ctx, element) {
                        continue;
                    }
                    let divisions = self.element_discretization(ctx.region, element);
                    seeds.extend(
                        element_xi_points(
                            ctx.field_module,
                            element,
                            coordinate,
                            &parameters.sampling,
                            divisions,
                            ctx.time,
                        )
                        .into_iter()
                        .map(|xi| (element, xi)),
                    );
                }
            }
            StreamlineSeed::Nodes {
                domain,
                mesh_location_field,
            } => {
                if let Some((region, module)) = ctx.node_domain(*domain) {
                    for node in region.node_ids() {
                        let location = Location::Node(node);
                        if let Some(seed) =
                            module.evaluate_mesh_location(mesh_location_field, &location, ctx.time)
                        {
                            seeds.push(seed);
                        }
                    }
                }
            }
        }
        for (element, xi) in seeds {
            match ctx.generator.streamline(
                ctx.region,
                ctx.field_module,
                element,
                xi,
                &fields,
                parameters,
                self.circle_discretization(),
                ctx.time,
            ) {
                Some(mut primitive) => {
                    if let Primitive::Surface(surface) = &mut primitive {
                        surface.render_type = self.render_type;
                    }
                    build.add(primitive);
                }
                None => log::trace!("no streamline from {element} at {xi:?}"),
            }
        }
    }

    /// Recomputes which primitives and points are highlighted.
    fn update_selection(&mut self, ctx: &ConversionContext<'_>) {
        let (names, points) = self.selected_primitives(ctx);
        if let Some(object) = &mut self.graphics_object {
            object.set_selection(names, points);
            object.changed();
        }
        self.selected_graphics_changed = false;
    }

    /// Selected primitive names and per-name point ranges.
    ///
    /// Node and data point glyphs form one unnamed glyph set whose selected
    /// node numbers are keyed by 0.
    fn selected_primitives(
        &self,
        ctx: &ConversionContext<'_>,
    ) -> (BTreeSet<i32>, BTreeMap<i32, MultiRange>) {
        let mut names = BTreeSet::new();
        let mut points = BTreeMap::new();
        let (Some(selection), Some(object)) = (ctx.selection, self.graphics_object.as_ref()) else {
            return (names, points);
        };
        if !matches!(self.select_mode, SelectMode::On | SelectMode::DrawSelected) {
            return (names, points);
        }
        match &self.kind {
            GraphicKind::NodePoints(_) | GraphicKind::DataPoints(_) => {
                let domain = if self.graphic_type() == GraphicType::DataPoints {
                    NodeDomain::Data
                } else {
                    NodeDomain::Nodes
                };
                if let Some((region, _)) = ctx.node_domain(domain) {
                    let mut selected = MultiRange::new();
                    for node in region.node_ids() {
                        if ctx.is_node_selected(domain, node) {
                            selected.add(node.0);
                        }
                    }
                    if !selected.is_empty() {
                        points.insert(0, selected);
                    }
                }
            }
            GraphicKind::Static(_) => {}
            _ => {
                let dimension = self.dimension_in(ctx.region);
                for name in object.primitive_names() {
                    let element = ElementId::new(dimension, name);
                    if selection.is_element_selected(element) {
                        names.insert(name);
                    }
                    if let Some(ranges) = self.selected_element_points(ctx, selection, element) {
                        points.insert(name, ranges.clone());
                    }
                }
            }
        }
        (names, points)
    }

    fn selected_element_points<'s>(
        &self,
        ctx: &ConversionContext<'_>,
        selection: &'s SelectionSet,
        element: ElementId,
    ) -> Option<&'s MultiRange> {
        let sampling = self.kind.element_sampling()?;
        if self.graphic_type() != GraphicType::ElementPoints {
            return None;
        }
        let numbering = self.element_point_numbering(ctx.region, element, sampling.mode);
        let identifier = ElementPointRangesIdentifier {
            element: numbering.element,
            top_level_element: top_level_element(ctx.region, numbering.element).0,
            sampling_mode: sampling.mode,
            number_in_xi: numbering.number_in_xi,
            exact_xi: sampling.exact_xi,
        };
        selection.element_point_ranges(&identifier)
    }

    /// Element and discretization that number the sample points of `element`.
    ///
    /// Corner samples are shared with neighbouring faces and lines, so they are
    /// numbered on the top-level element with its own discretization.
    fn element_point_numbering(
        &self,
        region: &dyn FeRegion,
        element: ElementId,
        mode: XiSamplingMode,
    ) -> PointNumbering {
        let (host, chain) = if mode == XiSamplingMode::CellCorners {
            top_level_element(region, element)
        } else {
            (element, Vec::new())
        };
        PointNumbering {
            element: host,
            chain,
            number_in_xi: self.element_discretization(region, host),
        }
    }
}

impl GraphicList {
    /// Converts every graphic in draw order.
    ///
    /// A graphic that fails keeps its previous graphics object and does not
    /// stop the others. Returns the number of graphics that failed.
    pub fn build_all(&mut self, ctx: &ConversionContext<'_>) -> usize {
        self.iter_mut()
            .map(|graphic| graphic.to_graphics_object(ctx))
            .filter(Result::is_err)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fegraphics_core::{ChangeFlags, CoordinateSystem, MemoryRegion, RebuildPolicy, RegionChanges};
    use fegraphics_render::{Glyph, GlyphShape, GraphicsObjectKind};

    use crate::generator::SampledGeometry;
    use crate::kind::{ElementSampling, IsoValues};
    use crate::types::{GlyphScalingMode, GraphicChange, UseElementType};

    fn lines(coordinates: &Field) -> Graphic {
        let mut graphic = Graphic::create(GraphicType::Lines);
        graphic.set_coordinate_field(Some(coordinates.clone())).unwrap();
        graphic.position = 1;
        graphic
    }

    fn point_glyph() -> Glyph {
        Glyph::new("point", GlyphShape::Point)
    }

    #[test]
    fn test_lines_one_polyline_per_element() {
        let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &region, &generator).with_name_prefix("mesh");
        let mut graphic = lines(&coordinates);
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.name(), "mesh.1");
        assert_eq!(object.kind(), GraphicsObjectKind::PolylineVertexBuffers);
        assert_eq!(object.primitive_names(), vec![1, 2]);
        assert!(!graphic.graphics_changed());
        assert!(!graphic.selected_graphics_changed());
    }

    #[test]
    fn test_missing_coordinate_field_keeps_object() {
        let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &region, &generator);
        let mut graphic = lines(&coordinates);
        graphic.to_graphics_object(&ctx).unwrap();
        graphic.set_coordinate_field(None).unwrap();
        let error = graphic.to_graphics_object(&ctx).unwrap_err();
        assert!(matches!(error, GraphicsError::MissingCoordinateField));
        assert_eq!(graphic.graphics_object().unwrap().number_of_primitives(), 2);
        assert!(graphic.graphics_changed());

        let ctx = ctx.with_default_coordinate_field(Some(&coordinates));
        graphic.to_graphics_object(&ctx).unwrap();
        assert!(!graphic.graphics_changed());
    }

    #[test]
    fn test_invisible_graphic_is_skipped() {
        let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let generator = SampledGeometry::new();
        let hidden = |_: &Graphic| false;
        let ctx = ConversionContext::new(&region, &region, &generator).with_visibility(&hidden);
        let mut graphic = lines(&coordinates);
        graphic.to_graphics_object(&ctx).unwrap();
        assert!(graphic.graphics_object().is_none());
        assert!(graphic.graphics_changed());
    }

    #[test]
    fn test_partial_rebuild_reuses_other_elements() {
        let (mut region, coordinates) = MemoryRegion::block([10, 0, 0], 1);
        let generator = SampledGeometry::new();
        let mut graphic = lines(&coordinates);
        {
            let ctx = ConversionContext::new(&region, &region, &generator);
            graphic.to_graphics_object(&ctx).unwrap();
        }
        let before: Vec<Primitive> = graphic.graphics_object().unwrap().primitives().to_vec();

        region
            .set_node_values(&coordinates, NodeId(1), vec![0.0, 0.5, 0.0])
            .unwrap();
        let changes = region.take_changes();
        let change = graphic.region_change(&region, &changes, None, &RebuildPolicy::default());
        assert_eq!(change, crate::types::GraphicChange::PartialRebuild);
        let ctx = ConversionContext::new(&region, &region, &generator);
        graphic.to_graphics_object(&ctx).unwrap();

        let after = graphic.graphics_object().unwrap();
        assert_eq!(after.primitive_names(), (1..=10).collect::<Vec<_>>());
        let find = |primitives: &[Primitive], name| {
            primitives.iter().find(|p| p.name() == Some(name)).cloned()
        };
        for name in 2..=10 {
            assert_eq!(find(after.primitives(), name), find(&before, name));
        }
        assert_ne!(find(after.primitives(), 1), find(&before, 1));
    }

    #[test]
    fn test_iso_surface_over_cube() {
        let (mut region, coordinates) = MemoryRegion::block([2, 1, 1], 3);
        let x = region.define_nodal_field("x", 1, CoordinateSystem::RectangularCartesian);
        for node in region.node_ids() {
            let position = region
                .evaluate(&coordinates, &Location::Node(node), 0.0)
                .unwrap();
            region.set_node_values(&x, node, vec![position[0]]).unwrap();
        }
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &region, &generator);
        let mut graphic = Graphic::create(GraphicType::IsoSurfaces);
        graphic.set_coordinate_field(Some(coordinates.clone())).unwrap();
        let values = IsoValues::from_parts(0, Some(&[0.5, 1.5]), 0.0, 0.0).unwrap();
        graphic.set_iso_surface_parameters(x, values, 0.0).unwrap();
        graphic.set_use_element_type(UseElementType::Elements).unwrap();
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.kind(), GraphicsObjectKind::Surface);
        assert_eq!(object.primitive_names(), vec![1, 2]);
    }

    #[test]
    fn test_iso_surface_welded_across_elements() {
        let (mut region, coordinates) = MemoryRegion::block([2, 1, 1], 3);
        let s = region.define_nodal_field("s", 1, CoordinateSystem::RectangularCartesian);
        for node in region.node_ids() {
            let position = region
                .evaluate(&coordinates, &Location::Node(node), 0.0)
                .unwrap();
            region
                .set_node_values(&s, node, vec![0.5 * position[0] + position[1]])
                .unwrap();
        }
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &region, &generator);
        let mut graphic = Graphic::create(GraphicType::IsoSurfaces);
        graphic.set_coordinate_field(Some(coordinates)).unwrap();
        let values = IsoValues::from_parts(0, Some(&[0.75]), 0.0, 0.0).unwrap();
        graphic.set_iso_surface_parameters(s, values, 1e-4).unwrap();
        graphic.set_use_element_type(UseElementType::Elements).unwrap();
        graphic.to_graphics_object(&ctx).unwrap();

        let object = graphic.graphics_object().unwrap();
        let surface = |name: i32| {
            object
                .primitives()
                .iter()
                .find_map(|primitive| match primitive {
                    Primitive::Surface(surface) if surface.name == Some(name) => Some(surface),
                    _ => None,
                })
                .unwrap()
        };
        let (first, second) = (surface(1), surface(2));
        let mut shared = 0;
        for vertex in first.vertices.iter().filter(|v| (v.position[0] - 1.0).abs() < 1e-6) {
            let twin = second
                .vertices
                .iter()
                .find(|other| other.position().distance(vertex.position()) < 1e-4);
            if let Some(twin) = twin {
                assert_eq!(twin.position, vertex.position);
                assert_eq!(twin.normal, vertex.normal);
                shared += 1;
            }
        }
        assert!(shared >= 2);
    }

    #[test]
    fn test_iso_surface_requires_scalar() {
        let (region, coordinates) = MemoryRegion::block([1, 1, 1], 3);
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &region, &generator);
        let mut graphic = Graphic::create(GraphicType::IsoSurfaces);
        graphic.set_coordinate_field(Some(coordinates)).unwrap();
        assert!(matches!(
            graphic.to_graphics_object(&ctx),
            Err(GraphicsError::MissingIsoScalarField)
        ));
    }

    #[test]
    fn test_node_points_and_selection() {
        let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let generator = SampledGeometry::new();
        let mut selection = SelectionSet::new();
        selection.select_node(NodeId(2));
        let ctx = ConversionContext::new(&region, &region, &generator).with_selection(&selection);
        let mut graphic = Graphic::create(GraphicType::NodePoints);
        graphic.set_coordinate_field(Some(coordinates)).unwrap();
        graphic
            .set_glyph_parameters(
                Some(point_glyph()),
                GlyphScalingMode::Constant,
                [0.0; 3],
                [1.0; 3],
                None,
                [1.0; 3],
                None,
            )
            .unwrap();
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        let Primitive::GlyphSet(set) = &object.primitives()[0] else {
            panic!("expected glyphs");
        };
        assert_eq!(set.points.len(), 3);
        assert_eq!(set.glyph.as_deref(), Some("point"));
        assert!(object.selected_points()[&0].contains(2));
        assert!(!object.selected_points()[&0].contains(1));
    }

    #[test]
    fn test_draw_selected_filters_elements() {
        let (region, coordinates) = MemoryRegion::block([3, 0, 0], 1);
        let generator = SampledGeometry::new();
        let mut selection = SelectionSet::new();
        selection.select_element(ElementId::line(2));
        let ctx = ConversionContext::new(&region, &region, &generator).with_selection(&selection);
        let mut graphic = lines(&coordinates);
        graphic.set_select_mode(SelectMode::DrawSelected);
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.primitive_names(), vec![2]);
        assert!(object.is_name_selected(2));

        graphic.set_select_mode(SelectMode::DrawUnselected);
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.primitive_names(), vec![1, 3]);
        assert!(object.selected_names().is_empty());
    }

    #[test]
    fn test_visibility_field_hides_elements() {
        let (mut region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let show = region.define_element_constant_field("show", 1);
        region.set_element_values(&show, ElementId::line(1), vec![1.0]).unwrap();
        region.set_element_values(&show, ElementId::line(2), vec![0.0]).unwrap();
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &region, &generator);
        let mut graphic = lines(&coordinates);
        graphic.set_visibility_field(Some(show)).unwrap();
        graphic.to_graphics_object(&ctx).unwrap();
        assert_eq!(graphic.graphics_object().unwrap().primitive_names(), vec![1]);
        assert!(graphic.graphics_object().unwrap().name().contains("show/"));
    }

    #[test]
    fn test_element_point_ranges_are_highlighted() {
        let (region, coordinates) = MemoryRegion::block([2, 1, 0], 2);
        let generator = SampledGeometry::new();
        let mut graphic = Graphic::create(GraphicType::ElementPoints);
        graphic.set_coordinate_field(Some(coordinates)).unwrap();
        graphic.set_use_element_type(UseElementType::Faces).unwrap();
        graphic.set_discretization([2, 2, 1]).unwrap();
        graphic.set_element_sampling(ElementSampling::default()).unwrap();

        let mut ranges = MultiRange::new();
        ranges.add(3);
        let mut selection = SelectionSet::new();
        selection.select_element_points(
            ElementPointRangesIdentifier {
                element: ElementId::face(2),
                top_level_element: ElementId::face(2),
                sampling_mode: XiSamplingMode::CellCentres,
                number_in_xi: [2, 2, 1],
                exact_xi: [0.5; 3],
            },
            &ranges,
        );
        let ctx = ConversionContext::new(&region, &region, &generator).with_selection(&selection);
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.primitive_names(), vec![1, 2]);
        assert!(object.selected_points()[&2].contains(3));
        assert!(!object.selected_points().contains_key(&1));
    }

    #[test]
    fn test_shared_corner_points_use_top_level_numbering() {
        let (region, coordinates) = MemoryRegion::block([1, 1, 0], 2);
        let generator = SampledGeometry::new();
        let mut graphic = Graphic::create(GraphicType::ElementPoints);
        graphic.set_coordinate_field(Some(coordinates)).unwrap();
        graphic.set_use_element_type(UseElementType::Lines).unwrap();
        graphic
            .set_element_sampling(ElementSampling {
                mode: XiSamplingMode::CellCorners,
                ..ElementSampling::default()
            })
            .unwrap();

        // corner at xi (0, 0) of the square, shared by lines 1 and 3
        let mut ranges = MultiRange::new();
        ranges.add(0);
        let mut selection = SelectionSet::new();
        selection.select_element_points(
            ElementPointRangesIdentifier {
                element: ElementId::face(1),
                top_level_element: ElementId::face(1),
                sampling_mode: XiSamplingMode::CellCorners,
                number_in_xi: [1, 1, 1],
                exact_xi: [0.5; 3],
            },
            &ranges,
        );
        let ctx = ConversionContext::new(&region, &region, &generator).with_selection(&selection);
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.primitive_names(), vec![1, 2, 3, 4]);
        let selected: Vec<i32> = object.selected_points().keys().copied().collect();
        assert_eq!(selected, vec![1, 2, 3, 4]);
        assert!(object.selected_points().values().all(|r| r.contains(0)));

        let numbers = |name: i32| -> Vec<i32> {
            object
                .primitives()
                .iter()
                .find_map(|primitive| match primitive {
                    Primitive::GlyphSet(set) if set.name == Some(name) => {
                        Some(set.points.iter().map(|p| p.number).collect())
                    }
                    _ => None,
                })
                .unwrap()
        };
        assert_eq!(numbers(1), vec![0, 2]);
        assert_eq!(numbers(3), vec![0, 1]);
        assert_eq!(numbers(2), vec![1, 3]);
    }

    #[test]
    fn test_streamlines_from_every_element() {
        let (mut region, coordinates) = MemoryRegion::block([2, 1, 1], 3);
        let flow = region.define_constant_field("flow", vec![1.0, 0.0, 0.0]);
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &region, &generator);
        let mut graphic = Graphic::create(GraphicType::Streamlines);
        graphic.set_coordinate_field(Some(coordinates)).unwrap();
        graphic
            .set_streamline_parameters(
                crate::types::StreamlineType::Line,
                flow,
                false,
                0.25,
                0.0,
            )
            .unwrap();
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.kind(), GraphicsObjectKind::Polyline);
        assert_eq!(object.primitive_names(), vec![1, 2]);
    }

    #[test]
    fn test_fibre_coordinates_cannot_be_wrapped() {
        let (mut region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let generator = SampledGeometry::new();
        let mut graphic = lines(&coordinates);
        {
            let ctx = ConversionContext::new(&region, &region, &generator);
            graphic.to_graphics_object(&ctx).unwrap();
        }
        let fibres = region.define_nodal_field("fibres", 3, CoordinateSystem::Fibre);
        graphic.set_coordinate_field(Some(fibres)).unwrap();
        let ctx = ConversionContext::new(&region, &region, &generator);
        assert!(matches!(
            graphic.to_graphics_object(&ctx),
            Err(GraphicsError::FieldWrap(_))
        ));
        assert_eq!(graphic.graphics_object().unwrap().number_of_primitives(), 2);
        assert_eq!(region.active_wraps(), 0);
    }

    fn volumes(coordinates: &Field, texture: VolumeTexture) -> Graphic {
        let mut graphic = Graphic::create(GraphicType::Volumes);
        graphic.set_coordinate_field(Some(coordinates.clone())).unwrap();
        graphic.set_volume_texture(Some(texture)).unwrap();
        graphic
    }

    fn primitive_named(graphic: &Graphic, name: i32) -> Primitive {
        graphic
            .graphics_object()
            .unwrap()
            .primitives()
            .iter()
            .find(|p| p.name() == Some(name))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_volume_seed_element() {
        let (region, coordinates) = MemoryRegion::block([2, 1, 1], 3);
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &region, &generator);
        let mut graphic = volumes(&coordinates, VolumeTexture::new("density"));
        graphic.set_seed_element(Some(ElementId::new(3, 2))).unwrap();
        graphic.to_graphics_object(&ctx).unwrap();
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.kind(), GraphicsObjectKind::Voltex);
        assert_eq!(object.primitive_names(), vec![2]);

        graphic.set_seed_element(Some(ElementId::new(3, 9))).unwrap();
        graphic.to_graphics_object(&ctx).unwrap();
        assert_eq!(graphic.graphics_object().unwrap().number_of_primitives(), 0);
    }

    /// Moves a node of element 1 but reports only element 2, then rebuilds.
    fn rebuild_after_unreported_edit(texture: VolumeTexture) -> (Primitive, Primitive) {
        let (mut region, coordinates) = MemoryRegion::block([2, 1, 1], 3);
        let generator = SampledGeometry::new();
        let mut graphic = volumes(&coordinates, texture);
        {
            let ctx = ConversionContext::new(&region, &region, &generator);
            graphic.to_graphics_object(&ctx).unwrap();
        }
        let before = primitive_named(&graphic, 1);

        region
            .set_node_values(&coordinates, NodeId(1), vec![-1.0, 0.0, 0.0])
            .unwrap();
        region.take_changes();
        let mut changes = RegionChanges::new();
        changes.fields.record(coordinates.id(), ChangeFlags::RELATED);
        changes.elements.record(ElementId::new(3, 2), ChangeFlags::RELATED);
        let change = graphic.region_change(&region, &changes, None, &RebuildPolicy::default());
        assert_eq!(change, GraphicChange::PartialRebuild);

        let ctx = ConversionContext::new(&region, &region, &generator);
        graphic.to_graphics_object(&ctx).unwrap();
        assert_eq!(graphic.graphics_object().unwrap().primitive_names(), vec![1, 2]);
        (before, primitive_named(&graphic, 1))
    }

    #[test]
    fn test_volume_blocks_reused_inside_unit_cell() {
        let (before, after) = rebuild_after_unreported_edit(VolumeTexture::new("density"));
        assert_eq!(before, after);
    }

    #[test]
    fn test_volume_texture_outside_unit_cell_disables_reuse() {
        let mut texture = VolumeTexture::new("density");
        texture.xi_max = [1.5, 1.0, 1.0];
        let (before, after) = rebuild_after_unreported_edit(texture);
        assert_ne!(before, after);
    }

    /// Field module counting evaluation cache clears.
    struct CountingModule<'a> {
        region: &'a MemoryRegion,
        clears: std::cell::Cell<usize>,
    }

    impl FieldModule for CountingModule<'_> {
        fn evaluate(&self, field: &Field, location: &Location, time: f64) -> Option<Vec<f64>> {
            self.region.evaluate(field, location, time)
        }

        fn evaluate_mesh_location(
            &self,
            field: &Field,
            location: &Location,
            time: f64,
        ) -> Option<(ElementId, [f64; 3])> {
            self.region.evaluate_mesh_location(field, location, time)
        }

        fn begin_wrap_coordinate(&self, field: &Field) -> Result<Field> {
            self.region.begin_wrap_coordinate(field)
        }

        fn begin_wrap_orientation_scale(&self, field: &Field, coordinate: &Field) -> Result<Field> {
            self.region.begin_wrap_orientation_scale(field, coordinate)
        }

        fn end_wrap(&self, wrapped: &Field) {
            self.region.end_wrap(wrapped);
        }

        fn clear_cache(&self) {
            self.clears.set(self.clears.get() + 1);
        }
    }

    #[test]
    fn test_cache_cleared_on_every_build_exit() {
        let (mut region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let fibres = region.define_nodal_field("fibres", 3, CoordinateSystem::Fibre);
        let module = CountingModule {
            region: &region,
            clears: std::cell::Cell::new(0),
        };
        let generator = SampledGeometry::new();
        let ctx = ConversionContext::new(&region, &module, &generator);

        let mut graphic = lines(&coordinates);
        graphic.to_graphics_object(&ctx).unwrap();
        assert_eq!(module.clears.get(), 1);

        graphic.set_coordinate_field(None).unwrap();
        assert!(graphic.to_graphics_object(&ctx).is_err());
        assert_eq!(module.clears.get(), 2);

        graphic.set_coordinate_field(Some(fibres)).unwrap();
        assert!(graphic.to_graphics_object(&ctx).is_err());
        assert_eq!(module.clears.get(), 3);
        assert_eq!(region.active_wraps(), 0);

        let mut iso = Graphic::create(GraphicType::IsoSurfaces);
        iso.set_coordinate_field(Some(coordinates)).unwrap();
        assert!(iso.to_graphics_object(&ctx).is_err());
        assert_eq!(module.clears.get(), 4);
    }
}

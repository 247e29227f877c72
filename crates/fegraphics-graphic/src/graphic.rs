//! The graphic descriptor.
//!
//! A [`Graphic`] is one visualization layer over a region: a graphic type with
//! its fields, discretization and appearance, plus the graphics object last
//! generated from them. Setters validate before writing, so a rejected call
//! leaves the graphic exactly as it was, and mark the graphic dirty with the
//! appropriate [`GraphicChange`].

use std::sync::Arc;

use fegraphics_core::{
    region::meets_topological_criteria, ElementId, FaceType, FeRegion, Field, GraphicsError,
    Result, ValueType,
};
use fegraphics_render::{
    Glyph, GlyphSubscription, GraphicsObject, GraphicsObjectKind, Material, RenderType,
    SelectMode, Spectrum, Tessellation, VolumeTexture,
};

use crate::kind::{
    CylinderParameters, ElementSampling, GlyphParameters, GraphicKind, IsoParameters, IsoValues,
    StreamlineParameters, StreamlineSeed,
};
use crate::types::{
    GlyphScalingMode, GraphicChange, GraphicType, RenditionId, StreamlineDataType,
    StreamlineType, UseElementType,
};

/// One visualization layer over a finite element region.
#[derive(Debug)]
pub struct Graphic {
    pub(crate) position: u32,
    pub(crate) name: Option<String>,
    pub(crate) kind: GraphicKind,
    pub(crate) coordinate_field: Option<Field>,
    pub(crate) texture_coordinate_field: Option<Field>,
    pub(crate) data_field: Option<Field>,
    pub(crate) visibility_field: Option<Field>,
    pub(crate) native_discretization_field: Option<Field>,
    pub(crate) exterior: bool,
    pub(crate) face: FaceType,
    pub(crate) discretization: [u32; 3],
    pub(crate) circle_discretization: u32,
    pub(crate) tessellation: Option<Tessellation>,
    pub(crate) render_type: RenderType,
    pub(crate) select_mode: SelectMode,
    pub(crate) material: Option<Arc<Material>>,
    pub(crate) selected_material: Option<Arc<Material>>,
    pub(crate) secondary_material: Option<Arc<Material>>,
    pub(crate) spectrum: Option<Arc<Spectrum>>,
    pub(crate) visibility_flag: bool,
    pub(crate) overlay_order: Option<i32>,
    pub(crate) line_width: u32,
    pub(crate) rendition: Option<RenditionId>,
    pub(crate) graphics_object: Option<GraphicsObject>,
    pub(crate) graphics_changed: bool,
    pub(crate) selected_graphics_changed: bool,
    pub(crate) reuse_allowed: bool,
    pub(crate) time_dependent: bool,
    pub(crate) glyph_subscription: Option<GlyphSubscription>,
}

impl Graphic {
    /// Creates a graphic of the given type with default settings.
    ///
    /// The new graphic is dirty: its first conversion builds everything.
    pub fn create(graphic_type: GraphicType) -> Self {
        Self {
            position: 0,
            name: None,
            kind: GraphicKind::new(graphic_type),
            coordinate_field: None,
            texture_coordinate_field: None,
            data_field: None,
            visibility_field: None,
            native_discretization_field: None,
            exterior: false,
            face: FaceType::All,
            discretization: [1, 1, 1],
            circle_discretization: 6,
            tessellation: None,
            render_type: RenderType::Shaded,
            select_mode: SelectMode::On,
            material: Some(Arc::new(Material::default_material())),
            selected_material: Some(Arc::new(Material::default_selected())),
            secondary_material: None,
            spectrum: None,
            visibility_flag: true,
            overlay_order: None,
            line_width: 0,
            rendition: None,
            graphics_object: None,
            graphics_changed: true,
            selected_graphics_changed: true,
            reuse_allowed: false,
            time_dependent: false,
            glyph_subscription: None,
        }
    }

    /// Creates a graphic with the same settings and no graphics object.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let mut copy = Self::create(self.graphic_type());
        copy.copy_settings(self);
        copy.position = self.position;
        copy
    }

    /// Replaces every setting with those of `source`.
    ///
    /// Position and owning rendition are kept. The graphics object is discarded
    /// and the graphic is marked for a full rebuild. Fails without changes if
    /// `source` has a different graphic type.
    pub fn copy_from(&mut self, source: &Graphic) -> Result<()> {
        if source.graphic_type() != self.graphic_type() {
            return Err(GraphicsError::WrongGraphicType {
                operation: "copy",
                graphic_type: self.graphic_type().to_string(),
            });
        }
        self.copy_settings(source);
        Ok(())
    }

    fn copy_settings(&mut self, source: &Graphic) {
        self.name.clone_from(&source.name);
        self.kind = source.kind.clone();
        self.coordinate_field.clone_from(&source.coordinate_field);
        self.texture_coordinate_field
            .clone_from(&source.texture_coordinate_field);
        self.data_field.clone_from(&source.data_field);
        self.visibility_field.clone_from(&source.visibility_field);
        self.native_discretization_field
            .clone_from(&source.native_discretization_field);
        self.exterior = source.exterior;
        self.face = source.face;
        self.discretization = source.discretization;
        self.circle_discretization = source.circle_discretization;
        self.tessellation.clone_from(&source.tessellation);
        self.render_type = source.render_type;
        self.select_mode = source.select_mode;
        self.material.clone_from(&source.material);
        self.selected_material.clone_from(&source.selected_material);
        self.secondary_material.clone_from(&source.secondary_material);
        self.spectrum.clone_from(&source.spectrum);
        self.visibility_flag = source.visibility_flag;
        self.overlay_order = source.overlay_order;
        self.line_width = source.line_width;
        self.time_dependent = source.time_dependent;
        self.resubscribe_glyph();
        self.graphics_object = None;
        self.changed(GraphicChange::FullRebuild);
    }

    // ========== Identity ==========

    /// Graphic type; fixed at creation.
    #[must_use]
    pub fn graphic_type(&self) -> GraphicType {
        self.kind.graphic_type()
    }

    /// Type-specific parameters.
    #[must_use]
    pub fn kind(&self) -> &GraphicKind {
        &self.kind
    }

    /// Position in the owning list, 0 if not listed.
    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Explicit name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name, or the position when unnamed.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.position.to_string())
    }

    /// Sets or clears the name.
    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_string);
        self.changed(GraphicChange::Redraw);
    }

    /// Owning rendition.
    #[must_use]
    pub fn rendition(&self) -> Option<RenditionId> {
        self.rendition
    }

    /// Records the owning rendition; used for lookup only.
    pub fn set_rendition(&mut self, rendition: Option<RenditionId>) {
        self.rendition = rendition;
    }

    /// Name of the generated graphics object.
    ///
    /// `<prefix>.<position>`, with the visibility field name inserted after the
    /// prefix when one is set and `_<name>` appended for named graphics.
    #[must_use]
    pub fn graphics_object_name(&self, prefix: &str) -> String {
        let mut name = match &self.visibility_field {
            Some(field) => format!("{prefix}{}/.{}", field.name(), self.position),
            None => format!("{prefix}.{}", self.position),
        };
        if let Some(own) = &self.name {
            name.push('_');
            name.push_str(own);
        }
        name
    }

    // ========== Fields ==========

    /// Explicit coordinate field.
    #[must_use]
    pub fn coordinate_field(&self) -> Option<&Field> {
        self.coordinate_field.as_ref()
    }

    /// Sets the coordinate field; it must have 1 to 3 real components.
    pub fn set_coordinate_field(&mut self, field: Option<Field>) -> Result<()> {
        if let Some(field) = &field {
            require_up_to_3_components(field)?;
        }
        self.coordinate_field = field;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Texture coordinate field.
    #[must_use]
    pub fn texture_coordinate_field(&self) -> Option<&Field> {
        self.texture_coordinate_field.as_ref()
    }

    /// Sets the texture coordinate field; it must have 1 to 3 real components.
    pub fn set_texture_coordinate_field(&mut self, field: Option<Field>) -> Result<()> {
        if let Some(field) = &field {
            require_up_to_3_components(field)?;
        }
        self.texture_coordinate_field = field;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Field whose values colour the geometry through the spectrum.
    #[must_use]
    pub fn data_field(&self) -> Option<&Field> {
        self.data_field.as_ref()
    }

    /// Sets the data field; it must be real valued.
    pub fn set_data_field(&mut self, field: Option<Field>) -> Result<()> {
        if let Some(field) = &field {
            if field.value_type() != ValueType::Real {
                return Err(GraphicsError::InvalidArgument(format!(
                    "data field '{field}' is not real valued"
                )));
            }
        }
        self.data_field = field;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Field hiding elements and nodes where it is zero or undefined.
    #[must_use]
    pub fn visibility_field(&self) -> Option<&Field> {
        self.visibility_field.as_ref()
    }

    /// Sets the visibility field; it must be scalar.
    pub fn set_visibility_field(&mut self, field: Option<Field>) -> Result<()> {
        if let Some(field) = &field {
            require_scalar(field)?;
        }
        self.visibility_field = field;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Field whose element-based discretization scales sampling.
    #[must_use]
    pub fn native_discretization_field(&self) -> Option<&Field> {
        self.native_discretization_field.as_ref()
    }

    /// Sets the native discretization field.
    pub fn set_native_discretization_field(&mut self, field: Option<Field>) {
        self.native_discretization_field = field;
        if self.graphic_type().uses_elements() {
            self.changed(GraphicChange::FullRebuild);
        }
    }

    /// Every field the graphic references, type-specific ones included.
    #[must_use]
    pub fn referenced_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = [
            &self.coordinate_field,
            &self.texture_coordinate_field,
            &self.data_field,
            &self.visibility_field,
            &self.native_discretization_field,
        ]
        .into_iter()
        .filter_map(Option::as_ref)
        .collect();
        fields.extend(self.kind.fields());
        fields
    }

    // ========== Topology and sampling ==========

    /// Returns true if only exterior elements are drawn.
    #[must_use]
    pub fn exterior(&self) -> bool {
        self.exterior
    }

    /// Restricts drawing to exterior elements.
    pub fn set_exterior(&mut self, exterior: bool) -> Result<()> {
        self.require_elements("exterior")?;
        if self.exterior != exterior {
            self.exterior = exterior;
            self.changed(GraphicChange::FullRebuild);
        }
        Ok(())
    }

    /// Face restriction.
    #[must_use]
    pub fn face(&self) -> FaceType {
        self.face
    }

    /// Restricts drawing to elements on one face of their top-level parent.
    pub fn set_face(&mut self, face: FaceType) -> Result<()> {
        self.require_elements("face")?;
        if self.face != face {
            self.face = face;
            self.changed(GraphicChange::FullRebuild);
        }
        Ok(())
    }

    /// Divisions per xi direction.
    #[must_use]
    pub fn discretization(&self) -> [u32; 3] {
        self.discretization
    }

    /// Sets divisions per xi direction; each must be at least 1.
    pub fn set_discretization(&mut self, discretization: [u32; 3]) -> Result<()> {
        if discretization.contains(&0) {
            return Err(GraphicsError::InvalidArgument(
                "discretization must be at least 1 in every direction".to_string(),
            ));
        }
        if self.discretization != discretization {
            self.discretization = discretization;
            if self.graphic_type().uses_elements() {
                self.changed(GraphicChange::FullRebuild);
            }
        }
        Ok(())
    }

    /// Divisions around cylinders and extruded streamlines.
    #[must_use]
    pub fn circle_discretization(&self) -> u32 {
        self.tessellation
            .as_ref()
            .map_or(self.circle_discretization, Tessellation::circle_divisions)
    }

    /// Sets the circle discretization; at least 3.
    pub fn set_circle_discretization(&mut self, divisions: u32) -> Result<()> {
        if divisions < 3 {
            return Err(GraphicsError::InvalidArgument(
                "circle discretization must be at least 3".to_string(),
            ));
        }
        if self.circle_discretization != divisions {
            self.circle_discretization = divisions;
            if self.uses_circle_divisions() {
                self.changed(GraphicChange::FullRebuild);
            }
        }
        Ok(())
    }

    /// Shared tessellation overriding discretization.
    #[must_use]
    pub fn tessellation(&self) -> Option<&Tessellation> {
        self.tessellation.as_ref()
    }

    /// Sets or clears the tessellation.
    pub fn set_tessellation(&mut self, tessellation: Option<Tessellation>) {
        if self.tessellation != tessellation {
            self.tessellation = tessellation;
            if self.graphic_type().uses_elements() {
                self.changed(GraphicChange::FullRebuild);
            }
        }
    }

    pub(crate) fn uses_circle_divisions(&self) -> bool {
        match &self.kind {
            GraphicKind::Cylinders(_) => true,
            GraphicKind::Streamlines(s) => matches!(
                s.streamline_type,
                StreamlineType::ExtrudedCircle | StreamlineType::ExtrudedEllipse
            ),
            _ => false,
        }
    }

    /// Nominal element dimension drawn.
    ///
    /// 0 for point types, 1 for lines and cylinders, 2 for surfaces, 3 for
    /// volumes and streamlines; iso-surfaces and element points follow their
    /// use-element type.
    #[must_use]
    pub fn dimension(&self) -> u8 {
        match self.graphic_type() {
            GraphicType::NodePoints | GraphicType::DataPoints | GraphicType::Static => 0,
            GraphicType::Lines | GraphicType::Cylinders => 1,
            GraphicType::Surfaces => 2,
            GraphicType::Volumes | GraphicType::Streamlines => 3,
            GraphicType::IsoSurfaces | GraphicType::ElementPoints => self
                .kind
                .use_element_type()
                .map_or(3, UseElementType::dimension),
        }
    }

    /// Element dimension drawn in `region`.
    ///
    /// Top-level selections (use-elements, streamlines) resolve to the highest
    /// element dimension present.
    #[must_use]
    pub fn dimension_in(&self, region: &dyn FeRegion) -> u8 {
        let top_level = matches!(self.graphic_type(), GraphicType::Streamlines)
            || self.kind.use_element_type() == Some(UseElementType::Elements);
        if top_level {
            region.highest_dimension().clamp(1, 3)
        } else {
            self.dimension()
        }
    }

    /// Returns true if `element` is drawn by this graphic.
    #[must_use]
    pub fn uses_element(&self, region: &dyn FeRegion, element: ElementId) -> bool {
        self.graphic_type().uses_elements()
            && element.dimension == self.dimension_in(region)
            && meets_topological_criteria(region, element, self.exterior, self.face)
    }

    /// Divisions used to sample `element`.
    #[must_use]
    pub fn element_discretization(&self, region: &dyn FeRegion, element: ElementId) -> [u32; 3] {
        let native = self
            .native_discretization_field
            .as_ref()
            .and_then(|field| region.native_discretization(element, field));
        match (&self.tessellation, native) {
            (Some(tessellation), native) => tessellation.element_divisions(native),
            (None, Some(native)) => {
                std::array::from_fn(|i| native[i].max(1) * self.discretization[i])
            }
            (None, None) => self.discretization,
        }
    }

    // ========== Appearance ==========

    /// Surface render type.
    #[must_use]
    pub fn render_type(&self) -> RenderType {
        self.render_type
    }

    /// Sets the render type; the graphics object is regenerated.
    pub fn set_render_type(&mut self, render_type: RenderType) {
        if self.render_type != render_type {
            self.render_type = render_type;
            self.changed(GraphicChange::FullRebuild);
        }
    }

    /// Selection mode.
    #[must_use]
    pub fn select_mode(&self) -> SelectMode {
        self.select_mode
    }

    /// Sets the selection mode.
    ///
    /// Switching into or out of a mode that filters geometry needs a full
    /// rebuild; other switches only redo selection highlighting.
    pub fn set_select_mode(&mut self, select_mode: SelectMode) {
        if self.select_mode == select_mode {
            return;
        }
        let filters = self.select_mode.filters_geometry() || select_mode.filters_geometry();
        self.select_mode = select_mode;
        if filters {
            self.changed(GraphicChange::FullRebuild);
        } else {
            self.update_graphics_object_trivial();
            self.changed(GraphicChange::Selection);
        }
    }

    /// Material for unselected geometry.
    #[must_use]
    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    /// Sets the material; the graphics object is updated in place.
    pub fn set_material(&mut self, material: Option<Arc<Material>>) {
        self.material = material;
        self.update_graphics_object_trivial();
        self.changed(GraphicChange::Recompile);
    }

    /// Material for selected geometry.
    #[must_use]
    pub fn selected_material(&self) -> Option<&Arc<Material>> {
        self.selected_material.as_ref()
    }

    /// Sets the selected material; the graphics object is updated in place.
    pub fn set_selected_material(&mut self, material: Option<Arc<Material>>) {
        self.selected_material = material;
        self.update_graphics_object_trivial();
        self.changed(GraphicChange::Recompile);
    }

    /// Secondary material used by some glyphs.
    #[must_use]
    pub fn secondary_material(&self) -> Option<&Arc<Material>> {
        self.secondary_material.as_ref()
    }

    /// Sets the secondary material; the graphics object is updated in place.
    pub fn set_secondary_material(&mut self, material: Option<Arc<Material>>) {
        self.secondary_material = material;
        self.update_graphics_object_trivial();
        self.changed(GraphicChange::Recompile);
    }

    /// Spectrum colouring data values.
    #[must_use]
    pub fn spectrum(&self) -> Option<&Arc<Spectrum>> {
        self.spectrum.as_ref()
    }

    /// Sets the spectrum; the graphics object is updated in place.
    pub fn set_spectrum(&mut self, spectrum: Option<Arc<Spectrum>>) {
        self.spectrum = spectrum;
        self.update_graphics_object_trivial();
        self.changed(GraphicChange::Recompile);
    }

    /// Returns true if generated geometry carries data values for a spectrum.
    #[must_use]
    pub fn needs_spectrum(&self) -> bool {
        self.data_field.is_some()
            || matches!(&self.kind, GraphicKind::Streamlines(s) if s.data_type != StreamlineDataType::NoData)
    }

    /// Visibility flag.
    #[must_use]
    pub fn visibility_flag(&self) -> bool {
        self.visibility_flag
    }

    /// Shows or hides the graphic without touching its geometry.
    pub fn set_visibility_flag(&mut self, visible: bool) {
        if self.visibility_flag != visible {
            self.visibility_flag = visible;
            self.changed(GraphicChange::Redraw);
        }
    }

    /// Overlay order, `None` when drawn in the main pass.
    #[must_use]
    pub fn overlay_order(&self) -> Option<i32> {
        self.overlay_order
    }

    /// Draws the graphic in the overlay pass with the given order.
    pub fn set_overlay_order(&mut self, order: Option<i32>) {
        if self.overlay_order != order {
            self.overlay_order = order;
            self.changed(GraphicChange::Redraw);
        }
    }

    /// Line width in pixels, 0 for the renderer default.
    #[must_use]
    pub fn line_width(&self) -> u32 {
        self.line_width
    }

    /// Sets the line width.
    pub fn set_line_width(&mut self, width: u32) {
        if self.line_width != width {
            self.line_width = width;
            self.changed(GraphicChange::FullRebuild);
        }
    }

    // ========== Type-specific parameters ==========

    /// Glyph settings of point-like graphics.
    #[must_use]
    pub fn glyph_parameters(&self) -> Option<&GlyphParameters> {
        self.kind.point_attributes().map(|p| &p.glyph)
    }

    /// Sets glyph, scaling and orientation for point-like graphics.
    ///
    /// The orientation/scale field must be orientation-scale capable and the
    /// variable scale field must have 1 to 3 real components.
    #[allow(clippy::too_many_arguments)]
    pub fn set_glyph_parameters(
        &mut self,
        glyph: Option<Glyph>,
        scaling_mode: GlyphScalingMode,
        centre: [f64; 3],
        base_size: [f64; 3],
        orientation_scale_field: Option<Field>,
        scale_factors: [f64; 3],
        variable_scale_field: Option<Field>,
    ) -> Result<()> {
        let graphic_type = self.graphic_type();
        let Some(points) = self.kind.point_attributes_mut() else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "glyph parameters",
                graphic_type: graphic_type.to_string(),
            });
        };
        if let Some(field) = &orientation_scale_field {
            if !field.is_orientation_scale_capable() {
                return Err(GraphicsError::ComponentCount {
                    field: field.name().to_string(),
                    expected: "1, 2, 3, 4, 6 or 9",
                    actual: field.number_of_components(),
                });
            }
        }
        if let Some(field) = &variable_scale_field {
            require_up_to_3_components(field)?;
        }
        points.glyph = GlyphParameters {
            glyph,
            scaling_mode,
            centre,
            base_size,
            scale_factors,
            orientation_scale_field,
            variable_scale_field,
        };
        self.resubscribe_glyph();
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Label field of point-like graphics.
    #[must_use]
    pub fn label_field(&self) -> Option<&Field> {
        self.kind
            .point_attributes()
            .and_then(|p| p.label_field.as_ref())
    }

    /// Sets the label field of a point-like graphic.
    pub fn set_label_field(&mut self, field: Option<Field>) -> Result<()> {
        let graphic_type = self.graphic_type();
        let Some(points) = self.kind.point_attributes_mut() else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "label field",
                graphic_type: graphic_type.to_string(),
            });
        };
        points.label_field = field;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Iso-surface settings.
    #[must_use]
    pub fn iso_parameters(&self) -> Option<&IsoParameters> {
        match &self.kind {
            GraphicKind::IsoSurfaces(iso) => Some(iso),
            _ => None,
        }
    }

    /// Sets the iso-scalar field, iso-values and decimation threshold.
    ///
    /// Use [`IsoValues::from_parts`] to build values from the flat
    /// count/list/first/last form.
    pub fn set_iso_surface_parameters(
        &mut self,
        scalar_field: Field,
        values: IsoValues,
        decimation_threshold: f64,
    ) -> Result<()> {
        let graphic_type = self.graphic_type();
        let GraphicKind::IsoSurfaces(iso) = &mut self.kind else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "iso-surface parameters",
                graphic_type: graphic_type.to_string(),
            });
        };
        require_scalar(&scalar_field)?;
        if values.is_empty() {
            return Err(GraphicsError::InvalidArgument(
                "at least one iso-value is required".to_string(),
            ));
        }
        if decimation_threshold < 0.0 {
            return Err(GraphicsError::InvalidArgument(
                "decimation threshold must not be negative".to_string(),
            ));
        }
        iso.scalar_field = Some(scalar_field);
        iso.values = values;
        iso.decimation_threshold = decimation_threshold;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Selects the element dimension of iso-surface and element point graphics.
    pub fn set_use_element_type(&mut self, use_element_type: UseElementType) -> Result<()> {
        let graphic_type = self.graphic_type();
        let target = match &mut self.kind {
            GraphicKind::IsoSurfaces(iso) => &mut iso.use_element_type,
            GraphicKind::ElementPoints(points) => &mut points.use_element_type,
            _ => {
                return Err(GraphicsError::WrongGraphicType {
                    operation: "use element type",
                    graphic_type: graphic_type.to_string(),
                })
            }
        };
        if *target != use_element_type {
            *target = use_element_type;
            self.changed(GraphicChange::FullRebuild);
        }
        Ok(())
    }

    /// Cylinder radius settings.
    #[must_use]
    pub fn cylinder_parameters(&self) -> Option<&CylinderParameters> {
        match &self.kind {
            GraphicKind::Cylinders(c) => Some(c),
            _ => None,
        }
    }

    /// Sets the cylinder radius as `constant + scale_factor * scalar`.
    pub fn set_radius_parameters(
        &mut self,
        constant_radius: f64,
        scale_factor: f64,
        radius_scalar_field: Option<Field>,
    ) -> Result<()> {
        let graphic_type = self.graphic_type();
        let GraphicKind::Cylinders(cylinders) = &mut self.kind else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "radius parameters",
                graphic_type: graphic_type.to_string(),
            });
        };
        if let Some(field) = &radius_scalar_field {
            require_scalar(field)?;
        }
        *cylinders = CylinderParameters {
            constant_radius,
            scale_factor,
            radius_scalar_field,
        };
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Streamline settings.
    #[must_use]
    pub fn streamline_parameters(&self) -> Option<&StreamlineParameters> {
        match &self.kind {
            GraphicKind::Streamlines(s) => Some(s),
            _ => None,
        }
    }

    /// Sets the streamline type, stream vector field, direction, length and width.
    pub fn set_streamline_parameters(
        &mut self,
        streamline_type: StreamlineType,
        vector_field: Field,
        reverse: bool,
        length: f64,
        width: f64,
    ) -> Result<()> {
        let graphic_type = self.graphic_type();
        let GraphicKind::Streamlines(streamlines) = &mut self.kind else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "streamline parameters",
                graphic_type: graphic_type.to_string(),
            });
        };
        if vector_field.value_type() != ValueType::Real
            || !matches!(vector_field.number_of_components(), 1..=3 | 6 | 9)
        {
            return Err(GraphicsError::ComponentCount {
                field: vector_field.name().to_string(),
                expected: "1, 2, 3, 6 or 9",
                actual: vector_field.number_of_components(),
            });
        }
        if length <= 0.0 || width < 0.0 {
            return Err(GraphicsError::InvalidArgument(
                "streamline length must be positive and width not negative".to_string(),
            ));
        }
        streamlines.streamline_type = streamline_type;
        streamlines.vector_field = Some(vector_field);
        streamlines.reverse = reverse;
        streamlines.length = length;
        streamlines.width = width;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Sets the value stored as data along streamlines.
    pub fn set_streamline_data_type(&mut self, data_type: StreamlineDataType) -> Result<()> {
        let graphic_type = self.graphic_type();
        let GraphicKind::Streamlines(streamlines) = &mut self.kind else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "streamline data type",
                graphic_type: graphic_type.to_string(),
            });
        };
        if streamlines.data_type != data_type {
            streamlines.data_type = data_type;
            self.changed(GraphicChange::FullRebuild);
        }
        Ok(())
    }

    /// Sets where streamlines start.
    pub fn set_streamline_seed(&mut self, seed: StreamlineSeed) -> Result<()> {
        let graphic_type = self.graphic_type();
        let GraphicKind::Streamlines(streamlines) = &mut self.kind else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "streamline seed",
                graphic_type: graphic_type.to_string(),
            });
        };
        if let StreamlineSeed::Nodes {
            mesh_location_field,
            ..
        } = &seed
        {
            if mesh_location_field.value_type() != ValueType::MeshLocation {
                return Err(GraphicsError::InvalidArgument(format!(
                    "seed field '{mesh_location_field}' is not a mesh location field"
                )));
            }
        }
        streamlines.seed = seed;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Sample point settings of element point and streamline graphics.
    #[must_use]
    pub fn element_sampling(&self) -> Option<&ElementSampling> {
        self.kind.element_sampling()
    }

    /// Sets how sample points are placed in elements.
    pub fn set_element_sampling(&mut self, sampling: ElementSampling) -> Result<()> {
        let graphic_type = self.graphic_type();
        let target = match &mut self.kind {
            GraphicKind::ElementPoints(points) => &mut points.sampling,
            GraphicKind::Streamlines(streamlines) => &mut streamlines.sampling,
            _ => {
                return Err(GraphicsError::WrongGraphicType {
                    operation: "element sampling",
                    graphic_type: graphic_type.to_string(),
                })
            }
        };
        sampling.validate()?;
        *target = sampling;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Sets the volume texture of a volumes graphic.
    pub fn set_volume_texture(&mut self, texture: Option<VolumeTexture>) -> Result<()> {
        let graphic_type = self.graphic_type();
        let GraphicKind::Volumes(volumes) = &mut self.kind else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "volume texture",
                graphic_type: graphic_type.to_string(),
            });
        };
        volumes.texture = texture;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    /// Restricts a volumes graphic to one element.
    pub fn set_seed_element(&mut self, element: Option<ElementId>) -> Result<()> {
        let graphic_type = self.graphic_type();
        let GraphicKind::Volumes(volumes) = &mut self.kind else {
            return Err(GraphicsError::WrongGraphicType {
                operation: "seed element",
                graphic_type: graphic_type.to_string(),
            });
        };
        volumes.seed_element = element;
        self.changed(GraphicChange::FullRebuild);
        Ok(())
    }

    // ========== Generated state ==========

    /// The generated graphics object.
    #[must_use]
    pub fn graphics_object(&self) -> Option<&GraphicsObject> {
        self.graphics_object.as_ref()
    }

    /// Returns true if geometry must be regenerated.
    #[must_use]
    pub fn graphics_changed(&self) -> bool {
        self.graphics_changed
    }

    /// Returns true if selection highlighting must be recomputed.
    #[must_use]
    pub fn selected_graphics_changed(&self) -> bool {
        self.selected_graphics_changed
    }

    /// Returns true if geometry depends on time.
    #[must_use]
    pub fn is_time_dependent(&self) -> bool {
        self.time_dependent
    }

    /// Graphics object kind generated in `region`.
    #[must_use]
    pub fn graphics_object_kind(&self, region: &dyn FeRegion) -> GraphicsObjectKind {
        match &self.kind {
            GraphicKind::Lines => GraphicsObjectKind::PolylineVertexBuffers,
            GraphicKind::Cylinders(_) | GraphicKind::Surfaces => GraphicsObjectKind::Surface,
            GraphicKind::IsoSurfaces(_) => {
                if self.dimension_in(region) == 3 {
                    GraphicsObjectKind::Surface
                } else {
                    GraphicsObjectKind::Polyline
                }
            }
            GraphicKind::Streamlines(s) => {
                if s.streamline_type == StreamlineType::Line {
                    GraphicsObjectKind::Polyline
                } else {
                    GraphicsObjectKind::Surface
                }
            }
            GraphicKind::NodePoints(_)
            | GraphicKind::DataPoints(_)
            | GraphicKind::ElementPoints(_)
            | GraphicKind::Static(_) => GraphicsObjectKind::GlyphSet,
            GraphicKind::Volumes(_) => GraphicsObjectKind::Voltex,
        }
    }

    fn require_elements(&self, operation: &'static str) -> Result<()> {
        if self.graphic_type().uses_elements() {
            Ok(())
        } else {
            Err(GraphicsError::WrongGraphicType {
                operation,
                graphic_type: self.graphic_type().to_string(),
            })
        }
    }

    fn resubscribe_glyph(&mut self) {
        self.glyph_subscription = self
            .glyph_parameters()
            .and_then(|g| g.glyph.as_ref())
            .map(Glyph::subscribe);
    }
}

fn require_up_to_3_components(field: &Field) -> Result<()> {
    if field.has_up_to_3_numerical_components() {
        Ok(())
    } else {
        Err(GraphicsError::ComponentCount {
            field: field.name().to_string(),
            expected: "1 to 3",
            actual: field.number_of_components(),
        })
    }
}

fn require_scalar(field: &Field) -> Result<()> {
    if field.is_scalar() {
        Ok(())
    } else {
        Err(GraphicsError::ComponentCount {
            field: field.name().to_string(),
            expected: "1",
            actual: field.number_of_components(),
        })
    }
}

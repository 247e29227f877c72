//! Graphics of one region.
//!
//! A [`Rendition`] owns the ordered graphic list drawn over one region and
//! forwards change notifications from the region, its fields, materials,
//! spectra, tessellations, glyphs, selection and time to every graphic.

use fegraphics_core::{ChangeLog, FeRegion, Field, FieldId, Options, RegionChanges, Result};
use fegraphics_graphic::{
    ConversionContext, Graphic, GraphicChange, GraphicList, GraphicType, RenditionId,
};
use fegraphics_render::{
    Bounds, MaterialRegistry, RenderResult, Renderer, SpectrumRegistry, TessellationChange,
};

/// Ordered graphics over one region.
#[derive(Debug)]
pub struct Rendition {
    id: RenditionId,
    options: Options,
    graphics: GraphicList,
    default_coordinate_field: Option<Field>,
}

impl Rendition {
    /// Creates an empty rendition.
    pub fn new(id: RenditionId, options: Options) -> Self {
        Self {
            id,
            options,
            graphics: GraphicList::new(),
            default_coordinate_field: None,
        }
    }

    /// Identifier recorded on every graphic of this rendition.
    #[must_use]
    pub fn id(&self) -> RenditionId {
        self.id
    }

    /// Conversion options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Graphics in draw order.
    #[must_use]
    pub fn graphics(&self) -> &GraphicList {
        &self.graphics
    }

    /// Mutable graphic at a 1-based position.
    pub fn graphic_mut(&mut self, position: u32) -> Option<&mut Graphic> {
        self.graphics.get_mut(position)
    }

    // ========== Graphic list ==========

    /// Creates a graphic with the rendition's default discretizations.
    ///
    /// The graphic is not added; see [`Rendition::add_graphic`].
    #[must_use]
    pub fn create_graphic(&self, graphic_type: GraphicType) -> Graphic {
        let mut graphic = Graphic::create(graphic_type);
        if let Err(e) = graphic.set_discretization(self.options.default_discretization) {
            log::warn!("ignoring default discretization: {e}");
        }
        if let Err(e) = graphic.set_circle_discretization(self.options.default_circle_discretization)
        {
            log::warn!("ignoring default circle discretization: {e}");
        }
        graphic.set_rendition(Some(self.id));
        graphic
    }

    /// Adds `graphic` at a 1-based position (0 appends) and returns the position used.
    pub fn add_graphic(&mut self, mut graphic: Graphic, position: u32) -> u32 {
        graphic.set_rendition(Some(self.id));
        self.graphics.add(graphic, position)
    }

    /// Removes and returns the graphic at `position`.
    pub fn remove_graphic(&mut self, position: u32) -> Result<Graphic> {
        let mut graphic = self.graphics.remove(position)?;
        graphic.set_rendition(None);
        Ok(graphic)
    }

    /// Copies the settings of `source` onto the graphic at `position`.
    pub fn modify_graphic(&mut self, position: u32, source: &Graphic) -> Result<()> {
        self.graphics.modify(position, source)
    }

    /// Editable copy of the graphic list, without graphics objects.
    #[must_use]
    pub fn copy_graphics(&self) -> GraphicList {
        self.graphics.copy_and_put_in_list()
    }

    /// Replaces the graphic list with `graphics`.
    ///
    /// Each new graphic takes over the graphics object of an equivalent graphic
    /// in the current list, so unchanged geometry survives the swap.
    pub fn replace_graphics(&mut self, mut graphics: GraphicList) {
        let mut reused = 0;
        for graphic in graphics.iter_mut() {
            graphic.set_rendition(Some(self.id));
            if graphic.extract_graphics_object_from_list(&mut self.graphics) {
                reused += 1;
            }
        }
        log::debug!(
            "replaced {} graphics with {}, {reused} graphics objects reused",
            self.graphics.len(),
            graphics.len()
        );
        self.graphics = graphics;
    }

    // ========== Default coordinate field ==========

    /// Coordinate field of graphics without their own.
    #[must_use]
    pub fn default_coordinate_field(&self) -> Option<&Field> {
        self.default_coordinate_field.as_ref()
    }

    /// Sets the default coordinate field; graphics relying on it are rebuilt.
    pub fn set_default_coordinate_field(&mut self, field: Option<Field>) {
        if self.default_coordinate_field == field {
            return;
        }
        self.default_coordinate_field = field;
        for graphic in self.graphics.iter_mut() {
            if graphic.coordinate_field().is_none() {
                graphic.changed(GraphicChange::FullRebuild);
            }
        }
    }

    // ========== Conversion ==========

    /// Rebuilds every graphic that needs it and returns the number that failed.
    ///
    /// The rendition's name prefix and default coordinate field apply unless
    /// `ctx` sets its own.
    pub fn build(&mut self, ctx: &ConversionContext<'_>) -> usize {
        let prefix = self.options.name_prefix.clone();
        let default_coordinate = self.default_coordinate_field.clone();
        let ctx = ConversionContext {
            name_prefix: if ctx.name_prefix.is_empty() {
                &prefix
            } else {
                ctx.name_prefix
            },
            default_coordinate_field: ctx
                .default_coordinate_field
                .or(default_coordinate.as_ref()),
            ..*ctx
        };
        let failures = self.graphics.build_all(&ctx);
        if failures > 0 {
            log::warn!("{failures} of {} graphics failed to build", self.graphics.len());
        }
        failures
    }

    /// Compiles the graphics objects of visible graphics.
    pub fn compile(&mut self, renderer: &mut dyn Renderer) -> RenderResult<()> {
        self.graphics.compile_visible(renderer)
    }

    /// Draws visible graphics in order, picked by position.
    pub fn execute(&self, renderer: &mut dyn Renderer) -> RenderResult<()> {
        self.graphics.execute_visible(renderer)
    }

    /// Bounding box of all visible generated geometry.
    #[must_use]
    pub fn visible_range(&self) -> Option<Bounds> {
        self.graphics.visible_range()
    }

    // ========== Change notification ==========

    fn dispatch(&mut self, notify: impl FnMut(&mut Graphic) -> GraphicChange) -> GraphicChange {
        self.graphics
            .iter_mut()
            .map(notify)
            .fold(GraphicChange::None, GraphicChange::max)
    }

    /// Forwards a change in the rendition's own region.
    pub fn region_changed(&mut self, region: &dyn FeRegion, changes: &RegionChanges) -> GraphicChange {
        let policy = self.options.rebuild_policy;
        let default_coordinate = self.default_coordinate_field.clone();
        self.dispatch(|g| g.region_change(region, changes, default_coordinate.as_ref(), &policy))
    }

    /// Forwards a change in the data point region.
    pub fn data_region_changed(&mut self, changes: &RegionChanges) -> GraphicChange {
        let default_coordinate = self.default_coordinate_field.clone();
        self.dispatch(|g| g.data_region_change(changes, default_coordinate.as_ref()))
    }

    /// Forwards field definition changes.
    pub fn fields_changed(&mut self, changes: &ChangeLog<FieldId>) -> GraphicChange {
        let default_coordinate = self.default_coordinate_field.clone();
        self.dispatch(|g| g.field_change(changes, default_coordinate.as_ref()))
    }

    /// Forwards material edits.
    pub fn materials_changed(
        &mut self,
        changes: &ChangeLog<String>,
        registry: &MaterialRegistry,
    ) -> GraphicChange {
        self.dispatch(|g| g.material_change(changes, registry))
    }

    /// Forwards spectrum edits.
    pub fn spectra_changed(
        &mut self,
        changes: &ChangeLog<String>,
        registry: &SpectrumRegistry,
    ) -> GraphicChange {
        self.dispatch(|g| g.spectrum_change(changes, registry))
    }

    /// Forwards a tessellation edit.
    pub fn tessellation_changed(&mut self, change: &TessellationChange) -> GraphicChange {
        self.dispatch(|g| g.tessellation_change(change))
    }

    /// Checks every glyph subscription for edits.
    pub fn poll_glyphs(&mut self) -> GraphicChange {
        self.dispatch(Graphic::poll_glyph_change)
    }

    /// Forwards a selection change.
    pub fn selection_changed(&mut self) -> GraphicChange {
        self.dispatch(Graphic::selection_change)
    }

    /// Forwards a time change.
    pub fn time_changed(&mut self) -> GraphicChange {
        self.dispatch(Graphic::time_change)
    }

    /// Recomputes time dependence; returns true if any graphic depends on time.
    pub fn update_time_behaviour(&mut self) -> bool {
        let default_varies = self
            .default_coordinate_field
            .as_ref()
            .is_some_and(Field::has_multiple_times);
        let mut time_dependent = false;
        for graphic in self.graphics.iter_mut() {
            time_dependent |= graphic.update_time_behaviour(default_varies);
        }
        time_dependent
    }

    /// Releases every field handle held by the rendition and its graphics.
    pub fn detach_fields(&mut self) {
        self.default_coordinate_field = None;
        for graphic in self.graphics.iter_mut() {
            graphic.detach_fields();
        }
        log::debug!("rendition {:?} detached from its fields", self.id);
    }
}

//! Graphics objects: named containers of renderable primitives.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use fegraphics_core::MultiRange;

use crate::error::{RenderError, RenderResult};
use crate::material::Material;
use crate::primitive::{weld_surfaces, Bounds, Primitive};
use crate::spectrum::Spectrum;

/// The kind of primitives a graphics object holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicsObjectKind {
    /// Polylines sharing one vertex buffer.
    PolylineVertexBuffers,
    /// Independent polylines.
    Polyline,
    /// Triangle surfaces.
    Surface,
    /// Glyph sets.
    GlyphSet,
    /// Volume blocks.
    Voltex,
}

impl GraphicsObjectKind {
    /// Returns true if a primitive of `kind` may be added to an object of this kind.
    #[must_use]
    pub fn accepts(self, kind: GraphicsObjectKind) -> bool {
        match self {
            Self::PolylineVertexBuffers | Self::Polyline => kind == Self::Polyline,
            other => other == kind,
        }
    }
}

/// How surfaces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderType {
    /// Filled, lit triangles.
    #[default]
    Shaded,
    /// Triangle edges only.
    Wireframe,
}

/// How selection affects drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectMode {
    /// Draw everything; selected parts use the selected material.
    #[default]
    On,
    /// Draw everything with no selection highlighting and no picking.
    NoSelect,
    /// Draw only selected parts.
    DrawSelected,
    /// Draw only unselected parts.
    DrawUnselected,
}

impl SelectMode {
    /// Returns true if the mode filters geometry rather than just colouring it.
    #[must_use]
    pub fn filters_geometry(self) -> bool {
        matches!(self, Self::DrawSelected | Self::DrawUnselected)
    }
}

/// A renderable collection of primitives with display attributes.
#[derive(Debug, Clone)]
pub struct GraphicsObject {
    name: String,
    kind: GraphicsObjectKind,
    primitives: Vec<Primitive>,
    /// Material for unselected parts.
    pub material: Option<Arc<Material>>,
    /// Material for selected parts.
    pub selected_material: Option<Arc<Material>>,
    /// Secondary material, used by some glyphs.
    pub secondary_material: Option<Arc<Material>>,
    /// Spectrum for colouring by data values.
    pub spectrum: Option<Arc<Spectrum>>,
    /// Name of the glyph for glyph sets.
    pub glyph: Option<String>,
    /// Surface render type.
    pub render_type: RenderType,
    /// Selection behaviour.
    pub select_mode: SelectMode,
    selected_names: BTreeSet<i32>,
    selected_points: BTreeMap<i32, MultiRange>,
    generation: u64,
    compiled_generation: Option<u64>,
}

impl GraphicsObject {
    /// Creates an empty graphics object.
    pub fn new(name: impl Into<String>, kind: GraphicsObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primitives: Vec::new(),
            material: None,
            selected_material: None,
            secondary_material: None,
            spectrum: None,
            glyph: None,
            render_type: RenderType::default(),
            select_mode: SelectMode::default(),
            selected_names: BTreeSet::new(),
            selected_points: BTreeMap::new(),
            generation: 0,
            compiled_generation: None,
        }
    }

    /// Object name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the object.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Primitive kind held.
    #[must_use]
    pub fn kind(&self) -> GraphicsObjectKind {
        self.kind
    }

    /// Primitives in insertion order.
    #[must_use]
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Number of primitives.
    #[must_use]
    pub fn number_of_primitives(&self) -> usize {
        self.primitives.len()
    }

    /// Adds a primitive, rejecting kinds the object cannot hold.
    pub fn add_primitive(&mut self, primitive: Primitive) -> RenderResult<()> {
        let found = primitive.kind();
        if !self.kind.accepts(found) {
            return Err(RenderError::PrimitiveKindMismatch {
                object: self.name.clone(),
                expected: self.kind,
                found,
            });
        }
        self.primitives.push(primitive);
        Ok(())
    }

    /// Removes and returns every primitive.
    pub fn take_primitives(&mut self) -> Vec<Primitive> {
        std::mem::take(&mut self.primitives)
    }

    /// Removes primitives matching `predicate`, returning how many were removed.
    pub fn remove_primitives_where(&mut self, mut predicate: impl FnMut(&Primitive) -> bool) -> usize {
        let before = self.primitives.len();
        self.primitives.retain(|p| !predicate(p));
        before - self.primitives.len()
    }

    /// Decimates and normalises every surface primitive as one mesh.
    pub fn weld_surfaces(&mut self, tolerance: f32) {
        weld_surfaces(
            self.primitives.iter_mut().filter_map(|primitive| match primitive {
                Primitive::Surface(surface) => Some(surface),
                _ => None,
            }),
            tolerance,
        );
    }

    /// Removes all primitives.
    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    /// Distinct primitive names in ascending order.
    #[must_use]
    pub fn primitive_names(&self) -> Vec<i32> {
        let names: BTreeSet<i32> = self.primitives.iter().filter_map(Primitive::name).collect();
        names.into_iter().collect()
    }

    /// Replaces the highlighted names and per-name point ranges.
    pub fn set_selection(&mut self, names: BTreeSet<i32>, points: BTreeMap<i32, MultiRange>) {
        self.selected_names = names;
        self.selected_points = points;
    }

    /// Names drawn with the selected material.
    #[must_use]
    pub fn selected_names(&self) -> &BTreeSet<i32> {
        &self.selected_names
    }

    /// Selected glyph point ranges keyed by primitive name.
    #[must_use]
    pub fn selected_points(&self) -> &BTreeMap<i32, MultiRange> {
        &self.selected_points
    }

    /// Returns true if `name` is highlighted.
    #[must_use]
    pub fn is_name_selected(&self, name: i32) -> bool {
        self.selected_names.contains(&name)
    }

    /// Marks the object as changed so it is recompiled before the next draw.
    pub fn changed(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Counter bumped by every [`GraphicsObject::changed`] call.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if the object changed since it was last compiled.
    #[must_use]
    pub fn needs_compile(&self) -> bool {
        self.compiled_generation != Some(self.generation)
    }

    /// Records that the current state has been compiled.
    pub fn mark_compiled(&mut self) {
        self.compiled_generation = Some(self.generation);
    }

    /// Bounding box of every primitive, `None` if empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds = None;
        for primitive in &self.primitives {
            primitive.extend_bounds(&mut bounds);
        }
        bounds
    }
}

//! Change propagation from the model into graphics.
//!
//! Every kind of external edit (region, field, material, spectrum, glyph,
//! tessellation, selection, time) maps to a [`GraphicChange`] describing the
//! least work that brings the graphics object up to date.

use std::sync::Arc;

use fegraphics_core::{
    ChangeFlags, ChangeLog, ElementId, FeRegion, Field, FieldId, RebuildPolicy, RegionChanges,
};
use fegraphics_render::{MaterialRegistry, SpectrumRegistry, TessellationChange};

use crate::graphic::Graphic;
use crate::kind::GraphicKind;
use crate::types::{GraphicChange, GraphicType};

impl Graphic {
    /// Marks the graphic as needing the given level of work.
    ///
    /// Flags only ever accumulate here; the conversion clears them.
    pub fn changed(&mut self, change: GraphicChange) {
        match change {
            GraphicChange::None | GraphicChange::Redraw => {}
            GraphicChange::Recompile => {
                self.selected_graphics_changed = true;
                if let Some(object) = &mut self.graphics_object {
                    object.changed();
                }
            }
            GraphicChange::Selection => self.selected_graphics_changed = true,
            GraphicChange::PartialRebuild => self.graphics_changed = true,
            GraphicChange::FullRebuild => {
                self.graphics_changed = true;
                self.selected_graphics_changed = true;
                self.reuse_allowed = false;
            }
        }
        if change > GraphicChange::None {
            log::trace!("graphic {} changed: {change:?}", self.display_name());
        }
    }

    /// Fields whose changes affect this graphic.
    fn used_fields<'a>(&'a self, default_coordinate: Option<&'a Field>) -> Vec<&'a Field> {
        let mut fields = self.referenced_fields();
        if self.coordinate_field.is_none() {
            fields.extend(default_coordinate);
        }
        fields
    }

    fn uses_changed_field(
        &self,
        changes: &ChangeLog<FieldId>,
        flags: ChangeFlags,
        default_coordinate: Option<&Field>,
    ) -> bool {
        self.used_fields(default_coordinate)
            .into_iter()
            .any(|field| field.depends_on_changed_with(changes, flags))
    }

    /// Responds to field definition changes outside any region edit.
    pub fn field_change(
        &mut self,
        changes: &ChangeLog<FieldId>,
        default_coordinate: Option<&Field>,
    ) -> GraphicChange {
        let change = if self.uses_changed_field(changes, ChangeFlags::ALL, default_coordinate) {
            GraphicChange::FullRebuild
        } else {
            GraphicChange::None
        };
        self.changed(change);
        change
    }

    /// Responds to changes in the graphic's own region.
    ///
    /// Small edits to fields, nodes or elements of element-based graphics
    /// remove only the affected primitives so the next conversion regenerates
    /// just those; larger edits, identifier changes and field redefinitions
    /// force a full rebuild.
    pub fn region_change(
        &mut self,
        region: &dyn FeRegion,
        changes: &RegionChanges,
        default_coordinate: Option<&Field>,
        policy: &RebuildPolicy,
    ) -> GraphicChange {
        let change = match self.graphic_type() {
            GraphicType::DataPoints | GraphicType::Static => GraphicChange::None,
            GraphicType::NodePoints => self.node_points_change(changes, default_coordinate),
            GraphicType::Streamlines => {
                if self.graphics_object.is_none() {
                    GraphicChange::Redraw
                } else if changes.element_structure_changed()
                    || self.uses_changed_field(&changes.fields, ChangeFlags::ALL, default_coordinate)
                    || changes.elements.summary().intersects(ChangeFlags::DEFINITION)
                {
                    GraphicChange::FullRebuild
                } else {
                    GraphicChange::None
                }
            }
            _ => self.element_graphic_change(region, changes, default_coordinate, policy),
        };
        self.changed(change);
        change
    }

    fn node_points_change(
        &self,
        changes: &RegionChanges,
        default_coordinate: Option<&Field>,
    ) -> GraphicChange {
        let identifiers_changed = changes.node_structure_changed();
        let definition =
            self.uses_changed_field(&changes.fields, ChangeFlags::DEFINITION, default_coordinate);
        let related = !changes.nodes.is_empty()
            && self.uses_changed_field(&changes.fields, ChangeFlags::RELATED, default_coordinate);
        if identifiers_changed || definition || related {
            GraphicChange::FullRebuild
        } else {
            GraphicChange::None
        }
    }

    fn element_graphic_change(
        &mut self,
        region: &dyn FeRegion,
        changes: &RegionChanges,
        default_coordinate: Option<&Field>,
        policy: &RebuildPolicy,
    ) -> GraphicChange {
        if self.graphics_object.is_none() {
            return GraphicChange::Redraw;
        }
        if changes.elements.summary().intersects(ChangeFlags::IDENTIFIER) {
            return GraphicChange::FullRebuild;
        }
        let redefined = ChangeFlags::DEFINITION | ChangeFlags::ADD | ChangeFlags::REMOVE;
        if self.uses_changed_field(&changes.fields, redefined, default_coordinate) {
            return GraphicChange::FullRebuild;
        }
        let field_related =
            self.uses_changed_field(&changes.fields, ChangeFlags::RELATED, default_coordinate);
        let mesh_changed = !changes.nodes.is_empty() || !changes.elements.is_empty();
        if field_related && !mesh_changed {
            return GraphicChange::FullRebuild;
        }
        let elements_added_or_removed = changes
            .elements
            .summary()
            .intersects(ChangeFlags::ADD | ChangeFlags::REMOVE);
        if !field_related && !elements_added_or_removed {
            return GraphicChange::None;
        }
        if changes.nodes.all_changed() || changes.elements.all_changed() {
            return GraphicChange::FullRebuild;
        }
        let partial = policy.allows_partial(
            changes.nodes.len(),
            region.number_of_nodes(),
            changes.elements.len(),
            region.number_of_elements_all_dimensions(),
        );
        if !partial {
            return GraphicChange::FullRebuild;
        }
        let dimension = self.dimension_in(region);
        if let Some(object) = &mut self.graphics_object {
            let removed = object.remove_primitives_where(|primitive| {
                primitive.name().is_some_and(|name| {
                    element_or_ancestor_changed(region, changes, ElementId::new(dimension, name))
                })
            });
            log::debug!(
                "graphic {}: partial rebuild removed {removed} primitives",
                self.display_name()
            );
        }
        GraphicChange::PartialRebuild
    }

    /// Responds to changes in the data point region; only data point graphics care.
    pub fn data_region_change(
        &mut self,
        changes: &RegionChanges,
        default_coordinate: Option<&Field>,
    ) -> GraphicChange {
        if self.graphic_type() != GraphicType::DataPoints {
            return GraphicChange::None;
        }
        let flags = if changes.nodes.is_empty() {
            ChangeFlags::DEFINITION | ChangeFlags::RELATED
        } else {
            ChangeFlags::ALL
        };
        let relevant = (!changes.nodes.is_empty()
            || changes
                .fields
                .summary()
                .intersects(ChangeFlags::DEFINITION | ChangeFlags::RELATED))
            && self.uses_changed_field(&changes.fields, flags, default_coordinate);
        let change = if relevant || changes.node_structure_changed() {
            GraphicChange::FullRebuild
        } else {
            GraphicChange::None
        };
        self.changed(change);
        change
    }

    /// Refreshes materials edited in the registry.
    pub fn material_change(
        &mut self,
        changes: &ChangeLog<String>,
        registry: &MaterialRegistry,
    ) -> GraphicChange {
        let mut touched = false;
        for slot in [
            &mut self.material,
            &mut self.selected_material,
            &mut self.secondary_material,
        ] {
            if let Some(material) = slot {
                if changes.contains(&material.name) {
                    if let Some(updated) = registry.get(&material.name) {
                        *material = updated;
                    }
                    touched = true;
                }
            }
        }
        if !touched {
            return GraphicChange::None;
        }
        self.update_graphics_object_trivial();
        self.changed(GraphicChange::Recompile);
        GraphicChange::Recompile
    }

    /// Refreshes a spectrum edited in the registry.
    ///
    /// Only graphics carrying data values are affected.
    pub fn spectrum_change(
        &mut self,
        changes: &ChangeLog<String>,
        registry: &SpectrumRegistry,
    ) -> GraphicChange {
        let Some(spectrum) = &self.spectrum else {
            return GraphicChange::None;
        };
        if !changes.contains(&spectrum.name) {
            return GraphicChange::None;
        }
        if let Some(updated) = registry.get(&spectrum.name) {
            self.spectrum = Some(updated);
        }
        if !self.needs_spectrum() {
            return GraphicChange::None;
        }
        self.update_graphics_object_trivial();
        self.changed(GraphicChange::Recompile);
        GraphicChange::Recompile
    }

    /// Responds to an edit of a shared tessellation.
    pub fn tessellation_change(&mut self, change: &TessellationChange) -> GraphicChange {
        let ours = self
            .tessellation
            .as_ref()
            .is_some_and(|t| t.name() == change.name);
        if !ours {
            return GraphicChange::None;
        }
        let element_divisions = change.element_divisions_changed && self.dimension() > 0;
        let circle_divisions = change.circle_divisions_changed && self.uses_circle_divisions();
        let result = if element_divisions || circle_divisions {
            GraphicChange::FullRebuild
        } else {
            GraphicChange::None
        };
        self.changed(result);
        result
    }

    /// Checks the glyph subscription and recompiles if the glyph changed.
    pub fn poll_glyph_change(&mut self) -> GraphicChange {
        let glyph_changed = self
            .glyph_subscription
            .as_mut()
            .is_some_and(fegraphics_render::GlyphSubscription::poll);
        if !glyph_changed {
            return GraphicChange::None;
        }
        self.update_graphics_object_trivial();
        self.changed(GraphicChange::Recompile);
        GraphicChange::Recompile
    }

    /// Responds to a change in the selection set.
    pub fn selection_change(&mut self) -> GraphicChange {
        let change = if self.select_mode.filters_geometry() {
            GraphicChange::FullRebuild
        } else if self.select_mode == fegraphics_render::SelectMode::NoSelect {
            GraphicChange::None
        } else {
            GraphicChange::Selection
        };
        self.changed(change);
        change
    }

    /// Responds to a change of the current time.
    pub fn time_change(&mut self) -> GraphicChange {
        let change = if self.time_dependent {
            GraphicChange::FullRebuild
        } else {
            GraphicChange::None
        };
        self.changed(change);
        change
    }

    /// Recomputes whether the graphic varies with time.
    ///
    /// Returns the new time dependence.
    pub fn update_time_behaviour(&mut self, default_coordinate_depends_on_time: bool) -> bool {
        let fields_vary = self
            .referenced_fields()
            .into_iter()
            .any(Field::has_multiple_times);
        let coordinate_varies = match &self.coordinate_field {
            Some(field) => field.has_multiple_times(),
            None => default_coordinate_depends_on_time,
        };
        let glyph_varies = self
            .glyph_parameters()
            .and_then(|g| g.glyph.as_ref())
            .is_some_and(fegraphics_render::Glyph::is_time_varying);
        self.time_dependent = fields_vary || coordinate_varies || glyph_varies;
        self.time_dependent
    }

    /// Releases every field handle, e.g. before the region is destroyed.
    pub fn detach_fields(&mut self) {
        self.coordinate_field = None;
        self.texture_coordinate_field = None;
        self.data_field = None;
        self.visibility_field = None;
        self.native_discretization_field = None;
        self.kind.release_fields();
        self.changed(GraphicChange::FullRebuild);
    }

    /// Pushes cosmetic settings into the graphics object without regenerating it.
    pub fn update_graphics_object_trivial(&mut self) {
        let spectrum = if self.needs_spectrum() {
            self.spectrum.clone()
        } else {
            None
        };
        let glyph = match &self.kind {
            GraphicKind::NodePoints(p) | GraphicKind::DataPoints(p) | GraphicKind::Static(p) => {
                p.glyph.glyph.as_ref().map(|g| g.name().to_string())
            }
            GraphicKind::ElementPoints(e) => {
                e.points.glyph.glyph.as_ref().map(|g| g.name().to_string())
            }
            _ => None,
        };
        let Some(object) = &mut self.graphics_object else {
            return;
        };
        object.material.clone_from(&self.material);
        object.selected_material.clone_from(&self.selected_material);
        object.secondary_material.clone_from(&self.secondary_material);
        object.spectrum = spectrum;
        object.glyph = glyph;
        object.render_type = self.render_type;
        object.select_mode = self.select_mode;
        object.changed();
    }
}

/// Returns true if `element`, one of its nodes, or any element it is a face
/// or line of changed.
fn element_or_ancestor_changed(
    region: &dyn FeRegion,
    changes: &RegionChanges,
    element: ElementId,
) -> bool {
    changes.elements.contains(&element)
        || (!changes.nodes.is_empty()
            && region
                .element_nodes(element)
                .iter()
                .any(|node| changes.nodes.contains(node)))
        || region
            .parents(element)
            .into_iter()
            .any(|parent| element_or_ancestor_changed(region, changes, parent.parent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fegraphics_core::{FieldDescription, MemoryRegion, NodeId};
    use fegraphics_render::{
        Glyph, GlyphShape, GraphicsObject, GraphicsObjectKind, Material, Polyline, Primitive,
        SelectMode, Tessellation,
    };

    use crate::types::GlyphScalingMode;

    fn lines_with_object(region: &MemoryRegion, coordinates: &Field) -> Graphic {
        let mut graphic = Graphic::create(GraphicType::Lines);
        graphic.set_coordinate_field(Some(coordinates.clone())).unwrap();
        let mut object = GraphicsObject::new("lines", GraphicsObjectKind::PolylineVertexBuffers);
        for line in region.element_ids(1) {
            object
                .add_primitive(Primitive::Polyline(Polyline {
                    name: Some(line.number),
                    ..Polyline::default()
                }))
                .unwrap();
        }
        graphic.graphics_object = Some(object);
        graphic.graphics_changed = false;
        graphic.selected_graphics_changed = false;
        graphic.reuse_allowed = true;
        graphic
    }

    #[test]
    fn test_changed_flags() {
        let mut graphic = Graphic::create(GraphicType::Surfaces);
        graphic.graphics_changed = false;
        graphic.selected_graphics_changed = false;
        graphic.reuse_allowed = true;
        graphic.changed(GraphicChange::Redraw);
        assert!(!graphic.graphics_changed() && !graphic.selected_graphics_changed());
        graphic.changed(GraphicChange::Selection);
        assert!(graphic.selected_graphics_changed() && !graphic.graphics_changed());
        graphic.changed(GraphicChange::PartialRebuild);
        assert!(graphic.graphics_changed() && graphic.reuse_allowed);
        graphic.changed(GraphicChange::FullRebuild);
        assert!(!graphic.reuse_allowed);
    }

    #[test]
    fn test_small_node_edit_is_partial() {
        let (mut region, coordinates) = MemoryRegion::block([10, 0, 0], 1);
        let mut graphic = lines_with_object(&region, &coordinates);
        region
            .set_node_values(&coordinates, NodeId(1), vec![0.0, 1.0, 0.0])
            .unwrap();
        let changes = region.take_changes();
        let change = graphic.region_change(&region, &changes, None, &RebuildPolicy::default());
        assert_eq!(change, GraphicChange::PartialRebuild);
        let names = graphic.graphics_object().unwrap().primitive_names();
        assert_eq!(names, (2..=10).collect::<Vec<_>>());
        assert!(graphic.reuse_allowed);
    }

    #[test]
    fn test_node_only_changes_remove_touching_elements() {
        let (mut region, coordinates) = MemoryRegion::block([10, 0, 0], 1);
        let mut graphic = lines_with_object(&region, &coordinates);
        region
            .set_node_values(&coordinates, NodeId(2), vec![1.0, 1.0, 0.0])
            .unwrap();
        let mut changes = region.take_changes();
        changes.elements.clear();
        let change = graphic.region_change(&region, &changes, None, &RebuildPolicy::default());
        assert_eq!(change, GraphicChange::PartialRebuild);
        let names = graphic.graphics_object().unwrap().primitive_names();
        assert_eq!(names, (3..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_large_node_edit_is_full() {
        let (mut region, coordinates) = MemoryRegion::block([4, 0, 0], 1);
        let mut graphic = lines_with_object(&region, &coordinates);
        for node in 1..=4 {
            region
                .set_node_values(&coordinates, NodeId(node), vec![0.0, 0.0, 1.0])
                .unwrap();
        }
        let changes = region.take_changes();
        let change = graphic.region_change(&region, &changes, None, &RebuildPolicy::default());
        assert_eq!(change, GraphicChange::FullRebuild);
        assert_eq!(graphic.graphics_object().unwrap().number_of_primitives(), 4);
    }

    #[test]
    fn test_unrelated_field_is_ignored() {
        let (mut region, coordinates) = MemoryRegion::block([4, 0, 0], 1);
        let other = region.define_nodal_field(
            "pressure",
            1,
            fegraphics_core::CoordinateSystem::RectangularCartesian,
        );
        let mut graphic = lines_with_object(&region, &coordinates);
        region.take_changes();
        let mut changes = RegionChanges::new();
        changes.fields.record(other.id(), ChangeFlags::DEFINITION);
        let change = graphic.region_change(&region, &changes, None, &RebuildPolicy::default());
        assert_eq!(change, GraphicChange::None);
        assert!(!graphic.graphics_changed());
    }

    #[test]
    fn test_face_of_changed_parent_is_removed() {
        let (region, coordinates) = MemoryRegion::block([2, 2, 0], 2);
        let mut graphic = lines_with_object(&region, &coordinates);
        let before = graphic.graphics_object().unwrap().number_of_primitives();
        let mut changes = RegionChanges::new();
        changes.elements.record(ElementId::face(1), ChangeFlags::REMOVE);
        let change = graphic.region_change(&region, &changes, None, &RebuildPolicy::default());
        assert_eq!(change, GraphicChange::PartialRebuild);
        let after = graphic.graphics_object().unwrap().number_of_primitives();
        assert_eq!(before - after, 4);
    }

    #[test]
    fn test_graphic_without_object_only_redraws() {
        let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let mut graphic = Graphic::create(GraphicType::Lines);
        graphic.set_coordinate_field(Some(coordinates.clone())).unwrap();
        let mut changes = RegionChanges::new();
        changes.fields.record(coordinates.id(), ChangeFlags::DEFINITION);
        let change = graphic.region_change(&region, &changes, None, &RebuildPolicy::default());
        assert_eq!(change, GraphicChange::Redraw);
    }

    #[test]
    fn test_data_points_ignore_region_changes() {
        let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let mut graphic = Graphic::create(GraphicType::DataPoints);
        graphic.set_coordinate_field(Some(coordinates.clone())).unwrap();
        graphic.graphics_changed = false;
        let mut changes = RegionChanges::new();
        changes.fields.record(coordinates.id(), ChangeFlags::DEFINITION);
        assert_eq!(
            graphic.region_change(&region, &changes, None, &RebuildPolicy::default()),
            GraphicChange::None
        );
        assert_eq!(
            graphic.data_region_change(&changes, None),
            GraphicChange::FullRebuild
        );
    }

    #[test]
    fn test_spectrum_change_needs_data() {
        let mut registry = SpectrumRegistry::new();
        let mut graphic = Graphic::create(GraphicType::Surfaces);
        graphic.set_spectrum(registry.get("default"));
        registry.take_changes();
        registry.update("default", |s| s.set_range(0.0, 10.0));
        let changes = registry.take_changes();
        assert_eq!(graphic.spectrum_change(&changes, &registry), GraphicChange::None);

        let data = Field::new(FieldDescription::new(FieldId(90), "temperature", 1));
        graphic.set_data_field(Some(data)).unwrap();
        assert_eq!(
            graphic.spectrum_change(&changes, &registry),
            GraphicChange::Recompile
        );
    }

    #[test]
    fn test_material_change_refreshes_handle() {
        let mut registry = MaterialRegistry::new();
        let bronze = registry.register(Material::bronze());
        let mut graphic = Graphic::create(GraphicType::Surfaces);
        graphic.set_material(Some(bronze));
        registry.take_changes();
        registry.update("bronze", |m| m.alpha = 0.5);
        let changes = registry.take_changes();
        assert_eq!(
            graphic.material_change(&changes, &registry),
            GraphicChange::Recompile
        );
        assert!(graphic.material().unwrap().is_transparent());
    }

    #[test]
    fn test_tessellation_change() {
        let tessellation = Tessellation::new("fine", [4, 4, 4], 12);
        let mut surfaces = Graphic::create(GraphicType::Surfaces);
        surfaces.set_tessellation(Some(tessellation.clone()));
        let mut cylinders = Graphic::create(GraphicType::Cylinders);
        cylinders.set_tessellation(Some(tessellation.clone()));
        surfaces.graphics_changed = false;
        cylinders.graphics_changed = false;

        let circle = tessellation.set_circle_divisions(24);
        assert_eq!(surfaces.tessellation_change(&circle), GraphicChange::None);
        assert_eq!(cylinders.tessellation_change(&circle), GraphicChange::FullRebuild);

        let divisions = tessellation.set_minimum_divisions([8, 8, 8]);
        assert_eq!(surfaces.tessellation_change(&divisions), GraphicChange::FullRebuild);

        let other = Tessellation::new("coarse", [1, 1, 1], 6).set_minimum_divisions([2, 2, 2]);
        let mut lines = Graphic::create(GraphicType::Lines);
        lines.set_tessellation(Some(tessellation));
        assert_eq!(lines.tessellation_change(&other), GraphicChange::None);
    }

    #[test]
    fn test_glyph_change_recompiles() {
        let glyph = Glyph::new("arrow", GlyphShape::Arrow);
        let mut graphic = Graphic::create(GraphicType::NodePoints);
        graphic
            .set_glyph_parameters(
                Some(glyph.clone()),
                GlyphScalingMode::Constant,
                [0.0; 3],
                [1.0; 3],
                None,
                [1.0; 3],
                None,
            )
            .unwrap();
        assert_eq!(graphic.poll_glyph_change(), GraphicChange::None);
        glyph.set_shape(GlyphShape::Cube);
        assert_eq!(graphic.poll_glyph_change(), GraphicChange::Recompile);
        assert_eq!(graphic.poll_glyph_change(), GraphicChange::None);
    }

    #[test]
    fn test_selection_change_by_mode() {
        let mut graphic = Graphic::create(GraphicType::Surfaces);
        assert_eq!(graphic.selection_change(), GraphicChange::Selection);
        graphic.set_select_mode(SelectMode::NoSelect);
        assert_eq!(graphic.selection_change(), GraphicChange::None);
        graphic.set_select_mode(SelectMode::DrawUnselected);
        assert_eq!(graphic.selection_change(), GraphicChange::FullRebuild);
    }

    #[test]
    fn test_time_dependence() {
        let timed = Field::new(
            FieldDescription::new(FieldId(91), "displacement", 3).with_multiple_times(true),
        );
        let mut graphic = Graphic::create(GraphicType::Lines);
        assert!(!graphic.update_time_behaviour(false));
        graphic.graphics_changed = false;
        assert_eq!(graphic.time_change(), GraphicChange::None);
        assert!(graphic.update_time_behaviour(true));
        graphic.set_coordinate_field(Some(timed)).unwrap();
        assert!(graphic.update_time_behaviour(false));
        assert_eq!(graphic.time_change(), GraphicChange::FullRebuild);
    }

    #[test]
    fn test_detach_fields_releases_handles() {
        let field = Field::new(FieldDescription::new(FieldId(92), "coordinates", 3));
        let mut graphic = Graphic::create(GraphicType::Surfaces);
        graphic.set_coordinate_field(Some(field.clone())).unwrap();
        graphic.set_data_field(Some(field.clone())).unwrap();
        assert_eq!(field.reference_count(), 3);
        graphic.detach_fields();
        assert_eq!(field.reference_count(), 1);
        assert!(graphic.referenced_fields().is_empty());
    }

    #[test]
    fn test_trivial_update_reaches_object() {
        let mut graphic = Graphic::create(GraphicType::Surfaces);
        graphic.graphics_object = Some(GraphicsObject::new("s", GraphicsObjectKind::Surface));
        let generation = graphic.graphics_object().unwrap().generation();
        graphic.set_material(Some(Arc::new(Material::muscle())));
        let object = graphic.graphics_object().unwrap();
        assert_eq!(object.material.as_ref().unwrap().name, "muscle");
        assert!(object.generation() > generation);
        assert!(object.spectrum.is_none());
    }
}

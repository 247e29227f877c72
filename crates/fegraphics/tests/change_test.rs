//! Integration tests for change notification and incremental rebuilds.

use std::sync::Arc;

use fegraphics::*;

fn built(
    counts: [usize; 3],
    dimension: u8,
    graphic_type: GraphicType,
) -> (MemoryRegion, Field, Rendition) {
    let (region, coordinates) = MemoryRegion::block(counts, dimension);
    let mut rendition = Rendition::new(RenditionId(7), Options::default());
    rendition.set_default_coordinate_field(Some(coordinates.clone()));
    let graphic = rendition.create_graphic(graphic_type);
    rendition.add_graphic(graphic, 0);
    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);
    (region, coordinates, rendition)
}

fn primitive_named(object: &GraphicsObject, name: i32) -> Option<Primitive> {
    object
        .primitives()
        .iter()
        .find(|p| p.name() == Some(name))
        .cloned()
}

#[test]
fn test_small_edit_regenerates_only_touched_elements() {
    let (mut region, coordinates, mut rendition) = built([10, 0, 0], 1, GraphicType::Lines);
    let before = rendition.graphics().get(1).unwrap().graphics_object().unwrap().clone();

    region
        .set_node_values(&coordinates, NodeId(11), vec![10.0, 1.0, 0.0])
        .unwrap();
    let changes = region.take_changes();
    assert_eq!(rendition.region_changed(&region, &changes), GraphicChange::PartialRebuild);

    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);
    let after = rendition.graphics().get(1).unwrap().graphics_object().unwrap();
    assert_eq!(after.primitive_names(), (1..=10).collect::<Vec<_>>());
    for name in 1..=9 {
        assert_eq!(primitive_named(after, name), primitive_named(&before, name));
    }
    assert_ne!(primitive_named(after, 10), primitive_named(&before, 10));
}

#[test]
fn test_node_only_changes_regenerate_touching_elements() {
    let (mut region, coordinates, mut rendition) = built([10, 0, 0], 1, GraphicType::Lines);
    let before = rendition.graphics().get(1).unwrap().graphics_object().unwrap().clone();

    region
        .set_node_values(&coordinates, NodeId(1), vec![0.0, 1.0, 0.0])
        .unwrap();
    let mut changes = region.take_changes();
    changes.elements.clear();
    assert_eq!(rendition.region_changed(&region, &changes), GraphicChange::PartialRebuild);

    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);
    let after = rendition.graphics().get(1).unwrap().graphics_object().unwrap();
    assert_eq!(after.primitive_names(), (1..=10).collect::<Vec<_>>());
    assert_ne!(primitive_named(after, 1), primitive_named(&before, 1));
    assert_eq!(primitive_named(after, 2), primitive_named(&before, 2));
}

#[test]
fn test_large_edit_rebuilds_everything() {
    let (mut region, coordinates, mut rendition) = built([2, 0, 0], 1, GraphicType::Lines);
    for node in 1..=3 {
        region
            .set_node_values(&coordinates, NodeId(node), vec![f64::from(node), 0.0, 1.0])
            .unwrap();
    }
    let changes = region.take_changes();
    assert_eq!(rendition.region_changed(&region, &changes), GraphicChange::FullRebuild);
    assert!(rendition.graphics().get(1).unwrap().graphics_changed());
}

#[test]
fn test_draw_selected_needs_rebuild() {
    let (region, coordinates) = MemoryRegion::block([2, 1, 0], 2);
    let mut rendition = Rendition::new(RenditionId(1), Options::default());
    let mut points = rendition.create_graphic(GraphicType::ElementPoints);
    points.set_coordinate_field(Some(coordinates)).unwrap();
    points.set_use_element_type(UseElementType::Faces).unwrap();
    rendition.add_graphic(points, 0);

    let mut selection = SelectionSet::new();
    selection.select_element(ElementId::face(2));
    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator).with_selection(&selection);
    assert_eq!(rendition.build(&ctx), 0);
    let graphic = rendition.graphics().get(1).unwrap();
    assert_eq!(graphic.graphics_object().unwrap().primitive_names(), vec![1, 2]);
    assert!(!graphic.graphics_changed());

    let graphic = rendition.graphic_mut(1).unwrap();
    graphic.set_select_mode(SelectMode::DrawSelected);
    assert!(graphic.graphics_changed());

    assert_eq!(rendition.build(&ctx), 0);
    let object = rendition.graphics().get(1).unwrap().graphics_object().unwrap();
    assert_eq!(object.primitive_names(), vec![2]);
}

#[test]
fn test_selection_change_by_select_mode() {
    let (_region, _coordinates, mut rendition) = built([2, 0, 0], 1, GraphicType::Lines);
    assert_eq!(rendition.selection_changed(), GraphicChange::Selection);
    assert!(rendition.graphics().get(1).unwrap().selected_graphics_changed());
    assert!(!rendition.graphics().get(1).unwrap().graphics_changed());

    rendition
        .graphic_mut(1)
        .unwrap()
        .set_select_mode(SelectMode::DrawUnselected);
    assert_eq!(rendition.selection_changed(), GraphicChange::FullRebuild);

    rendition.graphic_mut(1).unwrap().set_select_mode(SelectMode::NoSelect);
    assert_eq!(rendition.selection_changed(), GraphicChange::None);
}

#[test]
fn test_material_edit_recompiles_without_rebuild() {
    let (_region, _coordinates, mut rendition) = built([2, 0, 0], 1, GraphicType::Lines);
    let mut materials = MaterialRegistry::new();
    let bronze = materials.get("bronze").unwrap();
    rendition.graphic_mut(1).unwrap().set_material(Some(bronze));
    let mut renderer = RecordingRenderer::new();
    rendition.compile(&mut renderer).unwrap();
    let primitives = rendition
        .graphics()
        .get(1)
        .and_then(Graphic::graphics_object)
        .unwrap()
        .primitives()
        .to_vec();

    materials.update("bronze", |m| m.alpha = 0.5);
    let changes = materials.take_changes();
    assert_eq!(rendition.materials_changed(&changes, &materials), GraphicChange::Recompile);

    let graphic = rendition.graphics().get(1).unwrap();
    assert!(!graphic.graphics_changed());
    let object = graphic.graphics_object().unwrap();
    assert_eq!(object.primitives(), primitives.as_slice());
    assert!(object.material.as_ref().is_some_and(|m| (m.alpha - 0.5).abs() < f32::EPSILON));
    assert!(object.needs_compile());

    renderer.clear();
    rendition.compile(&mut renderer).unwrap();
    assert_eq!(renderer.calls().len(), 1);
}

#[test]
fn test_unrelated_material_edit_is_ignored() {
    let (_region, _coordinates, mut rendition) = built([1, 0, 0], 1, GraphicType::Lines);
    let mut materials = MaterialRegistry::new();
    let muscle = materials.get("muscle").unwrap();
    rendition.graphic_mut(1).unwrap().set_material(Some(Arc::clone(&muscle)));
    materials.update("bronze", |m| m.alpha = 0.1);
    let changes = materials.take_changes();
    assert_eq!(rendition.materials_changed(&changes, &materials), GraphicChange::None);
}

#[test]
fn test_field_redefinition_rebuilds_users() {
    let (_region, coordinates, mut rendition) = built([2, 0, 0], 1, GraphicType::Lines);
    let mut changes = ChangeLog::new();
    changes.record(coordinates.id(), ChangeFlags::DEFINITION);
    assert_eq!(rendition.fields_changed(&changes), GraphicChange::FullRebuild);

    let mut unrelated = ChangeLog::new();
    unrelated.record(FieldId(999), ChangeFlags::DEFINITION);
    let (_region, _coordinates, mut fresh) = built([2, 0, 0], 1, GraphicType::Lines);
    assert_eq!(fresh.fields_changed(&unrelated), GraphicChange::None);
}

#[test]
fn test_glyph_edit_is_seen_by_poll() {
    let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
    let mut rendition = Rendition::new(RenditionId(1), Options::default());
    let glyph = Glyph::new("sphere", GlyphShape::Sphere);
    let mut nodes = rendition.create_graphic(GraphicType::NodePoints);
    nodes.set_coordinate_field(Some(coordinates)).unwrap();
    nodes
        .set_glyph_parameters(
            Some(glyph.clone()),
            GlyphScalingMode::Constant,
            [0.0; 3],
            [0.1; 3],
            None,
            [1.0; 3],
            None,
        )
        .unwrap();
    rendition.add_graphic(nodes, 0);
    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);

    assert_eq!(rendition.poll_glyphs(), GraphicChange::None);
    glyph.notify_changed();
    assert_eq!(rendition.poll_glyphs(), GraphicChange::Recompile);
    assert_eq!(rendition.poll_glyphs(), GraphicChange::None);
}

//! Integration tests for building graphics objects through a rendition.

use fegraphics::*;

fn rendition(prefix: &str, coordinates: &Field) -> Rendition {
    let options = Options {
        name_prefix: prefix.to_string(),
        ..Options::default()
    };
    let mut rendition = Rendition::new(RenditionId(1), options);
    rendition.set_default_coordinate_field(Some(coordinates.clone()));
    rendition
}

fn object(rendition: &Rendition, position: u32) -> &GraphicsObject {
    rendition
        .graphics()
        .get(position)
        .and_then(Graphic::graphics_object)
        .expect("graphics object")
}

#[test]
fn test_lines_over_two_elements() {
    let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
    let mut rendition = rendition("mesh", &coordinates);
    let lines = rendition.create_graphic(GraphicType::Lines);
    rendition.add_graphic(lines, 0);

    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);

    let object = object(&rendition, 1);
    assert_eq!(object.name(), "mesh.1");
    assert_eq!(object.kind(), GraphicsObjectKind::PolylineVertexBuffers);
    assert_eq!(object.primitive_names(), vec![1, 2]);

    let bounds = rendition.visible_range().expect("bounds");
    assert_eq!(bounds.min, Vec3::ZERO);
    assert_eq!(bounds.max, Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn test_named_graphic_object_name() {
    let (region, coordinates) = MemoryRegion::block([1, 0, 0], 1);
    let mut rendition = rendition("mesh", &coordinates);
    let mut lines = rendition.create_graphic(GraphicType::Lines);
    lines.set_name(Some("edges"));
    rendition.add_graphic(lines, 0);
    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);
    assert_eq!(object(&rendition, 1).name(), "mesh.1_edges");
    assert!(rendition.graphics().find_by_name("edges").is_some());
}

#[test]
fn test_rebuild_without_changes_is_idempotent() {
    let (region, coordinates) = MemoryRegion::block([2, 2, 0], 2);
    let mut rendition = rendition("mesh", &coordinates);
    let surfaces = rendition.create_graphic(GraphicType::Surfaces);
    rendition.add_graphic(surfaces, 0);
    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);

    let mut renderer = RecordingRenderer::new();
    rendition.compile(&mut renderer).unwrap();
    let before = object(&rendition, 1).primitives().to_vec();
    let generation = object(&rendition, 1).generation();

    assert_eq!(rendition.build(&ctx), 0);
    assert_eq!(object(&rendition, 1).primitives(), before.as_slice());
    assert_eq!(object(&rendition, 1).generation(), generation);
    renderer.clear();
    rendition.compile(&mut renderer).unwrap();
    assert!(renderer.calls().is_empty());
}

#[test]
fn test_compile_and_execute_pick_by_position() {
    let (region, coordinates) = MemoryRegion::block([1, 1, 0], 2);
    let mut rendition = rendition("", &coordinates);
    for graphic_type in [GraphicType::Surfaces, GraphicType::Lines] {
        let graphic = rendition.create_graphic(graphic_type);
        rendition.add_graphic(graphic, 0);
    }
    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);

    let mut renderer = RecordingRenderer::new();
    rendition.compile(&mut renderer).unwrap();
    rendition.execute(&mut renderer).unwrap();
    let picks: Vec<i32> = renderer
        .calls()
        .iter()
        .filter_map(|call| match call {
            RenderCall::Execute { pick_name, .. } => Some(*pick_name),
            RenderCall::Compile { .. } => None,
        })
        .collect();
    assert_eq!(picks, vec![1, 2]);
}

#[test]
fn test_iso_surfaces_with_value_range() {
    let (mut region, coordinates) = MemoryRegion::block([2, 1, 1], 3);
    let x = region.define_nodal_field("x", 1, CoordinateSystem::RectangularCartesian);
    for node in region.node_ids() {
        let position = region
            .evaluate(&coordinates, &Location::Node(node), 0.0)
            .unwrap();
        region.set_node_values(&x, node, vec![position[0]]).unwrap();
    }

    let range = IsoValues::from_parts(3, None, 0.0, 2.0).unwrap();
    assert_eq!(range.values(), vec![0.0, 1.0, 2.0]);
    let values = IsoValues::from_parts(3, None, 0.5, 1.5).unwrap();
    assert_eq!(values.values(), vec![0.5, 1.0, 1.5]);

    let mut rendition = rendition("cube", &coordinates);
    let mut iso = rendition.create_graphic(GraphicType::IsoSurfaces);
    iso.set_iso_surface_parameters(x, values, 0.0).unwrap();
    rendition.add_graphic(iso, 0);
    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);
    let object = object(&rendition, 1);
    assert_eq!(object.kind(), GraphicsObjectKind::Surface);
    assert_eq!(object.primitive_names(), vec![1, 2]);
}

#[test]
fn test_explicit_and_range_iso_values_are_exclusive() {
    assert!(matches!(
        IsoValues::from_parts(2, Some(&[0.5]), 0.0, 1.0),
        Err(GraphicsError::IsoValueConflict)
    ));
}

#[test]
fn test_failed_graphic_keeps_previous_object() {
    let (mut region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
    let mut rendition = rendition("mesh", &coordinates);
    let lines = rendition.create_graphic(GraphicType::Lines);
    rendition.add_graphic(lines, 0);
    let generator = SampledGeometry::new();
    {
        let ctx = ConversionContext::new(&region, &region, &generator);
        assert_eq!(rendition.build(&ctx), 0);
    }

    let fibres = region.define_nodal_field("fibres", 3, CoordinateSystem::Fibre);
    rendition
        .graphic_mut(1)
        .unwrap()
        .set_coordinate_field(Some(fibres))
        .unwrap();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 1);
    assert_eq!(object(&rendition, 1).number_of_primitives(), 2);
    assert!(rendition.graphics().get(1).unwrap().graphics_changed());
    assert_eq!(region.active_wraps(), 0);
}

#[test]
fn test_missing_inputs_fail_only_their_graphic() {
    let (region, coordinates) = MemoryRegion::block([1, 1, 1], 3);
    let mut rendition = rendition("mesh", &coordinates);
    let iso = rendition.create_graphic(GraphicType::IsoSurfaces);
    rendition.add_graphic(iso, 0);
    let streamlines = rendition.create_graphic(GraphicType::Streamlines);
    rendition.add_graphic(streamlines, 0);
    let lines = rendition.create_graphic(GraphicType::Lines);
    rendition.add_graphic(lines, 0);

    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 2);
    assert!(rendition.graphics().get(1).unwrap().graphics_object().is_none());
    assert!(rendition.graphics().get(2).unwrap().graphics_object().is_none());
    assert_eq!(object(&rendition, 3).number_of_primitives(), 12);
}

#[test]
fn test_static_glyph_needs_no_region() {
    let region = MemoryRegion::new();
    let mut rendition = Rendition::new(RenditionId(1), Options::default());
    let mut title = rendition.create_graphic(GraphicType::Static);
    title
        .set_glyph_parameters(
            Some(Glyph::new("arrow", GlyphShape::Arrow)),
            GlyphScalingMode::Constant,
            [0.5, 0.0, 0.0],
            [2.0; 3],
            None,
            [1.0; 3],
            None,
        )
        .unwrap();
    rendition.add_graphic(title, 0);

    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);
    let object = object(&rendition, 1);
    assert_eq!(object.kind(), GraphicsObjectKind::GlyphSet);
    let [Primitive::GlyphSet(set)] = object.primitives() else {
        panic!("expected one glyph set");
    };
    assert_eq!(set.points.len(), 1);
    assert_eq!(set.points[0].position, [-1.0, 0.0, 0.0]);
    assert_eq!(set.glyph.as_deref(), Some("arrow"));
}

#[test]
fn test_data_points_follow_data_region() {
    let (region, _coordinates) = MemoryRegion::block([1, 0, 0], 1);
    let (data, data_coordinates) = MemoryRegion::block([2, 0, 0], 1);
    let mut rendition = Rendition::new(RenditionId(1), Options::default());
    let mut points = rendition.create_graphic(GraphicType::DataPoints);
    points.set_coordinate_field(Some(data_coordinates)).unwrap();
    rendition.add_graphic(points, 0);
    let generator = SampledGeometry::new();

    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);
    assert_eq!(object(&rendition, 1).number_of_primitives(), 0);

    rendition
        .graphic_mut(1)
        .unwrap()
        .changed(GraphicChange::FullRebuild);
    let ctx = ConversionContext::new(&region, &region, &generator).with_data(&data, &data);
    assert_eq!(rendition.build(&ctx), 0);
    let object = object(&rendition, 1);
    let [Primitive::GlyphSet(set)] = object.primitives() else {
        panic!("expected one glyph set");
    };
    assert_eq!(set.name, None);
    assert_eq!(set.points.len(), 3);
    assert_eq!(set.points[2].position, [2.0, 0.0, 0.0]);
}

#[test]
fn test_cylinders_are_surfaces() {
    let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
    let mut rendition = rendition("mesh", &coordinates);
    let mut tubes = rendition.create_graphic(GraphicType::Cylinders);
    tubes.set_radius_parameters(0.1, 1.0, None).unwrap();
    rendition.add_graphic(tubes, 0);
    let generator = SampledGeometry::new();
    let ctx = ConversionContext::new(&region, &region, &generator);
    assert_eq!(rendition.build(&ctx), 0);

    let object = object(&rendition, 1);
    assert_eq!(object.kind(), GraphicsObjectKind::Surface);
    assert_eq!(object.primitive_names(), vec![1, 2]);
    for primitive in object.primitives() {
        let Primitive::Surface(surface) = primitive else {
            panic!("cylinders only produce surfaces");
        };
        assert!(!surface.triangles.is_empty());
    }
    let bounds = object.bounds().unwrap();
    assert!(bounds.max.y > 0.0 && bounds.max.y <= 0.1 + 1e-5);
}

//! Per-element geometry generation.
//!
//! The conversion driver decides which elements, nodes and sample points a
//! graphic draws; a [`GeometryGenerator`] turns each of them into primitives.
//! [`SampledGeometry`] is the built-in generator: it evaluates the coordinate
//! field on a regular xi grid and connects the samples.

mod iso;
mod streamline;

use glam::{DMat3, DVec3};

use fegraphics_core::{ElementId, FeRegion, Field, FieldModule, Location};
use fegraphics_render::{
    DataValues, GlyphPoint, GlyphSet, Polyline, Primitive, Surface, Vertex, VolumeTexture, Voltex,
};

use crate::kind::{CylinderParameters, GlyphParameters, StreamlineParameters};
use crate::types::GlyphScalingMode;

pub use iso::{contour_line_segments, contour_tetrahedra};
pub use streamline::trace_streamline;

/// Fields evaluated over an element.
#[derive(Debug, Clone, Copy)]
pub struct ElementFields<'a> {
    /// Rectangular cartesian coordinates.
    pub coordinate: &'a Field,
    /// Data stored per vertex for spectrum colouring.
    pub data: Option<&'a Field>,
    /// Texture coordinates stored per vertex.
    pub texture_coordinate: Option<&'a Field>,
}

/// Fields evaluated at glyph points.
#[derive(Debug, Clone, Copy)]
pub struct GlyphFields<'a> {
    /// Rectangular cartesian coordinates.
    pub coordinate: Option<&'a Field>,
    /// Data stored per glyph.
    pub data: Option<&'a Field>,
    /// Rectangular cartesian orientation/scale field.
    pub orientation_scale: Option<&'a Field>,
    /// Per-axis scale multiplier.
    pub variable_scale: Option<&'a Field>,
    /// Text label.
    pub label: Option<&'a Field>,
}

/// One glyph location and its point number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphSample {
    /// Where the glyph is evaluated.
    pub location: Location,
    /// Number used for picking and highlighting.
    pub number: i32,
}

/// Fields evaluated along streamlines.
#[derive(Debug, Clone, Copy)]
pub struct StreamlineFields<'a> {
    /// Rectangular cartesian coordinates.
    pub coordinate: &'a Field,
    /// Rectangular cartesian stream vector.
    pub vector: &'a Field,
    /// Data field for field-scalar colouring.
    pub data: Option<&'a Field>,
}

/// Builds primitives for single elements, point sets and traces.
///
/// Every method returns `None` (or nothing) where a required field cannot be
/// evaluated; the caller skips that element.
pub trait GeometryGenerator {
    /// A polyline along a 1-D element with `segments` segments.
    fn polyline(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        segments: u32,
        time: f64,
    ) -> Option<Polyline>;

    /// A tube around a 1-D element.
    fn cylinder(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        radius: &CylinderParameters,
        segments: u32,
        circle_divisions: u32,
        time: f64,
    ) -> Option<Surface>;

    /// A triangulated patch over a 2-D element.
    fn surface(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        divisions: [u32; 3],
        time: f64,
    ) -> Option<Surface>;

    /// Contours of `scalar` at `iso_value` over one element.
    ///
    /// 3-D elements give one surface; 2-D elements give line segments; 1-D
    /// elements give single-vertex polylines at the crossings.
    fn iso_surface(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        scalar: &Field,
        iso_value: f64,
        divisions: [u32; 3],
        time: f64,
    ) -> Vec<Primitive>;

    /// Glyphs at a set of locations.
    fn glyph_set(
        &self,
        module: &dyn FieldModule,
        samples: &[GlyphSample],
        fields: &GlyphFields<'_>,
        glyph: &GlyphParameters,
        name: Option<i32>,
        time: f64,
    ) -> Option<GlyphSet>;

    /// A textured block over a 3-D element.
    fn voltex(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        texture: Option<&VolumeTexture>,
        divisions: [u32; 3],
        time: f64,
    ) -> Option<Voltex>;

    /// A trace following the stream vector from a seed point.
    fn streamline(
        &self,
        region: &dyn FeRegion,
        module: &dyn FieldModule,
        element: ElementId,
        xi: [f64; 3],
        fields: &StreamlineFields<'_>,
        parameters: &StreamlineParameters,
        circle_divisions: u32,
        time: f64,
    ) -> Option<Primitive>;
}

/// The built-in generator sampling fields on regular xi grids.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampledGeometry;

impl SampledGeometry {
    /// Creates the generator.
    pub fn new() -> Self {
        Self
    }
}

/// Pads or truncates field values to a 3-vector.
pub(crate) fn to_dvec3(values: &[f64]) -> DVec3 {
    DVec3::new(
        values.first().copied().unwrap_or(0.0),
        values.get(1).copied().unwrap_or(0.0),
        values.get(2).copied().unwrap_or(0.0),
    )
}

pub(crate) fn evaluate_position(
    module: &dyn FieldModule,
    coordinate: &Field,
    location: &Location,
    time: f64,
) -> Option<DVec3> {
    module
        .evaluate(coordinate, location, time)
        .map(|values| to_dvec3(&values))
}

/// Derivatives of the coordinate field with respect to xi, by central differences.
///
/// Columns beyond the element dimension complete a right-handed frame: for 2-D
/// elements the third column is the unit normal.
pub(crate) fn jacobian(
    module: &dyn FieldModule,
    coordinate: &Field,
    element: ElementId,
    xi: [f64; 3],
    time: f64,
) -> Option<DMat3> {
    const STEP: f64 = 1.0e-4;
    let dimension = usize::from(element.dimension.clamp(1, 3));
    let mut columns = [DVec3::ZERO; 3];
    for (axis, column) in columns.iter_mut().enumerate().take(dimension) {
        let low = (xi[axis] - STEP).max(0.0);
        let high = (xi[axis] + STEP).min(1.0);
        let mut xi_low = xi;
        let mut xi_high = xi;
        xi_low[axis] = low;
        xi_high[axis] = high;
        let p_low = evaluate_position(module, coordinate, &Location::element(element, xi_low), time)?;
        let p_high = evaluate_position(module, coordinate, &Location::element(element, xi_high), time)?;
        *column = (p_high - p_low) / (high - low);
    }
    match dimension {
        1 => {
            let (b, c) = columns[0].normalize_or(DVec3::X).any_orthonormal_pair();
            columns[1] = b;
            columns[2] = c;
        }
        2 => columns[2] = columns[0].cross(columns[1]).normalize_or_zero(),
        _ => {}
    }
    Some(DMat3::from_cols(columns[0], columns[1], columns[2]))
}

/// Length, area or volume scale of the element map at one point.
pub(crate) fn jacobian_measure(jacobian: &DMat3, dimension: u8) -> f64 {
    match dimension {
        1 => jacobian.x_axis.length(),
        2 => jacobian.x_axis.cross(jacobian.y_axis).length(),
        _ => jacobian.determinant().abs(),
    }
}

/// Evaluates a vertex with optional texture coordinates.
fn element_vertex(
    module: &dyn FieldModule,
    fields: &ElementFields<'_>,
    location: &Location,
    time: f64,
) -> Option<Vertex> {
    let position = evaluate_position(module, fields.coordinate, location, time)?;
    let mut vertex = Vertex::at(position.as_vec3());
    if let Some(texture) = fields.texture_coordinate {
        if let Some(values) = module.evaluate(texture, location, time) {
            vertex.texture = to_dvec3(&values).as_vec3().to_array();
        }
    }
    Some(vertex)
}

fn push_data(
    data: &mut Option<DataValues>,
    module: &dyn FieldModule,
    field: Option<&Field>,
    location: &Location,
    time: f64,
) {
    if let (Some(values), Some(field)) = (data.as_mut(), field) {
        let tuple = module.evaluate(field, location, time).unwrap_or_default();
        values.push(&tuple);
    }
}

fn data_values(field: Option<&Field>) -> Option<DataValues> {
    field.map(|f| DataValues::new(f.number_of_components()))
}

/// Triangles of a row-major vertex grid with `columns` x `rows` vertices.
fn grid_triangles(columns: u32, rows: u32, offset: u32) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(2 * (columns as usize) * (rows as usize));
    for j in 0..rows.saturating_sub(1) {
        for i in 0..columns.saturating_sub(1) {
            let a = offset + j * columns + i;
            let b = a + 1;
            let c = a + columns;
            let d = c + 1;
            triangles.push([a, b, d]);
            triangles.push([a, d, c]);
        }
    }
    triangles
}

/// Glyph axes and sizes from an orientation/scale tuple.
///
/// The component count selects the layout: a scalar, one 2-D or 3-D vector,
/// two 2-D or 3-D vectors, or three 3-D vectors. Missing axes are completed
/// orthogonally.
fn orientation_scale_axes(values: &[f64]) -> ([DVec3; 3], [f64; 3]) {
    let identity = [DVec3::X, DVec3::Y, DVec3::Z];
    let (axes, magnitudes) = match values.len() {
        1 => (identity, [values[0]; 3]),
        2 | 3 => {
            let a = to_dvec3(values);
            let magnitude = a.length();
            let direction = a.normalize_or_zero();
            if direction == DVec3::ZERO {
                (identity, [0.0; 3])
            } else {
                let (b, c) = direction.any_orthonormal_pair();
                ([direction, b, c], [magnitude; 3])
            }
        }
        4 | 6 => {
            let half = values.len() / 2;
            let a = to_dvec3(&values[..half]);
            let b = to_dvec3(&values[half..]);
            let c = a.cross(b);
            let c_magnitude = (a.length() * b.length()).sqrt();
            (
                [
                    a.normalize_or(DVec3::X),
                    b.normalize_or(DVec3::Y),
                    c.normalize_or(DVec3::Z),
                ],
                [a.length(), b.length(), c_magnitude],
            )
        }
        9 => {
            let a = to_dvec3(&values[0..3]);
            let b = to_dvec3(&values[3..6]);
            let c = to_dvec3(&values[6..9]);
            (
                [
                    a.normalize_or(DVec3::X),
                    b.normalize_or(DVec3::Y),
                    c.normalize_or(DVec3::Z),
                ],
                [a.length(), b.length(), c.length()],
            )
        }
        _ => (identity, [0.0; 3]),
    };
    (axes, magnitudes)
}

impl GeometryGenerator for SampledGeometry {
    fn polyline(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        segments: u32,
        time: f64,
    ) -> Option<Polyline> {
        let segments = segments.max(1);
        let mut vertices = Vec::with_capacity(segments as usize + 1);
        let mut data = data_values(fields.data);
        for i in 0..=segments {
            let xi = [f64::from(i) / f64::from(segments), 0.0, 0.0];
            let location = Location::element(element, xi);
            vertices.push(element_vertex(module, fields, &location, time)?);
            push_data(&mut data, module, fields.data, &location, time);
        }
        Some(Polyline {
            name: Some(element.number),
            vertices,
            data,
            line_width: 0,
        })
    }

    fn cylinder(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        radius: &CylinderParameters,
        segments: u32,
        circle_divisions: u32,
        time: f64,
    ) -> Option<Surface> {
        let segments = segments.max(1);
        let around = circle_divisions.max(3);
        let mut vertices = Vec::with_capacity(((segments + 1) * around) as usize);
        let mut data = data_values(fields.data);
        for i in 0..=segments {
            let xi = [f64::from(i) / f64::from(segments), 0.0, 0.0];
            let location = Location::element(element, xi);
            let centre = evaluate_position(module, fields.coordinate, &location, time)?;
            let frame = jacobian(module, fields.coordinate, element, xi, time)?;
            let scalar = radius
                .radius_scalar_field
                .as_ref()
                .and_then(|f| module.evaluate(f, &location, time))
                .and_then(|v| v.first().copied())
                .unwrap_or(0.0);
            let r = radius.constant_radius + radius.scale_factor * scalar;
            let texture = fields
                .texture_coordinate
                .and_then(|f| module.evaluate(f, &location, time))
                .map(|v| to_dvec3(&v).as_vec3().to_array());
            for k in 0..around {
                let angle = std::f64::consts::TAU * f64::from(k) / f64::from(around);
                let normal = frame.y_axis * angle.cos() + frame.z_axis * angle.sin();
                let mut vertex = Vertex::at((centre + normal * r).as_vec3());
                vertex.normal = normal.as_vec3().to_array();
                if let Some(texture) = texture {
                    vertex.texture = texture;
                }
                vertices.push(vertex);
                push_data(&mut data, module, fields.data, &location, time);
            }
        }
        let mut triangles = Vec::with_capacity((2 * segments * around) as usize);
        for i in 0..segments {
            for k in 0..around {
                let a = i * around + k;
                let b = i * around + (k + 1) % around;
                let c = a + around;
                let d = b + around;
                triangles.push([a, b, d]);
                triangles.push([a, d, c]);
            }
        }
        Some(Surface {
            name: Some(element.number),
            vertices,
            triangles,
            data,
            render_type: fegraphics_render::RenderType::Shaded,
        })
    }

    fn surface(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        divisions: [u32; 3],
        time: f64,
    ) -> Option<Surface> {
        let columns = divisions[0].max(1) + 1;
        let rows = divisions[1].max(1) + 1;
        let mut vertices = Vec::with_capacity((columns * rows) as usize);
        let mut data = data_values(fields.data);
        for j in 0..rows {
            for i in 0..columns {
                let xi = [
                    f64::from(i) / f64::from(columns - 1),
                    f64::from(j) / f64::from(rows - 1),
                    0.0,
                ];
                let location = Location::element(element, xi);
                vertices.push(element_vertex(module, fields, &location, time)?);
                push_data(&mut data, module, fields.data, &location, time);
            }
        }
        let mut surface = Surface {
            name: Some(element.number),
            vertices,
            triangles: grid_triangles(columns, rows, 0),
            data,
            render_type: fegraphics_render::RenderType::Shaded,
        };
        surface.compute_normals();
        Some(surface)
    }

    fn iso_surface(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        scalar: &Field,
        iso_value: f64,
        divisions: [u32; 3],
        time: f64,
    ) -> Vec<Primitive> {
        match element.dimension {
            3 => contour_tetrahedra(module, element, fields, scalar, iso_value, divisions, time)
                .map(Primitive::Surface)
                .into_iter()
                .collect(),
            _ => contour_line_segments(module, element, fields, scalar, iso_value, divisions, time)
                .into_iter()
                .map(Primitive::Polyline)
                .collect(),
        }
    }

    fn glyph_set(
        &self,
        module: &dyn FieldModule,
        samples: &[GlyphSample],
        fields: &GlyphFields<'_>,
        glyph: &GlyphParameters,
        name: Option<i32>,
        time: f64,
    ) -> Option<GlyphSet> {
        let mut points = Vec::with_capacity(samples.len());
        let mut data = data_values(fields.data);
        for sample in samples {
            let location = &sample.location;
            let position = match fields.coordinate {
                Some(coordinate) => match evaluate_position(module, coordinate, location, time) {
                    Some(position) => position,
                    None => continue,
                },
                None => DVec3::ZERO,
            };
            let (directions, magnitudes) = fields
                .orientation_scale
                .and_then(|f| module.evaluate(f, location, time))
                .map_or(([DVec3::X, DVec3::Y, DVec3::Z], [0.0; 3]), |values| {
                    orientation_scale_axes(&values)
                });
            let variable = fields
                .variable_scale
                .and_then(|f| module.evaluate(f, location, time))
                .map_or([1.0; 3], |v| match v.len() {
                    0 => [1.0; 3],
                    1 => [v[0]; 3],
                    _ => to_dvec3(&v).to_array(),
                });
            let mut axes = [DVec3::ZERO; 3];
            for axis in 0..3 {
                let scaled = match glyph.scaling_mode {
                    GlyphScalingMode::Constant => 0.0,
                    GlyphScalingMode::Scalar => magnitudes[0],
                    GlyphScalingMode::Vector => {
                        if axis == 0 {
                            magnitudes[0]
                        } else {
                            0.0
                        }
                    }
                    GlyphScalingMode::Axes | GlyphScalingMode::General => magnitudes[axis],
                };
                let size = glyph.base_size[axis]
                    + glyph.scale_factors[axis] * scaled * variable[axis];
                axes[axis] = directions[axis] * size;
            }
            let offset =
                axes[0] * glyph.centre[0] + axes[1] * glyph.centre[1] + axes[2] * glyph.centre[2];
            let label = fields
                .label
                .and_then(|f| module.evaluate_string(f, location, time));
            push_data(&mut data, module, fields.data, location, time);
            points.push(GlyphPoint {
                position: (position - offset).as_vec3().to_array(),
                axes: axes.map(|a| a.as_vec3().to_array()),
                label,
                number: sample.number,
            });
        }
        if points.is_empty() {
            return None;
        }
        Some(GlyphSet {
            name,
            glyph: glyph.glyph.as_ref().map(|g| g.name().to_string()),
            points,
            data,
        })
    }

    fn voltex(
        &self,
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        texture: Option<&VolumeTexture>,
        divisions: [u32; 3],
        time: f64,
    ) -> Option<Voltex> {
        if element.dimension != 3 {
            return None;
        }
        let (xi_min, xi_max) = texture.map_or(([0.0; 3], [1.0; 3]), |t| (t.xi_min, t.xi_max));
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        let mut data = data_values(fields.data);
        for face in 0..6_usize {
            let axis = face / 2;
            let side = (face % 2) as f64;
            let (u_axis, v_axis) = ((axis + 1) % 3, (axis + 2) % 3);
            let columns = divisions[u_axis].max(1) + 1;
            let rows = divisions[v_axis].max(1) + 1;
            let offset = u32::try_from(vertices.len()).ok()?;
            for j in 0..rows {
                for i in 0..columns {
                    let mut xi = [0.0; 3];
                    xi[axis] = side;
                    xi[u_axis] = f64::from(i) / f64::from(columns - 1);
                    xi[v_axis] = f64::from(j) / f64::from(rows - 1);
                    let location = Location::element(element, xi);
                    let position = evaluate_position(module, fields.coordinate, &location, time)?;
                    let mut vertex = Vertex::at(position.as_vec3());
                    vertex.texture = std::array::from_fn(|k| {
                        let span = xi_max[k] - xi_min[k];
                        if span.abs() < f64::EPSILON {
                            0.0
                        } else {
                            ((xi[k] - xi_min[k]) / span) as f32
                        }
                    });
                    vertices.push(vertex);
                    push_data(&mut data, module, fields.data, &location, time);
                }
            }
            let mut face_triangles = grid_triangles(columns, rows, offset);
            if face % 2 == 0 {
                for triangle in &mut face_triangles {
                    triangle.swap(1, 2);
                }
            }
            triangles.extend(face_triangles);
        }
        Some(Voltex {
            name: Some(element.number),
            vertices,
            triangles,
            data,
            texture: texture.map(|t| t.name.clone()),
        })
    }

    fn streamline(
        &self,
        region: &dyn FeRegion,
        module: &dyn FieldModule,
        element: ElementId,
        xi: [f64; 3],
        fields: &StreamlineFields<'_>,
        parameters: &StreamlineParameters,
        circle_divisions: u32,
        time: f64,
    ) -> Option<Primitive> {
        trace_streamline(
            region,
            module,
            element,
            xi,
            fields,
            parameters,
            circle_divisions,
            time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fegraphics_core::{CoordinateSystem, MemoryRegion, NodeId};

    #[test]
    fn test_polyline_samples_line() {
        let (region, coordinates) = MemoryRegion::block([2, 0, 0], 1);
        let fields = ElementFields {
            coordinate: &coordinates,
            data: None,
            texture_coordinate: None,
        };
        let line = SampledGeometry
            .polyline(&region, ElementId::line(2), &fields, 4, 0.0)
            .unwrap();
        assert_eq!(line.name, Some(2));
        assert_eq!(line.vertices.len(), 5);
        assert_eq!(line.vertices[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(line.vertices[2].position, [1.5, 0.0, 0.0]);
        assert_eq!(line.vertices[4].position, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_surface_grid_and_data() {
        let (mut region, coordinates) = MemoryRegion::block([1, 1, 0], 2);
        let temperature =
            region.define_nodal_field("temperature", 1, CoordinateSystem::RectangularCartesian);
        for node in 1..=4 {
            region
                .set_node_values(&temperature, NodeId(node), vec![f64::from(node)])
                .unwrap();
        }
        let fields = ElementFields {
            coordinate: &coordinates,
            data: Some(&temperature),
            texture_coordinate: None,
        };
        let surface = SampledGeometry
            .surface(&region, ElementId::face(1), &fields, [2, 3, 1], 0.0)
            .unwrap();
        assert_eq!(surface.vertices.len(), 12);
        assert_eq!(surface.triangles.len(), 12);
        assert_eq!(surface.data.as_ref().unwrap().len(), 12);
        for vertex in &surface.vertices {
            assert!((vertex.normal[2].abs() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cylinder_radius() {
        let (region, coordinates) = MemoryRegion::block([1, 0, 0], 1);
        let fields = ElementFields {
            coordinate: &coordinates,
            data: None,
            texture_coordinate: None,
        };
        let radius = CylinderParameters {
            constant_radius: 0.25,
            ..CylinderParameters::default()
        };
        let tube = SampledGeometry
            .cylinder(&region, ElementId::line(1), &fields, &radius, 2, 8, 0.0)
            .unwrap();
        assert_eq!(tube.vertices.len(), 24);
        assert_eq!(tube.triangles.len(), 32);
        for vertex in &tube.vertices {
            let p = vertex.position();
            let distance = (p.y * p.y + p.z * p.z).sqrt();
            assert!((distance - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn test_glyph_scaling_and_centre() {
        let (mut region, coordinates) = MemoryRegion::block([1, 0, 0], 1);
        let orientation = region.define_constant_field("direction", vec![0.0, 2.0, 0.0]);
        let fields = GlyphFields {
            coordinate: Some(&coordinates),
            data: None,
            orientation_scale: Some(&orientation),
            variable_scale: None,
            label: None,
        };
        let glyph = GlyphParameters {
            scaling_mode: GlyphScalingMode::Vector,
            base_size: [0.0, 0.1, 0.1],
            centre: [0.5, 0.0, 0.0],
            ..GlyphParameters::default()
        };
        let samples = [GlyphSample {
            location: Location::Node(NodeId(2)),
            number: 1,
        }];
        let set = SampledGeometry
            .glyph_set(&region, &samples, &fields, &glyph, None, 0.0)
            .unwrap();
        let point = &set.points[0];
        assert_eq!(point.axes[0], [0.0, 2.0, 0.0]);
        assert_eq!(point.position, [1.0, -1.0, 0.0]);
        assert!((glam::Vec3::from_array(point.axes[1]).length() - 0.1).abs() < 1e-6);
        assert_eq!(point.number, 1);
    }

    #[test]
    fn test_orientation_layouts() {
        let (axes, magnitudes) = orientation_scale_axes(&[3.0]);
        assert_eq!(axes[0], DVec3::X);
        assert_eq!(magnitudes, [3.0; 3]);
        let (axes, magnitudes) = orientation_scale_axes(&[0.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        assert_eq!(axes[0], DVec3::Z);
        assert_eq!(axes[1], DVec3::Y);
        assert_eq!(axes[2], -DVec3::X);
        assert_eq!(magnitudes[..2], [2.0, 3.0]);
    }

    #[test]
    fn test_voltex_faces() {
        let (region, coordinates) = MemoryRegion::block([1, 1, 1], 3);
        let fields = ElementFields {
            coordinate: &coordinates,
            data: None,
            texture_coordinate: None,
        };
        let texture = VolumeTexture {
            xi_min: [0.0; 3],
            xi_max: [2.0; 3],
            ..VolumeTexture::new("bone")
        };
        let block = SampledGeometry
            .voltex(&region, ElementId::element(1), &fields, Some(&texture), [1, 1, 1], 0.0)
            .unwrap();
        assert_eq!(block.vertices.len(), 24);
        assert_eq!(block.triangles.len(), 12);
        assert_eq!(block.texture.as_deref(), Some("bone"));
        assert!(block.vertices.iter().all(|v| v.texture.iter().all(|&t| t <= 0.5)));
    }

    #[test]
    fn test_jacobian_of_unit_cube() {
        let (region, coordinates) = MemoryRegion::block([1, 1, 1], 3);
        let j = jacobian(&region, &coordinates, ElementId::element(1), [0.5; 3], 0.0).unwrap();
        assert!((jacobian_measure(&j, 3) - 1.0).abs() < 1e-9);
        let (region, coordinates) = MemoryRegion::block([1, 1, 0], 2);
        let j = jacobian(&region, &coordinates, ElementId::face(1), [0.5; 3], 0.0).unwrap();
        assert!((j.z_axis - DVec3::Z).length() < 1e-9);
    }
}

//! Iso-contour extraction over single elements.
//!
//! Elements are sampled on their xi grid. 3-D cells are split into six
//! tetrahedra sharing the cell diagonal and contoured with marching
//! tetrahedra; 2-D cells are split into two triangles. Splitting into
//! simplices avoids the ambiguous cases of cube and square tables.

use std::collections::HashMap;

use glam::DVec3;

use fegraphics_core::{ElementId, Field, FieldModule, Location};
use fegraphics_render::{DataValues, Polyline, RenderType, Surface, Vertex};

use super::{evaluate_position, to_dvec3, ElementFields};

/// Tetrahedra of a unit cell as corner bit masks (bit 0 = xi1, bit 1 = xi2, bit 2 = xi3).
const KUHN_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

/// Values sampled at one grid point.
#[derive(Debug, Clone)]
struct Sample {
    position: DVec3,
    value: f64,
    data: Vec<f64>,
    texture: DVec3,
}

struct SampleGrid {
    counts: [usize; 3],
    samples: Vec<Sample>,
}

impl SampleGrid {
    fn evaluate(
        module: &dyn FieldModule,
        element: ElementId,
        fields: &ElementFields<'_>,
        scalar: &Field,
        divisions: [u32; 3],
        time: f64,
    ) -> Option<Self> {
        let dimension = usize::from(element.dimension.clamp(1, 3));
        let mut counts = [1_usize; 3];
        for (axis, count) in counts.iter_mut().enumerate().take(dimension) {
            *count = divisions[axis].max(1) as usize + 1;
        }
        let mut samples = Vec::with_capacity(counts.iter().product());
        for k in 0..counts[2] {
            for j in 0..counts[1] {
                for i in 0..counts[0] {
                    let mut xi = [0.0; 3];
                    for (axis, index) in [i, j, k].into_iter().enumerate().take(dimension) {
                        xi[axis] = index as f64 / (counts[axis] - 1) as f64;
                    }
                    let location = Location::element(element, xi);
                    let position = evaluate_position(module, fields.coordinate, &location, time)?;
                    let value = *module.evaluate(scalar, &location, time)?.first()?;
                    let data = fields
                        .data
                        .and_then(|f| module.evaluate(f, &location, time))
                        .unwrap_or_default();
                    let texture = fields
                        .texture_coordinate
                        .and_then(|f| module.evaluate(f, &location, time))
                        .map_or(DVec3::ZERO, |v| to_dvec3(&v));
                    samples.push(Sample {
                        position,
                        value,
                        data,
                        texture,
                    });
                }
            }
        }
        Some(Self { counts, samples })
    }

    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.counts[0] * (j + self.counts[1] * k)
    }
}

/// Interpolates the crossing of `iso_value` on the edge between two samples.
fn crossing(a: &Sample, b: &Sample, iso_value: f64) -> Sample {
    let span = b.value - a.value;
    let t = if span.abs() < f64::EPSILON {
        0.5
    } else {
        ((iso_value - a.value) / span).clamp(0.0, 1.0)
    };
    Sample {
        position: a.position.lerp(b.position, t),
        value: iso_value,
        data: a
            .data
            .iter()
            .zip(&b.data)
            .map(|(x, y)| x + (y - x) * t)
            .collect(),
        texture: a.texture.lerp(b.texture, t),
    }
}

fn to_vertex(sample: &Sample) -> Vertex {
    let mut vertex = Vertex::at(sample.position.as_vec3());
    vertex.texture = sample.texture.as_vec3().to_array();
    vertex
}

/// Accumulates shared edge-crossing vertices for one surface.
struct SurfaceBuilder<'a> {
    grid: &'a SampleGrid,
    iso_value: f64,
    edges: HashMap<(usize, usize), u32>,
    vertices: Vec<Vertex>,
    data: Option<DataValues>,
    triangles: Vec<[u32; 3]>,
}

impl SurfaceBuilder<'_> {
    fn edge_vertex(&mut self, a: usize, b: usize) -> u32 {
        let key = (a.min(b), a.max(b));
        if let Some(&index) = self.edges.get(&key) {
            return index;
        }
        let sample = crossing(&self.grid.samples[a], &self.grid.samples[b], self.iso_value);
        let index = self.vertices.len() as u32;
        self.vertices.push(to_vertex(&sample));
        if let Some(data) = &mut self.data {
            data.push(&sample.data);
        }
        self.edges.insert(key, index);
        index
    }

    /// Adds a triangle facing towards `outside`, the position of a sample above the iso-value.
    fn add_triangle(&mut self, mut triangle: [u32; 3], outside: DVec3) {
        let [a, b, c] = triangle.map(|i| self.vertices[i as usize].position().as_dvec3());
        let normal = (b - a).cross(c - a);
        if normal.dot(outside - a) < 0.0 {
            triangle.swap(1, 2);
        }
        self.triangles.push(triangle);
    }

    fn contour_tetrahedron(&mut self, corners: [usize; 4]) {
        let (above, below): (Vec<usize>, Vec<usize>) = corners
            .into_iter()
            .partition(|&c| self.grid.samples[c].value > self.iso_value);
        let Some(&first_above) = above.first() else {
            return;
        };
        let outside = self.grid.samples[first_above].position;
        match (above.len(), below.len()) {
            (1, 3) => {
                let a = above[0];
                let triangle = [
                    self.edge_vertex(a, below[0]),
                    self.edge_vertex(a, below[1]),
                    self.edge_vertex(a, below[2]),
                ];
                self.add_triangle(triangle, outside);
            }
            (3, 1) => {
                let b = below[0];
                let triangle = [
                    self.edge_vertex(above[0], b),
                    self.edge_vertex(above[1], b),
                    self.edge_vertex(above[2], b),
                ];
                self.add_triangle(triangle, outside);
            }
            (2, 2) => {
                let ac = self.edge_vertex(above[0], below[0]);
                let ad = self.edge_vertex(above[0], below[1]);
                let bd = self.edge_vertex(above[1], below[1]);
                let bc = self.edge_vertex(above[1], below[0]);
                self.add_triangle([ac, ad, bd], outside);
                self.add_triangle([ac, bd, bc], outside);
            }
            _ => {}
        }
    }
}

/// Contours a 3-D element into one surface; `None` if nothing crosses the iso-value.
pub fn contour_tetrahedra(
    module: &dyn FieldModule,
    element: ElementId,
    fields: &ElementFields<'_>,
    scalar: &Field,
    iso_value: f64,
    divisions: [u32; 3],
    time: f64,
) -> Option<Surface> {
    let grid = SampleGrid::evaluate(module, element, fields, scalar, divisions, time)?;
    let mut builder = SurfaceBuilder {
        grid: &grid,
        iso_value,
        edges: HashMap::new(),
        vertices: Vec::new(),
        data: fields.data.map(|f| DataValues::new(f.number_of_components())),
        triangles: Vec::new(),
    };
    let [ni, nj, nk] = grid.counts.map(|c| c.saturating_sub(1));
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let corner = |bits: usize| {
                    grid.index(i + (bits & 1), j + ((bits >> 1) & 1), k + ((bits >> 2) & 1))
                };
                for tetrahedron in KUHN_TETRAHEDRA {
                    builder.contour_tetrahedron(tetrahedron.map(corner));
                }
            }
        }
    }
    if builder.triangles.is_empty() {
        return None;
    }
    let mut surface = Surface {
        name: Some(element.number),
        vertices: builder.vertices,
        triangles: builder.triangles,
        data: builder.data,
        render_type: RenderType::Shaded,
    };
    surface.compute_normals();
    Some(surface)
}

fn polyline_through(
    element: ElementId,
    samples: &[Sample],
    data_components: Option<usize>,
) -> Polyline {
    let data = data_components.map(|components| {
        let mut values = DataValues::new(components);
        for sample in samples {
            values.push(&sample.data);
        }
        values
    });
    Polyline {
        name: Some(element.number),
        vertices: samples.iter().map(to_vertex).collect(),
        data,
        line_width: 0,
    }
}

/// Contours a 2-D element into line segments, or a 1-D element into crossing points.
pub fn contour_line_segments(
    module: &dyn FieldModule,
    element: ElementId,
    fields: &ElementFields<'_>,
    scalar: &Field,
    iso_value: f64,
    divisions: [u32; 3],
    time: f64,
) -> Vec<Polyline> {
    let Some(grid) = SampleGrid::evaluate(module, element, fields, scalar, divisions, time) else {
        return Vec::new();
    };
    let data_components = fields.data.map(Field::number_of_components);
    let above = |index: usize| grid.samples[index].value > iso_value;
    let mut polylines = Vec::new();
    if element.dimension <= 1 {
        for i in 0..grid.counts[0].saturating_sub(1) {
            if above(i) != above(i + 1) {
                let point = crossing(&grid.samples[i], &grid.samples[i + 1], iso_value);
                polylines.push(polyline_through(element, &[point], data_components));
            }
        }
        return polylines;
    }
    for j in 0..grid.counts[1].saturating_sub(1) {
        for i in 0..grid.counts[0].saturating_sub(1) {
            let a = grid.index(i, j, 0);
            let b = grid.index(i + 1, j, 0);
            let c = grid.index(i, j + 1, 0);
            let d = grid.index(i + 1, j + 1, 0);
            for triangle in [[a, b, d], [a, d, c]] {
                let crossings: Vec<Sample> = [(0, 1), (1, 2), (2, 0)]
                    .into_iter()
                    .filter(|&(p, q)| above(triangle[p]) != above(triangle[q]))
                    .map(|(p, q)| {
                        crossing(&grid.samples[triangle[p]], &grid.samples[triangle[q]], iso_value)
                    })
                    .collect();
                if crossings.len() == 2 {
                    polylines.push(polyline_through(element, &crossings, data_components));
                }
            }
        }
    }
    polylines
}

#[cfg(test)]
mod tests {
    use super::*;
    use fegraphics_core::{CoordinateSystem, FeRegion, MemoryRegion};

    fn x_scalar(region: &mut MemoryRegion, coordinates: &Field) -> Field {
        let scalar = region.define_nodal_field("x", 1, CoordinateSystem::RectangularCartesian);
        for node in region.node_ids() {
            let x = region
                .evaluate(coordinates, &Location::Node(node), 0.0)
                .map_or(0.0, |v| v[0]);
            region.set_node_values(&scalar, node, vec![x]).unwrap();
        }
        scalar
    }

    #[test]
    fn test_plane_through_cube() {
        let (mut region, coordinates) = MemoryRegion::block([1, 1, 1], 3);
        let scalar = x_scalar(&mut region, &coordinates);
        let fields = ElementFields {
            coordinate: &coordinates,
            data: None,
            texture_coordinate: None,
        };
        let surface = contour_tetrahedra(
            &region,
            ElementId::element(1),
            &fields,
            &scalar,
            0.25,
            [2, 2, 2],
            0.0,
        )
        .unwrap();
        assert!(!surface.triangles.is_empty());
        for vertex in &surface.vertices {
            assert!((vertex.position[0] - 0.25).abs() < 1e-6);
            assert!(vertex.normal[0] > 0.99);
        }
    }

    #[test]
    fn test_no_crossing_gives_nothing() {
        let (mut region, coordinates) = MemoryRegion::block([1, 1, 1], 3);
        let scalar = x_scalar(&mut region, &coordinates);
        let fields = ElementFields {
            coordinate: &coordinates,
            data: None,
            texture_coordinate: None,
        };
        assert!(contour_tetrahedra(
            &region,
            ElementId::element(1),
            &fields,
            &scalar,
            5.0,
            [1, 1, 1],
            0.0
        )
        .is_none());
    }

    #[test]
    fn test_line_through_square() {
        let (mut region, coordinates) = MemoryRegion::block([1, 1, 0], 2);
        let scalar = x_scalar(&mut region, &coordinates);
        let fields = ElementFields {
            coordinate: &coordinates,
            data: Some(&scalar),
            texture_coordinate: None,
        };
        let segments = contour_line_segments(
            &region,
            ElementId::face(1),
            &fields,
            &scalar,
            0.5,
            [1, 1, 1],
            0.0,
        );
        assert_eq!(segments.len(), 2);
        for segment in &segments {
            assert_eq!(segment.vertices.len(), 2);
            for vertex in &segment.vertices {
                assert!((vertex.position[0] - 0.5).abs() < 1e-6);
            }
            assert_eq!(segment.data.as_ref().unwrap().values, vec![0.5, 0.5]);
        }
    }

    #[test]
    fn test_points_on_line() {
        let (mut region, coordinates) = MemoryRegion::block([3, 0, 0], 1);
        let scalar = x_scalar(&mut region, &coordinates);
        let fields = ElementFields {
            coordinate: &coordinates,
            data: None,
            texture_coordinate: None,
        };
        let points = contour_line_segments(
            &region,
            ElementId::line(2),
            &fields,
            &scalar,
            1.5,
            [4, 1, 1],
            0.0,
        );
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].vertices[0].position, [1.5, 0.0, 0.0]);
    }
}

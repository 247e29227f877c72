//! Geometric primitives stored in graphics objects.
//!
//! Each primitive optionally carries the number of the element it was generated
//! from. Names let the conversion driver reuse or discard primitives per element
//! and let the renderer pick them.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::graphics_object::{GraphicsObjectKind, RenderType};

/// A vertex as uploaded to the renderer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in rectangular cartesian coordinates.
    pub position: [f32; 3],
    /// Unit normal, zero where undefined.
    pub normal: [f32; 3],
    /// Texture coordinates, zero where undefined.
    pub texture: [f32; 3],
}

impl Vertex {
    /// Creates a vertex at a position.
    pub fn at(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            ..Self::default()
        }
    }

    /// Position as a vector.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Per-vertex data values used for spectrum colouring.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValues {
    /// Values per vertex.
    pub components: usize,
    /// Flat value array, `components` values per vertex.
    pub values: Vec<f32>,
}

impl DataValues {
    /// Creates an empty data array.
    pub fn new(components: usize) -> Self {
        Self {
            components,
            values: Vec::new(),
        }
    }

    /// Appends one tuple, padding or truncating to `components`.
    pub fn push(&mut self, tuple: &[f64]) {
        for i in 0..self.components {
            self.values.push(tuple.get(i).copied().unwrap_or(0.0) as f32);
        }
    }

    /// Number of tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }

    /// Returns true if there are no tuples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A connected line strip.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    /// Generating element number.
    pub name: Option<i32>,
    /// Vertices in order along the line.
    pub vertices: Vec<Vertex>,
    /// Optional data per vertex.
    pub data: Option<DataValues>,
    /// Line width in pixels, 0 for the renderer default.
    pub line_width: u32,
}

/// An indexed triangle surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Surface {
    /// Generating element number.
    pub name: Option<i32>,
    /// Vertices.
    pub vertices: Vec<Vertex>,
    /// Triangles as vertex indices.
    pub triangles: Vec<[u32; 3]>,
    /// Optional data per vertex.
    pub data: Option<DataValues>,
    /// Shaded or wireframe.
    pub render_type: RenderType,
}

impl Surface {
    /// Recomputes area-weighted vertex normals from the triangles.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in &self.triangles {
            let [a, b, c] = tri.map(|i| i as usize);
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let pa = self.vertices[a].position();
            let face_normal = (self.vertices[b].position() - pa).cross(self.vertices[c].position() - pa);
            normals[a] += face_normal;
            normals[b] += face_normal;
            normals[c] += face_normal;
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal.normalize_or_zero().to_array();
        }
    }

    /// Merges vertices closer than `tolerance` and drops degenerate triangles.
    ///
    /// Data values of merged vertices are taken from the first vertex kept.
    pub fn weld_vertices(&mut self, tolerance: f32) {
        if tolerance <= 0.0 || self.vertices.is_empty() {
            return;
        }
        let mut kept: Vec<Vertex> = Vec::with_capacity(self.vertices.len());
        let mut kept_data = self.data.as_ref().map(|d| DataValues::new(d.components));
        let mut remap = Vec::with_capacity(self.vertices.len());
        for (index, vertex) in self.vertices.iter().enumerate() {
            let position = vertex.position();
            let existing = kept
                .iter()
                .position(|k| k.position().distance(position) < tolerance);
            match existing {
                Some(i) => remap.push(i),
                None => {
                    remap.push(kept.len());
                    kept.push(*vertex);
                    if let (Some(out), Some(data)) = (kept_data.as_mut(), self.data.as_ref()) {
                        let start = index * data.components;
                        out.values
                            .extend_from_slice(&data.values[start..start + data.components]);
                    }
                }
            }
        }
        let triangles = self
            .triangles
            .iter()
            .filter_map(|tri| {
                let [a, b, c] = tri.map(|i| remap.get(i as usize).copied());
                let (a, b, c) = (a?, b?, c?);
                if a == b || b == c || a == c {
                    None
                } else {
                    Some([a as u32, b as u32, c as u32])
                }
            })
            .collect();
        log::trace!(
            "welded {} vertices into {}",
            self.vertices.len(),
            kept.len()
        );
        self.vertices = kept;
        self.triangles = triangles;
        self.data = kept_data;
        self.compute_normals();
    }
}

/// Decimates and normalises surfaces as one mesh, keeping each surface's name.
///
/// Vertices closer than `tolerance` are snapped to one position across all
/// surfaces and welded within each surface. Normals of coincident vertices are
/// then averaged so shading is continuous over surface boundaries.
pub fn weld_surfaces<'a>(surfaces: impl IntoIterator<Item = &'a mut Surface>, tolerance: f32) {
    let mut surfaces: Vec<&mut Surface> = surfaces.into_iter().collect();
    if tolerance > 0.0 {
        let mut anchors: Vec<Vec3> = Vec::new();
        for surface in &mut surfaces {
            for vertex in &mut surface.vertices {
                let position = vertex.position();
                match anchors
                    .iter()
                    .copied()
                    .find(|anchor| anchor.distance(position) < tolerance)
                {
                    Some(anchor) => vertex.position = anchor.to_array(),
                    None => anchors.push(position),
                }
            }
            surface.weld_vertices(tolerance);
        }
    }
    let key = |vertex: &Vertex| vertex.position.map(|c| (c + 0.0).to_bits());
    let mut normals: FxHashMap<[u32; 3], Vec3> = FxHashMap::default();
    for surface in &mut surfaces {
        surface.compute_normals();
        for vertex in &surface.vertices {
            *normals.entry(key(vertex)).or_default() += Vec3::from_array(vertex.normal);
        }
    }
    for surface in &mut surfaces {
        for vertex in &mut surface.vertices {
            if let Some(sum) = normals.get(&key(vertex)) {
                vertex.normal = sum.normalize_or_zero().to_array();
            }
        }
    }
}

/// One glyph instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphPoint {
    /// Glyph origin.
    pub position: [f32; 3],
    /// Glyph axes, each scaled to its final length.
    pub axes: [[f32; 3]; 3],
    /// Optional text label.
    pub label: Option<String>,
    /// Point number used for picking and highlighting.
    pub number: i32,
}

/// A set of glyph instances.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphSet {
    /// Generating element number, `None` for node based sets.
    pub name: Option<i32>,
    /// Name of the glyph drawn at each point.
    pub glyph: Option<String>,
    /// Instances.
    pub points: Vec<GlyphPoint>,
    /// Optional data per point.
    pub data: Option<DataValues>,
}

/// A volume-rendered block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Voltex {
    /// Generating element number.
    pub name: Option<i32>,
    /// Vertices with texture coordinates.
    pub vertices: Vec<Vertex>,
    /// Boundary triangles.
    pub triangles: Vec<[u32; 3]>,
    /// Optional data per vertex.
    pub data: Option<DataValues>,
    /// Name of the volume texture.
    pub texture: Option<String>,
}

/// A primitive of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Line strip.
    Polyline(Polyline),
    /// Triangle surface.
    Surface(Surface),
    /// Glyph instances.
    GlyphSet(GlyphSet),
    /// Volume block.
    Voltex(Voltex),
}

impl Primitive {
    /// Generating element number, if any.
    #[must_use]
    pub fn name(&self) -> Option<i32> {
        match self {
            Self::Polyline(p) => p.name,
            Self::Surface(s) => s.name,
            Self::GlyphSet(g) => g.name,
            Self::Voltex(v) => v.name,
        }
    }

    /// The graphics object kind this primitive naturally belongs to.
    #[must_use]
    pub fn kind(&self) -> GraphicsObjectKind {
        match self {
            Self::Polyline(_) => GraphicsObjectKind::Polyline,
            Self::Surface(_) => GraphicsObjectKind::Surface,
            Self::GlyphSet(_) => GraphicsObjectKind::GlyphSet,
            Self::Voltex(_) => GraphicsObjectKind::Voltex,
        }
    }

    /// Vertices of the primitive; glyph sets have none.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        match self {
            Self::Polyline(p) => &p.vertices,
            Self::Surface(s) => &s.vertices,
            Self::Voltex(v) => &v.vertices,
            Self::GlyphSet(_) => &[],
        }
    }

    /// Vertex data as raw bytes for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices())
    }

    /// Extends `bounds` by every position in the primitive.
    pub fn extend_bounds(&self, bounds: &mut Option<Bounds>) {
        let mut include = |p: Vec3| match bounds {
            Some(b) => b.include(p),
            None => *bounds = Some(Bounds::from_point(p)),
        };
        match self {
            Self::GlyphSet(g) => {
                for point in &g.points {
                    include(Vec3::from_array(point.position));
                }
            }
            _ => {
                for vertex in self.vertices() {
                    include(vertex.position());
                }
            }
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// A box containing a single point.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grows the box to contain `point`.
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grows the box to contain `other`.
    pub fn union(&mut self, other: &Bounds) {
        self.include(other.min);
        self.include(other.max);
    }

    /// Centre of the box.
    #[must_use]
    pub fn centre(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

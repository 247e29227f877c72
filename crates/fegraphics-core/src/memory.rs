//! An in-memory finite element region with multilinear nodal fields.
//!
//! [`MemoryRegion`] implements both [`FeRegion`] and [`FieldModule`] so graphics can
//! be built without an external finite element library. Every element lists its
//! corner nodes in lexicographic order (xi1 fastest), and nodal fields are
//! interpolated multilinearly across it. Edits are recorded in a [`RegionChanges`]
//! log which callers take and forward to graphics.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::change::{ChangeFlags, RegionChanges};
use crate::error::{GraphicsError, Result};
use crate::field::{CoordinateSystem, Field, FieldDescription, FieldId, ValueType};
use crate::id::{ElementId, Location, NodeId};
use crate::region::{FeRegion, FieldModule, ParentRef};

#[derive(Debug, Clone, Default)]
struct ElementRecord {
    nodes: Vec<NodeId>,
    parents: Vec<ParentRef>,
}

#[derive(Debug, Clone)]
enum FieldData {
    Nodal(HashMap<NodeId, Vec<f64>>),
    Constant(Vec<f64>),
    ElementConstant(HashMap<ElementId, Vec<f64>>),
    MeshLocation(HashMap<NodeId, (ElementId, [f64; 3])>),
    Magnitude(Field),
}

/// A finite element region held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryRegion {
    nodes: BTreeSet<NodeId>,
    elements: BTreeMap<ElementId, ElementRecord>,
    fields: BTreeMap<FieldId, (Field, FieldData)>,
    native_discretization: HashMap<(FieldId, ElementId), [u32; 3]>,
    next_field_id: Cell<u32>,
    wrapped: RefCell<HashMap<FieldId, Field>>,
    changes: RegionChanges,
}

impl MemoryRegion {
    /// Creates an empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a regular block mesh with unit spacing and its coordinate field.
    ///
    /// `counts` gives the number of top-level elements along each axis; entries
    /// beyond `dimension` are ignored. Faces and lines are generated with parent
    /// links, and all nodes get 3-component "coordinates" values.
    pub fn block(counts: [usize; 3], dimension: u8) -> (Self, Field) {
        let dimension = dimension.clamp(1, 3);
        let dim = usize::from(dimension);
        let mut cells = [0_usize; 3];
        for (axis, cell) in cells.iter_mut().enumerate() {
            *cell = if axis < dim { counts[axis].max(1) } else { 0 };
        }
        let grid = [cells[0] + 1, cells[1] + 1, cells[2] + 1];

        let mut region = Self::new();
        let coordinates = region.define_nodal_field("coordinates", 3, CoordinateSystem::RectangularCartesian);
        let node_id = |i: usize, j: usize, k: usize| -> NodeId {
            NodeId(i32::try_from(1 + i + j * grid[0] + k * grid[0] * grid[1]).unwrap_or(i32::MAX))
        };
        for k in 0..grid[2] {
            for j in 0..grid[1] {
                for i in 0..grid[0] {
                    let node = node_id(i, j, k);
                    region.add_node(node);
                    #[allow(clippy::cast_precision_loss)]
                    let position = vec![i as f64, j as f64, k as f64];
                    // Field was just defined on this region, so this cannot fail.
                    let _ = region.set_node_values(&coordinates, node, position);
                }
            }
        }

        let mut number = 0;
        for k in 0..cells[2].max(1) {
            for j in 0..cells[1].max(1) {
                for i in 0..cells[0] {
                    number += 1;
                    let nodes = (0..1_usize << dim)
                        .map(|corner| {
                            node_id(i + (corner & 1), j + ((corner >> 1) & 1), k + ((corner >> 2) & 1))
                        })
                        .collect();
                    region.insert_element(ElementId::new(dimension, number), nodes);
                }
            }
        }

        for parent_dimension in (2..=dimension).rev() {
            region.generate_faces(parent_dimension);
        }
        region.changes = RegionChanges::new();
        (region, coordinates)
    }

    fn generate_faces(&mut self, parent_dimension: u8) {
        let dim = usize::from(parent_dimension);
        let mut faces_by_nodes: BTreeMap<Vec<NodeId>, ElementId> = BTreeMap::new();
        let mut number = 0;
        let parents: Vec<(ElementId, Vec<NodeId>)> = self
            .elements
            .iter()
            .filter(|(id, _)| id.dimension == parent_dimension)
            .map(|(id, record)| (*id, record.nodes.clone()))
            .collect();
        for (parent, nodes) in parents {
            for face_number in 0..2 * dim {
                let axis = face_number / 2;
                let side = face_number % 2;
                let face_nodes: Vec<NodeId> = (0..1_usize << dim)
                    .filter(|corner| (corner >> axis) & 1 == side)
                    .filter_map(|corner| nodes.get(corner).copied())
                    .collect();
                let mut key = face_nodes.clone();
                key.sort_unstable();
                let face = *faces_by_nodes.entry(key).or_insert_with(|| {
                    number += 1;
                    ElementId::new(parent_dimension - 1, number)
                });
                let record = self.elements.entry(face).or_default();
                if record.nodes.is_empty() {
                    record.nodes = face_nodes;
                }
                record.parents.push(ParentRef {
                    parent,
                    face_number,
                });
            }
        }
    }

    fn insert_element(&mut self, element: ElementId, nodes: Vec<NodeId>) {
        self.elements.insert(
            element,
            ElementRecord {
                nodes,
                parents: Vec::new(),
            },
        );
        self.changes.elements.record(element, ChangeFlags::ADD);
    }

    fn allocate_field_id(&self) -> FieldId {
        let id = self.next_field_id.get() + 1;
        self.next_field_id.set(id);
        FieldId(id)
    }

    fn add_field(&mut self, description: FieldDescription, data: FieldData) -> Field {
        let field = Field::new(description);
        self.changes.fields.record(field.id(), ChangeFlags::ADD);
        self.fields.insert(field.id(), (field.clone(), data));
        field
    }

    /// Adds a node.
    pub fn add_node(&mut self, node: NodeId) {
        if self.nodes.insert(node) {
            self.changes.nodes.record(node, ChangeFlags::ADD);
        }
    }

    /// Adds an element with its corner nodes in lexicographic order.
    pub fn add_element(&mut self, element: ElementId, nodes: &[NodeId]) -> Result<()> {
        if !(1..=3).contains(&element.dimension) {
            return Err(GraphicsError::InvalidArgument(format!(
                "element dimension {} out of range",
                element.dimension
            )));
        }
        if nodes.len() != 1 << element.dimension {
            return Err(GraphicsError::InvalidArgument(format!(
                "{element} needs {} nodes, got {}",
                1 << element.dimension,
                nodes.len()
            )));
        }
        if let Some(missing) = nodes.iter().find(|n| !self.nodes.contains(n)) {
            return Err(GraphicsError::InvalidArgument(format!("{missing} not in region")));
        }
        self.insert_element(element, nodes.to_vec());
        Ok(())
    }

    /// Declares `face` to be face `face_number` of `parent`.
    pub fn add_face(&mut self, face: ElementId, parent: ElementId, face_number: usize) -> Result<()> {
        if face.dimension + 1 != parent.dimension || face_number >= 2 * usize::from(parent.dimension) {
            return Err(GraphicsError::InvalidArgument(format!(
                "{face} cannot be face {face_number} of {parent}"
            )));
        }
        if !self.elements.contains_key(&parent) {
            return Err(GraphicsError::InvalidArgument(format!("{parent} not in region")));
        }
        let record = self
            .elements
            .get_mut(&face)
            .ok_or_else(|| GraphicsError::InvalidArgument(format!("{face} not in region")))?;
        record.parents.push(ParentRef {
            parent,
            face_number,
        });
        self.changes.elements.record(face, ChangeFlags::DEFINITION);
        Ok(())
    }

    /// Removes an element and any parent links to it.
    pub fn remove_element(&mut self, element: ElementId) -> bool {
        if self.elements.remove(&element).is_none() {
            return false;
        }
        for record in self.elements.values_mut() {
            record.parents.retain(|p| p.parent != element);
        }
        self.changes.elements.record(element, ChangeFlags::REMOVE);
        true
    }

    /// Defines a field with values stored at nodes.
    pub fn define_nodal_field(
        &mut self,
        name: &str,
        number_of_components: usize,
        coordinate_system: CoordinateSystem,
    ) -> Field {
        let description = FieldDescription::new(self.allocate_field_id(), name, number_of_components)
            .with_coordinate_system(coordinate_system);
        self.add_field(description, FieldData::Nodal(HashMap::new()))
    }

    /// Defines a field with the same value everywhere.
    pub fn define_constant_field(&mut self, name: &str, values: Vec<f64>) -> Field {
        let description = FieldDescription::new(self.allocate_field_id(), name, values.len());
        self.add_field(description, FieldData::Constant(values))
    }

    /// Defines a field that is constant over each element.
    pub fn define_element_constant_field(&mut self, name: &str, number_of_components: usize) -> Field {
        let description = FieldDescription::new(self.allocate_field_id(), name, number_of_components);
        self.add_field(description, FieldData::ElementConstant(HashMap::new()))
    }

    /// Defines a field giving a host element location at each node.
    pub fn define_mesh_location_field(&mut self, name: &str) -> Field {
        let description = FieldDescription::new(self.allocate_field_id(), name, 1)
            .with_value_type(ValueType::MeshLocation);
        self.add_field(description, FieldData::MeshLocation(HashMap::new()))
    }

    /// Defines the magnitude of another field.
    pub fn define_magnitude_field(&mut self, name: &str, source: &Field) -> Field {
        let description = FieldDescription::new(self.allocate_field_id(), name, 1)
            .with_source_fields(vec![source.clone()]);
        self.add_field(description, FieldData::Magnitude(source.clone()))
    }

    /// Sets the values of a nodal field at one node.
    pub fn set_node_values(&mut self, field: &Field, node: NodeId, values: Vec<f64>) -> Result<()> {
        if !self.nodes.contains(&node) {
            return Err(GraphicsError::InvalidArgument(format!("{node} not in region")));
        }
        let Some((_, FieldData::Nodal(map))) = self.fields.get_mut(&field.id()) else {
            return Err(GraphicsError::InvalidArgument(format!(
                "field '{field}' is not a nodal field of this region"
            )));
        };
        if values.len() != field.number_of_components() {
            return Err(GraphicsError::ComponentCount {
                field: field.name().to_string(),
                expected: "one value per component",
                actual: values.len(),
            });
        }
        map.insert(node, values);
        self.changes.fields.record(field.id(), ChangeFlags::RELATED);
        self.changes.nodes.record(node, ChangeFlags::RELATED);
        for (element, record) in &self.elements {
            if record.nodes.contains(&node) {
                self.changes.elements.record(*element, ChangeFlags::RELATED);
            }
        }
        Ok(())
    }

    /// Sets the value of an element-constant field on one element.
    pub fn set_element_values(&mut self, field: &Field, element: ElementId, values: Vec<f64>) -> Result<()> {
        let Some((_, FieldData::ElementConstant(map))) = self.fields.get_mut(&field.id()) else {
            return Err(GraphicsError::InvalidArgument(format!(
                "field '{field}' is not an element field of this region"
            )));
        };
        map.insert(element, values);
        self.changes.fields.record(field.id(), ChangeFlags::RELATED);
        self.changes.elements.record(element, ChangeFlags::RELATED);
        Ok(())
    }

    /// Sets the host location of a node in a mesh location field.
    pub fn set_mesh_location(
        &mut self,
        field: &Field,
        node: NodeId,
        element: ElementId,
        xi: [f64; 3],
    ) -> Result<()> {
        let Some((_, FieldData::MeshLocation(map))) = self.fields.get_mut(&field.id()) else {
            return Err(GraphicsError::InvalidArgument(format!(
                "field '{field}' is not a mesh location field of this region"
            )));
        };
        map.insert(node, (element, xi));
        self.changes.fields.record(field.id(), ChangeFlags::RELATED);
        self.changes.nodes.record(node, ChangeFlags::RELATED);
        Ok(())
    }

    /// Sets the element-based discretization of a field on one element.
    pub fn set_native_discretization(&mut self, field: &Field, element: ElementId, number_in_xi: [u32; 3]) {
        self.native_discretization
            .insert((field.id(), element), number_in_xi);
    }

    /// Takes the changes recorded since the last call.
    pub fn take_changes(&mut self) -> RegionChanges {
        std::mem::take(&mut self.changes)
    }

    /// Number of wrapped fields not yet released.
    #[must_use]
    pub fn active_wraps(&self) -> usize {
        self.wrapped.borrow().len()
    }

    fn interpolate(&self, values: &HashMap<NodeId, Vec<f64>>, element: ElementId, xi: [f64; 3]) -> Option<Vec<f64>> {
        let record = self.elements.get(&element)?;
        let dim = usize::from(element.dimension);
        let mut result: Option<Vec<f64>> = None;
        for (corner, node) in record.nodes.iter().enumerate().take(1 << dim) {
            let weight: f64 = (0..dim)
                .map(|axis| if (corner >> axis) & 1 == 1 { xi[axis] } else { 1.0 - xi[axis] })
                .product();
            let nodal = values.get(node)?;
            let sum = result.get_or_insert_with(|| vec![0.0; nodal.len()]);
            for (s, v) in sum.iter_mut().zip(nodal) {
                *s += weight * v;
            }
        }
        result
    }
}

fn to_rectangular_cartesian(coordinate_system: CoordinateSystem, values: &[f64]) -> Vec<f64> {
    let get = |i: usize| values.get(i).copied().unwrap_or(0.0);
    match coordinate_system {
        CoordinateSystem::CylindricalPolar => {
            let (r, theta, z) = (get(0), get(1), get(2));
            vec![r * theta.cos(), r * theta.sin(), z]
        }
        CoordinateSystem::SphericalPolar => {
            let (r, theta, phi) = (get(0), get(1), get(2));
            vec![r * theta.cos() * phi.cos(), r * theta.sin() * phi.cos(), r * phi.sin()]
        }
        CoordinateSystem::RectangularCartesian | CoordinateSystem::Fibre => values.to_vec(),
    }
}

impl FeRegion for MemoryRegion {
    fn highest_dimension(&self) -> u8 {
        self.elements.keys().map(|e| e.dimension).max().unwrap_or(0)
    }

    fn element_ids(&self, dimension: u8) -> Vec<ElementId> {
        self.elements
            .keys()
            .filter(|e| e.dimension == dimension)
            .copied()
            .collect()
    }

    fn contains_element(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().copied().collect()
    }

    fn parents(&self, element: ElementId) -> Vec<ParentRef> {
        self.elements
            .get(&element)
            .map(|r| r.parents.clone())
            .unwrap_or_default()
    }

    fn element_nodes(&self, element: ElementId) -> Vec<NodeId> {
        self.elements
            .get(&element)
            .map(|r| r.nodes.clone())
            .unwrap_or_default()
    }

    fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn native_discretization(&self, element: ElementId, field: &Field) -> Option<[u32; 3]> {
        self.native_discretization.get(&(field.id(), element)).copied()
    }
}

impl FieldModule for MemoryRegion {
    fn evaluate(&self, field: &Field, location: &Location, time: f64) -> Option<Vec<f64>> {
        let wrapped_source = self.wrapped.borrow().get(&field.id()).cloned();
        if let Some(source) = wrapped_source {
            let values = self.evaluate(&source, location, time)?;
            return Some(to_rectangular_cartesian(source.coordinate_system(), &values));
        }
        let (_, data) = self.fields.get(&field.id())?;
        match data {
            FieldData::Nodal(values) => match location {
                Location::Node(node) => values.get(node).cloned(),
                Location::Element { element, xi } => self.interpolate(values, *element, *xi),
                Location::Point => None,
            },
            FieldData::Constant(values) => Some(values.clone()),
            FieldData::ElementConstant(values) => match location {
                Location::Element { element, .. } => values.get(element).cloned(),
                _ => None,
            },
            FieldData::MeshLocation(_) => None,
            FieldData::Magnitude(source) => {
                let values = self.evaluate(source, location, time)?;
                Some(vec![values.iter().map(|v| v * v).sum::<f64>().sqrt()])
            }
        }
    }

    fn evaluate_mesh_location(
        &self,
        field: &Field,
        location: &Location,
        _time: f64,
    ) -> Option<(ElementId, [f64; 3])> {
        let (_, FieldData::MeshLocation(map)) = self.fields.get(&field.id())? else {
            return None;
        };
        match location {
            Location::Node(node) => map.get(node).copied(),
            _ => None,
        }
    }

    fn begin_wrap_coordinate(&self, field: &Field) -> Result<Field> {
        match field.coordinate_system() {
            CoordinateSystem::RectangularCartesian => Ok(field.clone()),
            CoordinateSystem::Fibre => Err(GraphicsError::FieldWrap(field.name().to_string())),
            CoordinateSystem::CylindricalPolar | CoordinateSystem::SphericalPolar => {
                let description = FieldDescription::new(
                    self.allocate_field_id(),
                    format!("{}_rc", field.name()),
                    3,
                )
                .with_source_fields(vec![field.clone()]);
                let wrapped = Field::new(description);
                self.wrapped
                    .borrow_mut()
                    .insert(wrapped.id(), field.clone());
                log::trace!("wrapped coordinate field '{field}' as '{wrapped}'");
                Ok(wrapped)
            }
        }
    }

    fn begin_wrap_orientation_scale(&self, field: &Field, _coordinate: &Field) -> Result<Field> {
        if field.coordinate_system() == CoordinateSystem::RectangularCartesian
            && field.is_orientation_scale_capable()
        {
            Ok(field.clone())
        } else {
            Err(GraphicsError::FieldWrap(field.name().to_string()))
        }
    }

    fn end_wrap(&self, wrapped: &Field) {
        self.wrapped.borrow_mut().remove(&wrapped.id());
    }
}

//! Interfaces to the finite element region and its field module.
//!
//! Graphics never own mesh data or evaluate fields themselves: they enumerate
//! elements and nodes through [`FeRegion`] and evaluate fields through
//! [`FieldModule`]. Elements are unit lines, squares and cubes in chart (xi)
//! space; faces of an element are numbered `2 * axis + side`.

use crate::error::Result;
use crate::field::Field;
use crate::id::{ElementId, Location, NodeId};

/// A parent of a face or line, with the face number the child occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentRef {
    /// The parent element, one dimension higher than the child.
    pub parent: ElementId,
    /// Face number of the child in the parent, `2 * axis + side`.
    pub face_number: usize,
}

/// Read access to the mesh of a finite element region.
pub trait FeRegion {
    /// Highest dimension of any element in the region, 0 if there are none.
    fn highest_dimension(&self) -> u8;

    /// Identifiers of all elements of one dimension, in ascending order.
    fn element_ids(&self, dimension: u8) -> Vec<ElementId>;

    /// Returns true if the element exists.
    fn contains_element(&self, element: ElementId) -> bool;

    /// Identifiers of all nodes, in ascending order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Parents of a face or line element.
    fn parents(&self, element: ElementId) -> Vec<ParentRef>;

    /// Corner nodes of an element, empty if it does not exist.
    fn element_nodes(&self, element: ElementId) -> Vec<NodeId>;

    /// Number of elements of one dimension.
    fn number_of_elements(&self, dimension: u8) -> usize {
        self.element_ids(dimension).len()
    }

    /// Number of elements of all dimensions.
    fn number_of_elements_all_dimensions(&self) -> usize {
        (1..=3).map(|d| self.number_of_elements(d)).sum()
    }

    /// Number of nodes.
    fn number_of_nodes(&self) -> usize {
        self.node_ids().len()
    }

    /// Element-based discretization of `field` on `element`, if any.
    fn native_discretization(&self, _element: ElementId, _field: &Field) -> Option<[u32; 3]> {
        None
    }
}

/// Evaluation and wrapping of computed fields.
pub trait FieldModule {
    /// Evaluates a real field. Returns `None` where the field is not defined.
    fn evaluate(&self, field: &Field, location: &Location, time: f64) -> Option<Vec<f64>>;

    /// Evaluates a mesh location field.
    fn evaluate_mesh_location(
        &self,
        field: &Field,
        location: &Location,
        time: f64,
    ) -> Option<(ElementId, [f64; 3])>;

    /// Evaluates a field as text.
    fn evaluate_string(&self, field: &Field, location: &Location, time: f64) -> Option<String> {
        let values = self.evaluate(field, location, time)?;
        Some(
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Returns a rectangular cartesian version of a coordinate field.
    fn begin_wrap_coordinate(&self, field: &Field) -> Result<Field>;

    /// Returns a rectangular cartesian version of an orientation/scale or vector field.
    fn begin_wrap_orientation_scale(&self, field: &Field, coordinate: &Field) -> Result<Field>;

    /// Releases a field returned by one of the wrap functions.
    fn end_wrap(&self, _wrapped: &Field) {}

    /// Clears any cached evaluations.
    fn clear_cache(&self) {}
}

/// A wrapped field that is released again when dropped.
pub struct FieldWrap<'a> {
    module: &'a dyn FieldModule,
    field: Field,
}

impl<'a> FieldWrap<'a> {
    /// Wraps a coordinate field.
    pub fn coordinate(module: &'a dyn FieldModule, field: &Field) -> Result<Self> {
        let field = module.begin_wrap_coordinate(field)?;
        Ok(Self { module, field })
    }

    /// Wraps an orientation/scale or vector field relative to a wrapped coordinate field.
    pub fn orientation_scale(
        module: &'a dyn FieldModule,
        field: &Field,
        coordinate: &Field,
    ) -> Result<Self> {
        let field = module.begin_wrap_orientation_scale(field, coordinate)?;
        Ok(Self { module, field })
    }

    /// The wrapped field.
    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }
}

impl Drop for FieldWrap<'_> {
    fn drop(&mut self) {
        self.module.end_wrap(&self.field);
    }
}

/// Clears a field module's evaluation cache when dropped.
pub struct CacheGuard<'a> {
    module: &'a dyn FieldModule,
}

impl<'a> CacheGuard<'a> {
    /// Guards `module` until the end of the current scope.
    pub fn new(module: &'a dyn FieldModule) -> Self {
        Self { module }
    }
}

impl Drop for CacheGuard<'_> {
    fn drop(&mut self) {
        self.module.clear_cache();
    }
}

/// Face selector restricting which elements a graphic draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum FaceType {
    /// All faces.
    #[default]
    All,
    /// Faces at xi1 = 0.
    Xi1Zero,
    /// Faces at xi1 = 1.
    Xi1One,
    /// Faces at xi2 = 0.
    Xi2Zero,
    /// Faces at xi2 = 1.
    Xi2One,
    /// Faces at xi3 = 0.
    Xi3Zero,
    /// Faces at xi3 = 1.
    Xi3One,
}

impl FaceType {
    /// Face number `2 * axis + side`, or `None` for [`FaceType::All`].
    #[must_use]
    pub fn face_number(self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Xi1Zero => Some(0),
            Self::Xi1One => Some(1),
            Self::Xi2Zero => Some(2),
            Self::Xi2One => Some(3),
            Self::Xi3Zero => Some(4),
            Self::Xi3One => Some(5),
        }
    }

    /// Command-style token for descriptions.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Xi1Zero => "xi1_0",
            Self::Xi1One => "xi1_1",
            Self::Xi2Zero => "xi2_0",
            Self::Xi2One => "xi2_1",
            Self::Xi3Zero => "xi3_0",
            Self::Xi3One => "xi3_1",
        }
    }
}

/// Returns true if the element lies on the outside of the mesh.
///
/// Top-level elements count as exterior. A face is exterior if it has exactly one
/// top-level parent; a line is exterior if any of its parent faces is.
pub fn is_exterior(region: &dyn FeRegion, element: ElementId) -> bool {
    let top = region.highest_dimension();
    if element.dimension >= top {
        return true;
    }
    let parents = region.parents(element);
    if element.dimension + 1 == top {
        return parents.len() == 1;
    }
    parents.iter().any(|p| is_exterior(region, p.parent))
}

/// Returns true if the element lies on the given face of some top-level ancestor.
pub fn is_on_face(region: &dyn FeRegion, element: ElementId, face_number: usize) -> bool {
    let top = region.highest_dimension();
    region.parents(element).iter().any(|p| {
        if p.parent.dimension == top {
            p.face_number == face_number
        } else {
            is_on_face(region, p.parent, face_number)
        }
    })
}

/// Returns true if the element meets exterior and face criteria.
///
/// Face criteria only apply to elements below the top dimension.
pub fn meets_topological_criteria(
    region: &dyn FeRegion,
    element: ElementId,
    exterior: bool,
    face: FaceType,
) -> bool {
    if exterior && !is_exterior(region, element) {
        return false;
    }
    match face.face_number() {
        Some(number) if element.dimension < region.highest_dimension() => {
            is_on_face(region, element, number)
        }
        _ => true,
    }
}

/// Converts chart coordinates on a face to chart coordinates in its parent.
#[must_use]
pub fn face_xi_to_parent_xi(face_number: usize, face_xi: [f64; 3]) -> [f64; 3] {
    let fixed_axis = face_number / 2;
    #[allow(clippy::cast_precision_loss)]
    let fixed_value = (face_number % 2) as f64;
    let mut xi = [0.0; 3];
    let mut next = 0;
    for (axis, value) in xi.iter_mut().enumerate() {
        if axis == fixed_axis {
            *value = fixed_value;
        } else {
            *value = face_xi[next];
            next += 1;
        }
    }
    xi
}

/// Finds the top-level ancestor of an element through its first parents.
///
/// Returns the ancestor and the chain of face numbers from the element upwards.
pub fn top_level_element(region: &dyn FeRegion, element: ElementId) -> (ElementId, Vec<usize>) {
    let top = region.highest_dimension();
    let mut current = element;
    let mut chain = Vec::new();
    while current.dimension < top {
        match region.parents(current).first() {
            Some(parent) => {
                chain.push(parent.face_number);
                current = parent.parent;
            }
            None => break,
        }
    }
    (current, chain)
}

/// Converts chart coordinates through a chain of face numbers.
#[must_use]
pub fn xi_through_chain(chain: &[usize], xi: [f64; 3]) -> [f64; 3] {
    chain
        .iter()
        .fold(xi, |xi, &face_number| face_xi_to_parent_xi(face_number, xi))
}

/// Finds the element across a face, with the face number on the other side.
pub fn neighbour(
    region: &dyn FeRegion,
    element: ElementId,
    face_number: usize,
) -> Option<(ElementId, usize)> {
    if element.dimension <= 1 {
        return None;
    }
    let face_dimension = element.dimension - 1;
    region
        .element_ids(face_dimension)
        .into_iter()
        .filter_map(|face| {
            let parents = region.parents(face);
            let on_this = parents
                .iter()
                .any(|p| p.parent == element && p.face_number == face_number);
            if on_this {
                parents
                    .into_iter()
                    .find(|p| p.parent != element)
                    .map(|p| (p.parent, p.face_number))
            } else {
                None
            }
        })
        .next()
}

//! Shared handles to externally owned computed fields.
//!
//! A [`Field`] is a cheap, cloneable reference to a field description owned by a
//! field module. Graphics hold clones while they use a field; the description is
//! released when the last handle is dropped. Two handles are equal only if they
//! refer to the same field instance.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::change::{ChangeFlags, ChangeLog};

/// Identifier of a field within its field module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub u32);

/// Coordinate system in which a field's values are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CoordinateSystem {
    /// x, y, z.
    #[default]
    RectangularCartesian,
    /// r, theta, z.
    CylindricalPolar,
    /// r, theta, phi.
    SphericalPolar,
    /// Fibre angles; cannot be used as a position.
    Fibre,
}

/// Kind of values a field produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueType {
    /// Real numbers.
    #[default]
    Real,
    /// Element and chart coordinates.
    MeshLocation,
    /// Text.
    String,
}

/// Description of one field, owned by its field module.
#[derive(Debug, Clone)]
pub struct FieldDescription {
    id: FieldId,
    name: String,
    number_of_components: usize,
    value_type: ValueType,
    coordinate_system: CoordinateSystem,
    source_fields: Vec<Field>,
    multiple_times: bool,
}

impl FieldDescription {
    /// Creates a real-valued rectangular cartesian field description.
    pub fn new(id: FieldId, name: impl Into<String>, number_of_components: usize) -> Self {
        Self {
            id,
            name: name.into(),
            number_of_components,
            value_type: ValueType::Real,
            coordinate_system: CoordinateSystem::RectangularCartesian,
            source_fields: Vec::new(),
            multiple_times: false,
        }
    }

    /// Sets the value type.
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Sets the coordinate system.
    pub fn with_coordinate_system(mut self, coordinate_system: CoordinateSystem) -> Self {
        self.coordinate_system = coordinate_system;
        self
    }

    /// Sets the fields this field is computed from.
    pub fn with_source_fields(mut self, source_fields: Vec<Field>) -> Self {
        self.source_fields = source_fields;
        self
    }

    /// Marks the field as having values at multiple times.
    pub fn with_multiple_times(mut self, multiple_times: bool) -> Self {
        self.multiple_times = multiple_times;
        self
    }
}

/// A counted reference to a computed field.
#[derive(Clone)]
pub struct Field(Arc<FieldDescription>);

impl Field {
    /// Creates a new field from its description.
    pub fn new(description: FieldDescription) -> Self {
        Self(Arc::new(description))
    }

    /// Returns the field identifier.
    #[must_use]
    pub fn id(&self) -> FieldId {
        self.0.id
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the number of components.
    #[must_use]
    pub fn number_of_components(&self) -> usize {
        self.0.number_of_components
    }

    /// Returns the value type.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.0.value_type
    }

    /// Returns the coordinate system.
    #[must_use]
    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.0.coordinate_system
    }

    /// Returns the fields this field is computed from.
    #[must_use]
    pub fn source_fields(&self) -> &[Field] {
        &self.0.source_fields
    }

    /// Number of live handles to this field.
    #[must_use]
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns true for real fields with 1 to 3 components.
    #[must_use]
    pub fn has_up_to_3_numerical_components(&self) -> bool {
        self.value_type() == ValueType::Real && (1..=3).contains(&self.number_of_components())
    }

    /// Returns true for single component real fields.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.value_type() == ValueType::Real && self.number_of_components() == 1
    }

    /// Returns true if the field can orient and scale glyphs.
    ///
    /// Accepted layouts are a scalar, one vector (2 or 3 components), two
    /// vectors (4 or 6 components) or three 3-D vectors (9 components).
    #[must_use]
    pub fn is_orientation_scale_capable(&self) -> bool {
        self.value_type() == ValueType::Real
            && matches!(self.number_of_components(), 1 | 2 | 3 | 4 | 6 | 9)
    }

    /// Returns true if this field or any field it is computed from is `other`.
    #[must_use]
    pub fn depends_on_field(&self, other: &Field) -> bool {
        self == other || self.source_fields().iter().any(|s| s.depends_on_field(other))
    }

    /// Returns true if this field or any of its sources appears in `changes`.
    #[must_use]
    pub fn depends_on_changed(&self, changes: &ChangeLog<FieldId>) -> bool {
        self.depends_on_changed_with(changes, ChangeFlags::ALL)
    }

    /// Like [`Field::depends_on_changed`], restricted to changes carrying any of `flags`.
    #[must_use]
    pub fn depends_on_changed_with(&self, changes: &ChangeLog<FieldId>, flags: ChangeFlags) -> bool {
        changes.flags(&self.id()).intersects(flags)
            || self
                .source_fields()
                .iter()
                .any(|s| s.depends_on_changed_with(changes, flags))
    }

    /// Returns true if this field or any of its sources varies with time.
    #[must_use]
    pub fn has_multiple_times(&self) -> bool {
        self.0.multiple_times || self.source_fields().iter().any(Field::has_multiple_times)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({}#{})", self.name(), self.0.id.0)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compares two optional fields by identity.
#[must_use]
pub fn same_field(a: Option<&Field>, b: Option<&Field>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: u32, name: &str, components: usize) -> Field {
        Field::new(FieldDescription::new(FieldId(id), name, components))
    }

    #[test]
    fn test_identity_equality() {
        let a = field(1, "coordinates", 3);
        let b = field(1, "coordinates", 3);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert!(same_field(Some(&a), Some(&a.clone())));
        assert!(!same_field(Some(&a), None));
        assert!(same_field(None, None));
    }

    #[test]
    fn test_component_predicates() {
        assert!(field(1, "s", 1).is_scalar());
        assert!(field(1, "v", 3).has_up_to_3_numerical_components());
        assert!(!field(1, "t", 4).has_up_to_3_numerical_components());
        assert!(field(1, "t", 9).is_orientation_scale_capable());
        assert!(!field(1, "t", 5).is_orientation_scale_capable());

        let location = Field::new(
            FieldDescription::new(FieldId(2), "host", 1).with_value_type(ValueType::MeshLocation),
        );
        assert!(!location.is_scalar());
    }

    #[test]
    fn test_dependency_reachability() {
        let coordinates = field(1, "coordinates", 3);
        let magnitude = Field::new(
            FieldDescription::new(FieldId(2), "magnitude", 1)
                .with_source_fields(vec![coordinates.clone()]),
        );
        let unrelated = field(3, "pressure", 1);

        let mut changes = ChangeLog::new();
        changes.record(coordinates.id(), ChangeFlags::RELATED);

        assert!(magnitude.depends_on_field(&coordinates));
        assert!(magnitude.depends_on_changed(&changes));
        assert!(!magnitude.depends_on_changed_with(&changes, ChangeFlags::DEFINITION));
        assert!(!unrelated.depends_on_changed(&changes));
    }

    #[test]
    fn test_reference_counting() {
        let a = field(1, "a", 1);
        assert_eq!(a.reference_count(), 1);
        let held = vec![a.clone(), a.clone()];
        assert_eq!(a.reference_count(), 3);
        drop(held);
        assert_eq!(a.reference_count(), 1);
    }

    #[test]
    fn test_time_dependence_through_sources() {
        let timed = Field::new(FieldDescription::new(FieldId(1), "t", 1).with_multiple_times(true));
        let derived =
            Field::new(FieldDescription::new(FieldId(2), "d", 1).with_source_fields(vec![timed]));
        assert!(derived.has_multiple_times());
    }
}

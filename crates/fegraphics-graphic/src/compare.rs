//! Equivalence tests between graphics.
//!
//! Comparisons come in three strengths: same geometry, same non-trivial
//! output (geometry plus everything that changes generated primitives) and a
//! full match including cosmetic appearance. Field, glyph and tessellation
//! references compare by identity.

use std::sync::Arc;

use fegraphics_core::same_field;

use crate::graphic::Graphic;

/// Registry resources are identified by name.
fn same_named<T>(a: Option<&Arc<T>>, b: Option<&Arc<T>>, name: impl Fn(&T) -> &str) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => name(a) == name(b),
        (None, None) => true,
        _ => false,
    }
}

impl Graphic {
    /// Returns true if both graphics generate the same geometry.
    #[must_use]
    pub fn same_geometry(&self, other: &Graphic) -> bool {
        self.graphic_type() == other.graphic_type()
            && self.kind.same_geometry(&other.kind)
            && same_field(self.coordinate_field(), other.coordinate_field())
            && self.exterior == other.exterior
            && self.face == other.face
            && same_field(self.visibility_field(), other.visibility_field())
    }

    /// Returns true if both graphics generate identical primitives.
    ///
    /// Materials, spectrum, visibility flag and overlay order are cosmetic and
    /// ignored, so a graphics object may move between graphics that differ
    /// only in those.
    #[must_use]
    pub fn same_non_trivial(&self, other: &Graphic) -> bool {
        self.same_geometry(other)
            && self.kind.same_non_trivial(&other.kind)
            && same_field(self.data_field(), other.data_field())
            && same_field(self.texture_coordinate_field(), other.texture_coordinate_field())
            && same_field(
                self.native_discretization_field(),
                other.native_discretization_field(),
            )
            && self.discretization == other.discretization
            && self.circle_discretization == other.circle_discretization
            && self.tessellation == other.tessellation
            && self.render_type == other.render_type
            && self.line_width == other.line_width
            && self.select_mode == other.select_mode
    }

    /// Returns true if every setting matches, appearance included.
    #[must_use]
    pub fn matches(&self, other: &Graphic) -> bool {
        self.same_non_trivial(other)
            && self.name == other.name
            && same_named(self.material(), other.material(), |m| m.name.as_str())
            && same_named(self.selected_material(), other.selected_material(), |m| m.name.as_str())
            && same_named(self.secondary_material(), other.secondary_material(), |m| m.name.as_str())
            && same_named(self.spectrum(), other.spectrum(), |s| s.name.as_str())
            && self.visibility_flag == other.visibility_flag
            && self.overlay_order == other.overlay_order
    }

    /// Returns true if `name` is the graphic's name or, when unnamed, its position.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        match &self.name {
            Some(own) => own == name,
            None => name.parse::<u32>().is_ok_and(|p| p == self.position),
        }
    }

    /// Returns true if both graphics have the same display name.
    #[must_use]
    pub fn same_name(&self, other: &Graphic) -> bool {
        self.display_name() == other.display_name()
    }

    /// Returns true if the names or the geometry match.
    #[must_use]
    pub fn same_name_or_geometry(&self, other: &Graphic) -> bool {
        self.same_name(other) || self.same_geometry(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fegraphics_core::{Field, FieldDescription, FieldId};
    use fegraphics_render::{Material, SelectMode};

    use crate::types::GraphicType;

    fn coordinates() -> Field {
        Field::new(FieldDescription::new(FieldId(1), "coordinates", 3))
    }

    #[test]
    fn test_cosmetic_settings_are_trivial() {
        let field = coordinates();
        let mut a = Graphic::create(GraphicType::Surfaces);
        a.set_coordinate_field(Some(field.clone())).unwrap();
        let mut b = a.duplicate();
        b.set_material(Some(Arc::new(Material::bronze())));
        b.set_visibility_flag(false);
        assert!(a.same_non_trivial(&b));
        assert!(!a.matches(&b));
        b.set_discretization([2, 2, 1]).unwrap();
        assert!(a.same_geometry(&b));
        assert!(!a.same_non_trivial(&b));
    }

    #[test]
    fn test_geometry_symmetry() {
        let field = coordinates();
        let mut a = Graphic::create(GraphicType::Lines);
        a.set_coordinate_field(Some(field.clone())).unwrap();
        let mut b = Graphic::create(GraphicType::Lines);
        assert_eq!(a.same_geometry(&b), b.same_geometry(&a));
        b.set_coordinate_field(Some(field)).unwrap();
        assert!(a.same_geometry(&b) && b.same_geometry(&a));
        let c = Graphic::create(GraphicType::Cylinders);
        assert!(!a.same_geometry(&c) && !c.same_geometry(&a));
    }

    #[test]
    fn test_select_mode_is_non_trivial() {
        let a = Graphic::create(GraphicType::Surfaces);
        let mut b = a.duplicate();
        b.set_select_mode(SelectMode::DrawSelected);
        assert!(a.same_geometry(&b));
        assert!(!a.same_non_trivial(&b));
    }

    #[test]
    fn test_has_name() {
        let mut graphic = Graphic::create(GraphicType::Lines);
        graphic.position = 4;
        assert!(graphic.has_name("4"));
        graphic.set_name(Some("edges"));
        assert!(graphic.has_name("edges"));
        assert!(!graphic.has_name("4"));
        let mut other = Graphic::create(GraphicType::Surfaces);
        other.set_name(Some("edges"));
        assert!(graphic.same_name(&other));
        assert!(graphic.same_name_or_geometry(&other));
    }
}

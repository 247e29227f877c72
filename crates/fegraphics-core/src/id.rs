//! Identifiers for finite element objects and evaluation locations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a finite element: its dimension and number.
///
/// Numbers are unique within one dimension. The number doubles as the name of
/// primitives generated for the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId {
    /// Element dimension, 1 to 3.
    pub dimension: u8,
    /// Element number.
    pub number: i32,
}

impl ElementId {
    /// Creates a new element identifier.
    pub const fn new(dimension: u8, number: i32) -> Self {
        Self { dimension, number }
    }

    /// Creates a 1-D element identifier.
    pub const fn line(number: i32) -> Self {
        Self::new(1, number)
    }

    /// Creates a 2-D element identifier.
    pub const fn face(number: i32) -> Self {
        Self::new(2, number)
    }

    /// Creates a 3-D element identifier.
    pub const fn element(number: i32) -> Self {
        Self::new(3, number)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dimension {
            1 => write!(f, "line {}", self.number),
            2 => write!(f, "face {}", self.number),
            _ => write!(f, "element {}", self.number),
        }
    }
}

/// Identifier of a node or data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub i32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}", self.0)
    }
}

/// Which node set a graphic or query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NodeDomain {
    /// Regular nodes of the region.
    #[default]
    Nodes,
    /// Data points of the companion data region.
    Data,
}

/// A place at which fields are evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    /// A point in an element, given by element chart coordinates.
    Element {
        /// The element.
        element: ElementId,
        /// Chart coordinates; entries beyond the element dimension are ignored.
        xi: [f64; 3],
    },
    /// A node.
    Node(NodeId),
    /// No domain: only constant fields can be evaluated.
    Point,
}

impl Location {
    /// Creates an element location.
    pub const fn element(element: ElementId, xi: [f64; 3]) -> Self {
        Self::Element { element, xi }
    }

    /// Creates a location at the centre of an element.
    pub const fn element_centre(element: ElementId) -> Self {
        Self::Element {
            element,
            xi: [0.5, 0.5, 0.5],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ordering() {
        let mut ids = vec![ElementId::face(2), ElementId::line(7), ElementId::face(1)];
        ids.sort();
        assert_eq!(
            ids,
            vec![ElementId::line(7), ElementId::face(1), ElementId::face(2)]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ElementId::line(3).to_string(), "line 3");
        assert_eq!(ElementId::element(12).to_string(), "element 12");
        assert_eq!(NodeId(5).to_string(), "node 5");
    }
}

//! Selected elements, nodes and element points.

use std::collections::BTreeSet;

use crate::id::{ElementId, NodeId};
use crate::sampling::XiSamplingMode;

/// A sorted set of integers stored as disjoint inclusive ranges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiRange {
    ranges: Vec<(i32, i32)>,
}

impl MultiRange {
    /// Creates an empty range set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the inclusive range `start..=stop`.
    pub fn add_range(&mut self, start: i32, stop: i32) {
        let (start, stop) = if start <= stop { (start, stop) } else { (stop, start) };
        self.ranges.push((start, stop));
        self.ranges.sort_unstable();
        let mut merged: Vec<(i32, i32)> = Vec::with_capacity(self.ranges.len());
        for &(s, e) in &self.ranges {
            match merged.last_mut() {
                Some(last) if s <= last.1.saturating_add(1) => last.1 = last.1.max(e),
                _ => merged.push((s, e)),
            }
        }
        self.ranges = merged;
    }

    /// Adds a single value.
    pub fn add(&mut self, value: i32) {
        self.add_range(value, value);
    }

    /// Returns true if `value` is in the set.
    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        self.ranges.iter().any(|&(s, e)| s <= value && value <= e)
    }

    /// Merges another range set into this one.
    pub fn merge(&mut self, other: &MultiRange) {
        for &(s, e) in &other.ranges {
            self.add_range(s, e);
        }
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The disjoint ranges in ascending order.
    #[must_use]
    pub fn ranges(&self) -> &[(i32, i32)] {
        &self.ranges
    }
}

/// Identifies the sample points of one element under one sampling layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementPointRangesIdentifier {
    /// Element whose sample points are numbered.
    pub element: ElementId,
    /// Top-level ancestor of `element`.
    pub top_level_element: ElementId,
    /// Sampling layout.
    pub sampling_mode: XiSamplingMode,
    /// Discretization used for numbering.
    pub number_in_xi: [u32; 3],
    /// Chart coordinates for [`XiSamplingMode::ExactXi`].
    pub exact_xi: [f64; 3],
}

impl ElementPointRangesIdentifier {
    /// Returns true if both identify the same numbering.
    ///
    /// `exact_xi` only matters for exact-xi sampling and `number_in_xi` only up to
    /// the element dimension.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        let dimension = usize::from(self.element.dimension);
        self.element == other.element
            && self.top_level_element == other.top_level_element
            && self.sampling_mode == other.sampling_mode
            && self.number_in_xi[..dimension] == other.number_in_xi[..dimension]
            && (self.sampling_mode != XiSamplingMode::ExactXi || self.exact_xi == other.exact_xi)
    }
}

/// The current selection of a region.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    elements: BTreeSet<ElementId>,
    nodes: BTreeSet<NodeId>,
    data_points: BTreeSet<NodeId>,
    element_points: Vec<(ElementPointRangesIdentifier, MultiRange)>,
}

impl SelectionSet {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects an element.
    pub fn select_element(&mut self, element: ElementId) {
        self.elements.insert(element);
    }

    /// Deselects an element.
    pub fn deselect_element(&mut self, element: ElementId) {
        self.elements.remove(&element);
    }

    /// Selects a node.
    pub fn select_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// Selects a data point.
    pub fn select_data_point(&mut self, node: NodeId) {
        self.data_points.insert(node);
    }

    /// Adds point numbers to the selected element points of one identifier.
    pub fn select_element_points(&mut self, identifier: ElementPointRangesIdentifier, ranges: &MultiRange) {
        if let Some((_, existing)) = self
            .element_points
            .iter_mut()
            .find(|(id, _)| id.matches(&identifier))
        {
            existing.merge(ranges);
        } else {
            self.element_points.push((identifier, ranges.clone()));
        }
    }

    /// Returns true if the element is selected.
    #[must_use]
    pub fn is_element_selected(&self, element: ElementId) -> bool {
        self.elements.contains(&element)
    }

    /// Returns true if the node is selected.
    #[must_use]
    pub fn is_node_selected(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns true if the data point is selected.
    #[must_use]
    pub fn is_data_point_selected(&self, node: NodeId) -> bool {
        self.data_points.contains(&node)
    }

    /// Selected point numbers for one identifier.
    #[must_use]
    pub fn element_point_ranges(&self, identifier: &ElementPointRangesIdentifier) -> Option<&MultiRange> {
        self.element_points
            .iter()
            .find(|(id, _)| id.matches(identifier))
            .map(|(_, ranges)| ranges)
    }

    /// Selected elements in ascending order.
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().copied()
    }

    /// Clears the whole selection.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.nodes.clear();
        self.data_points.clear();
        self.element_points.clear();
    }

    /// Returns true if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
            && self.nodes.is_empty()
            && self.data_points.is_empty()
            && self.element_points.is_empty()
    }
}

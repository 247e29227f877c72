//! Configuration options for graphics conversion.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Global configuration options for graphics conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Heuristic choosing between partial and full rebuilds.
    pub rebuild_policy: RebuildPolicy,

    /// Element discretization given to newly created graphics.
    pub default_discretization: [u32; 3],

    /// Number of segments around cylinders and extruded streamlines.
    pub default_circle_discretization: u32,

    /// Prefix used when naming graphics objects.
    pub name_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            rebuild_policy: RebuildPolicy::default(),
            default_discretization: [1, 1, 1],
            default_circle_discretization: 6,
            name_prefix: String::new(),
        }
    }
}

impl Options {
    /// Parses options from a JSON string. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes options to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Thresholds for the partial rebuild heuristic.
///
/// A region change that only touches field values on a few nodes and elements
/// removes and regenerates just the affected primitives. Once the changed
/// fraction reaches either threshold the whole graphic is rebuilt instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildPolicy {
    /// Fraction of region nodes at or above which a full rebuild is chosen.
    pub max_changed_node_fraction: f64,
    /// Fraction of region elements at or above which a full rebuild is chosen.
    pub max_changed_element_fraction: f64,
}

impl Default for RebuildPolicy {
    fn default() -> Self {
        Self {
            max_changed_node_fraction: 0.5,
            max_changed_element_fraction: 0.25,
        }
    }
}

impl RebuildPolicy {
    /// Returns true if the given change counts are small enough for a partial rebuild.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn allows_partial(
        &self,
        changed_nodes: usize,
        total_nodes: usize,
        changed_elements: usize,
        total_elements: usize,
    ) -> bool {
        (changed_nodes as f64) < self.max_changed_node_fraction * total_nodes as f64
            && (changed_elements as f64) < self.max_changed_element_fraction * total_elements as f64
    }
}

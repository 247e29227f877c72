//! Volume textures referenced by voltex primitives.

/// A 3-D texture mapped onto element xi space.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeTexture {
    /// Texture name.
    pub name: String,
    /// Lower xi corner of the texture block.
    pub xi_min: [f64; 3],
    /// Upper xi corner of the texture block.
    pub xi_max: [f64; 3],
}

impl VolumeTexture {
    /// Creates a texture covering the unit xi cube.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xi_min: [0.0; 3],
            xi_max: [1.0; 3],
        }
    }

    /// Returns true if the texture extends beyond one element.
    ///
    /// Such textures produce voltex geometry that depends on neighbouring
    /// elements, so cached per-element blocks cannot be reused.
    #[must_use]
    pub fn spans_outside_unit_cell(&self) -> bool {
        self.xi_min.iter().any(|&v| v < 0.0) || self.xi_max.iter().any(|&v| v > 1.0)
    }
}

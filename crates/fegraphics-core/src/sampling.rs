//! Sample point layouts in element chart space.

use serde::{Deserialize, Serialize};

/// How sample points are placed in an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum XiSamplingMode {
    /// One point at the centre of each discretization cell.
    #[default]
    CellCentres,
    /// One point at each corner of the discretization grid.
    CellCorners,
    /// Points placed uniformly at random with a density field giving points per unit volume.
    CellDensity,
    /// As `CellDensity`, with per-cell counts drawn from a Poisson distribution.
    CellPoisson,
    /// A single point at fixed chart coordinates.
    ExactXi,
}

impl XiSamplingMode {
    /// Returns true for modes that need a density field.
    #[must_use]
    pub fn uses_density(self) -> bool {
        matches!(self, Self::CellDensity | Self::CellPoisson)
    }

    /// Command-style token for descriptions.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::CellCentres => "cell_centres",
            Self::CellCorners => "cell_corners",
            Self::CellDensity => "cell_density",
            Self::CellPoisson => "cell_poisson",
            Self::ExactXi => "exact_xi",
        }
    }
}

/// Number of discretization cells in an element of the given dimension.
#[must_use]
pub fn number_of_cells(dimension: u8, number_in_xi: [u32; 3]) -> usize {
    number_in_xi[..usize::from(dimension)]
        .iter()
        .map(|&n| n as usize)
        .product()
}

/// Sample points for the regular modes, in point-number order.
///
/// Point numbers run fastest in xi1. Density modes are field dependent and
/// return no points here.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn regular_xi_points(
    mode: XiSamplingMode,
    dimension: u8,
    number_in_xi: [u32; 3],
    exact_xi: [f64; 3],
) -> Vec<[f64; 3]> {
    let dimension = usize::from(dimension);
    match mode {
        XiSamplingMode::ExactXi => vec![exact_xi],
        XiSamplingMode::CellCentres | XiSamplingMode::CellCorners => {
            let corners = mode == XiSamplingMode::CellCorners;
            let mut counts = [1_u32; 3];
            for (axis, count) in counts.iter_mut().enumerate().take(dimension) {
                let cells = number_in_xi[axis].max(1);
                *count = if corners { cells + 1 } else { cells };
            }
            let mut points = Vec::with_capacity(counts.iter().map(|&c| c as usize).product());
            for k in 0..counts[2] {
                for j in 0..counts[1] {
                    for i in 0..counts[0] {
                        let mut xi = [0.0; 3];
                        for (axis, index) in [i, j, k].into_iter().enumerate().take(dimension) {
                            let cells = f64::from(number_in_xi[axis].max(1));
                            xi[axis] = if corners {
                                f64::from(index) / cells
                            } else {
                                (f64::from(index) + 0.5) / cells
                            };
                        }
                        points.push(xi);
                    }
                }
            }
            points
        }
        XiSamplingMode::CellDensity | XiSamplingMode::CellPoisson => Vec::new(),
    }
}

/// Point number of a grid corner at chart coordinates `xi` in a corner grid.
///
/// Returns `None` if `xi` does not lie on a grid corner.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn corner_point_number(dimension: u8, number_in_xi: [u32; 3], xi: [f64; 3]) -> Option<usize> {
    let mut number = 0_usize;
    let mut stride = 1_usize;
    for axis in 0..usize::from(dimension) {
        let cells = f64::from(number_in_xi[axis].max(1));
        let scaled = xi[axis] * cells;
        let index = scaled.round();
        if (scaled - index).abs() > 1e-6 || index < 0.0 || index > cells {
            return None;
        }
        number += index as usize * stride;
        stride *= number_in_xi[axis].max(1) as usize + 1;
    }
    Some(number)
}

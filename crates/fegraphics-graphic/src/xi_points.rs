//! Sample point placement for element points and streamline seeds.
//!
//! Regular layouts come straight from the discretization grid. The density
//! layouts place a field-dependent number of random points in each cell;
//! the generator is seeded from the element so a rebuild reproduces the same
//! points.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fegraphics_core::sampling::regular_xi_points;
use fegraphics_core::{ElementId, Field, FieldModule, Location, XiSamplingMode};

use crate::generator::{jacobian, jacobian_measure};
use crate::kind::ElementSampling;

/// Above this mean a Poisson count is taken as the rounded mean.
const POISSON_LIMIT: f64 = 500.0;

/// Chart coordinates of the sample points in `element`.
#[must_use]
pub fn element_xi_points(
    module: &dyn FieldModule,
    element: ElementId,
    coordinate: &Field,
    sampling: &ElementSampling,
    number_in_xi: [u32; 3],
    time: f64,
) -> Vec<[f64; 3]> {
    let dimension = element.dimension.clamp(1, 3);
    if !sampling.mode.uses_density() {
        return regular_xi_points(sampling.mode, dimension, number_in_xi, sampling.exact_xi);
    }
    let Some(density_field) = &sampling.density_field else {
        return Vec::new();
    };

    let dim = usize::from(dimension);
    let mut cells = [1_u32; 3];
    for axis in 0..dim {
        cells[axis] = number_in_xi[axis].max(1);
    }
    let cell_size: Vec<f64> = cells.iter().map(|&n| 1.0 / f64::from(n)).collect();
    let cell_volume: f64 = cell_size[..dim].iter().product();
    let seed = (u64::from(element.number.unsigned_abs()) << 2) | u64::from(dimension);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut points = Vec::new();
    for k in 0..cells[2] {
        for j in 0..cells[1] {
            for i in 0..cells[0] {
                let mut origin = [0.0; 3];
                let mut centre = [0.0; 3];
                for (axis, index) in [i, j, k].into_iter().enumerate().take(dim) {
                    origin[axis] = f64::from(index) * cell_size[axis];
                    centre[axis] = origin[axis] + 0.5 * cell_size[axis];
                }
                let location = Location::element(element, centre);
                let density = module
                    .evaluate(density_field, &location, time)
                    .and_then(|v| v.first().copied())
                    .unwrap_or(0.0);
                if density <= 0.0 {
                    continue;
                }
                let Some(frame) = jacobian(module, coordinate, element, centre, time) else {
                    continue;
                };
                let expected = density * jacobian_measure(&frame, dimension) * cell_volume;
                let count = match sampling.mode {
                    XiSamplingMode::CellPoisson => poisson_count(&mut rng, expected),
                    _ => rounded_count(&mut rng, expected),
                };
                for _ in 0..count {
                    let mut xi = [0.0; 3];
                    for axis in 0..dim {
                        xi[axis] = origin[axis] + rng.gen::<f64>() * cell_size[axis];
                    }
                    points.push(xi);
                }
            }
        }
    }
    log::trace!("{} density points in {element}", points.len());
    points
}

/// Rounds `expected` up with probability equal to its fractional part.
fn rounded_count(rng: &mut StdRng, expected: f64) -> u64 {
    let whole = expected.floor();
    let extra = u64::from(rng.gen::<f64>() < expected - whole);
    whole as u64 + extra
}

/// Draws from a Poisson distribution with the given mean.
fn poisson_count(rng: &mut StdRng, mean: f64) -> u64 {
    if mean > POISSON_LIMIT {
        return mean.round() as u64;
    }
    let limit = (-mean).exp();
    let mut count = 0;
    let mut product = rng.gen::<f64>();
    while product > limit {
        count += 1;
        product *= rng.gen::<f64>();
    }
    count
}

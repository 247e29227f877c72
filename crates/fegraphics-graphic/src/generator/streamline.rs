//! Streamline tracing through element chart space.
//!
//! A trace advances in fixed world-space steps along the unit stream vector,
//! converting each step to xi through the inverse Jacobian. When a step leaves
//! the element it is clipped at the boundary and continues in the neighbour
//! across that face. Tracing stops at the requested length, on a vanishing
//! vector, at the mesh boundary or after a fixed number of steps.

use glam::{DMat3, DVec2, DVec3};

use fegraphics_core::{region::neighbour, ElementId, FeRegion, FieldModule, Location};
use fegraphics_render::{DataValues, Polyline, Primitive, RenderType, Surface, Vertex};

use super::{evaluate_position, jacobian, to_dvec3, StreamlineFields};
use crate::kind::StreamlineParameters;
use crate::types::{StreamlineDataType, StreamlineType};

/// Steps per streamline length.
const STEPS_PER_LENGTH: f64 = 100.0;
/// Hard limit on integration steps, including boundary crossings.
const MAX_STEPS: usize = 1000;
const MIN_SPEED: f64 = 1.0e-12;

/// One point along a trace.
#[derive(Debug, Clone, Copy)]
struct TracePoint {
    position: DVec3,
    direction: DVec3,
    data: f64,
}

/// Position in the mesh during tracing.
#[derive(Debug, Clone, Copy)]
struct ChartPosition {
    element: ElementId,
    xi: [f64; 3],
}

/// Converts a world-space displacement into an xi increment.
fn xi_increment(jacobian: &DMat3, dimension: usize, displacement: DVec3) -> Option<[f64; 3]> {
    match dimension {
        1 => {
            let axis = jacobian.x_axis;
            let length_squared = axis.length_squared();
            if length_squared < MIN_SPEED {
                return None;
            }
            Some([displacement.dot(axis) / length_squared, 0.0, 0.0])
        }
        _ => {
            if jacobian.determinant().abs() < MIN_SPEED {
                return None;
            }
            let dxi = jacobian.inverse() * displacement;
            let mut increment = dxi.to_array();
            if dimension == 2 {
                increment[2] = 0.0;
            }
            Some(increment)
        }
    }
}

/// Fraction of `increment` that keeps `xi` inside the unit element, with the face hit.
fn clip_to_element(xi: [f64; 3], increment: [f64; 3], dimension: usize) -> (f64, Option<usize>) {
    let mut fraction = 1.0;
    let mut face = None;
    for axis in 0..dimension {
        let target = xi[axis] + increment[axis];
        let (limit, side) = if target < 0.0 {
            (0.0, 0)
        } else if target > 1.0 {
            (1.0, 1)
        } else {
            continue;
        };
        let t = (limit - xi[axis]) / increment[axis];
        if t < fraction {
            fraction = t.max(0.0);
            face = Some(2 * axis + side);
        }
    }
    (fraction, face)
}

fn sample(
    module: &dyn FieldModule,
    fields: &StreamlineFields<'_>,
    parameters: &StreamlineParameters,
    at: ChartPosition,
    travelled: f64,
    time: f64,
) -> Option<(TracePoint, DVec3)> {
    let location = Location::element(at.element, at.xi);
    let position = evaluate_position(module, fields.coordinate, &location, time)?;
    let vector = to_dvec3(&module.evaluate(fields.vector, &location, time)?);
    let data = match parameters.data_type {
        StreamlineDataType::NoData => 0.0,
        StreamlineDataType::FieldScalar => fields
            .data
            .and_then(|f| module.evaluate(f, &location, time))
            .and_then(|v| v.first().copied())
            .unwrap_or(0.0),
        StreamlineDataType::MagnitudeScalar => vector.length(),
        StreamlineDataType::TravelScalar => travelled,
    };
    let sign = if parameters.reverse { -1.0 } else { 1.0 };
    let direction = vector.normalize_or_zero() * sign;
    Some((
        TracePoint {
            position,
            direction,
            data,
        },
        vector,
    ))
}

fn trace(
    region: &dyn FeRegion,
    module: &dyn FieldModule,
    start: ChartPosition,
    fields: &StreamlineFields<'_>,
    parameters: &StreamlineParameters,
    time: f64,
) -> Vec<TracePoint> {
    let step = parameters.length / STEPS_PER_LENGTH;
    let mut at = start;
    let mut travelled = 0.0;
    let mut points = Vec::new();
    for _ in 0..MAX_STEPS {
        let Some((point, vector)) = sample(module, fields, parameters, at, travelled, time) else {
            break;
        };
        points.push(point);
        if vector.length() < MIN_SPEED || travelled >= parameters.length - step * 1.0e-6 {
            break;
        }
        let dimension = usize::from(at.element.dimension.clamp(1, 3));
        let Some(frame) = jacobian(module, fields.coordinate, at.element, at.xi, time) else {
            break;
        };
        let length = step.min(parameters.length - travelled);
        let Some(increment) = xi_increment(&frame, dimension, point.direction * length) else {
            break;
        };
        let (fraction, face) = clip_to_element(at.xi, increment, dimension);
        for (axis, value) in at.xi.iter_mut().enumerate().take(dimension) {
            *value = (*value + fraction * increment[axis]).clamp(0.0, 1.0);
        }
        travelled += fraction * length;
        if let Some(face) = face {
            let Some((next, next_face)) = neighbour(region, at.element, face) else {
                if fraction > 0.0 {
                    if let Some((last, _)) = sample(module, fields, parameters, at, travelled, time) {
                        points.push(last);
                    }
                }
                break;
            };
            // Tangential xi carries over; neighbours share chart orientation.
            let mut xi = at.xi;
            xi[next_face / 2] = if next_face % 2 == 0 { 0.0 } else { 1.0 };
            at = ChartPosition { element: next, xi };
        }
    }
    points
}

/// Unit vectors perpendicular to each direction, turning as little as possible.
fn transported_frames(points: &[TracePoint]) -> Vec<(DVec3, DVec3)> {
    let mut frames = Vec::with_capacity(points.len());
    let mut side = points
        .first()
        .map_or(DVec3::X, |p| p.direction.normalize_or(DVec3::X).any_orthogonal_vector());
    for point in points {
        let direction = point.direction.normalize_or(DVec3::X);
        let projected = side - direction * side.dot(direction);
        side = projected.normalize_or(direction.any_orthonormal_vector());
        frames.push((side, direction.cross(side)));
    }
    frames
}

fn profile(streamline_type: StreamlineType, width: f64, circle_divisions: u32) -> Vec<DVec2> {
    let half = width / 2.0;
    match streamline_type {
        StreamlineType::Line => Vec::new(),
        StreamlineType::Ribbon => vec![DVec2::new(-half, 0.0), DVec2::new(half, 0.0)],
        StreamlineType::ExtrudedRectangle => vec![
            DVec2::new(-half, -half / 2.0),
            DVec2::new(half, -half / 2.0),
            DVec2::new(half, half / 2.0),
            DVec2::new(-half, half / 2.0),
        ],
        StreamlineType::ExtrudedEllipse | StreamlineType::ExtrudedCircle => {
            let minor = if streamline_type == StreamlineType::ExtrudedEllipse {
                half / 2.0
            } else {
                half
            };
            let n = circle_divisions.max(3);
            (0..n)
                .map(|k| {
                    let angle = std::f64::consts::TAU * f64::from(k) / f64::from(n);
                    DVec2::new(half * angle.cos(), minor * angle.sin())
                })
                .collect()
        }
    }
}

fn extrude(
    name: i32,
    points: &[TracePoint],
    data: Option<&[f64]>,
    streamline_type: StreamlineType,
    width: f64,
    circle_divisions: u32,
) -> Surface {
    let profile = profile(streamline_type, width, circle_divisions);
    let around = profile.len() as u32;
    let closed = streamline_type != StreamlineType::Ribbon;
    let frames = transported_frames(points);
    let mut vertices = Vec::with_capacity(points.len() * profile.len());
    let mut values = data.map(|_| DataValues::new(1));
    for (index, (point, (side, up))) in points.iter().zip(&frames).enumerate() {
        for offset in &profile {
            let position = point.position + *side * offset.x + *up * offset.y;
            vertices.push(Vertex::at(position.as_vec3()));
            if let (Some(values), Some(data)) = (values.as_mut(), data) {
                values.push(&[data[index]]);
            }
        }
    }
    let segments = around - u32::from(!closed);
    let mut triangles = Vec::new();
    for ring in 0..points.len().saturating_sub(1) as u32 {
        for k in 0..segments {
            let a = ring * around + k;
            let b = ring * around + (k + 1) % around;
            let c = a + around;
            let d = b + around;
            triangles.push([a, b, d]);
            triangles.push([a, d, c]);
        }
    }
    let mut surface = Surface {
        name: Some(name),
        vertices,
        triangles,
        data: values,
        render_type: RenderType::Shaded,
    };
    surface.compute_normals();
    surface
}

/// Traces a streamline from a seed point and builds its primitive.
///
/// Returns `None` if the trace has fewer than two points.
#[allow(clippy::too_many_arguments)]
pub fn trace_streamline(
    region: &dyn FeRegion,
    module: &dyn FieldModule,
    element: ElementId,
    xi: [f64; 3],
    fields: &StreamlineFields<'_>,
    parameters: &StreamlineParameters,
    circle_divisions: u32,
    time: f64,
) -> Option<Primitive> {
    let points = trace(
        region,
        module,
        ChartPosition { element, xi },
        fields,
        parameters,
        time,
    );
    if points.len() < 2 {
        return None;
    }
    let data: Option<Vec<f64>> = (parameters.data_type != StreamlineDataType::NoData)
        .then(|| points.iter().map(|p| p.data).collect());
    if parameters.streamline_type == StreamlineType::Line {
        let data = data.map(|values| {
            let mut out = DataValues::new(1);
            for value in values {
                out.push(&[value]);
            }
            out
        });
        return Some(Primitive::Polyline(Polyline {
            name: Some(element.number),
            vertices: points.iter().map(|p| Vertex::at(p.position.as_vec3())).collect(),
            data,
            line_width: 0,
        }));
    }
    Some(Primitive::Surface(extrude(
        element.number,
        &points,
        data.as_deref(),
        parameters.streamline_type,
        parameters.width,
        circle_divisions,
    )))
}

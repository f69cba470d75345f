//! Piecewise curve evaluation.

use std::f32::consts::PI;

use crate::defines::Position2D;
use crate::tables::CurveEntry;

use super::Db2Manager;

/// Interpolation applied between curve points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveInterpolationMode {
    Linear,
    Cosine,
    CatmullRom,
    /// Quadratic Bezier over exactly 3 points
    Bezier3,
    /// Cubic Bezier over exactly 4 points
    Bezier4,
    /// Bezier of arbitrary degree
    Bezier,
    Constant,
}

/// Derives the interpolation mode from the curve type and its point count.
///
/// A single point always evaluates as [`CurveInterpolationMode::Constant`].
pub fn determine_interpolation_mode(curve: &CurveEntry, points: &[Position2D]) -> CurveInterpolationMode {
    if points.len() == 1 {
        return CurveInterpolationMode::Constant;
    }
    match curve.kind {
        1 => {
            if points.len() < 4 {
                CurveInterpolationMode::Cosine
            } else {
                CurveInterpolationMode::CatmullRom
            }
        }
        2 => match points.len() {
            2 => CurveInterpolationMode::Linear,
            3 => CurveInterpolationMode::Bezier3,
            4 => CurveInterpolationMode::Bezier4,
            _ => CurveInterpolationMode::Bezier,
        },
        3 => CurveInterpolationMode::Cosine,
        _ => CurveInterpolationMode::Linear,
    }
}

/// Index of the first point whose x is greater than `x`, scanning from `from`.
fn upper_index(points: &[Position2D], from: usize, x: f32) -> usize {
    points[from..]
        .iter()
        .position(|point| point.x > x)
        .map_or(points.len(), |offset| from + offset)
}

/// Evaluates `points` at `x`. Empty input evaluates to 0.
pub fn evaluate(mode: CurveInterpolationMode, points: &[Position2D], x: f32) -> f32 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let Some(last) = points.last() else {
        return 0.0;
    };

    match mode {
        CurveInterpolationMode::Linear | CurveInterpolationMode::Cosine => {
            let index = upper_index(points, 0, x);
            if index == 0 {
                return first.y;
            }
            if index >= points.len() {
                return last.y;
            }
            let (lo, hi) = (points[index - 1], points[index]);
            let x_diff = hi.x - lo.x;
            if x_diff == 0.0 {
                return hi.y;
            }
            let mu = (x - lo.x) / x_diff;
            if mode == CurveInterpolationMode::Linear {
                mu * (hi.y - lo.y) + lo.y
            } else {
                (hi.y - lo.y) * (1.0 - (mu * PI).cos()) * 0.5 + lo.y
            }
        }
        CurveInterpolationMode::CatmullRom => {
            if points.len() < 4 {
                return evaluate(CurveInterpolationMode::Cosine, points, x);
            }
            let index = upper_index(points, 1, x);
            if index == 1 {
                return points[1].y;
            }
            if index >= points.len() - 1 {
                return points[points.len() - 2].y;
            }
            let x_diff = points[index].x - points[index - 1].x;
            if x_diff == 0.0 {
                return points[index].y;
            }
            let mu = (x - points[index - 1].x) / x_diff;
            let (p0, p1, p2, p3) = (
                points[index - 2].y,
                points[index - 1].y,
                points[index].y,
                points[index + 1].y,
            );
            let a0 = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
            let a1 = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
            let a2 = -0.5 * p0 + 0.5 * p2;
            let a3 = p1;
            a0 * mu * mu * mu + a1 * mu * mu + a2 * mu + a3
        }
        CurveInterpolationMode::Bezier3 => {
            if points.len() < 3 {
                return evaluate(CurveInterpolationMode::Linear, points, x);
            }
            let x_diff = points[2].x - points[0].x;
            if x_diff == 0.0 {
                return points[1].y;
            }
            let mu = ((x - points[0].x) / x_diff).clamp(0.0, 1.0);
            (1.0 - mu) * (1.0 - mu) * points[0].y
                + (1.0 - mu) * 2.0 * mu * points[1].y
                + mu * mu * points[2].y
        }
        CurveInterpolationMode::Bezier4 => {
            if points.len() < 4 {
                return evaluate(CurveInterpolationMode::Linear, points, x);
            }
            let x_diff = points[3].x - points[0].x;
            if x_diff == 0.0 {
                return points[1].y;
            }
            let mu = ((x - points[0].x) / x_diff).clamp(0.0, 1.0);
            let inv = 1.0 - mu;
            inv * inv * inv * points[0].y
                + 3.0 * mu * inv * inv * points[1].y
                + 3.0 * mu * mu * inv * points[2].y
                + mu * mu * mu * points[3].y
        }
        CurveInterpolationMode::Bezier => {
            let x_diff = last.x - first.x;
            if x_diff == 0.0 {
                return last.y;
            }
            let mu = (x - first.x) / x_diff;
            // De Casteljau
            let mut values: Vec<f32> = points.iter().map(|point| point.y).collect();
            for degree in (1..values.len()).rev() {
                for k in 0..degree {
                    values[k] += mu * (values[k + 1] - values[k]);
                }
            }
            values[0]
        }
        CurveInterpolationMode::Constant => first.y,
    }
}

impl Db2Manager {
    /// Points of a curve sorted by order index.
    pub fn curve_points(&self, curve_id: u32) -> &[Position2D] {
        self.index
            .curve_points
            .get(&curve_id)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Interpolation mode of a curve, `None` for unknown curves or curves without points.
    pub fn curve_interpolation_mode(&self, curve_id: u32) -> Option<CurveInterpolationMode> {
        let curve = self.tables.table::<CurveEntry>().lookup(curve_id)?;
        let points = self.curve_points(curve_id);
        if points.is_empty() {
            return None;
        }
        Some(determine_interpolation_mode(curve, points))
    }

    /// Evaluates a curve at `x`; unknown curves and curves without points yield 0.
    pub fn evaluate_curve(&self, curve_id: u32, x: f32) -> f32 {
        match self.curve_interpolation_mode(curve_id) {
            Some(mode) => evaluate(mode, self.curve_points(curve_id), x),
            None => 0.0,
        }
    }
}

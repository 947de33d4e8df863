//! Contour math shared by the boolean engine and its backend: shoelace
//! winding test, bounding boxes, fixed-point conversion and cleanup.

use crate::error::{Error, Result};

pub type Point = (f64, f64);
pub type Contour = Vec<Point>;

pub type IntPoint = (i64, i64);
pub type IntContour = Vec<IntPoint>;

/// Scale applied before handing coordinates to the clipping backend.
pub const DEFAULT_SCALE: f64 = 10_000.0;

/// Largest fixed-point magnitude; integers up to 2^53 survive the trip
/// through the backend's `f64` coordinates unchanged.
pub const MAX_FIXED: i64 = 1 << 53;

// ─── Winding ─────────────────────────────────────────────────────────────────

/// Σ (x₂ − x₁)(y₂ + y₁) over the closed contour.
/// Negative ⇒ counter-clockwise, positive ⇒ clockwise (y axis up).
pub fn shoelace(contour: &[Point]) -> f64 {
    let n = contour.len();
    if n < 3 { return 0.0; }
    (0..n).map(|i| {
        let (x1, y1) = contour[i];
        let (x2, y2) = contour[(i + 1) % n];
        (x2 - x1) * (y2 + y1)
    }).sum()
}

/// Same test in integer space; exact for fixed-point coordinates.
pub fn shoelace_int(contour: &[IntPoint]) -> i128 {
    let n = contour.len();
    if n < 3 { return 0; }
    (0..n).map(|i| {
        let (x1, y1) = contour[i];
        let (x2, y2) = contour[(i + 1) % n];
        (x2 as i128 - x1 as i128) * (y2 as i128 + y1 as i128)
    }).sum()
}

pub fn is_clockwise(contour: &[Point]) -> bool {
    shoelace(contour) > 0.0
}

pub fn is_counter_clockwise(contour: &[Point]) -> bool {
    shoelace(contour) < 0.0
}

/// Unsigned enclosed area.
pub fn area(contour: &[Point]) -> f64 {
    shoelace(contour).abs() / 2.0
}

// ─── Bounding box ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let &(x, y) = iter.next()?;
        let mut bb = Self { min: (x, y), max: (x, y) };
        for &(x, y) in iter {
            bb.min = (bb.min.0.min(x), bb.min.1.min(y));
            bb.max = (bb.max.0.max(x), bb.max.1.max(y));
        }
        Some(bb)
    }

    /// `other` lies inside `self` without touching any edge.
    pub fn strictly_contains(&self, other: &BoundingBox) -> bool {
        other.min.0 > self.min.0 && other.min.1 > self.min.1
            && other.max.0 < self.max.0 && other.max.1 < self.max.1
    }
}

// ─── Fixed point ─────────────────────────────────────────────────────────────

/// Scale and round onto the integer grid. Non-finite coordinates and ones
/// beyond [`MAX_FIXED`] after scaling are a geometry error.
pub fn to_fixed(contour: &[Point], scale: f64) -> Result<IntContour> {
    contour.iter()
        .map(|&(x, y)| Ok((fixed(x, scale)?, fixed(y, scale)?)))
        .collect()
}

fn fixed(v: f64, scale: f64) -> Result<i64> {
    let scaled = (v * scale).round();
    if !scaled.is_finite() || scaled.abs() > MAX_FIXED as f64 {
        return Err(Error::geometry(format!("Coordinate {v} is out of range for boolean operations")));
    }
    Ok(scaled as i64)
}

pub fn from_fixed(contour: &[IntPoint], scale: f64) -> Contour {
    contour.iter()
        .map(|&(x, y)| (x as f64 / scale, y as f64 / scale))
        .collect()
}

// ─── Cleanup ─────────────────────────────────────────────────────────────────

/// Split a flat point list on `None` separators, keeping contours with at
/// least three points.
pub fn split_contours(points: &[Option<Point>]) -> Vec<Contour> {
    points
        .split(|p| p.is_none())
        .map(|run| run.iter().flatten().copied().collect::<Contour>())
        .filter(|c| c.len() >= 3)
        .collect()
}

/// Remove repeated vertices, a duplicated closing vertex and collinear
/// vertices. Returns `None` when fewer than three vertices or no area remain.
pub fn simplify_int_contour(contour: &[IntPoint]) -> Option<IntContour> {
    let mut pts: IntContour = Vec::with_capacity(contour.len());
    for &p in contour {
        if pts.last() != Some(&p) { pts.push(p); }
    }
    while pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }

    // Drop collinear vertices until stable; a removal can expose another.
    let mut changed = true;
    while changed && pts.len() >= 3 {
        changed = false;
        let n = pts.len();
        for i in 0..n {
            let prev = pts[(i + n - 1) % n];
            let cur = pts[i];
            let next = pts[(i + 1) % n];
            if cross(prev, cur, next) == 0 {
                pts.remove(i);
                changed = true;
                break;
            }
        }
    }

    if pts.len() < 3 || shoelace_int(&pts) == 0 { None } else { Some(pts) }
}

fn cross(a: IntPoint, b: IntPoint, c: IntPoint) -> i128 {
    let (ax, ay) = (a.0 as i128, a.1 as i128);
    let (bx, by) = (b.0 as i128, b.1 as i128);
    let (cx, cy) = (c.0 as i128, c.1 as i128);
    (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
}

/// Orient a contour: counter-clockwise for outer boundaries, clockwise for
/// holes. Returns whether it had to be reversed.
pub fn orient(contour: &mut Contour, counter_clockwise: bool) -> bool {
    let wrong = if counter_clockwise { is_clockwise(contour) } else { is_counter_clockwise(contour) };
    if wrong { contour.reverse(); }
    wrong
}

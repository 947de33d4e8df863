//! Polygon clipping backend seam. The engine only talks to [`ClipBackend`];
//! [`GeoBackend`] implements it on top of the `geo` crate's boolean ops.

use geo::{BooleanOps, LineString, MultiPolygon, Polygon};

use crate::csg::BooleanOp;
use crate::csg::contour::{IntContour, shoelace_int, simplify_int_contour};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

/// One polygon of a clipping result: an outer boundary and its holes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntPolygon {
    pub outer: IntContour,
    pub holes: Vec<IntContour>,
}

impl IntPolygon {
    /// Outer first, holes after.
    pub fn contours(&self) -> impl Iterator<Item = &IntContour> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    pub fn area2(&self) -> i128 {
        shoelace_int(&self.outer).abs()
    }
}

pub trait ClipBackend {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool { true }

    /// Run `op` on the regions described by the subject and clip paths,
    /// each resolved under `fill`.
    fn execute(
        &self,
        op: BooleanOp,
        subject: &[IntContour],
        clip: &[IntContour],
        fill: FillRule,
    ) -> Result<Vec<IntPolygon>>;

    /// Remove degenerate edges and vertices from a result.
    fn simplify(&self, polygons: Vec<IntPolygon>) -> Vec<IntPolygon>;
}

// ─── geo ─────────────────────────────────────────────────────────────────────

/// Clipping on `geo`'s boolean ops. Fixed-point inputs are exact in `f64`,
/// results are rounded back to the integer grid.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoBackend;

impl ClipBackend for GeoBackend {
    fn name(&self) -> &'static str { "geo" }

    fn execute(
        &self,
        op: BooleanOp,
        subject: &[IntContour],
        clip: &[IntContour],
        fill: FillRule,
    ) -> Result<Vec<IntPolygon>> {
        let subject = region(subject, fill);
        let clip = region(clip, fill);
        let out = match op {
            BooleanOp::Union        => subject.union(&clip),
            BooleanOp::Difference   => subject.difference(&clip),
            BooleanOp::Intersection => subject.intersection(&clip),
            BooleanOp::Xor          => subject.xor(&clip),
        };
        Ok(from_multi_polygon(&out))
    }

    fn simplify(&self, polygons: Vec<IntPolygon>) -> Vec<IntPolygon> {
        polygons.into_iter().filter_map(|p| {
            let outer = simplify_int_contour(&p.outer)?;
            let holes = p.holes.iter().filter_map(|h| simplify_int_contour(h)).collect();
            Some(IntPolygon { outer, holes })
        }).collect()
    }
}

/// Resolve a set of paths into the area they cover under `fill`.
///
/// Even-odd is the xor of every ring. Non-zero tracks the winding number of
/// every face the rings cut the plane into and keeps the faces where it is
/// not zero.
fn region(contours: &[IntContour], fill: FillRule) -> MultiPolygon<f64> {
    let rings: Vec<&IntContour> = contours.iter()
        .filter(|c| c.len() >= 3 && shoelace_int(c) != 0)
        .collect();
    match fill {
        FillRule::EvenOdd => rings.iter()
            .fold(MultiPolygon::new(Vec::new()), |acc, ring| acc.xor(&single(ring))),
        FillRule::NonZero => non_zero(&rings),
    }
}

/// Faces of equal winding number, merged. Counter-clockwise rings add one,
/// clockwise rings subtract one.
fn non_zero(rings: &[&IntContour]) -> MultiPolygon<f64> {
    let mut levels: Vec<(i32, MultiPolygon<f64>)> = Vec::new();
    let mut covered = MultiPolygon::new(Vec::new());
    for ring in rings {
        let turn = if shoelace_int(ring) < 0 { 1 } else { -1 };
        let area = single(ring);
        let mut next = Vec::with_capacity(levels.len() + 1);
        for (winding, face) in &levels {
            add_level(&mut next, winding + turn, face.intersection(&area));
            add_level(&mut next, *winding, face.difference(&area));
        }
        add_level(&mut next, turn, area.difference(&covered));
        covered = covered.union(&area);
        levels = next;
    }
    levels.into_iter()
        .filter(|(winding, _)| *winding != 0)
        .fold(MultiPolygon::new(Vec::new()), |acc, (_, face)| acc.union(&face))
}

fn add_level(levels: &mut Vec<(i32, MultiPolygon<f64>)>, winding: i32, face: MultiPolygon<f64>) {
    if face.0.is_empty() {
        return;
    }
    match levels.iter_mut().find(|(w, _)| *w == winding) {
        Some((_, merged)) => *merged = merged.union(&face),
        None => levels.push((winding, face)),
    }
}

fn single(ring: &IntContour) -> MultiPolygon<f64> {
    let coords: Vec<(f64, f64)> = ring.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
    MultiPolygon::new(vec![Polygon::new(LineString::from(coords), Vec::new())])
}

fn from_multi_polygon(mp: &MultiPolygon<f64>) -> Vec<IntPolygon> {
    mp.0.iter().filter_map(|poly| {
        let outer = from_ring(poly.exterior());
        if outer.len() < 3 { return None; }
        let holes = poly.interiors().iter()
            .map(from_ring)
            .filter(|h| h.len() >= 3)
            .collect();
        Some(IntPolygon { outer, holes })
    }).collect()
}

fn from_ring(ring: &LineString<f64>) -> IntContour {
    let mut pts: IntContour = ring.coords()
        .map(|c| (c.x.round() as i64, c.y.round() as i64))
        .collect();
    // geo closes rings explicitly
    if pts.len() > 1 && pts.first() == pts.last() { pts.pop(); }
    pts
}

// ─── Unavailable ─────────────────────────────────────────────────────────────

/// Stand-in used when no clipping library is present; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl ClipBackend for NullBackend {
    fn name(&self) -> &'static str { "none" }

    fn is_available(&self) -> bool { false }

    fn execute(&self, _: BooleanOp, _: &[IntContour], _: &[IntContour], _: FillRule) -> Result<Vec<IntPolygon>> {
        Err(Error::BackendUnavailable)
    }

    fn simplify(&self, polygons: Vec<IntPolygon>) -> Vec<IntPolygon> {
        polygons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: i64, y: i64, size: i64) -> IntContour {
        vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size)]
    }

    fn total_area2(polys: &[IntPolygon]) -> i128 {
        polys.iter()
            .map(|p| p.area2() - p.holes.iter().map(|h| shoelace_int(h).abs()).sum::<i128>())
            .sum()
    }

    #[test]
    fn union_of_overlapping_squares() {
        let out = GeoBackend.execute(
            BooleanOp::Union, &[square(0, 0, 10)], &[square(5, 0, 10)], FillRule::NonZero,
        ).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(total_area2(&out), 2 * 150);
    }

    #[test]
    fn difference_leaves_a_hole() {
        let out = GeoBackend.execute(
            BooleanOp::Difference, &[square(0, 0, 10)], &[square(3, 3, 4)], FillRule::NonZero,
        ).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].holes.len(), 1);
        assert_eq!(total_area2(&out), 2 * (100 - 16));
    }

    #[test]
    fn non_zero_treats_opposite_winding_as_hole() {
        let mut hole = square(3, 3, 4);
        hole.reverse();
        let out = GeoBackend.execute(
            BooleanOp::Union, &[square(0, 0, 10), hole], &[], FillRule::NonZero,
        ).unwrap();
        assert_eq!(total_area2(&out), 2 * (100 - 16));
    }

    #[test]
    fn non_zero_fills_disjoint_rings_of_either_winding() {
        let mut cw = square(100, 0, 10);
        cw.reverse();
        let out = GeoBackend.execute(
            BooleanOp::Union, &[square(0, 0, 20), cw], &[], FillRule::NonZero,
        ).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(total_area2(&out), 2 * (400 + 100));
    }

    #[test]
    fn non_zero_fills_overlap_of_opposite_rings_once() {
        // the overlap winds to zero, the rest stays filled
        let mut cw = square(5, 0, 10);
        cw.reverse();
        let out = GeoBackend.execute(
            BooleanOp::Union, &[square(0, 0, 10), cw], &[], FillRule::NonZero,
        ).unwrap();
        assert_eq!(total_area2(&out), 2 * (50 + 50));
    }

    #[test]
    fn non_zero_keeps_doubly_wound_core() {
        let out = GeoBackend.execute(
            BooleanOp::Union, &[square(0, 0, 10), square(3, 3, 4)], &[], FillRule::NonZero,
        ).unwrap();
        assert_eq!(total_area2(&out), 2 * 100);
        assert!(out[0].holes.is_empty());
    }

    #[test]
    fn even_odd_alternates_nested_rings() {
        let out = GeoBackend.execute(
            BooleanOp::Union, &[square(0, 0, 10), square(3, 3, 4)], &[], FillRule::EvenOdd,
        ).unwrap();
        assert_eq!(total_area2(&out), 2 * (100 - 16));
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let out = GeoBackend.execute(
            BooleanOp::Intersection, &[square(0, 0, 1)], &[square(5, 5, 1)], FillRule::NonZero,
        ).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn simplify_drops_collapsed_polygons() {
        let polys = vec![
            IntPolygon { outer: vec![(0, 0), (5, 0), (10, 0)], holes: vec![] },
            IntPolygon { outer: square(0, 0, 2), holes: vec![vec![(1, 1), (1, 1), (1, 1)]] },
        ];
        let out = GeoBackend.simplify(polys);
        assert_eq!(out.len(), 1);
        assert!(out[0].holes.is_empty());
    }

    #[test]
    fn null_backend_is_unavailable() {
        assert!(!NullBackend.is_available());
        assert_eq!(
            NullBackend.execute(BooleanOp::Union, &[], &[], FillRule::NonZero),
            Err(Error::BackendUnavailable)
        );
    }
}

//! Outline sampling for shape records. Boolean operations only ever see
//! shapes through [`ShapeGeometry`], so a richer generator can be swapped in
//! without touching the engine.

use std::f64::consts::TAU;

use crate::csg::contour::{Contour, orient, split_contours};
use crate::error::{Error, Result};
use crate::runtime::value::Value;
use crate::types::shape::{Shape, ShapeKind, Transform};

pub trait ShapeGeometry {
    /// World-space outline contours of `shape`. The first contour is the
    /// outer boundary; holes, when the kind has any, follow.
    fn contours(&self, shape: &Shape) -> Result<Vec<Contour>>;
}

/// Straight-line sampling of the built-in kinds with the usual defaults.
#[derive(Debug, Clone, Copy)]
pub struct BasicGeometry {
    /// Segments used for a full circle; arcs and corners use a share of it.
    pub segments: usize,
}

impl Default for BasicGeometry {
    fn default() -> Self {
        Self { segments: 64 }
    }
}

impl ShapeGeometry for BasicGeometry {
    fn contours(&self, shape: &Shape) -> Result<Vec<Contour>> {
        let local = self.local_contours(shape)?;
        if local.is_empty() {
            return Err(Error::geometry(format!("Shape '{}' has no outline", shape.id)));
        }
        Ok(local.into_iter().map(|c| world(&shape.transform, c)).collect())
    }
}

impl BasicGeometry {
    fn local_contours(&self, shape: &Shape) -> Result<Vec<Contour>> {
        let p = |name: &str, default: f64| shape.number_or(name, default);
        let outline = match shape.kind {
            ShapeKind::Circle => {
                let r = p("radius", 50.0);
                vec![self.ellipse(r, r)]
            }
            ShapeKind::Ellipse => {
                let r = p("radius", 50.0);
                vec![self.ellipse(p("radiusX", r), p("radiusY", r))]
            }
            ShapeKind::Rectangle => vec![rectangle(p("width", 100.0), p("height", 100.0))],
            ShapeKind::RoundedRectangle => {
                vec![self.rounded_rectangle(p("width", 100.0), p("height", 100.0), p("radius", 10.0))]
            }
            ShapeKind::Triangle => {
                let (b, h) = (p("base", 100.0), p("height", 100.0));
                vec![vec![(-b / 2.0, -h / 2.0), (b / 2.0, -h / 2.0), (0.0, h / 2.0)]]
            }
            ShapeKind::Polygon => {
                let sides = p("sides", 6.0).round().max(3.0) as usize;
                vec![regular(sides, |_| p("radius", 50.0))]
            }
            ShapeKind::Star => {
                let points = p("points", 5.0).round().max(2.0) as usize;
                let (outer, inner) = (p("outerRadius", 50.0), p("innerRadius", 20.0));
                vec![regular(points * 2, |i| if i % 2 == 0 { outer } else { inner })]
            }
            ShapeKind::Donut => {
                let (outer, inner) = (p("outerRadius", 50.0), p("innerRadius", 25.0));
                let mut hole = self.ellipse(inner, inner);
                orient(&mut hole, false);
                vec![self.ellipse(outer, outer), hole]
            }
            ShapeKind::Cross => vec![cross(p("width", 100.0), p("thickness", 20.0))],
            ShapeKind::Arc => {
                vec![self.sector(p("radius", 50.0), p("startAngle", 0.0), p("endAngle", 90.0))]
            }
            ShapeKind::Path => return Ok(path_contours(shape)),
            ShapeKind::Text => {
                return Err(Error::geometry(format!("Text shape '{}' has no outline", shape.id)));
            }
        };

        let mut outline = outline;
        if let Some(outer) = outline.first_mut() {
            orient(outer, true);
        }
        Ok(outline)
    }

    fn ellipse(&self, rx: f64, ry: f64) -> Contour {
        let n = self.segments.max(8);
        (0..n).map(|i| {
            let t = TAU * i as f64 / n as f64;
            (rx * t.cos(), ry * t.sin())
        }).collect()
    }

    fn rounded_rectangle(&self, w: f64, h: f64, r: f64) -> Contour {
        let r = r.min(w / 2.0).min(h / 2.0);
        if r <= 0.0 {
            return rectangle(w, h);
        }
        let (hw, hh) = (w / 2.0 - r, h / 2.0 - r);
        let steps = (self.segments / 4).max(2);
        let corners = [(hw, -hh, -90.0), (hw, hh, 0.0), (-hw, hh, 90.0), (-hw, -hh, 180.0)];
        corners.iter().flat_map(|&(cx, cy, start)| {
            (0..=steps).map(move |i| {
                let a = (start + 90.0 * i as f64 / steps as f64).to_radians();
                (cx + r * a.cos(), cy + r * a.sin())
            })
        }).collect()
    }

    /// Pie slice from `start` to `end` degrees.
    fn sector(&self, r: f64, start: f64, end: f64) -> Contour {
        let sweep = end - start;
        let steps = ((sweep.abs() / 360.0 * self.segments as f64).ceil() as usize).max(2);
        let mut pts = vec![(0.0, 0.0)];
        pts.extend((0..=steps).map(|i| {
            let a = (start + sweep * i as f64 / steps as f64).to_radians();
            (r * a.cos(), r * a.sin())
        }));
        pts
    }
}

fn rectangle(w: f64, h: f64) -> Contour {
    let (x, y) = (w / 2.0, h / 2.0);
    vec![(-x, -y), (x, -y), (x, y), (-x, y)]
}

/// `n` vertices on a circle starting at the top, radius chosen per vertex.
fn regular(n: usize, radius: impl Fn(usize) -> f64) -> Contour {
    (0..n).map(|i| {
        let a = (90.0 + 360.0 * i as f64 / n as f64).to_radians();
        let r = radius(i);
        (r * a.cos(), r * a.sin())
    }).collect()
}

fn cross(w: f64, t: f64) -> Contour {
    let (a, b) = (w / 2.0, t / 2.0);
    vec![
        (b, -a), (b, -b), (a, -b), (a, b), (b, b), (b, a),
        (-b, a), (-b, b), (-a, b), (-a, -b), (-b, -b), (-b, -a),
    ]
}

/// Contours of a path shape: its stored path data, else a `points` param of
/// `[x, y]` pairs with `null` separators.
fn path_contours(shape: &Shape) -> Vec<Contour> {
    if let Some(path) = &shape.path {
        return path.contours.iter().filter(|c| c.len() >= 3).cloned().collect();
    }
    match shape.param("points") {
        Some(Value::Array(items)) => {
            let flat: Vec<Option<(f64, f64)>> = items.iter().map(|v| v.as_point().ok()).collect();
            split_contours(&flat)
        }
        _ => Vec::new(),
    }
}

fn world(transform: &Transform, contour: Contour) -> Contour {
    if transform.is_identity() {
        return contour;
    }
    contour.into_iter().map(|p| transform.apply(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::contour::{area, is_clockwise, is_counter_clockwise};
    use approx::assert_relative_eq;

    fn shape(kind: ShapeKind, params: &[(&str, f64)]) -> Shape {
        let mut s = Shape::new(kind, "s");
        for (k, v) in params {
            s.params.insert(k.to_string(), Value::Number(*v));
        }
        s
    }

    #[test]
    fn rectangle_is_centered_and_ccw() {
        let c = BasicGeometry::default()
            .contours(&shape(ShapeKind::Rectangle, &[("width", 100.0), ("height", 60.0)]))
            .unwrap();
        assert_eq!(c.len(), 1);
        assert!(is_counter_clockwise(&c[0]));
        assert_relative_eq!(area(&c[0]), 6000.0);
    }

    #[test]
    fn donut_has_clockwise_hole() {
        let c = BasicGeometry::default()
            .contours(&shape(ShapeKind::Donut, &[("outerRadius", 40.0), ("innerRadius", 20.0)]))
            .unwrap();
        assert_eq!(c.len(), 2);
        assert!(is_counter_clockwise(&c[0]));
        assert!(is_clockwise(&c[1]));
    }

    #[test]
    fn transform_moves_outline() {
        let mut s = shape(ShapeKind::Rectangle, &[("width", 2.0), ("height", 2.0)]);
        s.transform.position = (10.0, 5.0);
        let c = BasicGeometry::default().contours(&s).unwrap();
        assert_eq!(c[0][0], (9.0, 4.0));
    }

    #[test]
    fn reversed_arc_is_still_ccw() {
        let c = BasicGeometry::default()
            .contours(&shape(ShapeKind::Arc, &[("startAngle", 90.0), ("endAngle", 0.0)]))
            .unwrap();
        assert!(is_counter_clockwise(&c[0]));
    }

    #[test]
    fn text_has_no_outline() {
        let err = BasicGeometry::default().contours(&Shape::new(ShapeKind::Text, "t")).unwrap_err();
        assert!(matches!(err, Error::Geometry(_)));
    }

    #[test]
    fn path_points_param_splits_on_null() {
        let mut s = Shape::new(ShapeKind::Path, "p");
        s.params.insert("points".into(), Value::Array(vec![
            Value::point(0.0, 0.0), Value::point(4.0, 0.0), Value::point(4.0, 4.0),
            Value::Null,
            Value::point(9.0, 9.0),
        ]));
        let c = BasicGeometry::default().contours(&s).unwrap();
        assert_eq!(c.len(), 1);
    }
}

//! Boolean operations on shape records.
//!
//! Operand outlines are scaled onto an integer grid, clipped by the backend
//! one operand at a time, cleaned up, and packaged as a `path` shape whose
//! first contour is the largest outer boundary.

use tracing::{debug, warn};

use crate::csg::BooleanOp;
use crate::csg::backend::{ClipBackend, FillRule, GeoBackend, IntPolygon};
use crate::csg::contour::{
    BoundingBox, Contour, DEFAULT_SCALE, IntContour, from_fixed, orient, shoelace_int, to_fixed,
};
use crate::csg::naming::NamingCounters;
use crate::error::{Error, Result};
use crate::runtime::value::Value;
use crate::types::geometry::{BasicGeometry, ShapeGeometry};
use crate::types::shape::{PathData, Shape, ShapeKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Fixed-point factor applied before clipping.
    pub scale_factor: f64,
    /// Run the backend's cleanup pass on results.
    pub simplify: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { scale_factor: DEFAULT_SCALE, simplify: true }
    }
}

/// A shape taking part in an operation, under the name the script used.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'a> {
    pub name: &'a str,
    pub shape: &'a Shape,
}

impl<'a> Operand<'a> {
    pub fn new(name: &'a str, shape: &'a Shape) -> Self {
        Self { name, shape }
    }
}

/// Style keys a result takes over from its first operand.
const INHERITED_STYLE: &[&str] = &["fill", "fillColor", "strokeColor", "strokeWidth", "opacity"];

pub struct BooleanEngine {
    backend: Box<dyn ClipBackend>,
    geometry: Box<dyn ShapeGeometry>,
    available: bool,
    config: EngineConfig,
    counters: NamingCounters,
}

impl Default for BooleanEngine {
    fn default() -> Self {
        Self::new(Box::new(GeoBackend), Box::new(BasicGeometry::default()), EngineConfig::default())
    }
}

impl BooleanEngine {
    pub fn new(backend: Box<dyn ClipBackend>, geometry: Box<dyn ShapeGeometry>, config: EngineConfig) -> Self {
        let available = backend.is_available();
        if !available {
            warn!(backend = backend.name(), "polygon clipping backend not available");
        }
        Self { backend, geometry, available, config, counters: NamingCounters::new() }
    }

    pub fn reset_counters(&mut self) {
        self.counters.reset();
    }

    pub fn union(&mut self, operands: &[Operand<'_>]) -> Result<Shape> {
        self.apply(BooleanOp::Union, operands)
    }

    /// `((base - cut1) - cut2) - ...`
    pub fn difference(&mut self, operands: &[Operand<'_>]) -> Result<Shape> {
        self.apply(BooleanOp::Difference, operands)
    }

    pub fn intersection(&mut self, operands: &[Operand<'_>]) -> Result<Shape> {
        self.apply(BooleanOp::Intersection, operands)
    }

    pub fn xor(&mut self, operands: &[Operand<'_>]) -> Result<Shape> {
        self.apply(BooleanOp::Xor, operands)
    }

    pub fn apply(&mut self, op: BooleanOp, operands: &[Operand<'_>]) -> Result<Shape> {
        if !self.available {
            return Err(Error::BackendUnavailable);
        }
        let Some(first) = operands.first().filter(|_| operands.len() >= op.min_operands()) else {
            return Err(Error::geometry(format!(
                "{} requires at least {} shape{}",
                capitalized(op),
                op.min_operands(),
                if op.min_operands() == 1 { "" } else { "s" },
            )));
        };

        debug!(op = op.name(), operands = operands.len(), first = first.name, "boolean operation");

        let base = self.operand_contours(first)?;
        let mut running = self.backend.execute(BooleanOp::Union, &base, &[], FillRule::NonZero)?;
        let mut running_is_result = first.shape.is_boolean_result();
        let mut repaired = false;

        for operand in &operands[1..] {
            let clip = self.operand_contours(operand)?;
            let (next, manual) = match op {
                BooleanOp::Difference => self.difference_step(&running, &clip, running_is_result)?,
                _ => (self.backend.execute(op, &flatten(&running), &clip, FillRule::NonZero)?, false),
            };
            running = next;
            running_is_result = true;
            repaired = manual;
        }

        if self.config.simplify && !repaired {
            running = self.backend.simplify(running);
        }
        if running.is_empty() {
            return Err(Error::geometry(format!("{} produced empty geometry", capitalized(op))));
        }

        Ok(self.package(op, operands, normalize(running)))
    }

    /// Fixed-point contours of one operand, winding-checked when it carries
    /// holes.
    fn operand_contours(&self, operand: &Operand<'_>) -> Result<Vec<IntContour>> {
        let mut contours: Vec<Contour> = self.geometry.contours(operand.shape)?
            .into_iter()
            .filter(|c| c.len() >= 3)
            .collect();
        if contours.is_empty() {
            return Err(Error::geometry(format!("Shape '{}' has no closed contour", operand.name)));
        }
        if operand.shape.has_holes() {
            enforce_winding(operand.name, &mut contours);
        }
        contours.iter().map(|c| to_fixed(c, self.config.scale_factor)).collect()
    }

    /// One cut of a difference, with the repair policy for empty results.
    /// The flag reports whether the result was synthesized by hand.
    fn difference_step(
        &self,
        subject: &[IntPolygon],
        clip: &[IntContour],
        subject_is_result: bool,
    ) -> Result<(Vec<IntPolygon>, bool)> {
        let paths = flatten(subject);
        let out = self.backend.execute(BooleanOp::Difference, &paths, clip, FillRule::NonZero)?;
        if !out.is_empty() {
            return Ok((out, false));
        }

        if subject_is_result {
            warn!("difference came back empty, retrying with even-odd fill");
            let out = self.backend.execute(BooleanOp::Difference, &paths, clip, FillRule::EvenOdd)?;
            if !out.is_empty() {
                return Ok((out, false));
            }
        }

        let subject_box = int_bounds(&paths);
        let clip_box = int_bounds(clip);
        let contained = matches!((subject_box, clip_box), (Some(s), Some(c)) if s.strictly_contains(&c));
        if !contained {
            return Err(Error::geometry("Difference produced empty geometry"));
        }

        warn!("difference lost an interior cut, keeping the cut as a hole");
        let mut polygons = normalize(subject.to_vec());
        let hole = clip.iter().max_by_key(|c| shoelace_int(c).abs()).cloned();
        if let (Some(target), Some(mut hole)) = (polygons.first_mut(), hole) {
            if shoelace_int(&hole) < 0 {
                hole.reverse();
            }
            target.holes.push(hole);
        }
        Ok((polygons, true))
    }

    fn package(&mut self, op: BooleanOp, operands: &[Operand<'_>], polygons: Vec<IntPolygon>) -> Shape {
        let first = &operands[0];
        let scale = self.config.scale_factor;
        let contours: Vec<Contour> = polygons.iter()
            .flat_map(|p| p.contours())
            .map(|c| from_fixed(c, scale))
            .collect();
        let has_holes = polygons.len() == 1 && !polygons[0].holes.is_empty();

        let mut shape = Shape::new(ShapeKind::Path, self.counters.result_name(op, first.name));
        let names = operands.iter().map(|o| Value::from(o.name)).collect();
        shape.params.insert("operands".into(), Value::Array(names));
        shape.params.insert("operation".into(), Value::from(op.name()));
        shape.params.insert("hasHoles".into(), Value::Bool(has_holes));
        shape.params.insert("closed".into(), Value::Bool(true));

        for key in INHERITED_STYLE {
            let value = first.shape.param(key).cloned().or_else(|| default_style(op, key));
            if let Some(value) = value {
                shape.params.insert(key.to_string(), value);
            }
        }

        debug!(result = %shape.id, contours = contours.len(), has_holes, "boolean result");
        shape.path = Some(PathData { contours, closed: true, operation: Some(op), has_holes });
        shape
    }
}

fn default_style(op: BooleanOp, key: &str) -> Option<Value> {
    match key {
        "fill"        => Some(Value::Bool(false)),
        "strokeColor" => Some(Value::from(op.default_stroke())),
        "strokeWidth" => Some(Value::Number(2.0)),
        "opacity"     => Some(Value::Number(1.0)),
        _ => None,
    }
}

/// First contour counter-clockwise, every other one clockwise. Wrong
/// contours are reversed in place; returns how many were.
pub fn enforce_winding(name: &str, contours: &mut [Contour]) -> usize {
    let mut corrected = 0;
    for (i, contour) in contours.iter_mut().enumerate() {
        if orient(contour, i == 0) {
            warn!(shape = name, contour = i, "corrected contour winding");
            corrected += 1;
        }
    }
    corrected
}

/// Outers counter-clockwise, holes clockwise, largest polygon first.
fn normalize(mut polygons: Vec<IntPolygon>) -> Vec<IntPolygon> {
    for p in &mut polygons {
        if shoelace_int(&p.outer) > 0 { p.outer.reverse(); }
        for h in &mut p.holes {
            if shoelace_int(h) < 0 { h.reverse(); }
        }
    }
    polygons.sort_by(|a, b| b.area2().cmp(&a.area2()));
    polygons
}

/// Paths for resubmission: outers counter-clockwise and holes clockwise, so
/// holes wind back to zero under the non-zero rule.
fn flatten(polygons: &[IntPolygon]) -> Vec<IntContour> {
    normalize(polygons.to_vec()).iter().flat_map(|p| p.contours().cloned()).collect()
}

fn int_bounds(contours: &[IntContour]) -> Option<BoundingBox> {
    let points: Vec<(f64, f64)> = contours.iter().flatten().map(|&(x, y)| (x as f64, y as f64)).collect();
    BoundingBox::of(&points)
}

fn capitalized(op: BooleanOp) -> &'static str {
    match op {
        BooleanOp::Union        => "Union",
        BooleanOp::Difference   => "Difference",
        BooleanOp::Intersection => "Intersection",
        BooleanOp::Xor          => "Xor",
    }
}

//! Shape records, their identifiers and transforms.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::csg::BooleanOp;
use crate::csg::contour::Contour;
use crate::runtime::value::Value;

pub type Params = BTreeMap<String, Value>;

// ─── Shape kind ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Ellipse,
    Rectangle,
    RoundedRectangle,
    Triangle,
    Polygon,
    Star,
    Donut,
    Cross,
    Arc,
    Text,
    Path,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 12] = [
        Self::Circle, Self::Ellipse, Self::Rectangle, Self::RoundedRectangle,
        Self::Triangle, Self::Polygon, Self::Star, Self::Donut,
        Self::Cross, Self::Arc, Self::Text, Self::Path,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Circle           => "circle",
            Self::Ellipse          => "ellipse",
            Self::Rectangle        => "rectangle",
            Self::RoundedRectangle => "roundedRectangle",
            Self::Triangle         => "triangle",
            Self::Polygon          => "polygon",
            Self::Star             => "star",
            Self::Donut            => "donut",
            Self::Cross            => "cross",
            Self::Arc              => "arc",
            Self::Text             => "text",
            Self::Path             => "path",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ShapeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ─── Identifier ──────────────────────────────────────────────────────────────

/// One level of evaluation context a shape was created under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Qualifier {
    /// Loop counter, pre-formatted (`0`, `1.5`).
    Loop(String),
    /// Function name and its per-function call ordinal.
    Call { function: String, call_id: u32 },
}

/// Structured shape identity. Only rendered to a flat string (`s_0`,
/// `gear_makeGear_2`) when results leave the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId {
    pub base: String,
    pub qualifiers: Vec<Qualifier>,
}

impl ShapeId {
    pub fn plain(base: impl Into<String>) -> Self {
        Self { base: base.into(), qualifiers: Vec::new() }
    }

    pub fn qualified(base: impl Into<String>, qualifiers: &[Qualifier]) -> Self {
        Self { base: base.into(), qualifiers: qualifiers.to_vec() }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        for q in &self.qualifiers {
            match q {
                Qualifier::Loop(counter) => write!(f, "_{counter}")?,
                Qualifier::Call { function, call_id } => write!(f, "_{function}_{call_id}")?,
            }
        }
        Ok(())
    }
}

// ─── Transform ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub position: (f64, f64),
    /// Degrees, counter-clockwise.
    pub rotation: f64,
    pub scale: (f64, f64),
}

impl Default for Transform {
    fn default() -> Self {
        Self { position: (0.0, 0.0), rotation: 0.0, scale: (1.0, 1.0) }
    }
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Local → world: scale, then rotate, then translate.
    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let (sx, sy) = (x * self.scale.0, y * self.scale.1);
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        (
            sx * cos - sy * sin + self.position.0,
            sx * sin + sy * cos + self.position.1,
        )
    }
}

// ─── Path data ───────────────────────────────────────────────────────────────

/// Contour geometry of a `path` shape (turtle drawings and boolean results),
/// stored in world space.
///
/// Closed contours follow one orientation convention: outer boundaries run
/// counter-clockwise and holes clockwise. `has_holes` is only set for a
/// single outer boundary with holes, where contour 0 is the boundary and
/// every later contour is one of its holes. Results made of several
/// polygons leave it false; their holes are the clockwise contours.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathData {
    #[serde(rename = "points", serialize_with = "serialize_flat_points")]
    pub contours: Vec<Contour>,
    pub closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<BooleanOp>,
    pub has_holes: bool,
}

impl PathData {
    pub fn open(contours: Vec<Contour>) -> Self {
        Self { contours, closed: false, operation: None, has_holes: false }
    }

    /// Points with `None` separating contours.
    pub fn flat_points(&self) -> Vec<Option<(f64, f64)>> {
        let mut out = Vec::new();
        for (i, contour) in self.contours.iter().enumerate() {
            if i > 0 { out.push(None); }
            out.extend(contour.iter().copied().map(Some));
        }
        out
    }

    /// Inverse of [`PathData::flat_points`].
    pub fn split_flat(points: &[Option<(f64, f64)>]) -> Vec<Contour> {
        points
            .split(|p| p.is_none())
            .map(|run| run.iter().flatten().copied().collect::<Contour>())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

fn serialize_flat_points<S: Serializer>(contours: &[Contour], serializer: S) -> Result<S::Ok, S::Error> {
    let flat = PathData::open(contours.to_vec()).flat_points();
    serializer.collect_seq(flat.into_iter().map(|p| p.map(|(x, y)| [x, y])))
}

// ─── Shape record ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub id: String,
    pub params: Params,
    pub transform: Transform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(rename = "_consumedByBoolean", skip_serializing_if = "std::ops::Not::not")]
    pub consumed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathData>,
}

impl Shape {
    pub fn new(kind: ShapeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            params: Params::new(),
            transform: Transform::default(),
            layer: None,
            consumed: false,
            path: None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.params.get(name).and_then(Value::as_number_opt)
    }

    pub fn number_or(&self, name: &str, default: f64) -> f64 {
        self.number(name).unwrap_or(default)
    }

    pub fn is_boolean_result(&self) -> bool {
        self.path.as_ref().is_some_and(|p| p.operation.is_some())
    }

    pub fn has_holes(&self) -> bool {
        self.path.as_ref().is_some_and(|p| p.has_holes)
    }
}

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Coincident,
    Distance,
    Horizontal,
    Vertical,
}

/// `shape.anchor`, e.g. `box.topLeft`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub shape: String,
    pub anchor: String,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.shape, self.anchor)
    }
}

/// A collected, unsolved constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub a: Anchor,
    pub b: Anchor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

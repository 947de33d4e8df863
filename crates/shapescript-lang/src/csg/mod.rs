//! Polygon boolean operations on shapes.

pub mod backend;
pub mod contour;
pub mod engine;
pub mod naming;

use std::fmt;

use serde::Serialize;

pub use backend::{ClipBackend, FillRule, GeoBackend, IntPolygon, NullBackend};
pub use engine::{BooleanEngine, EngineConfig, Operand};
pub use naming::NamingCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
    Xor,
}

impl BooleanOp {
    /// Letter used in generated result names.
    pub fn symbol(self) -> char {
        match self {
            Self::Union        => 'U',
            Self::Difference   => 'D',
            Self::Intersection => 'I',
            Self::Xor          => 'X',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Union        => "union",
            Self::Difference   => "difference",
            Self::Intersection => "intersection",
            Self::Xor          => "xor",
        }
    }

    /// Fewest operands the operation accepts.
    pub fn min_operands(self) -> usize {
        match self {
            Self::Union => 1,
            _ => 2,
        }
    }

    /// Stroke color used when the first operand has none.
    pub fn default_stroke(self) -> &'static str {
        match self {
            Self::Union        => "#0066cc",
            Self::Difference   => "#cc3300",
            Self::Intersection => "#009933",
            Self::Xor          => "#9933cc",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::shape::{Shape, Transform};

/// One entry of a layer's operation list, in script order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "camelCase")]
pub enum LayerOp {
    Add(String),
    Subtract(String),
    Rotate(f64),
    Scale((f64, f64)),
    Position((f64, f64)),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    /// Member shape names, insertion ordered, no duplicates.
    pub members: Vec<String>,
    pub transform: Transform,
    pub operations: Vec<LayerOp>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), members: Vec::new(), transform: Transform::default(), operations: Vec::new() }
    }

    pub fn add_member(&mut self, name: &str) {
        if !self.members.iter().any(|m| m == name) {
            self.members.push(name.to_string());
        }
    }

    pub fn remove_member(&mut self, name: &str) {
        self.members.retain(|m| m != name);
    }

    /// Members resolved against `shapes`; names with no shape are skipped.
    pub fn shapes<'s>(&self, shapes: &'s BTreeMap<String, Shape>) -> Vec<&'s Shape> {
        self.members.iter().filter_map(|m| shapes.get(m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::shape::ShapeKind;

    #[test]
    fn members_are_unique_and_resolved_lazily() {
        let mut layer = Layer::new("bg");
        layer.add_member("a");
        layer.add_member("a");
        layer.add_member("b");
        assert_eq!(layer.members, vec!["a", "b"]);

        let mut shapes = BTreeMap::new();
        shapes.insert("a".to_string(), Shape::new(ShapeKind::Circle, "a"));
        assert_eq!(layer.shapes(&shapes).len(), 1);

        shapes.insert("b".to_string(), Shape::new(ShapeKind::Rectangle, "b"));
        assert_eq!(layer.shapes(&shapes).len(), 2);
    }
}

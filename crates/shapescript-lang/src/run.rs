//! Run orchestration: source text in, externally owned stores updated.
//!
//! The pipeline is lex → parse → interpret. Stores are only written after the
//! whole pipeline succeeded, so a failed run leaves them exactly as they were
//! (apart from any clearing the caller asked for up front).

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use tracing::{debug, warn};

use crate::csg::{BooleanEngine, EngineConfig, GeoBackend};
use crate::error::Result;
use crate::runtime::interpreter::{InterpretResult, Interpreter};
use crate::runtime::value::Value;
use crate::syntax::{lexer::Lexer, parser::Parser};
use crate::types::geometry::BasicGeometry;
use crate::types::shape::{Shape, ShapeKind};

// ─── Collaborators ───────────────────────────────────────────────────────────

/// Builds an empty store-side shape for a type name.
pub trait ShapeFactory {
    fn create(&self, type_name: &str) -> Option<Shape>;
}

pub trait ShapeStore {
    fn add(&mut self, name: &str, shape: Shape);
    fn remove(&mut self, name: &str) -> Option<Shape>;
    fn get(&self, name: &str) -> Option<&Shape>;
    fn names(&self) -> Vec<String>;
    fn clear(&mut self);
}

pub trait ParameterStore {
    fn add(&mut self, name: &str, value: Value);
    /// Returns false when no parameter of that name exists.
    fn set_value(&mut self, name: &str, value: Value) -> bool;
    fn get(&self, name: &str) -> Option<&Value>;
    fn remove(&mut self, name: &str) -> Option<Value>;
    fn names(&self) -> Vec<String>;
    fn clear(&mut self);
}

/// Factory for the shape kinds the interpreter knows.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordShapeFactory;

impl ShapeFactory for RecordShapeFactory {
    fn create(&self, type_name: &str) -> Option<Shape> {
        ShapeKind::from_name(type_name).map(|kind| Shape::new(kind, ""))
    }
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct MemoryShapeStore {
    shapes: BTreeMap<String, Shape>,
}

impl ShapeStore for MemoryShapeStore {
    fn add(&mut self, name: &str, shape: Shape) {
        self.shapes.insert(name.to_string(), shape);
    }

    fn remove(&mut self, name: &str) -> Option<Shape> {
        self.shapes.remove(name)
    }

    fn get(&self, name: &str) -> Option<&Shape> {
        self.shapes.get(name)
    }

    fn names(&self) -> Vec<String> {
        self.shapes.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.shapes.clear();
    }
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct MemoryParameterStore {
    parameters: BTreeMap<String, Value>,
}

impl ParameterStore for MemoryParameterStore {
    fn add(&mut self, name: &str, value: Value) {
        self.parameters.insert(name.to_string(), value);
    }

    fn set_value(&mut self, name: &str, value: Value) -> bool {
        match self.parameters.get_mut(name) {
            Some(slot) => { *slot = value; true }
            None => false,
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    fn remove(&mut self, name: &str) -> Option<Value> {
        self.parameters.remove(name)
    }

    fn names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.parameters.clear();
    }
}

// ─── Options and outcome ─────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub clear_shapes: bool,
    pub clear_parameters: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Success { shapes_created: usize, parameters_created: usize },
    /// `line`/`column` are set for lexer and parser errors.
    Failure { error: String, line: Option<usize>, column: Option<usize> },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl Serialize for RunOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Success { shapes_created, parameters_created } => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("shapesCreated", shapes_created)?;
                map.serialize_entry("parametersCreated", parameters_created)?;
            }
            Self::Failure { error, line, column } => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                if let Some(line) = line {
                    map.serialize_entry("line", line)?;
                }
                if let Some(column) = column {
                    map.serialize_entry("column", column)?;
                }
            }
        }
        map.end()
    }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Lex, parse and interpret `source` with a fresh interpreter.
pub fn evaluate(source: &str, config: EngineConfig) -> Result<InterpretResult> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse()?;
    debug!(statements = program.len(), "parsed");
    let engine = BooleanEngine::new(Box::new(GeoBackend), Box::new(BasicGeometry::default()), config);
    Interpreter::with_engine(engine).interpret(&program)
}

pub struct Runner<F, S, P> {
    factory: F,
    shapes: S,
    parameters: P,
    config: EngineConfig,
}

impl Default for Runner<RecordShapeFactory, MemoryShapeStore, MemoryParameterStore> {
    fn default() -> Self {
        Self::new(RecordShapeFactory, MemoryShapeStore::default(), MemoryParameterStore::default())
    }
}

impl<F: ShapeFactory, S: ShapeStore, P: ParameterStore> Runner<F, S, P> {
    pub fn new(factory: F, shapes: S, parameters: P) -> Self {
        Self { factory, shapes, parameters, config: EngineConfig::default() }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn shapes(&self) -> &S { &self.shapes }
    pub fn parameters(&self) -> &P { &self.parameters }
    pub fn config(&self) -> EngineConfig { self.config }

    pub fn run(&mut self, source: &str, options: RunOptions) -> RunOutcome {
        if options.clear_shapes {
            self.shapes.clear();
        }
        if options.clear_parameters {
            self.parameters.clear();
        }

        match evaluate(source, self.config) {
            Ok(result) => self.commit(result),
            Err(err) => {
                warn!(error = %err, "run failed");
                let location = err.location();
                RunOutcome::Failure {
                    error: err.to_string(),
                    line: location.map(|(line, _)| line),
                    column: location.map(|(_, column)| column),
                }
            }
        }
    }

    fn commit(&mut self, result: InterpretResult) -> RunOutcome {
        let parameters_created = result.parameters.len();
        for (name, value) in result.parameters {
            if !self.parameters.set_value(&name, value.clone()) {
                self.parameters.add(&name, value);
            }
        }

        let mut shapes_created = 0;
        for (name, record) in result.shapes {
            let Some(mut shape) = self.factory.create(record.kind.name()) else {
                warn!(shape = %name, kind = %record.kind, "no factory for shape type, skipping");
                continue;
            };
            shape.id = record.id;
            shape.params = record.params;
            shape.transform = record.transform;
            shape.layer = record.layer;
            shape.path = record.path;

            self.shapes.remove(&name);
            self.shapes.add(&name, shape);
            shapes_created += 1;
        }

        debug!(shapes_created, parameters_created, "run committed");
        RunOutcome::Success { shapes_created, parameters_created }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_flat() {
        let ok = RunOutcome::Success { shapes_created: 2, parameters_created: 1 };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"success": true, "shapesCreated": 2, "parametersCreated": 1})
        );

        let failed = RunOutcome::Failure { error: "Division by zero".into(), line: None, column: None };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"success": false, "error": "Division by zero"})
        );
    }

    #[test]
    fn factory_knows_interpreter_kinds() {
        assert_eq!(RecordShapeFactory.create("roundedRectangle").map(|s| s.kind), Some(ShapeKind::RoundedRectangle));
        assert!(RecordShapeFactory.create("hexagon").is_none());
    }
}

//! Tree-walking interpreter. Evaluates a statement list into parameter,
//! shape, layer, function and constraint maps.
//!
//! Every construct is handled by a free function over [`EvalContext`]; the
//! interpreter itself only owns the context and the top-level loop.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::csg::BooleanEngine;
use crate::error::Result;
use crate::runtime::scope::{FunctionDef, ScopeEngine};
use crate::runtime::turtle::Turtle;
use crate::runtime::value::Value;
use crate::runtime::{boolean, control, draw, expr, shapes};
use crate::syntax::ast::Stmt;
use crate::types::constraint::Constraint;
use crate::types::layer::Layer;
use crate::types::shape::{Qualifier, Shape, ShapeId, ShapeKind};

/// Outcome of one statement: keep going, or unwind to the enclosing call.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue(Value),
    Return(Value),
}

/// Everything the visitors read and write during a run.
pub struct EvalContext {
    pub scope: ScopeEngine,
    pub engine: BooleanEngine,
    pub turtle: Turtle,
    /// Active loop counters and calls, outermost first.
    pub qualifiers: Vec<Qualifier>,
    /// Per-function call ordinals.
    pub call_counts: HashMap<String, u32>,
    /// Per-kind counters for shapes written without a name.
    pub auto_names: HashMap<ShapeKind, u32>,
    pub constraints: Vec<Constraint>,
    pub in_draw: bool,
}

impl EvalContext {
    pub fn new(engine: BooleanEngine) -> Self {
        Self {
            scope: ScopeEngine::new(),
            engine,
            turtle: Turtle::new(),
            qualifiers: Vec::new(),
            call_counts: HashMap::new(),
            auto_names: HashMap::new(),
            constraints: Vec::new(),
            in_draw: false,
        }
    }

    pub fn in_call(&self) -> bool {
        self.qualifiers.iter().any(|q| matches!(q, Qualifier::Call { .. }))
    }

    /// Id for a shape declared here under `base`.
    pub fn qualify(&self, base: &str) -> ShapeId {
        ShapeId::qualified(base, &self.qualifiers)
    }

    /// Shapes created inside a call go to the global frame, everything else
    /// to the current one.
    pub fn register_shape(&mut self, id: ShapeId, shape: Shape) {
        debug!(id = %id, kind = %shape.kind, "shape");
        if self.in_call() {
            self.scope.add_shape_global(id, shape);
        } else {
            self.scope.add_shape_in_current(id, shape);
        }
    }

    pub fn resolve_shape(&self, name: &str) -> Option<ShapeId> {
        self.scope.resolve_shape(name, &self.qualifiers)
    }

    /// `circle_1`, `circle_2`, ... for unnamed shapes.
    pub fn auto_name(&mut self, kind: ShapeKind) -> String {
        let n = self.auto_names.entry(kind).or_insert(0);
        *n += 1;
        format!("{kind}_{n}")
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpretResult {
    pub parameters: BTreeMap<String, Value>,
    /// Keyed by rendered shape id; shapes consumed by a boolean are left out.
    pub shapes: BTreeMap<String, Shape>,
    pub layers: BTreeMap<String, Layer>,
    pub functions: BTreeMap<String, FunctionDef>,
    pub constraints: Vec<Constraint>,
    /// Value of the last top-level statement.
    pub result: Value,
}

pub struct Interpreter {
    ctx: EvalContext,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_engine(BooleanEngine::default())
    }

    /// Run with a specific boolean engine. Its naming counters restart.
    pub fn with_engine(mut engine: BooleanEngine) -> Self {
        engine.reset_counters();
        Self { ctx: EvalContext::new(engine) }
    }

    pub fn interpret(mut self, program: &[Stmt]) -> Result<InterpretResult> {
        let mut result = Value::Null;
        for stmt in program {
            // a top-level `return` hands its value over and the script goes on
            result = match exec_stmt(&mut self.ctx, stmt)? {
                Flow::Continue(v) | Flow::Return(v) => v,
            };
        }

        let EvalContext { scope, constraints, .. } = self.ctx;
        let global = scope.into_global();
        let shapes = global.shapes.into_iter()
            .filter(|(_, shape)| !shape.consumed)
            .map(|(id, shape)| (id.to_string(), shape))
            .collect();

        Ok(InterpretResult {
            parameters: global.parameters,
            shapes,
            layers: global.layers,
            functions: global.functions,
            constraints,
            result,
        })
    }
}

// ─── Statement dispatch ──────────────────────────────────────────────────────

pub fn exec_stmt(ctx: &mut EvalContext, stmt: &Stmt) -> Result<Flow> {
    match stmt {
        Stmt::Param(p) => {
            let value = expr::eval(ctx, &p.value)?;
            ctx.scope.set_parameter(&p.name, value.clone());
            Ok(Flow::Continue(value))
        }
        Stmt::Shape(s)       => shapes::exec_shape(ctx, s),
        Stmt::Layer(l)       => shapes::exec_layer(ctx, l),
        Stmt::Transform(t)   => shapes::exec_transform(ctx, t),
        Stmt::Fill(f)        => shapes::exec_fill(ctx, f),
        Stmt::Style(s)       => shapes::exec_style(ctx, s),
        Stmt::Constraints(c) => shapes::exec_constraints(ctx, c),
        Stmt::Boolean(b)     => boolean::exec_boolean(ctx, b),
        Stmt::If(i)          => control::exec_if(ctx, i),
        Stmt::For(f)         => control::exec_for(ctx, f),
        Stmt::FnDef(f)       => control::exec_def(ctx, f),
        Stmt::Return(value, _) => {
            let value = match value {
                Some(e) => expr::eval(ctx, e)?,
                None => Value::Null,
            };
            Ok(Flow::Return(value))
        }
        Stmt::Expr(e)        => Ok(Flow::Continue(expr::eval(ctx, e)?)),
        Stmt::Draw(d)        => draw::exec_draw(ctx, d),
        Stmt::DrawCommand(c) => draw::exec_command(ctx, c),
    }
}

/// Run statements in order, stopping at the first `return`.
pub fn exec_block(ctx: &mut EvalContext, stmts: &[Stmt]) -> Result<Flow> {
    let mut last = Value::Null;
    for stmt in stmts {
        match exec_stmt(ctx, stmt)? {
            Flow::Continue(v) => last = v,
            ret @ Flow::Return(_) => return Ok(ret),
        }
    }
    Ok(Flow::Continue(last))
}

//! Shape declarations and the statements that edit shapes after the fact:
//! `fill`, `style`, `transform`, `layer` and `constraints`.

use tracing::{debug, warn};

use crate::error::{Error, NameKind, Result};
use crate::runtime::expr::eval;
use crate::runtime::interpreter::{EvalContext, Flow};
use crate::runtime::value::Value;
use crate::syntax::ast::{
    ConstraintsStmt, FillStmt, LayerCommand, LayerStmt, Property, ShapeStmt, StyleStmt,
    TransformKind, TransformStmt,
};
use crate::types::color::{normalize_property, resolve_color};
use crate::types::constraint::{Anchor, Constraint};
use crate::types::layer::{Layer, LayerOp};
use crate::types::shape::{Shape, ShapeKind, Transform};

// ─── shape ───────────────────────────────────────────────────────────────────

pub fn exec_shape(ctx: &mut EvalContext, stmt: &ShapeStmt) -> Result<Flow> {
    let name = match &stmt.name {
        Some(name) => name.clone(),
        None => ctx.auto_name(stmt.kind),
    };
    let id = ctx.qualify(&name);
    let mut shape = Shape::new(stmt.kind, id.to_string());

    apply_properties(ctx, &mut shape, &stmt.props)?;
    apply_defaults(&mut shape);

    let rendered = Value::Str(shape.id.clone());
    ctx.register_shape(id, shape);
    Ok(Flow::Continue(rendered))
}

fn apply_properties(ctx: &mut EvalContext, shape: &mut Shape, props: &[Property]) -> Result<()> {
    for prop in props {
        let value = match &prop.value {
            Some(e) => eval(ctx, e)?,
            None => Value::Bool(true),
        };
        apply_property(shape, &prop.name, value)?;
    }
    Ok(())
}

fn apply_property(shape: &mut Shape, name: &str, value: Value) -> Result<()> {
    match name {
        "position"           => shape.transform.position = value.as_point()?,
        "rotation" | "rotate" => shape.transform.rotation = value.as_number()?,
        "scale"              => shape.transform.scale = scale_of(&value)?,
        "fill"               => set_fill(shape, value),
        "hidden" => {
            shape.params.insert("visible".into(), Value::Bool(!value.is_truthy()));
        }
        "transparent" => {
            if value.is_truthy() {
                shape.params.insert("fill".into(), Value::Bool(false));
            }
        }
        "alpha" => {
            shape.params.insert("opacity".into(), value);
        }
        _ => {
            shape.params.insert(name.to_string(), normalize_property(name, value));
        }
    }
    Ok(())
}

/// `fill: red` sets a color and turns fill on; `fill: false` turns it off.
fn set_fill(shape: &mut Shape, value: Value) {
    match value {
        Value::Str(color) => {
            shape.params.insert("fill".into(), Value::Bool(true));
            shape.params.insert("fillColor".into(), Value::Str(resolve_color(&color)));
        }
        other => {
            shape.params.insert("fill".into(), Value::Bool(other.is_truthy()));
        }
    }
}

fn apply_defaults(shape: &mut Shape) {
    let p = &mut shape.params;
    if shape.kind == ShapeKind::Text {
        if !p.contains_key("fill") && !p.contains_key("filled") && !p.contains_key("fillColor") {
            p.insert("fill".into(), Value::Bool(true));
            p.insert("fillColor".into(), Value::from("#000000"));
        }
    } else if !p.contains_key("fill") {
        let filled = p.get("filled").is_some_and(Value::is_truthy) || p.contains_key("fillColor");
        p.insert("fill".into(), Value::Bool(filled));
    }
    p.entry("opacity".into()).or_insert(Value::Number(1.0));
    p.entry("visible".into()).or_insert(Value::Bool(true));
}

fn scale_of(value: &Value) -> Result<(f64, f64)> {
    match value {
        Value::Number(n) => Ok((*n, *n)),
        other => other.as_point(),
    }
}

// ─── fill / style ────────────────────────────────────────────────────────────

pub fn exec_fill(ctx: &mut EvalContext, stmt: &FillStmt) -> Result<Flow> {
    let value = eval(ctx, &stmt.value)?;
    let Some(id) = ctx.resolve_shape(&stmt.target) else {
        warn!(target_shape = %stmt.target, "fill: shape not found, skipping");
        return Ok(Flow::Continue(Value::Null));
    };
    set_fill(ctx.scope.get_shape_mut(&id)?, value);
    Ok(Flow::Continue(Value::Null))
}

pub fn exec_style(ctx: &mut EvalContext, stmt: &StyleStmt) -> Result<Flow> {
    let Some(id) = ctx.resolve_shape(&stmt.target) else {
        warn!(target_shape = %stmt.target, "style: shape not found, skipping");
        return Ok(Flow::Continue(Value::Null));
    };
    let mut values = Vec::with_capacity(stmt.props.len());
    for prop in &stmt.props {
        let value = match &prop.value {
            Some(e) => eval(ctx, e)?,
            None => Value::Bool(true),
        };
        values.push((prop.name.as_str(), value));
    }
    let shape = ctx.scope.get_shape_mut(&id)?;
    for (name, value) in values {
        apply_property(shape, name, value)?;
    }
    Ok(Flow::Continue(Value::Null))
}

// ─── transform ───────────────────────────────────────────────────────────────

/// Applies to a shape, or to a layer of that name when no shape matches.
pub fn exec_transform(ctx: &mut EvalContext, stmt: &TransformStmt) -> Result<Flow> {
    let mut updates = Vec::with_capacity(stmt.ops.len());
    for op in &stmt.ops {
        if let Some(cond) = &op.condition {
            if !eval(ctx, cond)?.is_truthy() {
                continue;
            }
        }
        updates.push((op.kind, eval(ctx, &op.value)?));
    }

    let transform: &mut Transform = if let Some(id) = ctx.resolve_shape(&stmt.target) {
        &mut ctx.scope.get_shape_mut(&id)?.transform
    } else if ctx.scope.has_layer(&stmt.target) {
        &mut ctx.scope.get_layer_mut(&stmt.target)?.transform
    } else {
        return Err(Error::name(NameKind::Shape, &stmt.target));
    };

    for (kind, value) in updates {
        match kind {
            TransformKind::Position => transform.position = value.as_point()?,
            TransformKind::Rotate   => transform.rotation = value.as_number()?,
            TransformKind::Scale    => transform.scale = scale_of(&value)?,
        }
    }
    Ok(Flow::Continue(Value::Null))
}

// ─── layer ───────────────────────────────────────────────────────────────────

/// Creates the layer on first use; later blocks with the same name extend it.
pub fn exec_layer(ctx: &mut EvalContext, stmt: &LayerStmt) -> Result<Flow> {
    let exists = ctx.scope.has_layer(&stmt.name);
    let mut layer = match ctx.scope.get_layer(&stmt.name) {
        Ok(layer) => layer.clone(),
        Err(_) => Layer::new(&stmt.name),
    };

    for command in &stmt.commands {
        match command {
            LayerCommand::Add(name, _) => {
                let Some(id) = ctx.resolve_shape(name) else {
                    warn!(layer = %stmt.name, shape = %name, "layer add: shape not found, skipping");
                    continue;
                };
                let member = id.to_string();
                ctx.scope.get_shape_mut(&id)?.layer = Some(layer.name.clone());
                layer.add_member(&member);
                layer.operations.push(LayerOp::Add(member));
            }
            LayerCommand::Subtract(name, _) => {
                let member = match ctx.resolve_shape(name) {
                    Some(id) => {
                        let shape = ctx.scope.get_shape_mut(&id)?;
                        if shape.layer.as_deref() == Some(layer.name.as_str()) {
                            shape.layer = None;
                        }
                        id.to_string()
                    }
                    None => name.clone(),
                };
                layer.remove_member(&member);
                layer.operations.push(LayerOp::Subtract(member));
            }
            LayerCommand::Rotate(e) => {
                let degrees = eval(ctx, e)?.as_number()?;
                layer.transform.rotation = degrees;
                layer.operations.push(LayerOp::Rotate(degrees));
            }
            LayerCommand::Scale(e) => {
                let scale = scale_of(&eval(ctx, e)?)?;
                layer.transform.scale = scale;
                layer.operations.push(LayerOp::Scale(scale));
            }
            LayerCommand::Position(e) => {
                let position = eval(ctx, e)?.as_point()?;
                layer.transform.position = position;
                layer.operations.push(LayerOp::Position(position));
            }
        }
    }

    debug!(layer = %layer.name, members = layer.members.len(), "layer");
    if exists {
        *ctx.scope.get_layer_mut(&stmt.name)? = layer;
    } else {
        ctx.scope.set_layer(layer);
    }
    Ok(Flow::Continue(Value::Null))
}

// ─── constraints ─────────────────────────────────────────────────────────────

/// Constraints are collected, not solved.
pub fn exec_constraints(ctx: &mut EvalContext, stmt: &ConstraintsStmt) -> Result<Flow> {
    for item in &stmt.items {
        let distance = match &item.distance {
            Some(e) => Some(eval(ctx, e)?.as_number()?),
            None => None,
        };
        let a = anchor(ctx, &item.a);
        let b = anchor(ctx, &item.b);
        ctx.constraints.push(Constraint { kind: item.kind, a, b, distance });
    }
    Ok(Flow::Continue(Value::Null))
}

fn anchor(ctx: &EvalContext, (shape, point): &(String, String)) -> Anchor {
    let shape = ctx.resolve_shape(shape).map_or_else(|| shape.clone(), |id| id.to_string());
    Anchor { shape, anchor: point.clone() }
}

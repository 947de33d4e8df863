//! `union`, `difference` and `intersection` blocks.

use tracing::debug;

use crate::csg::Operand;
use crate::error::{Error, NameKind, Result};
use crate::runtime::interpreter::{EvalContext, Flow};
use crate::runtime::value::Value;
use crate::syntax::ast::BooleanStmt;
use crate::types::shape::{Shape, ShapeId};

/// Combine the operands into a new path shape registered under the block's
/// name. Operands are marked consumed and drop out of the result set.
pub fn exec_boolean(ctx: &mut EvalContext, stmt: &BooleanStmt) -> Result<Flow> {
    let ids = stmt.operands.iter()
        .map(|name| ctx.resolve_shape(name).ok_or_else(|| Error::name(NameKind::Shape, name)))
        .collect::<Result<Vec<ShapeId>>>()?;
    let shapes = ids.iter()
        .map(|id| ctx.scope.get_shape(id).cloned())
        .collect::<Result<Vec<Shape>>>()?;
    let names: Vec<String> = ids.iter().map(ToString::to_string).collect();

    let operands: Vec<Operand<'_>> = names.iter().zip(&shapes)
        .map(|(name, shape)| Operand::new(name, shape))
        .collect();
    let result = ctx.engine.apply(stmt.op, &operands)?;

    for id in &ids {
        ctx.scope.get_shape_mut(id)?.consumed = true;
    }

    let id = ctx.qualify(&stmt.name);
    debug!(name = %id, result = %result.id, op = stmt.op.name(), "boolean block");
    ctx.register_shape(id.clone(), result);
    Ok(Flow::Continue(Value::Str(id.to_string())))
}

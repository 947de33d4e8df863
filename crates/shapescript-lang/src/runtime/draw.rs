//! Turtle `draw` blocks.

use tracing::{debug, warn};

use crate::error::Result;
use crate::runtime::expr::eval;
use crate::runtime::interpreter::{EvalContext, Flow, exec_block};
use crate::runtime::value::Value;
use crate::syntax::ast::{DrawCommand, DrawStmt, TurtleCommand};
use crate::types::shape::{PathData, Shape, ShapeKind};

/// Run the body against a fresh turtle and keep the polylines it drew as an
/// open `path` shape.
pub fn exec_draw(ctx: &mut EvalContext, stmt: &DrawStmt) -> Result<Flow> {
    ctx.turtle.reset();
    let outer = std::mem::replace(&mut ctx.in_draw, true);
    let flow = exec_block(ctx, &stmt.body);
    ctx.in_draw = outer;
    let flow = flow?;

    let name = match &stmt.name {
        Some(name) => name.clone(),
        None => ctx.auto_name(ShapeKind::Path),
    };
    let id = ctx.qualify(&name);
    let paths = ctx.turtle.drawing_paths();
    debug!(name = %id, polylines = paths.len(), "draw");

    let mut shape = Shape::new(ShapeKind::Path, id.to_string());
    shape.params.insert("closed".into(), Value::Bool(false));
    shape.params.insert("fill".into(), Value::Bool(false));
    shape.params.insert("strokeColor".into(), Value::from("#000000"));
    shape.params.insert("strokeWidth".into(), Value::Number(2.0));
    shape.params.insert("opacity".into(), Value::Number(1.0));
    shape.params.insert("visible".into(), Value::Bool(true));
    shape.path = Some(PathData::open(paths));
    ctx.register_shape(id, shape);

    Ok(flow)
}

pub fn exec_command(ctx: &mut EvalContext, cmd: &DrawCommand) -> Result<Flow> {
    if !ctx.in_draw {
        warn!(command = ?cmd.command, line = cmd.span.line, "turtle command outside a draw block, skipping");
        return Ok(Flow::Continue(Value::Null));
    }
    let arg = match &cmd.arg {
        Some(e) => eval(ctx, e)?,
        None => Value::Null,
    };

    let turtle = &mut ctx.turtle;
    match cmd.command {
        TurtleCommand::Forward  => turtle.forward(arg.as_number()?),
        TurtleCommand::Backward => turtle.backward(arg.as_number()?),
        TurtleCommand::Right    => turtle.right(arg.as_number()?),
        TurtleCommand::Left     => turtle.left(arg.as_number()?),
        TurtleCommand::Goto     => turtle.goto(arg.as_point()?),
        TurtleCommand::Penup    => turtle.penup(),
        TurtleCommand::Pendown  => turtle.pendown(),
    }
    Ok(Flow::Continue(Value::Null))
}

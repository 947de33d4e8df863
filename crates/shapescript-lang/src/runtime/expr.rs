//! Expression evaluation.

use crate::error::{Error, NameKind, Result};
use crate::runtime::builtins;
use crate::runtime::control::call_function;
use crate::runtime::interpreter::EvalContext;
use crate::runtime::value::Value;
use crate::syntax::ast::{BinOp, CmpOp, Expr, LogicOp, UnOp};

pub fn eval(ctx: &mut EvalContext, expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Number(n, _)   => Ok(Value::Number(*n)),
        Expr::Str(s, _)      => Ok(Value::Str(s.clone())),
        Expr::Bool(b, _)     => Ok(Value::Bool(*b)),
        Expr::HexColor(s, _) => Ok(Value::Str(s.clone())),
        Expr::NamedColor(name, _) => {
            // a parameter called `red` wins over the color
            match ctx.scope.get_parameter(name) {
                Ok(v) => Ok(v.clone()),
                Err(_) => Ok(Value::Str(name.clone())),
            }
        }
        Expr::Ident(name, _) => ctx.scope.get_parameter(name).cloned(),

        Expr::Binary { left, op, right, .. } => {
            let l = eval(ctx, left)?;
            let r = eval(ctx, right)?;
            binary(*op, l, r)
        }
        Expr::Unary { op, operand, .. } => {
            let v = eval(ctx, operand)?;
            match op {
                UnOp::Neg => Ok(Value::Number(-v.as_number()?)),
                UnOp::Not => Ok(Value::Bool(!v.is_truthy())),
            }
        }
        Expr::Compare { left, op, right, .. } => {
            let l = eval(ctx, left)?;
            let r = eval(ctx, right)?;
            compare(*op, &l, &r).map(Value::Bool)
        }
        Expr::Logical { left, op, right, .. } => {
            let l = eval(ctx, left)?.is_truthy();
            let result = match op {
                LogicOp::And => l && eval(ctx, right)?.is_truthy(),
                LogicOp::Or  => l || eval(ctx, right)?.is_truthy(),
            };
            Ok(Value::Bool(result))
        }
        Expr::Ternary { condition, then_expr, else_expr, .. } => {
            if eval(ctx, condition)?.is_truthy() {
                eval(ctx, then_expr)
            } else {
                eval(ctx, else_expr)
            }
        }

        Expr::Array(items, _) => {
            let values = items.iter().map(|e| eval(ctx, e)).collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(values))
        }
        Expr::Index { expr, index, .. } => {
            let target = eval(ctx, expr)?;
            let index = eval(ctx, index)?.as_number()?;
            index_value(&target, index)
        }
        Expr::Call { callee, args, .. } => {
            let args = args.iter().map(|e| eval(ctx, e)).collect::<Result<Vec<_>>>()?;
            call(ctx, callee, args)
        }
        Expr::Property { object, property, .. } => shape_property(ctx, object, property),
    }
}

// ─── Operators ───────────────────────────────────────────────────────────────

fn binary(op: BinOp, l: Value, r: Value) -> Result<Value> {
    if op == BinOp::Add && (matches!(l, Value::Str(_)) || matches!(r, Value::Str(_))) {
        return Ok(Value::Str(format!("{l}{r}")));
    }
    let (a, b) = (l.as_number()?, r.as_number()?);
    let n = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 { return Err(Error::division_by_zero()); }
            a / b
        }
        BinOp::Mod => {
            if b == 0.0 { return Err(Error::Arithmetic("Modulo by zero".into())); }
            a % b
        }
    };
    Ok(Value::Number(n))
}

fn compare(op: CmpOp, l: &Value, r: &Value) -> Result<bool> {
    match op {
        CmpOp::Eq    => return Ok(l == r),
        CmpOp::NotEq => return Ok(l != r),
        _ => {}
    }
    let ordering = match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b))       => Some(a.cmp(b)),
        _ => {
            return Err(Error::value(format!(
                "cannot compare {} with {}", l.type_name(), r.type_name()
            )))
        }
    };
    let Some(ordering) = ordering else { return Ok(false) };
    Ok(match op {
        CmpOp::Lt   => ordering.is_lt(),
        CmpOp::LtEq => ordering.is_le(),
        CmpOp::Gt   => ordering.is_gt(),
        CmpOp::GtEq => ordering.is_ge(),
        CmpOp::Eq | CmpOp::NotEq => unreachable!(),
    })
}

fn index_value(target: &Value, index: f64) -> Result<Value> {
    if index < 0.0 || index.fract() != 0.0 {
        return Err(Error::value(format!("invalid index {index}")));
    }
    let i = index as usize;
    match target {
        Value::Array(items) => items.get(i).cloned()
            .ok_or_else(|| Error::value(format!("index {i} out of bounds for array of length {}", items.len()))),
        Value::Str(s) => s.chars().nth(i)
            .map(|c| Value::Str(c.to_string()))
            .ok_or_else(|| Error::value(format!("index {i} out of bounds for string of length {}", s.chars().count()))),
        other => Err(Error::value(format!("cannot index into {}", other.type_name()))),
    }
}

// ─── Calls and references ────────────────────────────────────────────────────

/// User functions shadow built-ins.
fn call(ctx: &mut EvalContext, name: &str, args: Vec<Value>) -> Result<Value> {
    if ctx.scope.has_function(name) {
        return call_function(ctx, name, args);
    }
    match builtins::call(name, &args) {
        Some(result) => result,
        None => Err(Error::name(NameKind::Function, name)),
    }
}

fn shape_property(ctx: &EvalContext, object: &str, property: &str) -> Result<Value> {
    let id = ctx.resolve_shape(object).ok_or_else(|| Error::name(NameKind::Shape, object))?;
    let shape = ctx.scope.get_shape(&id)?;
    let t = &shape.transform;
    Ok(match property {
        "x"        => Value::Number(t.position.0),
        "y"        => Value::Number(t.position.1),
        "rotation" => Value::Number(t.rotation),
        "position" => Value::point(t.position.0, t.position.1),
        "scale"    => Value::point(t.scale.0, t.scale.1),
        _ => shape.param(property).cloned().unwrap_or(Value::Null),
    })
}

//! Math functions available to every script. Angles are in degrees.

use crate::error::{Error, NameKind, Result};
use crate::runtime::value::Value;

pub const BUILTINS: &[&str] = &[
    "sin", "cos", "tan", "sqrt", "abs", "floor", "ceil", "round", "min", "max", "pow", "atan2",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// `None` when `name` is not a built-in.
pub fn call(name: &str, args: &[Value]) -> Option<Result<Value>> {
    if !is_builtin(name) {
        return None;
    }
    Some(dispatch(name, args))
}

fn dispatch(name: &str, args: &[Value]) -> Result<Value> {
    let n = match name {
        "sin"   => { check_argc(name, args, 1)?; num(&args[0])?.to_radians().sin() }
        "cos"   => { check_argc(name, args, 1)?; num(&args[0])?.to_radians().cos() }
        "tan"   => { check_argc(name, args, 1)?; num(&args[0])?.to_radians().tan() }
        "sqrt"  => { check_argc(name, args, 1)?; num(&args[0])?.sqrt() }
        "abs"   => { check_argc(name, args, 1)?; num(&args[0])?.abs() }
        "floor" => { check_argc(name, args, 1)?; num(&args[0])?.floor() }
        "ceil"  => { check_argc(name, args, 1)?; num(&args[0])?.ceil() }
        "round" => { check_argc(name, args, 1)?; num(&args[0])?.round() }
        "min"   => { check_argc(name, args, 2)?; num(&args[0])?.min(num(&args[1])?) }
        "max"   => { check_argc(name, args, 2)?; num(&args[0])?.max(num(&args[1])?) }
        "pow"   => { check_argc(name, args, 2)?; num(&args[0])?.powf(num(&args[1])?) }
        "atan2" => { check_argc(name, args, 2)?; num(&args[0])?.atan2(num(&args[1])?).to_degrees() }
        _ => return Err(Error::name(NameKind::Function, name)),
    };
    Ok(Value::Number(n))
}

fn num(v: &Value) -> Result<f64> {
    v.as_number()
}

fn check_argc(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        Err(Error::Arity { function: name.to_string(), expected, found: args.len() })
    } else {
        Ok(())
    }
}

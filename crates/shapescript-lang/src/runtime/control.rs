//! `if`, `for`, `def` and function calls.

use tracing::debug;

use crate::error::{Error, Result};
use crate::runtime::expr::eval;
use crate::runtime::interpreter::{EvalContext, Flow, exec_block};
use crate::runtime::scope::FunctionDef;
use crate::runtime::value::{Value, format_number};
use crate::syntax::ast::{FnDef, ForStmt, IfStmt};
use crate::types::shape::Qualifier;

/// Slack on the inclusive upper bound so `0 to 1 step 0.1` reaches 1.
const LOOP_EPSILON: f64 = 1e-9;

pub fn exec_if(ctx: &mut EvalContext, stmt: &IfStmt) -> Result<Flow> {
    if eval(ctx, &stmt.condition)?.is_truthy() {
        exec_block(ctx, &stmt.then_block)
    } else if let Some(else_block) = &stmt.else_block {
        exec_block(ctx, else_block)
    } else {
        Ok(Flow::Continue(Value::Null))
    }
}

/// Inclusive counting loop. Runs in the enclosing frame: the counter and
/// anything the body binds stay visible after the loop.
pub fn exec_for(ctx: &mut EvalContext, stmt: &ForStmt) -> Result<Flow> {
    let start = eval(ctx, &stmt.start)?.as_number()?;
    let end = eval(ctx, &stmt.end)?.as_number()?;
    let step = match &stmt.step {
        Some(e) => eval(ctx, e)?.as_number()?,
        None => 1.0,
    };
    if step == 0.0 {
        return Err(Error::Arithmetic("Loop step cannot be zero".into()));
    }

    let in_range = |i: f64| if step > 0.0 { i <= end + LOOP_EPSILON } else { i >= end - LOOP_EPSILON };

    let mut last = Value::Null;
    let mut k = 0u64;
    loop {
        // computed from the start each time so float steps do not drift
        let i = start + k as f64 * step;
        if !in_range(i) {
            break;
        }
        ctx.scope.set_parameter(&stmt.var, Value::Number(i));
        ctx.qualifiers.push(Qualifier::Loop(format_number(i)));
        let flow = exec_block(ctx, &stmt.body);
        ctx.qualifiers.pop();

        match flow? {
            Flow::Continue(v) => last = v,
            ret @ Flow::Return(_) => return Ok(ret),
        }
        k += 1;
    }
    Ok(Flow::Continue(last))
}

pub fn exec_def(ctx: &mut EvalContext, def: &FnDef) -> Result<Flow> {
    debug!(name = %def.name, params = def.params.len(), "define function");
    ctx.scope.define_function(&def.name, FunctionDef {
        params: def.params.clone(),
        body: def.body.clone(),
    });
    Ok(Flow::Continue(Value::Null))
}

/// Call a user function. The call frame's parent is the frame the function
/// was defined in, not the caller's.
pub fn call_function(ctx: &mut EvalContext, name: &str, args: Vec<Value>) -> Result<Value> {
    let (def, defined_in) = ctx.scope.get_function(name)?;
    if args.len() != def.params.len() {
        return Err(Error::Arity {
            function: name.to_string(),
            expected: def.params.len(),
            found: args.len(),
        });
    }

    let call_id = {
        let n = ctx.call_counts.entry(name.to_string()).or_insert(0);
        *n += 1;
        *n
    };

    ctx.scope.push_scope(defined_in);
    for (param, arg) in def.params.iter().zip(args) {
        ctx.scope.set_parameter(param, arg);
    }
    ctx.qualifiers.push(Qualifier::Call { function: name.to_string(), call_id });
    let flow = exec_block(ctx, &def.body);
    ctx.qualifiers.pop();
    ctx.scope.pop_scope();

    Ok(match flow? {
        Flow::Return(v) => v,
        Flow::Continue(_) => Value::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::BooleanEngine;
    use crate::runtime::interpreter::exec_stmt;
    use crate::syntax::ast::Stmt;
    use crate::syntax::{lexer::Lexer, parser::Parser};

    fn exec(ctx: &mut EvalContext, src: &str) -> Result<()> {
        let tokens = Lexer::new(src).tokenize()?;
        let program: Vec<Stmt> = Parser::new(tokens).parse()?;
        for stmt in &program {
            exec_stmt(ctx, stmt)?;
        }
        Ok(())
    }

    fn ctx() -> EvalContext {
        EvalContext::new(BooleanEngine::default())
    }

    fn param(ctx: &EvalContext, name: &str) -> Value {
        ctx.scope.get_parameter(name).cloned().unwrap()
    }

    #[test]
    fn loops_are_inclusive() {
        let mut c = ctx();
        exec(&mut c, "param total 0\nfor i from 1 to 4 { param total total + i }").unwrap();
        assert_eq!(param(&c, "total"), Value::Number(10.0));
        assert_eq!(param(&c, "i"), Value::Number(4.0));
    }

    #[test]
    fn negative_and_fractional_steps() {
        let mut c = ctx();
        exec(&mut c, "param n 0\nfor i from 3 to 1 step -1 { param n n + 1 }").unwrap();
        assert_eq!(param(&c, "n"), Value::Number(3.0));

        exec(&mut c, "param m 0\nfor j from 0 to 1 step 0.1 { param m m + 1 }").unwrap();
        assert_eq!(param(&c, "m"), Value::Number(11.0));
    }

    #[test]
    fn zero_step_is_an_error() {
        let mut c = ctx();
        assert_eq!(
            exec(&mut c, "for i from 0 to 3 step 0 { }"),
            Err(Error::Arithmetic("Loop step cannot be zero".into()))
        );
    }

    #[test]
    fn empty_range_runs_nothing() {
        let mut c = ctx();
        exec(&mut c, "param n 0\nfor i from 5 to 1 { param n 1 }").unwrap();
        assert_eq!(param(&c, "n"), Value::Number(0.0));
    }

    #[test]
    fn functions_return_values() {
        let mut c = ctx();
        exec(&mut c, "def dbl(n) { return n * 2 }\nparam p dbl(5)").unwrap();
        assert_eq!(param(&c, "p"), Value::Number(10.0));
        assert_eq!(c.scope.depth(), 1);
        assert!(!c.scope.has_parameter("n"));
    }

    #[test]
    fn return_stops_the_body() {
        let mut c = ctx();
        exec(&mut c, "def f(x) { if x > 0 { return 1 } return 2 }\nparam a f(3)\nparam b f(-3)").unwrap();
        assert_eq!(param(&c, "a"), Value::Number(1.0));
        assert_eq!(param(&c, "b"), Value::Number(2.0));
    }

    #[test]
    fn missing_return_yields_null() {
        let mut c = ctx();
        exec(&mut c, "def f() { param local 1 }\nparam r f()").unwrap();
        assert_eq!(param(&c, "r"), Value::Null);
    }

    #[test]
    fn arity_mismatch() {
        let mut c = ctx();
        assert_eq!(
            exec(&mut c, "def f(a, b) { return a }\nparam r f(1)"),
            Err(Error::Arity { function: "f".into(), expected: 2, found: 1 })
        );
    }

    #[test]
    fn recursion() {
        let mut c = ctx();
        exec(&mut c, "def fact(n) { return n <= 1 ? 1 : n * fact(n - 1) }\nparam r fact(5)").unwrap();
        assert_eq!(param(&c, "r"), Value::Number(120.0));
        assert_eq!(c.call_counts["fact"], 5);
    }

    #[test]
    fn user_functions_shadow_builtins() {
        let mut c = ctx();
        exec(&mut c, "def sqrt(x) { return 0 }\nparam r sqrt(16)").unwrap();
        assert_eq!(param(&c, "r"), Value::Number(0.0));
    }
}

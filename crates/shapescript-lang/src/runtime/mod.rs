pub mod boolean;
pub mod builtins;
pub mod control;
pub mod draw;
pub mod expr;
pub mod interpreter;
pub mod scope;
pub mod shapes;
pub mod turtle;
pub mod value;

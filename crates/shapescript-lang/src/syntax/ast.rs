use crate::csg::BooleanOp;
use crate::types::constraint::ConstraintKind;
use crate::types::shape::ShapeKind;

/// Source location attached to every node for error reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ─── Statements ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `param size 50`
    Param(ParamStmt),
    /// `shape circle c { radius: 10 }`
    Shape(ShapeStmt),
    /// `layer bg { add a rotate 45 }`
    Layer(LayerStmt),
    /// `transform c { position: [10, 0] if flag }`
    Transform(TransformStmt),
    /// `if ... { } else { }`
    If(IfStmt),
    /// `for i from 0 to 10 step 2 { }`
    For(ForStmt),
    /// `def f(a, b) { ... }`
    FnDef(FnDef),
    /// `return expr` or bare `return`
    Return(Option<Expr>, Span),
    /// A standalone expression used as a statement (e.g. a function call).
    Expr(Expr),
    /// `draw outline { forward 10 right 90 ... }`
    Draw(DrawStmt),
    /// One turtle command; only meaningful inside a `draw` body.
    DrawCommand(DrawCommand),
    /// `union u { add a add b }`
    Boolean(BooleanStmt),
    /// `fill c red`
    Fill(FillStmt),
    /// `style c { strokeWidth: 2 }`
    Style(StyleStmt),
    /// `constraints { coincident a.center b.center }`
    Constraints(ConstraintsStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamStmt {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStmt {
    pub kind: ShapeKind,
    /// `None` → generated from the kind (`circle_1`).
    pub name: Option<String>,
    pub props: Vec<Property>,
    pub span: Span,
}

/// `name: value`, or a bare flag such as `filled`.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerStmt {
    pub name: String,
    pub commands: Vec<LayerCommand>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerCommand {
    Add(String, Span),
    Subtract(String, Span),
    Rotate(Expr),
    Scale(Expr),
    Position(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformStmt {
    pub target: String,
    pub ops: Vec<TransformOp>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Position,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformOp {
    pub kind: TransformKind,
    pub value: Expr,
    /// `scale 2 if big`
    pub condition: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Vec<Stmt>,
    /// `else if` chains nest here as a single `If` statement.
    pub else_block: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub var: String,
    pub start: Expr,
    pub end: Expr,
    pub step: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawStmt {
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurtleCommand {
    Forward,
    Backward,
    Right,
    Left,
    Goto,
    Penup,
    Pendown,
}

impl TurtleCommand {
    pub fn takes_argument(self) -> bool {
        !matches!(self, Self::Penup | Self::Pendown)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub command: TurtleCommand,
    pub arg: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanStmt {
    pub op: BooleanOp,
    pub name: String,
    pub operands: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillStmt {
    pub target: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleStmt {
    pub target: String,
    pub props: Vec<Property>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintsStmt {
    pub items: Vec<ConstraintDecl>,
    pub span: Span,
}

/// `distance a.right b.left 20`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    pub kind: ConstraintKind,
    pub a: (String, String),
    pub b: (String, String),
    pub distance: Option<Expr>,
    pub span: Span,
}

// ─── Expressions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64, Span),
    Str(String, Span),
    Bool(bool, Span),
    /// With leading `#`.
    HexColor(String, Span),
    /// `red`, `gray`; a parameter of the same name wins at evaluation.
    NamedColor(String, Span),
    Ident(String, Span),

    /// `a + b`, `a % b`
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `not x`, `-x`
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        span: Span,
    },

    /// `a < b`
    Compare {
        left: Box<Expr>,
        op: CmpOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `a and b`, short-circuiting
    Logical {
        left: Box<Expr>,
        op: LogicOp,
        right: Box<Expr>,
        span: Span,
    },

    /// `cond ? then : else`
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        span: Span,
    },

    /// `[1, 2, 3]`
    Array(Vec<Expr>, Span),

    /// `expr[index]`
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },

    /// `name(args)`
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },

    /// `shape.prop`
    Property {
        object: String,
        property: String,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, s)
            | Expr::Str(_, s)
            | Expr::Bool(_, s)
            | Expr::HexColor(_, s)
            | Expr::NamedColor(_, s)
            | Expr::Ident(_, s)
            | Expr::Array(_, s) => *s,
            Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Compare { span, .. }
            | Expr::Logical { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Index { span, .. }
            | Expr::Call { span, .. }
            | Expr::Property { span, .. } => *span,
        }
    }
}

// ─── Operators ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add, Sub, Mul, Div, Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq, NotEq, Lt, LtEq, Gt, GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And, Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

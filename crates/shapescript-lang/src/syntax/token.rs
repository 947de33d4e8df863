use crate::types::color::named_color_hex;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Bool(bool),
    Ident(String),
    StringLit(String),
    HexColor(String),  // with leading `#` — "#f00", "#ff000080"
    ColorName(String), // "red", "gray", ...

    // Statement keywords
    Param,
    Shape,
    Layer,
    Transform,
    Add,
    Subtract,
    Rotate,
    Scale,
    Position,
    If,
    Else,
    For,
    From,
    To,
    Step,
    Def,
    Return,
    Union,
    Difference,
    Intersection,
    Draw,
    Forward,
    Backward,
    Right,
    Left,
    Goto,
    Penup,
    Pendown,
    Constraints,
    Coincident,
    Distance,
    Horizontal,
    Vertical,
    Fill,
    Style,

    // Logical keywords
    And,
    Or,
    Not,

    // Style property keywords
    Filled,
    FillColor,
    Color,
    Stroke,
    StrokeColor,
    StrokeWidth,
    Opacity,
    Alpha,
    Transparent,
    Visible,
    Hidden,

    // Operators
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Percent,  // %
    Eq,       // =
    EqEq,     // ==
    BangEq,   // !=
    Lt,       // <
    LtEq,     // <=
    Gt,       // >
    GtEq,     // >=
    Question, // ?

    // Punctuation
    Colon,    // :
    Comma,    // ,
    Dot,      // .
    LParen,   // (
    RParen,   // )
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]

    Eof,
}

impl TokenKind {
    /// Keywords that may also name a shape property inside `{ ... }` blocks.
    pub fn property_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Fill        => "fill",
            Self::Filled      => "filled",
            Self::FillColor   => "fillColor",
            Self::Color       => "color",
            Self::Stroke      => "stroke",
            Self::StrokeColor => "strokeColor",
            Self::StrokeWidth => "strokeWidth",
            Self::Opacity     => "opacity",
            Self::Alpha       => "alpha",
            Self::Transparent => "transparent",
            Self::Visible     => "visible",
            Self::Hidden      => "hidden",
            Self::Position    => "position",
            Self::Scale       => "scale",
            Self::Rotate      => "rotate",
            Self::Distance    => "distance",
            Self::Step        => "step",
            _ => return None,
        })
    }

    /// Source spelling of a keyword token.
    pub fn keyword_text(&self) -> Option<&'static str> {
        KEYWORDS.iter().find(|(_, kind)| kind == self).map(|(word, _)| *word)
    }

    /// Tokens the parser's recovery scan stops at.
    pub fn is_sync_point(&self) -> bool {
        matches!(self, Self::RBrace | Self::Shape | Self::Layer | Self::Param | Self::Eof)
    }
}

/// Keyword table. Anything not listed is a named color or an identifier.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("param",        TokenKind::Param),
    ("shape",        TokenKind::Shape),
    ("layer",        TokenKind::Layer),
    ("transform",    TokenKind::Transform),
    ("add",          TokenKind::Add),
    ("subtract",     TokenKind::Subtract),
    ("rotate",       TokenKind::Rotate),
    ("scale",        TokenKind::Scale),
    ("position",     TokenKind::Position),
    ("if",           TokenKind::If),
    ("else",         TokenKind::Else),
    ("true",         TokenKind::Bool(true)),
    ("false",        TokenKind::Bool(false)),
    ("and",          TokenKind::And),
    ("or",           TokenKind::Or),
    ("not",          TokenKind::Not),
    ("for",          TokenKind::For),
    ("from",         TokenKind::From),
    ("to",           TokenKind::To),
    ("step",         TokenKind::Step),
    ("def",          TokenKind::Def),
    ("return",       TokenKind::Return),
    ("union",        TokenKind::Union),
    ("difference",   TokenKind::Difference),
    ("intersection", TokenKind::Intersection),
    ("draw",         TokenKind::Draw),
    ("forward",      TokenKind::Forward),
    ("backward",     TokenKind::Backward),
    ("right",        TokenKind::Right),
    ("left",         TokenKind::Left),
    ("goto",         TokenKind::Goto),
    ("penup",        TokenKind::Penup),
    ("pendown",      TokenKind::Pendown),
    ("constraints",  TokenKind::Constraints),
    ("coincident",   TokenKind::Coincident),
    ("distance",     TokenKind::Distance),
    ("horizontal",   TokenKind::Horizontal),
    ("vertical",     TokenKind::Vertical),
    ("fill",         TokenKind::Fill),
    ("filled",       TokenKind::Filled),
    ("fillColor",    TokenKind::FillColor),
    ("color",        TokenKind::Color),
    ("stroke",       TokenKind::Stroke),
    ("strokeColor",  TokenKind::StrokeColor),
    ("strokeWidth",  TokenKind::StrokeWidth),
    ("opacity",      TokenKind::Opacity),
    ("alpha",        TokenKind::Alpha),
    ("transparent",  TokenKind::Transparent),
    ("visible",      TokenKind::Visible),
    ("hidden",       TokenKind::Hidden),
    ("style",        TokenKind::Style),
];

/// Maps an identifier string to its keyword or color-name token, or returns `Ident`.
pub fn keyword_or_ident(s: String) -> TokenKind {
    if let Some((_, kind)) = KEYWORDS.iter().find(|(word, _)| *word == s) {
        return kind.clone();
    }
    if named_color_hex(&s).is_some() {
        return TokenKind::ColorName(s);
    }
    TokenKind::Ident(s)
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

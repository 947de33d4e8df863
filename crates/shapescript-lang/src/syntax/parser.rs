use crate::csg::BooleanOp;
use crate::error::{Error, ErrorCode, SyntaxError};
use crate::syntax::ast::*;
use crate::syntax::token::{Token, TokenKind};
use crate::types::constraint::ConstraintKind;
use crate::types::shape::ShapeKind;

/// Properties that may be written without a value (`filled`, `hidden`).
const FLAG_PROPERTIES: &[&str] = &["filled", "hidden", "visible", "transparent"];

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// A stream that does not end in `Eof` gets one after its last token.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenKind::Eof, line, column));
        }
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream. Stops at the first error.
    pub fn parse(mut self) -> Result<Vec<Stmt>, Error> {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    // Positions the cursor at the next statement boundary;
                    // only the first error is ever reported.
                    self.recover();
                    return Err(e);
                }
            }
        }
        Ok(stmts)
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_block(&mut self) -> Result<Vec<Stmt>, Error> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, Error> {
        match self.peek_kind() {
            TokenKind::Param        => self.parse_param(),
            TokenKind::Shape        => self.parse_shape(),
            TokenKind::Layer        => self.parse_layer(),
            TokenKind::Transform    => self.parse_transform(),
            TokenKind::If           => self.parse_if(),
            TokenKind::For          => self.parse_for(),
            TokenKind::Def          => self.parse_def(),
            TokenKind::Return       => self.parse_return(),
            TokenKind::Draw         => self.parse_draw(),
            TokenKind::Union        => self.parse_boolean(BooleanOp::Union),
            TokenKind::Difference   => self.parse_boolean(BooleanOp::Difference),
            TokenKind::Intersection => self.parse_boolean(BooleanOp::Intersection),
            TokenKind::Fill         => self.parse_fill(),
            TokenKind::Style        => self.parse_style(),
            TokenKind::Constraints  => self.parse_constraints(),

            TokenKind::Forward  => self.parse_draw_command(TurtleCommand::Forward),
            TokenKind::Backward => self.parse_draw_command(TurtleCommand::Backward),
            TokenKind::Right    => self.parse_draw_command(TurtleCommand::Right),
            TokenKind::Left     => self.parse_draw_command(TurtleCommand::Left),
            TokenKind::Goto     => self.parse_draw_command(TurtleCommand::Goto),
            TokenKind::Penup    => self.parse_draw_command(TurtleCommand::Penup),
            TokenKind::Pendown  => self.parse_draw_command(TurtleCommand::Pendown),

            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    /// `param name [=|:] expr`
    fn parse_param(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Param)?;
        let name = self.expect_ident()?;
        if !self.matches(TokenKind::Eq) {
            self.matches(TokenKind::Colon);
        }
        let value = self.parse_expr()?;
        Ok(Stmt::Param(ParamStmt { name, value, span }))
    }

    /// `shape <type> [name] { ... }` or `shape <name> <type> { ... }`
    fn parse_shape(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Shape)?;

        let first_tok = self.peek().clone();
        let first = self.expect_ident()?;
        let second = if self.is_name_token() { Some(self.expect_ident()?) } else { None };

        let (kind, name) = match (ShapeKind::from_name(&first), second) {
            (Some(kind), name) => (kind, name),
            (None, Some(second)) => match ShapeKind::from_name(&second) {
                Some(kind) => (kind, Some(first)),
                None => return Err(self.error_at(&first_tok, &format!("unknown shape type '{second}'"))),
            },
            (None, None) => return Err(self.error_at(&first_tok, &format!("unknown shape type '{first}'"))),
        };

        let props = if self.check(TokenKind::LBrace) { self.parse_properties()? } else { Vec::new() };
        Ok(Stmt::Shape(ShapeStmt { kind, name, props, span }))
    }

    /// `{ name[:] value [,] ... }`
    fn parse_properties(&mut self) -> Result<Vec<Property>, Error> {
        self.expect(TokenKind::LBrace)?;
        let mut props = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let span = self.span();
            let tok = self.advance();
            let name = match &tok.kind {
                TokenKind::Ident(s) => s.clone(),
                kind => match kind.property_name() {
                    Some(name) => name.to_string(),
                    None => return Err(self.error_at(&tok, &format!("expected property name, found {:?}", tok.kind))),
                },
            };

            let value = if self.matches(TokenKind::Colon) {
                Some(self.parse_expr()?)
            } else if FLAG_PROPERTIES.contains(&name.as_str()) {
                // bare flag unless an explicit boolean follows
                match self.peek_kind() {
                    TokenKind::Bool(_) => Some(self.parse_expr()?),
                    _ => None,
                }
            } else {
                Some(self.parse_expr()?)
            };

            props.push(Property { name, value, span });
            self.matches(TokenKind::Comma);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(props)
    }

    /// `layer name { add s | subtract s | rotate e | scale e | position e }`
    fn parse_layer(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Layer)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;
        let mut commands = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let span = self.span();
            let command = match self.peek_kind() {
                TokenKind::Add      => { self.advance(); LayerCommand::Add(self.expect_ident()?, span) }
                TokenKind::Subtract => { self.advance(); LayerCommand::Subtract(self.expect_ident()?, span) }
                TokenKind::Rotate   => { self.advance(); self.matches(TokenKind::Colon); LayerCommand::Rotate(self.parse_expr()?) }
                TokenKind::Scale    => { self.advance(); self.matches(TokenKind::Colon); LayerCommand::Scale(self.parse_expr()?) }
                TokenKind::Position => { self.advance(); self.matches(TokenKind::Colon); LayerCommand::Position(self.parse_expr()?) }
                _ => return Err(self.unexpected("layer operation")),
            };
            commands.push(command);
            self.matches(TokenKind::Comma);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::Layer(LayerStmt { name, commands, span }))
    }

    /// `transform name { scale 2 if big  rotate: 45  position [0, 10] }`
    fn parse_transform(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Transform)?;
        let target = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;
        let mut ops = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let span = self.span();
            let kind = match self.peek_kind() {
                TokenKind::Position => TransformKind::Position,
                TokenKind::Rotate   => TransformKind::Rotate,
                TokenKind::Scale    => TransformKind::Scale,
                _ => return Err(self.unexpected("scale, rotate or position")),
            };
            self.advance();
            self.matches(TokenKind::Colon);
            let value = self.parse_expr()?;
            let condition = if self.matches(TokenKind::If) { Some(self.parse_expr()?) } else { None };
            ops.push(TransformOp { kind, value, condition, span });
            self.matches(TokenKind::Comma);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::Transform(TransformStmt { target, ops, span }))
    }

    fn parse_if(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::If)?;
        let condition = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let else_block = if self.matches(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If(IfStmt { condition, then_block, else_block, span }))
    }

    /// `for i from a to b [step s] { }`
    fn parse_for(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::For)?;
        let var = self.expect_ident()?;
        self.expect(TokenKind::From)?;
        let start = self.parse_expr()?;
        self.expect(TokenKind::To)?;
        let end = self.parse_expr()?;
        let step = if self.matches(TokenKind::Step) { Some(self.parse_expr()?) } else { None };
        let body = self.parse_block()?;
        Ok(Stmt::For(ForStmt { var, start, end, step, body, span }))
    }

    fn parse_def(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Def)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            params.push(self.expect_ident()?);
            if !self.matches(TokenKind::Comma) { break; }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::FnDef(FnDef { name, params, body, span }))
    }

    fn parse_return(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Return)?;
        let value = if self.check(TokenKind::RBrace) || self.is_at_end() {
            None
        } else {
            Some(self.parse_expr()?)
        };
        Ok(Stmt::Return(value, span))
    }

    /// `draw [name] { ... }`
    fn parse_draw(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Draw)?;
        let name = if self.is_name_token() { Some(self.expect_ident()?) } else { None };
        let body = self.parse_block()?;
        Ok(Stmt::Draw(DrawStmt { name, body, span }))
    }

    /// `forward e`, `goto e` / `goto x, y`, `penup`
    fn parse_draw_command(&mut self, command: TurtleCommand) -> Result<Stmt, Error> {
        let span = self.span();
        self.advance();
        let arg = if command.takes_argument() {
            let first = self.parse_expr()?;
            if command == TurtleCommand::Goto && self.matches(TokenKind::Comma) {
                let second = self.parse_expr()?;
                Some(Expr::Array(vec![first, second], span))
            } else {
                Some(first)
            }
        } else {
            None
        };
        Ok(Stmt::DrawCommand(DrawCommand { command, arg, span }))
    }

    /// `union name { add a add b ... }`
    fn parse_boolean(&mut self, op: BooleanOp) -> Result<Stmt, Error> {
        let span = self.span();
        self.advance();
        let name = self.expect_ident()?;
        let block = self.peek().clone();
        self.expect(TokenKind::LBrace)?;
        let mut operands = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            self.expect(TokenKind::Add)?;
            operands.push(self.expect_ident()?);
            self.matches(TokenKind::Comma);
        }
        self.expect(TokenKind::RBrace)?;
        if operands.len() < 2 {
            return Err(self.error_at(&block, &format!("{op} needs at least two shapes")));
        }
        Ok(Stmt::Boolean(BooleanStmt { op, name, operands, span }))
    }

    /// `fill shape value`
    fn parse_fill(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Fill)?;
        let target = self.expect_ident()?;
        let value = self.parse_expr()?;
        Ok(Stmt::Fill(FillStmt { target, value, span }))
    }

    fn parse_style(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Style)?;
        let target = self.expect_ident()?;
        let props = self.parse_properties()?;
        Ok(Stmt::Style(StyleStmt { target, props, span }))
    }

    /// `constraints { <kind> a.anchor b.anchor [distance] ... }`
    fn parse_constraints(&mut self) -> Result<Stmt, Error> {
        let span = self.span();
        self.expect(TokenKind::Constraints)?;
        self.expect(TokenKind::LBrace)?;
        let mut items = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let span = self.span();
            let kind = match self.peek_kind() {
                TokenKind::Coincident => ConstraintKind::Coincident,
                TokenKind::Distance   => ConstraintKind::Distance,
                TokenKind::Horizontal => ConstraintKind::Horizontal,
                TokenKind::Vertical   => ConstraintKind::Vertical,
                _ => return Err(self.unexpected("constraint kind")),
            };
            self.advance();
            let a = self.parse_anchor()?;
            let b = self.parse_anchor()?;
            let distance = if self.starts_constraint() { None } else { Some(self.parse_expr()?) };
            items.push(ConstraintDecl { kind, a, b, distance, span });
            self.matches(TokenKind::Comma);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::Constraints(ConstraintsStmt { items, span }))
    }

    fn parse_anchor(&mut self) -> Result<(String, String), Error> {
        let shape = self.expect_ident()?;
        self.expect(TokenKind::Dot)?;
        let anchor = self.expect_member()?;
        Ok((shape, anchor))
    }

    fn starts_constraint(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Coincident | TokenKind::Distance | TokenKind::Horizontal
                | TokenKind::Vertical | TokenKind::RBrace | TokenKind::Comma | TokenKind::Eof
        )
    }

    // ─── Expressions (precedence climbing) ───────────────────────────────────

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, Error> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Or) {
            let span = left.span();
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Logical { left: Box::new(left), op: LogicOp::Or, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_ternary()?;
        while self.check(TokenKind::And) {
            let span = left.span();
            self.advance();
            let right = self.parse_ternary()?;
            left = Expr::Logical { left: Box::new(left), op: LogicOp::And, right: Box::new(right), span };
        }
        Ok(left)
    }

    /// Right-associative: `a ? b : c ? d : e` is `a ? b : (c ? d : e)`.
    fn parse_ternary(&mut self) -> Result<Expr, Error> {
        let condition = self.parse_comparison()?;
        if !self.matches(TokenKind::Question) {
            return Ok(condition);
        }
        let span = condition.span();
        let then_expr = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_ternary()?;
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            span,
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq   => CmpOp::Eq,
                TokenKind::BangEq => CmpOp::NotEq,
                TokenKind::Lt     => CmpOp::Lt,
                TokenKind::LtEq   => CmpOp::LtEq,
                TokenKind::Gt     => CmpOp::Gt,
                TokenKind::GtEq   => CmpOp::GtEq,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_additive()?;
            left = Expr::Compare { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus  => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star    => BinOp::Mul,
                TokenKind::Slash   => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, Error> {
        let span = self.span();
        if self.matches(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary { op: UnOp::Neg, operand: Box::new(operand), span });
        }
        if self.matches(TokenKind::Not) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary { op: UnOp::Not, operand: Box::new(operand), span });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, Error> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                // index: expr[i], nests as expr[i][j]
                TokenKind::LBracket => {
                    let span = expr.span();
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index { expr: Box::new(expr), index: Box::new(index), span };
                }

                // property of a named shape: s.radius
                TokenKind::Dot => {
                    let span = expr.span();
                    let object = match expr {
                        Expr::Ident(name, _) | Expr::NamedColor(name, _) => name,
                        _ => return Err(self.unexpected("end of expression")),
                    };
                    self.advance();
                    let property = self.expect_member()?;
                    expr = Expr::Property { object, property, span };
                }

                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let tok = self.peek().clone();
        let span = Span::new(tok.line, tok.column);

        match tok.kind {
            TokenKind::Number(v)    => { self.advance(); Ok(Expr::Number(v, span)) }
            TokenKind::Bool(v)      => { self.advance(); Ok(Expr::Bool(v, span)) }
            TokenKind::StringLit(s) => { self.advance(); Ok(Expr::Str(s, span)) }
            TokenKind::HexColor(s)  => { self.advance(); Ok(Expr::HexColor(s, span)) }
            TokenKind::ColorName(s) => { self.advance(); Ok(Expr::NamedColor(s, span)) }

            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }

            // array literal
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(TokenKind::RBracket) && !self.is_at_end() {
                    items.push(self.parse_expr()?);
                    if !self.matches(TokenKind::Comma) { break; }
                }
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::Array(items, span))
            }

            TokenKind::Ident(name) => {
                self.advance();
                if self.matches(TokenKind::LParen) {
                    let mut args = Vec::new();
                    while !self.check(TokenKind::RParen) && !self.is_at_end() {
                        args.push(self.parse_expr()?);
                        if !self.matches(TokenKind::Comma) { break; }
                    }
                    self.expect(TokenKind::RParen)?;
                    Ok(Expr::Call { callee: name, args, span })
                } else {
                    Ok(Expr::Ident(name, span))
                }
            }

            _ => Err(self.unexpected("expression")),
        }
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() { self.pos += 1; }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) { self.advance(); true } else { false }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(Error::Parse(SyntaxError::new(
                ErrorCode::P002,
                tok.line,
                tok.column,
                format!("expected {:?}, found {:?}", kind, tok.kind),
            )))
        }
    }

    /// Names of params, shapes, layers and functions. Color words are
    /// accepted so a shape may be called `red`.
    fn expect_ident(&mut self) -> Result<String, Error> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Ident(s) | TokenKind::ColorName(s) => Ok(s),
            _ => Err(self.error_at(&tok, &format!("expected identifier, found {:?}", tok.kind))),
        }
    }

    /// Right-hand side of a dot: any identifier or keyword (`a.right`).
    fn expect_member(&mut self) -> Result<String, Error> {
        let tok = self.advance();
        match &tok.kind {
            TokenKind::Ident(s) | TokenKind::ColorName(s) => Ok(s.clone()),
            kind => kind.keyword_text()
                .map(str::to_string)
                .ok_or_else(|| self.error_at(&tok, &format!("expected property name, found {:?}", tok.kind))),
        }
    }

    fn is_name_token(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(_) | TokenKind::ColorName(_))
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn span(&self) -> Span {
        let tok = self.peek();
        Span::new(tok.line, tok.column)
    }

    fn unexpected(&self, expected: &str) -> Error {
        let tok = self.peek();
        Error::Parse(SyntaxError::new(
            ErrorCode::P001,
            tok.line,
            tok.column,
            format!("expected {}, found {:?}", expected, tok.kind),
        ))
    }

    fn error_at(&self, tok: &Token, msg: &str) -> Error {
        Error::Parse(SyntaxError::new(ErrorCode::P001, tok.line, tok.column, msg))
    }

    /// Skip to the next `}`, `shape`, `layer` or `param`.
    fn recover(&mut self) {
        while !self.peek_kind().is_sync_point() {
            self.advance();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Vec<Stmt> {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        Parser::new(tokens).parse().expect("parse failed")
    }

    fn parse_expr_src(src: &str) -> Expr {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        let mut p = Parser::new(tokens);
        p.parse_expr().expect("parse_expr failed")
    }

    fn parse_err(src: &str) -> SyntaxError {
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        match Parser::new(tokens).parse().expect_err("expected parse error") {
            Error::Parse(e) => e,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn token_streams_without_eof_are_terminated() {
        assert_eq!(Parser::new(Vec::new()).parse(), Ok(Vec::new()));

        let tokens = vec![
            Token::new(TokenKind::Param, 1, 1),
            Token::new(TokenKind::Ident("a".into()), 1, 7),
        ];
        match Parser::new(tokens).parse() {
            Err(Error::Parse(e)) => assert_eq!((e.line, e.column), (1, 7)),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    // ── params ───────────────────────────────────────────────────────────────

    #[test]
    fn param_with_and_without_separator() {
        let stmts = parse("param a 1\nparam b = 2\nparam c: 3");
        assert_eq!(stmts.len(), 3);
        match &stmts[1] {
            Stmt::Param(p) => {
                assert_eq!(p.name, "b");
                assert!(matches!(p.value, Expr::Number(n, _) if n == 2.0));
            }
            _ => panic!("expected Param"),
        }
    }

    // ── shapes ───────────────────────────────────────────────────────────────

    #[test]
    fn shape_type_then_name() {
        let stmts = parse("shape circle c { radius: 10 }");
        match &stmts[0] {
            Stmt::Shape(s) => {
                assert_eq!(s.kind, ShapeKind::Circle);
                assert_eq!(s.name.as_deref(), Some("c"));
                assert_eq!(s.props.len(), 1);
                assert_eq!(s.props[0].name, "radius");
            }
            _ => panic!("expected Shape"),
        }
    }

    #[test]
    fn shape_name_then_type() {
        let stmts = parse("shape a rectangle { width: 100 height: 60 }");
        match &stmts[0] {
            Stmt::Shape(s) => {
                assert_eq!(s.kind, ShapeKind::Rectangle);
                assert_eq!(s.name.as_deref(), Some("a"));
                let names: Vec<_> = s.props.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["width", "height"]);
            }
            _ => panic!("expected Shape"),
        }
    }

    #[test]
    fn shape_without_name() {
        match &parse("shape star { points: 6 }")[0] {
            Stmt::Shape(s) => assert!(s.name.is_none()),
            _ => panic!("expected Shape"),
        }
    }

    #[test]
    fn keyword_properties_and_flags() {
        let stmts = parse("shape rectangle r { fill: red, filled, strokeWidth 2 hidden visible: true }");
        match &stmts[0] {
            Stmt::Shape(s) => {
                let names: Vec<_> = s.props.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["fill", "filled", "strokeWidth", "hidden", "visible"]);
                assert!(s.props[1].value.is_none());
                assert!(s.props[3].value.is_none());
                assert!(matches!(s.props[0].value, Some(Expr::NamedColor(ref c, _)) if c == "red"));
                assert!(matches!(s.props[4].value, Some(Expr::Bool(true, _))));
            }
            _ => panic!("expected Shape"),
        }
    }

    #[test]
    fn unknown_shape_type_is_an_error() {
        let err = parse_err("shape hexagon h { }");
        assert_eq!(err.code, ErrorCode::P001);
        assert!(err.message.contains("unknown shape type"));
    }

    // ── blocks ───────────────────────────────────────────────────────────────

    #[test]
    fn layer_operations() {
        match &parse("layer bg { add a add b subtract a rotate 45 scale [2, 1] position [0, 5] }")[0] {
            Stmt::Layer(l) => {
                assert_eq!(l.name, "bg");
                assert_eq!(l.commands.len(), 6);
                assert!(matches!(&l.commands[2], LayerCommand::Subtract(n, _) if n == "a"));
            }
            _ => panic!("expected Layer"),
        }
    }

    #[test]
    fn transform_ops_with_conditions() {
        match &parse("transform c { scale 2 if big rotate: 45 position [1, 2] }")[0] {
            Stmt::Transform(t) => {
                assert_eq!(t.target, "c");
                assert_eq!(t.ops.len(), 3);
                assert_eq!(t.ops[0].kind, TransformKind::Scale);
                assert!(t.ops[0].condition.is_some());
                assert!(t.ops[1].condition.is_none());
            }
            _ => panic!("expected Transform"),
        }
    }

    #[test]
    fn for_loop_with_default_and_explicit_step() {
        match &parse("for i from 0 to 2 { shape s circle { radius: i } }")[0] {
            Stmt::For(f) => {
                assert_eq!(f.var, "i");
                assert!(f.step.is_none());
                assert_eq!(f.body.len(), 1);
            }
            _ => panic!("expected For"),
        }
        match &parse("for i from 10 to 0 step -2 { }")[0] {
            Stmt::For(f) => assert!(f.step.is_some()),
            _ => panic!("expected For"),
        }
    }

    #[test]
    fn else_if_chains_nest() {
        match &parse("if a { } else if b { } else { }")[0] {
            Stmt::If(outer) => {
                let else_block = outer.else_block.as_ref().unwrap();
                assert!(matches!(&else_block[0], Stmt::If(inner) if inner.else_block.is_some()));
            }
            _ => panic!("expected If"),
        }
    }

    #[test]
    fn def_and_return() {
        match &parse("def dbl(n) { return n * 2 }")[0] {
            Stmt::FnDef(f) => {
                assert_eq!(f.params, vec!["n"]);
                assert!(matches!(&f.body[0], Stmt::Return(Some(_), _)));
            }
            _ => panic!("expected FnDef"),
        }
        match &parse("def noop() { return }")[0] {
            Stmt::FnDef(f) => assert!(matches!(&f.body[0], Stmt::Return(None, _))),
            _ => panic!("expected FnDef"),
        }
    }

    #[test]
    fn draw_block_holds_turtle_commands() {
        match &parse("draw sq { forward 10 right 90 penup goto 5, 5 pendown }")[0] {
            Stmt::Draw(d) => {
                assert_eq!(d.name.as_deref(), Some("sq"));
                let cmds: Vec<_> = d.body.iter().map(|s| match s {
                    Stmt::DrawCommand(c) => c.command,
                    _ => panic!("expected DrawCommand"),
                }).collect();
                assert_eq!(cmds, vec![
                    TurtleCommand::Forward, TurtleCommand::Right, TurtleCommand::Penup,
                    TurtleCommand::Goto, TurtleCommand::Pendown,
                ]);
            }
            _ => panic!("expected Draw"),
        }
    }

    #[test]
    fn boolean_block_collects_operands() {
        match &parse("difference d { add a add b add c }")[0] {
            Stmt::Boolean(b) => {
                assert_eq!(b.op, BooleanOp::Difference);
                assert_eq!(b.operands, vec!["a", "b", "c"]);
            }
            _ => panic!("expected Boolean"),
        }
    }

    #[test]
    fn boolean_block_needs_two_operands() {
        let err = parse_err("union u { add a }");
        assert!(err.message.contains("at least two"));
    }

    #[test]
    fn fill_and_style() {
        let stmts = parse("fill c #ff0000\nstyle c { strokeColor: blue, opacity: 0.5 }");
        assert!(matches!(&stmts[0], Stmt::Fill(f) if f.target == "c"));
        assert!(matches!(&stmts[1], Stmt::Style(s) if s.props.len() == 2));
    }

    #[test]
    fn constraints_with_optional_distance() {
        match &parse("constraints { distance a.right b.left 20 coincident a.center b.center }")[0] {
            Stmt::Constraints(c) => {
                assert_eq!(c.items.len(), 2);
                assert_eq!(c.items[0].kind, ConstraintKind::Distance);
                assert!(c.items[0].distance.is_some());
                assert_eq!(c.items[1].a, ("a".to_string(), "center".to_string()));
                assert!(c.items[1].distance.is_none());
            }
            _ => panic!("expected Constraints"),
        }
    }

    // ── expressions ──────────────────────────────────────────────────────────

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        match parse_expr_src("1 + 2 * 3") {
            Expr::Binary { op: BinOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ternary_sits_between_and_and_comparison() {
        match parse_expr_src("a and b > 1 ? 2 : 3") {
            Expr::Logical { op: LogicOp::And, right, .. } => {
                assert!(matches!(*right, Expr::Ternary { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ternary_is_right_associative() {
        match parse_expr_src("a ? 1 : b ? 2 : 3") {
            Expr::Ternary { else_expr, .. } => assert!(matches!(*else_expr, Expr::Ternary { .. })),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nested_index_and_property() {
        assert!(matches!(
            parse_expr_src("pts[1][0]"),
            Expr::Index { expr, .. } if matches!(*expr, Expr::Index { .. })
        ));
        assert!(matches!(
            parse_expr_src("box.width"),
            Expr::Property { ref object, ref property, .. } if object == "box" && property == "width"
        ));
    }

    #[test]
    fn division_by_literal_zero_parses() {
        assert!(matches!(parse_expr_src("10 / 0"), Expr::Binary { op: BinOp::Div, .. }));
    }

    #[test]
    fn errors_carry_location() {
        let err = parse_err("param a 1\nshape circle c { radius: }");
        assert_eq!((err.line, err.column), (2, 26));
    }

    #[test]
    fn missing_brace_is_reported() {
        let err = parse_err("for i from 0 to 3 shape circle { }");
        assert_eq!(err.code, ErrorCode::P002);
    }
}

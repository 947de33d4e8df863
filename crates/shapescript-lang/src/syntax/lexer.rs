use crate::error::{Error, ErrorCode, SyntaxError};
use crate::syntax::token::{Token, TokenKind, keyword_or_ident};

/// Cursor over the source bytes. `Copy` so `peek_token` can snapshot and
/// restore it exactly.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    pos: usize,
    line: usize,
    column: usize,
}

pub struct Lexer<'a> {
    source: &'a [u8],
    cursor: Cursor,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source: source.as_bytes(), cursor: Cursor { pos: 0, line: 1, column: 1 } }
    }

    /// Drain the whole source. Stops at the first error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done { break; }
        }
        Ok(tokens)
    }

    /// Return the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Token, Error> {
        let saved = self.cursor;
        let tok = self.next_token();
        self.cursor = saved;
        tok
    }

    /// Consume and return one token. Comments and whitespace are skipped.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_trivia();

        let line = self.cursor.line;
        let col = self.cursor.column;
        if self.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, line, col));
        }

        let ch = self.advance();
        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'?' => TokenKind::Question,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,

            b'.' => {
                if self.peek().is_ascii_digit() { TokenKind::Number(self.read_number(ch)) }
                else { TokenKind::Dot }
            }
            b'=' => {
                if self.peek() == b'=' { self.advance(); TokenKind::EqEq }
                else { TokenKind::Eq }
            }
            b'!' => {
                if self.peek() == b'=' { self.advance(); TokenKind::BangEq }
                else {
                    return Err(lex_error(ErrorCode::L001, line, col,
                        "expected `!=`, bare `!` is not valid (use `not`)"));
                }
            }
            b'<' => {
                if self.peek() == b'=' { self.advance(); TokenKind::LtEq }
                else { TokenKind::Lt }
            }
            b'>' => {
                if self.peek() == b'=' { self.advance(); TokenKind::GtEq }
                else { TokenKind::Gt }
            }

            b'#' => TokenKind::HexColor(self.read_hex_color(line, col)?),
            b'"' => TokenKind::StringLit(self.read_string(line, col)?),
            b'0'..=b'9' => TokenKind::Number(self.read_number(ch)),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => keyword_or_ident(self.read_ident(ch)),

            other => {
                return Err(lex_error(ErrorCode::L001, line, col,
                    format!("unexpected character `{}`", other as char)));
            }
        };

        Ok(Token::new(kind, line, col))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.cursor.pos];
        self.cursor.pos += 1;
        if ch == b'\n' { self.cursor.line += 1; self.cursor.column = 1; }
        else { self.cursor.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.cursor.pos] }
    }

    fn peek_next(&self) -> u8 {
        self.source.get(self.cursor.pos + 1).copied().unwrap_or(0)
    }

    fn is_at_end(&self) -> bool {
        self.cursor.pos >= self.source.len()
    }

    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => { self.advance(); }
                b'/' if self.peek_next() == b'/' => {
                    while !self.is_at_end() && self.peek() != b'\n' { self.advance(); }
                }
                _ => break,
            }
        }
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    /// Reads the digits after `#`. Only 3, 4, 6 or 8 hex digits form a color.
    fn read_hex_color(&mut self, line: usize, col: usize) -> Result<String, Error> {
        let mut s = String::from("#");
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            s.push(self.advance() as char);
        }
        let digits = &s[1..];
        let valid = matches!(digits.len(), 3 | 4 | 6 | 8)
            && digits.bytes().all(|b| b.is_ascii_hexdigit());
        if valid {
            Ok(s)
        } else {
            Err(lex_error(ErrorCode::L004, line, col,
                format!("invalid hex color `{s}`: expected 3, 4, 6 or 8 hex digits")))
        }
    }

    fn read_string(&mut self, start_line: usize, start_col: usize) -> Result<String, Error> {
        let mut bytes = Vec::new();
        loop {
            if self.is_at_end() || self.peek() == b'\n' {
                return Err(lex_error(ErrorCode::L002, start_line, start_col,
                    "unterminated string literal"));
            }
            let ch = self.advance();
            if ch == b'"' { break; }
            if ch == b'\\' {
                let esc_line = self.cursor.line;
                let esc_col = self.cursor.column;
                if self.is_at_end() {
                    return Err(lex_error(ErrorCode::L002, start_line, start_col,
                        "unterminated string literal"));
                }
                match self.advance() {
                    b'n'  => bytes.push(b'\n'),
                    b't'  => bytes.push(b'\t'),
                    b'r'  => bytes.push(b'\r'),
                    b'"'  => bytes.push(b'"'),
                    b'\\' => bytes.push(b'\\'),
                    other => {
                        return Err(lex_error(ErrorCode::L003, esc_line, esc_col,
                            format!("unknown escape sequence `\\{}`", other as char)));
                    }
                }
            } else {
                bytes.push(ch);
            }
        }
        // Source came from a &str and escapes are ASCII, so the bytes stay valid UTF-8.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_number(&mut self, first: u8) -> f64 {
        let mut s = String::new();
        s.push(first as char);
        let mut seen_dot = first == b'.';
        while !self.is_at_end() {
            let c = self.peek();
            if c.is_ascii_digit() {
                s.push(self.advance() as char);
            } else if c == b'.' && !seen_dot && self.peek_next().is_ascii_digit() {
                // `.` followed by a digit continues the number; `a.b` stays a property access.
                seen_dot = true;
                s.push(self.advance() as char);
            } else {
                break;
            }
        }
        s.parse().unwrap_or(0.0)
    }

    fn read_ident(&mut self, first: u8) -> String {
        let mut s = String::new();
        s.push(first as char);
        while !self.is_at_end() && (self.peek().is_ascii_alphanumeric() || self.peek() == b'_') {
            s.push(self.advance() as char);
        }
        s
    }
}

fn lex_error(code: ErrorCode, line: usize, column: usize, message: impl Into<String>) -> Error {
    Error::Lex(SyntaxError::new(code, line, column, message))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

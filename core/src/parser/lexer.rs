//! # Lexer
//!
//! Tokenizes C# source text into a flat token stream with line information.
//!
//! Comments, whitespace and preprocessor directive lines are dropped. Leading
//! comments are kept aside so callers can recognize tool-generated files.

use crate::parser::models::Diagnostic;

/// The classification of a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier or keyword. Verbatim identifiers (`@class`) are stored
    /// without the `@` and flagged.
    Ident {
        /// Identifier text.
        text: String,
        /// Whether the identifier was written with a leading `@`.
        verbatim: bool,
    },
    /// A string literal with escapes decoded (holes of interpolated strings
    /// are kept as raw text).
    Str {
        /// Decoded literal value.
        value: String,
        /// `$"..."` string.
        interpolated: bool,
        /// `"""..."""` string.
        raw: bool,
    },
    /// A character literal.
    Char(String),
    /// A numeric literal (raw text).
    Number(String),
    /// Punctuation or operator.
    Punct(&'static str),
}

/// A token with its 1-based source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token classification.
    pub kind: TokenKind,
    /// 1-based line number of the first character.
    pub line: usize,
}

impl Token {
    /// Returns the identifier text when the token is a non-verbatim identifier.
    pub fn keyword(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident {
                text,
                verbatim: false,
            } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns the identifier text for any identifier (verbatim or not).
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Returns true if the token is the given punctuation.
    pub fn is_punct(&self, p: &str) -> bool {
        matches!(&self.kind, TokenKind::Punct(q) if *q == p)
    }

    /// Short human readable rendering, used in diagnostics.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident { text, .. } => text.clone(),
            TokenKind::Str { .. } => "string literal".to_string(),
            TokenKind::Char(_) => "character literal".to_string(),
            TokenKind::Number(n) => n.clone(),
            TokenKind::Punct(p) => (*p).to_string(),
        }
    }
}

/// Result of lexing one source unit.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Token stream.
    pub tokens: Vec<Token>,
    /// Text of all comments appearing before the first token.
    pub leading_comments: String,
}

/// Multi-character operators, longest first.
const MULTI_PUNCT: &[&str] = &[
    "=>", "==", "!=", "<=", ">=", "::", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", "->", "..",
];

const SINGLE_PUNCT: &[&str] = &[
    "{", "}", "(", ")", "[", "]", "<", ">", ";", ",", ".", ":", "=", "?", "+", "-", "*", "/",
    "%", "&", "|", "^", "!", "~",
];

struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn at_line_start(&self) -> bool {
        let mut i = self.pos;
        while i > 0 {
            i -= 1;
            match self.chars[i] {
                '\n' => return true,
                ' ' | '\t' | '\r' => continue,
                _ => return false,
            }
        }
        true
    }
}

/// Tokenizes a complete source unit.
pub fn tokenize(source: &str) -> Result<Lexed, Diagnostic> {
    let mut cur = Cursor::new(source);
    let mut out = Lexed::default();

    while let Some(c) = cur.peek() {
        if c.is_whitespace() || c == '\u{feff}' {
            cur.bump();
            continue;
        }

        // Comments
        if cur.starts_with("//") {
            let text = read_line(&mut cur);
            if out.tokens.is_empty() {
                out.leading_comments.push_str(&text);
                out.leading_comments.push('\n');
            }
            continue;
        }
        if cur.starts_with("/*") {
            let start_line = cur.line;
            let text = read_block_comment(&mut cur)
                .ok_or_else(|| Diagnostic::new(start_line, "CS1035: End-of-file found, '*/' expected"))?;
            if out.tokens.is_empty() {
                out.leading_comments.push_str(&text);
                out.leading_comments.push('\n');
            }
            continue;
        }

        // Preprocessor directives occupy a whole line
        if c == '#' && cur.at_line_start() {
            read_line(&mut cur);
            continue;
        }

        let line = cur.line;

        // Strings, including prefixed forms ($", @", $@", @$", """)
        if let Some(kind) = lex_string(&mut cur)? {
            out.tokens.push(Token { kind, line });
            continue;
        }

        if c == '\'' {
            let kind = lex_char(&mut cur)?;
            out.tokens.push(Token { kind, line });
            continue;
        }

        if c == '@' && cur.peek_at(1).is_some_and(is_ident_start) {
            cur.bump();
            let text = read_ident(&mut cur);
            out.tokens.push(Token {
                kind: TokenKind::Ident {
                    text,
                    verbatim: true,
                },
                line,
            });
            continue;
        }

        if is_ident_start(c) {
            let text = read_ident(&mut cur);
            out.tokens.push(Token {
                kind: TokenKind::Ident {
                    text,
                    verbatim: false,
                },
                line,
            });
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && cur.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            let text = read_number(&mut cur);
            out.tokens.push(Token {
                kind: TokenKind::Number(text),
                line,
            });
            continue;
        }

        if let Some(p) = MULTI_PUNCT.iter().find(|p| cur.starts_with(p)) {
            // `a ?.5 : b` is a conditional, not a null-propagating access
            if *p == "?." && cur.peek_at(2).is_some_and(|d| d.is_ascii_digit()) {
                cur.bump();
                out.tokens.push(Token {
                    kind: TokenKind::Punct("?"),
                    line,
                });
                continue;
            }
            for _ in 0..p.chars().count() {
                cur.bump();
            }
            out.tokens.push(Token {
                kind: TokenKind::Punct(p),
                line,
            });
            continue;
        }

        let single = c.to_string();
        if let Some(p) = SINGLE_PUNCT.iter().find(|p| **p == single) {
            cur.bump();
            out.tokens.push(Token {
                kind: TokenKind::Punct(p),
                line,
            });
            continue;
        }

        return Err(Diagnostic::new(
            line,
            format!("CS1056: Unexpected character '{}'", c),
        ));
    }

    Ok(out)
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn read_ident(cur: &mut Cursor) -> String {
    let mut s = String::new();
    while let Some(c) = cur.peek() {
        if is_ident_part(c) {
            s.push(c);
            cur.bump();
        } else {
            break;
        }
    }
    s
}

fn read_number(cur: &mut Cursor) -> String {
    let mut s = String::new();
    while let Some(c) = cur.peek() {
        let exponent_sign = (c == '+' || c == '-')
            && s.ends_with(|e: char| e == 'e' || e == 'E')
            && !s.starts_with("0x")
            && !s.starts_with("0X");
        if c.is_ascii_alphanumeric() || c == '_' || exponent_sign {
            s.push(c);
            cur.bump();
        } else if c == '.' && cur.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
            s.push(c);
            cur.bump();
        } else {
            break;
        }
    }
    s
}

fn read_line(cur: &mut Cursor) -> String {
    let mut s = String::new();
    while let Some(c) = cur.peek() {
        if c == '\n' {
            break;
        }
        s.push(c);
        cur.bump();
    }
    s
}

fn read_block_comment(cur: &mut Cursor) -> Option<String> {
    let mut s = String::new();
    cur.bump();
    cur.bump();
    loop {
        if cur.starts_with("*/") {
            cur.bump();
            cur.bump();
            return Some(s);
        }
        s.push(cur.bump()?);
    }
}

fn lex_char(cur: &mut Cursor) -> Result<TokenKind, Diagnostic> {
    let line = cur.line;
    cur.bump();
    let mut value = String::new();
    loop {
        match cur.bump() {
            None | Some('\n') => {
                return Err(Diagnostic::new(line, "CS1012: Too many characters in character literal"))
            }
            Some('\\') => {
                let e = cur
                    .bump()
                    .ok_or_else(|| Diagnostic::new(line, "CS1010: Newline in constant"))?;
                value.push(decode_escape(e));
            }
            Some('\'') => break,
            Some(c) => value.push(c),
        }
    }
    if value.is_empty() {
        return Err(Diagnostic::new(line, "CS1011: Empty character literal"));
    }
    Ok(TokenKind::Char(value))
}

fn decode_escape(e: char) -> char {
    match e {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

/// Lexes a string literal if one starts at the cursor.
fn lex_string(cur: &mut Cursor) -> Result<Option<TokenKind>, Diagnostic> {
    let mut prefix_len = 0;
    let mut interpolated = false;
    let mut verbatim = false;
    while let Some(c) = cur.peek_at(prefix_len) {
        match c {
            '$' => interpolated = true,
            '@' if !verbatim => verbatim = true,
            '"' => break,
            _ => return Ok(None),
        }
        prefix_len += 1;
    }
    if cur.peek_at(prefix_len) != Some('"') {
        return Ok(None);
    }

    let line = cur.line;
    for _ in 0..prefix_len {
        cur.bump();
    }

    let mut quotes = 0;
    while cur.peek_at(quotes) == Some('"') {
        quotes += 1;
    }

    if quotes >= 3 && !verbatim {
        return lex_raw_string(cur, quotes, interpolated, line).map(Some);
    }

    cur.bump();
    let mut value = String::new();
    loop {
        let c = cur.bump().ok_or_else(|| {
            Diagnostic::new(line, "CS1039: Unterminated string literal")
        })?;
        match c {
            '"' if verbatim => {
                if cur.peek() == Some('"') {
                    cur.bump();
                    value.push('"');
                } else {
                    break;
                }
            }
            '"' => break,
            '\n' if !verbatim => {
                return Err(Diagnostic::new(line, "CS1010: Newline in constant"));
            }
            '\\' if !verbatim => {
                let e = cur
                    .bump()
                    .ok_or_else(|| Diagnostic::new(line, "CS1010: Newline in constant"))?;
                value.push(decode_escape(e));
            }
            '{' if interpolated => {
                if cur.peek() == Some('{') {
                    cur.bump();
                    value.push('{');
                } else {
                    value.push('{');
                    read_interpolation_hole(cur, &mut value, line)?;
                }
            }
            '}' if interpolated => {
                if cur.peek() == Some('}') {
                    cur.bump();
                }
                value.push('}');
            }
            other => value.push(other),
        }
    }

    Ok(Some(TokenKind::Str {
        value,
        interpolated,
        raw: false,
    }))
}

fn read_interpolation_hole(
    cur: &mut Cursor,
    value: &mut String,
    line: usize,
) -> Result<(), Diagnostic> {
    let mut depth = 1;
    while depth > 0 {
        let c = cur
            .bump()
            .ok_or_else(|| Diagnostic::new(line, "CS8076: Missing close delimiter '}' for interpolated expression"))?;
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            '"' => {
                // nested plain string inside the hole
                value.push(c);
                loop {
                    let n = cur.bump().ok_or_else(|| {
                        Diagnostic::new(line, "CS1039: Unterminated string literal")
                    })?;
                    value.push(n);
                    if n == '\\' {
                        if let Some(e) = cur.bump() {
                            value.push(e);
                        }
                    } else if n == '"' {
                        break;
                    }
                }
                continue;
            }
            _ => {}
        }
        value.push(c);
    }
    Ok(())
}

fn lex_raw_string(
    cur: &mut Cursor,
    quotes: usize,
    interpolated: bool,
    line: usize,
) -> Result<TokenKind, Diagnostic> {
    for _ in 0..quotes {
        cur.bump();
    }
    let closing: String = "\"".repeat(quotes);
    let mut value = String::new();
    loop {
        if cur.starts_with(&closing) {
            for _ in 0..quotes {
                cur.bump();
            }
            break;
        }
        let c = cur
            .bump()
            .ok_or_else(|| Diagnostic::new(line, "CS8997: Unterminated raw string literal"))?;
        value.push(c);
    }
    Ok(TokenKind::Str {
        value: value.trim().to_string(),
        interpolated,
        raw: true,
    })
}

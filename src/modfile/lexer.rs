//! Tokenizer for go.mod text.

use logos::Logos;
use std::fmt;

/// 1-based position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word, including `=>` and version strings.
    Ident,
    /// Double-quoted or back-quoted string, kept exactly as written.
    String,
    /// One of `( ) [ ] { } ,`.
    Punct(char),
    /// `// ...` up to, not including, the line break.
    Comment,
    Newline,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub pos: Position,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.pos.line, self.pos.column, self.message)
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
enum RawToken {
    #[token("\n")]
    Newline,

    #[regex(r"[()\[\]{},]")]
    Punct,

    #[regex(r"//[^\n]*")]
    Comment,

    #[token("/*")]
    BlockComment,

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    Quoted,
    #[regex(r#""([^"\\\n]|\\[^\n])*"#)]
    UnterminatedQuoted,

    #[regex(r"`[^`]*`")]
    Raw,
    #[regex(r"`[^`]*")]
    UnterminatedRaw,

    // Only the first character is matched here; `ident` takes the rest.
    #[regex(r#"[^ \t\r\n()\[\]{},"`]"#, ident)]
    Ident,
}

/// Characters that end an identifier.
fn is_punct(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ',')
}

fn is_ident(c: char) -> bool {
    !is_punct(c) && !c.is_whitespace() && !c.is_control() && c != '"' && c != '`'
}

/// Extends an identifier up to the next separator or `//` / `/*`.
fn ident(lex: &mut logos::Lexer<RawToken>) -> bool {
    if !lex.slice().chars().all(is_ident) {
        return false;
    }
    let rest = lex.remainder();
    let len = rest
        .char_indices()
        .find(|&(i, c)| !is_ident(c) || rest[i..].starts_with("//") || rest[i..].starts_with("/*"))
        .map_or(rest.len(), |(i, _)| i);
    lex.bump(len);
    true
}

pub struct Lexer<'a> {
    inner: logos::Lexer<'a, RawToken>,
    src: &'a str,
    line: usize,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            inner: RawToken::lexer(src),
            src,
            line: 1,
            line_start: 0,
        }
    }

    fn position(&self, offset: usize) -> Position {
        Position {
            line: self.line,
            column: self.src[self.line_start..offset].chars().count() + 1,
        }
    }

    fn error<T>(&self, pos: Position, message: impl Into<String>) -> Result<T, SyntaxError> {
        Err(SyntaxError {
            pos,
            message: message.into(),
        })
    }

    /// Returns the next token, skipping horizontal whitespace.
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let Some(raw) = self.inner.next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                pos: self.position(self.src.len()),
            });
        };

        let span = self.inner.span();
        let slice = self.inner.slice();
        let pos = self.position(span.start);

        let kind = match raw {
            Ok(RawToken::Newline) => TokenKind::Newline,
            Ok(RawToken::Punct) => TokenKind::Punct(slice.chars().next().unwrap_or(',')),
            Ok(RawToken::Comment) => TokenKind::Comment,
            Ok(RawToken::Quoted | RawToken::Raw) => TokenKind::String,
            Ok(RawToken::Ident) => TokenKind::Ident,
            Ok(RawToken::BlockComment) => {
                return self.error(pos, "mod files must use // comments (not /* */ comments)");
            }
            Ok(RawToken::UnterminatedQuoted) => {
                return self.error(pos, "unterminated quoted string");
            }
            Ok(RawToken::UnterminatedRaw) => return self.error(pos, "unterminated raw string"),
            Err(()) => {
                let c = slice.chars().next().unwrap_or_default();
                return self.error(pos, format!("unexpected input character {:?}", c));
            }
        };

        // Newline tokens and raw strings move the line counter.
        if let Some(last) = slice.rfind('\n') {
            self.line += slice.matches('\n').count();
            self.line_start = span.start + last + 1;
        }

        let text = slice.trim_end_matches('\r').to_string();
        Ok(Token { kind, text, pos })
    }
}

/// Decodes a quoted token into its string value. Bare words are returned as-is.
///
/// Double-quoted strings accept Go's escapes: `\a \b \f \n \r \t \v \\ \"`,
/// octal `\NNN`, `\xNN`, `\uNNNN` and `\UNNNNNNNN`. Byte escapes must
/// combine into valid UTF-8.
pub fn unquote(text: &str) -> Option<String> {
    if let Some(raw) = text.strip_prefix('`') {
        return raw.strip_suffix('`').map(str::to_string);
    }
    let Some(inner) = text.strip_prefix('"') else {
        return Some(text.to_string());
    };
    let inner = inner.strip_suffix('"')?;

    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    let mut buf = [0u8; 4];
    let push_char = |out: &mut Vec<u8>, buf: &mut [u8; 4], c: char| {
        out.extend_from_slice(c.encode_utf8(buf).as_bytes());
    };

    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut out, &mut buf, c);
            continue;
        }
        match chars.next()? {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            'x' => out.push(u8::try_from(hex_digits(&mut chars, 2)?).ok()?),
            'u' => push_char(&mut out, &mut buf, char::from_u32(hex_digits(&mut chars, 4)?)?),
            'U' => push_char(&mut out, &mut buf, char::from_u32(hex_digits(&mut chars, 8)?)?),
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                out.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}

fn hex_digits(chars: &mut std::str::Chars<'_>, n: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..n {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

/// Quotes `s` when it would not survive lexing as a single bare word.
pub fn auto_quote(s: &str) -> String {
    let needs_quote = s.is_empty()
        || s.contains("//")
        || s.contains("/*")
        || s.chars().any(|c| !is_ident(c));
    if !needs_quote {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() && (c as u32) < 0x80 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

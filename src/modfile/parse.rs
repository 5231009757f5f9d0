//! Builds a [`FileSyntax`] from go.mod text.

use super::lexer::{Lexer, Position, SyntaxError, TokenKind};
use super::syntax::{CommentBlock, Comments, FileSyntax, Line, LineBlock, Stmt};

/// Verbs accepted at the start of a directive.
pub const KNOWN_VERBS: &[&str] = &[
    "module",
    "go",
    "toolchain",
    "godebug",
    "require",
    "exclude",
    "replace",
    "retract",
    "tool",
    "ignore",
];

/// Verbs that may only appear as a single line.
const LINE_ONLY_VERBS: &[&str] = &["module", "go", "toolchain"];

/// One physical line of input.
struct RawLine {
    tokens: Vec<String>,
    comment: Option<String>,
    pos: Position,
}

impl RawLine {
    fn is_blank(&self) -> bool {
        self.tokens.is_empty() && self.comment.is_none()
    }

    fn opens_block(&self) -> bool {
        self.tokens.last().is_some_and(|t| t == "(")
    }

    fn closes_block(&self) -> bool {
        self.tokens.len() == 1 && self.tokens[0] == ")"
    }

    /// `verb ()` written on one line.
    fn is_empty_block(&self) -> bool {
        self.tokens.len() == 3 && self.tokens[1] == "(" && self.tokens[2] == ")"
    }
}

fn error<T>(pos: Position, message: impl Into<String>) -> Result<T, SyntaxError> {
    Err(SyntaxError {
        pos,
        message: message.into(),
    })
}

fn split_lines(src: &str) -> Result<Vec<RawLine>, SyntaxError> {
    let mut lexer = Lexer::new(src);
    let mut lines = Vec::new();
    let mut current = RawLine {
        tokens: Vec::new(),
        comment: None,
        pos: Position { line: 1, column: 1 },
    };

    loop {
        let tok = lexer.next_token()?;
        if current.tokens.is_empty() && current.comment.is_none() {
            current.pos = tok.pos;
        }
        match tok.kind {
            TokenKind::Newline | TokenKind::Eof => {
                let done = tok.kind == TokenKind::Eof;
                let next_pos = Position {
                    line: tok.pos.line + 1,
                    column: 1,
                };
                let finished = std::mem::replace(
                    &mut current,
                    RawLine {
                        tokens: Vec::new(),
                        comment: None,
                        pos: next_pos,
                    },
                );
                if !(done && finished.is_blank()) {
                    lines.push(finished);
                }
                if done {
                    return Ok(lines);
                }
            }
            TokenKind::Comment => current.comment = Some(tok.text.trim_end().to_string()),
            TokenKind::Ident | TokenKind::String | TokenKind::Punct(_) => {
                current.tokens.push(tok.text);
            }
        }
    }
}

fn check_verb(line: &RawLine) -> Result<(), SyntaxError> {
    let verb = &line.tokens[0];
    if verb == ")" {
        return error(line.pos, "unexpected )");
    }
    if !KNOWN_VERBS.contains(&verb.as_str()) {
        return error(line.pos, format!("unknown directive: {}", verb));
    }
    if line.is_empty_block() {
        return Ok(());
    }
    if line.tokens.iter().skip(1).any(|t| t == "(") && !line.opens_block() {
        return error(line.pos, "unexpected (");
    }
    Ok(())
}

/// Parses go.mod text into a syntax tree.
pub fn parse_syntax(src: &str) -> Result<FileSyntax, SyntaxError> {
    let raw = split_lines(src)?;
    let mut syntax = FileSyntax::new();
    let mut pending: Vec<String> = Vec::new();
    let mut iter = raw.into_iter();

    while let Some(line) = iter.next() {
        if line.is_blank() {
            if !pending.is_empty() {
                syntax.stmts.push(Stmt::Comment(CommentBlock {
                    lines: std::mem::take(&mut pending),
                }));
            }
            continue;
        }
        if line.tokens.is_empty() {
            pending.extend(line.comment);
            continue;
        }

        check_verb(&line)?;
        let before = std::mem::take(&mut pending);

        if line.is_empty_block() {
            let verb = line.tokens[0].clone();
            if LINE_ONLY_VERBS.contains(&verb.as_str()) {
                return error(line.pos, format!("{} does not accept a block", verb));
            }
            syntax.stmts.push(Stmt::Block(LineBlock {
                verb,
                comments: Comments {
                    before,
                    suffix: line.comment.into_iter().collect(),
                },
                lines: Vec::new(),
                closing: Vec::new(),
            }));
            continue;
        }

        if !line.opens_block() {
            let id = syntax.next_line_id();
            syntax.stmts.push(Stmt::Line(Line {
                id,
                tokens: line.tokens,
                comments: Comments {
                    before,
                    suffix: line.comment.into_iter().collect(),
                },
                pos: line.pos,
            }));
            continue;
        }

        if line.tokens.len() != 2 {
            return error(line.pos, "syntax error: block must start with a single verb");
        }
        let verb = line.tokens[0].clone();
        if LINE_ONLY_VERBS.contains(&verb.as_str()) {
            return error(line.pos, format!("{} does not accept a block", verb));
        }

        let mut block = LineBlock {
            verb,
            comments: Comments {
                before,
                suffix: line.comment.into_iter().collect(),
            },
            lines: Vec::new(),
            closing: Vec::new(),
        };
        let mut inner: Vec<String> = Vec::new();
        let mut closed = false;

        for entry in iter.by_ref() {
            if entry.is_blank() {
                // Blank lines inside a block separate groups of entries.
                if !block.lines.is_empty() || !inner.is_empty() {
                    inner.push(String::new());
                }
                continue;
            }
            if entry.tokens.is_empty() {
                inner.extend(entry.comment);
                continue;
            }
            if entry.closes_block() {
                while inner.last().is_some_and(String::is_empty) {
                    inner.pop();
                }
                block.closing = std::mem::take(&mut inner);
                block.comments.suffix.extend(entry.comment);
                closed = true;
                break;
            }
            if entry.opens_block() || entry.tokens.iter().any(|t| t == "(" || t == ")") {
                return error(entry.pos, "syntax error: nested or misplaced parenthesis");
            }
            let id = syntax.next_line_id();
            block.lines.push(Line {
                id,
                tokens: entry.tokens,
                comments: Comments {
                    before: std::mem::take(&mut inner),
                    suffix: entry.comment.into_iter().collect(),
                },
                pos: entry.pos,
            });
        }

        if !closed {
            return error(line.pos, "syntax error: unterminated block");
        }
        syntax.stmts.push(Stmt::Block(block));
    }

    if !pending.is_empty() {
        syntax.stmts.push(Stmt::Comment(CommentBlock { lines: pending }));
    }

    Ok(syntax)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines_and_blocks() {
        let syntax = parse_syntax(
            "module example.com/m\n\ngo 1.21\n\nrequire (\n\ta v1.0.0\n\tb v1.2.0 // indirect\n)\n",
        )
        .unwrap();

        assert_eq!(syntax.stmts.len(), 3);
        let Stmt::Block(block) = &syntax.stmts[2] else {
            panic!("expected require block");
        };
        assert_eq!(block.verb, "require");
        assert_eq!(block.lines.len(), 2);
        assert_eq!(block.lines[1].comments.suffix, vec!["// indirect"]);
        assert_eq!(block.lines[1].pos, Position { line: 7, column: 2 });
    }

    #[test]
    fn test_comments_attach_to_following_statement() {
        let syntax = parse_syntax("// header\n\n// about module\nmodule m\n").unwrap();

        assert!(matches!(&syntax.stmts[0], Stmt::Comment(c) if c.lines == vec!["// header"]));
        let Stmt::Line(line) = &syntax.stmts[1] else {
            panic!("expected module line");
        };
        assert_eq!(line.comments.before, vec!["// about module"]);
    }

    #[test]
    fn test_trailing_comment_block() {
        let syntax = parse_syntax("module m\n\n// the end").unwrap();
        assert!(matches!(&syntax.stmts[1], Stmt::Comment(c) if c.lines == vec!["// the end"]));
    }

    #[test]
    fn test_block_keeps_closing_comments() {
        let syntax = parse_syntax("replace (\n\ta => ../a\n\t// keep me\n)\n").unwrap();
        let Stmt::Block(block) = &syntax.stmts[0] else {
            panic!("expected replace block");
        };
        assert_eq!(block.closing, vec!["// keep me"]);
    }

    #[test]
    fn test_unknown_directive() {
        let err = parse_syntax("module m\nfrobnicate x\n").unwrap_err();
        assert_eq!(err.message, "unknown directive: frobnicate");
        assert_eq!(err.pos.line, 2);
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_syntax("require (\n\ta v1\n").unwrap_err();
        assert!(err.message.contains("unterminated block"));
        assert_eq!(err.pos.line, 1);
    }

    #[test]
    fn test_module_block_rejected() {
        let err = parse_syntax("module (\n\tm\n)\n").unwrap_err();
        assert!(err.message.contains("does not accept a block"));
    }

    #[test]
    fn test_stray_close_paren() {
        let err = parse_syntax("module m\n)\n").unwrap_err();
        assert_eq!(err.message, "unexpected )");
    }

    #[test]
    fn test_empty_block_on_one_line() {
        let syntax = parse_syntax("module m\n\nrequire () // none yet\n").unwrap();
        let Stmt::Block(block) = &syntax.stmts[1] else {
            panic!("expected require block");
        };
        assert_eq!(block.verb, "require");
        assert!(block.lines.is_empty());
        assert_eq!(block.comments.suffix, vec!["// none yet"]);

        let err = parse_syntax("go ()\n").unwrap_err();
        assert!(err.message.contains("does not accept a block"));
        let err = parse_syntax("require ( ) x\n").unwrap_err();
        assert_eq!(err.message, "unexpected (");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_syntax("").unwrap().stmts.is_empty());
        assert!(parse_syntax("\n\n").unwrap().stmts.is_empty());
    }
}

//! Lossless syntax tree for go.mod files.
//!
//! The tree keeps every statement, block, and comment of the parsed file so
//! that directives this crate does not touch are written back unchanged.
//! Lines are addressed by a [`LineId`] that stays stable while statements
//! are inserted, removed, or folded into and out of blocks.

use super::lexer::Position;

/// Stable handle to a [`Line`] in a [`FileSyntax`].
pub type LineId = usize;

/// Comments attached to a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    /// Whole-line comments directly above the statement.
    pub before: Vec<String>,
    /// Comment at the end of the statement's line.
    pub suffix: Vec<String>,
}

impl Comments {
    fn append(&mut self, other: Comments) {
        self.before.extend(other.before);
        self.suffix.extend(other.suffix);
    }
}

/// A single directive line.
///
/// Inside a block, `tokens` omits the block's verb. An empty token list
/// marks a line removed until the next [`FileSyntax::cleanup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    pub tokens: Vec<String>,
    pub comments: Comments,
    /// Where the line started in the parsed text; default for added lines.
    pub pos: Position,
}

impl Line {
    pub fn is_removed(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A factored block such as `require ( ... )`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBlock {
    pub verb: String,
    /// Comments above `verb (` and after the opening parenthesis.
    pub comments: Comments,
    pub lines: Vec<Line>,
    /// Comment lines between the last entry and `)`.
    pub closing: Vec<String>,
}

/// Comment lines not attached to any directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Comment(CommentBlock),
    Line(Line),
    Block(LineBlock),
}

impl Stmt {
    /// Directive verb of the statement, if it is a directive.
    pub fn verb(&self) -> Option<&str> {
        match self {
            Stmt::Comment(_) => None,
            Stmt::Line(line) => line.tokens.first().map(String::as_str),
            Stmt::Block(block) => Some(&block.verb),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSyntax {
    pub stmts: Vec<Stmt>,
    next_id: LineId,
}

impl FileSyntax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a handle for a new line.
    pub fn next_line_id(&mut self) -> LineId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Lists all live directive lines as `(verb, args, line)`.
    pub fn directives(&self) -> Vec<(&str, &[String], &Line)> {
        let mut out = Vec::new();
        for stmt in &self.stmts {
            match stmt {
                Stmt::Comment(_) => {}
                Stmt::Line(line) => {
                    if !line.is_removed() {
                        out.push((line.tokens[0].as_str(), &line.tokens[1..], line));
                    }
                }
                Stmt::Block(block) => {
                    for line in block.lines.iter().filter(|line| !line.is_removed()) {
                        out.push((block.verb.as_str(), line.tokens.as_slice(), line));
                    }
                }
            }
        }
        out
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.stmts.iter().find_map(|stmt| match stmt {
            Stmt::Line(line) if line.id == id => Some(line),
            Stmt::Block(block) => block.lines.iter().find(|line| line.id == id),
            _ => None,
        })
    }

    /// Locates a line as `(statement index, index within block)`.
    fn locate(&self, id: LineId) -> Option<(usize, Option<usize>)> {
        self.stmts.iter().enumerate().find_map(|(i, stmt)| match stmt {
            Stmt::Line(line) if line.id == id => Some((i, None)),
            Stmt::Block(block) => block
                .lines
                .iter()
                .position(|line| line.id == id)
                .map(|j| (i, Some(j))),
            _ => None,
        })
    }

    /// Marks a line removed. It disappears from output after [`cleanup`](Self::cleanup).
    pub fn remove_line(&mut self, id: LineId) {
        if let Some(line) = self.line_mut(id) {
            line.tokens.clear();
        }
    }

    /// Replaces a line's tokens. `tokens` always starts with the verb.
    pub fn update_line(&mut self, id: LineId, tokens: &[String]) {
        match self.locate(id) {
            Some((i, None)) => {
                if let Stmt::Line(line) = &mut self.stmts[i] {
                    line.tokens = tokens.to_vec();
                }
            }
            Some((i, Some(j))) => {
                if let Stmt::Block(block) = &mut self.stmts[i] {
                    block.lines[j].tokens = tokens[1..].to_vec();
                }
            }
            None => {}
        }
    }

    fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.stmts.iter_mut().find_map(|stmt| match stmt {
            Stmt::Line(line) if line.id == id => Some(line),
            Stmt::Block(block) => block.lines.iter_mut().find(|line| line.id == id),
            _ => None,
        })
    }

    /// Adds a directive line and returns its handle.
    ///
    /// The line goes right after `hint` when given. Otherwise it joins the
    /// last statement with the same verb, turning a single line into a
    /// block if needed. With no such statement it is appended to the file.
    pub fn add_line(&mut self, hint: Option<LineId>, tokens: Vec<String>) -> LineId {
        let id = self.next_line_id();
        let verb = tokens[0].clone();

        let anchor = match hint.and_then(|h| self.locate(h)) {
            Some(found) => Some(found),
            None => self
                .stmts
                .iter()
                .rposition(|stmt| stmt.verb() == Some(verb.as_str()))
                .map(|i| (i, None)),
        };

        let new_line = |tokens: Vec<String>| Line {
            id,
            tokens,
            comments: Comments::default(),
            pos: Position::default(),
        };

        let Some((i, within)) = anchor else {
            self.stmts.push(Stmt::Line(new_line(tokens)));
            return id;
        };

        if self.stmts[i].verb() != Some(verb.as_str()) {
            self.stmts.insert(i + 1, Stmt::Line(new_line(tokens)));
            return id;
        }

        match &mut self.stmts[i] {
            Stmt::Block(block) => {
                let at = within.map_or(block.lines.len(), |j| j + 1);
                block.lines.insert(at, new_line(tokens[1..].to_vec()));
            }
            Stmt::Line(line) => {
                let mut first = line.clone();
                first.tokens.remove(0);
                let comments = Comments {
                    before: std::mem::take(&mut first.comments.before),
                    suffix: Vec::new(),
                };
                self.stmts[i] = Stmt::Block(LineBlock {
                    verb,
                    comments,
                    lines: vec![first, new_line(tokens[1..].to_vec())],
                    closing: Vec::new(),
                });
            }
            Stmt::Comment(_) => unreachable!("comment blocks have no verb"),
        }
        id
    }

    /// Drops removed lines and empty blocks, and folds blocks left with a
    /// single entry back into a plain line.
    pub fn cleanup(&mut self) {
        let stmts = std::mem::take(&mut self.stmts);
        for stmt in stmts {
            match stmt {
                Stmt::Line(line) if line.is_removed() => {}
                Stmt::Block(mut block) => {
                    block.lines.retain(|line| !line.is_removed());
                    match block.lines.len() {
                        0 => {}
                        1 if block.closing.is_empty() => {
                            let mut line = block.lines.remove(0);
                            line.tokens.insert(0, block.verb);
                            let mut comments = block.comments;
                            comments.append(line.comments);
                            line.comments = comments;
                            self.stmts.push(Stmt::Line(line));
                        }
                        _ => self.stmts.push(Stmt::Block(block)),
                    }
                }
                other => self.stmts.push(other),
            }
        }
    }

    /// Stable-sorts the entries of every block by their tokens.
    ///
    /// `retract` blocks keep their order: they are ordered by version
    /// interval, which lexical order does not respect.
    pub fn sort_blocks(&mut self) {
        for stmt in &mut self.stmts {
            if let Stmt::Block(block) = stmt {
                if block.verb == "retract" {
                    continue;
                }
                block.lines.sort_by(|a, b| a.tokens.cmp(&b.tokens));
            }
        }
    }
}

//! Parsing, editing, and formatting of go.mod manifests.
//!
//! A [`Manifest`] pairs a lossless [`FileSyntax`] tree with typed views of
//! the directives this crate reasons about (`module`, `go`, `toolchain`,
//! `require`, `exclude`, `replace`). Other directives are kept in the tree
//! and written back untouched.
//!
//! Edits follow a mark-then-sweep model:
//!
//! ```text
//! drop_replace(..)   // marks lines removed
//! cleanup()          // sweeps removed lines and empty blocks
//! add_replace(..)    // inserts next to related lines, or into the replace block
//! sort_blocks()      // drops duplicates, orders block entries
//! format()           // canonical text
//! ```

mod lexer;
mod parse;
mod print;
mod syntax;

pub use lexer::{Position, SyntaxError};
pub use syntax::{FileSyntax, LineId};

use lexer::{auto_quote, unquote};
use std::fmt;
use syntax::Line;

/// A module path with an optional version.
///
/// An empty `version` on the old side of a replace means "all versions";
/// on the new side it means the path is a local directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleVersion {
    pub path: String,
    pub version: String,
}

impl ModuleVersion {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{} {}", self.path, self.version)
        }
    }
}

/// The `module` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub path: String,
    /// Text of a `// Deprecated:` comment on the directive.
    pub deprecated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub module: ModuleVersion,
    pub indirect: bool,
    pub line: LineId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclude {
    pub module: ModuleVersion,
    pub line: LineId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old: ModuleVersion,
    pub new: ModuleVersion,
    pub line: LineId,
}

impl fmt::Display for Replace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.old, self.new)
    }
}

/// A parsed go.mod file.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    module: Option<ModuleDecl>,
    go: Option<String>,
    toolchain: Option<String>,
    require: Vec<Require>,
    exclude: Vec<Exclude>,
    replace: Vec<Replace>,
    syntax: FileSyntax,
}

/// Parses go.mod content.
pub fn parse(data: &[u8]) -> Result<Manifest, SyntaxError> {
    let src = std::str::from_utf8(data).map_err(|e| SyntaxError {
        pos: Position { line: 1, column: 1 },
        message: format!("invalid UTF-8: {}", e),
    })?;
    let syntax = parse::parse_syntax(src)?;
    Manifest::from_syntax(syntax)
}

/// Reports whether `path` names a local directory rather than a module.
///
/// Both Unix and Windows forms are recognized, since a go.mod may move
/// between systems.
pub fn is_directory_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with('/')
        || path.starts_with(".\\")
        || path.starts_with("..\\")
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

fn syntax_error<T>(line: &Line, message: impl Into<String>) -> Result<T, SyntaxError> {
    Err(SyntaxError {
        pos: line.pos,
        message: message.into(),
    })
}

fn arg(line: &Line, token: &str) -> Result<String, SyntaxError> {
    match unquote(token) {
        Some(s) => Ok(s),
        None => syntax_error(line, format!("invalid quoted string: {}", token)),
    }
}

fn deprecation(line: &Line) -> Option<String> {
    line.comments
        .before
        .iter()
        .chain(&line.comments.suffix)
        .filter_map(|c| c.trim().strip_prefix("//"))
        .find_map(|c| c.trim().strip_prefix("Deprecated:"))
        .map(|msg| msg.trim().to_string())
}

fn is_indirect(line: &Line) -> bool {
    line.comments.suffix.iter().any(|c| {
        let body = c.trim().trim_start_matches("//").trim();
        body == "indirect" || body.starts_with("indirect;")
    })
}

const REPLACE_USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4\n\
     \t or replace module/path [v1.2.3] => ../local/directory";

impl Manifest {
    fn from_syntax(syntax: FileSyntax) -> Result<Self, SyntaxError> {
        let mut manifest = Manifest::default();

        for (verb, args, line) in syntax.directives() {
            match verb {
                "module" => {
                    if manifest.module.is_some() {
                        return syntax_error(line, "repeated module statement");
                    }
                    if args.len() != 1 {
                        return syntax_error(line, "usage: module module/path");
                    }
                    manifest.module = Some(ModuleDecl {
                        path: arg(line, &args[0])?,
                        deprecated: deprecation(line),
                    });
                }
                "go" | "toolchain" => {
                    if args.len() != 1 {
                        return syntax_error(line, format!("usage: {} 1.23", verb));
                    }
                    let slot = if verb == "go" {
                        &mut manifest.go
                    } else {
                        &mut manifest.toolchain
                    };
                    if slot.is_some() {
                        return syntax_error(line, format!("repeated {} statement", verb));
                    }
                    *slot = Some(args[0].clone());
                }
                "require" | "exclude" => {
                    if args.len() != 2 {
                        return syntax_error(line, format!("usage: {} module/path v1.2.3", verb));
                    }
                    let module = ModuleVersion::new(arg(line, &args[0])?, arg(line, &args[1])?);
                    if verb == "require" {
                        manifest.require.push(Require {
                            module,
                            indirect: is_indirect(line),
                            line: line.id,
                        });
                    } else {
                        manifest.exclude.push(Exclude {
                            module,
                            line: line.id,
                        });
                    }
                }
                "replace" => {
                    let replace = Self::parse_replace(args, line)?;
                    manifest.replace.push(replace);
                }
                // Kept verbatim in the syntax tree.
                "godebug" | "retract" | "tool" | "ignore" => {
                    if args.is_empty() {
                        return syntax_error(line, format!("usage: {} ...", verb));
                    }
                }
                other => return syntax_error(line, format!("unknown directive: {}", other)),
            }
        }

        manifest.syntax = syntax;
        Ok(manifest)
    }

    fn parse_replace(args: &[String], line: &Line) -> Result<Replace, SyntaxError> {
        let arrow = match args.iter().position(|t| t == "=>") {
            Some(i @ (1 | 2)) => i,
            _ => return syntax_error(line, REPLACE_USAGE),
        };
        let rhs = &args[arrow + 1..];
        if rhs.is_empty() || rhs.len() > 2 {
            return syntax_error(line, REPLACE_USAGE);
        }

        let old = ModuleVersion::new(
            arg(line, &args[0])?,
            if arrow == 2 {
                arg(line, &args[1])?
            } else {
                String::new()
            },
        );
        let new = ModuleVersion::new(
            arg(line, &rhs[0])?,
            match rhs.get(1) {
                Some(v) => arg(line, v)?,
                None => String::new(),
            },
        );

        if new.version.is_empty() && !is_directory_path(&new.path) {
            return syntax_error(
                line,
                "replacement module without version must be directory path \
                 (rooted or starting with ./ or ../)",
            );
        }
        if !new.version.is_empty() && is_directory_path(&new.path) {
            return syntax_error(line, "replacement module directory path must not have version");
        }

        Ok(Replace {
            old,
            new,
            line: line.id,
        })
    }

    pub fn module(&self) -> Option<&ModuleDecl> {
        self.module.as_ref()
    }

    pub fn go_version(&self) -> Option<&str> {
        self.go.as_deref()
    }

    pub fn toolchain(&self) -> Option<&str> {
        self.toolchain.as_deref()
    }

    pub fn requires(&self) -> &[Require] {
        &self.require
    }

    pub fn excludes(&self) -> &[Exclude] {
        &self.exclude
    }

    pub fn replaces(&self) -> &[Replace] {
        &self.replace
    }

    pub fn syntax(&self) -> &FileSyntax {
        &self.syntax
    }

    /// Removes every replace whose old side is exactly `old_path old_version`.
    ///
    /// The lines stay in the syntax tree, marked removed, until [`cleanup`](Self::cleanup).
    pub fn drop_replace(&mut self, old_path: &str, old_version: &str) {
        let syntax = &mut self.syntax;
        self.replace.retain(|r| {
            let hit = r.old.path == old_path && r.old.version == old_version;
            if hit {
                syntax.remove_line(r.line);
            }
            !hit
        });
    }

    /// Adds `old => new`, overwriting existing replaces of the same module.
    ///
    /// The first existing replace with the same old path (and the same old
    /// version, unless `old.version` is empty) is rewritten in place; any
    /// further matches are removed. Later calls therefore win over earlier
    /// ones, and an unversioned replace supersedes versioned replaces of the
    /// same path.
    pub fn add_replace(&mut self, old: &ModuleVersion, new: &ModuleVersion) {
        let mut tokens = vec!["replace".to_string(), auto_quote(&old.path)];
        if !old.version.is_empty() {
            tokens.push(old.version.clone());
        }
        tokens.push("=>".to_string());
        tokens.push(auto_quote(&new.path));
        if !new.version.is_empty() {
            tokens.push(new.version.clone());
        }

        let mut need = true;
        let mut hint = None;
        let mut killed = Vec::new();
        for r in &mut self.replace {
            if r.old.path == old.path && (old.version.is_empty() || r.old.version == old.version) {
                if need {
                    r.old = old.clone();
                    r.new = new.clone();
                    self.syntax.update_line(r.line, &tokens);
                    need = false;
                    continue;
                }
                self.syntax.remove_line(r.line);
                killed.push(r.line);
            }
            if r.old.path == old.path {
                hint = Some(r.line);
            }
        }
        self.replace.retain(|r| !killed.contains(&r.line));

        if need {
            let line = self.syntax.add_line(hint, tokens);
            self.replace.push(Replace {
                old: old.clone(),
                new: new.clone(),
                line,
            });
        }
    }

    /// Sweeps lines marked removed, empty blocks, and one-entry blocks.
    pub fn cleanup(&mut self) {
        self.syntax.cleanup();
    }

    /// Removes duplicate excludes and replaces, then orders the entries of
    /// every block.
    ///
    /// For excludes the first occurrence is kept; for replaces the last one
    /// wins.
    pub fn sort_blocks(&mut self) {
        let mut removed = false;

        let mut seen = std::collections::HashSet::new();
        let syntax = &mut self.syntax;
        self.exclude.retain(|x| {
            let keep = seen.insert(x.module.clone());
            if !keep {
                syntax.remove_line(x.line);
                removed = true;
            }
            keep
        });

        let mut seen = std::collections::HashSet::new();
        let mut dup_lines = Vec::new();
        for r in self.replace.iter().rev() {
            if !seen.insert(r.old.clone()) {
                dup_lines.push(r.line);
            }
        }
        if !dup_lines.is_empty() {
            for &line in &dup_lines {
                self.syntax.remove_line(line);
            }
            self.replace.retain(|r| !dup_lines.contains(&r.line));
            removed = true;
        }

        if removed {
            self.syntax.cleanup();
        }
        self.syntax.sort_blocks();
    }

    /// Renders the manifest in canonical form.
    pub fn format(&self) -> Result<Vec<u8>, String> {
        print::format_syntax(&self.syntax).map(String::into_bytes)
    }
}

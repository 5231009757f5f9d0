//! Canonical text rendering of a [`FileSyntax`].

use super::syntax::{Comments, FileSyntax, Line, Stmt};

/// Renders the tree. Fails if a token or comment cannot be written back
/// without changing the meaning of the file.
pub fn format_syntax(syntax: &FileSyntax) -> Result<String, String> {
    let mut out = String::new();

    for (i, stmt) in syntax.stmts.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match stmt {
            Stmt::Comment(block) => {
                for comment in &block.lines {
                    push_comment(&mut out, "", comment)?;
                }
            }
            Stmt::Line(line) => {
                push_before(&mut out, "", &line.comments)?;
                push_line(&mut out, "", line)?;
            }
            Stmt::Block(block) => {
                push_before(&mut out, "", &block.comments)?;
                out.push_str(&block.verb);
                out.push_str(" (");
                push_suffix(&mut out, &block.comments)?;
                out.push('\n');
                for line in &block.lines {
                    push_before(&mut out, "\t", &line.comments)?;
                    push_line(&mut out, "\t", line)?;
                }
                for comment in &block.closing {
                    push_comment(&mut out, "\t", comment)?;
                }
                out.push_str(")\n");
            }
        }
    }

    Ok(out)
}

fn push_before(out: &mut String, indent: &str, comments: &Comments) -> Result<(), String> {
    for comment in &comments.before {
        push_comment(out, indent, comment)?;
    }
    Ok(())
}

fn push_comment(out: &mut String, indent: &str, comment: &str) -> Result<(), String> {
    if comment.is_empty() {
        // Group separator; never doubled and never right after `(`.
        if !out.ends_with("\n\n") && !out.ends_with("(\n") && !out.is_empty() {
            out.push('\n');
        }
        return Ok(());
    }
    check_comment(comment)?;
    out.push_str(indent);
    out.push_str(comment.trim());
    out.push('\n');
    Ok(())
}

fn push_suffix(out: &mut String, comments: &Comments) -> Result<(), String> {
    for comment in &comments.suffix {
        check_comment(comment)?;
        out.push(' ');
        out.push_str(comment.trim());
    }
    Ok(())
}

fn push_line(out: &mut String, indent: &str, line: &Line) -> Result<(), String> {
    out.push_str(indent);
    for (i, token) in line.tokens.iter().enumerate() {
        if token.is_empty() || token.contains(['\n', '\r']) {
            return Err(format!("invalid token {:?} in directive", token));
        }
        let glued = token == "," || token == "]" || (i > 0 && line.tokens[i - 1] == "[");
        if i > 0 && !glued {
            out.push(' ');
        }
        out.push_str(token);
    }
    push_suffix(out, &line.comments)?;
    out.push('\n');
    Ok(())
}

fn check_comment(comment: &str) -> Result<(), String> {
    if !comment.trim_start().starts_with("//") || comment.contains(['\n', '\r']) {
        return Err(format!("invalid comment {:?}", comment));
    }
    Ok(())
}

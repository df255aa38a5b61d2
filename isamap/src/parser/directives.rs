//! Directive grammar
//!
//! One directive per physical line, leading whitespace ignored:
//!
//! ```text
//! .file <id> "<path>"
//! .file <id> "<dir>" "<file>"        [md5 0x...] [source "..."]
//! .loc  <fileId> <line> [<column>]   [prologue_end] [is_stmt 0] ...
//! .section .text.<name>,"axG",@progbits,<name>,comdat
//! .globl <symbol>
//! ```
//!
//! Anything else, including malformed variants of the above, parses to
//! `None` and is ignored by every consumer.

use crate::domain::FileId;

/// A recognized debug or layout directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    File { id: FileId, directory: Option<String>, file: String },
    Loc { file: FileId, line: u32, column: Option<u32> },
    Section { name: &'a str },
    Globl { symbol: &'a str },
}

/// Parse one assembly line into a directive
#[must_use]
pub fn parse_directive(line: &str) -> Option<Directive<'_>> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('.') {
        return None;
    }
    let (keyword, rest) = split_keyword(trimmed);

    match keyword {
        ".file" => parse_file(rest),
        ".loc" => parse_loc(rest),
        ".section" => parse_section(rest),
        ".globl" => {
            let symbol = rest.split_whitespace().next()?;
            Some(Directive::Globl { symbol })
        }
        _ => None,
    }
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], &line[pos..]),
        None => (line, ""),
    }
}

fn parse_file(rest: &str) -> Option<Directive<'static>> {
    let rest = rest.trim_start();
    let id_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let id: u32 = rest[..id_end].parse().ok()?;

    let (first, rest) = parse_quoted(&rest[id_end..])?;
    let (second, rest) = match parse_quoted(rest) {
        Some((second, rest)) => (Some(second), rest),
        None => (None, rest),
    };

    // DWARF 5 attributes may follow the path; another quoted string may not.
    let tail = rest.trim_start();
    if !(tail.is_empty() || tail.starts_with(|c: char| c.is_ascii_alphabetic())) {
        return None;
    }

    let (directory, file) = match second {
        Some(file) => (Some(first), file),
        None => (None, first),
    };
    Some(Directive::File { id: FileId(id), directory, file })
}

/// Read one double-quoted string, returning its unescaped content and the remainder
fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let input = input.trim_start();
    let mut chars = input.char_indices();
    if chars.next()?.1 != '"' {
        return None;
    }

    let mut value = String::new();
    let mut escaped = false;
    for (idx, c) in chars {
        if escaped {
            value.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some((value, &input[idx + 1..]));
        } else {
            value.push(c);
        }
    }
    None
}

fn parse_loc(rest: &str) -> Option<Directive<'static>> {
    let mut tokens = rest.split_whitespace();
    let file = tokens.next()?.parse().ok()?;
    let line = tokens.next()?.parse().ok()?;
    let column = tokens.next().and_then(|t| t.parse().ok());
    Some(Directive::Loc { file: FileId(file), line, column })
}

fn parse_section(rest: &str) -> Option<Directive<'_>> {
    let name = rest.split(',').next()?.trim().trim_matches('"');
    if name.is_empty() {
        return None;
    }
    Some(Directive::Section { name })
}

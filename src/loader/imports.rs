//! Reading the package clause and import declarations of a source file.
//!
//! Only the file header is scanned: the scan stops at the first declaration
//! that is not an import. Malformed headers yield whatever was read up to
//! that point.

use anyhow::Result;
use regex::Regex;

/// Package clause and imports of one source file, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileHeader {
    pub package: Option<String>,
    pub imports: Vec<String>,
}

/// Compiled patterns for [`FileHeader`] scanning.
#[derive(Debug, Clone)]
pub struct HeaderScanner {
    comments: Regex,
    clause: Regex,
    decl: Regex,
    spec: Regex,
}

impl HeaderScanner {
    pub fn new() -> Result<Self> {
        let path = r#"("(?:[^"\\\n]|\\.)*"|`[^`]*`)"#;
        Ok(HeaderScanner {
            comments: Regex::new(r"(?s)/\*.*?\*/|//[^\n]*")?,
            clause: Regex::new(r"\A\s*package\s+(\w+)")?,
            decl: Regex::new(&format!(
                r"\A[\s;]*import\s*(?:\(([^)]*)\)|((?:[\w.]+\s+)?{}))",
                path
            ))?,
            spec: Regex::new(&format!(r"(?:[\w.]+\s+)?{}", path))?,
        })
    }

    /// Scan the header of a source file.
    pub fn scan(&self, source: &str) -> FileHeader {
        let text = self.comments.replace_all(source, " ");
        let mut header = FileHeader::default();

        let Some(clause) = self.clause.captures(&text) else {
            return header;
        };
        header.package = Some(clause[1].to_string());

        let mut rest = &text[clause[0].len()..];
        while let Some(decl) = self.decl.captures(rest) {
            let specs = decl.get(1).or_else(|| decl.get(2)).map_or("", |m| m.as_str());
            for spec in self.spec.captures_iter(specs) {
                header.imports.push(unquote(&spec[1]));
            }
            rest = &rest[decl[0].len()..];
        }
        header
    }
}

/// Strip the quotes of an import path literal.
fn unquote(literal: &str) -> String {
    let body = &literal[1..literal.len() - 1];
    if literal.starts_with('`') {
        return body.to_string();
    }
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => value.extend(chars.next()),
            c => value.push(c),
        }
    }
    value
}

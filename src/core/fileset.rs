//! Position mapping for loaded source files.
//!
//! A [`FileSet`] assigns every file a contiguous range of absolute offsets
//! starting at its `base`. Diagnostics carry a single absolute offset and
//! the file set turns it back into a file name, line and column.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error while building a file set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileSetError {
    #[error("invalid base {base} for `{name}` (next free base is {next})")]
    InvalidBase {
        name: PathBuf,
        base: usize,
        next: usize,
    },
}

/// A single file registered in a [`FileSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: PathBuf,
    base: usize,
    size: usize,
    /// Offset of the first byte of each line, relative to the file start
    lines: Vec<usize>,
}

impl SourceFile {
    /// The recorded file name.
    pub fn name(&self) -> &Path {
        &self.name
    }

    /// First absolute offset of this file.
    pub fn base(&self) -> usize {
        self.base
    }

    /// File size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Line start offsets.
    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    /// Record line starts from the file content.
    ///
    /// A newline that is the last byte of the content does not open a new line.
    pub fn set_lines_for_content(&mut self, content: &[u8]) {
        let mut lines = Vec::new();
        let mut line = Some(0);
        for (offset, &b) in content.iter().enumerate() {
            if let Some(start) = line.take() {
                lines.push(start);
            }
            if b == b'\n' {
                line = Some(offset + 1);
            }
        }
        self.lines = lines;
    }

    fn contains(&self, offset: usize) -> bool {
        self.base <= offset && offset <= self.base + self.size
    }

    fn position(&self, offset: usize) -> Position {
        let rel = offset - self.base;
        // Index of the last line start <= rel.
        let idx = self.lines.partition_point(|&start| start <= rel);
        let (line, column) = match idx {
            0 => (1, rel + 1),
            i => (i, rel - self.lines[i - 1] + 1),
        };
        Position {
            filename: self.name.clone(),
            offset: rel,
            line,
            column,
        }
    }
}

/// A resolved source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub filename: PathBuf,
    /// Byte offset within the file
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, in bytes
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename.display(), self.line, self.column)
    }
}

/// Ordered table of source files keyed by absolute offset ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<SourceFile>,
    next_base: usize,
}

impl Default for FileSet {
    fn default() -> Self {
        FileSet::new()
    }
}

impl FileSet {
    /// Create an empty file set. Offset 0 is never assigned to a file.
    pub fn new() -> Self {
        FileSet {
            files: Vec::new(),
            next_base: 1,
        }
    }

    /// Next base that `add_file` will accept.
    pub fn base(&self) -> usize {
        self.next_base
    }

    /// Register a file covering `[base, base + size]`.
    pub fn add_file(
        &mut self,
        name: impl Into<PathBuf>,
        base: usize,
        size: usize,
    ) -> Result<&mut SourceFile, FileSetError> {
        let name = name.into();
        if base < self.next_base {
            return Err(FileSetError::InvalidBase {
                name,
                base,
                next: self.next_base,
            });
        }
        self.next_base = base + size + 1;
        self.files.push(SourceFile {
            name,
            base,
            size,
            lines: vec![0],
        });
        let last = self.files.len() - 1;
        Ok(&mut self.files[last])
    }

    /// Register a file at the next free base and record its lines.
    pub fn push_file(
        &mut self,
        name: impl Into<PathBuf>,
        content: &[u8],
    ) -> Result<&SourceFile, FileSetError> {
        let base = self.next_base;
        let file = self.add_file(name, base, content.len())?;
        file.set_lines_for_content(content);
        Ok(file)
    }

    /// Files in base order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the set has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find a file by recorded name.
    pub fn file_by_name(&self, name: &Path) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Find the file containing an absolute offset.
    pub fn file(&self, offset: usize) -> Option<&SourceFile> {
        let idx = self.files.partition_point(|f| f.base <= offset);
        let file = self.files.get(idx.checked_sub(1)?)?;
        file.contains(offset).then_some(file)
    }

    /// Resolve an absolute offset to a position.
    pub fn position(&self, offset: usize) -> Option<Position> {
        self.file(offset).map(|f| f.position(offset))
    }
}

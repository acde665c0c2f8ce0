pub mod cli;
pub mod fingerprint;
pub mod parser;
pub mod query;

pub use parser::{ParseError, Parser, parse_diff};
pub use query::{DiffStats, LineInfo};

use serde::{Deserialize, Serialize};

/// Kind of a line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Added,
    Removed,
    Context,
}

impl LineKind {
    /// The diff marker character this kind is written with.
    pub fn marker(self) -> char {
        match self {
            LineKind::Added => '+',
            LineKind::Removed => '-',
            LineKind::Context => ' ',
        }
    }
}

/// A single physical line of a hunk, marker stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub kind: LineKind,
    pub content: String,
    /// Position in the new file.
    ///
    /// Added and context lines carry their new-file line number. Removed
    /// lines carry the number of the new-file line just before them, which
    /// is `-1` for a removal at the top of a hunk starting at line 0.
    pub number: i64,
}

/// A single diff hunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    pub lines: Vec<Line>,
}

/// One file's change record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub hunks: Vec<Hunk>,
    pub is_new: bool,
    pub is_deleted: bool,
    pub is_renamed: bool,
    pub is_copied: bool,
    pub is_binary: bool,
    /// Empty when no mode line was seen.
    pub old_mode: String,
    /// Empty when no mode line was seen.
    pub new_mode: String,
    /// Only meaningful for renames and copies.
    pub similarity: u32,
}

impl FileDiff {
    /// Start a record from the paths of a `diff --git` header.
    pub fn new(old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            ..Self::default()
        }
    }

    /// True when both modes were observed and differ.
    pub fn is_mode_change(&self) -> bool {
        !self.old_mode.is_empty() && !self.new_mode.is_empty() && self.old_mode != self.new_mode
    }

    /// Path to show for this file: `old -> new` for renames and copies.
    pub fn display_path(&self) -> String {
        if (self.is_renamed || self.is_copied) && self.old_path != self.new_path {
            format!("{} -> {}", self.old_path, self.new_path)
        } else {
            self.new_path.clone()
        }
    }
}

/// A complete parsed diff: files in textual order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub files: Vec<FileDiff>,
}

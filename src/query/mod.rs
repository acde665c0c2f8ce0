use crate::{Diff, FileDiff, Hunk, Line, LineKind};
use serde::{Deserialize, Serialize};

/// A changed line flattened out of its file and hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInfo {
    pub file: String,
    pub line: i64,
    pub content: String,
    pub kind: LineKind,
}

/// Summary counts for a diff. Context lines are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub files: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl Diff {
    /// Every line of the diff with the file it belongs to, in file, hunk,
    /// line order.
    fn lines_with_file(&self) -> impl Iterator<Item = (&FileDiff, &Line)> {
        self.files.iter().flat_map(|file| {
            file.hunks
                .iter()
                .flat_map(|hunk| hunk.lines.iter())
                .map(move |line| (file, line))
        })
    }

    /// All added lines, attributed to each file's new path.
    pub fn added_lines(&self) -> Vec<LineInfo> {
        self.lines_with_file()
            .filter(|(_, line)| line.kind == LineKind::Added)
            .map(|(file, line)| LineInfo {
                file: file.new_path.clone(),
                line: line.number,
                content: line.content.clone(),
                kind: line.kind,
            })
            .collect()
    }

    /// All removed lines, attributed to each file's old path.
    pub fn removed_lines(&self) -> Vec<LineInfo> {
        self.lines_with_file()
            .filter(|(_, line)| line.kind == LineKind::Removed)
            .map(|(file, line)| LineInfo {
                file: file.old_path.clone(),
                line: line.number,
                content: line.content.clone(),
                kind: line.kind,
            })
            .collect()
    }

    /// New path of every file, in order. Repeated paths are kept.
    pub fn modified_files(&self) -> Vec<String> {
        self.files.iter().map(|file| file.new_path.clone()).collect()
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats {
            files: self.files.len(),
            ..DiffStats::default()
        };

        for (_, line) in self.lines_with_file() {
            match line.kind {
                LineKind::Added => stats.lines_added += 1,
                LineKind::Removed => stats.lines_removed += 1,
                LineKind::Context => {}
            }
        }

        stats
    }
}

impl Hunk {
    /// True if the hunk adds or removes at least one line.
    pub fn has_changes(&self) -> bool {
        self.lines
            .iter()
            .any(|line| matches!(line.kind, LineKind::Added | LineKind::Removed))
    }

    /// Lines within `window` positions of `index` on either side, clamped to
    /// the hunk. Returns an empty slice when `index` is past the end.
    pub fn context_around_line(&self, index: usize, window: usize) -> &[Line] {
        let start = index.saturating_sub(window).min(self.lines.len());
        let end = index
            .saturating_add(window)
            .saturating_add(1)
            .min(self.lines.len());
        &self.lines[start..end]
    }
}

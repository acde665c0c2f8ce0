use crate::{Diff, FileDiff, Hunk, Line, LineKind};
use regex::{Captures, Regex};
use std::io::BufRead;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur while parsing a diff.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty diff content")]
    EmptyInput,
    #[error("error reading diff: {0}")]
    Read(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ParseError>;

const DEV_NULL: &str = "/dev/null";

static FILE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^diff --git a/(.*) b/(.*)$").expect("Invalid file header regex")
});
static OLD_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--- (/dev/null|a/.*)$").expect("Invalid old file regex")
});
static NEW_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+\+\+ (/dev/null|b/.*)$").expect("Invalid new file regex")
});
static BINARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Binary files (.*) and (.*) differ$").expect("Invalid binary regex")
});
static NEW_FILE_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^new file mode (\d+)$").expect("Invalid new file mode regex"));
static DELETED_FILE_MODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^deleted file mode (\d+)$").expect("Invalid deleted file mode regex")
});
static OLD_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^old mode (\d+)$").expect("Invalid old mode regex"));
static NEW_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^new mode (\d+)$").expect("Invalid new mode regex"));
static RENAME_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rename from (.*)$").expect("Invalid rename from regex"));
static RENAME_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rename to (.*)$").expect("Invalid rename to regex"));
static COPY_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^copy from (.*)$").expect("Invalid copy from regex"));
static COPY_TO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^copy to (.*)$").expect("Invalid copy to regex"));
static SIMILARITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^similarity index (\d+)%$").expect("Invalid similarity regex")
});
static INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^index ([0-9a-f]+)\.\.([0-9a-f]+)").expect("Invalid index regex")
});
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d*))? \+(\d+)(?:,(\d*))? @@").expect("Invalid hunk header regex")
});

/// Old and new ranges from a `@@ -a,b +c,d @@` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkRange {
    old_start: u32,
    old_count: u32,
    new_start: u32,
    new_count: u32,
}

/// What a single input line is, before any parser state is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineShape<'a> {
    FileHeader { old_path: &'a str, new_path: &'a str },
    OldFile { path: &'a str },
    NewFile { path: &'a str },
    Binary,
    NewFileMode(&'a str),
    DeletedFileMode(&'a str),
    OldMode(&'a str),
    NewMode(&'a str),
    RenameFrom(&'a str),
    RenameTo(&'a str),
    CopyFrom(&'a str),
    CopyTo(&'a str),
    Similarity(u32),
    Index,
    HunkHeader(HunkRange),
    Added(&'a str),
    Removed(&'a str),
    Context(&'a str),
    Unrecognized,
}

fn group<'a>(caps: &Captures<'a>, i: usize) -> &'a str {
    caps.get(i).map_or("", |m| m.as_str())
}

/// Parse a numeric capture, falling back to `default` when the group is
/// absent or empty and to 0 when it does not fit.
fn number(caps: &Captures<'_>, i: usize, default: u32) -> u32 {
    match caps.get(i).map(|m| m.as_str()) {
        None | Some("") => default,
        Some(digits) => digits.parse().unwrap_or(0),
    }
}

/// Classify a line. The first matching shape wins, so metadata markers are
/// tested before the generic `+`/`-`/` ` content shapes.
fn classify<'a>(line: &'a str) -> LineShape<'a> {
    if let Some(caps) = FILE_HEADER.captures(line) {
        return LineShape::FileHeader {
            old_path: group(&caps, 1),
            new_path: group(&caps, 2),
        };
    }
    if let Some(caps) = OLD_FILE.captures(line) {
        return LineShape::OldFile {
            path: group(&caps, 1),
        };
    }
    if let Some(caps) = NEW_FILE.captures(line) {
        return LineShape::NewFile {
            path: group(&caps, 1),
        };
    }
    if BINARY.is_match(line) {
        return LineShape::Binary;
    }

    let captured: [(&Regex, fn(&'a str) -> LineShape<'a>); 8] = [
        (&*NEW_FILE_MODE, LineShape::NewFileMode),
        (&*DELETED_FILE_MODE, LineShape::DeletedFileMode),
        (&*OLD_MODE, LineShape::OldMode),
        (&*NEW_MODE, LineShape::NewMode),
        (&*RENAME_FROM, LineShape::RenameFrom),
        (&*RENAME_TO, LineShape::RenameTo),
        (&*COPY_FROM, LineShape::CopyFrom),
        (&*COPY_TO, LineShape::CopyTo),
    ];
    for (pattern, shape) in captured {
        if let Some(caps) = pattern.captures(line) {
            return shape(group(&caps, 1));
        }
    }

    if let Some(caps) = SIMILARITY.captures(line) {
        return LineShape::Similarity(number(&caps, 1, 0));
    }
    if INDEX.is_match(line) {
        return LineShape::Index;
    }
    if let Some(caps) = HUNK_HEADER.captures(line) {
        return LineShape::HunkHeader(HunkRange {
            old_start: number(&caps, 1, 0),
            old_count: number(&caps, 2, 1),
            new_start: number(&caps, 3, 0),
            new_count: number(&caps, 4, 1),
        });
    }

    if let Some(content) = line.strip_prefix('+') {
        if !line.starts_with("+++") {
            return LineShape::Added(content);
        }
    } else if let Some(content) = line.strip_prefix('-') {
        if !line.starts_with("---") {
            return LineShape::Removed(content);
        }
    } else if let Some(content) = line.strip_prefix(' ') {
        return LineShape::Context(content);
    }

    LineShape::Unrecognized
}

/// Single-pass accumulator holding at most one open file and one open hunk.
#[derive(Debug, Default)]
struct DiffBuilder {
    files: Vec<FileDiff>,
    file: Option<FileDiff>,
    hunk: Option<Hunk>,
    /// Next new-file line number inside the open hunk.
    next_line: i64,
}

impl DiffBuilder {
    fn feed(&mut self, line: &str) {
        match classify(line) {
            LineShape::FileHeader { old_path, new_path } => {
                self.flush_file();
                debug!(old_path, new_path, "file header");
                self.file = Some(FileDiff::new(old_path, new_path));
            }
            LineShape::OldFile { path } => {
                if let Some(file) = self.file.as_mut()
                    && path == DEV_NULL
                {
                    file.is_new = true;
                }
            }
            LineShape::NewFile { path } => {
                if let Some(file) = self.file.as_mut()
                    && path == DEV_NULL
                {
                    file.is_deleted = true;
                }
            }
            LineShape::Binary => self.with_file(|file| file.is_binary = true),
            LineShape::NewFileMode(mode) => self.with_file(|file| {
                file.is_new = true;
                file.new_mode = mode.to_string();
            }),
            LineShape::DeletedFileMode(mode) => self.with_file(|file| {
                file.is_deleted = true;
                file.old_mode = mode.to_string();
            }),
            LineShape::OldMode(mode) => self.with_file(|file| file.old_mode = mode.to_string()),
            LineShape::NewMode(mode) => self.with_file(|file| file.new_mode = mode.to_string()),
            LineShape::RenameFrom(path) => self.with_file(|file| {
                file.is_renamed = true;
                file.old_path = path.to_string();
            }),
            LineShape::RenameTo(path) => self.with_file(|file| {
                file.is_renamed = true;
                file.new_path = path.to_string();
            }),
            LineShape::CopyFrom(path) => self.with_file(|file| {
                file.is_copied = true;
                file.old_path = path.to_string();
            }),
            LineShape::CopyTo(path) => self.with_file(|file| {
                file.is_copied = true;
                file.new_path = path.to_string();
            }),
            LineShape::Similarity(percent) => self.with_file(|file| file.similarity = percent),
            LineShape::Index => {}
            LineShape::HunkHeader(range) => self.open_hunk(range),
            LineShape::Added(content) => self.push_line(LineKind::Added, content),
            LineShape::Removed(content) => self.push_line(LineKind::Removed, content),
            LineShape::Context(content) => self.push_line(LineKind::Context, content),
            LineShape::Unrecognized => trace!(line, "skipping unrecognized line"),
        }
    }

    fn with_file(&mut self, apply: impl FnOnce(&mut FileDiff)) {
        match self.file.as_mut() {
            Some(file) => apply(file),
            None => trace!("skipping file metadata before any file header"),
        }
    }

    fn open_hunk(&mut self, range: HunkRange) {
        self.flush_hunk();
        if self.file.is_none() {
            debug!("skipping hunk header before any file header");
            return;
        }
        self.next_line = i64::from(range.new_start);
        self.hunk = Some(Hunk {
            old_start: range.old_start,
            old_count: range.old_count,
            new_start: range.new_start,
            new_count: range.new_count,
            lines: Vec::new(),
        });
    }

    fn push_line(&mut self, kind: LineKind, content: &str) {
        let Some(hunk) = self.hunk.as_mut() else {
            trace!(content, "skipping content line outside a hunk");
            return;
        };

        // Removed lines do not exist in the new file, so they take the
        // number of the preceding new-file line and do not advance.
        let number = match kind {
            LineKind::Removed => self.next_line - 1,
            LineKind::Added | LineKind::Context => {
                let number = self.next_line;
                self.next_line += 1;
                number
            }
        };

        hunk.lines.push(Line {
            kind,
            content: content.to_string(),
            number,
        });
    }

    fn flush_hunk(&mut self) {
        if let Some(hunk) = self.hunk.take()
            && let Some(file) = self.file.as_mut()
        {
            file.hunks.push(hunk);
        }
    }

    fn flush_file(&mut self) {
        self.flush_hunk();
        if let Some(file) = self.file.take() {
            self.files.push(file);
        }
    }

    fn finish(mut self) -> Diff {
        self.flush_file();
        debug!(files = self.files.len(), "parsed diff");
        Diff { files: self.files }
    }
}

/// Parser for `git diff` output.
///
/// Holds no state between calls; every parse starts from a fresh builder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Parse raw `git diff` output into a [`Diff`].
    ///
    /// Extended git headers (renames, copies, modes, similarity, binary
    /// markers) are recorded on the file they belong to. Lines the parser
    /// does not recognize are skipped.
    ///
    /// Returns [`ParseError::EmptyInput`] when `content` is empty.
    pub fn parse(&self, content: &str) -> Result<Diff> {
        if content.is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let mut builder = DiffBuilder::default();
        for line in content.lines() {
            builder.feed(line);
        }
        Ok(builder.finish())
    }

    /// Parse a diff read line by line from `reader`.
    ///
    /// Read failures, including invalid UTF-8, surface as
    /// [`ParseError::Read`]. A reader that yields nothing is
    /// [`ParseError::EmptyInput`].
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Diff> {
        let mut builder = DiffBuilder::default();
        let mut saw_input = false;

        for line in reader.lines() {
            let line = line?;
            saw_input = true;
            builder.feed(&line);
        }

        if !saw_input {
            return Err(ParseError::EmptyInput);
        }
        Ok(builder.finish())
    }
}

/// Parse raw `git diff` output with a default [`Parser`].
pub fn parse_diff(input: &str) -> Result<Diff> {
    Parser::new().parse(input)
}

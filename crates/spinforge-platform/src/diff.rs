//! Line diffs between the platform's copy of a spec and the compiled one

use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Added,
    Removed,
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub line_type: LineType,
    pub content: String,
}

/// A computed diff, grouped into hunks of changed lines with context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecDiff {
    pub hunks: Vec<Vec<DiffLine>>,
    pub additions: usize,
    pub deletions: usize,
}

impl SpecDiff {
    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }

    /// Plain unified-style text (`+`, `-`, ` ` prefixes, `@@` between hunks)
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (index, hunk) in self.hunks.iter().enumerate() {
            if index > 0 {
                out.push_str("@@\n");
            }
            for line in hunk {
                let prefix = match line.line_type {
                    LineType::Added => '+',
                    LineType::Removed => '-',
                    LineType::Context => ' ',
                };
                out.push(prefix);
                out.push_str(&line.content);
                out.push('\n');
            }
        }
        out
    }
}

pub struct DiffEngine {
    /// Unchanged lines kept around each change
    pub context_lines: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self { context_lines: 3 }
    }

    pub fn with_context(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn diff(&self, old: &str, new: &str) -> SpecDiff {
        let text_diff = TextDiff::from_lines(old, new);
        let mut result = SpecDiff::default();

        for group in text_diff.grouped_ops(self.context_lines) {
            let mut hunk = Vec::new();
            for op in &group {
                for change in text_diff.iter_changes(op) {
                    let line_type = match change.tag() {
                        ChangeTag::Insert => {
                            result.additions += 1;
                            LineType::Added
                        }
                        ChangeTag::Delete => {
                            result.deletions += 1;
                            LineType::Removed
                        }
                        ChangeTag::Equal => LineType::Context,
                    };
                    hunk.push(DiffLine {
                        line_type,
                        content: change.value().trim_end_matches('\n').to_string(),
                    });
                }
            }
            result.hunks.push(hunk);
        }

        result
    }
}

//! `GO` batch separation

/// A slice of the script between `GO` separators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Batch<'a> {
    pub content: &'a str,
    /// 1-based line of the first line of `content` within the script
    pub start_line: usize,
}

impl Batch<'_> {
    /// Line and column just past the last non-whitespace character
    pub fn end_location(&self) -> (usize, usize) {
        let mut line = self.start_line;
        let mut column = 1;

        for ch in self.content.trim_end().chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        (line, column)
    }
}

/// Split on lines consisting only of `GO` or `GO;` (any case)
pub(crate) fn split_batches(content: &str) -> Vec<Batch<'_>> {
    let mut batches = Vec::new();
    let mut current_pos = 0;
    let mut batch_start = 0;
    let mut current_line = 1;
    let mut batch_start_line = 1;

    for line in content.lines() {
        let trimmed = line.trim();
        let line_end = current_pos + line.len();
        let next_pos = if content[line_end..].starts_with("\r\n") {
            line_end + 2
        } else if content[line_end..].starts_with('\n') {
            line_end + 1
        } else {
            line_end
        };

        if trimmed.eq_ignore_ascii_case("go") || trimmed.eq_ignore_ascii_case("go;") {
            if current_pos > batch_start {
                batches.push(Batch {
                    content: &content[batch_start..current_pos],
                    start_line: batch_start_line,
                });
            }
            batch_start = next_pos;
            batch_start_line = current_line + 1;
        }

        current_pos = next_pos;
        current_line += 1;
    }

    if batch_start < content.len() {
        batches.push(Batch {
            content: &content[batch_start..],
            start_line: batch_start_line,
        });
    }

    batches
}

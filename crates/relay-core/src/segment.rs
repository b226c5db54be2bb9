//! Chunking of rendered lines into size-bounded output segments.

/// Pack lines into newline-joined segments of less than `max_chars`
/// characters.
///
/// The ceiling counts characters, not bytes, so multibyte chat fills a
/// segment at the same rate as ASCII. Before a line is added, the segment
/// is closed if its rendered length after adding would meet or exceed the
/// ceiling. Lines are never split, so a single line longer than the
/// ceiling forms a segment on its own. The trailing segment is always
/// flushed when non-empty; empty trailing segments are suppressed.
/// Segment order equals input order.
pub fn chunk_lines<I, S>(lines: I, max_chars: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for line in lines {
        let line = line.as_ref();
        let line_chars = line.chars().count();
        let added_chars = if current.is_empty() {
            line_chars
        } else {
            // +1 for the joining newline
            current_chars + 1 + line_chars
        };

        if !current.is_empty() && added_chars >= max_chars {
            segments.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        if !current.is_empty() {
            current.push('\n');
            current_chars += 1;
        }
        current.push_str(line);
        current_chars += line_chars;
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

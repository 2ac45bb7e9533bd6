//! Line-boundary chunking of oversized inputs

/// Split `content` into ordered chunks of at most `max_chars` characters.
///
/// Lines are never split. A single line longer than the budget becomes a
/// chunk of its own. Concatenating the chunks reproduces `content` exactly,
/// and empty content yields one empty chunk.
pub fn split_content(content: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in content.split_inclusive('\n') {
        let line_len = line.chars().count();
        if !current.is_empty() && current_len + line_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() || chunks.is_empty() {
        chunks.push(current);
    }

    chunks
}

//! Line-bounded chunking of statement text.
//!
//! Lines are never split: a line longer than `max_chars` gets a chunk of
//! its own rather than being truncated, so no transaction row is cut in
//! half. Sizes are counted in characters, not bytes.

use crate::types::TextChunk;

pub const DEFAULT_MAX_CHARS: usize = 8000;

/// Split `text` on `\n` and pack consecutive lines into chunks of at most
/// `max_chars` characters (joining newlines included).
///
/// Joining the returned contents with `"\n"` reproduces `text` exactly.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<TextChunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let separator = usize::from(!current.is_empty());

        if !current.is_empty() && current_len + separator + line_len > max_chars {
            chunks.push(TextChunk {
                index: chunks.len(),
                content: current.join("\n"),
            });
            current.clear();
            current.push(line);
            current_len = line_len;
        } else {
            current.push(line);
            current_len += separator + line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(TextChunk {
            index: chunks.len(),
            content: current.join("\n"),
        });
    }

    chunks
}

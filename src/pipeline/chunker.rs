use super::types::RawChunk;

/// Split statement text into chunks of at most `max_chunk_size` characters,
/// breaking only on line boundaries so a single transaction line is never
/// split mid-record.
///
/// Lines accumulate into a buffer; when appending the next line would exceed
/// the limit, the buffer is flushed (trimmed) and the line starts a new one.
/// A single line longer than `max_chunk_size` becomes its own oversized
/// chunk rather than being re-split.
///
/// Pure function: empty input yields no chunks, no failure modes.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<RawChunk> {
    debug_assert!(max_chunk_size > 0, "max_chunk_size must be positive");

    let mut chunks = Vec::new();
    let mut buffer = String::new();

    for line in text.lines() {
        let sep = if buffer.is_empty() { 0 } else { 1 };
        if buffer.len() + sep + line.len() > max_chunk_size {
            flush(&mut chunks, &mut buffer);
            buffer.push_str(line);
        } else {
            if !buffer.is_empty() {
                buffer.push('\n');
            }
            buffer.push_str(line);
        }
    }

    flush(&mut chunks, &mut buffer);
    chunks
}

/// Push the trimmed buffer as a chunk if it holds any text, then clear it.
fn flush(chunks: &mut Vec<RawChunk>, buffer: &mut String) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        chunks.push(RawChunk {
            index: chunks.len(),
            text: trimmed.to_string(),
            approx_size: trimmed.chars().count(),
        });
    }
    buffer.clear();
}

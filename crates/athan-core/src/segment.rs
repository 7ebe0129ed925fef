//! Text segmentation utilities sized for the Notion API.
//!
//! Notion caps rich_text payloads at 2000 characters per block and select /
//! multi-select option names at 100, so summaries, titles, tags, and the
//! transcription body all have to be cut down before a page write. All
//! functions here count Unicode scalar values, never bytes: Burmese script
//! is multi-byte in UTF-8 and a byte-indexed cut would split characters.
//!
//! Boundary characters recognized in Burmese text:
//! - `။` (U+104B) sentence ending
//! - `၊` (U+104A) clause separator / comma

/// Burmese sentence ending.
const MYANMAR_SECTION: char = '။';

/// Burmese comma.
const MYANMAR_COMMA: char = '၊';

/// Truncate a summary, preserving word/sentence boundaries where possible.
///
/// Returns the input unchanged when it fits. Otherwise cuts to
/// `max_length - 10` (a reserved margin against awkward cuts in multi-byte
/// text), moves the cut back to the last space or Burmese delimiter when
/// that boundary lies within the final 30% of the slice, trims, and
/// appends `"..."`.
///
/// Empty input yields an empty string with no ellipsis.
pub fn truncate_summary(text: &str, max_length: usize) -> String {
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.to_string();
    }

    let safe_max = max_length.saturating_sub(10);
    let truncated = &chars[..safe_max];

    let boundary = truncated
        .iter()
        .rposition(|&c| c == ' ' || c == MYANMAR_SECTION || c == MYANMAR_COMMA);

    // Only use the boundary if it falls in the last 30% of the slice;
    // an early boundary would throw away too much of the summary.
    let cut = match boundary {
        Some(pos) if pos as f64 > safe_max as f64 * 0.7 => pos,
        _ => safe_max,
    };

    let head: String = chars[..cut].iter().collect();
    format!("{}...", head.trim())
}

/// Hard truncation with an ellipsis, no boundary search.
///
/// When truncation occurs the result is exactly `max_length` characters:
/// `max_length - 3` characters of input plus `"..."`. Within-limit input
/// (including the empty string) is returned unchanged.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.to_string();
    }

    let head: String = chars[..max_length.saturating_sub(3)].iter().collect();
    format!("{}...", head)
}

/// Split text into chunks that each fit within `max_chunk_size` characters.
///
/// Prefers to break at a Burmese full stop, Burmese comma, newline, or
/// space, whichever valid boundary sits furthest forward inside the last
/// 200 characters of the window; hard-cuts at the limit when none is
/// found. Each chunk and the remaining tail are trimmed of surrounding
/// whitespace.
///
/// Empty input yields a single empty chunk, never an empty vector — the
/// page writer always emits at least one body block.
pub fn chunk_content(text: &str, max_chunk_size: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut remaining: Vec<char> = text.chars().collect();
    if remaining.len() <= max_chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    loop {
        if remaining.len() <= max_chunk_size {
            chunks.push(remaining.iter().collect::<String>());
            break;
        }

        let search_start = max_chunk_size.saturating_sub(200);
        let window = &remaining[search_start..max_chunk_size];

        // Furthest-forward boundary wins; the cut lands after the
        // boundary character so delimiters stay with their sentence.
        let break_point = match window
            .iter()
            .rposition(|&c| matches!(c, MYANMAR_SECTION | MYANMAR_COMMA | '\n' | ' '))
        {
            Some(offset) => search_start + offset + 1,
            None => max_chunk_size,
        };

        let chunk: String = remaining[..break_point].iter().collect();
        chunks.push(chunk.trim().to_string());

        let tail: String = remaining[break_point..].iter().collect();
        remaining = tail.trim().chars().collect();
        if remaining.is_empty() {
            break;
        }
    }

    chunks
}

//! Bounded-size overlapping text splitting.
//!
//! [`split_text`] is the pure function that turns reader output into
//! fragment-sized pieces. Sizes are counted in chars, not bytes. Each cut
//! prefers the last paragraph break inside the window, then a line break,
//! then a word break, and only hard-splits at a grapheme boundary when a
//! window contains no separator at all.

use unicode_segmentation::UnicodeSegmentation;

/// Split `text` into pieces of at most `size` chars, with `overlap` chars
/// carried from the end of each piece into the next.
///
/// Pieces are trimmed and never empty; `overlap` values of `size` or more
/// are clamped so the window always advances. Deterministic for a fixed
/// input.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let size = size.max(1);
    let overlap = overlap.min(size - 1);
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    while start < text.len() {
        let rest = &text[start..];
        let Some(window_end) = byte_offset_of_char(rest, size) else {
            push_piece(&mut pieces, rest);
            break;
        };

        let cut = cut_point(rest, window_end);
        push_piece(&mut pieces, &rest[..cut]);

        let piece = &rest[..cut];
        let advance = if overlap == 0 {
            cut
        } else {
            // start the next window `overlap` chars before the cut; pieces
            // shorter than the overlap advance in full
            match piece.char_indices().rev().nth(overlap - 1) {
                Some((idx, _)) if idx > 0 => idx,
                _ => cut,
            }
        };
        debug_assert!(advance > 0, "splitter must advance");
        start += advance.max(1);
    }
    pieces
}

/// Byte offset of the exclusive end of the first `count` chars, or `None`
/// when the text has no more than `count` chars.
fn byte_offset_of_char(text: &str, count: usize) -> Option<usize> {
    text.char_indices().nth(count).map(|(idx, _)| idx)
}

/// End offset of the piece to emit from `rest`, at most `window_end`.
fn cut_point(rest: &str, window_end: usize) -> usize {
    let window = &rest[..window_end];
    let bytes = window.as_bytes();

    if let Some(pos) = memchr::memmem::rfind(bytes, b"\n\n") {
        if !window[..pos].trim().is_empty() {
            return pos + 2;
        }
    }
    if let Some(pos) = memchr::memrchr(b'\n', bytes) {
        if !window[..pos].trim().is_empty() {
            return pos + 1;
        }
    }
    if let Some(pos) = memchr::memrchr(b' ', bytes) {
        if !window[..pos].trim().is_empty() {
            return pos + 1;
        }
    }

    // no separator: hard split at the last grapheme boundary inside the
    // window, keeping at least one grapheme
    let mut cut = 0;
    for (idx, _) in rest.grapheme_indices(true) {
        if idx > window_end {
            break;
        }
        cut = idx;
    }
    if cut == 0 {
        rest.graphemes(true)
            .next()
            .map_or(window_end, |first| first.len())
    } else {
        cut
    }
}

fn push_piece(pieces: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        pieces.push(trimmed.to_string());
    }
}

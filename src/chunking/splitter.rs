//! Recursive character splitting with separator tiers and overlap.
//!
//! The splitter walks a fixed priority list of separators: paragraph breaks,
//! then line breaks, then spaces, then single characters. Text is split on
//! the highest-priority separator it contains; any piece still longer than
//! the chunk size descends to the next tier. Sibling pieces below the limit
//! are merged back together greedily, and when a merge window flushes, its
//! trailing pieces are retained up to the overlap budget to seed the next
//! chunk.

use std::collections::VecDeque;

use crate::types::RagError;

/// Separator tiers, highest priority first. The empty string is the terminal
/// tier and splits on character boundaries.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits text into bounded, overlapping segments.
///
/// Lengths are measured in characters, not bytes, so multi-byte text never
/// splits mid-character. Construction validates the size/overlap pair;
/// an overlap that reaches the chunk size would stall the merge window.
#[derive(Clone, Debug)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 {
            return Err(RagError::Configuration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Configuration(format!(
                "chunk_overlap ({chunk_overlap}) must be strictly less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into trimmed, non-empty segments of at most
    /// `chunk_size` characters.
    ///
    /// The only segments that may exceed the limit are indivisible tokens
    /// encountered after every separator tier has been exhausted; those pass
    /// through unchanged.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                self.merge(&good, separator, &mut chunks);
                good.clear();
            }
            if rest.is_empty() {
                // Indivisible token longer than the limit: pass through.
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, rest));
            }
        }
        if !good.is_empty() {
            self.merge(&good, separator, &mut chunks);
        }
        chunks
    }

    /// Greedily packs sibling pieces into chunks, keeping a trailing window
    /// of up to `chunk_overlap` characters across flushes.
    fn merge(&self, pieces: &[&str], separator: &str, out: &mut Vec<String>) {
        let sep_len = char_len(separator);
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let piece_len = char_len(piece);
            if !window.is_empty() && total + sep_len + piece_len >= self.chunk_size {
                if let Some(chunk) = join_trimmed(&window, separator) {
                    out.push(chunk);
                }
                // Shrink the window to the overlap budget, and further if the
                // incoming piece still would not fit beside it.
                while total > self.chunk_overlap
                    || (total > 0 && total + sep_len + piece_len >= self.chunk_size)
                {
                    let front_len = char_len(window[0]);
                    total -= front_len + if window.len() > 1 { sep_len } else { 0 };
                    window.pop_front();
                }
            }
            total += piece_len + if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
        }

        if let Some(chunk) = join_trimmed(&window, separator) {
            out.push(chunk);
        }
    }
}

/// First separator the text actually contains, plus the lower tiers.
fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_trimmed(window: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = window
        .iter()
        .copied()
        .collect::<Vec<&str>>()
        .join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(size: usize, overlap: usize) -> RecursiveSplitter {
        RecursiveSplitter::new(size, overlap).unwrap()
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        assert!(RecursiveSplitter::new(100, 100).is_err());
        assert!(RecursiveSplitter::new(100, 200).is_err());
        assert!(RecursiveSplitter::new(0, 0).is_err());
        assert!(RecursiveSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn short_text_yields_single_chunk() {
        let chunks = splitter(1000, 200).split("This page fits in one chunk.");
        assert_eq!(chunks, vec!["This page fits in one chunk.".to_string()]);
    }

    #[test]
    fn whitespace_only_text_yields_nothing() {
        assert!(splitter(100, 10).split("   \n\n \t ").is_empty());
        assert!(splitter(100, 10).split("").is_empty());
    }

    #[test]
    fn words_split_at_the_size_boundary() {
        let chunks = splitter(9, 0).split("AAAA BBBB CCCC");
        assert_eq!(
            chunks,
            vec!["AAAA".to_string(), "BBBB".to_string(), "CCCC".to_string()]
        );
    }

    #[test]
    fn words_merge_while_they_fit() {
        let chunks = splitter(9, 0).split("AAAA BBB CCCC");
        assert_eq!(chunks, vec!["AAAA BBB".to_string(), "CCCC".to_string()]);
    }

    #[test]
    fn overlap_carries_trailing_pieces_forward() {
        let chunks = splitter(10, 5).split("AAAA BBBB CCCC");
        assert_eq!(
            chunks,
            vec!["AAAA BBBB".to_string(), "BBBB CCCC".to_string()]
        );
    }

    #[test]
    fn paragraph_breaks_take_priority_over_spaces() {
        let text = "first paragraph here\n\nsecond paragraph here";
        let chunks = splitter(25, 0).split(text);
        assert_eq!(
            chunks,
            vec![
                "first paragraph here".to_string(),
                "second paragraph here".to_string()
            ]
        );
    }

    #[test]
    fn short_multiline_text_is_reassembled_verbatim() {
        let text = "alpha\n\nbeta\ngamma delta";
        let chunks = splitter(1000, 100).split(text);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn every_chunk_respects_the_size_bound() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n\
                    Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.\n\n\
                    Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris \
                    nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in \
                    reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla.";
        for (size, overlap) in [(40, 0), (40, 10), (80, 20), (25, 5)] {
            let chunks = splitter(size, overlap).split(text);
            assert!(!chunks.is_empty());
            for chunk in &chunks {
                assert!(
                    chunk.chars().count() <= size,
                    "chunk of {} chars exceeds size {size}: {chunk:?}",
                    chunk.chars().count()
                );
                assert!(!chunk.trim().is_empty());
            }
        }
    }

    #[test]
    fn oversized_word_falls_back_to_character_splitting() {
        let token = "x".repeat(25);
        let chunks = splitter(10, 0).split(&token);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
        let reassembled: String = chunks.concat();
        assert_eq!(reassembled, token);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let text = "äöü ßéè ñçå 日本語 テスト";
        let chunks = splitter(5, 0).split(text);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 5);
        }
    }
}

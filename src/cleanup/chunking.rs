//! Splitting oversized text into bounded pieces.

use crate::patterns::PARAGRAPH_BREAK;

use super::{normalize, word_count};

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Size limits for one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceBound {
    /// Maximum chars per piece.
    pub max_chars: usize,
    /// Maximum whitespace-separated words per piece.
    pub max_words: usize,
}

impl PieceBound {
    /// Bound of `max_chars` chars and `max_words` words (each at least 1).
    #[must_use]
    pub fn new(max_chars: usize, max_words: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            max_words: max_words.max(1),
        }
    }

    fn fits(self, text: &str) -> bool {
        char_len(text) <= self.max_chars && word_count(text) <= self.max_words
    }
}

/// Split `raw` into normalized pieces within `bound`.
///
/// Text that already fits is returned whole. Otherwise blank-line separated
/// paragraphs are packed greedily into pieces; text without paragraph
/// structure is packed sentence by sentence instead. A paragraph or sentence
/// that alone exceeds the bound is broken at word boundaries, and a single
/// word longer than the char bound at char boundaries.
///
/// Joining the pieces with spaces gives back `normalize(raw)`, except where
/// an over-long word had to be cut.
#[must_use]
pub fn intelligent_chunking(raw: &str, bound: PieceBound) -> Vec<String> {
    let normalized = normalize(raw);
    if bound.fits(&normalized) {
        return vec![normalized];
    }

    let paragraphs: Vec<String> = PARAGRAPH_BREAK
        .split(raw)
        .map(normalize)
        .filter(|p| !p.is_empty())
        .collect();

    let units: Vec<String> = if paragraphs.len() > 1 {
        paragraphs
            .into_iter()
            .flat_map(|p| {
                if bound.fits(&p) {
                    vec![p]
                } else {
                    bounded_sentences(&p, bound)
                }
            })
            .collect()
    } else {
        bounded_sentences(&normalized, bound)
    };

    pack(units, bound)
}

/// Sentences of `text`, each cut at a run of `.`, `!` or `?` followed by
/// whitespace or the end of the text. A trailing fragment without a
/// terminator is kept as its own sentence.
#[must_use]
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut end = idx + c.len_utf8();
        while let Some(&(next_idx, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?') {
                end = next_idx + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest);
    }
    out
}

fn bounded_sentences(text: &str, bound: PieceBound) -> Vec<String> {
    sentences(text)
        .into_iter()
        .flat_map(|s| {
            if bound.fits(s) {
                vec![s.to_string()]
            } else {
                split_words(s, bound)
            }
        })
        .collect()
}

fn split_words(text: &str, bound: PieceBound) -> Vec<String> {
    let max_chars = bound.max_chars;
    let words = text.split_whitespace().flat_map(|word| {
        if char_len(word) <= max_chars {
            vec![word.to_string()]
        } else {
            let chars: Vec<char> = word.chars().collect();
            chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
        }
    });
    pack(words, bound)
}

/// Greedily join units with single spaces into pieces within `bound`.
/// Every unit must already fit on its own.
fn pack(units: impl IntoIterator<Item = String>, bound: PieceBound) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    let mut current_words = 0;

    for unit in units {
        let unit_len = char_len(&unit);
        let unit_words = word_count(&unit);
        if current_len > 0
            && (current_len + 1 + unit_len > bound.max_chars || current_words + unit_words > bound.max_words)
        {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
            current_words = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(&unit);
        current_len += unit_len;
        current_words += unit_words;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars_only(max_chars: usize) -> PieceBound {
        PieceBound::new(max_chars, usize::MAX)
    }

    #[test]
    fn test_short_text_is_returned_whole() {
        assert_eq!(intelligent_chunking("  short\n text ", chars_only(100)), vec!["short text"]);
    }

    #[test]
    fn test_paragraph_packing() {
        let para = "word ".repeat(10);
        let raw = format!("{para}\n\n{para}\n  \n{para}");
        let pieces = intelligent_chunking(&raw, chars_only(110));
        // Each paragraph normalizes to 49 chars; two fit in 110 with a space.
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].chars().count(), 99);
    }

    #[test]
    fn test_sentence_packing() {
        let sentence = "This sentence has exactly eight words in it. ";
        let raw = sentence.repeat(20);
        let pieces = intelligent_chunking(&raw, chars_only(200));
        assert!(pieces.len() > 1);
        assert!(pieces.iter().all(|p| p.chars().count() <= 200));
        assert!(pieces.iter().all(|p| p.ends_with('.')));
        assert_eq!(pieces.join(" "), normalize(&raw));
    }

    #[test]
    fn test_sentences_keep_remainder() {
        assert_eq!(
            sentences("One. Two?! Three has no end"),
            vec!["One.", "Two?!", "Three has no end"]
        );
        assert_eq!(sentences("Pi is 3.14 today."), vec!["Pi is 3.14 today."]);
    }

    #[test]
    fn test_oversized_sentence_split_at_words() {
        let raw = "alpha ".repeat(100);
        let pieces = intelligent_chunking(&raw, chars_only(50));
        assert!(pieces.iter().all(|p| p.chars().count() <= 50));
        assert_eq!(pieces.join(" "), normalize(&raw));
    }

    #[test]
    fn test_oversized_word_split_at_chars() {
        let raw = format!("start {} end", "x".repeat(25));
        let pieces = intelligent_chunking(&raw, chars_only(10));
        assert!(pieces.iter().all(|p| p.chars().count() <= 10));
        assert_eq!(pieces.concat().replace(' ', ""), normalize(&raw).replace(' ', ""));
    }

    #[test]
    fn test_oversized_paragraph_among_paragraphs() {
        let long = "Sentence number one here. ".repeat(10);
        let raw = format!("Short intro paragraph.\n\n{long}");
        let pieces = intelligent_chunking(&raw, chars_only(80));
        assert!(pieces.len() > 2);
        assert!(pieces.iter().all(|p| p.chars().count() <= 80));
        assert_eq!(pieces.join(" "), normalize(&raw));
    }

    #[test]
    fn test_word_bound_splits_text_within_char_bound() {
        let raw = "ab ".repeat(450);
        let pieces = intelligent_chunking(&raw, PieceBound::new(2000, 400));
        assert_eq!(pieces.len(), 2);
        assert_eq!(word_count(&pieces[0]), 400);
        assert_eq!(word_count(&pieces[1]), 50);
        assert_eq!(pieces.join(" "), normalize(&raw));
    }

    #[test]
    fn test_word_bound_packs_sentences() {
        let raw = "One two three four five six. ".repeat(10);
        let pieces = intelligent_chunking(&raw, PieceBound::new(2000, 20));
        assert!(pieces.iter().all(|p| word_count(p) <= 20));
        assert!(pieces.iter().all(|p| p.ends_with('.')));
        assert_eq!(pieces.len(), 4);
    }
}

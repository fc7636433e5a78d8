use super::error::SplitterError;
use super::types::{Chunk, Document};

/// Separators tried from coarsest to finest. The empty separator splits into characters.
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Maximum fragment length in characters.
    pub chunk_size: usize,
    /// Characters carried over from the end of the previous fragment.
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 0,
        }
    }
}

impl SplitterConfig {
    /// # Errors
    ///
    /// Returns `SplitterError::InvalidConfig` if `chunk_size` is zero or `chunk_overlap`
    /// is not smaller than `chunk_size`.
    pub fn validate(&self) -> Result<(), SplitterError> {
        if self.chunk_size == 0 {
            return Err(SplitterError::InvalidConfig(
                "chunk_size must be at least 1".into(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(SplitterError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Recursive character splitter.
///
/// Text is cut at the coarsest separator it contains; pieces are packed greedily up to the body
/// limit, and any piece that alone exceeds the limit is split again with the next finer separator.
/// With a non-zero overlap each fragment after the first starts with the tail of the previous one.
/// Text that already fits in `chunk_size` is returned unchanged as a single fragment.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    /// # Errors
    ///
    /// Returns `SplitterError::InvalidConfig` when the configuration is invalid.
    pub fn new(config: SplitterConfig) -> Result<Self, SplitterError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> SplitterConfig {
        self.config
    }

    #[must_use]
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let text = &document.content;
        if text.trim().is_empty() {
            return Vec::new();
        }

        if char_len(text) <= self.config.chunk_size {
            return vec![Chunk {
                content: text.clone(),
                metadata: document.metadata.clone(),
                chunk_index: 0,
            }];
        }

        let overlap = self.config.chunk_overlap;
        let body_limit = self.config.chunk_size - overlap;
        let bodies = split_recursive(text, body_limit, &SEPARATORS);

        let mut chunks: Vec<Chunk> = Vec::with_capacity(bodies.len());
        for body in &bodies {
            let mut fragment = String::with_capacity(body.len());
            if overlap > 0
                && let Some(prev) = chunks.last()
            {
                fragment.push_str(tail_chars(&prev.content, overlap));
            }
            fragment.push_str(body);

            let trimmed = fragment.trim();
            if trimmed.is_empty() {
                continue;
            }
            chunks.push(Chunk {
                content: trimmed.to_owned(),
                metadata: document.metadata.clone(),
                chunk_index: chunks.len(),
            });
        }
        chunks
    }

    #[must_use]
    pub fn split_all(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|d| self.split(d)).collect()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn tail_chars(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if len <= n {
        return s;
    }
    let start = s
        .char_indices()
        .nth(len - n)
        .map_or(s.len(), |(i, _)| i);
    &s[start..]
}

fn pieces<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split_inclusive(separator).collect()
    }
}

/// Split `text` into bodies of at most `limit` characters. Concatenating the result yields `text`.
fn split_recursive(text: &str, limit: usize, separators: &[&str]) -> Vec<String> {
    let position = separators
        .iter()
        .position(|s| s.is_empty() || text.contains(s))
        .unwrap_or(separators.len().saturating_sub(1));
    let separator = separators.get(position).copied().unwrap_or("");
    let finer = separators.get(position + 1..).unwrap_or(&[]);

    let mut out = Vec::new();
    let mut fitting: Vec<&str> = Vec::new();
    for piece in pieces(text, separator) {
        if char_len(piece) <= limit {
            fitting.push(piece);
            continue;
        }
        merge(&fitting, limit, &mut out);
        fitting.clear();
        if finer.is_empty() {
            out.push(piece.to_owned());
        } else {
            out.extend(split_recursive(piece, limit, finer));
        }
    }
    merge(&fitting, limit, &mut out);
    out
}

fn merge(pieces: &[&str], limit: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;
    for piece in pieces {
        let len = char_len(piece);
        if current_len + len > limit && !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(piece);
        current_len += len;
    }
    if !current.is_empty() {
        out.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::{DocumentFormat, DocumentMetadata};

    fn make_doc(content: &str) -> Document {
        Document {
            content: content.to_owned(),
            metadata: DocumentMetadata::new("test", DocumentFormat::Text),
        }
    }

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
        })
        .unwrap()
    }

    #[test]
    fn empty_document() {
        assert!(splitter(100, 0).split(&make_doc("")).is_empty());
        assert!(splitter(100, 0).split(&make_doc("  \n\n \t")).is_empty());
    }

    #[test]
    fn short_text_is_single_fragment() {
        let chunks = splitter(100, 0).split(&make_doc("The sky is blue."));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "The sky is blue.");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn paragraphs_preferred_over_lines() {
        let text = "First paragraph here.\nStill first.\n\nSecond paragraph.";
        let chunks = splitter(40, 0).split(&make_doc(text));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "First paragraph here.\nStill first.");
        assert_eq!(chunks[1].content, "Second paragraph.");
    }

    #[test]
    fn oversized_paragraph_falls_back_to_sentences() {
        let text = "One two three. Four five six. Seven eight nine.";
        let chunks = splitter(17, 0).split(&make_doc(text));
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["One two three.", "Four five six.", "Seven eight nine."]);
    }

    #[test]
    fn long_word_splits_into_characters() {
        let chunks = splitter(4, 0).split(&make_doc("abcdefghij"));
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn overlap_prefixes_previous_tail() {
        let chunks = splitter(6, 2).split(&make_doc("abcdefghij"));
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcd", "cdefgh", "ghij"]);
    }

    #[test]
    fn text_within_chunk_size_is_one_fragment_despite_overlap() {
        let chunks = splitter(10, 5).split(&make_doc("abcdefghi"));
        let contents: Vec<_> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["abcdefghi"]);
    }

    #[test]
    fn single_fragment_keeps_surrounding_whitespace() {
        let chunks = splitter(100, 0).split(&make_doc("  The sky is blue.\n"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "  The sky is blue.\n");
    }

    #[test]
    fn multibyte_text_counts_characters() {
        let chunks = splitter(3, 1).split(&make_doc("äöüßéñ"));
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 3);
        }
        assert_eq!(chunks[0].content, "äö");
        assert_eq!(chunks[1].content, "öüß");
    }

    #[test]
    fn metadata_and_indices() {
        let text = "a b c d e f g h i j k l m n o p";
        let chunks = splitter(5, 0).split(&make_doc(text));
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.metadata.source, "test");
        }
    }

    #[test]
    fn split_all_restarts_indices_per_document() {
        let docs = [make_doc("one. two. three."), make_doc("four. five.")];
        let chunks = splitter(6, 0).split_all(&docs);
        let starts = chunks.iter().filter(|c| c.chunk_index == 0).count();
        assert_eq!(starts, 2);
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let result = TextSplitter::new(SplitterConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        });
        assert!(matches!(result, Err(SplitterError::InvalidConfig(_))));
    }

    #[test]
    fn overlap_not_smaller_than_size_rejected() {
        let result = TextSplitter::new(SplitterConfig {
            chunk_size: 10,
            chunk_overlap: 10,
        });
        assert!(matches!(result, Err(SplitterError::InvalidConfig(_))));
    }

    #[test]
    fn tail_chars_handles_short_input() {
        assert_eq!(tail_chars("ab", 5), "ab");
        assert_eq!(tail_chars("abcdef", 2), "ef");
        assert_eq!(tail_chars("ñandú", 3), "ndú");
    }

    mod proptest_splitter {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(500))]

            #[test]
            fn split_never_panics(
                content in "\\PC{0,3000}",
                chunk_size in 1usize..500,
                overlap_seed in 0usize..500,
            ) {
                let chunk_overlap = overlap_seed % chunk_size;
                let _ = splitter(chunk_size, chunk_overlap).split(&make_doc(&content));
            }

            #[test]
            fn fragments_respect_chunk_size(
                content in "[a-z .\n]{0,1500}",
                chunk_size in 1usize..200,
                overlap_seed in 0usize..200,
            ) {
                let chunk_overlap = overlap_seed % chunk_size;
                let chunks = splitter(chunk_size, chunk_overlap).split(&make_doc(&content));
                for chunk in &chunks {
                    prop_assert!(chunk.content.chars().count() <= chunk_size);
                    prop_assert!(!chunk.content.trim().is_empty());
                }
            }

            #[test]
            fn no_overlap_preserves_non_whitespace(
                content in "[a-z .\n]{1,1500}",
                chunk_size in 1usize..200,
            ) {
                let chunks = splitter(chunk_size, 0).split(&make_doc(&content));
                let joined: String = chunks
                    .iter()
                    .flat_map(|c| c.content.chars())
                    .filter(|c| !c.is_whitespace())
                    .collect();
                let expected: String = content.chars().filter(|c| !c.is_whitespace()).collect();
                prop_assert_eq!(joined, expected);
            }

            #[test]
            fn short_text_single_fragment(
                content in "[a-z .\n]{0,50}[a-z][a-z .\n]{0,49}",
                overlap in 0usize..100,
            ) {
                let chunks = splitter(100, overlap).split(&make_doc(&content));
                prop_assert_eq!(chunks.len(), 1);
                prop_assert_eq!(&chunks[0].content, &content);
            }

            #[test]
            fn overlap_comes_from_previous_fragment(
                content in "[a-z .\n]{0,600}",
                chunk_size in 4usize..80,
                overlap_seed in 1usize..80,
            ) {
                let chunk_overlap = 1 + overlap_seed % (chunk_size - 1);
                let chunks = splitter(chunk_size, chunk_overlap).split(&make_doc(&content));
                for pair in chunks.windows(2) {
                    let tail = tail_chars(&pair[0].content, chunk_overlap).trim_start();
                    prop_assert!(
                        pair[1].content.starts_with(tail),
                        "{:?} does not start with tail of {:?}",
                        pair[1].content,
                        pair[0].content
                    );
                }
            }

            #[test]
            fn deterministic(content in "[a-z .\n]{0,500}", chunk_size in 2usize..60) {
                let s = splitter(chunk_size, 1);
                prop_assert_eq!(s.split(&make_doc(&content)), s.split(&make_doc(&content)));
            }
        }
    }
}

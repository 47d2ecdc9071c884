//! Segmented document model.
//!
//! A [`Document`] is the read-only hand-off from the ingestion/tokenization
//! stage: the full extracted text plus an ordered list of sentence spans.
//! Offsets are measured in characters (Unicode scalar values), not bytes, so
//! spans produced by a tokenizer working on code points line up directly.

use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};

/// One sentence with its character span in [`Document::text`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Span validation failures raised while building a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// `start > end` for a sentence.
    #[error("sentence {index} has inverted span {start}..{end}")]
    InvertedSpan {
        index: usize,
        start: usize,
        end: usize,
    },

    /// A span ends beyond the document length.
    #[error("sentence {index} span {start}..{end} exceeds document length {len}")]
    OutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    /// A span starts before the previous sentence ended.
    #[error("sentence {index} starts at {start} before previous sentence end {previous_end}")]
    Overlap {
        index: usize,
        start: usize,
        previous_end: usize,
    },
}

impl DocumentError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidDocument
    }
}

/// Immutable representation of a document's text and sentence boundaries.
///
/// Invariant: sentence spans are non-overlapping, ordered by start offset, and
/// lie within `[0, char_len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    sentences: Vec<Sentence>,
    /// Byte offset of every char boundary, plus `text.len()` at the end.
    boundaries: Vec<usize>,
}

impl Document {
    /// Build a document from pre-segmented sentences, validating every span.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] when a span is inverted, overlaps its
    /// predecessor, or ends past the text.
    pub fn new(text: impl Into<String>, sentences: Vec<Sentence>) -> Result<Self, DocumentError> {
        let text = text.into();
        let boundaries = char_boundaries(&text);
        let len = boundaries.len() - 1;

        let mut previous_end = 0;
        for (index, sentence) in sentences.iter().enumerate() {
            let (start, end) = (sentence.start, sentence.end);
            if start > end {
                return Err(DocumentError::InvertedSpan { index, start, end });
            }
            if end > len {
                return Err(DocumentError::OutOfBounds {
                    index,
                    start,
                    end,
                    len,
                });
            }
            if start < previous_end {
                return Err(DocumentError::Overlap {
                    index,
                    start,
                    previous_end,
                });
            }
            previous_end = end;
        }

        Ok(Self {
            text,
            sentences,
            boundaries,
        })
    }

    /// Build a document from `(start, end)` character spans, deriving each
    /// sentence's text from the document text.
    ///
    /// # Errors
    ///
    /// Same as [`Document::new`].
    pub fn from_spans(text: impl Into<String>, spans: &[(usize, usize)]) -> Result<Self, DocumentError> {
        let text = text.into();
        let boundaries = char_boundaries(&text);
        let len = boundaries.len() - 1;

        let mut sentences = Vec::with_capacity(spans.len());
        for (index, &(start, end)) in spans.iter().enumerate() {
            if start > end {
                return Err(DocumentError::InvertedSpan { index, start, end });
            }
            if end > len {
                return Err(DocumentError::OutOfBounds {
                    index,
                    start,
                    end,
                    len,
                });
            }
            sentences.push(Sentence {
                text: text[boundaries[start]..boundaries[end]].to_string(),
                start,
                end,
            });
        }

        Self::new(text, sentences)
    }

    /// A document with text but no sentence segmentation.
    #[must_use]
    pub fn unsegmented(text: impl Into<String>) -> Self {
        let text = text.into();
        let boundaries = char_boundaries(&text);
        Self {
            text,
            sentences: Vec::new(),
            boundaries,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Sentence texts in document order.
    #[must_use]
    pub fn sentence_texts(&self) -> Vec<&str> {
        self.sentences.iter().map(|s| s.text.as_str()).collect()
    }

    /// Length of the text in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Whether the document carries usable text (anything but whitespace).
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Slice the text by character offsets, clipping both ends to
    /// `[0, char_len]`.
    #[must_use]
    pub fn slice_chars(&self, start: usize, end: usize) -> &str {
        let len = self.char_len();
        let end = end.min(len);
        let start = start.min(end);
        &self.text[self.boundaries[start]..self.boundaries[end]]
    }
}

fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect()
}

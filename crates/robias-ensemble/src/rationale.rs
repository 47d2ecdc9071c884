//! Rationale extraction: fused sentence order to evidence records.

use robias_core::{Document, Rationale, Sentence};

/// An order entry that names no sentence of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rationale order references sentence {index}, document has {sentences}")]
pub struct SentenceOutOfRange {
    pub index: usize,
    pub sentences: usize,
}

fn sentence_at(document: &Document, index: usize) -> Result<&Sentence, SentenceOutOfRange> {
    let sentences = document.sentences();
    sentences.get(index).ok_or(SentenceOutOfRange {
        index,
        sentences: sentences.len(),
    })
}

/// Build one [`Rationale`] per index in `order`, keeping that order.
///
/// Snippets hold up to `snippet_width` characters immediately before the
/// sentence start and from the sentence end, clipped to the document.
///
/// # Errors
///
/// [`SentenceOutOfRange`] for the first index past the last sentence.
pub fn extract_rationales(
    document: &Document,
    order: &[usize],
    snippet_width: usize,
) -> Result<Vec<Rationale>, SentenceOutOfRange> {
    order
        .iter()
        .map(|&i| {
            let sentence = sentence_at(document, i)?;
            Ok(Rationale {
                sentence_text: sentence.text.clone(),
                start: sentence.start,
                end: sentence.end,
                prefix_snippet: document
                    .slice_chars(sentence.start.saturating_sub(snippet_width), sentence.start)
                    .to_string(),
                suffix_snippet: document
                    .slice_chars(sentence.end, sentence.end.saturating_add(snippet_width))
                    .to_string(),
            })
        })
        .collect()
}

/// Space-joined sentence text in `order`, the input of the
/// rationale-interaction feature view.
///
/// # Errors
///
/// [`SentenceOutOfRange`] for the first index past the last sentence.
pub fn join_rationale_text(document: &Document, order: &[usize]) -> Result<String, SentenceOutOfRange> {
    let texts = order
        .iter()
        .map(|&i| sentence_at(document, i).map(|s| s.text.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(texts.join(" "))
}

//! Feature accumulation context for the linear oracle.
//!
//! The linear models score a *joint* representation built by adding several
//! text views to one accumulator before vectorizing: each view contributes a
//! distinct feature group (plain n-grams, or n-grams crossed with a tag).
//! The hashed representation is order-sensitive, so the order views are
//! added in is part of the contract and is preserved here verbatim.
//!
//! A context is scoped to one scoring call. Build a fresh one (or
//! [`FeatureContext::clear`] a reused one) before every independent
//! probability computation.

use robias_core::{Document, Domain};
use std::borrow::Cow;

/// One feature group added to a [`FeatureContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureView<'a> {
    /// Texts vectorized as-is.
    Plain(Vec<&'a str>),
    /// Texts whose features are crossed with `tag`.
    Tagged {
        texts: Vec<&'a str>,
        tag: Cow<'a, str>,
    },
}

impl FeatureView<'_> {
    #[must_use]
    pub fn rows(&self) -> usize {
        match self {
            Self::Plain(texts) | Self::Tagged { texts, .. } => texts.len(),
        }
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Tagged { tag, .. } => Some(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    /// Every view in one context must describe the same rows.
    #[error("feature view has {found} rows, context expects {expected}")]
    RowMismatch { expected: usize, found: usize },
}

/// Ordered accumulation of feature views awaiting vectorization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureContext<'a> {
    views: Vec<FeatureView<'a>>,
}

impl<'a> FeatureContext<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self { views: Vec::new() }
    }

    /// Drop every accumulated view.
    pub fn clear(&mut self) {
        self.views.clear();
    }

    /// Append texts as a plain feature group.
    ///
    /// # Errors
    ///
    /// [`FeatureError::RowMismatch`] when the row count differs from views
    /// already added.
    pub fn add_plain<I>(&mut self, texts: I) -> Result<&mut Self, FeatureError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.push(FeatureView::Plain(texts.into_iter().collect()))
    }

    /// Append texts crossed with `tag`.
    ///
    /// # Errors
    ///
    /// [`FeatureError::RowMismatch`] when the row count differs from views
    /// already added.
    pub fn add_tagged<I>(&mut self, texts: I, tag: impl Into<Cow<'a, str>>) -> Result<&mut Self, FeatureError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.push(FeatureView::Tagged {
            texts: texts.into_iter().collect(),
            tag: tag.into(),
        })
    }

    fn push(&mut self, view: FeatureView<'a>) -> Result<&mut Self, FeatureError> {
        if let Some(expected) = self.rows() {
            let found = view.rows();
            if found != expected {
                return Err(FeatureError::RowMismatch { expected, found });
            }
        }
        self.views.push(view);
        Ok(self)
    }

    /// Views in the order they were added.
    #[must_use]
    pub fn views(&self) -> &[FeatureView<'a>] {
        &self.views
    }

    /// Row count shared by all views; `None` while empty.
    #[must_use]
    pub fn rows(&self) -> Option<usize> {
        self.views.first().map(FeatureView::rows)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Sentence-level views: raw sentences, then sentences tagged with the
    /// domain label.
    #[must_use]
    pub fn for_sentences(document: &'a Document, domain: Domain) -> Self {
        let sentences = document.sentence_texts();
        Self {
            views: vec![
                FeatureView::Plain(sentences.clone()),
                FeatureView::Tagged {
                    texts: sentences,
                    tag: Cow::Borrowed(domain.label()),
                },
            ],
        }
    }

    /// Document-level views: full text, full text tagged with the domain
    /// label, then the joined rationale text tagged with the domain's
    /// sentence-interaction marker.
    #[must_use]
    pub fn for_document(document: &'a Document, domain: Domain, rationale_text: &'a str) -> Self {
        Self {
            views: vec![
                FeatureView::Plain(vec![document.text()]),
                FeatureView::Tagged {
                    texts: vec![document.text()],
                    tag: Cow::Borrowed(domain.label()),
                },
                FeatureView::Tagged {
                    texts: vec![rationale_text],
                    tag: Cow::Owned(domain.sentence_interaction_tag()),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_spans("Patients were randomised. Staff were blinded.", &[(0, 25), (26, 46)])
            .expect("valid spans")
    }

    #[test]
    fn sentence_views_are_plain_then_domain_tagged() {
        let doc = doc();
        let ctx = FeatureContext::for_sentences(&doc, Domain::RandomSequenceGeneration);

        assert_eq!(ctx.rows(), Some(2));
        assert_eq!(ctx.views().len(), 2);
        assert_eq!(ctx.views()[0].tag(), None);
        assert_eq!(ctx.views()[1].tag(), Some("Random sequence generation"));
    }

    #[test]
    fn document_views_keep_accumulation_order() {
        let doc = doc();
        let rationale = "Staff were blinded.";
        let ctx = FeatureContext::for_document(&doc, Domain::BlindingParticipantsPersonnel, rationale);

        let views = ctx.views();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0], FeatureView::Plain(vec![doc.text()]));
        assert_eq!(views[1].tag(), Some("Blinding of participants and personnel"));
        assert_eq!(views[2].tag(), Some("-s-Blinding of participants and personnel"));
        assert_eq!(ctx.rows(), Some(1));
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let mut ctx = FeatureContext::new();
        ctx.add_plain(["a", "b"]).expect("first view");
        let err = ctx.add_tagged(["a"], "tag").expect_err("row mismatch");
        assert_eq!(err, FeatureError::RowMismatch { expected: 2, found: 1 });
        assert_eq!(ctx.views().len(), 1);
    }

    #[test]
    fn clear_resets_row_expectation() {
        let mut ctx = FeatureContext::new();
        ctx.add_plain(["a", "b"]).expect("first view");
        ctx.clear();
        assert!(ctx.is_empty());
        assert_eq!(ctx.rows(), None);
        ctx.add_plain(["only"]).expect("fresh context accepts any row count");
        assert_eq!(ctx.rows(), Some(1));
    }

    #[test]
    fn builder_calls_chain() {
        let mut ctx = FeatureContext::new();
        ctx.add_plain(["x"])
            .and_then(|c| c.add_tagged(["x"], String::from("owned tag")))
            .expect("chain");
        assert_eq!(ctx.views()[1].tag(), Some("owned tag"));
    }
}

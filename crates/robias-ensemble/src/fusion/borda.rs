//! Borda-count fusion of two sentence rankings.
//!
//! Both inputs are *increasing preference*: the last element is the most
//! relevant sentence. The neural ranker always scores a fixed number of
//! sentence slots while the linear ranker scores exactly the document's
//! sentences, so the lists usually differ in length. Fusion truncates both
//! to their last `m = min(len(a), len(b))` entries, which pools the top-`m`
//! recommendations of each model:
//!
//! ```text
//! score[a[i]] += w0 * (i + 1)      for i in 0..m
//! score[b[i]] += w1 * (i + 1)
//! ```
//!
//! Output is sorted by accumulated score, highest first. Ties keep the order
//! in which items were first scored (`a[0], b[0], a[1], b[1], ...`).

use std::collections::HashMap;

/// Sentence indices in increasing preference (last = most relevant).
pub type RankedList = Vec<usize>;

/// Per-list multipliers for the positional scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BordaWeights {
    pub first: f64,
    pub second: f64,
}

impl Default for BordaWeights {
    fn default() -> Self {
        Self {
            first: 1.0,
            second: 1.0,
        }
    }
}

impl From<[f64; 2]> for BordaWeights {
    fn from([first, second]: [f64; 2]) -> Self {
        Self { first, second }
    }
}

/// Fuse two increasing-preference rankings into one list, most preferred
/// first.
///
/// Duplicate indices across the two lists are merged, so the result holds at
/// most `2 * min(a.len(), b.len())` entries.
///
/// # Example
///
/// ```
/// use robias_ensemble::fusion::{BordaWeights, borda_fuse};
///
/// let fused = borda_fuse(&[0, 1, 2], &[2, 1, 0], BordaWeights::default());
/// assert_eq!(fused.len(), 3);
/// ```
#[must_use]
pub fn borda_fuse(a: &[usize], b: &[usize], weights: BordaWeights) -> RankedList {
    let m = a.len().min(b.len());
    if m == 0 {
        return Vec::new();
    }

    let a = &a[a.len() - m..];
    let b = &b[b.len() - m..];

    // Insertion-ordered accumulator: `slots` fixes the tie-break order.
    let mut slots: Vec<(usize, f64)> = Vec::with_capacity(2 * m);
    let mut position: HashMap<usize, usize> = HashMap::with_capacity(2 * m);
    let mut accumulate = |item: usize, score: f64| match position.get(&item) {
        Some(&slot) => slots[slot].1 += score,
        None => {
            position.insert(item, slots.len());
            slots.push((item, score));
        }
    };

    for (i, (&from_a, &from_b)) in a.iter().zip(b).enumerate() {
        let score = positional_score(i);
        accumulate(from_a, weights.first * score);
        accumulate(from_b, weights.second * score);
    }

    // Stable: equal scores keep first-seen order.
    slots.sort_by(|x, y| y.1.total_cmp(&x.1));
    slots.into_iter().map(|(item, _)| item).collect()
}

#[allow(clippy::cast_precision_loss)]
fn positional_score(i: usize) -> f64 {
    (i + 1) as f64
}

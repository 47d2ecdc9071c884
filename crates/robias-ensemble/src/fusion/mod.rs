//! Rank fusion of the neural and linear sentence rankings.
//!
//! The ensemble pools the top sentences of both oracles with a two-list
//! Borda count (see [`borda`]) before the fused order is turned into
//! rationales.

pub mod borda;

pub use borda::{BordaWeights, RankedList, borda_fuse};

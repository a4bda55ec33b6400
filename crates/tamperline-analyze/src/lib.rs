//! Statistical analyzers that decorate the narrative.
//!
//! Both scores are pure functions of their input bytes and are advisory
//! only: nothing in the ledger accepts or rejects a write based on them.
//!
//! - [`entropy_score`]: normalized Shannon entropy (0 = repetitive,
//!   1 = uniform).
//! - [`compression_score`]: how much zlib shrinks the input (0 = not at
//!   all, 1 = to nothing).
//! - [`Verdict`]: the legitimate / suspicious / fraudulent banding the
//!   narration shows next to each score.

mod compression;
mod entropy;
mod verdict;

pub use compression::{COMPRESSION_THRESHOLD, compression_score};
pub use entropy::{ENTROPY_THRESHOLD, entropy_score};
pub use verdict::{Verdict, classify_compression, classify_entropy};

use serde::Serialize;

/// Both analyzer scores for one byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scores {
    /// Normalized Shannon entropy in `[0, 1]`.
    pub entropy: f64,
    /// Compression score in `[0, 1]`.
    pub compression: f64,
}

impl Scores {
    /// Score a buffer.
    pub fn of(data: &[u8]) -> Self {
        Self {
            entropy: entropy_score(data),
            compression: compression_score(data),
        }
    }

    /// Entropy banding.
    pub fn entropy_verdict(&self) -> Verdict {
        classify_entropy(self.entropy)
    }

    /// Compression banding.
    pub fn compression_verdict(&self) -> Verdict {
        classify_compression(self.compression)
    }

    /// The worse of the two verdicts.
    pub fn verdict(&self) -> Verdict {
        self.entropy_verdict().max(self.compression_verdict())
    }
}

/// Scores of an original record next to a proposed rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreShift {
    pub before: Scores,
    pub after: Scores,
}

impl ScoreShift {
    /// Change in entropy (positive when the rewrite looks more random).
    pub fn entropy_delta(&self) -> f64 {
        self.after.entropy - self.before.entropy
    }

    /// Change in compression score (negative when the rewrite is less
    /// structured).
    pub fn compression_delta(&self) -> f64 {
        self.after.compression - self.before.compression
    }
}

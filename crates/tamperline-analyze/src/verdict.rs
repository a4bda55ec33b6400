//! Banding of analyzer scores.

use std::fmt;

use serde::Serialize;

use crate::compression::COMPRESSION_THRESHOLD;
use crate::entropy::ENTROPY_THRESHOLD;

const ENTROPY_SUSPICIOUS: f64 = 0.60;
const COMPRESSION_SUSPICIOUS: f64 = 0.50;

/// How a score reads in the narration. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Legitimate,
    Suspicious,
    Fraudulent,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Legitimate => "legitimate",
            Self::Suspicious => "suspicious",
            Self::Fraudulent => "fraudulent",
        })
    }
}

/// Low entropy reads as legitimate.
pub fn classify_entropy(entropy: f64) -> Verdict {
    if entropy < ENTROPY_THRESHOLD {
        Verdict::Legitimate
    } else if entropy < ENTROPY_SUSPICIOUS {
        Verdict::Suspicious
    } else {
        Verdict::Fraudulent
    }
}

/// High compressibility reads as legitimate.
pub fn classify_compression(ratio: f64) -> Verdict {
    if ratio > COMPRESSION_THRESHOLD {
        Verdict::Legitimate
    } else if ratio > COMPRESSION_SUSPICIOUS {
        Verdict::Suspicious
    } else {
        Verdict::Fraudulent
    }
}

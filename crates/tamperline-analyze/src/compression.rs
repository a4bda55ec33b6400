//! Compression score using zlib (deflate).

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use tracing::warn;

/// Scores above this are considered legitimate, structured data.
pub const COMPRESSION_THRESHOLD: f64 = 0.70;

/// `1 - compressed_len / original_len`, clamped to `[0, 1]`.
///
/// Uses the default zlib level. Empty input scores 0. Short inputs often
/// grow under compression and clamp to 0.
pub fn compression_score(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let compressed_len = match deflate_len(data) {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, len = data.len(), "compression failed, scoring 0");
            return 0.0;
        }
    };

    let ratio = 1.0 - compressed_len as f64 / data.len() as f64;
    ratio.clamp(0.0, 1.0)
}

fn deflate_len(data: &[u8]) -> std::io::Result<usize> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?.len())
}

//! Normalized Shannon entropy over byte frequencies.

/// Scores below this are considered legitimate, structured data.
pub const ENTROPY_THRESHOLD: f64 = 0.40;

/// Shannon entropy of `data` divided by 8 bits, in `[0, 1]`.
///
/// Empty input scores 0.
pub fn entropy_score(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut frequency = [0u64; 256];
    for &byte in data {
        frequency[byte as usize] += 1;
    }

    let len = data.len() as f64;
    let entropy: f64 = frequency
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum();

    (entropy / 8.0).clamp(0.0, 1.0)
}

//! Sparse term-frequency vectors and cosine similarity.

use std::collections::HashMap;

/// Term → occurrence count. Absent terms count as zero.
pub type TermVector = HashMap<String, u32>;

/// Counts each term's occurrences.
pub fn vectorize<I, S>(terms: I) -> TermVector
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut vec = TermVector::new();
    for term in terms {
        *vec.entry(term.into()).or_insert(0) += 1;
    }
    vec
}

fn norm(v: &TermVector) -> f64 {
    v.values()
        .map(|&c| {
            let c = c as f64;
            c * c
        })
        .sum::<f64>()
        .sqrt()
}

/// Cosine similarity of two term vectors.
///
/// Returns exactly `0.0` when either vector has zero norm. The result is
/// clamped to `[0, 1]` so float drift never escapes the unit interval.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, &x)| large.get(term).map(|&y| x as f64 * y as f64))
        .sum();

    let mag_a = norm(a);
    let mag_b = norm(b);
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    (dot / (mag_a * mag_b)).clamp(0.0, 1.0)
}

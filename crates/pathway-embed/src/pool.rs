/// Scales `v` in place to unit L2 norm; all-zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= 1e-12 { return; }
    for x in v.iter_mut() { *x /= norm; }
}

/// Cosine similarity of two equal-length vectors, `0.0` when either is zero
/// or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() { return 0.0; }
    let (mut dot, mut na, mut nb) = (0f32, 0f32, 0f32);
    for (x, y) in a.iter().zip(b) { dot += x * y; na += x * x; nb += y * y; }
    let denom = na.sqrt() * nb.sqrt();
    if denom <= 1e-12 { 0.0 } else { dot / denom }
}

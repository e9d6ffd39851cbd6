use std::cmp::Ordering;

/// Cosine similarity of two equal-length vectors; zero when either has no magnitude.
pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Option<f32> {
    if query.is_empty() || query.len() != candidate.len() {
        return None;
    }

    let (dot, query_sq, candidate_sq) = query.iter().zip(candidate).fold(
        (0.0f32, 0.0f32, 0.0f32),
        |(dot, q, c), (a, b)| (dot + a * b, q + a * a, c + b * b),
    );

    let denom = query_sq.sqrt() * candidate_sq.sqrt();
    if denom <= f32::EPSILON {
        return Some(0.0);
    }

    Some(dot / denom)
}

/// Indices of `candidates` with their scores, best first. Candidates whose length
/// differs from `query` are skipped. Equal scores keep their input order.
pub fn rank_descending_by_cosine(query: &[f32], candidates: &[&[f32]]) -> Vec<(usize, f32)> {
    let mut scores: Vec<(usize, f32)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(idx, candidate)| cosine_similarity(query, candidate).map(|s| (idx, s)))
        .collect();

    scores.sort_by(|left, right| right.1.partial_cmp(&left.1).unwrap_or(Ordering::Equal));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = vec![1.0, 2.0, 3.0, 4.0];
        let score = cosine_similarity(&vec, &vec).expect("cosine should work");
        assert!(approx_eq(score, 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_vectors() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).expect("cosine should work");
        assert!(approx_eq(score, 0.0));
    }

    #[test]
    fn cosine_rejects_length_mismatch() {
        assert!(cosine_similarity(&[1.0, 0.0], &[1.0]).is_none());
        assert!(cosine_similarity(&[], &[]).is_none());
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), Some(0.0));
    }

    #[test]
    fn ranking_returns_highest_similarity_first() {
        let query = vec![1.0, 0.0];
        let a = [0.8, 0.2];
        let b = [0.1, 0.9];
        let c = [0.9, 0.0];
        let ranked = rank_descending_by_cosine(&query, &[&a, &b, &c]);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, 2);
        assert_eq!(ranked[2].0, 1);
    }

    #[test]
    fn ties_keep_input_order() {
        let query = [1.0, 0.0];
        let same = [2.0, 0.0];
        let ranked = rank_descending_by_cosine(&query, &[&same, &same, &same]);
        let order: Vec<usize> = ranked.iter().map(|(idx, _)| *idx).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }
}

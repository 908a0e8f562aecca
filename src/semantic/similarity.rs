//! Cosine similarity between a submitted title and candidate titles.

use super::embeddings::{Embedder, EmbeddingError};

/// Compute L2 norm of a vector.
fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity in [-1, 1].
///
/// Returns 0.0 for zero-norm vectors or vectors of different length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot_product / (norm_a * norm_b)
}

/// Score every candidate against `query`, in candidate order.
///
/// The query and the candidates go through the model as one batch.
pub fn score_candidates(
    embedder: &dyn Embedder,
    query: &str,
    candidates: &[String],
) -> Result<Vec<f32>, EmbeddingError> {
    if candidates.is_empty() {
        return Ok(vec![]);
    }

    let mut texts = Vec::with_capacity(candidates.len() + 1);
    texts.push(query.to_string());
    texts.extend(candidates.iter().cloned());

    let embeddings = embedder.embed_batch(&texts)?;
    if embeddings.len() != texts.len() {
        return Err(EmbeddingError::EmbeddingFailed(format!(
            "expected {} embeddings, got {}",
            texts.len(),
            embeddings.len()
        )));
    }

    let (query_embedding, candidate_embeddings) = embeddings.split_at(1);
    Ok(candidate_embeddings
        .iter()
        .map(|candidate| cosine_similarity(&query_embedding[0], candidate))
        .collect())
}

/// Index and score of the highest score. The first one wins on equal scores.
/// NaN scores never match.
pub fn best_match(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| !score.is_nan())
        .fold(None, |best, (idx, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((idx, score)),
        })
}

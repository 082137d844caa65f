/// Scales the vector to unit L2 norm in place.
///
/// Returns false (leaving the input untouched) for a zero vector, which a
/// sane detector never produces but a corrupt payload might.
pub fn l2_normalize(embedding: &mut [f32]) -> bool {
    let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        return false;
    }
    for value in embedding.iter_mut() {
        *value /= norm;
    }
    true
}

/// Cosine similarity of two L2-normalized embeddings, i.e. the dot product.
/// Only meaningful when both sides carry the normalized invariant.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Embeddings are persisted as little-endian f32 bytes.
#[must_use]
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

#[must_use]
pub fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_produces_unit_norm() {
        let mut v = vec![1.0, 2.0, 2.0];
        assert!(l2_normalize(&mut v));
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        assert!((v[0] - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_rejects_zero_vector() {
        let mut v = vec![0.0, 0.0];
        assert!(!l2_normalize(&mut v));
    }

    #[test]
    fn cosine_of_identical_normalized_vectors_is_one() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn embedding_bytes_round_trip() {
        let v = vec![0.25, -1.5, 3.75];
        assert_eq!(decode_embedding(&encode_embedding(&v)), v);
    }
}

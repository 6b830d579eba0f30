use super::util::normalize;
use super::Embedder;
use crate::errors::ProviderError;
use crate::model::Embedding;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

pub const FAKE_DIMS: usize = 64;

/// Offline embedder: hashed bag of lowercase words, unit-normalised.
///
/// Identical texts map to identical vectors; texts sharing no words land
/// about sqrt(2) apart.
pub struct FakeEmbedder {
    pub model: String,
    pub dims: usize,
}

impl Default for FakeEmbedder {
    fn default() -> Self {
        Self {
            model: "fake-embedding".to_string(),
            dims: FAKE_DIMS,
        }
    }
}

impl FakeEmbedder {
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; self.dims.max(1)];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let bucket = u64::from_le_bytes([
                digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6],
                digest[7],
            ]) as usize
                % v.len();
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        normalize(&mut v);
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, ProviderError> {
        Ok(Embedding::new(self.model.clone(), self.vector_for(text)))
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::util::euclidean_distance;

    #[test]
    fn same_text_same_vector() {
        let e = FakeEmbedder::default();
        assert_eq!(
            e.vector_for("What is the capital of France?"),
            e.vector_for("what is the capital of france")
        );
    }

    #[test]
    fn unrelated_texts_are_far_apart() {
        let e = FakeEmbedder::default();
        let a = e.vector_for("capital of France");
        let b = e.vector_for("recipe for bread");
        let d = euclidean_distance(&a, &b).unwrap();
        assert!(d > 0.5, "distance {d} unexpectedly small");
    }
}

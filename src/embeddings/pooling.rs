// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pooling and normalization of token-level model outputs

use ndarray::ArrayView2;

/// Mean pooling over the sequence axis, weighted by the attention mask.
///
/// `token_embeddings` is `[seq_len, hidden_dim]` and `attention_mask` has
/// `seq_len` entries (1 for real tokens, 0 for padding). Padding positions
/// contribute nothing to the average.
pub fn mean_pool(token_embeddings: ArrayView2<'_, f32>, attention_mask: &[i64]) -> Vec<f32> {
    let seq_len = token_embeddings.shape()[0];
    let hidden_dim = token_embeddings.shape()[1];

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for i in 0..seq_len.min(attention_mask.len()) {
        let mask_value = attention_mask[i] as f32;
        if mask_value == 0.0 {
            continue;
        }
        sum_mask += mask_value;
        for (j, slot) in pooled.iter_mut().enumerate() {
            *slot += token_embeddings[[i, j]] * mask_value;
        }
    }

    let denom = sum_mask.max(1e-9);
    for val in &mut pooled {
        *val /= denom;
    }

    pooled
}

/// Scales `vector` to unit L2 length in place. A zero vector is left as is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Euclidean length of `vector`
pub fn l2_norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP client for the encode endpoint
//!
//! Used by services that need embeddings, e.g. to build a query vector for a
//! vector search.

use crate::api::{EncodeRequest, EncodeResponse, ErrorResponse};
use std::time::Duration;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Embedding service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Embedding service returned {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Embedding service returned {got} vectors for {expected} texts")]
    CountMismatch { expected: usize, got: usize },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct EncodeClient {
    http: reqwest::Client,
    encode_url: String,
}

impl EncodeClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8000`
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            encode_url: format!("{}/encode", base_url.trim_end_matches('/')),
        })
    }

    pub fn encode_url(&self) -> &str {
        &self.encode_url
    }

    /// Embeds `texts`, returning one vector per input in order.
    pub async fn encode(&self, texts: &[String]) -> ClientResult<Vec<Vec<f32>>> {
        let response = self.encode_full(texts).await?;

        if response.embeddings.len() != texts.len() {
            return Err(ClientError::CountMismatch {
                expected: texts.len(),
                got: response.embeddings.len(),
            });
        }

        Ok(response.embeddings)
    }

    /// Embeds a single string.
    pub async fn encode_one(&self, text: &str) -> ClientResult<Vec<f32>> {
        let mut embeddings = self.encode(&[text.to_string()]).await?;
        // encode() guarantees exactly one vector here
        Ok(embeddings.pop().unwrap_or_default())
    }

    /// Embeds `texts` and returns the whole response, model tag included.
    pub async fn encode_full(&self, texts: &[String]) -> ClientResult<EncodeResponse> {
        let request = EncodeRequest {
            texts: texts.to_vec(),
        };

        let response = self
            .http
            .post(&self.encode_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            error!("Error fetching embeddings from {}: {} {}", self.encode_url, status, message);
            return Err(ClientError::Service {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<EncodeResponse>().await?)
    }
}

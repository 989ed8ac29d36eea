// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EncodeRequest type for POST /encode

use serde::{Deserialize, Serialize};

/// Request body for POST /encode
///
/// # Example
/// ```json
/// {
///   "texts": ["menu item name", "another item"]
/// }
/// ```
///
/// No bounds are enforced: the batch may be empty, strings may repeat, and
/// order is preserved end to end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodeRequest {
    /// Strings to embed, in order
    pub texts: Vec<String>,
}

impl EncodeRequest {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Encode API Module
//!
//! This module provides the POST /encode endpoint, which turns a batch of
//! strings into unit-length embedding vectors.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::encode_handler;
pub use request::EncodeRequest;
pub use response::EncodeResponse;

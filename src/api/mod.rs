// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod encode;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use encode::{encode_handler, EncodeRequest, EncodeResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, HealthResponse};
pub use http_server::{bind_listener, create_app, serve, start_server, AppState};

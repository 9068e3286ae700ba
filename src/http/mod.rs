// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer for crumbline
//!
//! Provides an async HTTP client that negotiates crumbs for authenticated
//! POSTs and hands back abortable request handles.

mod client;
mod crumb;
mod handle;
mod headers;
mod request;
mod response;

pub use client::{HttpClient, HttpClientConfig};
pub use crumb::{origin, Crumb, CRUMB_ISSUER_PATH, DEFAULT_CRUMB_FIELD};
pub use handle::{AbortHandle, RequestHandle};
pub use headers::{names, HeaderKey, Headers};
pub use request::{Body, Form, PostOptions, PostRequest, Request, RequestOptions, FORM_CONTENT_TYPE};
pub use response::Response;
pub use tokio_util::sync::CancellationToken;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("crumbline/", env!("CARGO_PKG_VERSION"));

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # crumbline - HTTP client for build-server APIs
//!
//! A small async client for Jenkins-style REST and script endpoints.
//!
//! ## Features
//!
//! - GET/POST returning the response body as text
//! - Automatic crumb negotiation for authenticated POSTs, including the
//!   session cookie the crumb is bound to
//! - Abortable handles: abort before dispatch, during the crumb pre-flight,
//!   or while the main request is in flight
//! - Case-insensitive header mapping and form-urlencoded bodies
//!
//! ## Example
//!
//! ```rust,no_run
//! use crumbline::{Headers, HttpClient, PostOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new()?;
//!     let auth = Headers::new().with_basic_auth("admin", "admin");
//!
//!     let jobs = client
//!         .get("http://localhost:8080/api/json?tree=jobs%5Bname%5D", auth.clone())
//!         .await?;
//!     println!("{}", jobs);
//!
//!     let output = client
//!         .post(
//!             PostOptions::new("http://localhost:8080/scriptText")
//!                 .headers(auth)
//!                 .form([("script", "println('hello')")]),
//!         )
//!         .await?;
//!     println!("{}", output);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{
    AbortHandle, Body, CancellationToken, Crumb, Form, Headers, HttpClient, HttpClientConfig,
    PostOptions, PostRequest, Request, RequestHandle, RequestOptions, Response,
};

/// crumbline version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

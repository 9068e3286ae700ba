// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::headers::names;
use crate::error::{Error, Result};

/// Buffered HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Decoded response body
    pub body: String,
    /// Final URL (after redirects)
    pub url: Url,
}

impl Response {
    /// Create a new response
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>, url: Url) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            url,
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the body should be handed to the caller: any 2xx, or a 302
    /// that was not followed
    pub fn is_accepted(&self) -> bool {
        self.is_success() || self.status == StatusCode::FOUND
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Consume the response, yielding the body for accepted statuses and an
    /// [`Error::Http`] otherwise
    pub fn into_text(self) -> Result<String> {
        if self.is_accepted() {
            Ok(self.body)
        } else {
            Err(Error::http(self.status.as_u16(), self.body))
        }
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(Error::from)
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Set-Cookie values joined into one string, or `None` if there are none
    pub fn set_cookie(&self) -> Option<String> {
        let cookies = self.header_all(names::SET_COOKIE);
        if cookies.is_empty() {
            None
        } else {
            Some(cookies.join(", "))
        }
    }
}

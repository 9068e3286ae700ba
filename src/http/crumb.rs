// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Crumb (anti-forgery token) negotiation
//!
//! Build servers of the Jenkins family reject state-changing requests that
//! lack a crumb. The crumb is issued by `<origin>/crumbIssuer/api/json`,
//! which answers with:
//!
//! ```json
//! { "crumb": "…", "crumbRequestField": "Jenkins-Crumb" }
//! ```
//!
//! The crumb is bound to the session, so the `Set-Cookie` of that response
//! has to travel with the request that uses it.

use serde_json::Value;
use url::Url;

use super::headers::{names, Headers};
use super::response::Response;
use crate::error::Result;

/// Header name used when the issuer does not name one
pub const DEFAULT_CRUMB_FIELD: &str = "Jenkins-Crumb";

/// Path of the crumb issuer, relative to the server origin
pub const CRUMB_ISSUER_PATH: &str = "/crumbIssuer/api/json";

/// A crumb ready to be attached to a request.
///
/// The issuer may answer without a usable crumb and still open a session;
/// each part is applied on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// Header the crumb is sent under
    pub field: String,
    /// Crumb value, if the issuer returned one
    pub value: Option<String>,
    /// Session cookie issued alongside the crumb
    pub cookie: Option<String>,
}

impl Crumb {
    /// Build a crumb from an issuer response.
    ///
    /// Fails only when the body is not JSON. Scalar crumbs (strings, numbers,
    /// `true`) are sent as text; empty strings, zero, `false`, `null` and
    /// structured values are treated as missing.
    pub fn from_response(response: &Response, default_field: &str) -> Result<Self> {
        let issued: Value = response.json()?;
        let value = issued.get("crumb").and_then(scalar_text);
        let field = issued
            .get("crumbRequestField")
            .and_then(scalar_text)
            .unwrap_or_else(|| default_field.to_string());

        Ok(Self {
            field,
            value,
            cookie: response.set_cookie(),
        })
    }

    /// Return `headers` with the crumb and its session cookie applied
    pub fn apply(&self, headers: Headers) -> Headers {
        let headers = match &self.value {
            Some(value) => headers.with(self.field.as_str(), value.as_str()),
            None => headers,
        };
        match &self.cookie {
            Some(cookie) => headers.with(names::COOKIE, cookie.as_str()),
            None => headers,
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Scheme, host and explicit port of `url`
pub fn origin(url: &Url) -> String {
    format!(
        "{}://{}{}",
        url.scheme(),
        url.host_str().unwrap_or(""),
        url.port().map(|p| format!(":{}", p)).unwrap_or_default()
    )
}

/// Crumb issuer URL for the server hosting `url`
pub fn issuer_url(url: &Url, issuer_path: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{}{}", origin(url), issuer_path))?)
}

/// Whether a request with these headers needs a crumb first
pub fn needs_crumb(headers: &Headers, crumb_field: &str) -> bool {
    headers.contains(names::AUTHORIZATION) && !headers.contains(crumb_field)
}

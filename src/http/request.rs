// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request descriptors
//!
//! Callers describe a POST either as a bare URL plus [`RequestOptions`] or as
//! a full [`PostOptions`] value. Both shapes resolve into the canonical
//! [`Request`] before anything touches the network.

use bytes::Bytes;
use reqwest::Method;
use url::Url;

use super::headers::{names, Headers};
use crate::error::Result;

/// Content type applied to form bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Ordered form fields, encoded as `application/x-www-form-urlencoded`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Iterate over fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check if the form has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode the fields; spaces become `+`
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Form
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Form
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Form fields, encoded when the request is sent
    Form(Form),
    /// Bytes sent as-is
    Raw(Bytes),
}

impl Body {
    /// Wire bytes for this body
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Body::Form(form) => Bytes::from(form.encode()),
            Body::Raw(bytes) => bytes.clone(),
        }
    }
}

/// Options for a request given by URL
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Request headers
    pub headers: Headers,
    /// Form fields to send as the body
    pub form: Option<Form>,
}

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers = self.headers.with(name, value);
        self
    }

    /// Replace all headers
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Set the form body
    pub fn form(mut self, form: impl Into<Form>) -> Self {
        self.form = Some(form.into());
        self
    }
}

/// Full description of a POST request
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    /// Target URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Form fields; takes precedence over `body`
    pub form: Option<Form>,
    /// Raw body, used when no form is given
    pub body: Option<Bytes>,
}

impl PostOptions {
    /// Create options targeting `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers = self.headers.with(name, value);
        self
    }

    /// Replace all headers
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Set the form body
    pub fn form(mut self, form: impl Into<Form>) -> Self {
        self.form = Some(form.into());
        self
    }

    /// Set a raw body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A POST request in either of its accepted shapes
#[derive(Debug, Clone)]
pub enum PostRequest {
    /// URL plus options; only a form body is accepted here
    Url { url: String, options: RequestOptions },
    /// Everything in one value
    Full(PostOptions),
}

impl PostRequest {
    /// POST to `url` with `options`
    pub fn to(url: impl Into<String>, options: RequestOptions) -> Self {
        PostRequest::Url {
            url: url.into(),
            options,
        }
    }

    /// Resolve into the canonical request
    pub fn resolve(self) -> Result<Request> {
        let (url, headers, body) = match self {
            PostRequest::Url { url, options } => (url, options.headers, options.form.map(Body::Form)),
            PostRequest::Full(options) => {
                let body = match (options.form, options.body) {
                    (Some(form), _) => Some(Body::Form(form)),
                    (None, Some(raw)) => Some(Body::Raw(raw)),
                    (None, None) => None,
                };
                (options.url, options.headers, body)
            }
        };

        Ok(Request::new(Method::POST, &url)?.headers(headers).body(body))
    }
}

impl From<&str> for PostRequest {
    fn from(url: &str) -> Self {
        PostRequest::to(url, RequestOptions::default())
    }
}

impl From<String> for PostRequest {
    fn from(url: String) -> Self {
        PostRequest::to(url, RequestOptions::default())
    }
}

impl From<PostOptions> for PostRequest {
    fn from(options: PostOptions) -> Self {
        PostRequest::Full(options)
    }
}

/// Canonical request handed to the transport
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: Option<Body>,
}

impl Request {
    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: Headers::new(),
            body: None,
        })
    }

    /// Replace the headers
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Set the body; a form body also sets the form content type unless
    /// one is already present
    pub fn body(mut self, body: Option<Body>) -> Self {
        if matches!(body, Some(Body::Form(_))) && !self.headers.contains(names::CONTENT_TYPE) {
            self.headers = self.headers.with(names::CONTENT_TYPE, FORM_CONTENT_TYPE);
        }
        self.body = body;
        self
    }

    /// Get the URL as string
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    /// Get the origin (scheme, host and explicit port)
    pub fn origin(&self) -> String {
        super::crumb::origin(&self.url)
    }
}

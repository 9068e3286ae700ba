// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Case-insensitive header mapping

use std::fmt;
use std::hash::{Hash, Hasher};

use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{Error, Result};

/// Header names used by the request pipeline
pub mod names {
    pub const AUTHORIZATION: &str = "authorization";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
}

/// Header name that keeps the caller's spelling but compares by its
/// ASCII-lowercased form.
#[derive(Debug, Clone)]
pub struct HeaderKey {
    name: String,
    normalized: String,
}

impl HeaderKey {
    /// Create a new key
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let normalized = name.to_ascii_lowercase();
        Self { name, normalized }
    }

    /// Name as given by the caller
    pub fn as_str(&self) -> &str {
        &self.name
    }

    fn matches(&self, name: &str) -> bool {
        self.normalized.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for HeaderKey {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for HeaderKey {}

impl Hash for HeaderKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Ordered header mapping with case-insensitive lookup.
///
/// Setting a header that already exists under another spelling replaces the
/// old entry. Values are plain strings; they are validated only when the
/// mapping is turned into a transport [`HeaderMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(HeaderKey, String)>,
}

impl Headers {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this mapping with `name` set to `value`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Return a copy of this mapping with a `Basic` Authorization header
    pub fn with_basic_auth(self, username: &str, password: &str) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", username, password));
        self.with(names::AUTHORIZATION, format!("Basic {}", encoded))
    }

    fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let key = HeaderKey::new(name);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => *entry = (key, value),
            None => self.entries.push((key, value)),
        }
    }

    /// Get a header value by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.matches(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a header is present, ignoring case
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.matches(name))
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no headers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay `other` on top of this mapping; entries in `other` win
    pub fn merged(mut self, other: &Headers) -> Self {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
        self
    }

    /// Convert into a transport header map
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let name = HeaderName::try_from(key.as_str())
                .map_err(|e| Error::invalid_header(key.as_str(), e))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::invalid_header(key.as_str(), e))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

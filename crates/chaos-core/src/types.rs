//! Core types for the chaos client
//!
//! Defines the wire-level vocabulary shared by the scheduler and transports:
//! - Entity identifiers
//! - Request methods, bodies and requests
//! - Responses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the remote service assigned to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Raw numeric value
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HTTP verbs the scheduler issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Upper-case wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// Well-formed JSON, sent as `application/json`
    Json(serde_json::Value),
    /// Arbitrary bytes under a caller-chosen content type
    Raw {
        content_type: &'static str,
        data: String,
    },
}

impl RequestBody {
    /// Check for an empty body
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A single request against the target service
///
/// `path` is relative to the configured base address and always starts with `/`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

impl Request {
    /// Build a body-less request
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    /// Attach a body
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Status and body returned by the target service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON
    ///
    /// # Errors
    /// Returns the parser error when the body is not valid JSON for `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

//! Transport seam
//!
//! The scheduler never talks HTTP directly. It hands a [`Request`] to a
//! [`Transport`] and awaits either a [`Response`] or a [`TransportError`].

use crate::error::TransportError;
use crate::types::{Request, Response};
use std::sync::Arc;

/// Issues requests against the target service
///
/// Implementations must not retry; one call is one request.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for its response
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        (**self).send(request).await
    }
}

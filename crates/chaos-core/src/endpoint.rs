//! Resource paths on the target service

use crate::types::EntityId;

/// Default collection name
pub const DEFAULT_COLLECTION: &str = "books";

/// Path layout of one resource collection
///
/// ```text
/// /<collection>        list, create
/// /<collection>/{id}   get, update, delete
/// /not_<collection>    guaranteed-unknown route
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    collection: String,
}

impl Endpoint {
    /// Endpoint for the given collection name (without slashes)
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }

    /// Collection name
    #[inline]
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// `/<collection>`
    #[must_use]
    pub fn collection_path(&self) -> String {
        format!("/{}", self.collection)
    }

    /// `/<collection>/{id}`
    #[must_use]
    pub fn item_path(&self, id: EntityId) -> String {
        format!("/{}/{}", self.collection, id)
    }

    /// A sibling path outside the collection
    #[must_use]
    pub fn unknown_path(&self) -> String {
        format!("/not_{}", self.collection)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION)
    }
}

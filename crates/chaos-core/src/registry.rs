//! Entity registry
//!
//! A client-local, approximate view of which entity ids exist remotely.
//!
//! The registry is never authoritative. It only changes on exact success
//! codes:
//! - list `200` replaces the whole set
//! - create `201` adds the returned id
//! - delete `204` removes the target id
//!
//! Everything else leaves it untouched.

use crate::endpoint::Endpoint;
use crate::outcome::Outcome;
use crate::transport::Transport;
use crate::types::{EntityId, Method, Request, Response};
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Distance above the largest known id used for "missing" probes
pub const MISSING_ID_OFFSET: u64 = 100;

/// Missing-id probe used when nothing is known
pub const EMPTY_REGISTRY_SENTINEL: EntityId = EntityId(9999);

/// Status a successful list returns
pub const LIST_SUCCESS_STATUS: u16 = 200;

#[derive(Debug, Deserialize)]
struct ListedEntity {
    id: EntityId,
}

/// Extract ids from a list response body
///
/// The body must be a JSON array of objects that each carry an integer `id`.
/// Other fields are ignored.
///
/// # Errors
/// Returns the parser error when the body has any other shape.
pub fn parse_listing(body: &str) -> Result<Vec<EntityId>, serde_json::Error> {
    let listed: Vec<ListedEntity> = serde_json::from_str(body)?;
    Ok(listed.into_iter().map(|e| e.id).collect())
}

/// Approximate set of remote entity ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRegistry {
    known_ids: BTreeSet<EntityId>,
}

impl EntityRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with ids
    #[must_use]
    pub fn with_ids(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            known_ids: ids.into_iter().collect(),
        }
    }

    /// Re-read the remote collection and replace the known set
    ///
    /// Only a `200` with a parseable listing mutates the registry. Any other
    /// result is logged and returned; it is never fatal.
    pub async fn refresh<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        endpoint: &Endpoint,
    ) -> Outcome {
        let request = Request::new(Method::Get, endpoint.collection_path());
        match transport.send(request).await {
            Ok(response) => self.apply_listing(response),
            Err(e) => {
                tracing::error!(error = %e, "Transport failure while listing entities");
                Outcome::TransportFailed(e)
            }
        }
    }

    /// Reconcile against a list response
    pub fn apply_listing(&mut self, response: Response) -> Outcome {
        if response.status != LIST_SUCCESS_STATUS {
            tracing::warn!(
                status = response.status,
                body = %response.body,
                "Failed to list entities"
            );
            return Outcome::Rejected {
                status: response.status,
                body: response.body,
            };
        }
        match parse_listing(&response.body) {
            Ok(ids) => {
                self.replace_all(ids);
                tracing::info!(count = self.len(), "Retrieved all entities");
                Outcome::Succeeded {
                    status: response.status,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Listing body could not be parsed; registry unchanged");
                Outcome::Malformed {
                    status: response.status,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Replace the known set wholesale
    pub fn replace_all(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.known_ids = ids.into_iter().collect();
    }

    /// Record an id the server reported as created
    pub fn record_created(&mut self, id: EntityId) {
        self.known_ids.insert(id);
    }

    /// Forget an id the server reported as deleted
    ///
    /// Returns `false` (and changes nothing) when the id was not known.
    pub fn record_deleted(&mut self, id: EntityId) -> bool {
        self.known_ids.remove(&id)
    }

    /// Uniformly chosen known id
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<EntityId> {
        self.known_ids.iter().copied().choose(rng)
    }

    /// Uniformly chosen known id, or `fallback` when empty
    ///
    /// The fallback may or may not exist remotely.
    pub fn pick_random_or<R: Rng + ?Sized>(&self, rng: &mut R, fallback: EntityId) -> EntityId {
        self.pick_random(rng).unwrap_or(fallback)
    }

    /// An id that very probably does not exist remotely
    ///
    /// `max + MISSING_ID_OFFSET`, or [`EMPTY_REGISTRY_SENTINEL`] when empty.
    /// Never a member of the registry at call time; absence on the server is
    /// only likely, not guaranteed.
    #[must_use]
    pub fn pick_definitely_missing(&self) -> EntityId {
        let Some(max) = self.known_ids.last() else {
            return EMPTY_REGISTRY_SENTINEL;
        };
        match max.0.checked_add(MISSING_ID_OFFSET) {
            Some(candidate) => EntityId(candidate),
            None => self.first_gap(),
        }
    }

    // Smallest id not in the set. Only reachable near u64::MAX.
    fn first_gap(&self) -> EntityId {
        let mut expected = 0u64;
        for id in &self.known_ids {
            if id.0 != expected {
                break;
            }
            expected += 1;
        }
        EntityId(expected)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.known_ids.contains(&id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.known_ids.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.known_ids.is_empty()
    }

    /// Known ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.known_ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(raw: &[u64]) -> Vec<EntityId> {
        raw.iter().copied().map(EntityId).collect()
    }

    #[test]
    fn delete_removes_only_target() {
        let mut registry = EntityRegistry::with_ids(ids(&[5, 7, 12]));
        assert!(registry.record_deleted(EntityId(7)));
        assert_eq!(registry.ids().collect::<Vec<_>>(), ids(&[5, 12]));
    }

    #[test]
    fn deleting_unknown_id_is_noop() {
        let mut registry = EntityRegistry::with_ids(ids(&[1]));
        assert!(!registry.record_deleted(EntityId(99)));
        assert!(!registry.record_deleted(EntityId(99)));
        assert_eq!(registry.len(), 1);

        let mut empty = EntityRegistry::new();
        assert!(!empty.record_deleted(EntityId(1)));
        assert!(empty.is_empty());
    }

    #[test]
    fn replace_all_discards_previous_contents() {
        let mut registry = EntityRegistry::with_ids(ids(&[40, 41]));
        registry.replace_all(ids(&[1, 2, 3]));
        assert_eq!(registry.ids().collect::<Vec<_>>(), ids(&[1, 2, 3]));
    }

    #[test]
    fn pick_random_empty_uses_fallback() {
        let mut rng = StdRng::seed_from_u64(7);
        let registry = EntityRegistry::new();
        assert_eq!(registry.pick_random(&mut rng), None);
        assert_eq!(registry.pick_random_or(&mut rng, EntityId(1)), EntityId(1));
    }

    #[test]
    fn pick_random_returns_member() {
        let mut rng = StdRng::seed_from_u64(7);
        let registry = EntityRegistry::with_ids(ids(&[3, 9, 27]));
        for _ in 0..100 {
            let id = registry.pick_random(&mut rng).unwrap();
            assert!(registry.contains(id));
        }
    }

    #[test]
    fn pick_random_covers_all_members() {
        let mut rng = StdRng::seed_from_u64(11);
        let registry = EntityRegistry::with_ids(ids(&[1, 2, 3, 4]));
        let seen: BTreeSet<_> = (0..400).filter_map(|_| registry.pick_random(&mut rng)).collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn missing_id_is_max_plus_offset() {
        let registry = EntityRegistry::with_ids(ids(&[5, 7, 12]));
        assert_eq!(registry.pick_definitely_missing(), EntityId(112));
    }

    #[test]
    fn missing_id_empty_is_sentinel() {
        assert_eq!(
            EntityRegistry::new().pick_definitely_missing(),
            EMPTY_REGISTRY_SENTINEL
        );
    }

    #[test]
    fn missing_id_near_overflow_is_still_absent() {
        let registry = EntityRegistry::with_ids(ids(&[0, 1, u64::MAX - 10]));
        let missing = registry.pick_definitely_missing();
        assert!(!registry.contains(missing));
        assert_eq!(missing, EntityId(2));
    }

    #[test]
    fn parse_listing_ignores_extra_fields() {
        let body = r#"[{"id":1,"title":"a"},{"id":2,"author":"b"},{"id":3}]"#;
        assert_eq!(parse_listing(body).unwrap(), ids(&[1, 2, 3]));
    }

    #[test]
    fn parse_listing_rejects_non_arrays() {
        assert!(parse_listing(r#"{"id":1}"#).is_err());
        assert!(parse_listing(r#"[{"title":"no id"}]"#).is_err());
        assert!(parse_listing("").is_err());
    }

    #[test]
    fn apply_listing_mutates_only_on_ok() {
        let mut registry = EntityRegistry::with_ids(ids(&[9]));

        let outcome = registry.apply_listing(Response::new(500, "boom"));
        assert_eq!(outcome.status(), Some(500));
        assert_eq!(registry.ids().collect::<Vec<_>>(), ids(&[9]));

        let outcome = registry.apply_listing(Response::new(200, "garbage"));
        assert!(matches!(outcome, Outcome::Malformed { status: 200, .. }));
        assert_eq!(registry.ids().collect::<Vec<_>>(), ids(&[9]));

        let outcome = registry.apply_listing(Response::new(200, r#"[{"id":1},{"id":2}]"#));
        assert!(outcome.is_success());
        assert_eq!(registry.ids().collect::<Vec<_>>(), ids(&[1, 2]));
    }

    #[test]
    fn parse_listing_empty_array() {
        assert!(parse_listing("[]").unwrap().is_empty());
    }
}

//! Operation catalogue
//!
//! Two disjoint catalogues of [`OperationKind`]s: valid operations, which a
//! healthy service should accept, and error operations, built to provoke a
//! failure response. A kind is *planned* into a concrete [`Operation`]
//! against the current registry, turned into a [`Request`], and its response
//! is *reconciled* back into the registry.

use crate::catalogue::{
    current_time_of_day, incomplete_create_payload, title_update_payload, valid_create_payload,
    wrong_method_payload, JSON_CONTENT_TYPE, MALFORMED_BODY,
};
use crate::endpoint::Endpoint;
use crate::outcome::Outcome;
use crate::registry::EntityRegistry;
use crate::types::{EntityId, Method, Request, RequestBody, Response};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Target for get-known when nothing is known
pub const FALLBACK_ID: EntityId = EntityId(1);

/// Target for the missing-entity probe
pub const PROBE_ID: EntityId = EntityId(999_999);

/// Target for the unsupported-method request
pub const WRONG_METHOD_TARGET: EntityId = EntityId(1);

/// Whether an operation is expected to succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Intent {
    Valid,
    Error,
}

/// Catalogue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    ListAll,
    GetKnown,
    GetMissing,
    CreateValid,
    CreateInvalid,
    UpdateValid,
    UpdateInvalid,
    DeleteValid,
    DeleteInvalid,
    WrongMethod,
    UnknownEndpoint,
}

impl OperationKind {
    /// Operations expected to succeed
    pub const VALID: [OperationKind; 5] = [
        OperationKind::ListAll,
        OperationKind::GetKnown,
        OperationKind::CreateValid,
        OperationKind::UpdateValid,
        OperationKind::DeleteValid,
    ];

    /// Operations built to fail
    pub const ERROR: [OperationKind; 6] = [
        OperationKind::GetMissing,
        OperationKind::CreateInvalid,
        OperationKind::UpdateInvalid,
        OperationKind::DeleteInvalid,
        OperationKind::WrongMethod,
        OperationKind::UnknownEndpoint,
    ];

    /// Catalogue for an intent
    #[must_use]
    pub fn catalogue(intent: Intent) -> &'static [OperationKind] {
        match intent {
            Intent::Valid => &Self::VALID,
            Intent::Error => &Self::ERROR,
        }
    }

    #[must_use]
    pub fn intent(self) -> Intent {
        match self {
            OperationKind::ListAll
            | OperationKind::GetKnown
            | OperationKind::CreateValid
            | OperationKind::UpdateValid
            | OperationKind::DeleteValid => Intent::Valid,
            OperationKind::GetMissing
            | OperationKind::CreateInvalid
            | OperationKind::UpdateInvalid
            | OperationKind::DeleteInvalid
            | OperationKind::WrongMethod
            | OperationKind::UnknownEndpoint => Intent::Error,
        }
    }

    /// Status that counts as success for this kind
    ///
    /// For error kinds this is the code a *lenient* server would return, i.e.
    /// receiving it means the service accepted something it should not have.
    #[must_use]
    pub fn success_status(self) -> u16 {
        match self {
            OperationKind::CreateValid | OperationKind::CreateInvalid => 201,
            OperationKind::DeleteValid | OperationKind::DeleteInvalid => 204,
            OperationKind::ListAll
            | OperationKind::GetKnown
            | OperationKind::GetMissing
            | OperationKind::UpdateValid
            | OperationKind::UpdateInvalid
            | OperationKind::WrongMethod
            | OperationKind::UnknownEndpoint => 200,
        }
    }

    /// Stable snake_case name for logs and reports
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::ListAll => "list_all",
            OperationKind::GetKnown => "get_known",
            OperationKind::GetMissing => "get_missing",
            OperationKind::CreateValid => "create_valid",
            OperationKind::CreateInvalid => "create_invalid",
            OperationKind::UpdateValid => "update_valid",
            OperationKind::UpdateInvalid => "update_invalid",
            OperationKind::DeleteValid => "delete_valid",
            OperationKind::DeleteInvalid => "delete_invalid",
            OperationKind::WrongMethod => "wrong_method",
            OperationKind::UnknownEndpoint => "unknown_endpoint",
        }
    }

    /// Resolve targets and payloads against the registry
    pub fn plan<R: Rng + ?Sized>(self, registry: &EntityRegistry, rng: &mut R) -> Plan {
        let op = match self {
            OperationKind::ListAll => Operation::ListAll,
            OperationKind::GetKnown => Operation::GetKnown {
                id: registry.pick_random_or(rng, FALLBACK_ID),
            },
            OperationKind::GetMissing => Operation::GetMissing { id: PROBE_ID },
            OperationKind::CreateValid => Operation::CreateValid {
                payload: valid_create_payload(rng),
            },
            OperationKind::CreateInvalid => Operation::CreateInvalid {
                payload: incomplete_create_payload(),
            },
            OperationKind::UpdateValid => match registry.pick_random(rng) {
                Some(id) => Operation::UpdateValid {
                    id,
                    payload: title_update_payload(&current_time_of_day()),
                },
                None => return Plan::skip(self, "no known entities to update"),
            },
            OperationKind::UpdateInvalid => match registry.pick_random(rng) {
                Some(id) => Operation::UpdateInvalid { id },
                None => return Plan::skip(self, "no known entities to update"),
            },
            OperationKind::DeleteValid => match registry.pick_random(rng) {
                Some(id) => Operation::DeleteValid { id },
                None => return Plan::skip(self, "no known entities to delete"),
            },
            OperationKind::DeleteInvalid => Operation::DeleteInvalid {
                id: registry.pick_definitely_missing(),
            },
            OperationKind::WrongMethod => Operation::WrongMethod {
                id: WRONG_METHOD_TARGET,
            },
            OperationKind::UnknownEndpoint => Operation::UnknownEndpoint,
        };
        Plan::Ready(op)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Planning result
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Issue this operation
    Ready(Operation),
    /// Precondition unmet; issue nothing
    Skip {
        kind: OperationKind,
        reason: &'static str,
    },
}

impl Plan {
    fn skip(kind: OperationKind, reason: &'static str) -> Self {
        Plan::Skip { kind, reason }
    }
}

/// A concrete request to issue, with everything it needs
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ListAll,
    GetKnown { id: EntityId },
    GetMissing { id: EntityId },
    CreateValid { payload: Value },
    CreateInvalid { payload: Value },
    UpdateValid { id: EntityId, payload: Value },
    UpdateInvalid { id: EntityId },
    DeleteValid { id: EntityId },
    DeleteInvalid { id: EntityId },
    WrongMethod { id: EntityId },
    UnknownEndpoint,
}

#[derive(Debug, Deserialize)]
struct EntityEcho {
    id: EntityId,
    #[serde(default)]
    title: Option<String>,
}

impl Operation {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::ListAll => OperationKind::ListAll,
            Operation::GetKnown { .. } => OperationKind::GetKnown,
            Operation::GetMissing { .. } => OperationKind::GetMissing,
            Operation::CreateValid { .. } => OperationKind::CreateValid,
            Operation::CreateInvalid { .. } => OperationKind::CreateInvalid,
            Operation::UpdateValid { .. } => OperationKind::UpdateValid,
            Operation::UpdateInvalid { .. } => OperationKind::UpdateInvalid,
            Operation::DeleteValid { .. } => OperationKind::DeleteValid,
            Operation::DeleteInvalid { .. } => OperationKind::DeleteInvalid,
            Operation::WrongMethod { .. } => OperationKind::WrongMethod,
            Operation::UnknownEndpoint => OperationKind::UnknownEndpoint,
        }
    }

    /// Entity this operation addresses, if any
    #[must_use]
    pub fn target(&self) -> Option<EntityId> {
        match self {
            Operation::GetKnown { id }
            | Operation::GetMissing { id }
            | Operation::UpdateValid { id, .. }
            | Operation::UpdateInvalid { id }
            | Operation::DeleteValid { id }
            | Operation::DeleteInvalid { id }
            | Operation::WrongMethod { id } => Some(*id),
            Operation::ListAll
            | Operation::CreateValid { .. }
            | Operation::CreateInvalid { .. }
            | Operation::UnknownEndpoint => None,
        }
    }

    /// Wire request for this operation
    #[must_use]
    pub fn request(&self, endpoint: &Endpoint) -> Request {
        match self {
            Operation::ListAll => Request::new(Method::Get, endpoint.collection_path()),
            Operation::GetKnown { id } | Operation::GetMissing { id } => {
                Request::new(Method::Get, endpoint.item_path(*id))
            }
            Operation::CreateValid { payload } | Operation::CreateInvalid { payload } => {
                Request::new(Method::Post, endpoint.collection_path())
                    .with_body(RequestBody::Json(payload.clone()))
            }
            Operation::UpdateValid { id, payload } => {
                Request::new(Method::Put, endpoint.item_path(*id))
                    .with_body(RequestBody::Json(payload.clone()))
            }
            Operation::UpdateInvalid { id } => Request::new(Method::Put, endpoint.item_path(*id))
                .with_body(RequestBody::Raw {
                    content_type: JSON_CONTENT_TYPE,
                    data: MALFORMED_BODY.to_string(),
                }),
            Operation::DeleteValid { id } | Operation::DeleteInvalid { id } => {
                Request::new(Method::Delete, endpoint.item_path(*id))
            }
            Operation::WrongMethod { id } => Request::new(Method::Patch, endpoint.item_path(*id))
                .with_body(RequestBody::Json(wrong_method_payload())),
            Operation::UnknownEndpoint => Request::new(Method::Get, endpoint.unknown_path()),
        }
    }

    /// Apply a response to the registry and classify it
    ///
    /// The registry is mutated only when the status equals the kind's
    /// success code:
    /// - list replaces the set
    /// - either create records the echoed id
    /// - valid delete removes its target
    pub fn reconcile(&self, response: Response, registry: &mut EntityRegistry) -> Outcome {
        let kind = self.kind();
        if response.status != kind.success_status() {
            log_rejected(self, &response);
            return Outcome::Rejected {
                status: response.status,
                body: response.body,
            };
        }

        let status = response.status;
        match self {
            Operation::CreateValid { .. } | Operation::CreateInvalid { .. } => {
                match response.json::<EntityEcho>() {
                    Ok(created) => {
                        registry.record_created(created.id);
                        let title = created.title.unwrap_or_default();
                        if kind.intent() == Intent::Valid {
                            tracing::info!(id = %created.id, %title, "Created entity");
                        } else {
                            tracing::warn!(id = %created.id, %title, "Server created an entity from an incomplete payload");
                        }
                        Outcome::Succeeded { status }
                    }
                    Err(e) => {
                        tracing::warn!(op = %kind, error = %e, "Create response carried no usable id; registry unchanged");
                        Outcome::Malformed {
                            status,
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Operation::DeleteValid { id } => {
                registry.record_deleted(*id);
                tracing::info!(%id, "Deleted entity");
                Outcome::Succeeded { status }
            }
            Operation::GetKnown { id } => {
                let title = response
                    .json::<EntityEcho>()
                    .ok()
                    .and_then(|e| e.title)
                    .unwrap_or_default();
                tracing::info!(%id, %title, "Retrieved entity");
                Outcome::Succeeded { status }
            }
            Operation::UpdateValid { id, .. } => {
                tracing::info!(%id, "Updated entity");
                Outcome::Succeeded { status }
            }
            Operation::GetMissing { .. }
            | Operation::UpdateInvalid { .. }
            | Operation::DeleteInvalid { .. }
            | Operation::WrongMethod { .. }
            | Operation::UnknownEndpoint => {
                tracing::warn!(
                    op = %kind,
                    status,
                    body = %response.body,
                    "Error-inducing request was accepted"
                );
                Outcome::Succeeded { status }
            }
            Operation::ListAll => registry.apply_listing(response),
        }
    }
}

fn log_rejected(op: &Operation, response: &Response) {
    let kind = op.kind();
    let target = op.target().map(|id| id.to_string()).unwrap_or_default();
    match kind.intent() {
        Intent::Valid => tracing::warn!(
            op = %kind,
            %target,
            status = response.status,
            body = %response.body,
            "Request failed"
        ),
        Intent::Error => tracing::warn!(
            op = %kind,
            %target,
            status = response.status,
            body = %response.body,
            "Error-inducing request rejected"
        ),
    }
}

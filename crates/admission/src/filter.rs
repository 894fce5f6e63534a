// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two pure recursive predicates and the rewrite/admission policy built
//! from them.

use crate::error::AdmissionError;
use dispatch_core::{ActionPayload, Credentials, ObjectId, Value};
use dispatch_storage::ObjectStore;
use tracing::Instrument;

/// Guards the two recursive predicates against reference cycles between
/// `ActionObject`s.
const MAX_RECURSION_DEPTH: usize = 16;

/// Result of running the admission filter over a `QueueItem`'s payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// All references resolved (after rewriting); the item may be dispatched.
    Admit,
    /// At least one reference is unresolved; leave the item CREATED and
    /// re-evaluate on the next producer tick.
    Defer,
}

/// Unresolved check (predicate 1): does `v` dereference to a fully-resolved
/// value?
async fn is_unresolved(
    objects: &dyn ObjectStore,
    creds: &Credentials,
    v: &Value,
    depth: usize,
) -> bool {
    if depth > MAX_RECURSION_DEPTH {
        return true;
    }
    match v {
        Value::ObjectRef(id) => match objects.get(creds, *id).await {
            Err(_) => true,
            Ok(obj) if !obj.resolved => match objects.get(creds, *id).await {
                Err(_) => true,
                Ok(refetched) if !refetched.resolved => true,
                Ok(refetched) => Box::pin(is_unresolved(objects, creds, &refetched.data, depth + 1)).await,
            },
            Ok(obj) => Box::pin(is_unresolved(objects, creds, &obj.data, depth + 1)).await,
        },
        Value::Sequence(items) => {
            for item in items {
                if Box::pin(is_unresolved(objects, creds, item, depth + 1)).await {
                    return true;
                }
            }
            false
        }
        Value::Mapping(pairs) => {
            for (k, v) in pairs {
                if Box::pin(is_unresolved(objects, creds, k, depth + 1)).await
                    || Box::pin(is_unresolved(objects, creds, v, depth + 1)).await
                {
                    return true;
                }
            }
            false
        }
        Value::Primitive(_) => false,
    }
}

/// Nested-collection detection (predicate 2): does `v` transitively contain
/// an `ActionObject` reference?
fn contains_nested_objects(v: &Value) -> bool {
    match v {
        Value::ObjectRef(_) => true,
        Value::Sequence(items) => items.iter().any(contains_nested_objects),
        Value::Mapping(pairs) => pairs.iter().any(|(k, v)| contains_nested_objects(k) || contains_nested_objects(v)),
        Value::Primitive(_) => false,
    }
}

/// Replace every `ActionObject` leaf in `v` with its dereferenced data, one
/// level of unwrap only. Fails if the unwrapped value is itself an
/// `ActionObject` reference ("double nesting"), or if flattening a single
/// payload walks deeper than `MAX_RECURSION_DEPTH` collection levels.
async fn flatten_one_level(
    objects: &dyn ObjectStore,
    creds: &Credentials,
    v: &Value,
    depth: usize,
) -> Result<Value, AdmissionError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(AdmissionError::RecursionLimitExceeded(format!(
            "exceeded depth {MAX_RECURSION_DEPTH} while flattening"
        )));
    }
    match v {
        Value::ObjectRef(id) => match objects.get(creds, *id).await {
            // B.get error is logged by the caller and the original arg is
            // left unchanged.
            Err(_) => Ok(v.clone()),
            Ok(obj) => {
                if matches!(obj.data, Value::ObjectRef(_)) {
                    return Err(AdmissionError::DoubleNesting(id.to_string()));
                }
                Ok(obj.data)
            }
        },
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(Box::pin(flatten_one_level(objects, creds, item, depth + 1)).await?);
            }
            Ok(Value::Sequence(out))
        }
        Value::Mapping(pairs) => {
            let mut out = Vec::with_capacity(pairs.len());
            for (k, v) in pairs {
                let fk = Box::pin(flatten_one_level(objects, creds, k, depth + 1)).await?;
                let fv = Box::pin(flatten_one_level(objects, creds, v, depth + 1)).await?;
                out.push((fk, fv));
            }
            Ok(Value::Mapping(out))
        }
        Value::Primitive(_) => Ok(v.clone()),
    }
}

/// Fetch the object referenced by `id`; if its data contains nested
/// `ActionObject`s, flatten and persist the rewrite under the same id.
async fn rewrite_if_nested(
    objects: &dyn ObjectStore,
    creds: &Credentials,
    id: ObjectId,
) -> Result<(), AdmissionError> {
    let span = tracing::info_span!("admission.rewrite", object_id = %id);
    async move {
        let obj = match objects.get(creds, id).await {
            Ok(obj) => obj,
            Err(_) => return Ok(()), // logged by caller; leave unchanged
        };
        if !contains_nested_objects(&obj.data) {
            return Ok(());
        }
        let flattened = match flatten_one_level(objects, creds, &obj.data, 0).await {
            Ok(flattened) => flattened,
            Err(error) => {
                tracing::warn!(%error, "reject: nested object could not be flattened");
                return Err(error);
            }
        };
        let rewritten = obj.with_data(flattened);
        let _ = objects.set(creds, &rewritten).await; // transient store error: logged by caller
        tracing::info!("rewrote nested reference");
        Ok(())
    }
    .instrument(span)
    .await
}

/// Admission decision for a `QueueItem`'s `ActionPayload`.
///
/// If any referenced object is unresolved, defers (the item stays CREATED).
/// Otherwise rewrites each reference via [`rewrite_if_nested`] and admits.
pub async fn admit(
    objects: &dyn ObjectStore,
    creds: &Credentials,
    payload: &ActionPayload,
) -> Result<AdmissionOutcome, AdmissionError> {
    let span = tracing::info_span!("admission.admit", action_id = %payload.action_id);
    async move {
        for id in payload.referenced_ids() {
            if is_unresolved(objects, creds, &Value::ObjectRef(id), 0).await {
                tracing::info!(object_id = %id, "defer: unresolved reference");
                return Ok(AdmissionOutcome::Defer);
            }
        }
        for id in payload.referenced_ids() {
            if let Err(error) = rewrite_if_nested(objects, creds, id).await {
                return Err(error);
            }
        }
        tracing::info!("accept");
        Ok(AdmissionOutcome::Admit)
    }
    .instrument(span)
    .await
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;

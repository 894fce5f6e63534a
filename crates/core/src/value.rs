// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive value model used by the admission filter.
//!
//! The original source duck-typed its way through sequences and mappings at
//! runtime. Here that is replaced with an explicit sum type and a pure
//! recursive visitor: unknown concrete shapes collapse to [`Value::Primitive`].

use crate::object::ObjectId;
use serde::{Deserialize, Serialize};

/// A value appearing inside an [`crate::ActionObject`]'s data or an
/// [`crate::ActionPayload`]'s args/kwargs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Any JSON scalar, or a JSON shape this model does not distinguish further.
    Primitive(serde_json::Value),
    /// A reference to another `ActionObject`, to be dereferenced through the
    /// Object Store.
    ObjectRef(ObjectId),
    /// An ordered collection of values.
    Sequence(Vec<Value>),
    /// An ordered collection of key-value pairs. Kept as a `Vec` rather than
    /// a map because keys may themselves be composite `Value`s.
    Mapping(Vec<(Value, Value)>),
}

impl Value {
    pub fn primitive(v: impl Into<serde_json::Value>) -> Self {
        Value::Primitive(v.into())
    }

    pub fn object_ref(id: ObjectId) -> Self {
        Value::ObjectRef(id)
    }

    /// True if this value is itself an object reference.
    pub fn is_object_ref(&self) -> bool {
        matches!(self, Value::ObjectRef(_))
    }

    /// True if this value is a sequence or mapping (a "collection" per the
    /// nested-detection predicate).
    pub fn is_collection(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;

// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Polymorphic dispatch between abstract node values and their concrete
//! adapters.
//!
//! Write-side dispatch keys on the concrete `TypeId`; read-side dispatch
//! keys on the document's discriminant, after giving bypass adapters a
//! chance to claim untagged documents by shape. An unknown type in either
//! direction is logged and resolved to the absent value rather than
//! aborting the session.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::document::{document_class, NodeId, CLASS_KEY, ID_KEY, PAYLOAD_KEY};
use crate::error::Error;
use crate::model::source::Source;
use crate::model::transform::Transform;
use crate::resolver::context::{ReadContext, WriteContext};

/// Serializes one source node into its tagged document.
pub fn write_source(
    source: &dyn Source,
    id: NodeId,
    cx: &mut WriteContext<'_>,
) -> Result<Option<Value>, Error> {
    let Some(adapter) = cx.registry().source_by_type(source.as_any().type_id()) else {
        tracing::error!(
            name = source.name(),
            node = %id,
            "no adapter registered for this source's concrete type; node will be absent"
        );
        return Ok(None);
    };
    let Some(mut document) = adapter.flatten(source, cx)? else {
        return Ok(None);
    };
    document.insert(CLASS_KEY.to_owned(), Value::from(adapter.discriminant()));
    document.insert(ID_KEY.to_owned(), Value::from(id.as_u32()));
    Ok(Some(Value::Object(document)))
}

/// Materializes one source node from its tagged document.
pub fn read_source(
    document: &Map<String, Value>,
    cx: &mut ReadContext<'_>,
) -> Result<Option<Arc<dyn Source>>, Error> {
    let Some(class) = document_class(document) else {
        crate::bail!("source document missing class tag");
    };
    let Some(adapter) = cx.registry().source_by_name(class) else {
        tracing::error!(class, "unknown source discriminant; node will be absent");
        return Ok(None);
    };
    adapter.unflatten(document, cx)
}

/// Serializes one transform into its document: the bare shape for bypass
/// adapters, the `{"class", "payload"}` envelope for everything else.
pub fn write_transform(
    transform: &dyn Transform,
    cx: &mut WriteContext<'_>,
) -> Result<Option<Value>, Error> {
    let Some(adapter) = cx.registry().transform_by_type(transform.as_any().type_id()) else {
        tracing::error!(
            "no adapter registered for this transform's concrete type; node will be absent"
        );
        return Ok(None);
    };
    let Some(payload) = adapter.flatten(transform, cx)? else {
        return Ok(None);
    };
    if adapter.bypass() {
        return Ok(Some(payload));
    }
    let mut document = Map::new();
    document.insert(CLASS_KEY.to_owned(), Value::from(adapter.discriminant()));
    document.insert(PAYLOAD_KEY.to_owned(), payload);
    Ok(Some(Value::Object(document)))
}

/// Materializes one transform from its document.
///
/// Untagged documents are offered to the bypass adapters by shape before
/// the discriminant lookup, which is what lets the compact affine form be
/// read back without a class tag.
pub fn read_transform(
    value: &Value,
    cx: &mut ReadContext<'_>,
) -> Result<Option<Box<dyn Transform>>, Error> {
    let Some(document) = value.as_object() else {
        crate::bail!("transform document must be an object");
    };
    match document_class(document) {
        None => {
            for adapter in cx.registry().bypass_transforms() {
                if adapter.recognizes(document) {
                    let adapter = Arc::clone(adapter);
                    return adapter.unflatten(value, cx);
                }
            }
            Err(Error::invalid_document(
                "transform document has neither a class tag nor a recognized shape",
            ))
        }
        Some(class) => {
            let Some(adapter) = cx.registry().transform_by_name(class) else {
                tracing::error!(class, "unknown transform discriminant; node will be absent");
                return Ok(None);
            };
            if adapter.bypass() {
                // A tagged document for a bypass type keeps its fields
                // inline rather than under a payload key.
                return adapter.unflatten(value, cx);
            }
            let payload = document.get(PAYLOAD_KEY).ok_or_else(|| {
                Error::invalid_document(format!("transform document `{class}` missing payload"))
            })?;
            adapter.unflatten(payload, cx)
        }
    }
}

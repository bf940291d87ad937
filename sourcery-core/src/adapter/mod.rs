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

//! Per-concrete-type adapters: one module per family, plus the two adapter
//! capabilities they implement and the plugin that contributes the built-in
//! set.
//!
//! The fail-soft convention runs through every signature here: `Ok(None)` is
//! the explicit absent value for a node that could not be processed (already
//! logged at the point of failure), while `Err` is fatal for the resolution
//! chain that raised it (cycles, structurally broken payloads).

pub mod affine_source;
pub mod affine_transform;
pub mod iterative;
pub mod landmark;
pub mod raw_source;
pub mod resampled_source;
pub mod sequence;
pub mod warped_source;

use std::any::TypeId;
use std::sync::Arc;

use glam::DVec3;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::model::source::Source;
use crate::model::transform::Transform;
use crate::resolver::context::{ReadContext, WriteContext};

pub use affine_source::AffineSourceAdapter;
pub use affine_transform::AffineTransformAdapter;
pub use iterative::IterativeInverseAdapter;
pub use landmark::LandmarkAdapter;
pub use raw_source::RawSourceAdapter;
pub use resampled_source::ResampledSourceAdapter;
pub use sequence::{InvertibleSequenceAdapter, SequenceAdapter};
pub use warped_source::WarpedSourceAdapter;

/// Flattens/unflattens exactly one concrete [`Source`] type.
///
/// `flatten` returns the type's own fields only; the dispatcher adds the
/// discriminant and id tags. Nested sources are replaced by reference ids
/// through [`WriteContext::to_id`]; on the way back,
/// [`ReadContext::from_id`] resolves them, materializing pending documents
/// as needed.
pub trait SourceAdapter: Send + Sync {
    /// The concrete-type tag written into documents.
    fn discriminant(&self) -> &'static str;

    /// The concrete Rust type this adapter specializes.
    fn concrete_type(&self) -> TypeId;

    fn flatten(
        &self,
        source: &dyn Source,
        cx: &mut WriteContext<'_>,
    ) -> Result<Option<Map<String, Value>>, Error>;

    fn unflatten(
        &self,
        document: &Map<String, Value>,
        cx: &mut ReadContext<'_>,
    ) -> Result<Option<Arc<dyn Source>>, Error>;
}

/// Flattens/unflattens exactly one concrete [`Transform`] type.
///
/// A regular adapter returns a payload that the dispatcher wraps in the
/// `{"class", "payload"}` envelope. An adapter that answers `true` from
/// [`bypass`](TransformAdapter::bypass) fully owns its serialization: its
/// `flatten` output is written verbatim with no envelope, and on the read
/// side [`recognizes`](TransformAdapter::recognizes) is consulted for
/// untagged documents before any discriminant lookup happens.
pub trait TransformAdapter: Send + Sync {
    fn discriminant(&self) -> &'static str;

    fn concrete_type(&self) -> TypeId;

    /// Whether this adapter owns its document shape outright.
    fn bypass(&self) -> bool {
        false
    }

    /// Shape test for untagged documents; only meaningful for bypass
    /// adapters.
    fn recognizes(&self, _document: &Map<String, Value>) -> bool {
        false
    }

    fn flatten(
        &self,
        transform: &dyn Transform,
        cx: &mut WriteContext<'_>,
    ) -> Result<Option<Value>, Error>;

    fn unflatten(
        &self,
        payload: &Value,
        cx: &mut ReadContext<'_>,
    ) -> Result<Option<Box<dyn Transform>>, Error>;
}

/// A batch of adapters contributed together, typically by one plugin crate.
pub trait AdapterPlugin {
    fn source_adapters(&self) -> Vec<Arc<dyn SourceAdapter>> {
        Vec::new()
    }

    fn transform_adapters(&self) -> Vec<Arc<dyn TransformAdapter>> {
        Vec::new()
    }
}

/// The plugin contributing every built-in source and transform family.
pub struct BuiltinAdapters;

impl AdapterPlugin for BuiltinAdapters {
    fn source_adapters(&self) -> Vec<Arc<dyn SourceAdapter>> {
        vec![
            Arc::new(RawSourceAdapter),
            Arc::new(AffineSourceAdapter),
            Arc::new(WarpedSourceAdapter),
            Arc::new(ResampledSourceAdapter),
        ]
    }

    fn transform_adapters(&self) -> Vec<Arc<dyn TransformAdapter>> {
        vec![
            Arc::new(AffineTransformAdapter),
            Arc::new(SequenceAdapter),
            Arc::new(InvertibleSequenceAdapter),
            Arc::new(LandmarkAdapter),
            Arc::new(IterativeInverseAdapter),
        ]
    }
}

// Field access helpers shared by the adapter modules. An adapter receiving
// a dispatched node of the wrong concrete type is a registry wiring bug and
// surfaces as an invalid-document error rather than a panic.

pub(crate) fn downcast_source<'a, T: 'static>(
    source: &'a dyn Source,
    discriminant: &'static str,
) -> Result<&'a T, Error> {
    source.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::invalid_document(format!(
            "source dispatched to {discriminant} adapter has a different concrete type"
        ))
    })
}

pub(crate) fn downcast_transform<'a, T: 'static>(
    transform: &'a dyn Transform,
    discriminant: &'static str,
) -> Result<&'a T, Error> {
    transform.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::invalid_document(format!(
            "transform dispatched to {discriminant} adapter has a different concrete type"
        ))
    })
}

pub(crate) fn require_str<'a>(doc: &'a Map<String, Value>, key: &str) -> Result<&'a str, Error> {
    doc.get(key).and_then(Value::as_str).ok_or_else(|| {
        Error::invalid_document(format!("missing or non-string field `{key}`"))
    })
}

pub(crate) fn require_f64_array(
    doc: &Map<String, Value>,
    key: &str,
    len: usize,
) -> Result<Vec<f64>, Error> {
    let values = doc
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::invalid_document(format!("missing or non-array field `{key}`")))?;
    crate::ensure!(
        values.len() == len,
        Error::invalid_document(format!(
            "field `{key}` has {} elements, expected {len}",
            values.len()
        ))
    );
    values
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| Error::invalid_document(format!("non-numeric element in `{key}`")))
        })
        .collect()
}

pub(crate) fn require_i64_array(
    doc: &Map<String, Value>,
    key: &str,
    len: usize,
) -> Result<Vec<i64>, Error> {
    let values = doc
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::invalid_document(format!("missing or non-array field `{key}`")))?;
    crate::ensure!(
        values.len() == len,
        Error::invalid_document(format!(
            "field `{key}` has {} elements, expected {len}",
            values.len()
        ))
    );
    values
        .iter()
        .map(|v| {
            v.as_i64()
                .ok_or_else(|| Error::invalid_document(format!("non-integer element in `{key}`")))
        })
        .collect()
}

pub(crate) fn require_id(doc: &Map<String, Value>, key: &str) -> Result<crate::document::NodeId, Error> {
    doc.get(key)
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .map(crate::document::NodeId::new)
        .ok_or_else(|| {
            Error::invalid_document(format!("missing or invalid reference id field `{key}`"))
        })
}

pub(crate) fn points_to_value(points: &[DVec3]) -> Value {
    Value::Array(
        points
            .iter()
            .map(|p| Value::from(vec![p.x, p.y, p.z]))
            .collect(),
    )
}

pub(crate) fn value_to_points(value: &Value, key: &str) -> Result<Vec<DVec3>, Error> {
    let rows = value
        .as_array()
        .ok_or_else(|| Error::invalid_document(format!("field `{key}` must be an array")))?;
    rows.iter()
        .map(|row| {
            let coords = row.as_array().filter(|c| c.len() == 3).ok_or_else(|| {
                Error::invalid_document(format!("field `{key}` must contain [x, y, z] triples"))
            })?;
            let mut p = [0.0f64; 3];
            for (slot, c) in p.iter_mut().zip(coords) {
                *slot = c.as_f64().ok_or_else(|| {
                    Error::invalid_document(format!("non-numeric coordinate in `{key}`"))
                })?;
            }
            Ok(DVec3::new(p[0], p[1], p[2]))
        })
        .collect()
}

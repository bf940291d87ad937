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

//! Ordered transform compositions. Elements are owned, so they embed as a
//! document list rather than as references.

use std::any::TypeId;

use serde_json::{Map, Value};

use crate::adapter::{downcast_transform, TransformAdapter};
use crate::dispatch;
use crate::error::Error;
use crate::model::transform::{InvertibleTransformSequence, Transform, TransformSequence};
use crate::resolver::context::{ReadContext, WriteContext};

fn flatten_steps(
    steps: &[Box<dyn Transform>],
    cx: &mut WriteContext<'_>,
) -> Result<Option<Value>, Error> {
    let mut documents = Vec::with_capacity(steps.len());
    for step in steps {
        let Some(doc) = dispatch::write_transform(step.as_ref(), cx)? else {
            tracing::warn!("sequence element could not be serialized; dropping whole sequence");
            return Ok(None);
        };
        documents.push(doc);
    }
    let mut payload = Map::new();
    payload.insert("steps".to_owned(), Value::Array(documents));
    Ok(Some(Value::Object(payload)))
}

fn unflatten_steps(
    payload: &Value,
    cx: &mut ReadContext<'_>,
) -> Result<Option<Vec<Box<dyn Transform>>>, Error> {
    let documents = payload
        .as_object()
        .and_then(|p| p.get("steps"))
        .and_then(Value::as_array)
        .ok_or_else(|| Error::invalid_document("sequence payload missing steps array"))?;
    let mut steps = Vec::with_capacity(documents.len());
    for doc in documents {
        let Some(step) = dispatch::read_transform(doc, cx)? else {
            tracing::warn!("sequence element is absent; dropping whole sequence");
            return Ok(None);
        };
        steps.push(step);
    }
    Ok(Some(steps))
}

/// Ordered composition, applied first to last.
pub struct SequenceAdapter;

impl TransformAdapter for SequenceAdapter {
    fn discriminant(&self) -> &'static str {
        "transform_sequence"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<TransformSequence>()
    }

    fn flatten(
        &self,
        transform: &dyn Transform,
        cx: &mut WriteContext<'_>,
    ) -> Result<Option<Value>, Error> {
        let sequence = downcast_transform::<TransformSequence>(transform, self.discriminant())?;
        flatten_steps(sequence.steps(), cx)
    }

    fn unflatten(
        &self,
        payload: &Value,
        cx: &mut ReadContext<'_>,
    ) -> Result<Option<Box<dyn Transform>>, Error> {
        Ok(unflatten_steps(payload, cx)?
            .map(|steps| Box::new(TransformSequence::new(steps)) as Box<dyn Transform>))
    }
}

/// Ordered composition whose elements are all guaranteed invertible; the
/// guarantee is re-checked at materialization time.
pub struct InvertibleSequenceAdapter;

impl TransformAdapter for InvertibleSequenceAdapter {
    fn discriminant(&self) -> &'static str {
        "invertible_sequence"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<InvertibleTransformSequence>()
    }

    fn flatten(
        &self,
        transform: &dyn Transform,
        cx: &mut WriteContext<'_>,
    ) -> Result<Option<Value>, Error> {
        let sequence =
            downcast_transform::<InvertibleTransformSequence>(transform, self.discriminant())?;
        flatten_steps(sequence.steps(), cx)
    }

    fn unflatten(
        &self,
        payload: &Value,
        cx: &mut ReadContext<'_>,
    ) -> Result<Option<Box<dyn Transform>>, Error> {
        match unflatten_steps(payload, cx)? {
            Some(steps) => Ok(Some(Box::new(InvertibleTransformSequence::new(steps)?))),
            None => Ok(None),
        }
    }
}

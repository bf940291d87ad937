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

use std::any::TypeId;

use serde_json::Value;

use crate::adapter::{downcast_transform, TransformAdapter};
use crate::dispatch;
use crate::error::Error;
use crate::model::transform::{IterativeInverseTransform, Transform};
use crate::resolver::context::{ReadContext, WriteContext};

/// Iteratively-invertible wrapper. Serialization transparently unwraps it:
/// only the wrapped transform is written, and numeric invertibility is not
/// preserved in the document. A deliberate, lossy simplification.
pub struct IterativeInverseAdapter;

impl TransformAdapter for IterativeInverseAdapter {
    fn discriminant(&self) -> &'static str {
        "iterative_inverse"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<IterativeInverseTransform>()
    }

    // Fully owns serialization: the emitted document is the wrapped
    // transform's own document, envelope and all.
    fn bypass(&self) -> bool {
        true
    }

    fn flatten(
        &self,
        transform: &dyn Transform,
        cx: &mut WriteContext<'_>,
    ) -> Result<Option<Value>, Error> {
        let wrapper =
            downcast_transform::<IterativeInverseTransform>(transform, self.discriminant())?;
        tracing::debug!(
            "unwrapping iterative-inverse wrapper; numeric invertibility is not persisted"
        );
        dispatch::write_transform(wrapper.forward(), cx)
    }

    fn unflatten(
        &self,
        _payload: &Value,
        _cx: &mut ReadContext<'_>,
    ) -> Result<Option<Box<dyn Transform>>, Error> {
        // The discriminant never appears in documents this engine writes.
        Err(Error::invalid_document(
            "iterative_inverse documents are never written; the wrapper is unwrapped at save time",
        ))
    }
}

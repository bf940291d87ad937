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
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::adapter::{downcast_source, require_f64_array, require_id, SourceAdapter};
use crate::error::Error;
use crate::model::source::{AffineSource, Source};
use crate::model::transform::AffineTransform;
use crate::resolver::context::{ReadContext, WriteContext};

/// Affine-composed source: an explicit row-major matrix and one reference
/// to the wrapped source.
pub struct AffineSourceAdapter;

impl SourceAdapter for AffineSourceAdapter {
    fn discriminant(&self) -> &'static str {
        "affine"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<AffineSource>()
    }

    fn flatten(
        &self,
        source: &dyn Source,
        cx: &mut WriteContext<'_>,
    ) -> Result<Option<Map<String, Value>>, Error> {
        let affine = downcast_source::<AffineSource>(source, self.discriminant())?;
        let wrapped_id = cx.to_id(affine.wrapped_source())?;
        let mut doc = Map::new();
        doc.insert(
            "transform".to_owned(),
            Value::from(affine.transform().to_row_major().to_vec()),
        );
        doc.insert(
            "wrapped_source_id".to_owned(),
            Value::from(wrapped_id.as_u32()),
        );
        Ok(Some(doc))
    }

    fn unflatten(
        &self,
        document: &Map<String, Value>,
        cx: &mut ReadContext<'_>,
    ) -> Result<Option<Arc<dyn Source>>, Error> {
        let coefficients = require_f64_array(document, "transform", 12)?;
        let mut m = [0.0f64; 12];
        m.copy_from_slice(&coefficients);
        let wrapped_id = require_id(document, "wrapped_source_id")?;

        let Some(wrapped) = cx.from_id(wrapped_id)? else {
            tracing::warn!(node = %wrapped_id, "wrapped source is absent; dropping affine source");
            return Ok(None);
        };
        Ok(Some(Arc::new(AffineSource::new(
            AffineTransform::from_row_major(&m),
            wrapped,
        ))))
    }
}

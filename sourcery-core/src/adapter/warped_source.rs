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

use crate::adapter::{downcast_source, require_id, SourceAdapter};
use crate::dispatch;
use crate::error::Error;
use crate::model::source::{Source, WarpedSource};
use crate::resolver::context::{ReadContext, WriteContext};

/// Non-affine-warped source: an embedded transform document (owned, not
/// shared) and one reference to the wrapped source.
pub struct WarpedSourceAdapter;

impl SourceAdapter for WarpedSourceAdapter {
    fn discriminant(&self) -> &'static str {
        "warped"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<WarpedSource>()
    }

    fn flatten(
        &self,
        source: &dyn Source,
        cx: &mut WriteContext<'_>,
    ) -> Result<Option<Map<String, Value>>, Error> {
        let warped = downcast_source::<WarpedSource>(source, self.discriminant())?;
        let Some(transform) = dispatch::write_transform(warped.transform(), cx)? else {
            tracing::warn!(
                name = warped.name(),
                "transform could not be serialized; dropping warped source"
            );
            return Ok(None);
        };
        let wrapped_id = cx.to_id(warped.wrapped_source())?;
        let mut doc = Map::new();
        doc.insert("transform".to_owned(), transform);
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
        let transform_doc = document
            .get("transform")
            .ok_or_else(|| Error::invalid_document("warped source missing transform"))?;
        let Some(transform) = dispatch::read_transform(transform_doc, cx)? else {
            tracing::warn!("transform is absent; dropping warped source");
            return Ok(None);
        };
        let wrapped_id = require_id(document, "wrapped_source_id")?;
        let Some(wrapped) = cx.from_id(wrapped_id)? else {
            tracing::warn!(node = %wrapped_id, "wrapped source is absent; dropping warped source");
            return Ok(None);
        };
        Ok(Some(Arc::new(WarpedSource::new(transform, wrapped))))
    }
}

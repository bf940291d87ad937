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

use crate::adapter::{downcast_source, require_id, require_str, SourceAdapter};
use crate::error::Error;
use crate::model::source::{ResampleOptions, ResampledSource, Source};
use crate::resolver::context::{ReadContext, WriteContext};

/// Resampled source: two references (origin and grid model) plus the
/// resampling options.
pub struct ResampledSourceAdapter;

impl SourceAdapter for ResampledSourceAdapter {
    fn discriminant(&self) -> &'static str {
        "resampled"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<ResampledSource>()
    }

    fn flatten(
        &self,
        source: &dyn Source,
        cx: &mut WriteContext<'_>,
    ) -> Result<Option<Map<String, Value>>, Error> {
        let resampled = downcast_source::<ResampledSource>(source, self.discriminant())?;
        let origin_id = cx.to_id(resampled.origin())?;
        let model_id = cx.to_id(resampled.model())?;
        let options = serde_json::to_value(resampled.options())
            .map_err(|e| Error::invalid_document(format!("unencodable resample options: {e}")))?;

        let mut doc = Map::new();
        doc.insert("name".to_owned(), Value::from(resampled.name()));
        doc.insert("origin_source_id".to_owned(), Value::from(origin_id.as_u32()));
        doc.insert("model_source_id".to_owned(), Value::from(model_id.as_u32()));
        doc.insert("options".to_owned(), options);
        Ok(Some(doc))
    }

    fn unflatten(
        &self,
        document: &Map<String, Value>,
        cx: &mut ReadContext<'_>,
    ) -> Result<Option<Arc<dyn Source>>, Error> {
        let name = require_str(document, "name")?;
        let origin_id = require_id(document, "origin_source_id")?;
        let model_id = require_id(document, "model_source_id")?;
        let options: ResampleOptions = document
            .get("options")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| Error::invalid_document(format!("unreadable resample options: {e}")))?
            .unwrap_or_default();

        let Some(origin) = cx.from_id(origin_id)? else {
            tracing::warn!(node = %origin_id, "origin source is absent; dropping resampled source");
            return Ok(None);
        };
        let Some(model) = cx.from_id(model_id)? else {
            tracing::warn!(node = %model_id, "model source is absent; dropping resampled source");
            return Ok(None);
        };
        Ok(Some(Arc::new(ResampledSource::new(
            name, origin, model, options,
        ))))
    }
}

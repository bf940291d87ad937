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

use serde_json::{Map, Value};

use crate::adapter::{downcast_transform, points_to_value, value_to_points, TransformAdapter};
use crate::error::Error;
use crate::model::transform::{LandmarkTransform, Transform};
use crate::resolver::context::{ReadContext, WriteContext};

/// Landmark warp. The target points are not stored verbatim: they are
/// derived by re-evaluating the forward mapping at each source landmark at
/// serialization time, which guarantees that re-solving from the document
/// reproduces the same mapping no matter how the in-memory kernel was
/// originally constructed.
pub struct LandmarkAdapter;

impl TransformAdapter for LandmarkAdapter {
    fn discriminant(&self) -> &'static str {
        "landmarks"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<LandmarkTransform>()
    }

    fn flatten(
        &self,
        transform: &dyn Transform,
        _cx: &mut WriteContext<'_>,
    ) -> Result<Option<Value>, Error> {
        let warp = downcast_transform::<LandmarkTransform>(transform, self.discriminant())?;
        let sources = warp.landmarks();
        let targets: Vec<_> = sources.iter().map(|p| warp.apply(*p)).collect();

        let mut payload = Map::new();
        payload.insert("source_points".to_owned(), points_to_value(sources));
        payload.insert("target_points".to_owned(), points_to_value(&targets));
        Ok(Some(Value::Object(payload)))
    }

    fn unflatten(
        &self,
        payload: &Value,
        _cx: &mut ReadContext<'_>,
    ) -> Result<Option<Box<dyn Transform>>, Error> {
        let doc = payload
            .as_object()
            .ok_or_else(|| Error::invalid_document("landmark payload must be an object"))?;
        let sources = value_to_points(
            doc.get("source_points")
                .ok_or_else(|| Error::invalid_document("landmark payload missing source_points"))?,
            "source_points",
        )?;
        let targets = value_to_points(
            doc.get("target_points")
                .ok_or_else(|| Error::invalid_document("landmark payload missing target_points"))?,
            "target_points",
        )?;
        Ok(Some(Box::new(LandmarkTransform::solve(sources, &targets)?)))
    }
}

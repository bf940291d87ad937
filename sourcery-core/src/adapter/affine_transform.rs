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

use crate::adapter::{downcast_transform, require_f64_array, TransformAdapter};
use crate::error::Error;
use crate::model::transform::{AffineTransform, Transform};
use crate::resolver::context::{ReadContext, WriteContext};

/// Key carrying the row-major 3x4 coefficients in the compact affine shape.
pub const AFFINE_MATRIX_KEY: &str = "affine_matrix";

/// Affine transform leaf, written via the bypass path: a bare
/// `{"affine_matrix": [...]}` object with no discriminant, recognized
/// structurally on the way back. The compact shape is byte-stable and is
/// what external tools consume.
pub struct AffineTransformAdapter;

impl TransformAdapter for AffineTransformAdapter {
    fn discriminant(&self) -> &'static str {
        "affine"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<AffineTransform>()
    }

    fn bypass(&self) -> bool {
        true
    }

    fn recognizes(&self, document: &Map<String, Value>) -> bool {
        document.contains_key(AFFINE_MATRIX_KEY)
    }

    fn flatten(
        &self,
        transform: &dyn Transform,
        _cx: &mut WriteContext<'_>,
    ) -> Result<Option<Value>, Error> {
        let affine = downcast_transform::<AffineTransform>(transform, self.discriminant())?;
        let mut doc = Map::new();
        doc.insert(
            AFFINE_MATRIX_KEY.to_owned(),
            Value::from(affine.to_row_major().to_vec()),
        );
        Ok(Some(Value::Object(doc)))
    }

    fn unflatten(
        &self,
        payload: &Value,
        _cx: &mut ReadContext<'_>,
    ) -> Result<Option<Box<dyn Transform>>, Error> {
        let doc = payload
            .as_object()
            .ok_or_else(|| Error::invalid_document("affine document must be an object"))?;
        let coefficients = require_f64_array(doc, AFFINE_MATRIX_KEY, 12)?;
        let mut m = [0.0f64; 12];
        m.copy_from_slice(&coefficients);
        Ok(Some(Box::new(AffineTransform::from_row_major(&m))))
    }
}

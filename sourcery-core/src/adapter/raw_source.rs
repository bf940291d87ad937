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

use crate::adapter::{
    downcast_source, require_f64_array, require_i64_array, require_str, SourceAdapter,
};
use crate::error::Error;
use crate::model::source::{RawSource, Source, VoxelGrid};
use crate::model::transform::AffineTransform;
use crate::resolver::context::{ReadContext, WriteContext};

/// Leaf data source: intrinsic geometry and a data location, no references.
pub struct RawSourceAdapter;

impl SourceAdapter for RawSourceAdapter {
    fn discriminant(&self) -> &'static str {
        "raw"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<RawSource>()
    }

    fn flatten(
        &self,
        source: &dyn Source,
        _cx: &mut WriteContext<'_>,
    ) -> Result<Option<Map<String, Value>>, Error> {
        let raw = downcast_source::<RawSource>(source, self.discriminant())?;
        let grid = raw.grid();
        let mut doc = Map::new();
        doc.insert("name".to_owned(), Value::from(raw.name()));
        doc.insert("location".to_owned(), Value::from(raw.location()));
        doc.insert("extent".to_owned(), Value::from(grid.extent.to_vec()));
        doc.insert(
            "voxel_size".to_owned(),
            Value::from(grid.voxel_size.to_vec()),
        );
        doc.insert(
            "calibration".to_owned(),
            Value::from(grid.calibration.to_row_major().to_vec()),
        );
        Ok(Some(doc))
    }

    fn unflatten(
        &self,
        document: &Map<String, Value>,
        cx: &mut ReadContext<'_>,
    ) -> Result<Option<Arc<dyn Source>>, Error> {
        let location = require_str(document, "location")?;
        if let Some(resident) = cx.resident_by_location(location) {
            tracing::debug!(location, "reusing resident source for data location");
            return Ok(Some(resident));
        }

        let name = require_str(document, "name")?;
        let extent = require_i64_array(document, "extent", 3)?;
        let voxel_size = require_f64_array(document, "voxel_size", 3)?;
        let calibration = require_f64_array(document, "calibration", 12)?;
        let mut coefficients = [0.0f64; 12];
        coefficients.copy_from_slice(&calibration);

        let grid = VoxelGrid::new(
            [extent[0], extent[1], extent[2]],
            [voxel_size[0], voxel_size[1], voxel_size[2]],
            AffineTransform::from_row_major(&coefficients),
        );
        let source: Arc<dyn Source> = Arc::new(RawSource::new(name, location, grid));
        cx.bind_location(location, &source);
        Ok(Some(source))
    }
}

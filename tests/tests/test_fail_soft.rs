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

//! One bad node must never sink a batch: the engine localizes the failure,
//! logs it, and reports the node absent.

use std::any::Any;
use std::sync::Arc;

use serde_json::json;
use sourcery::model::{RawSource, Source, SourceAndConverter, VoxelGrid};
use sourcery::{AdapterRegistry, GraphCodec, GraphDocument, SourceIndex};

fn leaf(name: &str) -> Arc<dyn Source> {
    Arc::new(RawSource::new(
        name,
        format!("file:///data/{name}.zarr"),
        VoxelGrid::unit([16, 16, 16]),
    ))
}

/// A source type nothing ever registered an adapter for.
#[derive(Debug)]
struct MysterySource {
    grid: VoxelGrid,
}

impl Source for MysterySource {
    fn name(&self) -> &str {
        "mystery"
    }

    fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn unknown_concrete_type_costs_only_its_own_node() {
    let registry = AdapterRegistry::builtin();
    let codec = GraphCodec::new(&registry);

    let items = vec![
        SourceAndConverter::new(leaf("first")),
        SourceAndConverter::new(Arc::new(MysterySource {
            grid: VoxelGrid::unit([4, 4, 4]),
        })),
        SourceAndConverter::new(leaf("second")),
    ];
    let document = codec.save(&items).unwrap();

    // The unknown node produced no document, no envelope, no root entry.
    assert_eq!(document.sources.len(), 2);
    assert_eq!(document.roots.len(), 2);
    assert_eq!(document.converters.len(), 2);

    let mut index = SourceIndex::new();
    let restored = codec.load_all(&document, &mut index).unwrap();
    assert_eq!(restored[0].as_ref().unwrap().source.name(), "first");
    assert_eq!(restored[1].as_ref().unwrap().source.name(), "second");
}

#[test]
fn unknown_discriminant_loads_as_absent() {
    let document: GraphDocument = serde_json::from_value(json!({
        "sources": [
            {
                "class": "hologram",
                "id": 0,
                "emitter": "unobtainium",
            },
            {
                "class": "raw",
                "id": 1,
                "name": "healthy",
                "location": "file:///data/healthy.zarr",
                "extent": [8, 8, 8],
                "voxel_size": [1.0, 1.0, 1.0],
                "calibration": [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            },
        ],
        "roots": [0, 1]
    }))
    .unwrap();

    let registry = AdapterRegistry::builtin();
    let codec = GraphCodec::new(&registry);
    let mut index = SourceIndex::new();
    let restored = codec.load_all(&document, &mut index).unwrap();

    assert!(restored[0].is_none());
    assert_eq!(restored[1].as_ref().unwrap().source.name(), "healthy");
}

#[test]
fn dangling_reference_drops_the_referencing_node_only() {
    let document: GraphDocument = serde_json::from_value(json!({
        "sources": [
            {
                "class": "affine",
                "id": 0,
                "transform": [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
                "wrapped_source_id": 99,
            },
            {
                "class": "raw",
                "id": 1,
                "name": "healthy",
                "location": "file:///data/healthy.zarr",
                "extent": [8, 8, 8],
                "voxel_size": [1.0, 1.0, 1.0],
                "calibration": [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            },
        ],
        "roots": [0, 1]
    }))
    .unwrap();

    let registry = AdapterRegistry::builtin();
    let codec = GraphCodec::new(&registry);
    let mut index = SourceIndex::new();
    let restored = codec.load_all(&document, &mut index).unwrap();

    assert!(restored[0].is_none());
    assert_eq!(restored[1].as_ref().unwrap().source.name(), "healthy");
}

#[test]
fn requesting_an_id_with_no_document_yields_absent() {
    let document: GraphDocument = serde_json::from_value(json!({
        "sources": [],
        "roots": [42]
    }))
    .unwrap();

    let registry = AdapterRegistry::builtin();
    let codec = GraphCodec::new(&registry);
    let mut index = SourceIndex::new();
    let restored = codec.load_all(&document, &mut index).unwrap();
    assert_eq!(restored.len(), 1);
    assert!(restored[0].is_none());
}

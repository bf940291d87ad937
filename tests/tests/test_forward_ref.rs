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

//! Documents are flat lists; nothing guarantees a referenced node's
//! document appears before the node referencing it. These tests construct
//! such lists explicitly.

use serde_json::json;
use sourcery::model::{RawSource, ResampledSource, Source};
use sourcery::{AdapterRegistry, GraphCodec, GraphDocument, SourceIndex};

const IDENTITY: [f64; 12] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0,
];

fn raw_doc(id: u32, name: &str, extent: [i64; 3]) -> serde_json::Value {
    json!({
        "class": "raw",
        "id": id,
        "name": name,
        "location": format!("file:///data/{name}.zarr"),
        "extent": extent,
        "voxel_size": [1.0, 1.0, 1.0],
        "calibration": IDENTITY,
    })
}

fn load_document(value: serde_json::Value) -> Vec<Option<sourcery::model::SourceAndConverter>> {
    let document: GraphDocument = serde_json::from_value(value).unwrap();
    let registry = AdapterRegistry::builtin();
    let codec = GraphCodec::new(&registry);
    let mut index = SourceIndex::new();
    codec.load_all(&document, &mut index).unwrap()
}

#[test]
fn reference_ahead_of_referenced_document_resolves() {
    // Node 1 references node 2, whose document appears later in the list.
    let restored = load_document(json!({
        "sources": [
            {
                "class": "affine",
                "id": 1,
                "transform": IDENTITY,
                "wrapped_source_id": 2,
            },
            raw_doc(2, "em", [32, 32, 32]),
        ],
        "roots": [1]
    }));

    let source = restored[0].as_ref().unwrap().source.clone();
    assert_eq!(source.name(), "em");
    let wrapped = source.wrapped().unwrap();
    assert!(wrapped.as_any().downcast_ref::<RawSource>().is_some());
}

#[test]
fn resampled_scenario_with_shuffled_documents() {
    // Origin is id 3, model is id 5; id 5's document is listed before
    // id 3's, and both after the resampled node itself.
    let restored = load_document(json!({
        "sources": [
            {
                "class": "resampled",
                "id": 0,
                "name": "em-on-atlas",
                "origin_source_id": 3,
                "model_source_id": 5,
                "options": {
                    "interpolate": true,
                    "cache": false,
                    "reuse_mip_levels": true,
                    "default_mip_level": 0,
                },
            },
            raw_doc(5, "atlas", [100, 110, 120]),
            raw_doc(3, "em", [512, 512, 64]),
        ],
        "roots": [0]
    }));

    let source = restored[0].as_ref().unwrap().source.clone();
    let resampled = source.as_any().downcast_ref::<ResampledSource>().unwrap();
    assert_eq!(resampled.grid().extent, [100, 110, 120]);
    assert_eq!(resampled.origin().name(), "em");
}

#[test]
fn requesting_roots_in_any_order_works() {
    let restored = load_document(json!({
        "sources": [
            raw_doc(7, "b", [8, 8, 8]),
            raw_doc(4, "a", [8, 8, 8]),
        ],
        "roots": [7, 4]
    }));

    assert_eq!(restored[0].as_ref().unwrap().source.name(), "b");
    assert_eq!(restored[1].as_ref().unwrap().source.name(), "a");
}

#[test]
fn true_cycle_fails_that_root_only() {
    // Nodes 0 and 1 wrap each other: malformed by construction.
    let restored = load_document(json!({
        "sources": [
            {
                "class": "affine",
                "id": 0,
                "transform": IDENTITY,
                "wrapped_source_id": 1,
            },
            {
                "class": "affine",
                "id": 1,
                "transform": IDENTITY,
                "wrapped_source_id": 0,
            },
            raw_doc(2, "healthy", [8, 8, 8]),
        ],
        "roots": [0, 2]
    }));

    // The cyclic chain is reported absent; the healthy root still loads.
    assert!(restored[0].is_none());
    assert_eq!(restored[1].as_ref().unwrap().source.name(), "healthy");
}

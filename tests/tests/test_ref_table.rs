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

use std::sync::Arc;

use serde_json::Map;
use sourcery_core::error::Error;
use sourcery_core::model::{RawSource, Source, VoxelGrid};
use sourcery_core::resolver::ReferenceTable;

fn leaf(name: &str) -> Arc<dyn Source> {
    Arc::new(RawSource::new(
        name,
        format!("file:///data/{name}.zarr"),
        VoxelGrid::unit([16, 16, 16]),
    ))
}

#[test]
fn assign_id_is_idempotent_per_object() {
    let mut refs = ReferenceTable::new();
    let source = leaf("a");

    let id = refs.assign_id(&source);
    assert_eq!(refs.assign_id(&source), id);
    assert_eq!(refs.assign_id(&Arc::clone(&source)), id);
    assert_eq!(refs.id_of(&source), Some(id));
}

#[test]
fn distinct_objects_get_distinct_ids() {
    let mut refs = ReferenceTable::new();
    let a = leaf("a");
    let b = leaf("b");
    // Identical field values, distinct object.
    let a_twin = leaf("a");

    let id_a = refs.assign_id(&a);
    let id_b = refs.assign_id(&b);
    let id_twin = refs.assign_id(&a_twin);

    assert_ne!(id_a, id_b);
    assert_ne!(id_a, id_twin);
    assert_ne!(id_b, id_twin);
}

#[test]
fn pending_documents_are_taken_once() {
    let mut refs = ReferenceTable::new();
    let id = refs.assign_id(&leaf("a"));

    let mut doc = Map::new();
    doc.insert("class".to_owned(), "raw".into());
    refs.record_pending(id, doc);

    assert!(refs.take_pending(id).is_some());
    assert!(refs.take_pending(id).is_none());
}

#[test]
fn finish_registers_and_resolves() {
    let mut refs = ReferenceTable::new();
    let placeholder = leaf("placeholder");
    let id = refs.assign_id(&placeholder);

    let materialized = leaf("real");
    refs.begin(id).unwrap();
    refs.finish(id, Arc::clone(&materialized));

    let resolved = refs.resolved(id).unwrap();
    assert!(Arc::ptr_eq(&resolved, &materialized));
    // The finished id can be begun again in a later (bogus) pass.
    assert!(refs.begin(id).is_ok());
}

#[test]
fn reentrant_begin_is_a_cycle() {
    let mut refs = ReferenceTable::new();
    let id = refs.assign_id(&leaf("a"));

    refs.begin(id).unwrap();
    let err = refs.begin(id).unwrap_err();
    assert!(matches!(err, Error::CycleDetected(_)));

    // Abandoning clears the mark.
    refs.abandon(id);
    assert!(refs.begin(id).is_ok());
}

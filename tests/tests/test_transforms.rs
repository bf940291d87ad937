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

use glam::DVec3;
use serde_json::json;
use sourcery::dispatch::{read_transform, write_transform};
use sourcery::model::{
    AffineTransform, InvertibleTransformSequence, IterativeInverseTransform, LandmarkTransform,
    Transform, TransformSequence,
};
use sourcery::{AdapterRegistry, Error, SourceIndex};
use sourcery::resolver::{ReadContext, WriteContext};

fn roundtrip(transform: &dyn Transform) -> Box<dyn Transform> {
    let registry = AdapterRegistry::builtin();
    let mut write = WriteContext::new(&registry);
    let document = write_transform(transform, &mut write).unwrap().unwrap();

    let mut index = SourceIndex::new();
    let mut read = ReadContext::new(&registry, &mut index);
    read_transform(&document, &mut read).unwrap().unwrap()
}

#[test]
fn translate_then_scale_composite_scenario() {
    let sequence = TransformSequence::new(vec![
        Box::new(AffineTransform::translation(DVec3::new(10.0, 0.0, 0.0))),
        Box::new(AffineTransform::scaling(DVec3::splat(2.0))),
    ]);

    let restored = roundtrip(&sequence);
    let out = restored.apply(DVec3::new(1.0, 0.0, 0.0));
    // Translate first, then scale, in the declared order.
    assert!(out.distance(DVec3::new(22.0, 0.0, 0.0)) < 1e-10);
}

#[test]
fn affine_bypass_shape_is_bare_and_byte_stable() {
    let affine = AffineTransform::translation(DVec3::new(1.0, 2.0, 3.0));
    let registry = AdapterRegistry::builtin();

    let mut write = WriteContext::new(&registry);
    let first = write_transform(&affine, &mut write).unwrap().unwrap();
    let second = write_transform(&affine, &mut write).unwrap().unwrap();

    let doc = first.as_object().unwrap();
    assert!(doc.contains_key("affine_matrix"));
    assert!(!doc.contains_key("class"));
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn tagged_affine_document_still_reads() {
    let registry = AdapterRegistry::builtin();
    let mut index = SourceIndex::new();
    let mut read = ReadContext::new(&registry, &mut index);

    let document = json!({
        "class": "affine",
        "affine_matrix": [1.0, 0.0, 0.0, 5.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    });
    let restored = read_transform(&document, &mut read).unwrap().unwrap();
    let out = restored.apply(DVec3::ZERO);
    assert!(out.distance(DVec3::new(5.0, 0.0, 0.0)) < 1e-12);
}

#[test]
fn untagged_unrecognized_document_is_an_error() {
    let registry = AdapterRegistry::builtin();
    let mut index = SourceIndex::new();
    let mut read = ReadContext::new(&registry, &mut index);

    let err = read_transform(&json!({"mystery": true}), &mut read).unwrap_err();
    assert!(matches!(err, Error::InvalidDocument(_)));
}

#[test]
fn unknown_transform_discriminant_is_absent_not_fatal() {
    let registry = AdapterRegistry::builtin();
    let mut index = SourceIndex::new();
    let mut read = ReadContext::new(&registry, &mut index);

    let restored = read_transform(
        &json!({"class": "escher", "payload": {}}),
        &mut read,
    )
    .unwrap();
    assert!(restored.is_none());
}

#[test]
fn invertible_sequence_roundtrips_and_inverts() {
    let sequence = InvertibleTransformSequence::new(vec![
        Box::new(AffineTransform::translation(DVec3::new(3.0, -1.0, 0.5))),
        Box::new(AffineTransform::scaling(DVec3::new(2.0, 4.0, 0.5))),
    ])
    .unwrap();

    let restored = roundtrip(&sequence);
    let inverse = restored.inverse().unwrap();
    for probe in [DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0), DVec3::splat(-7.5)] {
        let there_and_back = inverse.apply(restored.apply(probe));
        assert!(there_and_back.distance(probe) < 1e-9);
    }
}

#[test]
fn invertible_sequence_rejects_forward_only_elements() {
    let sources = vec![
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
        DVec3::new(1.0, 1.0, 1.0),
    ];
    let targets = sources.clone();
    let warp = LandmarkTransform::solve(sources, &targets).unwrap();

    let err = InvertibleTransformSequence::new(vec![Box::new(warp)]).unwrap_err();
    assert!(matches!(err, Error::NotInvertible(_)));
}

#[test]
fn iterative_wrapper_unwraps_to_exactly_the_inner_transform() {
    let inner = AffineTransform::translation(DVec3::new(4.0, 0.0, 0.0));
    let wrapper = IterativeInverseTransform::new(Box::new(inner));

    let registry = AdapterRegistry::builtin();
    let mut write = WriteContext::new(&registry);
    let document = write_transform(&wrapper, &mut write).unwrap().unwrap();

    // The wrapper left no trace: this is the inner transform's own shape.
    assert!(document.as_object().unwrap().contains_key("affine_matrix"));

    let mut index = SourceIndex::new();
    let mut read = ReadContext::new(&registry, &mut index);
    let restored = read_transform(&document, &mut read).unwrap().unwrap();
    let affine = restored.as_any().downcast_ref::<AffineTransform>().unwrap();
    assert_eq!(*affine, inner);
}

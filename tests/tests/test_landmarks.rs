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
use sourcery::dispatch::write_transform;
use sourcery::model::{IterativeInverseTransform, LandmarkTransform, Transform};
use sourcery::resolver::WriteContext;
use sourcery::{AdapterRegistry, Error};

fn pyramid() -> Vec<DVec3> {
    vec![
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(10.0, 0.0, 0.0),
        DVec3::new(0.0, 10.0, 0.0),
        DVec3::new(10.0, 10.0, 0.0),
        DVec3::new(5.0, 5.0, 8.0),
    ]
}

fn bent_pyramid() -> Vec<DVec3> {
    // A non-affine deformation: the apex moves differently from the base.
    vec![
        DVec3::new(0.5, 0.0, 0.0),
        DVec3::new(10.0, 0.5, 0.0),
        DVec3::new(0.0, 10.5, 0.5),
        DVec3::new(9.5, 10.0, 0.0),
        DVec3::new(5.0, 4.0, 10.0),
    ]
}

fn points_from(value: &serde_json::Value, key: &str) -> Vec<DVec3> {
    value["payload"][key]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            let c = row.as_array().unwrap();
            DVec3::new(
                c[0].as_f64().unwrap(),
                c[1].as_f64().unwrap(),
                c[2].as_f64().unwrap(),
            )
        })
        .collect()
}

#[test]
fn serialized_targets_are_derived_from_the_forward_mapping() {
    let warp = LandmarkTransform::solve(pyramid(), &bent_pyramid()).unwrap();

    let registry = AdapterRegistry::builtin();
    let mut write = WriteContext::new(&registry);
    let document = write_transform(&warp, &mut write).unwrap().unwrap();
    assert_eq!(document["class"], "landmarks");

    let sources = points_from(&document, "source_points");
    let targets = points_from(&document, "target_points");
    assert_eq!(sources.len(), targets.len());

    // The stored targets equal the forward mapping evaluated at the stored
    // sources — and, because the kernel interpolates, the original target
    // landmarks as well.
    for ((stored_source, stored_target), original_target) in
        sources.iter().zip(&targets).zip(&bent_pyramid())
    {
        assert!(warp.apply(*stored_source).distance(*stored_target) < 1e-6);
        assert!(stored_target.distance(*original_target) < 1e-6);
    }
}

#[test]
fn resolving_from_the_document_reproduces_the_mapping_off_landmarks() {
    let warp = LandmarkTransform::solve(pyramid(), &bent_pyramid()).unwrap();

    // Re-solve from the derived landmark pairs, the way a load does.
    let derived: Vec<DVec3> = pyramid().iter().map(|p| warp.apply(*p)).collect();
    let resolved = LandmarkTransform::solve(pyramid(), &derived).unwrap();

    for probe in [
        DVec3::new(2.0, 3.0, 1.0),
        DVec3::new(7.5, 8.0, 4.0),
        DVec3::new(5.0, 5.0, 2.0),
    ] {
        assert!(resolved.apply(probe).distance(warp.apply(probe)) < 1e-6);
    }
}

#[test]
fn solve_rejects_mismatched_and_degenerate_input() {
    let err = LandmarkTransform::solve(pyramid(), &bent_pyramid()[..4]).unwrap_err();
    assert!(matches!(err, Error::DegenerateLandmarks(_)));

    let three = pyramid()[..3].to_vec();
    let three_targets = bent_pyramid()[..3].to_vec();
    let err = LandmarkTransform::solve(three, &three_targets).unwrap_err();
    assert!(matches!(err, Error::DegenerateLandmarks(_)));

    // All landmarks on one plane leave the vertical behavior unconstrained.
    let coplanar: Vec<DVec3> = (0..6)
        .map(|i| DVec3::new(f64::from(i), f64::from(i % 2), 0.0))
        .collect();
    let coplanar_targets = coplanar.clone();
    assert!(LandmarkTransform::solve(coplanar, &coplanar_targets).is_err());
}

#[test]
fn iterative_inverse_recovers_preimages_of_a_warp() {
    let warp = LandmarkTransform::solve(pyramid(), &bent_pyramid()).unwrap();
    let invertible = IterativeInverseTransform::new(Box::new(warp.clone())).with_tolerance(1e-10);

    for probe in [DVec3::new(3.0, 2.0, 1.0), DVec3::new(6.0, 7.0, 3.0)] {
        let image = warp.apply(probe);
        let recovered = invertible.invert_point(image, image);
        assert!(recovered.distance(probe) < 1e-7);
    }
}

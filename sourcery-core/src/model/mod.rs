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

//! The domain model persisted by this crate: sources, transforms and the
//! source-and-converter composite.

pub mod converter;
pub mod source;
pub mod transform;

pub use converter::{DisplayConverter, DisplayRange, SourceAndConverter};
pub use source::{
    AffineSource, RawSource, ResampleOptions, ResampledSource, Source, VoxelGrid, WarpedSource,
};
pub use transform::{
    AffineTransform, InvertibleTransformSequence, IterativeInverseTransform, LandmarkTransform,
    Transform, TransformSequence,
};

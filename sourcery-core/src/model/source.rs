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

//! Visual data sources: the abstract [`Source`] capability and the built-in
//! concrete families.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::transform::{AffineTransform, Transform};

/// The discrete sampling grid of a source: integer extent in voxels, the
/// physical size of one voxel, and the calibration transform mapping voxel
/// coordinates into the global space.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    pub extent: [i64; 3],
    pub voxel_size: [f64; 3],
    pub calibration: AffineTransform,
}

impl VoxelGrid {
    pub fn new(extent: [i64; 3], voxel_size: [f64; 3], calibration: AffineTransform) -> Self {
        Self {
            extent,
            voxel_size,
            calibration,
        }
    }

    /// An isotropic unit grid, mostly useful for tests and placeholders.
    pub fn unit(extent: [i64; 3]) -> Self {
        Self::new(extent, [1.0, 1.0, 1.0], AffineTransform::identity())
    }
}

/// An accessible image/volume data source, possibly wrapping another source.
///
/// Sources are shared as `Arc<dyn Source>`; within one persistence session a
/// node's identity is the `Arc` pointer, which is how the reference table
/// recognizes the same object arriving twice.
pub trait Source: fmt::Debug + 'static {
    /// Display name.
    fn name(&self) -> &str;

    /// The sampling grid in which this source serves data. Wrapping sources
    /// delegate; a resampled source answers with its model's grid.
    fn grid(&self) -> &VoxelGrid;

    /// The wrapped inner source, for source families that decorate another.
    fn wrapped(&self) -> Option<&Arc<dyn Source>> {
        None
    }

    /// Downcasting seam for adapters.
    fn as_any(&self) -> &dyn Any;
}

/// Leaf source: actual voxel data at a named location.
///
/// The location string is the durable identity of the underlying data; the
/// resident-source index uses it to recognize an already-loaded source when
/// the same document (or another document referencing the same data) is
/// loaded again.
#[derive(Debug, Clone)]
pub struct RawSource {
    name: String,
    location: String,
    grid: VoxelGrid,
}

impl RawSource {
    pub fn new(name: impl Into<String>, location: impl Into<String>, grid: VoxelGrid) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            grid,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl Source for RawSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A source viewed through an explicit affine transform.
#[derive(Debug, Clone)]
pub struct AffineSource {
    transform: AffineTransform,
    wrapped: Arc<dyn Source>,
}

impl AffineSource {
    pub fn new(transform: AffineTransform, wrapped: Arc<dyn Source>) -> Self {
        Self { transform, wrapped }
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    pub fn wrapped_source(&self) -> &Arc<dyn Source> {
        &self.wrapped
    }
}

impl Source for AffineSource {
    fn name(&self) -> &str {
        self.wrapped.name()
    }

    fn grid(&self) -> &VoxelGrid {
        self.wrapped.grid()
    }

    fn wrapped(&self) -> Option<&Arc<dyn Source>> {
        Some(&self.wrapped)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A source viewed through an arbitrary (possibly non-affine) transform.
#[derive(Debug, Clone)]
pub struct WarpedSource {
    transform: Box<dyn Transform>,
    wrapped: Arc<dyn Source>,
}

impl WarpedSource {
    pub fn new(transform: Box<dyn Transform>, wrapped: Arc<dyn Source>) -> Self {
        Self { transform, wrapped }
    }

    pub fn transform(&self) -> &dyn Transform {
        self.transform.as_ref()
    }

    pub fn wrapped_source(&self) -> &Arc<dyn Source> {
        &self.wrapped
    }
}

impl Source for WarpedSource {
    fn name(&self) -> &str {
        self.wrapped.name()
    }

    fn grid(&self) -> &VoxelGrid {
        self.wrapped.grid()
    }

    fn wrapped(&self) -> Option<&Arc<dyn Source>> {
        Some(&self.wrapped)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Options controlling how a resampled source pulls data from its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResampleOptions {
    pub interpolate: bool,
    pub cache: bool,
    pub reuse_mip_levels: bool,
    pub default_mip_level: i64,
}

impl Default for ResampleOptions {
    fn default() -> Self {
        Self {
            interpolate: true,
            cache: false,
            reuse_mip_levels: true,
            default_mip_level: 0,
        }
    }
}

/// A source resampled onto the grid of a second "model" source.
///
/// Holds two shared references: the origin whose data is resampled, and the
/// model whose grid defines the output sampling. Its own grid is the
/// model's.
#[derive(Debug, Clone)]
pub struct ResampledSource {
    name: String,
    origin: Arc<dyn Source>,
    model: Arc<dyn Source>,
    options: ResampleOptions,
}

impl ResampledSource {
    pub fn new(
        name: impl Into<String>,
        origin: Arc<dyn Source>,
        model: Arc<dyn Source>,
        options: ResampleOptions,
    ) -> Self {
        Self {
            name: name.into(),
            origin,
            model,
            options,
        }
    }

    pub fn origin(&self) -> &Arc<dyn Source> {
        &self.origin
    }

    pub fn model(&self) -> &Arc<dyn Source> {
        &self.model
    }

    pub fn options(&self) -> &ResampleOptions {
        &self.options
    }
}

impl Source for ResampledSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn grid(&self) -> &VoxelGrid {
        self.model.grid()
    }

    fn wrapped(&self) -> Option<&Arc<dyn Source>> {
        Some(&self.origin)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

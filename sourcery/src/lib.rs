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

//! # Sourcery
//!
//! Sourcery saves and restores directed acyclic graphs of visual sources
//! and their coordinate transforms as JSON documents. It serializes an
//! open, plugin-extensible set of concrete types behind two abstract
//! capabilities, preserves cross-references between nodes through stable
//! integer identifiers, and reconstructs the graph on load even when a
//! reference appears before the referenced node's document.
//!
//! ## Key Features
//!
//! - **Open type set**: concrete source and transform types dispatch
//!   through a registry of per-type adapters; plugins contribute more
//! - **Flat documents, real graphs**: shared sources serialize once and are
//!   referenced by id, forward or backward
//! - **Fail-soft batches**: an unknown type or dangling reference costs one
//!   node, not the whole document
//! - **Idempotent loads**: data already resident in the process is reused
//!   instead of re-materialized
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use sourcery::{AdapterRegistry, GraphCodec, SourceIndex};
//! use sourcery::model::{
//!     AffineSource, AffineTransform, RawSource, Source, SourceAndConverter, VoxelGrid,
//! };
//!
//! # fn main() -> Result<(), sourcery::Error> {
//! let registry = AdapterRegistry::builtin();
//! let codec = GraphCodec::new(&registry);
//!
//! let raw: Arc<dyn Source> = Arc::new(RawSource::new(
//!     "em",
//!     "file:///data/em.zarr",
//!     VoxelGrid::unit([512, 512, 64]),
//! ));
//! let transformed: Arc<dyn Source> =
//!     Arc::new(AffineSource::new(AffineTransform::identity(), Arc::clone(&raw)));
//!
//! let item = SourceAndConverter::new(transformed).with_metadata("channel", "0");
//! let document = codec.save(&[item])?;
//! // The wrapped leaf serialized once, referenced by id.
//! assert_eq!(document.sources.len(), 2);
//!
//! let mut index = SourceIndex::new();
//! let restored = codec.load_all(&document, &mut index)?;
//! assert_eq!(restored.len(), 1);
//! assert_eq!(restored[0].as_ref().unwrap().source.name(), "em");
//! # Ok(())
//! # }
//! ```
//!
//! The document itself is ordinary JSON: serialize the returned
//! [`GraphDocument`] with `serde_json` to write it to disk.

pub use sourcery_core::adapter;
pub use sourcery_core::codec::GraphCodec;
pub use sourcery_core::dispatch;
pub use sourcery_core::document::{ConverterEnvelope, GraphDocument, NodeId};
pub use sourcery_core::error::Error;
pub use sourcery_core::index::SourceIndex;
pub use sourcery_core::model;
pub use sourcery_core::registry::AdapterRegistry;
pub use sourcery_core::resolver;

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

//! # Sourcery Core
//!
//! Core implementation of the sourcery persistence engine: saving and
//! restoring directed acyclic graphs of visual sources and their coordinate
//! transforms to and from JSON documents.
//!
//! ## Architecture
//!
//! - **`model`**: the domain being persisted — sources, transforms, and the
//!   source-and-converter composite
//! - **`adapter`**: per-concrete-type flatten/unflatten implementations and
//!   the plugin surface for contributing more
//! - **`registry`**: the process-wide discriminant/type → adapter table
//! - **`resolver`**: session state — the reference table and the read/write
//!   contexts threaded through recursive calls
//! - **`dispatch`**: polymorphic dispatch between abstract node values and
//!   concrete adapters, including the compact bypass shapes
//! - **`codec`**: the top-level save/load orchestrator
//! - **`document`**: node identifiers and document shapes
//! - **`index`**: the process-visible resident-source table
//! - **`error`**: error handling
//!
//! ## Key Concepts
//!
//! Sources are shared (`Arc<dyn Source>`) and cross-reference each other by
//! stable integer identifiers rather than structural nesting, so a document
//! set is a flat list and references may point forward. Transforms are
//! owned values and embed structurally. An open set of concrete types hides
//! behind the two abstract capabilities; plugins extend the set by
//! registering adapters.
//!
//! Failures of individual nodes — unknown concrete types, unknown
//! discriminants, dangling references — are localized, logged, and
//! represented as absence, so batch operations degrade gracefully. A true
//! reference cycle is the exception: it fails its whole resolution chain
//! loudly.
//!
//! This crate is typically used through the higher-level `sourcery` crate,
//! which re-exports the public API and carries the end-to-end examples.

pub mod adapter;
pub mod codec;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod index;
pub mod model;
pub mod registry;
pub mod resolver;

pub use codec::GraphCodec;
pub use document::{ConverterEnvelope, GraphDocument, NodeId};
pub use error::Error;
pub use index::SourceIndex;
pub use registry::AdapterRegistry;

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

//! Document shapes: node identifiers, the per-source envelope and the
//! top-level graph document.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which every node document carries its concrete-type tag.
pub const CLASS_KEY: &str = "class";
/// Key under which every source node document carries its identifier.
pub const ID_KEY: &str = "id";
/// Key under which a discriminant-tagged transform document carries its
/// type-specific fields.
pub const PAYLOAD_KEY: &str = "payload";

/// A stable non-negative identifier for a source node within one document
/// set. Ids are assigned during a save session and persisted verbatim.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-root display and provenance record stored alongside the source node
/// documents.
///
/// `converter_class` is informational only: it names the converter the
/// producing application used, and is never dispatched on. The display range
/// is present only when the converter was color-capable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterEnvelope {
    pub source_id: NodeId,
    pub source_name: String,
    pub source_class: String,
    pub converter_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter_setup_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter_setup_max: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub string_metadata: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatile_source_id: Option<NodeId>,
}

/// A complete serialized working set: a flat, discovery-ordered list of
/// source node documents, the per-root converter envelopes, and the ids of
/// the requested roots in their original order.
///
/// A node document is not necessarily contiguous with the documents that
/// reference it; references are resolved by id, forward or backward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub sources: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub converters: Vec<ConverterEnvelope>,
    pub roots: Vec<NodeId>,
}

impl GraphDocument {
    /// Looks up the envelope recorded for a root id, if any.
    pub fn envelope(&self, id: NodeId) -> Option<&ConverterEnvelope> {
        self.converters.iter().find(|c| c.source_id == id)
    }
}

/// Reads the mandatory id field of a source node document.
pub(crate) fn document_id(doc: &Map<String, Value>) -> Option<NodeId> {
    doc.get(ID_KEY)
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .map(NodeId::new)
}

/// Reads the discriminant of a tagged node document.
pub(crate) fn document_class(doc: &Map<String, Value>) -> Option<&str> {
    doc.get(CLASS_KEY).and_then(Value::as_str)
}

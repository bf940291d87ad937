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

//! Session contexts threaded through the recursive flatten/unflatten calls.
//!
//! A context owns the session's [`ReferenceTable`] and carries the shared
//! [`AdapterRegistry`]; nothing here is reachable from outside the session
//! that created it.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::dispatch;
use crate::document::NodeId;
use crate::error::Error;
use crate::index::SourceIndex;
use crate::model::source::Source;
use crate::registry::AdapterRegistry;
use crate::resolver::ref_table::ReferenceTable;

/// Write-side session state: id assignment plus the discovery-ordered
/// accumulation of emitted node documents.
pub struct WriteContext<'se> {
    registry: &'se AdapterRegistry,
    pub refs: ReferenceTable,
    nodes: Vec<Value>,
    emitted: HashSet<NodeId>,
}

impl<'se> WriteContext<'se> {
    pub fn new(registry: &'se AdapterRegistry) -> Self {
        Self {
            registry,
            refs: ReferenceTable::new(),
            nodes: Vec::new(),
            emitted: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &'se AdapterRegistry {
        self.registry
    }

    /// Replaces a nested source with its reference id.
    ///
    /// The first visit of an object assigns the next id and recursively
    /// serializes the object, appending its document to the output; later
    /// visits return the same id without re-serializing. A source whose
    /// concrete type has no adapter still receives an id, but no document is
    /// emitted for it — the absence is logged at the point of failure and
    /// surfaces as a dangling id to downstream consumers, per the fail-soft
    /// policy.
    pub fn to_id(&mut self, source: &Arc<dyn Source>) -> Result<NodeId, Error> {
        if let Some(id) = self.refs.id_of(source) {
            return Ok(id);
        }
        let id = self.refs.assign_id(source);
        if let Some(document) = dispatch::write_source(source.as_ref(), id, self)? {
            self.emitted.insert(id);
            self.nodes.push(document);
        }
        Ok(id)
    }

    /// Whether a document was actually emitted for `id`.
    pub fn has_document(&self, id: NodeId) -> bool {
        self.emitted.contains(&id)
    }

    /// The accumulated node documents, in discovery order.
    pub fn into_nodes(self) -> Vec<Value> {
        self.nodes
    }
}

/// Read-side session state: pending-document resolution with cycle
/// detection, plus access to the process-visible resident-source index.
pub struct ReadContext<'de> {
    registry: &'de AdapterRegistry,
    pub refs: ReferenceTable,
    index: &'de mut SourceIndex,
}

impl<'de> ReadContext<'de> {
    pub fn new(registry: &'de AdapterRegistry, index: &'de mut SourceIndex) -> Self {
        Self {
            registry,
            refs: ReferenceTable::new(),
            index,
        }
    }

    pub fn registry(&self) -> &'de AdapterRegistry {
        self.registry
    }

    /// An already-resident source for the given data location, if the
    /// process has one.
    pub fn resident_by_location(&self, location: &str) -> Option<Arc<dyn Source>> {
        self.index.by_location(location)
    }

    /// Records a freshly materialized leaf under its data location, so
    /// later loads of the same data reuse this instance.
    pub fn bind_location(&mut self, location: &str, source: &Arc<dyn Source>) {
        self.index.bind_location(location, source);
    }

    /// Resolves a reference id to a live source.
    ///
    /// Resolution order: this session's already-materialized nodes, then the
    /// session's pending documents (materialized on demand, depth-first),
    /// then sources already resident in the process index (cross-file
    /// references). An id found nowhere is a dangling reference: logged and
    /// resolved to the absent value. Re-entering an id that is currently
    /// materializing is a cycle and fails the whole resolution chain.
    pub fn from_id(&mut self, id: NodeId) -> Result<Option<Arc<dyn Source>>, Error> {
        if let Some(source) = self.refs.resolved(id) {
            return Ok(Some(source));
        }
        if self.refs.is_in_progress(id) {
            return Err(Error::cycle_detected(format!(
                "reference cycle while materializing node {id}"
            )));
        }
        let Some(document) = self.refs.take_pending(id) else {
            if let Some(resident) = self.index.by_id(id) {
                self.refs.finish(id, Arc::clone(&resident));
                return Ok(Some(resident));
            }
            tracing::error!(node = %id, "dangling reference: no document and no resident source");
            return Ok(None);
        };

        self.refs.begin(id)?;
        let result = dispatch::read_source(&document, self);
        match &result {
            Ok(Some(source)) => {
                self.refs.finish(id, Arc::clone(source));
                self.index.bind(id, source);
            }
            Ok(None) | Err(_) => self.refs.abandon(id),
        }
        result
    }
}

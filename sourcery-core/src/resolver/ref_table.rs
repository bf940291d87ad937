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

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::document::NodeId;
use crate::error::Error;
use crate::model::source::Source;

/// Session-scoped bidirectional map between node identifiers and in-memory
/// sources, plus the side table of not-yet-materialized raw documents.
///
/// One table is created at the start of each save or load call and discarded
/// at the end; it never outlives the session, and two concurrent sessions
/// never share one.
///
/// During a save, [`assign_id`](ReferenceTable::assign_id) is keyed on `Arc`
/// pointer identity: the same object reference always yields the same id,
/// two distinct objects always yield distinct ids. The table retains every
/// `Arc` it has assigned an id to, so a pointer cannot be freed and reused
/// for a different object mid-session.
///
/// During a load, the pending-document table is populated in one pass before
/// any materialization begins, which is what makes forward references
/// resolvable. Materialization of one id is bracketed by
/// [`begin`](ReferenceTable::begin) / [`finish`](ReferenceTable::finish);
/// re-entering `begin` for an id still in progress is a true reference cycle
/// and fails loudly instead of recursing forever.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use sourcery_core::model::{RawSource, Source, VoxelGrid};
/// use sourcery_core::resolver::ReferenceTable;
///
/// let mut refs = ReferenceTable::new();
/// let source: Arc<dyn Source> =
///     Arc::new(RawSource::new("em", "file:///data/em.zarr", VoxelGrid::unit([64, 64, 64])));
///
/// let id = refs.assign_id(&source);
/// assert_eq!(refs.assign_id(&source), id);
/// ```
#[derive(Default)]
pub struct ReferenceTable {
    by_id: HashMap<NodeId, Arc<dyn Source>>,
    by_ptr: HashMap<usize, NodeId>,
    pending: HashMap<NodeId, Map<String, Value>>,
    in_progress: HashSet<NodeId>,
    next_id: u32,
}

fn ptr_key(source: &Arc<dyn Source>) -> usize {
    Arc::as_ptr(source) as *const () as usize
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `source`, allocating the next unused one on first
    /// encounter. Idempotent per object reference.
    pub fn assign_id(&mut self, source: &Arc<dyn Source>) -> NodeId {
        let key = ptr_key(source);
        if let Some(&id) = self.by_ptr.get(&key) {
            return id;
        }
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.by_ptr.insert(key, id);
        self.by_id.insert(id, Arc::clone(source));
        id
    }

    /// Returns the id previously assigned to `source`, if any.
    pub fn id_of(&self, source: &Arc<dyn Source>) -> Option<NodeId> {
        self.by_ptr.get(&ptr_key(source)).copied()
    }

    /// Stores a raw node document for later materialization.
    pub fn record_pending(&mut self, id: NodeId, document: Map<String, Value>) {
        self.pending.insert(id, document);
    }

    /// Removes and returns the raw document recorded for `id`.
    pub fn take_pending(&mut self, id: NodeId) -> Option<Map<String, Value>> {
        self.pending.remove(&id)
    }

    /// The already-materialized source for `id`, if any.
    pub fn resolved(&self, id: NodeId) -> Option<Arc<dyn Source>> {
        self.by_id.get(&id).cloned()
    }

    /// Whether `id` is currently being materialized.
    ///
    /// A pending document is taken out of the table when its
    /// materialization starts, so a re-entrant request for the same id
    /// must consult this mark before concluding the reference dangles.
    pub fn is_in_progress(&self, id: NodeId) -> bool {
        self.in_progress.contains(&id)
    }

    /// Marks `id` as being materialized.
    ///
    /// Fails with [`Error::CycleDetected`] if `id` is already in progress:
    /// the domain is a DAG by construction, so re-entry means a producer bug
    /// or a malformed document.
    pub fn begin(&mut self, id: NodeId) -> Result<(), Error> {
        if !self.in_progress.insert(id) {
            return Err(Error::cycle_detected(format!(
                "reference cycle while materializing node {id}"
            )));
        }
        Ok(())
    }

    /// Registers the materialized source for `id` and clears the in-progress
    /// mark, so re-entrant requests for the same id converge on this
    /// instance.
    pub fn finish(&mut self, id: NodeId, source: Arc<dyn Source>) {
        self.in_progress.remove(&id);
        self.by_ptr.insert(ptr_key(&source), id);
        self.by_id.insert(id, source);
    }

    /// Clears the in-progress mark without registering anything; used when a
    /// node resolves to the absent value.
    pub fn abandon(&mut self, id: NodeId) {
        self.in_progress.remove(&id);
    }
}

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

use std::collections::HashMap;
use std::sync::Arc;

use crate::document::NodeId;
use crate::model::source::Source;

/// Process-visible table of resident sources, outliving individual load
/// sessions.
///
/// Serves two purposes: a document loaded later can reference a node from an
/// earlier load by id, and a leaf whose data location is already resident is
/// reused instead of re-materialized (idempotent load — keyed on
/// data-location equality, not id equality).
///
/// Unlike the session [`ReferenceTable`](crate::resolver::ReferenceTable),
/// this index is owned by the application and passed explicitly into each
/// load call; there is no process-wide singleton.
#[derive(Default)]
pub struct SourceIndex {
    by_id: HashMap<NodeId, Arc<dyn Source>>,
    by_location: HashMap<String, Arc<dyn Source>>,
}

impl SourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(&self, id: NodeId) -> Option<Arc<dyn Source>> {
        self.by_id.get(&id).cloned()
    }

    pub fn by_location(&self, location: &str) -> Option<Arc<dyn Source>> {
        self.by_location.get(location).cloned()
    }

    /// Re-binds `id` to a materialized source. A later binding for the same
    /// id replaces the earlier one; ids are only unique per document set.
    pub fn bind(&mut self, id: NodeId, source: &Arc<dyn Source>) {
        self.by_id.insert(id, Arc::clone(source));
    }

    pub fn bind_location(&mut self, location: &str, source: &Arc<dyn Source>) {
        self.by_location
            .insert(location.to_owned(), Arc::clone(source));
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_location.is_empty()
    }
}

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

//! The top-level orchestrator: one call saves a working set into a
//! [`GraphDocument`], one call resolves a document back into live objects.

use crate::document::{document_id, ConverterEnvelope, GraphDocument, NodeId};
use crate::error::Error;
use crate::index::SourceIndex;
use crate::model::converter::{DisplayConverter, DisplayRange, SourceAndConverter};
use crate::registry::AdapterRegistry;
use crate::resolver::context::{ReadContext, WriteContext};

/// Saves and restores source-and-converter working sets.
///
/// A codec borrows the shared, read-only [`AdapterRegistry`]; each `save` or
/// `load` call is one single-threaded session with its own reference table.
/// Failures of individual nodes are localized: they are logged and
/// represented as absence, never thrown across the save/load boundary, so a
/// batch degrades gracefully instead of losing everything to one bad node.
pub struct GraphCodec<'a> {
    registry: &'a AdapterRegistry,
}

impl<'a> GraphCodec<'a> {
    pub fn new(registry: &'a AdapterRegistry) -> Self {
        Self { registry }
    }

    /// Serializes the working set, in stable input order.
    ///
    /// Every root is assigned an id and flattened; nested sources discovered
    /// along the way append to the output in discovery order, each document
    /// tagged with its own id. A root whose concrete type has no adapter is
    /// logged and skipped (its id does not appear in `roots`); the rest of
    /// the batch still serializes.
    pub fn save(&self, items: &[SourceAndConverter]) -> Result<GraphDocument, Error> {
        let mut cx = WriteContext::new(self.registry);
        let mut converters = Vec::with_capacity(items.len());
        let mut roots = Vec::with_capacity(items.len());

        for item in items {
            let id = cx.to_id(&item.source)?;
            if !cx.has_document(id) {
                tracing::error!(
                    name = item.source.name(),
                    node = %id,
                    "root source could not be serialized; reported absent"
                );
                continue;
            }
            let volatile_source_id = match &item.volatile {
                Some(volatile) => Some(cx.to_id(volatile)?),
                None => None,
            };
            let source_class = self
                .registry
                .source_by_type(item.source.as_any().type_id())
                .map(|adapter| adapter.discriminant().to_owned())
                .unwrap_or_default();

            converters.push(ConverterEnvelope {
                source_id: id,
                source_name: item.source.name().to_owned(),
                source_class,
                converter_class: item.converter.class_name.clone(),
                color: item.converter.color,
                converter_setup_min: item.converter.range.map(|r| r.min),
                converter_setup_max: item.converter.range.map(|r| r.max),
                string_metadata: item.metadata.clone(),
                volatile_source_id,
            });
            roots.push(id);
        }

        Ok(GraphDocument {
            sources: cx.into_nodes(),
            converters,
            roots,
        })
    }

    /// Resolves the requested roots out of a document.
    ///
    /// The pending table is populated for every node document before any
    /// materialization starts, so a reference is resolvable wherever its
    /// document appears in the list. Each root resolves independently:
    /// a failed chain (cycle, broken payload) is logged and yields `None`
    /// without disturbing the other roots. Materialized nodes are re-bound
    /// in `index`, making later loads idempotent for already-resident data.
    pub fn load(
        &self,
        document: &GraphDocument,
        requested: &[NodeId],
        index: &mut SourceIndex,
    ) -> Result<Vec<Option<SourceAndConverter>>, Error> {
        let mut cx = ReadContext::new(self.registry, index);
        for node in &document.sources {
            match node.as_object() {
                Some(doc) => match document_id(doc) {
                    Some(id) => cx.refs.record_pending(id, doc.clone()),
                    None => tracing::warn!("skipping node document without an id"),
                },
                None => tracing::warn!("skipping non-object node document"),
            }
        }

        let mut out = Vec::with_capacity(requested.len());
        for &id in requested {
            let source = match cx.from_id(id) {
                Ok(source) => source,
                Err(err) => {
                    tracing::error!(node = %id, error = %err, "failed to materialize root");
                    None
                }
            };
            let Some(source) = source else {
                out.push(None);
                continue;
            };

            let envelope = document.envelope(id);
            let volatile = match envelope.and_then(|e| e.volatile_source_id) {
                Some(volatile_id) => match cx.from_id(volatile_id) {
                    Ok(volatile) => volatile,
                    Err(err) => {
                        tracing::error!(
                            node = %volatile_id,
                            error = %err,
                            "failed to materialize volatile companion"
                        );
                        None
                    }
                },
                None => None,
            };

            let mut item = SourceAndConverter::new(source);
            item.volatile = volatile;
            if let Some(envelope) = envelope {
                let mut converter = DisplayConverter::new(envelope.converter_class.clone());
                converter.color = envelope.color;
                if let (Some(min), Some(max)) =
                    (envelope.converter_setup_min, envelope.converter_setup_max)
                {
                    converter.range = Some(DisplayRange::new(min, max));
                }
                item.converter = converter;
                item.metadata = envelope.string_metadata.clone();
            }
            out.push(Some(item));
        }
        Ok(out)
    }

    /// [`load`](GraphCodec::load) over the document's own root list.
    pub fn load_all(
        &self,
        document: &GraphDocument,
        index: &mut SourceIndex,
    ) -> Result<Vec<Option<SourceAndConverter>>, Error> {
        self.load(document, &document.roots, index)
    }
}

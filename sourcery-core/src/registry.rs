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

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::{AdapterPlugin, BuiltinAdapters, SourceAdapter, TransformAdapter};
use crate::error::Error;

/// The process-wide table of per-concrete-type adapters, grouped by the
/// abstract base type they adapt for.
///
/// Each group is keyed twice: by discriminant string for the read side and
/// by the concrete `TypeId` for the write side, so dispatch in either
/// direction is a single table lookup — never a chain of type tests.
///
/// The registry is built once at startup (from
/// [`AdapterRegistry::builtin`] and any [`AdapterPlugin`]s) and is read-only
/// afterwards; it is safe to share across concurrent sessions without
/// locking. Two adapters claiming the same (base type, discriminant) or
/// (base type, concrete type) pair is a configuration error reported at
/// registration time, not at use time, and the registry never silently
/// picks a winner.
///
/// # Examples
///
/// ```rust
/// use sourcery_core::registry::AdapterRegistry;
///
/// let registry = AdapterRegistry::builtin();
/// assert!(registry.source_by_name("raw").is_some());
/// assert!(registry.transform_by_name("affine").is_some());
/// assert!(registry.source_by_name("no-such-thing").is_none());
/// ```
#[derive(Default)]
pub struct AdapterRegistry {
    source_by_name: HashMap<&'static str, Arc<dyn SourceAdapter>>,
    source_by_type: HashMap<TypeId, Arc<dyn SourceAdapter>>,
    transform_by_name: HashMap<&'static str, Arc<dyn TransformAdapter>>,
    transform_by_type: HashMap<TypeId, Arc<dyn TransformAdapter>>,
    bypass_transforms: Vec<Arc<dyn TransformAdapter>>,
}

impl AdapterRegistry {
    /// An empty registry; every adapter must be contributed explicitly.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in source and transform families.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register_plugin(&BuiltinAdapters)
            .expect("built-in adapter set is internally consistent");
        registry
    }

    /// Registers every adapter contributed by `plugin`.
    ///
    /// Fails on the first duplicate; previously registered adapters from the
    /// same plugin stay registered, which is acceptable because a duplicate
    /// is fatal at startup anyway.
    pub fn register_plugin(&mut self, plugin: &dyn AdapterPlugin) -> Result<(), Error> {
        for adapter in plugin.source_adapters() {
            self.register_source_adapter(adapter)?;
        }
        for adapter in plugin.transform_adapters() {
            self.register_transform_adapter(adapter)?;
        }
        Ok(())
    }

    pub fn register_source_adapter(
        &mut self,
        adapter: Arc<dyn SourceAdapter>,
    ) -> Result<(), Error> {
        let name = adapter.discriminant();
        if self.source_by_name.contains_key(name) {
            return Err(Error::duplicate_adapter("source", name));
        }
        if self.source_by_type.contains_key(&adapter.concrete_type()) {
            return Err(Error::duplicate_adapter(
                "source",
                format!("concrete type behind `{name}`"),
            ));
        }
        self.source_by_type
            .insert(adapter.concrete_type(), Arc::clone(&adapter));
        self.source_by_name.insert(name, adapter);
        Ok(())
    }

    pub fn register_transform_adapter(
        &mut self,
        adapter: Arc<dyn TransformAdapter>,
    ) -> Result<(), Error> {
        let name = adapter.discriminant();
        if self.transform_by_name.contains_key(name) {
            return Err(Error::duplicate_adapter("transform", name));
        }
        if self.transform_by_type.contains_key(&adapter.concrete_type()) {
            return Err(Error::duplicate_adapter(
                "transform",
                format!("concrete type behind `{name}`"),
            ));
        }
        if adapter.bypass() {
            self.bypass_transforms.push(Arc::clone(&adapter));
        }
        self.transform_by_type
            .insert(adapter.concrete_type(), Arc::clone(&adapter));
        self.transform_by_name.insert(name, adapter);
        Ok(())
    }

    pub fn source_by_name(&self, discriminant: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.source_by_name.get(discriminant).cloned()
    }

    pub fn source_by_type(&self, concrete: TypeId) -> Option<Arc<dyn SourceAdapter>> {
        self.source_by_type.get(&concrete).cloned()
    }

    pub fn transform_by_name(&self, discriminant: &str) -> Option<Arc<dyn TransformAdapter>> {
        self.transform_by_name.get(discriminant).cloned()
    }

    pub fn transform_by_type(&self, concrete: TypeId) -> Option<Arc<dyn TransformAdapter>> {
        self.transform_by_type.get(&concrete).cloned()
    }

    /// Bypass adapters, consulted in registration order for untagged
    /// transform documents.
    pub fn bypass_transforms(&self) -> &[Arc<dyn TransformAdapter>] {
        &self.bypass_transforms
    }
}

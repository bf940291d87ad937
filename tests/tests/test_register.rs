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
use std::sync::Arc;

use serde_json::{Map, Value};
use sourcery_core::adapter::{AdapterPlugin, BuiltinAdapters, SourceAdapter};
use sourcery_core::error::Error;
use sourcery_core::model::{RawSource, Source};
use sourcery_core::registry::AdapterRegistry;
use sourcery_core::resolver::{ReadContext, WriteContext};

#[test]
fn builtin_registry_knows_every_family() {
    let registry = AdapterRegistry::builtin();

    for name in ["raw", "affine", "warped", "resampled"] {
        assert!(registry.source_by_name(name).is_some(), "missing {name}");
    }
    for name in [
        "affine",
        "transform_sequence",
        "invertible_sequence",
        "landmarks",
        "iterative_inverse",
    ] {
        assert!(registry.transform_by_name(name).is_some(), "missing {name}");
    }
    assert!(registry.source_by_name("unheard-of").is_none());
    assert!(registry.transform_by_name("unheard-of").is_none());
}

#[test]
fn duplicate_plugin_registration_is_a_configuration_error() {
    let mut registry = AdapterRegistry::builtin();
    let err = registry.register_plugin(&BuiltinAdapters).unwrap_err();
    assert!(matches!(err, Error::DuplicateAdapter { base: "source", .. }));
}

/// An adapter whose discriminant collides with the built-in raw source
/// adapter, but on a different concrete type.
struct ImposterAdapter;

impl SourceAdapter for ImposterAdapter {
    fn discriminant(&self) -> &'static str {
        "raw"
    }

    fn concrete_type(&self) -> TypeId {
        TypeId::of::<ImposterAdapter>()
    }

    fn flatten(
        &self,
        _source: &dyn Source,
        _cx: &mut WriteContext<'_>,
    ) -> Result<Option<Map<String, Value>>, Error> {
        Ok(None)
    }

    fn unflatten(
        &self,
        _document: &Map<String, Value>,
        _cx: &mut ReadContext<'_>,
    ) -> Result<Option<Arc<dyn Source>>, Error> {
        Ok(None)
    }
}

#[test]
fn duplicate_discriminant_is_rejected_and_named() {
    let mut registry = AdapterRegistry::builtin();
    let err = registry
        .register_source_adapter(Arc::new(ImposterAdapter))
        .unwrap_err();
    match err {
        Error::DuplicateAdapter { base, key } => {
            assert_eq!(base, "source");
            assert_eq!(key, "raw");
        }
        other => panic!("expected DuplicateAdapter, got {other:?}"),
    }
    // The original registration is untouched.
    let adapter = registry.source_by_name("raw").unwrap();
    assert_eq!(adapter.concrete_type(), TypeId::of::<RawSource>());
}

/// A plugin contributing nothing is legal and changes nothing.
struct EmptyPlugin;

impl AdapterPlugin for EmptyPlugin {}

#[test]
fn empty_plugin_is_a_no_op() {
    let mut registry = AdapterRegistry::empty();
    registry.register_plugin(&EmptyPlugin).unwrap();
    assert!(registry.source_by_name("raw").is_none());
}

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

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::source::Source;

/// Display contrast window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl DisplayRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// How a source's values become screen colors: a converter class name
/// (informational, never dispatched on), an optional packed RGBA color, and
/// an optional display range. The range is meaningful only for
/// color-capable converters.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConverter {
    pub class_name: String,
    pub color: Option<u32>,
    pub range: Option<DisplayRange>,
}

impl DisplayConverter {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            color: None,
            range: None,
        }
    }

    pub fn with_color(mut self, packed_rgba: u32) -> Self {
        self.color = Some(packed_rgba);
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some(DisplayRange::new(min, max));
        self
    }
}

impl Default for DisplayConverter {
    fn default() -> Self {
        Self::new("default")
    }
}

/// The unit the application works with: a non-volatile source, an optional
/// volatile companion (a lower-fidelity asynchronous view of the same data),
/// the display conversion, and a free-form metadata map.
///
/// When a volatile companion is present it is expected to mirror the nested
/// structure of the non-volatile source (both wrapped, both resampled, ...).
/// That is a producer obligation; persistence neither checks nor repairs it.
#[derive(Debug, Clone)]
pub struct SourceAndConverter {
    pub source: Arc<dyn Source>,
    pub volatile: Option<Arc<dyn Source>>,
    pub converter: DisplayConverter,
    pub metadata: BTreeMap<String, String>,
}

impl SourceAndConverter {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self {
            source,
            volatile: None,
            converter: DisplayConverter::default(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_volatile(mut self, volatile: Arc<dyn Source>) -> Self {
        self.volatile = Some(volatile);
        self
    }

    pub fn with_converter(mut self, converter: DisplayConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

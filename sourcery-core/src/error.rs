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

use std::borrow::Cow;

use thiserror::Error;

/// Error type for sourcery persistence operations.
///
/// Always use the static constructor functions rather than building variants
/// directly; they accept anything convertible into a `Cow<'static, str>` and
/// keep construction in one place.
///
/// Two variants carry a hard semantic contract:
///
/// - [`Error::DuplicateAdapter`] is a configuration error raised at registry
///   build time. It is never deferred to serialization time.
/// - [`Error::CycleDetected`] is fatal for the resolution chain that raised
///   it. Everything else in a batch is recoverable per node.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Two adapters claimed the same (base type, key) pair at registration.
    ///
    /// Do not construct directly; use [`Error::duplicate_adapter`].
    #[error("Duplicate {base} adapter registration for {key}")]
    DuplicateAdapter {
        base: &'static str,
        key: Cow<'static, str>,
    },

    /// No adapter is registered for a discriminant or concrete type.
    ///
    /// Do not construct directly; use [`Error::type_not_registered`].
    #[error("{0}")]
    TypeNotRegistered(Cow<'static, str>),

    /// A reference id has no corresponding document and no resident object.
    ///
    /// Do not construct directly; use [`Error::dangling_reference`].
    #[error("{0}")]
    DanglingReference(Cow<'static, str>),

    /// Materialization re-entered an id that is already being materialized.
    ///
    /// Do not construct directly; use [`Error::cycle_detected`].
    #[error("{0}")]
    CycleDetected(Cow<'static, str>),

    /// A document is structurally invalid for the adapter reading it.
    ///
    /// Do not construct directly; use [`Error::invalid_document`].
    #[error("{0}")]
    InvalidDocument(Cow<'static, str>),

    /// A landmark system could not be solved (degenerate configuration,
    /// mismatched list lengths, too few points).
    ///
    /// Do not construct directly; use [`Error::degenerate_landmarks`].
    #[error("{0}")]
    DegenerateLandmarks(Cow<'static, str>),

    /// A transform required to be invertible is not.
    ///
    /// Do not construct directly; use [`Error::not_invertible`].
    #[error("{0}")]
    NotInvertible(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::DuplicateAdapter`] for the given base type and
    /// conflicting key (discriminant or concrete type name).
    #[cold]
    #[track_caller]
    pub fn duplicate_adapter<S: Into<Cow<'static, str>>>(base: &'static str, key: S) -> Self {
        Error::DuplicateAdapter {
            base,
            key: key.into(),
        }
    }

    /// Creates a new [`Error::TypeNotRegistered`].
    #[cold]
    #[track_caller]
    pub fn type_not_registered<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::TypeNotRegistered(s.into())
    }

    /// Creates a new [`Error::DanglingReference`].
    #[cold]
    #[track_caller]
    pub fn dangling_reference<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::DanglingReference(s.into())
    }

    /// Creates a new [`Error::CycleDetected`].
    #[cold]
    #[track_caller]
    pub fn cycle_detected<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::CycleDetected(s.into())
    }

    /// Creates a new [`Error::InvalidDocument`].
    #[cold]
    #[track_caller]
    pub fn invalid_document<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::InvalidDocument(s.into())
    }

    /// Creates a new [`Error::DegenerateLandmarks`].
    #[cold]
    #[track_caller]
    pub fn degenerate_landmarks<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::DegenerateLandmarks(s.into())
    }

    /// Creates a new [`Error::NotInvertible`].
    #[cold]
    #[track_caller]
    pub fn not_invertible<S: Into<Cow<'static, str>>>(s: S) -> Self {
        Error::NotInvertible(s.into())
    }
}

/// Ensures a condition holds; otherwise returns the given [`enum@Error`].
///
/// # Examples
/// ```
/// use sourcery_core::ensure;
/// use sourcery_core::error::Error;
///
/// fn check(n: usize) -> Result<(), Error> {
///     ensure!(n > 0, Error::invalid_document("empty payload"));
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

/// Returns early with an [`Error::InvalidDocument`].
///
/// # Examples
/// ```
/// use sourcery_core::bail;
/// use sourcery_core::error::Error;
///
/// fn reject() -> Result<(), Error> {
///     bail!("unreadable payload");
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::invalid_document($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::invalid_document(format!($fmt, $($arg)*)))
    };
}

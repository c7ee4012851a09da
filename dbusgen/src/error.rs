// This file is part of dbusgen, a generator of typed D-Bus client proxies from interface specifications.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// dbusgen is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// dbusgen is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Error types shared by the signature parser, the proxy generator and generated proxies.
//!
//! Errors fall in two groups:
//! - **Generation time**: [`DbusgenError::MalformedSignature`], [`DbusgenError::DuplicateName`]
//!   and [`DbusgenError::SpecGeneration`]. Any of these aborts generation; no proxy type is
//!   returned.
//! - **Call time**: everything else. These are returned per call and leave the proxy usable.

use std::fmt;

/// Boxed error produced by a [`Connection`](crate::connection::Connection) implementation.
pub type BoxedConnectionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a signature was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureFault {
    /// A character that does not start any type.
    UnexpectedChar(char),
    /// End of input where a type was required.
    UnexpectedEnd,
    /// `)` or `}` without a matching opener.
    UnmatchedCloser(char),
    EmptyStruct,
    /// `{` anywhere other than directly after `a`.
    DictEntryOutsideArray,
    /// Dict-entry key is a container or a variant.
    DictKeyNotBasic,
    /// Dict-entry with other than two fields.
    DictEntryArity(usize),
    /// More than one complete type where exactly one was required.
    TrailingInput,
    TooLong(usize),
    /// Arrays or structs nested deeper than the protocol allows.
    TooDeep,
}

impl fmt::Display for SignatureFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureFault::UnexpectedChar(c) => write!(f, "unexpected character '{c}'"),
            SignatureFault::UnexpectedEnd => write!(f, "unexpected end of signature"),
            SignatureFault::UnmatchedCloser(c) => write!(f, "unmatched '{c}'"),
            SignatureFault::EmptyStruct => write!(f, "struct has no fields"),
            SignatureFault::DictEntryOutsideArray => {
                write!(f, "dict entry is only valid as an array element")
            }
            SignatureFault::DictKeyNotBasic => write!(f, "dict entry key must be a basic type"),
            SignatureFault::DictEntryArity(n) => {
                write!(f, "dict entry must have exactly 2 fields, found {n}")
            }
            SignatureFault::TrailingInput => write!(f, "expected a single complete type"),
            SignatureFault::TooLong(n) => write!(f, "signature is {n} bytes long"),
            SignatureFault::TooDeep => write!(f, "containers nested too deeply"),
        }
    }
}

/// A signature that violates the type grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{fault} at position {position} in {signature:?}")]
pub struct SignatureError {
    pub signature: String,
    pub position: usize,
    pub fault: SignatureFault,
}

/// What went wrong while generating a proxy type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationCause {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("invalid interface name: {0}")]
    InterfaceName(String),
    #[error("unknown access mode {0:?}, expected read, write or readwrite")]
    AccessMode(String),
}

/// Kind of interface member an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Method,
    Property,
    Argument,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameKind::Method => "method",
            NameKind::Property => "property",
            NameKind::Argument => "argument",
        })
    }
}

/// Property operation that was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyOp {
    Get,
    Set,
}

impl fmt::Display for PropertyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyOp::Get => "Get",
            PropertyOp::Set => "Set",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbusgenError {
    #[error("DbusgenError::MalformedSignature: {0}")]
    MalformedSignature(#[from] SignatureError),
    #[error("DbusgenError::DuplicateName: {kind} {name:?} is declared more than once in {scope}")]
    DuplicateName {
        kind: NameKind,
        name: String,
        scope: String,
    },
    #[error("DbusgenError::SpecGeneration: cannot generate {context}: {cause}")]
    SpecGeneration {
        context: String,
        #[source]
        cause: GenerationCause,
    },
    #[error("DbusgenError::InvocationArity: {method} expects {expected} arguments, got {actual}")]
    InvocationArity {
        method: String,
        expected: usize,
        actual: usize,
    },
    #[error(
        "DbusgenError::ArgumentNameMismatch: {method} takes ({}) but was given ({})",
        expected.join(", "),
        actual.join(", ")
    )]
    ArgumentNameMismatch {
        method: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error(
        "DbusgenError::ReplyArity: {method} declares {expected} results, reply carried {actual}"
    )]
    ReplyArity {
        method: String,
        expected: usize,
        actual: usize,
    },
    #[error("DbusgenError::PropertyAccess: property {property:?} does not support {op}")]
    PropertyAccess { property: String, op: PropertyOp },
    #[error("DbusgenError::UnknownMember: {interface} has no {kind} named {name:?}")]
    UnknownMember {
        interface: String,
        kind: NameKind,
        name: String,
    },
    #[error("DbusgenError::Invocation: {operation} failed: {source}")]
    Invocation {
        operation: String,
        #[source]
        source: BoxedConnectionError,
    },
}

impl DbusgenError {
    /// Returns `true` for errors that can only arise while generating a proxy type.
    pub fn is_generation_error(&self) -> bool {
        matches!(
            self,
            DbusgenError::MalformedSignature(..)
                | DbusgenError::DuplicateName { .. }
                | DbusgenError::SpecGeneration { .. }
        )
    }
}

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

//! Declarative description of a remote interface.
//!
//! These types are what an introspection document boils down to: an interface name, its
//! methods with named and typed arguments, and its properties with a type and access mode.
//! Signatures are kept as strings here; they are parsed and checked when a proxy type is
//! generated from the spec (see [`ProxyType::generate`](crate::proxy::ProxyType::generate)).

use crate::error::{DbusgenError, GenerationCause};
use std::str::FromStr;
use zbus::names::InterfaceName;

/// A named, typed method argument or result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: String,
    pub signature: String,
}

impl ArgSpec {
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    /// Input arguments in call order.
    pub inputs: Vec<ArgSpec>,
    /// Results in reply order.
    pub outputs: Vec<ArgSpec>,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, signature: impl Into<String>) -> Self {
        self.inputs.push(ArgSpec::new(name, signature));
        self
    }

    pub fn result(mut self, name: impl Into<String>, signature: impl Into<String>) -> Self {
        self.outputs.push(ArgSpec::new(name, signature));
        self
    }
}

/// How a property may be accessed, as given by the `access` attribute in introspection data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

impl FromStr for Access {
    type Err = DbusgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Access::Read),
            "write" => Ok(Access::Write),
            "readwrite" => Ok(Access::ReadWrite),
            _ => Err(DbusgenError::SpecGeneration {
                context: "property access".to_string(),
                cause: GenerationCause::AccessMode(s.to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: String,
    pub signature: String,
    pub access: Access,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, signature: impl Into<String>, access: Access) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            access,
        }
    }
}

/// Everything needed to generate a proxy type for one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub name: String,
    pub methods: Vec<MethodSpec>,
    pub properties: Vec<PropertySpec>,
}

impl InterfaceSpec {
    pub fn builder(name: impl Into<String>) -> InterfaceSpecBuilder {
        InterfaceSpecBuilder {
            spec: InterfaceSpec {
                name: name.into(),
                methods: Vec::new(),
                properties: Vec::new(),
            },
        }
    }
}

/// Collects methods and properties in declaration order.
///
/// The builder does no validation; duplicate names and bad signatures are reported when a
/// proxy type is generated, so the whole spec is rejected at once.
#[derive(Debug, Clone)]
pub struct InterfaceSpecBuilder {
    spec: InterfaceSpec,
}

impl InterfaceSpecBuilder {
    pub fn method(mut self, method: MethodSpec) -> Self {
        self.spec.methods.push(method);
        self
    }

    pub fn property(mut self, property: PropertySpec) -> Self {
        self.spec.properties.push(property);
        self
    }

    pub fn build(self) -> InterfaceSpec {
        self.spec
    }
}

/// Check an interface name against the bus naming rules.
///
/// # Returns: `Result<(), String>`
/// * `Ok(())` - the name is valid
/// * `Err(String)` - why zbus rejected the name
pub(crate) fn validate_interface_name(name: &str) -> Result<(), String> {
    InterfaceName::try_from(name)
        .map(drop)
        .map_err(|e| e.to_string())
}

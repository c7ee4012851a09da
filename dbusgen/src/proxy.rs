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

//! Proxy generation from an [`InterfaceSpec`].
//!
//! [`ProxyType::generate`] turns a spec into a reusable, immutable proxy type. Generation is
//! all-or-nothing: names are checked for uniqueness first, then every signature is parsed, and
//! the first problem aborts with an error. Nothing about a proxy type depends on a connection.
//!
//! [`ProxyType::bind`] pairs the proxy type with a borrowed [`Connection`] and yields a
//! [`Proxy`], which exposes:
//! - one [`BoundMethod`] per method, whose arity is the number of declared inputs
//! - one [`BoundProperty`] per property, with a getter only if the property is readable and a
//!   setter only if it is writable
//!
//! Generated methods check the number of arguments, not their values. The declared types only
//! steer encoding: a value declared `v` is wrapped in a variant if it is not one already.
//! Everything else is handed to the connection as-is, and encoding problems come back from it
//! as [`DbusgenError::Invocation`].
//!
//! # Reply shape
//!
//! | Declared outputs | [`Reply`]                 |
//! |------------------|---------------------------|
//! | 0                | [`Reply::Unit`]           |
//! | 1                | [`Reply::Single`]         |
//! | n > 1            | [`Reply::Tuple`] of len n |
//!
//! # Examples
//!
//! ```rust,no_run
//! # use dbusgen::prelude::*;
//! # use zbus::zvariant::{OwnedValue, Value};
//! # async fn example(connection: &ZbusConnection) -> Result<(), DbusgenError> {
//! let spec = InterfaceSpec::builder("org.example.Calc")
//!     .method(MethodSpec::new("Add").arg("a", "i").arg("b", "i").result("sum", "i"))
//!     .property(PropertySpec::new("Value", "i", Access::ReadWrite))
//!     .build();
//! let calc = ProxyType::generate(&spec)?;
//! let proxy = calc.bind(connection);
//!
//! let a = Value::from(2i32).try_to_owned().unwrap();
//! let b = Value::from(3i32).try_to_owned().unwrap();
//! let sum = proxy.call("Add", vec![a, b]).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::ProxyOptions;
use crate::connection::Connection;
use crate::error::{DbusgenError, GenerationCause, NameKind, PropertyOp};
use crate::signature::{TypeNode, parse, parse_single, to_signature};
use crate::spec::{Access, ArgSpec, InterfaceSpec, MethodSpec, PropertySpec, validate_interface_name};
use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use zbus::zvariant::{OwnedValue, Value};

/// The result of a generated method call, shaped by the method's declared outputs.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Unit,
    Single(OwnedValue),
    Tuple(Vec<OwnedValue>),
}

impl Reply {
    pub fn is_unit(&self) -> bool {
        matches!(self, Reply::Unit)
    }

    /// The value of a single-output reply.
    pub fn into_single(self) -> Option<OwnedValue> {
        match self {
            Reply::Single(value) => Some(value),
            _ => None,
        }
    }

    /// All values in declared order, whatever the shape.
    pub fn into_values(self) -> Vec<OwnedValue> {
        match self {
            Reply::Unit => Vec::new(),
            Reply::Single(value) => vec![value],
            Reply::Tuple(values) => values,
        }
    }
}

/// A method argument or result with its parsed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArg {
    name: String,
    ty: TypeNode,
}

impl GeneratedArg {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_node(&self) -> &TypeNode {
        &self.ty
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMethod {
    name: String,
    inputs: Vec<GeneratedArg>,
    outputs: Vec<GeneratedArg>,
}

impl GeneratedMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[GeneratedArg] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[GeneratedArg] {
        &self.outputs
    }

    /// Number of arguments a call must supply.
    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    /// Concatenated input signature, e.g. `"s(bq)bas"`.
    pub fn input_signature(&self) -> String {
        signature_of(&self.inputs)
    }

    pub fn output_signature(&self) -> String {
        signature_of(&self.outputs)
    }
}

fn signature_of(args: &[GeneratedArg]) -> String {
    let types: Vec<TypeNode> = args.iter().map(|a| a.ty.clone()).collect();
    to_signature(&types)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProperty {
    name: String,
    ty: TypeNode,
    access: Access,
}

impl GeneratedProperty {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_node(&self) -> &TypeNode {
        &self.ty
    }

    pub fn access(&self) -> Access {
        self.access
    }
}

/// A proxy type generated from one [`InterfaceSpec`]. Immutable and reusable; bind it to any
/// number of connections with [`ProxyType::bind`].
#[derive(Debug, Clone)]
pub struct ProxyType {
    interface: String,
    methods: Vec<GeneratedMethod>,
    method_index: HashMap<String, usize>,
    properties: Vec<GeneratedProperty>,
    property_index: HashMap<String, usize>,
}

/// Generate a proxy type from `spec`. Same as [`ProxyType::generate`].
pub fn build_proxy(spec: &InterfaceSpec) -> Result<ProxyType, DbusgenError> {
    ProxyType::generate(spec)
}

impl ProxyType {
    /// Validate `spec` and generate a proxy type for it.
    ///
    /// # Arguments
    ///
    /// * `spec` - the interface to generate for
    ///
    /// # Returns: `Result<ProxyType, DbusgenError>`
    /// * `Ok(ProxyType)` - every name is unique and every signature parsed
    /// * `Err(DbusgenError::SpecGeneration)` - the interface name is invalid, or a signature
    ///   failed to parse (the cause carries the
    ///   [`SignatureError`](crate::error::SignatureError))
    /// * `Err(DbusgenError::DuplicateName)` - two methods, two properties, or two arguments of
    ///   one method share a name
    pub fn generate(spec: &InterfaceSpec) -> Result<Self, DbusgenError> {
        trace!("Generating proxy type for {}", spec.name);
        validate_interface_name(&spec.name).map_err(|why| DbusgenError::SpecGeneration {
            context: format!("interface {:?}", spec.name),
            cause: GenerationCause::InterfaceName(why),
        })?;

        let method_index = index_names(
            spec.methods.iter().map(|m| m.name.as_str()),
            NameKind::Method,
            &spec.name,
        )?;
        let property_index = index_names(
            spec.properties.iter().map(|p| p.name.as_str()),
            NameKind::Property,
            &spec.name,
        )?;

        let methods = spec
            .methods
            .iter()
            .map(|method| generate_method(&spec.name, method))
            .collect::<Result<Vec<_>, _>>()?;
        let properties = spec
            .properties
            .iter()
            .map(|property| generate_property(&spec.name, property))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Generated proxy type for {} with {} methods and {} properties",
            spec.name,
            methods.len(),
            properties.len()
        );
        Ok(Self {
            interface: spec.name.clone(),
            methods,
            method_index,
            properties,
            property_index,
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Generated methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &GeneratedMethod> {
        self.methods.iter()
    }

    /// Generated properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &GeneratedProperty> {
        self.properties.iter()
    }

    pub fn method(&self, name: &str) -> Option<&GeneratedMethod> {
        self.method_index.get(name).map(|&i| &self.methods[i])
    }

    pub fn property(&self, name: &str) -> Option<&GeneratedProperty> {
        self.property_index.get(name).map(|&i| &self.properties[i])
    }

    /// Bind to `connection` with the default options.
    pub fn bind<'p, C: Connection>(&'p self, connection: &'p C) -> Proxy<'p, C> {
        self.bind_with(connection, ProxyOptions::default())
    }

    pub fn bind_with<'p, C: Connection>(
        &'p self,
        connection: &'p C,
        options: ProxyOptions,
    ) -> Proxy<'p, C> {
        Proxy {
            proxy_type: self,
            connection,
            options,
        }
    }
}

/// Map each name to its position, rejecting the first repeat. Introspection data may leave
/// arguments unnamed, so empty argument names never count as duplicates. Methods and properties
/// get no such exemption.
fn index_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: NameKind,
    scope: &str,
) -> Result<HashMap<String, usize>, DbusgenError> {
    let mut index = HashMap::new();
    for (i, name) in names.enumerate() {
        let unnamed_argument = kind == NameKind::Argument && name.is_empty();
        if index.insert(name.to_string(), i).is_some() && !unnamed_argument {
            return Err(DbusgenError::DuplicateName {
                kind,
                name: name.to_string(),
                scope: scope.to_string(),
            });
        }
    }
    Ok(index)
}

fn generate_args(
    interface: &str,
    method: &str,
    args: &[ArgSpec],
) -> Result<Vec<GeneratedArg>, DbusgenError> {
    args.iter()
        .map(|arg| {
            let ty = parse_single(&arg.signature).map_err(|e| DbusgenError::SpecGeneration {
                context: format!("argument {:?} of {interface}.{method}", arg.name),
                cause: e.into(),
            })?;
            Ok(GeneratedArg {
                name: arg.name.clone(),
                ty,
            })
        })
        .collect()
}

fn generate_method(interface: &str, spec: &MethodSpec) -> Result<GeneratedMethod, DbusgenError> {
    let scope = format!("{interface}.{}", spec.name);
    index_names(
        spec.inputs.iter().map(|a| a.name.as_str()),
        NameKind::Argument,
        &scope,
    )?;
    index_names(
        spec.outputs.iter().map(|a| a.name.as_str()),
        NameKind::Argument,
        &scope,
    )?;

    let inputs = generate_args(interface, &spec.name, &spec.inputs)?;
    let outputs = generate_args(interface, &spec.name, &spec.outputs)?;
    let method = GeneratedMethod {
        name: spec.name.clone(),
        inputs,
        outputs,
    };

    // Each argument is valid on its own; the message body signature must also be.
    for (direction, signature) in [
        ("input", method.input_signature()),
        ("output", method.output_signature()),
    ] {
        parse(&signature).map_err(|e| DbusgenError::SpecGeneration {
            context: format!("{direction} signature of {scope}"),
            cause: e.into(),
        })?;
    }
    trace!(
        "Generated {scope}({}) -> ({})",
        method.input_signature(),
        method.output_signature()
    );
    Ok(method)
}

fn generate_property(
    interface: &str,
    spec: &PropertySpec,
) -> Result<GeneratedProperty, DbusgenError> {
    let ty = parse_single(&spec.signature).map_err(|e| DbusgenError::SpecGeneration {
        context: format!("property {interface}.{}", spec.name),
        cause: e.into(),
    })?;
    Ok(GeneratedProperty {
        name: spec.name.clone(),
        ty,
        access: spec.access,
    })
}

/// Shape `value` for the wire as its declared type requires. A value declared `v` travels
/// inside a variant, so a plain value is wrapped; one that already is a variant is sent as is.
fn encode_value(ty: &TypeNode, value: OwnedValue) -> zbus::zvariant::Result<OwnedValue> {
    if *ty != TypeNode::Variant || matches!(&*value, Value::Value(_)) {
        return Ok(value);
    }
    OwnedValue::try_from(Value::Value(Box::new(Value::from(value))))
}

fn invocation_error<E>(operation: String, e: E) -> DbusgenError
where
    E: std::error::Error + Send + Sync + 'static,
{
    warn!("{operation} failed: {e}");
    DbusgenError::Invocation {
        operation,
        source: Box::new(e),
    }
}

/// A [`ProxyType`] bound to a connection.
pub struct Proxy<'p, C: Connection> {
    proxy_type: &'p ProxyType,
    connection: &'p C,
    options: ProxyOptions,
}

impl<C: Connection> Clone for Proxy<'_, C> {
    fn clone(&self) -> Self {
        Self {
            proxy_type: self.proxy_type,
            connection: self.connection,
            options: self.options,
        }
    }
}

impl<'p, C: Connection> Proxy<'p, C> {
    pub fn interface(&self) -> &'p str {
        &self.proxy_type.interface
    }

    pub fn proxy_type(&self) -> &'p ProxyType {
        self.proxy_type
    }

    pub fn timeout(&self) -> Duration {
        self.options.timeout
    }

    pub fn method(&self, name: &str) -> Option<BoundMethod<'p, C>> {
        self.proxy_type
            .method(name)
            .map(|method| self.bind_method(method))
    }

    pub fn methods(&self) -> impl Iterator<Item = BoundMethod<'p, C>> + '_ {
        self.proxy_type
            .methods
            .iter()
            .map(|method| self.bind_method(method))
    }

    pub fn property(&self, name: &str) -> Option<BoundProperty<'p, C>> {
        self.proxy_type
            .property(name)
            .map(|property| self.bind_property(property))
    }

    pub fn properties(&self) -> impl Iterator<Item = BoundProperty<'p, C>> + '_ {
        self.proxy_type
            .properties
            .iter()
            .map(|property| self.bind_property(property))
    }

    fn bind_method(&self, method: &'p GeneratedMethod) -> BoundMethod<'p, C> {
        BoundMethod {
            interface: &self.proxy_type.interface,
            method,
            connection: self.connection,
            timeout: self.options.timeout,
        }
    }

    fn bind_property(&self, property: &'p GeneratedProperty) -> BoundProperty<'p, C> {
        BoundProperty {
            interface: &self.proxy_type.interface,
            property,
            connection: self.connection,
        }
    }

    fn require_method(&self, name: &str) -> Result<BoundMethod<'p, C>, DbusgenError> {
        self.method(name).ok_or_else(|| DbusgenError::UnknownMember {
            interface: self.proxy_type.interface.clone(),
            kind: NameKind::Method,
            name: name.to_string(),
        })
    }

    fn require_property(&self, name: &str) -> Result<BoundProperty<'p, C>, DbusgenError> {
        self.property(name).ok_or_else(|| DbusgenError::UnknownMember {
            interface: self.proxy_type.interface.clone(),
            kind: NameKind::Property,
            name: name.to_string(),
        })
    }

    /// Call `method` with positional arguments. See [`BoundMethod::call`].
    pub async fn call(&self, method: &str, args: Vec<OwnedValue>) -> Result<Reply, DbusgenError> {
        self.require_method(method)?.call(args).await
    }

    /// Call `method` with a per-call timeout instead of the binding's default.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        args: Vec<OwnedValue>,
        timeout: Duration,
    ) -> Result<Reply, DbusgenError> {
        self.require_method(method)?
            .call_with_timeout(args, timeout)
            .await
    }

    /// Call `method` with arguments given by name. See [`BoundMethod::call_named`].
    pub async fn call_named<'a>(
        &self,
        method: &str,
        args: impl IntoIterator<Item = (&'a str, OwnedValue)>,
    ) -> Result<Reply, DbusgenError> {
        self.require_method(method)?.call_named(args).await
    }

    /// Read `property`. Fails with [`DbusgenError::PropertyAccess`] if it has no getter.
    pub async fn get(&self, property: &str) -> Result<OwnedValue, DbusgenError> {
        let bound = self.require_property(property)?;
        let getter = bound.getter().ok_or_else(|| DbusgenError::PropertyAccess {
            property: property.to_string(),
            op: PropertyOp::Get,
        })?;
        getter.get().await
    }

    /// Write `property`. Fails with [`DbusgenError::PropertyAccess`] if it has no setter.
    pub async fn set(&self, property: &str, value: OwnedValue) -> Result<(), DbusgenError> {
        let bound = self.require_property(property)?;
        let setter = bound.setter().ok_or_else(|| DbusgenError::PropertyAccess {
            property: property.to_string(),
            op: PropertyOp::Set,
        })?;
        setter.set(value).await
    }
}

/// One generated method bound to a connection.
pub struct BoundMethod<'p, C: Connection> {
    interface: &'p str,
    method: &'p GeneratedMethod,
    connection: &'p C,
    timeout: Duration,
}

impl<'p, C: Connection> BoundMethod<'p, C> {
    pub fn spec(&self) -> &'p GeneratedMethod {
        self.method
    }

    pub fn name(&self) -> &'p str {
        &self.method.name
    }

    pub fn arity(&self) -> usize {
        self.method.arity()
    }

    /// Invoke the method with the binding's timeout.
    ///
    /// # Arguments
    ///
    /// * `args` - one value per declared input, in declared order
    ///
    /// # Returns: `Result<Reply, DbusgenError>`
    /// * `Ok(Reply)` - the reply, shaped by the number of declared outputs
    /// * `Err(DbusgenError::InvocationArity)` - `args.len()` differs from the declared inputs
    /// * `Err(DbusgenError::Invocation)` - the connection failed the call
    /// * `Err(DbusgenError::ReplyArity)` - the reply had the wrong number of values
    pub async fn call(&self, args: Vec<OwnedValue>) -> Result<Reply, DbusgenError> {
        self.call_with_timeout(args, self.timeout).await
    }

    pub async fn call_with_timeout(
        &self,
        args: Vec<OwnedValue>,
        timeout: Duration,
    ) -> Result<Reply, DbusgenError> {
        if args.len() != self.arity() {
            return Err(DbusgenError::InvocationArity {
                method: self.qualified_name(),
                expected: self.arity(),
                actual: args.len(),
            });
        }
        let args = self
            .method
            .inputs
            .iter()
            .zip(args)
            .map(|(arg, value)| encode_value(&arg.ty, value))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| invocation_error(self.qualified_name(), e))?;
        trace!(
            "Calling {} with {} arguments, timeout {timeout:?}",
            self.qualified_name(),
            args.len()
        );
        let values = self
            .connection
            .call_method(self.interface, &self.method.name, args, timeout)
            .await
            .map_err(|e| invocation_error(self.qualified_name(), e))?;
        self.shape_reply(values)
    }

    /// Invoke the method with arguments keyed by their declared names.
    ///
    /// The supplied names must be exactly the declared input names, each once. Arguments are
    /// reordered into declared order before the call.
    ///
    /// # Returns: `Result<Reply, DbusgenError>`
    /// * `Err(DbusgenError::ArgumentNameMismatch)` - the name sets differ
    /// * otherwise as [`BoundMethod::call`]
    pub async fn call_named<'a>(
        &self,
        args: impl IntoIterator<Item = (&'a str, OwnedValue)>,
    ) -> Result<Reply, DbusgenError> {
        let supplied: Vec<(&str, OwnedValue)> = args.into_iter().collect();
        let actual: Vec<String> = supplied.iter().map(|(n, _)| n.to_string()).collect();
        let mismatch = || DbusgenError::ArgumentNameMismatch {
            method: self.qualified_name(),
            expected: self
                .method
                .inputs
                .iter()
                .map(|a| a.name.clone())
                .collect(),
            actual: actual.clone(),
        };

        let mut by_name: HashMap<&str, OwnedValue> = HashMap::new();
        for (name, value) in supplied {
            if by_name.insert(name, value).is_some() {
                return Err(mismatch());
            }
        }
        let declared: HashSet<&str> = self.method.inputs.iter().map(|a| a.name.as_str()).collect();
        if declared.len() != by_name.len() || !by_name.keys().all(|n| declared.contains(n)) {
            return Err(mismatch());
        }
        let ordered = self
            .method
            .inputs
            .iter()
            .map(|a| by_name.remove(a.name.as_str()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(mismatch)?;
        self.call(ordered).await
    }

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.interface, self.method.name)
    }

    fn shape_reply(&self, mut values: Vec<OwnedValue>) -> Result<Reply, DbusgenError> {
        let expected = self.method.outputs.len();
        if values.len() != expected {
            return Err(DbusgenError::ReplyArity {
                method: self.qualified_name(),
                expected,
                actual: values.len(),
            });
        }
        if expected > 1 {
            return Ok(Reply::Tuple(values));
        }
        Ok(values.pop().map_or(Reply::Unit, Reply::Single))
    }
}

/// One generated property bound to a connection.
pub struct BoundProperty<'p, C: Connection> {
    interface: &'p str,
    property: &'p GeneratedProperty,
    connection: &'p C,
}

impl<'p, C: Connection> BoundProperty<'p, C> {
    pub fn spec(&self) -> &'p GeneratedProperty {
        self.property
    }

    pub fn name(&self) -> &'p str {
        &self.property.name
    }

    /// The getter, present only for readable properties.
    pub fn getter(&self) -> Option<PropertyGetter<'p, C>> {
        self.property.access.readable().then_some(PropertyGetter {
            interface: self.interface,
            name: &self.property.name,
            connection: self.connection,
        })
    }

    /// The setter, present only for writable properties.
    pub fn setter(&self) -> Option<PropertySetter<'p, C>> {
        self.property.access.writable().then_some(PropertySetter {
            interface: self.interface,
            name: &self.property.name,
            ty: &self.property.ty,
            connection: self.connection,
        })
    }
}

pub struct PropertyGetter<'p, C: Connection> {
    interface: &'p str,
    name: &'p str,
    connection: &'p C,
}

impl<C: Connection> PropertyGetter<'_, C> {
    pub async fn get(&self) -> Result<OwnedValue, DbusgenError> {
        trace!("Getting {}.{}", self.interface, self.name);
        self.connection
            .get_property(self.interface, self.name)
            .await
            .map_err(|e| invocation_error(format!("Get {}.{}", self.interface, self.name), e))
    }
}

pub struct PropertySetter<'p, C: Connection> {
    interface: &'p str,
    name: &'p str,
    ty: &'p TypeNode,
    connection: &'p C,
}

impl<C: Connection> PropertySetter<'_, C> {
    pub async fn set(&self, value: OwnedValue) -> Result<(), DbusgenError> {
        let operation = || format!("Set {}.{}", self.interface, self.name);
        let value = encode_value(self.ty, value).map_err(|e| invocation_error(operation(), e))?;
        trace!("Setting {}.{}", self.interface, self.name);
        self.connection
            .set_property(self.interface, self.name, value)
            .await
            .map_err(|e| invocation_error(operation(), e))
    }
}

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

//! [`Connection`] over a [`zbus::Connection`].
//!
//! A [`ZbusConnection`] targets one object: a destination bus name and an object path. Generated
//! proxies supply the interface per call, so one `ZbusConnection` serves every interface the
//! object implements.
//!
//! Argument lists are packed into a [`Structure`] so the message body signature is the
//! concatenation of the argument signatures, as the method's introspection data declares.
//! Replies are unpacked the same way.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use dbusgen::comm::dbus::ZbusConnection;
//! # async fn example() -> zbus::Result<()> {
//! let connection = ZbusConnection::system("org.freedesktop.hostname1", "/org/freedesktop/hostname1").await?;
//! # Ok(())
//! # }
//! ```

use crate::config;
use crate::connection::Connection;
use log::{debug, trace};
use std::future::Future;
use std::time::Duration;
use zbus::message::Message;
use zbus::names::BusName;
use zbus::zvariant::{ObjectPath, OwnedValue, Signature, Structure, StructureBuilder, Value};

#[derive(Debug, Clone)]
pub struct ZbusConnection {
    connection: zbus::Connection,
    destination: String,
    path: String,
}

/// Check that `destination` is a bus name and `path` an object path.
fn validate_target(destination: &str, path: &str) -> zbus::Result<()> {
    BusName::try_from(destination)?;
    ObjectPath::try_from(path)?;
    Ok(())
}

impl ZbusConnection {
    /// Target the object at `path` owned by `destination` on an existing connection.
    ///
    /// # Returns: `zbus::Result<ZbusConnection>`
    /// * `Err(zbus::Error::Names)` - `destination` is not a valid bus name
    /// * `Err(zbus::Error::Variant)` - `path` is not a valid object path
    pub fn new(
        connection: zbus::Connection,
        destination: impl Into<String>,
        path: impl Into<String>,
    ) -> zbus::Result<Self> {
        let destination = destination.into();
        let path = path.into();
        validate_target(&destination, &path)?;
        Ok(Self {
            connection,
            destination,
            path,
        })
    }

    /// Connect to the session bus and target the object at `path` owned by `destination`.
    pub async fn session(
        destination: impl Into<String>,
        path: impl Into<String>,
    ) -> zbus::Result<Self> {
        Self::new(zbus::Connection::session().await?, destination, path)
    }

    /// Connect to the system bus and target the object at `path` owned by `destination`.
    pub async fn system(
        destination: impl Into<String>,
        path: impl Into<String>,
    ) -> zbus::Result<Self> {
        Self::new(zbus::Connection::system().await?, destination, path)
    }

    pub fn inner(&self) -> &zbus::Connection {
        &self.connection
    }

    async fn send<B>(&self, interface: &str, member: &str, body: &B) -> zbus::Result<Message>
    where
        B: serde::Serialize + zbus::zvariant::DynamicType,
    {
        trace!(
            "Sending {interface}.{member} to {} at {}",
            self.destination, self.path
        );
        self.connection
            .call_method(
                Some(self.destination.as_str()),
                self.path.as_str(),
                Some(interface),
                member,
                body,
            )
            .await
    }
}

async fn with_timeout<T>(
    operation: &str,
    timeout: Duration,
    fut: impl Future<Output = zbus::Result<T>>,
) -> zbus::Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            debug!("{operation} timed out after {timeout:?}");
            Err(zbus::Error::Failure(format!(
                "{operation} timed out after {timeout:?}"
            )))
        }
    }
}

/// Unpack a method reply body into its top-level values.
///
/// The body is always read as a struct of its top-level values. A body holding one struct,
/// e.g. `(oas)`, is one value, not two.
fn decode_reply(reply: &Message) -> zbus::Result<Vec<OwnedValue>> {
    let body = reply.body();
    let signature = body.signature().to_string();
    if signature.is_empty() {
        return Ok(Vec::new());
    }
    let wrapped: Signature = format!("({signature})").parse()?;
    let (fields, _): (Structure<'_>, usize) =
        body.data().deserialize_for_dynamic_signature(&wrapped)?;
    fields
        .into_fields()
        .into_iter()
        .map(|field| OwnedValue::try_from(field).map_err(zbus::Error::from))
        .collect()
}

impl Connection for ZbusConnection {
    type Error = zbus::Error;

    async fn call_method(
        &self,
        interface: &str,
        method: &str,
        args: Vec<OwnedValue>,
        timeout: Duration,
    ) -> zbus::Result<Vec<OwnedValue>> {
        let operation = format!("{interface}.{method}");
        let reply = with_timeout(&operation, timeout, async move {
            if args.is_empty() {
                return self.send(interface, method, &()).await;
            }
            let body = args
                .into_iter()
                .fold(StructureBuilder::new(), |builder, arg| {
                    builder.append_field(Value::from(arg))
                })
                .build()?;
            self.send(interface, method, &body).await
        })
        .await?;
        decode_reply(&reply)
    }

    async fn get_property(&self, interface: &str, property: &str) -> zbus::Result<OwnedValue> {
        let operation = format!("Get {interface}.{property}");
        let reply = with_timeout(
            &operation,
            config::DEFAULT_METHOD_TIMEOUT,
            self.send(config::PROPERTIES_INTERFACE, "Get", &(interface, property)),
        )
        .await?;
        reply.body().deserialize::<OwnedValue>()
    }

    async fn set_property(
        &self,
        interface: &str,
        property: &str,
        value: OwnedValue,
    ) -> zbus::Result<()> {
        let operation = format!("Set {interface}.{property}");
        with_timeout(
            &operation,
            config::DEFAULT_METHOD_TIMEOUT,
            self.send(
                config::PROPERTIES_INTERFACE,
                "Set",
                &(interface, property, Value::from(value)),
            ),
        )
        .await?;
        Ok(())
    }
}

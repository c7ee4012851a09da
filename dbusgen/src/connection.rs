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

//! The capability a generated proxy needs from the transport.
//!
//! Proxies never talk to the bus themselves. Each generated call turns into exactly one of
//! the three operations below. Values are passed through as given, except that a value
//! declared `v` arrives wrapped in a variant. A [`Connection`] is
//! borrowed for the lifetime of a bound proxy and may be shared by any number of proxies;
//! all three operations take `&self`, so it must provide its own synchronisation.
//!
//! [`ZbusConnection`](crate::comm::dbus::ZbusConnection) implements this over a
//! [`zbus::Connection`].

use std::future::Future;
use std::time::Duration;
use zbus::zvariant::OwnedValue;

pub trait Connection: Send + Sync {
    /// Error returned by the transport. Proxies wrap it in
    /// [`DbusgenError::Invocation`](crate::error::DbusgenError::Invocation) unchanged.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Call `method` on `interface` with `args` in order and return the reply's values in order.
    fn call_method(
        &self,
        interface: &str,
        method: &str,
        args: Vec<OwnedValue>,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<OwnedValue>, Self::Error>> + Send;

    /// Read `property` of `interface` through the standard properties interface.
    fn get_property(
        &self,
        interface: &str,
        property: &str,
    ) -> impl Future<Output = Result<OwnedValue, Self::Error>> + Send;

    /// Write `property` of `interface` through the standard properties interface.
    fn set_property(
        &self,
        interface: &str,
        property: &str,
        value: OwnedValue,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

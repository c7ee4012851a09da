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

use std::time::Duration;

/// Reply timeout used when neither the binding nor the call supplies one. Matches the libdbus
/// default of 25 seconds.
pub const DEFAULT_METHOD_TIMEOUT: Duration = Duration::from_secs(25);

/// The standard interface through which properties are read and written.
/// See
/// [https://dbus.freedesktop.org/doc/dbus-specification.html#standard-interfaces-properties](https://dbus.freedesktop.org/doc/dbus-specification.html#standard-interfaces-properties)
pub static PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Longest signature the wire protocol accepts, in bytes.
pub const MAX_SIGNATURE_LEN: usize = 255;

/// Deepest array nesting allowed in a single complete type.
pub const MAX_ARRAY_DEPTH: usize = 32;

/// Deepest struct nesting allowed in a single complete type. Dict entries count as structs.
pub const MAX_STRUCT_DEPTH: usize = 32;

/// Options applied when a generated proxy type is bound to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyOptions {
    /// Timeout passed to the connection for every method call that does not override it.
    pub timeout: Duration,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_METHOD_TIMEOUT,
        }
    }
}

impl ProxyOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

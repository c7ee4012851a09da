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

//! dbusgen - typed D-Bus client proxies generated from interface specifications.
//!
//! Given an [`InterfaceSpec`](spec::InterfaceSpec) (an interface name, methods with typed
//! arguments and results, properties with a type and access mode) this crate generates a
//! [`ProxyType`](proxy::ProxyType). Bound to a [`Connection`](connection::Connection), it
//! becomes a [`Proxy`](proxy::Proxy) whose methods check their argument count, forward the
//! call, and shape the reply by the declared outputs.
//!
//! # Components
//!
//! - [`signature`] - recursive-descent parser for D-Bus type signatures
//! - [`spec`] - the interface specification model
//! - [`proxy`] - proxy generation and the bound proxy
//! - [`connection`] - the capability a proxy calls through
//! - [`comm`] - a [`zbus`]-backed connection
//! - [`error`] - the error taxonomy
//! - [`config`] - protocol limits and defaults
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade: `trace` for parsing and per-call dispatch,
//! `debug` for generation summaries and timeouts, `warn` for failed calls. Install any logger,
//! e.g. `env_logger` with `RUST_LOG=dbusgen=trace`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dbusgen::prelude::*;
//! use zbus::zvariant::Value;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = InterfaceSpec::builder("org.freedesktop.hostname1")
//!     .property(PropertySpec::new("Hostname", "s", Access::Read))
//!     .method(MethodSpec::new("SetHostname").arg("hostname", "s").arg("interactive", "b"))
//!     .build();
//! let hostname1 = ProxyType::generate(&spec)?;
//!
//! let connection =
//!     ZbusConnection::system("org.freedesktop.hostname1", "/org/freedesktop/hostname1").await?;
//! let proxy = hostname1.bind(&connection);
//! let name = proxy.get("Hostname").await?;
//! println!("{:?}", Value::from(name));
//! # Ok(())
//! # }
//! ```

pub mod comm;
pub mod config;
pub mod connection;
pub mod error;
pub mod proxy;
pub mod signature;
pub mod spec;

pub mod prelude {
    pub use crate::comm::dbus::ZbusConnection;
    pub use crate::config::ProxyOptions;
    pub use crate::connection::Connection;
    pub use crate::error::DbusgenError;
    pub use crate::proxy::{Proxy, ProxyType, Reply, build_proxy};
    pub use crate::spec::{Access, ArgSpec, InterfaceSpec, MethodSpec, PropertySpec};
}

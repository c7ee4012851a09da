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

//! A small `org.example.Calc` service served over zbus, used to exercise generated proxies
//! end to end.

use log::info;
use zbus::zvariant::OwnedValue;
use zbus::{connection, fdo, interface};

pub static OBJECT_PATH: &str = "/org/example/Calc";

pub struct CalcService {
    value: i32,
}

#[interface(name = "org.example.Calc")]
impl CalcService {
    async fn add(&self, a: i32, b: i32) -> i32 {
        info!("add called with a: {a} and b: {b}");
        a + b
    }

    #[zbus(out_args("quotient", "remainder"))]
    async fn div_mod(&self, dividend: i32, divisor: i32) -> fdo::Result<(i32, i32)> {
        info!("div_mod called with dividend: {dividend} and divisor: {divisor}");
        if divisor == 0 {
            return Err(fdo::Error::InvalidArgs("division by zero".into()));
        }
        Ok((dividend / divisor, dividend % divisor))
    }

    async fn ping(&self) {}

    /// The signature of the value carried inside the variant argument.
    async fn describe(&self, value: OwnedValue) -> String {
        let signature = value.value_signature().to_string();
        info!("describe called with a value of type {signature}");
        signature
    }

    #[zbus(property)]
    async fn value(&self) -> i32 {
        self.value
    }

    #[zbus(property)]
    async fn set_value(&mut self, value: i32) {
        self.value = value;
    }
}

/// Serve a fresh [`CalcService`] on the session bus under the well-known `name`.
///
/// The service runs until the returned connection is dropped.
pub async fn serve_on_session_bus(name: &str) -> zbus::Result<zbus::Connection> {
    let conn = connection::Builder::session()?
        .name(name)?
        .serve_at(OBJECT_PATH, CalcService { value: 0 })?
        .build()
        .await?;
    info!("Started {name} on the session bus");
    Ok(conn)
}

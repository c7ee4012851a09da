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

use dbusgen::spec::{Access, InterfaceSpec, MethodSpec, PropertySpec};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `org.example.Calc` with one method per reply shape and one property per access mode.
pub fn calc_spec() -> InterfaceSpec {
    InterfaceSpec::builder("org.example.Calc")
        .method(
            MethodSpec::new("Add")
                .arg("a", "i")
                .arg("b", "i")
                .result("sum", "i"),
        )
        .method(
            MethodSpec::new("DivMod")
                .arg("dividend", "i")
                .arg("divisor", "i")
                .result("quotient", "i")
                .result("remainder", "i"),
        )
        .method(MethodSpec::new("Echo").arg("x", "i").result("y", "i"))
        .method(MethodSpec::new("Ping"))
        .method(MethodSpec::new("Fail").arg("reason", "s"))
        // Declares a result the stub never sends.
        .method(MethodSpec::new("Short").result("missing", "s"))
        .property(PropertySpec::new("Value", "i", Access::ReadWrite))
        .property(PropertySpec::new("Count", "u", Access::Read))
        .property(PropertySpec::new("Secret", "s", Access::Write))
        .build()
}

/// `org.example.Settings`, whose members carry `v` values.
pub fn settings_spec() -> InterfaceSpec {
    InterfaceSpec::builder("org.example.Settings")
        .method(
            MethodSpec::new("Describe")
                .arg("value", "v")
                .result("signature", "s"),
        )
        .method(
            MethodSpec::new("DescribeEntry")
                .arg("key", "s")
                .arg("value", "v")
                .result("key_signature", "s")
                .result("value_signature", "s"),
        )
        .property(PropertySpec::new("Default", "v", Access::ReadWrite))
        .property(PropertySpec::new("Name", "s", Access::ReadWrite))
        .build()
}

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

use crate::common::stub_connection::{StubConnection, as_int, int, string, variant};
use crate::common::test_functions::{init_logging, settings_spec};
use dbusgen::prelude::*;
use googletest::prelude::*;
use rstest::*;
use zbus::zvariant::{OwnedValue, Value};

#[gtest]
#[tokio::test]
#[rstest]
#[case::plain_int(int(5), "vi")]
#[case::plain_string(string("hello"), "vs")]
#[case::already_variant(variant(int(5)), "vi")]
async fn variant_arguments_go_out_as_variants(#[case] value: OwnedValue, #[case] wire: &str) {
    init_logging();
    let settings = ProxyType::generate(&settings_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = settings.bind(&connection);

    let reply = proxy
        .call("Describe", vec![value])
        .await
        .expect("failed to call Describe");
    expect_that!(reply, eq(&Reply::Single(string(wire))));
}

#[gtest]
#[tokio::test]
async fn only_variant_arguments_are_wrapped() {
    let settings = ProxyType::generate(&settings_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = settings.bind(&connection);

    let reply = proxy
        .call_named(
            "DescribeEntry",
            [("value", int(1)), ("key", string("volume"))],
        )
        .await
        .expect("failed to call DescribeEntry");
    expect_that!(
        reply,
        eq(&Reply::Tuple(vec![string("s"), string("vi")]))
    );
}

#[gtest]
#[tokio::test]
async fn variant_property_is_set_as_one_variant() {
    let settings = ProxyType::generate(&settings_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = settings.bind(&connection);

    proxy
        .set("Default", int(7))
        .await
        .expect("failed to set Default");
    proxy
        .set("Name", string("volume"))
        .await
        .expect("failed to set Name");
    proxy
        .set("Default", variant(int(8)))
        .await
        .expect("failed to set Default");

    let name = proxy.get("Name").await.expect("failed to get Name");
    expect_that!(name, eq(&string("volume")));

    let default = proxy.get("Default").await.expect("failed to get Default");
    let inner = match &*default {
        Value::Value(inner) => inner.try_to_owned().expect("inner value is owned"),
        other => panic!("Default was stored as {other:?}, not a variant"),
    };
    expect_that!(as_int(inner), eq(8));
}

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

use crate::common::stub_connection::{RecordedCall, StubConnection, as_int, int};
use crate::common::test_functions::{calc_spec, init_logging};
use dbusgen::config::DEFAULT_METHOD_TIMEOUT;
use dbusgen::prelude::*;
use googletest::prelude::*;
use rstest::*;
use std::time::Duration;
use zbus::zvariant::OwnedValue;

fn ints(n: usize) -> Vec<OwnedValue> {
    (0..n as i32).map(int).collect()
}

#[gtest]
#[tokio::test]
#[rstest]
async fn wrong_argument_count_never_reaches_the_connection(
    #[values(0, 1, 3, 4, 5)] supplied: usize,
) {
    init_logging();
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = calc.bind(&connection);

    let res = proxy.call("Add", ints(supplied)).await;
    assert_that!(
        res,
        err(displays_as(eq(format!(
            "DbusgenError::InvocationArity: org.example.Calc.Add expects 2 arguments, got {supplied}"
        ))))
    );
    expect_that!(connection.calls(), is_empty());
}

#[gtest]
#[tokio::test]
#[rstest]
#[case::ping("Ping", vec![], 0)]
#[case::echo("Echo", vec![int(9)], 1)]
#[case::div_mod("DivMod", vec![int(17), int(5)], 2)]
async fn reply_is_shaped_by_declared_outputs(
    #[case] method: &str,
    #[case] args: Vec<OwnedValue>,
    #[case] outputs: usize,
) {
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = calc.bind(&connection);

    let reply = proxy
        .call(method, args)
        .await
        .expect("failed to call method");
    match outputs {
        0 => {
            expect_that!(reply, eq(&Reply::Unit));
        }
        1 => {
            expect_that!(reply, eq(&Reply::Single(int(9))));
        }
        _ => {
            expect_that!(reply, eq(&Reply::Tuple(vec![int(3), int(2)])));
        }
    }
}

#[gtest]
#[tokio::test]
async fn bound_method_exposes_its_shape() {
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = calc.bind(&connection);

    let div_mod = proxy.method("DivMod").expect("DivMod is generated");
    expect_that!(div_mod.name(), eq("DivMod"));
    expect_that!(div_mod.arity(), eq(2));
    expect_that!(div_mod.spec().output_signature(), eq("ii"));

    let values = div_mod
        .call(vec![int(7), int(2)])
        .await
        .expect("failed to call DivMod")
        .into_values();
    expect_that!(
        values.into_iter().map(as_int).collect::<Vec<_>>(),
        elements_are![eq(&3), eq(&1)]
    );
    expect_that!(
        proxy.methods().map(|m| m.name()).collect::<Vec<_>>(),
        elements_are![
            eq(&"Add"),
            eq(&"DivMod"),
            eq(&"Echo"),
            eq(&"Ping"),
            eq(&"Fail"),
            eq(&"Short")
        ]
    );
}

#[gtest]
#[tokio::test]
async fn connection_errors_are_wrapped_and_proxy_stays_usable() {
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = calc.bind(&connection);

    let res = proxy
        .call("Fail", vec![zbus::zvariant::Value::from("why").try_to_owned().unwrap()])
        .await;
    assert_that!(
        &res,
        err(displays_as(contains_substring(
            "DbusgenError::Invocation: org.example.Calc.Fail failed: StubError::Remote: org.example.Error.Failed"
        )))
    );
    let source = std::error::Error::source(&res.unwrap_err()).map(ToString::to_string);
    expect_that!(source, some(contains_substring("StubError::Remote")));

    let res = proxy.call("DivMod", vec![int(1), int(0)]).await;
    assert_that!(res, err(displays_as(contains_substring("division by zero"))));

    let reply = proxy
        .call("Add", vec![int(1), int(1)])
        .await
        .expect("proxy should still work after a failed call");
    expect_that!(reply, eq(&Reply::Single(int(2))));
}

#[gtest]
#[tokio::test]
async fn short_reply_is_an_error() {
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = calc.bind(&connection);

    assert_that!(
        proxy.call("Short", vec![]).await,
        err(displays_as(eq(
            "DbusgenError::ReplyArity: org.example.Calc.Short declares 1 results, reply carried 0"
        )))
    );
}

#[gtest]
#[tokio::test]
async fn unknown_method() {
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = calc.bind(&connection);

    expect_that!(proxy.method("Multiply").is_none(), eq(true));
    assert_that!(
        proxy.call("Multiply", vec![int(1), int(2)]).await,
        err(displays_as(eq(
            "DbusgenError::UnknownMember: org.example.Calc has no method named \"Multiply\""
        )))
    );
}

#[gtest]
#[tokio::test]
async fn named_arguments_are_reordered() {
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = calc.bind(&connection);

    let reply = proxy
        .call_named("DivMod", [("divisor", int(4)), ("dividend", int(10))])
        .await
        .expect("failed to call DivMod");
    expect_that!(reply, eq(&Reply::Tuple(vec![int(2), int(2)])));
}

#[gtest]
#[tokio::test]
#[rstest]
#[case::missing(vec!["dividend"], "(dividend)")]
#[case::extra(vec!["dividend", "divisor", "scale"], "(dividend, divisor, scale)")]
#[case::misspelt(vec!["dividend", "divsor"], "(dividend, divsor)")]
#[case::repeated(vec!["dividend", "dividend"], "(dividend, dividend)")]
async fn named_argument_mismatch(#[case] names: Vec<&str>, #[case] given: &str) {
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();
    let proxy = calc.bind(&connection);

    let args: Vec<(&str, OwnedValue)> = names.into_iter().map(|n| (n, int(1))).collect();
    let res = proxy.call_named("DivMod", args).await;
    assert_that!(
        res,
        err(displays_as(eq(format!(
            "DbusgenError::ArgumentNameMismatch: org.example.Calc.DivMod takes (dividend, divisor) but was given {given}"
        ))))
    );
    expect_that!(connection.calls(), is_empty());
}

#[gtest]
#[tokio::test]
async fn timeouts_reach_the_connection() {
    let calc = ProxyType::generate(&calc_spec()).expect("failed to generate proxy type");
    let connection = StubConnection::new();

    calc.bind(&connection)
        .call("Ping", vec![])
        .await
        .expect("failed to call Ping");
    let proxy = calc.bind_with(&connection, ProxyOptions::with_timeout(Duration::from_secs(2)));
    proxy
        .call("Ping", vec![])
        .await
        .expect("failed to call Ping");
    proxy
        .call_with_timeout("Echo", vec![int(1)], Duration::from_millis(50))
        .await
        .expect("failed to call Echo");

    let expected = |method: &str, arg_count: usize, timeout: Duration| RecordedCall {
        interface: "org.example.Calc".to_string(),
        method: method.to_string(),
        arg_count,
        timeout,
    };
    expect_that!(
        connection.calls(),
        elements_are![
            eq(&expected("Ping", 0, DEFAULT_METHOD_TIMEOUT)),
            eq(&expected("Ping", 0, Duration::from_secs(2))),
            eq(&expected("Echo", 1, Duration::from_millis(50))),
        ]
    );
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use goldledger::utils::{fmt_decimal, format_numeric_value, parse_numeric_value, round2};
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

#[test]
fn missing_and_blank_input_use_default() {
    assert_eq!(parse_numeric_value(&Value::Null, Decimal::ZERO), Decimal::ZERO);
    assert_eq!(parse_numeric_value(&json!(""), d("7")), d("7"));
    assert_eq!(parse_numeric_value(&json!("   "), d("7")), d("7"));
    assert_eq!(parse_numeric_value(&json!(true), d("1.5")), d("1.5"));
    assert_eq!(parse_numeric_value(&json!([1, 2]), Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn numbers_pass_through() {
    assert_eq!(parse_numeric_value(&json!(7), Decimal::ZERO), d("7"));
    assert_eq!(parse_numeric_value(&json!(12.5), Decimal::ZERO), d("12.5"));
    assert_eq!(parse_numeric_value(&json!(-99.5), Decimal::ZERO), d("-99.5"));
}

#[test]
fn out_of_range_numbers_saturate() {
    assert_eq!(parse_numeric_value(&json!(1e30), Decimal::ZERO), Decimal::MAX);
    assert_eq!(parse_numeric_value(&json!(-1e30), Decimal::ZERO), Decimal::MIN);
    assert_eq!(parse_numeric_value(&json!("1e30"), Decimal::ZERO), Decimal::MAX);
    assert_eq!(parse_numeric_value(&json!("1e27"), Decimal::ZERO), d("1000000000000000000000000000"));
}

#[test]
fn strings_must_be_complete_numbers() {
    assert_eq!(parse_numeric_value(&json!(" 42.25 "), Decimal::ZERO), d("42.25"));
    assert_eq!(parse_numeric_value(&json!("-3.5"), Decimal::ZERO), d("-3.5"));
    assert_eq!(parse_numeric_value(&json!("1e3"), Decimal::ZERO), d("1000"));
    // partial numeric prefixes are rejected, not truncated
    assert_eq!(parse_numeric_value(&json!("3.5abc"), Decimal::ZERO), Decimal::ZERO);
    assert_eq!(parse_numeric_value(&json!("abc"), d("5")), d("5"));
    assert_eq!(parse_numeric_value(&json!("NaN"), Decimal::ZERO), Decimal::ZERO);
    assert_eq!(parse_numeric_value(&json!("Infinity"), Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn format_pads_and_keeps_sign() {
    assert_eq!(format_numeric_value(&Value::Null, 3, Decimal::ZERO), "0.000");
    assert_eq!(format_numeric_value(&json!("12.5"), 2, Decimal::ZERO), "12.50");
    assert_eq!(format_numeric_value(&json!("-12.345"), 2, Decimal::ZERO), "-12.35");
    assert_eq!(format_numeric_value(&json!("garbage"), 2, Decimal::ZERO), "0.00");
    assert_eq!(format_numeric_value(&json!(5), 0, Decimal::ZERO), "5");
}

#[test]
fn format_drops_sign_of_rounded_zero() {
    assert_eq!(fmt_decimal(d("-0.001"), 2), "0.00");
    assert_eq!(fmt_decimal(d("-0.006"), 2), "-0.01");
}

#[test]
fn round2_rounds_half_up() {
    assert_eq!(round2(d("107.5675675675")), d("107.57"));
    assert_eq!(round2(d("2.345")), d("2.35"));
    assert_eq!(round2(d("1.004")), d("1.00"));
    assert_eq!(round2(d("-1.005")), d("-1.00"));
    assert_eq!(round2(d("-1.006")), d("-1.01"));
}

#[test]
fn round2_handles_the_whole_range() {
    assert_eq!(round2(Decimal::MAX), Decimal::MAX);
    assert_eq!(round2(Decimal::MIN), Decimal::MIN);
    assert_eq!(round2(d("-0.004")), Decimal::ZERO);
    assert_eq!(round2(d("0.125")), d("0.13"));
}

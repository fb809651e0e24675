//! Numeric built-ins: `decimal()`, `floor()`, `ceiling()`, `abs()`,
//! `modulo()`, `sqrt()`, and the rounding family.
//!
//! The rounding modes map onto `rust_decimal` strategies: `decimal` rounds
//! half-even, `round up` away from zero, `round down` toward zero,
//! `round half up` midpoint-away-from-zero, `round half down`
//! midpoint-toward-zero.

use super::{expected, native, with_number};
use crate::context::ContextBuilder;
use crate::value::{DayTimeDuration, Val, YearMonthDuration};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub(crate) fn register(builder: &mut ContextBuilder) {
    builder.add_function(
        "decimal",
        native(&["n", "scale"], false, |args| {
            round_with(args, RoundingStrategy::MidpointNearestEven)
        }),
    );
    builder.add_function(
        "round up",
        native(&["n", "scale"], false, |args| {
            round_with(args, RoundingStrategy::AwayFromZero)
        }),
    );
    builder.add_function(
        "round down",
        native(&["n", "scale"], false, |args| {
            round_with(args, RoundingStrategy::ToZero)
        }),
    );
    builder.add_function(
        "round half up",
        native(&["n", "scale"], false, |args| {
            round_with(args, RoundingStrategy::MidpointAwayFromZero)
        }),
    );
    builder.add_function(
        "round half down",
        native(&["n", "scale"], false, |args| {
            round_with(args, RoundingStrategy::MidpointTowardZero)
        }),
    );

    builder.add_function(
        "floor",
        native(&["n"], false, |args| {
            with_number(&args[0], |n| Val::Number(n.floor()))
        }),
    );
    builder.add_function(
        "ceiling",
        native(&["n"], false, |args| {
            with_number(&args[0], |n| Val::Number(n.ceil()))
        }),
    );

    builder.add_function("abs", native(&["n"], false, |args| abs(&args[0])));
    builder.add_function(
        "modulo",
        native(&["dividend", "divisor"], false, |args| {
            with_number(&args[0], |dividend| {
                with_number(&args[1], |divisor| modulo(dividend, divisor))
            })
        }),
    );
    builder.add_function(
        "sqrt",
        native(&["number"], false, |args| {
            with_number(&args[0], sqrt)
        }),
    );
}

fn round_with(args: &[Val], strategy: RoundingStrategy) -> Val {
    with_number(&args[0], |n| {
        let scale = match &args[1] {
            Val::Number(scale) => match scale.trunc().to_u32() {
                Some(scale) => scale,
                None => return expected("non-negative scale", &args[1]),
            },
            other => return expected("number", other),
        };
        Val::Number(n.round_dp_with_strategy(scale, strategy))
    })
}

fn abs(value: &Val) -> Val {
    match value {
        Val::Number(n) => Val::Number(n.abs()),
        Val::YearMonthDuration(d) => {
            Val::YearMonthDuration(YearMonthDuration::from_months(d.total_months().abs()))
        }
        Val::DayTimeDuration(d) => Val::DayTimeDuration(DayTimeDuration::new(d.as_duration().abs())),
        other => expected("number or duration", other),
    }
}

/// Result takes the sign of the divisor: `modulo(-12, 5) = 3`.
fn modulo(dividend: Decimal, divisor: Decimal) -> Val {
    if divisor.is_zero() {
        return Val::error("division by zero");
    }
    dividend
        .checked_div(divisor)
        .map(|q| q.floor())
        .and_then(|q| divisor.checked_mul(q))
        .and_then(|m| dividend.checked_sub(m))
        .map(Val::Number)
        .unwrap_or_else(|| Val::error("number overflow"))
}

fn sqrt(n: Decimal) -> Val {
    if n.is_sign_negative() {
        return Val::Null;
    }
    let Some(as_f64) = n.to_f64() else {
        return Val::error("number overflow");
    };
    let root = as_f64.sqrt();
    if root.is_infinite() || root.is_nan() {
        return Val::error("number overflow");
    }
    Decimal::from_str(&root.to_string())
        .map(Val::Number)
        .unwrap_or_else(|_| Val::error("number overflow"))
}

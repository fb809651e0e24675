//! Arithmetic dispatch.
//!
//! Dispatch is on the left operand's variant, then the right is validated.
//! `None` means the combination is outside the table; the evaluator turns it
//! into `null` and emits a warning. Failures that are results in their own
//! right (division by zero, overflow, propagated operand errors) come back as
//! `Some(Val::Error(..))`.
//!
//! Date/time addition and subtraction go through chrono's calendar
//! arithmetic, so month addition carries the way the platform normalizes it
//! (adding one month to Jan 31 lands on the last day of February).

use crate::value::{DayTimeDuration, Val, YearMonthDuration, ZonedTime};
use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// `x + y`
pub fn add(x: &Val, y: &Val) -> Option<Val> {
    if x.is_error() {
        return Some(x.clone());
    }
    if y.is_error() {
        return Some(y.clone());
    }

    match (x, y) {
        (Val::Number(a), Val::Number(b)) => Some(number_or_overflow(a.checked_add(*b))),
        (Val::String(a), Val::String(b)) => Some(Val::String(format!("{}{}", a, b))),

        (Val::LocalTime(t), Val::DayTimeDuration(d)) => Some(Val::LocalTime(*t + d.as_duration())),
        (Val::Time(t), Val::DayTimeDuration(d)) => Some(Val::Time(ZonedTime::new(
            t.time + d.as_duration(),
            t.offset,
        ))),

        (Val::LocalDateTime(dt), Val::YearMonthDuration(d)) => {
            Some(local_date_time_plus_months(*dt, d.total_months()))
        }
        (Val::LocalDateTime(dt), Val::DayTimeDuration(d)) => Some(
            dt.checked_add_signed(d.as_duration())
                .map(Val::LocalDateTime)
                .unwrap_or_else(date_out_of_range),
        ),
        (Val::DateTime(dt), Val::YearMonthDuration(d)) => {
            Some(date_time_plus_months(*dt, d.total_months()))
        }
        (Val::DateTime(dt), Val::DayTimeDuration(d)) => Some(
            dt.checked_add_signed(d.as_duration())
                .map(Val::DateTime)
                .unwrap_or_else(date_out_of_range),
        ),

        (Val::YearMonthDuration(a), Val::YearMonthDuration(b)) => {
            Some(months_or_overflow(a.total_months().checked_add(b.total_months())))
        }
        (Val::YearMonthDuration(d), Val::LocalDateTime(dt)) => {
            Some(local_date_time_plus_months(*dt, d.total_months()))
        }
        (Val::YearMonthDuration(d), Val::DateTime(dt)) => {
            Some(date_time_plus_months(*dt, d.total_months()))
        }

        (Val::DayTimeDuration(a), Val::DayTimeDuration(b)) => Some(
            a.as_duration()
                .checked_add(&b.as_duration())
                .map(|d| Val::DayTimeDuration(DayTimeDuration::new(d)))
                .unwrap_or_else(duration_out_of_range),
        ),
        (Val::DayTimeDuration(d), Val::LocalTime(t)) => Some(Val::LocalTime(*t + d.as_duration())),
        (Val::DayTimeDuration(d), Val::Time(t)) => Some(Val::Time(ZonedTime::new(
            t.time + d.as_duration(),
            t.offset,
        ))),
        (Val::DayTimeDuration(d), Val::LocalDateTime(dt)) => Some(
            dt.checked_add_signed(d.as_duration())
                .map(Val::LocalDateTime)
                .unwrap_or_else(date_out_of_range),
        ),
        (Val::DayTimeDuration(d), Val::DateTime(dt)) => Some(
            dt.checked_add_signed(d.as_duration())
                .map(Val::DateTime)
                .unwrap_or_else(date_out_of_range),
        ),

        _ => None,
    }
}

/// `x - y`
pub fn sub(x: &Val, y: &Val) -> Option<Val> {
    if x.is_error() {
        return Some(x.clone());
    }
    if y.is_error() {
        return Some(y.clone());
    }

    match (x, y) {
        (Val::Number(a), Val::Number(b)) => Some(number_or_overflow(a.checked_sub(*b))),

        (Val::LocalTime(t), Val::DayTimeDuration(d)) => Some(Val::LocalTime(*t - d.as_duration())),
        (Val::LocalTime(a), Val::LocalTime(b)) => Some(Val::DayTimeDuration(DayTimeDuration::new(
            a.signed_duration_since(*b),
        ))),
        (Val::Time(t), Val::DayTimeDuration(d)) => Some(Val::Time(ZonedTime::new(
            t.time - d.as_duration(),
            t.offset,
        ))),
        (Val::Time(a), Val::Time(b)) => Some(Val::DayTimeDuration(DayTimeDuration::new(
            Duration::nanoseconds(a.normalized_nanos() - b.normalized_nanos()),
        ))),

        (Val::LocalDateTime(dt), Val::YearMonthDuration(d)) => {
            Some(local_date_time_plus_months(*dt, -d.total_months()))
        }
        (Val::LocalDateTime(dt), Val::DayTimeDuration(d)) => Some(
            dt.checked_sub_signed(d.as_duration())
                .map(Val::LocalDateTime)
                .unwrap_or_else(date_out_of_range),
        ),
        (Val::LocalDateTime(a), Val::LocalDateTime(b)) => Some(Val::DayTimeDuration(
            DayTimeDuration::new(a.signed_duration_since(*b)),
        )),
        (Val::DateTime(dt), Val::YearMonthDuration(d)) => {
            Some(date_time_plus_months(*dt, -d.total_months()))
        }
        (Val::DateTime(dt), Val::DayTimeDuration(d)) => Some(
            dt.checked_sub_signed(d.as_duration())
                .map(Val::DateTime)
                .unwrap_or_else(date_out_of_range),
        ),
        (Val::DateTime(a), Val::DateTime(b)) => Some(Val::DayTimeDuration(DayTimeDuration::new(
            a.signed_duration_since(*b),
        ))),

        (Val::YearMonthDuration(a), Val::YearMonthDuration(b)) => {
            Some(months_or_overflow(a.total_months().checked_sub(b.total_months())))
        }
        (Val::DayTimeDuration(a), Val::DayTimeDuration(b)) => Some(
            a.as_duration()
                .checked_sub(&b.as_duration())
                .map(|d| Val::DayTimeDuration(DayTimeDuration::new(d)))
                .unwrap_or_else(duration_out_of_range),
        ),

        _ => None,
    }
}

/// `x * y`
pub fn mul(x: &Val, y: &Val) -> Option<Val> {
    if x.is_error() {
        return Some(x.clone());
    }
    if y.is_error() {
        return Some(y.clone());
    }

    match (x, y) {
        (Val::Number(a), Val::Number(b)) => Some(number_or_overflow(a.checked_mul(*b))),

        (Val::YearMonthDuration(d), Val::Number(n)) | (Val::Number(n), Val::YearMonthDuration(d)) => {
            Some(scale_months(d, n))
        }
        (Val::DayTimeDuration(d), Val::Number(n)) | (Val::Number(n), Val::DayTimeDuration(d)) => {
            Some(scale_millis(d, n))
        }

        _ => None,
    }
}

/// `x / y`; division by zero is a hard error, not a suppressed failure
pub fn div(x: &Val, y: &Val) -> Option<Val> {
    if x.is_error() {
        return Some(x.clone());
    }
    if y.is_error() {
        return Some(y.clone());
    }

    match (x, y) {
        (Val::Number(a), Val::Number(b)) => Some(if b.is_zero() {
            division_by_zero()
        } else {
            number_or_overflow(a.checked_div(*b))
        }),

        // duration scalars divide through their integer representation
        // (total months / total milliseconds), truncating the quotient
        (Val::YearMonthDuration(d), Val::Number(n)) => Some(if n.is_zero() {
            division_by_zero()
        } else {
            match Decimal::from(d.total_months())
                .checked_div(*n)
                .and_then(|q| q.trunc().to_i64())
            {
                Some(months) => Val::YearMonthDuration(YearMonthDuration::from_months(months)),
                None => Val::error("number overflow"),
            }
        }),
        (Val::DayTimeDuration(d), Val::Number(n)) => Some(if n.is_zero() {
            division_by_zero()
        } else {
            match Decimal::from(d.total_millis())
                .checked_div(*n)
                .and_then(|q| q.trunc().to_i64())
            {
                Some(millis) => Val::DayTimeDuration(DayTimeDuration::new(Duration::milliseconds(millis))),
                None => Val::error("number overflow"),
            }
        }),

        _ => None,
    }
}

/// `x ** y`; the exponent is coerced to an integer
pub fn pow(x: &Val, y: &Val) -> Option<Val> {
    if x.is_error() {
        return Some(x.clone());
    }
    if y.is_error() {
        return Some(y.clone());
    }

    match (x, y) {
        (Val::Number(base), Val::Number(exponent)) => {
            let Some(exponent) = exponent.trunc().to_i64() else {
                return Some(Val::error("number overflow"));
            };
            Some(if exponent >= 0 {
                number_or_overflow(checked_powi(*base, exponent as u64))
            } else if base.is_zero() {
                division_by_zero()
            } else {
                number_or_overflow(
                    checked_powi(*base, exponent.unsigned_abs())
                        .and_then(|p| Decimal::ONE.checked_div(p)),
                )
            })
        }
        _ => None,
    }
}

/// Unary `-x`
pub fn negate(x: &Val) -> Option<Val> {
    match x {
        Val::Error(_) => Some(x.clone()),
        Val::Number(n) => Some(Val::Number(-*n)),
        _ => None,
    }
}

fn checked_powi(base: Decimal, mut exponent: u64) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        exponent >>= 1;
        if exponent > 0 {
            square = square.checked_mul(square)?;
        }
    }
    Some(result)
}

fn scale_months(d: &YearMonthDuration, n: &Decimal) -> Val {
    // scalar is coerced to an integer, matching the integer month model
    match n
        .trunc()
        .to_i64()
        .and_then(|k| d.total_months().checked_mul(k))
    {
        Some(months) => Val::YearMonthDuration(YearMonthDuration::from_months(months)),
        None => Val::error("number overflow"),
    }
}

fn scale_millis(d: &DayTimeDuration, n: &Decimal) -> Val {
    match n
        .trunc()
        .to_i64()
        .and_then(|k| d.total_millis().checked_mul(k))
    {
        Some(millis) => Val::DayTimeDuration(DayTimeDuration::new(Duration::milliseconds(millis))),
        None => Val::error("number overflow"),
    }
}

fn local_date_time_plus_months(dt: NaiveDateTime, months: i64) -> Val {
    let shifted = if months >= 0 {
        u32::try_from(months)
            .ok()
            .and_then(|m| dt.checked_add_months(Months::new(m)))
    } else {
        u32::try_from(-months)
            .ok()
            .and_then(|m| dt.checked_sub_months(Months::new(m)))
    };
    shifted
        .map(Val::LocalDateTime)
        .unwrap_or_else(date_out_of_range)
}

fn date_time_plus_months(dt: DateTime<FixedOffset>, months: i64) -> Val {
    let shifted = if months >= 0 {
        u32::try_from(months)
            .ok()
            .and_then(|m| dt.checked_add_months(Months::new(m)))
    } else {
        u32::try_from(-months)
            .ok()
            .and_then(|m| dt.checked_sub_months(Months::new(m)))
    };
    shifted.map(Val::DateTime).unwrap_or_else(date_out_of_range)
}

fn number_or_overflow(result: Option<Decimal>) -> Val {
    result.map(Val::Number).unwrap_or_else(|| Val::error("number overflow"))
}

fn months_or_overflow(result: Option<i64>) -> Val {
    result
        .map(|m| Val::YearMonthDuration(YearMonthDuration::from_months(m)))
        .unwrap_or_else(|| Val::error("number overflow"))
}

fn division_by_zero() -> Val {
    Val::error("division by zero")
}

fn date_out_of_range() -> Val {
    Val::error("date out of range")
}

fn duration_out_of_range() -> Val {
    Val::error("duration out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::str::FromStr;

    fn num(s: &str) -> Val {
        Val::Number(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_number_arithmetic() {
        assert_eq!(add(&num("1.5"), &num("2.5")), Some(num("4")));
        assert_eq!(sub(&num("1"), &num("3")), Some(num("-2")));
        assert_eq!(mul(&num("4"), &num("2.5")), Some(num("10")));
        assert_eq!(div(&num("10"), &num("4")), Some(num("2.5")));
    }

    #[test]
    fn test_division_by_zero_is_error() {
        assert_eq!(
            div(&num("1"), &num("0")),
            Some(Val::error("division by zero"))
        );
    }

    #[test]
    fn test_exponent_is_coerced_to_integer() {
        assert_eq!(pow(&num("2"), &num("10")), Some(num("1024")));
        assert_eq!(pow(&num("2"), &num("3.9")), Some(num("8")));
        assert_eq!(pow(&num("2"), &num("-2")), Some(num("0.25")));
        assert_eq!(pow(&num("7"), &num("0")), Some(num("1")));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            add(&Val::String("foo".into()), &Val::String("bar".into())),
            Some(Val::String("foobar".into()))
        );
    }

    #[test]
    fn test_type_mismatch_is_outside_table() {
        assert_eq!(add(&num("1"), &Val::Boolean(true)), None);
        assert_eq!(mul(&Val::String("a".into()), &num("2")), None);
        assert_eq!(negate(&Val::String("a".into())), None);
    }

    #[test]
    fn test_errors_propagate() {
        let err = Val::error("boom");
        assert_eq!(add(&err, &num("1")), Some(err.clone()));
        assert_eq!(div(&num("1"), &err), Some(err));
    }

    #[test]
    fn test_month_addition_carries() {
        let jan31 = NaiveDate::from_ymd_opt(2021, 1, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let result = add(
            &Val::LocalDateTime(jan31),
            &Val::YearMonthDuration(YearMonthDuration::from_months(1)),
        );
        assert_eq!(
            result,
            Some(Val::LocalDateTime(
                NaiveDate::from_ymd_opt(2021, 2, 28)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap()
            ))
        );
    }

    #[test]
    fn test_time_minus_time_is_duration() {
        let a = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        let b = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            sub(&Val::LocalTime(a), &Val::LocalTime(b)),
            Some(Val::DayTimeDuration(DayTimeDuration::new(Duration::minutes(90))))
        );
    }

    #[test]
    fn test_duration_scaling_truncates() {
        let p1y = Val::YearMonthDuration(YearMonthDuration::new(1, 0));
        assert_eq!(
            mul(&p1y, &num("2.9")),
            Some(Val::YearMonthDuration(YearMonthDuration::new(2, 0)))
        );
        assert_eq!(
            div(&Val::YearMonthDuration(YearMonthDuration::new(0, 7)), &num("2")),
            Some(Val::YearMonthDuration(YearMonthDuration::from_months(3)))
        );
    }
}

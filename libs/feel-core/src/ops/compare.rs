//! Equality, ordering, and interval membership.
//!
//! Unlike arithmetic, comparisons are not defensive: mismatched operand types
//! yield an error value. Equality handles `null` specially (`null = null` is
//! true, `null = x` is false) and recurses into lists and contexts; ordering
//! is defined only for the ordered kinds (numbers, temporals, durations).

use crate::ast::BoundKind;
use crate::value::Val;
use std::cmp::Ordering;

/// FEEL equality. Returns `Boolean` or `Error`.
pub fn equal(x: &Val, y: &Val) -> Val {
    if x.is_error() {
        return x.clone();
    }
    if y.is_error() {
        return y.clone();
    }

    // null compares equal only to null; this applies before type dispatch so
    // a null operand never raises a mismatch
    if x.is_null() || y.is_null() {
        return Val::Boolean(x.is_null() && y.is_null());
    }

    match (x, y) {
        (Val::Number(a), Val::Number(b)) => Val::Boolean(a == b),
        (Val::Boolean(a), Val::Boolean(b)) => Val::Boolean(a == b),
        (Val::String(a), Val::String(b)) => Val::Boolean(a == b),
        (Val::Date(a), Val::Date(b)) => Val::Boolean(a == b),
        (Val::LocalTime(a), Val::LocalTime(b)) => Val::Boolean(a == b),
        (Val::Time(a), Val::Time(b)) => Val::Boolean(a == b),
        (Val::LocalDateTime(a), Val::LocalDateTime(b)) => Val::Boolean(a == b),
        (Val::DateTime(a), Val::DateTime(b)) => Val::Boolean(a == b),
        (Val::YearMonthDuration(a), Val::YearMonthDuration(b)) => Val::Boolean(a == b),
        (Val::DayTimeDuration(a), Val::DayTimeDuration(b)) => Val::Boolean(a == b),

        (Val::List(a), Val::List(b)) => {
            if a.len() != b.len() {
                return Val::Boolean(false);
            }
            for (left, right) in a.iter().zip(b.iter()) {
                match equal(left, right) {
                    Val::Boolean(true) => {}
                    Val::Boolean(false) => return Val::Boolean(false),
                    other => return other,
                }
            }
            Val::Boolean(true)
        }

        (Val::Context(a), Val::Context(b)) => {
            let left = a.flat_variables();
            let right = b.flat_variables();
            if left.len() != right.len() {
                return Val::Boolean(false);
            }
            for (key, left_value) in &left {
                let Some(right_value) = right.get(key) else {
                    return Val::Boolean(false);
                };
                match equal(left_value, right_value) {
                    Val::Boolean(true) => {}
                    Val::Boolean(false) => return Val::Boolean(false),
                    other => return other,
                }
            }
            Val::Boolean(true)
        }

        _ => mismatch(x, y),
    }
}

/// FEEL `!=`, the negation of [`equal`].
pub fn not_equal(x: &Val, y: &Val) -> Val {
    match equal(x, y) {
        Val::Boolean(b) => Val::Boolean(!b),
        other => other,
    }
}

/// Total ordering over the ordered kinds; `Err` carries the error value.
pub fn ordering(x: &Val, y: &Val) -> Result<Ordering, Val> {
    if x.is_error() {
        return Err(x.clone());
    }
    if y.is_error() {
        return Err(y.clone());
    }

    match (x, y) {
        (Val::Number(a), Val::Number(b)) => Ok(a.cmp(b)),
        (Val::Date(a), Val::Date(b)) => Ok(a.cmp(b)),
        (Val::LocalTime(a), Val::LocalTime(b)) => Ok(a.cmp(b)),
        (Val::Time(a), Val::Time(b)) => Ok(a.cmp(b)),
        (Val::LocalDateTime(a), Val::LocalDateTime(b)) => Ok(a.cmp(b)),
        (Val::DateTime(a), Val::DateTime(b)) => Ok(a.cmp(b)),
        (Val::YearMonthDuration(a), Val::YearMonthDuration(b)) => Ok(a.cmp(b)),
        (Val::DayTimeDuration(a), Val::DayTimeDuration(b)) => Ok(a.cmp(b)),
        _ => Err(mismatch(x, y)),
    }
}

pub fn less_than(x: &Val, y: &Val) -> Val {
    boolean_ordering(x, y, |o| o == Ordering::Less)
}

pub fn less_or_equal(x: &Val, y: &Val) -> Val {
    boolean_ordering(x, y, |o| o != Ordering::Greater)
}

pub fn greater_than(x: &Val, y: &Val) -> Val {
    boolean_ordering(x, y, |o| o == Ordering::Greater)
}

pub fn greater_or_equal(x: &Val, y: &Val) -> Val {
    boolean_ordering(x, y, |o| o != Ordering::Less)
}

fn boolean_ordering(x: &Val, y: &Val, test: impl FnOnce(Ordering) -> bool) -> Val {
    match ordering(x, y) {
        Ok(o) => Val::Boolean(test(o)),
        Err(e) => e,
    }
}

/// Interval membership with per-endpoint boundary kinds.
pub fn in_interval(
    input: &Val,
    start: &Val,
    start_kind: BoundKind,
    end: &Val,
    end_kind: BoundKind,
) -> Val {
    let lower = match ordering(input, start) {
        Ok(o) => match start_kind {
            BoundKind::Closed => o != Ordering::Less,
            BoundKind::Open => o == Ordering::Greater,
        },
        Err(e) => return e,
    };
    let upper = match ordering(input, end) {
        Ok(o) => match end_kind {
            BoundKind::Closed => o != Ordering::Greater,
            BoundKind::Open => o == Ordering::Less,
        },
        Err(e) => return e,
    };
    Val::Boolean(lower && upper)
}

fn mismatch(x: &Val, y: &Val) -> Val {
    Val::error(format!("can not compare '{}' with '{}'", x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn num(n: i64) -> Val {
        Val::Number(Decimal::from(n))
    }

    #[test]
    fn test_null_equality() {
        assert_eq!(equal(&Val::Null, &Val::Null), Val::Boolean(true));
        assert_eq!(equal(&Val::Null, &num(1)), Val::Boolean(false));
        assert_eq!(equal(&num(1), &Val::Null), Val::Boolean(false));
    }

    #[test]
    fn test_mismatched_comparison_is_error() {
        assert!(equal(&num(1), &Val::Boolean(true)).is_error());
        assert!(less_than(&Val::String("abc".into()), &num(10)).is_error());
    }

    #[test]
    fn test_list_equality_recurses() {
        let a = Val::List(vec![num(1), Val::List(vec![num(2)])]);
        let b = Val::List(vec![num(1), Val::List(vec![num(2)])]);
        let c = Val::List(vec![num(1), Val::List(vec![num(3)])]);
        assert_eq!(equal(&a, &b), Val::Boolean(true));
        assert_eq!(equal(&a, &c), Val::Boolean(false));
        assert_eq!(equal(&a, &Val::List(vec![num(1)])), Val::Boolean(false));
    }

    #[test]
    fn test_interval_boundaries() {
        let two = num(2);
        assert_eq!(
            in_interval(&two, &num(2), BoundKind::Closed, &num(5), BoundKind::Closed),
            Val::Boolean(true)
        );
        assert_eq!(
            in_interval(&two, &num(2), BoundKind::Open, &num(5), BoundKind::Closed),
            Val::Boolean(false)
        );
        assert_eq!(
            in_interval(&num(5), &num(2), BoundKind::Closed, &num(5), BoundKind::Open),
            Val::Boolean(false)
        );
    }

    #[test]
    fn test_error_propagates_through_comparison() {
        let err = Val::error("boom");
        assert_eq!(equal(&err, &num(1)), err);
        assert_eq!(less_than(&num(1), &err), err);
    }
}

//! Three-valued logical combinators.
//!
//! SQL-style semantics over fully evaluated operands: a single `true` decides
//! `at_least_one` and a single `false` decides `all`, no matter what the
//! other operands are. Non-boolean operands contaminate the result to `null`
//! only when no boolean operand resolves the outcome. Callers therefore must
//! evaluate every operand before combining; short-circuiting on the first
//! non-boolean would change the result.

use crate::value::Val;

/// Disjunction over any number of operands.
pub fn at_least_one(values: &[Val]) -> Val {
    let mut all_boolean = true;
    for value in values {
        match value {
            Val::Boolean(true) => return Val::Boolean(true),
            Val::Boolean(false) => {}
            _ => all_boolean = false,
        }
    }
    if all_boolean {
        Val::Boolean(false)
    } else {
        Val::Null
    }
}

/// Conjunction over any number of operands.
pub fn all(values: &[Val]) -> Val {
    let mut all_boolean = true;
    for value in values {
        match value {
            Val::Boolean(false) => return Val::Boolean(false),
            Val::Boolean(true) => {}
            _ => all_boolean = false,
        }
    }
    if all_boolean {
        Val::Boolean(true)
    } else {
        Val::Null
    }
}

/// Logical negation. `None` marks a non-boolean operand; the evaluator turns
/// it into `null` with a warning. Errors propagate unchanged.
pub fn negate(value: &Val) -> Option<Val> {
    match value {
        Val::Boolean(b) => Some(Val::Boolean(!b)),
        Val::Error(_) => Some(value.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const T: Val = Val::Boolean(true);
    const F: Val = Val::Boolean(false);

    fn n() -> Val {
        Val::Null
    }

    fn x() -> Val {
        // a non-boolean operand
        Val::Number(Decimal::ONE)
    }

    #[test]
    fn test_at_least_one_truth_table() {
        assert_eq!(at_least_one(&[]), F);
        assert_eq!(at_least_one(&[F, F]), F);
        assert_eq!(at_least_one(&[F, T]), T);
        // a later true rescues earlier non-booleans
        assert_eq!(at_least_one(&[n(), T]), T);
        assert_eq!(at_least_one(&[x(), T]), T);
        assert_eq!(at_least_one(&[F, n()]), n());
        assert_eq!(at_least_one(&[n(), x()]), n());
    }

    #[test]
    fn test_all_truth_table() {
        assert_eq!(all(&[]), T);
        assert_eq!(all(&[T, T]), T);
        assert_eq!(all(&[T, F]), F);
        // a later false refutes earlier non-booleans
        assert_eq!(all(&[n(), F]), F);
        assert_eq!(all(&[x(), F]), F);
        assert_eq!(all(&[T, n()]), n());
        assert_eq!(all(&[x(), x()]), n());
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(&T), Some(F));
        assert_eq!(negate(&F), Some(T));
        assert_eq!(negate(&n()), None);
        assert_eq!(negate(&x()), None);
        let err = Val::error("boom");
        assert_eq!(negate(&err), Some(err));
    }
}

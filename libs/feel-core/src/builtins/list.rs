//! List built-ins.
//!
//! The aggregations (`min`, `max`, `sum`, `mean`) are variadic: they accept
//! either a single list or spread arguments. Aggregating an empty list yields
//! `null`; mixing incomparable element types yields an error.

use super::{expected, native, with_list, with_number};
use crate::context::ContextBuilder;
use crate::ops::compare;
use crate::value::Val;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;

pub(crate) fn register(builder: &mut ContextBuilder) {
    builder.add_function(
        "count",
        native(&["list"], false, |args| {
            with_list(&args[0], |items| Val::Number(Decimal::from(items.len() as u64)))
        }),
    );

    builder.add_function(
        "min",
        native(&["list"], true, |args| {
            with_list(&args[0], |items| pick(items, Ordering::Less))
        }),
    );
    builder.add_function(
        "max",
        native(&["list"], true, |args| {
            with_list(&args[0], |items| pick(items, Ordering::Greater))
        }),
    );
    builder.add_function(
        "sum",
        native(&["list"], true, |args| with_list(&args[0], sum)),
    );
    builder.add_function(
        "mean",
        native(&["list"], true, |args| {
            with_list(&args[0], |items| {
                if items.is_empty() {
                    return Val::Null;
                }
                match sum(items) {
                    Val::Number(total) => total
                        .checked_div(Decimal::from(items.len() as u64))
                        .map(Val::Number)
                        .unwrap_or_else(|| Val::error("number overflow")),
                    other => other,
                }
            })
        }),
    );

    builder.add_function(
        "list contains",
        native(&["list", "element"], false, |args| {
            with_list(&args[0], |items| {
                Val::Boolean(
                    items
                        .iter()
                        .any(|item| compare::equal(item, &args[1]) == Val::Boolean(true)),
                )
            })
        }),
    );

    builder.add_function(
        "concatenate",
        native(&["lists"], true, |args| {
            with_list(&args[0], |lists| {
                let mut combined = Vec::new();
                for list in lists {
                    match list {
                        Val::List(items) => combined.extend(items.iter().cloned()),
                        other => return expected("list", other),
                    }
                }
                Val::List(combined)
            })
        }),
    );

    builder.add_function(
        "append",
        native(&["list", "items"], true, |args| {
            with_list(&args[0], |items| {
                with_list(&args[1], |appended| {
                    let mut combined = items.to_vec();
                    combined.extend(appended.iter().cloned());
                    Val::List(combined)
                })
            })
        }),
    );

    builder.add_function(
        "flatten",
        native(&["list"], false, |args| {
            with_list(&args[0], |items| {
                let mut flat = Vec::new();
                flatten_into(items, &mut flat);
                Val::List(flat)
            })
        }),
    );

    builder.add_function(
        "sublist",
        native(&["list", "start position"], false, sublist),
    );
    builder.add_function(
        "sublist",
        native(&["list", "start position", "length"], false, sublist),
    );
}

fn pick(items: &[Val], keep: Ordering) -> Val {
    let Some((first, rest)) = items.split_first() else {
        return Val::Null;
    };
    let mut best = first.clone();
    for item in rest {
        match compare::ordering(item, &best) {
            Ok(o) if o == keep => best = item.clone(),
            Ok(_) => {}
            Err(error) => return error,
        }
    }
    best
}

fn sum(items: &[Val]) -> Val {
    if items.is_empty() {
        return Val::Null;
    }
    let mut total = Decimal::ZERO;
    for item in items {
        match item {
            Val::Number(n) => match total.checked_add(*n) {
                Some(sum) => total = sum,
                None => return Val::error("number overflow"),
            },
            other => return expected("number", other),
        }
    }
    Val::Number(total)
}

fn flatten_into(items: &[Val], flat: &mut Vec<Val>) {
    for item in items {
        match item {
            Val::List(nested) => flatten_into(nested, flat),
            other => flat.push(other.clone()),
        }
    }
}

fn sublist(args: &[Val]) -> Val {
    with_list(&args[0], |items| {
        with_number(&args[1], |start| {
            let Some(start) = start.trunc().to_i64() else {
                return Val::error("number overflow");
            };
            let begin = match start {
                0 => return Val::Null,
                s if s > 0 => (s - 1) as usize,
                s => {
                    let from_end = items.len() as i64 + s;
                    if from_end < 0 {
                        return Val::List(Vec::new());
                    }
                    from_end as usize
                }
            };

            let taken: Vec<Val> = match args.get(2) {
                None => items.iter().skip(begin).cloned().collect(),
                Some(Val::Number(length)) => {
                    let Some(length) = length.trunc().to_i64() else {
                        return Val::error("number overflow");
                    };
                    if length < 0 {
                        return Val::Null;
                    }
                    items.iter().skip(begin).take(length as usize).cloned().collect()
                }
                Some(other) => return expected("number", other),
            };
            Val::List(taken)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: i64) -> Val {
        Val::Number(Decimal::from(n))
    }

    #[test]
    fn test_pick_min_max() {
        let items = vec![num(3), num(1), num(2)];
        assert_eq!(pick(&items, Ordering::Less), num(1));
        assert_eq!(pick(&items, Ordering::Greater), num(3));
        assert_eq!(pick(&[], Ordering::Less), Val::Null);
        assert!(pick(&[num(1), Val::Boolean(true)], Ordering::Less).is_error());
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum(&[num(1), num(2), num(3)]), num(6));
        assert_eq!(sum(&[]), Val::Null);
        assert!(sum(&[num(1), Val::String("x".into())]).is_error());
    }

    #[test]
    fn test_flatten() {
        let nested = vec![num(1), Val::List(vec![num(2), Val::List(vec![num(3)])])];
        let mut flat = Vec::new();
        flatten_into(&nested, &mut flat);
        assert_eq!(flat, vec![num(1), num(2), num(3)]);
    }

    #[test]
    fn test_sublist() {
        let list = Val::List(vec![num(1), num(2), num(3), num(4)]);
        assert_eq!(
            sublist(&[list.clone(), num(2)]),
            Val::List(vec![num(2), num(3), num(4)])
        );
        assert_eq!(
            sublist(&[list.clone(), num(2), num(2)]),
            Val::List(vec![num(2), num(3)])
        );
        assert_eq!(sublist(&[list, num(-1)]), Val::List(vec![num(4)]));
    }
}

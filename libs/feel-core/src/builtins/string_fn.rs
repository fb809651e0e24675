//! String built-ins.
//!
//! Positions are 1-based and character-oriented, per the FEEL convention; a
//! negative start position counts from the end. The pattern functions
//! (`matches`, `replace`, `split`) sit behind the `regex` feature.

use super::{expected, native, with_number, with_string};
use crate::context::ContextBuilder;
use crate::value::Val;
use rust_decimal::prelude::ToPrimitive;

pub(crate) fn register(builder: &mut ContextBuilder) {
    builder.add_function(
        "substring",
        native(&["string", "start position"], false, substring),
    );
    builder.add_function(
        "substring",
        native(&["string", "start position", "length"], false, substring),
    );

    builder.add_function(
        "string length",
        native(&["string"], false, |args| {
            with_string(&args[0], |s| {
                Val::Number(rust_decimal::Decimal::from(s.chars().count() as u64))
            })
        }),
    );
    builder.add_function(
        "upper case",
        native(&["string"], false, |args| {
            with_string(&args[0], |s| Val::String(s.to_uppercase()))
        }),
    );
    builder.add_function(
        "lower case",
        native(&["string"], false, |args| {
            with_string(&args[0], |s| Val::String(s.to_lowercase()))
        }),
    );

    builder.add_function(
        "contains",
        native(&["string", "match"], false, |args| {
            with_string(&args[0], |s| {
                with_string(&args[1], |needle| Val::Boolean(s.contains(needle)))
            })
        }),
    );
    builder.add_function(
        "starts with",
        native(&["string", "match"], false, |args| {
            with_string(&args[0], |s| {
                with_string(&args[1], |prefix| Val::Boolean(s.starts_with(prefix)))
            })
        }),
    );
    builder.add_function(
        "ends with",
        native(&["string", "match"], false, |args| {
            with_string(&args[0], |s| {
                with_string(&args[1], |suffix| Val::Boolean(s.ends_with(suffix)))
            })
        }),
    );

    #[cfg(feature = "regex")]
    {
        builder.add_function(
            "matches",
            native(&["input", "pattern"], false, |args| {
                with_string(&args[0], |input| {
                    with_string(&args[1], |pattern| {
                        with_regex(pattern, |re| Val::Boolean(re.is_match(input)))
                    })
                })
            }),
        );
        builder.add_function(
            "replace",
            native(&["input", "pattern", "replacement"], false, |args| {
                with_string(&args[0], |input| {
                    with_string(&args[1], |pattern| {
                        with_string(&args[2], |replacement| {
                            with_regex(pattern, |re| {
                                Val::String(re.replace_all(input, replacement).into_owned())
                            })
                        })
                    })
                })
            }),
        );
        builder.add_function(
            "split",
            native(&["string", "delimiter"], false, |args| {
                with_string(&args[0], |s| {
                    with_string(&args[1], |delimiter| {
                        with_regex(delimiter, |re| {
                            Val::List(re.split(s).map(|part| Val::String(part.to_string())).collect())
                        })
                    })
                })
            }),
        );
    }
}

fn substring(args: &[Val]) -> Val {
    with_string(&args[0], |s| {
        with_number(&args[1], |start| {
            let chars: Vec<char> = s.chars().collect();
            let Some(start) = start.trunc().to_i64() else {
                return Val::error("number overflow");
            };
            let begin = match start {
                0 => return Val::Null,
                s if s > 0 => (s - 1) as usize,
                s => {
                    let from_end = chars.len() as i64 + s;
                    if from_end < 0 {
                        return Val::String(String::new());
                    }
                    from_end as usize
                }
            };

            let taken: String = match args.get(2) {
                None => chars.iter().skip(begin).collect(),
                Some(Val::Number(length)) => {
                    let Some(length) = length.trunc().to_i64() else {
                        return Val::error("number overflow");
                    };
                    if length < 0 {
                        return Val::Null;
                    }
                    chars.iter().skip(begin).take(length as usize).collect()
                }
                Some(other) => return expected("number", other),
            };
            Val::String(taken)
        })
    })
}

#[cfg(feature = "regex")]
fn with_regex(pattern: &str, f: impl FnOnce(&regex::Regex) -> Val) -> Val {
    match regex::Regex::new(pattern) {
        Ok(re) => f(&re),
        Err(_) => Val::error(format!("invalid pattern '{}'", pattern)),
    }
}

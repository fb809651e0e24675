//! Standard FEEL built-in functions.
//!
//! Built-ins are ordinary [`FunctionVal`] entries registered in a root
//! context's function map; callers extend or shadow them like any other
//! binding. Implementations are native closures over already-evaluated
//! argument values (the invoker propagates argument errors before a body
//! runs, so helpers here only deal with well-formed values and `null`).

pub mod conversion;
pub mod list;
pub mod numeric;
pub mod string_fn;

use crate::context::{Context, ContextBuilder};
use crate::ops::logic;
use crate::value::{FunctionBody, FunctionVal, Val};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Root context with the complete built-in library registered.
pub fn root_context() -> Context {
    let mut builder = Context::builder();
    register(&mut builder);
    builder.build()
}

/// Register every built-in family into `builder`.
pub fn register(builder: &mut ContextBuilder) {
    conversion::register(builder);
    numeric::register(builder);
    string_fn::register(builder);
    list::register(builder);

    // boolean
    builder.add_function(
        "not",
        native(&["negand"], false, |args| {
            logic::negate(&args[0]).unwrap_or(Val::Null)
        }),
    );
}

/// Build a native function value.
pub(crate) fn native(
    params: &[&str],
    variadic: bool,
    body: impl Fn(&[Val]) -> Val + Send + Sync + 'static,
) -> FunctionVal {
    FunctionVal {
        params: params.iter().map(|p| Arc::from(*p)).collect(),
        variadic,
        require_input: false,
        body: FunctionBody::Native(Arc::new(body)),
    }
}

pub(crate) fn expected(kind: &str, found: &Val) -> Val {
    Val::error(format!("expected {} but found '{}'", kind, found))
}

pub(crate) fn with_number(value: &Val, f: impl FnOnce(Decimal) -> Val) -> Val {
    match value {
        Val::Number(n) => f(*n),
        other => expected("number", other),
    }
}

pub(crate) fn with_string(value: &Val, f: impl FnOnce(&str) -> Val) -> Val {
    match value {
        Val::String(s) => f(s),
        other => expected("string", other),
    }
}

pub(crate) fn with_list(value: &Val, f: impl FnOnce(&[Val]) -> Val) -> Val {
    match value {
        Val::List(items) => f(items),
        other => expected("list", other),
    }
}

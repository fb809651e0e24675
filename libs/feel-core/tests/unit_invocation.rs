//! Unit tests for function resolution, argument binding, and the host
//! bridge contract (driven through a stub registry).

use feel_core::{
    Context, Evaluator, Exp, FunctionBody, FunctionParameters, FunctionVal, HostMethod,
    StaticHostBridge, Val, DEFAULT_INPUT_VARIABLE,
};
use serde_json::json;
use std::sync::Arc;

mod test_support;
use test_support::{add, call, dec, list, lit, num};

#[test]
fn test_qualified_invocation_on_context_literal() {
    // {f: function(x) x+1}.f(4)
    let definition = Exp::FunctionDefinition {
        params: vec![Arc::from("x")],
        body: Box::new(add(Exp::name("x"), lit(1))),
    };
    let exp = Exp::QualifiedFunctionInvocation {
        path: Box::new(Exp::ContextEntries(vec![(Arc::from("f"), definition)])),
        function: Arc::from("f"),
        params: FunctionParameters::Positional(vec![lit(4)]),
    };
    assert_eq!(test_support::eval(&exp), num(5));
}

#[test]
fn test_function_closes_over_definition_context() {
    let definition = Exp::FunctionDefinition {
        params: vec![Arc::from("x")],
        body: Box::new(add(Exp::name("x"), Exp::name("y"))),
    };
    let definition_ctx = Context::new().with_variable("y", num(10));
    let function = match feel_core::evaluate(&definition, &definition_ctx) {
        Val::Function(f) => f,
        other => panic!("expected function, found {:?}", other),
    };

    // the caller context has no `y`; the closure provides it
    let mut caller = Context::builder();
    caller.add_function("f", function);
    let caller = caller.build();
    assert_eq!(
        feel_core::evaluate(
            &call("f", vec![lit(4)]),
            &caller
        ),
        num(14)
    );
}

#[test]
fn test_named_parameters_bind_by_name() {
    let definition = Exp::FunctionDefinition {
        params: vec![Arc::from("a"), Arc::from("b")],
        body: Box::new(Exp::Subtraction {
            left: Box::new(Exp::name("a")),
            right: Box::new(Exp::name("b")),
        }),
    };
    let mut ctx = Context::builder();
    ctx.add_function(
        "minus",
        match feel_core::evaluate(&definition, &Context::new()) {
            Val::Function(f) => f,
            other => panic!("expected function, found {:?}", other),
        },
    );
    let ctx = ctx.build();

    let exp = Exp::FunctionInvocation {
        function: Arc::from("minus"),
        params: FunctionParameters::Named(vec![
            (Arc::from("b"), lit(1)),
            (Arc::from("a"), lit(5)),
        ]),
    };
    assert_eq!(feel_core::evaluate(&exp, &ctx), num(4));

    // a missing named parameter binds null; number - null is the defensive
    // arithmetic path
    let partial = Exp::FunctionInvocation {
        function: Arc::from("minus"),
        params: FunctionParameters::Named(vec![(Arc::from("a"), lit(5))]),
    };
    assert_eq!(feel_core::evaluate(&partial, &ctx), Val::Null);
}

#[test]
fn test_unknown_function_error_message() {
    assert_eq!(
        test_support::eval(&call("nope", vec![lit(1)])),
        Val::error("no function found with name 'nope' and 1 parameters")
    );

    let named = Exp::FunctionInvocation {
        function: Arc::from("nope"),
        params: FunctionParameters::Named(vec![(Arc::from("a"), lit(1))]),
    };
    assert_eq!(
        test_support::eval(&named),
        Val::error("no function found with name 'nope' and parameters [a]")
    );
}

#[test]
fn test_overload_resolution_by_arity() {
    // date("2021-06-01") vs date(2021, 6, 1)
    let from_string = call("date", vec![Exp::string("2021-06-01")]);
    let from_parts = call("date", vec![lit(2021), lit(6), lit(1)]);
    assert_eq!(test_support::eval(&from_string), test_support::eval(&from_parts));
}

#[test]
fn test_variadic_builtins_accept_spread_and_list() {
    assert_eq!(test_support::eval(&call("min", vec![lit(3), lit(1), lit(2)])), num(1));
    assert_eq!(
        test_support::eval(&call("min", vec![list(vec![lit(3), lit(1), lit(2)])])),
        num(1)
    );
    assert_eq!(test_support::eval(&call("min", vec![lit(5)])), num(5));
    assert_eq!(test_support::eval(&call("sum", vec![lit(1), lit(2), lit(3)])), num(6));
    assert_eq!(test_support::eval(&call("mean", vec![lit(1), lit(2), lit(3)])), num(2));
    assert_eq!(
        test_support::eval(&call(
            "concatenate",
            vec![list(vec![lit(1)]), list(vec![lit(2)])]
        )),
        Val::List(vec![num(1), num(2)])
    );
    assert_eq!(
        test_support::eval(&call("append", vec![list(vec![lit(1)]), lit(2), lit(3)])),
        Val::List(vec![num(1), num(2), num(3)])
    );
}

#[test]
fn test_builtin_conversions() {
    assert_eq!(
        test_support::eval(&call("number", vec![Exp::string("1.5")])),
        dec("1.5")
    );
    assert_eq!(
        test_support::eval(&call("string", vec![lit(42)])),
        Val::String("42".into())
    );
    match test_support::eval(&call("duration", vec![Exp::string("P1Y6M")])) {
        Val::YearMonthDuration(d) => assert_eq!(d.total_months(), 18),
        other => panic!("expected year-month duration, found {:?}", other),
    }
    match test_support::eval(&call("duration", vec![Exp::string("PT90S")])) {
        Val::DayTimeDuration(d) => assert_eq!(d.total_millis(), 90_000),
        other => panic!("expected day-time duration, found {:?}", other),
    }
}

#[test]
fn test_argument_errors_propagate_before_the_body_runs() {
    let exp = call(
        "string length",
        vec![Exp::Division {
            left: Box::new(lit(1)),
            right: Box::new(lit(0)),
        }],
    );
    assert_eq!(test_support::eval(&exp), Val::error("division by zero"));
}

#[test]
fn test_implicit_input_is_prepended() {
    let shift = FunctionVal {
        params: vec![Arc::from("input"), Arc::from("delta")],
        variadic: false,
        require_input: true,
        body: FunctionBody::Native(Arc::new(|args: &[Val]| match (&args[0], &args[1]) {
            (Val::Number(a), Val::Number(b)) => Val::Number(a + b),
            _ => Val::error("expected numbers"),
        })),
    };
    let mut builder = Context::builder();
    builder.add_function("shift", shift);
    let ctx = builder.build().with_variable(DEFAULT_INPUT_VARIABLE, num(10));

    // one visible parameter; the input fills the first declared slot
    assert_eq!(
        feel_core::evaluate(&call("shift", vec![lit(5)]), &ctx),
        num(15)
    );
}

// ============================================
// Host bridge
// ============================================

fn math_bridge() -> StaticHostBridge {
    let mut bridge = StaticHostBridge::new();
    bridge.register(
        "java.lang.Math",
        HostMethod::new("max", &["long", "long"], |args| {
            let a = args[0].as_i64().ok_or("argument is not a long")?;
            let b = args[1].as_i64().ok_or("argument is not a long")?;
            Ok(json!(a.max(b)))
        }),
    );
    bridge.register(
        "java.lang.Math",
        HostMethod::new("failing", &[], |_| Err("boom".to_string())),
    );
    bridge
}

fn host_function(class: &str, method: &str, arg_types: &[&str], params: &[&str]) -> Exp {
    Exp::FunctionDefinition {
        params: params.iter().map(|p| Arc::from(*p)).collect(),
        body: Box::new(Exp::HostFunctionInvocation {
            class_name: class.to_string(),
            method_name: method.to_string(),
            arg_types: arg_types.iter().map(|t| Arc::from(*t)).collect(),
        }),
    }
}

fn host_evaluator() -> Evaluator {
    Evaluator::new().with_bridge(Arc::new(math_bridge()))
}

fn ctx_with_function(name: &str, definition: &Exp, evaluator: &Evaluator) -> Context {
    let mut builder = Context::builder();
    match evaluator.evaluate(definition, &Context::new()) {
        Val::Function(f) => builder.add_function(name, f),
        other => panic!("expected function, found {:?}", other),
    };
    builder.build()
}

#[test]
fn test_host_function_invocation() {
    let evaluator = host_evaluator();
    let definition = host_function("java.lang.Math", "max", &["long", "long"], &["a", "b"]);
    let ctx = ctx_with_function("max", &definition, &evaluator);

    assert_eq!(
        evaluator.evaluate(&call("max", vec![lit(3), lit(7)]), &ctx),
        num(7)
    );
}

#[test]
fn test_host_class_not_found() {
    let evaluator = host_evaluator();
    let definition = host_function("com.example.Missing", "max", &[], &[]);
    let ctx = ctx_with_function("f", &definition, &evaluator);

    assert_eq!(
        evaluator.evaluate(&call("f", vec![]), &ctx),
        Val::error("fail to load class 'com.example.Missing'")
    );
}

#[test]
fn test_host_method_not_found() {
    let evaluator = host_evaluator();
    let definition = host_function("java.lang.Math", "min", &["long", "long"], &["a", "b"]);
    let ctx = ctx_with_function("f", &definition, &evaluator);

    assert_eq!(
        evaluator.evaluate(&call("f", vec![lit(1), lit(2)]), &ctx),
        Val::error(
            "fail to get method with name 'min' and arguments 'long, long' from class 'java.lang.Math'"
        )
    );
}

#[test]
fn test_host_invocation_failure() {
    let evaluator = host_evaluator();
    let definition = host_function("java.lang.Math", "failing", &[], &[]);
    let ctx = ctx_with_function("f", &definition, &evaluator);

    assert_eq!(
        evaluator.evaluate(&call("f", vec![]), &ctx),
        Val::error("fail to invoke method with name 'failing' from class 'java.lang.Math': boom")
    );
}

#[test]
fn test_host_marker_outside_function_body_is_error() {
    let exp = Exp::HostFunctionInvocation {
        class_name: "java.lang.Math".to_string(),
        method_name: "max".to_string(),
        arg_types: vec![],
    };
    assert!(test_support::eval(&exp).is_error());
}

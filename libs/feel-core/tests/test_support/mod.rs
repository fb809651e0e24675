#![allow(dead_code)]

use feel_core::{builtins, CollectingSink, Context, Evaluator, Exp, Val, Warning};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

/// Root context with the standard built-ins registered.
pub fn root_context() -> Context {
    builtins::root_context()
}

/// Evaluate against the built-in root context.
pub fn eval(exp: &Exp) -> Val {
    feel_core::evaluate(exp, &root_context())
}

/// Evaluate and capture the emitted warning records.
pub fn eval_collecting(exp: &Exp, ctx: &Context) -> (Val, Vec<Warning>) {
    let sink = Arc::new(CollectingSink::new());
    let evaluator = Evaluator::new().with_warning_sink(sink.clone());
    let result = evaluator.evaluate(exp, ctx);
    (result, sink.records())
}

// ============================================
// Value shorthands
// ============================================

pub fn num(n: i64) -> Val {
    Val::Number(Decimal::from(n))
}

pub fn dec(s: &str) -> Val {
    Val::Number(Decimal::from_str(s).expect("valid decimal literal"))
}

// ============================================
// AST shorthands
// ============================================

pub fn lit(n: i64) -> Exp {
    Exp::number(n)
}

pub fn lit_dec(s: &str) -> Exp {
    Exp::ConstNumber(Decimal::from_str(s).expect("valid decimal literal"))
}

pub fn add(left: Exp, right: Exp) -> Exp {
    Exp::Addition {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn sub(left: Exp, right: Exp) -> Exp {
    Exp::Subtraction {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn mul(left: Exp, right: Exp) -> Exp {
    Exp::Multiplication {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn div(left: Exp, right: Exp) -> Exp {
    Exp::Division {
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn call(name: &str, args: Vec<Exp>) -> Exp {
    Exp::FunctionInvocation {
        function: Arc::from(name),
        params: feel_core::FunctionParameters::Positional(args),
    }
}

pub fn list(items: Vec<Exp>) -> Exp {
    Exp::ListEntries(items)
}

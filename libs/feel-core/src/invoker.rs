//! Function invocation: overload resolution, argument binding, and the
//! host-function bridge orchestration.
//!
//! Positional calls resolve by (name, arity), named calls by (name, exact
//! parameter-name set). Variadic functions bind their fixed parameters first
//! and collect the remaining arguments into a list; a single already-list
//! argument to a one-parameter variadic function passes through as-is.
//! Named calls bind `null` for parameters the caller leaves out. Evaluated
//! argument errors propagate instead of reaching the function body.

use crate::ast::{Exp, FunctionParameters};
use crate::context::Context;
use crate::eval::Evaluator;
use crate::value::{FunctionBody, FunctionVal, Val};
use smallvec::SmallVec;
use std::sync::Arc;

type Args = SmallVec<[Val; 4]>;

impl Evaluator {
    /// Invoke `name` resolved in `resolution`, evaluating arguments in
    /// `caller`. The two contexts differ for qualified invocations, where the
    /// overloads live in the evaluated target context.
    pub(crate) fn invoke(
        &self,
        resolution: &Context,
        caller: &Context,
        name: &Arc<str>,
        params: &FunctionParameters,
    ) -> Val {
        match params {
            FunctionParameters::Positional(exprs) => {
                let Some(function) = resolution.resolve_positional(name, exprs.len()) else {
                    return Val::error(format!(
                        "no function found with name '{}' and {} parameters",
                        name,
                        exprs.len()
                    ));
                };
                match self.bind_positional(&function, exprs, caller) {
                    Ok(args) => self.apply(&function, args, caller),
                    Err(error) => error,
                }
            }
            FunctionParameters::Named(pairs) => {
                let names: Vec<Arc<str>> = pairs.iter().map(|(name, _)| name.clone()).collect();
                let Some(function) = resolution.resolve_named(name, &names) else {
                    let supplied = names
                        .iter()
                        .map(|name| name.as_ref())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Val::error(format!(
                        "no function found with name '{}' and parameters [{}]",
                        name, supplied
                    ));
                };
                match self.bind_named(&function, pairs, caller) {
                    Ok(args) => self.apply(&function, args, caller),
                    Err(error) => error,
                }
            }
        }
    }

    fn bind_positional(
        &self,
        function: &FunctionVal,
        exprs: &[Exp],
        caller: &Context,
    ) -> Result<Args, Val> {
        let mut args = Args::new();

        if function.variadic {
            let fixed = function.visible_params().len().saturating_sub(1);
            for exp in exprs.iter().take(fixed) {
                args.push(checked(self.eval(exp, caller))?);
            }
            let mut rest = Vec::with_capacity(exprs.len().saturating_sub(fixed));
            for exp in exprs.iter().skip(fixed) {
                rest.push(checked(self.eval(exp, caller))?);
            }
            // a lone list argument to a single-parameter variadic function is
            // taken as the collected list itself
            let packed = if rest.len() == 1
                && matches!(rest[0], Val::List(_))
                && function.visible_params().len() == 1
            {
                rest.into_iter().next().expect("length checked")
            } else {
                Val::List(rest)
            };
            args.push(packed);
        } else {
            for exp in exprs {
                args.push(checked(self.eval(exp, caller))?);
            }
        }

        Ok(args)
    }

    fn bind_named(
        &self,
        function: &FunctionVal,
        pairs: &[(Arc<str>, Exp)],
        caller: &Context,
    ) -> Result<Args, Val> {
        let mut args = Args::new();
        for param in function.visible_params() {
            match pairs.iter().find(|(name, _)| name == param) {
                Some((_, exp)) => args.push(checked(self.eval(exp, caller))?),
                None => args.push(Val::Null),
            }
        }
        Ok(args)
    }

    fn apply(&self, function: &FunctionVal, mut args: Args, caller: &Context) -> Val {
        if function.require_input {
            args.insert(0, caller.input_value().unwrap_or(Val::Null));
        }

        match &function.body {
            FunctionBody::Native(native) => (**native)(&args),
            FunctionBody::Expression { body, closure } => {
                let bindings = function
                    .params
                    .iter()
                    .cloned()
                    .zip(args.iter().cloned());
                let scope = closure.with_variables(bindings);
                self.eval(body, &scope)
            }
            FunctionBody::Host {
                class_name,
                method_name,
                arg_types,
            } => self.invoke_host(class_name, method_name, arg_types, &args),
        }
    }

    /// The five bridge steps: resolve, unpack, invoke, pack.
    fn invoke_host(
        &self,
        class_name: &str,
        method_name: &str,
        arg_types: &[Arc<str>],
        args: &[Val],
    ) -> Val {
        let host_fn = match self.bridge.resolve(class_name, method_name, arg_types) {
            Ok(host_fn) => host_fn,
            Err(error) => return Val::error(error.to_string()),
        };

        let mut unpacked = Vec::with_capacity(args.len());
        for arg in args {
            match self.mapper.unpack_val(arg) {
                Ok(raw) => unpacked.push(raw),
                Err(error) => return Val::error(error.to_string()),
            }
        }

        match (*host_fn)(&unpacked) {
            Ok(result) => self.mapper.to_val(&result),
            Err(reason) => Val::error(
                crate::error::Error::InvocationFailed {
                    class: class_name.to_string(),
                    method: method_name.to_string(),
                    reason,
                }
                .to_string(),
            ),
        }
    }
}

fn checked(value: Val) -> Result<Val, Val> {
    if value.is_error() {
        Err(value)
    } else {
        Ok(value)
    }
}

//! The evaluator: a total recursive dispatcher from AST node kind to value.
//!
//! `eval(exp, ctx)` never panics and never suspends; every failure surfaces
//! as `Val::Error` or, for the defensive arithmetic paths, as `Val::Null`
//! plus a warning record. The context is threaded implicitly: iteration,
//! filters, `in` tests, and function bodies evaluate in derived contexts and
//! never mutate the caller's.
//!
//! The three consumed interfaces (value mapper, host bridge, warning sink)
//! are bundled behind `Arc` so a configured evaluator is `Send + Sync` and a
//! single instance can serve concurrent calls over shared ASTs and contexts.

use crate::ast::Exp;
use crate::bridge::{HostBridge, NoHostBridge};
use crate::context::Context;
use crate::mapper::{JsonValueMapper, ValueMapper};
use crate::ops::{arithmetic, compare, logic};
use crate::value::{FunctionBody, FunctionVal, Val};
use crate::warning::{TracingSink, Warning, WarningKind, WarningSink};
use std::sync::Arc;

/// Evaluate an expression against a context with default collaborators
/// (JSON value mapper, no host bridge, warnings to `tracing`).
pub fn evaluate(exp: &Exp, ctx: &Context) -> Val {
    Evaluator::default().evaluate(exp, ctx)
}

/// FEEL expression evaluator.
pub struct Evaluator {
    pub(crate) mapper: Arc<dyn ValueMapper>,
    pub(crate) bridge: Arc<dyn HostBridge>,
    pub(crate) warnings: Arc<dyn WarningSink>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            mapper: Arc::new(JsonValueMapper),
            bridge: Arc::new(NoHostBridge),
            warnings: Arc::new(TracingSink),
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapper(mut self, mapper: Arc<dyn ValueMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn HostBridge>) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_warning_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.warnings = sink;
        self
    }

    /// Evaluate `exp` in `ctx`. Total: always returns exactly one value.
    pub fn evaluate(&self, exp: &Exp, ctx: &Context) -> Val {
        self.eval(exp, ctx)
    }

    pub(crate) fn eval(&self, exp: &Exp, ctx: &Context) -> Val {
        match exp {
            // ============================================
            // Literals
            // ============================================
            Exp::ConstNumber(n) => Val::Number(*n),
            Exp::ConstBool(b) => Val::Boolean(*b),
            Exp::ConstString(s) => Val::String(s.clone()),
            Exp::ConstDate(d) => Val::Date(*d),
            Exp::ConstLocalTime(t) => Val::LocalTime(*t),
            Exp::ConstTime(t) => Val::Time(*t),
            Exp::ConstLocalDateTime(dt) => Val::LocalDateTime(*dt),
            Exp::ConstDateTime(dt) => Val::DateTime(*dt),
            Exp::ConstYearMonthDuration(d) => Val::YearMonthDuration(*d),
            Exp::ConstDayTimeDuration(d) => Val::DayTimeDuration(*d),
            Exp::ConstNull => Val::Null,

            // ============================================
            // Unary tests
            // ============================================
            Exp::InputEqualTo(operand) => self.unary_test(ctx, operand, compare::equal),
            Exp::InputLessThan(operand) => self.unary_test(ctx, operand, compare::less_than),
            Exp::InputLessOrEqual(operand) => self.unary_test(ctx, operand, compare::less_or_equal),
            Exp::InputGreaterThan(operand) => self.unary_test(ctx, operand, compare::greater_than),
            Exp::InputGreaterOrEqual(operand) => {
                self.unary_test(ctx, operand, compare::greater_or_equal)
            }

            Exp::Interval { start, end } => {
                let input = match ctx.input_value() {
                    Some(input) => input,
                    None => return Val::error("no input value available"),
                };
                let start_value = self.eval(&start.value, ctx);
                let end_value = self.eval(&end.value, ctx);
                compare::in_interval(&input, &start_value, start.kind, &end_value, end.kind)
            }

            // ============================================
            // Arithmetic (type mismatches are null + warning)
            // ============================================
            Exp::Addition { left, right } => {
                let x = self.eval(left, ctx);
                let y = self.eval(right, ctx);
                self.with_val_or_null(arithmetic::add(&x, &y), || {
                    format!("can not add '{}' and '{}'", x, y)
                })
            }
            Exp::Subtraction { left, right } => {
                let x = self.eval(left, ctx);
                let y = self.eval(right, ctx);
                self.with_val_or_null(arithmetic::sub(&x, &y), || {
                    format!("can not subtract '{}' from '{}'", y, x)
                })
            }
            Exp::Multiplication { left, right } => {
                let x = self.eval(left, ctx);
                let y = self.eval(right, ctx);
                self.with_val_or_null(arithmetic::mul(&x, &y), || {
                    format!("can not multiply '{}' by '{}'", x, y)
                })
            }
            Exp::Division { left, right } => {
                let x = self.eval(left, ctx);
                let y = self.eval(right, ctx);
                self.with_val_or_null(arithmetic::div(&x, &y), || {
                    format!("can not divide '{}' by '{}'", x, y)
                })
            }
            Exp::Exponentiation { base, exponent } => {
                let x = self.eval(base, ctx);
                let y = self.eval(exponent, ctx);
                self.with_val_or_null(arithmetic::pow(&x, &y), || {
                    format!("can not raise '{}' to '{}'", x, y)
                })
            }
            Exp::ArithmeticNegation(operand) => {
                let x = self.eval(operand, ctx);
                self.with_val_or_null(arithmetic::negate(&x), || {
                    format!("can not negate '{}'", x)
                })
            }

            // ============================================
            // Comparisons (type mismatches are errors)
            // ============================================
            Exp::Equal { left, right } => {
                compare::equal(&self.eval(left, ctx), &self.eval(right, ctx))
            }
            Exp::NotEqual { left, right } => {
                compare::not_equal(&self.eval(left, ctx), &self.eval(right, ctx))
            }
            Exp::LessThan { left, right } => {
                compare::less_than(&self.eval(left, ctx), &self.eval(right, ctx))
            }
            Exp::LessOrEqual { left, right } => {
                compare::less_or_equal(&self.eval(left, ctx), &self.eval(right, ctx))
            }
            Exp::GreaterThan { left, right } => {
                compare::greater_than(&self.eval(left, ctx), &self.eval(right, ctx))
            }
            Exp::GreaterOrEqual { left, right } => {
                compare::greater_or_equal(&self.eval(left, ctx), &self.eval(right, ctx))
            }

            // ============================================
            // Combinators: every operand is evaluated, a later boolean can
            // still decide the outcome
            // ============================================
            Exp::AtLeastOne(operands) => {
                let values: Vec<Val> = operands.iter().map(|e| self.eval(e, ctx)).collect();
                logic::at_least_one(&values)
            }
            Exp::Disjunction { left, right } => {
                let values = [self.eval(left, ctx), self.eval(right, ctx)];
                logic::at_least_one(&values)
            }
            Exp::Conjunction { left, right } => {
                let values = [self.eval(left, ctx), self.eval(right, ctx)];
                logic::all(&values)
            }
            Exp::Not(operand) => {
                let value = self.eval(operand, ctx);
                match logic::negate(&value) {
                    Some(result) => result,
                    None => {
                        self.warn(
                            WarningKind::InvalidNegand,
                            format!("expected boolean but found '{}'", value),
                        );
                        Val::Null
                    }
                }
            }

            // ============================================
            // Control
            // ============================================
            Exp::If {
                condition,
                then,
                otherwise,
            } => match self.eval(condition, ctx) {
                Val::Boolean(true) => self.eval(then, ctx),
                Val::Boolean(false) => self.eval(otherwise, ctx),
                other => {
                    self.warn(
                        WarningKind::InvalidCondition,
                        format!(
                            "expected boolean condition but found '{}'; treating it as false",
                            other
                        ),
                    );
                    self.eval(otherwise, ctx)
                }
            },

            Exp::In { value, test } => {
                let probe = self.eval(value, ctx);
                let input_key = ctx.input_variable_name();
                let scope = ctx.with_variable(input_key, probe);
                self.eval(test, &scope)
            }

            Exp::InstanceOf { value, type_name } => match self.eval(value, ctx) {
                error @ Val::Error(_) => error,
                value => Val::Boolean(value.type_name() == type_name),
            },

            // ============================================
            // Naming
            // ============================================
            Exp::Ref(names) => {
                let Some((first, rest)) = names.split_first() else {
                    return Val::error("empty reference");
                };
                let mut value = match ctx.variable(first) {
                    Some(value) => value,
                    None => return Val::error(format!("no variable found for name '{}'", first)),
                };
                for key in rest {
                    value = self.path_access(&value, key);
                }
                value
            }

            Exp::Path { expression, key } => {
                let value = self.eval(expression, ctx);
                self.path_access(&value, key)
            }

            // ============================================
            // Lists and iteration
            // ============================================
            Exp::SomeItem {
                iterators,
                condition,
            } => match self.eval_iteration(ctx, iterators, condition) {
                Ok(values) => logic::at_least_one(&values),
                Err(error) => error,
            },
            Exp::EveryItem {
                iterators,
                condition,
            } => match self.eval_iteration(ctx, iterators, condition) {
                Ok(values) => logic::all(&values),
                Err(error) => error,
            },
            Exp::For { iterators, result } => match self.eval_iteration(ctx, iterators, result) {
                Ok(values) => Val::List(values),
                Err(error) => error,
            },

            Exp::Filter { list, condition } => match self.eval(list, ctx) {
                error @ Val::Error(_) => error,
                Val::List(items) => {
                    let mut kept = Vec::new();
                    for item in items {
                        let mut scope = ctx.with_variable("item", item.clone());
                        if let Val::Context(item_ctx) = &item {
                            scope = scope.combine(item_ctx);
                        }
                        if self.eval(condition, &scope) == Val::Boolean(true) {
                            kept.push(item);
                        }
                    }
                    Val::List(kept)
                }
                other => Val::error(format!("expected list but found '{}'", other)),
            },

            // item errors stay in place so filters and quantifiers can
            // inspect the elements individually
            Exp::ListEntries(entries) => {
                Val::List(entries.iter().map(|e| self.eval(e, ctx)).collect())
            }

            // entries fold left to right; later entries see earlier ones
            Exp::ContextEntries(entries) => {
                let mut result = Context::builder();
                let mut scope = ctx.clone();
                for (key, exp) in entries {
                    match self.eval(exp, &scope) {
                        Val::Function(function) => {
                            result.add_function(key.clone(), function.clone());
                            scope = scope.with_function(key.clone(), function);
                        }
                        value => {
                            result.set_variable(key.clone(), value.clone());
                            scope = scope.with_variable(key.clone(), value);
                        }
                    }
                }
                Val::Context(result.build())
            }

            // ============================================
            // Functions
            // ============================================
            Exp::FunctionDefinition { params, body } => {
                let function_body = match body.as_ref() {
                    Exp::HostFunctionInvocation {
                        class_name,
                        method_name,
                        arg_types,
                    } => FunctionBody::Host {
                        class_name: class_name.clone(),
                        method_name: method_name.clone(),
                        arg_types: arg_types.clone(),
                    },
                    _ => FunctionBody::Expression {
                        body: Arc::new((**body).clone()),
                        closure: ctx.clone(),
                    },
                };
                Val::Function(FunctionVal {
                    params: params.clone(),
                    variadic: false,
                    require_input: false,
                    body: function_body,
                })
            }

            Exp::FunctionInvocation { function, params } => self.invoke(ctx, ctx, function, params),

            Exp::QualifiedFunctionInvocation {
                path,
                function,
                params,
            } => match self.eval(path, ctx) {
                error @ Val::Error(_) => error,
                Val::Context(target) => self.invoke(&target, ctx, function, params),
                other => Val::error(format!("expected context but found '{}'", other)),
            },

            Exp::HostFunctionInvocation { .. } => {
                Val::error("host function invocation is only valid as a function body")
            }
        }
    }

    fn unary_test(
        &self,
        ctx: &Context,
        operand: &Exp,
        test: impl FnOnce(&Val, &Val) -> Val,
    ) -> Val {
        let input = match ctx.input_value() {
            Some(input) => input,
            None => return Val::error("no input value available"),
        };
        let operand = self.eval(operand, ctx);
        test(&input, &operand)
    }

    /// Evaluate iterators left to right, then the body once per combination
    /// of the cartesian product. The last iterator varies fastest.
    fn eval_iteration(
        &self,
        ctx: &Context,
        iterators: &[(Arc<str>, Exp)],
        body: &Exp,
    ) -> Result<Vec<Val>, Val> {
        let mut lists: Vec<(Arc<str>, Vec<Val>)> = Vec::with_capacity(iterators.len());
        for (name, exp) in iterators {
            match self.eval(exp, ctx) {
                Val::List(items) => lists.push((name.clone(), items)),
                error @ Val::Error(_) => return Err(error),
                other => return Err(Val::error(format!("expected list but found '{}'", other))),
            }
        }

        let mut results = Vec::new();
        if lists.iter().any(|(_, items)| items.is_empty()) {
            return Ok(results);
        }

        let mut indices = vec![0usize; lists.len()];
        loop {
            let bindings = lists
                .iter()
                .zip(indices.iter())
                .map(|((name, items), i)| (name.clone(), items[*i].clone()));
            let scope = ctx.with_variables(bindings);
            results.push(self.eval(body, &scope));

            // odometer increment from the right
            let mut position = lists.len();
            loop {
                if position == 0 {
                    return Ok(results);
                }
                position -= 1;
                indices[position] += 1;
                if indices[position] < lists[position].1.len() {
                    break;
                }
                indices[position] = 0;
            }
        }
    }

    fn path_access(&self, value: &Val, key: &str) -> Val {
        match value {
            Val::Error(_) => value.clone(),
            Val::Context(ctx) => ctx
                .variable(key)
                .unwrap_or_else(|| Val::error(format!("context contains no entry with key '{}'", key))),
            Val::List(items) => Val::List(items.iter().map(|item| self.path_access(item, key)).collect()),
            other => Val::error(format!("expected context but found '{}'", other)),
        }
    }

    fn with_val_or_null(&self, result: Option<Val>, message: impl FnOnce() -> String) -> Val {
        match result {
            Some(value) => value,
            None => {
                self.warn(WarningKind::InvalidType, message());
                Val::Null
            }
        }
    }

    pub(crate) fn warn(&self, kind: WarningKind, message: String) {
        self.warnings.emit(Warning::new(kind, message));
    }
}

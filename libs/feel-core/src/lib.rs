//! FEEL expression interpreter core.
//!
//! This crate evaluates parsed FEEL (Friendly Enough Expression Language)
//! expression trees against a composable evaluation context, implementing the
//! DMN operator semantics for arithmetic, comparisons, unary tests, list
//! comprehensions, context access, and function invocation.
//!
//! # Architecture Overview
//!
//! ```text
//! Expression tree (ast) + Context (variables, function overloads)
//!      |
//!   Evaluator -> recursive type-directed dispatch (ops)
//!      |
//!   Val (twelve-kind value universe) or Val::Error
//! ```
//!
//! The evaluator is total: it never panics and never returns a Rust error.
//! Hard failures (mismatched comparisons, unknown names, missing overloads,
//! division by zero) surface as [`Val::Error`] and propagate; defensive
//! failures (arithmetic type mismatches, non-boolean `if` conditions and
//! `not` operands) evaluate to `null` and emit a [`Warning`] record.
//!
//! Host interaction is isolated behind two injected seams: a [`ValueMapper`]
//! packs values across the boundary and a [`HostBridge`] resolves platform
//! methods for host-backed functions. Everything else is pure and safe to
//! share across threads.

pub mod ast;
pub mod bridge;
pub mod builtins;
pub mod context;
pub mod error;
pub mod eval;
mod invoker;
pub mod mapper;
pub mod ops;
mod temporal;
pub mod value;
pub mod warning;

// Re-export main types
pub use ast::{Bound, BoundKind, Exp, FunctionParameters};
pub use bridge::{HostBridge, HostFn, HostMethod, NoHostBridge, StaticHostBridge};
pub use context::{Context, ContextBuilder, DEFAULT_INPUT_VARIABLE, INPUT_VARIABLE_NAME};
pub use error::{Error, Result};
pub use eval::{evaluate, Evaluator};
pub use mapper::{JsonValueMapper, ValueMapper};
pub use value::{DayTimeDuration, FunctionBody, FunctionVal, NativeFn, Val, YearMonthDuration, ZonedTime};
pub use warning::{CollectingSink, TracingSink, Warning, WarningKind, WarningSink};

//! Operator semantics: pure per-type rules for arithmetic, comparison, and
//! the three-valued logical combinators.
//!
//! Each function is a total match over the value universe. Arithmetic
//! signals "outside the dispatch table" by returning `None` so the evaluator
//! can apply the null-with-warning policy; comparisons return `Boolean` or
//! `Error` directly.

pub mod arithmetic;
pub mod compare;
pub mod logic;

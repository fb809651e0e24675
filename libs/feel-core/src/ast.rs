//! Abstract syntax tree consumed by the evaluator.
//!
//! The tree is produced by an external parser and is immutable here. Node
//! kinds enumerate exactly the FEEL expression forms the evaluator dispatches
//! on: literals for each value variant, the five unary-test nodes plus
//! intervals, arithmetic, comparisons, the three-valued combinators, control
//! forms (`if`, `in`, `instance of`), naming (references, path access),
//! list forms (`some`, `every`, `for`, filters, list and context literals),
//! and the function forms (definition, positional/named invocation, qualified
//! invocation, host-function invocation).

use crate::value::{DayTimeDuration, YearMonthDuration, ZonedTime};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::sync::Arc;

/// AST node representing a FEEL expression
#[derive(Debug, Clone, PartialEq)]
pub enum Exp {
    // ============================================
    // Literals (one per value variant)
    // ============================================
    ConstNumber(Decimal),
    ConstBool(bool),
    ConstString(String),
    ConstDate(NaiveDate),
    ConstLocalTime(NaiveTime),
    ConstTime(ZonedTime),
    ConstLocalDateTime(NaiveDateTime),
    ConstDateTime(DateTime<FixedOffset>),
    ConstYearMonthDuration(YearMonthDuration),
    ConstDayTimeDuration(DayTimeDuration),
    ConstNull,

    // ============================================
    // Unary tests (compare the implicit input)
    // ============================================
    InputEqualTo(Box<Exp>),
    InputLessThan(Box<Exp>),
    InputLessOrEqual(Box<Exp>),
    InputGreaterThan(Box<Exp>),
    InputGreaterOrEqual(Box<Exp>),

    /// Interval test: `[a..b]`, `(a..b)`, and the half-open forms
    Interval { start: Bound, end: Bound },

    // ============================================
    // Arithmetic
    // ============================================
    Addition { left: Box<Exp>, right: Box<Exp> },
    Subtraction { left: Box<Exp>, right: Box<Exp> },
    Multiplication { left: Box<Exp>, right: Box<Exp> },
    Division { left: Box<Exp>, right: Box<Exp> },
    Exponentiation { base: Box<Exp>, exponent: Box<Exp> },
    ArithmeticNegation(Box<Exp>),

    // ============================================
    // Comparisons
    // ============================================
    Equal { left: Box<Exp>, right: Box<Exp> },
    NotEqual { left: Box<Exp>, right: Box<Exp> },
    LessThan { left: Box<Exp>, right: Box<Exp> },
    LessOrEqual { left: Box<Exp>, right: Box<Exp> },
    GreaterThan { left: Box<Exp>, right: Box<Exp> },
    GreaterOrEqual { left: Box<Exp>, right: Box<Exp> },

    // ============================================
    // Combinators (three-valued logic)
    // ============================================
    /// Comma-separated unary tests: true if at least one operand is true
    AtLeastOne(Vec<Exp>),
    Not(Box<Exp>),
    Disjunction { left: Box<Exp>, right: Box<Exp> },
    Conjunction { left: Box<Exp>, right: Box<Exp> },

    // ============================================
    // Control
    // ============================================
    If {
        condition: Box<Exp>,
        then: Box<Exp>,
        otherwise: Box<Exp>,
    },

    /// `value in test`: evaluates `test` with the implicit input bound to
    /// the evaluated `value`
    In { value: Box<Exp>, test: Box<Exp> },

    InstanceOf {
        value: Box<Exp>,
        type_name: String,
    },

    // ============================================
    // Naming
    // ============================================
    /// Qualified reference `a.b.c`: the first name resolves in the context,
    /// the rest thread path access
    Ref(Vec<Arc<str>>),

    /// Single-name access applied to an evaluated value
    Path {
        expression: Box<Exp>,
        key: Arc<str>,
    },

    // ============================================
    // Lists and iteration
    // ============================================
    SomeItem {
        iterators: Vec<(Arc<str>, Exp)>,
        condition: Box<Exp>,
    },
    EveryItem {
        iterators: Vec<(Arc<str>, Exp)>,
        condition: Box<Exp>,
    },
    For {
        iterators: Vec<(Arc<str>, Exp)>,
        result: Box<Exp>,
    },
    Filter {
        list: Box<Exp>,
        condition: Box<Exp>,
    },
    ListEntries(Vec<Exp>),
    ContextEntries(Vec<(Arc<str>, Exp)>),

    // ============================================
    // Functions
    // ============================================
    FunctionDefinition {
        params: Vec<Arc<str>>,
        body: Box<Exp>,
    },
    FunctionInvocation {
        function: Arc<str>,
        params: FunctionParameters,
    },
    QualifiedFunctionInvocation {
        path: Box<Exp>,
        function: Arc<str>,
        params: FunctionParameters,
    },
    /// Marker body for functions backed by a platform method; carries the
    /// reflective signature handed to the host bridge
    HostFunctionInvocation {
        class_name: String,
        method_name: String,
        arg_types: Vec<Arc<str>>,
    },
}

/// Actual parameters of an invocation
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionParameters {
    Positional(Vec<Exp>),
    Named(Vec<(Arc<str>, Exp)>),
}

/// Interval endpoint kind: `[`/`]` is closed, `(`/`)` is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Open,
    Closed,
}

/// Interval endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Bound {
    pub value: Box<Exp>,
    pub kind: BoundKind,
}

impl Bound {
    pub fn open(value: Exp) -> Self {
        Self {
            value: Box::new(value),
            kind: BoundKind::Open,
        }
    }

    pub fn closed(value: Exp) -> Self {
        Self {
            value: Box::new(value),
            kind: BoundKind::Closed,
        }
    }
}

impl Exp {
    /// Shorthand for a number literal from an integer
    pub fn number(n: i64) -> Exp {
        Exp::ConstNumber(Decimal::from(n))
    }

    /// Shorthand for a string literal
    pub fn string(s: impl Into<String>) -> Exp {
        Exp::ConstString(s.into())
    }

    /// Shorthand for a single-name reference
    pub fn name(name: impl Into<Arc<str>>) -> Exp {
        Exp::Ref(vec![name.into()])
    }
}

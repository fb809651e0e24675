//! The FEEL value universe.
//!
//! Every evaluation yields exactly one [`Val`] variant; there is no
//! "undefined". The universe is closed: twelve value kinds plus the function
//! and error carriers, matched exhaustively by the operator semantics so the
//! compiler enforces completeness of the dispatch matrix.
//!
//! Temporal payloads are `chrono` types. FEEL distinguishes two time-of-day
//! forms (with and without an offset) and two disjoint duration kinds
//! (year-month and day-time); the offset-carrying time and both durations get
//! small dedicated payload types here.

use crate::ast::Exp;
use crate::context::Context;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Time-of-day with a fixed UTC offset.
///
/// Equality is field-wise (`10:00:00+02:00` and `09:00:00+01:00` are distinct
/// values); ordering compares the equivalent instant, with the offset as a
/// tie-breaker so it stays consistent with equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedTime {
    pub time: NaiveTime,
    pub offset: FixedOffset,
}

impl ZonedTime {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }

    /// Nanoseconds since midnight UTC of the same day. May be negative.
    pub fn normalized_nanos(&self) -> i64 {
        let since_midnight = self.time.num_seconds_from_midnight() as i64 * 1_000_000_000
            + self.time.nanosecond() as i64;
        since_midnight - self.offset.local_minus_utc() as i64 * 1_000_000_000
    }
}

impl Ord for ZonedTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized_nanos()
            .cmp(&other.normalized_nanos())
            .then_with(|| self.offset.local_minus_utc().cmp(&other.offset.local_minus_utc()))
    }
}

impl PartialOrd for ZonedTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ZonedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time.format("%H:%M:%S"), self.offset)
    }
}

/// Period in whole months, kept normalized (no separate years field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct YearMonthDuration {
    months: i64,
}

impl YearMonthDuration {
    pub fn new(years: i64, months: i64) -> Self {
        Self {
            months: years * 12 + months,
        }
    }

    pub fn from_months(months: i64) -> Self {
        Self { months }
    }

    pub fn total_months(&self) -> i64 {
        self.months
    }

    pub fn years_part(&self) -> i64 {
        self.months / 12
    }

    pub fn months_part(&self) -> i64 {
        self.months % 12
    }
}

impl fmt::Display for YearMonthDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months == 0 {
            return write!(f, "P0M");
        }
        if self.months < 0 {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        let years = self.years_part().abs();
        let months = self.months_part().abs();
        if years > 0 {
            write!(f, "{}Y", years)?;
        }
        if months > 0 {
            write!(f, "{}M", months)?;
        }
        Ok(())
    }
}

/// Duration in seconds and nanoseconds, disjoint from [`YearMonthDuration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayTimeDuration(pub Duration);

impl Default for DayTimeDuration {
    fn default() -> Self {
        Self(Duration::zero())
    }
}

impl DayTimeDuration {
    pub fn new(duration: Duration) -> Self {
        Self(duration)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn total_millis(&self) -> i64 {
        self.0.num_milliseconds()
    }
}

impl fmt::Display for DayTimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0.num_milliseconds();
        if millis == 0 {
            return write!(f, "PT0S");
        }
        if millis < 0 {
            write!(f, "-")?;
        }
        let millis = millis.abs();
        let days = millis / 86_400_000;
        let hours = millis / 3_600_000 % 24;
        let minutes = millis / 60_000 % 60;
        let seconds = millis / 1_000 % 60;
        let sub_millis = millis % 1_000;

        write!(f, "P")?;
        if days > 0 {
            write!(f, "{}D", days)?;
        }
        if hours > 0 || minutes > 0 || seconds > 0 || sub_millis > 0 {
            write!(f, "T")?;
            if hours > 0 {
                write!(f, "{}H", hours)?;
            }
            if minutes > 0 {
                write!(f, "{}M", minutes)?;
            }
            if sub_millis > 0 {
                write!(f, "{}.{:03}S", seconds, sub_millis)?;
            } else if seconds > 0 {
                write!(f, "{}S", seconds)?;
            }
        }
        Ok(())
    }
}

/// Native implementation of a built-in or host-registered function.
pub type NativeFn = Arc<dyn Fn(&[Val]) -> Val + Send + Sync>;

/// Body of a [`FunctionVal`].
///
/// A function defined in an expression closes over its definition context.
/// A host marker carries the reflective signature; the invoker hands it to the
/// configured bridge instead of evaluating anything.
#[derive(Clone)]
pub enum FunctionBody {
    Expression { body: Arc<Exp>, closure: Context },
    Native(NativeFn),
    Host {
        class_name: String,
        method_name: String,
        arg_types: Vec<Arc<str>>,
    },
}

impl fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionBody::Expression { body, .. } => {
                f.debug_struct("Expression").field("body", body).finish()
            }
            FunctionBody::Native(_) => f.write_str("Native(..)"),
            FunctionBody::Host {
                class_name,
                method_name,
                ..
            } => f
                .debug_struct("Host")
                .field("class_name", class_name)
                .field("method_name", method_name)
                .finish(),
        }
    }
}

impl PartialEq for FunctionBody {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                FunctionBody::Expression { body: a, .. },
                FunctionBody::Expression { body: b, .. },
            ) => Arc::ptr_eq(a, b),
            (FunctionBody::Native(a), FunctionBody::Native(b)) => Arc::ptr_eq(a, b),
            (
                FunctionBody::Host {
                    class_name: ca,
                    method_name: ma,
                    arg_types: ta,
                },
                FunctionBody::Host {
                    class_name: cb,
                    method_name: mb,
                    arg_types: tb,
                },
            ) => ca == cb && ma == mb && ta == tb,
            _ => false,
        }
    }
}

/// A FEEL function value: parameter names, variadic flag, input-required
/// flag, and the invocation body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionVal {
    pub params: Vec<Arc<str>>,
    pub variadic: bool,
    pub require_input: bool,
    pub body: FunctionBody,
}

impl FunctionVal {
    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameters a caller supplies. When the implicit input is required it
    /// occupies the first declared slot and is injected by the invoker, so it
    /// is invisible to call-site matching.
    pub fn visible_params(&self) -> &[Arc<str>] {
        if self.require_input && !self.params.is_empty() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// Whether a positional call with `arg_count` arguments matches.
    pub fn matches_arity(&self, arg_count: usize) -> bool {
        let visible = self.visible_params().len();
        if self.variadic {
            arg_count + 1 >= visible
        } else {
            arg_count == visible
        }
    }

    /// Whether a named call supplying exactly `names` matches.
    pub fn matches_param_names(&self, names: &[Arc<str>]) -> bool {
        let visible = self.visible_params();
        visible.len() == names.len() && visible.iter().all(|p| names.contains(p))
    }
}

/// A FEEL runtime value.
#[derive(Debug, Clone)]
pub enum Val {
    Number(Decimal),
    Boolean(bool),
    String(String),
    Date(NaiveDate),
    LocalTime(NaiveTime),
    Time(ZonedTime),
    LocalDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    YearMonthDuration(YearMonthDuration),
    DayTimeDuration(DayTimeDuration),
    Null,
    List(Vec<Val>),
    Context(Context),
    Function(FunctionVal),
    Error(String),
}

impl Val {
    pub fn error(message: impl Into<String>) -> Val {
        Val::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Val::Error(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Val::Null)
    }

    /// Canonical FEEL type name, as tested by `instance of`.
    ///
    /// Both time-of-day forms share `time` and both date-time forms share
    /// `date time` (with the space).
    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Number(_) => "number",
            Val::Boolean(_) => "boolean",
            Val::String(_) => "string",
            Val::Date(_) => "date",
            Val::LocalTime(_) | Val::Time(_) => "time",
            Val::LocalDateTime(_) | Val::DateTime(_) => "date time",
            Val::YearMonthDuration(_) => "year-month-duration",
            Val::DayTimeDuration(_) => "day-time-duration",
            Val::Null => "null",
            Val::List(_) => "list",
            Val::Context(_) => "context",
            Val::Function(_) => "function",
            Val::Error(_) => "error",
        }
    }
}

impl PartialEq for Val {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Val::Number(a), Val::Number(b)) => a == b,
            (Val::Boolean(a), Val::Boolean(b)) => a == b,
            (Val::String(a), Val::String(b)) => a == b,
            (Val::Date(a), Val::Date(b)) => a == b,
            (Val::LocalTime(a), Val::LocalTime(b)) => a == b,
            (Val::Time(a), Val::Time(b)) => a == b,
            (Val::LocalDateTime(a), Val::LocalDateTime(b)) => a == b,
            (Val::DateTime(a), Val::DateTime(b)) => a == b,
            (Val::YearMonthDuration(a), Val::YearMonthDuration(b)) => a == b,
            (Val::DayTimeDuration(a), Val::DayTimeDuration(b)) => a == b,
            (Val::Null, Val::Null) => true,
            (Val::List(a), Val::List(b)) => a == b,
            (Val::Context(a), Val::Context(b)) => a == b,
            (Val::Function(a), Val::Function(b)) => a == b,
            (Val::Error(a), Val::Error(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Number(n) => write!(f, "{}", n),
            Val::Boolean(b) => write!(f, "{}", b),
            Val::String(s) => write!(f, "{}", s),
            Val::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Val::LocalTime(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Val::Time(t) => write!(f, "{}", t),
            Val::LocalDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Val::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%:z")),
            Val::YearMonthDuration(d) => write!(f, "{}", d),
            Val::DayTimeDuration(d) => write!(f, "{}", d),
            Val::Null => write!(f, "null"),
            Val::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Val::Context(ctx) => {
                write!(f, "{{")?;
                let mut entries: Vec<_> = ctx.flat_variables().into_iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                write!(f, "}}")
            }
            Val::Function(func) => {
                write!(f, "function(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")")
            }
            Val::Error(message) => write!(f, "error(\"{}\")", message),
        }
    }
}

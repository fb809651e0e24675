//! Conversion built-ins: `string()`, `number()`, `date()`, `time()`,
//! `date and time()`, `duration()`.
//!
//! Temporal arguments accept FEEL literal strings and already-typed values;
//! string rendering goes through the values' literal `Display` forms.

use super::{expected, native, with_number};
use crate::context::ContextBuilder;
use crate::temporal::{self, ParsedDateTime, ParsedDuration, ParsedTime};
use crate::value::{Val, ZonedTime};
use chrono::{NaiveDateTime, TimeZone};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

pub(crate) fn register(builder: &mut ContextBuilder) {
    builder.add_function(
        "string",
        native(&["from"], false, |args| match &args[0] {
            Val::Null => Val::Null,
            value => Val::String(value.to_string()),
        }),
    );

    builder.add_function(
        "number",
        native(&["from"], false, |args| match &args[0] {
            Val::Number(n) => Val::Number(*n),
            Val::String(s) => Decimal::from_str(s.trim())
                .map(Val::Number)
                .unwrap_or_else(|_| Val::error(format!("can not parse '{}' as a number", s))),
            other => expected("string", other),
        }),
    );

    builder.add_function("date", native(&["from"], false, |args| date_from(&args[0])));
    builder.add_function(
        "date",
        native(&["year", "month", "day"], false, |args| {
            with_number(&args[0], |year| {
                with_number(&args[1], |month| {
                    with_number(&args[2], |day| {
                        let parts = (
                            year.trunc().to_i32(),
                            month.trunc().to_u32(),
                            day.trunc().to_u32(),
                        );
                        match parts {
                            (Some(year), Some(month), Some(day)) => {
                                chrono::NaiveDate::from_ymd_opt(year, month, day)
                                    .map(Val::Date)
                                    .unwrap_or_else(|| {
                                        Val::error(format!(
                                            "invalid date ({}, {}, {})",
                                            year, month, day
                                        ))
                                    })
                            }
                            _ => Val::error("invalid date"),
                        }
                    })
                })
            })
        }),
    );

    builder.add_function("time", native(&["from"], false, |args| time_from(&args[0])));

    builder.add_function(
        "date and time",
        native(&["from"], false, |args| date_and_time_from(&args[0])),
    );
    builder.add_function(
        "date and time",
        native(&["date", "time"], false, |args| {
            let date = match &args[0] {
                Val::Date(date) => *date,
                Val::LocalDateTime(dt) => dt.date(),
                other => return expected("date", other),
            };
            match &args[1] {
                Val::LocalTime(time) => Val::LocalDateTime(NaiveDateTime::new(date, *time)),
                Val::Time(zoned) => zoned
                    .offset
                    .from_local_datetime(&NaiveDateTime::new(date, zoned.time))
                    .single()
                    .map(Val::DateTime)
                    .unwrap_or_else(|| Val::error("invalid date and time")),
                other => expected("time", other),
            }
        }),
    );

    builder.add_function(
        "duration",
        native(&["from"], false, |args| match &args[0] {
            Val::YearMonthDuration(d) => Val::YearMonthDuration(*d),
            Val::DayTimeDuration(d) => Val::DayTimeDuration(*d),
            Val::String(s) => match temporal::parse_duration(s) {
                Some(ParsedDuration::YearMonth(d)) => Val::YearMonthDuration(d),
                Some(ParsedDuration::DayTime(d)) => Val::DayTimeDuration(d),
                None => Val::error(format!("can not parse '{}' as a duration", s)),
            },
            other => expected("string", other),
        }),
    );
}

fn date_from(value: &Val) -> Val {
    match value {
        Val::Date(date) => Val::Date(*date),
        Val::LocalDateTime(dt) => Val::Date(dt.date()),
        Val::DateTime(dt) => Val::Date(dt.date_naive()),
        Val::String(s) => temporal::parse_date(s)
            .map(Val::Date)
            .unwrap_or_else(|| Val::error(format!("can not parse '{}' as a date", s))),
        other => expected("string or date time", other),
    }
}

fn time_from(value: &Val) -> Val {
    match value {
        Val::LocalTime(time) => Val::LocalTime(*time),
        Val::Time(zoned) => Val::Time(*zoned),
        Val::LocalDateTime(dt) => Val::LocalTime(dt.time()),
        Val::DateTime(dt) => Val::Time(ZonedTime::new(dt.time(), *dt.offset())),
        Val::String(s) => match temporal::parse_time(s) {
            Some(ParsedTime::Local(time)) => Val::LocalTime(time),
            Some(ParsedTime::Zoned(zoned)) => Val::Time(zoned),
            None => Val::error(format!("can not parse '{}' as a time", s)),
        },
        other => expected("string or date time", other),
    }
}

fn date_and_time_from(value: &Val) -> Val {
    match value {
        Val::LocalDateTime(dt) => Val::LocalDateTime(*dt),
        Val::DateTime(dt) => Val::DateTime(*dt),
        Val::String(s) => match temporal::parse_date_time(s) {
            Some(ParsedDateTime::Local(dt)) => Val::LocalDateTime(dt),
            Some(ParsedDateTime::Zoned(dt)) => Val::DateTime(dt),
            None => Val::error(format!("can not parse '{}' as a date and time", s)),
        },
        other => expected("string or date time", other),
    }
}

//! Value mapper: the bidirectional binding between FEEL values and the host
//! representation exchanged with platform methods.
//!
//! Only the host-function bridge consumes this. The default implementation
//! binds to `serde_json::Value`; hosts with richer type systems supply their
//! own mapper.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::value::Val;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Packs host values into FEEL values and unpacks them back.
pub trait ValueMapper: Send + Sync {
    /// Convert a host value into a FEEL value.
    fn to_val(&self, raw: &serde_json::Value) -> Val;

    /// Convert a FEEL value into a host value.
    fn unpack_val(&self, value: &Val) -> Result<serde_json::Value>;
}

/// Default mapper over JSON values.
///
/// Temporals and durations unpack to their FEEL literal strings; incoming
/// strings stay strings (the conversion built-ins exist for explicit
/// temporal parsing).
#[derive(Debug, Default)]
pub struct JsonValueMapper;

impl ValueMapper for JsonValueMapper {
    fn to_val(&self, raw: &serde_json::Value) -> Val {
        match raw {
            serde_json::Value::Null => Val::Null,
            serde_json::Value::Bool(b) => Val::Boolean(*b),
            serde_json::Value::Number(n) => match Decimal::from_str(&n.to_string()) {
                Ok(decimal) => Val::Number(decimal),
                Err(_) => Val::error(format!("can not map number '{}'", n)),
            },
            serde_json::Value::String(s) => Val::String(s.clone()),
            serde_json::Value::Array(items) => {
                Val::List(items.iter().map(|item| self.to_val(item)).collect())
            }
            serde_json::Value::Object(entries) => {
                let mut builder = Context::builder();
                for (key, value) in entries {
                    builder.set_variable(key.as_str(), self.to_val(value));
                }
                Val::Context(builder.build())
            }
        }
    }

    fn unpack_val(&self, value: &Val) -> Result<serde_json::Value> {
        match value {
            Val::Null => Ok(serde_json::Value::Null),
            Val::Boolean(b) => Ok(serde_json::Value::Bool(*b)),
            Val::Number(n) => unpack_number(n),
            Val::String(s) => Ok(serde_json::Value::String(s.clone())),

            Val::Date(_)
            | Val::LocalTime(_)
            | Val::Time(_)
            | Val::LocalDateTime(_)
            | Val::DateTime(_)
            | Val::YearMonthDuration(_)
            | Val::DayTimeDuration(_) => Ok(serde_json::Value::String(value.to_string())),

            Val::List(items) => {
                let mut unpacked = Vec::with_capacity(items.len());
                for item in items {
                    unpacked.push(self.unpack_val(item)?);
                }
                Ok(serde_json::Value::Array(unpacked))
            }

            Val::Context(ctx) => {
                let mut entries: Vec<_> = ctx.flat_variables().into_iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                let mut object = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries {
                    object.insert(key.to_string(), self.unpack_val(&value)?);
                }
                Ok(serde_json::Value::Object(object))
            }

            Val::Function(_) => Err(Error::MappingError(
                "can not unpack function value".to_string(),
            )),
            Val::Error(message) => Err(Error::MappingError(format!(
                "can not unpack error value: {}",
                message
            ))),
        }
    }
}

fn unpack_number(n: &Decimal) -> Result<serde_json::Value> {
    if n.fract().is_zero() {
        if let Some(i) = n.to_i64() {
            return Ok(serde_json::Value::Number(i.into()));
        }
    }
    n.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .ok_or_else(|| Error::MappingError(format!("can not unpack number '{}'", n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let mapper = JsonValueMapper;
        let raw = json!({"name": "order", "amount": 12.5, "open": true, "tags": ["a", "b"], "ref": null});
        let val = mapper.to_val(&raw);
        assert_eq!(mapper.unpack_val(&val).unwrap(), raw);
    }

    #[test]
    fn test_temporals_unpack_to_literals() {
        let mapper = JsonValueMapper;
        let date = Val::Date(NaiveDate::from_ymd_opt(2021, 3, 4).unwrap());
        assert_eq!(mapper.unpack_val(&date).unwrap(), json!("2021-03-04"));
    }

    #[test]
    fn test_function_and_error_do_not_unpack() {
        let mapper = JsonValueMapper;
        assert!(mapper.unpack_val(&Val::error("boom")).is_err());
    }

    #[test]
    fn test_object_maps_to_context() {
        let mapper = JsonValueMapper;
        let val = mapper.to_val(&json!({"a": 1}));
        match val {
            Val::Context(ctx) => {
                assert_eq!(ctx.variable("a"), Some(Val::Number(Decimal::ONE)));
            }
            other => panic!("expected context, found {:?}", other),
        }
    }
}

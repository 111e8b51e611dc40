//! Expression evaluation over JSON values.

use super::parser::{Builtin, CompareOp, Expr};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Evaluate `expr` against `input`.
///
/// # Errors
///
/// Returns a jq-style message for type errors such as indexing a string.
pub fn evaluate(expr: &Expr, input: &Value) -> Result<Value, String> {
    match expr {
        Expr::Identity => Ok(input.clone()),
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Array(items) => items
            .iter()
            .map(|item| evaluate(item, input))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Index(target, key) => {
            let target = evaluate(target, input)?;
            let key = evaluate(key, input)?;
            index(&target, &key)
        }
        Expr::Compare(op, lhs, rhs) => {
            let ordering = compare(&evaluate(lhs, input)?, &evaluate(rhs, input)?);
            Ok(Value::Bool(match op {
                CompareOp::Eq => ordering == Ordering::Equal,
                CompareOp::Ne => ordering != Ordering::Equal,
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Ge => ordering != Ordering::Less,
            }))
        }
        Expr::And(lhs, rhs) => Ok(Value::Bool(
            is_truthy(&evaluate(lhs, input)?) && is_truthy(&evaluate(rhs, input)?),
        )),
        Expr::Or(lhs, rhs) => Ok(Value::Bool(
            is_truthy(&evaluate(lhs, input)?) || is_truthy(&evaluate(rhs, input)?),
        )),
        Expr::Pipe(lhs, rhs) => evaluate(rhs, &evaluate(lhs, input)?),
        Expr::Call(builtin, argument) => {
            let argument = argument
                .as_deref()
                .map(|arg| evaluate(arg, input))
                .transpose()?;
            call(*builtin, input, argument.as_ref())
        }
    }
}

/// `false` and `null` are falsy; everything else is truthy.
#[must_use]
pub const fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(value: &Value) -> String {
    format!("{} ({value})", type_name(value))
}

fn index(target: &Value, key: &Value) -> Result<Value, String> {
    match (target, key) {
        (Value::Null, Value::String(_) | Value::Number(_)) => Ok(Value::Null),
        (Value::Object(map), Value::String(name)) => {
            Ok(map.get(name).cloned().unwrap_or(Value::Null))
        }
        (Value::Array(items), Value::Number(n)) => {
            let Some(n) = n.as_f64() else {
                return Ok(Value::Null);
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let position = if n < 0.0 {
                items.len() as i64 + n.floor() as i64
            } else {
                n.floor() as i64
            };
            Ok(usize::try_from(position)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Null))
        }
        (target, Value::String(name)) => Err(format!(
            "Cannot index {} with \"{name}\"",
            type_name(target)
        )),
        (target, key) => Err(format!(
            "Cannot index {} with {}",
            type_name(target),
            type_name(key)
        )),
    }
}

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Total order across JSON values:
/// null < false < true < numbers < strings < arrays < objects.
#[must_use]
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y)
            .map(|(a, b)| compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Object(x), Value::Object(y)) => compare_objects(x, y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Objects compare by their sorted key sets first, then value by value.
fn compare_objects(x: &Map<String, Value>, y: &Map<String, Value>) -> Ordering {
    let mut x_keys: Vec<&String> = x.keys().collect();
    let mut y_keys: Vec<&String> = y.keys().collect();
    x_keys.sort();
    y_keys.sort();

    x_keys.cmp(&y_keys).then_with(|| {
        x_keys
            .iter()
            .map(|key| compare(&x[key.as_str()], &y[key.as_str()]))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

fn call(builtin: Builtin, input: &Value, argument: Option<&Value>) -> Result<Value, String> {
    let name = builtin.name();
    match (builtin, argument) {
        (Builtin::Not, _) => Ok(Value::Bool(!is_truthy(input))),
        (Builtin::Length, _) => length(input),
        (Builtin::Has, Some(key)) => has(input, key),
        (Builtin::Contains, Some(needle)) => contains(input, needle).map(Value::Bool),
        (Builtin::StartsWith, Some(Value::String(prefix))) => match input {
            Value::String(s) => Ok(Value::Bool(s.starts_with(prefix.as_str()))),
            _ => Err(format!("{name}() requires string inputs")),
        },
        (Builtin::EndsWith, Some(Value::String(suffix))) => match input {
            Value::String(s) => Ok(Value::Bool(s.ends_with(suffix.as_str()))),
            _ => Err(format!("{name}() requires string inputs")),
        },
        (Builtin::StartsWith | Builtin::EndsWith, Some(_)) => {
            Err(format!("{name}() requires string inputs"))
        }
        (_, None) => Err(format!("{name}/0 is not defined")),
    }
}

fn length(input: &Value) -> Result<Value, String> {
    Ok(match input {
        Value::Null => Value::from(0),
        Value::Bool(_) => return Err(format!("{} has no length", describe(input))),
        Value::Number(n) => n
            .as_f64()
            .and_then(|n| serde_json::Number::from_f64(n.abs()))
            .map_or(Value::Null, Value::Number),
        Value::String(s) => Value::from(s.chars().count()),
        Value::Array(items) => Value::from(items.len()),
        Value::Object(map) => Value::from(map.len()),
    })
}

#[allow(clippy::cast_precision_loss)]
fn has(input: &Value, key: &Value) -> Result<Value, String> {
    match (input, key) {
        (Value::Object(map), Value::String(name)) => Ok(Value::Bool(map.contains_key(name))),
        (Value::Array(items), Value::Number(n)) => Ok(Value::Bool(
            n.as_f64()
                .is_some_and(|n| n >= 0.0 && n < items.len() as f64),
        )),
        _ => Err(format!(
            "Cannot check whether {} has a {} key",
            type_name(input),
            type_name(key)
        )),
    }
}

fn contains(haystack: &Value, needle: &Value) -> Result<bool, String> {
    if type_rank(haystack) != type_rank(needle) {
        return Err(format!(
            "{} and {} cannot have their containment checked",
            describe(haystack),
            describe(needle)
        ));
    }
    Ok(value_contains(haystack, needle))
}

/// Containment below the top level: a kind mismatch is simply `false`.
fn value_contains(haystack: &Value, needle: &Value) -> bool {
    if type_rank(haystack) != type_rank(needle) {
        return false;
    }
    match (haystack, needle) {
        (Value::String(h), Value::String(n)) => h.contains(n.as_str()),
        (Value::Array(h), Value::Array(n)) => n
            .iter()
            .all(|wanted| h.iter().any(|item| value_contains(item, wanted))),
        (Value::Object(h), Value::Object(n)) => n
            .iter()
            .all(|(key, wanted)| h.get(key).is_some_and(|value| value_contains(value, wanted))),
        (h, n) => compare(h, n) == Ordering::Equal,
    }
}

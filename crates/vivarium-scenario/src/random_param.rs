//! `random(a, b, ...)` template parameters.
//!
//! Generator templates may use a string of the form `"random(...)"` anywhere a
//! value is expected. Each generated entity draws its own value:
//!
//! | arguments | result |
//! |---|---|
//! | two integers | uniform integer in `[a, b]` |
//! | two numbers, at least one with a fraction | uniform float in `[a, b)` |
//! | anything else (two or more) | one of the arguments, uniformly |
//!
//! Choice arguments that look like numbers are produced as JSON numbers.

use rand::Rng;
use serde_json::Value;

use crate::ScenarioError;

/// A parsed `random(...)` expression.
#[derive(Debug, Clone, PartialEq)]
pub enum RandomParam {
    Int { low: i64, high: i64 },
    Float { low: f64, high: f64 },
    Choice(Vec<Value>),
}

impl RandomParam {
    /// Parse a full `random(...)` expression. Returns `Ok(None)` when `text`
    /// is not a random expression at all.
    pub fn parse_expression(text: &str) -> Result<Option<Self>, ScenarioError> {
        let trimmed = text.trim();
        let Some(inner) = trimmed
            .strip_prefix("random(")
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            return Ok(None);
        };
        Self::parse_arguments(inner).map(Some)
    }

    /// Parse the comma separated argument list of a `random(...)` expression.
    pub fn parse_arguments(arguments: &str) -> Result<Self, ScenarioError> {
        let args: Vec<&str> = arguments.split(',').map(str::trim).collect();
        if args.len() < 2 || args.iter().any(|a| a.is_empty()) {
            return Err(ScenarioError::InvalidRandomParam {
                expression: arguments.to_owned(),
                reason: "at least two non-empty arguments are required".to_owned(),
            });
        }

        if let [a, b] = args[..] {
            match (Literal::parse(a), Literal::parse(b)) {
                (Literal::Int(low), Literal::Int(high)) => {
                    return Self::ordered(arguments, low, high)
                        .map(|(low, high)| RandomParam::Int { low, high });
                }
                (Literal::Int(_) | Literal::Float(_), Literal::Int(_) | Literal::Float(_)) => {
                    let (low, high) = (parse_f64(a), parse_f64(b));
                    return Self::ordered(arguments, low, high)
                        .map(|(low, high)| RandomParam::Float { low, high });
                }
                _ => {}
            }
        }

        Ok(RandomParam::Choice(args.into_iter().map(|a| Literal::parse(a).into_value()).collect()))
    }

    fn ordered<T: PartialOrd>(expression: &str, low: T, high: T) -> Result<(T, T), ScenarioError> {
        if low > high {
            return Err(ScenarioError::InvalidRandomParam {
                expression: expression.to_owned(),
                reason: "lower bound is greater than upper bound".to_owned(),
            });
        }
        Ok((low, high))
    }

    /// Draw one value.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Value {
        match self {
            RandomParam::Int { low, high } => Value::from(rng.gen_range(*low..=*high)),
            RandomParam::Float { low, high } => {
                let value = if low == high { *low } else { rng.gen_range(*low..*high) };
                Value::from(value)
            }
            RandomParam::Choice(options) => options[rng.gen_range(0..options.len())].clone(),
        }
    }
}

enum Literal<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl<'a> Literal<'a> {
    fn parse(text: &'a str) -> Self {
        if let Ok(i) = text.parse::<i64>() {
            Literal::Int(i)
        } else if let Some(f) = text.parse::<f64>().ok().filter(|f| f.is_finite()) {
            Literal::Float(f)
        } else {
            Literal::Text(text)
        }
    }

    fn into_value(self) -> Value {
        match self {
            Literal::Int(i) => Value::from(i),
            Literal::Float(f) => Value::from(f),
            Literal::Text(s) => Value::from(s),
        }
    }
}

fn parse_f64(text: &str) -> f64 {
    text.parse().unwrap_or(0.0)
}

/// Replace every `random(...)` string inside `value`, recursively.
pub fn expand<R: Rng>(value: &Value, rng: &mut R) -> Result<Value, ScenarioError> {
    Ok(match value {
        Value::String(text) => match RandomParam::parse_expression(text)? {
            Some(param) => param.sample(rng),
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| expand(item, rng))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| Ok((key.clone(), expand(item, rng)?)))
                .collect::<Result<_, ScenarioError>>()?,
        ),
        _ => value.clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

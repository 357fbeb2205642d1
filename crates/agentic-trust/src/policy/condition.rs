//! Statement conditions and the request context they read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key/value facts about one request (`hour`, `ip`, `role`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestContext(BTreeMap<String, Value>);

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Add `hour` (0-23, UTC) and `time` (Unix seconds) for the given instant.
    pub fn with_time(self, at: chrono::DateTime<chrono::Utc>) -> Self {
        use chrono::Timelike;
        self.with("hour", at.hour()).with("time", at.timestamp())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A condition over a [`RequestContext`].
///
/// ```json
/// {"all": [
///   {"string_in": {"key": "role", "values": ["editor", "admin"]}},
///   {"numeric_between": {"key": "hour", "min": 9, "max": 17}}
/// ]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    StringEquals { key: String, value: String },
    StringIn { key: String, values: Vec<String> },
    /// Inclusive on both ends.
    NumericBetween { key: String, min: f64, max: f64 },
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// `true` only when the condition definitely holds.
    pub fn holds(&self, ctx: &RequestContext) -> bool {
        self.evaluate(ctx) == Some(true)
    }

    /// Three-valued evaluation: `None` when a field the outcome depends on
    /// is missing or has the wrong type. `not` keeps `None` as `None`, so
    /// an absent field can never make a condition true.
    pub fn evaluate(&self, ctx: &RequestContext) -> Option<bool> {
        match self {
            Self::StringEquals { key, value } => {
                ctx.get(key).and_then(Value::as_str).map(|v| v == value)
            }
            Self::StringIn { key, values } => ctx
                .get(key)
                .and_then(Value::as_str)
                .map(|v| values.iter().any(|x| x == v)),
            Self::NumericBetween { key, min, max } => ctx
                .get(key)
                .and_then(Value::as_f64)
                .map(|v| *min <= v && v <= *max),
            Self::All(items) => {
                let mut unknown = false;
                for c in items {
                    match c.evaluate(ctx) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                if unknown {
                    None
                } else {
                    Some(true)
                }
            }
            Self::Any(items) => {
                let mut unknown = false;
                for c in items {
                    match c.evaluate(ctx) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                if unknown {
                    None
                } else {
                    Some(false)
                }
            }
            Self::Not(inner) => inner.evaluate(ctx).map(|b| !b),
        }
    }
}

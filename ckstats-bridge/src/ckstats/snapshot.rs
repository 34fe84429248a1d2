//! Snapshot normalization.
//!
//! Raw JSON from the stats server is flattened into immutable field maps
//! with permissive accessors: a missing numeric field reads as 0 and a
//! missing string field reads as "Unknown", so a sparse payload never
//! fails a refresh cycle.

use serde::Serialize;
use serde_json::{Map, Value};

/// Immutable point-in-time mapping of scalar field values.
///
/// Published by the coordinator and replaced by reference on every
/// successful refresh; never mutated in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot(Map<String, Value>);

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric read: 0 when the field is missing, NaN when it is present
    /// but not a number (the formatters render NaN as their zero string).
    pub fn num(&self, key: &str) -> f64 {
        match self.0.get(key) {
            None => 0.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
            Some(_) => f64::NAN,
        }
    }

    /// Raw field value, defaulting to 0.
    pub fn or_zero(&self, key: &str) -> Value {
        self.0.get(key).cloned().unwrap_or_else(|| Value::from(0))
    }

    /// Raw field value, defaulting to "Unknown".
    pub fn or_unknown(&self, key: &str) -> Value {
        self.0
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::from("Unknown"))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build the pool and primary-user snapshots from raw endpoint payloads.
///
/// Pure function: flattens scalar fields (nested objects and arrays are
/// dropped) and selects the primary user record. An empty user list is a
/// valid state and yields an absent user snapshot.
pub fn normalize(
    pool: &Value,
    users: &Value,
    target_address: Option<&str>,
) -> (Snapshot, Option<Snapshot>) {
    let user = select_primary_user(users, target_address).map(flatten);
    (flatten(pool), user)
}

fn flatten(value: &Value) -> Snapshot {
    let mut fields = Map::new();
    if let Value::Object(raw) = value {
        for (key, field) in raw {
            match field {
                Value::Object(_) | Value::Array(_) => {}
                scalar => {
                    fields.insert(key.clone(), scalar.clone());
                }
            }
        }
    }
    Snapshot(fields)
}

/// Pick the primary user: the first record matching the configured wallet
/// address, falling back to the first record when no address is configured
/// or nothing matches.
fn select_primary_user<'a>(users: &'a Value, target_address: Option<&str>) -> Option<&'a Value> {
    let list = users.as_array()?;
    if let Some(address) = target_address {
        let matched = list
            .iter()
            .find(|user| user.get("userAddress").and_then(Value::as_str) == Some(address));
        if matched.is_some() {
            return matched;
        }
    }
    list.first()
}

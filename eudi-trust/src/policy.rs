//! OpenID Federation metadata policy.
//!
//! A policy maps each metadata parameter to operators:
//! `{"grant_types": {"subset_of": ["authorization_code"], "essential": true}}`.
//! Policies of a chain are combined anchor first, then applied to the leaf's
//! own metadata.
use serde_json::{Map, Value};

use crate::PolicyError;

pub const VALUE: &str = "value";
pub const ADD: &str = "add";
pub const DEFAULT: &str = "default";
pub const ONE_OF: &str = "one_of";
pub const SUBSET_OF: &str = "subset_of";
pub const SUPERSET_OF: &str = "superset_of";
pub const ESSENTIAL: &str = "essential";

/// Operators in the order they are applied.
const OPERATORS: [&str; 7] = [VALUE, ADD, DEFAULT, ONE_OF, SUBSET_OF, SUPERSET_OF, ESSENTIAL];

fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values.clone(),
        Value::Null => vec![],
        other => vec![other.clone()],
    }
}

fn union(a: &Value, b: &Value) -> Value {
    let mut merged = as_list(a);
    for item in as_list(b) {
        if !merged.contains(&item) {
            merged.push(item);
        }
    }
    Value::Array(merged)
}

fn intersection(a: &Value, b: &Value) -> Value {
    let other = as_list(b);
    Value::Array(as_list(a).into_iter().filter(|v| other.contains(v)).collect())
}

fn operators<'a>(claim: &str, policy: &'a Value) -> Result<&'a Map<String, Value>, PolicyError> {
    let operators = policy
        .as_object()
        .ok_or_else(|| PolicyError::InvalidOperatorValue {
            claim: claim.to_string(),
            operator: "*".to_string(),
        })?;
    for (operator, value) in operators {
        if !OPERATORS.contains(&operator.as_str()) {
            return Err(PolicyError::UnknownOperator {
                claim: claim.to_string(),
                operator: operator.clone(),
            });
        }
        let well_typed = match operator.as_str() {
            ONE_OF | SUBSET_OF | SUPERSET_OF => value.is_array(),
            ESSENTIAL => value.is_boolean(),
            _ => true,
        };
        if !well_typed {
            return Err(PolicyError::InvalidOperatorValue {
                claim: claim.to_string(),
                operator: operator.clone(),
            });
        }
    }
    Ok(operators)
}

/// Merge a superior's policy with its subordinate's.
///
/// The superior's `value` and `default` win; `add` and `superset_of` are
/// unions; `one_of` and `subset_of` are intersections, so the stricter side
/// prevails whichever statement declares it; `essential` is true if either is.
pub fn combine(
    superior: &Map<String, Value>,
    subordinate: &Map<String, Value>,
) -> Result<Map<String, Value>, PolicyError> {
    let mut combined = Map::new();
    for (claim, policy) in superior {
        combined.insert(claim.clone(), Value::Object(operators(claim, policy)?.clone()));
    }
    for (claim, policy) in subordinate {
        let sub_ops = operators(claim, policy)?;
        if !combined.contains_key(claim) {
            combined.insert(claim.clone(), Value::Object(sub_ops.clone()));
            continue;
        }
        let merged = match combined.get_mut(claim).and_then(Value::as_object_mut) {
            Some(merged) => merged,
            None => continue,
        };
        for (operator, sub_value) in sub_ops {
            let value = match (operator.as_str(), merged.get(operator)) {
                (_, None) => sub_value.clone(),
                (VALUE | DEFAULT, Some(sup_value)) => sup_value.clone(),
                (ADD | SUPERSET_OF, Some(sup_value)) => union(sup_value, sub_value),
                (ONE_OF | SUBSET_OF, Some(sup_value)) => {
                    let narrowed = intersection(sup_value, sub_value);
                    if operator == ONE_OF && narrowed.as_array().map_or(true, Vec::is_empty) {
                        return Err(PolicyError::Conflict {
                            claim: claim.clone(),
                            operator: operator.clone(),
                        });
                    }
                    narrowed
                }
                (_, Some(sup_value)) => Value::Bool(
                    sup_value.as_bool().unwrap_or(false) || sub_value.as_bool().unwrap_or(false),
                ),
            };
            merged.insert(operator.clone(), value);
        }
    }
    Ok(combined)
}

/// Apply a (combined) policy to metadata.
pub fn apply(
    policy: &Map<String, Value>,
    metadata: &Map<String, Value>,
) -> Result<Map<String, Value>, PolicyError> {
    let mut result = metadata.clone();
    for (claim, claim_policy) in policy {
        let ops = operators(claim, claim_policy)?;
        let violation = |operator: &str| PolicyError::Violation {
            claim: claim.clone(),
            operator: operator.to_string(),
        };
        for operator in OPERATORS {
            let op_value = match ops.get(operator) {
                Some(op_value) => op_value,
                None => continue,
            };
            match operator {
                VALUE => {
                    if op_value.is_null() {
                        result.remove(claim);
                    } else {
                        result.insert(claim.clone(), op_value.clone());
                    }
                }
                ADD => {
                    let current = result.get(claim).cloned().unwrap_or(Value::Null);
                    result.insert(claim.clone(), union(&current, op_value));
                }
                DEFAULT => {
                    if !result.contains_key(claim) {
                        result.insert(claim.clone(), op_value.clone());
                    }
                }
                ONE_OF => {
                    if let Some(current) = result.get(claim) {
                        if !as_list(op_value).contains(current) {
                            return Err(violation(operator));
                        }
                    }
                }
                SUBSET_OF => {
                    if let Some(current) = result.get(claim).cloned() {
                        match intersection(&current, op_value) {
                            Value::Array(kept) if !current.is_array() => match kept.first() {
                                Some(single) => {
                                    result.insert(claim.clone(), single.clone());
                                }
                                None => {
                                    result.remove(claim);
                                }
                            },
                            kept => {
                                result.insert(claim.clone(), kept);
                            }
                        }
                    }
                }
                SUPERSET_OF => {
                    if let Some(current) = result.get(claim) {
                        let current = as_list(current);
                        if !as_list(op_value).iter().all(|v| current.contains(v)) {
                            return Err(violation(operator));
                        }
                    }
                }
                _ => {
                    if op_value.as_bool() == Some(true) && !result.contains_key(claim) {
                        return Err(PolicyError::MissingEssential(claim.clone()));
                    }
                }
            }
        }
    }
    Ok(result)
}

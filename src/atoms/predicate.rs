//! Predicate language for atoms
//!
//! Atoms loaded from configuration carry a [`PredicateSpec`], a small closed
//! expression tree over observation fields. Atoms registered from code may
//! use a native closure instead. Either way evaluation is pure: the same
//! observation always yields the same answer.

use crate::error::PredicateError;
use crate::models::observation::Observation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

const EQUALITY_TOLERANCE: f64 = 0.0001;

/// Comparison operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Comparison {
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    pub fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::GreaterThan => value > threshold,
            Comparison::LessThan => value < threshold,
            Comparison::GreaterEqual => value >= threshold,
            Comparison::LessEqual => value <= threshold,
            Comparison::Equal => (value - threshold).abs() < EQUALITY_TOLERANCE,
            Comparison::NotEqual => (value - threshold).abs() >= EQUALITY_TOLERANCE,
        }
    }
}

/// Declarative predicate as it appears in definition files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum PredicateSpec {
    /// `field <cmp> threshold`
    Compare {
        field: String,
        comparison: Comparison,
        threshold: f64,
    },
    /// `left <cmp> right * factor` (factor defaults to 1)
    CompareFields {
        left: String,
        comparison: Comparison,
        right: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        factor: Option<f64>,
    },
    /// `min <= field <= max`
    InRange { field: String, min: f64, max: f64 },
    /// `field` lies within `tolerance_pct` percent of `target`
    Proximity {
        field: String,
        target: String,
        #[serde(rename = "tolerancePct")]
        tolerance_pct: f64,
    },
    All { conditions: Vec<PredicateSpec> },
    Any { conditions: Vec<PredicateSpec> },
    Not { condition: Box<PredicateSpec> },
}

impl PredicateSpec {
    /// Structural checks done once at registry load.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            PredicateSpec::Compare {
                field, threshold, ..
            } => {
                non_empty_field(field)?;
                finite("threshold", *threshold)
            }
            PredicateSpec::CompareFields {
                left,
                right,
                factor,
                ..
            } => {
                non_empty_field(left)?;
                non_empty_field(right)?;
                match factor {
                    Some(f) => finite("factor", *f),
                    None => Ok(()),
                }
            }
            PredicateSpec::InRange { field, min, max } => {
                non_empty_field(field)?;
                finite("min", *min)?;
                finite("max", *max)?;
                if min > max {
                    return Err(format!("range min {} is greater than max {}", min, max));
                }
                Ok(())
            }
            PredicateSpec::Proximity {
                field,
                target,
                tolerance_pct,
            } => {
                non_empty_field(field)?;
                non_empty_field(target)?;
                finite("tolerancePct", *tolerance_pct)?;
                if *tolerance_pct < 0.0 {
                    return Err(format!("tolerancePct {} is negative", tolerance_pct));
                }
                Ok(())
            }
            PredicateSpec::All { conditions } | PredicateSpec::Any { conditions } => {
                if conditions.is_empty() {
                    return Err("condition group is empty".to_string());
                }
                conditions.iter().try_for_each(|c| c.validate())
            }
            PredicateSpec::Not { condition } => condition.validate(),
        }
    }

    pub fn evaluate(&self, observation: &Observation) -> Result<bool, PredicateError> {
        match self {
            PredicateSpec::Compare {
                field,
                comparison,
                threshold,
            } => Ok(comparison.apply(read(observation, field)?, *threshold)),
            PredicateSpec::CompareFields {
                left,
                comparison,
                right,
                factor,
            } => {
                let lhs = read(observation, left)?;
                let rhs = read(observation, right)? * factor.unwrap_or(1.0);
                Ok(comparison.apply(lhs, rhs))
            }
            PredicateSpec::InRange { field, min, max } => {
                let value = read(observation, field)?;
                Ok(value >= *min && value <= *max)
            }
            PredicateSpec::Proximity {
                field,
                target,
                tolerance_pct,
            } => {
                let value = read(observation, field)?;
                let anchor = read(observation, target)?;
                if anchor == 0.0 {
                    return Err(PredicateError::Custom(format!(
                        "proximity target '{}' is zero",
                        target
                    )));
                }
                let distance_pct = (value - anchor).abs() / anchor.abs() * 100.0;
                Ok(distance_pct <= *tolerance_pct)
            }
            PredicateSpec::All { conditions } => {
                for condition in conditions {
                    if !condition.evaluate(observation)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            PredicateSpec::Any { conditions } => {
                for condition in conditions {
                    if condition.evaluate(observation)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            PredicateSpec::Not { condition } => Ok(!condition.evaluate(observation)?),
        }
    }
}

fn read(observation: &Observation, field: &str) -> Result<f64, PredicateError> {
    let value = observation
        .field(field)
        .ok_or_else(|| PredicateError::MissingField(field.to_string()))?;
    if !value.is_finite() {
        return Err(PredicateError::NonFinite {
            field: field.to_string(),
            value,
        });
    }
    Ok(value)
}

fn non_empty_field(field: &str) -> Result<(), String> {
    if field.trim().is_empty() {
        Err("field name is empty".to_string())
    } else {
        Ok(())
    }
}

fn finite(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{} is not finite", name))
    }
}

pub type NativePredicate = dyn Fn(&Observation) -> Result<bool, PredicateError> + Send + Sync;

/// The predicate an atom evaluates.
#[derive(Clone, Deserialize)]
#[serde(from = "PredicateSpec")]
pub enum Predicate {
    Spec(PredicateSpec),
    Native(Arc<NativePredicate>),
}

impl Predicate {
    pub fn native<F>(f: F) -> Self
    where
        F: Fn(&Observation) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Predicate::Native(Arc::new(f))
    }

    pub fn spec(&self) -> Option<&PredicateSpec> {
        match self {
            Predicate::Spec(spec) => Some(spec),
            Predicate::Native(_) => None,
        }
    }

    /// Evaluate against one observation. A panicking native predicate is
    /// reported as an error rather than unwinding into the evaluator.
    pub fn evaluate(&self, observation: &Observation) -> Result<bool, PredicateError> {
        match self {
            Predicate::Spec(spec) => spec.evaluate(observation),
            Predicate::Native(f) => catch_unwind(AssertUnwindSafe(|| f(observation)))
                .unwrap_or_else(|_| Err(PredicateError::Custom("predicate panicked".to_string()))),
        }
    }
}

impl From<PredicateSpec> for Predicate {
    fn from(spec: PredicateSpec) -> Self {
        Predicate::Spec(spec)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Spec(spec) => f.debug_tuple("Spec").field(spec).finish(),
            Predicate::Native(_) => f.write_str("Native(..)"),
        }
    }
}

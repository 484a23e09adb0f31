//! Wire schema parsing and per-record validation
//!
//! Both source variants exchange the same JSON record schema. A payload
//! is either a bare array of records or an envelope that also carries
//! the pre-materialized facet option lists:
//!
//! ```json
//! { "techniques": [...], "assurance_goals": [...], "tags": [...] }
//! ```
//!
//! Individual malformed records are dropped with a warning and never
//! fail the load; only a payload that cannot be read as a record list
//! at all is a schema error.

use crate::error::CatalogError;
use crate::types::{AssuranceGoal, ExampleUseCase, Limitation, Technique};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

/// Decoded payload: raw record values plus any declared facet lists.
#[derive(Debug, Default)]
pub struct CatalogPayload {
    pub records: Vec<Value>,
    pub declared_goals: Vec<String>,
    pub declared_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    techniques: Vec<Value>,
    #[serde(default)]
    assurance_goals: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Decode payload text into raw records and declared facet lists.
pub fn parse_payload(text: &str) -> Result<CatalogPayload, CatalogError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CatalogError::SchemaValidation(e.to_string()))?;

    match value {
        Value::Array(records) => Ok(CatalogPayload {
            records,
            ..CatalogPayload::default()
        }),
        Value::Object(_) => {
            let envelope: Envelope = serde_json::from_value(value)
                .map_err(|e| CatalogError::SchemaValidation(e.to_string()))?;
            Ok(CatalogPayload {
                records: envelope.techniques,
                declared_goals: envelope.assurance_goals,
                declared_tags: envelope.tags,
            })
        }
        other => Err(CatalogError::SchemaValidation(format!(
            "expected record array or envelope object, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Raw record as it appears on the wire, before validation.
#[derive(Debug, Deserialize)]
struct RawTechnique {
    slug: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    assurance_goals: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    complexity: i64,
    #[serde(default)]
    limitations: Vec<RawLimitation>,
    #[serde(default)]
    example_use_cases: Vec<RawUseCase>,
    #[serde(default)]
    related_slugs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawLimitation {
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawUseCase {
    #[serde(default)]
    goal: String,
    description: String,
}

/// Validate raw record values, dropping the malformed ones with a
/// warning. The caller decides whether an empty result is fatal.
pub fn validate_records(records: Vec<Value>) -> Vec<Technique> {
    let mut validated = Vec::with_capacity(records.len());
    for record in records {
        match validate_record(record) {
            Ok(technique) => validated.push(technique),
            Err(reason) => warn!("Dropping malformed technique record: {}", reason),
        }
    }
    validated
}

/// Validate a single record, as served by the detail endpoint. Here a
/// malformed record is the whole payload, so it is a schema error.
pub fn validate_one(record: Value) -> Result<Technique, CatalogError> {
    validate_record(record).map_err(CatalogError::SchemaValidation)
}

/// Parse goal names from an auxiliary facet list, warning on (and
/// skipping) values the enum does not know.
pub fn parse_goal_list(names: &[String]) -> Vec<AssuranceGoal> {
    let mut goals = Vec::new();
    for name in names {
        match name.parse::<AssuranceGoal>() {
            Ok(goal) => {
                if !goals.contains(&goal) {
                    goals.push(goal);
                }
            }
            Err(_) => warn!("Ignoring unknown assurance goal in facet list: '{}'", name),
        }
    }
    goals
}

fn validate_record(record: Value) -> Result<Technique, String> {
    let raw: RawTechnique =
        serde_json::from_value(record).map_err(|e| format!("unreadable record: {}", e))?;

    if raw.slug.trim().is_empty() {
        return Err("empty slug".to_string());
    }
    if raw.name.trim().is_empty() {
        return Err(format!("'{}': empty name", raw.slug));
    }
    if !(1..=5).contains(&raw.complexity) {
        return Err(format!(
            "'{}': complexity {} outside 1..=5",
            raw.slug, raw.complexity
        ));
    }

    let mut goals = BTreeSet::new();
    for goal in &raw.assurance_goals {
        match goal.parse::<AssuranceGoal>() {
            Ok(parsed) => {
                goals.insert(parsed);
            }
            Err(_) => warn!("Technique '{}': ignoring unknown goal '{}'", raw.slug, goal),
        }
    }
    if goals.is_empty() {
        return Err(format!("'{}': no recognized assurance goal", raw.slug));
    }

    Ok(Technique {
        slug: raw.slug,
        name: raw.name,
        description: raw.description,
        assurance_goals: goals,
        tags: raw.tags.into_iter().collect(),
        complexity: raw.complexity as u8,
        limitations: raw
            .limitations
            .into_iter()
            .map(|l| Limitation {
                description: l.description,
            })
            .collect(),
        example_use_cases: raw
            .example_use_cases
            .into_iter()
            .map(|u| ExampleUseCase {
                goal: u.goal,
                description: u.description,
            })
            .collect(),
        related_slugs: raw.related_slugs,
    })
}

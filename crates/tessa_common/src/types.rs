//! Core catalog types
//!
//! A `Technique` is the unit record of the catalog: one documented
//! responsible-AI method, identified by its slug. Records are built once
//! per load cycle and never mutated afterwards; everything downstream
//! (indices, filters, the wizard) works on shared immutable snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Assurance goal a technique contributes evidence towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssuranceGoal {
    Explainability,
    Fairness,
    Privacy,
    Reliability,
    Safety,
    Transparency,
}

impl AssuranceGoal {
    /// All goals, in display order.
    pub fn all() -> [AssuranceGoal; 6] {
        [
            AssuranceGoal::Explainability,
            AssuranceGoal::Fairness,
            AssuranceGoal::Privacy,
            AssuranceGoal::Reliability,
            AssuranceGoal::Safety,
            AssuranceGoal::Transparency,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssuranceGoal::Explainability => "Explainability",
            AssuranceGoal::Fairness => "Fairness",
            AssuranceGoal::Privacy => "Privacy",
            AssuranceGoal::Reliability => "Reliability",
            AssuranceGoal::Safety => "Safety",
            AssuranceGoal::Transparency => "Transparency",
        }
    }
}

impl fmt::Display for AssuranceGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssuranceGoal {
    type Err = String;

    /// Case-insensitive; the wire format uses the capitalized names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explainability" => Ok(AssuranceGoal::Explainability),
            "fairness" => Ok(AssuranceGoal::Fairness),
            "privacy" => Ok(AssuranceGoal::Privacy),
            "reliability" => Ok(AssuranceGoal::Reliability),
            "safety" => Ok(AssuranceGoal::Safety),
            "transparency" => Ok(AssuranceGoal::Transparency),
            other => Err(format!("Unknown assurance goal: '{}'", other)),
        }
    }
}

/// Known limitation of a technique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limitation {
    pub description: String,
}

/// Worked example of applying a technique.
///
/// `goal` is free text describing what the example was after, not
/// necessarily an assurance-goal name, so it stays a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleUseCase {
    pub goal: String,
    pub description: String,
}

/// One catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Technique {
    /// Globally unique identity key. Never reused across load cycles.
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Non-empty; validation drops records without a recognized goal.
    pub assurance_goals: BTreeSet<AssuranceGoal>,
    pub tags: BTreeSet<String>,
    /// Bounded 1..=5.
    pub complexity: u8,
    pub limitations: Vec<Limitation>,
    pub example_use_cases: Vec<ExampleUseCase>,
    /// Weak references; dangling slugs are tolerated and filtered when
    /// resolved, never treated as a data error.
    pub related_slugs: Vec<String>,
}

impl Technique {
    /// Start a record with the required fields. Intended for fixtures
    /// and the mock source; loaded records go through schema validation.
    pub fn new(slug: impl Into<String>, name: impl Into<String>, complexity: u8) -> Self {
        Technique {
            slug: slug.into(),
            name: name.into(),
            description: String::new(),
            assurance_goals: BTreeSet::new(),
            tags: BTreeSet::new(),
            complexity,
            limitations: Vec::new(),
            example_use_cases: Vec::new(),
            related_slugs: Vec::new(),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn goal(mut self, goal: AssuranceGoal) -> Self {
        self.assurance_goals.insert(goal);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn related(mut self, slug: impl Into<String>) -> Self {
        self.related_slugs.push(slug.into());
        self
    }

    pub fn limitation(mut self, description: impl Into<String>) -> Self {
        self.limitations.push(Limitation {
            description: description.into(),
        });
        self
    }

    pub fn use_case(mut self, goal: impl Into<String>, description: impl Into<String>) -> Self {
        self.example_use_cases.push(ExampleUseCase {
            goal: goal.into(),
            description: description.into(),
        });
        self
    }

    /// Case-insensitive substring match over name and description.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Complete facet option lists, for rendering filter menus even before
/// any record referencing a value has been loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetOptions {
    pub goals: Vec<AssuranceGoal>,
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_round_trips_through_str() {
        for goal in AssuranceGoal::all() {
            assert_eq!(goal.as_str().parse::<AssuranceGoal>(), Ok(goal));
        }
    }

    #[test]
    fn goal_parse_is_case_insensitive() {
        assert_eq!("FAIRNESS".parse::<AssuranceGoal>(), Ok(AssuranceGoal::Fairness));
        assert_eq!(" privacy ".parse::<AssuranceGoal>(), Ok(AssuranceGoal::Privacy));
        assert!("throughput".parse::<AssuranceGoal>().is_err());
    }

    #[test]
    fn query_match_is_case_insensitive() {
        let t = Technique::new("shap", "SHAP Values", 3)
            .description("Shapley-based feature attribution");
        assert!(t.matches_query("shapley"));
        assert!(t.matches_query("SHAP"));
        assert!(!t.matches_query("counterfactual"));
    }
}

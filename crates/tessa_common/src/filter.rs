//! Faceted filter and sort engine
//!
//! Pure functions over a repository snapshot. Within one facet dimension
//! selected values are unioned; across dimensions results are
//! intersected; an empty selection on a dimension restricts nothing.
//! All orderings break ties by slug ascending so results are
//! reproducible run to run.

use crate::repository::TechniqueRepository;
use crate::types::{AssuranceGoal, Technique};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

/// Per-dimension sets of selected facet values.
///
/// Dimensions mirror the record fields: assurance goals, tags and
/// complexity levels. An empty set means "unconstrained".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSelection {
    pub goals: BTreeSet<AssuranceGoal>,
    pub tags: BTreeSet<String>,
    pub complexities: BTreeSet<u8>,
}

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goal(mut self, goal: AssuranceGoal) -> Self {
        self.goals.insert(goal);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn complexity(mut self, level: u8) -> Self {
        self.complexities.insert(level);
        self
    }

    /// Select every complexity level up to and including `ceiling`.
    pub fn complexity_up_to(mut self, ceiling: u8) -> Self {
        for level in 1..=ceiling.min(5) {
            self.complexities.insert(level);
        }
        self
    }

    /// True when the technique satisfies every constrained dimension.
    pub fn matches(&self, technique: &Technique) -> bool {
        let goal_ok = self.goals.is_empty()
            || self.goals.iter().any(|g| technique.assurance_goals.contains(g));
        let tag_ok =
            self.tags.is_empty() || self.tags.iter().any(|t| technique.tags.contains(t));
        let complexity_ok =
            self.complexities.is_empty() || self.complexities.contains(&technique.complexity);
        goal_ok && tag_ok && complexity_ok
    }
}

/// Sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Complexity,
    Slug,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "complexity" => Ok(SortField::Complexity),
            "slug" => Ok(SortField::Slug),
            other => Err(format!(
                "Unknown sort field: '{}'. Valid values: name, complexity, slug",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Field plus direction; ties always break by slug ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        SortSpec { field, direction }
    }

    pub fn descending(field: SortField) -> Self {
        SortSpec::new(field, SortDirection::Descending)
    }

    fn compare(&self, a: &Technique, b: &Technique) -> Ordering {
        let primary = match self.field {
            SortField::Name => a.name.cmp(&b.name),
            SortField::Complexity => a.complexity.cmp(&b.complexity),
            SortField::Slug => a.slug.cmp(&b.slug),
        };
        let primary = match self.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        primary.then_with(|| a.slug.cmp(&b.slug))
    }
}

/// Apply a filter/sort specification to a snapshot.
///
/// Facets are intersected across dimensions, the optional query is a
/// case-insensitive substring match on name and description ANDed with
/// the facet result, and the output is ordered by `sort`.
pub fn apply(
    repo: &TechniqueRepository,
    selection: &FacetSelection,
    query: Option<&str>,
    sort: &SortSpec,
) -> Vec<Arc<Technique>> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());

    let mut results: Vec<Arc<Technique>> = repo
        .all()
        .into_iter()
        .filter(|t| selection.matches(t))
        .filter(|t| query.map_or(true, |q| t.matches_query(q)))
        .collect();

    results.sort_by(|a, b| sort.compare(a, b));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssuranceGoal::*;

    fn repo() -> TechniqueRepository {
        TechniqueRepository::build(vec![
            Technique::new("t1", "Alpha Audit", 1)
                .goal(Fairness)
                .description("Checks outcome parity"),
            Technique::new("t2", "Beta Shield", 4).goal(Privacy),
            Technique::new("t3", "Gamma Probe", 2)
                .goal(Fairness)
                .goal(Privacy)
                .tag("bias-detection"),
        ])
        .unwrap()
    }

    fn slugs(results: &[Arc<Technique>]) -> Vec<String> {
        results.iter().map(|t| t.slug.clone()).collect()
    }

    #[test]
    fn unconstrained_selection_returns_everything() {
        let repo = repo();
        let results = apply(&repo, &FacetSelection::new(), None, &SortSpec::default());
        assert_eq!(results.len(), repo.len());
    }

    #[test]
    fn goal_filter_unions_within_the_dimension() {
        let repo = repo();
        let one = FacetSelection::new().goal(Fairness);
        let both = FacetSelection::new().goal(Fairness).goal(Privacy);

        assert_eq!(
            slugs(&apply(&repo, &one, None, &SortSpec::default())),
            vec!["t1", "t3"]
        );
        // Adding a second permitted goal can only widen the result.
        assert_eq!(apply(&repo, &both, None, &SortSpec::default()).len(), 3);
    }

    #[test]
    fn dimensions_intersect() {
        // Scenario from the catalog contract: goals={Fairness} gives
        // {t1, t3}; adding tags={bias-detection} narrows to {t3}.
        let repo = repo();
        let selection = FacetSelection::new().goal(Fairness).tag("bias-detection");
        assert_eq!(slugs(&apply(&repo, &selection, None, &SortSpec::default())), vec!["t3"]);
    }

    #[test]
    fn query_is_case_insensitive_and_anded() {
        let repo = repo();
        let selection = FacetSelection::new().goal(Fairness);
        let results = apply(&repo, &selection, Some("PARITY"), &SortSpec::default());
        assert_eq!(slugs(&results), vec!["t1"]);

        // Whitespace-only query restricts nothing.
        let results = apply(&repo, &selection, Some("   "), &SortSpec::default());
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn complexity_levels_behave_like_any_other_facet() {
        let repo = repo();
        let selection = FacetSelection::new().complexity_up_to(2);
        assert_eq!(
            slugs(&apply(&repo, &selection, None, &SortSpec::default())),
            vec!["t1", "t3"]
        );
    }

    #[test]
    fn sort_orders_and_breaks_ties_by_slug() {
        let repo = TechniqueRepository::build(vec![
            Technique::new("b", "Same", 2).goal(Safety),
            Technique::new("a", "Same", 2).goal(Safety),
            Technique::new("c", "Other", 1).goal(Safety),
        ])
        .unwrap();

        let by_name = apply(&repo, &FacetSelection::new(), None, &SortSpec::default());
        assert_eq!(slugs(&by_name), vec!["c", "a", "b"]);

        let by_complexity_desc = apply(
            &repo,
            &FacetSelection::new(),
            None,
            &SortSpec::descending(SortField::Complexity),
        );
        // Descending on the field, but equal keys still order a before b.
        assert_eq!(slugs(&by_complexity_desc), vec!["a", "b", "c"]);
    }

    #[test]
    fn removing_a_constraint_never_shrinks_the_result() {
        let repo = repo();
        let constrained = FacetSelection::new().goal(Fairness).tag("bias-detection");
        let relaxed_tag = FacetSelection::new().goal(Fairness);
        let relaxed_all = FacetSelection::new();

        let n_constrained = apply(&repo, &constrained, None, &SortSpec::default()).len();
        let n_relaxed = apply(&repo, &relaxed_tag, None, &SortSpec::default()).len();
        let n_all = apply(&repo, &relaxed_all, None, &SortSpec::default()).len();

        assert!(n_relaxed >= n_constrained);
        assert!(n_all >= n_relaxed);
    }
}

//! Catalog contract tests
//!
//! End-to-end checks of the filter and wizard guarantees: empty-facet
//! equivalence, monotonicity under relaxation, goal-index partitioning,
//! and the reference browse/wizard scenario.

use std::collections::BTreeSet;
use std::sync::Arc;
use tessa_common::types::AssuranceGoal::{self, *};
use tessa_common::wizard::{Answer, WizardSession};
use tessa_common::{filter, FacetSelection, SortSpec, Technique, TechniqueRepository};

fn catalog() -> Arc<TechniqueRepository> {
    Arc::new(
        TechniqueRepository::build(vec![
            Technique::new("t1", "Outcome Parity Audit", 1)
                .goal(Fairness)
                .description("Compares outcomes across groups"),
            Technique::new("t2", "Privacy Budgeting", 4).goal(Privacy),
            Technique::new("t3", "Bias Probe", 2)
                .goal(Fairness)
                .goal(Privacy)
                .tag("bias-detection"),
            Technique::new("t4", "Stress Harness", 5)
                .goal(Reliability)
                .tag("evaluation"),
        ])
        .unwrap(),
    )
}

fn slugs(results: &[Arc<Technique>]) -> Vec<String> {
    results.iter().map(|t| t.slug.clone()).collect()
}

fn count(repo: &TechniqueRepository, selection: &FacetSelection) -> usize {
    filter::apply(repo, selection, None, &SortSpec::default()).len()
}

#[test]
fn empty_selection_on_a_dimension_equals_omitting_it() {
    let repo = catalog();
    let omitted = FacetSelection::new().goal(Fairness);
    // Explicitly empty tag and complexity sets, same goal constraint.
    let explicit = FacetSelection {
        goals: [Fairness].into_iter().collect(),
        tags: BTreeSet::new(),
        complexities: BTreeSet::new(),
    };

    assert_eq!(
        slugs(&filter::apply(&repo, &omitted, None, &SortSpec::default())),
        slugs(&filter::apply(&repo, &explicit, None, &SortSpec::default())),
    );
}

#[test]
fn widening_or_dropping_constraints_is_monotone() {
    let repo = catalog();

    // F: one goal, one tag, tight complexity. Each relaxation step
    // widens F toward unconstrained; counts must be non-decreasing.
    let chain = [
        FacetSelection::new().goal(Fairness).tag("bias-detection").complexity(2),
        FacetSelection::new().goal(Fairness).tag("bias-detection").complexity_up_to(5),
        FacetSelection::new().goal(Fairness).goal(Privacy).tag("bias-detection").complexity_up_to(5),
        FacetSelection::new().goal(Fairness).goal(Privacy).complexity_up_to(5),
        FacetSelection::new(),
    ];

    let counts: Vec<usize> = chain.iter().map(|f| count(&repo, f)).collect();
    for window in counts.windows(2) {
        assert!(
            window[1] >= window[0],
            "relaxing a filter shrank the result set: {:?}",
            counts
        );
    }
    assert_eq!(*counts.last().unwrap(), repo.len());
}

#[test]
fn goal_indices_partition_the_catalog() {
    let repo = catalog();

    let mut reconstructed: Vec<String> = AssuranceGoal::all()
        .into_iter()
        .flat_map(|g| repo.by_goal(g))
        .map(|t| t.slug.clone())
        .collect();
    reconstructed.sort();

    // t3 carries two goals, so it appears twice before dedup; exactly
    // once per goal it carries.
    assert_eq!(
        reconstructed,
        vec!["t1", "t2", "t3", "t3", "t4"],
        "each technique must appear once per goal it belongs to"
    );
}

#[test]
fn reference_browse_scenario() {
    let repo = catalog();

    let fairness = FacetSelection::new().goal(Fairness);
    assert_eq!(
        slugs(&filter::apply(&repo, &fairness, None, &SortSpec::default())),
        vec!["t3", "t1"],
        "sorted by name: Bias Probe before Outcome Parity Audit"
    );

    let narrowed = FacetSelection::new().goal(Fairness).tag("bias-detection");
    assert_eq!(
        slugs(&filter::apply(&repo, &narrowed, None, &SortSpec::default())),
        vec!["t3"]
    );
}

#[test]
fn reference_wizard_scenario() {
    let mut session = WizardSession::new(catalog());
    session
        .answer(Answer::Goals([Privacy].into_iter().collect()))
        .unwrap();
    session.answer(Answer::ComplexityCeiling(5)).unwrap();
    session
        .answer(Answer::Topics(
            ["bias-detection".to_string()].into_iter().collect(),
        ))
        .unwrap();

    let outcome = session.recommendations(10);
    let ranked: Vec<(String, usize)> = outcome
        .ranked
        .iter()
        .map(|s| (s.technique.slug.clone(), s.score))
        .collect();
    assert_eq!(
        ranked,
        vec![("t3".to_string(), 1), ("t2".to_string(), 0)],
        "soft tag preference ranks t3 above t2 without excluding either"
    );
}

#[test]
fn wizard_apply_then_undo_is_identity_at_every_depth() {
    let repo = catalog();
    let answers = [
        Answer::Goals([Fairness, Privacy].into_iter().collect()),
        Answer::ComplexityCeiling(2),
        Answer::Topics(["bias-detection".to_string()].into_iter().collect()),
    ];

    for depth in 0..answers.len() {
        let mut session = WizardSession::new(Arc::clone(&repo));
        for answer in answers.iter().take(depth) {
            session.answer(answer.clone()).unwrap();
        }

        let before = slugs(&session.candidates());
        let phase = session.phase();

        session.answer(answers[depth].clone()).unwrap();
        session.undo_last().unwrap();

        assert_eq!(slugs(&session.candidates()), before, "depth {}", depth);
        assert_eq!(session.phase(), phase, "depth {}", depth);
    }
}

//! Guided recommendation wizard
//!
//! A fixed sequence of question steps narrows the catalog to ranked
//! suggestions. Each answer contributes either a mandatory facet
//! constraint (candidates must match) or soft preferences (contribute
//! to ranking only). Every applied answer snapshots the candidate set
//! in its history frame, so undo restores the exact prior state by
//! popping frames rather than recomputing.

use crate::repository::TechniqueRepository;
use crate::types::{AssuranceGoal, Technique};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Session lifecycle. The only transitions are
/// Unanswered → InProgress → Completed, plus undo popping backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    Unanswered,
    InProgress,
    Completed,
}

/// A constraint candidates must satisfy to stay eligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetConstraint {
    Goals(BTreeSet<AssuranceGoal>),
    Tags(BTreeSet<String>),
    ComplexityAtMost(u8),
}

impl FacetConstraint {
    fn admits(&self, technique: &Technique) -> bool {
        match self {
            FacetConstraint::Goals(goals) => {
                goals.iter().any(|g| technique.assurance_goals.contains(g))
            }
            FacetConstraint::Tags(tags) => tags.iter().any(|t| technique.tags.contains(t)),
            FacetConstraint::ComplexityAtMost(ceiling) => technique.complexity <= *ceiling,
        }
    }

    /// Human description, used in relaxation explanations.
    pub fn describe(&self) -> String {
        match self {
            FacetConstraint::Goals(goals) => {
                let names: Vec<&str> = goals.iter().map(|g| g.as_str()).collect();
                format!("assurance goal in [{}]", names.join(", "))
            }
            FacetConstraint::Tags(tags) => {
                let names: Vec<&str> = tags.iter().map(String::as_str).collect();
                format!("tag in [{}]", names.join(", "))
            }
            FacetConstraint::ComplexityAtMost(ceiling) => {
                format!("complexity at most {}", ceiling)
            }
        }
    }
}

/// A criterion that raises a candidate's rank without excluding anyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preference {
    Tag(String),
    Goal(AssuranceGoal),
}

impl Preference {
    fn satisfied_by(&self, technique: &Technique) -> bool {
        match self {
            Preference::Tag(tag) => technique.tags.contains(tag),
            Preference::Goal(goal) => technique.assurance_goals.contains(goal),
        }
    }
}

/// Kind of answer a step expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Mandatory: which assurance goals the user is working towards.
    Goals,
    /// Mandatory: how much implementation effort is acceptable.
    ComplexityCeiling,
    /// Soft: topic tags the user cares about.
    Topics,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Goals => "goals",
            StepKind::ComplexityCeiling => "complexity ceiling",
            StepKind::Topics => "topics",
        };
        f.write_str(name)
    }
}

/// One question in the sequence.
#[derive(Debug, Clone)]
pub struct WizardStep {
    pub id: &'static str,
    pub title: &'static str,
    pub prompt: &'static str,
    pub kind: StepKind,
}

/// The standard question sequence.
pub fn default_steps() -> Vec<WizardStep> {
    vec![
        WizardStep {
            id: "goals",
            title: "Assurance goals",
            prompt: "Which assurance goals does your project need evidence for?",
            kind: StepKind::Goals,
        },
        WizardStep {
            id: "complexity",
            title: "Implementation effort",
            prompt: "What is the highest implementation complexity you can take on (1-5)?",
            kind: StepKind::ComplexityCeiling,
        },
        WizardStep {
            id: "topics",
            title: "Topics of interest",
            prompt: "Any topics you care about in particular? (optional)",
            kind: StepKind::Topics,
        },
    ]
}

/// A user's answer to one step. Empty selections mean "no preference"
/// and apply no constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Goals(BTreeSet<AssuranceGoal>),
    ComplexityCeiling(u8),
    Topics(BTreeSet<String>),
}

impl Answer {
    fn kind(&self) -> StepKind {
        match self {
            Answer::Goals(_) => StepKind::Goals,
            Answer::ComplexityCeiling(_) => StepKind::ComplexityCeiling,
            Answer::Topics(_) => StepKind::Topics,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Wizard session already completed")]
    SessionCompleted,

    #[error("Answer does not fit the current step: expected {expected}, got {got}")]
    AnswerMismatch { expected: StepKindName, got: StepKindName },

    #[error("Complexity ceiling {0} outside 1..=5")]
    InvalidCeiling(u8),
}

/// Newtype so the error can display step kinds without borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepKindName(pub StepKind);

impl fmt::Display for StepKindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One applied answer plus the candidate set it produced.
#[derive(Debug, Clone)]
struct Frame {
    answer: Answer,
    mandatory: Option<FacetConstraint>,
    soft: Vec<Preference>,
    /// Candidates after this frame's mandatory constraint.
    candidates: Vec<Arc<Technique>>,
}

/// A candidate with its soft-preference score.
#[derive(Debug, Clone)]
pub struct ScoredTechnique {
    pub technique: Arc<Technique>,
    /// Number of soft preferences the candidate satisfies.
    pub score: usize,
}

/// Result of `recommendations`. An empty `ranked` list is a valid
/// terminal outcome, not an error; `reason` explains it and suggests
/// relaxing filters.
#[derive(Debug, Clone)]
pub struct RecommendationOutcome {
    pub ranked: Vec<ScoredTechnique>,
    /// Set when a mandatory constraint had to be dropped to find
    /// anything at all.
    pub relaxed: Option<String>,
    /// Set when even relaxation found nothing.
    pub reason: Option<String>,
}

impl RecommendationOutcome {
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Step-sequenced wizard session over one catalog snapshot.
#[derive(Debug)]
pub struct WizardSession {
    repo: Arc<TechniqueRepository>,
    steps: Vec<WizardStep>,
    frames: Vec<Frame>,
    completed: bool,
}

impl WizardSession {
    pub fn new(repo: Arc<TechniqueRepository>) -> Self {
        Self::with_steps(repo, default_steps())
    }

    pub fn with_steps(repo: Arc<TechniqueRepository>, steps: Vec<WizardStep>) -> Self {
        WizardSession {
            repo,
            steps,
            frames: Vec::new(),
            completed: false,
        }
    }

    pub fn phase(&self) -> WizardPhase {
        if self.completed {
            WizardPhase::Completed
        } else if self.frames.is_empty() {
            WizardPhase::Unanswered
        } else {
            WizardPhase::InProgress
        }
    }

    /// The step awaiting an answer, if any.
    pub fn current_step(&self) -> Option<&WizardStep> {
        if self.completed {
            None
        } else {
            self.steps.get(self.frames.len())
        }
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn answered(&self) -> usize {
        self.frames.len()
    }

    /// Apply an answer to the current step. Completing the last step
    /// moves the session to `Completed`.
    pub fn answer(&mut self, answer: Answer) -> Result<(), WizardError> {
        let step = self.current_step().ok_or(WizardError::SessionCompleted)?;
        if answer.kind() != step.kind {
            return Err(WizardError::AnswerMismatch {
                expected: StepKindName(step.kind),
                got: StepKindName(answer.kind()),
            });
        }
        let (mandatory, soft) = Self::effect_of(&answer)?;
        let previous = self.candidates();
        let candidates = match &mandatory {
            Some(constraint) => previous
                .into_iter()
                .filter(|t| constraint.admits(t))
                .collect(),
            None => previous,
        };

        self.frames.push(Frame {
            answer,
            mandatory,
            soft,
            candidates,
        });
        if self.frames.len() == self.steps.len() {
            self.completed = true;
        }
        Ok(())
    }

    fn effect_of(answer: &Answer) -> Result<(Option<FacetConstraint>, Vec<Preference>), WizardError> {
        match answer {
            Answer::Goals(goals) => {
                if goals.is_empty() {
                    Ok((None, Vec::new()))
                } else {
                    Ok((Some(FacetConstraint::Goals(goals.clone())), Vec::new()))
                }
            }
            Answer::ComplexityCeiling(ceiling) => {
                if !(1..=5).contains(ceiling) {
                    return Err(WizardError::InvalidCeiling(*ceiling));
                }
                // A ceiling of 5 admits every record; no constraint.
                if *ceiling == 5 {
                    Ok((None, Vec::new()))
                } else {
                    Ok((Some(FacetConstraint::ComplexityAtMost(*ceiling)), Vec::new()))
                }
            }
            Answer::Topics(tags) => Ok((
                None,
                tags.iter().map(|t| Preference::Tag(t.clone())).collect(),
            )),
        }
    }

    /// Pop the most recent answer and return to the state implied by
    /// the remaining stack — back to `Unanswered` once it is empty.
    pub fn undo_last(&mut self) -> Option<Answer> {
        self.completed = false;
        self.frames.pop().map(|frame| frame.answer)
    }

    /// Finish early, skipping the remaining steps.
    pub fn finish(&mut self) {
        self.completed = true;
    }

    /// Candidate set after all applied mandatory constraints. Soft
    /// preferences never narrow this.
    pub fn candidates(&self) -> Vec<Arc<Technique>> {
        match self.frames.last() {
            Some(frame) => frame.candidates.clone(),
            None => self.repo.all(),
        }
    }

    /// Mandatory constraints in application order (oldest first).
    pub fn mandatory_constraints(&self) -> Vec<&FacetConstraint> {
        self.frames.iter().filter_map(|f| f.mandatory.as_ref()).collect()
    }

    /// Soft preferences in application order.
    pub fn soft_preferences(&self) -> Vec<&Preference> {
        self.frames.iter().flat_map(|f| f.soft.iter()).collect()
    }

    /// Rank the mandatory-constrained candidates by how many soft
    /// preferences each satisfies and return the top `k`.
    ///
    /// An empty candidate set relaxes the least-recently-applied
    /// mandatory constraint and retries once; if still empty, the
    /// outcome is empty with an explanation rather than an error.
    pub fn recommendations(&self, k: usize) -> RecommendationOutcome {
        let mandatory = self.mandatory_constraints();
        let soft = self.soft_preferences();

        let mut candidates = self.candidates();
        let mut relaxed = None;

        if candidates.is_empty() {
            if let Some((dropped, remaining)) = mandatory.split_first() {
                relaxed = Some(dropped.describe());
                candidates = self
                    .repo
                    .all()
                    .into_iter()
                    .filter(|t| remaining.iter().all(|c| c.admits(t)))
                    .collect();
            }
        }

        if candidates.is_empty() {
            return RecommendationOutcome {
                ranked: Vec::new(),
                relaxed,
                reason: Some(
                    "No technique satisfies the selected constraints; try relaxing your answers"
                        .to_string(),
                ),
            };
        }

        let mut ranked: Vec<ScoredTechnique> = candidates
            .into_iter()
            .map(|technique| {
                let score = soft.iter().filter(|p| p.satisfied_by(&technique)).count();
                ScoredTechnique { technique, score }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.technique.slug.cmp(&b.technique.slug))
        });
        ranked.truncate(k);

        RecommendationOutcome {
            ranked,
            relaxed,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssuranceGoal::*;

    fn goals(list: &[AssuranceGoal]) -> BTreeSet<AssuranceGoal> {
        list.iter().copied().collect()
    }

    fn topics(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn repo() -> Arc<TechniqueRepository> {
        Arc::new(
            TechniqueRepository::build(vec![
                Technique::new("t1", "Alpha", 1).goal(Fairness),
                Technique::new("t2", "Beta", 2).goal(Privacy),
                Technique::new("t3", "Gamma", 3)
                    .goal(Fairness)
                    .goal(Privacy)
                    .tag("bias-detection"),
            ])
            .unwrap(),
        )
    }

    fn candidate_slugs(session: &WizardSession) -> Vec<String> {
        session.candidates().iter().map(|t| t.slug.clone()).collect()
    }

    #[test]
    fn phases_progress_in_order() {
        let mut session = WizardSession::new(repo());
        assert_eq!(session.phase(), WizardPhase::Unanswered);
        assert_eq!(session.current_step().unwrap().id, "goals");

        session.answer(Answer::Goals(goals(&[Privacy]))).unwrap();
        assert_eq!(session.phase(), WizardPhase::InProgress);

        session.answer(Answer::ComplexityCeiling(5)).unwrap();
        session.answer(Answer::Topics(topics(&["bias-detection"]))).unwrap();
        assert_eq!(session.phase(), WizardPhase::Completed);
        assert!(session.current_step().is_none());

        // Completed is terminal for answering.
        assert_eq!(
            session.answer(Answer::Goals(goals(&[Safety]))),
            Err(WizardError::SessionCompleted)
        );
    }

    #[test]
    fn answers_must_match_the_current_step() {
        let mut session = WizardSession::new(repo());
        let err = session
            .answer(Answer::ComplexityCeiling(3))
            .expect_err("goals step should not accept a ceiling");
        assert!(matches!(err, WizardError::AnswerMismatch { .. }));
    }

    #[test]
    fn ceiling_outside_bounds_is_rejected() {
        let mut session = WizardSession::new(repo());
        session.answer(Answer::Goals(goals(&[]))).unwrap();
        assert_eq!(
            session.answer(Answer::ComplexityCeiling(7)),
            Err(WizardError::InvalidCeiling(7))
        );
    }

    #[test]
    fn undo_restores_the_exact_prior_candidate_set() {
        let mut session = WizardSession::new(repo());
        session.answer(Answer::Goals(goals(&[Fairness]))).unwrap();
        let before = candidate_slugs(&session);
        let phase_before = session.phase();

        session.answer(Answer::ComplexityCeiling(1)).unwrap();
        assert_eq!(candidate_slugs(&session), vec!["t1"]);

        let undone = session.undo_last().unwrap();
        assert_eq!(undone, Answer::ComplexityCeiling(1));
        assert_eq!(candidate_slugs(&session), before);
        assert_eq!(session.phase(), phase_before);

        // Popping everything returns to Unanswered.
        session.undo_last().unwrap();
        assert_eq!(session.phase(), WizardPhase::Unanswered);
        assert_eq!(session.candidates().len(), 3);
        assert!(session.undo_last().is_none());
    }

    #[test]
    fn undo_reopens_a_completed_session() {
        let mut session = WizardSession::new(repo());
        session.answer(Answer::Goals(goals(&[Privacy]))).unwrap();
        session.finish();
        assert_eq!(session.phase(), WizardPhase::Completed);

        session.undo_last().unwrap();
        assert_eq!(session.phase(), WizardPhase::Unanswered);
    }

    #[test]
    fn mandatory_privacy_with_soft_bias_detection_ranks_the_tagged_match_first() {
        let mut session = WizardSession::new(repo());
        session.answer(Answer::Goals(goals(&[Privacy]))).unwrap();
        session.answer(Answer::ComplexityCeiling(5)).unwrap();
        session.answer(Answer::Topics(topics(&["bias-detection"]))).unwrap();

        assert_eq!(candidate_slugs(&session), vec!["t2", "t3"]);

        let outcome = session.recommendations(10);
        assert!(outcome.relaxed.is_none());
        assert!(outcome.reason.is_none());

        let ranked: Vec<(String, usize)> = outcome
            .ranked
            .iter()
            .map(|s| (s.technique.slug.clone(), s.score))
            .collect();
        assert_eq!(ranked, vec![("t3".to_string(), 1), ("t2".to_string(), 0)]);
    }

    #[test]
    fn equal_scores_rank_by_slug_ascending() {
        let mut session = WizardSession::new(repo());
        session.answer(Answer::Goals(goals(&[Fairness, Privacy]))).unwrap();
        session.finish();

        let outcome = session.recommendations(2);
        let slugs: Vec<_> = outcome.ranked.iter().map(|s| s.technique.slug.clone()).collect();
        assert_eq!(slugs, vec!["t1", "t2"]);
    }

    #[test]
    fn empty_candidates_relax_the_oldest_mandatory_constraint_once() {
        let mut session = WizardSession::new(repo());
        // Nothing carries Safety, so the candidate set collapses here.
        session.answer(Answer::Goals(goals(&[Safety]))).unwrap();
        session.answer(Answer::ComplexityCeiling(2)).unwrap();
        session.finish();
        assert!(session.candidates().is_empty());

        let outcome = session.recommendations(10);
        // Dropping the goal constraint leaves the ceiling in force.
        assert!(outcome.relaxed.as_deref().unwrap().contains("Safety"));
        assert!(outcome.reason.is_none());
        let slugs: Vec<_> = outcome.ranked.iter().map(|s| s.technique.slug.clone()).collect();
        assert_eq!(slugs, vec!["t1", "t2"]);
    }

    #[test]
    fn still_empty_after_relaxation_reports_a_reason_not_an_error() {
        let repo = Arc::new(
            TechniqueRepository::build(vec![
                Technique::new("heavy", "Heavy", 4).goal(Privacy)
            ])
            .unwrap(),
        );
        let mut session = WizardSession::new(repo);
        session.answer(Answer::Goals(goals(&[Safety]))).unwrap();
        session.answer(Answer::ComplexityCeiling(1)).unwrap();
        session.finish();

        let outcome = session.recommendations(5);
        assert!(outcome.is_empty());
        assert!(outcome.relaxed.is_some());
        assert!(outcome.reason.is_some());
    }

    #[test]
    fn skipped_steps_apply_no_constraint() {
        let mut session = WizardSession::new(repo());
        session.answer(Answer::Goals(goals(&[]))).unwrap();
        session.answer(Answer::ComplexityCeiling(5)).unwrap();
        session.answer(Answer::Topics(topics(&[]))).unwrap();

        assert_eq!(session.candidates().len(), 3);
        assert!(session.mandatory_constraints().is_empty());
        assert!(session.soft_preferences().is_empty());
    }
}

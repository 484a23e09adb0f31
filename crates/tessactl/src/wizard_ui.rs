//! Interactive wizard
//!
//! Walks the question steps on stdin/stdout. `back` undoes the last
//! answer, `done` finishes early, an empty line skips the step.

use crate::display;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::collections::BTreeSet;
use std::io::{self, Write};
use tessa_common::wizard::{RecommendationOutcome, StepKind};
use tessa_common::{Answer, AssuranceGoal, CatalogLoader, WizardPhase, WizardSession};

/// Run the wizard to completion and print the top `top` suggestions.
pub async fn run(loader: &CatalogLoader, top: usize) -> Result<()> {
    let repo = loader.load().await?;
    let facets = loader.facet_options().await?;
    let mut session = WizardSession::new(repo);

    display::header("Technique wizard");
    display::hint("Answer each question; 'back' undoes, 'done' finishes early, empty skips.");

    while session.phase() != WizardPhase::Completed {
        let (kind, title, prompt) = match session.current_step() {
            Some(step) => (step.kind, step.title, step.prompt),
            None => break,
        };

        println!();
        println!(
            "{} {}",
            format!("[{}/{}]", session.answered() + 1, session.steps().len()).dimmed(),
            title.bold()
        );
        println!("{}", prompt);
        match kind {
            StepKind::Goals => print_options(&facets.goals.iter().map(|g| g.as_str().to_string()).collect::<Vec<_>>()),
            StepKind::Topics => print_options(&facets.tags),
            StepKind::ComplexityCeiling => {}
        }

        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // stdin closed; treat like finishing early
            session.finish();
            break;
        }
        let input = input.trim();

        if input.eq_ignore_ascii_case("back") {
            if session.undo_last().is_none() {
                display::hint("Nothing to undo yet.");
            }
            continue;
        }
        if input.eq_ignore_ascii_case("done") {
            session.finish();
            break;
        }

        let answer = match kind {
            StepKind::Goals => match parse_goal_answer(input, &facets.goals) {
                Ok(goals) => Answer::Goals(goals),
                Err(message) => {
                    display::error(&message);
                    continue;
                }
            },
            StepKind::ComplexityCeiling => match parse_ceiling(input) {
                Ok(ceiling) => Answer::ComplexityCeiling(ceiling),
                Err(message) => {
                    display::error(&message);
                    continue;
                }
            },
            StepKind::Topics => Answer::Topics(parse_topics(input)),
        };

        if let Err(err) = session.answer(answer) {
            display::error(&err.to_string());
            continue;
        }
        println!(
            "{}",
            format!("{} candidate(s) remaining", session.candidates().len()).dimmed()
        );
    }

    render_outcome(&session.recommendations(top));
    Ok(())
}

fn print_options(options: &[String]) {
    for (i, option) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, option);
    }
}

/// Accepts 1-based option numbers or goal names, comma separated.
/// Empty input selects nothing (no constraint).
fn parse_goal_answer(
    input: &str,
    options: &[AssuranceGoal],
) -> Result<BTreeSet<AssuranceGoal>, String> {
    let mut goals = BTreeSet::new();
    for token in tokens(input) {
        if let Ok(index) = token.parse::<usize>() {
            match index.checked_sub(1).and_then(|i| options.get(i)) {
                Some(goal) => {
                    goals.insert(*goal);
                }
                None => return Err(format!("No option number {}", index)),
            }
        } else {
            let goal = token.parse::<AssuranceGoal>()?;
            goals.insert(goal);
        }
    }
    Ok(goals)
}

/// Empty input means "no limit" (ceiling 5).
fn parse_ceiling(input: &str) -> Result<u8, String> {
    if input.is_empty() {
        return Ok(5);
    }
    let ceiling: u8 = input
        .parse()
        .map_err(|_| format!("'{}' is not a number between 1 and 5", input))?;
    if !(1..=5).contains(&ceiling) {
        return Err(format!("Complexity ceiling {} outside 1..=5", ceiling));
    }
    Ok(ceiling)
}

/// Comma-separated free-text tags; unknown tags simply never match.
fn parse_topics(input: &str) -> BTreeSet<String> {
    tokens(input).map(|t| t.to_string()).collect()
}

fn tokens(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn render_outcome(outcome: &RecommendationOutcome) {
    println!();
    if let Some(dropped) = &outcome.relaxed {
        display::hint(&format!(
            "No exact match; relaxed the earliest requirement ({}).",
            dropped
        ));
    }

    if outcome.ranked.is_empty() {
        println!("No recommendations.");
        if let Some(reason) = &outcome.reason {
            display::hint(reason);
        }
        return;
    }

    display::header("Recommended techniques");
    for (i, scored) in outcome.ranked.iter().enumerate() {
        let preference_note = match scored.score {
            0 => String::new(),
            1 => " · matches 1 preference".to_string(),
            n => format!(" · matches {} preferences", n),
        };
        println!(
            "  {}. {} {}{}",
            i + 1,
            scored.technique.name.bold(),
            format!("({})", scored.technique.slug).dimmed(),
            preference_note.dimmed()
        );
    }
    println!();
    display::hint("Run 'tessactl show <slug>' for details.");
}

//! CLI flag → filter specification mapping

use anyhow::{bail, Result};
use tessa_common::{AssuranceGoal, FacetSelection, SortDirection, SortField, SortSpec};

/// Build a facet selection from repeated `--goal`/`--tag`/`--complexity`
/// flags. Unknown goal names fail fast with the valid values listed.
pub fn selection_from_flags(
    goals: &[String],
    tags: &[String],
    complexities: &[u8],
) -> Result<FacetSelection> {
    let mut selection = FacetSelection::new();

    for goal in goals {
        match goal.parse::<AssuranceGoal>() {
            Ok(parsed) => selection.goals.insert(parsed),
            Err(_) => {
                let valid: Vec<&str> = AssuranceGoal::all().iter().map(|g| g.as_str()).collect();
                bail!("Unknown goal '{}'. Valid goals: {}", goal, valid.join(", "));
            }
        };
    }
    for tag in tags {
        selection.tags.insert(tag.clone());
    }
    for &level in complexities {
        if !(1..=5).contains(&level) {
            bail!("Complexity level {} outside 1..=5", level);
        }
        selection.complexities.insert(level);
    }

    Ok(selection)
}

/// Parse `--sort`/`--desc` into a sort specification.
pub fn parse_sort(field: &str, descending: bool) -> Result<SortSpec> {
    let field: SortField = field.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let direction = if descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    Ok(SortSpec::new(field, direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_build_a_selection() {
        let selection = selection_from_flags(
            &["fairness".to_string(), "Privacy".to_string()],
            &["bias-detection".to_string()],
            &[1, 2],
        )
        .unwrap();
        assert_eq!(selection.goals.len(), 2);
        assert!(selection.tags.contains("bias-detection"));
        assert_eq!(selection.complexities.len(), 2);
    }

    #[test]
    fn unknown_goal_lists_the_valid_ones() {
        let err = selection_from_flags(&["velocity".to_string()], &[], &[])
            .expect_err("unknown goal must fail");
        let message = err.to_string();
        assert!(message.contains("velocity"));
        assert!(message.contains("Fairness"));
    }

    #[test]
    fn out_of_range_complexity_is_rejected() {
        assert!(selection_from_flags(&[], &[], &[0]).is_err());
        assert!(selection_from_flags(&[], &[], &[6]).is_err());
    }

    #[test]
    fn sort_flags_parse() {
        let spec = parse_sort("complexity", true).unwrap();
        assert_eq!(spec.field, SortField::Complexity);
        assert_eq!(spec.direction, SortDirection::Descending);
        assert!(parse_sort("rank", false).is_err());
    }
}

//! Terminal output helpers
//!
//! Every user-facing message goes through here so the commands stay
//! consistent. Catalog errors are rendered with the affordance the
//! situation calls for: a retry hint for source failures, a
//! relax-your-filters hint for empty results — never a raw error dump.

use owo_colors::OwoColorize;
use tessa_common::CatalogError;

pub fn header(text: &str) {
    println!();
    println!("{}", text.bold());
    println!("{}", "─".repeat(text.chars().count().max(8)).dimmed());
}

pub fn hint(text: &str) {
    println!("{}", text.dimmed());
}

pub fn error(text: &str) {
    eprintln!("{} {}", "error:".red().bold(), text);
}

/// Filled/empty dots for a 1..=5 complexity rating.
pub fn complexity_meter(complexity: u8) -> String {
    let filled = complexity.min(5) as usize;
    format!("{}{}", "●".repeat(filled), "○".repeat(5 - filled))
}

/// Render a failure at the catalog boundary and return the exit code.
pub fn render_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CatalogError>() {
        Some(CatalogError::SourceUnavailable(detail)) => {
            error(&format!("technique source unavailable: {}", detail));
            hint("Check the source configuration (tessactl --source, TESSA_SOURCE) and retry.");
        }
        Some(CatalogError::NotFound(slug)) => {
            error(&format!("no technique with slug '{}'", slug));
            hint("Use 'tessactl list' to browse available slugs.");
        }
        Some(CatalogError::EmptyCatalog) => {
            error("the catalog contains no usable techniques");
            hint("The source answered, but every record was empty or malformed.");
        }
        Some(other) => error(&other.to_string()),
        None => error(&format!("{:#}", err)),
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_meter_is_always_five_dots_wide() {
        assert_eq!(complexity_meter(1), "●○○○○");
        assert_eq!(complexity_meter(5), "●●●●●");
        assert_eq!(complexity_meter(9), "●●●●●");
        for c in 1..=5 {
            assert_eq!(complexity_meter(c).chars().count(), 5);
        }
    }
}

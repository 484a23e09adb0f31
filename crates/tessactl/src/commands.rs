//! Subcommand implementations
//!
//! Each command talks to the catalog only through the loader, the
//! filter engine, and the table view model.

use crate::display;
use crate::query;
use anyhow::Result;
use console::truncate_str;
use owo_colors::OwoColorize;
use tessa_common::{CatalogLoader, SourceMode, TableViewModel, Technique, TessaConfig};

/// Flags for `tessactl list`.
pub struct ListOptions {
    pub goals: Vec<String>,
    pub tags: Vec<String>,
    pub complexities: Vec<u8>,
    pub search: Option<String>,
    pub sort: String,
    pub descending: bool,
    pub page: usize,
    pub page_size: usize,
    pub json: bool,
}

/// Browse the catalog: filter, sort, paginate, render one page.
pub async fn list(loader: &CatalogLoader, options: ListOptions) -> Result<()> {
    let selection =
        query::selection_from_flags(&options.goals, &options.tags, &options.complexities)?;
    let sort = query::parse_sort(&options.sort, options.descending)?;

    let repo = loader.load().await?;
    let mut table = TableViewModel::new(repo, options.page_size.max(1));
    table.set_filter(selection);
    table.set_query(options.search.clone());
    table.set_sort(sort);
    table.set_page(options.page);

    if options.json {
        let rows: Vec<&Technique> = table.visible_slice().iter().map(|t| t.as_ref()).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if table.total_count() == 0 {
        println!("No techniques match the current filters.");
        display::hint("Relax a filter or drop the search term and try again.");
        return Ok(());
    }

    display::header("Techniques");
    println!(
        "{:<36} {:<34} {:<28} {}",
        "SLUG".bold(),
        "NAME".bold(),
        "GOALS".bold(),
        "COMPLEXITY".bold()
    );
    for technique in table.visible_slice() {
        let goals: Vec<&str> = technique.assurance_goals.iter().map(|g| g.as_str()).collect();
        println!(
            "{:<36} {:<34} {:<28} {}",
            truncate_str(&technique.slug, 34, "…"),
            truncate_str(&technique.name, 32, "…"),
            truncate_str(&goals.join(", "), 26, "…"),
            display::complexity_meter(technique.complexity)
        );
    }
    println!();
    println!(
        "{}",
        format!(
            "Page {}/{} · {} technique(s)",
            table.page() + 1,
            table.total_pages(),
            table.total_count()
        )
        .dimmed()
    );
    Ok(())
}

/// Show one technique in full.
pub async fn show(loader: &CatalogLoader, slug: &str, fresh: bool, json: bool) -> Result<()> {
    // --fresh bypasses the cached snapshot and asks the source directly.
    let technique = if fresh {
        std::sync::Arc::new(loader.fetch_detail(slug).await?)
    } else {
        loader.technique(slug).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(technique.as_ref())?);
        return Ok(());
    }

    display::header(&technique.name);
    println!("{} {}", "slug:".dimmed(), technique.slug);
    let goals: Vec<&str> = technique.assurance_goals.iter().map(|g| g.as_str()).collect();
    println!("{} {}", "goals:".dimmed(), goals.join(", "));
    println!(
        "{} {} ({})",
        "complexity:".dimmed(),
        technique.complexity,
        display::complexity_meter(technique.complexity)
    );
    if !technique.tags.is_empty() {
        let tags: Vec<&str> = technique.tags.iter().map(String::as_str).collect();
        println!("{} {}", "tags:".dimmed(), tags.join(", "));
    }
    if !technique.description.is_empty() {
        println!();
        println!("{}", technique.description);
    }

    if !technique.limitations.is_empty() {
        println!();
        println!("{}", "Limitations".bold());
        for limitation in &technique.limitations {
            println!("  • {}", limitation.description);
        }
    }

    if !technique.example_use_cases.is_empty() {
        println!();
        println!("{}", "Example use cases".bold());
        for use_case in &technique.example_use_cases {
            if use_case.goal.is_empty() {
                println!("  • {}", use_case.description);
            } else {
                println!("  • [{}] {}", use_case.goal, use_case.description);
            }
        }
    }

    // Dangling related slugs are filtered by the repository, so only
    // resolvable neighbours render.
    if !fresh {
        let related = loader.load().await?.related_to(&technique.slug)?;
        if !related.is_empty() {
            println!();
            println!("{}", "Related techniques".bold());
            for neighbour in related {
                println!("  • {} ({})", neighbour.name, neighbour.slug.dimmed());
            }
        }
    }

    Ok(())
}

/// List the complete assurance-goal facet.
pub async fn goals(loader: &CatalogLoader) -> Result<()> {
    let facets = loader.facet_options().await?;
    let repo = loader.load().await?;

    display::header("Assurance goals");
    for goal in &facets.goals {
        let count = repo.by_goal(*goal).len();
        println!("  {:<16} {}", goal.as_str(), format!("{} technique(s)", count).dimmed());
    }
    println!();
    println!(
        "{}",
        format!(
            "Catalog: {} technique(s), loaded {}",
            repo.len(),
            repo.loaded_at().format("%Y-%m-%d %H:%M:%S UTC")
        )
        .dimmed()
    );
    Ok(())
}

/// Show the effective configuration, or persist a new source mode.
pub fn config(set_source: Option<String>) -> Result<()> {
    let mut config = TessaConfig::load()?;

    if let Some(mode) = set_source {
        let mode: SourceMode = mode.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        config.source.mode = mode;
        config.save()?;
        println!("Source mode set to '{}'.", mode);
        return Ok(());
    }

    display::header("Configuration");
    println!("{} {}", "source mode:".dimmed(), config.source.mode);
    println!(
        "{} {}",
        "snapshot path:".dimmed(),
        config.source.snapshot_path.display()
    );
    println!("{} {}", "remote url:".dimmed(), config.source.remote_url);
    println!(
        "{} {}s",
        "request timeout:".dimmed(),
        config.source.request_timeout_secs
    );
    Ok(())
}

/// List the complete tag facet.
pub async fn tags(loader: &CatalogLoader) -> Result<()> {
    let facets = loader.facet_options().await?;
    let repo = loader.load().await?;

    display::header("Tags");
    for tag in &facets.tags {
        let count = repo.by_tag(tag).len();
        println!("  {:<28} {}", tag, format!("{} technique(s)", count).dimmed());
    }
    Ok(())
}

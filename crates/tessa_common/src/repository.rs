//! Indexed catalog snapshot
//!
//! Built once from a validated record list, then read-only. Readers hold
//! the whole snapshot behind an `Arc`, so a refresh can swap in a new
//! repository without anyone observing a half-built index.

use crate::error::CatalogError;
use crate::types::{AssuranceGoal, Technique};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable indexed snapshot of the catalog.
#[derive(Debug)]
pub struct TechniqueRepository {
    /// Records in source payload order.
    techniques: Vec<Arc<Technique>>,
    by_slug: HashMap<String, usize>,
    by_goal: HashMap<AssuranceGoal, Vec<usize>>,
    by_tag: HashMap<String, Vec<usize>>,
    loaded_at: DateTime<Utc>,
}

impl TechniqueRepository {
    /// Build the snapshot and its inverted indices.
    ///
    /// Fails with `DuplicateSlug` if two records share a slug; identity
    /// must stay unambiguous, so the collision is never resolved by
    /// silently dropping a record.
    pub fn build(records: Vec<Technique>) -> Result<Self, CatalogError> {
        let techniques: Vec<Arc<Technique>> = records.into_iter().map(Arc::new).collect();

        let mut by_slug = HashMap::with_capacity(techniques.len());
        let mut by_goal: HashMap<AssuranceGoal, Vec<usize>> = HashMap::new();
        let mut by_tag: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, technique) in techniques.iter().enumerate() {
            if by_slug.insert(technique.slug.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateSlug(technique.slug.clone()));
            }
            for goal in &technique.assurance_goals {
                by_goal.entry(*goal).or_default().push(idx);
            }
            for tag in &technique.tags {
                by_tag.entry(tag.clone()).or_default().push(idx);
            }
        }

        Ok(TechniqueRepository {
            techniques,
            by_slug,
            by_goal,
            by_tag,
            loaded_at: Utc::now(),
        })
    }

    /// Full record list, in source order.
    pub fn all(&self) -> Vec<Arc<Technique>> {
        self.techniques.clone()
    }

    pub fn len(&self) -> usize {
        self.techniques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// O(1) detail lookup.
    pub fn get(&self, slug: &str) -> Result<Arc<Technique>, CatalogError> {
        self.by_slug
            .get(slug)
            .map(|&idx| Arc::clone(&self.techniques[idx]))
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))
    }

    /// Techniques carrying the goal, via the precomputed index.
    pub fn by_goal(&self, goal: AssuranceGoal) -> Vec<Arc<Technique>> {
        self.by_goal
            .get(&goal)
            .map(|idxs| idxs.iter().map(|&i| Arc::clone(&self.techniques[i])).collect())
            .unwrap_or_default()
    }

    /// Techniques carrying the tag, via the precomputed index.
    pub fn by_tag(&self, tag: &str) -> Vec<Arc<Technique>> {
        self.by_tag
            .get(tag)
            .map(|idxs| idxs.iter().map(|&i| Arc::clone(&self.techniques[i])).collect())
            .unwrap_or_default()
    }

    /// Goals observed in the snapshot, in display order.
    pub fn goals(&self) -> Vec<AssuranceGoal> {
        AssuranceGoal::all()
            .into_iter()
            .filter(|g| self.by_goal.contains_key(g))
            .collect()
    }

    /// Tags observed in the snapshot, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.by_tag.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Resolve a technique's related slugs against the snapshot.
    /// Dangling references are dropped here, not reported.
    pub fn related_to(&self, slug: &str) -> Result<Vec<Arc<Technique>>, CatalogError> {
        let technique = self.get(slug)?;
        Ok(technique
            .related_slugs
            .iter()
            .filter_map(|related| {
                self.by_slug
                    .get(related)
                    .map(|&idx| Arc::clone(&self.techniques[idx]))
            })
            .collect())
    }
}

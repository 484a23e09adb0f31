//! Catalog loader
//!
//! Owns the source adapter and the cached snapshot. This is the only
//! place that suspends: everything downstream of a loaded snapshot is
//! synchronous computation. Construct one loader at startup and pass it
//! around; tests build their own with a mock adapter.

use crate::error::CatalogError;
use crate::repository::TechniqueRepository;
use crate::source::SourceAdapter;
use crate::types::{FacetOptions, Technique};
use crate::config::TessaConfig;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct CatalogCache {
    repo: Option<Arc<TechniqueRepository>>,
    facets: Option<Arc<FacetOptions>>,
}

/// Loads, validates and caches catalog snapshots.
#[derive(Debug)]
pub struct CatalogLoader {
    adapter: SourceAdapter,
    cache: Mutex<CatalogCache>,
}

impl CatalogLoader {
    pub fn new(adapter: SourceAdapter) -> Self {
        CatalogLoader {
            adapter,
            cache: Mutex::new(CatalogCache::default()),
        }
    }

    pub fn from_config(config: &TessaConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(SourceAdapter::from_config(&config.source)?))
    }

    /// Load the catalog, reusing the cached snapshot when present.
    ///
    /// The cache lock is held across the fetch, so concurrent loads
    /// share one underlying request: the first caller fetches, the rest
    /// wait on the lock and then read the freshly filled cache. Callers
    /// arriving after completion get the cached `Arc` immediately.
    pub async fn load(&self) -> Result<Arc<TechniqueRepository>, CatalogError> {
        let mut cache = self.cache.lock().await;
        if let Some(repo) = &cache.repo {
            debug!("Catalog cache hit ({} techniques)", repo.len());
            return Ok(Arc::clone(repo));
        }

        let repo = self.fetch_snapshot().await?;
        cache.repo = Some(Arc::clone(&repo));
        Ok(repo)
    }

    /// Force a new fetch. The old snapshot stays valid and visible to
    /// readers until the new one is fully built; on failure it is kept
    /// and the error is returned.
    pub async fn refresh(&self) -> Result<Arc<TechniqueRepository>, CatalogError> {
        let repo = self.fetch_snapshot().await?;

        let mut cache = self.cache.lock().await;
        cache.repo = Some(Arc::clone(&repo));
        // Declared facet lists may have changed along with the catalog.
        cache.facets = None;
        Ok(repo)
    }

    async fn fetch_snapshot(&self) -> Result<Arc<TechniqueRepository>, CatalogError> {
        let records = self.adapter.fetch_all().await?;
        if records.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let repo = TechniqueRepository::build(records)?;
        info!("Catalog snapshot built: {} techniques", repo.len());
        Ok(Arc::new(repo))
    }

    /// Detail lookup on the cached snapshot (loading it if needed).
    pub async fn technique(&self, slug: &str) -> Result<Arc<Technique>, CatalogError> {
        self.load().await?.get(slug)
    }

    /// Fetch one record straight from the source, bypassing the cache.
    pub async fn fetch_detail(&self, slug: &str) -> Result<Technique, CatalogError> {
        self.adapter.fetch_by_slug(slug).await
    }

    /// Complete facet option lists: whatever the source declares, merged
    /// with the values the loaded records actually carry.
    pub async fn facet_options(&self) -> Result<Arc<FacetOptions>, CatalogError> {
        {
            let cache = self.cache.lock().await;
            if let Some(facets) = &cache.facets {
                return Ok(Arc::clone(facets));
            }
        }

        let repo = self.load().await?;
        let declared = self.adapter.fetch_facets().await?;

        let mut goals = declared.goals;
        for goal in repo.goals() {
            if !goals.contains(&goal) {
                goals.push(goal);
            }
        }
        goals.sort();

        let mut tags = declared.tags;
        for tag in repo.tags() {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags.sort();

        let facets = Arc::new(FacetOptions { goals, tags });
        let mut cache = self.cache.lock().await;
        cache.facets = Some(Arc::clone(&facets));
        Ok(facets)
    }
}

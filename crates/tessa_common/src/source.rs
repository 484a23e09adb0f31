//! Catalog source adapters
//!
//! The closed set of places a catalog can come from: a bundled snapshot
//! file, the remote technique service, or in-memory fixtures. One
//! variant is selected from configuration at startup; nothing inspects
//! types at runtime, callers just match on the enum.

use crate::config::{SourceConfig, SourceMode};
use crate::error::CatalogError;
use crate::schema;
use crate::types::{AssuranceGoal, FacetOptions, Technique};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One catalog source, selected once per session.
#[derive(Debug, Clone)]
pub enum SourceAdapter {
    Snapshot(SnapshotSource),
    Remote(RemoteSource),
    Mock(MockSource),
}

impl SourceAdapter {
    /// Build the adapter the configuration names.
    pub fn from_config(config: &SourceConfig) -> Result<Self, CatalogError> {
        match config.mode {
            SourceMode::Snapshot => Ok(SourceAdapter::Snapshot(SnapshotSource::new(
                config.snapshot_path.clone(),
            ))),
            SourceMode::Remote => Ok(SourceAdapter::Remote(RemoteSource::new(
                &config.remote_url,
                Duration::from_secs(config.request_timeout_secs),
            )?)),
            SourceMode::Mock => Ok(SourceAdapter::Mock(MockSource::sample())),
        }
    }

    /// Fetch and validate the full record list.
    pub async fn fetch_all(&self) -> Result<Vec<Technique>, CatalogError> {
        match self {
            SourceAdapter::Snapshot(s) => s.fetch_all().await,
            SourceAdapter::Remote(s) => s.fetch_all().await,
            SourceAdapter::Mock(s) => s.fetch_all(),
        }
    }

    /// Fetch one record by slug.
    pub async fn fetch_by_slug(&self, slug: &str) -> Result<Technique, CatalogError> {
        match self {
            SourceAdapter::Snapshot(s) => s.fetch_by_slug(slug).await,
            SourceAdapter::Remote(s) => s.fetch_by_slug(slug).await,
            SourceAdapter::Mock(s) => s.fetch_by_slug(slug),
        }
    }

    /// Fetch the declared facet option lists. May be narrower than what
    /// the records actually carry; the loader merges both views.
    pub async fn fetch_facets(&self) -> Result<FacetOptions, CatalogError> {
        match self {
            SourceAdapter::Snapshot(s) => s.fetch_facets().await,
            SourceAdapter::Remote(s) => s.fetch_facets().await,
            SourceAdapter::Mock(s) => Ok(s.fetch_facets()),
        }
    }
}

/// Pre-materialized JSON payload bundled at build time.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
}

impl SnapshotSource {
    pub fn new(path: PathBuf) -> Self {
        SnapshotSource { path }
    }

    async fn read_payload(&self) -> Result<schema::CatalogPayload, CatalogError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CatalogError::SourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        schema::parse_payload(&text)
    }

    pub async fn fetch_all(&self) -> Result<Vec<Technique>, CatalogError> {
        let payload = self.read_payload().await?;
        debug!(
            "Snapshot payload from {}: {} raw records",
            self.path.display(),
            payload.records.len()
        );
        Ok(schema::validate_records(payload.records))
    }

    pub async fn fetch_by_slug(&self, slug: &str) -> Result<Technique, CatalogError> {
        self.fetch_all()
            .await?
            .into_iter()
            .find(|t| t.slug == slug)
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))
    }

    pub async fn fetch_facets(&self) -> Result<FacetOptions, CatalogError> {
        let payload = self.read_payload().await?;
        let mut tags = payload.declared_tags;
        tags.sort();
        tags.dedup();
        Ok(FacetOptions {
            goals: schema::parse_goal_list(&payload.declared_goals),
            tags,
        })
    }
}

/// Remote technique service.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tessa/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::SourceUnavailable(e.to_string()))?;

        Ok(RemoteSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_text(&self, path: &str) -> Result<String, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::SourceUnavailable(format!("{}: {}", url, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url));
        }
        if !response.status().is_success() {
            return Err(CatalogError::SourceUnavailable(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| CatalogError::SourceUnavailable(format!("{}: {}", url, e)))
    }

    pub async fn fetch_all(&self) -> Result<Vec<Technique>, CatalogError> {
        let text = self.get_text("/api/techniques").await?;
        let payload = schema::parse_payload(&text)?;
        Ok(schema::validate_records(payload.records))
    }

    pub async fn fetch_by_slug(&self, slug: &str) -> Result<Technique, CatalogError> {
        let text = self
            .get_text(&format!("/api/techniques/{}", slug))
            .await
            .map_err(|e| match e {
                // A 404 from the detail endpoint means the slug, not the
                // service, is missing.
                CatalogError::NotFound(_) => CatalogError::NotFound(slug.to_string()),
                other => other,
            })?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| CatalogError::SchemaValidation(e.to_string()))?;
        schema::validate_one(value)
    }

    /// The auxiliary endpoints enumerate the full goal and tag sets so
    /// facet menus are complete even before any record referencing them
    /// has been fetched.
    pub async fn fetch_facets(&self) -> Result<FacetOptions, CatalogError> {
        let goals_text = self.get_text("/api/assurance-goals").await?;
        let goal_names: Vec<String> = serde_json::from_str(&goals_text)
            .map_err(|e| CatalogError::SchemaValidation(e.to_string()))?;

        let tags_text = self.get_text("/api/tags").await?;
        let mut tags: Vec<String> = serde_json::from_str(&tags_text)
            .map_err(|e| CatalogError::SchemaValidation(e.to_string()))?;
        tags.sort();
        tags.dedup();

        Ok(FacetOptions {
            goals: schema::parse_goal_list(&goal_names),
            tags,
        })
    }
}

/// In-memory fixture source, for tests and `--source mock`.
#[derive(Debug, Clone)]
pub struct MockSource {
    inner: Arc<MockInner>,
}

#[derive(Debug)]
struct MockInner {
    records: Vec<Technique>,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl MockSource {
    pub fn new(records: Vec<Technique>) -> Self {
        MockSource {
            inner: Arc::new(MockInner {
                records,
                failing: AtomicBool::new(false),
                fetches: AtomicUsize::new(0),
            }),
        }
    }

    /// Built-in fixture catalog, small but shaped like the real thing.
    pub fn sample() -> Self {
        use AssuranceGoal::*;
        Self::new(vec![
            Technique::new("shapley-additive-explanations", "Shapley Additive Explanations", 3)
                .description("Attributes a prediction to input features using Shapley values")
                .goal(Explainability)
                .tag("feature-attribution")
                .tag("post-hoc")
                .related("counterfactual-explanations"),
            Technique::new("counterfactual-explanations", "Counterfactual Explanations", 2)
                .description("Minimal input changes that flip a model decision")
                .goal(Explainability)
                .goal(Fairness)
                .tag("post-hoc")
                .related("shapley-additive-explanations"),
            Technique::new("differential-privacy", "Differential Privacy", 4)
                .description("Noise-calibrated guarantees limiting what one record reveals")
                .goal(Privacy)
                .tag("training-time")
                .limitation("Accuracy degrades at strong privacy budgets"),
            Technique::new("demographic-parity-testing", "Demographic Parity Testing", 1)
                .description("Compares positive outcome rates across protected groups")
                .goal(Fairness)
                .tag("bias-detection")
                .tag("evaluation"),
            Technique::new("adversarial-robustness-testing", "Adversarial Robustness Testing", 4)
                .description("Probes model behaviour under crafted perturbations")
                .goal(Reliability)
                .goal(Safety)
                .tag("evaluation")
                .use_case("Safety", "Stress-testing a perception model before deployment"),
        ])
    }

    /// Toggle forced failure; clones share the flag.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of fetch_all calls that reached the underlying "source".
    pub fn fetch_count(&self) -> usize {
        self.inner.fetches.load(Ordering::SeqCst)
    }

    pub fn fetch_all(&self) -> Result<Vec<Technique>, CatalogError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::SourceUnavailable(
                "mock source forced offline".to_string(),
            ));
        }
        self.inner.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.records.clone())
    }

    pub fn fetch_by_slug(&self, slug: &str) -> Result<Technique, CatalogError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(CatalogError::SourceUnavailable(
                "mock source forced offline".to_string(),
            ));
        }
        self.inner
            .records
            .iter()
            .find(|t| t.slug == slug)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(slug.to_string()))
    }

    pub fn fetch_facets(&self) -> FacetOptions {
        let mut goals = Vec::new();
        let mut tags = Vec::new();
        for technique in &self.inner.records {
            for goal in &technique.assurance_goals {
                if !goals.contains(goal) {
                    goals.push(*goal);
                }
            }
            for tag in &technique.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        goals.sort();
        tags.sort();
        FacetOptions { goals, tags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssuranceGoal::*;

    #[test]
    fn mock_source_serves_fixtures_and_counts_fetches() {
        let mock = MockSource::sample();
        assert_eq!(mock.fetch_count(), 0);
        let records = mock.fetch_all().unwrap();
        assert!(!records.is_empty());
        assert_eq!(mock.fetch_count(), 1);

        let detail = mock.fetch_by_slug("differential-privacy").unwrap();
        assert!(detail.assurance_goals.contains(&Privacy));
        assert!(matches!(
            mock.fetch_by_slug("missing"),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn mock_source_failure_flag_is_shared_across_clones() {
        let mock = MockSource::sample();
        let clone = mock.clone();
        clone.set_failing(true);
        assert!(matches!(
            mock.fetch_all(),
            Err(CatalogError::SourceUnavailable(_))
        ));
        clone.set_failing(false);
        assert!(mock.fetch_all().is_ok());
    }

    #[test]
    fn mock_facets_cover_the_fixture_records() {
        let facets = MockSource::sample().fetch_facets();
        assert!(facets.goals.contains(&Fairness));
        assert!(facets.tags.contains(&"bias-detection".to_string()));
    }

    #[tokio::test]
    async fn adapter_selection_follows_the_config() {
        let config = SourceConfig {
            mode: SourceMode::Mock,
            ..SourceConfig::default()
        };
        let adapter = SourceAdapter::from_config(&config).unwrap();
        assert!(matches!(adapter, SourceAdapter::Mock(_)));
        assert!(!adapter.fetch_all().await.unwrap().is_empty());
    }
}

//! Tessa Common - Technique catalog core
//!
//! Everything between the raw technique sources and the surfaces that
//! render them: source adapters, the caching loader, the indexed
//! repository snapshot, the faceted filter engine, the recommendation
//! wizard and the browse-table view model. Consumers interact with the
//! catalog only through these types.

pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod repository;
pub mod schema;
pub mod source;
pub mod table;
pub mod types;
pub mod wizard;

pub use config::{SourceConfig, SourceMode, TessaConfig};
pub use error::CatalogError;
pub use filter::{FacetSelection, SortDirection, SortField, SortSpec};
pub use loader::CatalogLoader;
pub use repository::TechniqueRepository;
pub use source::{MockSource, RemoteSource, SnapshotSource, SourceAdapter};
pub use table::TableViewModel;
pub use types::{AssuranceGoal, ExampleUseCase, FacetOptions, Limitation, Technique};
pub use wizard::{
    Answer, RecommendationOutcome, ScoredTechnique, WizardError, WizardPhase, WizardSession,
    WizardStep,
};

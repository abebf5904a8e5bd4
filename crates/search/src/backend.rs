use crate::error::Result;
use crate::suggestion::Suggestion;
use crate::types::{FileMatch, PatternInfo, RepositoryRevisions, ResultCommon};
use async_trait::async_trait;
use scout_query::Query;
use std::sync::Arc;

/// What the repository resolver hands back: the query's working repository
/// set and any repository suggestions derived from it.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub repo_revs: Vec<RepositoryRevisions>,
    pub suggestions: Vec<Suggestion>,
}

/// Resolves repository name patterns to concrete repositories.
#[async_trait]
pub trait RepositoryResolver: Send + Sync {
    /// Resolve the working repository set. Non-empty `pattern_values`
    /// override the query's own repository patterns.
    async fn resolve(&self, pattern_values: &[String]) -> Result<Resolved>;
}

/// Full-text search over file contents and paths. Each call is independent
/// and stateless from the backend's perspective; results are file matches
/// only.
#[async_trait]
pub trait ContentSearch: Send + Sync {
    async fn search(
        &self,
        pattern: &PatternInfo,
        repos: &[RepositoryRevisions],
        query: &Query,
    ) -> Result<(Vec<FileMatch>, ResultCommon)>;
}

/// Symbol search; matching files carry their matched symbols.
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search_symbols(
        &self,
        pattern: &PatternInfo,
        repos: &[RepositoryRevisions],
        query: &Query,
        limit: usize,
    ) -> Result<(Vec<FileMatch>, ResultCommon)>;
}

/// Path-name suggestion lookup.
#[async_trait]
pub trait PathSuggester: Send + Sync {
    async fn suggest_file_paths(&self, limit: usize) -> Result<Vec<Suggestion>>;
}

/// The sub-search collaborators, injected at construction time.
#[derive(Clone)]
pub struct Backends {
    pub repositories: Arc<dyn RepositoryResolver>,
    pub content: Arc<dyn ContentSearch>,
    pub symbols: Arc<dyn SymbolSearch>,
    pub paths: Arc<dyn PathSuggester>,
}

mod backend;
mod error;
mod rank;
mod repo_filter;
mod suggest;
mod suggestion;
mod types;

pub use backend::{Backends, ContentSearch, PathSuggester, RepositoryResolver, Resolved, SymbolSearch};
pub use error::{Result, SearchError};
pub use rank::{clamp_first, dedupe, sort_suggestions, MAX_SUGGESTIONS};
pub use repo_filter::filter_repositories;
pub use suggest::{SuggestOptions, SuggestionEngine};
pub use suggestion::{DedupKey, FileRef, Suggestion, SuggestionTarget, SymbolRef};
pub use types::{
    FileMatch, PatternInfo, Repo, RepositoryRevisions, ResultCommon, SymbolKind, SymbolMatch,
};

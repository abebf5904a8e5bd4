use crate::backend::Backends;
use crate::error::{Result, SearchError};
use crate::rank::{clamp_first, dedupe, sort_suggestions, MAX_SUGGESTIONS};
use crate::suggestion::Suggestion;
use crate::types::{FileMatch, PatternInfo, SymbolKind, SymbolMatch};
use scout_query::{fields, Query};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const MAX_BOOSTED_SYMBOL_RESULTS: usize = 3;
const SYMBOL_BOOST: i32 = 200;

/// Deadlines and limits for one suggestion request.
#[derive(Debug, Clone)]
pub struct SuggestOptions {
    /// Hard upper bound applied to every source, layered over the
    /// source-specific deadlines below. Whichever fires first wins.
    pub overall_deadline: Duration,
    pub file_path_deadline: Duration,
    pub symbol_deadline: Duration,
    /// The full-text source gets the tightest budget: it is the most
    /// expensive and the least essential to surface quickly.
    pub text_deadline: Duration,
    /// How many file matches the symbol backend is asked for.
    pub symbol_search_limit: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            overall_deadline: Duration::from_secs(3),
            file_path_deadline: Duration::from_secs(1),
            symbol_deadline: Duration::from_secs(1),
            text_deadline: Duration::from_millis(500),
            symbol_search_limit: 7,
        }
    }
}

/// Produces ranked, deduplicated search suggestions by fanning out across
/// the activated suggestion sources concurrently, each under its own
/// deadline.
pub struct SuggestionEngine {
    backends: Backends,
    options: SuggestOptions,
}

impl SuggestionEngine {
    #[must_use]
    pub fn new(backends: Backends) -> Self {
        Self::with_options(backends, SuggestOptions::default())
    }

    #[must_use]
    pub fn with_options(backends: Backends, options: SuggestOptions) -> Self {
        Self { backends, options }
    }

    /// Ranked suggestions for `query`, at most `first` of them (clamped to
    /// [`MAX_SUGGESTIONS`]).
    ///
    /// Sources that time out or choke on bad input contribute nothing; any
    /// other source failure surfaces as an error only when no source
    /// produced candidates. Callers should expect a possibly-partial,
    /// possibly-empty list far more often than an error.
    pub async fn suggestions(&self, query: &Query, first: Option<i32>) -> Result<Vec<Suggestion>> {
        let count = clamp_first(first);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        // Only suggest for type:file.
        for value in query.values(fields::FIELD_TYPE) {
            if value != "file" {
                return Ok(Vec::new());
            }
        }

        let query = Arc::new(query.clone());
        let mut branches: Vec<(&'static str, JoinHandle<Result<Vec<Suggestion>>>)> = Vec::new();

        if let Some(values) = repo_source_values(&query) {
            let backends = self.backends.clone();
            branches.push((
                "repository-name",
                self.spawn_branch(async move {
                    let resolved = backends.repositories.resolve(&values).await?;
                    Ok(resolved.suggestions)
                }),
            ));
        }

        if file_path_source_active(&query) {
            let backends = self.backends.clone();
            let deadline = self.options.file_path_deadline;
            branches.push((
                "file-path",
                self.spawn_branch(async move {
                    timeout(deadline, backends.paths.suggest_file_paths(MAX_SUGGESTIONS)).await?
                }),
            ));
        }

        // The symbol source has no shape gate beyond normal query resolution.
        {
            let backends = self.backends.clone();
            let query = Arc::clone(&query);
            let deadline = self.options.symbol_deadline;
            let limit = self.options.symbol_search_limit;
            branches.push((
                "symbol",
                self.spawn_branch(symbol_suggestions(backends, query, deadline, limit)),
            ));
        }

        if !query.values(fields::FIELD_DEFAULT).is_empty() {
            let backends = self.backends.clone();
            let query = Arc::clone(&query);
            let deadline = self.options.text_deadline;
            branches.push((
                "full-text",
                self.spawn_branch(text_suggestions(backends, query, deadline, count)),
            ));
        }

        log::debug!("suggestion fan-out: {} sources activated", branches.len());

        // Wait for every branch: the sources contribute complementary
        // candidate types, so there is nothing to race.
        let mut outcomes = Vec::with_capacity(branches.len());
        for (source, handle) in branches {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(SearchError::Internal(format!(
                    "suggestion task failed: {err}"
                ))),
            };
            outcomes.push(BranchOutcome { source, result });
        }

        let (merged, failure) = reduce_outcomes(outcomes);
        if let Some(err) = failure {
            if merged.is_empty() {
                return Err(err);
            }
            log::error!("error getting search suggestions: {err}");
        }

        let mut suggestions = dedupe(merged);
        sort_suggestions(&mut suggestions);
        suggestions.truncate(count);
        Ok(suggestions)
    }

    fn spawn_branch<F>(&self, source: F) -> JoinHandle<Result<Vec<Suggestion>>>
    where
        F: Future<Output = Result<Vec<Suggestion>>> + Send + 'static,
    {
        let overall = self.options.overall_deadline;
        tokio::spawn(async move {
            match timeout(overall, source).await {
                Ok(result) => result,
                Err(_) => Err(SearchError::DeadlineExceeded),
            }
        })
    }
}

struct BranchOutcome {
    source: &'static str,
    result: Result<Vec<Suggestion>>,
}

/// Merge branch outcomes under the per-class error policy: timeouts are
/// skipped with a warning, bad user input is skipped silently, and the
/// first remaining failure is handed back for the caller to surface or
/// suppress depending on whether any candidates were merged.
fn reduce_outcomes(outcomes: Vec<BranchOutcome>) -> (Vec<Suggestion>, Option<SearchError>) {
    let mut merged = Vec::new();
    let mut failure = None;
    for outcome in outcomes {
        match outcome.result {
            Ok(suggestions) => merged.extend(suggestions),
            Err(err) if err.is_timeout() => {
                log::warn!(
                    "suggestion source {} exceeded deadline (skipping)",
                    outcome.source
                );
            }
            Err(err) if err.is_bad_request() => {
                // Bad input means zero suggestions from this source; other
                // sources may still understand the query.
            }
            Err(err) => {
                if failure.is_none() {
                    failure = Some(err);
                } else {
                    log::error!("suggestion source {} failed: {err}", outcome.source);
                }
            }
        }
    }
    (merged, failure)
}

/// The effective repository patterns when the query is a single
/// repository-like term: either one free-text term (with at most a
/// repogroup beside it), or pure `repo:` values (ditto). Values that do not
/// compile are dropped rather than failing the source; `None` means the
/// source stays inactive.
fn repo_source_values(query: &Query) -> Option<Vec<String>> {
    let default_values = query.values(fields::FIELD_DEFAULT);
    let (repo_values, _) = query.regexp_patterns(fields::FIELD_REPO);
    let repo_group_count = query.values(fields::FIELD_REPO_GROUP).len();
    let field_count = query.field_count();

    let mut effective: Vec<String> = Vec::new();
    if default_values.len() == 1
        && (field_count == 1 || (field_count == 2 && repo_group_count == 1))
    {
        effective.push(default_values[0].clone());
    } else if !repo_values.is_empty()
        && ((repo_group_count > 0 && field_count == 2)
            || (repo_group_count == 0 && field_count == 1))
    {
        effective = repo_values;
    }

    effective.retain(|v| regex::Regex::new(v).is_ok());
    if effective.is_empty() {
        None
    } else {
        Some(effective)
    }
}

/// File-path suggestions make sense when repos/repogroups/files are
/// specified with at most one free-text term, so a bare term can jump to
/// files by name. A single empty `repo:` field alone is not enough shape to
/// go on.
fn file_path_source_active(query: &Query) -> bool {
    let (repo_values, repo_negated) = query.regexp_patterns(fields::FIELD_REPO);
    let has_only_empty_repo_field = !query.values(fields::FIELD_REPO).is_empty()
        && repo_values.iter().chain(repo_negated.iter()).all(|v| v.is_empty())
        && query.field_count() == 1;
    let has_repo_or_file_fields = !query.values(fields::FIELD_REPO_GROUP).is_empty()
        || !query.values(fields::FIELD_REPO).is_empty()
        || !query.values(fields::FIELD_FILE).is_empty();

    !has_only_empty_repo_field
        && has_repo_or_file_fields
        && query.values(fields::FIELD_DEFAULT).len() <= 1
}

async fn symbol_suggestions(
    backends: Backends,
    query: Arc<Query>,
    deadline: Duration,
    limit: usize,
) -> Result<Vec<Suggestion>> {
    let resolved = backends.repositories.resolve(&[]).await?;
    let pattern = PatternInfo::from_query(&query, limit as u32)?;

    let (file_matches, _) = timeout(
        deadline,
        backends
            .symbols
            .search_symbols(&pattern, &resolved.repo_revs, &query, limit),
    )
    .await??;

    let mut results = Vec::new();
    for file in &file_matches {
        for symbol in &file.symbols {
            results.push(Suggestion::symbol(
                file.repo.clone(),
                symbol.clone(),
                file.path.clone(),
                symbol_score(file, symbol),
            ));
        }
    }

    sort_suggestions(&mut results);
    // Bias toward showing a few strong symbol matches prominently.
    for suggestion in results.iter_mut().take(MAX_BOOSTED_SYMBOL_RESULTS) {
        suggestion.score += SYMBOL_BOOST;
    }
    Ok(results)
}

fn symbol_score(file: &FileMatch, symbol: &SymbolMatch) -> i32 {
    let mut score = 20;
    if symbol.parent.as_deref().unwrap_or_default().is_empty() {
        score += 1;
    }
    if symbol.name.len() < 12 {
        score += 1;
    }
    match symbol.kind {
        SymbolKind::Function | SymbolKind::Method => score += 2,
        SymbolKind::Class => score += 3,
        _ => {}
    }
    let identifier = format!("{}/{}", file.repo.name, file.path).to_lowercase();
    if symbol.name.len() >= 4 && identifier.contains(&symbol.name.to_lowercase()) {
        score += 1;
    }
    score
}

async fn text_suggestions(
    backends: Backends,
    query: Arc<Query>,
    deadline: Duration,
    count: usize,
) -> Result<Vec<Suggestion>> {
    timeout(deadline, async move {
        let resolved = backends.repositories.resolve(&[]).await?;
        let pattern = PatternInfo::from_query(&query, count as u32)?;
        let (mut matches, _) = backends
            .content
            .search(&pattern, &resolved.repo_revs, &query)
            .await?;

        matches.truncate(count);
        let total = matches.len();
        Ok(matches
            .into_iter()
            .enumerate()
            .map(|(rank, m)| {
                // Earlier matches score higher.
                Suggestion::file(m.repo, m.commit_id, m.path, (total - rank) as i32)
            })
            .collect())
    })
    .await?
}

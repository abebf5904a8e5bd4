//! End-to-end suggestion engine tests against in-memory backends.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use scout_query::Query;
use scout_search::{
    Backends, ContentSearch, FileMatch, PathSuggester, PatternInfo, Repo, RepositoryResolver,
    RepositoryRevisions, Resolved, Result, ResultCommon, SearchError, SuggestOptions, Suggestion,
    SuggestionEngine, SymbolKind, SymbolMatch, SymbolSearch,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct StubResolver {
    resolved: Resolved,
    delay: Option<Duration>,
    fail: bool,
}

#[async_trait]
impl RepositoryResolver for StubResolver {
    async fn resolve(&self, _pattern_values: &[String]) -> Result<Resolved> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(SearchError::Backend("resolver unavailable".to_string()));
        }
        Ok(self.resolved.clone())
    }
}

#[derive(Default)]
struct StubContent {
    matches: Vec<FileMatch>,
    fail: bool,
}

#[async_trait]
impl ContentSearch for StubContent {
    async fn search(
        &self,
        _pattern: &PatternInfo,
        _repos: &[RepositoryRevisions],
        _query: &Query,
    ) -> Result<(Vec<FileMatch>, ResultCommon)> {
        if self.fail {
            return Err(SearchError::Backend("text index unavailable".to_string()));
        }
        Ok((self.matches.clone(), ResultCommon::default()))
    }
}

#[derive(Default)]
struct StubSymbols {
    matches: Vec<FileMatch>,
    delay: Option<Duration>,
    fail: bool,
}

#[async_trait]
impl SymbolSearch for StubSymbols {
    async fn search_symbols(
        &self,
        _pattern: &PatternInfo,
        _repos: &[RepositoryRevisions],
        _query: &Query,
        _limit: usize,
    ) -> Result<(Vec<FileMatch>, ResultCommon)> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(SearchError::Backend("symbol index unavailable".to_string()));
        }
        Ok((self.matches.clone(), ResultCommon::default()))
    }
}

#[derive(Default)]
struct StubPaths {
    suggestions: Vec<Suggestion>,
}

#[async_trait]
impl PathSuggester for StubPaths {
    async fn suggest_file_paths(&self, _limit: usize) -> Result<Vec<Suggestion>> {
        Ok(self.suggestions.clone())
    }
}

fn backends(
    resolver: StubResolver,
    content: StubContent,
    symbols: StubSymbols,
    paths: StubPaths,
) -> Backends {
    Backends {
        repositories: Arc::new(resolver),
        content: Arc::new(content),
        symbols: Arc::new(symbols),
        paths: Arc::new(paths),
    }
}

fn repo(id: u32, name: &str) -> Repo {
    Repo::new(id, name)
}

fn function(name: &str) -> SymbolMatch {
    SymbolMatch {
        name: name.to_string(),
        parent: None,
        kind: SymbolKind::Function,
    }
}

#[tokio::test]
async fn merges_dedupes_and_ranks_across_sources() -> anyhow::Result<()> {
    let mux = repo(1, "github.com/gorilla/mux");
    let resolver = StubResolver {
        resolved: Resolved {
            repo_revs: vec![RepositoryRevisions::new(mux.clone())],
            // The resolver repeats itself; only one survives deduplication.
            suggestions: vec![
                Suggestion::repository(mux.clone(), 10),
                Suggestion::repository(mux.clone(), 3),
            ],
        },
        ..StubResolver::default()
    };
    let content = StubContent {
        matches: vec![
            FileMatch {
                repo: mux.clone(),
                commit_id: None,
                path: "mux.go".to_string(),
                symbols: Vec::new(),
            },
            FileMatch {
                repo: mux.clone(),
                commit_id: None,
                path: "route.go".to_string(),
                symbols: Vec::new(),
            },
        ],
        ..StubContent::default()
    };

    let engine = SuggestionEngine::new(backends(
        resolver,
        content,
        StubSymbols::default(),
        StubPaths::default(),
    ));
    let suggestions = engine.suggestions(&Query::parse("mux")?, None).await?;

    // One repository suggestion (first occurrence kept) plus two file
    // matches scored by rank position.
    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0].as_repository().unwrap().name, mux.name);
    assert_eq!(suggestions[0].score, 10);
    assert_eq!(suggestions[1].as_file().unwrap().path, "mux.go");
    assert_eq!(suggestions[1].score, 2);
    assert_eq!(suggestions[2].as_file().unwrap().path, "route.go");
    assert_eq!(suggestions[2].score, 1);
    Ok(())
}

#[tokio::test]
async fn boosts_the_top_three_symbols() -> anyhow::Result<()> {
    let r = repo(1, "github.com/a/b");
    let symbols = StubSymbols {
        matches: vec![FileMatch {
            repo: r.clone(),
            commit_id: None,
            // "parse" appears in the file identifier, earning its +1.
            path: "src/parse.rs".to_string(),
            symbols: vec![
                function("parse"),
                function("walk"),
                function("visit"),
                function("shrink"),
            ],
        }],
        ..StubSymbols::default()
    };

    let engine = SuggestionEngine::new(backends(
        StubResolver::default(),
        StubContent::default(),
        symbols,
        StubPaths::default(),
    ));
    let suggestions = engine.suggestions(&Query::parse("parse")?, None).await?;

    assert_eq!(suggestions.len(), 4);
    // 20 base +1 no parent +1 short +2 function +1 in-file-identifier = 25,
    // then +200 for ranking in the top three.
    assert_eq!(suggestions[0].as_symbol().unwrap().name, "parse");
    assert_eq!(suggestions[0].score, 225);
    assert_eq!(suggestions[1].score, 224);
    assert_eq!(suggestions[2].score, 224);
    // The fourth symbol missed the boost.
    assert_eq!(suggestions[3].score, 24);
    Ok(())
}

#[tokio::test]
async fn slow_source_is_skipped_not_fatal() -> anyhow::Result<()> {
    let r = repo(1, "github.com/a/b");
    let resolver = StubResolver {
        resolved: Resolved {
            repo_revs: vec![RepositoryRevisions::new(r.clone())],
            suggestions: vec![Suggestion::repository(r.clone(), 5)],
        },
        ..StubResolver::default()
    };
    let symbols = StubSymbols {
        delay: Some(Duration::from_millis(200)),
        matches: vec![FileMatch {
            repo: r,
            commit_id: None,
            path: "late.rs".to_string(),
            symbols: vec![function("late")],
        }],
        ..StubSymbols::default()
    };

    let options = SuggestOptions {
        symbol_deadline: Duration::from_millis(10),
        ..SuggestOptions::default()
    };
    let engine = SuggestionEngine::with_options(
        backends(resolver, StubContent::default(), symbols, StubPaths::default()),
        options,
    );
    let suggestions = engine.suggestions(&Query::parse("mux")?, None).await?;

    // The symbol branch timed out; the repository branch still answered.
    assert_eq!(suggestions.len(), 1);
    assert!(suggestions[0].as_repository().is_some());
    Ok(())
}

#[tokio::test]
async fn outer_deadline_caps_sources_without_inner_deadlines() -> anyhow::Result<()> {
    let r = repo(1, "github.com/a/b");
    // The resolver hangs past the overall deadline; every source that
    // resolves repositories is cut off. Path suggestions need no resolver
    // and still come back.
    let resolver = StubResolver {
        delay: Some(Duration::from_millis(200)),
        ..StubResolver::default()
    };
    let paths = StubPaths {
        suggestions: vec![Suggestion::file(r, None, "src/router.go".to_string(), 2)],
    };

    let options = SuggestOptions {
        overall_deadline: Duration::from_millis(20),
        ..SuggestOptions::default()
    };
    let engine = SuggestionEngine::with_options(
        backends(resolver, StubContent::default(), StubSymbols::default(), paths),
        options,
    );
    let suggestions = engine.suggestions(&Query::parse("repo:mux")?, None).await?;

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].as_file().unwrap().path, "src/router.go");
    Ok(())
}

#[tokio::test]
async fn all_sources_failing_surfaces_the_error() {
    let resolver = StubResolver {
        fail: true,
        ..StubResolver::default()
    };
    let engine = SuggestionEngine::new(backends(
        resolver,
        StubContent::default(),
        StubSymbols::default(),
        StubPaths::default(),
    ));

    // Every activated source needs the resolver, so every branch fails with
    // a non-bad-input error and nothing was merged.
    let err = engine
        .suggestions(&Query::parse("mux").unwrap(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Backend(_)));
}

#[tokio::test]
async fn partial_failure_returns_partial_results() -> anyhow::Result<()> {
    let r = repo(1, "github.com/a/b");
    let resolver = StubResolver {
        resolved: Resolved {
            repo_revs: vec![RepositoryRevisions::new(r.clone())],
            suggestions: vec![Suggestion::repository(r, 5)],
        },
        ..StubResolver::default()
    };
    let content = StubContent {
        fail: true,
        ..StubContent::default()
    };

    let engine = SuggestionEngine::new(backends(
        resolver,
        content,
        StubSymbols::default(),
        StubPaths::default(),
    ));
    let suggestions = engine.suggestions(&Query::parse("mux")?, None).await?;

    assert_eq!(suggestions.len(), 1);
    assert!(suggestions[0].as_repository().is_some());
    Ok(())
}

#[tokio::test]
async fn malformed_free_text_yields_empty_not_error() -> anyhow::Result<()> {
    let engine = SuggestionEngine::new(backends(
        StubResolver::default(),
        StubContent::default(),
        StubSymbols::default(),
        StubPaths::default(),
    ));

    // "(unclosed" cannot compile: the repository source drops it, and the
    // symbol and full-text sources fail pattern construction, which is bad
    // input and therefore silent.
    let suggestions = engine
        .suggestions(&Query::parse("(unclosed")?, None)
        .await?;
    assert!(suggestions.is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_and_non_file_type_queries_short_circuit() -> anyhow::Result<()> {
    let engine = SuggestionEngine::new(backends(
        StubResolver::default(),
        StubContent::default(),
        StubSymbols::default(),
        StubPaths::default(),
    ));

    assert!(engine.suggestions(&Query::default(), None).await?.is_empty());
    assert!(engine
        .suggestions(&Query::parse("mux type:diff")?, None)
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn requested_count_truncates_the_ranking() -> anyhow::Result<()> {
    let r = repo(1, "github.com/a/b");
    let matches = (0..10)
        .map(|i| FileMatch {
            repo: r.clone(),
            commit_id: None,
            path: format!("file{i}.rs"),
            symbols: Vec::new(),
        })
        .collect();
    let content = StubContent {
        matches,
        ..StubContent::default()
    };

    let engine = SuggestionEngine::new(backends(
        StubResolver::default(),
        content,
        StubSymbols::default(),
        StubPaths::default(),
    ));
    let suggestions = engine
        .suggestions(&Query::parse("something interesting")?, Some(4))
        .await?;

    assert_eq!(suggestions.len(), 4);
    assert_eq!(suggestions[0].as_file().unwrap().path, "file0.rs");
    Ok(())
}

#[test]
fn suggestions_serialize_with_a_tagged_target() {
    let s = Suggestion::repository(Repo::new(7, "github.com/a/b"), 10);
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["target"]["kind"], "repository");
    assert_eq!(v["target"]["repo"]["name"], "github.com/a/b");
    assert_eq!(v["score"], 10);
}

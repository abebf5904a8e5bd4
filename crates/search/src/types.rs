use crate::error::Result;
use scout_query::{fields, Query};
use serde::{Deserialize, Serialize};

/// A repository identity: stable numeric id plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repo {
    pub id: u32,
    pub name: String,
}

impl Repo {
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A repository paired with the revisions to search. Produced by the
/// external repository resolver; read-only inside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRevisions {
    pub repo: Repo,
    pub revs: Vec<String>,
}

impl RepositoryRevisions {
    #[must_use]
    pub fn new(repo: Repo) -> Self {
        Self {
            repo,
            revs: Vec::new(),
        }
    }
}

/// One matching file from the content or symbol backend.
///
/// Backends that search only an indexed default branch leave `commit_id`
/// unset; file suggestions from such sources may not collapse with
/// revision-qualified duplicates during deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatch {
    pub repo: Repo,
    pub commit_id: Option<String>,
    pub path: String,
    #[serde(default)]
    pub symbols: Vec<SymbolMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub name: String,
    pub parent: Option<String>,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Field,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    Struct,
}

impl SymbolKind {
    /// Map a ctags kind string to a symbol kind. Unrecognized kinds fall
    /// back to `Variable`.
    #[must_use]
    pub fn from_ctags(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "module" | "modules" => Self::Module,
            "namespace" | "namespaces" => Self::Namespace,
            "package" | "packages" | "packagename" | "subprogram" => Self::Package,
            "class" | "classes" | "type" | "service" => Self::Class,
            "method" | "methods" | "methodspec" => Self::Method,
            "field" | "fields" | "member" | "property" | "properties" => Self::Field,
            "enum" | "enumerator" => Self::Enum,
            "interface" | "interfaces" => Self::Interface,
            "function" | "functions" | "func" | "subroutine" | "macro" => Self::Function,
            "constant" | "const" => Self::Constant,
            "struct" | "structure" => Self::Struct,
            _ => Self::Variable,
        }
    }
}

/// Metadata shared by search result sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCommon {
    /// True when the result set was truncated before exhausting all matches.
    pub limit_hit: bool,
}

/// A compiled search directive sent to the content and symbol backends.
/// Constructed once per sub-query and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternInfo {
    pub pattern: String,
    pub is_regexp: bool,
    pub is_case_sensitive: bool,
    pub file_match_limit: u32,
    /// Path patterns a matching file must satisfy.
    pub include_patterns: Vec<String>,
    /// Union of negated path patterns a matching file must not satisfy.
    pub exclude_pattern: Option<String>,
    pub path_patterns_are_regexps: bool,
    pub path_patterns_are_case_sensitive: bool,
    pub pattern_matches_content: bool,
    pub pattern_matches_path: bool,
    /// File patterns a repository must contain a match for (`repohasfile:`).
    pub file_patterns_repos_must_include: Vec<String>,
    /// File patterns a repository must not contain a match for
    /// (`-repohasfile:`).
    pub file_patterns_repos_must_exclude: Vec<String>,
}

impl PatternInfo {
    /// Build the directive for a query's free-text pattern, as used by the
    /// symbol and full-text suggestion sources. The pattern must compile as
    /// a regular expression; a malformed pattern is fatal for the request.
    pub fn from_query(query: &Query, file_match_limit: u32) -> Result<Self> {
        let pattern = query.values(fields::FIELD_DEFAULT).join(" ");
        regex::Regex::new(&pattern)?;

        let (include_patterns, excluded) = query.regexp_patterns(fields::FIELD_FILE);
        let (must_include, must_exclude) = query.regexp_patterns(fields::FIELD_REPO_HAS_FILE);
        let is_case_sensitive = query
            .values(fields::FIELD_CASE)
            .iter()
            .any(|v| v == "yes");

        Ok(Self {
            pattern,
            is_regexp: true,
            is_case_sensitive,
            file_match_limit,
            include_patterns,
            exclude_pattern: union_regexps(&excluded),
            path_patterns_are_regexps: true,
            path_patterns_are_case_sensitive: false,
            pattern_matches_content: true,
            pattern_matches_path: true,
            file_patterns_repos_must_include: must_include,
            file_patterns_repos_must_exclude: must_exclude,
        })
    }

    /// The per-pattern content probe issued while filtering repositories by
    /// `repohasfile:`. The match limit is unbounded so truncation in one
    /// repository cannot hide matches in another.
    #[must_use]
    pub fn for_repo_file_probe(file_pattern: &str) -> Self {
        Self {
            pattern: String::new(),
            is_regexp: true,
            is_case_sensitive: false,
            file_match_limit: u32::MAX,
            include_patterns: vec![file_pattern.to_string()],
            exclude_pattern: None,
            path_patterns_are_regexps: true,
            path_patterns_are_case_sensitive: false,
            pattern_matches_content: true,
            pattern_matches_path: true,
            file_patterns_repos_must_include: Vec::new(),
            file_patterns_repos_must_exclude: Vec::new(),
        }
    }
}

/// Union of regexps as a single alternation, `None` when empty.
fn union_regexps(patterns: &[String]) -> Option<String> {
    if patterns.is_empty() {
        return None;
    }
    Some(
        patterns
            .iter()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

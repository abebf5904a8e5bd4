use crate::types::{Repo, SymbolKind, SymbolMatch};
use serde::{Deserialize, Serialize};

/// A ranked search suggestion produced by one of the suggestion sources.
///
/// Exactly one target payload is populated per suggestion; the closed enum
/// makes the variant set exhaustive at compile time, so downstream matching
/// (deduplication in particular) cannot meet an undeclared variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// How well this item matches the query, for sorting purposes.
    pub score: i32,
    /// Length of the item name, the second sorting criterium.
    pub length: usize,
    /// Sorted alphabetically by when all else is equal.
    pub label: String,
    target: SuggestionTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionTarget {
    Repository {
        repo: Repo,
    },
    File {
        repo: Repo,
        commit_id: Option<String>,
        path: String,
        is_dir: bool,
    },
    Symbol {
        repo: Repo,
        name: String,
        parent: Option<String>,
        #[serde(rename = "symbol_kind")]
        kind: SymbolKind,
        file_path: String,
    },
}

/// Borrowed view of a file suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRef<'a> {
    pub repo: &'a Repo,
    pub commit_id: Option<&'a str>,
    pub path: &'a str,
}

/// Borrowed view of a symbol suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRef<'a> {
    pub repo: &'a Repo,
    pub name: &'a str,
    pub parent: Option<&'a str>,
    pub kind: SymbolKind,
    pub file_path: &'a str,
}

impl Suggestion {
    #[must_use]
    pub fn repository(repo: Repo, score: i32) -> Self {
        let label = repo.name.clone();
        Self {
            score,
            length: label.len(),
            label,
            target: SuggestionTarget::Repository { repo },
        }
    }

    #[must_use]
    pub fn file(repo: Repo, commit_id: Option<String>, path: String, score: i32) -> Self {
        Self {
            score,
            length: path.len(),
            label: path.clone(),
            target: SuggestionTarget::File {
                repo,
                commit_id,
                path,
                is_dir: false,
            },
        }
    }

    #[must_use]
    pub fn dir(repo: Repo, commit_id: Option<String>, path: String, score: i32) -> Self {
        Self {
            score,
            length: path.len(),
            label: path.clone(),
            target: SuggestionTarget::File {
                repo,
                commit_id,
                path,
                is_dir: true,
            },
        }
    }

    #[must_use]
    pub fn symbol(repo: Repo, symbol: SymbolMatch, file_path: String, score: i32) -> Self {
        Self {
            score,
            length: symbol.name.len(),
            label: symbol.name.clone(),
            target: SuggestionTarget::Symbol {
                repo,
                name: symbol.name,
                parent: symbol.parent,
                kind: symbol.kind,
                file_path,
            },
        }
    }

    #[must_use]
    pub fn target(&self) -> &SuggestionTarget {
        &self.target
    }

    #[must_use]
    pub fn as_repository(&self) -> Option<&Repo> {
        match &self.target {
            SuggestionTarget::Repository { repo } => Some(repo),
            _ => None,
        }
    }

    /// The suggestion as a regular file, if it is one.
    #[must_use]
    pub fn as_file(&self) -> Option<FileRef<'_>> {
        match &self.target {
            SuggestionTarget::File {
                repo,
                commit_id,
                path,
                is_dir: false,
            } => Some(FileRef {
                repo,
                commit_id: commit_id.as_deref(),
                path,
            }),
            _ => None,
        }
    }

    /// The suggestion as a directory path, if it is one.
    #[must_use]
    pub fn as_dir(&self) -> Option<FileRef<'_>> {
        match &self.target {
            SuggestionTarget::File {
                repo,
                commit_id,
                path,
                is_dir: true,
            } => Some(FileRef {
                repo,
                commit_id: commit_id.as_deref(),
                path,
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_symbol(&self) -> Option<SymbolRef<'_>> {
        match &self.target {
            SuggestionTarget::Symbol {
                repo,
                name,
                parent,
                kind,
                file_path,
            } => Some(SymbolRef {
                repo,
                name,
                parent: parent.as_deref(),
                kind: *kind,
                file_path,
            }),
            _ => None,
        }
    }

    /// Identity used to collapse duplicates across sources. The variant
    /// discriminates the key shape, so keys of different variants never
    /// collide.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        match &self.target {
            SuggestionTarget::Repository { repo } => DedupKey::Repository {
                repo: repo.name.clone(),
            },
            SuggestionTarget::File {
                repo,
                commit_id,
                path,
                ..
            } => DedupKey::File {
                repo: repo.name.clone(),
                rev: commit_id.clone().unwrap_or_default(),
                path: path.clone(),
            },
            SuggestionTarget::Symbol {
                repo, name, parent, ..
            } => DedupKey::Symbol {
                repo: repo.name.clone(),
                qualified_name: format!("{name}{}", parent.as_deref().unwrap_or_default()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Repository {
        repo: String,
    },
    File {
        repo: String,
        rev: String,
        path: String,
    },
    Symbol {
        repo: String,
        qualified_name: String,
    },
}

use crate::backend::ContentSearch;
use crate::error::Result;
use crate::types::{PatternInfo, RepositoryRevisions, ResultCommon};
use once_cell::sync::Lazy;
use scout_query::{fields, Query};
use std::collections::{HashMap, HashSet};

/// Fields meaningful to name-based repository search. A query using any
/// other field gets an empty result, not an error: matching repositories on
/// other criteria is simply not this filter's feature.
static NAME_SEARCH_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        fields::FIELD_REPO,
        "-repo",
        fields::FIELD_REPO_GROUP,
        fields::FIELD_TYPE,
        fields::FIELD_DEFAULT,
        fields::FIELD_INDEX,
        fields::FIELD_COUNT,
        fields::FIELD_MAX,
        fields::FIELD_TIMEOUT,
        fields::FIELD_FORK,
        fields::FIELD_ARCHIVED,
        fields::FIELD_REPO_HAS_FILE,
        "-repohasfile",
    ])
});

/// Narrow `repos` to the candidates matching the query's name pattern and
/// its `repohasfile:`/`-repohasfile:` content predicates.
///
/// The name stage is a stable filter: output preserves input order. The
/// content stage runs only when include or exclude file patterns are
/// present. Candidates are emitted until `limit`; `limit_hit` reports
/// whether more remained. All failures here are fatal to the call; this
/// layer does not degrade partially.
pub async fn filter_repositories(
    content: &dyn ContentSearch,
    query: &Query,
    pattern: &PatternInfo,
    repos: &[RepositoryRevisions],
    limit: usize,
) -> Result<(Vec<RepositoryRevisions>, ResultCommon)> {
    for field in query.field_names() {
        if !NAME_SEARCH_FIELDS.contains(field) {
            return Ok((Vec::new(), ResultCommon::default()));
        }
    }

    let name_pattern = regex::Regex::new(&pattern.pattern)?;

    let mut candidates: Vec<RepositoryRevisions> = repos
        .iter()
        .filter(|r| name_pattern.is_match(&r.repo.name))
        .cloned()
        .collect();
    log::debug!(
        "repository name stage: {} of {} candidates match",
        candidates.len(),
        repos.len()
    );

    if !pattern.file_patterns_repos_must_include.is_empty()
        || !pattern.file_patterns_repos_must_exclude.is_empty()
    {
        candidates = repos_with_matching_files(content, pattern, candidates).await?;
    }

    let mut results = Vec::with_capacity(candidates.len().min(limit));
    let mut common = ResultCommon::default();
    for candidate in candidates {
        if results.len() == limit {
            common.limit_hit = true;
            break;
        }
        results.push(candidate);
    }

    Ok((results, common))
}

/// Decide which candidates survive the `repohasfile:` predicates by probing
/// the content backend once per pattern.
///
/// Membership only ever flips to true across include passes, so multiple
/// include patterns union rather than intersect. Excludes run after all
/// includes and override them.
async fn repos_with_matching_files(
    content: &dyn ContentSearch,
    pattern: &PatternInfo,
    candidates: Vec<RepositoryRevisions>,
) -> Result<Vec<RepositoryRevisions>> {
    let mut matching: HashMap<u32, bool> = HashMap::with_capacity(candidates.len());

    if pattern.file_patterns_repos_must_include.is_empty() {
        // Default to including every candidate, then exclude below.
        for candidate in &candidates {
            matching.insert(candidate.repo.id, true);
        }
    } else {
        for file_pattern in &pattern.file_patterns_repos_must_include {
            let matches = probe_file_pattern(content, file_pattern, &candidates).await?;
            for m in matches {
                matching.insert(m, true);
            }
        }
    }

    for file_pattern in &pattern.file_patterns_repos_must_exclude {
        let matches = probe_file_pattern(content, file_pattern, &candidates).await?;
        for m in matches {
            matching.insert(m, false);
        }
    }

    Ok(candidates
        .into_iter()
        .filter(|c| matching.get(&c.repo.id).copied().unwrap_or(false))
        .collect())
}

/// Ids of the candidate repositories containing at least one match for
/// `file_pattern`.
async fn probe_file_pattern(
    content: &dyn ContentSearch,
    file_pattern: &str,
    candidates: &[RepositoryRevisions],
) -> Result<Vec<u32>> {
    let probe = PatternInfo::for_repo_file_probe(file_pattern);
    let sub_query = Query::parse(&format!("file:{file_pattern}"))?;
    let (matches, _) = content.search(&probe, candidates, &sub_query).await?;
    Ok(matches.into_iter().map(|m| m.repo.id).collect())
}

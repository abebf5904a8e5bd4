//! Field names understood by the query grammar.
//!
//! The default (free-text) field is the empty string so that bare terms and
//! `field:value` tokens share one representation. Negated fields keep the
//! leading `-` as part of the field name (`-repo`, `-repohasfile`): field
//! identity is the full string, so negation needs no extra flag on values.

use once_cell::sync::Lazy;
use std::collections::HashSet;

pub const FIELD_DEFAULT: &str = "";
pub const FIELD_REPO: &str = "repo";
pub const FIELD_REPO_GROUP: &str = "repogroup";
pub const FIELD_FILE: &str = "file";
pub const FIELD_TYPE: &str = "type";
pub const FIELD_CASE: &str = "case";
pub const FIELD_LANG: &str = "lang";
pub const FIELD_INDEX: &str = "index";
pub const FIELD_COUNT: &str = "count";
pub const FIELD_MAX: &str = "max";
pub const FIELD_TIMEOUT: &str = "timeout";
pub const FIELD_FORK: &str = "fork";
pub const FIELD_ARCHIVED: &str = "archived";
pub const FIELD_REPO_HAS_FILE: &str = "repohasfile";

/// Fields the parser recognizes. A `name:value` token whose name is not
/// listed here is treated as a free-text term, not a field.
static KNOWN_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        FIELD_REPO,
        FIELD_REPO_GROUP,
        FIELD_FILE,
        FIELD_TYPE,
        FIELD_CASE,
        FIELD_LANG,
        FIELD_INDEX,
        FIELD_COUNT,
        FIELD_MAX,
        FIELD_TIMEOUT,
        FIELD_FORK,
        FIELD_ARCHIVED,
        FIELD_REPO_HAS_FILE,
    ])
});

/// Fields whose values must compile as regular expressions.
static REGEXP_VALUE_FIELDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from([FIELD_REPO, FIELD_FILE, FIELD_REPO_HAS_FILE]));

/// Fields that may be negated with a leading `-`.
static NEGATABLE_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([FIELD_REPO, FIELD_FILE, FIELD_LANG, FIELD_REPO_HAS_FILE])
});

#[must_use]
pub fn is_negated(field: &str) -> bool {
    field.starts_with('-')
}

/// The field name with any leading `-` removed.
#[must_use]
pub fn strip_negation(field: &str) -> &str {
    field.strip_prefix('-').unwrap_or(field)
}

#[must_use]
pub fn is_known(field: &str) -> bool {
    let base = strip_negation(field);
    if is_negated(field) {
        NEGATABLE_FIELDS.contains(base)
    } else {
        KNOWN_FIELDS.contains(base)
    }
}

#[must_use]
pub fn is_regexp_valued(field: &str) -> bool {
    REGEXP_VALUE_FIELDS.contains(strip_negation(field))
}

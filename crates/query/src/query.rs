use crate::error::{QueryError, Result};
use crate::fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed, field-partitioned search query.
///
/// Values are kept in the order they appeared in the input. The free-text
/// (default) field is [`fields::FIELD_DEFAULT`], the empty string. Consumers
/// decide feature applicability by looking at which fields are present, never
/// at individual values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    fields: BTreeMap<String, Vec<String>>,
}

impl Query {
    /// Parse a whitespace-separated sequence of terms and `field:value`
    /// tokens. Double quotes group whitespace (`file:"a b"`, `"two words"`),
    /// and a leading `-` negates a field where the grammar allows it. Tokens
    /// whose prefix is not a recognized field are free-text terms.
    ///
    /// Values of regexp-valued fields (`repo`, `file`, `repohasfile` and
    /// their negations) must compile; a malformed value fails the whole
    /// parse. Free-text terms are not validated here; whether they are
    /// treated as regular expressions is the consumer's concern.
    pub fn parse(input: &str) -> Result<Self> {
        let mut query = Self::default();
        for token in tokenize(input)? {
            match split_field(&token) {
                Some((field, value)) => {
                    if fields::is_regexp_valued(&field) {
                        if let Err(source) = regex::Regex::new(&value) {
                            return Err(QueryError::InvalidRegex { field, source });
                        }
                    }
                    query.push(&field, &value);
                }
                None => query.push(fields::FIELD_DEFAULT, &token),
            }
        }
        Ok(query)
    }

    /// Append a value to a field, creating the field if needed.
    pub fn push(&mut self, field: &str, value: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Values of a field, in input order. Empty if the field is absent.
    #[must_use]
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn string_values(&self, field: &str) -> Vec<String> {
        self.values(field).to_vec()
    }

    /// Positive and negated values of a regexp-valued field, as the pair
    /// (`field` values, `-field` values).
    #[must_use]
    pub fn regexp_patterns(&self, field: &str) -> (Vec<String>, Vec<String>) {
        let base = fields::strip_negation(field);
        let negated = format!("-{base}");
        (self.string_values(base), self.string_values(&negated))
    }

    /// Names of the fields present in the query, including the default field
    /// when free-text terms exist.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of distinct fields present, counting the default field.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split a token into `(field, value)` if its prefix is a recognized field.
fn split_field(token: &str) -> Option<(String, String)> {
    let (name, value) = token.split_once(':')?;
    if !fields::is_known(name) {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

/// Split on whitespace outside double quotes; quotes group but are not kept.
fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return Err(QueryError::UnbalancedQuotes);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

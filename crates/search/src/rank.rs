use crate::suggestion::Suggestion;
use std::collections::HashSet;

/// Hard cap on suggestions returned from one request.
pub const MAX_SUGGESTIONS: usize = 100;

/// Clamp the caller's requested count. Absent, negative, or over-cap counts
/// all fall back to [`MAX_SUGGESTIONS`].
#[must_use]
pub fn clamp_first(first: Option<i32>) -> usize {
    match first {
        Some(n) if n >= 0 && (n as usize) <= MAX_SUGGESTIONS => n as usize,
        _ => MAX_SUGGESTIONS,
    }
}

/// Eliminate duplicates, keeping the first occurrence of each key in
/// arrival order. Later duplicates are dropped, never merged.
#[must_use]
pub fn dedupe(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut seen = HashSet::with_capacity(suggestions.len());
    suggestions
        .into_iter()
        .filter(|s| seen.insert(s.dedup_key()))
        .collect()
}

/// Stable sort by score descending, then length ascending, then label.
///
/// Shorter names win on equal score, e.g. gorilla/mux over gorilla/muxy.
pub fn sort_suggestions(suggestions: &mut [Suggestion]) {
    suggestions.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.length.cmp(&b.length))
            .then_with(|| a.label.cmp(&b.label))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Repo;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn repo_suggestion(name: &str, score: i32) -> Suggestion {
        Suggestion::repository(Repo::new(0, name), score)
    }

    #[test]
    fn clamps_absent_negative_and_oversized_counts() {
        assert_eq!(clamp_first(None), MAX_SUGGESTIONS);
        assert_eq!(clamp_first(Some(-1)), MAX_SUGGESTIONS);
        assert_eq!(clamp_first(Some(1000)), MAX_SUGGESTIONS);
        assert_eq!(clamp_first(Some(0)), 0);
        assert_eq!(clamp_first(Some(7)), 7);
        assert_eq!(clamp_first(Some(100)), 100);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let deduped = dedupe(vec![
            repo_suggestion("a", 1),
            repo_suggestion("b", 2),
            repo_suggestion("a", 99),
        ]);
        assert_eq!(deduped.len(), 2);
        // First-seen wins; the higher-scored duplicate is dropped, not merged.
        assert_eq!(deduped[0].score, 1);
    }

    #[test]
    fn dedupe_does_not_collapse_across_variants() {
        let deduped = dedupe(vec![
            repo_suggestion("same", 1),
            Suggestion::file(Repo::new(0, "same"), None, "same".into(), 1),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn sort_orders_by_score_then_length_then_label() {
        let mut suggestions = vec![
            repo_suggestion("gorilla/muxy", 10),
            repo_suggestion("gorilla/mux", 10),
            repo_suggestion("zeta", 20),
            repo_suggestion("beta", 10),
            repo_suggestion("alfa", 10),
        ];
        sort_suggestions(&mut suggestions);
        let labels: Vec<&str> = suggestions.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            ["zeta", "alfa", "beta", "gorilla/mux", "gorilla/muxy"]
        );
    }

    fn arb_suggestion() -> impl Strategy<Value = Suggestion> {
        ("[a-c]{1,3}", -5..50i32, 0..3u8).prop_map(|(name, score, variant)| match variant {
            0 => repo_suggestion(&name, score),
            1 => Suggestion::file(Repo::new(0, "r"), None, name, score),
            _ => Suggestion::dir(Repo::new(0, "r"), None, name, score),
        })
    }

    proptest! {
        #[test]
        fn proptest_sort_is_idempotent(mut suggestions in prop::collection::vec(arb_suggestion(), 0..40)) {
            sort_suggestions(&mut suggestions);
            let once = suggestions.clone();
            sort_suggestions(&mut suggestions);
            prop_assert_eq!(once, suggestions);
        }

        #[test]
        fn proptest_dedupe_never_grows_and_keeps_every_key(suggestions in prop::collection::vec(arb_suggestion(), 0..40)) {
            let input_keys: std::collections::HashSet<_> =
                suggestions.iter().map(Suggestion::dedup_key).collect();
            let deduped = dedupe(suggestions.clone());
            prop_assert!(deduped.len() <= suggestions.len());
            let output_keys: std::collections::HashSet<_> =
                deduped.iter().map(Suggestion::dedup_key).collect();
            prop_assert_eq!(input_keys, output_keys);
        }

        #[test]
        fn proptest_clamp_bounds_output(first in prop::option::of(-200..200i32)) {
            prop_assert!(clamp_first(first) <= MAX_SUGGESTIONS);
        }
    }
}

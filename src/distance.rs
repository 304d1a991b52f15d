//! Bounded Levenshtein distance.
//!
//! Used by the fuzzy corrector and the swipe resolver. The length gap is a
//! lower bound on the distance, so pairs whose lengths differ by more than
//! the limit are rejected before any matrix work.

/// Levenshtein distance between `source` and `target`.
///
/// Returns `None` when the character-length gap exceeds `limit`; otherwise
/// the true distance, which may itself exceed `limit`.
pub fn bounded_levenshtein(source: &str, target: &str, limit: usize) -> Option<usize> {
    let source_chars: Vec<char> = source.chars().collect();
    let target_chars: Vec<char> = target.chars().collect();
    let len1 = source_chars.len();
    let len2 = target_chars.len();

    if len1.abs_diff(len2) > limit {
        return None;
    }
    if len1 == 0 {
        return Some(len2);
    }
    if len2 == 0 {
        return Some(len1);
    }

    let mut previous: Vec<usize> = (0..=len2).collect();
    let mut current = vec![0usize; len2 + 1];

    for i in 1..=len1 {
        current[0] = i;
        for j in 1..=len2 {
            let cost = usize::from(source_chars[i - 1] != target_chars[j - 1]);
            let deletion = previous[j] + 1;
            let insertion = current[j - 1] + 1;
            let substitution = previous[j - 1] + cost;
            current[j] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    Some(previous[len2])
}

/// Distance clamped to `limit + 1`, the sentinel used in scoring.
pub fn capped_distance(source: &str, target: &str, limit: usize) -> usize {
    bounded_levenshtein(source, target, limit)
        .map_or(limit + 1, |distance| distance.min(limit + 1))
}

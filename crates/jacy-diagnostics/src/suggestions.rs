// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Did-you-mean helper for unresolved names.

/// Levenshtein distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest candidate to `name`, as `did you mean `x`?`.
///
/// Ties go to the first candidate seen.
pub fn did_you_mean<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let max_distance = match name.chars().count() {
        0..=2 => 1,
        _ => 2,
    };

    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        if candidate == name || name.len().abs_diff(candidate.len()) > max_distance {
            continue;
        }
        let dist = edit_distance(name, candidate);
        if dist <= max_distance && best.map_or(true, |(_, d)| dist < d) {
            best = Some((candidate, dist));
        }
    }

    best.map(|(closest, _)| format!("did you mean `{}`?", closest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_names_are_suggested() {
        let candidates = ["counter", "count", "name", "value"];
        assert_eq!(
            did_you_mean("conter", candidates.iter().copied()),
            Some("did you mean `counter`?".to_string())
        );
        assert_eq!(did_you_mean("vaule", candidates.iter().copied()), Some("did you mean `value`?".to_string()));
    }

    #[test]
    fn distant_names_are_not() {
        let candidates = ["alpha", "beta"];
        assert_eq!(did_you_mean("zzzzzz", candidates.iter().copied()), None);
        assert_eq!(did_you_mean("x", ["yy"].iter().copied()), None);
    }

    #[test]
    fn distance_basics() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }
}

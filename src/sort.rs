//! Token-name ordering.
//!
//! Names are first bucketed into namespace groups (`color-bg-fill-*`,
//! `spacing-*`, ...), each group is sorted with a chunked alphanumeric
//! comparison, and the groups themselves are ordered by their prefix with the
//! same comparison. Numbers inside names compare numerically, so `color-2`
//! lands before `color-10`.

use std::cmp::Ordering;

/// Sort token names into presentation order. Pure and stable.
pub fn sort_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    sort_indices(names)
        .into_iter()
        .map(|i| names[i].as_ref().to_string())
        .collect()
}

/// Same ordering as [`sort_names`], returned as indices into `names`.
///
/// Duplicate names keep their original relative order, which lets callers
/// reorder whole records without collapsing duplicates.
pub fn sort_indices<S: AsRef<str>>(names: &[S]) -> Vec<usize> {
    if names.len() < 2 {
        return (0..names.len()).collect();
    }

    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (idx, name) in names.iter().enumerate() {
        let prefix = group_prefix(name.as_ref());
        match groups.iter_mut().find(|(p, _)| *p == prefix) {
            Some((_, members)) => members.push(idx),
            None => groups.push((prefix, vec![idx])),
        }
    }

    for (_, members) in groups.iter_mut() {
        members.sort_by(|&a, &b| compare_alphanumeric(names[a].as_ref(), names[b].as_ref()));
    }

    groups.sort_by(|(a, _), (b, _)| compare_alphanumeric(a, b));

    groups.into_iter().flat_map(|(_, members)| members).collect()
}

/// Namespace key for a name: the first `-`/`_` separated part, extended with
/// the second (and third) part for deeper hierarchical names when those parts
/// are words rather than numbers.
pub fn group_prefix(name: &str) -> String {
    let parts: Vec<&str> = name.split(['-', '_']).collect();
    let mut prefix = parts[0].to_string();

    if parts.len() > 3 {
        if is_semantic(parts[1]) {
            prefix = format!("{}-{}", parts[0], parts[1]);
        }
        if parts.len() > 4 && is_semantic(parts[2]) {
            prefix = format!("{}-{}-{}", parts[0], parts[1], parts[2]);
        }
    }

    prefix
}

fn is_semantic(part: &str) -> bool {
    part.chars().next().is_some_and(|c| !c.is_ascii_digit())
}

/// Split into alternating runs of digits and non-digits.
///
/// `"color-10-alpha"` → `["color-", "10", "-alpha"]`.
pub fn chunkify(s: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut prev_digit: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        if prev_digit.is_some_and(|p| p != digit) {
            chunks.push(&s[start..i]);
            start = i;
        }
        prev_digit = Some(digit);
    }

    if start < s.len() {
        chunks.push(&s[start..]);
    }

    chunks
}

/// Chunk-by-chunk comparison: digit runs compare numerically, everything else
/// case-insensitively. When every compared chunk is equal the name with fewer
/// chunks sorts first.
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let chunks_a = chunkify(a);
    let chunks_b = chunkify(b);
    let max = chunks_a.len().max(chunks_b.len());

    for i in 0..max {
        let ca = chunks_a.get(i).copied().unwrap_or("");
        let cb = chunks_b.get(i).copied().unwrap_or("");
        if ca == cb {
            continue;
        }

        let ord = if is_number(ca) && is_number(cb) {
            compare_digit_runs(ca, cb)
        } else {
            ca.to_lowercase().cmp(&cb.to_lowercase())
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }

    chunks_a.len().cmp(&chunks_b.len())
}

fn is_number(chunk: &str) -> bool {
    !chunk.is_empty() && chunk.bytes().all(|b| b.is_ascii_digit())
}

// Arbitrary-length digit runs: strip leading zeros, then longer is larger.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn numeric_runs_sort_numerically() {
        assert_eq!(
            sort_names(&["color-2", "color-10", "color-1"]),
            vec!["color-1", "color-2", "color-10"]
        );
    }

    #[test]
    fn namespaces_stay_contiguous() {
        let sorted = sort_names(&["spacing-100", "color-bg-fill-primary", "color-bg-fill-hover"]);
        assert_eq!(
            sorted,
            vec!["color-bg-fill-hover", "color-bg-fill-primary", "spacing-100"]
        );
    }

    #[test]
    fn groups_order_by_prefix() {
        let sorted = sort_names(&[
            "spacing-200",
            "color-text-default-hover",
            "border-radius-4",
            "color-bg-fill-brand-active",
            "spacing-50",
            "color-bg-fill-brand-hover",
        ]);
        assert_eq!(
            sorted,
            vec![
                "border-radius-4",
                "color-bg-fill-brand-active",
                "color-bg-fill-brand-hover",
                "color-text-default-hover",
                "spacing-50",
                "spacing-200",
            ]
        );
    }

    #[rstest]
    #[case("spacing", "spacing")]
    #[case("spacing-100", "spacing")]
    #[case("color-blue-500", "color")]
    #[case("color-bg-fill-primary", "color-bg")]
    #[case("color-bg-fill-brand-hover", "color-bg-fill")]
    #[case("size-2-x-large", "size")]
    #[case("size-2-xl-large-extra", "size-2-xl")]
    #[case("font_size_body_lg", "font-size")]
    fn prefixes(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(group_prefix(name), expected);
    }

    #[test]
    fn chunks_alternate() {
        assert_eq!(chunkify("color-10-alpha"), vec!["color-", "10", "-alpha"]);
        assert_eq!(chunkify("100"), vec!["100"]);
        assert_eq!(chunkify("a1b22"), vec!["a", "1", "b", "22"]);
        assert!(chunkify("").is_empty());
    }

    #[test]
    fn comparison_rules() {
        assert_eq!(compare_alphanumeric("Color", "color"), Ordering::Equal);
        assert_eq!(compare_alphanumeric("a-9", "a-10"), Ordering::Less);
        assert_eq!(compare_alphanumeric("a", "a-1"), Ordering::Less);
        assert_eq!(compare_alphanumeric("x-007", "x-7"), Ordering::Equal);
        assert_eq!(
            compare_alphanumeric("n-99999999999999999999999", "n-100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn edge_inputs() {
        let empty: [&str; 0] = [];
        assert!(sort_names(&empty).is_empty());
        assert_eq!(sort_names(&["solo"]), vec!["solo"]);
    }

    #[test]
    fn case_ties_keep_input_order() {
        assert_eq!(sort_names(&["Color", "color"]), vec!["Color", "color"]);
        assert_eq!(sort_names(&["color", "Color"]), vec!["color", "Color"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let names = ["b", "a", "b", "a"];
        assert_eq!(sort_indices(&names), vec![1, 3, 0, 2]);
    }
}

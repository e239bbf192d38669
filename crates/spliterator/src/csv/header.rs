//! Header canonicalization: deterministic snake_case-ish rewrites with
//! duplicate disambiguation.

use std::collections::{HashMap, HashSet};

/// Canonicalizes a header list.
///
/// Uniformly-uppercase names (acronyms like `U.S.A.`, after stripping the
/// periods that trail each capital) keep their case with non-word runs
/// collapsed to `_`; everything else is converted to snake_case. Duplicates
/// are then disambiguated: the second occurrence of a canonical name becomes
/// `name_2`, the third `name_3`, and so on. A suffixed candidate that would
/// collide with another name in the list keeps counting upward until it is
/// unused, so the result is always pairwise distinct.
///
/// The rewrite is idempotent: every emitted name canonicalizes to itself,
/// so feeding the output back in changes nothing.
///
/// ```rust
/// use spliterator::normalize_column_names;
///
/// assert_eq!(
///     normalize_column_names(&["Full Name", "Full Name", "Age"]),
///     ["full_name", "full_name_2", "age"]
/// );
/// assert_eq!(normalize_column_names(&["U.S.A. Total"]), ["usa_total"]);
/// assert_eq!(normalize_column_names(&["TOTAL SALES"]), ["TOTAL_SALES"]);
/// ```
#[must_use]
pub fn normalize_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    names
        .iter()
        .map(|raw| {
            let base = canonicalize(raw.as_ref());
            loop {
                let seen = occurrences.entry(base.clone()).or_insert(0);
                *seen += 1;
                let candidate = if *seen == 1 {
                    base.clone()
                } else {
                    format!("{base}_{seen}")
                };
                if taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

fn canonicalize(name: &str) -> String {
    let stripped = strip_acronym_periods(name);
    if is_uniformly_uppercase(&stripped) {
        collapse_non_word(&stripped)
    } else {
        snake_case(&stripped)
    }
}

/// Drops periods that directly follow a capital letter, so `U.S.A.` reads
/// as the acronym `USA` rather than as punctuation runs.
fn strip_acronym_periods(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_upper = false;
    for ch in name.chars() {
        if ch == '.' && prev_upper {
            continue;
        }
        prev_upper = ch.is_uppercase();
        out.push(ch);
    }
    out
}

fn is_uniformly_uppercase(name: &str) -> bool {
    name.chars().any(char::is_uppercase) && !name.chars().any(char::is_lowercase)
}

fn collapse_non_word(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_owned()
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for ch in name.chars() {
        if ch == '_' {
            // Underscores are already separators; keeping them verbatim
            // (leading ones included) makes disambiguated names like `_2`
            // fixed points of the rewrite.
            out.push('_');
        } else if ch.is_alphanumeric() {
            if ch.is_uppercase() && matches!(prev, Some(p) if p.is_lowercase() || p.is_numeric()) {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(ch);
    }
    out.trim_end_matches('_').to_owned()
}

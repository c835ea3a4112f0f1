/// Pure utility functions for vendor text fields
///
/// These functions contain NO side effects and are shared by every source ingestor.

/// Case-insensitive substring test against a set of tokens.
pub fn contains_any(text: &str, tokens: &[&str]) -> bool {
    let haystack = text.to_lowercase();
    tokens
        .iter()
        .any(|token| haystack.contains(&token.to_lowercase()))
}

/// Description phrases that mark a posting as remote when the vendor has no flag for it.
pub const REMOTE_TOKENS: [&str; 3] = ["remote", "work from home", "wfh"];

pub fn mentions_remote(description: &str) -> bool {
    contains_any(description, &REMOTE_TOKENS)
}

/// First value that is not blank, or empty.
pub fn first_non_empty<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Join the non-blank parts with `sep`.
pub fn join_non_empty<'a, I>(parts: I, sep: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_any_is_case_insensitive() {
        assert!(contains_any("Fully REMOTE role", &REMOTE_TOKENS));
        assert!(contains_any("Option to Work From Home twice a week", &REMOTE_TOKENS));
        assert!(contains_any("WFH friendly", &REMOTE_TOKENS));
        assert!(!contains_any("On-site in Lagos", &REMOTE_TOKENS));
    }

    #[test]
    fn test_first_non_empty() {
        assert_eq!(first_non_empty(["", "  ", "b", "c"]), "b");
        assert_eq!(first_non_empty(["", " "]), "");
    }

    #[test]
    fn test_join_non_empty() {
        assert_eq!(join_non_empty(["Full-time", "", "Contract"], ", "), "Full-time, Contract");
        assert_eq!(join_non_empty(Vec::<&str>::new(), ", "), "");
    }
}

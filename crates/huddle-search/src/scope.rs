//! Sigil parsing and term matching.

/// Categories a term is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    All,
    /// `#term`
    Channels,
    /// `@term`
    Users,
}

/// Split a raw term into its scope and the text to match.
///
/// Returns `None` for an empty or whitespace-only term, which clears the
/// results instead of matching everything.  A bare sigil (`#`, `@`) is not
/// empty: it yields an empty needle that matches every candidate.
pub fn parse_term(term: &str) -> Option<(SearchScope, &str)> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    let parsed = if let Some(rest) = term.strip_prefix('#') {
        (SearchScope::Channels, rest.trim())
    } else if let Some(rest) = term.strip_prefix('@') {
        (SearchScope::Users, rest.trim())
    } else {
        (SearchScope::All, term)
    };
    Some(parsed)
}

/// Case-insensitive substring test.  `needle` must already be lowercase.
pub(crate) fn contains(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigils_route_and_strip() {
        assert_eq!(parse_term("#general"), Some((SearchScope::Channels, "general")));
        assert_eq!(parse_term("@ali"), Some((SearchScope::Users, "ali")));
        assert_eq!(parse_term("  hello "), Some((SearchScope::All, "hello")));
    }

    #[test]
    fn blank_term_clears() {
        assert_eq!(parse_term(""), None);
        assert_eq!(parse_term("   \t"), None);
    }

    #[test]
    fn bare_sigil_matches_everything() {
        assert_eq!(parse_term("@"), Some((SearchScope::Users, "")));
        assert!(contains("anything", ""));
    }

    #[test]
    fn matching_ignores_case() {
        assert!(contains("Hello World", "lo wo"));
        assert!(!contains("Hello", "help"));
    }
}

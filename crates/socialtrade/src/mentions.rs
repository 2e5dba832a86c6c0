//! `@handle` extraction from free text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::SocialProfile;

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention regex is valid"));

/// Distinct handles mentioned in `text`, without the `@`.
///
/// Case-sensitive: `@Bob` and `@bob` are different handles.
pub fn extract_mentions(text: &str) -> BTreeSet<String> {
    MENTION_RE
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

/// Every handle mentioned across a profile's posts.
pub fn profile_mentions(profile: &SocialProfile) -> BTreeSet<String> {
    profile
        .posts
        .iter()
        .flat_map(|p| extract_mentions(&p.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Post;

    #[test]
    fn test_case_sensitive_distinct() {
        let m = extract_mentions("gm @friend1 and @Friend1!");
        let expected: BTreeSet<String> = ["friend1", "Friend1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(m, expected);
    }

    #[test]
    fn test_duplicates_collapse() {
        let m = extract_mentions("@friend1 @friend1, @friend1.");
        assert_eq!(m.len(), 1);
        assert!(m.contains("friend1"));
    }

    #[test]
    fn test_no_mentions() {
        assert!(extract_mentions("no handles here @ all").is_empty());
        assert!(extract_mentions("").is_empty());
    }

    #[test]
    fn test_underscore_and_digits() {
        let m = extract_mentions("cc @big_whale_42");
        assert!(m.contains("big_whale_42"));
    }

    #[test]
    fn test_profile_mentions_union() {
        let mut a = Post::sentinel();
        a.text = "hi @bob".into();
        let mut b = Post::sentinel();
        b.text = "@carol and @bob".into();
        let profile = SocialProfile {
            display_name: "Ann".into(),
            handle: "@ann".into(),
            posts: vec![a, b],
        };
        let m = profile_mentions(&profile);
        assert_eq!(m.into_iter().collect::<Vec<_>>(), vec!["bob", "carol"]);
    }
}

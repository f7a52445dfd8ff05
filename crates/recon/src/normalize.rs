//! Package-name normalization: the join key shared by both source systems.

use once_cell::sync::Lazy;
use regex::Regex;

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("space-run pattern"));

/// Fold a package name into its cross-system join key.
///
/// Trims, lowercases, spells `&` as `and`, and collapses interior runs of
/// spaces to one. Absent input yields an empty key, which never matches.
/// No stemming or punctuation stripping happens here: two names that differ
/// by anything else are different packages.
pub fn normalize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let folded = raw.trim().to_lowercase().replace('&', "and");
    SPACE_RUN.replace_all(&folded, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ampersand_becomes_and() {
        assert_eq!(normalize(Some("Science & Nature")), "science and nature");
    }

    #[test]
    fn trims_and_collapses_spaces() {
        assert_eq!(normalize(Some("  A   B ")), "a b");
    }

    #[test]
    fn absent_is_empty() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some("   ")), "");
    }

    #[test]
    fn ampersand_without_spaces_is_not_padded() {
        assert_eq!(normalize(Some("AT&T Journals")), "atandt journals");
    }

    #[test]
    fn punctuation_is_kept() {
        assert_eq!(normalize(Some("Wiley-Blackwell: Full")), "wiley-blackwell: full");
    }

    #[test]
    fn tabs_are_not_collapsed() {
        assert_eq!(normalize(Some("a\t\tb")), "a\t\tb");
    }

    proptest! {
        #[test]
        fn idempotent(s in "[ A-Za-z0-9&\t.-]{0,32}") {
            let once = normalize(Some(&s));
            prop_assert_eq!(normalize(Some(&once)), once);
        }

        #[test]
        fn case_and_padding_insensitive(s in "[A-Za-z&]{1,8}( {1,3}[A-Za-z&]{1,8}){0,3}") {
            let padded = format!("  {}  ", s.to_uppercase().replace(' ', "   "));
            prop_assert_eq!(normalize(Some(&padded)), normalize(Some(&s)));
        }
    }
}

//! # Schema File Naming
//!
//! Maps schema file names (`user-profile.schema.json`) to the canonical
//! type identifier used throughout the generated package (`UserProfile`).
//!
//! ## Algorithm
//!
//! 1. Strip any directory prefix and the `.schema.json` suffix.
//! 2. Split the stem on runs of `-` and `_`.
//! 3. Drop empty tokens.
//! 4. Upper-case the first character of every token; leave the rest alone.
//! 5. Concatenate.
//!
//! Only the first character of a token is touched, so embedded camelCase,
//! acronyms and digits survive: `userAPI` → `UserAPI`,
//! `2user-profile` → `2userProfile`. The function is total; a stem made only
//! of separators yields the empty string, and uniqueness is checked by
//! [`TypeSet`](crate::TypeSet).

/// File-name suffix that marks a JSON Schema document.
pub const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Characters that separate words in a schema file stem.
const SEPARATORS: [char; 2] = ['-', '_'];

/// Returns `true` if `file_name` follows the `<stem>.schema.json` convention.
pub fn is_schema_file_name(file_name: &str) -> bool {
    file_name.len() > SCHEMA_FILE_SUFFIX.len() && file_name.ends_with(SCHEMA_FILE_SUFFIX)
}

/// Strip the directory prefix and the schema suffix from a file name.
///
/// Both `/` and `\` count as directory separators. A name without the
/// suffix is returned with only its directory prefix removed.
pub fn schema_stem(file_name: &str) -> &str {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    base.strip_suffix(SCHEMA_FILE_SUFFIX).unwrap_or(base)
}

/// Canonical type identifier for a schema file name.
///
/// ```
/// use schemagen_core::canonicalize;
///
/// assert_eq!(canonicalize("person.schema.json"), "Person");
/// assert_eq!(canonicalize("/schemas/user-profile.schema.json"), "UserProfile");
/// assert_eq!(canonicalize("userAPI.schema.json"), "UserAPI");
/// ```
pub fn canonicalize(file_name: &str) -> String {
    canonicalize_stem(schema_stem(file_name))
}

/// Canonical type identifier for an already-stripped stem.
pub fn canonicalize_stem(stem: &str) -> String {
    stem.split(SEPARATORS)
        .filter(|token| !token.is_empty())
        .map(upper_first)
        .collect()
}

/// Lower-cased file stem used for the per-type artifacts of `canonical`.
pub fn module_file_stem(canonical: &str) -> String {
    canonical.to_lowercase()
}

fn upper_first(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn simple_lowercase_name() {
        assert_eq!(canonicalize("person.schema.json"), "Person");
    }

    #[test]
    fn capitalization_inside_a_token_is_kept() {
        assert_eq!(canonicalize("Person.schema.json"), "Person");
        assert_eq!(canonicalize("PERSON.schema.json"), "PERSON");
        assert_eq!(canonicalize("pErSoN.schema.json"), "PErSoN");
        assert_eq!(canonicalize("userAPI.schema.json"), "UserAPI");
    }

    #[test]
    fn hyphens_and_underscores_split_words() {
        assert_eq!(canonicalize("user-profile.schema.json"), "UserProfile");
        assert_eq!(canonicalize("user_profile_data.schema.json"), "UserProfileData");
        assert_eq!(
            canonicalize("api-v2_user_profile-data.schema.json"),
            "ApiV2UserProfileData"
        );
    }

    #[test]
    fn separator_runs_collapse() {
        let expected = canonicalize("user-profile.schema.json");
        for name in [
            "user--profile.schema.json",
            "user__profile.schema.json",
            "user-_profile.schema.json",
            "user--__profile.schema.json",
        ] {
            assert_eq!(canonicalize(name), expected, "{name}");
        }
    }

    #[test]
    fn leading_and_trailing_separators_are_dropped() {
        assert_eq!(canonicalize("-person.schema.json"), "Person");
        assert_eq!(canonicalize("person_.schema.json"), "Person");
        assert_eq!(canonicalize("__person--.schema.json"), "Person");
    }

    #[test]
    fn digits_are_inert() {
        assert_eq!(canonicalize("2user-profile.schema.json"), "2userProfile");
        assert_eq!(canonicalize("user-profile2.schema.json"), "UserProfile2");
        assert_eq!(canonicalize("api-v1-2-3-schema.schema.json"), "ApiV123Schema");
    }

    #[test]
    fn all_separator_stem_is_empty() {
        assert_eq!(canonicalize("---___.schema.json"), "");
        assert_eq!(canonicalize(".schema.json"), "");
    }

    #[test]
    fn directory_prefixes_are_stripped() {
        assert_eq!(canonicalize("/path/to/user-profile.schema.json"), "UserProfile");
        assert_eq!(canonicalize("./schemas/user-profile.schema.json"), "UserProfile");
        assert_eq!(canonicalize(r"C:\schemas\user-profile.schema.json"), "UserProfile");
    }

    #[test]
    fn non_ascii_first_letters_are_upper_cased() {
        assert_eq!(canonicalize("école-élève.schema.json"), "ÉcoleÉlève");
    }

    #[test]
    fn schema_file_filter() {
        assert!(is_schema_file_name("person.schema.json"));
        assert!(!is_schema_file_name("person.json"));
        assert!(!is_schema_file_name(".schema.json"));
        assert!(!is_schema_file_name("person.schema.json.bak"));
    }

    #[test]
    fn module_file_stem_is_lowercase() {
        assert_eq!(module_file_stem("UserProfile"), "userprofile");
        assert_eq!(module_file_stem("2userProfile"), "2userprofile");
    }

    proptest! {
        #[test]
        fn output_is_concatenation_of_upper_first_tokens(
            tokens in proptest::collection::vec("[a-zA-Z0-9]{1,8}", 1..6),
            seps in proptest::collection::vec("[-_]{1,3}", 6),
        ) {
            let mut stem = String::new();
            for (i, token) in tokens.iter().enumerate() {
                if i > 0 {
                    stem.push_str(&seps[i]);
                }
                stem.push_str(token);
            }
            let expected: String = tokens.iter().map(|t| upper_first(t)).collect();
            prop_assert_eq!(canonicalize(&format!("{stem}.schema.json")), expected);
        }

        #[test]
        fn output_never_contains_separators(stem in "[-_a-zA-Z0-9]{0,24}") {
            let name = canonicalize(&format!("{stem}.schema.json"));
            prop_assert!(!name.contains('-'));
            prop_assert!(!name.contains('_'));
        }

        #[test]
        fn separator_free_names_only_change_first_char(stem in "[a-zA-Z0-9]{1,16}") {
            let name = canonicalize_stem(&stem);
            prop_assert_eq!(&name[1..], &stem[1..]);
            prop_assert_eq!(canonicalize_stem(&name), name.clone());
        }
    }
}

//! File name validation.
//!
//! A file name is a single plain path component:
//! - Must be non-empty
//! - Must not be `.` or `..`
//! - Must not contain `/`, `\` or NUL

use crate::error::{CacherError, CacherResult};

const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// Validate a file name, returning `Ok(())` if it names a file directly
/// inside the cache root.
pub fn validate_file_name(name: &str) -> CacherResult<()> {
    let invalid = |reason: String| CacherError::InvalidFileName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("file name must not be empty".into()));
    }
    if name == "." || name == ".." {
        return Err(invalid("file name must not be '.' or '..'".into()));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_names_are_valid() {
        for name in ["x.json", "report 2024.bin", ".hidden", "a..b", "été.txt"] {
            assert!(validate_file_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn empty_is_invalid() {
        assert!(matches!(
            validate_file_name(""),
            Err(CacherError::InvalidFileName { .. })
        ));
    }

    #[test]
    fn dot_entries_are_invalid() {
        assert!(validate_file_name(".").is_err());
        assert!(validate_file_name("..").is_err());
    }

    #[test]
    fn separators_are_invalid() {
        let err = validate_file_name("../etc/passwd").unwrap_err();
        assert!(err.to_string().contains("forbidden character"));
        assert!(validate_file_name("a\\b").is_err());
        assert!(validate_file_name("nul\0").is_err());
    }

    proptest! {
        #[test]
        fn names_with_a_slash_are_rejected(prefix in "[a-z]{0,8}", suffix in "[a-z]{0,8}") {
            let name = format!("{prefix}/{suffix}");
            prop_assert!(validate_file_name(&name).is_err());
        }

        #[test]
        fn alphanumeric_names_are_accepted(name in "[A-Za-z0-9_-][A-Za-z0-9_.-]{0,30}") {
            prop_assume!(name != "." && name != "..");
            prop_assert!(validate_file_name(&name).is_ok());
        }
    }
}

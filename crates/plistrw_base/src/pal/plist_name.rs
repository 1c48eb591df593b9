use relative_path::RelativePathBuf;
use std::path::{Path, PathBuf};

use crate::{PlistError, PlistResult};

/// File extension used for every plist name.
pub const PLIST_EXTENSION: &str = "plist";

const SEPARATORS: [char; 2] = ['/', '\\'];

/* 📖 # Why use RelativePathBuf for PlistName?

A plist name is resolved against two different roots: the documents directory
and the resource bundle. Keeping it a relative path guarantees both resolutions
stay inside their root:

1. **No absolute names**: "/etc/app" would ignore the root entirely on join
2. **No escaping**: ".." segments are rejected up front, split on both separators
3. **Portable separators**: "profiles/main" resolves the same on every platform
*/

/// Logical name of a plist file, without the `.plist` extension.
///
/// # Examples
///
/// ```
/// use plistrw_base::PlistName;
/// use std::path::Path;
///
/// let name = PlistName::new("settings").unwrap();
/// assert_eq!(name.file_name().as_str(), "settings.plist");
/// assert_eq!(name.resolve_in(Path::new("/docs")), Path::new("/docs/settings.plist"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlistName(RelativePathBuf);

impl PlistName {
    /// Validates a logical name.
    ///
    /// Fails with `InvalidArgument` for empty names, absolute names, names
    /// containing `..` and names whose last segment is empty or `.`. Both `/`
    /// and `\` count as separators.
    pub fn new(name: &str) -> PlistResult<Self> {
        if name.trim().is_empty() {
            return Err(Box::new(PlistError::invalid_argument(
                "plist name must not be empty",
            )));
        }
        if name.starts_with(SEPARATORS) || Path::new(name).is_absolute() {
            return Err(Box::new(PlistError::invalid_argument(format!(
                "plist name must be relative (was {})",
                name
            ))));
        }
        if name.split(SEPARATORS).any(|segment| segment == "..") {
            return Err(Box::new(PlistError::invalid_argument(format!(
                "plist name must not contain '..' (was {})",
                name
            ))));
        }
        if matches!(name.rsplit(SEPARATORS).next(), None | Some("") | Some(".")) {
            return Err(Box::new(PlistError::invalid_argument(format!(
                "plist name must end with a file name (was {})",
                name
            ))));
        }
        Ok(Self(RelativePathBuf::from(name)))
    }

    /// Returns the name with the `.plist` extension appended.
    pub fn file_name(&self) -> RelativePathBuf {
        RelativePathBuf::from(format!("{}.{}", self.0, PLIST_EXTENSION))
    }

    /// Joins the file name onto a base directory.
    pub fn resolve_in(&self, base: &Path) -> PathBuf {
        base.join(self.file_name().as_str())
    }
}

impl std::fmt::Display for PlistName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plist_name_appends_extension() {
        let name = PlistName::new("app").unwrap();
        assert_eq!(name.file_name().as_str(), "app.plist");
    }

    #[test]
    fn test_plist_name_keeps_existing_dots() {
        let name = PlistName::new("com.example.app").unwrap();
        assert_eq!(name.file_name().as_str(), "com.example.app.plist");
    }

    #[test]
    fn test_plist_name_resolve_in_subdirectory() {
        let name = PlistName::new("profiles/main").unwrap();
        assert_eq!(
            name.resolve_in(Path::new("/docs")),
            PathBuf::from("/docs/profiles/main.plist")
        );
    }

    #[test]
    fn test_plist_name_rejects_empty() {
        let err = PlistName::new("  ").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_plist_name_rejects_absolute() {
        let err = PlistName::new("/etc/passwd").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_plist_name_rejects_parent_dir() {
        let err = PlistName::new("../outside").unwrap_err();
        assert!(err.is_invalid_argument());
        let err = PlistName::new("a/../../b").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_plist_name_rejects_backslash_parent_dir() {
        let err = PlistName::new("..\\..\\outside").unwrap_err();
        assert!(err.is_invalid_argument());
        let err = PlistName::new("profiles\\..\\..\\outside").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_plist_name_rejects_missing_file_name() {
        for name in ["foo/", "foo\\", ".", "profiles/.", "./"] {
            let err = PlistName::new(name).unwrap_err();
            assert!(err.is_invalid_argument(), "{name}");
        }
    }

    #[test]
    fn test_plist_name_display() {
        let name = PlistName::new("profiles/main").unwrap();
        assert_eq!(name.to_string(), "profiles/main");
    }
}

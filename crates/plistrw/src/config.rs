use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use plistrw_base::{ErrorKind, PalHandle, PlistError, PlistResult, RealPal, ResultExt};

/// Serialization used when saving. Loading accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlistFormat {
    #[default]
    Xml,
    Binary,
}

/// Configuration for a plist store.
///
/// Every field is optional; the default is the platform behavior.
///
/// ```toml
/// documents_dir = "/var/app/Documents"
/// bundle_dir = "/opt/app/Resources"
/// format = "binary"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Overrides the platform documents directory.
    #[serde(default)]
    pub documents_dir: Option<PathBuf>,
    /// Overrides the resource bundle directory.
    #[serde(default)]
    pub bundle_dir: Option<PathBuf>,
    /// Format written by `save`.
    #[serde(default)]
    pub format: PlistFormat,
}

impl StoreConfig {
    /// Parse a configuration from TOML text. `path` is only used in errors.
    pub fn from_toml_str(text: &str, path: &Path) -> PlistResult<Self> {
        toml::from_str(text).map_err(|e| {
            Box::new(PlistError::new(ErrorKind::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            }))
        })
    }

    /// Builds a RealPal honoring the directory overrides.
    pub fn real_pal(&self) -> RealPal {
        let mut pal = RealPal::new();
        if let Some(dir) = &self.documents_dir {
            pal = pal.with_documents_dir(dir);
        }
        if let Some(dir) = &self.bundle_dir {
            pal = pal.with_bundle_dir(dir);
        }
        pal
    }
}

/// Load a store configuration file through the PAL.
///
/// Fails with `FileNotFound` if the file is missing and `Config` if it does
/// not parse.
#[instrument(skip(pal), fields(path = %path.display()))]
pub fn load_config(pal: &PalHandle, path: &Path) -> PlistResult<StoreConfig> {
    if !pal.file_exists(path)? {
        return Err(Box::new(PlistError::file_not_found(path)));
    }
    let text = pal
        .read_file_to_string(path)
        .with_context(|| format!("reading store config {}", path.display()))?;
    let config = StoreConfig::from_toml_str(&text, path)?;
    debug!(config = ?config, "loaded store config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plistrw_base::{MockPal, Pal};

    #[test]
    fn test_empty_config_is_default() {
        let config = StoreConfig::from_toml_str("", Path::new("plistrw.toml")).unwrap();
        assert_eq!(config.documents_dir, None);
        assert_eq!(config.bundle_dir, None);
        assert_eq!(config.format, PlistFormat::Xml);
    }

    #[test]
    fn test_full_config() {
        let text = r#"
            documents_dir = "/var/app/Documents"
            bundle_dir = "/opt/app/Resources"
            format = "binary"
        "#;
        let config = StoreConfig::from_toml_str(text, Path::new("plistrw.toml")).unwrap();
        assert_eq!(config.documents_dir, Some(PathBuf::from("/var/app/Documents")));
        assert_eq!(config.bundle_dir, Some(PathBuf::from("/opt/app/Resources")));
        assert_eq!(config.format, PlistFormat::Binary);
    }

    #[test]
    fn test_unknown_format_is_config_error() {
        let err = StoreConfig::from_toml_str("format = \"json\"", Path::new("plistrw.toml"))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Config { .. }), "{:?}", err);
    }

    #[test]
    fn test_unknown_field_is_config_error() {
        let err = StoreConfig::from_toml_str("documents = \"/x\"", Path::new("plistrw.toml"))
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Config { .. }), "{:?}", err);
    }

    #[test]
    fn test_real_pal_uses_overrides() {
        let config = StoreConfig {
            documents_dir: Some(PathBuf::from("/var/app/Documents")),
            ..StoreConfig::default()
        };
        assert_eq!(
            config.real_pal().documents_dir().unwrap(),
            PathBuf::from("/var/app/Documents")
        );
    }

    #[test]
    fn test_load_config_through_pal() {
        let mock = MockPal::new();
        mock.add_file("/etc/plistrw.toml", b"format = \"binary\"".to_vec());
        let pal = PalHandle::new(mock);

        let config = load_config(&pal, Path::new("/etc/plistrw.toml")).unwrap();
        assert_eq!(config.format, PlistFormat::Binary);
    }

    #[test]
    fn test_load_config_missing_file() {
        let pal = PalHandle::new(MockPal::new());
        let err = load_config(&pal, Path::new("/etc/plistrw.toml")).unwrap_err();
        assert!(err.is_file_not_found());
    }
}

/* 📖 # Why does save refuse to create files?

`save` is an update operation. The first revision of a plist file always comes
from the bundled template via `copy_template`, and callers use the
`FileNotFound` from `load`/`save` to detect a first run. Creating files on save
would make that state undetectable.
*/

use std::path::{Path, PathBuf};

use plist::Value;
use tracing::{debug, instrument};

use plistrw_base::{ErrorKind, PalHandle, PlistError, PlistName, PlistResult, ResultExt};

use crate::config::{PlistFormat, StoreConfig};
use crate::location::Location;
use crate::root::{PlistRoot, RootKind, value_type_name};

/// Reads and writes plist files in the documents directory, the resource
/// bundle or at explicit paths.
///
/// # Examples
///
/// ```
/// use plistrw::{Location, PlistStore, RootKind};
/// use plistrw_base::{MockPal, PalHandle};
///
/// let mock = MockPal::new();
/// mock.add_resource("settings", br#"<?xml version="1.0" encoding="UTF-8"?>
/// <plist version="1.0"><dict><key>volume</key><integer>3</integer></dict></plist>"#.to_vec());
///
/// let store = PlistStore::new(PalHandle::new(mock));
/// store.ensure_from_template("settings").unwrap();
/// let settings = store.load("settings", RootKind::Mapping, Location::DocumentsDir).unwrap();
/// assert!(settings.as_mapping().unwrap().contains_key("volume"));
/// ```
#[derive(Debug, Clone)]
pub struct PlistStore {
    pal: PalHandle,
    format: PlistFormat,
}

impl PlistStore {
    /// Create a store writing XML plists.
    pub fn new(pal: PalHandle) -> Self {
        Self {
            pal,
            format: PlistFormat::default(),
        }
    }

    /// Create a store using the format of `config`.
    ///
    /// The directory overrides of the config apply to the PAL, see
    /// [`StoreConfig::real_pal`].
    pub fn with_config(pal: PalHandle, config: &StoreConfig) -> Self {
        Self {
            pal,
            format: config.format,
        }
    }

    /// Create a store on the real file system as described by `config`.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_config(PalHandle::new(config.real_pal()), config)
    }

    /// Path of `<file_name>.plist` in the documents directory.
    #[instrument(skip(self))]
    pub fn resolve_path(&self, file_name: &str) -> PlistResult<PathBuf> {
        let name = PlistName::new(file_name)?;
        let path = name.resolve_in(&self.pal.documents_dir()?);
        debug!(path = %path.display(), "resolved documents path");
        Ok(path)
    }

    /// Whether a regular file exists for `file_name` at `location`.
    #[instrument(skip(self))]
    pub fn exists(&self, file_name: &str, location: Location) -> PlistResult<bool> {
        match location {
            Location::DocumentsDir => self.pal.file_exists(&self.resolve_path(file_name)?),
            Location::ExplicitPath => self.pal.file_exists(Path::new(file_name)),
            Location::MainBundle => {
                let name = PlistName::new(file_name)?;
                Ok(self.pal.resource_path(&name)?.is_some())
            }
        }
    }

    /// Whether the file for `file_name` at `location` exists and may be written.
    ///
    /// The main bundle is read-only; asking there is an `InvalidArgument`.
    #[instrument(skip(self))]
    pub fn is_writable(&self, file_name: &str, location: Location) -> PlistResult<bool> {
        let path = self.writable_path(file_name, location)?;
        self.pal.is_writable(&path)
    }

    /// Replace the contents of an existing plist file with `value`.
    ///
    /// `value` must be a dictionary or an array. The file must already exist
    /// and be writable; `save` never creates files.
    #[instrument(skip(self, value))]
    pub fn save(&self, file_name: &str, value: &Value, location: Location) -> PlistResult<()> {
        if RootKind::of(value).is_none() {
            return Err(Box::new(PlistError::invalid_argument(format!(
                "expected value to be a mapping or a sequence, was {}",
                value_type_name(value)
            ))));
        }
        let path = self.writable_path(file_name, location)?;
        if !self.pal.file_exists(&path)? {
            return Err(Box::new(PlistError::file_not_found(&path)));
        }
        if !self.pal.is_writable(&path)? {
            return Err(Box::new(PlistError::file_not_writable(&path)));
        }

        let bytes = self.encode(value, &path)?;
        self.pal
            .write_file_atomically(&path, &bytes)
            .with_context(|| format!("saving plist {}", file_name))?;
        debug!(path = %path.display(), len = bytes.len(), "saved plist");
        Ok(())
    }

    /// Convenience for saving a [`PlistRoot`] obtained from [`Self::load`].
    pub fn save_root(
        &self,
        file_name: &str,
        root: &PlistRoot,
        location: Location,
    ) -> PlistResult<()> {
        self.save(file_name, &root.clone().into_value(), location)
    }

    /// Parse the plist file for `file_name` at `location` and return its root.
    ///
    /// Fails with `FileNotFound` if there is no file and with `UnexpectedRoot`
    /// if the root is not of kind `kind`.
    #[instrument(skip(self))]
    pub fn load(
        &self,
        file_name: &str,
        kind: RootKind,
        location: Location,
    ) -> PlistResult<PlistRoot> {
        let path = match location {
            Location::DocumentsDir => self.resolve_path(file_name)?,
            Location::ExplicitPath => PathBuf::from(file_name),
            Location::MainBundle => {
                let name = PlistName::new(file_name)?;
                self.pal.resource_path(&name)?.ok_or_else(|| {
                    Box::new(PlistError::file_not_found(name.file_name().as_str()))
                })?
            }
        };
        if !self.pal.file_exists(&path)? {
            return Err(Box::new(PlistError::file_not_found(&path)));
        }

        let reader = self.pal.read_file(&path)?;
        let value = Value::from_reader(reader).map_err(|e| {
            Box::new(PlistError::new(ErrorKind::Plist {
                path: path.clone(),
                source: e,
            }))
        })?;

        match (kind, value) {
            (RootKind::Mapping, Value::Dictionary(dict)) => Ok(PlistRoot::Mapping(dict)),
            (RootKind::Sequence, Value::Array(items)) => Ok(PlistRoot::Sequence(items)),
            (kind, other) => Err(Box::new(PlistError::new(ErrorKind::UnexpectedRoot {
                path,
                expected: kind.name().to_string(),
                found: value_type_name(&other).to_string(),
            }))),
        }
    }

    /// Copy the bundled `<file_name>.plist` template into the documents directory.
    ///
    /// Fails with `FileNotFound` if the bundle has no such resource and with
    /// `AlreadyExists` if the documents file is already there; the existing
    /// file is left untouched.
    #[instrument(skip(self))]
    pub fn copy_template(&self, file_name: &str) -> PlistResult<()> {
        let name = PlistName::new(file_name)?;
        let template = self.pal.resource_path(&name)?.ok_or_else(|| {
            Box::new(
                PlistError::file_not_found(name.file_name().as_str())
                    .context("template not found in main bundle"),
            )
        })?;
        let destination = name.resolve_in(&self.pal.documents_dir()?);
        if self.pal.file_exists(&destination)? {
            return Err(Box::new(PlistError::already_exists(destination)));
        }
        if let Some(parent) = destination.parent() {
            self.pal.create_directory_all(parent)?;
        }
        self.pal
            .copy_file(&template, &destination)
            .with_context(|| format!("copying template {}", name))?;
        debug!(
            template = %template.display(),
            destination = %destination.display(),
            "copied template"
        );
        Ok(())
    }

    /// Copy the template unless the documents file exists already.
    ///
    /// Returns true if a copy was made.
    #[instrument(skip(self))]
    pub fn ensure_from_template(&self, file_name: &str) -> PlistResult<bool> {
        if self.exists(file_name, Location::DocumentsDir)? {
            debug!("documents file present, keeping it");
            return Ok(false);
        }
        self.copy_template(file_name)?;
        Ok(true)
    }

    fn writable_path(&self, file_name: &str, location: Location) -> PlistResult<PathBuf> {
        if !location.is_writable_location() {
            return Err(Box::new(PlistError::invalid_argument(format!(
                "{} is read-only, use the documents directory or an explicit path (was {})",
                location, file_name
            ))));
        }
        match location {
            Location::ExplicitPath => Ok(PathBuf::from(file_name)),
            _ => self.resolve_path(file_name),
        }
    }

    fn encode(&self, value: &Value, path: &Path) -> PlistResult<Vec<u8>> {
        let mut bytes = Vec::new();
        let result = match self.format {
            PlistFormat::Xml => value.to_writer_xml(&mut bytes),
            PlistFormat::Binary => value.to_writer_binary(&mut bytes),
        };
        result.map_err(|e| {
            Box::new(PlistError::new(ErrorKind::Plist {
                path: path.to_path_buf(),
                source: e,
            }))
        })?;
        Ok(bytes)
    }
}

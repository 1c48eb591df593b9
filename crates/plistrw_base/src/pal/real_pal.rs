use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::{PlistError, PlistResult};

use super::plist_name::PlistName;
use super::traits::{Pal, ReadSeek};

/* 📖 # Why cache the documents directory in a process-wide static?

The platform documents directory cannot change while the process runs, so it is
looked up once on first use. OnceLock keeps the first value; a racing second
lookup computes the same path.
*/
static PLATFORM_DOCUMENTS_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

fn platform_documents_dir() -> Option<&'static Path> {
    PLATFORM_DOCUMENTS_DIR
        .get_or_init(|| {
            let dir = dirs::document_dir();
            debug!(dir = ?dir, "resolved platform documents directory");
            dir
        })
        .as_deref()
}

/// Concrete PAL implementation using the real filesystem via std::fs.
///
/// The documents directory defaults to the platform one (`dirs::document_dir`),
/// the resource bundle to the directory containing the running executable.
/// Both can be overridden.
#[derive(Debug, Default)]
pub struct RealPal {
    documents_dir: Option<PathBuf>,
    bundle_dir: Option<PathBuf>,
}

impl RealPal {
    /// Create a RealPal using the platform locations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `dir` instead of the platform documents directory.
    pub fn with_documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.documents_dir = Some(dir.into());
        self
    }

    /// Use `dir` as the resource bundle instead of the executable's directory.
    pub fn with_bundle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bundle_dir = Some(dir.into());
        self
    }

    fn bundle_dir(&self) -> PlistResult<PathBuf> {
        if let Some(dir) = &self.bundle_dir {
            return Ok(dir.clone());
        }
        let exe_path = std::env::current_exe()
            .map_err(|e| Box::new(PlistError::file_error("<current_exe>", e)))?;
        exe_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| crate::err!("Executable {} has no parent directory", exe_path.display()))
    }
}

impl Pal for RealPal {
    fn documents_dir(&self) -> PlistResult<PathBuf> {
        if let Some(dir) = &self.documents_dir {
            return Ok(dir.clone());
        }
        platform_documents_dir()
            .map(Path::to_path_buf)
            .ok_or_else(|| crate::err!("No documents directory available on this platform"))
    }

    #[instrument(skip(self), fields(name = %name))]
    fn resource_path(&self, name: &PlistName) -> PlistResult<Option<PathBuf>> {
        let candidate = name.resolve_in(&self.bundle_dir()?);
        let found = candidate.is_file();
        debug!(found, candidate = %candidate.display(), "looked up bundle resource");
        Ok(found.then_some(candidate))
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn file_exists(&self, path: &Path) -> PlistResult<bool> {
        let exists = path.is_file();
        debug!(exists, "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn is_writable(&self, path: &Path) -> PlistResult<bool> {
        // Opening for write without truncation checks effective permissions
        // and leaves the contents alone.
        let writable = path.is_file() && fs::OpenOptions::new().write(true).open(path).is_ok();
        debug!(writable, "checked file writability");
        Ok(writable)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn read_file(&self, path: &Path) -> PlistResult<Box<dyn ReadSeek + 'static>> {
        let file = fs::File::open(path).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(PlistError::file_error(path, e))
        })?;
        debug!("file opened successfully");
        Ok(Box::new(file))
    }

    #[instrument(skip(self, contents), fields(path = %path.display(), len = contents.len()))]
    fn write_file_atomically(&self, path: &Path, contents: &[u8]) -> PlistResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_error = |e: std::io::Error| Box::new(PlistError::file_error(path, e));

        let mut temp = NamedTempFile::new_in(parent).map_err(file_error)?;
        debug!(temp = %temp.path().display(), "writing temporary file");
        temp.write_all(contents).map_err(file_error)?;
        temp.as_file().sync_all().map_err(file_error)?;
        if let Ok(metadata) = fs::metadata(path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(file_error)?;
        }
        temp.persist(path).map_err(|e| {
            debug!(error = %e, "failed to replace file");
            file_error(e.error)
        })?;
        debug!("file replaced atomically");
        Ok(())
    }

    #[instrument(skip(self), fields(from = %from.display(), to = %to.display()))]
    fn copy_file(&self, from: &Path, to: &Path) -> PlistResult<()> {
        let mut source = fs::File::open(from).map_err(|e| {
            debug!(error = %e, "failed to open copy source");
            Box::new(PlistError::file_error(from, e))
        })?;
        // create_new fails instead of replacing a file that appeared meanwhile.
        let mut destination = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(to)
            .map_err(|e| {
                debug!(error = %e, "failed to create copy destination");
                if e.kind() == io::ErrorKind::AlreadyExists {
                    Box::new(PlistError::already_exists(to))
                } else {
                    Box::new(PlistError::file_error(to, e))
                }
            })?;
        let copy_error = |e: io::Error| {
            Box::new(PlistError::file_error(to, e).context(format!("copying {}", from.display())))
        };
        let bytes = io::copy(&mut source, &mut destination).map_err(copy_error)?;
        destination.sync_all().map_err(copy_error)?;
        debug!(bytes, "file copied");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn create_directory_all(&self, path: &Path) -> PlistResult<()> {
        fs::create_dir_all(path).map_err(|e| {
            debug!(error = %e, "failed to create directory");
            Box::new(PlistError::file_error(path, e))
        })?;
        debug!("directory created successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_dirs() -> (TempDir, RealPal) {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        fs::create_dir(temp_dir.path().join("Documents")).unwrap();
        fs::create_dir(temp_dir.path().join("Bundle")).unwrap();
        let pal = RealPal::new()
            .with_documents_dir(temp_dir.path().join("Documents"))
            .with_bundle_dir(temp_dir.path().join("Bundle"));
        (temp_dir, pal)
    }

    #[test]
    fn test_documents_dir_override() {
        let (temp_dir, pal) = setup_test_dirs();
        assert_eq!(pal.documents_dir().unwrap(), temp_dir.path().join("Documents"));
    }

    #[test]
    fn test_platform_documents_dir_is_stable() {
        let pal = RealPal::new();
        // Not every CI machine has a documents directory; either way the
        // answer must not change between calls.
        let first = pal.documents_dir().ok();
        let second = pal.documents_dir().ok();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resource_path_found() {
        let (temp_dir, pal) = setup_test_dirs();
        fs::write(temp_dir.path().join("Bundle/app.plist"), "x").unwrap();

        let name = PlistName::new("app").unwrap();
        assert_eq!(
            pal.resource_path(&name).unwrap(),
            Some(temp_dir.path().join("Bundle/app.plist"))
        );
    }

    #[test]
    fn test_resource_path_missing() {
        let (_temp_dir, pal) = setup_test_dirs();
        let name = PlistName::new("missing").unwrap();
        assert_eq!(pal.resource_path(&name).unwrap(), None);
    }

    #[test]
    fn test_file_exists_ignores_directories() {
        let (temp_dir, pal) = setup_test_dirs();
        fs::write(temp_dir.path().join("Documents/a.plist"), "x").unwrap();

        assert!(pal.file_exists(&temp_dir.path().join("Documents/a.plist")).unwrap());
        assert!(!pal.file_exists(&temp_dir.path().join("Documents")).unwrap());
        assert!(!pal.file_exists(&temp_dir.path().join("Documents/b.plist")).unwrap());
    }

    #[test]
    fn test_is_writable() {
        let (temp_dir, pal) = setup_test_dirs();
        let path = temp_dir.path().join("Documents/a.plist");
        assert!(!pal.is_writable(&path).unwrap());

        fs::write(&path, "content").unwrap();
        assert!(pal.is_writable(&path).unwrap());
        // Checking must not touch the contents.
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_write_file_atomically_replaces_contents() {
        let (temp_dir, pal) = setup_test_dirs();
        let path = temp_dir.path().join("Documents/a.plist");
        fs::write(&path, "old contents that are longer").unwrap();

        pal.write_file_atomically(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path().join("Documents"))
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_file_atomically_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (temp_dir, pal) = setup_test_dirs();
        let path = temp_dir.path().join("Documents/a.plist");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        pal.write_file_atomically(&path, b"new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_read_file_to_string() {
        let (temp_dir, pal) = setup_test_dirs();
        let path = temp_dir.path().join("Documents/a.txt");
        fs::write(&path, "hello world").unwrap();

        assert_eq!(pal.read_file_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn test_read_file_not_found() {
        let (temp_dir, pal) = setup_test_dirs();
        let result = pal.read_file(&temp_dir.path().join("Documents/nope.plist"));
        assert!(result.is_err());
    }

    #[test]
    fn test_copy_file_and_create_directory_all() {
        let (temp_dir, pal) = setup_test_dirs();
        let from = temp_dir.path().join("Bundle/app.plist");
        let to_dir = temp_dir.path().join("Documents/nested/deeper");
        fs::write(&from, b"\x00\x01bytes").unwrap();

        pal.create_directory_all(&to_dir).unwrap();
        pal.copy_file(&from, &to_dir.join("app.plist")).unwrap();

        assert_eq!(fs::read(to_dir.join("app.plist")).unwrap(), b"\x00\x01bytes");
    }

    #[test]
    fn test_copy_file_missing_source() {
        let (temp_dir, pal) = setup_test_dirs();
        let result = pal.copy_file(
            &temp_dir.path().join("Bundle/none.plist"),
            &temp_dir.path().join("Documents/none.plist"),
        );
        assert!(result.is_err());
    }
}

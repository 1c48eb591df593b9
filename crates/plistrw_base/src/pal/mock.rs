use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::PlistError;
use crate::PlistResult;

use super::plist_name::{PLIST_EXTENSION, PlistName};
use super::traits::{Pal, ReadSeek};

/// Documents directory used by [`MockPal::new`].
pub const MOCK_DOCUMENTS_DIR: &str = "/mock/Documents";
/// Resource bundle directory used by [`MockPal::new`].
pub const MOCK_BUNDLE_DIR: &str = "/mock/Bundle";

/* 📖 # Why use HashMap for MockPal storage?

MockPal uses in-memory storage with Arc<Mutex<T>> for several reasons:
1. **Speed**: No filesystem I/O, deterministic and fast for unit tests
2. **Isolation**: No side effects on the real filesystem
3. **Control**: Read-only files and missing directories are one call away
4. **Thread-safe**: Mutex allows concurrent test execution

Cloning a MockPal shares the storage, so a test can keep one clone for
inspection after handing the other to a PalHandle.
*/

/// In-memory PAL implementation for testing.
///
/// # Examples
///
/// ```
/// use plistrw_base::{MockPal, Pal};
/// use std::path::Path;
///
/// let mock = MockPal::new();
/// mock.add_file("/mock/Documents/app.plist", b"content".to_vec());
/// let content = mock.read_file_to_string(Path::new("/mock/Documents/app.plist")).unwrap();
/// assert_eq!(content, "content");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    read_only: Arc<Mutex<HashSet<PathBuf>>>,
    directories: Arc<Mutex<HashSet<PathBuf>>>,
    documents_dir: Option<PathBuf>,
    bundle_dir: PathBuf,
}

impl MockPal {
    /// Create a new empty MockPal rooted at `/mock/Documents` and `/mock/Bundle`.
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            read_only: Arc::new(Mutex::new(HashSet::new())),
            directories: Arc::new(Mutex::new(HashSet::new())),
            documents_dir: Some(PathBuf::from(MOCK_DOCUMENTS_DIR)),
            bundle_dir: PathBuf::from(MOCK_BUNDLE_DIR),
        }
    }

    /// Simulate a platform without a documents directory.
    pub fn without_documents_dir(mut self) -> Self {
        self.documents_dir = None;
        self
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: Vec<u8>) {
        self.files.lock().unwrap().insert(path.into(), content);
    }

    /// Add `<name>.plist` to the resource bundle.
    pub fn add_resource(&self, name: &str, content: Vec<u8>) {
        let path = self.bundle_dir.join(format!("{}.{}", name, PLIST_EXTENSION));
        self.add_file(path, content);
    }

    /// Make writes to `path` fail with a permission error.
    pub fn set_read_only(&self, path: impl Into<PathBuf>) {
        self.read_only.lock().unwrap().insert(path.into());
    }

    /// Returns the current contents of a file, if any.
    pub fn file_content(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    /// Returns true if `create_directory_all` was called for `path`.
    pub fn has_directory(&self, path: impl AsRef<Path>) -> bool {
        self.directories.lock().unwrap().contains(path.as_ref())
    }

    fn permission_denied(path: &Path) -> Box<PlistError> {
        Box::new(PlistError::file_error(
            path,
            std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("Permission denied: {}", path.display()),
            ),
        ))
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn documents_dir(&self) -> PlistResult<PathBuf> {
        self.documents_dir
            .clone()
            .ok_or_else(|| crate::err!("No documents directory available on this platform"))
    }

    fn resource_path(&self, name: &PlistName) -> PlistResult<Option<PathBuf>> {
        let candidate = name.resolve_in(&self.bundle_dir);
        let files = self.files.lock().unwrap();
        Ok(files.contains_key(&candidate).then_some(candidate))
    }

    fn file_exists(&self, path: &Path) -> PlistResult<bool> {
        let files = self.files.lock().unwrap();
        Ok(files.contains_key(path))
    }

    fn is_writable(&self, path: &Path) -> PlistResult<bool> {
        let exists = self.files.lock().unwrap().contains_key(path);
        Ok(exists && !self.read_only.lock().unwrap().contains(path))
    }

    fn read_file(&self, path: &Path) -> PlistResult<Box<dyn ReadSeek + 'static>> {
        let files = self.files.lock().unwrap();
        let content = files
            .get(path)
            .ok_or_else(|| {
                Box::new(PlistError::file_error(
                    path,
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("File not found: {}", path.display()),
                    ),
                ))
            })?
            .clone();
        Ok(Box::new(Cursor::new(content)))
    }

    fn write_file_atomically(&self, path: &Path, contents: &[u8]) -> PlistResult<()> {
        if self.read_only.lock().unwrap().contains(path) {
            return Err(Self::permission_denied(path));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> PlistResult<()> {
        let mut files = self.files.lock().unwrap();
        let content = files.get(from).cloned().ok_or_else(|| {
            Box::new(PlistError::file_error(
                from,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", from.display()),
                ),
            ))
        })?;
        if files.contains_key(to) {
            return Err(Box::new(PlistError::already_exists(to)));
        }
        if self.read_only.lock().unwrap().contains(to) {
            return Err(Self::permission_denied(to));
        }
        files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn create_directory_all(&self, path: &Path) -> PlistResult<()> {
        self.directories.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }
}

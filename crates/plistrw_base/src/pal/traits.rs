use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::PlistResult;

use super::plist_name::PlistName;

/// Trait combining Read + Seek for file operations.
///
/// The plist decoder needs to seek to tell binary from XML files, so reads
/// hand out seekable handles (real files, in-memory buffers).
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/* 📖 # Why is Pal a trait instead of a struct?

The store only needs a handful of platform primitives: where the documents
directory is, where a bundled resource lives, and a few file operations.
Behind a trait:
1. **Testability**: MockPal runs the store against an in-memory file system
2. **Portability**: the bundle and documents locations differ per platform and
   are supplied by the implementation, not hardcoded in the store
*/

/// Platform Abstraction Layer (PAL) trait providing the platform primitives
/// used by the plist store.
///
/// Two implementations are provided:
/// - `RealPal`: Uses the real filesystem via `std::fs`
/// - `MockPal`: In-memory implementation for testing
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// The per-application writable documents directory.
    fn documents_dir(&self) -> PlistResult<PathBuf>;

    /// Look up `<name>.plist` in the read-only resource bundle.
    ///
    /// Returns `Ok(None)` if the bundle has no such resource.
    fn resource_path(&self, name: &PlistName) -> PlistResult<Option<PathBuf>>;

    /// Check if a regular file exists at the given path.
    fn file_exists(&self, path: &Path) -> PlistResult<bool>;

    /// Check if the process may write to the file at the given path.
    ///
    /// A path that does not exist is not writable.
    fn is_writable(&self, path: &Path) -> PlistResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &Path) -> PlistResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &Path) -> PlistResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .map_err(|e| Box::new(crate::PlistError::file_error(path, e)))?;
        String::from_utf8(contents)
            .map_err(|_e| crate::err!("File is not valid UTF-8: {}", path.display()))
    }

    /// Replace the file contents so that readers see either the old or the
    /// new contents, never a partial write.
    fn write_file_atomically(&self, path: &Path, contents: &[u8]) -> PlistResult<()>;

    /// Copy a file byte-for-byte to a new file.
    ///
    /// Fails with `AlreadyExists` if `to` exists; it is never replaced.
    fn copy_file(&self, from: &Path, to: &Path) -> PlistResult<()>;

    /// Create a directory and all parent directories.
    fn create_directory_all(&self, path: &Path) -> PlistResult<()>;
}

/// Handle to a PAL implementation, enabling shared ownership.
///
/// Internally wraps `Arc<dyn Pal>` for cheap cloning and thread-safe sharing.
///
/// # Examples
///
/// ```no_run
/// use plistrw_base::{PalHandle, RealPal};
///
/// let pal = PalHandle::new(RealPal::new());
/// let pal_clone = pal.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

/* 📖 # What is the Platform Abstraction Layer?

The PAL is the trait behind which every platform primitive the plist store
needs sits: locating the documents directory and the resource bundle, checking
files, reading, atomically replacing and copying them.

- RealPal: std::fs, the platform documents directory and tempfile for atomic writes
- MockPal: in-memory implementation for deterministic unit tests
*/

pub mod mock;
mod plist_name;
pub mod real_pal;
mod traits;

pub use mock::MockPal;
pub use plist_name::{PLIST_EXTENSION, PlistName};
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle, ReadSeek};

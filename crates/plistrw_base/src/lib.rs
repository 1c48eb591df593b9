/* 📖 # Why have plistrw_base as a separate crate?
plistrw_base provides the error type, tracing setup and the platform abstraction
the plist store is built on. Keeping it apart from the store lets the PAL be
tested on its own and reused by other persistence front ends.
*/

pub mod error;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, PlistError, PlistResult, ResultExt};
pub use pal::{MockPal, PLIST_EXTENSION, Pal, PalHandle, PlistName, ReadSeek, RealPal};

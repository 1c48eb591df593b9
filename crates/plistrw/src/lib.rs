pub mod config;
pub mod location;
pub mod root;
pub mod store;

pub use config::{PlistFormat, StoreConfig, load_config};
pub use location::Location;
pub use root::{PlistRoot, RootKind};
pub use store::PlistStore;

pub use plistrw_base::{ErrorKind, PlistError, PlistResult};

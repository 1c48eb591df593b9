use crate::error::PlistResult;
pub use tracing::instrument;
pub use tracing::{debug, error, info, trace, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a fmt subscriber with span trace capture for [`crate::PlistError`].
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init_tracing() -> PlistResult<()> {
    // The fmt layer and ErrorLayer share the formatted span fields, so they
    // must stay free of escape codes to keep span traces in error output plain.
    if tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .with(ErrorLayer::default())
        .try_init()
        .is_err()
    {
        debug!("global tracing subscriber already installed");
    }
    Ok(())
}

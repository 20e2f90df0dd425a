//! Public surface for formwire.
//!
//! Re-exports the building blocks and assembles a configured client stack
//! (interceptor chain, storage, OAuth) from a [`FormwireConfig`](config::FormwireConfig).

mod error;
mod stack;

pub use error::FormwireError;
pub use stack::{Formwire, FormwireBuilder};

/// Re-export for convenience.
pub use formwire_auth as auth;
/// Re-export for convenience.
pub use formwire_binder as binder;
/// Re-export for convenience.
pub use formwire_config as config;
/// Re-export for convenience.
pub use formwire_http as http;
/// Re-export for convenience.
pub use formwire_protocol as protocol;
/// Re-export for convenience.
pub use formwire_storage as storage;
/// Re-export for convenience.
pub use formwire_util as util;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

//! Small helpers: base64 codecs and call-rate limiting.

pub mod base64;
mod error;
mod timing;

pub use error::UtilError;
pub use timing::{Debouncer, Throttle};

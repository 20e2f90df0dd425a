//! Test helpers shared across formwire crates.

pub mod interceptors;
pub mod logging;
pub mod server;
pub mod transport;

pub use interceptors::{CallLog, RecordingInterceptor};
pub use logging::init_logging;
pub use server::serve;
pub use transport::{MockTransport, json_response, problems_response, text_response};

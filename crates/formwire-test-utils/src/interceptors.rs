use async_trait::async_trait;
use formwire_http::{HttpRequest, HttpResponse, Interceptor};
use formwire_protocol::ProblemsError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared, ordered log of hook invocations.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Interceptor appending `<name>.before` / `<name>.after` to a shared log.
#[derive(Clone)]
pub struct RecordingInterceptor {
    name: String,
    log: CallLog,
}

impl RecordingInterceptor {
    pub fn new(name: impl Into<String>, log: CallLog) -> Self {
        Self {
            name: name.into(),
            log,
        }
    }
}

#[async_trait]
impl Interceptor for RecordingInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn before(&self, _request: &mut HttpRequest) -> Result<(), ProblemsError> {
        self.log.lock().push(format!("{}.before", self.name));
        Ok(())
    }

    async fn after(
        &self,
        _request: &HttpRequest,
        _response: &mut HttpResponse,
    ) -> Result<(), ProblemsError> {
        self.log.lock().push(format!("{}.after", self.name));
        Ok(())
    }
}

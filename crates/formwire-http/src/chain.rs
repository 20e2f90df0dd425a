//! Ordered request/response middleware terminated by a transport.

use crate::message::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use async_trait::async_trait;
use formwire_protocol::ProblemsError;
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Middleware wrapping the remainder of an exchange.
///
/// The default [`intercept`](Interceptor::intercept) runs `before`, proceeds
/// down the chain, then runs `after` on the way back. Override `intercept`
/// to race, retry, or recover from the rest of the chain.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Inspect or mutate the outgoing request.
    async fn before(&self, _request: &mut HttpRequest) -> Result<(), ProblemsError> {
        Ok(())
    }

    /// Inspect or mutate the incoming response.
    async fn after(
        &self,
        _request: &HttpRequest,
        _response: &mut HttpResponse,
    ) -> Result<(), ProblemsError> {
        Ok(())
    }

    /// Wrap the rest of the chain.
    async fn intercept(
        &self,
        request: &mut HttpRequest,
        next: Next<'_>,
    ) -> Result<HttpResponse, ProblemsError> {
        self.before(request).await?;
        let mut response = next.proceed(request).await?;
        self.after(request, &mut response).await?;
        Ok(response)
    }
}

/// Position of an exchange within the chain, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Dispatching { position: usize },
    Transport { position: usize },
    Returning { position: usize },
    Failed { position: usize },
}

impl fmt::Display for ExchangePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dispatching { position } => write!(f, "dispatching(pos={position})"),
            Self::Transport { position } => write!(f, "transport(pos={position})"),
            Self::Returning { position } => write!(f, "returning(pos={position})"),
            Self::Failed { position } => write!(f, "failed(pos={position})"),
        }
    }
}

/// The remainder of a chain, handed to each interceptor.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    transport: &'a dyn Transport,
    position: usize,
}

impl<'a> Next<'a> {
    /// Index of the link this value will invoke.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Invoke the next interceptor, or the transport at the end of the chain.
    pub async fn proceed(self, request: &mut HttpRequest) -> Result<HttpResponse, ProblemsError> {
        let Some((current, rest)) = self.interceptors.split_first() else {
            debug!(
                "{} (method={}, url={})",
                ExchangePhase::Transport {
                    position: self.position
                },
                request.method,
                request.url
            );
            return self.transport.send(request).await;
        };

        debug!(
            "{} (interceptor={})",
            ExchangePhase::Dispatching {
                position: self.position
            },
            current.name()
        );
        let next = Next {
            interceptors: rest,
            transport: self.transport,
            position: self.position + 1,
        };
        let result = current.intercept(request, next).await;
        match &result {
            Ok(response) => debug!(
                "{} (interceptor={}, status={})",
                ExchangePhase::Returning {
                    position: self.position
                },
                current.name(),
                response.status.as_u16()
            ),
            Err(err) => debug!(
                "{} (interceptor={}, error={})",
                ExchangePhase::Failed {
                    position: self.position
                },
                current.name(),
                err
            ),
        }
        result
    }
}

/// Ordered interceptors plus the terminal transport.
#[derive(Clone)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
    transport: Arc<dyn Transport>,
}

impl InterceptorChain {
    /// Create a chain with no interceptors.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            interceptors: Vec::new(),
            transport,
        }
    }

    /// Append an interceptor; it runs inside all previously added ones.
    pub fn with(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.push(interceptor);
        self
    }

    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        debug!("adding interceptor (name={})", interceptor.name());
        self.interceptors.push(interceptor);
    }

    /// Interceptor names in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.interceptors
            .iter()
            .map(|interceptor| interceptor.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run one exchange through every interceptor and the transport.
    pub async fn proceed(&self, mut request: HttpRequest) -> Result<HttpResponse, ProblemsError> {
        let next = Next {
            interceptors: &self.interceptors,
            transport: self.transport.as_ref(),
            position: 0,
        };
        next.proceed(&mut request).await
    }
}

//! Client stack assembled from configuration.

use crate::error::FormwireError;
use formwire_auth::{BearerInterceptor, OAuthClient, OAuthConfig};
use formwire_binder::{ExtractorRegistry, Form, FormBinder};
use formwire_config::{FormwireConfig, OAuthSettings};
use formwire_http::{
    DefaultHeadersInterceptor, HeaderMap, HeaderName, HeaderValue, HttpClient, Interceptor,
    InterceptorChain, LoggingInterceptor, Method, ReqwestTransport, TimeoutInterceptor, Transport,
};
use formwire_protocol::ProblemType;
use formwire_storage::{FileBackend, JsonStore, MemoryBackend, StorageBackend};
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Configured HTTP client, storage, form binder and optional OAuth client.
#[derive(Clone)]
pub struct Formwire {
    config: FormwireConfig,
    http: HttpClient,
    binder: FormBinder,
    session_store: JsonStore,
    local_store: JsonStore,
    oauth: Option<Arc<OAuthClient>>,
}

impl Formwire {
    pub fn builder(config: FormwireConfig) -> FormwireBuilder {
        FormwireBuilder::new(config)
    }

    /// Build the default stack: reqwest transport, in-memory session storage.
    pub fn from_config(config: FormwireConfig) -> Result<Self, FormwireError> {
        FormwireBuilder::new(config).build()
    }

    pub fn config(&self) -> &FormwireConfig {
        &self.config
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn binder(&self) -> &FormBinder {
        &self.binder
    }

    /// Storage living for the process.
    pub fn session_store(&self) -> &JsonStore {
        &self.session_store
    }

    /// Storage persisted to `storage.path` when configured.
    pub fn local_store(&self) -> &JsonStore {
        &self.local_store
    }

    pub fn oauth(&self) -> Option<&Arc<OAuthClient>> {
        self.oauth.as_ref()
    }

    /// Extract `form`, send it as JSON and return the decoded response.
    ///
    /// Problems from a rejected submission are placed on the controls they
    /// name; problems from a successful one are cleared. An empty response
    /// body decodes as `null`.
    pub async fn submit(
        &self,
        form: &mut Form,
        method: Method,
        path: &str,
    ) -> Result<Value, FormwireError> {
        let data = self.binder.extract(form)?;
        debug!("submitting form (method={}, path={})", method, path);
        let result = self.http.request(method, path).json(&data).send().await;
        match result {
            Ok(response) => {
                self.binder.place_problems(form, &[]);
                if response.body.is_empty() {
                    Ok(Value::Null)
                } else {
                    Ok(response.json()?)
                }
            }
            Err(problems)
                if problems.has(&ProblemType::Connection)
                    || problems.has(&ProblemType::InvalidRequest) =>
            {
                Err(problems.into())
            }
            Err(problems) => {
                let unplaced = self.binder.place_problems(form, &problems.problems);
                info!(
                    "submission rejected (path={}, problems={}, unplaced={})",
                    path,
                    problems.problems.len(),
                    unplaced.len()
                );
                Err(FormwireError::Rejected { problems, unplaced })
            }
        }
    }
}

/// Assembles a [`Formwire`] stack, with hooks to swap transport and storage.
pub struct FormwireBuilder {
    config: FormwireConfig,
    transport: Option<Arc<dyn Transport>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    session_backend: Option<Arc<dyn StorageBackend>>,
    local_backend: Option<Arc<dyn StorageBackend>>,
    registry: ExtractorRegistry,
}

impl FormwireBuilder {
    pub fn new(config: FormwireConfig) -> Self {
        Self {
            config,
            transport: None,
            interceptors: Vec::new(),
            session_backend: None,
            local_backend: None,
            registry: ExtractorRegistry::new(),
        }
    }

    /// Replace the reqwest transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Add an interceptor inside the built-in ones.
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn with_session_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.session_backend = Some(backend);
        self
    }

    /// Override the backend chosen from `storage.path`.
    pub fn with_local_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.local_backend = Some(backend);
        self
    }

    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Validate the config and wire everything together.
    ///
    /// Chain order, outermost first: logging, timeout, default headers,
    /// bearer, then custom interceptors. Token endpoint calls share the
    /// chain minus bearer and custom interceptors.
    pub fn build(self) -> Result<Formwire, FormwireError> {
        let config = self.config;
        config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&config)?,
        };

        let mut base = InterceptorChain::new(transport);
        if config.http.log_exchanges {
            base.push(Arc::new(LoggingInterceptor));
        }
        if let Some(timeout_ms) = config.http.timeout_ms {
            base.push(Arc::new(TimeoutInterceptor::new(Duration::from_millis(
                timeout_ms,
            ))));
        }
        if !config.http.default_headers.is_empty() {
            base.push(Arc::new(DefaultHeadersInterceptor::new(default_headers(
                &config,
            )?)));
        }

        let session_backend: Arc<dyn StorageBackend> = self
            .session_backend
            .unwrap_or_else(|| Arc::new(MemoryBackend::new()));
        let local_backend: Arc<dyn StorageBackend> = match self.local_backend {
            Some(backend) => backend,
            None => match &config.storage.path {
                Some(path) => Arc::new(FileBackend::new(path)?),
                None => Arc::new(MemoryBackend::new()),
            },
        };
        let session_store = JsonStore::new(config.storage.prefix.clone(), session_backend);
        let local_store = JsonStore::new(config.storage.prefix.clone(), local_backend);

        let oauth = match &config.oauth {
            Some(settings) => Some(Arc::new(OAuthClient::new(
                oauth_config(settings)?,
                HttpClient::new(base.clone()),
                session_store.clone(),
                local_store.clone(),
            ))),
            None => None,
        };

        let mut chain = base;
        if let Some(client) = &oauth {
            chain.push(Arc::new(BearerInterceptor::new(client.clone())));
        }
        for interceptor in self.interceptors {
            chain.push(interceptor);
        }

        let mut http = HttpClient::new(chain);
        if let Some(base_url) = &config.http.base_url {
            http = http.with_base_url(parse_url(base_url, "http.base_url")?);
        }
        info!(
            "client stack ready (interceptors={:?}, oauth={}, persistent_storage={})",
            http.chain().names(),
            oauth.is_some(),
            config.storage.path.is_some()
        );

        Ok(Formwire {
            binder: FormBinder::new(self.registry),
            config,
            http,
            session_store,
            local_store,
            oauth,
        })
    }
}

fn default_transport(config: &FormwireConfig) -> Result<Arc<dyn Transport>, FormwireError> {
    let transport = match config.http.connect_timeout_ms {
        Some(ms) => ReqwestTransport::with_connect_timeout(Duration::from_millis(ms))?,
        None => ReqwestTransport::new(),
    };
    Ok(Arc::new(transport))
}

fn default_headers(config: &FormwireConfig) -> Result<HeaderMap, FormwireError> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.http.default_headers {
        let path = format!("http.default_headers.{name}");
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| FormwireError::invalid_setting(&path, err))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|err| FormwireError::invalid_setting(&path, err))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn oauth_config(settings: &OAuthSettings) -> Result<OAuthConfig, FormwireError> {
    let mut config = OAuthConfig::new(
        settings.client_id.clone(),
        parse_url(&settings.authorize_url, "oauth.authorize_url")?,
        parse_url(&settings.token_url, "oauth.token_url")?,
        settings.redirect_uri.clone(),
    )
    .with_scopes(settings.scopes.iter().cloned());
    if let Some(logout_url) = &settings.logout_url {
        config = config.with_logout(
            parse_url(logout_url, "oauth.logout_url")?,
            settings.post_logout_redirect_uri.clone(),
        );
    }
    Ok(config)
}

fn parse_url(raw: &str, path: &str) -> Result<Url, FormwireError> {
    Url::parse(raw).map_err(|err| FormwireError::invalid_setting(path, err))
}

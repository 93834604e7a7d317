//! HTTP client for a remote channeldb server.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use handle_trait::Handle;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use super::errors::RemoteError;
use super::protocol::{Method, RemoteRequest};
use crate::channel::{DelEvent, Entry, GetQuery, ListQuery, Listing, PutEvent};
use crate::{Result, path};

/// Request timeout used by [`RemoteClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of a fresh token for every request.
///
/// A registered provider takes precedence over the static token set with
/// [`RemoteClient::set_token`] and over any per-call token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

struct ClientInner {
    http: reqwest::Client,
    endpoint: Url,
    token: RwLock<Option<String>>,
    provider: RwLock<Option<Arc<dyn TokenProvider>>>,
}

/// Client for the remote binding.
///
/// Clones share the HTTP connection pool, the token and the token provider.
#[derive(Clone, Handle)]
pub struct RemoteClient {
    inner: Arc<ClientInner>,
}

impl RemoteClient {
    /// Creates a client posting to `endpoint`, e.g. `http://127.0.0.1:3000/api/v0`.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests fail with a transport error after
    /// `timeout`.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(endpoint).map_err(|e| RemoteError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidUrl {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            }
            .into());
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RemoteError::Transport {
                url: endpoint.to_string(),
                source,
            })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint: url,
                token: RwLock::new(None),
                provider: RwLock::new(None),
            }),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Sets the static token sent with every request.
    pub fn set_token(&self, token: impl Into<String>) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Registers a provider consulted before every request.
    pub fn set_token_provider(&self, provider: impl TokenProvider + 'static) {
        *self
            .inner
            .provider
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(provider));
    }

    pub fn clear_token_provider(&self) {
        *self
            .inner
            .provider
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// A handle bound to the root path.
    pub fn root(&self) -> RemoteChannel {
        self.channel("/")
    }

    /// A handle bound to `path`.
    pub fn channel(&self, path: &str) -> RemoteChannel {
        RemoteChannel {
            client: self.handle(),
            path: path::parse(path).path,
        }
    }

    pub async fn put(&self, path: &str, data: Value) -> Result<PutEvent> {
        self.call(Method::Put, path, data).await
    }

    pub async fn get(&self, path: &str) -> Result<Entry> {
        self.call(Method::Get, path, json!({})).await
    }

    pub async fn get_with(&self, path: &str, query: &GetQuery) -> Result<Entry> {
        self.call(Method::Get, path, serde_json::to_value(query)?).await
    }

    pub async fn del(&self, path: &str) -> Result<DelEvent> {
        self.call(Method::Del, path, json!({})).await
    }

    pub async fn list(&self, path: &str, query: &ListQuery) -> Result<Listing> {
        self.call(Method::List, path, serde_json::to_value(query)?).await
    }

    /// Sends one raw request and returns the parsed response body.
    ///
    /// `token` is used only when neither a token provider nor a static
    /// token is configured.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        data: Value,
        token: Option<&str>,
    ) -> Result<Value> {
        let (_, body) = self.send(method, path, data, token).await?;
        Ok(body)
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, path: &str, data: Value) -> Result<T> {
        let (status, body) = self.send(method, path, data, None).await?;
        serde_json::from_value(body).map_err(|source| RemoteError::Decode { status, source }.into())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        data: Value,
        token: Option<&str>,
    ) -> Result<(u16, Value)> {
        let request = RemoteRequest {
            token: self.resolve_token(token).await?,
            method,
            path: path.to_string(),
            data,
        };

        let url = self.inner.endpoint.as_str();
        let transport = |source| RemoteError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(transport)?;

        let parsed = if bytes.is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_slice::<Value>(&bytes)
        };

        if status >= 400 {
            let body = parsed
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            tracing::debug!(%method, path, status, "Remote request rejected");
            return Err(RemoteError::Rejected { status, body }.into());
        }

        let body = parsed.map_err(|source| RemoteError::Decode { status, source })?;
        tracing::trace!(%method, path, status, "Remote request succeeded");
        Ok((status, body))
    }

    async fn resolve_token(&self, per_call: Option<&str>) -> Result<String> {
        let provider = self
            .inner
            .provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(provider) = provider {
            return provider.token().await.map_err(|e| {
                RemoteError::TokenProvider {
                    reason: e.to_string(),
                }
                .into()
            });
        }

        let token = self
            .inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(token
            .or_else(|| per_call.map(str::to_string))
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

/// A remote view bound to one normalized path.
#[derive(Clone, Debug)]
pub struct RemoteChannel {
    client: RemoteClient,
    path: String,
}

impl RemoteChannel {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn child(&self, sub: &str) -> RemoteChannel {
        RemoteChannel {
            client: self.client.clone(),
            path: path::join(&self.path, sub),
        }
    }

    /// Sets the client-wide static token.
    pub fn set_token(&self, token: impl Into<String>) {
        self.client.set_token(token);
    }

    pub async fn put(&self, data: Value) -> Result<PutEvent> {
        self.client.put(&self.path, data).await
    }

    pub async fn get(&self) -> Result<Entry> {
        self.client.get(&self.path).await
    }

    pub async fn get_with(&self, query: &GetQuery) -> Result<Entry> {
        self.client.get_with(&self.path, query).await
    }

    pub async fn del(&self) -> Result<DelEvent> {
        self.client.del(&self.path).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Listing> {
        self.client.list(&self.path, query).await
    }
}

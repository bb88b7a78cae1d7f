use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use crate::{
    error::{ClientError, Result},
    token::TokenStore,
};

/// Authenticated JSON client for the forecasting backend.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let request = self.http.get(url.clone());
        self.send(Method::GET, url, request).await?.json_body().await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let request = self.http.post(url.clone()).json(body);
        self.send(Method::POST, url, request).await?.json_body().await
    }

    /// POST for endpoints whose response body carries nothing the client reads.
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let request = self.http.post(url.clone()).json(body);
        self.send(Method::POST, url, request).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let request = self.http.delete(url.clone());
        self.send(Method::DELETE, url, request).await?;
        Ok(())
    }

    async fn send(&self, method: Method, url: Url, request: RequestBuilder) -> Result<Response> {
        let request = match self.tokens.load()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        debug!(%method, %url, "api request");

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                method,
                url: url.to_string(),
                status,
                body,
            });
        }

        Ok(Response { url, inner: response })
    }
}

struct Response {
    url: Url,
    inner: reqwest::Response,
}

impl Response {
    async fn json_body<T: DeserializeOwned>(self) -> Result<T> {
        let url = self.url.to_string();
        self.inner
            .json()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }
}

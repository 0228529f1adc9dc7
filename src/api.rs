//! API client for the calculation backend
//!
//! Thin typed layer over reqwest: one method per endpoint, bearer auth on the
//! calculation routes, non-2xx answers turned into [`ClientError::Rejected`]
//! with the server's `detail` when it sent one. No retries.

use calc_types::{
    Calculation, CalculationCreate, CalculationUpdate, ErrorBody, HealthResponse, ListQuery,
    LoginRequest, RegisterRequest, TokenResponse,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    /// `POST /auth/register` - the created user in the body is not used
    pub async fn register(&self, req: &RegisterRequest) -> Result<()> {
        let builder = self.request(Method::POST, "/auth/register").json(req);
        self.send(builder).await.map(|_| ())
    }

    /// `POST /auth/login` with a form-encoded body
    pub async fn login(&self, req: &LoginRequest) -> Result<TokenResponse> {
        let builder = self.request(Method::POST, "/auth/login").form(req);
        decode(self.send(builder).await?).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let builder = self.request(Method::GET, "/health");
        decode(self.send(builder).await?).await
    }

    // ------------------------------------------------------------------------
    // Calculations (BREAD)
    // ------------------------------------------------------------------------

    /// Browse: `GET /calculations?skip&limit`
    pub async fn list_calculations(&self, token: &str, query: ListQuery) -> Result<Vec<Calculation>> {
        let builder = self
            .request(Method::GET, "/calculations")
            .bearer_auth(token)
            .query(&query);
        decode(self.send(builder).await?).await
    }

    /// Read: `GET /calculations/{id}`
    pub async fn get_calculation(&self, token: &str, id: i64) -> Result<Calculation> {
        let builder = self
            .request(Method::GET, &format!("/calculations/{}", id))
            .bearer_auth(token);
        decode(self.send(builder).await?).await
    }

    /// Add: `POST /calculations`
    pub async fn create_calculation(&self, token: &str, body: &CalculationCreate) -> Result<Calculation> {
        let builder = self
            .request(Method::POST, "/calculations")
            .bearer_auth(token)
            .json(body);
        decode(self.send(builder).await?).await
    }

    /// Edit: `PUT /calculations/{id}`
    pub async fn update_calculation(
        &self,
        token: &str,
        id: i64,
        body: &CalculationUpdate,
    ) -> Result<Calculation> {
        let builder = self
            .request(Method::PUT, &format!("/calculations/{}", id))
            .bearer_auth(token)
            .json(body);
        decode(self.send(builder).await?).await
    }

    /// Delete: `DELETE /calculations/{id}` - any 2xx (normally 204) is success
    pub async fn delete_calculation(&self, token: &str, id: i64) -> Result<()> {
        let builder = self
            .request(Method::DELETE, &format!("/calculations/{}", id))
            .bearer_auth(token);
        self.send(builder).await.map(|_| ())
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "calculation API request");
        self.http.request(method, self.config.endpoint(path))
    }

    /// Send and split on status. Non-2xx bodies are read for a `detail`.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Request failed before a response: {}", e);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = match response.bytes().await {
            Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message()),
            Err(_) => None,
        };
        tracing::warn!(%status, detail = ?detail, "calculation API rejected request");
        Err(ClientError::Rejected { status, detail })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}

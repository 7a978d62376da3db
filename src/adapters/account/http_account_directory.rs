//! HTTP adapter for the external account service.
//!
//! The account service owns authentication and account storage. This
//! adapter reads accounts and records payment links through its REST API:
//!
//! - `GET  {base}/accounts/{id}`
//! - `GET  {base}/accounts?email={email}`
//! - `POST {base}/accounts/{id}/payment-link`
//!
//! A 404 on lookup is "no such account", never an error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::foundation::{AccountId, DomainError, EmailAddress, ErrorCode, PaymentId};
use crate::ports::{Account, AccountDirectory};

/// Configuration for the account service client.
#[derive(Clone)]
pub struct AccountDirectoryConfig {
    pub base_url: String,
    /// Bearer token for service-to-service calls.
    pub api_token: Option<SecretString>,
    pub timeout: Duration,
}

impl AccountDirectoryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_api_token(mut self, token: SecretString) -> Self {
        self.api_token = Some(token);
        self
    }

    fn accounts_url(&self) -> String {
        format!("{}/accounts", self.base_url.trim_end_matches('/'))
    }

    fn account_url(&self, id: &AccountId) -> String {
        format!("{}/{}", self.accounts_url(), id.as_str())
    }

    fn payment_link_url(&self, id: &AccountId) -> String {
        format!("{}/payment-link", self.account_url(id))
    }
}

impl std::fmt::Debug for AccountDirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountDirectoryConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentLinkRequest {
    payment_id: PaymentId,
}

/// Account directory backed by the account service's REST API.
#[derive(Debug, Clone)]
pub struct HttpAccountDirectory {
    config: AccountDirectoryConfig,
    client: reqwest::Client,
}

impl HttpAccountDirectory {
    pub fn new(config: AccountDirectoryConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| upstream_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn fetch_optional(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<Account>, DomainError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| upstream_error(format!("Account service unreachable: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<Account>()
                .await
                .map(Some)
                .map_err(|e| upstream_error(format!("Invalid account payload: {}", e))),
            status => Err(upstream_error(format!(
                "Account service returned {}",
                status
            ))),
        }
    }
}

fn upstream_error(message: String) -> DomainError {
    DomainError::new(ErrorCode::InternalError, message)
}

#[async_trait]
impl AccountDirectory for HttpAccountDirectory {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        self.fetch_optional(self.client.get(self.config.account_url(id)))
            .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, DomainError> {
        let request = self
            .client
            .get(self.config.accounts_url())
            .query(&[("email", email.as_str())]);
        self.fetch_optional(request).await
    }

    async fn link_payment(
        &self,
        id: &AccountId,
        payment_id: PaymentId,
    ) -> Result<(), DomainError> {
        let request = self
            .client
            .post(self.config.payment_link_url(id))
            .json(&PaymentLinkRequest { payment_id });

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| upstream_error(format!("Account service unreachable: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account {} not found", id),
            )),
            status if status.is_success() => Ok(()),
            status => Err(upstream_error(format!(
                "Account service returned {} linking payment",
                status
            ))),
        }
    }
}

//! Reqwest-backed payment provider adapter.
//!
//! Owns transport details only: authentication, timeout and HTTP error
//! mapping, and JSON decoding into domain order types. The key secret used
//! for HTTP basic auth here is distinct from the callback signing secret,
//! which never leaves the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{
    OrderRequest, PaymentProvider, PaymentProviderError, ProviderOrder,
};

use super::dto::{CreateOrderDto, OrderDto};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// API credentials for the provider's orders endpoint.
#[derive(Clone)]
pub struct ProviderCredentials {
    /// Public key id, sent as the basic auth username.
    pub key_id: String,
    /// API key secret, sent as the basic auth password.
    pub key_secret: String,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"..")
            .finish()
    }
}

/// Razorpay orders API adapter over HTTP.
pub struct RazorpayHttpProvider {
    client: Client,
    base_url: Url,
    credentials: ProviderCredentials,
}

impl RazorpayHttpProvider {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, credentials: ProviderCredentials) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, credentials, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        base_url: Url,
        credentials: ProviderCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn orders_url(&self, order_id: Option<&str>) -> Result<Url, PaymentProviderError> {
        let path = match order_id {
            Some(id) => format!("orders/{id}"),
            None => "orders".to_owned(),
        };
        self.base_url.join(&path).map_err(|err| {
            PaymentProviderError::transport(format!("invalid provider URL: {err}"))
        })
    }

    async fn decode_order(
        response: reqwest::Response,
    ) -> Result<ProviderOrder, PaymentProviderError> {
        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        let dto: OrderDto = response.json().await.map_err(|err| {
            PaymentProviderError::decode(format!("invalid order payload: {err}"))
        })?;
        Ok(dto.into())
    }
}

fn map_transport_error(error: reqwest::Error) -> PaymentProviderError {
    PaymentProviderError::transport(error.to_string())
}

fn map_status_error(status: StatusCode) -> PaymentProviderError {
    PaymentProviderError::status(status.as_u16())
}

#[async_trait]
impl PaymentProvider for RazorpayHttpProvider {
    async fn create_order(
        &self,
        request: &OrderRequest,
    ) -> Result<ProviderOrder, PaymentProviderError> {
        let url = self.orders_url(None)?;
        let response = self
            .client
            .post(url)
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
            .json(&CreateOrderDto::from_request(request))
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::decode_order(response).await
    }

    async fn fetch_order(&self, order_id: &str) -> Result<ProviderOrder, PaymentProviderError> {
        let url = self.orders_url(Some(order_id))?;
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::decode_order(response).await
    }
}

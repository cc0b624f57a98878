//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use backend::domain::signature::PaymentSecret;
use backend::outbound::payments::ProviderCredentials;
use backend::outbound::persistence::DbPool;
use reqwest::Url;
use std::net::SocketAddr;

/// Settings for the payment provider adapter and signature verification.
pub struct PaymentsConfig {
    pub(crate) base_url: Url,
    pub(crate) credentials: ProviderCredentials,
    pub(crate) secret: PaymentSecret,
}

impl PaymentsConfig {
    /// Construct payment settings from the provider endpoint and secrets.
    #[must_use]
    pub fn new(base_url: Url, credentials: ProviderCredentials, secret: PaymentSecret) -> Self {
        Self {
            base_url,
            credentials,
            secret,
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) payments: Option<PaymentsConfig>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            payments: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses database-backed implementations for
    /// the enrollment and stats ports instead of fixtures.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach payment provider settings.
    ///
    /// Payment endpoints require both a database pool and these settings;
    /// without them the fixture payment port answers instead.
    #[must_use]
    pub fn with_payments(mut self, payments: PaymentsConfig) -> Self {
        self.payments = Some(payments);
        self
    }
}

//! Backend entry-point: wires REST endpoints, persistence, and OpenAPI docs.

mod server;

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use backend::domain::signature::PaymentSecret;
use backend::inbound::http::health::HealthState;
use backend::outbound::payments::ProviderCredentials;
use backend::outbound::persistence::{DbPool, PoolConfig};
use reqwest::Url;
use server::{PaymentsConfig, ServerConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PROVIDER_URL: &str = "https://api.razorpay.com/v1/";

fn session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Read payment provider settings from the environment.
///
/// Requires `PAYMENT_KEY_ID` and `PAYMENT_KEY_SECRET`; the key secret also
/// signs callback payloads. Returns `None` when either is unset, in which
/// case the fixture payment port answers.
fn payments_config() -> std::io::Result<Option<PaymentsConfig>> {
    let (Ok(key_id), Ok(key_secret)) = (
        env::var("PAYMENT_KEY_ID"),
        env::var("PAYMENT_KEY_SECRET"),
    ) else {
        warn!("payment provider credentials unset; payment endpoints use fixtures");
        return Ok(None);
    };

    let base_url = env::var("PAYMENT_PROVIDER_URL")
        .unwrap_or_else(|_| DEFAULT_PROVIDER_URL.into());
    let base_url = Url::parse(&base_url)
        .map_err(|e| std::io::Error::other(format!("invalid PAYMENT_PROVIDER_URL: {e}")))?;

    let secret = PaymentSecret::new(key_secret.clone().into_bytes());
    Ok(Some(PaymentsConfig::new(
        base_url,
        ProviderCredentials { key_id, key_secret },
        secret,
    )))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr);

    match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
            config = config.with_db_pool(pool);
        }
        Err(_) => warn!("DATABASE_URL unset; serving fixture data"),
    }

    if let Some(payments) = payments_config()? {
        config = config.with_payments(payments);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = server::create_server(health_state, config)?;
    server.await
}

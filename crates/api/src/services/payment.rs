//! Hosted-checkout payment provider client.
//!
//! Two concerns live here: creating checkout sessions against the
//! provider's REST API, and verifying the HMAC signature the provider
//! puts on webhook deliveries. The base URL comes from configuration so
//! tests can point the client at a stub server.

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use clementine_core::{CartId, UserId};

use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

/// Signed webhook timestamps older than this are rejected.
const SIGNATURE_TOLERANCE_SECS: u64 = 300;

/// Errors that can occur when interacting with the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("provider error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A price could not be expressed in whole cents.
    #[error("amount not representable in cents: {0}")]
    BadAmount(Decimal),

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A created hosted-checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// One line item sent to the provider, amount in cents.
#[derive(Debug, Serialize)]
pub struct SessionLineItem {
    pub name: String,
    pub amount_cents: i64,
    pub quantity: i32,
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    line_items: &'a [SessionLineItem],
    success_url: &'a str,
    cancel_url: &'a str,
    metadata: SessionMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub user_id: UserId,
    pub cart_id: CartId,
}

/// Payment provider API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    api_base_url: String,
}

impl PaymentClient {
    /// Create a new payment provider client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_value = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Parse(format!("invalid secret key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
        })
    }

    /// Create a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Api` on a non-success provider response.
    pub async fn create_checkout_session(
        &self,
        line_items: &[SessionLineItem],
        metadata: SessionMetadata,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base_url);

        let response = self
            .client
            .post(&url)
            .json(&CreateSessionRequest {
                line_items,
                success_url,
                cancel_url,
                metadata,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session = response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))?;
        Ok(session)
    }
}

/// Convert a decimal price to whole cents, rounding to the nearest cent.
///
/// # Errors
///
/// Returns `PaymentError::BadAmount` for amounts outside the i64 range.
pub fn to_cents(price: Decimal) -> Result<i64, PaymentError> {
    (price * Decimal::from(100))
        .round()
        .to_i64()
        .ok_or(PaymentError::BadAmount(price))
}

/// Verify a webhook signature header of the form `t=<unix>,v1=<hex>`.
///
/// The signed payload is `"{t}.{body}"` keyed with the shared webhook
/// secret. Timestamps older than five minutes are rejected even when
/// the signature itself is valid.
#[must_use]
pub fn verify_signature(secret: &SecretString, header: &str, body: &[u8]) -> bool {
    let Some((timestamp, provided)) = parse_signature_header(header) else {
        return false;
    };

    let Ok(now) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return false;
    };
    if now.as_secs().abs_diff(timestamp) > SIGNATURE_TOLERANCE_SECS {
        return false;
    }

    let Ok(provided) = hex::decode(provided) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    mac.verify_slice(&provided).is_ok()
}

fn parse_signature_header(header: &str) -> Option<(u64, &str)> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        match key {
            "t" => timestamp = value.parse::<u64>().ok(),
            "v1" => signature = Some(value),
            _ => {}
        }
    }
    Some((timestamp?, signature?))
}

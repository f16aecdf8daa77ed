//! Payment route handlers.
//!
//! The webhook endpoint is the one route authenticated by something
//! other than a bearer token: the provider signs the raw body and we
//! verify that signature before parsing anything.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::services::checkout::CheckoutService;
use crate::services::payment::{SessionMetadata, verify_signature};
use crate::state::AppState;

/// Header carrying the provider's `t=..,v1=..` signature.
const SIGNATURE_HEADER: &str = "webhook-signature";

/// The event type that completes a checkout.
const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// A created checkout session, as returned to the client.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub url: String,
}

/// Webhook acknowledgement body.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: SessionObject,
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: Option<SessionMetadata>,
}

/// `POST /payment/create-session`
pub async fn create_session(
    RequireAuth(identity): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<SessionResponse>> {
    let session = CheckoutService::new(state.pool())
        .begin_checkout(identity.user_id, state.payment(), &state.config().base_url)
        .await?;

    Ok(ApiResponse::success(SessionResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// `POST /payment/webhook`
///
/// Events other than checkout completion are acknowledged and ignored.
/// A replayed completion or an already-cleared cart acknowledges
/// without creating anything.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing signature".to_owned()))?;

    if !verify_signature(&state.config().payment.webhook_secret, signature, &body) {
        return Err(AppError::BadRequest("invalid signature".to_owned()));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed event: {e}")))?;

    if event.event_type != CHECKOUT_COMPLETED {
        return Ok(ApiResponse::success(WebhookAck { received: true }));
    }

    let session = event.data.object;
    let Some(metadata) = session.metadata else {
        tracing::warn!(session_id = %session.id, "Completed session without metadata");
        return Ok(ApiResponse::success(WebhookAck { received: true }));
    };

    let payment_ref = session.payment_intent.unwrap_or(session.id);

    let order = CheckoutService::new(state.pool())
        .on_payment_confirmed(metadata.cart_id, &payment_ref)
        .await?;

    match order {
        Some(order) => {
            tracing::info!(order_id = %order.id, "Order created from payment confirmation");
        }
        None => {
            tracing::debug!(cart_id = %metadata.cart_id, "Payment confirmation was a no-op");
        }
    }

    Ok(ApiResponse::success(WebhookAck { received: true }))
}

//! HTTP handlers for checkout, webhook and payment status.

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::application::handlers::{
    GetPaymentStatusQuery, HandlePaymentWebhookCommand, HandlePaymentWebhookResult,
    PaymentStatusView,
};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{CreateCheckoutRequest, CreateCheckoutResponse, PaymentStatusParams, WebhookAck};

/// Primary signature header, then the provider's own header name.
const SIGNATURE_HEADERS: [&str; 2] = ["signature", "Stripe-Signature"];

/// POST /create-checkout-session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    body: Result<Json<CreateCheckoutRequest>, JsonRejection>,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let Json(req) = body?;
    let result = state.checkout_handler().handle(req.into()).await?;
    Ok(Json(result.into()))
}

/// POST /payment-webhook
///
/// Takes the raw body; the signature covers the exact bytes received.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .map(str::to_string);

    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };
    let result = state.webhook_handler().handle(cmd).await?;

    if let HandlePaymentWebhookResult::PaymentRecorded { payment_id, .. } = &result {
        tracing::debug!(payment_id = %payment_id, "Webhook acknowledged after ledger write");
    }
    Ok(Json(WebhookAck { received: true }))
}

/// GET /payment-status?email=
pub async fn payment_status(
    State(state): State<AppState>,
    params: Result<Query<PaymentStatusParams>, QueryRejection>,
) -> Result<Json<PaymentStatusView>, ApiError> {
    let Query(params) = params?;
    let view = state
        .payment_status_handler()
        .handle(GetPaymentStatusQuery {
            email: params.email.unwrap_or_default(),
        })
        .await?;
    Ok(Json(view))
}

//! Request/response bodies for payment endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{CreateCheckoutSessionCommand, CreateCheckoutSessionResult};
use crate::domain::foundation::CorrelationId;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[serde(default)]
    pub email: Option<String>,
    /// Dollars.
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<CorrelationId>,
}

impl From<CreateCheckoutRequest> for CreateCheckoutSessionCommand {
    fn from(req: CreateCheckoutRequest) -> Self {
        Self {
            email: req.email.unwrap_or_default(),
            amount: req.amount,
            success_url: req.success_url,
            cancel_url: req.cancel_url,
            correlation_id: req.correlation_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponse {
    pub session_id: String,
    pub url: String,
    pub correlation_id: CorrelationId,
}

impl From<CreateCheckoutSessionResult> for CreateCheckoutResponse {
    fn from(result: CreateCheckoutSessionResult) -> Self {
        Self {
            session_id: result.session_id,
            url: result.url,
            correlation_id: result.correlation_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentStatusParams {
    #[serde(default)]
    pub email: Option<String>,
}

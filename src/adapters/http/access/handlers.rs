//! HTTP handlers for cross-device verification and the form-access guard.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;

use crate::application::handlers::{
    EvaluateFormAccessQuery, FormAccessView, VerifyEmailCommand, VerifyEmailResult,
};
use crate::domain::foundation::AccountId;

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{FormAccessParams, VerifyEmailRequest};

/// POST /verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    body: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> Result<Json<VerifyEmailResult>, ApiError> {
    let Json(req) = body?;
    let result = state
        .verify_email_handler()
        .handle(VerifyEmailCommand {
            email: req.email.unwrap_or_default(),
            namespace: req.device_id,
        })
        .await?;
    Ok(Json(result))
}

/// GET /form-access?deviceId=&accountId=
pub async fn form_access(
    State(state): State<AppState>,
    params: Result<Query<FormAccessParams>, QueryRejection>,
) -> Result<Json<FormAccessView>, ApiError> {
    let Query(params) = params?;
    let account_id = params
        .account_id
        .filter(|id| !id.trim().is_empty())
        .map(AccountId::new)
        .transpose()?;

    let view = state
        .form_access_handler()
        .handle(EvaluateFormAccessQuery {
            namespace: params.device_id,
            account_id,
        })
        .await?;
    Ok(Json(view))
}

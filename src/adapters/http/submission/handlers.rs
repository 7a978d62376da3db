//! HTTP handlers for form submission and redirect resolution.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use crate::application::handlers::{
    EvaluateFormAccessQuery, GetPendingSubmissionQuery, PendingSubmissionView,
};
use crate::domain::foundation::{AccountId, CorrelationId, EmailAddress, ValidationError};
use crate::domain::payment::GateError;
use crate::domain::submission::{FormPayload, FormType};
use crate::ports::{SubmitFormOutcome, SubmitFormRequest};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::SubmitFormBody;

/// POST /submit-form
pub async fn submit_form(
    State(state): State<AppState>,
    body: Result<Json<SubmitFormBody>, JsonRejection>,
) -> Result<Json<SubmitFormOutcome>, ApiError> {
    let Json(body) = body?;
    let form_type: FormType = body.form_type.parse()?;
    let account_id = body
        .account_id
        .filter(|id| !id.trim().is_empty())
        .map(AccountId::new)
        .transpose()?;

    if let Some(namespace) = body.device_id {
        let view = state
            .form_access_handler()
            .handle(EvaluateFormAccessQuery {
                namespace,
                account_id: account_id.clone(),
            })
            .await?;
        if let Err(reason) = view.decision.into_result() {
            return Err(GateError::account_required(reason.user_message()).into());
        }
    }

    let request = SubmitFormRequest {
        email: EmailAddress::parse(&body.email)?,
        payload: FormPayload::from_parts(form_type, body.payload)?,
        account_id,
    };

    let outcome = state.submit_form_handler().handle(request).await?;
    Ok(Json(outcome))
}

/// GET /pending-submissions/:correlation_id
pub async fn pending_submission(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<PendingSubmissionView>, ApiError> {
    let Path(raw) = path?;
    let correlation_id: CorrelationId = raw
        .parse()
        .map_err(|_| ValidationError::invalid_format("correlationId", "expected a UUID"))?;

    let view = state
        .pending_submission_handler()
        .handle(GetPendingSubmissionQuery { correlation_id })
        .await?;
    Ok(Json(view))
}

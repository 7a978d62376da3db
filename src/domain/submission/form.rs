//! Typed intake form payloads.
//!
//! Each form type carries its own schema; the payload is a tagged union
//! keyed by `formType` rather than an open record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{SubmissionId, ValidationError};

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 5_000;

/// Discriminant of the intake form catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    GeneralIntake,
    ConsultationRequest,
    FollowUp,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::GeneralIntake => "general_intake",
            FormType::ConsultationRequest => "consultation_request",
            FormType::FollowUp => "follow_up",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FormType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general_intake" => Ok(FormType::GeneralIntake),
            "consultation_request" => Ok(FormType::ConsultationRequest),
            "follow_up" => Ok(FormType::FollowUp),
            other => Err(ValidationError::invalid_format(
                "formType",
                format!("unknown form type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralIntake {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub concern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    pub full_name: String,
    pub topic: String,
    #[serde(default)]
    pub preferred_times: Vec<String>,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub full_name: String,
    #[serde(default)]
    pub previous_submission_id: Option<SubmissionId>,
    pub notes: String,
}

/// A validated form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "formType", content = "payload", rename_all = "snake_case")]
pub enum FormPayload {
    GeneralIntake(GeneralIntake),
    ConsultationRequest(ConsultationRequest),
    FollowUp(FollowUp),
}

impl FormPayload {
    /// Decodes and validates a raw payload against the schema for `form_type`.
    pub fn from_parts(
        form_type: FormType,
        payload: serde_json::Value,
    ) -> Result<Self, ValidationError> {
        let parsed = match form_type {
            FormType::GeneralIntake => serde_json::from_value(payload).map(FormPayload::GeneralIntake),
            FormType::ConsultationRequest => {
                serde_json::from_value(payload).map(FormPayload::ConsultationRequest)
            }
            FormType::FollowUp => serde_json::from_value(payload).map(FormPayload::FollowUp),
        }
        .map_err(|e| ValidationError::invalid_format("payload", e.to_string()))?;

        parsed.validate()?;
        Ok(parsed)
    }

    pub fn form_type(&self) -> FormType {
        match self {
            FormPayload::GeneralIntake(_) => FormType::GeneralIntake,
            FormPayload::ConsultationRequest(_) => FormType::ConsultationRequest,
            FormPayload::FollowUp(_) => FormType::FollowUp,
        }
    }

    /// Checks the per-form rules serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            FormPayload::GeneralIntake(form) => {
                require_text("fullName", &form.full_name, MAX_NAME_LEN)?;
                require_text("concern", &form.concern, MAX_TEXT_LEN)?;
                if let Some(phone) = &form.phone {
                    let digits = phone.chars().filter(char::is_ascii_digit).count();
                    if digits < 7 {
                        return Err(ValidationError::invalid_format(
                            "phone",
                            "expected at least 7 digits",
                        ));
                    }
                }
            }
            FormPayload::ConsultationRequest(form) => {
                require_text("fullName", &form.full_name, MAX_NAME_LEN)?;
                require_text("topic", &form.topic, MAX_NAME_LEN)?;
                require_text("details", &form.details, MAX_TEXT_LEN)?;
                if form.preferred_times.len() > 5 {
                    return Err(ValidationError::out_of_range(
                        "preferredTimes",
                        0,
                        5,
                        form.preferred_times.len() as i64,
                    ));
                }
            }
            FormPayload::FollowUp(form) => {
                require_text("fullName", &form.full_name, MAX_NAME_LEN)?;
                require_text("notes", &form.notes, MAX_TEXT_LEN)?;
            }
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str, max_len: usize) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::empty_field(field));
    }
    if len > max_len {
        return Err(ValidationError::out_of_range(field, 1, max_len as i64, len as i64));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn general_intake_parses_and_validates() {
        let payload = FormPayload::from_parts(
            FormType::GeneralIntake,
            json!({"fullName": "Ada", "concern": "Back pain", "phone": "555-123-4567"}),
        )
        .unwrap();
        assert_eq!(payload.form_type(), FormType::GeneralIntake);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = FormPayload::from_parts(FormType::GeneralIntake, json!({"fullName": "Ada"}))
            .unwrap_err();
        assert_eq!(err.field(), "payload");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = FormPayload::from_parts(
            FormType::FollowUp,
            json!({"fullName": "  ", "notes": "feeling better"}),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::empty_field("fullName"));
    }

    #[test]
    fn short_phone_is_rejected() {
        let err = FormPayload::from_parts(
            FormType::GeneralIntake,
            json!({"fullName": "Ada", "concern": "x", "phone": "12"}),
        )
        .unwrap_err();
        assert_eq!(err.field(), "phone");
    }

    #[test]
    fn too_many_preferred_times_is_rejected() {
        let err = FormPayload::from_parts(
            FormType::ConsultationRequest,
            json!({
                "fullName": "Ada",
                "topic": "Nutrition",
                "details": "Plan review",
                "preferredTimes": ["a", "b", "c", "d", "e", "f"]
            }),
        )
        .unwrap_err();
        assert_eq!(err.field(), "preferredTimes");
    }

    #[test]
    fn payload_serializes_with_form_type_tag() {
        let payload = FormPayload::FollowUp(FollowUp {
            full_name: "Ada".to_string(),
            previous_submission_id: None,
            notes: "ok".to_string(),
        });
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["formType"], "follow_up");
        assert_eq!(value["payload"]["fullName"], "Ada");

        let back: FormPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn form_type_parses_from_str() {
        assert_eq!("follow_up".parse::<FormType>().unwrap(), FormType::FollowUp);
        assert!("newsletter".parse::<FormType>().is_err());
    }
}

//! Request bodies for submission endpoints.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormBody {
    pub form_type: String,
    pub email: String,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub account_id: Option<String>,
    /// Client store namespace; when present the form-access guard runs first.
    #[serde(default)]
    pub device_id: Option<String>,
}

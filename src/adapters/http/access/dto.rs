//! Request bodies for access endpoints.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
    /// Client store namespace that should remember a positive result.
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAccessParams {
    pub device_id: String,
    #[serde(default)]
    pub account_id: Option<String>,
}

//! Server-level DTOs

use serde::{Deserialize, Serialize};

/// CSRF crumb from `/crumbIssuer/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crumb {
    pub crumb: String,
    pub crumb_request_field: String,
}

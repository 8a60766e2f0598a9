//! Build DTOs

use serde::{Deserialize, Serialize};

use crate::domain::build::BuildStatus;

/// Build document from `/job/<name>/<number>/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub number: u64,
    pub url: String,
    #[serde(default)]
    pub building: bool,
    #[serde(default)]
    pub result: Option<String>,
}

impl From<BuildInfo> for BuildStatus {
    fn from(info: BuildInfo) -> Self {
        BuildStatus {
            running: info.building,
            classification: info.result,
        }
    }
}

//! Job DTOs

use serde::{Deserialize, Serialize};

/// Job document from `/job/<name>/api/json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    #[serde(default)]
    pub in_queue: bool,
    #[serde(default)]
    pub property: Vec<JobProperty>,
}

impl JobInfo {
    /// Whether any job property declares build parameters
    pub fn is_parameterized(&self) -> bool {
        self.property
            .iter()
            .any(|p| !p.parameter_definitions.is_empty())
    }
}

/// One entry of a job's `property` list
///
/// Only `ParametersDefinitionProperty` carries `parameterDefinitions`; other
/// property kinds deserialize with an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProperty {
    #[serde(default)]
    pub parameter_definitions: Vec<ParameterDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
}

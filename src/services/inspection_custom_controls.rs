use serde::{Deserialize, Serialize};

use crate::client::{ApiError, ZpaClient};
use crate::error::ProviderError;

const CUSTOM_CONTROLS_ENDPOINT: &str = "/inspectionControls/custom";

/// AppProtection custom inspection control
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectionCustomControl {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action_value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub associated_inspection_profile_names: Vec<AssociatedProfileName>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ControlRule>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub control_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub control_rule_json: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_action_value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub paranoia_level: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub severity: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub control_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// Inspection profile a control is attached to (server computed)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssociatedProfileName {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Match rule of a custom control
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlRule {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<RuleCondition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub rule_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleCondition {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lhs: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub op: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rhs: String,
}

pub struct InspectionCustomControlService<'a> {
    client: &'a ZpaClient,
}

impl<'a> InspectionCustomControlService<'a> {
    pub fn new(client: &'a ZpaClient) -> Self {
        Self { client }
    }

    fn collection(&self) -> String {
        self.client.mgmt_path(CUSTOM_CONTROLS_ENDPOINT)
    }

    fn item(&self, id: &str) -> String {
        format!("{}/{}", self.collection(), id)
    }

    pub fn get(&self, id: &str) -> Result<InspectionCustomControl, ApiError> {
        self.client.get(&self.item(id))
    }

    /// Case-insensitive exact-name lookup over the search listing
    pub fn get_by_name(&self, name: &str) -> Result<InspectionCustomControl, ProviderError> {
        let found = self.client.find_first(
            &self.collection(),
            Some(name),
            |control: &InspectionCustomControl| control.name.eq_ignore_ascii_case(name),
        )?;

        found.ok_or_else(|| ProviderError::NotFoundByName {
            kind: "inspection custom control",
            name: name.to_string(),
        })
    }

    /// Create a control; any id on the input is ignored
    pub fn create(
        &self,
        control: &InspectionCustomControl,
    ) -> Result<InspectionCustomControl, ApiError> {
        let request = InspectionCustomControl {
            id: String::new(),
            ..control.clone()
        };

        self.client.post(&self.collection(), &request)
    }

    pub fn update(&self, id: &str, control: &InspectionCustomControl) -> Result<(), ApiError> {
        self.client.put(&self.item(id), control)
    }

    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&self.item(id))
    }
}

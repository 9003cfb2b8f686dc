use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{ApiError, ZpaClient};
use crate::error::ProviderError;

const INSPECTION_PROFILE_ENDPOINT: &str = "/inspectionProfile";

/// AppProtection inspection profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InspectionProfile {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub common_global_override_actions_config: Map<String, Value>,
    #[serde(rename = "controlsInfo", skip_serializing_if = "Vec::is_empty")]
    pub control_info_resource: Vec<ControlInfoResource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_controls: Vec<ProfileCustomControl>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub global_control_actions: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub incarnation_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub paranoia_level: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub predefined_controls: Vec<PredefinedControl>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub predefined_controls_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_time: String,
}

/// Count of controls of one type in a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlInfoResource {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub control_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub count: String,
}

/// Custom control reference inside a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileCustomControl {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action_value: String,
}

/// Predefined (Zscaler-curated) control reference inside a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PredefinedControl {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action_value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub control_group: String,
}

pub struct InspectionProfileService<'a> {
    client: &'a ZpaClient,
}

impl<'a> InspectionProfileService<'a> {
    pub fn new(client: &'a ZpaClient) -> Self {
        Self { client }
    }

    fn collection(&self) -> String {
        self.client.mgmt_path(INSPECTION_PROFILE_ENDPOINT)
    }

    fn item(&self, id: &str) -> String {
        format!("{}/{}", self.collection(), id)
    }

    pub fn get(&self, id: &str) -> Result<InspectionProfile, ApiError> {
        self.client.get(&self.item(id))
    }

    pub fn get_by_name(&self, name: &str) -> Result<InspectionProfile, ProviderError> {
        let found = self.client.find_first(
            &self.collection(),
            Some(name),
            |profile: &InspectionProfile| profile.name.eq_ignore_ascii_case(name),
        )?;

        found.ok_or_else(|| ProviderError::NotFoundByName {
            kind: "inspection profile",
            name: name.to_string(),
        })
    }

    pub fn create(&self, profile: &InspectionProfile) -> Result<InspectionProfile, ApiError> {
        let request = InspectionProfile {
            id: String::new(),
            ..profile.clone()
        };

        self.client.post(&self.collection(), &request)
    }

    pub fn update(&self, id: &str, profile: &InspectionProfile) -> Result<(), ApiError> {
        self.client.put(&self.item(id), profile)
    }

    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&self.item(id))
    }
}

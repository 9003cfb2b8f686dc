use serde_json::{Value, json};
use tracing::info;

use crate::client::ZpaClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, ResourceData, Schema};
use crate::services::{ControlInfoResource, InspectionProfile, PredefinedControl, ProfileCustomControl};

use super::common::{blocks, field};
use super::{DataSource, Lookup, ReadOutcome, Resource, is_numeric_id, lookup, mark_gone};

const CONTROL_ACTIONS: &[&str] = &["PASS", "BLOCK", "REDIRECT"];

fn controls_info_attribute() -> Attribute {
    Attribute::list_of(
        Schema::new()
            .attr(
                "control_type",
                Attribute::string()
                    .optional()
                    .computed()
                    .one_of(&["CUSTOM", "PREDEFINED", "ZSCALER"]),
            )
            .attr("count", Attribute::string().optional().computed()),
    )
    .optional()
    .computed()
}

fn control_attribute(with_group: bool) -> Attribute {
    let mut block = Schema::new()
        .attr("id", Attribute::string().required())
        .attr("name", Attribute::string().computed())
        .attr("action", Attribute::string().optional().computed().one_of(CONTROL_ACTIONS))
        .attr("action_value", Attribute::string().optional().computed());

    if with_group {
        block = block.attr("control_group", Attribute::string().computed());
    }

    Attribute::list_of(block).optional().computed()
}

pub fn expand_inspection_profile(data: &ResourceData) -> InspectionProfile {
    InspectionProfile {
        id: data.id().to_string(),
        name: data.get_str("name"),
        description: data.get_str("description"),
        common_global_override_actions_config: data.get_map("common_global_override_actions_config"),
        global_control_actions: data.get_string_list("global_control_actions"),
        incarnation_number: data.get_str("incarnation_number"),
        paranoia_level: data.get_str("paranoia_level"),
        predefined_controls_version: data.get_str("predefined_controls_version"),
        control_info_resource: blocks(data.get("controls_info"))
            .iter()
            .map(|info| ControlInfoResource {
                control_type: field(info, "control_type"),
                count: field(info, "count"),
            })
            .collect(),
        custom_controls: blocks(data.get("custom_controls"))
            .iter()
            .map(|control| ProfileCustomControl {
                id: field(control, "id"),
                action: field(control, "action"),
                action_value: field(control, "action_value"),
                ..ProfileCustomControl::default()
            })
            .collect(),
        predefined_controls: blocks(data.get("predefined_controls"))
            .iter()
            .map(|control| PredefinedControl {
                id: field(control, "id"),
                action: field(control, "action"),
                action_value: field(control, "action_value"),
                ..PredefinedControl::default()
            })
            .collect(),
        ..InspectionProfile::default()
    }
}

pub fn flatten_inspection_profile(data: &mut ResourceData, profile: &InspectionProfile) {
    data.set_id(profile.id.clone());
    data.set("name", profile.name.clone());
    data.set("description", profile.description.clone());
    data.set(
        "common_global_override_actions_config",
        Value::Object(profile.common_global_override_actions_config.clone()),
    );
    data.set("global_control_actions", profile.global_control_actions.clone());
    data.set("incarnation_number", profile.incarnation_number.clone());
    data.set("paranoia_level", profile.paranoia_level.clone());
    data.set("predefined_controls_version", profile.predefined_controls_version.clone());
    data.set("creation_time", profile.creation_time.clone());
    data.set("modified_by", profile.modified_by.clone());
    data.set("modified_time", profile.modified_time.clone());

    let controls_info: Vec<Value> = profile
        .control_info_resource
        .iter()
        .map(|info| json!({"control_type": info.control_type, "count": info.count}))
        .collect();
    data.set("controls_info", controls_info);

    let custom: Vec<Value> = profile
        .custom_controls
        .iter()
        .map(|c| json!({"id": c.id, "name": c.name, "action": c.action, "action_value": c.action_value}))
        .collect();
    data.set("custom_controls", custom);

    let predefined: Vec<Value> = profile
        .predefined_controls
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "action": c.action,
                "action_value": c.action_value,
                "control_group": c.control_group,
            })
        })
        .collect();
    data.set("predefined_controls", predefined);
}

/// `zpa_inspection_profile`
pub struct InspectionProfileResource;

impl Resource for InspectionProfileResource {
    fn type_name(&self) -> &'static str {
        "zpa_inspection_profile"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("id", Attribute::string().computed())
            .attr("name", Attribute::string().required())
            .attr("description", Attribute::string().optional().computed())
            .attr("common_global_override_actions_config", Attribute::string_map().optional().computed())
            .attr("controls_info", controls_info_attribute())
            .attr("custom_controls", control_attribute(false))
            .attr("predefined_controls", control_attribute(true))
            .attr("global_control_actions", Attribute::string_list().optional().computed())
            .attr("incarnation_number", Attribute::string().optional().computed())
            .attr("paranoia_level", Attribute::string().optional().computed())
            .attr("predefined_controls_version", Attribute::string().optional().computed())
            .attr("creation_time", Attribute::string().computed())
            .attr("modified_by", Attribute::string().computed())
            .attr("modified_time", Attribute::string().computed())
    }

    fn create(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let request = expand_inspection_profile(data);
        info!("Creating inspection profile {}", request.name);

        let created = client.inspection_profile().create(&request)?;
        info!("Created inspection profile {}", created.id);

        data.set_id(created.id);
        self.read(client, data)
    }

    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        match lookup(client.inspection_profile().get(data.id()))? {
            Lookup::Found(profile) => {
                flatten_inspection_profile(data, &profile);
                Ok(ReadOutcome::Found)
            }
            Lookup::Gone => Ok(mark_gone(data, "inspection profile")),
        }
    }

    fn update(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let id = data.id().to_string();
        info!("Updating inspection profile {}", id);

        let request = expand_inspection_profile(data);
        if let Lookup::Gone = lookup(client.inspection_profile().update(&id, &request))? {
            return Ok(mark_gone(data, "inspection profile"));
        }

        self.read(client, data)
    }

    fn delete(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError> {
        info!("Deleting inspection profile {}", data.id());

        if let Lookup::Gone = lookup(client.inspection_profile().delete(data.id()))? {
            mark_gone(data, "inspection profile");
            return Ok(());
        }

        data.clear_id();
        Ok(())
    }

    /// Accepts the numeric id or the profile name
    fn import(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        if !is_numeric_id(data.id()) {
            let profile = client.inspection_profile().get_by_name(data.id())?;
            data.set_id(profile.id);
        }

        self.read(client, data)
    }
}

/// `zpa_inspection_profile` data source
pub struct InspectionProfileDataSource;

impl DataSource for InspectionProfileDataSource {
    fn type_name(&self) -> &'static str {
        "zpa_inspection_profile"
    }

    fn schema(&self) -> Schema {
        let mut schema = InspectionProfileResource.schema();
        for attribute in schema.attributes.values_mut() {
            *attribute = Attribute {
                required: false,
                optional: false,
                computed: true,
                ..attribute.clone()
            };
        }

        schema
            .attr("id", Attribute::string().optional().computed())
            .attr("name", Attribute::string().optional().computed())
    }

    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError> {
        let id = data.get_str("id");
        let name = data.get_str("name");
        let service = client.inspection_profile();

        let mut found = None;
        if !id.is_empty() {
            info!("Getting data for inspection profile {}", id);
            found = Some(service.get(&id)?);
        }
        if !name.is_empty() {
            info!("Getting data for inspection profile name {}", name);
            found = Some(service.get_by_name(&name)?);
        }

        match found {
            Some(profile) => {
                flatten_inspection_profile(data, &profile);
                data.set("id", profile.id);
                Ok(())
            }
            None => Err(ProviderError::Validation(format!(
                "couldn't find any inspection profile with name '{}' or id '{}'",
                name, id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::{config, setup};
    use serde_json::Map;

    fn profile_config() -> Value {
        json!({
            "name": "OWASP Profile",
            "description": "Top 10",
            "paranoia_level": "2",
            "global_control_actions": ["PREDEFINED:PASS", "CUSTOM:NONE"],
            "common_global_override_actions_config": {"IS_OVERRIDE_ACTION_COMMON": "TRUE"},
            "predefined_controls_version": "OWASP_CRS/3.3.0",
            "predefined_controls": [
                {"id": "72057594037928523", "action": "BLOCK"},
                {"id": "72057594037928524", "action": "PASS"}
            ],
            "custom_controls": [{"id": "216196257331282583", "action": "BLOCK"}]
        })
    }

    #[test]
    fn test_schema_accepts_example_config() {
        let diags = InspectionProfileResource.schema().validate(&config(profile_config()));
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn test_expand_flatten_round_trip() {
        let data = ResourceData::new(config(profile_config()));
        let profile = expand_inspection_profile(&data);

        assert_eq!(profile.predefined_controls.len(), 2);
        assert_eq!(profile.custom_controls[0].action, "BLOCK");
        assert_eq!(profile.common_global_override_actions_config["IS_OVERRIDE_ACTION_COMMON"], "TRUE");

        let mut state = ResourceData::new(Map::new());
        flatten_inspection_profile(&mut state, &profile);
        let reread = ResourceData::from_state("", state.into_state());

        assert_eq!(expand_inspection_profile(&reread), profile);
    }

    #[test]
    fn test_create_and_read() {
        let (mock, client) = setup();
        let mut data = ResourceData::new(config(profile_config()));

        InspectionProfileResource.create(&client, &mut data).unwrap();

        let body = mock.mutations()[0].body.clone().unwrap();
        assert_eq!(body["predefinedControls"][0]["id"], "72057594037928523");
        assert_eq!(body["paranoiaLevel"], "2");
        assert_eq!(data.state()["modified_by"], "72058304855015574");
    }

    #[test]
    fn test_update_of_deleted_profile_is_gone() {
        let (_, client) = setup();
        let mut data = ResourceData::with_prior("42", Map::new(), config(profile_config()));

        let outcome = InspectionProfileResource.update(&client, &mut data).unwrap();

        assert_eq!(outcome, ReadOutcome::Gone);
        assert!(data.id().is_empty());
    }

    #[test]
    fn test_import_by_name_and_by_id() {
        let (_, client) = setup();
        let mut created = ResourceData::new(config(profile_config()));
        InspectionProfileResource.create(&client, &mut created).unwrap();

        let mut by_name = ResourceData::from_state("owasp profile", Map::new());
        InspectionProfileResource.import(&client, &mut by_name).unwrap();
        assert_eq!(by_name.id(), created.id());
        assert_eq!(by_name.state()["name"], "OWASP Profile");

        let mut by_id = ResourceData::from_state(created.id(), Map::new());
        let outcome = InspectionProfileResource.import(&client, &mut by_id).unwrap();
        assert_eq!(outcome, ReadOutcome::Found);
    }

    #[test]
    fn test_import_unknown_name_fails() {
        let (_, client) = setup();
        let mut data = ResourceData::from_state("nonexistent", Map::new());

        let err = InspectionProfileResource.import(&client, &mut data).unwrap_err();
        assert_eq!(err.to_string(), "no inspection profile named 'nonexistent' was found");
    }

    #[test]
    fn test_data_source_by_id() {
        let (_, client) = setup();
        let mut created = ResourceData::new(config(profile_config()));
        InspectionProfileResource.create(&client, &mut created).unwrap();

        let mut data = ResourceData::new(config(json!({"id": created.id()})));
        InspectionProfileDataSource.read(&client, &mut data).unwrap();

        assert_eq!(data.state()["name"], "OWASP Profile");
        assert_eq!(data.state()["predefined_controls"].as_array().unwrap().len(), 2);
    }
}

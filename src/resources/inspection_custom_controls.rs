use serde_json::{Value, json};
use tracing::info;

use crate::client::ZpaClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, ResourceData, Schema};
use crate::services::{ControlRule, InspectionCustomControl, RuleCondition};

use super::common::{blocks, field, string_set};
use super::{DataSource, Lookup, ReadOutcome, Resource, lookup, mark_gone};

const ACTIONS: &[&str] = &["PASS", "BLOCK", "REDIRECT"];
const SEVERITIES: &[&str] = &["CRITICAL", "ERROR", "WARNING", "INFO"];
const RULE_TYPES: &[&str] = &[
    "REQUEST_HEADERS",
    "REQUEST_URI",
    "QUERY_STRING",
    "REQUEST_COOKIES",
    "REQUEST_METHOD",
    "REQUEST_BODY",
    "RESPONSE_HEADERS",
    "RESPONSE_BODY",
];

fn rules_attribute() -> Attribute {
    let condition = Schema::new()
        .attr("lhs", Attribute::string().optional().one_of(&["SIZE", "VALUE"]))
        .attr(
            "op",
            Attribute::string()
                .optional()
                .one_of(&["RX", "CONTAINS", "STARTS_WITH", "ENDS_WITH", "EQ", "LE", "GE"]),
        )
        .attr("rhs", Attribute::string().optional());

    let rule = Schema::new()
        .attr("names", Attribute::string_set().optional())
        .attr("type", Attribute::string().optional().one_of(RULE_TYPES))
        .attr("conditions", Attribute::list_of(condition).optional());

    Attribute::list_of(rule).optional()
}

fn associated_profiles_attribute() -> Attribute {
    Attribute::list_of(
        Schema::new()
            .attr("id", Attribute::string().computed())
            .attr("name", Attribute::string().computed()),
    )
    .computed()
}

fn expand_rules(data: &ResourceData) -> Vec<ControlRule> {
    blocks(data.get("rules"))
        .iter()
        .map(|rule| ControlRule {
            names: string_set(rule, "names"),
            rule_type: field(rule, "type"),
            conditions: blocks(rule.get("conditions"))
                .iter()
                .map(|condition| RuleCondition {
                    lhs: field(condition, "lhs"),
                    op: field(condition, "op"),
                    rhs: field(condition, "rhs"),
                })
                .collect(),
        })
        .collect()
}

fn flatten_rules(rules: &[ControlRule]) -> Vec<Value> {
    rules
        .iter()
        .map(|rule| {
            let conditions: Vec<Value> = rule
                .conditions
                .iter()
                .map(|c| json!({"lhs": c.lhs, "op": c.op, "rhs": c.rhs}))
                .collect();

            json!({
                "names": rule.names,
                "type": rule.rule_type,
                "conditions": conditions,
            })
        })
        .collect()
}

pub fn expand_inspection_custom_control(data: &ResourceData) -> InspectionCustomControl {
    InspectionCustomControl {
        id: data.id().to_string(),
        name: data.get_str("name"),
        description: data.get_str("description"),
        action: data.get_str("action"),
        action_value: data.get_str("action_value"),
        default_action: data.get_str("default_action"),
        default_action_value: data.get_str("default_action_value"),
        paranoia_level: data.get_str("paranoia_level"),
        severity: data.get_str("severity"),
        control_type: data.get_str("type"),
        rules: expand_rules(data),
        ..InspectionCustomControl::default()
    }
}

pub fn flatten_inspection_custom_control(data: &mut ResourceData, control: &InspectionCustomControl) {
    data.set_id(control.id.clone());
    data.set("name", control.name.clone());
    data.set("description", control.description.clone());
    data.set("action", control.action.clone());
    data.set("action_value", control.action_value.clone());
    data.set("default_action", control.default_action.clone());
    data.set("default_action_value", control.default_action_value.clone());
    data.set("paranoia_level", control.paranoia_level.clone());
    data.set("severity", control.severity.clone());
    data.set("type", control.control_type.clone());
    data.set("version", control.version.clone());
    data.set("control_number", control.control_number.clone());
    data.set("control_rule_json", control.control_rule_json.clone());
    data.set("creation_time", control.creation_time.clone());
    data.set("modified_by", control.modified_by.clone());
    data.set("modified_time", control.modified_time.clone());
    data.set("rules", flatten_rules(&control.rules));

    let profiles: Vec<Value> = control
        .associated_inspection_profile_names
        .iter()
        .map(|p| json!({"id": p.id, "name": p.name}))
        .collect();
    data.set("associated_inspection_profile_names", profiles);
}

/// `zpa_inspection_custom_controls`
pub struct InspectionCustomControlsResource;

impl Resource for InspectionCustomControlsResource {
    fn type_name(&self) -> &'static str {
        "zpa_inspection_custom_controls"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("id", Attribute::string().computed())
            .attr("name", Attribute::string().required())
            .attr("description", Attribute::string().optional())
            .attr("action", Attribute::string().optional().one_of(ACTIONS))
            .attr(
                "action_value",
                Attribute::string()
                    .optional()
                    .describe("Value for the action, e.g. the redirect URL"),
            )
            .attr("default_action", Attribute::string().optional().one_of(ACTIONS))
            .attr("default_action_value", Attribute::string().optional())
            .attr("paranoia_level", Attribute::string().optional())
            .attr("severity", Attribute::string().optional().one_of(SEVERITIES))
            .attr("type", Attribute::string().optional().one_of(&["REQUEST", "RESPONSE"]))
            .attr("version", Attribute::string().computed())
            .attr("control_number", Attribute::string().computed())
            .attr("control_rule_json", Attribute::string().computed())
            .attr("creation_time", Attribute::string().computed())
            .attr("modified_by", Attribute::string().computed())
            .attr("modified_time", Attribute::string().computed())
            .attr("associated_inspection_profile_names", associated_profiles_attribute())
            .attr("rules", rules_attribute())
    }

    fn create(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let request = expand_inspection_custom_control(data);
        info!("Creating inspection custom control {}", request.name);

        let created = client.inspection_custom_controls().create(&request)?;
        info!("Created inspection custom control {}", created.id);

        data.set_id(created.id);
        self.read(client, data)
    }

    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        match lookup(client.inspection_custom_controls().get(data.id()))? {
            Lookup::Found(control) => {
                flatten_inspection_custom_control(data, &control);
                Ok(ReadOutcome::Found)
            }
            Lookup::Gone => Ok(mark_gone(data, "inspection custom control")),
        }
    }

    fn update(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let id = data.id().to_string();
        info!("Updating inspection custom control {}", id);

        if let Lookup::Gone = lookup(client.inspection_custom_controls().get(&id))? {
            return Ok(mark_gone(data, "inspection custom control"));
        }

        let request = expand_inspection_custom_control(data);
        client.inspection_custom_controls().update(&id, &request)?;

        self.read(client, data)
    }

    fn delete(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError> {
        info!("Deleting inspection custom control {}", data.id());

        if let Lookup::Gone = lookup(client.inspection_custom_controls().delete(data.id()))? {
            mark_gone(data, "inspection custom control");
            return Ok(());
        }

        data.clear_id();
        Ok(())
    }
}

/// `zpa_inspection_custom_controls` data source: lookup by id and/or name
pub struct InspectionCustomControlsDataSource;

impl DataSource for InspectionCustomControlsDataSource {
    fn type_name(&self) -> &'static str {
        "zpa_inspection_custom_controls"
    }

    fn schema(&self) -> Schema {
        let mut schema = InspectionCustomControlsResource.schema();
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
        let service = client.inspection_custom_controls();

        let mut found = None;
        if !id.is_empty() {
            info!("Getting data for inspection custom control {}", id);
            found = Some(service.get(&id)?);
        }
        if !name.is_empty() {
            info!("Getting data for inspection custom control name {}", name);
            found = Some(service.get_by_name(&name)?);
        }

        match found {
            Some(control) => {
                flatten_inspection_custom_control(data, &control);
                data.set("id", control.id);
                Ok(())
            }
            None => Err(ProviderError::Validation(format!(
                "couldn't find any inspection custom control with name '{}' or id '{}'",
                name, id
            ))),
        }
    }
}

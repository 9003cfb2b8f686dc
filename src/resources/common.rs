//! Pieces shared by the policy rule resources.

use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::client::ZpaClient;
use crate::error::ProviderError;
use crate::schema::resource_data::{normalize_set, value_to_string};
use crate::schema::{Attribute, ResourceData, Schema};
use crate::services::{Condition, Operand, PolicyRule};

/// Client types accepted as the `rhs` of a CLIENT_TYPE operand
pub const CLIENT_TYPES: &[&str] = &[
    "zpn_client_type_exporter",
    "zpn_client_type_exporter_noauth",
    "zpn_client_type_browser_isolation",
    "zpn_client_type_machine_tunnel",
    "zpn_client_type_ip_anchoring",
    "zpn_client_type_edge_connector",
    "zpn_client_type_branch_connector",
    "zpn_client_type_zapp",
    "zpn_client_type_zapp_partner",
    "zpn_client_type_slogger",
    "zpn_client_type_vdi",
];

/// Platforms accepted as the `lhs` of a PLATFORM operand
pub const PLATFORMS: &[&str] = &["linux", "android", "windows", "ios", "mac"];

/// Attributes every policy rule resource carries
pub fn common_policy_schema() -> Schema {
    Schema::new()
        .attr("id", Attribute::string().computed())
        .attr("name", Attribute::string().required().describe("This is the name of the policy rule."))
        .attr("description", Attribute::string().optional())
        .attr("action", Attribute::string().optional())
        .attr("action_id", Attribute::string().optional())
        .attr("bypass_default_rule", Attribute::bool().optional())
        .attr("custom_msg", Attribute::string().optional())
        .attr("default_rule", Attribute::bool().optional())
        .attr("operator", Attribute::string().optional().computed().one_of(&["AND", "OR"]))
        .attr("policy_set_id", Attribute::string().optional().computed())
        .attr("policy_type", Attribute::string().optional().computed())
        .attr("priority", Attribute::string().optional())
        .attr(
            "rule_order",
            Attribute::string()
                .optional()
                .computed()
                .describe("Position of the rule among the rules of its policy type, starting at 1."),
        )
        .attr("zpn_cbi_profile_id", Attribute::string().optional())
        .attr("zpn_isolation_profile_id", Attribute::string().optional())
}

/// `conditions` block restricting operand object types to `object_types`
pub fn conditions_schema(object_types: &[&'static str]) -> Attribute {
    let operand = Schema::new()
        .attr("id", Attribute::string().computed())
        .attr("idp_id", Attribute::string().optional())
        .attr("lhs", Attribute::string().required())
        .attr("rhs", Attribute::string().optional())
        .attr("name", Attribute::string().optional())
        .attr("object_type", Attribute::string().required().one_of(object_types));

    let condition = Schema::new()
        .attr("id", Attribute::string().computed())
        .attr("negated", Attribute::bool().optional())
        .attr("operator", Attribute::string().required().one_of(&["AND", "OR"]))
        .attr("operands", Attribute::list_of(operand).optional());

    Attribute::list_of(condition)
        .optional()
        .describe("Match conditions of the rule.")
}

/// String field of a nested block; missing values read as empty
pub fn field(block: &Map<String, Value>, key: &str) -> String {
    block.get(key).map(value_to_string).unwrap_or_default()
}

pub fn flag(block: &Map<String, Value>, key: &str) -> bool {
    block.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Nested blocks of a block attribute, skipping anything that is not an object
pub fn blocks(value: Option<&Value>) -> Vec<Map<String, Value>> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
        .unwrap_or_default()
}

/// String elements of a set inside a nested block, sorted and de-duplicated
pub fn string_set(block: &Map<String, Value>, key: &str) -> Vec<String> {
    let items = block
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(value_to_string).collect())
        .unwrap_or_default();

    normalize_set(items)
}

pub fn expand_conditions(data: &ResourceData) -> Vec<Condition> {
    blocks(data.get("conditions"))
        .iter()
        .map(|condition| Condition {
            id: field(condition, "id"),
            negated: flag(condition, "negated"),
            operator: field(condition, "operator"),
            operands: blocks(condition.get("operands"))
                .iter()
                .map(|operand| Operand {
                    id: field(operand, "id"),
                    idp_id: field(operand, "idp_id"),
                    lhs: field(operand, "lhs"),
                    rhs: field(operand, "rhs"),
                    name: field(operand, "name"),
                    object_type: field(operand, "object_type"),
                })
                .collect(),
        })
        .collect()
}

pub fn flatten_conditions(conditions: &[Condition]) -> Vec<Value> {
    conditions
        .iter()
        .map(|condition| {
            let operands: Vec<Value> = condition
                .operands
                .iter()
                .map(|operand| {
                    json!({
                        "id": operand.id,
                        "idp_id": operand.idp_id,
                        "lhs": operand.lhs,
                        "rhs": operand.rhs,
                        "name": operand.name,
                        "object_type": operand.object_type,
                    })
                })
                .collect();

            json!({
                "id": condition.id,
                "negated": condition.negated,
                "operator": condition.operator,
                "operands": operands,
            })
        })
        .collect()
}

/// Copy the common rule fields from configuration into a request record
pub fn expand_policy_rule(data: &ResourceData) -> PolicyRule {
    PolicyRule {
        id: data.id().to_string(),
        name: data.get_str("name"),
        description: data.get_str("description"),
        action: data.get_str("action"),
        action_id: data.get_str("action_id"),
        custom_msg: data.get_str("custom_msg"),
        bypass_default_rule: data.get_bool("bypass_default_rule"),
        default_rule: data.get_bool("default_rule"),
        operator: data.get_str("operator"),
        policy_set_id: data.get_str("policy_set_id"),
        policy_type: data.get_str("policy_type"),
        priority: data.get_str("priority"),
        rule_order: data.get_str("rule_order"),
        zpn_cbi_profile_id: data.get_str("zpn_cbi_profile_id"),
        zpn_isolation_profile_id: data.get_str("zpn_isolation_profile_id"),
        conditions: expand_conditions(data),
        ..PolicyRule::default()
    }
}

pub fn flatten_policy_rule(data: &mut ResourceData, rule: &PolicyRule) {
    data.set_id(rule.id.clone());
    data.set("name", rule.name.clone());
    data.set("description", rule.description.clone());
    data.set("action", rule.action.clone());
    data.set("action_id", rule.action_id.clone());
    data.set("custom_msg", rule.custom_msg.clone());
    data.set("bypass_default_rule", rule.bypass_default_rule);
    data.set("default_rule", rule.default_rule);
    data.set("operator", rule.operator.clone());
    data.set("policy_set_id", rule.policy_set_id.clone());
    data.set("policy_type", rule.policy_type.clone());
    data.set("priority", rule.priority.clone());
    data.set("rule_order", rule.rule_order.clone());
    data.set("zpn_cbi_profile_id", rule.zpn_cbi_profile_id.clone());
    data.set("zpn_isolation_profile_id", rule.zpn_isolation_profile_id.clone());
    data.set("conditions", flatten_conditions(&rule.conditions));
}

fn is_true_or_false(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

fn check_operand(operand: &Operand, object_types: &[&str]) -> Result<(), String> {
    let kind = operand.object_type.as_str();

    if !object_types.contains(&kind) {
        return Err(format!(
            "object type '{}' is not supported, expected one of: {}",
            kind,
            object_types.join(", ")
        ));
    }

    match kind {
        "APP" | "APP_GROUP" | "MACHINE_GRP" | "EDGE_CONNECTOR_GROUP" | "IDP" => {
            if operand.lhs != "id" {
                return Err(format!("LHS must be 'id' for {} type", kind));
            }
            if operand.rhs.is_empty() {
                return Err(format!("RHS must be set for {} type", kind));
            }
        }
        "CLIENT_TYPE" => {
            if operand.lhs != "id" {
                return Err("LHS must be 'id' for CLIENT_TYPE type".to_string());
            }
            if !CLIENT_TYPES.contains(&operand.rhs.as_str()) {
                return Err(format!(
                    "RHS '{}' is not a valid client type, expected one of: {}",
                    operand.rhs,
                    CLIENT_TYPES.join(", ")
                ));
            }
        }
        "PLATFORM" => {
            if !PLATFORMS.contains(&operand.lhs.as_str()) {
                return Err(format!(
                    "LHS '{}' is not a valid platform, expected one of: {}",
                    operand.lhs,
                    PLATFORMS.join(", ")
                ));
            }
            if operand.rhs != "true" {
                return Err("RHS must be 'true' for PLATFORM type".to_string());
            }
        }
        "POSTURE" | "TRUSTED_NETWORK" => {
            if operand.lhs.is_empty() {
                return Err(format!("LHS must be set for {} type", kind));
            }
            if !is_true_or_false(&operand.rhs) {
                return Err(format!("RHS must be 'true' or 'false' for {} type", kind));
            }
        }
        "SAML" | "SCIM" => {
            if operand.lhs.is_empty() || operand.rhs.is_empty() {
                return Err(format!("LHS and RHS must be set for {} type", kind));
            }
            if kind == "SCIM" && operand.idp_id.is_empty() {
                return Err("idp_id must be set for SCIM type".to_string());
            }
        }
        "SCIM_GROUP" => {
            if operand.lhs.is_empty() || operand.rhs.is_empty() {
                return Err("LHS (IdP id) and RHS (group id) must be set for SCIM_GROUP type".to_string());
            }
        }
        _ => {}
    }

    Ok(())
}

/// Local check of every operand; runs before any request is made
pub fn validate_conditions(
    rule_kind: &str,
    rule_name: &str,
    conditions: &[Condition],
    object_types: &[&str],
) -> Result<(), ProviderError> {
    for operand in conditions.iter().flat_map(|c| c.operands.iter()) {
        if let Err(detail) = check_operand(operand, object_types) {
            return Err(ProviderError::Validation(format!(
                "couldn't validate the zpa policy {} ({}) operands, please make sure you are using valid inputs for APP type, LHS & RHS: {}",
                rule_kind, rule_name, detail
            )));
        }
    }

    Ok(())
}

/// Move a rule to its configured position.
///
/// Runs after the rule itself was saved, so nothing here fails the operation:
/// problems are logged and attached to `data` as warnings.
pub fn reorder(
    client: &ZpaClient,
    data: &mut ResourceData,
    policy_set_id: &str,
    policy_type: &str,
    rule_id: &str,
) {
    let requested = data.get_str("rule_order");

    let order = match requested.trim().parse::<u32>() {
        Ok(order) if order >= 1 => order,
        _ => {
            let message = format!(
                "rule {} was saved but not reordered: invalid rule_order '{}'",
                rule_id, requested
            );
            warn!("{}", message);
            data.add_warning(message);
            return;
        }
    };

    let count = match client.policy_set_controller().get_all_by_type(policy_type) {
        Ok(rules) => rules.len(),
        Err(err) => {
            let message = format!(
                "rule {} was saved but not reordered: couldn't list {} rules: {}",
                rule_id, policy_type, err
            );
            warn!("{}", message);
            data.add_warning(message);
            return;
        }
    };

    if order as usize > count {
        let message = format!(
            "rule {} was saved but not reordered: rule_order {} exceeds the {} rules of {}",
            rule_id, order, count, policy_type
        );
        warn!("{}", message);
        data.add_warning(message);
        return;
    }

    info!("Reordering rule {} of policy set {} to {}", rule_id, policy_set_id, order);

    if let Err(err) = client
        .policy_set_controller()
        .reorder(policy_set_id, rule_id, order)
    {
        let message = format!(
            "rule {} was saved but reordering to {} failed: {}",
            rule_id, order, err
        );
        warn!("{}", message);
        data.add_warning(message);
    }
}

use serde_json::{Value, json};
use tracing::info;

use crate::client::ZpaClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, ResourceData, Schema};

use super::DataSource;

const DEFAULT_POLICY_TYPE: &str = "ACCESS_POLICY";

const POLICY_TYPES: &[&str] = &[
    "ACCESS_POLICY",
    "GLOBAL_POLICY",
    "TIMEOUT_POLICY",
    "REAUTH_POLICY",
    "CLIENT_FORWARDING_POLICY",
    "BYPASS_POLICY",
    "ISOLATION_POLICY",
    "INSPECTION_POLICY",
    "CREDENTIAL_POLICY",
    "CAPABILITIES_POLICY",
    "CLIENTLESS_SESSION_PROTECTION_POLICY",
    "SIEM_POLICY",
];

/// `zpa_policy_type`: the global policy set of a policy type
pub struct PolicyTypeDataSource;

impl DataSource for PolicyTypeDataSource {
    fn type_name(&self) -> &'static str {
        "zpa_policy_type"
    }

    fn schema(&self) -> Schema {
        let rule = Schema::new()
            .attr("id", Attribute::string().computed())
            .attr("name", Attribute::string().computed())
            .attr("action", Attribute::string().computed())
            .attr("priority", Attribute::string().computed())
            .attr("rule_order", Attribute::string().computed());

        Schema::new()
            .attr("id", Attribute::string().computed())
            .attr(
                "policy_type",
                Attribute::string()
                    .optional()
                    .one_of(POLICY_TYPES)
                    .describe("Defaults to ACCESS_POLICY"),
            )
            .attr("name", Attribute::string().computed())
            .attr("description", Attribute::string().computed())
            .attr("enabled", Attribute::bool().computed())
            .attr("creation_time", Attribute::string().computed())
            .attr("modified_by", Attribute::string().computed())
            .attr("modified_time", Attribute::string().computed())
            .attr("rules", Attribute::list_of(rule).computed())
    }

    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError> {
        let mut policy_type = data.get_str("policy_type");
        if policy_type.is_empty() {
            policy_type = DEFAULT_POLICY_TYPE.to_string();
        }

        info!("Getting data for policy type {}", policy_type);
        let set = client.policy_set_controller().get_by_policy_type(&policy_type)?;

        let rules: Vec<Value> = set
            .rules
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "name": r.name,
                    "action": r.action,
                    "priority": r.priority,
                    "rule_order": r.rule_order,
                })
            })
            .collect();

        data.set_id(set.id.clone());
        data.set("id", set.id);
        data.set("policy_type", policy_type);
        data.set("name", set.name);
        data.set("description", set.description);
        data.set("enabled", set.enabled);
        data.set("creation_time", set.creation_time);
        data.set("modified_by", set.modified_by);
        data.set("modified_time", set.modified_time);
        data.set("rules", rules);

        Ok(())
    }
}

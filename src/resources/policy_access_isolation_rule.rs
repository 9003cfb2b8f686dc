use tracing::info;

use crate::client::ZpaClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, ResourceData, Schema};
use crate::services::PolicyRule;

use super::common::{
    common_policy_schema, conditions_schema, expand_policy_rule, flatten_policy_rule, reorder,
    validate_conditions,
};
use super::{Lookup, ReadOutcome, Resource, is_numeric_id, lookup, mark_gone};

const POLICY_TYPE: &str = "ISOLATION_POLICY";

/// Operand object types an isolation rule may match on
pub const ISOLATION_OBJECT_TYPES: &[&str] = &[
    "APP",
    "CLIENT_TYPE",
    "EDGE_CONNECTOR_GROUP",
    "POSTURE",
    "MACHINE_GRP",
    "TRUSTED_NETWORK",
    "PLATFORM",
    "IDP",
    "SAML",
    "SCIM",
    "SCIM_GROUP",
];

/// `zpa_policy_access_isolation_rule`
pub struct PolicyAccessIsolationRuleResource;

impl PolicyAccessIsolationRuleResource {
    /// Expand and check the configuration; no request is made
    fn expand_validated(&self, data: &ResourceData) -> Result<PolicyRule, ProviderError> {
        let rule = expand_policy_rule(data);

        if rule.action == "ISOLATE" && rule.zpn_isolation_profile_id.is_empty() {
            return Err(ProviderError::Validation(format!(
                "policy isolation rule ({}) with action ISOLATE requires zpn_isolation_profile_id",
                rule.name
            )));
        }

        validate_conditions("isolation", &rule.name, &rule.conditions, ISOLATION_OBJECT_TYPES)?;

        Ok(rule)
    }

    fn policy_set_id(&self, client: &ZpaClient) -> Result<String, ProviderError> {
        let set = client.policy_set_controller().get_by_policy_type(POLICY_TYPE)?;
        Ok(set.id)
    }
}

impl Resource for PolicyAccessIsolationRuleResource {
    fn type_name(&self) -> &'static str {
        "zpa_policy_access_isolation_rule"
    }

    fn schema(&self) -> Schema {
        common_policy_schema().merge(
            Schema::new()
                .attr(
                    "action",
                    Attribute::string()
                        .optional()
                        .one_of(&["ISOLATE", "BYPASS_ISOLATE"])
                        .describe("This is for providing the rule action."),
                )
                .attr("conditions", conditions_schema(ISOLATION_OBJECT_TYPES)),
        )
    }

    fn create(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let mut request = self.expand_validated(data)?;

        if request.policy_set_id.is_empty() {
            request.policy_set_id = self.policy_set_id(client)?;
        }

        info!("Creating zpa policy isolation rule {}", request.name);
        let created = client.policy_set_controller().create(&request)?;
        data.set_id(created.id.clone());

        if data.get_ok("rule_order").is_some() {
            reorder(client, data, &request.policy_set_id, POLICY_TYPE, &created.id);
        }

        self.read(client, data)
    }

    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let policy_set_id = self.policy_set_id(client)?;
        info!("Getting policy set rule: policy set {} id {}", policy_set_id, data.id());

        match lookup(client.policy_set_controller().get_policy_rule(&policy_set_id, data.id()))? {
            Lookup::Found(rule) => {
                flatten_policy_rule(data, &rule);
                Ok(ReadOutcome::Found)
            }
            Lookup::Gone => Ok(mark_gone(data, "policy rule")),
        }
    }

    fn update(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let mut request = self.expand_validated(data)?;
        let policy_set_id = self.policy_set_id(client)?;
        let rule_id = data.id().to_string();
        info!("Updating policy isolation rule {}", rule_id);

        let existing = client
            .policy_set_controller()
            .get_policy_rule(&policy_set_id, &rule_id);
        if let Lookup::Gone = lookup(existing)? {
            return Ok(mark_gone(data, "policy rule"));
        }

        request.policy_set_id = policy_set_id.clone();
        client
            .policy_set_controller()
            .update(&policy_set_id, &rule_id, &request)?;

        if data.has_change("rule_order") && data.get_ok("rule_order").is_some() {
            reorder(client, data, &policy_set_id, POLICY_TYPE, &rule_id);
        }

        self.read(client, data)
    }

    fn delete(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError> {
        let policy_set_id = self.policy_set_id(client)?;
        info!("Deleting policy isolation rule {}", data.id());

        let deleted = client.policy_set_controller().delete(&policy_set_id, data.id());
        if let Lookup::Gone = lookup(deleted)? {
            mark_gone(data, "policy rule");
            return Ok(());
        }

        data.clear_id();
        Ok(())
    }

    /// Accepts the numeric rule id or the rule name
    fn import(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        if !is_numeric_id(data.id()) {
            let rule = client
                .policy_set_controller()
                .get_by_name_and_type(POLICY_TYPE, data.id())?;
            data.set_id(rule.id);
        }

        self.read(client, data)
    }
}

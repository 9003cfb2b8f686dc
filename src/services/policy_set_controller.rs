use serde::{Deserialize, Serialize};

use crate::client::{ApiError, ZpaClient};
use crate::error::ProviderError;

use super::is_false;

const POLICY_SET_ENDPOINT: &str = "/policySet";

/// Global policy set of one policy type (ACCESS_POLICY, ISOLATION_POLICY, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicySet {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub policy_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<PolicyRule>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_time: String,
}

/// One rule inside a policy set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyRule {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_msg: String,
    #[serde(skip_serializing_if = "is_false")]
    pub bypass_default_rule: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub default_rule: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub operator: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub policy_set_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub policy_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub priority: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rule_order: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zpn_cbi_profile_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zpn_isolation_profile_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_time: String,
}

/// Group of operands joined by `operator` (AND|OR)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Condition {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "is_false")]
    pub negated: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub operator: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<Operand>,
}

/// Single match criterion: `object_type` selects how `lhs`/`rhs` are read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Operand {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub idp_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lhs: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rhs: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub object_type: String,
}

pub struct PolicySetControllerService<'a> {
    client: &'a ZpaClient,
}

impl<'a> PolicySetControllerService<'a> {
    pub fn new(client: &'a ZpaClient) -> Self {
        Self { client }
    }

    fn path(&self, suffix: &str) -> String {
        self.client
            .mgmt_path(&format!("{}{}", POLICY_SET_ENDPOINT, suffix))
    }

    fn rule_path(&self, policy_set_id: &str, rule_id: &str) -> String {
        self.path(&format!("/{}/rule/{}", policy_set_id, rule_id))
    }

    /// The global policy set for a policy type
    pub fn get_by_policy_type(&self, policy_type: &str) -> Result<PolicySet, ApiError> {
        self.client
            .get(&self.path(&format!("/policyType/{}", policy_type)))
    }

    pub fn get_policy_rule(&self, policy_set_id: &str, rule_id: &str) -> Result<PolicyRule, ApiError> {
        self.client.get(&self.rule_path(policy_set_id, rule_id))
    }

    /// Every rule of a policy type, in the order the API lists them
    pub fn get_all_by_type(&self, policy_type: &str) -> Result<Vec<PolicyRule>, ApiError> {
        self.client.get_all_pages(
            &self.path(&format!("/rules/policyType/{}", policy_type)),
            None,
        )
    }

    pub fn get_by_name_and_type(
        &self,
        policy_type: &str,
        name: &str,
    ) -> Result<PolicyRule, ProviderError> {
        let found = self.client.find_first(
            &self.path(&format!("/rules/policyType/{}", policy_type)),
            Some(name),
            |rule: &PolicyRule| rule.name.eq_ignore_ascii_case(name),
        )?;

        found.ok_or_else(|| ProviderError::NotFoundByName {
            kind: "policy rule",
            name: name.to_string(),
        })
    }

    /// Create a rule inside `rule.policy_set_id`
    pub fn create(&self, rule: &PolicyRule) -> Result<PolicyRule, ApiError> {
        let request = PolicyRule {
            id: String::new(),
            ..rule.clone()
        };

        self.client
            .post(&self.path(&format!("/{}/rule", rule.policy_set_id)), &request)
    }

    pub fn update(&self, policy_set_id: &str, rule_id: &str, rule: &PolicyRule) -> Result<(), ApiError> {
        self.client.put(&self.rule_path(policy_set_id, rule_id), rule)
    }

    pub fn delete(&self, policy_set_id: &str, rule_id: &str) -> Result<(), ApiError> {
        self.client.delete(&self.rule_path(policy_set_id, rule_id))
    }

    /// Move a rule to position `order` among the rules of its policy set
    pub fn reorder(&self, policy_set_id: &str, rule_id: &str, order: u32) -> Result<(), ApiError> {
        self.client.put_empty(&format!(
            "{}/reorder/{}",
            self.rule_path(policy_set_id, rule_id),
            order
        ))
    }
}

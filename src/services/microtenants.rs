use serde::{Deserialize, Serialize};

use crate::client::{ApiError, ZpaClient};
use crate::error::ProviderError;

use super::is_false;

const MICROTENANTS_ENDPOINT: &str = "/microtenants";

/// Delegated administration partition of a tenant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MicroTenant {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub criteria_attribute: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub criteria_attribute_values: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub operator: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub priority: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<Role>,
    /// Administrator account the server provisions on create
    #[serde(rename = "userResource", skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResource>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Role {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub custom_role: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserResource {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comments: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub customer_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub eula: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub force_pwd_change: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_ids: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_enabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_locked: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language_code: String,
    #[serde(skip_serializing_if = "is_false")]
    pub local_login_disabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phone_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pin_session: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub microtenant_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub microtenant_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tmp_password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token_id: String,
    #[serde(skip_serializing_if = "is_false")]
    pub two_factor_auth_enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub two_factor_auth_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation_time: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified_time: String,
}

pub struct MicroTenantService<'a> {
    client: &'a ZpaClient,
}

impl<'a> MicroTenantService<'a> {
    pub fn new(client: &'a ZpaClient) -> Self {
        Self { client }
    }

    fn collection(&self) -> String {
        self.client.mgmt_path(MICROTENANTS_ENDPOINT)
    }

    fn item(&self, id: &str) -> String {
        format!("{}/{}", self.collection(), id)
    }

    pub fn get(&self, id: &str) -> Result<MicroTenant, ApiError> {
        self.client.get(&self.item(id))
    }

    pub fn get_by_name(&self, name: &str) -> Result<MicroTenant, ProviderError> {
        let found = self.client.find_first(
            &self.collection(),
            Some(name),
            |tenant: &MicroTenant| tenant.name.eq_ignore_ascii_case(name),
        )?;

        found.ok_or_else(|| ProviderError::NotFoundByName {
            kind: "microtenant",
            name: name.to_string(),
        })
    }

    pub fn create(&self, tenant: &MicroTenant) -> Result<MicroTenant, ApiError> {
        let request = MicroTenant {
            id: String::new(),
            user: None,
            ..tenant.clone()
        };

        self.client.post(&self.collection(), &request)
    }

    pub fn update(&self, id: &str, tenant: &MicroTenant) -> Result<(), ApiError> {
        let request = MicroTenant {
            user: None,
            ..tenant.clone()
        };

        self.client.put(&self.item(id), &request)
    }

    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&self.item(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Method;
    use crate::client::mock::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MockTransport>, ZpaClient) {
        let mock = Arc::new(MockTransport::new());
        let client = ZpaClient::with_transport("123", mock.clone());
        (mock, client)
    }

    fn tenant(name: &str) -> MicroTenant {
        MicroTenant {
            name: name.to_string(),
            enabled: true,
            criteria_attribute: "AuthDomain".to_string(),
            criteria_attribute_values: vec!["acme.com".to_string()],
            ..MicroTenant::default()
        }
    }

    #[test]
    fn test_create_sends_criteria_values() {
        let (mock, client) = setup();

        let created = client.microtenants().create(&tenant("Engineering")).unwrap();
        assert!(!created.id.is_empty());

        let body = mock.mutations()[0].body.clone().unwrap();
        assert_eq!(body["criteriaAttribute"], "AuthDomain");
        assert_eq!(body["criteriaAttributeValues"], json!(["acme.com"]));
        assert_eq!(body["enabled"], true);
        assert!(body.get("userResource").is_none());
    }

    #[test]
    fn test_decode_user_resource() {
        let (mock, client) = setup();
        let path = client.mgmt_path("/microtenants");
        let id = mock.insert(
            &path,
            json!({
                "name": "Engineering",
                "enabled": true,
                "roles": [{"id": "1", "name": "Microtenant Admin", "customRole": false}],
                "userResource": {
                    "username": "admin@engineering.acme.com",
                    "password": "generated",
                    "groupIds": ["10", "11"],
                    "twoFactorAuthEnabled": false,
                    "isEnabled": true
                }
            }),
        );

        let fetched = client.microtenants().get(&id).unwrap();
        let user = fetched.user.unwrap();
        assert_eq!(user.username, "admin@engineering.acme.com");
        assert_eq!(user.group_ids, vec!["10", "11"]);
        assert!(user.is_enabled);
        assert_eq!(fetched.roles[0].name, "Microtenant Admin");
    }

    #[test]
    fn test_update_never_sends_user() {
        let (mock, client) = setup();
        let service = client.microtenants();
        let created = service.create(&tenant("Engineering")).unwrap();

        let mut changed = tenant("Engineering");
        changed.user = Some(UserResource {
            username: "admin".to_string(),
            ..UserResource::default()
        });
        changed.description = "updated".to_string();
        service.update(&created.id, &changed).unwrap();

        let put = mock
            .mutations()
            .into_iter()
            .find(|r| r.method == Method::Put)
            .unwrap();
        assert!(put.body.unwrap().get("userResource").is_none());
        assert_eq!(service.get(&created.id).unwrap().description, "updated");
    }

    #[test]
    fn test_get_by_name() {
        let (_, client) = setup();
        let service = client.microtenants();
        service.create(&tenant("Engineering")).unwrap();

        assert_eq!(service.get_by_name("ENGINEERING").unwrap().name, "Engineering");
        assert_eq!(
            service.get_by_name("Finance").unwrap_err().to_string(),
            "no microtenant named 'Finance' was found"
        );
    }
}

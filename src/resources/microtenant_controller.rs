use serde_json::{Value, json};
use tracing::info;

use crate::client::ZpaClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, ResourceData, Schema};
use crate::services::{MicroTenant, UserResource};

use super::{DataSource, Lookup, ReadOutcome, Resource, lookup, mark_gone};

fn roles_attribute() -> Attribute {
    Attribute::list_of(
        Schema::new()
            .attr("id", Attribute::string().computed())
            .attr("name", Attribute::string().computed())
            .attr("custom_role", Attribute::bool().computed()),
    )
    .computed()
}

fn user_attribute() -> Attribute {
    let mut block = Schema::new();
    for name in [
        "id",
        "name",
        "description",
        "comments",
        "customer_id",
        "display_name",
        "email",
        "eula",
        "force_pwd_change",
        "language_code",
        "phone_number",
        "pin_session",
        "role_id",
        "microtenant_id",
        "microtenant_name",
        "timezone",
        "token_id",
        "two_factor_auth_type",
        "username",
        "creation_time",
        "modified_by",
        "modified_time",
    ] {
        block = block.attr(name, Attribute::string().computed());
    }

    block = block
        .attr("password", Attribute::string().computed().sensitive())
        .attr("tmp_password", Attribute::string().computed().sensitive())
        .attr("group_ids", Attribute::string_list().computed())
        .attr("is_enabled", Attribute::bool().computed())
        .attr("is_locked", Attribute::bool().computed())
        .attr("local_login_disabled", Attribute::bool().computed())
        .attr("two_factor_auth_enabled", Attribute::bool().computed());

    Attribute::list_of(block)
        .computed()
        .describe("Administrator account provisioned with the microtenant; only returned on create")
}

pub fn expand_microtenant(data: &ResourceData) -> MicroTenant {
    MicroTenant {
        id: data.id().to_string(),
        name: data.get_str("name"),
        description: data.get_str("description"),
        enabled: data.get_bool("enabled"),
        criteria_attribute: data.get_str("criteria_attribute"),
        criteria_attribute_values: data.get_string_set("criteria_attribute_values"),
        ..MicroTenant::default()
    }
}

fn flatten_user(user: &UserResource) -> Vec<Value> {
    vec![json!({
        "id": user.id,
        "name": user.name,
        "description": user.description,
        "comments": user.comments,
        "customer_id": user.customer_id,
        "display_name": user.display_name,
        "email": user.email,
        "eula": user.eula,
        "force_pwd_change": user.force_pwd_change,
        "group_ids": user.group_ids,
        "is_enabled": user.is_enabled,
        "is_locked": user.is_locked,
        "language_code": user.language_code,
        "local_login_disabled": user.local_login_disabled,
        "password": user.password,
        "phone_number": user.phone_number,
        "pin_session": user.pin_session,
        "role_id": user.role_id,
        "microtenant_id": user.microtenant_id,
        "microtenant_name": user.microtenant_name,
        "timezone": user.timezone,
        "tmp_password": user.tmp_password,
        "token_id": user.token_id,
        "two_factor_auth_enabled": user.two_factor_auth_enabled,
        "two_factor_auth_type": user.two_factor_auth_type,
        "username": user.username,
        "creation_time": user.creation_time,
        "modified_by": user.modified_by,
        "modified_time": user.modified_time,
    })]
}

/// Copy a microtenant into state; `user` is only touched when the record carries one
pub fn flatten_microtenant(data: &mut ResourceData, tenant: &MicroTenant) {
    data.set_id(tenant.id.clone());
    data.set("name", tenant.name.clone());
    data.set("description", tenant.description.clone());
    data.set("enabled", tenant.enabled);
    data.set("criteria_attribute", tenant.criteria_attribute.clone());
    data.set_string_set("criteria_attribute_values", tenant.criteria_attribute_values.clone());
    data.set("operator", tenant.operator.clone());
    data.set("priority", tenant.priority.clone());
    data.set("creation_time", tenant.creation_time.clone());
    data.set("modified_by", tenant.modified_by.clone());
    data.set("modified_time", tenant.modified_time.clone());

    let roles: Vec<Value> = tenant
        .roles
        .iter()
        .map(|r| json!({"id": r.id, "name": r.name, "custom_role": r.custom_role}))
        .collect();
    data.set("roles", roles);

    if let Some(user) = &tenant.user {
        data.set("user", flatten_user(user));
    }
}

/// `zpa_microtenant_controller`
pub struct MicroTenantControllerResource;

impl Resource for MicroTenantControllerResource {
    fn type_name(&self) -> &'static str {
        "zpa_microtenant_controller"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .attr("id", Attribute::string().computed())
            .attr("name", Attribute::string().required())
            .attr("description", Attribute::string().optional())
            .attr("enabled", Attribute::bool().optional())
            .attr("criteria_attribute", Attribute::string().optional().one_of(&["AuthDomain"]))
            .attr(
                "criteria_attribute_values",
                Attribute::string_set()
                    .optional()
                    .describe("Authentication domains that belong to the microtenant"),
            )
            .attr("operator", Attribute::string().computed())
            .attr("priority", Attribute::string().computed())
            .attr("creation_time", Attribute::string().computed())
            .attr("modified_by", Attribute::string().computed())
            .attr("modified_time", Attribute::string().computed())
            .attr("roles", roles_attribute())
            .attr("user", user_attribute())
    }

    fn create(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let request = expand_microtenant(data);
        info!("Creating microtenant {}", request.name);

        let created = client.microtenants().create(&request)?;
        info!("Created microtenant {}", created.id);

        data.set_id(created.id.clone());
        if let Some(user) = &created.user {
            data.set("user", flatten_user(user));
        }

        self.read(client, data)
    }

    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        match lookup(client.microtenants().get(data.id()))? {
            Lookup::Found(tenant) => {
                flatten_microtenant(data, &tenant);
                Ok(ReadOutcome::Found)
            }
            Lookup::Gone => Ok(mark_gone(data, "microtenant")),
        }
    }

    fn update(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        let id = data.id().to_string();
        info!("Updating microtenant {}", id);

        if let Lookup::Gone = lookup(client.microtenants().get(&id))? {
            return Ok(mark_gone(data, "microtenant"));
        }

        client.microtenants().update(&id, &expand_microtenant(data))?;

        self.read(client, data)
    }

    fn delete(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError> {
        info!("Deleting microtenant {}", data.id());

        if let Lookup::Gone = lookup(client.microtenants().delete(data.id()))? {
            mark_gone(data, "microtenant");
            return Ok(());
        }

        data.clear_id();
        Ok(())
    }
}

/// `zpa_microtenant_controller` data source
pub struct MicroTenantDataSource;

impl DataSource for MicroTenantDataSource {
    fn type_name(&self) -> &'static str {
        "zpa_microtenant_controller"
    }

    fn schema(&self) -> Schema {
        let mut schema = MicroTenantControllerResource.schema();
        for attribute in schema.attributes.values_mut() {
            *attribute = Attribute {
                required: false,
                optional: false,
                computed: true,
                ..attribute.clone()
            };
        }

        schema
            .attr("id", Attribute::string().optional())
            .attr("name", Attribute::string().optional())
    }

    /// Looks up by id and then by name; the name lookup wins when both are set
    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError> {
        let id = data.get_str("id");
        let name = data.get_str("name");

        let mut found = None;
        if !id.is_empty() {
            info!("Getting data for microtenant {}", id);
            found = Some(client.microtenants().get(&id)?);
        }
        if !name.is_empty() {
            info!("Getting data for microtenant name {}", name);
            found = Some(client.microtenants().get_by_name(&name)?);
        }

        match found {
            Some(tenant) => {
                flatten_microtenant(data, &tenant);
                data.set("id", tenant.id);
                Ok(())
            }
            None => Err(ProviderError::Validation(format!(
                "couldn't find any microtenant with name '{}' or id '{}'",
                name, id
            ))),
        }
    }
}

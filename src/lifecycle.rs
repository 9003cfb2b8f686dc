//! Drives a single resource or data source operation end to end.
//!
//! Each function validates its input, runs the handler and packages the
//! resulting state together with any warnings raised along the way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::ZpaClient;
use crate::error::ProviderError;
use crate::provider::Provider;
use crate::resources::ReadOutcome;
use crate::schema::{Diagnostic, ResourceData, Schema};

/// Persisted state of one resource instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Result of an operation on a managed resource
#[derive(Debug)]
pub struct Outcome {
    /// New state, or `None` when the resource no longer exists
    pub state: Option<ResourceState>,
    pub warnings: Vec<Diagnostic>,
}

impl Outcome {
    fn from_data(resource_type: &str, outcome: ReadOutcome, mut data: ResourceData) -> Self {
        let warnings = data.take_warnings();

        let state = match outcome {
            ReadOutcome::Gone => None,
            ReadOutcome::Found if data.id().is_empty() => None,
            ReadOutcome::Found => Some(ResourceState {
                resource_type: resource_type.to_string(),
                id: data.id().to_string(),
                attributes: data.into_state(),
            }),
        };

        Self { state, warnings }
    }

    pub fn is_gone(&self) -> bool {
        self.state.is_none()
    }
}

/// Check a configuration against a schema; errors fail, warnings are returned
pub fn check_config(schema: &Schema, config: &Map<String, Value>) -> Result<Vec<Diagnostic>, ProviderError> {
    let (errors, warnings): (Vec<_>, Vec<_>) =
        schema.validate(config).into_iter().partition(|d| d.is_error());

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ProviderError::InvalidConfig(errors))
    }
}

/// Validate a resource (or, failing that, data source) configuration
/// without touching the API
pub fn validate(
    provider: &Provider,
    type_name: &str,
    config: &Map<String, Value>,
) -> Result<Vec<Diagnostic>, ProviderError> {
    let schema = match provider.resource(type_name) {
        Ok(resource) => resource.schema(),
        Err(err) => match provider.data_source(type_name) {
            Ok(data_source) => data_source.schema(),
            Err(_) => return Err(err),
        },
    };

    check_config(&schema, config)
}

/// Create the resource, or update it when `prior` holds an existing instance
pub fn apply(
    provider: &Provider,
    client: &ZpaClient,
    resource_type: &str,
    config: Map<String, Value>,
    prior: Option<&ResourceState>,
) -> Result<Outcome, ProviderError> {
    let resource = provider.resource(resource_type)?;
    let schema = resource.schema();
    let mut warnings = check_config(&schema, &config)?;

    let prior = prior.filter(|p| !p.id.is_empty());

    let (outcome, data) = match prior {
        Some(prior) => {
            if prior.resource_type != resource_type {
                return Err(ProviderError::Validation(format!(
                    "state holds a {} but the configuration is for {}",
                    prior.resource_type, resource_type
                )));
            }

            debug!("Updating {} {}", resource_type, prior.id);
            let mut data = ResourceData::with_prior(prior.id.clone(), prior.attributes.clone(), config)
                .carry_computed(&schema);
            let outcome = resource.update(client, &mut data)?;
            (outcome, data)
        }
        None => {
            debug!("Creating {}", resource_type);
            let mut data = ResourceData::new(config);
            let outcome = resource.create(client, &mut data)?;
            (outcome, data)
        }
    };

    let mut result = Outcome::from_data(resource_type, outcome, data);
    warnings.append(&mut result.warnings);
    result.warnings = warnings;
    Ok(result)
}

/// Refresh stored state from the API
pub fn refresh(provider: &Provider, client: &ZpaClient, state: &ResourceState) -> Result<Outcome, ProviderError> {
    let resource = provider.resource(&state.resource_type)?;

    let mut data = ResourceData::from_state(state.id.clone(), state.attributes.clone());
    let outcome = resource.read(client, &mut data)?;

    Ok(Outcome::from_data(&state.resource_type, outcome, data))
}

/// Delete the resource; returns any warnings raised
pub fn destroy(provider: &Provider, client: &ZpaClient, state: &ResourceState) -> Result<Vec<Diagnostic>, ProviderError> {
    let resource = provider.resource(&state.resource_type)?;

    let mut data = ResourceData::from_state(state.id.clone(), state.attributes.clone());
    resource.delete(client, &mut data)?;

    Ok(data.take_warnings())
}

/// Adopt an existing record by identifier (or name, where supported)
pub fn import(provider: &Provider, client: &ZpaClient, resource_type: &str, id: &str) -> Result<Outcome, ProviderError> {
    let resource = provider.resource(resource_type)?;

    if id.is_empty() {
        return Err(ProviderError::Validation(format!(
            "an id is required to import {}",
            resource_type
        )));
    }

    let mut data = ResourceData::from_state(id, Map::new());
    let outcome = resource.import(client, &mut data)?;

    Ok(Outcome::from_data(resource_type, outcome, data))
}

/// Look up an existing object through a data source
pub fn read_data_source(
    provider: &Provider,
    client: &ZpaClient,
    type_name: &str,
    config: Map<String, Value>,
) -> Result<ResourceState, ProviderError> {
    let data_source = provider.data_source(type_name)?;
    check_config(&data_source.schema(), &config)?;

    let mut data = ResourceData::new(config);
    data_source.read(client, &mut data)?;

    Ok(ResourceState {
        resource_type: type_name.to_string(),
        id: data.id().to_string(),
        attributes: data.into_state(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Method;
    use crate::resources::testing::{config, setup};
    use serde_json::json;

    const CONTROLS: &str = "zpa_inspection_custom_controls";

    fn control() -> Map<String, Value> {
        config(json!({
            "name": "ctrl1",
            "action": "BLOCK",
            "type": "REQUEST",
            "severity": "CRITICAL",
            "paranoia_level": "1"
        }))
    }

    #[test]
    fn test_apply_creates_then_updates() {
        let (mock, client) = setup();
        let provider = Provider::new();

        let created = apply(&provider, &client, CONTROLS, control(), None).unwrap();
        let state = created.state.unwrap();
        assert_eq!(state.resource_type, CONTROLS);
        assert!(!state.id.is_empty());
        assert_eq!(state.attributes["name"], "ctrl1");

        let mut changed = control();
        changed.insert("action".to_string(), json!("PASS"));
        let updated = apply(&provider, &client, CONTROLS, changed, Some(&state)).unwrap();

        let updated = updated.state.unwrap();
        assert_eq!(updated.id, state.id);
        assert_eq!(updated.attributes["action"], "PASS");

        let path = client.mgmt_path(&format!("/inspectionControls/custom/{}", state.id));
        assert_eq!(mock.requests_matching(Method::Put, &path), 1);
    }

    #[test]
    fn test_apply_clears_removed_optional_attribute() {
        let (mock, client) = setup();
        let provider = Provider::new();

        let mut described = control();
        described.insert("description".to_string(), json!("old text"));
        let created = apply(&provider, &client, CONTROLS, described, None).unwrap();
        let state = created.state.unwrap();
        assert_eq!(state.attributes["description"], "old text");

        let updated = apply(&provider, &client, CONTROLS, control(), Some(&state)).unwrap();

        let put = mock
            .mutations()
            .into_iter()
            .rfind(|r| r.method == Method::Put)
            .unwrap();
        let body = put.body.unwrap();
        assert!(body.get("description").is_none());
        assert_eq!(body["name"], "ctrl1");

        let updated = updated.state.unwrap();
        assert_eq!(updated.id, state.id);
        assert_eq!(
            updated.attributes.get("description").and_then(Value::as_str).unwrap_or_default(),
            ""
        );
    }

    #[test]
    fn test_apply_rejects_invalid_config_before_any_request() {
        let (mock, client) = setup();
        let mut bad = control();
        bad.remove("name");
        bad.insert("action".to_string(), json!("EXPLODE"));

        let err = apply(&Provider::new(), &client, CONTROLS, bad, None).unwrap_err();

        match err {
            ProviderError::InvalidConfig(diags) => assert_eq!(diags.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_apply_rejects_mismatched_state() {
        let (mock, client) = setup();
        let prior = ResourceState {
            resource_type: "zpa_inspection_profile".to_string(),
            id: "1".to_string(),
            attributes: Map::new(),
        };

        let err = apply(&Provider::new(), &client, CONTROLS, control(), Some(&prior)).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_refresh_and_destroy() {
        let (_, client) = setup();
        let provider = Provider::new();
        let state = apply(&provider, &client, CONTROLS, control(), None)
            .unwrap()
            .state
            .unwrap();

        let refreshed = refresh(&provider, &client, &state).unwrap();
        assert_eq!(refreshed.state.as_ref().map(|s| s.id.as_str()), Some(state.id.as_str()));

        destroy(&provider, &client, &state).unwrap();

        let gone = refresh(&provider, &client, &state).unwrap();
        assert!(gone.is_gone());

        // a second destroy of a vanished record is not an error
        assert!(destroy(&provider, &client, &state).unwrap().is_empty());
    }

    #[test]
    fn test_import_by_name() {
        let (mock, client) = setup();
        let id = mock.insert(
            &client.mgmt_path("/inspectionProfile"),
            json!({"name": "Default-Profile", "paranoiaLevel": "2"}),
        );

        let outcome = import(&Provider::new(), &client, "zpa_inspection_profile", "default-profile").unwrap();

        let state = outcome.state.unwrap();
        assert_eq!(state.id, id);
        assert_eq!(state.attributes["paranoia_level"], "2");
    }

    #[test]
    fn test_import_requires_id() {
        let (_, client) = setup();
        let err = import(&Provider::new(), &client, CONTROLS, "").unwrap_err();
        assert_eq!(err.to_string(), "an id is required to import zpa_inspection_custom_controls");
    }

    #[test]
    fn test_read_data_source() {
        let (mock, client) = setup();
        mock.insert_at(
            &client.mgmt_path("/policySet/policyType/ISOLATION_POLICY"),
            json!({"id": "72058304855015574", "name": "Isolation_Policy"}),
        );

        let state = read_data_source(
            &Provider::new(),
            &client,
            "zpa_policy_type",
            config(json!({"policy_type": "ISOLATION_POLICY"})),
        )
        .unwrap();

        assert_eq!(state.id, "72058304855015574");
        assert_eq!(state.attributes["name"], "Isolation_Policy");
    }

    #[test]
    fn test_validate_falls_back_to_data_source() {
        let provider = Provider::new();

        let warnings = validate(&provider, "zpa_policy_type", &config(json!({"policy_type": "ACCESS_POLICY"})))
            .unwrap();
        assert!(warnings.is_empty());

        let err = validate(&provider, "zpa_nope", &Map::new()).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResourceType(_)));
    }

    #[test]
    fn test_state_serializes_with_type_key() {
        let state = ResourceState {
            resource_type: CONTROLS.to_string(),
            id: "1".to_string(),
            attributes: Map::new(),
        };

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value, json!({"type": CONTROLS, "id": "1", "attributes": {}}));

        let parsed: ResourceState = serde_json::from_str(r#"{"type": "x", "id": "2"}"#).unwrap();
        assert!(parsed.attributes.is_empty());
    }
}

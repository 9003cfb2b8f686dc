//! Registry of every resource and data source the provider exposes.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::ProviderError;
use crate::resources::{
    DataSource, InspectionCustomControlsDataSource, InspectionCustomControlsResource,
    InspectionProfileDataSource, InspectionProfileResource, MicroTenantControllerResource,
    MicroTenantDataSource, PolicyAccessIsolationRuleResource, PolicyTypeDataSource, Resource,
};
use crate::schema::Schema;

/// Serialisable description of everything the provider supports
#[derive(Debug, Serialize)]
pub struct ProviderSchema {
    pub resources: BTreeMap<String, Schema>,
    pub data_sources: BTreeMap<String, Schema>,
}

/// Lookup of resources and data sources by type name
pub struct Provider {
    resources: HashMap<String, Arc<dyn Resource>>,
    data_sources: HashMap<String, Arc<dyn DataSource>>,
}

impl Provider {
    /// Create a provider with all built-in resources and data sources
    pub fn new() -> Self {
        let mut provider = Self {
            resources: HashMap::new(),
            data_sources: HashMap::new(),
        };

        provider.register_resource(Arc::new(InspectionCustomControlsResource));
        provider.register_resource(Arc::new(InspectionProfileResource));
        provider.register_resource(Arc::new(PolicyAccessIsolationRuleResource));
        provider.register_resource(Arc::new(MicroTenantControllerResource));

        provider.register_data_source(Arc::new(InspectionCustomControlsDataSource));
        provider.register_data_source(Arc::new(InspectionProfileDataSource));
        provider.register_data_source(Arc::new(MicroTenantDataSource));
        provider.register_data_source(Arc::new(PolicyTypeDataSource));

        provider
    }

    pub fn register_resource(&mut self, resource: Arc<dyn Resource>) {
        self.resources
            .insert(resource.type_name().to_string(), resource);
    }

    pub fn register_data_source(&mut self, data_source: Arc<dyn DataSource>) {
        self.data_sources
            .insert(data_source.type_name().to_string(), data_source);
    }

    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>, ProviderError> {
        self.resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))
    }

    pub fn data_source(&self, type_name: &str) -> Result<Arc<dyn DataSource>, ProviderError> {
        self.data_sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownDataSource(type_name.to_string()))
    }

    /// Sorted resource type names
    pub fn resource_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Sorted data source type names
    pub fn data_source_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.data_sources.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn schemas(&self) -> ProviderSchema {
        ProviderSchema {
            resources: self
                .resources
                .iter()
                .map(|(name, r)| (name.clone(), r.schema()))
                .collect(),
            data_sources: self
                .data_sources
                .iter()
                .map(|(name, d)| (name.clone(), d.schema()))
                .collect(),
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtins_registered() {
        let provider = Provider::new();

        assert_eq!(
            provider.resource_types(),
            vec![
                "zpa_inspection_custom_controls",
                "zpa_inspection_profile",
                "zpa_microtenant_controller",
                "zpa_policy_access_isolation_rule",
            ]
        );
        assert_eq!(
            provider.data_source_types(),
            vec![
                "zpa_inspection_custom_controls",
                "zpa_inspection_profile",
                "zpa_microtenant_controller",
                "zpa_policy_type",
            ]
        );
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let provider = Provider::new();

        let err = provider.resource("zpa_app_segment").err().unwrap();
        assert_eq!(err.to_string(), "unknown resource type 'zpa_app_segment'");

        let err = provider.data_source("zpa_nope").err().unwrap();
        assert_eq!(err.to_string(), "unknown data source 'zpa_nope'");
    }

    #[test]
    fn test_schemas_serialize() {
        let value = serde_json::to_value(Provider::new().schemas()).unwrap();

        let rule = &value["resources"]["zpa_policy_access_isolation_rule"]["attributes"];
        assert_eq!(rule["action"]["allowed_values"][0], "ISOLATE");
        assert_eq!(value["data_sources"]["zpa_policy_type"]["attributes"]["id"]["computed"], true);
    }
}

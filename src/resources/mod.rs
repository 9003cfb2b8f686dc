//! Resources and data sources: schema, expand/flatten and CRUD orchestration.
//!
//! Every operation receives the [`ZpaClient`] explicitly and a [`ResourceData`]
//! holding the desired configuration and the stored state. Reads report
//! [`ReadOutcome::Gone`] instead of failing when the record no longer exists.

pub mod common;
pub mod inspection_custom_controls;
pub mod inspection_profile;
pub mod microtenant_controller;
pub mod policy_access_isolation_rule;
pub mod policy_type;

use tracing::warn;

use crate::client::{ApiError, ZpaClient};
use crate::error::ProviderError;
use crate::schema::{ResourceData, Schema};

pub use inspection_custom_controls::{InspectionCustomControlsDataSource, InspectionCustomControlsResource};
pub use inspection_profile::{InspectionProfileDataSource, InspectionProfileResource};
pub use microtenant_controller::{MicroTenantControllerResource, MicroTenantDataSource};
pub use policy_access_isolation_rule::PolicyAccessIsolationRuleResource;
pub use policy_type::PolicyTypeDataSource;

/// Result of an operation that ends by reading the record back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// State was refreshed from the server
    Found,
    /// The record no longer exists; the identifier has been cleared
    Gone,
}

/// Result of fetching a record that may have been deleted out of band
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    Gone,
}

/// Map only the typed "object not found" answer to [`Lookup::Gone`]
pub fn lookup<T>(result: Result<T, ApiError>) -> Result<Lookup<T>, ProviderError> {
    match result {
        Ok(record) => Ok(Lookup::Found(record)),
        Err(err) if err.is_object_not_found() => Ok(Lookup::Gone),
        Err(err) => Err(err.into()),
    }
}

/// Forget a record that disappeared server-side
pub(crate) fn mark_gone(data: &mut ResourceData, kind: &str) -> ReadOutcome {
    warn!(
        "Removing {} {} from state because it no longer exists in ZPA",
        kind,
        data.id()
    );
    data.clear_id();
    ReadOutcome::Gone
}

/// A managed ZPA object with a full lifecycle
pub trait Resource: Send + Sync {
    /// Name used in configuration, e.g. `zpa_inspection_profile`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Expand the configuration, create the record and read it back
    fn create(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError>;

    /// Refresh the state from the server
    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError>;

    /// Replace the record with the expanded configuration and read it back
    fn update(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError>;

    /// Delete the record and clear the identifier
    fn delete(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError>;

    /// Adopt an existing record; `data` carries the import id
    fn import(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<ReadOutcome, ProviderError> {
        self.read(client, data)
    }
}

/// A read-only lookup of an existing ZPA object
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn read(&self, client: &ZpaClient, data: &mut ResourceData) -> Result<(), ProviderError>;
}

/// True for identifiers the API issues (numeric), false for names
pub(crate) fn is_numeric_id(value: &str) -> bool {
    value.parse::<i64>().is_ok()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ErrorResponse, Method};
    use serde_json::Map;

    #[test]
    fn test_lookup_maps_only_not_found_to_gone() {
        let found = lookup::<u32>(Ok(7)).unwrap();
        assert!(matches!(found, Lookup::Found(7)));

        let gone = lookup::<u32>(Err(ErrorResponse::new(Method::Get, "/x/1", 404, "").into())).unwrap();
        assert!(matches!(gone, Lookup::Gone));

        let err = lookup::<u32>(Err(ErrorResponse::new(Method::Get, "/x/1", 500, "boom").into()))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api(_)));
    }

    #[test]
    fn test_mark_gone_clears_id() {
        let mut data = ResourceData::from_state("42", Map::new());

        assert_eq!(mark_gone(&mut data, "thing"), ReadOutcome::Gone);
        assert!(data.id().is_empty());
    }

    #[test]
    fn test_is_numeric_id() {
        assert!(is_numeric_id("216196257331282583"));
        assert!(!is_numeric_id("my-profile"));
        assert!(!is_numeric_id(""));
    }
}

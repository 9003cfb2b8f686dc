//! Customer-scoped REST client for the ZPA management API.
//!
//! The [`ZpaClient`] is the explicit handle every service and resource operation
//! receives. It owns a [`Transport`] (real or mocked), builds
//! `/mgmtconfig/v1/admin/customers/{customerID}/...` paths, maps non-2xx answers
//! to [`ApiError`] and walks paginated listings.

pub mod error;
#[cfg(test)]
pub mod mock;
pub mod pagination;
pub mod transport;

pub use error::{ApiError, ErrorResponse};
pub use pagination::{ListPage, Pagination};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::services::{
    InspectionCustomControlService, InspectionProfileService, MicroTenantService,
    PolicySetControllerService,
};

const MGMT_CONFIG: &str = "/mgmtconfig/v1/admin/customers/";

/// Handle to one ZPA customer tenant
#[derive(Clone)]
pub struct ZpaClient {
    transport: Arc<dyn Transport>,
    customer_id: String,
}

impl ZpaClient {
    /// Create a client with the real HTTP transport
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config)?;

        Ok(Self {
            transport: Arc::new(transport),
            customer_id: config.customer_id().to_string(),
        })
    }

    /// Create a client over any transport (used by tests)
    pub fn with_transport(customer_id: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            customer_id: customer_id.into(),
        }
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Absolute path of a customer-scoped endpoint, e.g. `/inspectionProfile`
    pub fn mgmt_path(&self, endpoint: &str) -> String {
        format!("{}{}{}", MGMT_CONFIG, self.customer_id, endpoint)
    }

    pub fn inspection_custom_controls(&self) -> InspectionCustomControlService<'_> {
        InspectionCustomControlService::new(self)
    }

    pub fn inspection_profile(&self) -> InspectionProfileService<'_> {
        InspectionProfileService::new(self)
    }

    pub fn policy_set_controller(&self) -> PolicySetControllerService<'_> {
        PolicySetControllerService::new(self)
    }

    pub fn microtenants(&self) -> MicroTenantService<'_> {
        MicroTenantService::new(self)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self.transport.send(&request)?;
        response.error_for(&request)
    }

    fn decode<T: DeserializeOwned>(path: &str, response: &HttpResponse) -> Result<T, ApiError> {
        serde_json::from_str(&response.body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
        serde_json::to_value(body).map_err(ApiError::Encode)
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_with_query(path, Vec::new())
    }

    pub fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let response = self.send(HttpRequest::new(Method::Get, path).with_query(query))?;
        Self::decode(path, &response)
    }

    pub fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let request = HttpRequest::new(Method::Post, path).with_body(Self::encode(body)?);
        let response = self.send(request)?;
        Self::decode(path, &response)
    }

    pub fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let request = HttpRequest::new(Method::Put, path).with_body(Self::encode(body)?);
        self.send(request)?;
        Ok(())
    }

    /// PUT without a body (used by reorder)
    pub fn put_empty(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpRequest::new(Method::Put, path))?;
        Ok(())
    }

    pub fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpRequest::new(Method::Delete, path))?;
        Ok(())
    }

    pub fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        pagination: &Pagination,
    ) -> Result<ListPage<T>, ApiError> {
        self.get_with_query(path, pagination.to_query())
    }

    /// Every record of a listing, walking pages 1..=totalPages
    pub fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        search: Option<&str>,
    ) -> Result<Vec<T>, ApiError> {
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let pagination = Pagination::new(page).with_search(search);
            let listing: ListPage<T> = self.get_page(path, &pagination)?;
            let page_count = listing.page_count();
            records.extend(listing.list);

            if u64::from(page) >= page_count {
                break;
            }

            page += 1;
        }

        Ok(records)
    }

    /// First record in listing order matching `predicate`, stopping at the first page that has one
    pub fn find_first<T, F>(
        &self,
        path: &str,
        search: Option<&str>,
        predicate: F,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let mut page = 1;

        loop {
            let pagination = Pagination::new(page).with_search(search);
            let listing: ListPage<T> = self.get_page(path, &pagination)?;
            let page_count = listing.page_count();

            if let Some(found) = listing.list.into_iter().find(|item| predicate(item)) {
                return Ok(Some(found));
            }

            if u64::from(page) >= page_count {
                return Ok(None);
            }

            page += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Named {
        id: String,
        name: String,
    }

    fn client_with(mock: &Arc<MockTransport>) -> ZpaClient {
        ZpaClient::with_transport("123", mock.clone())
    }

    #[test]
    fn test_mgmt_path() {
        let client = client_with(&Arc::new(MockTransport::new()));
        assert_eq!(
            client.mgmt_path("/inspectionProfile"),
            "/mgmtconfig/v1/admin/customers/123/inspectionProfile"
        );
    }

    #[test]
    fn test_get_maps_not_found() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        let err = client
            .get::<Named>("/mgmtconfig/v1/admin/customers/123/things/1")
            .unwrap_err();
        assert!(err.is_object_not_found());
    }

    #[test]
    fn test_get_all_pages_walks_every_page() {
        let mock = Arc::new(MockTransport::new().with_page_size(2));
        let client = client_with(&mock);
        let path = client.mgmt_path("/things");

        for name in ["a", "b", "c", "d", "e"] {
            mock.insert(&path, json!({ "name": name }));
        }

        let all: Vec<Named> = client.get_all_pages(&path, None).unwrap();
        let names: Vec<&str> = all.iter().map(|n| n.name.as_str()).collect();

        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(mock.requests_matching(Method::Get, &path), 3);
    }

    #[test]
    fn test_find_first_stops_at_first_matching_page() {
        let mock = Arc::new(MockTransport::new().with_page_size(2));
        let client = client_with(&mock);
        let path = client.mgmt_path("/things");

        for name in ["a", "b", "target", "d", "e", "f"] {
            mock.insert(&path, json!({ "name": name }));
        }

        let found: Option<Named> = client
            .find_first(&path, None, |n: &Named| n.name == "target")
            .unwrap();

        assert_eq!(found.unwrap().name, "target");
        assert_eq!(mock.requests_matching(Method::Get, &path), 2);
    }

    #[test]
    fn test_find_first_returns_none_after_last_page() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        let path = client.mgmt_path("/things");
        mock.insert(&path, json!({ "name": "a" }));

        let found: Option<Named> = client
            .find_first(&path, Some("zzz"), |n: &Named| n.name == "zzz")
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_post_returns_created_record() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);
        let path = client.mgmt_path("/things");

        let created: Named = client.post(&path, &json!({ "name": "new" })).unwrap();
        assert!(!created.id.is_empty());

        let fetched: Named = client.get(&format!("{}/{}", path, created.id)).unwrap();
        assert_eq!(fetched.name, "new");
    }

    #[test]
    fn test_decode_failure_is_reported() {
        let mock = Arc::new(MockTransport::new());
        mock.route(Method::Get, "/broken", HttpResponse::new(200, "not json"));
        let client = client_with(&mock);

        let err = client.get::<Named>("/broken").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}

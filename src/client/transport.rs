use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use url::Url;

use super::error::{ApiError, ErrorResponse};
use super::pagination::lenient_u64;
use crate::config::ProviderConfig;

const SIGNIN_PATH: &str = "/signin";
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// HTTP verbs used by the management API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request against the management API
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute path below the cloud base URL
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw answer from the API; status interpretation is left to the client
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Convert a non-2xx answer into the typed error response
    pub fn error_for(self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        if self.is_success() {
            return Ok(self);
        }

        Err(ErrorResponse::new(request.method, request.path.clone(), self.status, self.body).into())
    }
}

/// Sends requests to the API, allowing for mocking in tests
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[derive(Deserialize)]
struct SignInResponse {
    access_token: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    expires_in: Option<u64>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Real transport using blocking reqwest with OAuth client-credentials sign-in
pub struct ReqwestTransport {
    http: reqwest::blocking::Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    max_retries: u32,
    retry_delay: Duration,
    token: Mutex<Option<AccessToken>>,
}

impl ReqwestTransport {
    /// Build a transport from validated provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ApiError> {
        let base_url = config.resolve_base_url().map_err(|e| ApiError::Transport {
            path: String::new(),
            message: e.to_string(),
        })?;

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("zpa-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport {
                path: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            client_id: config.client_id.clone().unwrap_or_default(),
            client_secret: config.client_secret.clone().unwrap_or_default(),
            max_retries: config.max_retries,
            retry_delay: DEFAULT_RETRY_DELAY,
            token: Mutex::new(None),
        })
    }

    /// Override the base delay between retries of throttled requests
    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::Transport {
            path: path.to_string(),
            message: format!("invalid request URL: {}", e),
        })
    }

    fn sign_in(&self) -> Result<AccessToken, ApiError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(ApiError::Authentication(
                "client_id and client_secret are required".to_string(),
            ));
        }

        let url = self.url_for(SIGNIN_PATH)?;
        tracing::debug!(url = %url, "signing in to ZPA");

        let response = self
            .http
            .post(url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .map_err(|e| ApiError::Authentication(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::Authentication(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Authentication(format!(
                "sign-in returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let signin: SignInResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::Authentication(format!("unexpected sign-in response: {}", e))
        })?;

        if signin.access_token.is_empty() {
            return Err(ApiError::Authentication("empty access token".to_string()));
        }

        let lifetime = signin
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);

        Ok(AccessToken {
            value: signin.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        })
    }

    fn bearer_token(&self) -> Result<String, ApiError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| ApiError::Authentication("token cache poisoned".to_string()))?;

        if let Some(token) = guard.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let token = self.sign_in()?;
        let value = token.value.clone();
        *guard = Some(token);

        Ok(value)
    }

    fn invalidate_token(&self) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = None;
        }
    }

    fn execute(
        &self,
        request: &HttpRequest,
        token: &str,
    ) -> Result<(HttpResponse, Option<Duration>), ApiError> {
        let url = self.url_for(&request.path)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .query(&request.query);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| ApiError::Transport {
            path: request.path.clone(),
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.text().map_err(|e| ApiError::Transport {
            path: request.path.clone(),
            message: e.to_string(),
        })?;

        Ok((HttpResponse::new(status, body), retry_after))
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut attempt: u32 = 0;
        let mut reauthenticated = false;

        loop {
            let token = self.bearer_token()?;
            tracing::debug!(method = %request.method, path = %request.path, "sending request");
            let (response, retry_after) = self.execute(request, &token)?;

            match response.status {
                401 if !reauthenticated => {
                    tracing::debug!("token rejected, signing in again");
                    self.invalidate_token();
                    reauthenticated = true;
                }
                429 | 503 if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = retry_after.unwrap_or(self.retry_delay * attempt);
                    tracing::warn!(
                        status = response.status,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "request throttled, retrying"
                    );
                    thread::sleep(delay);
                }
                _ => return Ok(response),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::{DELETE, GET, MockServer, POST};
    use serde_json::json;

    fn config_for(server: &MockServer) -> ProviderConfig {
        ProviderConfig {
            client_id: Some("client".to_string()),
            client_secret: Some("secret".to_string()),
            customer_id: Some("123".to_string()),
            base_url: Some(server.base_url()),
            max_retries: 2,
            ..ProviderConfig::default()
        }
    }

    fn mock_signin(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(POST).path("/signin");
            then.status(200).json_body(json!({
                "token_type": "Bearer",
                "access_token": "token-1",
                "expires_in": "3600"
            }));
        })
    }

    #[test]
    fn test_signs_in_and_sends_bearer_token() {
        let server = MockServer::start();
        let signin = mock_signin(&server);
        let get = server.mock(|when, then| {
            when.method(GET)
                .path("/mgmtconfig/v1/admin/customers/123/inspectionProfile/1")
                .header("authorization", "Bearer token-1");
            then.status(200).json_body(json!({"id": "1", "name": "profile"}));
        });

        let transport = ReqwestTransport::new(&config_for(&server)).unwrap();
        let request = HttpRequest::new(
            Method::Get,
            "/mgmtconfig/v1/admin/customers/123/inspectionProfile/1",
        );

        let first = transport.send(&request).unwrap();
        let second = transport.send(&request).unwrap();

        assert_eq!(first.status, 200);
        assert!(second.body.contains("profile"));
        signin.assert_calls(1);
        get.assert_calls(2);
    }

    #[test]
    fn test_passes_query_parameters() {
        let server = MockServer::start();
        mock_signin(&server);
        let list = server.mock(|when, then| {
            when.method(GET)
                .path("/mgmtconfig/v1/admin/customers/123/microtenants")
                .query_param("search", "tenant")
                .query_param("page", "1");
            then.status(200).json_body(json!({"totalPages": "1", "list": []}));
        });

        let transport = ReqwestTransport::new(&config_for(&server)).unwrap();
        let request = HttpRequest::new(Method::Get, "/mgmtconfig/v1/admin/customers/123/microtenants")
            .with_query(vec![
                ("page".to_string(), "1".to_string()),
                ("search".to_string(), "tenant".to_string()),
            ]);

        let response = transport.send(&request).unwrap();
        assert!(response.is_success());
        list.assert();
    }

    #[test]
    fn test_not_found_is_returned_as_response() {
        let server = MockServer::start();
        mock_signin(&server);
        server.mock(|when, then| {
            when.method(DELETE).path("/gone/1");
            then.status(404)
                .json_body(json!({"id": "resource.not.found", "reason": "gone"}));
        });

        let transport = ReqwestTransport::new(&config_for(&server)).unwrap();
        let request = HttpRequest::new(Method::Delete, "/gone/1");
        let response = transport.send(&request).unwrap();

        assert_eq!(response.status, 404);
        let err = response.error_for(&request).unwrap_err();
        assert!(err.is_object_not_found());
    }

    #[test]
    fn test_retries_throttled_requests() {
        let server = MockServer::start();
        mock_signin(&server);
        let throttled = server.mock(|when, then| {
            when.method(GET).path("/busy");
            then.status(429).body("slow down");
        });

        let transport = ReqwestTransport::new(&config_for(&server))
            .unwrap()
            .with_retry_delay(Duration::from_millis(1));
        let response = transport
            .send(&HttpRequest::new(Method::Get, "/busy"))
            .unwrap();

        assert_eq!(response.status, 429);
        // initial attempt plus max_retries
        throttled.assert_calls(3);
    }

    #[test]
    fn test_sign_in_failure_is_authentication_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/signin");
            then.status(401).body("bad credentials");
        });

        let transport = ReqwestTransport::new(&config_for(&server)).unwrap();
        let err = transport
            .send(&HttpRequest::new(Method::Get, "/anything"))
            .unwrap_err();

        assert!(matches!(err, ApiError::Authentication(_)));
    }

    #[test]
    fn test_missing_credentials_fail_before_request() {
        let server = MockServer::start();
        let mut config = config_for(&server);
        config.client_secret = None;

        let transport = ReqwestTransport::new(&config).unwrap();
        let err = transport
            .send(&HttpRequest::new(Method::Get, "/anything"))
            .unwrap_err();

        assert!(err.to_string().contains("client_secret"));
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation
//!
//! Every call runs as its own pipeline:
//!
//! ```text
//! created -> [crumb pre-flight] -> dispatched -> settled
//! ```
//!
//! The pre-flight only happens for POSTs that carry `Authorization` but no
//! crumb header. It never fails the call: whatever goes wrong there is logged
//! and the main request goes out without a crumb. The abort flag is checked
//! right before dispatch, and an abort during dispatch drops the transport
//! future.

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::crumb::{self, Crumb, CRUMB_ISSUER_PATH, DEFAULT_CRUMB_FIELD};
use super::handle::RequestHandle;
use super::headers::Headers;
use super::request::{PostRequest, Request};
use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Whole-request timeout; `None` leaves it to the transport
    pub timeout: Option<Duration>,
    /// Maximum redirects to follow; `0` hands redirects back to the caller
    pub max_redirects: usize,
    /// Crumb header name, used when the issuer does not name one
    pub crumb_field: String,
    /// Crumb issuer path, relative to the server origin
    pub crumb_issuer_path: String,
    /// Headers sent with every request, below per-request headers
    pub default_headers: Headers,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            max_redirects: 10,
            crumb_field: DEFAULT_CRUMB_FIELD.to_string(),
            crumb_issuer_path: CRUMB_ISSUER_PATH.to_string(),
            default_headers: Headers::new(),
        }
    }
}

impl HttpClientConfig {
    /// Create a new client config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set max redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the crumb header name
    pub fn crumb_field(mut self, field: impl Into<String>) -> Self {
        self.crumb_field = field.into();
        self
    }

    /// Set the crumb issuer path
    pub fn crumb_issuer_path(mut self, path: impl Into<String>) -> Self {
        self.crumb_issuer_path = path.into();
        self
    }

    /// Add a default header.
    ///
    /// A default `Authorization` counts when deciding whether a POST needs a
    /// crumb.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers = self.default_headers.with(name, value);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.crumb_field.trim().is_empty() {
            return Err(Error::Config("crumb field must not be empty".to_string()));
        }
        if !self.crumb_issuer_path.starts_with('/') {
            return Err(Error::Config(format!(
                "crumb issuer path must start with '/': {}",
                self.crumb_issuer_path
            )));
        }
        Ok(())
    }
}

/// HTTP client for build-server APIs
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        config.validate()?;

        let redirect = match config.max_redirects {
            0 => Policy::none(),
            max => Policy::limited(max),
        };
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(redirect)
            .default_headers(config.default_headers.to_header_map()?);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Start a GET request.
    ///
    /// The handle resolves to the body for 2xx and 302 responses. Outside a
    /// tokio runtime the handle fails with [`Error::Other`].
    pub fn get(&self, url: impl AsRef<str>, headers: Headers) -> RequestHandle {
        let request = Request::get(url).map(|r| r.headers(headers));
        let client = self.clone();
        RequestHandle::spawn(move |token| async move {
            let request = request?;
            client.dispatch(request, &token).await
        })
    }

    /// Start a POST request, negotiating a crumb first when needed.
    ///
    /// Outside a tokio runtime the handle fails with [`Error::Other`].
    pub fn post(&self, request: impl Into<PostRequest>) -> RequestHandle {
        let request = request.into().resolve();
        let client = self.clone();
        RequestHandle::spawn(move |token| async move {
            let mut request = request?;

            let effective = client.config.default_headers.clone().merged(&request.headers);
            if crumb::needs_crumb(&effective, &client.config.crumb_field) {
                if let Some(issued) = client
                    .fetch_crumb(&request.url, &request.headers, &token)
                    .await
                {
                    request.headers = issued.apply(request.headers);
                }
            }

            client.dispatch(request, &token).await
        })
    }

    /// Fetch a crumb for the server hosting `url`.
    ///
    /// Returns `None` on any failure, including abort. A parsed issuer
    /// answer is returned even without a crumb value, so its session cookie
    /// still reaches the main request.
    pub async fn fetch_crumb(
        &self,
        url: &Url,
        headers: &Headers,
        token: &CancellationToken,
    ) -> Option<Crumb> {
        match self.try_fetch_crumb(url, headers, token).await {
            Ok(crumb) => {
                tracing::debug!(
                    field = %crumb.field,
                    crumb = crumb.value.is_some(),
                    cookie = crumb.cookie.is_some(),
                    "Crumb issuer answered"
                );
                Some(crumb)
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Crumb pre-flight failed, continuing without crumb");
                None
            }
        }
    }

    async fn try_fetch_crumb(
        &self,
        url: &Url,
        headers: &Headers,
        token: &CancellationToken,
    ) -> Result<Crumb> {
        let issuer = crumb::issuer_url(url, &self.config.crumb_issuer_path)?;
        let request = Request::get(issuer.as_str())?.headers(headers.clone());
        let response = self.execute(request, token).await?;

        if !response.is_success() {
            return Err(Error::http(response.status_code(), response.body));
        }
        Crumb::from_response(&response, &self.config.crumb_field)
    }

    /// Send the main request and settle it
    async fn dispatch(&self, request: Request, token: &CancellationToken) -> Result<String> {
        if token.is_cancelled() {
            tracing::debug!(url = %request.url, "Aborted before dispatch");
            return Err(Error::Aborted);
        }

        tracing::debug!(method = %request.method, url = %request.url, "Dispatching request");
        self.execute(request, token).await?.into_text()
    }

    /// Execute a request without checking its status.
    ///
    /// Fails with [`Error::Aborted`] if `token` is cancelled before the body
    /// has been read.
    pub async fn execute(&self, request: Request, token: &CancellationToken) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.to_header_map()?);

        if let Some(body) = &request.body {
            builder = builder.body(body.to_bytes());
        }

        let exchange = async move {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let url = response.url().clone();
            let body = response.text().await?;
            Ok::<_, Error>(Response::new(status, headers, body, url))
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Aborted),
            result = exchange => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::{PostOptions, RequestOptions};
    use wiremock::matchers::{body_string, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AUTH: &str = "Basic YWRtaW46YWRtaW4=";

    fn client() -> HttpClient {
        HttpClient::new().unwrap()
    }

    fn crumb_body() -> serde_json::Value {
        serde_json::json!({
            "_class": "hudson.security.csrf.DefaultCrumbIssuer",
            "crumb": "C",
            "crumbRequestField": "Jenkins-Crumb"
        })
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.config().user_agent, DEFAULT_USER_AGENT);
        assert_eq!(client.config().crumb_field, DEFAULT_CRUMB_FIELD);
        assert!(client.config().timeout.is_none());
    }

    #[test]
    fn test_config_validation() {
        let err = HttpClient::with_config(HttpClientConfig::new().crumb_field(" ")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err =
            HttpClient::with_config(HttpClientConfig::new().crumb_issuer_path("crumb")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_get_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/json"))
            .and(query_param("tree", "jobs[name]"))
            .and(header("authorization", AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"jobs":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .get(
                format!("{}/api/json?tree=jobs%5Bname%5D", server.uri()),
                Headers::new().with("Authorization", AUTH),
            )
            .await
            .unwrap();

        assert_eq!(body, r#"{"jobs":[]}"#);
    }

    #[tokio::test]
    async fn test_get_never_fetches_crumb() {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(crumb_body()))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let body = client()
            .get(format!("{}/x", server.uri()), Headers::new().with("Authorization", AUTH))
            .await
            .unwrap();
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such job"))
            .mount(&server)
            .await;

        let err = client()
            .get(format!("{}/missing", server.uri()), Headers::new())
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.body(), Some("no such job"));
    }

    #[tokio::test]
    async fn test_unfollowed_302_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/job/x/build"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", "/queue/item/1/")
                    .set_body_string("queued"),
            )
            .mount(&server)
            .await;

        let client = HttpClient::with_config(HttpClientConfig::new().max_redirects(0)).unwrap();
        let body = client
            .post(format!("{}/job/x/build", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "queued");
    }

    #[tokio::test]
    async fn test_post_negotiates_crumb() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/crumbIssuer/api/json"))
            .and(header("authorization", AUTH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "JSESSIONID.1=abc; Path=/; HttpOnly")
                    .set_body_json(crumb_body()),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .and(header("jenkins-crumb", "C"))
            .and(header("cookie", "JSESSIONID.1=abc; Path=/; HttpOnly"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("a=1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .post(
                PostOptions::new(format!("{}/x", server.uri()))
                    .form([("a", "1")])
                    .header("Authorization", AUTH),
            )
            .await
            .unwrap();

        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_crumb_uses_issued_field_name() {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"crumb": "C2", "crumbRequestField": ".crumb"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/scriptText"))
            .and(header(".crumb", "C2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Result: 2\n"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .post(PostRequest::to(
                format!("{}/scriptText", server.uri()),
                RequestOptions::new()
                    .header("authorization", AUTH)
                    .form([("script", "println(1+1)")]),
            ))
            .await
            .unwrap();

        assert_eq!(body, "Result: 2\n");
    }

    #[tokio::test]
    async fn test_existing_crumb_skips_preflight() {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(crumb_body()))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .and(header("jenkins-crumb", "mine"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        client()
            .post(
                PostOptions::new(format!("{}/x", server.uri()))
                    .header("Authorization", AUTH)
                    .header("JENKINS-CRUMB", "mine"),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_auth_skips_preflight() {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(crumb_body()))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .post(PostOptions::new(format!("{}/x", server.uri())).body("raw"))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    async fn assert_main_request_sent_without_crumb(crumb_response: ResponseTemplate) {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(crumb_response)
            .expect(1)
            .mount(&server)
            .await;
        // Mounted first so it wins over the plain POST mock
        Mock::given(method("POST"))
            .and(path("/x"))
            .and(header_exists("jenkins-crumb"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .post(PostOptions::new(format!("{}/x", server.uri())).header("Authorization", AUTH))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_crumb_error_status_is_ignored() {
        assert_main_request_sent_without_crumb(ResponseTemplate::new(404).set_body_string("nope"))
            .await;
    }

    #[tokio::test]
    async fn test_malformed_crumb_is_ignored() {
        assert_main_request_sent_without_crumb(
            ResponseTemplate::new(200).set_body_string("<html>login</html>"),
        )
        .await;
    }

    #[tokio::test]
    async fn test_crumb_cookie_sent_without_crumb() {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "JSESSIONID=s1")
                    .set_body_json(serde_json::json!({"crumbRequestField": "Jenkins-Crumb"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .and(header_exists("jenkins-crumb"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .and(header("cookie", "JSESSIONID=s1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("with-cookie"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(200).set_body_string("no-cookie"))
            .mount(&server)
            .await;

        let body = client()
            .post(PostOptions::new(format!("{}/x", server.uri())).header("Authorization", AUTH))
            .await
            .unwrap();
        assert_eq!(body, "with-cookie");
    }

    #[tokio::test]
    async fn test_numeric_crumb_is_sent_as_text() {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"crumb": 123})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .and(header("jenkins-crumb", "123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .post(PostOptions::new(format!("{}/x", server.uri())).header("Authorization", AUTH))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_default_authorization_triggers_preflight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/crumbIssuer/api/json"))
            .and(header("authorization", AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(crumb_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .and(header("authorization", AUTH))
            .and(header("jenkins-crumb", "C"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            HttpClient::with_config(HttpClientConfig::new().default_header("Authorization", AUTH))
                .unwrap();
        let body = client
            .post(format!("{}/x", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_unreachable_issuer_yields_no_crumb() {
        let url = Url::parse("http://127.0.0.1:9/x").unwrap();
        let crumb = client()
            .fetch_crumb(
                &url,
                &Headers::new().with("Authorization", AUTH),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(crumb, None);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) is closed on test machines
        let err = client()
            .get("http://127.0.0.1:9/", Headers::new())
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_handle() {
        let err = client().post("not a url").await.unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[tokio::test]
    async fn test_abort_before_dispatch_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(crumb_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let handle = client()
            .post(PostOptions::new(format!("{}/x", server.uri())).header("Authorization", AUTH));
        handle.abort();

        let err = handle.await.unwrap_err();
        assert!(err.is_aborted());
    }

    #[tokio::test]
    async fn test_abort_during_crumb_preflight() {
        let server = MockServer::start().await;
        Mock::given(path("/crumbIssuer/api/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(crumb_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let handle = client()
            .post(PostOptions::new(format!("{}/x", server.uri())).header("Authorization", AUTH));
        let abort = handle.abort_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            abort.abort();
        });

        let err = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("abort should settle the request promptly")
            .unwrap_err();
        assert!(err.is_aborted());
    }

    #[tokio::test]
    async fn test_abort_during_main_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let handle = client().get(format!("{}/slow", server.uri()), Headers::new());
        let abort = handle.abort_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            abort.abort();
        });

        let err = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("abort should settle the request promptly")
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.is_aborted());
    }

    #[tokio::test]
    async fn test_abort_after_completion_is_noop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .mount(&server)
            .await;

        let handle = client().get(server.uri(), Headers::new());
        let abort = handle.abort_handle();
        assert_eq!(handle.await.unwrap(), "done");

        abort.abort();
        abort.abort();
    }
}

//! Router tests for the BFF crate
//! Every route is driven through `oneshot` against a scripted backend.

#[cfg(test)]
mod support {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::body::Body;
    use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
    use bytes::Bytes;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::domain::gateway::BackendGateway;
    use crate::domain::message::{BackendError, BackendRequest, BackendResponse};

    pub const BASE: &str = "http://backend.test";

    type Scripted = Result<BackendResponse, BackendError>;

    #[derive(Default)]
    struct Inner {
        scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
        calls: Mutex<Vec<BackendRequest>>,
        unreachable: bool,
    }

    /// Backend double keyed by path. The last scripted answer for a
    /// path repeats; unscripted paths answer an empty 404.
    #[derive(Clone, Default)]
    pub struct FakeGateway {
        inner: Arc<Inner>,
    }

    impl FakeGateway {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every unscripted call fails to connect
        pub fn unreachable() -> Self {
            Self {
                inner: Arc::new(Inner {
                    unreachable: true,
                    ..Default::default()
                }),
            }
        }

        pub fn respond(self, path: &str, response: BackendResponse) -> Self {
            self.push(path, Ok(response))
        }

        pub fn respond_json(self, path: &str, status: StatusCode, body: Value) -> Self {
            self.respond(path, BackendResponse::json(status, &body))
        }

        fn push(self, path: &str, scripted: Scripted) -> Self {
            self.inner
                .scripts
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default()
                .push_back(scripted);
            self
        }

        pub fn calls(&self) -> Vec<BackendRequest> {
            self.inner.calls.lock().unwrap().clone()
        }

        pub fn call_paths(&self) -> Vec<String> {
            self.calls().iter().map(|c| path_of(&c.url)).collect()
        }
    }

    fn path_of(url: &str) -> String {
        let path = url.strip_prefix(BASE).unwrap_or(url);
        path.split('?').next().unwrap_or(path).to_string()
    }

    impl BackendGateway for FakeGateway {
        async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
            let path = path_of(&request.url);
            self.inner.calls.lock().unwrap().push(request);

            let mut scripts = self.inner.scripts.lock().unwrap();
            match scripts.get_mut(&path) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) if !queue.is_empty() => queue[0].clone(),
                _ if self.inner.unreachable => {
                    Err(BackendError::Connect("connection refused".to_string()))
                }
                _ => Ok(BackendResponse::new(StatusCode::NOT_FOUND, Bytes::new())),
            }
        }
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Bytes,
    }

    impl TestResponse {
        pub fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }

        pub fn set_cookie(&self) -> Option<&str> {
            self.headers
                .get(header::SET_COOKIE)
                .map(|v| v.to_str().unwrap())
        }
    }

    pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn with_cookie(uri: &str, cookie: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, HeaderValue::from_static(cookie))
            .body(Body::empty())
            .unwrap()
    }
}

#[cfg(test)]
mod login_tests {
    use axum::http::{HeaderValue, StatusCode, header};
    use serde_json::json;

    use super::support::*;
    use crate::application::config::BffConfig;
    use crate::domain::message::BackendResponse;
    use crate::presentation::router::bff_router_generic;

    fn router(gateway: &FakeGateway) -> axum::Router {
        bff_router_generic(gateway.clone(), BffConfig::with_backend(BASE))
    }

    #[tokio::test]
    async fn test_login_falls_through_endpoints_and_sets_cookie() {
        let gateway = FakeGateway::new().respond_json(
            "/api/token/",
            StatusCode::OK,
            json!({"access": "tok1", "refresh": "r1"}),
        );

        let response = send(
            router(&gateway),
            post_json("/api/auth/login", json!({"username": "alice", "password": "pw"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"access": "tok1"}));
        assert_eq!(
            response.set_cookie(),
            Some("ccgd_refresh=r1; HttpOnly; Path=/; Max-Age=2592000; SameSite=Lax")
        );

        // three credential shapes against the first endpoint, then a hit
        assert_eq!(
            gateway.call_paths(),
            vec![
                "/api/auth/login/",
                "/api/auth/login/",
                "/api/auth/login/",
                "/api/token/",
            ]
        );
        let calls = gateway.calls();
        assert_eq!(
            calls[0].json_body(),
            Some(json!({"username": "alice", "password": "pw"}))
        );
        assert_eq!(
            calls[1].json_body(),
            Some(json!({"email": "alice", "password": "pw"}))
        );
    }

    #[tokio::test]
    async fn test_login_rejection_passes_backend_answer_through() {
        let detail = json!({"detail": "No active account found"});
        let mut gateway = FakeGateway::new();
        for path in ["/api/auth/login/", "/api/token/", "/api/token/obtain/", "/auth/jwt/create/"] {
            gateway = gateway.respond_json(path, StatusCode::UNAUTHORIZED, detail.clone());
        }

        let response = send(
            router(&gateway),
            post_json("/api/auth/login", json!({"username": "alice", "password": "wrong"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json(), detail);
        assert!(response.set_cookie().is_none());
    }

    #[tokio::test]
    async fn test_login_exchanges_refresh_when_access_missing() {
        let gateway = FakeGateway::new()
            .respond_json("/api/auth/login/", StatusCode::OK, json!({"refresh": "r2"}))
            .respond_json("/api/token/refresh/", StatusCode::OK, json!({"access": "tok2"}));

        let response = send(
            router(&gateway),
            post_json("/api/auth/login", json!({"email": "a@x.io", "password": "pw"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"access": "tok2"}));
        assert!(response.set_cookie().unwrap().starts_with("ccgd_refresh=r2;"));

        let calls = gateway.calls();
        let exchange = calls.last().unwrap();
        assert!(exchange.url.ends_with("/api/token/refresh/"));
        assert_eq!(exchange.json_body(), Some(json!({"refresh": "r2"})));
    }

    #[tokio::test]
    async fn test_login_exchange_reaches_jwt_refresh_endpoint() {
        let gateway = FakeGateway::new()
            .respond_json("/api/auth/login/", StatusCode::OK, json!({"refresh": "r2"}))
            .respond_json("/auth/jwt/refresh/", StatusCode::OK, json!({"access": "tok3"}));

        let response = send(
            router(&gateway),
            post_json("/api/auth/login", json!({"username": "alice", "password": "pw"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"access": "tok3"}));
        assert_eq!(
            gateway.call_paths(),
            vec![
                "/api/auth/login/",
                "/api/token/refresh/",
                "/api/auth/refresh/",
                "/auth/jwt/refresh/",
            ]
        );
    }

    #[tokio::test]
    async fn test_login_mirrors_backend_refresh_cookie() {
        let gateway = FakeGateway::new().respond(
            "/api/auth/login/",
            BackendResponse::json(StatusCode::OK, &json!({"access": "a1"})).with_header(
                header::SET_COOKIE,
                HeaderValue::from_static("refresh_token=r3; HttpOnly; Path=/"),
            ),
        );

        let response = send(
            router(&gateway),
            post_json("/api/auth/login", json!({"username": "bob", "password": "pw"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"access": "a1"}));
        assert!(response.set_cookie().unwrap().starts_with("ccgd_refresh=r3;"));
    }

    #[tokio::test]
    async fn test_login_finds_jwt_like_token() {
        let gateway = FakeGateway::new().respond_json(
            "/api/auth/login/",
            StatusCode::OK,
            json!({"data": {"jwt": "aaa.bbb.ccc"}}),
        );

        let response = send(
            router(&gateway),
            post_json("/api/auth/login", json!({"username": "bob", "password": "pw"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"access": "aaa.bbb.ccc"}));
    }

    #[tokio::test]
    async fn test_login_without_any_token_is_bad_request() {
        let gateway = FakeGateway::new().respond_json(
            "/api/auth/login/",
            StatusCode::OK,
            json!({"detail": "welcome"}),
        );

        let response = send(
            router(&gateway),
            post_json("/api/auth/login", json!({"username": "bob", "password": "pw"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body = response.json();
        assert_eq!(body["error"], "No access token from backend");
        assert_eq!(body["endpoint"], "/api/auth/login/");
        assert_eq!(body["response"], json!({"detail": "welcome"}));
        assert_eq!(body["debug"][0]["status"], 200);
    }

    #[tokio::test]
    async fn test_login_unreachable_backend() {
        let gateway = FakeGateway::unreachable();

        let response = send(
            router(&gateway),
            post_json("/api/auth/login", json!({"username": "bob", "password": "pw"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json()["error"], "Login proxy error");
    }

    #[tokio::test]
    async fn test_login_without_backend_url() {
        let gateway = FakeGateway::new();
        let router = bff_router_generic(gateway.clone(), BffConfig::default());

        let response = send(
            router,
            post_json("/api/auth/login", json!({"username": "bob", "password": "pw"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            response.json()["error"]
                .as_str()
                .unwrap()
                .contains("LMS_API_BASE_URL")
        );
        assert!(gateway.calls().is_empty());
    }
}

#[cfg(test)]
mod refresh_logout_tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use super::support::*;
    use crate::application::config::BffConfig;
    use crate::presentation::router::bff_router_generic;

    fn router(gateway: &FakeGateway) -> axum::Router {
        bff_router_generic(gateway.clone(), BffConfig::with_backend(BASE))
    }

    #[tokio::test]
    async fn test_refresh_without_cookie() {
        let gateway = FakeGateway::new();

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/refresh")
            .body(Body::empty())
            .unwrap();
        let response = send(router(&gateway), request).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json(), json!({"error": "No refresh token"}));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_falls_through_on_404() {
        let gateway = FakeGateway::new()
            .respond_json("/api/auth/refresh/", StatusCode::OK, json!({"access_token": "tok2"}));

        let response = send(
            router(&gateway),
            with_cookie("/api/auth/refresh", "theme=dark; ccgd_refresh=r1"),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"access": "tok2"}));
        assert_eq!(
            gateway.call_paths(),
            vec!["/api/token/refresh/", "/api/auth/refresh/"]
        );
        assert_eq!(gateway.calls()[0].json_body(), Some(json!({"refresh": "r1"})));
    }

    #[tokio::test]
    async fn test_refresh_route_stops_after_two_endpoints() {
        let gateway = FakeGateway::new();

        let response = send(
            router(&gateway),
            with_cookie("/api/auth/refresh", "ccgd_refresh=r1"),
        )
        .await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(
            gateway.call_paths(),
            vec!["/api/token/refresh/", "/api/auth/refresh/"]
        );
    }

    #[tokio::test]
    async fn test_refresh_rejection_passes_through() {
        let gateway = FakeGateway::new().respond_json(
            "/api/token/refresh/",
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Token is invalid or expired"}),
        );

        let response = send(
            router(&gateway),
            with_cookie("/api/auth/refresh", "ccgd_refresh=stale"),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.json(), json!({"detail": "Token is invalid or expired"}));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_even_when_backend_down() {
        let gateway = FakeGateway::unreachable();

        let response = send(
            router(&gateway),
            with_cookie("/api/auth/logout", "ccgd_refresh=r1"),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"ok": true}));
        assert_eq!(
            response.set_cookie(),
            Some("ccgd_refresh=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax")
        );
        assert_eq!(gateway.call_paths(), vec!["/api/auth/logout/"]);
    }

    #[tokio::test]
    async fn test_auth_routes_reject_other_methods() {
        let gateway = FakeGateway::new();

        for uri in ["/api/auth/login", "/api/auth/refresh", "/api/auth/logout"] {
            let request = Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = send(router(&gateway), request).await;
            assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        }
    }
}

#[cfg(test)]
mod proxy_tests {
    use axum::body::Body;
    use axum::http::{HeaderValue, Method, Request, StatusCode, header};
    use serde_json::json;

    use super::support::*;
    use crate::application::config::BffConfig;
    use crate::domain::message::BackendResponse;
    use crate::presentation::router::bff_router_generic;

    fn router(gateway: &FakeGateway) -> axum::Router {
        bff_router_generic(gateway.clone(), BffConfig::with_backend(BASE))
    }

    #[tokio::test]
    async fn test_proxy_get_forwards_query_and_headers() {
        let gateway = FakeGateway::new().respond_json(
            "/api/courses/",
            StatusCode::OK,
            json!([{"id": 1, "title": "Rust"}]),
        );

        let request = Request::builder()
            .method("GET")
            .uri("/api/proxy/courses/?page=2")
            .header(header::HOST, "localhost:3000")
            .header(header::AUTHORIZATION, "Bearer tok1")
            .body(Body::empty())
            .unwrap();
        let response = send(router(&gateway), request).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!([{"id": 1, "title": "Rust"}]));

        let call = &gateway.calls()[0];
        assert_eq!(call.method, Method::GET);
        assert_eq!(call.url, "http://backend.test/api/courses/?page=2");
        assert!(call.headers.get(header::HOST).is_none());
        assert_eq!(call.headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok1");
        assert!(call.body.is_none());
    }

    #[tokio::test]
    async fn test_proxy_adds_trailing_slash_to_auth_posts() {
        let gateway = FakeGateway::new().respond_json(
            "/api/auth/register/",
            StatusCode::CREATED,
            json!({"id": 7}),
        );

        let response = send(
            router(&gateway),
            post_json("/api/proxy/auth/register", json!({"username": "carol"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::CREATED);
        let call = &gateway.calls()[0];
        assert_eq!(call.url, "http://backend.test/api/auth/register/");
        assert_eq!(call.json_body(), Some(json!({"username": "carol"})));
        assert_eq!(
            call.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_proxy_relays_text_with_status() {
        let gateway = FakeGateway::new().respond(
            "/api/health",
            BackendResponse::new(StatusCode::SERVICE_UNAVAILABLE, "<h1>down</h1>")
                .with_header(header::CONTENT_TYPE, HeaderValue::from_static("text/html")),
        );

        let request = Request::builder()
            .uri("/api/proxy/health")
            .body(Body::empty())
            .unwrap();
        let response = send(router(&gateway), request).await;

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers.get(header::CONTENT_TYPE).unwrap(), "text/html");
        assert_eq!(&response.body[..], b"<h1>down</h1>");
    }

    #[tokio::test]
    async fn test_proxy_wraps_unparseable_json() {
        let gateway = FakeGateway::new().respond(
            "/api/broken/",
            BackendResponse::new(StatusCode::OK, "not json").with_header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
        );

        let request = Request::builder()
            .uri("/api/proxy/broken/")
            .body(Body::empty())
            .unwrap();
        let response = send(router(&gateway), request).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"_raw": "not json"}));
    }

    #[tokio::test]
    async fn test_proxy_unreachable_backend() {
        let gateway = FakeGateway::unreachable();

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/proxy/enrollments/3/")
            .body(Body::empty())
            .unwrap();
        let response = send(router(&gateway), request).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json();
        assert_eq!(body["error"], "Proxy server crashed");
        assert!(body["details"].as_str().unwrap().contains("connection refused"));
    }
}

#[cfg(test)]
mod setup_tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use super::support::*;
    use crate::application::config::BffConfig;
    use crate::presentation::router::bff_router_generic;

    fn get_test_user() -> Request<Body> {
        Request::builder()
            .uri("/api/setup/create-test-user")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_setup_route_off_by_default() {
        let gateway = FakeGateway::new();
        let router = bff_router_generic(gateway.clone(), BffConfig::with_backend(BASE));

        let response = send(router, get_test_user()).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_setup_creates_test_user() {
        let gateway = FakeGateway::new().respond_json(
            "/api/auth/register/",
            StatusCode::CREATED,
            json!({"id": 1}),
        );
        let router = bff_router_generic(gateway.clone(), BffConfig::development(BASE));

        let response = send(router, get_test_user()).await;

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(
            response.json(),
            json!({
                "username": "testuser",
                "password": "Testpass123!",
                "message": "Test user created (or already exists)",
            })
        );
        assert_eq!(
            gateway.calls()[0].json_body(),
            Some(json!({
                "username": "testuser",
                "password": "Testpass123!",
                "email": "testuser@example.com",
            }))
        );
    }

    #[tokio::test]
    async fn test_setup_passes_backend_rejection_through() {
        let gateway = FakeGateway::new().respond_json(
            "/api/auth/register/",
            StatusCode::BAD_REQUEST,
            json!({"username": ["A user with that username already exists."]}),
        );
        let router = bff_router_generic(gateway, BffConfig::development(BASE));

        let response = send(router, get_test_user()).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json()["username"][0],
            "A user with that username already exists."
        );
    }
}

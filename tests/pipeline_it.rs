#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use ispmonitor_client::{
	_preludet::*,
	auth::{LoginRequest, TokenPair},
	client::ApiRequest,
	error::RefreshFailure,
	http::StatusCode,
	lifecycle::SessionEvent,
	store::{MemoryStore, TokenStore},
};

fn seed(store: &MemoryStore, access: &str, refresh: &str) {
	store
		.set_tokens(TokenPair::new(access, refresh).expect("Fixture pair should be valid."))
		.expect("Seeding the memory store should succeed.");
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_request_replayed() {
	let server = MockServer::start_async().await;
	let (client, store, observer) = build_reqwest_test_client(&server.base_url());

	seed(&store, "expired", "valid-refresh");

	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/routers").header("authorization", "Bearer expired");
			then.status(401).json_body(json!({ "code": "UNAUTHORIZED", "message": "Token expired" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/auth/refresh")
				.json_body(json!({ "refresh_token": "valid-refresh" }));
			then.status(200).json_body(json!({
				"access_token": "new",
				"refresh_token": "new-refresh",
				"token_type": "Bearer",
				"expires_in": 900
			}));
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/routers").header("authorization", "Bearer new");
			then.status(200).json_body(json!({
				"data": [],
				"pagination": { "page": 1, "page_size": 20, "total_items": 0, "total_pages": 0 }
			}));
		})
		.await;
	let response = client
		.execute(ApiRequest::get("/routers"))
		.await
		.expect("Replayed request should succeed.");

	assert_eq!(response.status(), StatusCode::OK);

	rejected.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	accepted.assert_calls_async(1).await;

	let pair = store.tokens().expect("Refreshed pair should be stored.");

	assert_eq!(pair.access_token.expose(), "new");
	assert_eq!(pair.refresh_token.expose(), "new-refresh");
	assert_eq!(observer.events(), [SessionEvent::TokensRefreshed]);
}

#[tokio::test]
async fn refresh_without_rotated_refresh_token_keeps_previous_one() {
	let server = MockServer::start_async().await;
	let (client, store, _) = build_reqwest_test_client(&server.base_url());

	seed(&store, "expired", "long-lived-refresh");

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/alerts").header("authorization", "Bearer expired");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).json_body(json!({ "access_token": "new" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/alerts").header("authorization", "Bearer new");
			then.status(204);
		})
		.await;

	client.execute(ApiRequest::get("/alerts")).await.expect("Replay should succeed.");

	let pair = store.tokens().expect("Refreshed pair should be stored.");

	assert_eq!(pair.access_token.expose(), "new");
	assert_eq!(pair.refresh_token.expose(), "long-lived-refresh");
}

#[tokio::test]
async fn replayed_request_is_not_retried_twice() {
	let server = MockServer::start_async().await;
	let (client, store, _) = build_reqwest_test_client(&server.base_url());

	seed(&store, "expired", "valid-refresh");

	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/topology");
			then.status(401).json_body(json!({ "code": "FORBIDDEN_TENANT", "message": "No access" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).json_body(json!({ "access_token": "new", "refresh_token": "r2" }));
		})
		.await;
	let err = client
		.execute(ApiRequest::get("/topology"))
		.await
		.expect_err("Second 401 should surface.");

	match err {
		Error::Unauthorized { path, message } => {
			assert_eq!(path, "/topology");
			assert_eq!(message.as_deref(), Some("No access"));
		},
		other => panic!("Expected unauthorized, got {other:?}."),
	}

	protected.assert_calls_async(2).await;
	refresh.assert_calls_async(1).await;

	// The refresh itself succeeded, so the session survives.
	assert_eq!(store.access_token().map(|t| t.expose().to_owned()), Some("new".into()));
}

#[tokio::test]
async fn auth_endpoint_401_is_surfaced_without_refresh() {
	let server = MockServer::start_async().await;
	let (client, store, observer) = build_reqwest_test_client(&server.base_url());

	seed(&store, "stale", "valid-refresh");

	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/login");
			then.status(401)
				.json_body(json!({ "code": "INVALID_CREDENTIALS", "message": "Invalid credentials" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).json_body(json!({ "access_token": "new", "refresh_token": "r2" }));
		})
		.await;
	let err = client
		.login(&LoginRequest::new("noc@isp.example", "wrong"))
		.await
		.expect_err("Bad credentials should fail.");

	assert!(matches!(
		err,
		Error::Unauthorized { ref path, ref message }
			if path == "/auth/login" && message.as_deref() == Some("Invalid credentials")
	));

	login.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;

	assert!(store.tokens().is_some(), "A failed login must not touch the stored session.");
	assert!(observer.events().is_empty());
}

#[tokio::test]
async fn missing_refresh_token_expires_session_without_network_call() {
	let server = MockServer::start_async().await;
	let (client, store, observer) = build_reqwest_test_client(&server.base_url());
	let protected = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/users/me");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).json_body(json!({ "access_token": "new", "refresh_token": "r2" }));
		})
		.await;
	let err = client.current_user().await.expect_err("Anonymous call should fail.");

	assert!(matches!(err, Error::SessionExpired(RefreshFailure::MissingRefreshToken)));

	protected.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;

	assert!(store.tokens().is_none());
	assert_eq!(
		observer.events(),
		[SessionEvent::Expired {
			reason: RefreshFailure::MissingRefreshToken,
			redirect_to: "/login".into(),
		}]
	);
}

#[tokio::test]
async fn malformed_refresh_payload_is_terminal() {
	let server = MockServer::start_async().await;
	let (client, store, observer) = build_reqwest_test_client(&server.base_url());

	seed(&store, "expired", "valid-refresh");

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/routers");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).json_body(json!({ "access_token": "" , "refresh_token": "r2" }));
		})
		.await;

	let err = client.execute(ApiRequest::get("/routers")).await.expect_err("Refresh should fail.");

	assert!(matches!(err, Error::SessionExpired(RefreshFailure::MalformedResponse { .. })));
	assert!(store.tokens().is_none());
	assert!(matches!(
		observer.events().as_slice(),
		[SessionEvent::Expired { reason: RefreshFailure::MalformedResponse { .. }, .. }]
	));
}

#[tokio::test]
async fn non_401_errors_pass_through_unchanged() {
	let server = MockServer::start_async().await;
	let (client, store, _) = build_reqwest_test_client(&server.base_url());

	seed(&store, "valid", "valid-refresh");

	let failing = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/metrics/dashboard").header("authorization", "Bearer valid");
			then.status(503)
				.header("retry-after", "15")
				.json_body(json!({ "code": "POLLER_UNAVAILABLE", "message": "Metrics store offline" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200);
		})
		.await;
	let response = client
		.execute(ApiRequest::get("/metrics/dashboard"))
		.await
		.expect("Non-401 statuses should come back as responses.");

	assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

	let err = client.dashboard_stats().await.expect_err("Typed helper should map the status.");

	match err {
		Error::Api { status, code, message, retry_after, .. } => {
			assert_eq!(status, 503);
			assert_eq!(code.as_deref(), Some("POLLER_UNAVAILABLE"));
			assert_eq!(message, "Metrics store offline");
			assert_eq!(retry_after, Some(Duration::seconds(15)));
		},
		other => panic!("Expected an API error, got {other:?}."),
	}

	failing.assert_calls_async(2).await;
	refresh.assert_calls_async(0).await;
}

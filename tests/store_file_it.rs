#![cfg(feature = "reqwest")]

// std
use std::{env, fs, path::PathBuf};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use ispmonitor_client::{
	_preludet::*,
	auth::TokenPair,
	client::{ApiRequest, ReqwestApiClient},
	store::{FileStore, TokenStore},
};

fn temp_path(label: &str) -> PathBuf {
	let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();

	env::temp_dir().join(format!("ispmonitor_client_{label}_{}_{nanos}.json", std::process::id()))
}

#[tokio::test]
async fn refreshed_pair_survives_reopen() {
	let server = MockServer::start_async().await;
	let path = temp_path("reopen");
	let store = Arc::new(FileStore::open(&path).expect("File store should open."));

	store
		.set_tokens(TokenPair::new("expired", "valid-refresh").expect("Fixture pair should be valid."))
		.expect("Seeding should succeed.");

	let client = ReqwestApiClient::new(store.clone(), test_config(&server.base_url()))
		.expect("Default client should build.");

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/tenants").header("authorization", "Bearer expired");
			then.status(401);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200).json_body(json!({ "access_token": "new", "refresh_token": "new-refresh" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/tenants").header("authorization", "Bearer new");
			then.status(200).json_body(json!({
				"data": [],
				"pagination": { "page": 1, "page_size": 20, "total_items": 0, "total_pages": 0 }
			}));
		})
		.await;

	client.execute(ApiRequest::get("/tenants")).await.expect("Replay should succeed.");

	let reopened = FileStore::open(&path).expect("File store should reopen.");
	let pair = reopened.tokens().expect("Refreshed pair should be persisted.");

	assert_eq!(pair.access_token.expose(), "new");
	assert_eq!(pair.refresh_token.expose(), "new-refresh");

	client.logout().await.expect_err("Logout endpoint is not mocked.");

	assert!(!path.exists(), "Logout should remove the persisted session.");
	assert!(FileStore::open(&path).expect("File store should reopen.").tokens().is_none());

	let _ = fs::remove_file(&path);
}

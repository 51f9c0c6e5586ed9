//! Signs in against a mocked ISP monitor backend, lets the access token expire, and shows the
//! client refreshing once for a burst of dashboard calls before replaying them.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use ispmonitor_client::{
	api::{AlertFilter, ListQuery, RouterFilter},
	auth::LoginRequest,
	client::{ClientConfig, ReqwestApiClient},
	lifecycle::SessionEvent,
	store::{MemoryStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let empty_page = json!({
		"data": [],
		"pagination": { "page": 1, "page_size": 20, "total_items": 0, "total_pages": 0 }
	});

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/login");
			then.status(200).json_body(json!({
				"access_token": "short-lived",
				"refresh_token": "refresh-1",
				"token_type": "Bearer",
				"expires_in": 1,
				"user": {
					"id": "user-1",
					"tenant_id": "tenant-1",
					"email": "noc@isp.example",
					"first_name": "Ada",
					"last_name": "Ops",
					"status": "active",
					"email_verified": true,
					"created_at": "2024-01-01T00:00:00Z",
					"updated_at": "2024-01-01T00:00:00Z"
				}
			}));
		})
		.await;

	for path in ["/api/v1/routers", "/api/v1/alerts"] {
		server
			.mock_async(|when, then| {
				when.method(GET).path(path).header("authorization", "Bearer short-lived");
				then.status(401).json_body(json!({ "code": "UNAUTHORIZED", "message": "Token expired" }));
			})
			.await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(path).header("authorization", "Bearer rotated");
				then.status(200).json_body(empty_page.clone());
			})
			.await;
	}

	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/refresh");
			then.status(200)
				.delay(std::time::Duration::from_millis(50))
				.json_body(json!({ "access_token": "rotated", "refresh_token": "refresh-2" }));
		})
		.await;
	let store = Arc::new(MemoryStore::default());
	let config = ClientConfig::new(Url::parse(&server.url("/api/v1"))?)
		.with_timeout(std::time::Duration::from_secs(10))
		.with_user_agent("ispmonitor-dashboard-demo/0.1");
	let client = ReqwestApiClient::new(store.clone(), config)?.with_observer(Arc::new(
		|event: &SessionEvent| match event {
			SessionEvent::Expired { redirect_to, .. } => println!("Session over; go to {redirect_to}."),
			other => println!("Session event: {other:?}."),
		},
	));
	let session = client.login(&LoginRequest::new("noc@isp.example", "hunter2")).await?;

	println!("Signed in as {} {}.", session.user.first_name, session.user.last_name);

	let router_filter = RouterFilter { paging: ListQuery::page(1), ..Default::default() };
	let alert_filter = AlertFilter::default();
	let (routers, alerts) =
		tokio::join!(client.list_routers(&router_filter), client.list_alerts(&alert_filter));

	println!(
		"Loaded {} routers and {} alerts with {} refresh call(s).",
		routers?.pagination.total_items,
		alerts?.pagination.total_items,
		client.refresh.metrics().attempts(),
	);

	refresh_mock.assert_async().await;

	if let Some(pair) = store.tokens() {
		println!("Stored pair after refresh: {pair:?}.");
	}

	Ok(())
}

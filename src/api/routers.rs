//! Router inventory and interface listings.

// self
use crate::{
	_prelude::*,
	api::{ListQuery, Page, path_segment},
	client::{ApiClient, ApiRequest},
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

/// Operational state of a router.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterStatus {
	/// Polled and reachable.
	Active,
	/// Administratively disabled.
	Inactive,
	/// Under maintenance; alerts are expected.
	Maintenance,
	/// Not reachable by the poller.
	Offline,
}

/// Geographic position of a device.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
	/// Latitude in decimal degrees.
	pub latitude: f64,
	/// Longitude in decimal degrees.
	pub longitude: f64,
}

/// A monitored router.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Router {
	/// Router identifier.
	pub id: String,
	/// Owning tenant.
	pub tenant_id: String,
	/// Display name.
	pub name: String,
	/// DNS hostname.
	pub hostname: String,
	/// Address the poller connects to.
	pub management_ip: String,
	/// Hardware vendor.
	pub vendor: String,
	/// Hardware model.
	pub model: String,
	/// Operational state.
	pub status: RouterStatus,
	/// Physical location, when known.
	#[serde(default)]
	pub location: Option<Location>,
	/// Whether the poller collects metrics from this router.
	pub polling_enabled: bool,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last update instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

/// Payload for registering a router.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateRouterRequest {
	/// Display name.
	pub name: String,
	/// DNS hostname.
	pub hostname: String,
	/// Address the poller connects to.
	pub management_ip: String,
	/// Hardware vendor.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vendor: Option<String>,
	/// Hardware model.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	/// Physical location.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location: Option<Location>,
}

/// Partial update for a router; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UpdateRouterRequest {
	/// Display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// DNS hostname.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hostname: Option<String>,
	/// Address the poller connects to.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub management_ip: Option<String>,
	/// Hardware vendor.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub vendor: Option<String>,
	/// Hardware model.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	/// Operational state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<RouterStatus>,
	/// Physical location.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location: Option<Location>,
	/// Poller toggle.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub polling_enabled: Option<bool>,
}

/// Filters for the router listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RouterFilter {
	/// Paging.
	#[serde(flatten)]
	pub paging: ListQuery,
	/// Only routers in this state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<RouterStatus>,
	/// Free-text match on name, hostname, or address.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
}

/// Link state of an interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
	/// Interface is up.
	Up,
	/// Interface is down.
	Down,
}

/// A router interface discovered by the poller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
	/// Interface identifier.
	pub id: String,
	/// Owning router.
	pub router_id: String,
	/// Interface name, e.g. `ether1`.
	pub name: String,
	/// Operator description.
	#[serde(default)]
	pub description: Option<String>,
	/// SNMP `ifIndex`.
	pub if_index: u32,
	/// SNMP `ifType` label.
	pub if_type: String,
	/// Administrative state.
	pub admin_status: LinkState,
	/// Operational state.
	pub oper_status: LinkState,
	/// Link speed in bits per second.
	pub speed: u64,
	/// MTU in bytes.
	pub mtu: u32,
	/// Hardware address.
	#[serde(default)]
	pub mac_address: Option<String>,
	/// Assigned addresses.
	#[serde(default)]
	pub ip_addresses: Vec<String>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last update instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

#[derive(Serialize)]
struct BulkPolling<'a> {
	router_ids: &'a [String],
	polling_enabled: bool,
}

#[derive(Serialize)]
struct BulkDelete<'a> {
	router_ids: &'a [String],
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists routers matching `filter`.
	pub async fn list_routers(&self, filter: &RouterFilter) -> Result<Page<Router>> {
		self.execute_json(ApiRequest::get("/routers").query(filter)?).await
	}

	/// Fetches one router.
	pub async fn router(&self, id: &str) -> Result<Router> {
		self.get_json(format!("/routers/{}", path_segment(id)?)).await
	}

	/// Registers a router.
	pub async fn create_router(&self, router: &CreateRouterRequest) -> Result<Router> {
		self.post_json("/routers", router).await
	}

	/// Applies a partial update to a router.
	pub async fn update_router(&self, id: &str, update: &UpdateRouterRequest) -> Result<Router> {
		self.put_json(format!("/routers/{}", path_segment(id)?), update).await
	}

	/// Removes a router.
	pub async fn delete_router(&self, id: &str) -> Result<()> {
		self.delete(format!("/routers/{}", path_segment(id)?)).await
	}

	/// Turns polling on or off for several routers at once.
	pub async fn set_routers_polling(&self, ids: &[String], enabled: bool) -> Result<()> {
		let body = BulkPolling { router_ids: ids, polling_enabled: enabled };

		self.execute_unit(ApiRequest::post("/routers/bulk/polling").json(&body)?).await
	}

	/// Removes several routers at once.
	pub async fn delete_routers(&self, ids: &[String]) -> Result<()> {
		self.execute_unit(
			ApiRequest::post("/routers/bulk/delete").json(&BulkDelete { router_ids: ids })?,
		)
		.await
	}

	/// Lists the interfaces of a router.
	pub async fn router_interfaces(
		&self,
		router_id: &str,
		paging: &ListQuery,
	) -> Result<Page<NetworkInterface>> {
		let path = format!("/routers/{}/interfaces", path_segment(router_id)?);

		self.execute_json(ApiRequest::get(path).query(paging)?).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn router_decodes_without_location() {
		let router: Router = serde_json::from_str(
			r#"{"id":"r-1","tenant_id":"t-1","name":"core-1","hostname":"core-1.isp.net","management_ip":"10.0.0.1","vendor":"mikrotik","model":"CCR2004","status":"maintenance","polling_enabled":false,"created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-02T00:00:00Z"}"#,
		)
		.expect("Router fixture should decode.");

		assert_eq!(router.status, RouterStatus::Maintenance);
		assert!(router.location.is_none());
	}

	#[test]
	fn filter_flattens_paging() {
		let filter = RouterFilter {
			paging: ListQuery::page(3),
			status: Some(RouterStatus::Offline),
			search: None,
		};

		assert_eq!(
			serde_json::to_value(&filter).expect("Filter should encode."),
			serde_json::json!({ "page": 3, "status": "offline" })
		);
	}

	#[test]
	fn update_sends_only_set_fields() {
		let update = UpdateRouterRequest { polling_enabled: Some(true), ..Default::default() };

		assert_eq!(
			serde_json::to_string(&update).expect("Update should encode."),
			r#"{"polling_enabled":true}"#
		);
	}
}

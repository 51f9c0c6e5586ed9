//! Subscriber sessions seen on routers: PPPoE, DHCP leases, NAT connections.

// self
use crate::{
	_prelude::*,
	api::{ListQuery, Page, path_segment},
	client::{ApiClient, ApiRequest},
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

/// Filters shared by the session listings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionFilter {
	/// Paging.
	#[serde(flatten)]
	pub paging: ListQuery,
	/// Only sessions on this router.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub router_id: Option<String>,
	/// Free-text match on username, address, or MAC.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
}

/// An active PPPoE subscriber session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PppoeSession {
	/// Record identifier.
	pub id: String,
	/// Router terminating the session.
	pub router_id: String,
	/// Subscriber login.
	pub username: String,
	/// Address assigned to the subscriber.
	pub ip_address: String,
	/// Subscriber hardware address.
	pub mac_address: String,
	/// Access interface.
	pub interface_name: String,
	/// Session age in seconds.
	pub uptime: u64,
	/// Bytes received from the subscriber.
	pub rx_bytes: u64,
	/// Bytes sent to the subscriber.
	pub tx_bytes: u64,
	/// PPPoE session id on the concentrator.
	pub session_id: String,
	/// When the record was first seen.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

/// A DHCP lease handed out by a router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpLease {
	/// Record identifier.
	pub id: String,
	/// Router serving the lease.
	pub router_id: String,
	/// Leased address.
	pub ip_address: String,
	/// Client hardware address.
	pub mac_address: String,
	/// Client-supplied hostname.
	#[serde(default)]
	pub hostname: Option<String>,
	/// Lease duration in seconds.
	pub lease_time: u64,
	/// Lease expiry.
	#[serde(with = "time::serde::rfc3339")]
	pub expires_at: OffsetDateTime,
	/// When the record was first seen.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

/// Transport protocol of a tracked connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NatProtocol {
	/// TCP.
	Tcp,
	/// UDP.
	Udp,
	/// ICMP.
	Icmp,
}

/// A connection-tracking entry from a router's NAT table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatConnection {
	/// Record identifier.
	pub id: String,
	/// Router holding the entry.
	pub router_id: String,
	/// Protocol.
	pub protocol: NatProtocol,
	/// Original source address.
	pub src_address: String,
	/// Original destination address.
	pub dst_address: String,
	/// Original source port.
	#[serde(default)]
	pub src_port: Option<u16>,
	/// Original destination port.
	#[serde(default)]
	pub dst_port: Option<u16>,
	/// Reply-direction source address.
	#[serde(default)]
	pub reply_src_address: Option<String>,
	/// Reply-direction destination address.
	#[serde(default)]
	pub reply_dst_address: Option<String>,
	/// Reply-direction source port.
	#[serde(default)]
	pub reply_src_port: Option<u16>,
	/// Reply-direction destination port.
	#[serde(default)]
	pub reply_dst_port: Option<u16>,
	/// Tracker state, e.g. `established`.
	pub state: String,
	/// Seconds until the entry times out.
	pub timeout: u64,
	/// When the record was first seen.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists active PPPoE sessions.
	pub async fn list_pppoe_sessions(&self, filter: &SessionFilter) -> Result<Page<PppoeSession>> {
		self.execute_json(ApiRequest::get("/sessions/pppoe").query(filter)?).await
	}

	/// Lists DHCP leases.
	pub async fn list_dhcp_leases(&self, filter: &SessionFilter) -> Result<Page<DhcpLease>> {
		self.execute_json(ApiRequest::get("/sessions/dhcp").query(filter)?).await
	}

	/// Lists NAT connection-tracking entries.
	pub async fn list_nat_connections(
		&self,
		filter: &SessionFilter,
	) -> Result<Page<NatConnection>> {
		self.execute_json(ApiRequest::get("/sessions/nat").query(filter)?).await
	}

	/// Disconnects a PPPoE subscriber.
	pub async fn terminate_pppoe_session(&self, id: &str) -> Result<()> {
		self.post_empty(format!("/sessions/pppoe/{}/terminate", path_segment(id)?)).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn nat_connection_decodes_icmp_without_ports() {
		let entry: NatConnection = serde_json::from_str(
			r#"{"id":"n-1","router_id":"r-1","protocol":"icmp","src_address":"100.64.0.9","dst_address":"1.1.1.1","state":"established","timeout":30,"created_at":"2024-05-01T12:00:00Z"}"#,
		)
		.expect("NAT fixture should decode.");

		assert_eq!(entry.protocol, NatProtocol::Icmp);
		assert_eq!(entry.src_port, None);
	}
}

//! Network topology graph and its GeoJSON projection.

// self
use crate::{
	_prelude::*,
	api::Router,
	client::ApiClient,
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

/// Physical or logical medium of a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
	/// Copper Ethernet.
	Ethernet,
	/// Fiber.
	Fiber,
	/// Radio link.
	Wireless,
	/// Tunnel.
	Vpn,
}

/// Health of a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
	/// Carrying traffic.
	Active,
	/// Down.
	Inactive,
	/// Up with errors or reduced capacity.
	Degraded,
}

/// A link between two router interfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyLink {
	/// Link identifier.
	pub id: String,
	/// Interface at the source end.
	pub source_interface_id: String,
	/// Interface at the target end.
	pub target_interface_id: String,
	/// Router at the source end.
	pub source_router_id: String,
	/// Router at the target end.
	pub target_router_id: String,
	/// Medium.
	pub link_type: LinkType,
	/// Health.
	pub status: LinkStatus,
}

/// Routers and the links between them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topology {
	/// Nodes.
	pub routers: Vec<Router>,
	/// Edges.
	pub links: Vec<TopologyLink>,
}
impl Topology {
	/// Links touching `router_id` at either end.
	pub fn links_of<'a>(&'a self, router_id: &'a str) -> impl Iterator<Item = &'a TopologyLink> {
		self.links.iter().filter(move |link| {
			link.source_router_id == router_id || link.target_router_id == router_id
		})
	}
}

/// Geometry of a topology feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
	/// A router position as `[longitude, latitude]`.
	Point(Vec<f64>),
	/// A link path as a list of positions.
	LineString(Vec<Vec<f64>>),
}

/// Properties of a topology feature; extra backend fields are preserved in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
	/// `router` or `link`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Identifier of the router or link.
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Status label.
	#[serde(default)]
	pub status: Option<String>,
	/// Remaining properties.
	#[serde(flatten)]
	pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A GeoJSON feature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
	/// Shape.
	pub geometry: Geometry,
	/// Attributes.
	pub properties: FeatureProperties,
}

/// The topology as a GeoJSON `FeatureCollection`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopologyGeoJson {
	/// Features; routers are points and links are line strings.
	pub features: Vec<GeoJsonFeature>,
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the topology graph.
	pub async fn topology(&self) -> Result<Topology> {
		self.get_json("/topology").await
	}

	/// Fetches the topology as GeoJSON.
	pub async fn topology_geojson(&self) -> Result<TopologyGeoJson> {
		self.get_json("/topology/geojson").await
	}
}

//! Time-series metrics, dashboard totals, and exports.

// self
use crate::{
	_prelude::*,
	api::path_segment,
	client::{ApiClient, ApiRequest},
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

/// One sample of a time series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricDataPoint {
	/// Sample instant.
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
	/// Sample value.
	pub value: f64,
}

/// Traffic and error series of one interface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterfaceMetrics {
	/// Interface identifier.
	pub interface_id: String,
	/// Interface name.
	pub interface_name: String,
	/// Inbound bits per second.
	pub in_bps: Vec<MetricDataPoint>,
	/// Outbound bits per second.
	pub out_bps: Vec<MetricDataPoint>,
	/// Utilization percentage.
	pub utilization: Vec<MetricDataPoint>,
	/// Inbound error count.
	pub in_errors: Vec<MetricDataPoint>,
	/// Outbound error count.
	pub out_errors: Vec<MetricDataPoint>,
}

/// Health series of one router.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouterMetrics {
	/// Router identifier.
	pub router_id: String,
	/// Router name.
	pub router_name: String,
	/// CPU usage percentage.
	pub cpu_usage: Vec<MetricDataPoint>,
	/// Memory usage percentage.
	pub memory_usage: Vec<MetricDataPoint>,
	/// Temperature in degrees Celsius.
	pub temperature: Vec<MetricDataPoint>,
	/// Uptime in seconds.
	pub uptime: u64,
}

/// Aggregate bandwidth across the network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bandwidth {
	/// Inbound bits per second.
	pub in_bps: f64,
	/// Outbound bits per second.
	pub out_bps: f64,
}

/// Headline numbers for the dashboard landing page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
	/// Routers under management.
	pub total_routers: u64,
	/// Routers answering polls.
	pub online_routers: u64,
	/// Routers not answering polls.
	pub offline_routers: u64,
	/// Alerts not yet resolved.
	pub active_alerts: u64,
	/// Subscriber sessions currently up.
	pub active_sessions: u64,
	/// Current total bandwidth.
	pub total_bandwidth: Bandwidth,
}

/// Network-wide traffic series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkTraffic {
	/// Inbound bits per second.
	pub in_bps: Vec<MetricDataPoint>,
	/// Outbound bits per second.
	pub out_bps: Vec<MetricDataPoint>,
}

/// Time window for metric queries; unset bounds fall back to the backend's default window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricsWindow {
	/// Window start.
	#[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
	pub from: Option<OffsetDateTime>,
	/// Window end.
	#[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
	pub to: Option<OffsetDateTime>,
}
impl MetricsWindow {
	/// Window covering `[from, to]`.
	pub fn between(from: OffsetDateTime, to: OffsetDateTime) -> Self {
		Self { from: Some(from), to: Some(to) }
	}

	/// Window ending now and reaching `span` into the past.
	pub fn last(span: Duration) -> Self {
		let to = OffsetDateTime::now_utc();

		Self::between(to - span, to)
	}
}

/// File format of a metrics export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
	/// Comma-separated values.
	#[default]
	Csv,
	/// JSON document.
	Json,
}

#[derive(Serialize)]
struct ExportQuery {
	#[serde(flatten)]
	window: MetricsWindow,
	format: ExportFormat,
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the series of one interface.
	pub async fn interface_metrics(
		&self,
		interface_id: &str,
		window: &MetricsWindow,
	) -> Result<InterfaceMetrics> {
		let path = format!("/metrics/interfaces/{}", path_segment(interface_id)?);

		self.execute_json(ApiRequest::get(path).query(window)?).await
	}

	/// Fetches the series of one router.
	pub async fn router_metrics(
		&self,
		router_id: &str,
		window: &MetricsWindow,
	) -> Result<RouterMetrics> {
		let path = format!("/metrics/routers/{}", path_segment(router_id)?);

		self.execute_json(ApiRequest::get(path).query(window)?).await
	}

	/// Fetches the dashboard headline numbers.
	pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
		self.get_json("/metrics/dashboard").await
	}

	/// Fetches network-wide traffic.
	pub async fn network_traffic(&self, window: &MetricsWindow) -> Result<NetworkTraffic> {
		self.execute_json(ApiRequest::get("/metrics/traffic").query(window)?).await
	}

	/// Downloads a router's metrics as a file body.
	pub async fn export_router_metrics(
		&self,
		router_id: &str,
		window: &MetricsWindow,
		format: ExportFormat,
	) -> Result<Vec<u8>> {
		let path = format!("/metrics/routers/{}/export", path_segment(router_id)?);
		let request = ApiRequest::get(path).query(&ExportQuery { window: *window, format })?;

		Ok(self.execute(request).await?.error_for_status()?.into_body())
	}
}

//! Alert feed and triage actions.

// std
use std::collections::BTreeMap;
// self
use crate::{
	_prelude::*,
	api::{ListQuery, Page, path_segment},
	client::{ApiClient, ApiRequest},
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

/// How urgent an alert is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
	/// Service-affecting.
	Critical,
	/// Degraded but serving.
	Warning,
	/// Informational.
	Info,
}

/// Where an alert is in its triage lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
	/// Raised and not yet seen.
	Open,
	/// Seen by an operator.
	Acknowledged,
	/// Condition cleared.
	Resolved,
}

/// An alert raised by the poller or the alerting rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
	/// Alert identifier.
	pub id: String,
	/// Owning tenant.
	pub tenant_id: String,
	/// Router the alert concerns, if any.
	#[serde(default)]
	pub router_id: Option<String>,
	/// Interface the alert concerns, if any.
	#[serde(default)]
	pub interface_id: Option<String>,
	/// Urgency.
	pub severity: AlertSeverity,
	/// Triage state.
	pub status: AlertStatus,
	/// One-line summary.
	pub title: String,
	/// Full description.
	pub description: String,
	/// Operator who acknowledged the alert.
	#[serde(default)]
	pub acknowledged_by: Option<String>,
	/// When the alert was acknowledged.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub acknowledged_at: Option<OffsetDateTime>,
	/// Note left when acknowledging.
	#[serde(default)]
	pub acknowledged_note: Option<String>,
	/// When the alert was resolved.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub resolved_at: Option<OffsetDateTime>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last update instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

/// Filters for the alert listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AlertFilter {
	/// Paging.
	#[serde(flatten)]
	pub paging: ListQuery,
	/// Only alerts of this severity.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub severity: Option<AlertSeverity>,
	/// Only alerts in this state.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<AlertStatus>,
	/// Only alerts for this router.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub router_id: Option<String>,
}

/// Counts of alerts by severity and state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStatistics {
	/// All alerts.
	pub total: u64,
	/// Counts keyed by severity.
	#[serde(default)]
	pub by_severity: BTreeMap<AlertSeverity, u64>,
	/// Counts keyed by state.
	#[serde(default)]
	pub by_status: BTreeMap<AlertStatus, u64>,
}

#[derive(Serialize)]
struct Acknowledgement<'a> {
	#[serde(skip_serializing_if = "Option::is_none")]
	note: Option<&'a str>,
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists alerts matching `filter`.
	pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Page<Alert>> {
		self.execute_json(ApiRequest::get("/alerts").query(filter)?).await
	}

	/// Fetches one alert.
	pub async fn alert(&self, id: &str) -> Result<Alert> {
		self.get_json(format!("/alerts/{}", path_segment(id)?)).await
	}

	/// Acknowledges an alert, optionally leaving a note.
	pub async fn acknowledge_alert(&self, id: &str, note: Option<&str>) -> Result<()> {
		let request = ApiRequest::post(format!("/alerts/{}/acknowledge", path_segment(id)?))
			.json(&Acknowledgement { note })?;

		self.execute_unit(request).await
	}

	/// Marks an alert resolved.
	pub async fn resolve_alert(&self, id: &str) -> Result<()> {
		self.post_empty(format!("/alerts/{}/resolve", path_segment(id)?)).await
	}

	/// Fetches alert counts.
	pub async fn alert_statistics(&self) -> Result<AlertStatistics> {
		self.get_json("/alerts/statistics").await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn statistics_decode_keyed_counts() {
		let stats: AlertStatistics = serde_json::from_str(
			r#"{"total":7,"by_severity":{"critical":2,"warning":5},"by_status":{"open":4,"resolved":3}}"#,
		)
		.expect("Statistics fixture should decode.");

		assert_eq!(stats.by_severity.get(&AlertSeverity::Critical), Some(&2));
		assert_eq!(stats.by_status.get(&AlertStatus::Acknowledged), None);
	}

	#[test]
	fn acknowledgement_without_note_is_empty_object() {
		assert_eq!(
			serde_json::to_string(&Acknowledgement { note: None }).expect("Encode."),
			"{}"
		);
	}

	#[test]
	fn alert_decodes_optional_timestamps() {
		let alert: Alert = serde_json::from_str(
			r#"{"id":"a-1","tenant_id":"t-1","severity":"critical","status":"acknowledged","title":"Link down","description":"ether1 down","acknowledged_at":"2024-03-01T10:00:00Z","created_at":"2024-03-01T09:00:00Z","updated_at":"2024-03-01T10:00:00Z"}"#,
		)
		.expect("Alert fixture should decode.");

		assert!(alert.acknowledged_at.is_some());
		assert!(alert.resolved_at.is_none());
	}
}

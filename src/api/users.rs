//! User and tenant administration.

// self
use crate::{
	_prelude::*,
	api::{ListQuery, Page, path_segment},
	auth::{User, UserStatus},
	client::{ApiClient, ApiRequest},
	http::ApiHttpClient,
	transport::TransportErrorMapper,
};

/// Partial update for a user; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateUserRequest {
	/// Given name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	/// Family name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	/// Account status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<UserStatus>,
}

/// Commercial plan of a tenant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
	/// Free plan.
	Free,
	/// Basic plan.
	Basic,
	/// Professional plan.
	Professional,
	/// Enterprise plan.
	Enterprise,
}

/// Lifecycle status of a tenant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
	/// In good standing.
	Active,
	/// Closed.
	Inactive,
	/// Temporarily blocked.
	Suspended,
}

/// An ISP operating on the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
	/// Tenant identifier.
	pub id: String,
	/// Display name.
	pub name: String,
	/// URL-safe short name.
	pub slug: String,
	/// Billing and operations contact.
	pub contact_email: String,
	/// Plan.
	pub subscription_tier: SubscriptionTier,
	/// Device quota.
	pub max_devices: u32,
	/// User quota.
	pub max_users: u32,
	/// Lifecycle status.
	pub status: TenantStatus,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last update instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}

/// Payload for onboarding a tenant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateTenantRequest {
	/// Display name.
	pub name: String,
	/// URL-safe short name.
	pub slug: String,
	/// Billing and operations contact.
	pub contact_email: String,
	/// Plan.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subscription_tier: Option<SubscriptionTier>,
	/// Device quota.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_devices: Option<u32>,
	/// User quota.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_users: Option<u32>,
}

/// Partial update for a tenant; unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateTenantRequest {
	/// Display name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Billing and operations contact.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub contact_email: Option<String>,
	/// Plan.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub subscription_tier: Option<SubscriptionTier>,
	/// Device quota.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_devices: Option<u32>,
	/// User quota.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_users: Option<u32>,
	/// Lifecycle status.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<TenantStatus>,
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists users visible to the caller.
	pub async fn list_users(&self, paging: &ListQuery) -> Result<Page<User>> {
		self.execute_json(ApiRequest::get("/users").query(paging)?).await
	}

	/// Fetches one user.
	pub async fn user(&self, id: &str) -> Result<User> {
		self.get_json(format!("/users/{}", path_segment(id)?)).await
	}

	/// Applies a partial update to a user.
	pub async fn update_user(&self, id: &str, update: &UpdateUserRequest) -> Result<User> {
		self.put_json(format!("/users/{}", path_segment(id)?), update).await
	}

	/// Lists tenants.
	pub async fn list_tenants(&self, paging: &ListQuery) -> Result<Page<Tenant>> {
		self.execute_json(ApiRequest::get("/tenants").query(paging)?).await
	}

	/// Fetches one tenant.
	pub async fn tenant(&self, id: &str) -> Result<Tenant> {
		self.get_json(format!("/tenants/{}", path_segment(id)?)).await
	}

	/// Onboards a tenant.
	pub async fn create_tenant(&self, tenant: &CreateTenantRequest) -> Result<Tenant> {
		self.post_json("/tenants", tenant).await
	}

	/// Applies a partial update to a tenant.
	pub async fn update_tenant(&self, id: &str, update: &UpdateTenantRequest) -> Result<Tenant> {
		self.put_json(format!("/tenants/{}", path_segment(id)?), update).await
	}
}

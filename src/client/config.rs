//! Client configuration: API root, authentication endpoints, and transport knobs.

// self
use crate::{_prelude::*, error::ConfigError};

/// Static configuration shared by every clone of an [`ApiClient`](crate::client::ApiClient).
///
/// Paths are relative to [`base_url`](Self::base_url) and must start with `/`. Every
/// authentication endpoint (login, refresh, register, logout) has to live under
/// [`auth_prefix`](Self::auth_prefix): a 401 from any path under that prefix is surfaced as-is
/// and never triggers a refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// API root, e.g. `https://monitor.example.net/api/v1`.
	pub base_url: Url,
	/// Prefix shared by authentication endpoints.
	#[serde(default = "default_auth_prefix")]
	pub auth_prefix: String,
	/// Login endpoint.
	#[serde(default = "default_login_path")]
	pub login_path: String,
	/// Refresh-token exchange endpoint.
	#[serde(default = "default_refresh_path")]
	pub refresh_path: String,
	/// Self-service registration endpoint.
	#[serde(default = "default_register_path")]
	pub register_path: String,
	/// Logout endpoint.
	#[serde(default = "default_logout_path")]
	pub logout_path: String,
	/// Endpoint returning the signed-in user.
	#[serde(default = "default_current_user_path")]
	pub current_user_path: String,
	/// Unauthenticated entry point handed to observers when the session expires.
	#[serde(default = "default_login_entry_point")]
	pub login_entry_point: String,
	/// Whole-request timeout in seconds applied by the default transport.
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	/// `User-Agent` sent by the default transport.
	#[serde(default)]
	pub user_agent: Option<String>,
}
impl ClientConfig {
	/// Creates a configuration with default endpoint paths under `base_url`.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			auth_prefix: default_auth_prefix(),
			login_path: default_login_path(),
			refresh_path: default_refresh_path(),
			register_path: default_register_path(),
			logout_path: default_logout_path(),
			current_user_path: default_current_user_path(),
			login_entry_point: default_login_entry_point(),
			timeout_secs: None,
			user_agent: None,
		}
	}

	/// Overrides the authentication prefix.
	pub fn with_auth_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.auth_prefix = prefix.into();

		self
	}

	/// Overrides the login endpoint.
	pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the refresh endpoint.
	pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the registration endpoint.
	pub fn with_register_path(mut self, path: impl Into<String>) -> Self {
		self.register_path = path.into();

		self
	}

	/// Overrides the logout endpoint.
	pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
		self.logout_path = path.into();

		self
	}

	/// Overrides the current-user endpoint.
	pub fn with_current_user_path(mut self, path: impl Into<String>) -> Self {
		self.current_user_path = path.into();

		self
	}

	/// Overrides the entry point reported when the session expires.
	pub fn with_login_entry_point(mut self, entry_point: impl Into<String>) -> Self {
		self.login_entry_point = entry_point.into();

		self
	}

	/// Sets the whole-request timeout applied by the default transport.
	pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.timeout_secs = Some(timeout.as_secs().max(1));

		self
	}

	/// Sets the `User-Agent` sent by the default transport.
	pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = Some(agent.into());

		self
	}

	/// Timeout as a [`std::time::Duration`], if configured.
	pub fn timeout(&self) -> Option<std::time::Duration> {
		self.timeout_secs.map(std::time::Duration::from_secs)
	}

	/// Checks structural invariants: a usable API root and auth endpoints under the prefix.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.base_url.cannot_be_a_base() || !matches!(self.base_url.scheme(), "http" | "https")
		{
			return Err(ConfigError::InvalidBaseUrl { url: self.base_url.to_string() });
		}

		for path in [&self.login_path, &self.refresh_path, &self.register_path, &self.logout_path]
		{
			if !self.is_auth_endpoint(path) {
				return Err(ConfigError::AuthPathOutsidePrefix {
					path: path.clone(),
					prefix: self.auth_prefix.clone(),
				});
			}
		}

		Ok(())
	}

	/// Returns `true` when `path` belongs to the authentication surface.
	pub fn is_auth_endpoint(&self, path: &str) -> bool {
		!self.auth_prefix.is_empty() && path.starts_with(&self.auth_prefix)
	}

	/// Resolves `path` against the API root, keeping the root's own path segments.
	pub fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
		let root = self.base_url.as_str().trim_end_matches('/');
		let url = if path.starts_with('/') {
			format!("{root}{path}")
		} else {
			format!("{root}/{path}")
		};

		Url::parse(&url).map_err(|source| ConfigError::InvalidUrl { url, source })
	}
}

fn default_auth_prefix() -> String {
	"/auth/".into()
}

fn default_login_path() -> String {
	"/auth/login".into()
}

fn default_refresh_path() -> String {
	"/auth/refresh".into()
}

fn default_register_path() -> String {
	"/auth/register".into()
}

fn default_logout_path() -> String {
	"/auth/logout".into()
}

fn default_current_user_path() -> String {
	"/users/me".into()
}

fn default_login_entry_point() -> String {
	"/login".into()
}

//! Account payloads exchanged with the auth and user endpoints.

// self
use crate::{
	_prelude::*,
	auth::token::{
		pair::{TokenPair, TokenPairError},
		secret::TokenSecret,
	},
};

/// Account lifecycle status reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
	/// Account can sign in.
	Active,
	/// Account has been disabled.
	Inactive,
	/// Account awaits verification or approval.
	Pending,
}

/// Dashboard user as returned by `/users/me` and the login endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// User identifier.
	pub id: String,
	/// Tenant that owns the account.
	pub tenant_id: String,
	/// Sign-in email.
	pub email: String,
	/// Given name.
	pub first_name: String,
	/// Family name.
	pub last_name: String,
	/// Account status.
	pub status: UserStatus,
	/// Whether the email address has been verified.
	pub email_verified: bool,
	/// Role names granted to the user.
	#[serde(default)]
	pub roles: Vec<String>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last update instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl User {
	/// Returns `true` when the user carries the named role.
	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|granted| granted == role)
	}
}

/// Credentials posted to the login endpoint.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
	/// Sign-in email.
	pub email: String,
	/// Account password.
	pub password: TokenSecret,
}
impl LoginRequest {
	/// Creates a login request.
	pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
		Self { email: email.into(), password: TokenSecret::new(password) }
	}
}
impl Debug for LoginRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Payload returned by a successful login.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
	/// Issued access token.
	pub access_token: TokenSecret,
	/// Issued refresh token.
	pub refresh_token: TokenSecret,
	/// Token type label, normally `Bearer`.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Access-token lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
	/// Signed-in user.
	pub user: User,
}
impl LoginResponse {
	/// Extracts the validated token pair to persist.
	pub fn token_pair(&self) -> Result<TokenPair, TokenPairError> {
		TokenPair::new(self.access_token.expose(), self.refresh_token.expose())
	}
}

/// Self-service registration payload.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
	/// Sign-in email.
	pub email: String,
	/// Chosen password.
	pub password: TokenSecret,
	/// Given name.
	pub first_name: String,
	/// Family name.
	pub last_name: String,
	/// Tenant to join, when registering into an existing tenant.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tenant_id: Option<String>,
}
impl Debug for RegisterRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RegisterRequest")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.field("first_name", &self.first_name)
			.field("last_name", &self.last_name)
			.field("tenant_id", &self.tenant_id)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const USER_JSON: &str = r#"{
		"id": "u-1",
		"tenant_id": "t-1",
		"email": "noc@example.net",
		"first_name": "Nadia",
		"last_name": "Okafor",
		"status": "active",
		"email_verified": true,
		"roles": ["admin"],
		"created_at": "2025-01-01T00:00:00Z",
		"updated_at": "2025-01-02T08:30:00Z"
	}"#;

	#[test]
	fn login_response_yields_token_pair() {
		let body = format!(
			r#"{{"access_token":"a","refresh_token":"r","token_type":"Bearer","expires_in":900,"user":{USER_JSON}}}"#
		);
		let response: LoginResponse =
			serde_json::from_str(&body).expect("Login payload should decode.");
		let pair = response.token_pair().expect("Login payload should carry a full pair.");

		assert_eq!(pair.refresh_token.expose(), "r");
		assert!(response.user.has_role("admin"));
		assert_eq!(response.user.status, UserStatus::Active);
	}

	#[test]
	fn login_request_serializes_password_but_redacts_debug() {
		let request = LoginRequest::new("noc@example.net", "hunter2");
		let json = serde_json::to_string(&request).expect("Login request should encode.");

		assert_eq!(json, r#"{"email":"noc@example.net","password":"hunter2"}"#);
		assert!(!format!("{request:?}").contains("hunter2"));
	}

	#[test]
	fn register_request_omits_missing_tenant() {
		let request = RegisterRequest {
			email: "ops@example.net".into(),
			password: TokenSecret::new("pw"),
			first_name: "Ops".into(),
			last_name: "Team".into(),
			tenant_id: None,
		};
		let json = serde_json::to_value(&request).expect("Register request should encode.");

		assert!(json.get("tenant_id").is_none());
	}
}

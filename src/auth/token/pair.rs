//! The access/refresh token pair and the wire payload the auth endpoints return.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Errors produced while validating a [`TokenPair`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenPairError {
	/// Access token was empty or whitespace.
	#[error("Access token must not be empty.")]
	EmptyAccessToken,
	/// Refresh token was empty, whitespace, or missing with nothing to fall back to.
	#[error("Refresh token must not be empty.")]
	EmptyRefreshToken,
}

/// Access and refresh tokens that are always stored, read, and cleared together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TokenPairRepr", into = "TokenPairRepr")]
pub struct TokenPair {
	/// Short-lived credential attached to outbound requests.
	pub access_token: TokenSecret,
	/// Longer-lived credential exchanged for a new pair.
	pub refresh_token: TokenSecret,
}
impl TokenPair {
	/// Builds a pair after checking that neither half is blank.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
	) -> Result<Self, TokenPairError> {
		let access_token = TokenSecret::new(access_token);
		let refresh_token = TokenSecret::new(refresh_token);

		if access_token.is_blank() {
			return Err(TokenPairError::EmptyAccessToken);
		}
		if refresh_token.is_blank() {
			return Err(TokenPairError::EmptyRefreshToken);
		}

		Ok(Self { access_token, refresh_token })
	}
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.finish()
	}
}

#[derive(Clone, Serialize, Deserialize)]
struct TokenPairRepr {
	access_token: String,
	refresh_token: String,
}
impl TryFrom<TokenPairRepr> for TokenPair {
	type Error = TokenPairError;

	fn try_from(value: TokenPairRepr) -> Result<Self, Self::Error> {
		Self::new(value.access_token, value.refresh_token)
	}
}
impl From<TokenPair> for TokenPairRepr {
	fn from(value: TokenPair) -> Self {
		Self {
			access_token: value.access_token.expose().to_owned(),
			refresh_token: value.refresh_token.expose().to_owned(),
		}
	}
}

/// Token payload returned by the refresh endpoint.
///
/// `token_type` and `expires_in` are informational; the client reacts to 401s rather than
/// tracking expiry locally.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenGrant {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Rotated refresh token; absent when the backend keeps the previous one valid.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Token type label, normally `Bearer`.
	#[serde(default)]
	pub token_type: Option<String>,
	/// Access-token lifetime in seconds.
	#[serde(default)]
	pub expires_in: Option<i64>,
}
impl TokenGrant {
	/// Converts the grant into a [`TokenPair`], reusing `previous_refresh` when the backend
	/// did not rotate the refresh token.
	pub fn into_pair(
		self,
		previous_refresh: Option<&TokenSecret>,
	) -> Result<TokenPair, TokenPairError> {
		let refresh = self
			.refresh_token
			.filter(|secret| !secret.is_blank())
			.or_else(|| previous_refresh.cloned())
			.ok_or(TokenPairError::EmptyRefreshToken)?;

		TokenPair::new(self.access_token.expose(), refresh.expose())
	}
}

/// Request body sent to the refresh endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct RefreshRequest {
	/// Refresh token being exchanged.
	pub refresh_token: TokenSecret,
}

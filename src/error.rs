//! Client-level error types shared across the pipeline, refresh coordinator, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout); no response was received.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The session could not be recovered; local credentials have been cleared.
	#[error("Session expired: {0}")]
	SessionExpired(#[from] RefreshFailure),

	/// Backend answered 401 and the client did not (or could no longer) recover.
	#[error("Request to `{path}` was rejected as unauthorized.")]
	Unauthorized {
		/// Request path relative to the API base URL.
		path: String,
		/// Backend-supplied message, when the body carried one.
		message: Option<String>,
	},
	/// Backend answered with a non-success status other than 401.
	#[error("API returned HTTP {status} for `{path}`: {message}.")]
	Api {
		/// Request path relative to the API base URL.
		path: String,
		/// HTTP status code.
		status: u16,
		/// Machine-readable error code from the body, if any.
		code: Option<String>,
		/// Human-readable message from the body, or the status reason.
		message: String,
		/// Retry-After hint, if the backend supplied one.
		retry_after: Option<Duration>,
	},
	/// Response body did not match the expected JSON shape.
	#[error("Response from `{path}` could not be decoded.")]
	Decode {
		/// Request path relative to the API base URL.
		path: String,
		/// Structured parsing failure, including the offending field path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns `true` when the backend rejected the caller's credentials.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized { .. })
	}

	/// Returns `true` when the session ended because the refresh cycle failed.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired(_))
	}

	/// HTTP status attached to the error, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Unauthorized { .. } => Some(401),
			Self::Api { status, .. } => Some(*status),
			Self::SessionExpired(RefreshFailure::Rejected { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A header value (typically the bearer credential) contains forbidden bytes.
	#[error("Header value contains characters that cannot be sent.")]
	InvalidHeaderValue(#[from] oauth2::http::header::InvalidHeaderValue),
	/// Base URL cannot have paths appended to it.
	#[error("Base URL `{url}` cannot be used as an API root.")]
	InvalidBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending URL.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Authentication endpoint is not covered by the configured auth prefix.
	#[error("Auth endpoint `{path}` lies outside the auth prefix `{prefix}`.")]
	AuthPathOutsidePrefix {
		/// Offending endpoint path.
		path: String,
		/// Configured auth prefix.
		prefix: String,
	},
	/// Request body or query could not be serialized.
	#[error("Request payload could not be encoded.")]
	Encode(#[source] serde_json::Error),
	/// Resource identifier cannot be used as a single URL path segment.
	#[error("Identifier `{segment}` cannot be used as a path segment.")]
	InvalidPathSegment {
		/// Offending identifier.
		segment: String,
	},
	/// Query parameters must serialize to a flat JSON object.
	#[error("Query parameters must serialize to a flat object.")]
	UnsupportedQuery,
	/// Token pair failed validation.
	#[error("Token pair is invalid.")]
	InvalidTokenPair(#[from] crate::auth::TokenPairError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling `{path}`.")]
	Network {
		/// Request path relative to the API base URL.
		path: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete before the transport deadline.
	#[error("Request to `{path}` timed out.")]
	Timeout {
		/// Request path relative to the API base URL.
		path: String,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure it could only describe as text.
	#[error("HTTP client error occurred while calling `{path}`: {message}.")]
	Other {
		/// Request path relative to the API base URL.
		path: String,
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		path: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { path: path.into(), source: Box::new(src) }
	}
}

/// Outcome of a failed refresh cycle, shared verbatim with every request waiting on it.
///
/// Every variant except [`RefreshFailure::Abandoned`] is terminal for the session: local
/// credentials are cleared before the failure is delivered.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshFailure {
	/// No refresh token was stored when the refresh was attempted.
	#[error("No refresh token is available.")]
	MissingRefreshToken,
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the refresh token with HTTP {status}: {message}.")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Backend-supplied message, or the status reason.
		message: String,
	},
	/// Refresh request could not be built or sent, or timed out.
	#[error("Refresh request failed: {message}.")]
	Transport {
		/// Rendered transport error.
		message: String,
	},
	/// Refresh endpoint answered 2xx with a payload that is not a usable token pair.
	#[error("Refresh endpoint returned an unusable token pair: {message}.")]
	MalformedResponse {
		/// Rendered decode or validation error.
		message: String,
	},
	/// Refreshed tokens could not be persisted.
	#[error("Refreshed tokens could not be stored: {message}.")]
	Storage {
		/// Rendered store error.
		message: String,
	},
	/// The request driving the refresh was dropped before the exchange resolved.
	///
	/// Local credentials are left untouched. [`ApiClient`](crate::client::ApiClient) never
	/// surfaces this variant; its waiters move on to a new cycle.
	#[error("Refresh was abandoned before it completed.")]
	Abandoned,
}

/// Renders an error and its `source()` chain as one `outer: inner: ...` line.
pub(crate) fn render_chain(err: &(dyn StdError + 'static)) -> String {
	let mut rendered = err.to_string();
	let mut source = err.source();

	while let Some(cause) = source {
		rendered.push_str(": ");
		rendered.push_str(&cause.to_string());

		source = cause.source();
	}

	rendered
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_is_reported_for_http_failures() {
		let unauthorized = Error::Unauthorized { path: "/routers".into(), message: None };
		let rejected = Error::from(RefreshFailure::Rejected {
			status: 401,
			message: "Invalid refresh token".into(),
		});
		let missing = Error::from(RefreshFailure::MissingRefreshToken);

		assert_eq!(unauthorized.status(), Some(401));
		assert!(unauthorized.is_unauthorized());
		assert_eq!(rejected.status(), Some(401));
		assert!(rejected.is_session_expired());
		assert_eq!(missing.status(), None);
	}

	#[test]
	fn session_expired_renders_reason() {
		let err = Error::from(RefreshFailure::MissingRefreshToken);

		assert_eq!(err.to_string(), "Session expired: No refresh token is available.");
	}

	#[test]
	fn transport_network_keeps_source() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
		let err = Error::from(TransportError::network("/alerts", io));
		let source = StdError::source(&err).expect("Transport error should expose a source.");

		assert!(err.to_string().contains("/alerts"));
		assert_eq!(source.to_string(), "refused");
		assert_eq!(
			render_chain(&err),
			"Network error occurred while calling `/alerts`.: refused"
		);
	}
}

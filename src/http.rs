//! Transport primitives for API calls.
//!
//! [`ApiHttpClient`] is the client's only dependency on an HTTP stack. Implementations hand
//! out [`AsyncHttpClient`] handles that execute fully built `http` requests; the pipeline
//! attaches credentials before the handle ever sees a request and inspects the status after
//! it returns, so transports stay oblivious to tokens. [`ApiResponse`] is the buffered result
//! callers receive from [`ApiClient::execute`](crate::client::ApiClient::execute).

pub use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
};

// std
use std::borrow::Cow;
// crates.io
use oauth2::http::header::RETRY_AFTER;
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports capable of executing API calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back every clone of
/// an [`ApiClient`](crate::client::ApiClient). Handles must own whatever state their request
/// futures need so those futures stay `Send` for the lifetime of the call.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle used for a single call.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Returns a handle ready to execute one request.
	fn handle(&self) -> Self::Handle;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// API calls should not follow redirects: a redirect would replay the bearer credential to a
/// different origin. [`ReqwestHttpClient::from_config`] disables them; configure any custom
/// [`ReqwestClient`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the configured timeout and user agent, with redirects off.
	pub fn from_config(
		config: &crate::client::ClientConfig,
	) -> Result<Self, crate::error::ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		if let Some(timeout) = config.timeout() {
			builder = builder.timeout(timeout);
		}
		if let Some(agent) = &config.user_agent {
			builder = builder.user_agent(agent.as_str());
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self) -> Self::Handle {
		ReqwestHandle(self.0.clone())
	}
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`ApiHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHandle(ReqwestClient);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Error body shape used by the backend for every non-success status.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
	/// Machine-readable error code.
	#[serde(default)]
	pub code: Option<String>,
	/// Human-readable message.
	#[serde(default)]
	pub message: Option<String>,
	/// Free-form details or field-level validation errors.
	#[serde(default)]
	pub details: Option<serde_json::Value>,
}

/// Buffered response returned by the request pipeline.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	path: String,
	status: StatusCode,
	headers: HeaderMap,
	body: Vec<u8>,
}
impl ApiResponse {
	/// Assembles a response for the request issued against `path`.
	pub fn new(
		path: impl Into<String>,
		status: StatusCode,
		headers: HeaderMap,
		body: Vec<u8>,
	) -> Self {
		Self { path: path.into(), status, headers, body }
	}

	pub(crate) fn from_http(path: &str, response: HttpResponse) -> Self {
		let (parts, body) = response.into_parts();

		Self::new(path, parts.status, parts.headers, body)
	}

	/// Request path this response answers, relative to the API base URL.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// HTTP status.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Raw body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Consumes the response, returning the body bytes.
	pub fn into_body(self) -> Vec<u8> {
		self.body
	}

	/// Body rendered as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Returns `true` when the backend rejected the credentials (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		self.status == StatusCode::UNAUTHORIZED
	}

	/// Decodes the body as JSON, reporting the failing field path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { path: self.path.clone(), source })
	}

	/// Parses the `Retry-After` header as delta-seconds or an RFC 2822 date.
	pub fn retry_after(&self) -> Option<Duration> {
		parse_retry_after(&self.headers)
	}

	/// Parses the backend's error body, when present and well-formed.
	pub fn error_body(&self) -> Option<ApiErrorBody> {
		serde_json::from_slice(&self.body).ok()
	}

	/// Best available human-readable failure description.
	pub fn error_message(&self) -> String {
		self.error_body()
			.and_then(|body| body.message)
			.or_else(|| self.status.canonical_reason().map(str::to_owned))
			.unwrap_or_else(|| format!("HTTP {}", self.status.as_u16()))
	}

	/// Passes 2xx responses through and converts everything else into an [`Error`].
	pub fn error_for_status(self) -> Result<Self> {
		if self.is_success() {
			return Ok(self);
		}
		if self.is_unauthorized() {
			return Err(self.into_unauthorized());
		}

		let body = self.error_body().unwrap_or_default();

		Err(Error::Api {
			message: body.message.unwrap_or_else(|| self.error_message()),
			code: body.code,
			retry_after: self.retry_after(),
			status: self.status.as_u16(),
			path: self.path,
		})
	}

	pub(crate) fn into_unauthorized(self) -> Error {
		let message = self.error_body().and_then(|body| body.message);

		Error::Unauthorized { path: self.path, message }
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

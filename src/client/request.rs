//! Replayable request descriptions.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::ClientConfig,
	error::ConfigError,
	http::{HeaderMap, HeaderName, HeaderValue, HttpRequest, Method, header},
};

/// A request the pipeline can send, and resend once after a token refresh.
///
/// Everything needed to rebuild the wire request lives here, so replays are exact copies
/// with only the `Authorization` header swapped. The `retried` flag caps automatic replays
/// at one per request.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	method: Method,
	path: String,
	query: Vec<(String, String)>,
	headers: HeaderMap,
	body: Option<Vec<u8>>,
	retried: bool,
}
impl ApiRequest {
	/// Creates a request for `path`, relative to the API root.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			body: None,
			retried: false,
		}
	}

	/// `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Appends one query parameter.
	pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Appends every field of `params`, which must serialize to a flat JSON object.
	///
	/// `null` fields are skipped; strings are sent verbatim and other scalars in their JSON
	/// rendering.
	pub fn query<Q>(mut self, params: &Q) -> Result<Self, ConfigError>
	where
		Q: ?Sized + Serialize,
	{
		let serde_json::Value::Object(fields) =
			serde_json::to_value(params).map_err(ConfigError::Encode)?
		else {
			return Err(ConfigError::UnsupportedQuery);
		};

		for (key, value) in fields {
			let value = match value {
				serde_json::Value::Null => continue,
				serde_json::Value::String(s) => s,
				serde_json::Value::Bool(_) | serde_json::Value::Number(_) => value.to_string(),
				_ => return Err(ConfigError::UnsupportedQuery),
			};

			self.query.push((key, value));
		}

		Ok(self)
	}

	/// Sets a header, replacing previous values with the same name.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body).map_err(ConfigError::Encode)?);
		self.headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Ok(self)
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Path relative to the API root.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Query parameters in insertion order.
	pub fn query_pairs(&self) -> &[(String, String)] {
		&self.query
	}

	/// Returns `true` once the request has been replayed after a refresh.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}

	/// Builds the wire request, attaching `bearer` when present.
	pub(crate) fn to_http(
		&self,
		config: &ClientConfig,
		bearer: Option<&TokenSecret>,
	) -> Result<HttpRequest, ConfigError> {
		let mut url = config.endpoint_url(&self.path)?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		let mut builder = oauth2::http::Request::builder()
			.method(self.method.clone())
			.uri(url.as_str())
			.header(header::ACCEPT, HeaderValue::from_static("application/json"));

		for (name, value) in &self.headers {
			if name != header::AUTHORIZATION {
				builder = builder.header(name, value);
			}
		}
		if let Some(token) = bearer {
			builder = builder.header(header::AUTHORIZATION, token.bearer_header()?);
		}

		Ok(builder.body(self.body.clone().unwrap_or_default())?)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig::new(Url::parse("http://localhost:8080/api/v1").expect("Fixture URL should parse."))
	}

	#[derive(Serialize)]
	struct Filters {
		page: Option<u32>,
		status: Option<&'static str>,
		search: Option<&'static str>,
	}

	#[test]
	fn query_skips_unset_fields() {
		let request = ApiRequest::get("/routers")
			.query(&Filters { page: Some(2), status: None, search: Some("core edge") })
			.expect("Flat filters should encode.");
		let http = request.to_http(&config(), None).expect("Request should build.");

		assert_eq!(http.uri().path(), "/api/v1/routers");
		assert_eq!(http.uri().query(), Some("page=2&search=core+edge"));
		assert!(http.headers().get(header::AUTHORIZATION).is_none());
	}

	#[test]
	fn nested_query_is_rejected() {
		let err = ApiRequest::get("/routers")
			.query(&serde_json::json!({ "filter": { "status": "active" } }))
			.expect_err("Nested query should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedQuery));
	}

	#[test]
	fn bearer_replaces_caller_authorization() {
		let request = ApiRequest::post("/alerts/a-1/acknowledge")
			.header(header::AUTHORIZATION, HeaderValue::from_static("Bearer forged"))
			.json(&serde_json::json!({ "note": "on it" }))
			.expect("Body should encode.");
		let http = request
			.to_http(&config(), Some(&TokenSecret::new("real")))
			.expect("Request should build.");
		let values: Vec<_> = http.headers().get_all(header::AUTHORIZATION).iter().collect();

		assert_eq!(values, [HeaderValue::from_static("Bearer real")]);
		assert_eq!(http.method(), Method::POST);
		assert_eq!(http.body().as_slice(), br#"{"note":"on it"}"#);
		assert_eq!(
			http.headers().get(header::CONTENT_TYPE),
			Some(&HeaderValue::from_static("application/json"))
		);
	}

	#[test]
	fn retried_flag_starts_clear() {
		let mut request = ApiRequest::get("/routers");

		assert!(!request.is_retried());

		request.mark_retried();

		assert!(request.is_retried());
		assert!(request.clone().is_retried());
	}
}

//! Bearer attachment, 401 recovery, and typed JSON helpers.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::{ApiClient, ApiRequest},
	http::{ApiHttpClient, ApiResponse, AsyncHttpClient},
	obs::{self, CallKind, CallOutcome, CallSpan, trace_event},
	transport::TransportErrorMapper,
};

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Sends `request` with the stored access token, recovering once from a 401.
	///
	/// Every response other than 401 comes back as `Ok`, error statuses included; use
	/// [`ApiResponse::error_for_status`] or the typed helpers to turn those into errors. A 401
	/// from a non-authentication endpoint joins (or starts) the shared refresh cycle and the
	/// request is replayed once with the new token. A 401 from an authentication endpoint, or
	/// from the replay, surfaces as [`Error::Unauthorized`]. A failed refresh surfaces as
	/// [`Error::SessionExpired`] after the session has been cleared. Transport failures never
	/// trigger a refresh.
	pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::request(request.method(), request.path());

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.execute_with_recovery(request, &span)).await;

		obs::record_call_outcome(KIND, CallOutcome::of(&result));

		result
	}

	/// Executes `request` and decodes a 2xx JSON body into `T`.
	pub async fn execute_json<T>(&self, request: ApiRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.execute(request).await?.error_for_status()?.json()
	}

	/// Executes `request`, discarding the body of a 2xx response.
	pub async fn execute_unit(&self, request: ApiRequest) -> Result<()> {
		self.execute(request).await?.error_for_status()?;

		Ok(())
	}

	/// `GET path`, decoding the JSON response.
	pub async fn get_json<T>(&self, path: impl Into<String>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.execute_json(ApiRequest::get(path)).await
	}

	/// `POST path` with a JSON body, decoding the JSON response.
	pub async fn post_json<B, T>(&self, path: impl Into<String>, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.execute_json(ApiRequest::post(path).json(body)?).await
	}

	/// `PUT path` with a JSON body, decoding the JSON response.
	pub async fn put_json<B, T>(&self, path: impl Into<String>, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.execute_json(ApiRequest::put(path).json(body)?).await
	}

	/// `POST path` without a body, ignoring the response body.
	pub async fn post_empty(&self, path: impl Into<String>) -> Result<()> {
		self.execute_unit(ApiRequest::post(path)).await
	}

	/// `DELETE path`, ignoring the response body.
	pub async fn delete(&self, path: impl Into<String>) -> Result<()> {
		self.execute_unit(ApiRequest::delete(path)).await
	}

	async fn execute_with_recovery(
		&self,
		mut request: ApiRequest,
		span: &CallSpan,
	) -> Result<ApiResponse> {
		let mut bearer = self.store.access_token();

		loop {
			let response = self.send(&request, bearer.as_ref()).await?;

			if !response.is_unauthorized() {
				return Ok(response);
			}
			if self.config.is_auth_endpoint(request.path()) || request.is_retried() {
				trace_event!(
					path = request.path(),
					retried = request.is_retried(),
					"surfacing unauthorized response"
				);

				return Err(response.into_unauthorized());
			}

			request.mark_retried();

			bearer = Some(self.fresh_access_token().await?);

			span.record_replay();
			trace_event!(path = request.path(), "replaying request with refreshed token");
		}
	}

	/// Builds and sends one wire request. No 401 handling happens here.
	pub(crate) async fn send(
		&self,
		request: &ApiRequest,
		bearer: Option<&TokenSecret>,
	) -> Result<ApiResponse> {
		let http_request = request.to_http(&self.config, bearer)?;
		let handle = self.http_client.handle();
		let response = handle
			.call(http_request)
			.await
			.map_err(|err| self.transport_mapper.map_transport_error(request.path(), err))?;

		Ok(ApiResponse::from_http(request.path(), response))
	}
}

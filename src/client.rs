//! The authenticated API client and its request pipeline.
//!
//! [`ApiClient`] owns the transport, the token store, the refresh coordinator, and the session
//! observer. Every outbound call goes through [`ApiClient::execute`], which attaches the
//! stored access token and, when the backend answers 401, runs one shared refresh cycle and
//! replays the request exactly once.

pub mod config;
pub mod refresh;
pub mod request;
pub mod session;

mod pipeline;

pub use config::*;
pub use refresh::*;
pub use request::*;

// self
use crate::{
	_prelude::*,
	http::ApiHttpClient,
	lifecycle::{NoopObserver, SessionEvent, SessionObserver},
	store::TokenStore,
	transport::TransportErrorMapper,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, transport::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Authenticated client for the ISP monitor REST API.
///
/// Clones are cheap and share the same store, coordinator, and observer, so a single refresh
/// cycle covers every clone. Construct one per signed-in session and hand clones to whatever
/// needs to call the backend.
pub struct ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Store holding the session's token pair.
	pub store: Arc<dyn TokenStore>,
	/// Endpoint layout and transport knobs.
	pub config: Arc<ClientConfig>,
	/// Receiver of session lifecycle events.
	pub observer: Arc<dyn SessionObserver>,
	/// Single-flight refresh state shared by all clones.
	pub refresh: Arc<RefreshCoordinator>,
}
impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn TokenStore>,
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			config: Arc::new(config),
			observer: Arc::new(NoopObserver),
			refresh: Default::default(),
		}
	}

	/// Installs the observer that receives session lifecycle events.
	pub fn with_observer<O>(mut self, observer: Arc<O>) -> Self
	where
		O: 'static + SessionObserver,
	{
		self.observer = observer;

		self
	}

	pub(crate) fn notify(&self, event: SessionEvent) {
		self.observer.notify(&event);
	}
}
impl<C, M> Clone for ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			observer: self.observer.clone(),
			refresh: self.refresh.clone(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client backed by a reqwest transport built from `config`.
	///
	/// The configuration is validated first; the transport honors its timeout and user agent
	/// and never follows redirects.
	pub fn new(store: Arc<dyn TokenStore>, config: ClientConfig) -> Result<Self> {
		config.validate()?;

		let http_client = ReqwestHttpClient::from_config(&config)?;

		Ok(Self::with_http_client(store, config, http_client, ReqwestTransportErrorMapper))
	}
}
impl<C, M> Debug for ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("signed_in", &self.store.tokens().is_some())
			.field("refresh_phase", &self.refresh.phase())
			.finish()
	}
}

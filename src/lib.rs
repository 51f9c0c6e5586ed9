//! Authenticated REST client for the ISP monitor backend: bearer attachment, single-flight token
//! refresh, and transparent request replay behind a single [`execute`](client::ApiClient::execute)
//! call.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod obs;
pub mod store;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{ApiClient, ClientConfig},
		http::ReqwestHttpClient,
		lifecycle::{SessionEvent, SessionObserver},
		store::{MemoryStore, TokenStore},
		transport::ReqwestTransportErrorMapper,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Observer that keeps every session event it receives, in arrival order.
	#[derive(Debug, Default)]
	pub struct RecordingObserver(Mutex<Vec<SessionEvent>>);
	impl RecordingObserver {
		/// Returns a snapshot of the recorded events.
		pub fn events(&self) -> Vec<SessionEvent> {
			self.0.lock().clone()
		}
	}
	impl SessionObserver for RecordingObserver {
		fn notify(&self, event: &SessionEvent) {
			self.0.lock().push(event.clone());
		}
	}

	/// Builds a [`ClientConfig`] rooted at `{server}/api/v1`.
	pub fn test_config(server_base: &str) -> ClientConfig {
		let base = format!("{}/api/v1", server_base.trim_end_matches('/'));

		ClientConfig::new(Url::parse(&base).expect("Mock server base URL should parse."))
	}

	/// Constructs an [`ApiClient`] backed by an in-memory store, a recording observer, and the
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(
		server_base: &str,
	) -> (ReqwestTestClient, Arc<MemoryStore>, Arc<RecordingObserver>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let observer = Arc::new(RecordingObserver::default());
		let http_client = ReqwestHttpClient::with_client(
			ReqwestClient::builder()
				.redirect(reqwest::redirect::Policy::none())
				.build()
				.expect("Failed to build Reqwest client for tests."),
		);
		let client = ReqwestTestClient::with_http_client(
			store,
			test_config(server_base),
			http_client,
			ReqwestTransportErrorMapper,
		)
		.with_observer(observer.clone());

		(client, store_backend, observer)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::OnceCell as AsyncOnceCell;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

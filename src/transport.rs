//! Mapping of transport failures into client [`Error`] values.

// crates.io
use oauth2::HttpClientError;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Maps HTTP transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] raised while calling `path` into a client error.
	fn map_transport_error(&self, path: &str, error: HttpClientError<E>) -> Error;
}

/// Mapper for arbitrary transports; every transport-specific error becomes a network failure.
#[derive(Clone, Debug, Default)]
pub struct GenericTransportErrorMapper;
impl<E> TransportErrorMapper<E> for GenericTransportErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(&self, path: &str, error: HttpClientError<E>) -> Error {
		map_common_error(path, error)
	}
}

/// Default mapper for reqwest-backed transports; distinguishes timeouts and builder failures.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, path: &str, error: HttpClientError<ReqwestError>) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => map_reqwest_error(path, *inner),
			other => map_common_error(path, other),
		}
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(path: &str, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransportError::Timeout { path: path.to_owned() }.into();
	}

	TransportError::network(path, err).into()
}

fn map_common_error<E>(path: &str, error: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match error {
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			TransportError::Other { path: path.to_owned(), message }.into(),
		HttpClientError::Reqwest(inner) => TransportError::network(path, *inner).into(),
		_ => TransportError::Other {
			path: path.to_owned(),
			message: "Unrecognized HTTP client failure".into(),
		}
		.into(),
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::io;
	// self
	use super::*;

	#[test]
	fn generic_mapper_classifies_variants() {
		let mapper = GenericTransportErrorMapper;
		let network = TransportErrorMapper::<io::Error>::map_transport_error(
			&mapper,
			"/alerts",
			HttpClientError::Reqwest(Box::new(io::Error::other("reset"))),
		);
		let other = TransportErrorMapper::<io::Error>::map_transport_error(
			&mapper,
			"/alerts",
			HttpClientError::Other("socket closed".into()),
		);

		assert!(matches!(network, Error::Transport(TransportError::Network { ref path, .. }) if path == "/alerts"));
		assert!(matches!(other, Error::Transport(TransportError::Other { ref message, .. }) if message == "socket closed"));
	}
}

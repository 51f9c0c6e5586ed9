//! Storage contract and built-in backends for the current session's token pair.
//!
//! Reads are synchronous so the request pipeline can attach credentials without
//! suspending. Writers swap the whole [`TokenPair`] at once; a reader observes either
//! the previous pair or the new one, never a mix.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{TokenPair, TokenSecret},
};

/// Storage backend contract implemented by token stores.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns a snapshot of the stored pair, if any.
	fn tokens(&self) -> Option<TokenPair>;

	/// Replaces both tokens in one step.
	fn set_tokens(&self, pair: TokenPair) -> Result<(), StoreError>;

	/// Removes both tokens in one step.
	fn clear_tokens(&self) -> Result<(), StoreError>;

	/// Returns the current access token.
	fn access_token(&self) -> Option<TokenSecret> {
		self.tokens().map(|pair| pair.access_token)
	}

	/// Returns the current refresh token.
	fn refresh_token(&self) -> Option<TokenSecret> {
		self.tokens().map(|pair| pair.refresh_token)
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

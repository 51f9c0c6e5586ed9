//! Thread-safe in-memory [`TokenStore`] implementation for tests and short-lived tools.

// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	store::{StoreError, TokenStore},
};

/// Process-local storage backend; tokens vanish with the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Option<TokenPair>>>);
impl MemoryStore {
	/// Creates a store pre-seeded with `pair`.
	pub fn with_tokens(pair: TokenPair) -> Self {
		Self(Arc::new(RwLock::new(Some(pair))))
	}
}
impl TokenStore for MemoryStore {
	fn tokens(&self) -> Option<TokenPair> {
		self.0.read().clone()
	}

	fn set_tokens(&self, pair: TokenPair) -> Result<(), StoreError> {
		*self.0.write() = Some(pair);

		Ok(())
	}

	fn clear_tokens(&self) -> Result<(), StoreError> {
		self.0.write().take();

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::thread;
	// self
	use super::*;

	fn pair(access: &str, refresh: &str) -> TokenPair {
		TokenPair::new(access, refresh).expect("Fixture pair should be valid.")
	}

	#[test]
	fn set_and_clear_move_both_tokens() {
		let store = MemoryStore::with_tokens(pair("old", "old-refresh"));

		store.set_tokens(pair("A", "B")).expect("Memory store writes should succeed.");

		let current = store.tokens().expect("Pair should be present after set.");

		assert_eq!(current.access_token.expose(), "A");
		assert_eq!(current.refresh_token.expose(), "B");

		store.clear_tokens().expect("Memory store clears should succeed.");

		assert!(store.tokens().is_none());
	}

	#[test]
	fn concurrent_readers_never_see_mixed_pairs() {
		let store = MemoryStore::with_tokens(pair("a-0", "r-0"));
		let writer = {
			let store = store.clone();

			thread::spawn(move || {
				for i in 1..500 {
					store
						.set_tokens(pair(&format!("a-{i}"), &format!("r-{i}")))
						.expect("Memory store writes should succeed.");
				}
			})
		};

		for _ in 0..500 {
			let snapshot = store.tokens().expect("Pair should stay present while rotating.");
			let access_suffix = snapshot.access_token.expose().trim_start_matches("a-");
			let refresh_suffix = snapshot.refresh_token.expose().trim_start_matches("r-");

			assert_eq!(access_suffix, refresh_suffix);
		}

		writer.join().expect("Writer thread should not panic.");
	}
}

//! Session lifecycle notifications.
//!
//! The client never navigates anywhere itself. When a session ends because a refresh
//! cycle failed, it clears the stored credentials, fails the affected requests, and tells the
//! registered [`SessionObserver`] where the user should be sent. The observer owns the actual
//! navigation (a hard redirect in a UI shell, a re-login prompt in a CLI, ...).

// self
use crate::{_prelude::*, error::RefreshFailure};

/// Events emitted over the lifetime of a signed-in session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// Login succeeded and a fresh token pair was stored.
	LoggedIn {
		/// Identifier of the signed-in user.
		user_id: String,
	},
	/// A refresh cycle stored a new token pair.
	TokensRefreshed,
	/// Logout ran; local credentials are gone regardless of the backend's answer.
	LoggedOut,
	/// A refresh cycle failed; local credentials are gone and the user must sign in again.
	Expired {
		/// Why the refresh cycle failed.
		reason: RefreshFailure,
		/// Unauthenticated entry point the observer should navigate to.
		redirect_to: String,
	},
}

/// Receives [`SessionEvent`]s. Implementations must be cheap and must not block.
pub trait SessionObserver
where
	Self: Send + Sync,
{
	/// Handles one event.
	fn notify(&self, event: &SessionEvent);
}
impl<F> SessionObserver for F
where
	F: Fn(&SessionEvent) + Send + Sync,
{
	fn notify(&self, event: &SessionEvent) {
		self(event)
	}
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;
impl SessionObserver for NoopObserver {
	fn notify(&self, _event: &SessionEvent) {}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	#[test]
	fn closures_act_as_observers() {
		let expired = Arc::new(AtomicUsize::new(0));
		let counter = expired.clone();
		let observer: Arc<dyn SessionObserver> = Arc::new(move |event: &SessionEvent| {
			if matches!(event, SessionEvent::Expired { .. }) {
				counter.fetch_add(1, Ordering::SeqCst);
			}
		});

		observer.notify(&SessionEvent::TokensRefreshed);
		observer.notify(&SessionEvent::Expired {
			reason: RefreshFailure::MissingRefreshToken,
			redirect_to: "/login".into(),
		});
		NoopObserver.notify(&SessionEvent::LoggedOut);

		assert_eq!(expired.load(Ordering::SeqCst), 1);
	}
}

//! Single-flight coordination of refresh-token exchanges.
//!
//! [`RefreshCoordinator`] owns the `Idle`/`Refreshing` phase. The first caller that arrives
//! while the coordinator is idle becomes the cycle's leader and runs the exchange; everyone
//! arriving before that exchange resolves joins the same cycle and receives an identical
//! outcome through a one-shot cell. The phase is reset to `Idle` before the outcome is
//! published, so a caller arriving after the drain always starts a fresh cycle instead of
//! reading a stale result.
//!
//! The exchange itself runs on [`ApiClient`]: the leader posts the stored refresh token to the
//! refresh endpoint without a bearer, persists the new pair on success, and on any failure
//! clears the store and emits [`SessionEvent::Expired`] once for the whole cycle.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{RefreshRequest, TokenGrant, TokenSecret},
	client::{ApiClient, ApiRequest},
	error::{self, RefreshFailure},
	http::ApiHttpClient,
	lifecycle::SessionEvent,
	obs::{self, CallKind, CallOutcome, CallSpan, trace_event},
	transport::TransportErrorMapper,
};

/// Outcome shared by every participant of a refresh cycle.
pub type RefreshOutcome = Result<TokenSecret, RefreshFailure>;

/// Coarse coordinator state, exposed for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPhase {
	/// No exchange is in flight.
	Idle,
	/// An exchange is in flight; new callers join it.
	Refreshing,
}

/// Owns the refresh phase and fans one exchange outcome out to every waiter.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
	current: Mutex<Option<Arc<RefreshCycle>>>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Creates an idle coordinator.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current phase.
	pub fn phase(&self) -> RefreshPhase {
		if self.current.lock().is_some() { RefreshPhase::Refreshing } else { RefreshPhase::Idle }
	}

	/// Counters describing past cycles.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Returns a fresh access token, running `exchange` only if no cycle is in flight.
	///
	/// The leader's `exchange` is responsible for every side effect of the cycle (reading the
	/// refresh token, persisting or clearing the pair). Waiters never run their closure. If
	/// the leader's future is dropped before the exchange resolves, the cycle completes with
	/// [`RefreshFailure::Abandoned`] so that waiters are released.
	pub async fn obtain_fresh_token<F, Fut>(&self, exchange: F) -> RefreshOutcome
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = RefreshOutcome>,
	{
		match self.join() {
			Role::Waiter(cycle) => {
				self.metrics.record_joined();
				trace_event!(cycle = cycle.id, "joined in-flight refresh cycle");

				cycle.outcome.wait().await.clone()
			},
			Role::Leader(cycle) => {
				self.metrics.record_attempt();
				trace_event!(cycle = cycle.id, "started refresh cycle");

				let guard = CycleGuard { coordinator: self, cycle, settled: false };
				let outcome = exchange().await;

				match &outcome {
					Ok(_) => self.metrics.record_success(),
					Err(_) => self.metrics.record_failure(),
				}

				guard.settle(outcome.clone()).await;

				outcome
			},
		}
	}

	fn join(&self) -> Role {
		let mut current = self.current.lock();

		match current.as_ref() {
			Some(cycle) => Role::Waiter(cycle.clone()),
			None => {
				let cycle = Arc::new(RefreshCycle::new(self.metrics.attempts() + 1));

				*current = Some(cycle.clone());

				Role::Leader(cycle)
			},
		}
	}

	fn drain(&self, cycle: &Arc<RefreshCycle>) {
		let mut current = self.current.lock();

		if current.as_ref().is_some_and(|active| Arc::ptr_eq(active, cycle)) {
			*current = None;
		}
	}
}

#[derive(Debug)]
struct RefreshCycle {
	#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
	id: u64,
	outcome: AsyncOnceCell<RefreshOutcome>,
}
impl RefreshCycle {
	fn new(id: u64) -> Self {
		Self { id, outcome: AsyncOnceCell::new() }
	}
}

enum Role {
	Leader(Arc<RefreshCycle>),
	Waiter(Arc<RefreshCycle>),
}

/// Completes the leader's cycle exactly once, even when the leader is cancelled.
struct CycleGuard<'a> {
	coordinator: &'a RefreshCoordinator,
	cycle: Arc<RefreshCycle>,
	settled: bool,
}
impl CycleGuard<'_> {
	async fn settle(mut self, outcome: RefreshOutcome) {
		self.settled = true;
		self.coordinator.drain(&self.cycle);

		let _ = self.cycle.outcome.set(outcome).await;
	}
}
impl Drop for CycleGuard<'_> {
	fn drop(&mut self) {
		if self.settled {
			return;
		}

		self.coordinator.drain(&self.cycle);
		self.coordinator.metrics.record_failure();

		let _ = self.cycle.outcome.set_blocking(Err(RefreshFailure::Abandoned));
	}
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns a fresh access token, joining the in-flight refresh cycle if there is one.
	///
	/// On failure the session has already been cleared and the observer told to send the user
	/// to the login entry point. A cycle whose leader was cancelled is not a session failure:
	/// its waiters start (or join) the next cycle instead.
	pub async fn fresh_access_token(&self) -> Result<TokenSecret> {
		loop {
			match self.refresh.obtain_fresh_token(|| self.refresh_session()).await {
				Err(RefreshFailure::Abandoned) => {
					trace_event!("refresh leader was cancelled; retrying in a new cycle");
				},
				outcome => return Ok(outcome?),
			}
		}
	}

	/// Leader side of a cycle: exchange, then settle the session exactly once.
	async fn refresh_session(&self) -> RefreshOutcome {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh_session");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let outcome = span.instrument(self.exchange_refresh_token()).await;

		obs::record_call_outcome(KIND, CallOutcome::of(&outcome));

		match &outcome {
			Ok(_) => self.notify(SessionEvent::TokensRefreshed),
			Err(reason) => self.expire_session(reason.clone()),
		}

		outcome
	}

	async fn exchange_refresh_token(&self) -> RefreshOutcome {
		let Some(refresh_token) = self.store.refresh_token() else {
			return Err(RefreshFailure::MissingRefreshToken);
		};
		let request = ApiRequest::post(self.config.refresh_path.as_str())
			.json(&RefreshRequest { refresh_token: refresh_token.clone() })
			.map_err(|err| RefreshFailure::Transport { message: error::render_chain(&err) })?;
		let response = self
			.send(&request, None)
			.await
			.map_err(|err| RefreshFailure::Transport { message: error::render_chain(&err) })?;

		if !response.is_success() {
			return Err(RefreshFailure::Rejected {
				status: response.status().as_u16(),
				message: response.error_message(),
			});
		}

		let grant = response
			.json::<TokenGrant>()
			.map_err(|err| RefreshFailure::MalformedResponse { message: error::render_chain(&err) })?;
		let pair = grant
			.into_pair(Some(&refresh_token))
			.map_err(|err| RefreshFailure::MalformedResponse { message: err.to_string() })?;
		let access_token = pair.access_token.clone();

		self.store
			.set_tokens(pair)
			.map_err(|err| RefreshFailure::Storage { message: err.to_string() })?;

		Ok(access_token)
	}

	fn expire_session(&self, reason: RefreshFailure) {
		if let Err(_err) = self.store.clear_tokens() {
			trace_event!(error = %_err, "failed to clear tokens after refresh failure");
		}

		trace_event!(reason = %reason, "session expired");

		self.notify(SessionEvent::Expired {
			reason,
			redirect_to: self.config.login_entry_point.clone(),
		});
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use tokio::sync::oneshot;
	// self
	use super::*;

	#[tokio::test]
	async fn concurrent_callers_share_one_exchange() {
		let coordinator = RefreshCoordinator::new();
		let runs = AtomicUsize::new(0);
		let (release, gate) = oneshot::channel::<()>();
		let leader = coordinator.obtain_fresh_token(|| async {
			runs.fetch_add(1, Ordering::SeqCst);
			gate.await.expect("Gate sender should stay alive.");

			Ok(TokenSecret::new("fresh"))
		});
		let waiter = || {
			coordinator.obtain_fresh_token(|| async {
				runs.fetch_add(1, Ordering::SeqCst);

				Ok(TokenSecret::new("stale"))
			})
		};
		let opener = async {
			tokio::task::yield_now().await;

			assert_eq!(coordinator.phase(), RefreshPhase::Refreshing);

			release.send(()).expect("Leader should still be waiting on the gate.");
		};
		let (a, b, c, ()) = tokio::join!(leader, waiter(), waiter(), opener);

		for outcome in [a, b, c] {
			assert_eq!(outcome.expect("Every participant should succeed.").expose(), "fresh");
		}

		assert_eq!(runs.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.phase(), RefreshPhase::Idle);
		assert_eq!(coordinator.metrics().attempts(), 1);
		assert_eq!(coordinator.metrics().joined(), 2);
	}

	#[tokio::test]
	async fn failure_reaches_every_waiter_and_resets_phase() {
		let coordinator = RefreshCoordinator::new();
		let (release, gate) = oneshot::channel::<()>();
		let leader = coordinator.obtain_fresh_token(|| async {
			gate.await.expect("Gate sender should stay alive.");

			Err(RefreshFailure::Rejected { status: 401, message: "Invalid refresh token".into() })
		});
		let waiter = coordinator.obtain_fresh_token(|| async { Ok(TokenSecret::new("unused")) });
		let opener = async {
			tokio::task::yield_now().await;
			release.send(()).expect("Leader should still be waiting on the gate.");
		};
		let (a, b, ()) = tokio::join!(leader, waiter, opener);

		assert_eq!(a, b);
		assert!(matches!(a, Err(RefreshFailure::Rejected { status: 401, .. })));
		assert_eq!(coordinator.phase(), RefreshPhase::Idle);
		assert_eq!(coordinator.metrics().failures(), 1);
	}

	#[tokio::test]
	async fn callers_after_drain_start_a_new_cycle() {
		let coordinator = RefreshCoordinator::new();
		let first = coordinator.obtain_fresh_token(|| async { Ok(TokenSecret::new("one")) }).await;
		let second = coordinator.obtain_fresh_token(|| async { Ok(TokenSecret::new("two")) }).await;

		assert_eq!(first.expect("First cycle should succeed.").expose(), "one");
		assert_eq!(second.expect("Second cycle should succeed.").expose(), "two");
		assert_eq!(coordinator.metrics().attempts(), 2);
		assert_eq!(coordinator.metrics().joined(), 0);
	}

	#[tokio::test]
	async fn abandoned_leader_releases_waiters() {
		let coordinator = RefreshCoordinator::new();
		let (_keep, gate) = oneshot::channel::<()>();
		let mut leader = Box::pin(coordinator.obtain_fresh_token(|| async {
			let _ = gate.await;

			Ok(TokenSecret::new("never"))
		}));

		tokio::select! {
			biased;
			_ = &mut leader => panic!("Leader gate is never opened."),
			_ = tokio::task::yield_now() => {},
		}

		assert_eq!(coordinator.phase(), RefreshPhase::Refreshing);

		let waiter = coordinator.obtain_fresh_token(|| async { Ok(TokenSecret::new("unused")) });
		let (outcome, ()) = tokio::join!(waiter, async move { drop(leader) });

		assert_eq!(outcome, Err(RefreshFailure::Abandoned));
		assert_eq!(coordinator.phase(), RefreshPhase::Idle);
		assert_eq!(coordinator.metrics().failures(), 1);
	}
}

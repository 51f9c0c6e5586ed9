//! Sign-in, sign-out, and session bootstrap.

// self
use crate::{
	_prelude::*,
	auth::{LoginRequest, LoginResponse, RegisterRequest, User},
	client::{ApiClient, ApiRequest},
	error::ConfigError,
	http::ApiHttpClient,
	lifecycle::SessionEvent,
	obs::{self, CallKind, CallOutcome, CallSpan, trace_event},
	transport::TransportErrorMapper,
};

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Signs in with email + password and stores the issued token pair.
	///
	/// Bad credentials surface as [`Error::Unauthorized`]; the login endpoint never triggers a
	/// refresh.
	pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
		observed(CallKind::Login, "login", async {
			let request = ApiRequest::post(self.config.login_path.as_str()).json(credentials)?;
			let response = self.execute_json::<LoginResponse>(request).await?;
			let pair = response.token_pair().map_err(ConfigError::from)?;

			self.store.set_tokens(pair)?;
			self.notify(SessionEvent::LoggedIn { user_id: response.user.id.clone() });

			Ok(response)
		})
		.await
	}

	/// Creates an account. Registration does not sign the user in.
	pub async fn register(&self, account: &RegisterRequest) -> Result<User> {
		observed(CallKind::Register, "register", async {
			self.post_json(self.config.register_path.as_str(), account).await
		})
		.await
	}

	/// Ends the session.
	///
	/// The backend call is best-effort: local tokens are cleared and
	/// [`SessionEvent::LoggedOut`] is emitted whatever it returns. A failed backend call is
	/// still reported, after the local session is gone.
	pub async fn logout(&self) -> Result<()> {
		observed(CallKind::Logout, "logout", async {
			let remote = self.post_empty(self.config.logout_path.as_str()).await;
			let local = self.store.clear_tokens();

			self.notify(SessionEvent::LoggedOut);

			remote?;
			local?;

			Ok(())
		})
		.await
	}

	/// Fetches the signed-in user.
	pub async fn current_user(&self) -> Result<User> {
		self.get_json(self.config.current_user_path.as_str()).await
	}

	/// Restores a session from persisted tokens.
	///
	/// Returns `None` without touching the network when no access token is stored. Otherwise
	/// the current user is fetched (refreshing if needed); any failure clears the stored tokens
	/// and yields `None`.
	pub async fn resume_session(&self) -> Option<User> {
		self.store.access_token()?;

		match self.current_user().await {
			Ok(user) => Some(user),
			Err(_err) => {
				trace_event!(error = %_err, "stored session could not be resumed");

				if let Err(_err) = self.store.clear_tokens() {
					trace_event!(error = %_err, "failed to clear tokens of an unusable session");
				}

				None
			},
		}
	}
}

async fn observed<T, Fut>(kind: CallKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = CallSpan::new(kind, stage);

	obs::record_call_outcome(kind, CallOutcome::Attempt);

	let result = span.instrument(fut).await;

	obs::record_call_outcome(kind, CallOutcome::of(&result));

	result
}

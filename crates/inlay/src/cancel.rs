//! Single-flight cancellation for hint fetches.

use tokio_util::sync::CancellationToken;

/// Generation-tagged cancellation token handed to one fetch cycle.
///
/// Cancellation is cooperative: the cycle checks [`FetchToken::is_cancelled`]
/// after every suspension point and before committing.
#[derive(Debug, Clone)]
pub struct FetchToken {
	generation: u64,
	cancel: CancellationToken,
}

impl FetchToken {
	fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	/// Returns the fetch generation this token was issued for.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Returns true when cancellation is requested.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests cancellation.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}

	/// Returns the underlying token, for providers that select on it.
	pub fn token(&self) -> &CancellationToken {
		&self.cancel
	}
}

/// Owns the token of the single in-flight fetch, if any.
#[derive(Debug, Default)]
pub struct RequestCanceller {
	next_generation: u64,
	active: Option<FetchToken>,
}

impl RequestCanceller {
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancels and drops the active token. No-op when nothing is in flight.
	pub fn cancel(&mut self) {
		if let Some(token) = self.active.take() {
			tracing::trace!(generation = token.generation(), "inlay.fetch.cancel");
			token.cancel();
		}
	}

	/// Cancels any previous token and issues a fresh one for a new cycle.
	pub fn issue(&mut self) -> FetchToken {
		self.cancel();
		self.next_generation = self.next_generation.wrapping_add(1);
		let token = FetchToken::new(self.next_generation);
		self.active = Some(token.clone());
		token
	}

	/// Drops the active token without cancelling it, if it belongs to `generation`.
	///
	/// Called when a cycle ends on its own so a later `cancel` does not
	/// signal a finished request.
	pub fn release(&mut self, generation: u64) {
		if self.active.as_ref().is_some_and(|t| t.generation() == generation) {
			self.active = None;
		}
	}

	/// Returns the active token, if a fetch is in flight.
	pub fn active(&self) -> Option<&FetchToken> {
		self.active.as_ref()
	}
}

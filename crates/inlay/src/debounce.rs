//! Single-survivor debouncer.
//!
//! Each [`Debouncer::request`] cancels the previous timer and starts a new
//! one; only the timer that elapses without being replaced runs the action.
//! It is not a queue. Once the action has started, later requests and
//! [`Debouncer::cancel_pending`] no longer affect it.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Boxed action future produced on every fire.
pub type ActionFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

type Action = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("xeno-inlay-debounce")
			.build()
			.expect("failed to build xeno-inlay global tokio runtime")
	});
	runtime.handle().clone()
}

/// Timer slot: generation of the surviving request and its cancel handle.
#[derive(Default)]
struct Pending {
	generation: u64,
	timer: Option<CancellationToken>,
}

/// Time-based debouncer around an async action.
pub struct Debouncer {
	delay: Duration,
	action: Action,
	pending: Arc<Mutex<Pending>>,
}

impl std::fmt::Debug for Debouncer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Debouncer")
			.field("delay", &self.delay)
			.field("pending", &self.is_pending())
			.finish()
	}
}

impl Debouncer {
	/// Creates a debouncer that runs `action` once `delay` passes without a new request.
	pub fn new<F, Fut>(delay: Duration, action: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = ()> + Send + 'static,
	{
		Self {
			delay,
			action: Arc::new(move || Box::pin(action()) as ActionFuture),
			pending: Arc::new(Mutex::new(Pending::default())),
		}
	}

	/// Returns the quiescence window.
	pub fn delay(&self) -> Duration {
		self.delay
	}

	/// Restarts the timer. The action runs after the window elapses with no further request.
	pub fn request(&self) {
		let timer = CancellationToken::new();
		let generation = {
			let mut pending = self.pending.lock();
			if let Some(previous) = pending.timer.replace(timer.clone()) {
				previous.cancel();
			}
			pending.generation = pending.generation.wrapping_add(1);
			pending.generation
		};

		let delay = self.delay;
		let action = Arc::clone(&self.action);
		let pending = Arc::clone(&self.pending);
		runtime_handle().spawn(async move {
			tokio::select! {
				biased;
				_ = timer.cancelled() => return,
				_ = tokio::time::sleep(delay) => {}
			}

			{
				let mut pending = pending.lock();
				if timer.is_cancelled() || pending.generation != generation {
					return;
				}
				pending.timer = None;
			}

			tracing::trace!(generation, delay_ms = delay.as_millis() as u64, "inlay.debounce.fire");
			action().await;
		});
	}

	/// Drops the pending timer, if any, without running the action.
	pub fn cancel_pending(&self) {
		if let Some(timer) = self.pending.lock().timer.take() {
			timer.cancel();
		}
	}

	/// Returns true while a timer is waiting to fire.
	pub fn is_pending(&self) -> bool {
		self.pending.lock().timer.is_some()
	}
}

impl Drop for Debouncer {
	fn drop(&mut self) {
		self.cancel_pending();
	}
}

#[cfg(test)]
mod tests;

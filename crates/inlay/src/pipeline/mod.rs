//! Fetch-and-merge pipeline for one document.
//!
//! A render cycle runs `Idle → Fetching → (Cancelled | Settled)`:
//!
//! 1. Cancel the previous fetch and check the feature is enabled.
//! 2. Ask the viewport for the visible span. Abort if it is unavailable,
//!    the document is mid-edit, or the cycle was cancelled meanwhile.
//! 3. Stop on a cache hit: the span is already painted.
//! 4. Fetch hints for the span's query range.
//! 5. Abort if the result is unavailable or the cycle was cancelled.
//! 6. Commit: drop fetched hints outside the query range, mark the span
//!    covered, evict held hints inside the query range, append the fetched
//!    hints, paint, then fire [`RefreshEvent`].
//!
//! # Concurrency
//!
//! Suspension points are the debounce timer, the viewport query and the
//! provider fetch. State lives behind one lock that is never held across
//! an await. Every cycle re-checks its [`FetchToken`] after each suspension
//! point and again under the lock right before committing, so a superseded
//! cycle can never overwrite the results of a newer one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::cancel::{FetchToken, RequestCanceller};
use crate::config::InlayHintConfig;
use crate::debounce::Debouncer;
use crate::document::{BufferId, HintDocument};
use crate::painter::{OverlayPainter, OverlaySurface};
use crate::provider::{InlayHintSource, ProvidedHint};
use crate::range::{LineSpan, contains_position};
use crate::regions::CoveredRanges;
use crate::viewport::ViewportQuery;
use crate::{Error, Result};

/// Capacity of the refreshed-event channel.
const REFRESH_CHANNEL_CAPACITY: usize = 16;

/// State of the most recent render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
	/// No cycle has run yet, or the last one found the feature disabled.
	Idle,
	/// A cycle is waiting on the viewport or a provider.
	Fetching,
	/// The last cycle aborted without touching state.
	Cancelled,
	/// The last cycle finished with a cache hit or a paint.
	Settled,
}

/// Why a cycle aborted without applying anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
	/// The viewport query returned nothing.
	NoViewport,
	/// The document was mid-edit when the viewport answered.
	Dirty,
	/// A newer cycle, an edit, or disposal cancelled this one.
	Cancelled,
	/// No provider produced a result.
	Unavailable,
}

/// Result of one render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
	/// File type not allowed, no provider registered, or pipeline disposed.
	Disabled,
	/// Aborted; nothing changed.
	Stale(StaleReason),
	/// The visible span was already painted.
	CacheHit(LineSpan),
	/// Hints were fetched, merged and painted.
	Painted { span: LineSpan, hints: usize },
}

/// Fired after each completed paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshEvent {
	pub buffer: BufferId,
	pub span: LineSpan,
	pub hints: usize,
}

/// Collaborators and settings a pipeline is built from.
pub struct PipelineParts {
	pub config: InlayHintConfig,
	pub document: Arc<dyn HintDocument>,
	pub viewport: Arc<dyn ViewportQuery>,
	pub source: Arc<dyn InlayHintSource>,
	pub surface: Arc<dyn OverlaySurface>,
}

struct State {
	/// Held hint set, in fetch order.
	hints: Vec<ProvidedHint>,
	covered: CoveredRanges,
	canceller: RequestCanceller,
	phase: FetchPhase,
	/// Generation of the most recently started cycle.
	cycle: u64,
}

impl State {
	/// Ends the cycle of `token`, recording `phase` only if no newer cycle started.
	fn finish(&mut self, token: &FetchToken, phase: FetchPhase) {
		self.canceller.release(token.generation());
		if self.cycle == token.generation() {
			self.phase = phase;
		}
	}
}

struct Inner {
	config: InlayHintConfig,
	document: Arc<dyn HintDocument>,
	viewport: Arc<dyn ViewportQuery>,
	source: Arc<dyn InlayHintSource>,
	painter: OverlayPainter,
	scheduler: Debouncer,
	state: Mutex<State>,
	refreshed: broadcast::Sender<RefreshEvent>,
	disposed: AtomicBool,
}

impl Inner {
	fn is_enabled(&self) -> bool {
		!self.disposed.load(Ordering::Acquire)
			&& self.config.allows(&self.document.file_type())
			&& self.source.has_provider(self.document.as_ref())
	}

	async fn render_range(&self) -> Result<RenderOutcome> {
		let token = {
			let mut state = self.state.lock();
			state.canceller.cancel();
			if !self.is_enabled() {
				trace!(buffer = %self.document.buffer_id(), "inlay.disabled");
				state.phase = FetchPhase::Idle;
				return Ok(RenderOutcome::Disabled);
			}
			let token = state.canceller.issue();
			state.cycle = token.generation();
			state.phase = FetchPhase::Fetching;
			token
		};

		match self.fetch_and_merge(&token).await {
			Ok(outcome) => Ok(outcome),
			Err(err) => {
				self.state.lock().finish(&token, FetchPhase::Cancelled);
				Err(err)
			}
		}
	}

	async fn fetch_and_merge(&self, token: &FetchToken) -> Result<RenderOutcome> {
		let buffer = self.document.buffer_id();

		let Some(span) = self.viewport.visible_range(buffer).await else {
			return Ok(self.stale(token, StaleReason::NoViewport));
		};
		if self.document.is_dirty() {
			return Ok(self.stale(token, StaleReason::Dirty));
		}
		if token.is_cancelled() {
			return Ok(self.stale(token, StaleReason::Cancelled));
		}

		let cached = self.state.lock().covered.has(span.first, span.last);
		if cached {
			trace!(%buffer, first = span.first, last = span.last, "inlay.cache_hit");
			self.state.lock().finish(token, FetchPhase::Settled);
			return Ok(RenderOutcome::CacheHit(span));
		}

		let range = span.query_range();
		debug!(
			%buffer,
			first = span.first,
			last = span.last,
			generation = token.generation(),
			"inlay.fetch"
		);
		let fetched = self
			.source
			.provide_inlay_hints(self.document.as_ref(), range, token)
			.await
			.map_err(Error::Provider)?;
		let Some(fetched) = fetched else {
			return Ok(self.stale(token, StaleReason::Unavailable));
		};

		let received = fetched.len();
		let fetched: Vec<ProvidedHint> = fetched
			.into_iter()
			.filter(|hint| contains_position(&range, hint.hint.position))
			.collect();
		if fetched.len() < received {
			trace!(%buffer, dropped = received - fetched.len(), "inlay.fetch.outside_range");
		}

		let mut state = self.state.lock();
		if token.is_cancelled() {
			state.finish(token, FetchPhase::Cancelled);
			drop(state);
			trace!(%buffer, generation = token.generation(), "inlay.stale.before_commit");
			return Ok(RenderOutcome::Stale(StaleReason::Cancelled));
		}

		state.covered.add(span.first, span.last);
		state.hints.retain(|held| !contains_position(&range, held.hint.position));
		state.hints.extend(fetched.iter().cloned());
		self.painter.paint(self.document.as_ref(), &range, &fetched);
		state.finish(token, FetchPhase::Settled);
		drop(state);

		debug!(%buffer, first = span.first, last = span.last, hints = fetched.len(), "inlay.refreshed");
		let _ = self.refreshed.send(RefreshEvent {
			buffer,
			span,
			hints: fetched.len(),
		});
		Ok(RenderOutcome::Painted { span, hints: fetched.len() })
	}

	fn stale(&self, token: &FetchToken, reason: StaleReason) -> RenderOutcome {
		trace!(
			buffer = %self.document.buffer_id(),
			generation = token.generation(),
			reason = ?reason,
			"inlay.stale"
		);
		self.state.lock().finish(token, FetchPhase::Cancelled);
		RenderOutcome::Stale(reason)
	}

	fn cancel(&self) {
		self.scheduler.cancel_pending();
		self.state.lock().canceller.cancel();
	}
}

impl Drop for Inner {
	fn drop(&mut self) {
		self.state.get_mut().canceller.cancel();
	}
}

/// Inlay hint pipeline owned by one document.
///
/// Cheap to clone; clones drive the same pipeline.
#[derive(Clone)]
pub struct InlayHintPipeline {
	inner: Arc<Inner>,
}

impl std::fmt::Debug for InlayHintPipeline {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("InlayHintPipeline")
			.field("buffer", &self.inner.document.buffer_id())
			.field("phase", &state.phase)
			.field("hints", &state.hints.len())
			.field("covered", &state.covered.len())
			.finish()
	}
}

impl InlayHintPipeline {
	/// Builds a pipeline. Nothing is fetched until a render is requested.
	pub fn new(parts: PipelineParts) -> Self {
		let PipelineParts {
			config,
			document,
			viewport,
			source,
			surface,
		} = parts;

		let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
			let weak = weak.clone();
			let scheduler = Debouncer::new(config.debounce(), move || {
				let weak = weak.clone();
				async move {
					let Some(inner) = weak.upgrade() else {
						return;
					};
					if let Err(err) = inner.render_range().await {
						warn!(buffer = %inner.document.buffer_id(), error = %err, "inlay.render.failed");
					}
				}
			});
			let (refreshed, _) = broadcast::channel(REFRESH_CHANNEL_CAPACITY);

			Inner {
				painter: OverlayPainter::new(config.namespace.clone(), config.render_mode, surface),
				config,
				document,
				viewport,
				source,
				scheduler,
				state: Mutex::new(State {
					hints: Vec::new(),
					covered: CoveredRanges::new(),
					canceller: RequestCanceller::new(),
					phase: FetchPhase::Idle,
					cycle: 0,
				}),
				refreshed,
				disposed: AtomicBool::new(false),
			}
		});

		Self { inner }
	}

	pub fn config(&self) -> &InlayHintConfig {
		&self.inner.config
	}

	pub fn buffer_id(&self) -> BufferId {
		self.inner.document.buffer_id()
	}

	/// Returns true if the file type is allowed and a provider is registered.
	pub fn is_enabled(&self) -> bool {
		self.inner.is_enabled()
	}

	/// Snapshot of the held hint set.
	pub fn current(&self) -> Vec<ProvidedHint> {
		self.inner.state.lock().hints.clone()
	}

	pub fn phase(&self) -> FetchPhase {
		self.inner.state.lock().phase
	}

	/// Returns true if `[first, last]` is already painted.
	pub fn is_covered(&self, first: u32, last: u32) -> bool {
		self.inner.state.lock().covered.has(first, last)
	}

	/// Returns true while a debounced render is waiting to fire.
	pub fn is_render_pending(&self) -> bool {
		self.inner.scheduler.is_pending()
	}

	/// Returns true while a fetch holds a live token.
	pub fn is_fetching(&self) -> bool {
		self.inner.state.lock().canceller.active().is_some_and(|t| !t.is_cancelled())
	}

	/// Subscribes to refreshed events.
	pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
		self.inner.refreshed.subscribe()
	}

	/// Schedules a debounced render cycle.
	pub fn request_render(&self) {
		if self.is_disposed() {
			return;
		}
		self.inner.scheduler.request();
	}

	/// Runs one render cycle now, bypassing the debounce.
	///
	/// Provider errors are returned to the caller; scheduled cycles log them.
	pub async fn render_range(&self) -> Result<RenderOutcome> {
		self.inner.render_range().await
	}

	/// Drops the pending render and cancels the in-flight fetch.
	pub fn cancel(&self) {
		self.inner.cancel();
	}

	/// Forgets held hints and painted spans and drops the pending render.
	pub fn clear_cache(&self) {
		if self.is_disposed() {
			return;
		}
		let mut state = self.inner.state.lock();
		state.hints.clear();
		state.covered.clear();
		drop(state);
		self.inner.scheduler.cancel_pending();
	}

	/// Text edited: painted spans are no longer trusted, held hints stay until overwritten.
	pub fn on_text_change(&self) {
		if self.is_disposed() {
			return;
		}
		self.inner.state.lock().covered.clear();
		self.inner.cancel();
	}

	/// Whole document changed (file type or content swap): start over.
	pub fn on_change(&self) {
		if self.is_disposed() {
			return;
		}
		self.clear_cache();
		self.inner.cancel();
		self.request_render();
	}

	/// Removes every painted mark of this pipeline's namespace.
	pub fn clear_overlay_for_whole_document(&self) {
		if self.is_disposed() {
			return;
		}
		self.inner.painter.clear_all(self.inner.document.buffer_id());
	}

	/// Cancels pending and in-flight work; later requests are ignored.
	pub fn dispose(&self) {
		if self.inner.disposed.swap(true, Ordering::AcqRel) {
			return;
		}
		debug!(buffer = %self.inner.document.buffer_id(), "inlay.dispose");
		self.inner.cancel();
	}

	pub fn is_disposed(&self) -> bool {
		self.inner.disposed.load(Ordering::Acquire)
	}
}

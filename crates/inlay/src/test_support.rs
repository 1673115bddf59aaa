//! Scripted collaborators shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, Position, Range};
use parking_lot::Mutex;

use crate::cancel::FetchToken;
use crate::document::{BufferId, HintDocument};
use crate::painter::{OverlayBatch, OverlaySurface};
use crate::provider::{InlayHintSource, ProvidedHint, ProviderId};
use crate::range::LineSpan;
use crate::viewport::ViewportQuery;

pub(crate) const PROVIDER: ProviderId = ProviderId(1);

pub(crate) fn raw_hint(line: u32, character: u32, label: &str) -> InlayHint {
	InlayHint {
		position: Position { line, character },
		label: InlayHintLabel::String(label.to_string()),
		kind: None,
		text_edits: None,
		tooltip: None,
		padding_left: None,
		padding_right: None,
		data: None,
	}
}

pub(crate) fn hint(line: u32, character: u32, label: &str) -> ProvidedHint {
	ProvidedHint::new(PROVIDER, raw_hint(line, character, label))
}

pub(crate) fn padded(line: u32, character: u32, label: &str, kind: Option<InlayHintKind>, left: bool, right: bool) -> ProvidedHint {
	let mut raw = raw_hint(line, character, label);
	raw.kind = kind;
	raw.padding_left = Some(left);
	raw.padding_right = Some(right);
	ProvidedHint::new(PROVIDER, raw)
}

/// Labels with positions, for order-sensitive assertions.
pub(crate) fn labels(hints: &[ProvidedHint]) -> Vec<(u32, u32, String)> {
	hints
		.iter()
		.map(|h| (h.hint.position.line, h.hint.position.character, h.label()))
		.collect()
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
	pub batches: Mutex<Vec<OverlayBatch>>,
}

impl RecordingSurface {
	pub fn count(&self) -> usize {
		self.batches.lock().len()
	}

	pub fn last(&self) -> Option<OverlayBatch> {
		self.batches.lock().last().cloned()
	}
}

impl OverlaySurface for RecordingSurface {
	fn apply(&self, batch: OverlayBatch) {
		self.batches.lock().push(batch);
	}
}

/// Viewport returning a settable span and counting queries.
pub(crate) struct FixedViewport {
	pub span: Mutex<Option<LineSpan>>,
	pub queries: AtomicUsize,
}

impl FixedViewport {
	pub fn new(first: u32, last: u32) -> Self {
		Self {
			span: Mutex::new(Some(LineSpan::new(first, last))),
			queries: AtomicUsize::new(0),
		}
	}

	pub fn set(&self, span: Option<LineSpan>) {
		*self.span.lock() = span;
	}

	pub fn queries(&self) -> usize {
		self.queries.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ViewportQuery for FixedViewport {
	async fn visible_range(&self, _buffer: BufferId) -> Option<LineSpan> {
		self.queries.fetch_add(1, Ordering::SeqCst);
		*self.span.lock()
	}
}

/// One scripted provider answer.
pub(crate) struct Reply {
	pub delay: Duration,
	pub result: anyhow::Result<Option<Vec<ProvidedHint>>>,
}

impl Reply {
	pub fn hints(hints: Vec<ProvidedHint>) -> Self {
		Self {
			delay: Duration::ZERO,
			result: Ok(Some(hints)),
		}
	}

	pub fn unavailable() -> Self {
		Self {
			delay: Duration::ZERO,
			result: Ok(None),
		}
	}

	pub fn failure(message: &'static str) -> Self {
		Self {
			delay: Duration::ZERO,
			result: Err(anyhow::anyhow!(message)),
		}
	}

	pub fn after(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}
}

/// Source answering from a script and recording the ranges it was asked for.
pub(crate) struct ScriptedSource {
	pub registered: AtomicBool,
	pub replies: Mutex<VecDeque<Reply>>,
	pub requests: Mutex<Vec<Range>>,
}

impl ScriptedSource {
	pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
		Self {
			registered: AtomicBool::new(true),
			replies: Mutex::new(replies.into_iter().collect()),
			requests: Mutex::new(Vec::new()),
		}
	}

	pub fn calls(&self) -> usize {
		self.requests.lock().len()
	}
}

#[async_trait]
impl InlayHintSource for ScriptedSource {
	fn has_provider(&self, _document: &dyn HintDocument) -> bool {
		self.registered.load(Ordering::SeqCst)
	}

	async fn provide_inlay_hints(&self, _document: &dyn HintDocument, range: Range, _token: &FetchToken) -> anyhow::Result<Option<Vec<ProvidedHint>>> {
		self.requests.lock().push(range);
		let reply = self.replies.lock().pop_front();
		let Some(reply) = reply else {
			return Ok(None);
		};
		if !reply.delay.is_zero() {
			tokio::time::sleep(reply.delay).await;
		}
		reply.result
	}
}

//! Overlay painting.
//!
//! [`OverlayPainter`] is the only writer to the host's rendering surface.
//! Every paint is one [`OverlayBatch`]: clear the queried line band, then
//! place the new hints, so an observer never sees old and new marks for the
//! same band at once.
//!
//! Two strategies exist, selected once from [`RenderMode`]:
//! - [`RenderMode::Line`]: hints sharing a line become one chunk list,
//!   ordered by column and separated by a single-space filler.
//! - [`RenderMode::Column`]: each hint is anchored at the byte column of its
//!   position, with its own padding chunks.

use std::collections::BTreeMap;
use std::sync::Arc;

use lsp_types::{InlayHintKind, Range};
use tracing::trace;

use crate::config::RenderMode;
use crate::document::{BufferId, HintDocument};
use crate::provider::ProvidedHint;

/// Highlight class of a virtual text chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkStyle {
	/// Padding and separator whitespace.
	Filler,
	/// Label of a type hint.
	Type,
	/// Label of a parameter hint.
	Parameter,
	/// Label of a hint without a known kind.
	Hint,
}

impl ChunkStyle {
	fn for_kind(kind: Option<InlayHintKind>) -> Self {
		match kind {
			Some(InlayHintKind::TYPE) => Self::Type,
			Some(InlayHintKind::PARAMETER) => Self::Parameter,
			_ => Self::Hint,
		}
	}
}

/// One styled piece of virtual text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualChunk {
	pub text: String,
	pub style: ChunkStyle,
}

impl VirtualChunk {
	pub fn new(text: impl Into<String>, style: ChunkStyle) -> Self {
		Self { text: text.into(), style }
	}

	fn filler() -> Self {
		Self::new(" ", ChunkStyle::Filler)
	}
}

/// A single surface write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayOp {
	/// Removes namespace marks on lines `[start_line, end_line)`; `None` clears to the end of the buffer.
	Clear { start_line: u32, end_line: Option<u32> },
	/// Sets end-of-line virtual text on `line` (0-based).
	LineText { line: u32, chunks: Vec<VirtualChunk> },
	/// Sets virtual text on `line` (0-based) anchored at byte column `byte_col` (0-based).
	ColumnText {
		line: u32,
		byte_col: usize,
		chunks: Vec<VirtualChunk>,
	},
}

/// Surface writes applied as one visual update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayBatch {
	pub buffer: BufferId,
	pub namespace: String,
	pub ops: Vec<OverlayOp>,
}

/// Host rendering surface.
pub trait OverlaySurface: Send + Sync {
	/// Applies every op of `batch` atomically with respect to other surface writers.
	///
	/// Called while the owning pipeline holds its state lock; implementations
	/// must not call back into the pipeline.
	fn apply(&self, batch: OverlayBatch);
}

/// Converts hints into surface ops for one host capability.
trait PaintStrategy: Send + Sync {
	fn layout(&self, document: &dyn HintDocument, hints: &[ProvidedHint]) -> Vec<OverlayOp>;
}

fn hint_chunks(hint: &ProvidedHint, out: &mut Vec<VirtualChunk>) {
	if hint.padding_left() {
		out.push(VirtualChunk::filler());
	}
	out.push(VirtualChunk::new(hint.label(), ChunkStyle::for_kind(hint.kind())));
	if hint.padding_right() {
		out.push(VirtualChunk::filler());
	}
}

struct LineStrategy;

impl PaintStrategy for LineStrategy {
	fn layout(&self, _document: &dyn HintDocument, hints: &[ProvidedHint]) -> Vec<OverlayOp> {
		let mut lines: BTreeMap<u32, Vec<&ProvidedHint>> = BTreeMap::new();
		for hint in hints {
			lines.entry(hint.hint.position.line).or_default().push(hint);
		}

		lines
			.into_iter()
			.map(|(line, mut on_line)| {
				on_line.sort_by_key(|hint| hint.hint.position.character);
				let mut chunks = Vec::new();
				for (idx, hint) in on_line.into_iter().enumerate() {
					if idx > 0 {
						chunks.push(VirtualChunk::filler());
					}
					hint_chunks(hint, &mut chunks);
				}
				OverlayOp::LineText { line, chunks }
			})
			.collect()
	}
}

struct ColumnStrategy;

impl PaintStrategy for ColumnStrategy {
	fn layout(&self, document: &dyn HintDocument, hints: &[ProvidedHint]) -> Vec<OverlayOp> {
		hints
			.iter()
			.filter_map(|hint| {
				let position = hint.hint.position;
				let Some(byte_col) = document.byte_offset(position.line, position.character) else {
					trace!(line = position.line, "inlay.paint.skip_missing_line");
					return None;
				};
				let mut chunks = Vec::with_capacity(3);
				hint_chunks(hint, &mut chunks);
				Some(OverlayOp::ColumnText {
					line: position.line,
					byte_col,
					chunks,
				})
			})
			.collect()
	}
}

/// Writes hint overlays for one buffer and namespace.
pub struct OverlayPainter {
	namespace: String,
	mode: RenderMode,
	strategy: Box<dyn PaintStrategy>,
	surface: Arc<dyn OverlaySurface>,
}

impl std::fmt::Debug for OverlayPainter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OverlayPainter")
			.field("namespace", &self.namespace)
			.field("mode", &self.mode)
			.finish()
	}
}

impl OverlayPainter {
	pub fn new(namespace: impl Into<String>, mode: RenderMode, surface: Arc<dyn OverlaySurface>) -> Self {
		let strategy: Box<dyn PaintStrategy> = match mode {
			RenderMode::Line => Box::new(LineStrategy),
			RenderMode::Column => Box::new(ColumnStrategy),
		};
		Self {
			namespace: namespace.into(),
			mode,
			strategy,
			surface,
		}
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn mode(&self) -> RenderMode {
		self.mode
	}

	/// Builds the batch that replaces overlays on the lines of `range` with `hints`.
	pub fn plan(&self, document: &dyn HintDocument, range: &Range, hints: &[ProvidedHint]) -> OverlayBatch {
		let mut ops = vec![OverlayOp::Clear {
			start_line: range.start.line,
			end_line: Some(range.end.line.saturating_add(1)),
		}];
		ops.extend(self.strategy.layout(document, hints));
		OverlayBatch {
			buffer: document.buffer_id(),
			namespace: self.namespace.clone(),
			ops,
		}
	}

	/// Clears the band of `range` and paints `hints` in one batch.
	pub fn paint(&self, document: &dyn HintDocument, range: &Range, hints: &[ProvidedHint]) {
		let batch = self.plan(document, range, hints);
		trace!(
			buffer = %batch.buffer,
			start = range.start.line,
			end = range.end.line,
			ops = batch.ops.len(),
			"inlay.paint"
		);
		self.surface.apply(batch);
	}

	/// Clears every mark of this namespace in `buffer`.
	pub fn clear_all(&self, buffer: BufferId) {
		self.surface.apply(OverlayBatch {
			buffer,
			namespace: self.namespace.clone(),
			ops: vec![OverlayOp::Clear {
				start_line: 0,
				end_line: None,
			}],
		});
	}
}

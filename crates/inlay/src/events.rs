//! Editor notifications routed to pipeline lifecycle operations.

use tracing::trace;

use crate::pipeline::InlayHintPipeline;

/// Host notification about the document a pipeline belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
	/// The viewport moved or was resized.
	Scrolled,
	/// Text was edited.
	TextChanged,
	/// The document was swapped or its file type changed.
	Changed,
	/// The buffer was closed.
	Closed,
}

impl InlayHintPipeline {
	/// Routes a host notification to the matching lifecycle operation.
	pub fn handle_event(&self, event: DocumentEvent) {
		trace!(buffer = %self.buffer_id(), event = ?event, "inlay.event");
		match event {
			DocumentEvent::Scrolled => self.request_render(),
			DocumentEvent::TextChanged => {
				self.on_text_change();
				self.request_render();
			}
			DocumentEvent::Changed => self.on_change(),
			DocumentEvent::Closed => {
				self.clear_overlay_for_whole_document();
				self.dispose();
			}
		}
	}
}

//! Viewport-query collaborator.

use async_trait::async_trait;

use crate::document::BufferId;
use crate::range::LineSpan;

/// Answers which lines of a buffer are currently visible.
#[async_trait]
pub trait ViewportQuery: Send + Sync {
	/// Returns the visible span (1-based, inclusive), or `None` when the
	/// buffer is not displayed or the host cannot answer.
	async fn visible_range(&self, buffer: BufferId) -> Option<LineSpan>;
}

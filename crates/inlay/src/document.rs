//! Document-model collaborator.
//!
//! The pipeline never owns document text. It reads the file type and edit
//! state to decide whether to fetch, and asks for line text and byte offsets
//! when placing column-anchored overlays.

use parking_lot::RwLock;
use ropey::Rope;

/// Host buffer identifier used for viewport queries and overlay writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

impl std::fmt::Display for BufferId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Read access to the document a pipeline renders hints for.
///
/// Lines and characters are 0-based LSP coordinates; characters count
/// UTF-16 code units.
pub trait HintDocument: Send + Sync {
	/// Buffer this document is displayed in.
	fn buffer_id(&self) -> BufferId;

	/// Current file type, matched against the configured allow-list.
	fn file_type(&self) -> String;

	/// Returns true while an edit is in progress and text is not yet synced.
	fn is_dirty(&self) -> bool;

	/// Returns the text of `line` without its line terminator.
	fn line(&self, line: u32) -> Option<String>;

	/// Converts a line/character pair to a byte offset within that line.
	fn byte_offset(&self, line: u32, character: u32) -> Option<usize> {
		self.line(line).map(|text| utf16_to_byte(&text, character))
	}
}

/// Converts a UTF-16 column to a byte offset in `text`, clamped to its length.
pub fn utf16_to_byte(text: &str, character: u32) -> usize {
	let target = character as usize;
	let mut units = 0;
	for (byte_idx, ch) in text.char_indices() {
		if units >= target {
			return byte_idx;
		}
		units += ch.len_utf16();
	}
	text.len()
}

/// Rope-backed [`HintDocument`] with interior mutability.
pub struct RopeDocument {
	buffer: BufferId,
	state: RwLock<RopeState>,
}

struct RopeState {
	text: Rope,
	file_type: String,
	dirty: bool,
}

impl RopeDocument {
	pub fn new(buffer: BufferId, file_type: impl Into<String>, text: &str) -> Self {
		Self {
			buffer,
			state: RwLock::new(RopeState {
				text: Rope::from_str(text),
				file_type: file_type.into(),
				dirty: false,
			}),
		}
	}

	/// Replaces the whole text.
	pub fn set_text(&self, text: &str) {
		self.state.write().text = Rope::from_str(text);
	}

	pub fn set_file_type(&self, file_type: impl Into<String>) {
		self.state.write().file_type = file_type.into();
	}

	pub fn set_dirty(&self, dirty: bool) {
		self.state.write().dirty = dirty;
	}

	/// Number of lines, counting a trailing empty line after a final newline.
	pub fn len_lines(&self) -> usize {
		self.state.read().text.len_lines()
	}
}

impl HintDocument for RopeDocument {
	fn buffer_id(&self) -> BufferId {
		self.buffer
	}

	fn file_type(&self) -> String {
		self.state.read().file_type.clone()
	}

	fn is_dirty(&self) -> bool {
		self.state.read().dirty
	}

	fn line(&self, line: u32) -> Option<String> {
		let state = self.state.read();
		let idx = line as usize;
		if idx >= state.text.len_lines() {
			return None;
		}
		let mut text = state.text.line(idx).to_string();
		while text.ends_with('\n') || text.ends_with('\r') {
			text.pop();
		}
		Some(text)
	}
}

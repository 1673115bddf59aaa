//! Viewport line spans and their LSP query ranges.
//!
//! The viewport reports visible lines 1-based and inclusive. Hint providers
//! and hint positions use 0-based LSP coordinates. A span `[first, last]`
//! queries `[(first - 1, 0), (last, 0)]`, which covers every visible line and
//! the start of the line after it.

use std::cmp::Ordering;

use lsp_types::{Position, Range};

/// Visible line span reported by the viewport, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSpan {
	pub first: u32,
	pub last: u32,
}

impl LineSpan {
	/// Creates a span, swapping the bounds when given in reverse order.
	pub fn new(first: u32, last: u32) -> Self {
		if first <= last { Self { first, last } } else { Self { first: last, last: first } }
	}

	/// Returns the LSP range used to query providers for this span.
	pub fn query_range(self) -> Range {
		Range {
			start: Position {
				line: self.first.saturating_sub(1),
				character: 0,
			},
			end: Position {
				line: self.last,
				character: 0,
			},
		}
	}
}

/// Orders a position against a range, treating both ends as inclusive.
///
/// Returns [`Ordering::Equal`] when the position lies inside the range,
/// [`Ordering::Less`] before it and [`Ordering::Greater`] after it.
pub fn position_in_range(position: Position, range: &Range) -> Ordering {
	let key = |p: Position| (p.line, p.character);
	if key(position) < key(range.start) {
		Ordering::Less
	} else if key(position) > key(range.end) {
		Ordering::Greater
	} else {
		Ordering::Equal
	}
}

/// Returns true when `position` lies inside `range`, ends included.
pub fn contains_position(range: &Range, position: Position) -> bool {
	position_in_range(position, range) == Ordering::Equal
}

#[cfg(test)]
mod tests {
	use super::*;

	fn pos(line: u32, character: u32) -> Position {
		Position { line, character }
	}

	#[test]
	fn query_range_spans_visible_lines() {
		let range = LineSpan::new(10, 20).query_range();
		assert_eq!(range.start, pos(9, 0));
		assert_eq!(range.end, pos(20, 0));
	}

	#[test]
	fn reversed_bounds_are_normalized() {
		assert_eq!(LineSpan::new(20, 10), LineSpan { first: 10, last: 20 });
	}

	#[test]
	fn first_line_zero_does_not_underflow() {
		assert_eq!(LineSpan::new(0, 3).query_range().start, pos(0, 0));
	}

	#[test]
	fn range_boundaries_are_inside() {
		let range = LineSpan::new(10, 20).query_range();
		assert!(contains_position(&range, pos(9, 0)));
		assert!(contains_position(&range, pos(20, 0)));
		assert!(contains_position(&range, pos(15, 42)));
		assert_eq!(position_in_range(pos(8, 99), &range), Ordering::Less);
		assert_eq!(position_in_range(pos(20, 1), &range), Ordering::Greater);
	}
}

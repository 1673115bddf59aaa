//! Covered viewport bands.
//!
//! [`CoveredRanges`] records line intervals that already have up-to-date
//! painted hints. Containment is checked against single stored intervals:
//! a query covered only by the union of two neighbours is a miss and costs
//! one redundant fetch.

/// Set of painted line intervals, inclusive on both ends.
///
/// No stored interval contains another. Adding an interval already contained
/// in a stored one is a no-op, and adding one that swallows stored intervals
/// drops them. Partial overlaps and adjacent intervals are kept as-is.
#[derive(Debug, Default, Clone)]
pub struct CoveredRanges {
	ranges: Vec<(u32, u32)>,
}

impl CoveredRanges {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true if `[start, end]` lies fully inside one stored interval.
	pub fn has(&self, start: u32, end: u32) -> bool {
		let (start, end) = ordered(start, end);
		self.ranges.iter().any(|&(lo, hi)| lo <= start && hi >= end)
	}

	/// Records `[start, end]` as painted.
	pub fn add(&mut self, start: u32, end: u32) {
		let (start, end) = ordered(start, end);
		if self.has(start, end) {
			return;
		}
		self.ranges.retain(|&(lo, hi)| !(start <= lo && end >= hi));
		self.ranges.push((start, end));
	}

	/// Forgets every interval.
	pub fn clear(&mut self) {
		self.ranges.clear();
	}

	pub fn is_empty(&self) -> bool {
		self.ranges.is_empty()
	}

	pub fn len(&self) -> usize {
		self.ranges.len()
	}
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
	if a <= b { (a, b) } else { (b, a) }
}

// SPDX-License-Identifier: Apache-2.0

/// Options fixing a [`Vifo`](super::Vifo)'s geometry: its total element
/// capacity and the per-step batch-size bounds.
///
/// # Capacity
///
/// The total number of elements the buffer holds. The buffer enforces this
/// bound globally; lane depths are derived from it and are never the binding
/// constraint.
///
/// # Batch bounds
///
/// The largest batch a single step may admit (`max_push_batch`) and the
/// largest batch a single step may hand out (`max_pop_batch`). Each must lie
/// within `1..=element_capacity`. The lane count is the larger of the two, so
/// a full-width batch always touches each lane at most once.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct Options {
	pub element_capacity: usize,
	pub max_push_batch: usize,
	pub max_pop_batch: usize,
}

/// An invalid [`Options`] configuration, reported by
/// [`Vifo::new`](super::Vifo::new).
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OptionsError {
	#[error("element capacity must be at least 1")]
	ZeroCapacity,
	#[error("push batch bound {bound} is outside 1..={capacity}")]
	PushBound { bound: usize, capacity: usize },
	#[error("pop batch bound {bound} is outside 1..={capacity}")]
	PopBound { bound: usize, capacity: usize },
}

impl Options {
	/// Creates options for a buffer of `element_capacity` elements, with both
	/// batch bounds set to one element per step.
	pub const fn new(element_capacity: usize) -> Self {
		Self {
			element_capacity,
			max_push_batch: 1,
			max_pop_batch: 1,
		}
	}

	/// Returns the total element capacity.
	#[inline]
	pub const fn element_capacity(&self) -> usize { self.element_capacity }

	/// Returns the push batch bound.
	#[inline]
	pub const fn max_push_batch(&self) -> usize { self.max_push_batch }

	/// Returns the pop batch bound.
	#[inline]
	pub const fn max_pop_batch(&self) -> usize { self.max_pop_batch }

	/// Returns the number of lanes, the larger of the two batch bounds.
	/// Meaningful only for options that pass [`validate`](Self::validate).
	#[inline]
	pub const fn lanes(&self) -> usize {
		if self.max_push_batch > self.max_pop_batch {
			self.max_push_batch
		} else {
			self.max_pop_batch
		}
	}

	/// Returns the per-lane depth, the capacity split over the lanes rounded
	/// upward so the lanes together cover the whole capacity.
	#[inline]
	pub const fn lane_depth(&self) -> usize {
		let lanes = self.lanes();
		self.element_capacity / lanes + (self.element_capacity % lanes > 0) as usize
	}

	/// Sets the push batch bound.
	#[inline]
	pub const fn with_max_push_batch(mut self, value: usize) -> Self {
		self.max_push_batch = value;
		self
	}

	/// Sets the pop batch bound.
	#[inline]
	pub const fn with_max_pop_batch(mut self, value: usize) -> Self {
		self.max_pop_batch = value;
		self
	}

	/// Sets both batch bounds.
	#[inline]
	pub const fn with_batch_bounds(self, push: usize, pop: usize) -> Self {
		self.with_max_push_batch(push)
			.with_max_pop_batch(pop)
	}

	/// Checks the configuration, returning the first violated constraint.
	pub fn validate(&self) -> Result<(), OptionsError> {
		let capacity = self.element_capacity;
		if capacity == 0 {
			return Err(OptionsError::ZeroCapacity)
		}
		if !(1..=capacity).contains(&self.max_push_batch) {
			return Err(OptionsError::PushBound { bound: self.max_push_batch, capacity })
		}
		if !(1..=capacity).contains(&self.max_pop_batch) {
			return Err(OptionsError::PopBound { bound: self.max_pop_batch, capacity })
		}
		Ok(())
	}
}

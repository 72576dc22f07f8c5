// SPDX-License-Identifier: Apache-2.0

//! The striped buffer engine. Incoming batches are scattered round-robin over
//! a set of fixed-depth lanes from a write cursor, outgoing batches gathered
//! round-robin from a read cursor, so a whole batch moves in one step while
//! element order stays globally FIFO.

mod options;

pub use options::{Options, OptionsError};

use std::fmt;
use std::mem;
use all_asserts::debug_assert_le;
use itertools::Itertools;
use crate::element::Element;
use crate::lane::Lane;

/// A bounded FIFO that admits a variable-size batch per step on the push side
/// and hands out a variable, consumer-chosen batch size per step on the pop
/// side, preserving strict element ordering across arbitrarily many mixed-size
/// transfers.
///
/// # Striping
///
/// The buffer owns `B = max(max_push_batch, max_pop_batch)` [`Lane`]s. A push
/// batch lands one element per lane starting at the write cursor; a pop batch
/// is gathered one element per lane starting at the read cursor. Each cursor
/// advances by the batch size modulo `B`, so a full-width batch touches every
/// lane exactly once and the `j`-th oldest element is always one lane step
/// ahead of the `j-1`-th. Lane depths are sized so the lanes together cover
/// the whole capacity; the occupancy bound is enforced globally and lane
/// depth is never the binding constraint.
///
/// # Steps
///
/// The buffer advances in discrete steps, driven by [`step`]. All
/// admissibility decisions in one step are taken against the state as it
/// stood when the step began; in particular a batch pushed in a step is never
/// visible to a pop evaluated in that same step. A step logically dequeues
/// before it enqueues.
///
/// # Transfer policies
///
/// Admission is all-or-nothing: a push batch that does not fit in free space
/// is refused whole, never trimmed. Delivery is exact-size: a pop request is
/// either satisfied with exactly the requested element count or not at all.
/// Refusals are normal negative outcomes, not errors; the caller retries on a
/// later step.
///
/// [`step`]: Self::step
pub struct Vifo<T> {
	/// Exclusively owned; nothing else holds a lane.
	lanes: Box<[Lane<T>]>,
	occupancy: usize,
	write_cursor: usize,
	read_cursor: usize,
	pending: Pending<T>,
	/// Recycled storage for the next latched batch.
	spare: Vec<T>,
	/// The batch most recently handed to the consumer.
	taken: Vec<T>,
	opts: Options,
}

/// The pop-side holding register: either empty, or holding a batch computed
/// from the lane fronts and waiting for the consumer to take it.
enum Pending<T> {
	Empty,
	Ready(Vec<T>),
}

/// The visible outcome of one [`step`](Vifo::step).
#[derive(Clone, Copy, Debug)]
pub struct StepResult<'a, T> {
	/// Whether the pushed batch was admitted and committed this step.
	pub accepted: bool,
	/// The batch handed over this step; present exactly when an offer met the
	/// consumer's accept. Valid until the next call that mutates the buffer.
	pub delivered: Option<&'a [T]>,
}

impl<T: Element> Vifo<T> {
	/// Creates an empty buffer from `options`, validating them first. All
	/// storage is allocated here; operation never allocates.
	pub fn new(options: Options) -> Result<Self, OptionsError> {
		options.validate()?;
		let lanes = (0..options.lanes())
			.map(|_| Lane::new(options.lane_depth()))
			.collect();
		Ok(Self {
			lanes,
			occupancy: 0,
			write_cursor: 0,
			read_cursor: 0,
			pending: Pending::Empty,
			spare: Vec::with_capacity(options.max_pop_batch),
			taken: Vec::with_capacity(options.max_pop_batch),
			opts: options,
		})
	}

	/// Returns the total element capacity.
	pub fn capacity(&self) -> usize { self.opts.element_capacity }
	/// Returns the number of buffered elements.
	pub fn occupancy(&self) -> usize { self.occupancy }
	/// Returns the number of elements that can be admitted before the buffer
	/// is full.
	pub fn limit(&self) -> usize { self.capacity() - self.occupancy }
	/// Returns `true` if the buffer holds no elements.
	pub fn is_empty(&self) -> bool { self.occupancy == 0 }
	/// Returns `true` if the buffer is at capacity.
	pub fn is_full(&self) -> bool { self.occupancy == self.capacity() }
	/// Returns the lane count.
	pub fn lane_count(&self) -> usize { self.lanes.len() }
	/// Returns the per-lane depth.
	pub fn lane_depth(&self) -> usize { self.opts.lane_depth() }
	/// Returns the configuration the buffer was built from.
	pub fn options(&self) -> Options { self.opts }

	/// Returns `true` iff a push batch of `len` elements would be admitted
	/// this step. A batch of size 0 or beyond the push bound is never
	/// admitted, and admission is all-or-nothing.
	pub fn can_accept(&self, len: usize) -> bool {
		(1..=self.opts.max_push_batch).contains(&len) && len <= self.limit()
	}

	/// Returns `true` iff a pop request for `request` elements is satisfiable
	/// from the current occupancy. A request of 0 or beyond the pop bound is
	/// never satisfiable, and delivery is never partial.
	pub fn can_produce(&self, request: usize) -> bool {
		(1..=self.opts.max_pop_batch).contains(&request) && request <= self.occupancy
	}

	/// Returns the batch currently offered to the consumer, if any. The offer
	/// holds steady across steps until it is taken, re-shaped by a changed
	/// request, or withdrawn on reset.
	pub fn offered(&self) -> Option<&[T]> {
		match &self.pending {
			Pending::Ready(batch) => Some(batch),
			Pending::Empty => None,
		}
	}

	/// Iterates over buffered elements in FIFO order, oldest first.
	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		let lanes = self.lane_count();
		(0..self.occupancy).map(move |i| {
			let lane = &self.lanes[self.wrap(self.read_cursor, i % lanes)];
			lane.get(i / lanes).unwrap()
		})
	}

	/// Runs one atomic evaluation-and-commit cycle.
	///
	/// `push` presents a batch for admission; it commits iff
	/// [`can_accept`](Self::can_accept) holds for its length. `request` is
	/// the pop size wanted this step, with `0` meaning no pop is requested.
	/// `accept` signals that the consumer takes whatever batch was offered
	/// when the step began.
	///
	/// Both sides are judged against the occupancy at step start: a pop never
	/// sees elements pushed in the same step, and a push is admitted against
	/// pre-step free space even if a pop drains room in the same step. The
	/// net occupancy change is `pushed - popped`.
	///
	/// The offer register makes at most one transition per step:
	///
	/// - holding a batch with `accept` high, the batch is delivered and the
	///   register empties; a new offer forms no earlier than the next step;
	/// - holding a batch with `accept` low, the offer re-forms for the
	///   *current* `request`, or is withdrawn if that request is
	///   unsatisfiable;
	/// - empty, an offer forms iff [`can_produce`](Self::can_produce) holds
	///   for `request`.
	///
	/// Because the delivered batch is the one latched when the step began,
	/// changing `request` in the very step that accepts hands over the
	/// previously offered size.
	///
	/// Out-of-contract stimulus is refused rather than detected as an error:
	/// oversize or empty batches and requests are simply never admitted, and
	/// `accept` with nothing offered does nothing.
	pub fn step(&mut self, push: Option<&[T]>, request: usize, accept: bool) -> StepResult<'_, T> {
		let before = self.occupancy;

		// Pop side first; a step dequeues before it enqueues.
		let mut took = false;
		match mem::replace(&mut self.pending, Pending::Empty) {
			Pending::Ready(mut batch) if accept => {
				self.drain_front(batch.len());
				mem::swap(&mut batch, &mut self.taken);
				self.spare = batch;
				took = true;
			}
			Pending::Ready(batch) => self.spare = batch,
			Pending::Empty => {}
		}
		if !took && self.can_produce(request) {
			let batch = self.preview(request);
			self.pending = Pending::Ready(batch);
		}

		// Push side, judged against the pre-step snapshot.
		let accepted = match push {
			Some(batch) => {
				let admit = (1..=self.opts.max_push_batch).contains(&batch.len())
					&& batch.len() <= self.capacity() - before;
				if admit {
					self.scatter(batch);
				}
				admit
			}
			None => false,
		};

		self.check();
		StepResult { accepted, delivered: took.then(|| self.taken.as_slice()) }
	}

	/// Discards all buffered content and any pending offer, restoring the
	/// empty construction state. May be called at any step boundary,
	/// regardless of what the buffer holds.
	pub fn reset(&mut self) {
		for lane in self.lanes.iter_mut() {
			lane.clear();
		}
		self.occupancy = 0;
		self.write_cursor = 0;
		self.read_cursor = 0;
		if let Pending::Ready(batch) = mem::replace(&mut self.pending, Pending::Empty) {
			self.spare = batch;
		}
	}
}

impl<T: Element> Vifo<T> {
	/// Copies the `request` oldest elements off the lane fronts, without
	/// touching lane state.
	fn preview(&mut self, request: usize) -> Vec<T> {
		let mut batch = mem::take(&mut self.spare);
		batch.clear();
		for i in 0..request {
			let lane = &self.lanes[self.wrap(self.read_cursor, i)];
			batch.push(lane.front().copied().unwrap());
		}
		batch
	}

	/// Dequeues one element from each of the `count` lanes at the read
	/// cursor and advances it.
	fn drain_front(&mut self, count: usize) {
		debug_assert_le!(count, self.occupancy);
		for i in 0..count {
			let idx = self.wrap(self.read_cursor, i);
			let popped = self.lanes[idx].pop_front();
			debug_assert!(popped.is_some());
		}
		self.read_cursor = self.wrap(self.read_cursor, count);
		self.occupancy -= count;
	}

	/// Enqueues the batch one element per lane from the write cursor and
	/// advances it.
	fn scatter(&mut self, batch: &[T]) {
		for (i, &value) in batch.iter().enumerate() {
			let idx = self.wrap(self.write_cursor, i);
			// The global occupancy bound keeps lane depth from ever being
			// the binding constraint.
			let pushed = self.lanes[idx].push_back(value);
			debug_assert!(pushed.is_ok());
		}
		self.write_cursor = self.wrap(self.write_cursor, batch.len());
		self.occupancy += batch.len();
	}

	fn wrap(&self, cursor: usize, offset: usize) -> usize {
		let idx = cursor + offset;
		// Batch sizes never exceed the lane count, so one fold suffices.
		if idx >= self.lane_count() {
			idx - self.lane_count()
		} else {
			idx
		}
	}

	fn check(&self) {
		debug_assert_le!(self.occupancy, self.capacity());
		debug_assert_eq!(
			self.occupancy,
			self.lanes.iter().map(Lane::len).sum::<usize>()
		);
	}
}

impl<T: Element + fmt::Debug> fmt::Debug for Vifo<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Vifo")
			.field("occupancy", &self.occupancy)
			.field("write_cursor", &self.write_cursor)
			.field("read_cursor", &self.read_cursor)
			.field("elements", &self.iter().collect_vec())
			.finish()
	}
}

// SPDX-License-Identifier: Apache-2.0

//! A *vifo* is a variable-in, variable-out FIFO: a bounded buffer moving a
//! whole batch of elements per step in each direction, with batch sizes free
//! to differ between the two sides and from step to step.
//!
//! ## How it works
//!
//! A [`Vifo`] sits between a producer that emits bursts of irregular size and
//! a consumer that wants bursts of its own choosing: up to `max_push_batch`
//! elements go in per step, up to `max_pop_batch` come out per step, and the
//! element order across any mix of batch sizes is strictly first-in-first-out.
//!
//! ### Lanes
//!
//! Storage is striped over fixed-depth [`Lane`]s, one bounded single-lane
//! FIFO per possible batch position. A batch is scattered one element per
//! lane from a write cursor, gathered one element per lane from a read
//! cursor, so a whole batch moves in a single step without any lane needing
//! more than one enqueue and one dequeue. Capacity is fixed at construction
//! via [`Options`] and enforced globally; transfers are all-or-nothing in and
//! exact-size out.
//!
//! ### Steps
//!
//! The buffer is step-driven, like a clocked datapath: [`Vifo::step`] judges
//! the push and the pop against the same start-of-step snapshot, commits
//! both, and holds an unaccepted pop offer in a one-slot register until the
//! consumer takes it. A refused transfer is a normal outcome, retried by
//! simply asking again on a later step.

mod element;
mod lane;
mod vifo;

pub use element::Element;
pub use lane::Lane;
pub use vifo::{Options, OptionsError, StepResult, Vifo};
